//! Hand gesture recognition over depth-camera frames.
//!
//! Each depth frame is thresholded into an in-range mask, the hand's
//! silhouette is traced, curvature peaks along it are classified into
//! fingertips, and the resulting stream of hand descriptors is matched
//! against a library of prerecorded gestures by dynamic time warping.
//!
//! Drive [`pipeline::FramePipeline`] inline from a sensor callback, or let
//! [`pipeline::start_pipeline`] run it on a dedicated worker thread fed
//! through crossbeam channels.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod recognizer;
pub mod types;
pub mod vector;

pub use config::EngineOptions;
pub use error::EngineError;
pub use pipeline::{FramePipeline, PipelineCommand, PipelineHandle, start_pipeline};
pub use recognizer::{GestureRecognizer, RecognizerMode};
pub use types::{DepthFrame, EngineEvent, Fingertip, Gesture, Hand, Pixel};
pub use vector::Vec3;
