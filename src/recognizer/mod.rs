pub mod dtw;
pub mod store;
pub mod stream;

use std::path::Path;

use crossbeam_channel::Sender;

use crate::types::{EngineEvent, Gesture, Hand, MINIMUM_GESTURE_FRAMES};

pub use dtw::DtwParams;
pub use stream::{DEFAULT_STREAM_CAPACITY, GestureStream};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecognizerMode {
    Idle,
    Recording,
    Recognizing,
}

/// Front end of the recognition stage: owns the frame stream, the stored
/// gesture library and the matching parameters, and emits recognition and
/// recording events.
pub struct GestureRecognizer {
    mode: RecognizerMode,
    stream: GestureStream,
    library: Vec<Gesture>,
    params: DtwParams,
    events: Sender<EngineEvent>,
}

impl GestureRecognizer {
    pub fn new(params: DtwParams, stream_capacity: usize, events: Sender<EngineEvent>) -> Self {
        Self {
            mode: RecognizerMode::Idle,
            stream: GestureStream::new(stream_capacity),
            library: Vec::new(),
            params,
            events,
        }
    }

    pub fn mode(&self) -> RecognizerMode {
        self.mode
    }

    pub fn gestures(&self) -> &[Gesture] {
        &self.library
    }

    pub fn start_recording(&mut self) {
        if self.mode == RecognizerMode::Recognizing {
            self.stop_recognizing();
        }
        self.stream.clear();
        self.mode = RecognizerMode::Recording;
        log::info!("gesture recording started");
    }

    /// Ends a recording. The take is kept only when it is long enough to be
    /// warped against later; a kept gesture is also announced on the event
    /// channel.
    pub fn stop_recording(&mut self, name: impl Into<String>) -> Option<Gesture> {
        self.mode = RecognizerMode::Idle;
        if self.stream.len() < MINIMUM_GESTURE_FRAMES {
            log::warn!(
                "recording discarded: {} frames, need {}",
                self.stream.len(),
                MINIMUM_GESTURE_FRAMES
            );
            return None;
        }
        let gesture = self.stream.to_gesture(name);
        log::info!(
            "recorded gesture '{}' ({} frames)",
            gesture.name,
            gesture.frames.len()
        );
        let _ = self.events.send(EngineEvent::GestureRecorded(gesture.clone()));
        Some(gesture)
    }

    pub fn start_recognizing(&mut self) {
        self.stream.clear();
        self.mode = RecognizerMode::Recognizing;
        log::info!("gesture recognition started");
    }

    pub fn stop_recognizing(&mut self) {
        self.mode = RecognizerMode::Idle;
    }

    pub fn store_gesture(&mut self, gesture: Gesture) {
        self.library.push(gesture);
    }

    /// Persists the library; failures are logged, not raised.
    pub fn save_library(&self, path: &Path) -> bool {
        match store::save_gestures(path, &self.library) {
            Ok(()) => true,
            Err(err) => {
                log::error!("failed to save gesture library: {err}");
                false
            }
        }
    }

    /// Replaces the library from disk; failures are logged, not raised.
    pub fn load_library(&mut self, path: &Path) -> bool {
        match store::load_gestures(path) {
            Ok(gestures) => {
                log::info!("loaded {} gestures", gestures.len());
                self.library = gestures;
                true
            }
            Err(err) => {
                log::error!("failed to load gesture library: {err}");
                false
            }
        }
    }

    /// Feeds one hand frame into whichever mode is active.
    pub fn analyze_frame(&mut self, hand: Hand) {
        match self.mode {
            RecognizerMode::Recognizing => {
                self.stream.add_frame(hand);
                if self.stream.is_saturated() {
                    self.run_recognition();
                }
            }
            RecognizerMode::Recording => {
                if self.stream.is_saturated() {
                    log::warn!(
                        "recording over capacity, dropping oldest frame (total {})",
                        self.stream.accumulated_frame_count()
                    );
                }
                self.stream.add_frame(hand);
            }
            RecognizerMode::Idle => {}
        }
    }

    fn run_recognition(&mut self) {
        let observed = self.stream.to_gesture("observation");
        let Some(candidate) = dtw::closest_candidate(&self.library, &observed, &self.params)
        else {
            return;
        };
        let Some(mean_cost) = dtw::mean_path_cost(&observed, candidate, &self.params) else {
            log::debug!("warping path against '{}' diverged", candidate.name);
            return;
        };
        if mean_cost < self.params.path_cost_threshold {
            log::info!("recognized gesture '{}' (mean cost {mean_cost:.3})", candidate.name);
            let _ = self
                .events
                .send(EngineEvent::GestureRecognized(candidate.clone()));
        } else {
            log::debug!(
                "candidate '{}' rejected (mean cost {mean_cost:.3})",
                candidate.name
            );
        }
    }
}
