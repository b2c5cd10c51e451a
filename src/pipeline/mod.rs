pub mod consistency;
pub mod contour;
pub mod curvature;
pub mod fingertips;
pub mod prediction;
pub mod range_mask;
pub mod smoothing;

use std::path::PathBuf;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, select, unbounded};

use crate::config::EngineOptions;
use crate::error::EngineError;
use crate::recognizer::GestureRecognizer;
use crate::types::{DepthFrame, EngineEvent, Gesture, Hand};

/// The per-frame driver: thresholding, contour walk, curvature, fingertip
/// classification, smoothing, consistency filtering, recognition. One
/// instance per pipeline; the heavy stages keep their buffers across frames.
pub struct FramePipeline {
    options: EngineOptions,
    tracker: contour::ContourTracker,
    filter: consistency::ConsistencyFilter,
    previous_hand: Option<Hand>,
    recognizer: GestureRecognizer,
    events: Sender<EngineEvent>,
}

impl FramePipeline {
    pub fn new(options: EngineOptions, events: Sender<EngineEvent>) -> Result<Self, EngineError> {
        options.validate()?;
        Ok(Self {
            tracker: contour::ContourTracker::new(options.contour),
            filter: consistency::ConsistencyFilter::new(options.consistency),
            previous_hand: None,
            recognizer: GestureRecognizer::new(
                options.dtw,
                options.stream_capacity,
                events.clone(),
            ),
            options,
            events,
        })
    }

    pub fn recognizer(&self) -> &GestureRecognizer {
        &self.recognizer
    }

    pub fn recognizer_mut(&mut self) -> &mut GestureRecognizer {
        &mut self.recognizer
    }

    /// Runs one depth frame through every stage. An empty or handless frame
    /// is not an error: it flows through as a hand with five empty slots.
    pub fn process_frame(&mut self, frame: &DepthFrame) -> Result<(), EngineError> {
        let mask = range_mask::mask(
            &frame.distances,
            frame.width,
            frame.height,
            self.options.depth_window,
        )?;
        let view = range_mask::MaskView::new(&mask, frame.width, frame.height);

        let contour_points = self.tracker.trace(&view).to_vec();
        // The per-stage streams are debug taps: fired once per frame, even
        // when empty, and dropped when the consumer lags.
        let _ = self.events.try_send(EngineEvent::ContourReady {
            points: contour_points.clone(),
            mask: mask.clone(),
        });

        let curves = curvature::detect_curves(&contour_points, &self.options.curve);
        let _ = self.events.try_send(EngineEvent::CurvesReady(curves.clone()));

        let tips = fingertips::recognize_fingertips(&curves, &view, &self.options.fingers);
        let _ = self
            .events
            .try_send(EngineEvent::FingertipsReady(tips.clone()));

        let mut hand = Hand::from_fingertips(&tips);
        if self.options.smoothing_enabled {
            if let Some(prev) = &self.previous_hand {
                hand = smoothing::smooth_hand(&hand, prev, self.options.smoothing_factor)?;
            }
        }
        self.previous_hand = Some(hand);

        let recognizer = &mut self.recognizer;
        if self.options.prevent_hand_inconsistencies {
            self.filter.push(hand, |h| recognizer.analyze_frame(h));
        } else {
            recognizer.analyze_frame(hand);
        }
        Ok(())
    }
}

/// Control messages into a running pipeline worker. Travelling on the same
/// thread as the frames keeps library mutation and recognition naturally
/// serialized.
#[derive(Clone, Debug)]
pub enum PipelineCommand {
    StartRecording,
    StopRecording(String),
    StartRecognizing,
    StopRecognizing,
    StoreGesture(Gesture),
    SaveLibrary(PathBuf),
    LoadLibrary(PathBuf),
}

/// Running pipeline worker. Dropping the handle stops the thread.
#[derive(Debug)]
pub struct PipelineHandle {
    stop: Arc<AtomicBool>,
    commands: Sender<PipelineCommand>,
    handle: Option<thread::JoinHandle<()>>,
}

impl PipelineHandle {
    pub fn commands(&self) -> Sender<PipelineCommand> {
        self.commands.clone()
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for PipelineHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Spawns the pipeline on its own worker thread, consuming depth frames
/// from `frame_rx` and emitting [`EngineEvent`]s on `event_tx`. Option
/// validation happens before the thread exists, so a bad configuration
/// fails here and not in the worker.
pub fn start_pipeline(
    options: EngineOptions,
    frame_rx: Receiver<DepthFrame>,
    event_tx: Sender<EngineEvent>,
) -> Result<PipelineHandle, EngineError> {
    let pipeline = FramePipeline::new(options, event_tx)?;
    let (command_tx, command_rx) = unbounded();
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = stop.clone();

    let handle = thread::spawn(move || {
        run_worker_loop(pipeline, frame_rx, command_rx, stop_flag);
    });

    Ok(PipelineHandle {
        stop,
        commands: command_tx,
        handle: Some(handle),
    })
}

fn run_worker_loop(
    mut pipeline: FramePipeline,
    frame_rx: Receiver<DepthFrame>,
    command_rx: Receiver<PipelineCommand>,
    stop: Arc<AtomicBool>,
) {
    loop {
        if stop.load(Ordering::Relaxed) {
            break;
        }
        select! {
            recv(frame_rx) -> msg => match msg {
                Ok(frame) => {
                    if let Err(err) = pipeline.process_frame(&frame) {
                        log::warn!("depth frame rejected: {err}");
                    }
                }
                Err(_) => break,
            },
            recv(command_rx) -> msg => match msg {
                Ok(command) => apply_command(&mut pipeline, command),
                Err(_) => break,
            },
            default(Duration::from_millis(50)) => {}
        }
    }
}

fn apply_command(pipeline: &mut FramePipeline, command: PipelineCommand) {
    let recognizer = pipeline.recognizer_mut();
    match command {
        PipelineCommand::StartRecording => recognizer.start_recording(),
        PipelineCommand::StopRecording(name) => {
            recognizer.stop_recording(name);
        }
        PipelineCommand::StartRecognizing => recognizer.start_recognizing(),
        PipelineCommand::StopRecognizing => recognizer.stop_recognizing(),
        PipelineCommand::StoreGesture(gesture) => recognizer.store_gesture(gesture),
        PipelineCommand::SaveLibrary(path) => {
            recognizer.save_library(&path);
        }
        PipelineCommand::LoadLibrary(path) => {
            recognizer.load_library(&path);
        }
    }
}
