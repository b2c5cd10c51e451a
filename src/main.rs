use anyhow::Result;
use crossbeam_channel::{bounded, unbounded};

use handwave::{DepthFrame, EngineEvent, EngineOptions, PipelineCommand, start_pipeline};

const WIDTH: u32 = 160;
const HEIGHT: u32 = 120;
const HAND_DEPTH: i16 = 1500;
const BACKGROUND_DEPTH: i16 = 4500;

/// Renders a crude hand at horizontal offset `shift`: a palm block with
/// three finger stripes above it. Stands in for the depth sensor so the
/// pipeline can be exercised end to end.
fn synthetic_frame(shift: i32) -> DepthFrame {
    let palm_x = 60 + shift;
    let distances = (0..(WIDTH * HEIGHT) as i32)
        .map(|i| {
            let (x, y) = (i % WIDTH as i32, i / WIDTH as i32);
            let palm = (palm_x..palm_x + 40).contains(&x) && (60..100).contains(&y);
            let finger = (30..60).contains(&y)
                && [palm_x + 4, palm_x + 18, palm_x + 32]
                    .iter()
                    .any(|&fx| (fx..fx + 7).contains(&x));
            if palm || finger {
                HAND_DEPTH
            } else {
                BACKGROUND_DEPTH
            }
        })
        .collect();
    DepthFrame {
        distances,
        width: WIDTH,
        height: HEIGHT,
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let (frame_tx, frame_rx) = bounded(2);
    let (event_tx, event_rx) = unbounded();

    let handle = start_pipeline(EngineOptions::default(), frame_rx, event_tx)?;
    let commands = handle.commands();

    // Record a short synthetic wave, then replay it for recognition.
    commands.send(PipelineCommand::StartRecording)?;
    for t in 0..40 {
        frame_tx.send(synthetic_frame(t % 10 - 5))?;
    }
    std::thread::sleep(std::time::Duration::from_millis(300));
    commands.send(PipelineCommand::StopRecording("wave".into()))?;
    std::thread::sleep(std::time::Duration::from_millis(100));

    let mut recorded = None;
    for event in event_rx.try_iter() {
        if let EngineEvent::GestureRecorded(g) = event {
            println!("recorded '{}' with {} frames", g.name, g.frames.len());
            recorded = Some(g);
        }
    }

    if let Some(gesture) = recorded {
        commands.send(PipelineCommand::StoreGesture(gesture))?;
        commands.send(PipelineCommand::StartRecognizing)?;
        for t in 0..60 {
            frame_tx.send(synthetic_frame(t % 10 - 5))?;
        }
        std::thread::sleep(std::time::Duration::from_millis(500));

        let mut recognized = 0usize;
        for event in event_rx.try_iter() {
            if let EngineEvent::GestureRecognized(g) = event {
                recognized += 1;
                if recognized == 1 {
                    println!("recognized '{}'", g.name);
                }
            }
        }
        println!("{recognized} recognition events");
    } else {
        println!("nothing recorded; scene too sparse");
    }

    handle.stop();
    Ok(())
}
