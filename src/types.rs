use serde::{Deserialize, Serialize};

use crate::vector::Vec3;

/// Position sentinel for an unoccupied finger slot.
pub const FINGER_NOT_FOUND: Vec3 = Vec3 {
    x: 1000.0,
    y: 1000.0,
    z: 1000.0,
};

/// A recording shorter than this is discarded instead of retained.
pub const MINIMUM_GESTURE_FRAMES: usize = 10;

/// One depth frame as delivered by the sensor driver: a dense row-major grid
/// of distance measurements in millimetres.
#[derive(Clone, Debug)]
pub struct DepthFrame {
    pub distances: Vec<i16>,
    pub width: u32,
    pub height: u32,
}

/// Classification of a single depth pixel against the distance window.
///
/// `Undefined` is reserved for producers of raw frames; the thresholding
/// stage never emits it and every consumer treats it as "not in range".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pixel {
    InRange,
    OutOfRange,
    Undefined,
}

/// A contour point whose local curvature falls inside the detector's angle
/// window. `seg_a`/`seg_b` run from `point` to the contour points k steps
/// behind and ahead; `seg_c = seg_b - seg_a`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurvePoint {
    pub point: Vec3,
    pub seg_a: Vec3,
    pub seg_b: Vec3,
    pub seg_c: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fingertip {
    pub position: Vec3,
    pub direction: Vec3,
    pub bisect: Vec3,
}

impl Fingertip {
    /// An unoccupied slot: every field carries the sentinel.
    pub fn not_found() -> Self {
        Self {
            position: FINGER_NOT_FOUND,
            direction: FINGER_NOT_FOUND,
            bisect: FINGER_NOT_FOUND,
        }
    }
}

/// A single frame's hand: exactly five finger slots (thumb through little
/// finger), missing fingers carrying the sentinel position. Immutable once a
/// stage has emitted it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hand {
    pub fingers: [Fingertip; 5],
}

impl Default for Hand {
    fn default() -> Self {
        Self {
            fingers: [Fingertip::not_found(); 5],
        }
    }
}

impl Hand {
    /// Fills the slots from the first (up to) five fingertips.
    pub fn from_fingertips(tips: &[Fingertip]) -> Self {
        let mut hand = Hand::default();
        for (slot, tip) in hand.fingers.iter_mut().zip(tips.iter()) {
            *slot = *tip;
        }
        hand
    }

    pub fn has_finger(&self, slot: usize) -> bool {
        self.fingers[slot].position != FINGER_NOT_FOUND
    }

    /// Occupied-slot count. Tests only the x component of the position, so a
    /// slot whose position merely starts with 1000 counts as missing.
    pub fn finger_count(&self) -> usize {
        self.fingers
            .iter()
            .filter(|f| f.position.x != FINGER_NOT_FOUND.x)
            .count()
    }
}

/// A named sequence of hand frames, either freshly recorded or loaded from
/// the gesture library.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gesture {
    pub name: String,
    pub frames: Vec<Hand>,
}

impl Gesture {
    pub fn new(name: impl Into<String>, frames: Vec<Hand>) -> Self {
        Self {
            name: name.into(),
            frames,
        }
    }
}

/// Push-style notifications out of the pipeline.
///
/// The per-frame variants are debug streams delivered best-effort; the
/// gesture variants are the recognizer's results and are never dropped.
#[derive(Clone, Debug)]
pub enum EngineEvent {
    ContourReady { points: Vec<Vec3>, mask: Vec<Pixel> },
    CurvesReady(Vec<CurvePoint>),
    FingertipsReady(Vec<Fingertip>),
    GestureRecognized(Gesture),
    GestureRecorded(Gesture),
}
