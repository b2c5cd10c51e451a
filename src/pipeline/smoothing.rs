use crate::error::EngineError;
use crate::types::Hand;
use crate::vector::Vec3;

/// First-order exponential smoothing: `prev + factor * (cur - prev)`.
pub fn smooth_vector(cur: &Vec3, prev: &Vec3, factor: f64) -> Vec3 {
    *prev + (*cur - *prev) * factor
}

/// Blends each finger's position and direction toward the previous frame's
/// hand. The smoothing factor must sit strictly inside (0, 1).
///
/// The missing-finger sentinel takes part in the arithmetic like any other
/// value, so a slot that just emptied drifts toward (1000,1000,1000) over a
/// few frames rather than snapping there.
pub fn smooth_hand(cur: &Hand, prev: &Hand, factor: f64) -> Result<Hand, EngineError> {
    if factor <= 0.0 || factor >= 1.0 {
        return Err(EngineError::InvalidParameter(
            "smoothing factor must be inside (0, 1)",
        ));
    }

    let mut out = *cur;
    for (slot, (c, p)) in out
        .fingers
        .iter_mut()
        .zip(cur.fingers.iter().zip(prev.fingers.iter()))
    {
        slot.position = smooth_vector(&c.position, &p.position, factor);
        slot.direction = smooth_vector(&c.direction, &p.direction, factor);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Fingertip;

    fn hand_at(position: Vec3) -> Hand {
        let tip = Fingertip {
            position,
            direction: position * 0.1,
            bisect: Vec3::ZERO,
        };
        Hand::from_fingertips(&[tip; 5])
    }

    #[test]
    fn halfway_blend() {
        let out = smooth_vector(&Vec3::new(10.0, 20.0, 30.0), &Vec3::ZERO, 0.5);
        assert_eq!(out, Vec3::new(5.0, 10.0, 15.0));
    }

    #[test]
    fn smoothing_a_constant_stream_is_identity() {
        let v = Vec3::new(3.25, -8.5, 1.0);
        for factor in [0.1, 0.5, 0.9] {
            assert_eq!(smooth_vector(&v, &v, factor), v);
        }

        let hand = hand_at(Vec3::new(12.0, 40.0, 0.0));
        let smoothed = smooth_hand(&hand, &hand, 0.3).unwrap();
        assert_eq!(smoothed, hand);
    }

    #[test]
    fn hand_smoothing_blends_positions_and_directions() {
        let prev = hand_at(Vec3::new(0.0, 0.0, 0.0));
        let cur = hand_at(Vec3::new(10.0, 20.0, 30.0));
        let out = smooth_hand(&cur, &prev, 0.5).unwrap();
        assert_eq!(out.fingers[0].position, Vec3::new(5.0, 10.0, 15.0));
        assert_eq!(out.fingers[0].direction, Vec3::new(0.5, 1.0, 1.5));
        // Bisect is carried from the current frame untouched.
        assert_eq!(out.fingers[0].bisect, cur.fingers[0].bisect);
    }

    #[test]
    fn factor_must_be_strictly_inside_unit_interval() {
        let hand = hand_at(Vec3::ZERO);
        for factor in [0.0, 1.0, -0.5, 1.5] {
            assert!(matches!(
                smooth_hand(&hand, &hand, factor),
                Err(EngineError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn sentinel_slots_blend_numerically() {
        let prev = hand_at(Vec3::new(0.0, 0.0, 0.0));
        let cur = Hand::default();
        let out = smooth_hand(&cur, &prev, 0.5).unwrap();
        assert_eq!(out.fingers[0].position, Vec3::new(500.0, 500.0, 500.0));
    }
}
