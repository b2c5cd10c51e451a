use crate::error::EngineError;
use crate::types::Hand;
use crate::vector::Vec3;

/// Moving average of a history with per-step decaying weight: the i-th
/// update blends `values[i]` in at weight^i, and the newest observation is
/// left out of the average entirely. With history [0, 2, 4, 6] and weight
/// 0.5 the result is 1.75.
///
/// Panics on an empty history; [`predict_next`] validates before calling.
pub fn ema(values: &[Vec3], weight: f64) -> Vec3 {
    let mut estimate = values[0];
    let mut step_weight = weight;
    for value in values.iter().take(values.len() - 1).skip(1) {
        estimate = *value * step_weight + estimate * (1.0 - step_weight);
        step_weight *= weight;
    }
    estimate
}

/// One-step extrapolation over a hand history (oldest first): the newest
/// hand, pushed further by its offset from the history's moving average.
/// Applied per finger slot, independently for position and direction.
pub fn predict_next(history: &[Hand], weight: f64) -> Result<Hand, EngineError> {
    if weight <= 0.0 || weight >= 1.0 {
        return Err(EngineError::InvalidParameter(
            "prediction weight must be inside (0, 1)",
        ));
    }
    let Some(current) = history.last() else {
        return Err(EngineError::InvalidParameter(
            "prediction history is empty",
        ));
    };

    let mut predicted = *current;
    for slot in 0..predicted.fingers.len() {
        let positions: Vec<Vec3> = history.iter().map(|h| h.fingers[slot].position).collect();
        let directions: Vec<Vec3> = history.iter().map(|h| h.fingers[slot].direction).collect();

        let avg_pos = ema(&positions, weight);
        let avg_dir = ema(&directions, weight);

        let cur = &current.fingers[slot];
        predicted.fingers[slot].position = cur.position + (cur.position - avg_pos);
        predicted.fingers[slot].direction = cur.direction + (cur.direction - avg_dir);
    }
    Ok(predicted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Fingertip;

    fn hand_at(position: Vec3) -> Hand {
        let tip = Fingertip {
            position,
            direction: position,
            bisect: Vec3::ZERO,
        };
        Hand::from_fingertips(&[tip; 5])
    }

    #[test]
    fn ema_skips_the_newest_observation() {
        let values = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(4.0, 0.0, 0.0),
            Vec3::new(6.0, 0.0, 0.0),
        ];
        assert_eq!(ema(&values, 0.5), Vec3::new(1.75, 0.0, 0.0));
    }

    #[test]
    fn ema_of_a_constant_history_is_the_constant() {
        let v = Vec3::new(7.0, -2.0, 3.5);
        for len in [1usize, 2, 5, 12] {
            let values = vec![v; len];
            assert_eq!(ema(&values, 0.5), v);
            assert_eq!(ema(&values, 0.8), v);
        }
    }

    #[test]
    fn prediction_extends_the_trend() {
        let history: Vec<Hand> = [0.0, 2.0, 4.0, 6.0]
            .iter()
            .map(|&x| hand_at(Vec3::new(x, 0.0, 0.0)))
            .collect();
        let predicted = predict_next(&history, 0.5).unwrap();
        for slot in 0..5 {
            assert_eq!(
                predicted.fingers[slot].position,
                Vec3::new(10.25, 0.0, 0.0)
            );
        }
    }

    #[test]
    fn prediction_of_a_static_hand_is_the_hand() {
        let history = vec![hand_at(Vec3::new(5.0, 5.0, 0.0)); 8];
        let predicted = predict_next(&history, 0.8).unwrap();
        assert_eq!(predicted, history[0]);
    }

    #[test]
    fn weight_and_history_are_validated() {
        let history = vec![hand_at(Vec3::ZERO); 3];
        assert!(predict_next(&history, 0.0).is_err());
        assert!(predict_next(&history, 1.0).is_err());
        assert!(predict_next(&[], 0.5).is_err());
    }
}
