use ndarray::Array2;

use crate::types::{Gesture, Hand};
use crate::vector::Vec3;

#[derive(Clone, Copy, Debug)]
pub struct DtwParams {
    /// Mean warping-path cost below which a candidate is accepted.
    pub path_cost_threshold: f64,
    /// Last-frame distance above which a stored gesture is not even
    /// considered a candidate.
    pub frame_distance_threshold: f64,
    /// Longest run of candidate-axis-only backtrack steps tolerated before
    /// the path is declared diverged.
    pub horizontal_movement_threshold: usize,
    /// Same, along the observation axis.
    pub vertical_movement_threshold: usize,
    /// Local-cost multipliers for the three transitions (observation step,
    /// candidate step, diagonal). The zero weights on the two single-axis
    /// transitions are deliberate: only the diagonal pays local cost, at
    /// half rate.
    pub step_weights: Vec3,
}

impl Default for DtwParams {
    fn default() -> Self {
        Self {
            path_cost_threshold: 8.0,
            frame_distance_threshold: 30.0,
            horizontal_movement_threshold: 10,
            vertical_movement_threshold: 10,
            step_weights: Vec3::new(0.0, 0.0, 0.5),
        }
    }
}

/// Distance between two hands: summed euclidean distance of the five finger
/// positions. Missing slots carry the same sentinel on both sides and
/// contribute zero against each other.
pub fn hand_distance(a: &Hand, b: &Hand) -> f64 {
    a.fingers
        .iter()
        .zip(b.fingers.iter())
        .map(|(fa, fb)| (fa.position - fb.position).length())
        .sum()
}

/// Picks the stored gesture whose final frame sits closest to the
/// observation's final frame, provided it is close enough to bother warping.
pub fn closest_candidate<'a>(
    library: &'a [Gesture],
    observed: &Gesture,
    params: &DtwParams,
) -> Option<&'a Gesture> {
    let last = observed.frames.last()?;

    let mut best: Option<(&Gesture, f64)> = None;
    for gesture in library {
        let Some(candidate_last) = gesture.frames.last() else {
            continue;
        };
        let distance = hand_distance(last, candidate_last);
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((gesture, distance));
        }
    }

    match best {
        Some((gesture, distance)) if distance < params.frame_distance_threshold => Some(gesture),
        _ => None,
    }
}

/// Accumulated-cost DTW with backtracking. Returns the mean warping-path
/// cost, or None when either sequence is empty or the path diverged (too
/// long a run along a single axis).
pub fn mean_path_cost(
    observed: &Gesture,
    candidate: &Gesture,
    params: &DtwParams,
) -> Option<f64> {
    let n = observed.frames.len();
    let m = candidate.frames.len();
    if n == 0 || m == 0 {
        return None;
    }

    let mut local = Array2::<f64>::zeros((n, m));
    for i in 0..n {
        for j in 0..m {
            local[[i, j]] = hand_distance(&observed.frames[i], &candidate.frames[j]);
        }
    }

    let w = params.step_weights;
    let mut acc = Array2::<f64>::zeros((n, m));
    for j in 1..m {
        acc[[0, j]] = local[[0, j]] + acc[[0, j - 1]];
    }
    for i in 1..n {
        acc[[i, 0]] = local[[i, 0]] + acc[[i - 1, 0]];
    }
    for i in 1..n {
        for j in 1..m {
            let d = local[[i, j]];
            let observation_step = w.x * d + acc[[i - 1, j]];
            let candidate_step = w.y * d + acc[[i, j - 1]];
            let diagonal = w.z * d + acc[[i - 1, j - 1]];
            acc[[i, j]] = observation_step.min(candidate_step).min(diagonal);
        }
    }

    backtrack(&acc, params).map(|total| total / n as f64)
}

/// Walks the accumulated matrix from the far corner back to the origin,
/// summing the cost of every cell stepped onto. Diagonal steps win ties,
/// then candidate-axis steps, then observation-axis steps.
fn backtrack(acc: &Array2<f64>, params: &DtwParams) -> Option<f64> {
    let (n, m) = acc.dim();
    let mut i = n - 1;
    let mut j = m - 1;
    let mut total = 0.0;
    let mut run_candidate = 0usize;
    let mut run_observation = 0usize;

    while i > 0 || j > 0 {
        let diagonal = if i > 0 && j > 0 {
            acc[[i - 1, j - 1]]
        } else {
            f64::INFINITY
        };
        let candidate_step = if j > 0 { acc[[i, j - 1]] } else { f64::INFINITY };
        let observation_step = if i > 0 { acc[[i - 1, j]] } else { f64::INFINITY };

        if diagonal <= candidate_step && diagonal <= observation_step {
            total += diagonal;
            i -= 1;
            j -= 1;
            run_candidate = 0;
            run_observation = 0;
        } else if candidate_step <= diagonal && candidate_step <= observation_step {
            total += candidate_step;
            j -= 1;
            run_candidate += 1;
            if run_candidate > params.horizontal_movement_threshold {
                return None;
            }
        } else {
            total += observation_step;
            i -= 1;
            run_observation += 1;
            if run_observation > params.vertical_movement_threshold {
                return None;
            }
        }
    }

    Some(total)
}
