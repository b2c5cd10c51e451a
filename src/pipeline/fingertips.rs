use crate::pipeline::range_mask::MaskView;
use crate::types::{CurvePoint, Fingertip};
use crate::vector::Vec3;

/// Two curve points this close (per axis) belong to the same peak.
const CONTINUATION_LIMIT: f64 = 5.0;

/// How far along the bisector the inside/outside probe is cast.
const PROBE_DISTANCE: f64 = 25.0;

#[derive(Clone, Copy, Debug)]
pub struct FingerParams {
    /// Peaks made of fewer curve points than this are ignored.
    pub min_pixels_per_segment: usize,
}

impl Default for FingerParams {
    fn default() -> Self {
        Self {
            min_pixels_per_segment: 0,
        }
    }
}

/// Groups curvature peaks into runs and keeps the ones whose midpoint
/// bisector leaves the in-range region: a peak that points out of the hand
/// is a fingertip, one that points into it is the valley between fingers.
pub fn recognize_fingertips(
    curves: &[CurvePoint],
    mask: &MaskView,
    params: &FingerParams,
) -> Vec<Fingertip> {
    if curves.is_empty() {
        return Vec::new();
    }

    let rotated = rotate_for_wrap(curves);
    let mut fingertips = Vec::new();

    let mut run_start = 0;
    for i in 1..=rotated.len() {
        let run_continues =
            i < rotated.len() && is_continuation(&rotated[i - 1].point, &rotated[i].point);
        if run_continues {
            continue;
        }
        let run = &rotated[run_start..i];
        run_start = i;
        if run.len() < params.min_pixels_per_segment {
            continue;
        }
        let midpoint = &run[run.len() / 2];
        if let Some(tip) = classify_midpoint(midpoint, mask) {
            fingertips.push(tip);
        }
    }

    fingertips
}

/// A peak can straddle the contour's seam: its tail at the end of the list,
/// its head at the front. Rotate the list so such a run is contiguous and
/// the first element is its start.
fn rotate_for_wrap(curves: &[CurvePoint]) -> Vec<CurvePoint> {
    let mut rotated = curves.to_vec();
    let len = rotated.len();
    if len < 2 || !is_continuation(&rotated[len - 1].point, &rotated[0].point) {
        return rotated;
    }

    let mut seam = len - 1;
    while seam > 0 && is_continuation(&rotated[seam - 1].point, &rotated[seam].point) {
        seam -= 1;
    }
    // The whole list is one loop of continuations; any rotation is as good
    // as another.
    if seam == 0 {
        return rotated;
    }
    rotated.rotate_left(seam);
    rotated
}

fn is_continuation(a: &Vec3, b: &Vec3) -> bool {
    (a.x - b.x).abs() < CONTINUATION_LIMIT && (a.y - b.y).abs() < CONTINUATION_LIMIT
}

fn classify_midpoint(cp: &CurvePoint, mask: &MaskView) -> Option<Fingertip> {
    let bisect = Vec3::bisect(&cp.seg_a, &cp.seg_b);
    let probe = cp.point + bisect * PROBE_DISTANCE;

    // Rounding is the only float-to-pixel conversion in the pipeline.
    let px = probe.x.round() as i32;
    let py = probe.y.round() as i32;
    if mask.in_range(px, py) {
        return None;
    }

    Some(Fingertip {
        position: cp.point,
        direction: cp.seg_c * 0.5 - cp.seg_b,
        bisect: probe,
    })
}
