use crate::types::CurvePoint;
use crate::vector::Vec3;

#[derive(Clone, Copy, Debug)]
pub struct CurveParams {
    /// How many contour steps the two chord vectors span.
    pub k: usize,
    /// Angle window in degrees; only angles inside it qualify as curvature
    /// peaks.
    pub min_angle_deg: f64,
    pub max_angle_deg: f64,
}

impl Default for CurveParams {
    fn default() -> Self {
        Self {
            k: 20,
            min_angle_deg: 25.0,
            max_angle_deg: 55.0,
        }
    }
}

/// k-curvature over the contour: for every point, the angle between the
/// chords to the points `k` steps behind and ahead. Points whose angle falls
/// inside the window come out as curvature peaks.
///
/// The contour may or may not be a closed loop. When its endpoints sit close
/// enough to be one (within k+1 pixels per axis), the chord indices wrap
/// around; otherwise they clamp to the first/last point.
pub fn detect_curves(contour: &[Vec3], params: &CurveParams) -> Vec<CurvePoint> {
    let len = contour.len();
    if len == 0 || params.k == 0 {
        return Vec::new();
    }

    let min_angle = params.min_angle_deg.to_radians();
    let max_angle = params.max_angle_deg.to_radians();
    let k = params.k;

    let closed = endpoints_adjacent(contour, k);
    let mut curves = Vec::new();

    for i in 0..len {
        let behind = if i >= k {
            i - k
        } else if closed {
            (i + len - (k % len)) % len
        } else {
            0
        };
        let ahead = if i + k < len {
            i + k
        } else if closed {
            (i + k) % len
        } else {
            len - 1
        };

        let seg_a = contour[behind] - contour[i];
        let seg_b = contour[ahead] - contour[i];

        // A clamped chord can collapse to zero length; theta is then NaN and
        // the window comparison rejects the point.
        let angle = Vec3::theta(&seg_a, &seg_b);
        if angle >= min_angle && angle <= max_angle {
            curves.push(CurvePoint {
                point: contour[i],
                seg_a,
                seg_b,
                seg_c: seg_b - seg_a,
            });
        }
    }

    curves
}

fn endpoints_adjacent(contour: &[Vec3], k: usize) -> bool {
    let first = contour[0];
    let last = contour[contour.len() - 1];
    let limit = (k + 1) as f64;
    (first.x - last.x).abs() <= limit && (first.y - last.y).abs() <= limit
}
