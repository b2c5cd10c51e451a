use rayon::prelude::*;

use crate::error::EngineError;
use crate::types::Pixel;

/// Depth window in millimetres. A distance qualifies only strictly inside
/// the window: a reading equal to either bound is out of range.
#[derive(Clone, Copy, Debug)]
pub struct DepthWindow {
    pub min_mm: i16,
    pub max_mm: i16,
}

impl Default for DepthWindow {
    fn default() -> Self {
        Self {
            min_mm: 800,
            max_mm: 4000,
        }
    }
}

impl DepthWindow {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.min_mm >= self.max_mm {
            return Err(EngineError::InvalidParameter(
                "depth window min must be below max",
            ));
        }
        Ok(())
    }
}

/// Thresholds a raw depth buffer into the per-pixel mask the contour tracker
/// walks. Element-wise and order-free, so the map runs in parallel.
pub fn mask(
    distances: &[i16],
    width: u32,
    height: u32,
    window: DepthWindow,
) -> Result<Vec<Pixel>, EngineError> {
    if width == 0 || height == 0 {
        return Err(EngineError::InvalidParameter(
            "frame dimensions must be non-zero",
        ));
    }
    window.validate()?;

    let expected = (width as usize).saturating_mul(height as usize);
    if distances.len() != expected {
        return Err(EngineError::DimensionMismatch {
            got: distances.len(),
            expected,
        });
    }

    Ok(distances
        .par_iter()
        .map(|&d| {
            if window.min_mm < d && d < window.max_mm {
                Pixel::InRange
            } else {
                Pixel::OutOfRange
            }
        })
        .collect())
}

/// Bounds-checked view over a frame's mask. Reads outside the image answer
/// `OutOfRange`, which lets the tracker and the fingertip probe treat the
/// frame border as the outside of the hand.
#[derive(Clone, Copy)]
pub struct MaskView<'a> {
    pixels: &'a [Pixel],
    width: i32,
    height: i32,
}

impl<'a> MaskView<'a> {
    pub fn new(pixels: &'a [Pixel], width: u32, height: u32) -> Self {
        Self {
            pixels,
            width: width as i32,
            height: height as i32,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn at(&self, x: i32, y: i32) -> Pixel {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return Pixel::OutOfRange;
        }
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn in_range(&self, x: i32, y: i32) -> bool {
        self.at(x, y) == Pixel::InRange
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_strict_on_both_ends() {
        let distances = [799, 800, 801, 3999, 4000, 4001];
        let window = DepthWindow {
            min_mm: 800,
            max_mm: 4000,
        };
        let mask = mask(&distances, 6, 1, window).unwrap();
        assert_eq!(
            mask,
            vec![
                Pixel::OutOfRange,
                Pixel::OutOfRange,
                Pixel::InRange,
                Pixel::InRange,
                Pixel::OutOfRange,
                Pixel::OutOfRange,
            ]
        );
    }

    #[test]
    fn mask_never_emits_undefined() {
        let distances: Vec<i16> = (0..100).map(|i| (i * 50) as i16).collect();
        let mask = mask(&distances, 10, 10, DepthWindow::default()).unwrap();
        assert!(mask.iter().all(|p| *p != Pixel::Undefined));
    }

    #[test]
    fn rejects_mismatched_buffer() {
        let err = mask(&[0i16; 9], 4, 4, DepthWindow::default()).unwrap_err();
        match err {
            EngineError::DimensionMismatch { got, expected } => {
                assert_eq!(got, 9);
                assert_eq!(expected, 16);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_zero_dimensions_and_inverted_window() {
        assert!(mask(&[], 0, 4, DepthWindow::default()).is_err());
        let inverted = DepthWindow {
            min_mm: 4000,
            max_mm: 800,
        };
        assert!(mask(&[0i16; 16], 4, 4, inverted).is_err());
    }

    #[test]
    fn view_reads_outside_image_as_out_of_range() {
        let pixels = vec![Pixel::InRange; 4];
        let view = MaskView::new(&pixels, 2, 2);
        assert!(view.in_range(0, 0));
        assert!(view.in_range(1, 1));
        assert!(!view.in_range(-1, 0));
        assert!(!view.in_range(0, 2));
        assert_eq!(view.at(5, 5), Pixel::OutOfRange);
    }

    #[test]
    fn undefined_pixels_read_as_not_in_range() {
        let pixels = vec![Pixel::Undefined; 4];
        let view = MaskView::new(&pixels, 2, 2);
        assert!(!view.in_range(0, 0));
    }
}
