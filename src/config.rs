use crate::error::EngineError;
use crate::pipeline::consistency::ConsistencyParams;
use crate::pipeline::contour::ContourParams;
use crate::pipeline::curvature::CurveParams;
use crate::pipeline::fingertips::FingerParams;
use crate::pipeline::range_mask::DepthWindow;
use crate::recognizer::dtw::DtwParams;
use crate::recognizer::stream::DEFAULT_STREAM_CAPACITY;

/// Everything the pipeline can be tuned with, with working defaults for a
/// hand at roughly one to three metres from the sensor.
#[derive(Clone, Copy, Debug)]
pub struct EngineOptions {
    pub depth_window: DepthWindow,
    pub smoothing_enabled: bool,
    pub smoothing_factor: f64,
    pub prevent_hand_inconsistencies: bool,
    pub contour: ContourParams,
    pub curve: CurveParams,
    pub fingers: FingerParams,
    pub consistency: ConsistencyParams,
    pub dtw: DtwParams,
    pub stream_capacity: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            depth_window: DepthWindow::default(),
            smoothing_enabled: true,
            smoothing_factor: 0.5,
            prevent_hand_inconsistencies: true,
            contour: ContourParams::default(),
            curve: CurveParams::default(),
            fingers: FingerParams::default(),
            consistency: ConsistencyParams::default(),
            dtw: DtwParams::default(),
            stream_capacity: DEFAULT_STREAM_CAPACITY,
        }
    }
}

impl EngineOptions {
    /// Fail-fast validation at the engine boundary, so a bad option never
    /// surfaces as a mid-frame failure.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.depth_window.validate()?;
        self.contour.validate()?;
        if self.smoothing_factor <= 0.0 || self.smoothing_factor >= 1.0 {
            return Err(EngineError::InvalidParameter(
                "smoothing factor must be inside (0, 1)",
            ));
        }
        if self.consistency.prediction_weight <= 0.0 || self.consistency.prediction_weight >= 1.0
        {
            return Err(EngineError::InvalidParameter(
                "prediction weight must be inside (0, 1)",
            ));
        }
        if self.curve.k == 0 {
            return Err(EngineError::InvalidParameter(
                "curvature step k must be positive",
            ));
        }
        if self.curve.min_angle_deg > self.curve.max_angle_deg {
            return Err(EngineError::InvalidParameter(
                "curvature angle window is inverted",
            ));
        }
        if self.stream_capacity == 0 {
            return Err(EngineError::InvalidParameter(
                "stream capacity must be positive",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineOptions::default().validate().is_ok());
    }

    #[test]
    fn out_of_range_factors_are_rejected() {
        let mut options = EngineOptions::default();
        options.smoothing_factor = 1.0;
        assert!(options.validate().is_err());

        let mut options = EngineOptions::default();
        options.consistency.prediction_weight = 0.0;
        assert!(options.validate().is_err());

        let mut options = EngineOptions::default();
        options.curve.k = 0;
        assert!(options.validate().is_err());

        let mut options = EngineOptions::default();
        options.depth_window.min_mm = 5000;
        assert!(options.validate().is_err());
    }

    #[test]
    fn simultaneous_start_scans_are_rejected() {
        let mut options = EngineOptions::default();
        options.contour.scan_from_right = true;
        assert!(options.validate().is_err());

        options.contour.scan_from_left = false;
        assert!(options.validate().is_ok());
    }
}
