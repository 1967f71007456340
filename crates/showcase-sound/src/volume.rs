use crate::error::SoundError;
use crate::sample::{Baseline, OrientationSample};

/// Validated volume bounds, `0.0 <= base <= max <= 1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeRange {
    base: f32,
    max: f32,
}

impl VolumeRange {
    pub fn new(base: f32, max: f32) -> Result<Self, SoundError> {
        if !(0.0..=1.0).contains(&base) || !(0.0..=1.0).contains(&max) {
            return Err(SoundError::InvalidConfig(format!(
                "volume bounds must lie in 0.0..=1.0 (base {base}, max {max})"
            )));
        }
        if base > max {
            return Err(SoundError::InvalidConfig(format!(
                "base volume {base} exceeds max volume {max}"
            )));
        }
        Ok(Self { base, max })
    }

    pub fn base(&self) -> f32 {
        self.base
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// Clamp a raw level into the range. NaN maps to the base level.
    pub fn clamp(&self, raw: f32) -> f32 {
        if raw.is_nan() {
            return self.base;
        }
        raw.clamp(self.base, self.max)
    }

    /// Level for `sample` relative to `baseline`. No smoothing is applied.
    pub fn level_for(&self, baseline: &Baseline, sample: &OrientationSample) -> f32 {
        self.clamp(self.base + baseline.deviation(sample))
    }
}

impl Default for VolumeRange {
    fn default() -> Self {
        Self {
            base: crate::config::BASE_VOLUME,
            max: crate::config::MAX_VOLUME,
        }
    }
}

/// Per-session mapper: captures the baseline from the first sample and
/// maps every later sample to a level.
#[derive(Debug, Clone)]
pub struct TiltMapper {
    range: VolumeRange,
    baseline: Option<Baseline>,
}

impl TiltMapper {
    pub fn new(range: VolumeRange) -> Self {
        Self {
            range,
            baseline: None,
        }
    }

    /// Returns `None` for the sample that establishes the baseline.
    pub fn feed(&mut self, sample: &OrientationSample) -> Option<f32> {
        match &self.baseline {
            None => {
                self.baseline = Some(Baseline::capture(sample));
                None
            }
            Some(baseline) => Some(self.range.level_for(baseline, sample)),
        }
    }

    pub fn baseline(&self) -> Option<Baseline> {
        self.baseline
    }
}
