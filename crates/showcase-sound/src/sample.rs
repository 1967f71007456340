use serde::{Deserialize, Serialize};

/// One accelerometer reading.
///
/// Only `y` and `z` participate in the volume mapping; `x` is carried so
/// recorded traces stay complete.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OrientationSample {
    #[serde(default)]
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl OrientationSample {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Sample with only the axes the mapping reads.
    pub fn yz(y: f32, z: f32) -> Self {
        Self { x: 0.0, y, z }
    }
}

/// Reference orientation captured from the first sample of a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    y: f32,
    z: f32,
}

impl Baseline {
    pub fn capture(sample: &OrientationSample) -> Self {
        Self {
            y: sample.y,
            z: sample.z,
        }
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn z(&self) -> f32 {
        self.z
    }

    /// Signed tilt away from the baseline. Tilting so that `y` and `z`
    /// grow is positive.
    pub fn deviation(&self, sample: &OrientationSample) -> f32 {
        let delta_y = self.y - sample.y;
        let delta_z = self.z - sample.z;
        -(delta_y + delta_z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deviation_of_baseline_sample_is_zero() {
        let sample = OrientationSample::new(0.4, -0.2, 9.7);
        let baseline = Baseline::capture(&sample);
        assert_eq!(baseline.deviation(&sample), 0.0);
    }

    #[test]
    fn deviation_sign_follows_tilt() {
        let baseline = Baseline::capture(&OrientationSample::yz(0.0, 0.0));
        assert!((baseline.deviation(&OrientationSample::yz(-0.5, -0.5)) + 1.0).abs() < 1e-6);
        assert!((baseline.deviation(&OrientationSample::yz(0.3, 0.3)) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn x_is_optional_when_deserializing() {
        let sample: OrientationSample = serde_json::from_str(r#"{"y":0.5,"z":-1.0}"#).unwrap();
        assert_eq!(sample, OrientationSample::yz(0.5, -1.0));
    }
}
