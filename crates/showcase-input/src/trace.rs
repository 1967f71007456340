use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use showcase_sound::OrientationSample;

/// Recorded accelerometer readings, stored as a JSON array of
/// `{"x": .., "y": .., "z": ..}` objects (`x` may be omitted).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorTrace {
    samples: Vec<OrientationSample>,
}

impl SensorTrace {
    pub fn new(samples: Vec<OrientationSample>) -> Self {
        Self { samples }
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read sensor trace: {}", path.display()))?;
        let trace: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse sensor trace: {}", path.display()))?;
        Ok(trace)
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn samples(&self) -> &[OrientationSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl From<Vec<OrientationSample>> for SensorTrace {
    fn from(samples: Vec<OrientationSample>) -> Self {
        Self::new(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_array_without_x() {
        let trace: SensorTrace =
            serde_json::from_str(r#"[{"y": 0.0, "z": 0.0}, {"x": 1.0, "y": 0.3, "z": 0.3}]"#)
                .unwrap();
        assert_eq!(
            trace.samples(),
            &[
                OrientationSample::yz(0.0, 0.0),
                OrientationSample::new(1.0, 0.3, 0.3)
            ]
        );
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.json");
        let trace = SensorTrace::new(vec![
            OrientationSample::yz(0.0, 0.0),
            OrientationSample::yz(-0.5, -0.5),
        ]);
        trace.save_to(&path).unwrap();
        assert_eq!(SensorTrace::load_from(&path).unwrap(), trace);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SensorTrace::load_from(dir.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read sensor trace"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"y": 1}"#).unwrap();
        assert!(SensorTrace::load_from(&path).is_err());
    }
}
