//! JSON configuration of the `mask_rank` tool.
//!
//! ```json
//! {
//!   "detections": "detections.json",
//!   "saliency": "saliency.json",
//!   "params": { "gridDim": 8, "threshold": 0.6, "minScore": 0.0 },
//!   "output": { "jsonOut": "out/report.json", "overlayOut": "out/overlay.png", "format": "both" }
//! }
//! ```
//!
//! Relative paths are resolved against the directory holding the config.
use crate::error::{Error, Result};
use crate::image::io::read_json_file;
use crate::ranker::RankerParams;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Both,
}

impl OutputFormat {
    pub fn includes_text(self) -> bool {
        matches!(self, OutputFormat::Text | OutputFormat::Both)
    }

    pub fn includes_json(self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Both)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OutputConfig {
    pub json_out: Option<PathBuf>,
    pub overlay_out: Option<PathBuf>,
    pub format: OutputFormat,
}

impl OutputConfig {
    /// File the JSON report goes to; `jsonOut` only counts when the format
    /// includes JSON.
    pub fn json_file(&self) -> Option<&Path> {
        self.json_out
            .as_deref()
            .filter(|_| self.format.includes_json())
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    /// Detection manifest written by the instance segmentation service.
    pub detections: PathBuf,
    /// Saliency ranking written by the saliency service.
    pub saliency: PathBuf,
    /// Optional source image; when present its size is checked against the
    /// detections.
    #[serde(default)]
    pub image: Option<PathBuf>,
    #[serde(default)]
    pub params: RankerParams,
    #[serde(default)]
    pub output: OutputConfig,
}

impl RuntimeConfig {
    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.detections);
        resolve(&mut self.saliency);
        if let Some(p) = self.image.as_mut() {
            resolve(p);
        }
        if let Some(p) = self.output.json_out.as_mut() {
            resolve(p);
        }
        if let Some(p) = self.output.overlay_out.as_mut() {
            resolve(p);
        }
    }
}

pub fn load_config(path: &Path) -> Result<RuntimeConfig> {
    let mut config: RuntimeConfig = read_json_file(path)?;
    config.params.attribution.validate()?;
    if !config.params.min_score.is_finite() {
        return Err(Error::Config(format!(
            "minScore must be finite in {}",
            path.display()
        )));
    }
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    config.resolve_paths(base);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_and_relative_paths() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("rank.json");
        fs::write(
            &path,
            r#"{"detections": "d.json", "saliency": "/abs/s.json", "output": {"jsonOut": "out/r.json"}}"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.detections, dir.path().join("d.json"));
        assert_eq!(config.saliency, PathBuf::from("/abs/s.json"));
        assert_eq!(config.output.json_out, Some(dir.path().join("out/r.json")));
        assert_eq!(config.output.format, OutputFormat::Text);
        assert_eq!(config.output.json_file(), None);
        assert_eq!(config.params.attribution.grid_dim, 8);
        assert_eq!(config.params.attribution.threshold, 0.6);
        assert_eq!(config.params.min_score, 0.0);
    }

    #[test]
    fn flattened_params_and_validation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("rank.json");
        fs::write(
            &path,
            r#"{"detections": "d.json", "saliency": "s.json",
                "params": {"gridDim": 4, "threshold": 0.25, "minScore": 0.5},
                "output": {"format": "both"}}"#,
        )
        .unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.params.attribution.grid_dim, 4);
        assert_eq!(config.params.attribution.threshold, 0.25);
        assert_eq!(config.params.min_score, 0.5);
        assert!(config.output.format.includes_json() && config.output.format.includes_text());
        assert_eq!(config.output.json_file(), None);

        fs::write(
            &path,
            r#"{"detections": "d.json", "saliency": "s.json", "params": {"threshold": 2.0}}"#,
        )
        .unwrap();
        assert!(matches!(load_config(&path), Err(Error::Config(_))));
    }

    #[test]
    fn json_file_follows_output_format() {
        let mut output = OutputConfig {
            json_out: Some(PathBuf::from("r.json")),
            ..Default::default()
        };
        assert_eq!(output.json_file(), None);
        output.format = OutputFormat::Json;
        assert_eq!(output.json_file(), Some(Path::new("r.json")));
        output.format = OutputFormat::Both;
        assert_eq!(output.json_file(), Some(Path::new("r.json")));
    }
}
