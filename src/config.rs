//! Run configuration.
//!
//! A single [`PrepConfig`] value is built once at startup (from an optional
//! YAML file, then CLI overrides) and handed to the commands; nothing reads
//! process-wide settings after that.
//!
//! ```yaml
//! source_images: datasets/images
//! source_labels: datasets/labels
//! output_root: datasets/ultralytics
//! train_ratio: 0.7
//! val_ratio: 0.2
//! seed: 42
//! move_files: false
//! class_names: [CCTV, CCTV-SIGNS]
//! data_yaml: data.yaml
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::convert::DEFAULT_CONVERTER_PROGRAM;
use crate::error::PrepError;
use crate::prepare::{PrepareRequest, TransferMode};
use crate::split::DEFAULT_SEED;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrepConfig {
    pub source_images: PathBuf,
    pub source_labels: PathBuf,
    /// Receives `images/{train,val,test}` and `labels/{train,val,test}`.
    pub output_root: PathBuf,
    pub train_ratio: f64,
    pub val_ratio: f64,
    pub seed: u64,
    pub move_files: bool,
    /// Empty accepts every file in `source_images`.
    pub image_extensions: Vec<String>,
    pub class_names: Vec<String>,
    /// Where to write the training descriptor, if anywhere.
    pub data_yaml: Option<PathBuf>,
    /// Folder of HEIC originals to convert into `source_images` first.
    pub heic_input: Option<PathBuf>,
    pub converter_program: String,
    pub camera_csv: Option<PathBuf>,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            source_images: PathBuf::from("datasets/images"),
            source_labels: PathBuf::from("datasets/labels"),
            output_root: PathBuf::from("datasets/ultralytics"),
            train_ratio: 0.7,
            val_ratio: 0.2,
            seed: DEFAULT_SEED,
            move_files: false,
            image_extensions: Vec::new(),
            class_names: vec!["CCTV".to_string(), "CCTV-SIGNS".to_string()],
            data_yaml: None,
            heic_input: None,
            converter_program: DEFAULT_CONVERTER_PROGRAM.to_string(),
            camera_csv: None,
        }
    }
}

impl PrepConfig {
    pub fn load(path: &Path) -> Result<Self, PrepError> {
        let data = fs::read_to_string(path).map_err(PrepError::Io)?;
        Self::from_yaml_str(&data, path)
    }

    /// Parse YAML; `path` is used for errors only.
    pub fn from_yaml_str(data: &str, path: &Path) -> Result<Self, PrepError> {
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(data).map_err(|source| PrepError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn transfer_mode(&self) -> TransferMode {
        TransferMode::from_move_flag(self.move_files)
    }

    pub fn prepare_request(&self) -> PrepareRequest {
        PrepareRequest::new(&self.source_images, &self.source_labels, &self.output_root)
            .with_ratios(self.train_ratio, self.val_ratio)
            .with_mode(self.transfer_mode())
            .with_image_extensions(self.image_extensions.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_form_a_valid_split() {
        let config = PrepConfig::default();
        assert!(crate::split::SplitRatios::new(config.train_ratio, config.val_ratio).is_ok());
        assert_eq!(config.seed, 42);
        assert_eq!(config.transfer_mode(), TransferMode::Copy);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = PrepConfig::from_yaml_str(
            "train_ratio: 0.8\nval_ratio: 0.1\nmove_files: true\nclass_names: [car]\n",
            Path::new("cfg.yaml"),
        )
        .expect("parse");

        assert_eq!(config.train_ratio, 0.8);
        assert_eq!(config.val_ratio, 0.1);
        assert_eq!(config.class_names, vec!["car"]);
        assert_eq!(config.source_images, PathBuf::from("datasets/images"));

        let request = config.prepare_request();
        assert_eq!(request.mode, TransferMode::Move);
        assert_eq!(request.output_images, PathBuf::from("datasets/ultralytics/images"));
    }

    #[test]
    fn empty_file_is_default() {
        let config = PrepConfig::from_yaml_str("  \n", Path::new("cfg.yaml")).expect("parse");
        assert_eq!(config, PrepConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = PrepConfig::from_yaml_str("batch_size: 4\n", Path::new("cfg.yaml")).unwrap_err();
        assert!(matches!(err, PrepError::ConfigParse { .. }));
    }
}
