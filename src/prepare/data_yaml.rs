//! Ultralytics `data.yaml` descriptor for a prepared dataset.

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::PrepError;
use crate::split::SplitName;

/// Training descriptor pointing at the split image directories.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DataYaml {
    pub train: String,
    pub val: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<String>,
    pub nc: usize,
    pub names: Vec<String>,
}

impl DataYaml {
    /// Descriptor for `<output_images>/{train,val[,test]}`. Directories that
    /// exist are written as absolute paths.
    pub fn for_layout(output_images: &Path, names: Vec<String>, include_test: bool) -> Self {
        let dir = |split: SplitName| {
            let path = output_images.join(split.as_str());
            fs::canonicalize(&path)
                .unwrap_or(path)
                .to_string_lossy()
                .into_owned()
        };

        Self {
            train: dir(SplitName::Train),
            val: dir(SplitName::Val),
            test: include_test.then(|| dir(SplitName::Test)),
            nc: names.len(),
            names,
        }
    }
}

pub fn write_data_yaml(path: &Path, descriptor: &DataYaml) -> Result<(), PrepError> {
    let yaml = serde_yaml::to_string(descriptor).map_err(|source| PrepError::DataYamlWrite {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, yaml)?;
    info!("data.yaml created at: {}", path.display());
    Ok(())
}
