//! Image/label discovery.
//!
//! Images are the regular files directly under the source images directory.
//! An image pairs with `<labels_dir>/<stem>.txt`; images without that label
//! are reported and never enter a split. A label pairs with at most one
//! image: the first by file name wins and later images sharing its stem are
//! reported as duplicates.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::PrepError;

pub const LABEL_EXTENSION: &str = "txt";

/// An image and the label file that shares its stem.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DatasetItem {
    pub image: PathBuf,
    pub label: PathBuf,
}

impl DatasetItem {
    /// Base identifier shared by the image and the label.
    pub fn stem(&self) -> String {
        self.image
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Result of matching images against the labels directory.
#[derive(Clone, Debug, Default)]
pub struct Pairing {
    pub items: Vec<DatasetItem>,
    /// Images skipped because no label file exists.
    pub missing_labels: Vec<PathBuf>,
    /// Images skipped because an earlier image already claimed their label.
    pub duplicate_stems: Vec<PathBuf>,
}

/// List image files directly under `dir`, sorted by file name.
///
/// An empty `extensions` list accepts every regular file; otherwise the
/// extension must match one entry, ignoring ASCII case.
pub fn collect_images(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>, PrepError> {
    if !dir.is_dir() {
        return Err(PrepError::SourceDirMissing {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| PrepError::Io(source.into()))?;
        if entry.file_type().is_file() && extension_allowed(entry.path(), extensions) {
            files.push(entry.into_path());
        }
    }

    debug!(count = files.len(), dir = %dir.display(), "collected image files");
    Ok(files)
}

/// Pair each image with its label, keeping image order.
pub fn pair_with_labels(images: Vec<PathBuf>, labels_dir: &Path) -> Pairing {
    let mut pairing = Pairing::default();
    let mut claimed = HashSet::new();

    for image in images {
        let label = label_path_for(&image, labels_dir);
        if label.is_file() {
            if !claimed.insert(label.clone()) {
                warn!(
                    "Label {} already paired; skipping image {}.",
                    label.display(),
                    image.file_name().unwrap_or_default().to_string_lossy()
                );
                pairing.duplicate_stems.push(image);
                continue;
            }
            pairing.items.push(DatasetItem { image, label });
        } else {
            warn!(
                "Missing label for image {}; skipping.",
                image.file_name().unwrap_or_default().to_string_lossy()
            );
            pairing.missing_labels.push(image);
        }
    }

    pairing
}

/// `<labels_dir>/<image stem>.txt`
pub fn label_path_for(image: &Path, labels_dir: &Path) -> PathBuf {
    let stem = image.file_stem().unwrap_or_default();
    let mut name = stem.to_os_string();
    name.push(".");
    name.push(LABEL_EXTENSION);
    labels_dir.join(name)
}

fn extension_allowed(path: &Path, allowed: &[String]) -> bool {
    if allowed.is_empty() {
        return true;
    }

    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    allowed
        .iter()
        .map(|allowed_ext| allowed_ext.trim_start_matches('.'))
        .any(|allowed_ext| ext.eq_ignore_ascii_case(allowed_ext))
}
