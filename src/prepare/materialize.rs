//! Writing a partition into the `images/<split>` + `labels/<split>` layout.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::pairing::DatasetItem;
use super::report::{SplitSummary, TransferFailure};
use crate::split::{Partition, SplitName};

/// How files reach the output tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMode {
    /// Leave the sources in place.
    #[default]
    Copy,
    /// Remove the sources once transferred.
    Move,
}

impl TransferMode {
    pub fn from_move_flag(move_files: bool) -> Self {
        if move_files {
            TransferMode::Move
        } else {
            TransferMode::Copy
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TransferMode::Copy => "copy",
            TransferMode::Move => "move",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferOutcome {
    Transferred,
    /// Move mode only: the source is gone and the destination already exists,
    /// as left behind by an earlier run.
    AlreadyPresent,
}

/// Copy or move a single file.
pub fn transfer_file(src: &Path, dest: &Path, mode: TransferMode) -> io::Result<TransferOutcome> {
    match mode {
        TransferMode::Copy => {
            fs::copy(src, dest)?;
            Ok(TransferOutcome::Transferred)
        }
        TransferMode::Move => {
            if !src.exists() && dest.is_file() {
                return Ok(TransferOutcome::AlreadyPresent);
            }
            move_file(src, dest)?;
            Ok(TransferOutcome::Transferred)
        }
    }
}

/// Rename, falling back to copy + remove when the rename fails (for example
/// across filesystems).
fn move_file(src: &Path, dest: &Path) -> io::Result<()> {
    let Err(rename_err) = fs::rename(src, dest) else {
        return Ok(());
    };
    debug!(
        "rename {} -> {} failed ({}); falling back to copy",
        src.display(),
        dest.display(),
        rename_err
    );

    fs::copy(src, dest)?;
    if let Err(err) = fs::remove_file(src) {
        let _ = fs::remove_file(dest);
        return Err(err);
    }
    Ok(())
}

/// Materialize every non-empty split, continuing past per-file failures.
pub(crate) fn materialize_partition(
    partition: &Partition<DatasetItem>,
    output_images: &Path,
    output_labels: &Path,
    mode: TransferMode,
) -> (Vec<SplitSummary>, Vec<TransferFailure>) {
    let mut summaries = Vec::with_capacity(SplitName::ALL.len());
    let mut failures = Vec::new();

    for (split, items) in partition.iter() {
        let summary = materialize_split(split, items, output_images, output_labels, mode, &mut failures);
        summaries.push(summary);
    }

    (summaries, failures)
}

fn materialize_split(
    split: SplitName,
    items: &[DatasetItem],
    output_images: &Path,
    output_labels: &Path,
    mode: TransferMode,
    failures: &mut Vec<TransferFailure>,
) -> SplitSummary {
    let mut summary = SplitSummary::new(split, items.len());
    if items.is_empty() {
        info!("No data for split: {}.", split);
        return summary;
    }

    let split_img_dir = output_images.join(split.as_str());
    let split_lbl_dir = output_labels.join(split.as_str());
    for dir in [&split_img_dir, &split_lbl_dir] {
        if let Err(err) = fs::create_dir_all(dir) {
            error!("Failed to create {}: {}", dir.display(), err);
            failures.push(TransferFailure::new(split, dir, dir, &err));
            summary.failed = items.len();
            return summary;
        }
    }

    for item in items {
        match transfer_item(item, &split_img_dir, &split_lbl_dir, mode) {
            Ok(()) => summary.transferred += 1,
            Err(failure) => {
                error!(
                    "Failed to {} {} -> {}: {}",
                    mode.name(),
                    failure.source.display(),
                    failure.destination.display(),
                    failure.message
                );
                failures.push(failure.into_failure(split));
                summary.failed += 1;
            }
        }
    }

    info!(
        "Prepared {} items for '{}' split at {} and {}.",
        summary.transferred,
        split,
        split_img_dir.display(),
        split_lbl_dir.display()
    );
    summary
}

struct ItemFailure {
    source: PathBuf,
    destination: PathBuf,
    message: String,
}

impl ItemFailure {
    fn into_failure(self, split: SplitName) -> TransferFailure {
        TransferFailure {
            split,
            source: self.source,
            destination: self.destination,
            message: self.message,
        }
    }
}

/// Image first; a failed image leaves its label untouched so that no split
/// gains a label without its image.
///
/// In move mode a failed label puts a just-moved image back into the source
/// directory, so the pair stays together and a rerun picks it up again.
fn transfer_item(
    item: &DatasetItem,
    img_dir: &Path,
    lbl_dir: &Path,
    mode: TransferMode,
) -> Result<(), ItemFailure> {
    let image_dest = img_dir.join(item.image.file_name().unwrap_or_default());
    let image_outcome = transfer_one(&item.image, &image_dest, mode)?;

    let label_dest = lbl_dir.join(item.label.file_name().unwrap_or_default());
    let Err(mut failure) = transfer_one(&item.label, &label_dest, mode) else {
        return Ok(());
    };

    if mode == TransferMode::Move && image_outcome == TransferOutcome::Transferred {
        match move_file(&image_dest, &item.image) {
            Ok(()) => debug!(
                "moved {} back to {}",
                image_dest.display(),
                item.image.display()
            ),
            Err(err) => {
                error!(
                    "Failed to restore {} to {}: {}",
                    image_dest.display(),
                    item.image.display(),
                    err
                );
                failure.message = format!(
                    "{}; image left at {} ({})",
                    failure.message,
                    image_dest.display(),
                    err
                );
            }
        }
    }
    Err(failure)
}

fn transfer_one(src: &Path, dest: &Path, mode: TransferMode) -> Result<TransferOutcome, ItemFailure> {
    match transfer_file(src, dest, mode) {
        Ok(TransferOutcome::AlreadyPresent) => {
            debug!("{} already at {}", src.display(), dest.display());
            Ok(TransferOutcome::AlreadyPresent)
        }
        Ok(outcome) => Ok(outcome),
        Err(err) => Err(ItemFailure {
            source: src.to_path_buf(),
            destination: dest.to_path_buf(),
            message: err.to_string(),
        }),
    }
}
