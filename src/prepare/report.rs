//! Preparation report types.
//!
//! A report is produced for every run that gets past input discovery, and is
//! attached to [`PrepError::MaterializeFailed`](crate::PrepError) when some
//! file operations failed, so callers always learn the exact per-split counts.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::materialize::TransferMode;
use crate::split::SplitName;

/// How far a preparation run went.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrepareOutcome {
    /// The source images directory was empty; nothing was done.
    NoImages,
    /// Pairs were split but nothing was written.
    Planned,
    /// Pairs were split and written.
    Materialized,
}

/// Summary of a dataset preparation run.
#[derive(Clone, Debug, Serialize)]
pub struct PrepareReport {
    pub outcome: PrepareOutcome,
    pub mode: TransferMode,
    pub seed: u64,
    pub source_images: PathBuf,
    pub source_labels: PathBuf,
    pub output_images: PathBuf,
    pub output_labels: PathBuf,
    /// Files found in the source images directory.
    pub images_found: usize,
    /// Image/label pairs that entered the split.
    pub pairs: usize,
    /// File names of images skipped for lack of a label.
    pub missing_labels: Vec<String>,
    /// File names of images skipped because another image with the same
    /// stem already took the label.
    pub duplicate_stems: Vec<String>,
    /// One entry per split, in train, val, test order.
    pub splits: Vec<SplitSummary>,
    pub failures: Vec<TransferFailure>,
}

impl PrepareReport {
    pub fn failed_count(&self) -> usize {
        self.splits.iter().map(|s| s.failed).sum()
    }

    pub fn transferred_count(&self) -> usize {
        self.splits.iter().map(|s| s.transferred).sum()
    }

    pub fn split(&self, split: SplitName) -> Option<&SplitSummary> {
        self.splits.iter().find(|s| s.split == split)
    }

    /// True when every paired item reached its split.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for PrepareReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.outcome == PrepareOutcome::NoImages {
            return writeln!(f, "No images found in {}", self.source_images.display());
        }

        let verb = match self.outcome {
            PrepareOutcome::Planned => "Planned",
            _ => "Prepared",
        };
        writeln!(
            f,
            "{} {} pair(s) from {} image(s) ({}, seed {})",
            verb,
            self.pairs,
            self.images_found,
            self.mode.name(),
            self.seed
        )?;

        for summary in &self.splits {
            if self.outcome == PrepareOutcome::Planned {
                writeln!(f, "  {:<5} {}", summary.split, summary.items)?;
            } else {
                writeln!(
                    f,
                    "  {:<5} {} item(s), {} transferred, {} failed",
                    summary.split, summary.items, summary.transferred, summary.failed
                )?;
            }
        }

        if !self.missing_labels.is_empty() {
            writeln!(f)?;
            writeln!(f, "Missing labels ({}):", self.missing_labels.len())?;
            for name in &self.missing_labels {
                writeln!(f, "  - {}", name)?;
            }
        }

        if !self.duplicate_stems.is_empty() {
            writeln!(f)?;
            writeln!(f, "Duplicate stems ({}):", self.duplicate_stems.len())?;
            for name in &self.duplicate_stems {
                writeln!(f, "  - {}", name)?;
            }
        }

        if !self.failures.is_empty() {
            writeln!(f)?;
            writeln!(f, "Failures ({}):", self.failures.len())?;
            for failure in &self.failures {
                writeln!(f, "  - {}", failure)?;
            }
        }

        Ok(())
    }
}

/// Per-split counts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SplitSummary {
    pub split: SplitName,
    /// Pairs assigned to the split.
    pub items: usize,
    /// Pairs whose image and label both reached the split directories.
    pub transferred: usize,
    pub failed: usize,
}

impl SplitSummary {
    pub fn new(split: SplitName, items: usize) -> Self {
        Self {
            split,
            items,
            transferred: 0,
            failed: 0,
        }
    }
}

/// A file operation that did not complete.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransferFailure {
    pub split: SplitName,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub message: String,
}

impl TransferFailure {
    pub fn new(split: SplitName, source: &Path, destination: &Path, err: &io::Error) -> Self {
        Self {
            split,
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for TransferFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} -> {}: {}",
            self.split,
            self.source.display(),
            self.destination.display(),
            self.message
        )
    }
}
