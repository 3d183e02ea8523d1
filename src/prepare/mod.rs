//! Dataset preparation: pair, split, materialize.
//!
//! [`FsDatasetPreparer`] discovers image/label pairs in two flat source
//! directories, partitions them with a [`DatasetSplitter`] and copies or
//! moves each pair into the layout consumed by detection trainers:
//!
//! ```text
//! <output_images>/{train,val,test}/<image>
//! <output_labels>/{train,val,test}/<stem>.txt
//! ```
//!
//! Runs are not atomic. A failed file operation is recorded and the run
//! continues; the caller then receives [`PrepError::MaterializeFailed`] with
//! the full report.

pub mod data_yaml;
pub mod materialize;
pub mod pairing;
pub mod report;

use std::path::{Path, PathBuf};

use tracing::{error, info};

pub use data_yaml::{write_data_yaml, DataYaml};
pub use materialize::{transfer_file, TransferMode, TransferOutcome};
pub use pairing::{DatasetItem, Pairing};
pub use report::{PrepareOutcome, PrepareReport, SplitSummary, TransferFailure};

use crate::error::PrepError;
use crate::split::{
    DatasetSplitter, Partition, SeededSplitter, SplitName, SplitRatios, DEFAULT_SEED,
};

/// Inputs of one preparation run.
#[derive(Clone, Debug, PartialEq)]
pub struct PrepareRequest {
    pub source_images: PathBuf,
    pub source_labels: PathBuf,
    pub output_images: PathBuf,
    pub output_labels: PathBuf,
    pub train_ratio: f64,
    pub val_ratio: f64,
    pub mode: TransferMode,
    /// Allowed image extensions; empty accepts every file.
    pub image_extensions: Vec<String>,
}

impl PrepareRequest {
    /// Request writing into `<output_root>/images` and `<output_root>/labels`
    /// with a 0.7 / 0.2 / 0.1 copy split.
    pub fn new(
        source_images: impl Into<PathBuf>,
        source_labels: impl Into<PathBuf>,
        output_root: impl AsRef<Path>,
    ) -> Self {
        let output_root = output_root.as_ref();
        Self {
            source_images: source_images.into(),
            source_labels: source_labels.into(),
            output_images: output_root.join("images"),
            output_labels: output_root.join("labels"),
            train_ratio: 0.7,
            val_ratio: 0.2,
            mode: TransferMode::Copy,
            image_extensions: Vec::new(),
        }
    }

    pub fn with_ratios(mut self, train_ratio: f64, val_ratio: f64) -> Self {
        self.train_ratio = train_ratio;
        self.val_ratio = val_ratio;
        self
    }

    pub fn with_mode(mut self, mode: TransferMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_image_extensions(mut self, extensions: Vec<String>) -> Self {
        self.image_extensions = extensions;
        self
    }
}

/// Pairs and their assignment to splits, before any write.
#[derive(Clone, Debug)]
pub struct PreparePlan {
    pub images_found: usize,
    pub missing_labels: Vec<PathBuf>,
    pub duplicate_stems: Vec<PathBuf>,
    pub partition: Partition<DatasetItem>,
}

/// Capability to turn raw image/label folders into a split dataset.
pub trait DatasetPreparer {
    /// Pair and split without touching the output tree.
    fn plan(&self, request: &PrepareRequest) -> Result<Option<PreparePlan>, PrepError>;

    /// Pair, split and materialize.
    fn prepare(&self, request: &PrepareRequest) -> Result<PrepareReport, PrepError>;
}

/// Filesystem-backed preparer.
#[derive(Clone, Debug)]
pub struct FsDatasetPreparer<S = SeededSplitter> {
    splitter: S,
}

impl FsDatasetPreparer<SeededSplitter> {
    pub fn with_seed(seed: u64) -> Self {
        Self::new(SeededSplitter::new(seed))
    }
}

impl Default for FsDatasetPreparer<SeededSplitter> {
    fn default() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }
}

impl<S: DatasetSplitter> FsDatasetPreparer<S> {
    pub fn new(splitter: S) -> Self {
        Self { splitter }
    }

    /// Dry-run report for a plan.
    pub fn plan_report(&self, request: &PrepareRequest, plan: &PreparePlan) -> PrepareReport {
        let splits = plan
            .partition
            .iter()
            .map(|(split, items)| SplitSummary::new(split, items.len()))
            .collect();
        self.base_report(request, PrepareOutcome::Planned, plan, splits, Vec::new())
    }

    fn base_report(
        &self,
        request: &PrepareRequest,
        outcome: PrepareOutcome,
        plan: &PreparePlan,
        splits: Vec<SplitSummary>,
        failures: Vec<TransferFailure>,
    ) -> PrepareReport {
        PrepareReport {
            outcome,
            mode: request.mode,
            seed: self.splitter.seed(),
            source_images: request.source_images.clone(),
            source_labels: request.source_labels.clone(),
            output_images: request.output_images.clone(),
            output_labels: request.output_labels.clone(),
            images_found: plan.images_found,
            pairs: plan.partition.len(),
            missing_labels: file_names(&plan.missing_labels),
            duplicate_stems: file_names(&plan.duplicate_stems),
            splits,
            failures,
        }
    }

    /// Report for a run that found no images.
    pub fn empty_report(&self, request: &PrepareRequest) -> PrepareReport {
        let plan = PreparePlan {
            images_found: 0,
            missing_labels: Vec::new(),
            duplicate_stems: Vec::new(),
            partition: Partition {
                train: Vec::new(),
                val: Vec::new(),
                test: Vec::new(),
            },
        };
        let splits = SplitName::ALL
            .into_iter()
            .map(|split| SplitSummary::new(split, 0))
            .collect();
        self.base_report(request, PrepareOutcome::NoImages, &plan, splits, Vec::new())
    }
}

impl<S: DatasetSplitter> DatasetPreparer for FsDatasetPreparer<S> {
    fn plan(&self, request: &PrepareRequest) -> Result<Option<PreparePlan>, PrepError> {
        SplitRatios::new(request.train_ratio, request.val_ratio)?;
        if !request.source_labels.is_dir() {
            return Err(PrepError::SourceDirMissing {
                path: request.source_labels.clone(),
            });
        }

        let images = pairing::collect_images(&request.source_images, &request.image_extensions)?;
        if images.is_empty() {
            info!("No images found in {}.", request.source_images.display());
            return Ok(None);
        }

        let images_found = images.len();
        let Pairing {
            items,
            missing_labels,
            duplicate_stems,
        } = pairing::pair_with_labels(images, &request.source_labels);

        if items.is_empty() {
            error!("No valid image-label pairs found. Aborting dataset preparation.");
            return Err(PrepError::NoValidPairs {
                images_dir: request.source_images.clone(),
                missing_labels: missing_labels.len(),
            });
        }

        let partition = self
            .splitter
            .split(items, request.train_ratio, request.val_ratio)?;

        Ok(Some(PreparePlan {
            images_found,
            missing_labels,
            duplicate_stems,
            partition,
        }))
    }

    fn prepare(&self, request: &PrepareRequest) -> Result<PrepareReport, PrepError> {
        let Some(plan) = self.plan(request)? else {
            return Ok(self.empty_report(request));
        };

        let (splits, failures) = materialize::materialize_partition(
            &plan.partition,
            &request.output_images,
            &request.output_labels,
            request.mode,
        );
        let report = self.base_report(request, PrepareOutcome::Materialized, &plan, splits, failures);

        if report.is_complete() {
            info!("Dataset preparation completed successfully.");
            Ok(report)
        } else {
            error!(
                "Dataset preparation finished with {} failed file operation(s).",
                report.failures.len()
            );
            Err(PrepError::MaterializeFailed {
                failed: report.failed_count(),
                report: Box::new(report),
            })
        }
    }
}

fn file_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap_or_default().to_string_lossy().into_owned())
        .collect()
}
