//! HEIC to JPEG conversion ahead of preparation.
//!
//! Decoding is left to an external program; this module only enumerates the
//! inputs, invokes the converter per file and stops at the first failure.
//! [`DatasetPreparation`] wires a converter in front of a
//! [`DatasetPreparer`].

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{error, info};
use walkdir::WalkDir;

use crate::error::PrepError;
use crate::prepare::{DatasetPreparer, PrepareReport, PrepareRequest};

pub const HEIC_EXTENSION: &str = "heic";
pub const JPEG_EXTENSION: &str = "jpg";

/// Program used by [`CommandConverter::default`] (ships with libheif).
pub const DEFAULT_CONVERTER_PROGRAM: &str = "heif-convert";

/// Files written by a conversion run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    pub converted: Vec<PathBuf>,
}

/// Capability to turn a folder of HEIC images into JPEG files.
pub trait ImageConverter {
    /// Convert every HEIC file directly under `input` into
    /// `<output>/<stem>.jpg`. Creates `output` if needed.
    ///
    /// # Errors
    /// Any failure is fatal and aborts the remaining conversions.
    fn convert_heic_to_jpg(&self, input: &Path, output: &Path) -> Result<ConversionSummary, PrepError>;
}

/// Converter that runs `<program> <input.heic> <output.jpg>` per file.
#[derive(Clone, Debug)]
pub struct CommandConverter {
    program: String,
}

impl CommandConverter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for CommandConverter {
    fn default() -> Self {
        Self::new(DEFAULT_CONVERTER_PROGRAM)
    }
}

impl ImageConverter for CommandConverter {
    fn convert_heic_to_jpg(&self, input: &Path, output: &Path) -> Result<ConversionSummary, PrepError> {
        let sources = collect_heic_files(input)?;
        std::fs::create_dir_all(output)?;

        let mut summary = ConversionSummary::default();
        for heic_file in sources {
            let output_path = output
                .join(heic_file.file_name().unwrap_or_default())
                .with_extension(JPEG_EXTENSION);

            let status = Command::new(&self.program)
                .arg(&heic_file)
                .arg(&output_path)
                .status()
                .map_err(|err| conversion_failed(&heic_file, format!("could not run '{}': {}", self.program, err)))?;

            if !status.success() {
                return Err(conversion_failed(
                    &heic_file,
                    format!("'{}' exited with {}", self.program, status),
                ));
            }

            info!("Converted: {} -> {}", heic_file.display(), output_path.display());
            summary.converted.push(output_path);
        }

        Ok(summary)
    }
}

/// HEIC files directly under `dir`, sorted by name, extension case ignored.
pub fn collect_heic_files(dir: &Path) -> Result<Vec<PathBuf>, PrepError> {
    if !dir.is_dir() {
        return Err(PrepError::SourceDirMissing {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|source| PrepError::Io(source.into()))?;
        let is_heic = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(HEIC_EXTENSION));
        if entry.file_type().is_file() && is_heic {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn conversion_failed(path: &Path, message: String) -> PrepError {
    error!("Failed to convert {}: {}", path.display(), message);
    PrepError::ConversionFailed {
        path: path.to_path_buf(),
        message,
    }
}

/// Composition root: optional HEIC conversion, then preparation.
pub struct DatasetPreparation<C, P> {
    converter: C,
    preparer: P,
}

impl<C: ImageConverter, P: DatasetPreparer> DatasetPreparation<C, P> {
    pub fn new(converter: C, preparer: P) -> Self {
        Self {
            converter,
            preparer,
        }
    }

    /// Convert `heic_input` into `request.source_images` when given, then
    /// prepare. A conversion failure aborts before preparation.
    pub fn run(&self, heic_input: Option<&Path>, request: &PrepareRequest) -> Result<PrepareReport, PrepError> {
        if let Some(input) = heic_input {
            let summary = self
                .converter
                .convert_heic_to_jpg(input, &request.source_images)?;
            info!(
                "Converted {} HEIC image(s) into {}",
                summary.converted.len(),
                request.source_images.display()
            );
        }
        self.preparer.prepare(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;

    use crate::prepare::{FsDatasetPreparer, PrepareOutcome};
    use crate::split::DEFAULT_SEED;

    struct FakeConverter {
        fail: bool,
        calls: RefCell<Vec<(PathBuf, PathBuf)>>,
    }

    impl ImageConverter for FakeConverter {
        fn convert_heic_to_jpg(&self, input: &Path, output: &Path) -> Result<ConversionSummary, PrepError> {
            self.calls
                .borrow_mut()
                .push((input.to_path_buf(), output.to_path_buf()));
            if self.fail {
                return Err(PrepError::ConversionFailed {
                    path: input.to_path_buf(),
                    message: "corrupt".to_string(),
                });
            }
            fs::create_dir_all(output)?;
            fs::write(output.join("cam.jpg"), b"jpeg")?;
            Ok(ConversionSummary {
                converted: vec![output.join("cam.jpg")],
            })
        }
    }

    fn request(root: &Path) -> PrepareRequest {
        fs::create_dir_all(root.join("labels")).expect("create labels");
        fs::write(root.join("labels/cam.txt"), "0 0.5 0.5 0.1 0.1\n").expect("write label");
        PrepareRequest::new(root.join("jpg"), root.join("labels"), root.join("out"))
    }

    #[test]
    fn conversion_runs_before_preparation() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let request = request(temp.path());
        let converter = FakeConverter {
            fail: false,
            calls: RefCell::new(Vec::new()),
        };

        let facade = DatasetPreparation::new(converter, FsDatasetPreparer::with_seed(DEFAULT_SEED));
        let report = facade
            .run(Some(&temp.path().join("heic")), &request)
            .expect("prepare");

        assert_eq!(report.outcome, PrepareOutcome::Materialized);
        assert_eq!(report.pairs, 1);
        assert_eq!(facade.converter.calls.borrow().len(), 1);
        assert!(temp.path().join("out/images/train/cam.jpg").is_file());
    }

    #[test]
    fn conversion_failure_aborts_preparation() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let request = request(temp.path());
        let converter = FakeConverter {
            fail: true,
            calls: RefCell::new(Vec::new()),
        };

        let facade = DatasetPreparation::new(converter, FsDatasetPreparer::with_seed(DEFAULT_SEED));
        let err = facade
            .run(Some(&temp.path().join("heic")), &request)
            .unwrap_err();

        assert!(matches!(err, PrepError::ConversionFailed { .. }));
        assert!(!temp.path().join("out").exists());
    }

    #[test]
    fn heic_files_are_matched_case_insensitively() {
        let temp = tempfile::tempdir().expect("create temp dir");
        fs::write(temp.path().join("b.HEIC"), b"x").expect("write");
        fs::write(temp.path().join("a.heic"), b"x").expect("write");
        fs::write(temp.path().join("c.jpg"), b"x").expect("write");

        let files = collect_heic_files(temp.path()).expect("collect");
        assert_eq!(files, vec![temp.path().join("a.heic"), temp.path().join("b.HEIC")]);
    }

    #[test]
    fn missing_program_is_a_conversion_failure() {
        let temp = tempfile::tempdir().expect("create temp dir");
        fs::write(temp.path().join("a.heic"), b"x").expect("write");

        let converter = CommandConverter::new("cctv-prep-no-such-converter");
        let err = converter
            .convert_heic_to_jpg(temp.path(), &temp.path().join("out"))
            .unwrap_err();
        assert!(matches!(err, PrepError::ConversionFailed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn command_converter_targets_jpg_names() {
        let temp = tempfile::tempdir().expect("create temp dir");
        fs::write(temp.path().join("a.HEIC"), b"x").expect("write");

        let converter = CommandConverter::new("true");
        let summary = converter
            .convert_heic_to_jpg(temp.path(), &temp.path().join("out"))
            .expect("convert");
        assert_eq!(summary.converted, vec![temp.path().join("out/a.jpg")]);
    }
}
