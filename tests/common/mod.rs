#![allow(dead_code)]

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Raw dataset folders under a temp root.
pub struct RawDataset {
    pub images: PathBuf,
    pub labels: PathBuf,
}

impl RawDataset {
    pub fn new(root: &Path) -> Self {
        let images = root.join("raw/images");
        let labels = root.join("raw/labels");
        fs::create_dir_all(&images).expect("create raw images dir");
        fs::create_dir_all(&labels).expect("create raw labels dir");
        Self { images, labels }
    }

    pub fn add_image(&self, name: &str) {
        fs::write(self.images.join(name), format!("pixels of {name}")).expect("write image");
    }

    pub fn add_label(&self, stem: &str) {
        fs::write(
            self.labels.join(format!("{stem}.txt")),
            "0 0.500000 0.500000 0.250000 0.250000\n",
        )
        .expect("write label");
    }

    pub fn add_pair(&self, stem: &str) {
        self.add_image(&format!("{stem}.jpg"));
        self.add_label(stem);
    }

    /// `img_00` .. `img_{n-1}` pairs.
    pub fn with_pairs(root: &Path, n: usize) -> Self {
        let raw = Self::new(root);
        for i in 0..n {
            raw.add_pair(&format!("img_{i:02}"));
        }
        raw
    }
}

/// File stems directly under `dir`; empty when `dir` does not exist.
pub fn stems(dir: &Path) -> BTreeSet<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return BTreeSet::new();
    };
    entries
        .map(|entry| entry.expect("read dir entry").path())
        .filter(|path| path.is_file())
        .map(|path| {
            path.file_stem()
                .expect("file stem")
                .to_string_lossy()
                .into_owned()
        })
        .collect()
}

/// Every file below `dir`, recursively.
pub fn count_files(dir: &Path) -> usize {
    if !dir.exists() {
        return 0;
    }
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .count()
}
