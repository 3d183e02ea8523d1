//! Camera location CSV loading.
//!
//! The CSV carries one camera per row with at least `latitude`, `longitude`
//! and `url` columns; other columns are ignored. Rows without a url or
//! without coordinates are dropped, and only the first row for each url is
//! kept.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::PrepError;

/// A camera position and the page showing its image.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CameraRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct CameraRow {
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    url: Option<String>,
}

/// Read camera records from a CSV file.
pub fn load_cameras(path: &Path) -> Result<Vec<CameraRecord>, PrepError> {
    let file = File::open(path).map_err(PrepError::Io)?;
    read_cameras(BufReader::new(file), path)
}

/// Read camera records from any CSV source. `path` is used for errors only.
pub fn read_cameras<R: Read>(reader: R, path: &Path) -> Result<Vec<CameraRecord>, PrepError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut seen = HashSet::new();
    let mut cameras = Vec::new();

    for (index, result) in csv_reader.deserialize().enumerate() {
        let row: CameraRow = result.map_err(|source| PrepError::CameraCsvParse {
            path: path.to_path_buf(),
            source,
        })?;
        let line = index + 2;

        let Some(url) = row.url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) else {
            debug!("row {} has no url; dropped", line);
            continue;
        };

        let (Some(latitude), Some(longitude)) = (row.latitude, row.longitude) else {
            warn!("row {} ({}) has no coordinates; dropped", line, url);
            continue;
        };

        if !seen.insert(url.clone()) {
            debug!("row {} repeats {}; dropped", line, url);
            continue;
        }

        cameras.push(CameraRecord {
            latitude,
            longitude,
            url,
        });
    }

    Ok(cameras)
}
