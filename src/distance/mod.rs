//! Surveillance distance estimation.
//!
//! Two photogrammetry formulas are provided:
//!
//! - **DORI** (IEC 62676-4): the maximum distance at which a target of a given
//!   real-world height still covers the pixel density required by a
//!   surveillance tier, `sensor_height_px * target_height_m / ppm`.
//! - **Field of view**: the distance at which a target of a given width
//!   exactly fills the horizontal field of view,
//!   `target_width_m / (2 * tan(hfov / 2))`.
//!
//! | Level          | PPM | Typical use                               |
//! |----------------|-----|-------------------------------------------|
//! | Detection      | 25  | presence of a person or vehicle           |
//! | Observation    | 63  | behaviour and general actions             |
//! | Recognition    | 125 | recognising a face or license plate       |
//! | Identification | 250 | confirming identity with high certainty   |
//!
//! All results are in meters.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::PrepError;

/// DORI surveillance tier, carrying its required pixels per meter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DoriLevel {
    Detection,
    Observation,
    Recognition,
    Identification,
}

impl DoriLevel {
    /// All tiers, from coarsest to finest.
    pub const ALL: [DoriLevel; 4] = [
        DoriLevel::Detection,
        DoriLevel::Observation,
        DoriLevel::Recognition,
        DoriLevel::Identification,
    ];

    /// Required pixel density at the target.
    pub fn ppm(self) -> u32 {
        match self {
            DoriLevel::Detection => 25,
            DoriLevel::Observation => 63,
            DoriLevel::Recognition => 125,
            DoriLevel::Identification => 250,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DoriLevel::Detection => "detection",
            DoriLevel::Observation => "observation",
            DoriLevel::Recognition => "recognition",
            DoriLevel::Identification => "identification",
        }
    }
}

impl fmt::Display for DoriLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DoriLevel {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        DoriLevel::ALL
            .into_iter()
            .find(|level| level.name() == wanted)
            .ok_or_else(|| PrepError::UnknownDoriLevel(s.to_string()))
    }
}

/// Maximum distance (meters) at which a target meets the given pixel density.
///
/// # Errors
/// Returns [`PrepError::InvalidGeometry`] for a zero sensor height, zero PPM,
/// or a non-positive / non-finite target height.
pub fn max_distance_dori(
    sensor_height_px: u32,
    target_height_m: f64,
    ppm: u32,
) -> Result<f64, PrepError> {
    if sensor_height_px == 0 {
        return Err(invalid("sensor height must be a positive number of pixels"));
    }
    require_positive("target height", target_height_m)?;
    if ppm == 0 {
        return Err(invalid("pixels per meter must be positive"));
    }

    Ok(f64::from(sensor_height_px) * target_height_m / f64::from(ppm))
}

/// Maximum distance (meters) for a named DORI tier.
pub fn max_distance_for_level(
    sensor_height_px: u32,
    target_height_m: f64,
    level: DoriLevel,
) -> Result<f64, PrepError> {
    max_distance_dori(sensor_height_px, target_height_m, level.ppm())
}

/// Distance (meters) at which a target of `target_width_m` fills the
/// horizontal field of view.
///
/// # Errors
/// Returns [`PrepError::InvalidGeometry`] for a non-positive width or an
/// angle outside the open interval (0, 180) degrees.
pub fn max_distance_fov(target_width_m: f64, hfov_deg: f64) -> Result<f64, PrepError> {
    require_positive("target width", target_width_m)?;
    if !(hfov_deg > 0.0 && hfov_deg < 180.0) {
        return Err(invalid(format!(
            "horizontal field of view must be in (0, 180) degrees, got {}",
            hfov_deg
        )));
    }

    let half_angle = (hfov_deg / 2.0).to_radians();
    Ok(target_width_m / (2.0 * half_angle.tan()))
}

/// Recognition-tier (125 PPM) DORI distance.
pub fn max_recognition_distance(sensor_height_px: u32, target_height_m: f64) -> Result<f64, PrepError> {
    max_distance_for_level(sensor_height_px, target_height_m, DoriLevel::Recognition)
}

/// Observation distance from the horizontal field of view.
pub fn max_observation_distance(target_width_m: f64, hfov_deg: f64) -> Result<f64, PrepError> {
    max_distance_fov(target_width_m, hfov_deg)
}

/// One row of a DORI distance table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DoriDistance {
    pub level: DoriLevel,
    pub ppm: u32,
    pub max_distance_m: f64,
}

/// DORI distances for every tier, coarsest first.
pub fn dori_table(sensor_height_px: u32, target_height_m: f64) -> Result<Vec<DoriDistance>, PrepError> {
    DoriLevel::ALL
        .into_iter()
        .map(|level| {
            Ok(DoriDistance {
                level,
                ppm: level.ppm(),
                max_distance_m: max_distance_for_level(sensor_height_px, target_height_m, level)?,
            })
        })
        .collect()
}

fn require_positive(what: &str, value: f64) -> Result<(), PrepError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{} must be a positive number of meters, got {}", what, value)))
    }
}

fn invalid(message: impl Into<String>) -> PrepError {
    PrepError::InvalidGeometry {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dori_recognition_for_full_hd_person() {
        let d = max_distance_dori(1080, 1.7, 125).expect("valid geometry");
        assert!((d - 14.688).abs() < 1e-9);

        let by_level = max_recognition_distance(1080, 1.7).expect("valid geometry");
        assert_eq!(d, by_level);
    }

    #[test]
    fn fov_distance_for_car_width() {
        let d = max_distance_fov(2.0, 75.0).expect("valid geometry");
        assert!((d - 1.3032).abs() < 1e-3, "got {}", d);
        assert_eq!(d, max_observation_distance(2.0, 75.0).unwrap());
    }

    #[test]
    fn fov_rejects_angles_outside_open_interval() {
        for angle in [0.0, 180.0, -10.0, 200.0, f64::NAN] {
            let err = max_distance_fov(2.0, angle).unwrap_err();
            assert!(matches!(err, PrepError::InvalidGeometry { .. }), "{}", angle);
        }
    }

    #[test]
    fn dori_rejects_non_positive_inputs() {
        assert!(matches!(
            max_distance_dori(0, 1.7, 125),
            Err(PrepError::InvalidGeometry { .. })
        ));
        assert!(matches!(
            max_distance_dori(1080, 0.0, 125),
            Err(PrepError::InvalidGeometry { .. })
        ));
        assert!(matches!(
            max_distance_dori(1080, -1.0, 125),
            Err(PrepError::InvalidGeometry { .. })
        ));
        assert!(matches!(
            max_distance_dori(1080, 1.7, 0),
            Err(PrepError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn dori_levels_parse_by_name() {
        assert_eq!("Recognition".parse::<DoriLevel>().unwrap(), DoriLevel::Recognition);
        assert_eq!(" detection ".parse::<DoriLevel>().unwrap(), DoriLevel::Detection);
        assert!(matches!(
            "zoom".parse::<DoriLevel>(),
            Err(PrepError::UnknownDoriLevel(_))
        ));
    }

    #[test]
    fn dori_table_lists_every_tier_in_order() {
        let table = dori_table(1080, 1.7).expect("valid geometry");
        let ppms: Vec<u32> = table.iter().map(|row| row.ppm).collect();
        assert_eq!(ppms, vec![25, 63, 125, 250]);
        assert!(table
            .windows(2)
            .all(|pair| pair[0].max_distance_m > pair[1].max_distance_m));
        assert!((table[0].max_distance_m - 73.44).abs() < 1e-9);
    }
}
