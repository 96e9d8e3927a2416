use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{enums::SortBy, navigation::SyncConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Viewer settings. Every field is optional in the JSON file.
///
/// ```json
/// { "dicom_dir": "dicom", "sync": { "sync_sagittal_to_others": false } }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub dicom_dir: PathBuf,
    pub sort_by: SortBy,
    pub sync: SyncConfig,
    /// Camera distance as a multiple of the volume's upper bound on the view axis.
    pub camera_distance_factor: f64,
    pub crosshair_handle_radius: f64,
    pub rotation_handle_radius: f64,
    /// Where the binary writes resliced views, if anywhere.
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            dicom_dir: PathBuf::from("dicom"),
            sort_by: SortBy::default(),
            sync: SyncConfig::default(),
            camera_distance_factor: 3.5,
            crosshair_handle_radius: 8.0,
            rotation_handle_radius: 6.0,
            snapshot_dir: None,
        }
    }
}

impl ViewerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }
}
