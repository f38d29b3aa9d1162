use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

pub const CONFIG_FILE_NAME: &str = "dropmark.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    /// Radius of a drawn drop point, in screen points.
    #[serde(default = "default_marker_radius")]
    pub marker_radius: f32,
    #[serde(default = "default_max_round")]
    pub max_round: u32,
    /// How many years before the current one the date pickers offer.
    #[serde(default = "default_years_back")]
    pub years_back: i32,
    #[serde(default = "default_years_forward")]
    pub years_forward: i32,
    /// Map images with a longer side are downscaled before upload.
    #[serde(default = "default_max_texture_dimension")]
    pub max_texture_dimension: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            marker_radius: default_marker_radius(),
            max_round: default_max_round(),
            years_back: default_years_back(),
            years_forward: default_years_forward(),
            max_texture_dimension: default_max_texture_dimension(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DropmarkConfig {
    /// Map shown when none is selected. Falls back to the first map on disk.
    #[serde(default = "default_map")]
    pub default_map: String,
    #[serde(default = "default_teams_dir")]
    pub teams_dir: String,
    #[serde(default = "default_staging_dir", alias = "tmp_dir")]
    pub staging_dir: String,
    #[serde(default = "default_maps_dir")]
    pub maps_dir: String,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl Default for DropmarkConfig {
    fn default() -> Self {
        Self {
            default_map: default_map(),
            teams_dir: default_teams_dir(),
            staging_dir: default_staging_dir(),
            maps_dir: default_maps_dir(),
            display: DisplayConfig::default(),
        }
    }
}

fn default_map() -> String {
    "Erangel.jpg".to_string()
}

fn default_teams_dir() -> String {
    "teams".to_string()
}

fn default_staging_dir() -> String {
    "tmp".to_string()
}

fn default_maps_dir() -> String {
    "maps".to_string()
}

fn default_marker_radius() -> f32 {
    5.0
}

fn default_max_round() -> u32 {
    47
}

fn default_years_back() -> i32 {
    10
}

fn default_years_forward() -> i32 {
    1
}

fn default_max_texture_dimension() -> u32 {
    4096
}

pub fn load_dropmark_config(work_dir: &Path) -> Result<DropmarkConfig, String> {
    let config_path = work_dir.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        info!(
            "{} not found, using defaults: {}",
            CONFIG_FILE_NAME,
            config_path.display()
        );
        return Ok(DropmarkConfig::default());
    }

    let raw = fs::read_to_string(&config_path).map_err(|err| {
        format!(
            "Failed to read {} at {}: {}",
            CONFIG_FILE_NAME,
            config_path.display(),
            err
        )
    })?;

    toml::from_str::<DropmarkConfig>(&raw).map_err(|err| {
        format!(
            "Failed to parse {} at {}: {}",
            CONFIG_FILE_NAME,
            config_path.display(),
            err
        )
    })
}
