use std::path::Path;

use tracing::info;

use crate::error::DropResult;
use crate::services::config_loader::DropmarkConfig;
use crate::services::map_library::MapLibrary;
use crate::services::staging_store::StagingStore;
use crate::services::team_archive::TeamArchive;

/// Everything the screens need, opened once at startup and passed down.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub config: DropmarkConfig,
    pub maps: MapLibrary,
    pub staging: StagingStore,
    pub archive: TeamArchive,
}

impl Workspace {
    /// Maps must already be present; the team and staging directories are
    /// created on demand.
    pub fn open(root: &Path, config: DropmarkConfig) -> DropResult<Self> {
        let maps = MapLibrary::open(root.join(&config.maps_dir), &config.default_map)?;
        let archive = TeamArchive::open(root.join(&config.teams_dir))?;
        let staging = StagingStore::open(root.join(&config.staging_dir))?;
        info!(
            "Opened workspace: archive={} staging={}",
            archive.root().display(),
            staging.dir().display()
        );
        Ok(Self {
            config,
            maps,
            staging,
            archive,
        })
    }
}
