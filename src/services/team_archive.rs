use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{DropError, DropResult};
use crate::models::{DropRecord, RecordKey};
use crate::services::record_file;

/// Committed records, one directory per team.
#[derive(Debug, Clone)]
pub struct TeamArchive {
    root: PathBuf,
}

impl TeamArchive {
    pub fn open(root: impl Into<PathBuf>) -> DropResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn team_dir(&self, team: &str) -> DropResult<PathBuf> {
        if !record_file::is_plain_file_name(team) {
            return Err(DropError::NotFound(format!("team {team:?}")));
        }
        Ok(self.root.join(team))
    }

    pub fn has_team(&self, team: &str) -> bool {
        self.team_dir(team).is_ok_and(|dir| dir.is_dir())
    }

    pub fn ensure_team(&self, team: &str) -> DropResult<()> {
        let dir = self.team_dir(team)?;
        if !dir.is_dir() {
            fs::create_dir_all(&dir)?;
            info!("Registered new team {}", team);
        }
        Ok(())
    }

    pub fn list_teams(&self) -> DropResult<Vec<String>> {
        record_file::list_dir_names(&self.root)
    }

    /// Distinct match names across every team, sorted.
    pub fn list_match_names(&self) -> DropResult<Vec<String>> {
        let mut names = BTreeSet::new();
        for team in self.list_teams()? {
            for (_, key) in self.list_keys(&team)? {
                names.insert(key.match_name);
            }
        }
        Ok(names.into_iter().collect())
    }

    pub fn list_records(&self, team: &str) -> DropResult<Vec<String>> {
        let dir = self.team_dir(team)?;
        if !dir.is_dir() {
            return Err(DropError::NotFound(format!("team {team}")));
        }
        record_file::list_file_names(&dir)
    }

    /// Archived records of `team` whose filename parses as a key.
    pub fn list_keys(&self, team: &str) -> DropResult<Vec<(String, RecordKey)>> {
        let mut keys = Vec::new();
        for file_name in self.list_records(team)? {
            match RecordKey::parse(&file_name) {
                Some(key) => keys.push((file_name, key)),
                None => warn!("Skipping unrecognized archive file {}/{}", team, file_name),
            }
        }
        Ok(keys)
    }

    pub fn read(&self, team: &str, file_name: &str) -> DropResult<DropRecord> {
        if !record_file::is_plain_file_name(file_name) {
            return Err(DropError::NotFound(file_name.to_string()));
        }
        record_file::read_record(&self.team_dir(team)?.join(file_name))
    }

    pub fn contains(&self, key: &RecordKey) -> bool {
        self.team_dir(&key.team)
            .is_ok_and(|dir| dir.join(key.file_name()).is_file())
    }

    /// Moves a staged file into its team directory.
    pub fn admit(&self, source: &Path, key: &RecordKey, overwrite: bool) -> DropResult<()> {
        self.ensure_team(&key.team)?;
        let target = self.team_dir(&key.team)?.join(key.file_name());
        if target.exists() && !overwrite {
            return Err(DropError::Conflict(key.file_name()));
        }
        record_file::move_file(source, &target)?;
        info!("Archived {}", key);
        Ok(())
    }
}
