use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{DropError, DropResult};
use crate::models::{DropRecord, RecordKey};
use crate::services::record_file;
use crate::services::team_archive::TeamArchive;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    Created,
    Overwritten,
    /// A record with the same key exists and the caller declined to replace it.
    Rejected,
}

#[derive(Debug, Default)]
pub struct CommitReport {
    pub moved: Vec<RecordKey>,
    pub skipped: Vec<RecordKey>,
    /// Team of the last moved entry, used to keep the recording form filled in.
    pub last_team: Option<String>,
}

/// Drafts waiting to be committed, one flat directory of record files.
#[derive(Debug, Clone)]
pub struct StagingStore {
    dir: PathBuf,
}

impl StagingStore {
    pub fn open(dir: impl Into<PathBuf>) -> DropResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn stage<F>(&self, record: &DropRecord, confirm_overwrite: F) -> DropResult<StageOutcome>
    where
        F: FnOnce(&RecordKey) -> bool,
    {
        record.validate()?;
        let key = record.key()?;
        let path = self.dir.join(key.file_name());

        match record_file::write_record(&path, record, false) {
            Ok(()) => {
                info!("Staged {}", key);
                Ok(StageOutcome::Created)
            }
            Err(DropError::Conflict(_)) => {
                if !confirm_overwrite(&key) {
                    info!("Kept existing staged entry {}", key);
                    return Ok(StageOutcome::Rejected);
                }
                record_file::write_record(&path, record, true)?;
                info!("Overwrote staged entry {}", key);
                Ok(StageOutcome::Overwritten)
            }
            Err(err) => Err(err),
        }
    }

    pub fn list(&self) -> DropResult<Vec<String>> {
        Ok(record_file::list_file_names(&self.dir)?
            .into_iter()
            .filter(|name| !name.ends_with(".tmp"))
            .collect())
    }

    pub fn delete(&self, identifier: &str) -> DropResult<()> {
        if !record_file::is_plain_file_name(identifier) {
            return Err(DropError::NotFound(identifier.to_string()));
        }
        let path = self.dir.join(identifier);
        if !path.is_file() {
            return Err(DropError::NotFound(identifier.to_string()));
        }
        fs::remove_file(&path)?;
        info!("Deleted staged entry {}", identifier);
        Ok(())
    }

    /// Deletes the single selected entry; any other selection size is refused.
    pub fn delete_selected(&self, selection: &[String]) -> DropResult<()> {
        match selection {
            [identifier] => self.delete(identifier),
            _ => Err(DropError::NotFound(format!(
                "select exactly one staged entry ({} selected)",
                selection.len()
            ))),
        }
    }

    /// Moves every staged entry into the archive. Entries whose archived
    /// counterpart already exists are only replaced when `confirm_overwrite`
    /// agrees; declined ones stay staged.
    pub fn commit_all<F>(
        &self,
        archive: &TeamArchive,
        mut confirm_overwrite: F,
    ) -> DropResult<CommitReport>
    where
        F: FnMut(&RecordKey) -> bool,
    {
        let entries = self.list()?;
        if entries.is_empty() {
            return Err(DropError::NoStagedData);
        }

        let mut report = CommitReport::default();
        for file_name in entries {
            let Some(key) = RecordKey::parse(&file_name) else {
                warn!("Skipping unrecognized staged file {}", file_name);
                continue;
            };
            let source = self.dir.join(&file_name);

            match archive.admit(&source, &key, false) {
                Ok(()) => {}
                Err(DropError::Conflict(_)) => {
                    if !confirm_overwrite(&key) {
                        info!("Left {} staged, archive copy kept", key);
                        report.skipped.push(key);
                        continue;
                    }
                    archive.admit(&source, &key, true)?;
                }
                Err(err) => return Err(err),
            }

            report.last_team = Some(key.team.clone());
            report.moved.push(key);
        }

        info!(
            "Commit finished: moved={}, skipped={}",
            report.moved.len(),
            report.skipped.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Point;
    use chrono::NaiveDate;

    fn record(team: &str, round: u32, points: usize) -> DropRecord {
        DropRecord {
            team: team.to_string(),
            match_name: "scrimX".to_string(),
            map_name: "Erangel.jpg".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            round_count: round,
            points: (0..points as u32)
                .map(|i| Point { x: i * 10, y: i * 20, w: 640, h: 640 })
                .collect(),
        }
    }

    fn stores(root: &Path) -> (StagingStore, TeamArchive) {
        (
            StagingStore::open(root.join("tmp")).unwrap(),
            TeamArchive::open(root.join("teams")).unwrap(),
        )
    }

    #[test]
    fn stage_validates_point_count() {
        let dir = tempfile::tempdir().unwrap();
        let (staging, _) = stores(dir.path());

        assert!(matches!(
            staging.stage(&record("teamA", 1, 5), |_| true),
            Err(DropError::TooManyPoints(5))
        ));
        assert!(staging.list().unwrap().is_empty());

        for n in 1..=4 {
            let outcome = staging.stage(&record("teamA", n as u32, n), |_| true).unwrap();
            assert_eq!(outcome, StageOutcome::Created);
        }
        assert_eq!(staging.list().unwrap().len(), 4);
    }

    #[test]
    fn stage_rejects_forbidden_team_name() {
        let dir = tempfile::tempdir().unwrap();
        let (staging, _) = stores(dir.path());
        let err = staging.stage(&record("team.A", 1, 1), |_| true).unwrap_err();
        assert!(err.to_string().contains("\".\""), "got: {err}");
    }

    #[test]
    fn duplicate_key_needs_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let (staging, _) = stores(dir.path());
        let first = record("teamA", 1, 1);
        assert_eq!(staging.stage(&first, |_| true).unwrap(), StageOutcome::Created);

        let path = staging.dir().join(first.key().unwrap().file_name());
        let before = fs::read(&path).unwrap();

        let second = record("teamA", 1, 3);
        let mut asked = None;
        let outcome = staging
            .stage(&second, |key| {
                asked = Some(key.clone());
                false
            })
            .unwrap();
        assert_eq!(outcome, StageOutcome::Rejected);
        assert_eq!(asked, Some(first.key().unwrap()));
        assert_eq!(fs::read(&path).unwrap(), before);

        assert_eq!(staging.stage(&second, |_| true).unwrap(), StageOutcome::Overwritten);
        assert_eq!(record_file::read_record(&path).unwrap().points.len(), 3);
    }

    #[test]
    fn delete_requires_an_existing_single_entry() {
        let dir = tempfile::tempdir().unwrap();
        let (staging, _) = stores(dir.path());
        staging.stage(&record("teamA", 1, 1), |_| true).unwrap();
        staging.stage(&record("teamA", 2, 1), |_| true).unwrap();
        let names = staging.list().unwrap();

        assert!(matches!(
            staging.delete_selected(&names),
            Err(DropError::NotFound(_))
        ));
        assert!(matches!(staging.delete_selected(&[]), Err(DropError::NotFound(_))));
        assert!(matches!(
            staging.delete("missing.json"),
            Err(DropError::NotFound(_))
        ));

        staging.delete_selected(&names[..1]).unwrap();
        assert_eq!(staging.list().unwrap(), names[1..].to_vec());
    }

    #[test]
    fn commit_with_empty_staging_fails() {
        let dir = tempfile::tempdir().unwrap();
        let (staging, archive) = stores(dir.path());
        assert!(matches!(
            staging.commit_all(&archive, |_| true),
            Err(DropError::NoStagedData)
        ));
        assert!(archive.list_teams().unwrap().is_empty());
    }

    #[test]
    fn commit_moves_entries_into_team_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let (staging, archive) = stores(dir.path());
        staging.stage(&record("teamA", 1, 2), |_| true).unwrap();
        staging.stage(&record("teamB", 1, 2), |_| true).unwrap();

        let report = staging.commit_all(&archive, |_| true).unwrap();
        assert_eq!(report.moved.len(), 2);
        assert!(report.skipped.is_empty());
        assert_eq!(report.last_team.as_deref(), Some("teamB"));
        assert!(staging.list().unwrap().is_empty());
        assert_eq!(archive.list_teams().unwrap(), vec!["teamA", "teamB"]);
    }

    #[test]
    fn declined_overwrite_leaves_entry_staged() {
        let dir = tempfile::tempdir().unwrap();
        let (staging, archive) = stores(dir.path());
        staging.stage(&record("teamA", 1, 1), |_| true).unwrap();
        staging.commit_all(&archive, |_| true).unwrap();

        staging.stage(&record("teamA", 1, 4), |_| true).unwrap();
        staging.stage(&record("teamA", 2, 1), |_| true).unwrap();

        let report = staging.commit_all(&archive, |_| false).unwrap();
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.moved.len(), 1);
        assert_eq!(staging.list().unwrap().len(), 1);

        let archived_name = record("teamA", 1, 1).key().unwrap().file_name();
        assert_eq!(archive.read("teamA", &archived_name).unwrap().points.len(), 1);

        let report = staging.commit_all(&archive, |_| true).unwrap();
        assert_eq!(report.moved.len(), 1);
        assert_eq!(archive.read("teamA", &archived_name).unwrap().points.len(), 4);
    }
}
