use std::fmt;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{DropError, DropResult};

/// Characters reserved as filename field separators or path syntax.
pub const FORBIDDEN_CHARS: [char; 6] = ['_', '.', '/', '\\', '"', '\''];

pub const MAX_POINTS_PER_RECORD: usize = 4;

pub const RECORD_EXTENSION: &str = "json";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A click on the map together with the size of the viewport it was made in.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DropRecord {
    pub team: String,
    pub match_name: String,
    /// Map image filename, e.g. `Erangel.jpg`.
    pub map_name: String,
    pub date: NaiveDate,
    pub round_count: u32,
    pub points: Vec<Point>,
}

impl DropRecord {
    pub fn validate(&self) -> DropResult<()> {
        validate_name("team name", &self.team)?;
        validate_name("match name", &self.match_name)?;

        if map_stem(&self.map_name).is_none() {
            return Err(DropError::EmptyField { field: "map name" });
        }

        if self.round_count == 0 {
            return Err(DropError::InvalidRound("rounds start at 1".to_string()));
        }

        match self.points.len() {
            0 => Err(DropError::NoPoints),
            n if n > MAX_POINTS_PER_RECORD => Err(DropError::TooManyPoints(n)),
            _ => Ok(()),
        }
    }

    /// Key for a record that already passed `validate`.
    pub fn key(&self) -> DropResult<RecordKey> {
        let map_stem = map_stem(&self.map_name)
            .ok_or(DropError::EmptyField { field: "map name" })?;
        Ok(RecordKey {
            team: self.team.clone(),
            match_name: self.match_name.clone(),
            map_stem,
            date: self.date,
            round: self.round_count,
        })
    }
}

fn validate_name(field: &'static str, value: &str) -> DropResult<()> {
    if value.is_empty() {
        return Err(DropError::EmptyField { field });
    }
    if let Some(ch) = value.chars().find(|ch| FORBIDDEN_CHARS.contains(ch)) {
        return Err(DropError::ForbiddenChar { field, ch });
    }
    Ok(())
}

/// Stem of a map image filename, `None` when there is nothing left.
pub fn map_stem(map_name: &str) -> Option<String> {
    Path::new(map_name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
}

pub fn parse_date_parts(year: i32, month: u32, day: u32) -> DropResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| DropError::InvalidDate(format!("{year:04}-{month:02}-{day:02}")))
}

/// Composite identity shared by a staged entry and its archived record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub team: String,
    pub match_name: String,
    pub map_stem: String,
    pub date: NaiveDate,
    pub round: u32,
}

impl RecordKey {
    pub fn round_label(&self) -> String {
        format!("R{}", self.round)
    }

    pub fn file_stem(&self) -> String {
        format!(
            "{}_{}_{}_{}_{}",
            self.team,
            self.match_name,
            self.map_stem,
            self.date.format(DATE_FORMAT),
            self.round_label()
        )
    }

    pub fn file_name(&self) -> String {
        format!("{}.{RECORD_EXTENSION}", self.file_stem())
    }

    /// Recovers a key from a record filename.
    ///
    /// Team and match name can never hold an underscore, so the first two
    /// fields and the last two are fixed; whatever sits between them is the
    /// map stem.
    pub fn parse(file_name: &str) -> Option<RecordKey> {
        let path = Path::new(file_name);
        if path.extension()?.to_str()? != RECORD_EXTENSION {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        let fields: Vec<&str> = stem.split('_').collect();
        if fields.len() < 5 {
            return None;
        }

        let team = fields[0];
        let match_name = fields[1];
        let map_stem = fields[2..fields.len() - 2].join("_");
        let date = NaiveDate::parse_from_str(fields[fields.len() - 2], DATE_FORMAT).ok()?;
        let round = parse_round_label(fields[fields.len() - 1])?;

        if team.is_empty() || match_name.is_empty() || map_stem.is_empty() {
            return None;
        }

        Some(RecordKey {
            team: team.to_string(),
            match_name: match_name.to_string(),
            map_stem,
            date,
            round,
        })
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_stem())
    }
}

fn parse_round_label(label: &str) -> Option<u32> {
    label
        .strip_prefix('R')?
        .parse::<u32>()
        .ok()
        .filter(|round| *round > 0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundFilter {
    #[default]
    All,
    Round(u32),
}

impl RoundFilter {
    pub fn parse(input: &str) -> DropResult<Self> {
        if input == "all" {
            return Ok(RoundFilter::All);
        }
        parse_round_label(input)
            .map(RoundFilter::Round)
            .ok_or_else(|| DropError::InvalidRound(input.to_string()))
    }

    pub fn matches(&self, key: &RecordKey) -> bool {
        match self {
            RoundFilter::All => true,
            RoundFilter::Round(round) => format!("R{round}") == key.round_label(),
        }
    }
}

impl fmt::Display for RoundFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundFilter::All => f.write_str("all"),
            RoundFilter::Round(round) => write!(f, "R{round}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    All,
    /// Keep the newest `n` records of every team; `None` keeps all of them.
    LatestPerTeam(Option<usize>),
}

impl Reduction {
    /// Parses the "how many to show" field of the viewer.
    pub fn latest_from_input(input: &str) -> DropResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(Reduction::LatestPerTeam(None));
        }
        trimmed
            .parse::<usize>()
            .map(|n| Reduction::LatestPerTeam(Some(n)))
            .map_err(|_| {
                DropError::InvalidInput(format!(
                    "number of matches must be a non-negative integer, got {trimmed:?}"
                ))
            })
    }
}
