use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::error::DropResult;
use crate::models::{DropRecord, RecordKey, Reduction, RoundFilter, map_stem};
use crate::services::palette::{self, PaletteColor};
use crate::services::team_archive::TeamArchive;

#[derive(Debug, Clone)]
pub struct QueryRequest {
    /// Map image filename; `None` falls back to the default map.
    pub map: Option<String>,
    /// `None` means every known match name.
    pub matches: Option<Vec<String>>,
    /// `None` means every known team. The order decides team colors.
    pub teams: Option<Vec<String>>,
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    pub round: RoundFilter,
    pub reduction: Reduction,
}

#[derive(Debug, Clone)]
pub struct QueryHit {
    pub key: RecordKey,
    pub record: DropRecord,
    pub color: PaletteColor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    pub team: String,
    pub color: PaletteColor,
}

#[derive(Debug, Default)]
pub struct QueryOutcome {
    pub map: String,
    pub hits: Vec<QueryHit>,
    /// Teams with at least one matching record, in discovery order.
    pub legend: Vec<LegendEntry>,
}

struct Candidate {
    file_name: String,
    key: RecordKey,
    color: PaletteColor,
}

pub fn query(
    archive: &TeamArchive,
    request: &QueryRequest,
    default_map: &str,
) -> DropResult<QueryOutcome> {
    let map = request
        .map
        .clone()
        .unwrap_or_else(|| default_map.to_string());
    let wanted_stem = map_stem(&map).unwrap_or_default();
    let matches = match &request.matches {
        Some(matches) => matches.clone(),
        None => archive.list_match_names()?,
    };
    let teams = match &request.teams {
        Some(teams) => teams.clone(),
        None => archive.list_teams()?,
    };

    let mut candidates = Vec::new();
    let mut legend: Vec<LegendEntry> = Vec::new();

    for team in archive.list_teams()? {
        let Some(team_index) = teams.iter().position(|name| *name == team) else {
            continue;
        };
        let color = palette::color_for(team_index);

        for (file_name, key) in archive.list_keys(&team)? {
            let included = matches.contains(&key.match_name)
                && request.date_start <= key.date
                && key.date <= request.date_end
                && key.map_stem == wanted_stem
                && request.round.matches(&key);
            if !included {
                continue;
            }
            if !legend.iter().any(|entry| entry.team == team) {
                legend.push(LegendEntry {
                    team: team.clone(),
                    color,
                });
            }
            candidates.push(Candidate {
                file_name,
                key,
                color,
            });
        }
    }
    debug!("{} archived records passed the filters", candidates.len());

    if let Reduction::LatestPerTeam(num) = request.reduction {
        candidates = latest_per_team(candidates, &teams, num);
    }

    let mut hits = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match archive.read(&candidate.key.team, &candidate.file_name) {
            Ok(record) => hits.push(QueryHit {
                key: candidate.key,
                record,
                color: candidate.color,
            }),
            Err(err) => warn!("Skipping unreadable record {}: {}", candidate.file_name, err),
        }
    }

    info!(
        "Query on {} returned {} records for {} teams",
        map,
        hits.len(),
        legend.len()
    );
    Ok(QueryOutcome { map, hits, legend })
}

/// Keeps the newest `num` candidates of each team, newest first.
///
/// Ordering is by date, then by the round label as a string, so `R10` sorts
/// before `R2`.
fn latest_per_team(
    candidates: Vec<Candidate>,
    teams: &[String],
    num: Option<usize>,
) -> Vec<Candidate> {
    let mut remaining = candidates;
    let mut kept = Vec::new();

    for team in teams {
        let (mut group, rest): (Vec<Candidate>, Vec<Candidate>) =
            remaining.into_iter().partition(|c| c.key.team == *team);
        remaining = rest;
        if group.is_empty() {
            continue;
        }

        group.sort_by(|a, b| {
            (a.key.date, a.key.round_label()).cmp(&(b.key.date, b.key.round_label()))
        });
        let take = num.map_or(group.len(), |n| n.min(group.len()));
        kept.extend(group.into_iter().rev().take(take));
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Point;
    use crate::services::record_file;
    use crate::services::palette::PALETTE;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn put(archive: &TeamArchive, team: &str, match_name: &str, map: &str, day: NaiveDate, round: u32) {
        let rec = DropRecord {
            team: team.to_string(),
            match_name: match_name.to_string(),
            map_name: map.to_string(),
            date: day,
            round_count: round,
            points: vec![Point { x: 10, y: 10, w: 100, h: 100 }],
        };
        archive.ensure_team(team).unwrap();
        let path = archive.root().join(team).join(rec.key().unwrap().file_name());
        record_file::write_record(&path, &rec, false).unwrap();
    }

    fn request() -> QueryRequest {
        QueryRequest {
            map: Some("Erangel.jpg".to_string()),
            matches: None,
            teams: None,
            date_start: date(1, 1),
            date_end: date(12, 31),
            round: RoundFilter::All,
            reduction: Reduction::All,
        }
    }

    fn stems(outcome: &QueryOutcome) -> Vec<String> {
        outcome.hits.iter().map(|hit| hit.key.file_stem()).collect()
    }

    #[test]
    fn date_range_scenario_returns_both_records() {
        let dir = tempfile::tempdir().unwrap();
        let archive = TeamArchive::open(dir.path()).unwrap();
        put(&archive, "teamA", "scrimX", "Erangel.jpg", date(1, 10), 1);
        put(&archive, "teamA", "scrimX", "Erangel.jpg", date(1, 20), 2);
        put(&archive, "teamA", "scrimX", "Erangel.jpg", date(2, 1), 3);

        let req = QueryRequest {
            matches: Some(vec!["scrimX".to_string()]),
            teams: Some(vec!["teamA".to_string()]),
            date_start: date(1, 1),
            date_end: date(1, 31),
            ..request()
        };
        let outcome = query(&archive, &req, "Erangel.jpg").unwrap();
        assert_eq!(
            stems(&outcome),
            vec![
                "teamA_scrimX_Erangel_2024-01-10_R1",
                "teamA_scrimX_Erangel_2024-01-20_R2"
            ]
        );
        assert_eq!(outcome.hits[0].record.round_count, 1);
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let dir = tempfile::tempdir().unwrap();
        let archive = TeamArchive::open(dir.path()).unwrap();
        put(&archive, "teamA", "scrimX", "Erangel.jpg", date(1, 10), 1);
        let req = QueryRequest {
            date_start: date(1, 10),
            date_end: date(1, 10),
            ..request()
        };
        assert_eq!(query(&archive, &req, "Erangel.jpg").unwrap().hits.len(), 1);
    }

    #[test]
    fn round_filter_all_versus_single() {
        let dir = tempfile::tempdir().unwrap();
        let archive = TeamArchive::open(dir.path()).unwrap();
        for round in 1..=4 {
            put(&archive, "teamA", "scrimX", "Erangel.jpg", date(3, 1), round);
        }

        let all = query(&archive, &request(), "Erangel.jpg").unwrap();
        assert_eq!(all.hits.len(), 4);

        let req = QueryRequest {
            round: RoundFilter::Round(3),
            ..request()
        };
        let third = query(&archive, &req, "Erangel.jpg").unwrap();
        assert_eq!(stems(&third), vec!["teamA_scrimX_Erangel_2024-03-01_R3"]);
    }

    #[test]
    fn map_and_match_filters() {
        let dir = tempfile::tempdir().unwrap();
        let archive = TeamArchive::open(dir.path()).unwrap();
        put(&archive, "teamA", "scrimX", "Erangel.jpg", date(3, 1), 1);
        put(&archive, "teamA", "scrimX", "Miramar.png", date(3, 1), 1);
        put(&archive, "teamA", "league", "Erangel.jpg", date(3, 1), 2);

        let miramar = QueryRequest {
            map: Some("Miramar.png".to_string()),
            ..request()
        };
        assert_eq!(query(&archive, &miramar, "Erangel.jpg").unwrap().hits.len(), 1);

        let unset_map = QueryRequest {
            map: None,
            matches: Some(vec!["league".to_string()]),
            ..request()
        };
        let outcome = query(&archive, &unset_map, "Erangel.jpg").unwrap();
        assert_eq!(outcome.map, "Erangel.jpg");
        assert_eq!(stems(&outcome), vec!["teamA_league_Erangel_2024-03-01_R2"]);
    }

    #[test]
    fn colors_depend_on_team_list_position() {
        let dir = tempfile::tempdir().unwrap();
        let archive = TeamArchive::open(dir.path()).unwrap();
        put(&archive, "alpha", "scrimX", "Erangel.jpg", date(3, 1), 1);
        put(&archive, "bravo", "scrimX", "Erangel.jpg", date(3, 1), 1);

        let req = QueryRequest {
            teams: Some(vec!["bravo".to_string(), "alpha".to_string()]),
            ..request()
        };
        let outcome = query(&archive, &req, "Erangel.jpg").unwrap();
        let legend: Vec<(&str, PaletteColor)> = outcome
            .legend
            .iter()
            .map(|entry| (entry.team.as_str(), entry.color))
            .collect();
        assert_eq!(legend, vec![("alpha", PALETTE[1]), ("bravo", PALETTE[0])]);

        let only_alpha = QueryRequest {
            teams: Some(vec!["alpha".to_string()]),
            ..request()
        };
        let outcome = query(&archive, &only_alpha, "Erangel.jpg").unwrap();
        assert_eq!(outcome.hits.len(), 1);
        assert_eq!(outcome.hits[0].color, PALETTE[0]);
    }

    #[test]
    fn latest_per_team_keeps_newest() {
        let dir = tempfile::tempdir().unwrap();
        let archive = TeamArchive::open(dir.path()).unwrap();
        put(&archive, "teamA", "scrimX", "Erangel.jpg", date(1, 10), 1);
        put(&archive, "teamA", "scrimX", "Erangel.jpg", date(1, 20), 1);
        put(&archive, "teamA", "scrimX", "Erangel.jpg", date(1, 15), 4);
        put(&archive, "teamB", "scrimX", "Erangel.jpg", date(1, 5), 2);

        let req = QueryRequest {
            reduction: Reduction::LatestPerTeam(Some(1)),
            ..request()
        };
        let outcome = query(&archive, &req, "Erangel.jpg").unwrap();
        assert_eq!(
            stems(&outcome),
            vec![
                "teamA_scrimX_Erangel_2024-01-20_R1",
                "teamB_scrimX_Erangel_2024-01-05_R2"
            ]
        );

        let req = QueryRequest {
            reduction: Reduction::LatestPerTeam(Some(2)),
            ..request()
        };
        let outcome = query(&archive, &req, "Erangel.jpg").unwrap();
        assert_eq!(
            stems(&outcome),
            vec![
                "teamA_scrimX_Erangel_2024-01-20_R1",
                "teamA_scrimX_Erangel_2024-01-15_R4",
                "teamB_scrimX_Erangel_2024-01-05_R2"
            ]
        );
    }

    #[test]
    fn latest_without_count_or_with_large_count_keeps_group() {
        let dir = tempfile::tempdir().unwrap();
        let archive = TeamArchive::open(dir.path()).unwrap();
        for day in [3, 1, 2] {
            put(&archive, "teamA", "scrimX", "Erangel.jpg", date(1, day), 1);
        }
        for reduction in [Reduction::LatestPerTeam(None), Reduction::LatestPerTeam(Some(10))] {
            let req = QueryRequest {
                reduction,
                ..request()
            };
            let outcome = query(&archive, &req, "Erangel.jpg").unwrap();
            let days: Vec<NaiveDate> = outcome.hits.iter().map(|hit| hit.key.date).collect();
            assert_eq!(days, vec![date(1, 3), date(1, 2), date(1, 1)]);
        }
    }

    #[test]
    fn same_day_rounds_compare_as_text() {
        let dir = tempfile::tempdir().unwrap();
        let archive = TeamArchive::open(dir.path()).unwrap();
        put(&archive, "teamA", "scrimX", "Erangel.jpg", date(1, 10), 2);
        put(&archive, "teamA", "scrimX", "Erangel.jpg", date(1, 10), 10);

        let req = QueryRequest {
            reduction: Reduction::LatestPerTeam(Some(1)),
            ..request()
        };
        let outcome = query(&archive, &req, "Erangel.jpg").unwrap();
        // "R2" > "R10" as strings, so round 2 counts as the latest.
        assert_eq!(stems(&outcome), vec!["teamA_scrimX_Erangel_2024-01-10_R2"]);
    }

    #[test]
    fn unreadable_records_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let archive = TeamArchive::open(dir.path()).unwrap();
        put(&archive, "teamA", "scrimX", "Erangel.jpg", date(1, 10), 1);
        std::fs::write(
            dir.path().join("teamA").join("teamA_scrimX_Erangel_2024-01-11_R1.json"),
            b"garbage",
        )
        .unwrap();

        let outcome = query(&archive, &request(), "Erangel.jpg").unwrap();
        assert_eq!(outcome.hits.len(), 1);
    }
}
