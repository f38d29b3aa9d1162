use chrono::{Datelike, NaiveDate};
use eframe::egui;
use tracing::info;

use crate::error::{DropError, DropResult};
use crate::models::{DropRecord, Point, RecordKey};
use crate::screens::map_canvas::MapCanvas;
use crate::screens::widgets::{self, DateParts};
use crate::services::coords;
use crate::services::staging_store::StageOutcome;
use crate::services::workspace::Workspace;

pub enum RecordAction {
    Stay,
    Back,
}

/// Form contents plus the clicks collected for the record being entered.
#[derive(Debug, Clone)]
pub struct RecordSession {
    pub team: String,
    pub match_name: String,
    pub map_name: String,
    pub date: DateParts,
    pub round: u32,
    pub points: Vec<Point>,
}

impl RecordSession {
    pub fn new(map_name: String, date: NaiveDate) -> Self {
        Self {
            team: String::new(),
            match_name: String::new(),
            map_name,
            date: DateParts::from_date(date),
            round: 1,
            points: Vec::new(),
        }
    }

    pub fn build_record(&self) -> DropResult<DropRecord> {
        Ok(DropRecord {
            team: self.team.clone(),
            match_name: self.match_name.clone(),
            map_name: self.map_name.clone(),
            date: self.date.to_date()?,
            round_count: self.round,
            points: self.points.clone(),
        })
    }

    pub fn change_map(&mut self, map_name: String) {
        self.map_name = map_name;
        self.points.clear();
    }
}

/// Validates the session and stages it.
///
/// Returns `None` when the user declined to register a new team. Pending
/// points are dropped once a stage attempt reaches the store, and when too
/// many were placed.
pub fn stage_session<R, O>(
    workspace: &Workspace,
    session: &mut RecordSession,
    confirm_register: R,
    confirm_overwrite: O,
) -> DropResult<Option<StageOutcome>>
where
    R: FnOnce(&str) -> bool,
    O: FnOnce(&RecordKey) -> bool,
{
    let record = session.build_record()?;
    if let Err(err) = record.validate() {
        if matches!(err, DropError::TooManyPoints(_)) {
            session.points.clear();
        }
        return Err(err);
    }

    if !workspace.archive.has_team(&record.team) {
        if !confirm_register(&record.team) {
            return Ok(None);
        }
        workspace.archive.ensure_team(&record.team)?;
    }

    let outcome = workspace.staging.stage(&record, confirm_overwrite);
    session.points.clear();
    outcome.map(Some)
}

pub struct RecordScreen {
    session: RecordSession,
    map_choice: Option<String>,
    staged_choice: Option<String>,
    canvas: MapCanvas,
}

impl RecordScreen {
    pub fn new(workspace: &Workspace) -> Self {
        let map_name = workspace
            .maps
            .resolve(None)
            .unwrap_or_else(|_| workspace.config.default_map.clone());
        Self {
            session: RecordSession::new(map_name, widgets::today()),
            map_choice: None,
            staged_choice: None,
            canvas: MapCanvas::default(),
        }
    }

    fn stage(&mut self, workspace: &Workspace) {
        let result = stage_session(
            workspace,
            &mut self.session,
            |team| {
                widgets::confirm(
                    "New team",
                    &format!("Team \"{team}\" is not registered yet.\nRegister it as a new team?"),
                )
            },
            |key| {
                widgets::confirm(
                    "Duplicate",
                    &format!("{key} is already staged.\nOverwrite it?"),
                )
            },
        );
        match result {
            Ok(Some(outcome)) => info!("Stage result: {:?}", outcome),
            Ok(None) => info!("Team registration declined, nothing staged"),
            Err(err) => widgets::show_error(&err),
        }
    }

    fn commit(&mut self, workspace: &Workspace) {
        let result = workspace.staging.commit_all(&workspace.archive, |key| {
            widgets::confirm(
                "Overwrite",
                &format!("{key} already exists in the archive.\nOverwrite it?"),
            )
        });
        match result {
            Ok(report) => {
                if let Some(team) = report.last_team {
                    self.session.team = team;
                }
                self.staged_choice = None;
            }
            Err(err) => widgets::show_error(&err),
        }
    }

    fn delete_staged(&mut self, workspace: &Workspace) {
        let selection: Vec<String> = self.staged_choice.iter().cloned().collect();
        match workspace.staging.delete_selected(&selection) {
            Ok(()) => self.staged_choice = None,
            Err(err) => widgets::show_error(&err),
        }
    }
}

pub fn ui(ctx: &egui::Context, screen: &mut RecordScreen, workspace: &Workspace) -> RecordAction {
    let display = &workspace.config.display;
    let this_year = widgets::today().year();
    let years = (this_year - display.years_back)..=(this_year + display.years_forward);
    let mut action = RecordAction::Stay;

    egui::SidePanel::left("record_form")
        .resizable(false)
        .show(ctx, |ui| {
            ui.heading("Record");
            ui.add_space(8.0);

            ui.label("Team name");
            ui.text_edit_singleline(&mut screen.session.team);
            ui.label("Scrim or league name");
            ui.text_edit_singleline(&mut screen.session.match_name);
            ui.add_space(8.0);

            ui.label(format!("Map: {}", screen.session.map_name));
            let maps = workspace.maps.list_maps().unwrap_or_default();
            widgets::single_select_list(ui, "record_maps", &maps, &mut screen.map_choice);
            if ui.button("Change map").clicked()
                && let Some(map_name) = screen.map_choice.clone()
            {
                info!("Recording map changed to {}", map_name);
                screen.session.change_map(map_name);
            }
            ui.add_space(8.0);

            ui.label("Date");
            widgets::date_picker(ui, "record_date", &mut screen.session.date, years);
            ui.label("Round");
            widgets::round_picker(ui, "record_round", &mut screen.session.round, display.max_round);
            ui.add_space(8.0);

            ui.label(format!("Points placed: {}", screen.session.points.len()));
            if ui.button("Clear points").clicked() {
                screen.session.points.clear();
            }
        });

    egui::SidePanel::right("record_staging")
        .resizable(false)
        .show(ctx, |ui| {
            ui.heading("Staged records");
            let staged = match workspace.staging.list() {
                Ok(staged) => staged,
                Err(err) => {
                    ui.colored_label(egui::Color32::LIGHT_RED, err.to_string());
                    Vec::new()
                }
            };
            widgets::single_select_list(ui, "record_staged", &staged, &mut screen.staged_choice);
            ui.add_space(8.0);

            if ui.button("Delete staged").clicked() {
                screen.delete_staged(workspace);
            }
            if ui.button("Stage").clicked() {
                screen.stage(workspace);
            }
            if ui.button("Commit").clicked() {
                screen.commit(workspace);
            }
            ui.add_space(8.0);
            if ui.button("Back").clicked() {
                action = RecordAction::Back;
            }
        });

    egui::CentralPanel::default().show(ctx, |ui| {
        let map_name = screen.session.map_name.clone();
        let Some(frame) =
            screen
                .canvas
                .show(ui, &workspace.maps, &map_name, display.max_texture_dimension)
        else {
            return;
        };

        if let Some((x, y)) = frame.clicked_offset() {
            match coords::capture(x, y, frame.side, frame.side) {
                Ok(point) => screen.session.points.push(point),
                Err(err) => widgets::show_error(&err),
            }
        }
        for point in &screen.session.points {
            frame.draw_point(point, display.marker_radius, egui::Color32::RED);
        }
    });

    action
}
