use chrono::{Datelike, NaiveDate};
use eframe::egui;

use crate::error::DropResult;
use crate::models::{Reduction, RoundFilter};
use crate::screens::map_canvas::MapCanvas;
use crate::screens::widgets::{self, DateParts};
use crate::services::palette::PaletteColor;
use crate::services::query_engine::{self, QueryOutcome, QueryRequest};
use crate::services::workspace::Workspace;

pub enum ViewAction {
    Stay,
    Back,
}

/// Viewer filter form, as entered.
#[derive(Debug, Clone)]
pub struct ViewFilters {
    pub map_choice: Option<String>,
    pub selected_matches: Vec<String>,
    pub selected_teams: Vec<String>,
    pub start: DateParts,
    pub end: DateParts,
    pub round: RoundFilter,
    pub count_input: String,
}

impl ViewFilters {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            map_choice: None,
            selected_matches: Vec::new(),
            selected_teams: Vec::new(),
            start: DateParts::from_date(start),
            end: DateParts::from_date(end),
            round: RoundFilter::All,
            count_input: String::new(),
        }
    }

    /// Turns the form into a query. Selections follow the order of the
    /// displayed lists; an empty selection means "all".
    pub fn to_request(&self, known_matches: &[String], known_teams: &[String]) -> DropResult<QueryRequest> {
        let reduction = Reduction::latest_from_input(&self.count_input)?;
        let date_start = self.start.to_date()?;
        let date_end = self.end.to_date()?;
        Ok(QueryRequest {
            map: self.map_choice.clone(),
            matches: ordered_selection(known_matches, &self.selected_matches),
            teams: ordered_selection(known_teams, &self.selected_teams),
            date_start,
            date_end,
            round: self.round,
            reduction,
        })
    }
}

fn ordered_selection(items: &[String], selected: &[String]) -> Option<Vec<String>> {
    if selected.is_empty() {
        return None;
    }
    Some(
        items
            .iter()
            .filter(|item| selected.contains(item))
            .cloned()
            .collect(),
    )
}

pub struct ViewScreen {
    filters: ViewFilters,
    known_matches: Vec<String>,
    known_teams: Vec<String>,
    outcome: Option<QueryOutcome>,
    canvas: MapCanvas,
}

impl ViewScreen {
    pub fn new(workspace: &Workspace) -> Self {
        let display = &workspace.config.display;
        let year = widgets::today().year();
        let start = NaiveDate::from_ymd_opt(year - display.years_back, 1, 1);
        let end = NaiveDate::from_ymd_opt(year + display.years_forward, 12, 31);
        let today = widgets::today();
        let mut screen = Self {
            filters: ViewFilters::new(start.unwrap_or(today), end.unwrap_or(today)),
            known_matches: Vec::new(),
            known_teams: Vec::new(),
            outcome: None,
            canvas: MapCanvas::default(),
        };
        screen.refresh(workspace);
        screen
    }

    /// Re-reads the match and team lists from the archive.
    pub fn refresh(&mut self, workspace: &Workspace) {
        match (
            workspace.archive.list_match_names(),
            workspace.archive.list_teams(),
        ) {
            (Ok(matches), Ok(teams)) => {
                self.filters.selected_matches.retain(|name| matches.contains(name));
                self.filters.selected_teams.retain(|name| teams.contains(name));
                self.known_matches = matches;
                self.known_teams = teams;
            }
            (Err(err), _) | (_, Err(err)) => widgets::show_error(&err),
        }
    }

    fn show_points(&mut self, workspace: &Workspace) {
        let default_map = match workspace.maps.resolve(None) {
            Ok(map) => map,
            Err(err) => return widgets::show_error(&err),
        };
        let result = self
            .filters
            .to_request(&self.known_matches, &self.known_teams)
            .and_then(|request| query_engine::query(&workspace.archive, &request, &default_map));
        match result {
            Ok(outcome) => self.outcome = Some(outcome),
            Err(err) => widgets::show_error(&err),
        }
    }

    fn displayed_map(&self, workspace: &Workspace) -> Option<String> {
        if let Some(outcome) = &self.outcome {
            return Some(outcome.map.clone());
        }
        workspace
            .maps
            .resolve(self.filters.map_choice.as_deref())
            .ok()
    }
}

fn to_color32(color: PaletteColor) -> egui::Color32 {
    let [r, g, b] = color.rgb;
    egui::Color32::from_rgb(r, g, b)
}

pub fn ui(ctx: &egui::Context, screen: &mut ViewScreen, workspace: &Workspace) -> ViewAction {
    let display = &workspace.config.display;
    let this_year = widgets::today().year();
    let years = (this_year - display.years_back)..=(this_year + display.years_forward);
    let mut action = ViewAction::Stay;

    egui::SidePanel::left("view_filters")
        .resizable(false)
        .show(ctx, |ui| {
            ui.heading("View");
            ui.add_space(8.0);

            ui.label("Map");
            let maps = workspace.maps.list_maps().unwrap_or_default();
            widgets::single_select_list(ui, "view_maps", &maps, &mut screen.filters.map_choice);
            ui.label("Matches");
            widgets::multi_select_list(
                ui,
                "view_matches",
                &screen.known_matches,
                &mut screen.filters.selected_matches,
            );
            ui.label("Teams");
            widgets::multi_select_list(
                ui,
                "view_teams",
                &screen.known_teams,
                &mut screen.filters.selected_teams,
            );
        });

    egui::SidePanel::right("view_controls")
        .resizable(false)
        .show(ctx, |ui| {
            ui.label("Shown teams");
            egui::ScrollArea::vertical()
                .id_salt("view_legend")
                .max_height(200.0)
                .show(ui, |ui| {
                    if let Some(outcome) = &screen.outcome {
                        for entry in &outcome.legend {
                            ui.colored_label(to_color32(entry.color), entry.team.as_str());
                        }
                    }
                });
            ui.add_space(8.0);

            ui.label("Start date");
            widgets::date_picker(ui, "view_start", &mut screen.filters.start, years.clone());
            ui.label("End date");
            widgets::date_picker(ui, "view_end", &mut screen.filters.end, years);
            ui.label("Round");
            widgets::round_filter_picker(ui, "view_round", &mut screen.filters.round, display.max_round);
            ui.label("Matches to show per team");
            ui.text_edit_singleline(&mut screen.filters.count_input);
            ui.add_space(8.0);

            if ui.button("Show").clicked() {
                screen.show_points(workspace);
            }
            if ui.button("Reload lists").clicked() {
                screen.refresh(workspace);
            }
            ui.add_space(8.0);
            if ui.button("Back").clicked() {
                action = ViewAction::Back;
            }
        });

    egui::CentralPanel::default().show(ctx, |ui| {
        let Some(map_name) = screen.displayed_map(workspace) else {
            return;
        };
        let Some(frame) =
            screen
                .canvas
                .show(ui, &workspace.maps, &map_name, display.max_texture_dimension)
        else {
            return;
        };
        if let Some(outcome) = &screen.outcome {
            for hit in &outcome.hits {
                for point in &hit.record.points {
                    frame.draw_point(point, display.marker_radius, to_color32(hit.color));
                }
            }
        }
    });

    action
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DropError;

    fn filters() -> ViewFilters {
        ViewFilters::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        )
    }

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn empty_selection_means_all() {
        let request = filters()
            .to_request(&names(&["scrimX"]), &names(&["teamA"]))
            .unwrap();
        assert!(request.matches.is_none());
        assert!(request.teams.is_none());
        assert_eq!(request.reduction, Reduction::LatestPerTeam(None));
    }

    #[test]
    fn team_selection_follows_list_order() {
        let mut form = filters();
        form.selected_teams = names(&["c", "a"]);
        let request = form.to_request(&[], &names(&["a", "b", "c"])).unwrap();
        assert_eq!(request.teams, Some(names(&["a", "c"])));
    }

    #[test]
    fn bad_count_aborts_before_query() {
        let mut form = filters();
        form.count_input = "two".to_string();
        assert!(matches!(
            form.to_request(&[], &[]),
            Err(DropError::InvalidInput(_))
        ));
    }

    #[test]
    fn impossible_end_date_is_rejected() {
        let mut form = filters();
        form.end = DateParts {
            year: 2024,
            month: 6,
            day: 31,
        };
        assert!(matches!(
            form.to_request(&[], &[]),
            Err(DropError::InvalidDate(_))
        ));
    }
}
