use eframe::egui;

use crate::services::workspace::Workspace;

pub enum MenuAction {
    Stay,
    Record,
    View,
    Quit,
}

pub fn ui(ui: &mut egui::Ui, workspace: &Workspace) -> MenuAction {
    ui.heading("Dropmark");
    ui.add_space(8.0);
    ui.label("Record landing spots per team and round, then review them on the map.");

    let staged = workspace.staging.list().map(|entries| entries.len()).unwrap_or(0);
    let teams = workspace.archive.list_teams().map(|teams| teams.len()).unwrap_or(0);
    ui.label(format!("Teams: {teams} | staged records: {staged}"));
    ui.add_space(16.0);

    let mut action = MenuAction::Stay;
    ui.horizontal(|ui| {
        if ui.button("Record").clicked() {
            action = MenuAction::Record;
        }
        if ui.button("View").clicked() {
            action = MenuAction::View;
        }
        if ui.button("Quit").clicked() {
            action = MenuAction::Quit;
        }
    });
    action
}
