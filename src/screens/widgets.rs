use chrono::{Datelike, NaiveDate};
use eframe::egui;
use rfd::{MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use tracing::warn;

use crate::error::{DropError, DropResult, ErrorCategory};
use crate::models::{RoundFilter, parse_date_parts};

/// Year/month/day as picked in the combo boxes; may not be a real date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateParts {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl DateParts {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }

    pub fn to_date(self) -> DropResult<NaiveDate> {
        parse_date_parts(self.year, self.month, self.day)
    }
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn date_picker(
    ui: &mut egui::Ui,
    id: &str,
    parts: &mut DateParts,
    years: std::ops::RangeInclusive<i32>,
) {
    ui.horizontal(|ui| {
        egui::ComboBox::from_id_salt(format!("{id}_year"))
            .width(80.0)
            .selected_text(parts.year.to_string())
            .show_ui(ui, |ui| {
                for year in years {
                    ui.selectable_value(&mut parts.year, year, year.to_string());
                }
            });
        egui::ComboBox::from_id_salt(format!("{id}_month"))
            .width(50.0)
            .selected_text(parts.month.to_string())
            .show_ui(ui, |ui| {
                for month in 1..=12 {
                    ui.selectable_value(&mut parts.month, month, month.to_string());
                }
            });
        egui::ComboBox::from_id_salt(format!("{id}_day"))
            .width(50.0)
            .selected_text(parts.day.to_string())
            .show_ui(ui, |ui| {
                for day in 1..=31 {
                    ui.selectable_value(&mut parts.day, day, day.to_string());
                }
            });
    });
}

pub fn round_picker(ui: &mut egui::Ui, id: &str, round: &mut u32, max_round: u32) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(format!("R{round}"))
        .show_ui(ui, |ui| {
            for value in 1..=max_round.max(1) {
                ui.selectable_value(round, value, format!("R{value}"));
            }
        });
}

pub fn round_filter_picker(ui: &mut egui::Ui, id: &str, filter: &mut RoundFilter, max_round: u32) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(filter.to_string())
        .show_ui(ui, |ui| {
            ui.selectable_value(filter, RoundFilter::All, "all");
            for value in 1..=max_round.max(1) {
                ui.selectable_value(filter, RoundFilter::Round(value), format!("R{value}"));
            }
        });
}

/// Multi-select list; `selected` keeps the entries that are switched on.
pub fn multi_select_list(
    ui: &mut egui::Ui,
    id: &str,
    items: &[String],
    selected: &mut Vec<String>,
) {
    egui::ScrollArea::vertical()
        .id_salt(id)
        .max_height(160.0)
        .show(ui, |ui| {
            if items.is_empty() {
                ui.weak("(none recorded)");
            }
            for item in items {
                let is_selected = selected.contains(item);
                if ui.selectable_label(is_selected, item.as_str()).clicked() {
                    if is_selected {
                        selected.retain(|name| name != item);
                    } else {
                        selected.push(item.clone());
                    }
                }
            }
        });
}

pub fn single_select_list(
    ui: &mut egui::Ui,
    id: &str,
    items: &[String],
    selected: &mut Option<String>,
) {
    egui::ScrollArea::vertical()
        .id_salt(id)
        .max_height(160.0)
        .show(ui, |ui| {
            for item in items {
                let is_selected = selected.as_deref() == Some(item.as_str());
                if ui.selectable_label(is_selected, item.as_str()).clicked() {
                    *selected = if is_selected { None } else { Some(item.clone()) };
                }
            }
        });
}

pub fn show_error(err: &DropError) {
    warn!("{err}");
    let title = match err.category() {
        ErrorCategory::Validation => "Invalid input",
        ErrorCategory::Conflict => "Already exists",
        ErrorCategory::NotFound => "Not found",
        ErrorCategory::Precondition => "Cannot continue",
        ErrorCategory::Storage => "Storage error",
    };
    MessageDialog::new()
        .set_level(MessageLevel::Error)
        .set_title(title)
        .set_description(err.to_string())
        .set_buttons(MessageButtons::Ok)
        .show();
}

pub fn confirm(title: &str, description: &str) -> bool {
    let answer = MessageDialog::new()
        .set_level(MessageLevel::Warning)
        .set_title(title)
        .set_description(description)
        .set_buttons(MessageButtons::YesNo)
        .show();
    matches!(answer, MessageDialogResult::Yes)
}
