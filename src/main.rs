mod error;
mod models;
mod screens;
mod services;

use anyhow::{Context, anyhow};
use eframe::egui;
use screens::menu::MenuAction;
use screens::record::{RecordAction, RecordScreen};
use screens::view::{ViewAction, ViewScreen};
use services::config_loader;
use services::workspace::Workspace;
use std::fs;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

enum DropmarkState {
    Menu,
    Record,
    View,
}

struct DropmarkApp {
    state: DropmarkState,
    workspace: Workspace,
    record: RecordScreen,
    view: ViewScreen,
}

impl DropmarkApp {
    fn new(workspace: Workspace) -> Self {
        Self {
            state: DropmarkState::Menu,
            record: RecordScreen::new(&workspace),
            view: ViewScreen::new(&workspace),
            workspace,
        }
    }
}

impl eframe::App for DropmarkApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        match self.state {
            DropmarkState::Menu => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.add_space(8.0);
                    ui.vertical_centered(|ui| match screens::menu::ui(ui, &self.workspace) {
                        MenuAction::Stay => {}
                        MenuAction::Record => {
                            info!("Transition: Menu -> Record");
                            self.state = DropmarkState::Record;
                        }
                        MenuAction::View => {
                            info!("Transition: Menu -> View");
                            self.view.refresh(&self.workspace);
                            self.state = DropmarkState::View;
                        }
                        MenuAction::Quit => {
                            info!("Quit requested");
                            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                        }
                    });
                });
            }
            DropmarkState::Record => {
                match screens::record::ui(ctx, &mut self.record, &self.workspace) {
                    RecordAction::Stay => {}
                    RecordAction::Back => {
                        info!("Transition: Record -> Menu");
                        self.state = DropmarkState::Menu;
                    }
                }
            }
            DropmarkState::View => match screens::view::ui(ctx, &mut self.view, &self.workspace) {
                ViewAction::Stay => {}
                ViewAction::Back => {
                    info!("Transition: View -> Menu");
                    self.state = DropmarkState::Menu;
                }
            },
        }
    }
}

fn init_tracing() -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true);

    let _ = fs::create_dir_all("logs");
    let file_appender = tracing_appender::rolling::daily("logs", "dropmark.log");
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(file_writer)
        .with_target(true);

    let init_result = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    if let Err(err) = init_result {
        eprintln!("tracing init failed: {err}");
        return None;
    }

    Some(file_guard)
}

fn open_workspace() -> anyhow::Result<Workspace> {
    let work_dir = std::env::current_dir().context("cannot determine the working directory")?;
    let config = config_loader::load_dropmark_config(&work_dir).map_err(|message| anyhow!(message))?;
    let workspace = Workspace::open(&work_dir, config)
        .with_context(|| format!("cannot open data folders in {}", work_dir.display()))?;
    Ok(workspace)
}

fn main() -> eframe::Result<()> {
    let _log_guard = init_tracing();
    info!("Starting Dropmark");

    let workspace = match open_workspace() {
        Ok(workspace) => workspace,
        Err(err) => {
            error!("Startup failed: {err:#}");
            rfd::MessageDialog::new()
                .set_level(rfd::MessageLevel::Error)
                .set_title("Dropmark")
                .set_description(format!("{err:#}"))
                .set_buttons(rfd::MessageButtons::Ok)
                .show();
            std::process::exit(1);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1440.0, 900.0])
            .with_maximized(true),
        ..Default::default()
    };

    eframe::run_native(
        "Dropmark",
        options,
        Box::new(move |cc| {
            let mut style = (*cc.egui_ctx.style()).clone();
            style
                .text_styles
                .insert(egui::TextStyle::Heading, egui::FontId::proportional(26.0));
            style
                .text_styles
                .insert(egui::TextStyle::Body, egui::FontId::proportional(17.0));
            style
                .text_styles
                .insert(egui::TextStyle::Button, egui::FontId::proportional(17.0));
            style.spacing.button_padding = egui::vec2(12.0, 6.0);
            cc.egui_ctx.set_style(style);

            Ok(Box::new(DropmarkApp::new(workspace)))
        }),
    )
}
