// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Top-level egui application shell: menu bar, toolbar, file browser,
//! status area and the modal dialogs.

pub mod components;

use std::time::Duration;

use eframe::egui;
use egui_phosphor::regular as icons;

use crate::config::Settings;
use crate::mvu::{self, APP_VERSION, AppModel, Command, Msg};
use crate::ui::components::{browser, compress_dialog};

/// Stateful egui application wrapping the MVU kernel.
pub struct LinrzApp {
    model: AppModel,
    inbox: Vec<Msg>,
    cmd_tx: crossbeam_channel::Sender<Command>,
    msg_rx: crossbeam_channel::Receiver<Msg>,
    progress_rx: crossbeam_channel::Receiver<String>,
}

impl LinrzApp {
    /// Spawn the command workers and queue the initial directory listing.
    pub fn new(settings: Settings) -> Self {
        let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded::<Command>();
        let (msg_tx, msg_rx) = crossbeam_channel::unbounded::<Msg>();
        let (progress_tx, progress_rx) = crossbeam_channel::unbounded::<String>();

        let threads = std::thread::available_parallelism()
            .map(|n| n.get().max(2))
            .unwrap_or(2);
        for _ in 0..threads {
            let cmd_rx = cmd_rx.clone();
            let msg_tx = msg_tx.clone();
            let progress_tx = progress_tx.clone();
            std::thread::spawn(move || {
                for cmd in cmd_rx.iter() {
                    let msg = mvu::run_command(cmd, &progress_tx);
                    let _ = msg_tx.send(msg);
                }
            });
        }

        Self {
            model: AppModel::new(settings),
            inbox: vec![Msg::Browser(browser::BrowserMsg::Refresh)],
            cmd_tx,
            msg_rx,
            progress_rx,
        }
    }
}

impl eframe::App for LinrzApp {
    /// Required by eframe 0.34; rendering happens in `update`, which eframe
    /// still invokes each frame before `ui`.
    fn ui(&mut self, _ui: &mut egui::Ui, _frame: &mut eframe::Frame) {}

    /// Drives a single UI frame: drains worker output, runs the update loop,
    /// then renders panels and modals. Views push new messages into the inbox
    /// for the next frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Progress lines first so a completion message resets the label last.
        while let Ok(line) = self.progress_rx.try_recv() {
            self.inbox.push(Msg::Progress(line));
        }

        // Pull messages produced by the command workers.
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.model.pending_commands = self.model.pending_commands.saturating_sub(1);
            self.inbox.push(msg);
        }

        for msg in std::mem::take(&mut self.inbox) {
            let mut commands = Vec::new();
            mvu::update(&mut self.model, msg, &mut commands);
            for cmd in commands {
                if self.cmd_tx.send(cmd).is_ok() {
                    self.model.pending_commands += 1;
                }
            }
        }

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            self.render_menu_bar(ui);
        });

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.add_space(4.0);
            self.render_toolbar(ui);
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("status_panel")
            .resizable(false)
            .show(ctx, |ui| {
                self.render_status(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let msgs = browser::view(ui, &self.model.browser);
            self.inbox.extend(msgs.into_iter().map(Msg::Browser));
        });

        if let Some(dialog) = &self.model.compress_dialog {
            let msgs = compress_dialog::view(ctx, dialog);
            self.inbox.extend(msgs.into_iter().map(Msg::CompressDialog));
        }
        self.render_confirm_extract(ctx);
        self.render_notice(ctx);
        self.render_about(ctx);
        self.render_error_modal(ctx);

        if !self.inbox.is_empty() {
            ctx.request_repaint();
        } else if self.model.pending_commands > 0 {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

impl LinrzApp {
    fn render_menu_bar(&mut self, ui: &mut egui::Ui) {
        let busy = self.model.job.is_some();
        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui
                    .add_enabled(!busy, egui::Button::new("Add to Archive..."))
                    .clicked()
                {
                    self.inbox.push(Msg::OpenCompressDialog);
                    ui.close();
                }
                if ui
                    .add_enabled(!busy, egui::Button::new("Extract Archive..."))
                    .clicked()
                {
                    self.inbox.push(Msg::RequestExtractDialog);
                    ui.close();
                }
                ui.separator();
                if ui.button("Exit").clicked() {
                    ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });
            ui.menu_button("Help", |ui| {
                if ui.button("About").clicked() {
                    self.inbox.push(Msg::ShowAbout);
                    ui.close();
                }
            });
        });
    }

    fn render_toolbar(&mut self, ui: &mut egui::Ui) {
        let busy = self.model.job.is_some();
        ui.horizontal(|ui| {
            let add = ui
                .add_enabled(
                    !busy,
                    egui::Button::new(format!("{} Add", icons::PLUS_CIRCLE)),
                )
                .on_hover_text("Add files or a folder to a new archive");
            if add.clicked() {
                self.inbox.push(Msg::OpenCompressDialog);
            }
            let extract = ui
                .add_enabled(
                    !busy,
                    egui::Button::new(format!("{} Extract", icons::ARCHIVE)),
                )
                .on_hover_text("Extract an archive");
            if extract.clicked() {
                self.inbox.push(Msg::RequestExtractDialog);
            }
            let test = ui
                .add_enabled(
                    !busy,
                    egui::Button::new(format!("{} Test", icons::CHECK_CIRCLE)),
                )
                .on_hover_text("Test the selected archive");
            if test.clicked() {
                self.inbox.push(Msg::TestRequested);
            }

            ui.separator();

            if ui
                .button(format!("{} Up", icons::ARROW_UP))
                .on_hover_text("Go to the parent directory")
                .clicked()
            {
                self.inbox.push(Msg::Browser(browser::BrowserMsg::GoUp));
            }
            if ui
                .button(format!("{} Refresh", icons::ARROW_CLOCKWISE))
                .on_hover_text("Reload the current directory")
                .clicked()
            {
                self.inbox.push(Msg::Browser(browser::BrowserMsg::Refresh));
            }
        });
    }

    /// Render the progress line above the status bar.
    fn render_status(&self, ui: &mut egui::Ui) {
        ui.add_space(2.0);
        ui.horizontal(|ui| {
            if self.model.job.is_some() {
                ui.add(egui::Spinner::new().size(14.0));
            }
            ui.label(self.model.progress.as_str());
        });
        ui.separator();
        if let Some(text) = &self.model.status {
            ui.label(egui::RichText::new(text).color(egui::Color32::from_gray(110)));
        }
        ui.add_space(2.0);
    }

    fn render_confirm_extract(&mut self, ctx: &egui::Context) {
        let Some(archive) = self.model.confirm_extract.clone() else {
            return;
        };
        let name = archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| archive.display().to_string());
        egui::Window::new("Extract")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(format!("Extract {name}?"));
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Yes").clicked() {
                        self.inbox.push(Msg::ConfirmExtract);
                    }
                    if ui.button("No").clicked() {
                        self.inbox.push(Msg::DeclineExtract);
                    }
                });
            });
    }

    fn render_notice(&mut self, ctx: &egui::Context) {
        let Some(notice) = self.model.notice.clone() else {
            return;
        };
        egui::Window::new(notice.title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(notice.message);
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() {
                        self.inbox.push(Msg::DismissNotice);
                    }
                    if let Some(path) = notice.open_path
                        && ui
                            .button(format!("{} Open folder", icons::FOLDER_OPEN))
                            .clicked()
                    {
                        self.inbox.push(Msg::OpenPath(path));
                    }
                });
            });
    }

    fn render_about(&mut self, ctx: &egui::Context) {
        if !self.model.show_about {
            return;
        }
        egui::Window::new("About LinRZ")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.heading(format!("LinRZ v{APP_VERSION}"));
                ui.label("Universal archive compressor and extractor.");
                ui.add_space(4.0);
                ui.label("Create: ZIP, TAR.GZ, TAR.BZ2, TAR.XZ, 7Z");
                ui.label("Extract: ZIP, TAR, TAR.GZ, TAR.BZ2, TAR.XZ, 7Z, RAR");
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    self.inbox.push(Msg::DismissAbout);
                }
            });
    }

    /// Render a simple modal window for error messages.
    fn render_error_modal(&mut self, ctx: &egui::Context) {
        if let Some(message) = self.model.error.clone() {
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    ui.label(message);
                    ui.add_space(8.0);
                    if ui.button("OK").clicked() {
                        self.inbox.push(Msg::DismissError);
                    }
                });
        }
    }
}
