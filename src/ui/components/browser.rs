// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! File browser: location bar plus the directory table, MVU-style.

use std::path::{Path, PathBuf};
use std::{fs, io};

use eframe::egui;
use egui_extras::{Column, TableBuilder};

use crate::models::entry::{DirEntry, EntryKind, read_directory};
use crate::utils::{format_size, icon_for};

/// Browser state: where we are and what is listed there.
pub struct BrowserModel {
    current_dir: PathBuf,
    path_input: String,
    entries: Vec<DirEntry>,
    selected: Option<usize>,
}

/// Messages emitted by the browser view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BrowserMsg {
    Refresh,
    GoUp,
    PathInputChanged(String),
    /// Enter pressed in the location bar.
    SubmitPath,
    Navigate(PathBuf),
    Select(usize),
    /// Double-click on a row.
    Activate(usize),
    RequestBrowse,
    BrowseCancelled,
}

/// Side effects the root must perform on the browser's behalf.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BrowserCommand {
    PickDirectory { initial: PathBuf },
    /// An archive was double-clicked; ask before extracting it.
    ConfirmExtract(PathBuf),
    /// The listed directory changed (persisted as the last location).
    DirectoryChanged(PathBuf),
}

/// User-facing events for status/error surfaces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrowserEvent {
    pub message: String,
    pub is_error: bool,
}

impl BrowserEvent {
    fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
        }
    }
}

impl BrowserModel {
    /// Point the browser at `dir` without touching the filesystem yet;
    /// send [`BrowserMsg::Refresh`] to populate it.
    pub fn new(dir: PathBuf) -> Self {
        Self {
            path_input: dir.display().to_string(),
            current_dir: dir,
            entries: Vec::new(),
            selected: None,
        }
    }

    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    pub fn entries(&self) -> &[DirEntry] {
        &self.entries
    }

    /// Currently highlighted row, if any.
    pub fn selected_entry(&self) -> Option<&DirEntry> {
        self.selected.and_then(|i| self.entries.get(i))
    }
}

/// Apply a message to the browser model. Returns a user-facing event when relevant.
pub fn update(
    model: &mut BrowserModel,
    msg: BrowserMsg,
    cmds: &mut Vec<BrowserCommand>,
) -> Option<BrowserEvent> {
    match msg {
        BrowserMsg::Refresh => Some(refresh(model)),
        BrowserMsg::GoUp => {
            let parent = model.current_dir.parent()?.to_path_buf();
            Some(navigate(model, parent, cmds))
        }
        BrowserMsg::PathInputChanged(text) => {
            model.path_input = text;
            None
        }
        BrowserMsg::SubmitPath => {
            // Relative input is taken from the listed directory, not the process cwd.
            let typed = model.current_dir.join(model.path_input.trim());
            match fs::canonicalize(&typed) {
                Ok(target) if target.is_dir() => Some(navigate(model, target, cmds)),
                _ => {
                    model.path_input = model.current_dir.display().to_string();
                    Some(BrowserEvent::error("Invalid directory path"))
                }
            }
        }
        BrowserMsg::Navigate(dir) => {
            if dir.is_dir() {
                Some(navigate(model, dir, cmds))
            } else {
                Some(BrowserEvent::error("Invalid directory path"))
            }
        }
        BrowserMsg::Select(index) => {
            model.selected = (index < model.entries.len()).then_some(index);
            None
        }
        BrowserMsg::Activate(index) => {
            let entry = model.entries.get(index)?.clone();
            model.selected = Some(index);
            match entry.kind {
                EntryKind::Parent => update(model, BrowserMsg::GoUp, cmds),
                EntryKind::Folder => Some(navigate(model, entry.path, cmds)),
                EntryKind::File if entry.is_archive() => {
                    cmds.push(BrowserCommand::ConfirmExtract(entry.path));
                    None
                }
                EntryKind::File => None,
            }
        }
        BrowserMsg::RequestBrowse => {
            cmds.push(BrowserCommand::PickDirectory {
                initial: model.current_dir.clone(),
            });
            None
        }
        BrowserMsg::BrowseCancelled => None,
    }
}

fn navigate(model: &mut BrowserModel, dir: PathBuf, cmds: &mut Vec<BrowserCommand>) -> BrowserEvent {
    // GoUp walks `parent()`, which runs dry early on a relative path.
    let dir = std::path::absolute(&dir).unwrap_or(dir);
    tracing::debug!(dir = %dir.display(), "changing directory");
    model.current_dir = dir.clone();
    cmds.push(BrowserCommand::DirectoryChanged(dir));
    refresh(model)
}

/// Re-list the current directory and report the item count or the failure.
fn refresh(model: &mut BrowserModel) -> BrowserEvent {
    model.path_input = model.current_dir.display().to_string();
    model.selected = None;
    match read_directory(&model.current_dir) {
        Ok(entries) => {
            model.entries = entries;
            BrowserEvent::info(format!("Items: {}", model.entries.len()))
        }
        Err(err) => {
            model.entries.clear();
            tracing::warn!(dir = %model.current_dir.display(), %err, "failed to list directory");
            if err.kind() == io::ErrorKind::PermissionDenied {
                BrowserEvent::error("Permission denied to access this directory")
            } else {
                BrowserEvent::error(format!("Error reading directory: {err}"))
            }
        }
    }
}

/// Render the location bar and directory table, returning triggered messages.
pub fn view(ui: &mut egui::Ui, model: &BrowserModel) -> Vec<BrowserMsg> {
    let mut msgs = Vec::new();
    render_location_bar(ui, model, &mut msgs);
    ui.add_space(4.0);
    render_table(ui, model, &mut msgs);
    msgs
}

fn render_location_bar(ui: &mut egui::Ui, model: &BrowserModel, msgs: &mut Vec<BrowserMsg>) {
    ui.horizontal(|ui| {
        ui.label("Location:");
        let mut input = model.path_input.clone();
        let response = ui.add(
            egui::TextEdit::singleline(&mut input)
                .desired_width((ui.available_width() - 100.0).max(120.0)),
        );
        if response.changed() {
            msgs.push(BrowserMsg::PathInputChanged(input));
        }
        if response.lost_focus() && ui.input(|inp| inp.key_pressed(egui::Key::Enter)) {
            msgs.push(BrowserMsg::SubmitPath);
        }
        if ui
            .button(format!("{} Browse", egui_phosphor::regular::FOLDER_OPEN))
            .on_hover_text("Pick a folder to browse")
            .clicked()
        {
            msgs.push(BrowserMsg::RequestBrowse);
        }
    });
}

fn render_table(ui: &mut egui::Ui, model: &BrowserModel, msgs: &mut Vec<BrowserMsg>) {
    let row_height = ui.text_style_height(&egui::TextStyle::Body) + 6.0;

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .sense(egui::Sense::click())
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::initial(300.0).at_least(150.0).clip(true))
        .column(Column::initial(100.0).at_least(80.0))
        .column(Column::initial(150.0).at_least(120.0))
        .column(Column::remainder().at_least(80.0))
        .header(row_height, |mut header| {
            for title in ["Name", "Size", "Modified", "Type"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(row_height, model.entries().len(), |mut row| {
                let index = row.index();
                let entry = &model.entries()[index];
                row.set_selected(model.selected == Some(index));

                row.col(|ui| {
                    let icon = icon_for(&entry.path, entry.kind != EntryKind::File);
                    ui.label(format!("{icon} {}", entry.name));
                });
                row.col(|ui| {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(entry.size.map(format_size).unwrap_or_default());
                    });
                });
                row.col(|ui| {
                    ui.label(entry.modified_label());
                });
                row.col(|ui| {
                    ui.label(entry.type_label());
                });

                let response = row.response();
                if response.double_clicked() {
                    msgs.push(BrowserMsg::Activate(index));
                } else if response.clicked() {
                    msgs.push(BrowserMsg::Select(index));
                }
            });
        });
}
