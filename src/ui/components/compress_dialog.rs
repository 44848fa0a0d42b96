// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! "Add to Archive" dialog: source, archive name and format.

use std::path::{Path, PathBuf};

use eframe::egui;

use crate::logic::{ArchiveFormat, ensure_archive_extension};
use crate::utils::sanitize_component;

const DEFAULT_STEM: &str = "archive";

/// A fully resolved compression request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompressJob {
    pub source: PathBuf,
    pub output: PathBuf,
    pub format: ArchiveFormat,
}

/// Dialog state. Paths are kept as edited text until submit.
pub struct CompressDialogModel {
    source: String,
    output: String,
    format: ArchiveFormat,
    /// Directory relative paths resolve against (the browser's location).
    base_dir: PathBuf,
    /// Set once the user typed or picked an archive name.
    output_edited: bool,
}

/// Messages emitted by the dialog view or fed back from pickers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompressDialogMsg {
    SourceChanged(String),
    OutputChanged(String),
    FormatChanged(ArchiveFormat),
    RequestPickFile,
    RequestPickFolder,
    RequestPickOutput,
    SourcePicked(PathBuf),
    OutputPicked(PathBuf),
    PickCancelled,
    Submit,
    Cancel,
}

/// Side effects requested by the dialog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompressDialogCommand {
    PickSourceFile { initial: PathBuf },
    PickSourceFolder { initial: PathBuf },
    PickOutputFile { initial: PathBuf, file_name: String },
    /// The root closes the dialog once the job is accepted.
    Start(CompressJob),
    Close,
    /// Remember the chosen format as the next default.
    FormatSelected(ArchiveFormat),
}

/// User-facing events for status/error surfaces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompressDialogEvent {
    pub message: String,
    pub is_error: bool,
}

impl CompressDialogModel {
    /// Open the dialog in `base_dir`, optionally prefilled with a source.
    pub fn new(base_dir: PathBuf, format: ArchiveFormat, source: Option<PathBuf>) -> Self {
        let mut model = Self {
            source: String::new(),
            output: format!("{DEFAULT_STEM}.{}", format.extension()),
            format,
            base_dir,
            output_edited: false,
        };
        if let Some(path) = source {
            set_source(&mut model, path);
        }
        model
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn format(&self) -> ArchiveFormat {
        self.format
    }

    fn resolve(&self, text: &str) -> PathBuf {
        let path = PathBuf::from(text);
        if path.is_absolute() {
            path
        } else {
            self.base_dir.join(path)
        }
    }
}

/// Apply a message to the dialog. Returns a user-facing event when relevant.
pub fn update(
    model: &mut CompressDialogModel,
    msg: CompressDialogMsg,
    cmds: &mut Vec<CompressDialogCommand>,
) -> Option<CompressDialogEvent> {
    match msg {
        CompressDialogMsg::SourceChanged(text) => {
            model.source = text;
            None
        }
        CompressDialogMsg::OutputChanged(text) => {
            model.output = text;
            model.output_edited = true;
            None
        }
        CompressDialogMsg::FormatChanged(format) => {
            model.format = format;
            if !model.output.trim().is_empty() {
                model.output = ensure_archive_extension(PathBuf::from(model.output.trim()), format)
                    .display()
                    .to_string();
            }
            cmds.push(CompressDialogCommand::FormatSelected(format));
            None
        }
        CompressDialogMsg::RequestPickFile => {
            cmds.push(CompressDialogCommand::PickSourceFile {
                initial: model.base_dir.clone(),
            });
            None
        }
        CompressDialogMsg::RequestPickFolder => {
            cmds.push(CompressDialogCommand::PickSourceFolder {
                initial: model.base_dir.clone(),
            });
            None
        }
        CompressDialogMsg::RequestPickOutput => {
            let current = model.resolve(model.output.trim());
            let initial = current
                .parent()
                .filter(|p| p.is_dir())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| model.base_dir.clone());
            let file_name = current
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| format!("{DEFAULT_STEM}.{}", model.format.extension()));
            cmds.push(CompressDialogCommand::PickOutputFile { initial, file_name });
            None
        }
        CompressDialogMsg::SourcePicked(path) => {
            set_source(model, path);
            None
        }
        CompressDialogMsg::OutputPicked(path) => {
            model.output = ensure_archive_extension(path, model.format)
                .display()
                .to_string();
            model.output_edited = true;
            None
        }
        CompressDialogMsg::PickCancelled => None,
        CompressDialogMsg::Submit => {
            let source = model.source.trim();
            let output = model.output.trim();
            if source.is_empty() || output.is_empty() {
                return Some(CompressDialogEvent {
                    message: "Please select source and output".into(),
                    is_error: true,
                });
            }
            let job = CompressJob {
                source: model.resolve(source),
                output: ensure_archive_extension(model.resolve(output), model.format),
                format: model.format,
            };
            cmds.push(CompressDialogCommand::Start(job));
            None
        }
        CompressDialogMsg::Cancel => {
            cmds.push(CompressDialogCommand::Close);
            None
        }
    }
}

fn set_source(model: &mut CompressDialogModel, path: PathBuf) {
    if !model.output_edited {
        model.output = suggested_output(&path, model.format);
    }
    model.source = path.display().to_string();
}

/// `<sanitized source name>.<ext>`; files drop their own extension.
fn suggested_output(source: &Path, format: ArchiveFormat) -> String {
    let name = if source.is_dir() {
        source.file_name()
    } else {
        source.file_stem()
    };
    let stem = name
        .map(|n| sanitize_component(&n.to_string_lossy()))
        .unwrap_or_else(|| DEFAULT_STEM.to_string());
    format!("{stem}.{}", format.extension())
}

/// Render the dialog window and return triggered messages.
pub fn view(ctx: &egui::Context, model: &CompressDialogModel) -> Vec<CompressDialogMsg> {
    let mut msgs = Vec::new();

    egui::Window::new("Add to Archive")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            egui::Grid::new("compress_dialog_grid")
                .num_columns(2)
                .spacing([8.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Source:");
                    ui.horizontal(|ui| {
                        let mut source = model.source().to_string();
                        if ui
                            .add(egui::TextEdit::singleline(&mut source).desired_width(280.0))
                            .changed()
                        {
                            msgs.push(CompressDialogMsg::SourceChanged(source));
                        }
                        if ui
                            .button(format!("{} Add File", egui_phosphor::regular::FILE_PLUS))
                            .clicked()
                        {
                            msgs.push(CompressDialogMsg::RequestPickFile);
                        }
                        if ui
                            .button(format!("{} Add Folder", egui_phosphor::regular::FOLDER_PLUS))
                            .clicked()
                        {
                            msgs.push(CompressDialogMsg::RequestPickFolder);
                        }
                    });
                    ui.end_row();

                    ui.label("Archive name:");
                    ui.horizontal(|ui| {
                        let mut output = model.output().to_string();
                        if ui
                            .add(egui::TextEdit::singleline(&mut output).desired_width(280.0))
                            .changed()
                        {
                            msgs.push(CompressDialogMsg::OutputChanged(output));
                        }
                        if ui.button("Browse...").clicked() {
                            msgs.push(CompressDialogMsg::RequestPickOutput);
                        }
                    });
                    ui.end_row();

                    ui.label("Format:");
                    egui::ComboBox::from_id_salt("compress_format")
                        .selected_text(model.format().as_str())
                        .show_ui(ui, |ui| {
                            for format in ArchiveFormat::COMPRESSIBLE {
                                if ui
                                    .selectable_label(model.format == format, format.as_str())
                                    .clicked()
                                    && model.format != format
                                {
                                    msgs.push(CompressDialogMsg::FormatChanged(format));
                                }
                            }
                        });
                    ui.end_row();
                });

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("OK").clicked() {
                    msgs.push(CompressDialogMsg::Submit);
                }
                if ui.button("Cancel").clicked() {
                    msgs.push(CompressDialogMsg::Cancel);
                }
            });
        });

    msgs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn dialog(base: &Path) -> CompressDialogModel {
        CompressDialogModel::new(base.to_path_buf(), ArchiveFormat::Zip, None)
    }

    #[test]
    fn defaults_to_archive_name_for_format() {
        let tmp = TempDir::new().unwrap();
        let model = CompressDialogModel::new(tmp.path().into(), ArchiveFormat::TarXz, None);
        assert_eq!(model.output(), "archive.tar.xz");
        assert_eq!(model.format(), ArchiveFormat::TarXz);
    }

    #[test]
    fn format_change_rewrites_extension() {
        let tmp = TempDir::new().unwrap();
        let mut model = dialog(tmp.path());
        let mut cmds = Vec::new();

        update(
            &mut model,
            CompressDialogMsg::FormatChanged(ArchiveFormat::TarBz2),
            &mut cmds,
        );
        assert_eq!(model.output(), "archive.tar.bz2");

        update(
            &mut model,
            CompressDialogMsg::FormatChanged(ArchiveFormat::SevenZ),
            &mut cmds,
        );
        assert_eq!(model.output(), "archive.7z");
        assert_eq!(
            cmds.last(),
            Some(&CompressDialogCommand::FormatSelected(ArchiveFormat::SevenZ))
        );
    }

    #[test]
    fn picked_folder_suggests_sanitized_name() {
        let tmp = TempDir::new().unwrap();
        let folder = tmp.path().join("Café photos");
        fs::create_dir(&folder).unwrap();
        let mut model = dialog(tmp.path());
        let mut cmds = Vec::new();

        update(&mut model, CompressDialogMsg::SourcePicked(folder.clone()), &mut cmds);

        assert_eq!(model.source(), folder.display().to_string());
        assert_eq!(model.output(), "Cafe_photos.zip");
    }

    #[test]
    fn picked_file_drops_its_extension() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("report.pdf");
        fs::write(&file, b"%PDF").unwrap();
        let model = CompressDialogModel::new(tmp.path().into(), ArchiveFormat::TarGz, Some(file));
        assert_eq!(model.output(), "report.tar.gz");
    }

    #[test]
    fn edited_name_is_not_overwritten_by_suggestion() {
        let tmp = TempDir::new().unwrap();
        let mut model = dialog(tmp.path());
        let mut cmds = Vec::new();

        update(
            &mut model,
            CompressDialogMsg::OutputChanged("keep-me.zip".into()),
            &mut cmds,
        );
        update(
            &mut model,
            CompressDialogMsg::SourcePicked(tmp.path().join("other")),
            &mut cmds,
        );

        assert_eq!(model.output(), "keep-me.zip");
    }

    #[test]
    fn empty_fields_keep_dialog_open() {
        let tmp = TempDir::new().unwrap();
        let mut model = dialog(tmp.path());
        let mut cmds = Vec::new();

        let event = update(&mut model, CompressDialogMsg::Submit, &mut cmds).unwrap();

        assert_eq!(event.message, "Please select source and output");
        assert!(event.is_error);
        assert!(cmds.is_empty());
    }

    #[test]
    fn submit_resolves_relative_paths_against_base_dir() {
        let tmp = TempDir::new().unwrap();
        let mut model = dialog(tmp.path());
        let mut cmds = Vec::new();

        update(&mut model, CompressDialogMsg::SourceChanged("docs".into()), &mut cmds);
        update(&mut model, CompressDialogMsg::OutputChanged("backup".into()), &mut cmds);
        update(&mut model, CompressDialogMsg::Submit, &mut cmds);

        assert_eq!(
            cmds,
            vec![CompressDialogCommand::Start(CompressJob {
                source: tmp.path().join("docs"),
                output: tmp.path().join("backup.zip"),
                format: ArchiveFormat::Zip,
            })]
        );
    }

    #[test]
    fn output_picker_starts_next_to_current_name() {
        let tmp = TempDir::new().unwrap();
        let mut model = dialog(tmp.path());
        let mut cmds = Vec::new();

        update(&mut model, CompressDialogMsg::RequestPickOutput, &mut cmds);

        assert_eq!(
            cmds,
            vec![CompressDialogCommand::PickOutputFile {
                initial: tmp.path().to_path_buf(),
                file_name: "archive.zip".into(),
            }]
        );
    }
}
