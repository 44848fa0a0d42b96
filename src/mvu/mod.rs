// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Root Model-View-Update kernel wiring component state, messages, and commands.

use std::path::{Path, PathBuf};

use crossbeam_channel::Sender;

use crate::config::{self, Settings};
use crate::logic::{self, CompressReport, ExtractReport, TestReport};
use crate::models::entry::EntryKind;
use crate::ui::components::browser::{self, BrowserCommand, BrowserModel, BrowserMsg};
use crate::ui::components::compress_dialog::{
    self, CompressDialogCommand, CompressDialogModel, CompressDialogMsg, CompressJob,
};

/// Version shown in the status bar and About box.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const BUSY_MESSAGE: &str = "Another archive operation is still running.";
const IDLE_PROGRESS: &str = "Ready";

/// Extensions offered by the "All Archives" filter of the open dialogs.
const ARCHIVE_EXTENSIONS: &[&str] = &[
    "zip", "rar", "7z", "tar", "gz", "tgz", "bz2", "tbz2", "tbz", "xz", "txz",
];

/// Archive operation currently running on a worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobKind {
    Compress,
    Extract,
    Test,
}

/// Result summary shown in a modal after a job succeeds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
    /// Folder offered through the "Open folder" button.
    pub open_path: Option<PathBuf>,
}

/// Top-level application state.
pub struct AppModel {
    /// File browser state.
    pub browser: BrowserModel,
    /// Open "Add to Archive" dialog, if any.
    pub compress_dialog: Option<CompressDialogModel>,
    /// Archive awaiting the "Extract <name>?" confirmation.
    pub confirm_extract: Option<PathBuf>,
    /// Persisted preferences.
    pub settings: Settings,
    /// Running archive job; at most one at a time.
    pub job: Option<JobKind>,
    /// Latest progress line of the running job.
    pub progress: String,
    /// Latest status message to display.
    pub status: Option<String>,
    /// Latest error message to display in modal.
    pub error: Option<String>,
    /// Latest success summary to display in modal.
    pub notice: Option<Notice>,
    pub show_about: bool,
    /// Count of queued background commands.
    pub pending_commands: usize,
}

impl AppModel {
    pub fn new(settings: Settings) -> Self {
        Self {
            browser: BrowserModel::new(settings.start_directory()),
            compress_dialog: None,
            confirm_extract: None,
            settings,
            job: None,
            progress: IDLE_PROGRESS.to_string(),
            status: Some(format!("LinRZ v{APP_VERSION} - Ready")),
            error: None,
            notice: None,
            show_about: false,
            pending_commands: 0,
        }
    }
}

impl Default for AppModel {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

/// Application messages routed through the update function.
pub enum Msg {
    Browser(BrowserMsg),
    CompressDialog(CompressDialogMsg),
    OpenCompressDialog,
    RequestExtractDialog,
    ExtractRequested {
        archive: PathBuf,
        output: Option<PathBuf>,
    },
    ExtractDialogCancelled,
    ConfirmExtract,
    DeclineExtract,
    TestRequested,
    TestArchive(PathBuf),
    TestDialogCancelled,
    Progress(String),
    CompressCompleted(Result<CompressReport, String>),
    ExtractCompleted(Result<ExtractReport, String>),
    TestCompleted(Result<TestReport, String>),
    OpenPath(PathBuf),
    PathOpened(Result<(), String>),
    SettingsSaved(Result<(), String>),
    ShowAbout,
    DismissAbout,
    DismissError,
    DismissNotice,
}

/// Commands represent side-effects executed between frames.
#[derive(Debug)]
pub enum Command {
    PickDirectory { initial: PathBuf },
    PickSourceFile { initial: PathBuf },
    PickSourceFolder { initial: PathBuf },
    PickOutputFile { initial: PathBuf, file_name: String },
    /// Archive picker followed by the destination folder picker.
    PickArchiveToExtract { initial: PathBuf },
    PickArchiveToTest { initial: PathBuf },
    Compress(CompressJob),
    Extract {
        archive: PathBuf,
        output: Option<PathBuf>,
    },
    Test(PathBuf),
    SaveSettings(Settings),
    OpenPath(PathBuf),
}

/// Update the application model and enqueue commands.
pub fn update(model: &mut AppModel, msg: Msg, cmds: &mut Vec<Command>) {
    match msg {
        Msg::Browser(m) => update_browser(model, m, cmds),
        Msg::CompressDialog(m) => update_compress_dialog(model, m, cmds),
        Msg::OpenCompressDialog => {
            if model.compress_dialog.is_none() {
                let source = model
                    .browser
                    .selected_entry()
                    .filter(|entry| entry.kind != EntryKind::Parent)
                    .map(|entry| entry.path.clone());
                model.compress_dialog = Some(CompressDialogModel::new(
                    model.browser.current_dir().to_path_buf(),
                    model.settings.compress_format(),
                    source,
                ));
            }
        }
        Msg::RequestExtractDialog => cmds.push(Command::PickArchiveToExtract {
            initial: model.browser.current_dir().to_path_buf(),
        }),
        Msg::ExtractRequested { archive, output } => {
            start_job(model, JobKind::Extract, Command::Extract { archive, output }, cmds);
        }
        Msg::ExtractDialogCancelled => {
            surface_event(model, "Extraction cancelled.".to_string(), false)
        }
        Msg::ConfirmExtract => {
            if let Some(archive) = model.confirm_extract.take() {
                start_job(
                    model,
                    JobKind::Extract,
                    Command::Extract {
                        archive,
                        output: None,
                    },
                    cmds,
                );
            }
        }
        Msg::DeclineExtract => model.confirm_extract = None,
        Msg::TestRequested => {
            let selected = model
                .browser
                .selected_entry()
                .filter(|entry| entry.is_archive())
                .map(|entry| entry.path.clone());
            match selected {
                Some(archive) => {
                    start_job(model, JobKind::Test, Command::Test(archive), cmds);
                }
                None => cmds.push(Command::PickArchiveToTest {
                    initial: model.browser.current_dir().to_path_buf(),
                }),
            }
        }
        Msg::TestArchive(archive) => {
            start_job(model, JobKind::Test, Command::Test(archive), cmds);
        }
        Msg::TestDialogCancelled => surface_event(model, "Test cancelled.".to_string(), false),
        Msg::Progress(line) => {
            if model.job.is_some() {
                model.progress = line;
            }
        }
        Msg::CompressCompleted(result) => {
            finish_job(model, true, cmds);
            match result {
                Ok(report) => {
                    tracing::info!(output = %report.output.display(), "compression finished");
                    model.status = Some("Compression complete".to_string());
                    model.notice = Some(Notice {
                        title: "Success".to_string(),
                        message: report.summary(),
                        open_path: None,
                    });
                }
                Err(err) => surface_event(model, err, true),
            }
        }
        Msg::ExtractCompleted(result) => {
            finish_job(model, true, cmds);
            match result {
                Ok(report) => {
                    tracing::info!(output = %report.output_path.display(), "extraction finished");
                    model.status = Some("Extraction complete".to_string());
                    model.notice = Some(Notice {
                        title: "Success".to_string(),
                        message: report.summary(),
                        open_path: Some(report.output_path),
                    });
                }
                Err(err) => surface_event(model, err, true),
            }
        }
        Msg::TestCompleted(result) => {
            finish_job(model, false, cmds);
            match result {
                Ok(report) => {
                    model.status = Some(format!("Archive OK: {} entries", report.entries));
                    model.notice = Some(Notice {
                        title: "Test".to_string(),
                        message: report.summary(),
                        open_path: None,
                    });
                }
                Err(err) => surface_event(model, err, true),
            }
        }
        Msg::OpenPath(path) => {
            model.notice = None;
            cmds.push(Command::OpenPath(path));
        }
        Msg::PathOpened(result) => {
            if let Err(err) = result {
                surface_event(model, format!("Failed to open folder: {err}"), true);
            }
        }
        Msg::SettingsSaved(result) => {
            if let Err(err) = result {
                tracing::warn!(%err, "failed to save settings");
            }
        }
        Msg::ShowAbout => model.show_about = true,
        Msg::DismissAbout => model.show_about = false,
        Msg::DismissError => model.error = None,
        Msg::DismissNotice => model.notice = None,
    }
}

fn update_browser(model: &mut AppModel, msg: BrowserMsg, cmds: &mut Vec<Command>) {
    let mut browser_cmds = Vec::new();
    if let Some(event) = browser::update(&mut model.browser, msg, &mut browser_cmds) {
        surface_event(model, event.message, event.is_error);
    }
    for c in browser_cmds {
        match c {
            BrowserCommand::PickDirectory { initial } => {
                cmds.push(Command::PickDirectory { initial })
            }
            BrowserCommand::ConfirmExtract(archive) => model.confirm_extract = Some(archive),
            BrowserCommand::DirectoryChanged(dir) => {
                model.settings.last_directory = Some(dir);
                cmds.push(Command::SaveSettings(model.settings.clone()));
            }
        }
    }
}

fn update_compress_dialog(model: &mut AppModel, msg: CompressDialogMsg, cmds: &mut Vec<Command>) {
    // Picker results can arrive after the dialog was cancelled.
    let Some(dialog) = model.compress_dialog.as_mut() else {
        return;
    };
    let mut dialog_cmds = Vec::new();
    let event = compress_dialog::update(dialog, msg, &mut dialog_cmds);
    if let Some(event) = event {
        surface_event(model, event.message, event.is_error);
    }
    for c in dialog_cmds {
        match c {
            CompressDialogCommand::PickSourceFile { initial } => {
                cmds.push(Command::PickSourceFile { initial })
            }
            CompressDialogCommand::PickSourceFolder { initial } => {
                cmds.push(Command::PickSourceFolder { initial })
            }
            CompressDialogCommand::PickOutputFile { initial, file_name } => {
                cmds.push(Command::PickOutputFile { initial, file_name })
            }
            CompressDialogCommand::Start(job) => {
                // A refused job keeps the dialog open with its inputs.
                if start_job(model, JobKind::Compress, Command::Compress(job), cmds) {
                    model.compress_dialog = None;
                }
            }
            CompressDialogCommand::Close => model.compress_dialog = None,
            CompressDialogCommand::FormatSelected(format) => {
                model.settings.default_format = Some(format);
                cmds.push(Command::SaveSettings(model.settings.clone()));
            }
        }
    }
}

/// Enqueue an archive job unless another one is still running. Returns
/// whether the job was accepted.
fn start_job(model: &mut AppModel, kind: JobKind, cmd: Command, cmds: &mut Vec<Command>) -> bool {
    if model.job.is_some() {
        surface_event(model, BUSY_MESSAGE.to_string(), true);
        return false;
    }
    tracing::debug!(?kind, "starting archive job");
    model.job = Some(kind);
    cmds.push(cmd);
    true
}

fn finish_job(model: &mut AppModel, refresh: bool, cmds: &mut Vec<Command>) {
    model.job = None;
    model.progress = IDLE_PROGRESS.to_string();
    if refresh {
        update_browser(model, BrowserMsg::Refresh, cmds);
    }
}

/// Execute a command on a worker thread and return the resulting message.
///
/// Archive jobs stream progress lines through `progress`.
pub fn run_command(cmd: Command, progress: &Sender<String>) -> Msg {
    let mut report = |line: String| {
        // The UI may already be gone during shutdown.
        let _ = progress.send(line);
    };
    match cmd {
        Command::PickDirectory { initial } => {
            match rfd::FileDialog::new()
                .set_title("Select Directory")
                .set_directory(&initial)
                .pick_folder()
            {
                Some(dir) => Msg::Browser(BrowserMsg::Navigate(dir)),
                None => Msg::Browser(BrowserMsg::BrowseCancelled),
            }
        }
        Command::PickSourceFile { initial } => {
            let file = rfd::FileDialog::new()
                .set_title("Select File")
                .set_directory(&initial)
                .pick_file();
            Msg::CompressDialog(match file {
                Some(path) => CompressDialogMsg::SourcePicked(path),
                None => CompressDialogMsg::PickCancelled,
            })
        }
        Command::PickSourceFolder { initial } => {
            let folder = rfd::FileDialog::new()
                .set_title("Select Folder")
                .set_directory(&initial)
                .pick_folder();
            Msg::CompressDialog(match folder {
                Some(path) => CompressDialogMsg::SourcePicked(path),
                None => CompressDialogMsg::PickCancelled,
            })
        }
        Command::PickOutputFile { initial, file_name } => {
            let file = rfd::FileDialog::new()
                .set_title("Save Archive As")
                .set_directory(&initial)
                .set_file_name(&file_name)
                .save_file();
            Msg::CompressDialog(match file {
                Some(path) => CompressDialogMsg::OutputPicked(path),
                None => CompressDialogMsg::PickCancelled,
            })
        }
        Command::PickArchiveToExtract { initial } => {
            let Some(archive) = archive_dialog("Select Archive to Extract", &initial).pick_file()
            else {
                return Msg::ExtractDialogCancelled;
            };
            match rfd::FileDialog::new()
                .set_title("Select Extraction Directory")
                .set_directory(&initial)
                .pick_folder()
            {
                Some(output) => Msg::ExtractRequested {
                    archive,
                    output: Some(output),
                },
                None => Msg::ExtractDialogCancelled,
            }
        }
        Command::PickArchiveToTest { initial } => {
            match archive_dialog("Select Archive to Test", &initial).pick_file() {
                Some(archive) => Msg::TestArchive(archive),
                None => Msg::TestDialogCancelled,
            }
        }
        Command::Compress(job) => Msg::CompressCompleted(
            logic::compress(&job.source, &job.output, job.format, &mut report)
                .map_err(|e| format!("{e:#}")),
        ),
        Command::Extract { archive, output } => Msg::ExtractCompleted(
            logic::extract(&archive, output.as_deref(), &mut report).map_err(|e| format!("{e:#}")),
        ),
        Command::Test(archive) => Msg::TestCompleted(
            logic::test_archive(&archive, &mut report).map_err(|e| format!("{e:#}")),
        ),
        Command::SaveSettings(settings) => {
            Msg::SettingsSaved(config::save(&settings).map_err(|e| format!("{e:#}")))
        }
        Command::OpenPath(path) => Msg::PathOpened(open::that(&path).map_err(|e| e.to_string())),
    }
}

/// Open-file dialog preconfigured with the archive filters.
fn archive_dialog(title: &str, initial: &Path) -> rfd::FileDialog {
    rfd::FileDialog::new()
        .set_title(title)
        .set_directory(initial)
        .add_filter("All Archives", ARCHIVE_EXTENSIONS)
        .add_filter("ZIP files", &["zip"])
        .add_filter("RAR files", &["rar"])
        .add_filter("7Z files", &["7z"])
        .add_filter("TAR files", &["tar", "gz", "tgz", "bz2", "tbz2", "tbz", "xz", "txz"])
        .add_filter("All files", &["*"])
}

/// Update status/error fields consistently for user feedback.
fn surface_event(model: &mut AppModel, message: String, is_error: bool) {
    if is_error {
        model.error = Some(message.clone());
    }
    model.status = Some(message);
}
