use std::path::PathBuf;

use futures::StreamExt;
use iced::Task;
use serde_json::Value;

use crate::api::{AckResponse, Bridge, ConfigResponse, EnsureBinariesResponse};
use crate::application::DownloadCoordinator;
use crate::config::OUTPUT_DIR_KEY;
use crate::domain::{DownloadEvent, DownloadRequest};
use crate::ui::{DownloadMessage, DownloadView};
use crate::utils::AppPaths;

pub struct DownloadApp {
    view: DownloadView,
    bridge: Bridge,
}

impl DownloadApp {
    /// Creates the window session and kicks off the config load and the
    /// binary check.
    pub fn new() -> (Self, Task<Message>) {
        let paths = AppPaths::detect();
        log::info!("Config file: {}", paths.config_file().display());
        let bridge = Bridge::new(DownloadCoordinator::from_paths(&paths));

        let config_bridge = bridge.clone();
        let binaries_bridge = bridge.clone();
        let boot = Task::batch([
            Task::perform(
                async move { config_bridge.get_config() },
                Message::ConfigLoaded,
            ),
            Task::perform(
                async move { binaries_bridge.ensure_binaries().await },
                Message::BinariesChecked,
            ),
        ]);

        (
            Self {
                view: DownloadView::default(),
                bridge,
            },
            boot,
        )
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(DownloadMessage),
    ConfigLoaded(ConfigResponse),
    BinariesChecked(EnsureBinariesResponse),
    /// `None` when the picker was cancelled
    FolderPicked(Option<PathBuf>),
    DownloadAccepted(AckResponse),
    Download(DownloadEvent),
}

pub fn update(app: &mut DownloadApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => {
            app.view.update(ui_msg.clone());

            match ui_msg {
                DownloadMessage::PickFolderPressed => {
                    let bridge = app.bridge.clone();
                    return Task::perform(
                        async move { bridge.pick_folder().await },
                        Message::FolderPicked,
                    );
                }
                DownloadMessage::DownloadPressed if !app.view.is_downloading => {
                    match app.view.request() {
                        Ok(request) => {
                            app.view.is_downloading = true;
                            app.view.log.clear();
                            return start_download(app.bridge.clone(), request);
                        }
                        Err(hint) => {
                            app.view.log = format!("{hint}\n");
                        }
                    }
                }
                _ => {}
            }
        }
        Message::ConfigLoaded(response) => {
            if let Some(dir) = response.config.get(OUTPUT_DIR_KEY).and_then(Value::as_str) {
                app.view.output_dir = dir.to_string();
            }
        }
        Message::BinariesChecked(status) => {
            if let Some(error) = &status.error {
                log::warn!("Binary check failed: {}", error);
            }
            app.view.binary_status = Some(status);
        }
        Message::FolderPicked(folder) => {
            if let Some(folder) = folder {
                app.view.output_dir = folder.display().to_string();
            }
        }
        Message::DownloadAccepted(ack) => {
            if !ack.success {
                app.view.is_downloading = false;
                app.view.log = format!("Error: {}\n", ack.error.unwrap_or_default());
            }
        }
        Message::Download(DownloadEvent::Progress { text }) => {
            app.view.append_log(&text);
        }
        Message::Download(DownloadEvent::Finished { success, code }) => {
            app.view.is_downloading = false;
            app.view.append_log("\n=== FINISHED ===\n");
            if success {
                app.view.append_log("Download succeeded.\n");
            } else {
                app.view.append_log(&format!("Download failed (code {code}).\n"));
            }
        }
    }
    Task::none()
}

/// Acknowledgement first, then the download's events as they arrive.
fn start_download(bridge: Bridge, request: DownloadRequest) -> Task<Message> {
    Task::stream(
        futures::stream::once(async move { bridge.start(request).await }).flat_map(
            |(ack, events)| {
                let accepted =
                    futures::stream::once(futures::future::ready(Message::DownloadAccepted(ack)));
                match events {
                    Some(events) => accepted.chain(events.map(Message::Download)).boxed(),
                    None => accepted.boxed(),
                }
            },
        ),
    )
}

pub fn view(app: &DownloadApp) -> iced::Element<'_, Message> {
    app.view.view().map(Message::UiMessage)
}
