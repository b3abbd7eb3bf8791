//! Request boundary between the UI and the download core. Every call
//! answers with a serializable response instead of an error.

pub mod models;

use std::path::PathBuf;

use futures::stream::BoxStream;
use serde_json::{json, Value};

use crate::application::DownloadCoordinator;
use crate::config::OUTPUT_DIR_KEY;
use crate::domain::{DownloadEvent, DownloadRequest};

pub use models::{AckResponse, ConfigResponse, EnsureBinariesResponse, ToolStatus};

pub type EventStream = BoxStream<'static, DownloadEvent>;

#[derive(Clone)]
pub struct Bridge {
    coordinator: DownloadCoordinator,
}

impl Bridge {
    pub fn new(coordinator: DownloadCoordinator) -> Self {
        Self { coordinator }
    }

    pub async fn ensure_binaries(&self) -> EnsureBinariesResponse {
        self.coordinator.ensure_binaries().await.into()
    }

    /// Lets the user choose the output folder and stores it under
    /// `outputDir`. `None` when the dialog was cancelled.
    pub async fn pick_folder(&self) -> Option<PathBuf> {
        let folder = self.coordinator.choose_folder().await?;
        self.update_config(json!({ OUTPUT_DIR_KEY: folder.to_string_lossy() }));
        Some(folder)
    }

    pub fn get_config(&self) -> ConfigResponse {
        ConfigResponse {
            success: true,
            config: self.coordinator.config(),
        }
    }

    pub fn update_config(&self, partial: Value) -> AckResponse {
        AckResponse::from(&self.coordinator.update_config(partial))
    }

    /// Accepts or rejects the download. On acceptance the returned stream
    /// carries its progress and the final `Finished`.
    pub async fn start(&self, request: DownloadRequest) -> (AckResponse, Option<EventStream>) {
        match self.coordinator.start(request).await {
            Ok(events) => (AckResponse::ok(), Some(events)),
            Err(e) => {
                log::warn!("Download rejected: {}", e);
                (AckResponse::failed(&e), None)
            }
        }
    }
}
