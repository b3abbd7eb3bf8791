use serde::Serialize;

use crate::application::ResolvedBinaries;
use crate::config::ConfigMap;
use crate::domain::{AppError, BinaryOrigin};

/// ffmpeg availability as shown to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    /// Bundled with the app.
    Ok,
    System,
    Missing,
}

impl From<BinaryOrigin> for ToolStatus {
    fn from(origin: BinaryOrigin) -> Self {
        match origin {
            BinaryOrigin::Bundled => ToolStatus::Ok,
            BinaryOrigin::System => ToolStatus::System,
            BinaryOrigin::Missing => ToolStatus::Missing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FfmpegInfo {
    pub path: Option<String>,
    pub status: ToolStatus,
}

/// Response to `ensureBinaries`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnsureBinariesResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ytdlp_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ffmpeg: Option<FfmpegInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<ResolvedBinaries, AppError>> for EnsureBinariesResponse {
    fn from(result: Result<ResolvedBinaries, AppError>) -> Self {
        match result {
            Ok(binaries) => Self {
                success: true,
                ytdlp_path: Some(binaries.downloader.to_string_lossy().into_owned()),
                ffmpeg: Some(FfmpegInfo {
                    path: binaries
                        .transcoder
                        .path
                        .map(|path| path.to_string_lossy().into_owned()),
                    status: binaries.transcoder.origin.into(),
                }),
                error: None,
            },
            Err(e) => Self {
                success: false,
                ytdlp_path: None,
                ffmpeg: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Response to `getConfig`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigResponse {
    pub success: bool,
    pub config: ConfigMap,
}

/// Plain acknowledgement for `updateConfig` and `start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AckResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AckResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: &AppError) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
        }
    }
}

impl<T> From<&Result<T, AppError>> for AckResponse {
    fn from(result: &Result<T, AppError>) -> Self {
        match result {
            Ok(_) => Self::ok(),
            Err(e) => Self::failed(e),
        }
    }
}
