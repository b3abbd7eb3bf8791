use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error(
        "yt-dlp not found. Expected at: {}. Please place the yt-dlp binary in that folder or install it on PATH.",
        expected.display()
    )]
    DownloaderNotFound { expected: PathBuf },

    #[error(
        "Selected output format ({container}) requires ffmpeg (not found). Please install ffmpeg or place it next to yt-dlp."
    )]
    TranscoderRequired { container: String },

    #[error("Invalid URL or output directory")]
    InvalidRequest,

    #[error("A download is already running")]
    DownloadInProgress,

    #[error("Failed to start downloader: {0}")]
    Spawn(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Config error: {0}")]
    Config(String),
}
