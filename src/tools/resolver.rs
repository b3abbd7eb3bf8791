use std::ffi::OsString;
use std::path::PathBuf;

use crate::domain::{AppError, BinaryInfo, BinaryOrigin, Tool};

/// Locates yt-dlp and ffmpeg: a bundled copy wins, then the system search
/// path. Nothing is cached; each call hits the filesystem again.
#[derive(Debug, Clone)]
pub struct BinaryResolver {
    bundle_dirs: Vec<PathBuf>,
    search_path: Option<OsString>,
}

impl BinaryResolver {
    pub fn new(bundle_dirs: Vec<PathBuf>, search_path: Option<OsString>) -> Self {
        Self {
            bundle_dirs,
            search_path,
        }
    }

    /// Bundled directories from `bundle_dirs`, system lookup through the
    /// process `PATH`.
    pub fn with_process_path(bundle_dirs: Vec<PathBuf>) -> Self {
        Self::new(bundle_dirs, std::env::var_os("PATH"))
    }

    /// Where the bundled copy of `tool` is expected first. Used in the
    /// not-found message.
    pub fn expected_path(&self, tool: Tool) -> PathBuf {
        match self.bundle_dirs.first() {
            Some(dir) => dir.join(tool.file_name()),
            None => PathBuf::from(tool.file_name()),
        }
    }

    pub async fn resolve(&self, tool: Tool) -> BinaryInfo {
        for dir in &self.bundle_dirs {
            let candidate = dir.join(tool.file_name());
            if tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
                log::debug!("Using bundled {} at {}", tool.command_name(), candidate.display());
                return BinaryInfo::bundled(candidate);
            }
        }

        if self.on_search_path(tool).await {
            log::debug!("Using {} from system PATH", tool.command_name());
            return BinaryInfo::system(tool);
        }

        log::info!("{} not found in bundle or on PATH", tool.command_name());
        BinaryInfo::missing()
    }

    /// yt-dlp is mandatory: a miss is an error naming the bundled location.
    pub async fn resolve_downloader(&self) -> Result<PathBuf, AppError> {
        let info = self.resolve(Tool::Downloader).await;
        match (info.origin, info.path) {
            (BinaryOrigin::Missing, _) | (_, None) => Err(AppError::DownloaderNotFound {
                expected: self.expected_path(Tool::Downloader),
            }),
            (_, Some(path)) => Ok(path),
        }
    }

    /// ffmpeg is optional: a miss degrades to `Missing`.
    pub async fn resolve_transcoder(&self) -> BinaryInfo {
        self.resolve(Tool::Transcoder).await
    }

    async fn on_search_path(&self, tool: Tool) -> bool {
        let Some(search_path) = self.search_path.clone() else {
            return false;
        };
        let Ok(cwd) = std::env::current_dir() else {
            return false;
        };
        let name = tool.command_name();
        tokio::task::spawn_blocking(move || which::which_in(name, Some(search_path), cwd).is_ok())
            .await
            .unwrap_or(false)
    }
}
