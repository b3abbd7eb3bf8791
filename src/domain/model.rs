use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Audio,
    Video,
    #[default]
    Both,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Audio, Mode::Video, Mode::Both];
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Audio => "Audio only (mp3)",
            Mode::Video => "Video only (no audio)",
            Mode::Both => "Video + audio",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    #[default]
    Best,
    High,
    Medium,
    Low,
}

impl Quality {
    pub const ALL: [Quality; 4] = [Quality::Best, Quality::High, Quality::Medium, Quality::Low];

    /// Format selector in yt-dlp's `-f` syntax, falling back to the best
    /// single file when the capped video+audio pair is unavailable.
    pub fn selector(self) -> &'static str {
        match self {
            Quality::Best => "bestvideo+bestaudio/best",
            Quality::High => "bv[height<=1080]+ba/best",
            Quality::Medium => "bv[height<=720]+ba/best[height<=720]",
            Quality::Low => "bv[height<=480]+ba/best[height<=480]",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Quality::Best => "Best",
            Quality::High => "High (<=1080p)",
            Quality::Medium => "Medium (<=720p)",
            Quality::Low => "Low (<=480p)",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    #[default]
    Original,
    Mp4,
    Mkv,
    Webm,
}

impl Container {
    pub const ALL: [Container; 4] = [
        Container::Original,
        Container::Mp4,
        Container::Mkv,
        Container::Webm,
    ];

    /// Target passed to `--recode-video`; `None` keeps whatever yt-dlp produced.
    pub fn recode_target(self) -> Option<&'static str> {
        match self {
            Container::Original => None,
            Container::Mp4 => Some("mp4"),
            Container::Mkv => Some("mkv"),
            Container::Webm => Some("webm"),
        }
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.recode_target() {
            Some(target) => f.write_str(target),
            None => f.write_str("original"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRequest {
    pub url: String,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub quality: Quality,
    pub output_dir: PathBuf,
    #[serde(default)]
    pub container: Container,
}

impl DownloadRequest {
    /// Trims the URL and rejects an empty URL or output directory.
    pub fn validated(mut self) -> Result<Self, AppError> {
        self.url = self.url.trim().to_string();
        if self.url.is_empty() || self.output_dir.as_os_str().is_empty() {
            return Err(AppError::InvalidRequest);
        }
        Ok(self)
    }
}

/// External executables the app drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Downloader,
    Transcoder,
}

impl Tool {
    /// Name looked up on the system search path.
    pub fn command_name(self) -> &'static str {
        match self {
            Tool::Downloader => "yt-dlp",
            Tool::Transcoder => "ffmpeg",
        }
    }

    /// File name expected in a bundled binary directory.
    pub fn file_name(self) -> String {
        if cfg!(windows) {
            format!("{}.exe", self.command_name())
        } else {
            self.command_name().to_string()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOrigin {
    Bundled,
    System,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryInfo {
    pub path: Option<PathBuf>,
    pub origin: BinaryOrigin,
}

impl BinaryInfo {
    pub fn bundled(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            origin: BinaryOrigin::Bundled,
        }
    }

    /// A system binary is invoked by its bare command name, leaving the
    /// search to the OS.
    pub fn system(tool: Tool) -> Self {
        Self {
            path: Some(PathBuf::from(tool.command_name())),
            origin: BinaryOrigin::System,
        }
    }

    pub fn missing() -> Self {
        Self {
            path: None,
            origin: BinaryOrigin::Missing,
        }
    }

    pub fn is_available(&self) -> bool {
        self.origin != BinaryOrigin::Missing
    }

    /// Explicit location worth handing to another tool, i.e. anything but
    /// the bare command name.
    pub fn explicit_path(&self, tool: Tool) -> Option<&Path> {
        if !self.is_available() {
            return None;
        }
        self.path
            .as_deref()
            .filter(|path| *path != Path::new(tool.command_name()))
    }
}

/// Notifications for one running download. Exactly one `Finished` closes
/// the sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DownloadEvent {
    Progress { text: String },
    Finished { success: bool, code: i32 },
}

impl DownloadEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DownloadEvent::Finished { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_validation_trims_url() {
        let request = DownloadRequest {
            url: "  https://x/y \n".to_string(),
            mode: Mode::Both,
            quality: Quality::Best,
            output_dir: PathBuf::from("/tmp/out"),
            container: Container::Original,
        };
        assert_eq!(request.validated().unwrap().url, "https://x/y");
    }

    #[test]
    fn test_request_validation_rejects_empty_fields() {
        let blank_url = DownloadRequest {
            url: "   ".to_string(),
            mode: Mode::Audio,
            quality: Quality::Low,
            output_dir: PathBuf::from("/tmp/out"),
            container: Container::Original,
        };
        assert!(matches!(blank_url.validated(), Err(AppError::InvalidRequest)));

        let blank_dir = DownloadRequest {
            url: "https://x/y".to_string(),
            mode: Mode::Audio,
            quality: Quality::Low,
            output_dir: PathBuf::new(),
            container: Container::Original,
        };
        assert!(matches!(blank_dir.validated(), Err(AppError::InvalidRequest)));
    }

    #[test]
    fn test_request_deserializes_from_form_payload() {
        let request: DownloadRequest = serde_json::from_str(
            r#"{"url":"https://x/y","mode":"audio","quality":"medium","outputDir":"/tmp/out"}"#,
        )
        .unwrap();
        assert_eq!(request.mode, Mode::Audio);
        assert_eq!(request.quality, Quality::Medium);
        assert_eq!(request.container, Container::Original);
        assert_eq!(request.output_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_explicit_path_skips_bare_command_name() {
        let system = BinaryInfo::system(Tool::Transcoder);
        assert_eq!(system.explicit_path(Tool::Transcoder), None);

        let bundled = BinaryInfo::bundled(PathBuf::from("/opt/app/bin/ffmpeg"));
        assert_eq!(
            bundled.explicit_path(Tool::Transcoder),
            Some(Path::new("/opt/app/bin/ffmpeg"))
        );

        assert_eq!(BinaryInfo::missing().explicit_path(Tool::Transcoder), None);
    }

    #[test]
    fn test_finished_event_serializes_with_code() {
        let json = serde_json::to_value(DownloadEvent::Finished {
            success: false,
            code: 1,
        })
        .unwrap();
        assert_eq!(json["kind"], "finished");
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], 1);
    }
}
