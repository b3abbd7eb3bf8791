use std::path::PathBuf;

use iced::{
    widget::{button, column, pick_list, row, scrollable, text, text_input, Space},
    Color, Element, Length,
};

use crate::api::{EnsureBinariesResponse, ToolStatus};
use crate::domain::{Container, DownloadRequest, Mode, Quality};

const ERROR_COLOR: Color = Color::from_rgb(0.8, 0.15, 0.15);

/// Main view state
#[derive(Default)]
pub struct DownloadView {
    pub url: String,
    pub mode: Mode,
    pub quality: Quality,
    pub container: Container,
    pub output_dir: String,
    pub log: String,
    pub binary_status: Option<EnsureBinariesResponse>,
    pub is_downloading: bool,
}

#[derive(Debug, Clone)]
pub enum DownloadMessage {
    UrlChanged(String),
    ModeSelected(Mode),
    QualitySelected(Quality),
    ContainerSelected(Container),
    PickFolderPressed,
    DownloadPressed,
    ClearLogPressed,
}

impl DownloadView {
    pub fn update(&mut self, message: DownloadMessage) {
        match message {
            DownloadMessage::UrlChanged(url) => self.url = url,
            DownloadMessage::ModeSelected(mode) => self.mode = mode,
            DownloadMessage::QualitySelected(quality) => self.quality = quality,
            DownloadMessage::ContainerSelected(container) => self.container = container,
            DownloadMessage::ClearLogPressed => self.log.clear(),
            DownloadMessage::PickFolderPressed | DownloadMessage::DownloadPressed => {
                // Will be handled by the app
            }
        }
    }

    /// Form contents as a request, or a hint for the first missing field.
    pub fn request(&self) -> Result<DownloadRequest, &'static str> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err("Enter a video URL");
        }
        if self.output_dir.is_empty() {
            return Err("Choose an output folder");
        }
        Ok(DownloadRequest {
            url: url.to_string(),
            mode: self.mode,
            quality: self.quality,
            output_dir: PathBuf::from(&self.output_dir),
            container: self.container,
        })
    }

    pub fn append_log(&mut self, chunk: &str) {
        self.log.push_str(chunk);
    }

    pub fn view(&self) -> Element<'_, DownloadMessage> {
        let options = row![
            column![
                text("Download type").size(14),
                pick_list(Mode::ALL, Some(self.mode), DownloadMessage::ModeSelected),
            ]
            .spacing(4),
            column![
                text("Quality").size(14),
                pick_list(
                    Quality::ALL,
                    Some(self.quality),
                    DownloadMessage::QualitySelected
                ),
            ]
            .spacing(4),
            column![
                text("Container").size(14),
                pick_list(
                    Container::ALL,
                    Some(self.container),
                    DownloadMessage::ContainerSelected
                ),
            ]
            .spacing(4),
        ]
        .spacing(16);

        let folder = row![
            text_input("Not selected", &self.output_dir)
                .padding(8)
                .width(Length::Fill),
            button("Choose folder")
                .on_press(DownloadMessage::PickFolderPressed)
                .padding([8, 12]),
        ]
        .spacing(8);

        let download = button(if self.is_downloading {
            "Downloading..."
        } else {
            "Download"
        })
        .on_press_maybe((!self.is_downloading).then_some(DownloadMessage::DownloadPressed))
        .padding([10, 20]);

        let log = if self.log.is_empty() {
            "No log yet."
        } else {
            self.log.as_str()
        };

        column![
            text("YT Downloader").size(32),
            text("Download audio, video, or both at the quality you pick.").size(14),
            Space::new().height(Length::Fixed(10.0)),
            text("Video URL").size(16),
            text_input("https://www.youtube.com/watch?v=...", &self.url)
                .on_input(DownloadMessage::UrlChanged)
                .padding(10),
            options,
            text("Output folder").size(16),
            folder,
            self.binary_status_view(),
            download,
            row![
                text("Progress / Log").size(14).width(Length::Fill),
                button("Clear log").on_press(DownloadMessage::ClearLogPressed),
            ],
            scrollable(text(log).size(12)).height(Length::Fill),
        ]
        .padding(20)
        .spacing(10)
        .into()
    }

    fn binary_status_view(&self) -> Element<'_, DownloadMessage> {
        let Some(status) = &self.binary_status else {
            return Space::new().height(Length::Fixed(0.0)).into();
        };
        if !status.success {
            return text(format!(
                "Could not load yt-dlp/ffmpeg: {}",
                status.error.as_deref().unwrap_or_default()
            ))
            .size(12)
            .color(ERROR_COLOR)
            .into();
        }

        let ytdlp = text(format!(
            "yt-dlp: {}",
            status.ytdlp_path.as_deref().unwrap_or_default()
        ))
        .size(12);
        let ffmpeg = match &status.ffmpeg {
            Some(info) if info.status == ToolStatus::Ok => text(format!(
                "ffmpeg: {}",
                info.path.as_deref().unwrap_or_default()
            ))
            .size(12),
            Some(info) if info.status == ToolStatus::System => {
                text("ffmpeg: using ffmpeg from the system PATH").size(12)
            }
            _ => text(
                "ffmpeg not found. Place the ffmpeg binary next to yt-dlp or install it on PATH.",
            )
            .size(12)
            .color(ERROR_COLOR),
        };
        column![ytdlp, ffmpeg].spacing(2).into()
    }
}
