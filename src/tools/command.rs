use std::ffi::OsString;

use crate::domain::{AppError, BinaryInfo, DownloadRequest, Mode, Tool};

const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";
const AUDIO_FORMAT: &str = "mp3";

/// Builds the yt-dlp argument list for `request`. The URL is always last.
///
/// Fails without side effects when a recode is requested and ffmpeg is
/// missing.
pub fn build_download_args(
    request: &DownloadRequest,
    transcoder: &BinaryInfo,
) -> Result<Vec<OsString>, AppError> {
    let mut args: Vec<OsString> = vec![
        "-o".into(),
        request.output_dir.join(OUTPUT_TEMPLATE).into_os_string(),
    ];

    match request.mode {
        Mode::Audio => {
            args.extend(
                ["-f", "bestaudio", "-x", "--audio-format", AUDIO_FORMAT].map(OsString::from),
            );
        }
        // Video-only ignores the quality field and always takes the best
        // video stream, without any height cap.
        Mode::Video => {
            args.extend(["-f", "bestvideo"].map(OsString::from));
        }
        Mode::Both => {
            args.extend(["-f", request.quality.selector()].map(OsString::from));
        }
    }

    if let Some(target) = request.container.recode_target() {
        if !transcoder.is_available() {
            return Err(AppError::TranscoderRequired {
                container: target.to_string(),
            });
        }
        args.extend(["--recode-video", target].map(OsString::from));
    }

    if let Some(location) = transcoder.explicit_path(Tool::Transcoder) {
        args.push("--ffmpeg-location".into());
        args.push(location.as_os_str().to_os_string());
    }

    args.push(request.url.as_str().into());
    Ok(args)
}
