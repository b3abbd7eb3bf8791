use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::{stream::BoxStream, StreamExt};
use serde_json::Value;

use crate::{
    config::{ConfigMap, ConfigStore},
    domain::{AppError, BinaryInfo, DownloadEvent, DownloadRequest},
    tools::{build_download_args, BinaryResolver, ProcessRunner},
    utils::AppPaths,
};

#[derive(Debug, Clone)]
pub struct ResolvedBinaries {
    pub downloader: PathBuf,
    pub transcoder: BinaryInfo,
}

/// Session-scoped entry point for the UI: binary checks, config and the
/// single running download.
#[derive(Clone)]
pub struct DownloadCoordinator {
    resolver: BinaryResolver,
    config: ConfigStore,
    runner: ProcessRunner,
    in_flight: Arc<AtomicBool>,
}

impl DownloadCoordinator {
    pub fn new(resolver: BinaryResolver, config: ConfigStore) -> Self {
        Self {
            resolver,
            config,
            runner: ProcessRunner::new(),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn from_paths(paths: &AppPaths) -> Self {
        Self::new(
            BinaryResolver::with_process_path(paths.bin_dirs().to_vec()),
            ConfigStore::new(paths.config_file()),
        )
    }

    pub async fn ensure_binaries(&self) -> Result<ResolvedBinaries, AppError> {
        let downloader = self.resolver.resolve_downloader().await?;
        let transcoder = self.resolver.resolve_transcoder().await;
        Ok(ResolvedBinaries {
            downloader,
            transcoder,
        })
    }

    pub fn config(&self) -> ConfigMap {
        self.config.read()
    }

    pub fn saved_output_dir(&self) -> Option<PathBuf> {
        self.config.output_dir()
    }

    /// Merges `partial` into the stored config. Write failures are logged
    /// and otherwise ignored.
    pub fn update_config(&self, partial: Value) -> Result<(), AppError> {
        let Value::Object(partial) = partial else {
            return Err(AppError::Config("update must be a JSON object".to_string()));
        };
        if let Err(e) = self.config.update(partial) {
            log::error!(
                "Failed to write config {}: {}",
                self.config.path().display(),
                e
            );
        }
        Ok(())
    }

    /// Opens the native folder picker, starting at the saved folder.
    pub async fn choose_folder(&self) -> Option<PathBuf> {
        let mut dialog = rfd::AsyncFileDialog::new();
        if let Some(dir) = self.saved_output_dir() {
            dialog = dialog.set_directory(dir);
        }
        dialog
            .pick_folder()
            .await
            .map(|handle| handle.path().to_path_buf())
    }

    pub fn is_downloading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Validates `request`, resolves both binaries, builds the yt-dlp
    /// arguments and spawns it. Nothing is spawned if any step fails or a
    /// download is already running.
    pub async fn start(
        &self,
        request: DownloadRequest,
    ) -> Result<BoxStream<'static, DownloadEvent>, AppError> {
        let request = request.validated()?;
        let guard = InFlightGuard::acquire(&self.in_flight).ok_or(AppError::DownloadInProgress)?;

        let binaries = self.ensure_binaries().await?;
        let args = build_download_args(&request, &binaries.transcoder)?;

        tokio::fs::create_dir_all(&request.output_dir)
            .await
            .map_err(|e| {
                AppError::Io(format!(
                    "Failed to create {}: {}",
                    request.output_dir.display(),
                    e
                ))
            })?;

        log::debug!("Running {} {:?}", binaries.downloader.display(), args);
        let handle = self
            .runner
            .start(&binaries.downloader, &args)
            .map_err(|e| AppError::Spawn(e.to_string()))?;
        log::info!("Download of {} started (pid {:?})", request.url, handle.pid());

        Ok(release_on_finish(handle.into_stream(), guard))
    }
}

/// Marks a download as running until dropped.
struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(Self { flag: flag.clone() })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// The guard is released right before `Finished` is yielded, so a caller
/// reacting to it can start the next download.
fn release_on_finish(
    events: BoxStream<'static, DownloadEvent>,
    guard: InFlightGuard,
) -> BoxStream<'static, DownloadEvent> {
    futures::stream::unfold((events, Some(guard)), |(mut events, mut guard)| async move {
        let event = events.next().await?;
        if event.is_terminal() {
            drop(guard.take());
        }
        Some((event, (events, guard)))
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Container, Mode, Quality, Tool};
    use serde_json::json;
    use std::path::Path;

    struct Fixture {
        bundle: tempfile::TempDir,
        output: tempfile::TempDir,
        _search_path: tempfile::TempDir,
        coordinator: DownloadCoordinator,
    }

    fn fixture() -> Fixture {
        let bundle = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let search_path = tempfile::tempdir().unwrap();
        let resolver = BinaryResolver::new(
            vec![bundle.path().to_path_buf()],
            Some(search_path.path().as_os_str().to_os_string()),
        );
        let coordinator =
            DownloadCoordinator::new(resolver, ConfigStore::new(bundle.path().join("cfg.json")));
        Fixture {
            bundle,
            output,
            _search_path: search_path,
            coordinator,
        }
    }

    #[cfg(unix)]
    fn install_downloader(dir: &Path, script: &str) {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(Tool::Downloader.file_name());
        std::fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn request(output_dir: PathBuf, container: Container) -> DownloadRequest {
        DownloadRequest {
            url: "https://x/y".to_string(),
            mode: Mode::Both,
            quality: Quality::Medium,
            output_dir,
            container,
        }
    }

    fn progress_text(events: &[DownloadEvent]) -> String {
        events
            .iter()
            .filter_map(|event| match event {
                DownloadEvent::Progress { text } => Some(text.as_str()),
                DownloadEvent::Finished { .. } => None,
            })
            .collect()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_start_relays_output_and_finish() {
        let fx = fixture();
        install_downloader(fx.bundle.path(), r#"printf '%s\n' "$@""#);
        let out_dir = fx.output.path().join("new-folder");

        let events: Vec<DownloadEvent> = fx
            .coordinator
            .start(request(out_dir.clone(), Container::Original))
            .await
            .unwrap()
            .collect()
            .await;

        let lines: Vec<String> = progress_text(&events).lines().map(str::to_string).collect();
        assert_eq!(lines[2..4], ["-f", "bv[height<=720]+ba/best[height<=720]"]);
        assert_eq!(lines.last().map(String::as_str), Some("https://x/y"));
        assert!(!lines.iter().any(|l| l == "--recode-video"));
        assert_eq!(
            events.last(),
            Some(&DownloadEvent::Finished {
                success: true,
                code: 0
            })
        );
        assert!(out_dir.is_dir());
        assert!(!fx.coordinator.is_downloading());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_recode_without_ffmpeg_spawns_nothing() {
        let fx = fixture();
        let marker = fx.output.path().join("spawned");
        install_downloader(fx.bundle.path(), &format!("touch '{}'", marker.display()));

        let err = match fx
            .coordinator
            .start(request(fx.output.path().to_path_buf(), Container::Mp4))
            .await
        {
            Ok(_) => panic!("start should fail without ffmpeg"),
            Err(e) => e,
        };

        assert!(err.to_string().contains("ffmpeg"));
        assert!(!marker.exists());
        assert!(!fx.coordinator.is_downloading());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_second_start_is_rejected_while_running() {
        let fx = fixture();
        install_downloader(fx.bundle.path(), "sleep 1");
        let req = request(fx.output.path().to_path_buf(), Container::Original);

        let first = fx.coordinator.start(req.clone()).await.unwrap();
        assert!(fx.coordinator.is_downloading());

        let second = fx.coordinator.start(req.clone()).await;
        assert!(matches!(second, Err(AppError::DownloadInProgress)));

        let events: Vec<DownloadEvent> = first.collect().await;
        assert_eq!(
            events.last(),
            Some(&DownloadEvent::Finished {
                success: true,
                code: 0
            })
        );
        assert!(!fx.coordinator.is_downloading());

        let third: Vec<DownloadEvent> = fx.coordinator.start(req).await.unwrap().collect().await;
        assert_eq!(third.iter().filter(|e| e.is_terminal()).count(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_reported_not_raised() {
        let fx = fixture();
        install_downloader(fx.bundle.path(), "echo 'ERROR: Unsupported URL' >&2; exit 1");

        let events: Vec<DownloadEvent> = fx
            .coordinator
            .start(request(fx.output.path().to_path_buf(), Container::Original))
            .await
            .unwrap()
            .collect()
            .await;

        assert_eq!(progress_text(&events), "ERROR: Unsupported URL\n");
        assert_eq!(
            events.last(),
            Some(&DownloadEvent::Finished {
                success: false,
                code: 1
            })
        );
    }

    #[tokio::test]
    async fn test_missing_downloader_fails_start() {
        let fx = fixture();

        let result = fx
            .coordinator
            .start(request(fx.output.path().to_path_buf(), Container::Original))
            .await;

        assert!(matches!(result, Err(AppError::DownloaderNotFound { .. })));
        assert!(!fx.coordinator.is_downloading());
    }

    #[tokio::test]
    async fn test_invalid_request_is_rejected_first() {
        let fx = fixture();
        let mut req = request(fx.output.path().to_path_buf(), Container::Original);
        req.url = "  ".to_string();

        let result = fx.coordinator.start(req).await;

        assert!(matches!(result, Err(AppError::InvalidRequest)));
    }

    #[tokio::test]
    async fn test_ensure_binaries_reports_missing_ffmpeg() {
        let fx = fixture();
        std::fs::write(fx.bundle.path().join(Tool::Downloader.file_name()), b"").unwrap();

        let binaries = fx.coordinator.ensure_binaries().await.unwrap();

        assert_eq!(
            binaries.downloader,
            fx.bundle.path().join(Tool::Downloader.file_name())
        );
        assert_eq!(binaries.transcoder, BinaryInfo::missing());
    }

    #[test]
    fn test_update_config_merges_and_rejects_non_objects() {
        let fx = fixture();

        fx.coordinator.update_config(json!({"a": 1})).unwrap();
        fx.coordinator.update_config(json!({"b": 2})).unwrap();
        fx.coordinator
            .update_config(json!({"outputDir": "/tmp/out"}))
            .unwrap();

        assert_eq!(
            Value::Object(fx.coordinator.config()),
            json!({"a": 1, "b": 2, "outputDir": "/tmp/out"})
        );
        assert!(matches!(
            fx.coordinator.update_config(json!([1, 2])),
            Err(AppError::Config(_))
        ));
    }
}
