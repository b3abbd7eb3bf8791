use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tokio::process::Command;

pub const APP_DIR_NAME: &str = "simple-yt-downloader";
pub const CONFIG_FILE_NAME: &str = "yt-downloader-config.json";
/// Overrides the bundled binary directory; checked before the defaults.
pub const BIN_DIR_ENV: &str = "SIMPLE_YT_DOWNLOADER_BIN_DIR";

/// Filesystem locations used by the app.
#[derive(Debug, Clone)]
pub struct AppPaths {
    config_file: PathBuf,
    bin_dirs: Vec<PathBuf>,
}

impl AppPaths {
    pub fn new(config_file: PathBuf, bin_dirs: Vec<PathBuf>) -> Self {
        Self {
            config_file,
            bin_dirs,
        }
    }

    /// Per-user config file plus the bundled binary directories for both
    /// the packaged layout (`<exe dir>/bin`) and, in debug builds, the
    /// source checkout (`<crate root>/bin`).
    pub fn detect() -> Self {
        let config_root = dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .or_else(exe_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        let mut bin_dirs = Vec::new();
        if let Some(dir) = std::env::var_os(BIN_DIR_ENV).filter(|v| !v.is_empty()) {
            bin_dirs.push(PathBuf::from(dir));
        }
        if let Some(dir) = exe_dir() {
            bin_dirs.push(dir.join("bin"));
        }
        if cfg!(debug_assertions) {
            bin_dirs.push(Path::new(env!("CARGO_MANIFEST_DIR")).join("bin"));
        }

        Self::new(config_root.join(CONFIG_FILE_NAME), bin_dirs)
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    pub fn bin_dirs(&self) -> &[PathBuf] {
        &self.bin_dirs
    }
}

fn exe_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    exe.parent().map(Path::to_path_buf)
}

/// Async command that never pops up a console window on Windows.
pub fn command(program: impl AsRef<OsStr>) -> Command {
    let mut cmd = Command::new(program);
    configure_for_background(&mut cmd);
    cmd
}

#[cfg(windows)]
fn configure_for_background(cmd: &mut Command) {
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    cmd.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
fn configure_for_background(_cmd: &mut Command) {}
