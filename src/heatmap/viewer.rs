//! Showing a rendered heatmap to the user

use super::surface::DrawingSurface;
use crate::error::{HeatmapError, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

/// Prefix of temporary display files
const TEMP_PREFIX: &str = "corr_heatmap_";

/// Temporary display files older than this are removed on the next display
const STALE_AFTER: Duration = Duration::from_secs(60 * 60);

/// Displays a finished surface
pub trait Viewer {
    /// `saved` is the file the surface was just written to, if any
    fn show(&self, surface: &DrawingSurface, saved: Option<&Path>) -> Result<()>;
}

/// Viewer that shows nothing (batch runs, tests, servers)
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessViewer;

impl Viewer for HeadlessViewer {
    fn show(&self, surface: &DrawingSurface, _saved: Option<&Path>) -> Result<()> {
        let (width, height) = surface.dimensions();
        log::debug!("Headless: skipping display of {}×{} image", width, height);
        Ok(())
    }
}

/// Opens the image with the platform's default application
///
/// Unsaved surfaces are written to a uniquely named PNG in the temp directory first.
/// The opener is spawned and not waited for, so the file has to outlive this
/// call; such files are removed by a later display once they are an hour old.
#[derive(Debug, Clone, Default)]
pub struct SystemViewer {
    temp_dir: Option<PathBuf>,
}

impl SystemViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write unsaved surfaces into `dir` instead of the system temp directory
    pub fn with_temp_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: Some(dir.into()),
        }
    }

    fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    fn temp_path(&self) -> PathBuf {
        self.temp_dir()
            .join(format!("{}{}.png", TEMP_PREFIX, uuid::Uuid::new_v4()))
    }
}

impl Viewer for SystemViewer {
    fn show(&self, surface: &DrawingSurface, saved: Option<&Path>) -> Result<()> {
        let path = match saved {
            Some(path) => path.to_path_buf(),
            None => {
                remove_stale_temp_files(&self.temp_dir(), STALE_AFTER);
                let path = self.temp_path();
                surface.save(&path)?;
                path
            }
        };

        log::info!("Opening {}", path.display());
        let spawned = opener_command(&path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        if let Err(e) = spawned {
            if saved.is_none() {
                let _ = std::fs::remove_file(&path);
            }
            return Err(HeatmapError::Display(format!(
                "could not open '{}': {}",
                path.display(),
                e
            )));
        }
        Ok(())
    }
}

/// Delete `corr_heatmap_*.png` files in `dir` last modified at least `older_than` ago
fn remove_stale_temp_files(dir: &Path, older_than: Duration) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with(TEMP_PREFIX) || !name.ends_with(".png") {
            continue;
        }
        let stale = entry
            .metadata()
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| modified.elapsed().ok())
            .is_some_and(|age| age >= older_than);
        if stale && std::fs::remove_file(entry.path()).is_ok() {
            removed += 1;
        }
    }
    if removed > 0 {
        log::debug!("Removed {} stale display file(s) from {}", removed, dir.display());
    }
    removed
}

fn opener_command(path: &Path) -> Command {
    if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg(path);
        cmd
    } else if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]).arg(path);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(path);
        cmd
    }
}
