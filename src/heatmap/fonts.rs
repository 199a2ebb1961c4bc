//! TrueType font discovery for annotations and labels
//!
//! plotters' `ab_glyph` text backend only draws fonts registered by name.
//! A configured path is registered as `sans-serif` whenever it differs from
//! the font currently registered. Otherwise the `CORR_HEATMAP_FONT`
//! environment variable and common system locations are searched once per
//! process. Without a usable font, text is skipped.

use plotters::style::{register_font, FontStyle};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Environment variable naming a TrueType font file
pub const FONT_ENV_VAR: &str = "CORR_HEATMAP_FONT";

/// Family name the font is registered under
pub const FONT_FAMILY: &str = "sans-serif";

const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
];

#[derive(Debug)]
struct FontState {
    /// Font currently registered under `FONT_FAMILY`
    registered: Option<PathBuf>,
    /// Fallback search (env var, system paths) already ran
    searched: bool,
    /// Paths that failed to load; not read again
    rejected: Vec<PathBuf>,
}

static FONT_STATE: Mutex<FontState> = Mutex::new(FontState {
    registered: None,
    searched: false,
    rejected: Vec::new(),
});

fn font_state() -> MutexGuard<'static, FontState> {
    // The state stays consistent even if a holder panicked
    FONT_STATE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Make sure a font is registered; returns whether text can be drawn
///
/// A `preferred` path replaces the registered font when it loads. When it
/// does not, the previously registered font (or the fallback search) is used.
pub fn ensure_font(preferred: Option<&Path>) -> bool {
    let mut state = font_state();

    if let Some(path) = preferred {
        if state.registered.as_deref() == Some(path) {
            return true;
        }
        if !state.rejected.iter().any(|p| p == path) {
            if try_register(path) {
                log::debug!("Registered font '{}'", path.display());
                state.registered = Some(path.to_path_buf());
                return true;
            }
            state.rejected.push(path.to_path_buf());
        }
    }

    if state.registered.is_none() && !state.searched {
        state.searched = true;
        let found = candidate_paths(None)
            .into_iter()
            .find(|path| try_register(path));
        match &found {
            Some(path) => log::debug!("Registered font '{}'", path.display()),
            None => log::warn!(
                "No TrueType font found (set {} or font.path); text will be omitted",
                FONT_ENV_VAR
            ),
        }
        state.registered = found;
    }

    state.registered.is_some()
}

/// The registered font path, if any
pub fn registered_font() -> Option<PathBuf> {
    font_state().registered.clone()
}

fn candidate_paths(preferred: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(path) = preferred {
        paths.push(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os(FONT_ENV_VAR) {
        if !path.is_empty() {
            paths.push(PathBuf::from(path));
        }
    }
    paths.extend(SYSTEM_FONT_CANDIDATES.iter().map(PathBuf::from));
    paths
}

fn try_register(path: &Path) -> bool {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    if ab_glyph::FontRef::try_from_slice(&bytes).is_err() {
        log::warn!("'{}' is not a usable TrueType font", path.display());
        return false;
    }
    // Registered fonts live for the rest of the process
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    register_font(FONT_FAMILY, FontStyle::Normal, bytes).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_start_with_preferred() {
        let preferred = PathBuf::from("/tmp/custom.ttf");
        let paths = candidate_paths(Some(&preferred));
        assert_eq!(paths[0], preferred);
        assert!(paths.len() > SYSTEM_FONT_CANDIDATES.len());
    }

    #[test]
    fn test_unreadable_font_is_skipped() {
        assert!(!try_register(Path::new("/definitely/not/a/font.ttf")));
    }

    #[test]
    fn test_ensure_font_is_stable() {
        let first = ensure_font(None);
        assert_eq!(ensure_font(None), first);
        assert_eq!(registered_font().is_some(), first);
    }

    #[test]
    fn test_non_font_file_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".ttf").tempfile().unwrap();
        std::io::Write::write_all(&mut file, b"definitely not a font").unwrap();
        assert!(!try_register(file.path()));
    }

    #[test]
    fn test_configured_font_replaces_default() {
        let available: Vec<&Path> = SYSTEM_FONT_CANDIDATES
            .iter()
            .map(Path::new)
            .filter(|p| ab_glyph_loads(p))
            .collect();
        if available.is_empty() {
            return; // no system fonts on this host
        }

        let default_available = ensure_font(None);
        assert!(default_available);

        // Copies give distinct paths even when only one font is installed
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.ttf");
        let second = dir.path().join("second.ttf");
        std::fs::copy(available[0], &first).unwrap();
        std::fs::copy(available[0], &second).unwrap();

        assert!(ensure_font(Some(&first)));
        assert_eq!(registered_font().as_deref(), Some(first.as_path()));
        assert!(ensure_font(Some(&second)));
        assert_eq!(registered_font().as_deref(), Some(second.as_path()));

        // An unusable path keeps the font that was registered
        assert!(ensure_font(Some(Path::new("/definitely/not/a/font.ttf"))));
        assert_eq!(registered_font().as_deref(), Some(second.as_path()));
    }

    fn ab_glyph_loads(path: &Path) -> bool {
        std::fs::read(path)
            .map(|bytes| ab_glyph::FontRef::try_from_slice(&bytes).is_ok())
            .unwrap_or(false)
    }
}
