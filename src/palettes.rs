//! Palette registry for loading and accessing color palettes
//!
//! Loads palettes from palettes.json (embedded at compile time) and provides
//! access by name. The default `coolwarm` palette follows matplotlib's
//! blue-to-red diverging map used for correlation heatmaps.
//!
//! Palette types:
//! - `sequential`: Gradient from low to high values
//! - `diverging`: Gradient with a neutral midpoint (for +/- deviations around a center)

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Embedded palettes.json content
const PALETTES_JSON: &str = include_str!("../palettes.json");

/// Default diverging palette name
pub const DEFAULT_DIVERGING_PALETTE: &str = "coolwarm";

/// Fallback color for unparseable palette entries
const FALLBACK_GRAY: [u8; 3] = [128, 128, 128];

static PALETTE_REGISTRY: OnceLock<PaletteRegistry> = OnceLock::new();

/// Global palette registry, initialized lazily on first access
pub fn palette_registry() -> &'static PaletteRegistry {
    PALETTE_REGISTRY.get_or_init(|| {
        PaletteRegistry::from_json(PALETTES_JSON).unwrap_or_else(|e| {
            log::error!("Failed to load palettes.json: {}", e);
            PaletteRegistry::default()
        })
    })
}

/// Palette type as defined in palettes.json
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteType {
    Sequential,
    Diverging,
}

/// A single palette definition from palettes.json
#[derive(Debug, Clone, Deserialize)]
pub struct PaletteDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub palette_type: PaletteType,
    pub colors: Vec<String>,
}

impl PaletteDefinition {
    /// Get a color by index (clamped to the last color)
    pub fn get_color(&self, index: usize) -> [u8; 3] {
        match self.colors.last() {
            None => FALLBACK_GRAY,
            Some(last) => {
                let hex = self.colors.get(index).unwrap_or(last);
                parse_hex_color(hex).unwrap_or(FALLBACK_GRAY)
            }
        }
    }

    /// Get the number of colors in this palette
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Check if the palette is empty
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Interpolate a color from the palette at position t ∈ [0, 1]
    ///
    /// t=0 returns the first color, t=1 returns the last color.
    /// Values in between are linearly interpolated.
    pub fn interpolate(&self, t: f64) -> [u8; 3] {
        if self.colors.is_empty() {
            return FALLBACK_GRAY;
        }

        let t = if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) };
        let n = self.colors.len();

        if n == 1 {
            return self.get_color(0);
        }

        // Map t to position in the color array
        let pos = t * (n - 1) as f64;
        let idx_low = pos.floor() as usize;
        let idx_high = (idx_low + 1).min(n - 1);
        let frac = pos - idx_low as f64;

        let color_low = self.get_color(idx_low);
        let color_high = self.get_color(idx_high);

        let mix = |a: u8, b: u8| (a as f64 * (1.0 - frac) + b as f64 * frac).round() as u8;
        [
            mix(color_low[0], color_high[0]),
            mix(color_low[1], color_high[1]),
            mix(color_low[2], color_high[2]),
        ]
    }
}

/// Registry of all available palettes
#[derive(Debug, Clone, Default)]
pub struct PaletteRegistry {
    /// All palettes by name (lowercase keys for case-insensitive lookup)
    palettes: HashMap<String, PaletteDefinition>,
    sequential_names: Vec<String>,
    diverging_names: Vec<String>,
}

impl PaletteRegistry {
    /// Load palettes from JSON string
    pub fn from_json(json: &str) -> Result<Self, String> {
        let definitions: Vec<PaletteDefinition> = serde_json::from_str(json)
            .map_err(|e| format!("Failed to parse palettes JSON: {}", e))?;

        let mut registry = Self::default();

        for def in definitions {
            let name = def.name.clone();
            match def.palette_type {
                PaletteType::Sequential => registry.sequential_names.push(name.clone()),
                PaletteType::Diverging => registry.diverging_names.push(name.clone()),
            }
            registry.palettes.insert(name.to_lowercase(), def);
        }

        log::debug!(
            "PaletteRegistry: loaded {} palettes ({} sequential, {} diverging)",
            registry.palettes.len(),
            registry.sequential_names.len(),
            registry.diverging_names.len()
        );

        Ok(registry)
    }

    /// Get a palette by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&PaletteDefinition> {
        self.palettes.get(&name.to_lowercase())
    }

    /// Get a palette by name, falling back to the default diverging palette
    pub fn get_or_default(&self, name: &str) -> Option<&PaletteDefinition> {
        self.get(name).or_else(|| {
            log::warn!(
                "Palette '{}' not found, using '{}'",
                name,
                DEFAULT_DIVERGING_PALETTE
            );
            self.default_diverging()
        })
    }

    /// Get the default diverging palette
    pub fn default_diverging(&self) -> Option<&PaletteDefinition> {
        self.get(DEFAULT_DIVERGING_PALETTE)
    }

    pub fn sequential_palettes(&self) -> &[String] {
        &self.sequential_names
    }

    pub fn diverging_palettes(&self) -> &[String] {
        &self.diverging_names
    }
}

/// Parse a hex color string to RGB array
///
/// Supports formats:
/// - `#RRGGBB` (6 hex digits)
/// - `#RRGGBBAA` (8 hex digits, alpha ignored)
/// - `RRGGBB` / `RRGGBBAA` (without #)
pub fn parse_hex_color(hex: &str) -> Option<[u8; 3]> {
    let hex = hex.trim_start_matches('#');

    if hex.len() != 6 && hex.len() != 8 {
        log::warn!("Invalid hex color length '{}': {}", hex, hex.len());
        return None;
    }

    let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
    let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
    let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;

    Some([r, g, b])
}

/// WCAG relative luminance of an sRGB color, in [0, 1]
pub fn relative_luminance(rgb: [u8; 3]) -> f64 {
    let channel = |c: u8| {
        let c = c as f64 / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    0.2126 * channel(rgb[0]) + 0.7152 * channel(rgb[1]) + 0.0722 * channel(rgb[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FF0000"), Some([255, 0, 0]));
        assert_eq!(parse_hex_color("#3B4CC0"), Some([59, 76, 192]));

        // Without #
        assert_eq!(parse_hex_color("B40426"), Some([180, 4, 38]));

        // 8-digit hex (with alpha, ignored)
        assert_eq!(parse_hex_color("#440154FF"), Some([68, 1, 84]));

        // Invalid
        assert_eq!(parse_hex_color("#FFF"), None);
        assert_eq!(parse_hex_color("GGGGGG"), None);
    }

    #[test]
    fn test_palette_registry_loads() {
        let registry = palette_registry();
        assert!(!registry.palettes.is_empty());

        let coolwarm = registry.default_diverging().unwrap();
        assert_eq!(coolwarm.palette_type, PaletteType::Diverging);
        assert_eq!(coolwarm.get_color(0), [59, 76, 192]);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = palette_registry();
        assert!(registry.get("rdbu").is_some());
        assert!(registry.get("COOLWARM").is_some());
        assert!(registry.get("no-such-palette").is_none());
        assert_eq!(
            registry.get_or_default("no-such-palette").unwrap().name,
            "coolwarm"
        );
    }

    #[test]
    fn test_coolwarm_midpoint_is_neutral() {
        let coolwarm = palette_registry().default_diverging().unwrap();
        assert_eq!(coolwarm.interpolate(0.5), [221, 221, 221]);
        assert_eq!(coolwarm.interpolate(0.0), [59, 76, 192]);
        assert_eq!(coolwarm.interpolate(1.0), [180, 4, 38]);
    }

    #[test]
    fn test_interpolate_clamps_out_of_range() {
        let coolwarm = palette_registry().default_diverging().unwrap();
        assert_eq!(coolwarm.interpolate(-3.0), coolwarm.interpolate(0.0));
        assert_eq!(coolwarm.interpolate(7.0), coolwarm.interpolate(1.0));
    }

    #[test]
    fn test_palette_types() {
        let registry = palette_registry();
        assert!(registry
            .diverging_palettes()
            .contains(&"coolwarm".to_string()));
        assert!(registry.diverging_palettes().contains(&"PiYG".to_string()));
        assert!(registry
            .sequential_palettes()
            .contains(&"Viridis".to_string()));
    }

    #[test]
    fn test_relative_luminance_extremes() {
        assert!(relative_luminance([0, 0, 0]).abs() < 1e-12);
        assert!((relative_luminance([255, 255, 255]) - 1.0).abs() < 1e-9);
        assert!(relative_luminance([221, 221, 221]) > 0.408);
        assert!(relative_luminance([59, 76, 192]) < 0.408);
    }
}
