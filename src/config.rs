//! Heatmap configuration from properties
//!
//! Configuration is loaded through `PropertyReader`, so every default comes
//! from heatmap_properties.json - no hardcoded fallbacks in this code.

use crate::data::CorrelationMethod;
use crate::heatmap::{ColorRange, SizingAxes, SizingConfig};
use crate::properties::PropertyReader;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct HeatmapConfig {
    /// Palette name (case-insensitive, see palettes.json)
    pub palette: String,

    /// Where the palette ends sit on the value axis
    pub color_range: ColorRange,

    /// Value mapped to the palette's neutral midpoint (symmetric range only)
    pub color_center: f64,

    /// Write cell values inside the cells
    pub annotate: bool,

    /// Decimal places of cell annotations
    pub annotation_decimals: usize,

    /// Draw the colorbar
    pub colorbar: bool,

    /// Plot title (optional)
    pub title: Option<String>,

    /// Figure sizing policy
    pub sizing: SizingConfig,

    /// Coefficient used by the pipeline
    pub correlation_method: CorrelationMethod,

    /// Font to register before any other candidate
    pub font_path: Option<PathBuf>,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self::from_properties(&PropertyReader::new())
    }
}

impl HeatmapConfig {
    /// Create config from properties
    pub fn from_properties(props: &PropertyReader) -> Self {
        let sizing = SizingConfig {
            base_width: props.get_f64_in_range("figure.base.width", 0.5, 50.0),
            base_height: props.get_f64_in_range("figure.base.height", 0.5, 50.0),
            scale: props.get_f64_in_range("figure.scale", 0.0, 5.0),
            max_width: props.get_f64_in_range("figure.max.width", 0.5, 50.0),
            max_height: props.get_f64_in_range("figure.max.height", 0.5, 50.0),
            dpi: props.get_u32_in_range("figure.dpi", 10, 400),
            axes: SizingAxes::parse(&props.get_enum("sizing.axes")),
        };

        Self {
            palette: props.get_enum("palette"),
            color_range: ColorRange::parse(&props.get_enum("color.range")),
            color_center: props.get_f64("color.center"),
            annotate: props.get_bool("annotate"),
            annotation_decimals: props.get_u32_in_range("annotation.decimals", 0, 10) as usize,
            colorbar: props.get_bool("colorbar"),
            title: props.get_optional_string("title"),
            sizing,
            correlation_method: CorrelationMethod::parse(&props.get_enum("correlation.method")),
            font_path: props.get_optional_string("font.path").map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_original_policy() {
        let config = HeatmapConfig::default();
        assert_eq!(config.palette, "coolwarm");
        assert_eq!(config.sizing, SizingConfig::default());
        assert!(config.annotate);
        assert_eq!(config.annotation_decimals, 2);
        assert_eq!(config.color_range, ColorRange::Symmetric);
        assert_eq!(config.color_center, 0.0);
        assert_eq!(config.correlation_method, CorrelationMethod::Pearson);
        assert_eq!(config.title, None);
        assert_eq!(config.font_path, None);
    }

    #[test]
    fn test_overrides() {
        let props = PropertyReader::with_values([
            ("figure.scale", "0.5"),
            ("figure.dpi", "150"),
            ("sizing.axes", "semantic"),
            ("color.range", "data"),
            ("correlation.method", "kendall"),
            ("annotation.decimals", "3"),
            ("font.path", "/opt/fonts/Inter.ttf"),
        ]);
        let config = HeatmapConfig::from_properties(&props);
        assert_eq!(config.sizing.scale, 0.5);
        assert_eq!(config.sizing.dpi, 150);
        assert_eq!(config.sizing.axes, SizingAxes::Semantic);
        assert_eq!(config.color_range, ColorRange::Data);
        assert_eq!(config.correlation_method, CorrelationMethod::Kendall);
        assert_eq!(config.annotation_decimals, 3);
        assert_eq!(
            config.font_path.as_deref(),
            Some(std::path::Path::new("/opt/fonts/Inter.ttf"))
        );
    }

    #[test]
    fn test_out_of_range_dpi_uses_default() {
        let props = PropertyReader::with_values([("figure.dpi", "100000")]);
        assert_eq!(HeatmapConfig::from_properties(&props).sizing.dpi, 100);
    }
}
