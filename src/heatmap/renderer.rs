//! Annotated heatmap rendering
//!
//! `HeatmapRenderer::render` sizes the figure from the matrix, draws onto a
//! fresh `DrawingSurface`, writes the file (if requested) and then hands the
//! surface to a `Viewer`. Display is best effort: a viewer failure is logged
//! and reported through `RenderOutcome::displayed`. Other failures come back
//! as `HeatmapError`;
//! `render_or_log` and `draw_heatmap` keep the log-and-continue behaviour
//! for callers that want it.

use super::color_scale::{text_color_for, ColorScale, DARK_TEXT};
use super::fonts::{self, FONT_FAMILY};
use super::layout::{Layout, Margins, PixelRect};
use super::sizing::FigureSize;
use super::surface::{drawing_error, DrawingSurface, SurfaceArea};
use super::viewer::Viewer;
use crate::config::HeatmapConfig;
use crate::data::Matrix;
use crate::error::{HeatmapError, Result};
use crate::palettes::{palette_registry, PaletteDefinition};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use polars::prelude::DataFrame;
use std::path::{Path, PathBuf};

/// Points per inch (font sizes are given in points)
const POINTS_PER_INCH: f64 = 72.0;
/// Tick and axis label size, in points
const LABEL_POINTS: f64 = 10.0;
/// Title size, in points
const TITLE_POINTS: f64 = 12.0;
/// Smallest legible annotation, in pixels
const MIN_ANNOTATION_PX: f64 = 6.0;
/// Longest share of the surface width row labels may take
const MAX_ROW_LABEL_SHARE: f64 = 0.3;
/// Distance between text and the element it labels, in pixels
const LABEL_PAD: i32 = 6;

const BACKGROUND: [u8; 3] = [255, 255, 255];
const OUTLINE: RGBColor = RGBColor(64, 64, 64);

/// A matrix to draw and where to save it
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub matrix: Matrix,
    pub output: Option<PathBuf>,
}

impl RenderRequest {
    pub fn new(matrix: Matrix) -> Self {
        Self {
            matrix,
            output: None,
        }
    }

    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Output path, treating an empty path as "don't save"
    pub fn output_path(&self) -> Option<&Path> {
        self.output
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }
}

/// Result of a successful render
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    pub size: FigureSize,
    pub saved_to: Option<PathBuf>,
    /// Whether the viewer showed the surface
    pub displayed: bool,
    pub layout: Layout,
    pub surface: DrawingSurface,
}

/// Draws correlation-style heatmaps
#[derive(Debug, Clone)]
pub struct HeatmapRenderer {
    config: HeatmapConfig,
    palette: PaletteDefinition,
}

impl HeatmapRenderer {
    pub fn new(config: HeatmapConfig) -> Result<Self> {
        let palette = palette_registry()
            .get_or_default(&config.palette)
            .cloned()
            .ok_or_else(|| {
                HeatmapError::Config(format!("palette '{}' is not available", config.palette))
            })?;
        Ok(Self { config, palette })
    }

    pub fn config(&self) -> &HeatmapConfig {
        &self.config
    }

    /// Figure size the renderer uses for `matrix`
    pub fn figure_size(&self, matrix: &Matrix) -> FigureSize {
        self.config.sizing.figure_size(matrix)
    }

    /// Size, draw, save (if requested), then display
    pub fn render(&self, request: &RenderRequest, viewer: &dyn Viewer) -> Result<RenderOutcome> {
        let size = self.figure_size(&request.matrix);
        let (width_px, height_px) = size.pixels();
        log::debug!(
            "Figure {:.2}×{:.2} in at {} dpi ({}×{} px) for a {}×{} matrix",
            size.width,
            size.height,
            size.dpi,
            width_px,
            height_px,
            request.matrix.n_rows(),
            request.matrix.n_cols()
        );

        let mut surface = DrawingSurface::for_figure(&size);
        let layout = self.draw(&request.matrix, &mut surface)?;

        let saved_to = match request.output_path() {
            Some(path) => {
                surface.save(path)?;
                log::info!("Saved heatmap to {}", path.display());
                Some(path.to_path_buf())
            }
            None => None,
        };

        let displayed = match viewer.show(&surface, saved_to.as_deref()) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Heatmap rendered but not displayed: {}", e);
                false
            }
        };

        Ok(RenderOutcome {
            size,
            saved_to,
            displayed,
            layout,
            surface,
        })
    }

    /// Draw `matrix` onto `surface`, replacing its contents
    ///
    /// The layout adapts to the surface's pixel size and is returned.
    pub fn draw(&self, matrix: &Matrix, surface: &mut DrawingSurface) -> Result<Layout> {
        matrix.validate_for_rendering()?;

        let scale = ColorScale::fit(
            self.palette.clone(),
            matrix,
            self.config.color_range,
            self.config.color_center,
        );
        let text_enabled = fonts::ensure_font(self.config.font_path.as_deref());
        let px_per_point = self.config.sizing.dpi as f64 / POINTS_PER_INCH;
        let dimensions = surface.dimensions();

        surface.clear(BACKGROUND);
        let mut drawn = None;
        surface.paint(|area| {
            let text = TextPainter {
                area,
                enabled: text_enabled,
                px_per_point,
            };
            let tick_labels = self.colorbar_ticks(&scale);
            let (margins, colorbar_label_width) =
                self.margins(&text, matrix, &tick_labels, dimensions)?;
            let layout = Layout::compute(
                dimensions,
                matrix.n_rows(),
                matrix.n_cols(),
                margins,
                self.config.colorbar.then_some(colorbar_label_width),
            );

            self.draw_cells(area, matrix, &scale, &layout)?;
            if self.config.annotate {
                self.draw_annotations(&text, matrix, &scale, &layout)?;
            }
            self.draw_axis_labels(&text, matrix, &layout)?;
            if let Some(bar) = layout.colorbar {
                self.draw_colorbar(area, &text, &scale, bar, &tick_labels)?;
            }
            if let Some(title) = &self.config.title {
                let center_x = layout.grid.x + layout.grid.width / 2;
                text.draw(
                    title,
                    (center_x, layout.grid.y - LABEL_PAD),
                    TITLE_POINTS,
                    DARK_TEXT,
                    Pos::new(HPos::Center, VPos::Bottom),
                )?;
            }
            drawn = Some(layout);
            Ok(())
        })?;
        drawn.ok_or_else(|| HeatmapError::Drawing("layout was not computed".to_string()))
    }

    fn format_value(&self, value: f64) -> String {
        format!("{:.*}", self.config.annotation_decimals, value)
    }

    /// Colorbar tick values and labels: high, midpoint, low
    fn colorbar_ticks(&self, scale: &ColorScale) -> Vec<(f64, String)> {
        [scale.high(), scale.midpoint(), scale.low()]
            .into_iter()
            .map(|v| (v, self.format_value(v)))
            .collect()
    }

    /// Margins around the grid, and the width taken by colorbar tick labels
    fn margins(
        &self,
        text: &TextPainter<'_, '_>,
        matrix: &Matrix,
        ticks: &[(f64, String)],
        (width, height): (u32, u32),
    ) -> Result<(Margins, u32)> {
        let edge_x = (width as f64 * 0.02).round() as u32;
        let edge_y = (height as f64 * 0.03).round() as u32;
        let pad = LABEL_PAD as u32;

        if !text.enabled {
            return Ok((
                Margins {
                    left: edge_x,
                    right: edge_x,
                    top: edge_y,
                    bottom: edge_y,
                },
                0,
            ));
        }

        let mut row_label_width = 0;
        for label in matrix.row_labels() {
            row_label_width = row_label_width.max(text.measure(label, LABEL_POINTS)?.0);
        }
        let max_row_label = (width as f64 * MAX_ROW_LABEL_SHARE) as u32;
        let label_height = text.measure("Xg", LABEL_POINTS)?.1;

        let mut tick_width = 0;
        for (_, label) in ticks {
            tick_width = tick_width.max(text.measure(label, LABEL_POINTS)?.0);
        }

        let top = match &self.config.title {
            Some(title) => text.measure(title, TITLE_POINTS)?.1 + 2 * pad,
            None => edge_y,
        };

        Ok((
            Margins {
                left: edge_x + row_label_width.min(max_row_label) + pad,
                right: edge_x,
                top,
                bottom: edge_y + label_height + pad,
            },
            tick_width + pad,
        ))
    }

    fn draw_cells(
        &self,
        area: &SurfaceArea<'_>,
        matrix: &Matrix,
        scale: &ColorScale,
        layout: &Layout,
    ) -> Result<()> {
        for row in 0..matrix.n_rows() {
            for col in 0..matrix.n_cols() {
                let Some(rgb) = matrix.get(row, col).and_then(|v| scale.color(v)) else {
                    continue; // missing cells stay background
                };
                let cell = layout.cell(row, col);
                fill_rect(area, cell, RGBColor(rgb[0], rgb[1], rgb[2]))?;
            }
        }
        Ok(())
    }

    fn draw_annotations(
        &self,
        text: &TextPainter<'_, '_>,
        matrix: &Matrix,
        scale: &ColorScale,
        layout: &Layout,
    ) -> Result<()> {
        if !text.enabled {
            return Ok(());
        }

        // One size for every cell, fitted to the longest annotation
        let longest = matrix
            .values()
            .iter()
            .filter(|v| !v.is_nan())
            .map(|v| self.format_value(*v).chars().count())
            .max()
            .unwrap_or(0);
        let (cell_w, cell_h) = layout.cell_size();
        let label_px = LABEL_POINTS * text.px_per_point;
        let fit_px = label_px
            .min(cell_h * 0.45)
            .min(cell_w * 0.9 / (longest.max(1) as f64 * 0.6));
        if fit_px < MIN_ANNOTATION_PX {
            log::warn!(
                "Cells too small for annotations ({:.1}×{:.1} px), skipping",
                cell_w,
                cell_h
            );
            return Ok(());
        }
        let points = fit_px / text.px_per_point;

        for row in 0..matrix.n_rows() {
            for col in 0..matrix.n_cols() {
                let Some(value) = matrix.get(row, col).filter(|v| !v.is_nan()) else {
                    continue;
                };
                let Some(background) = scale.color(value) else {
                    continue;
                };
                text.draw(
                    &self.format_value(value),
                    layout.cell(row, col).center(),
                    points,
                    text_color_for(background),
                    Pos::new(HPos::Center, VPos::Center),
                )?;
            }
        }
        Ok(())
    }

    fn draw_axis_labels(
        &self,
        text: &TextPainter<'_, '_>,
        matrix: &Matrix,
        layout: &Layout,
    ) -> Result<()> {
        if !text.enabled {
            return Ok(());
        }

        let max_row_label = (layout.grid.x - 2 * LABEL_PAD).max(0) as u32;
        for (row, label) in matrix.row_labels().iter().enumerate() {
            let label = text.fit(label, LABEL_POINTS, max_row_label)?;
            text.draw(
                &label,
                (layout.grid.x - LABEL_PAD, layout.row_center(row)),
                LABEL_POINTS,
                DARK_TEXT,
                Pos::new(HPos::Right, VPos::Center),
            )?;
        }

        let max_col_label = layout.cell_size().0.max(0.0) as u32;
        for (col, label) in matrix.col_labels().iter().enumerate() {
            let label = text.fit(label, LABEL_POINTS, max_col_label)?;
            text.draw(
                &label,
                (layout.col_center(col), layout.grid.bottom() + LABEL_PAD),
                LABEL_POINTS,
                DARK_TEXT,
                Pos::new(HPos::Center, VPos::Top),
            )?;
        }
        Ok(())
    }

    fn draw_colorbar(
        &self,
        area: &SurfaceArea<'_>,
        text: &TextPainter<'_, '_>,
        scale: &ColorScale,
        bar: PixelRect,
        ticks: &[(f64, String)],
    ) -> Result<()> {
        // One-pixel bands, high values at the top
        let span = (bar.height - 1).max(1) as f64;
        for dy in 0..bar.height {
            let rgb = scale.color_at(1.0 - dy as f64 / span);
            area.draw(&Rectangle::new(
                [(bar.x, bar.y + dy), (bar.right() - 1, bar.y + dy)],
                RGBColor(rgb[0], rgb[1], rgb[2]).filled(),
            ))
            .map_err(drawing_error)?;
        }
        area.draw(&Rectangle::new(
            [(bar.x, bar.y), (bar.right() - 1, bar.bottom() - 1)],
            OUTLINE.stroke_width(1),
        ))
        .map_err(drawing_error)?;

        for (value, label) in ticks {
            let y = bar.y + ((1.0 - scale.position(*value)) * span).round() as i32;
            area.draw(&PathElement::new(
                vec![(bar.right(), y), (bar.right() + 3, y)],
                OUTLINE.stroke_width(1),
            ))
            .map_err(drawing_error)?;
            text.draw(
                label,
                (bar.right() + LABEL_PAD, y),
                LABEL_POINTS,
                DARK_TEXT,
                Pos::new(HPos::Left, VPos::Center),
            )?;
        }
        Ok(())
    }
}

fn fill_rect(area: &SurfaceArea<'_>, rect: PixelRect, color: RGBColor) -> Result<()> {
    area.draw(&Rectangle::new(
        [(rect.x, rect.y), (rect.right() - 1, rect.bottom() - 1)],
        color.filled(),
    ))
    .map_err(drawing_error)
}

/// Text drawing that degrades to a no-op without a registered font
struct TextPainter<'a, 'b> {
    area: &'a SurfaceArea<'b>,
    enabled: bool,
    px_per_point: f64,
}

impl TextPainter<'_, '_> {
    fn style(&self, points: f64, rgb: [u8; 3], pos: Pos) -> TextStyle<'static> {
        let color = RGBColor(rgb[0], rgb[1], rgb[2]);
        (FONT_FAMILY, points * self.px_per_point)
            .into_font()
            .color(&color)
            .pos(pos)
    }

    /// Pixel extent of `text`; (0, 0) when text is disabled
    fn measure(&self, text: &str, points: f64) -> Result<(u32, u32)> {
        if !self.enabled || text.is_empty() {
            return Ok((0, 0));
        }
        let style = self.style(points, DARK_TEXT, Pos::new(HPos::Left, VPos::Top));
        self.area
            .estimate_text_size(text, &style)
            .map_err(drawing_error)
    }

    /// Shorten `text` with an ellipsis until it fits `max_width`
    fn fit(&self, text: &str, points: f64, max_width: u32) -> Result<String> {
        if self.measure(text, points)?.0 <= max_width {
            return Ok(text.to_string());
        }
        let chars: Vec<char> = text.chars().collect();
        for keep in (0..chars.len()).rev() {
            let candidate: String = chars[..keep].iter().collect::<String>() + "…";
            if self.measure(&candidate, points)?.0 <= max_width {
                return Ok(candidate);
            }
        }
        Ok(String::new())
    }

    fn draw(
        &self,
        text: &str,
        at: (i32, i32),
        points: f64,
        rgb: [u8; 3],
        pos: Pos,
    ) -> Result<()> {
        if !self.enabled || text.is_empty() {
            return Ok(());
        }
        let style = self.style(points, rgb, pos);
        self.area
            .draw(&Text::new(text.to_string(), at, style))
            .map_err(drawing_error)
    }
}

/// Message logged when a render fails
pub fn failure_message(error: &HeatmapError) -> String {
    format!("Failed to render heatmap: {}", error)
}

/// Render and log failures instead of returning them
pub fn render_or_log(renderer: &HeatmapRenderer, request: &RenderRequest, viewer: &dyn Viewer) {
    if let Err(e) = renderer.render(request, viewer) {
        log::error!("{}", failure_message(&e));
    }
}

/// Draw a heatmap of a data frame with default settings, saving to `save_name`
/// when it is non-empty. Never fails: problems are logged.
pub fn draw_heatmap(frame: &DataFrame, save_name: Option<&str>, viewer: &dyn Viewer) {
    let result = Matrix::from_frame(frame).and_then(|mut matrix| {
        // A square frame is a correlation table: rows follow the columns
        if matrix.n_rows() == matrix.n_cols() {
            matrix.set_row_labels(matrix.col_labels().to_vec())?;
        }
        let renderer = HeatmapRenderer::new(HeatmapConfig::default())?;
        let mut request = RenderRequest::new(matrix);
        request.output = save_name.map(PathBuf::from);
        renderer.render(&request, viewer)
    });
    if let Err(e) = result {
        log::error!("{}", failure_message(&e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heatmap::color_scale::LIGHT_TEXT;
    use crate::heatmap::viewer::HeadlessViewer;

    fn correlation_like() -> Matrix {
        Matrix::with_labels(
            3,
            3,
            vec![1.0, 0.8, -0.5, 0.8, 1.0, f64::NAN, -0.5, f64::NAN, 1.0],
            vec!["a".into(), "b".into(), "c".into()],
            vec!["a".into(), "b".into(), "c".into()],
        )
        .unwrap()
    }

    #[test]
    fn test_output_path_empty_means_none() {
        let m = correlation_like();
        assert_eq!(RenderRequest::new(m.clone()).output_path(), None);
        assert_eq!(RenderRequest::new(m.clone()).output("").output_path(), None);
        assert_eq!(
            RenderRequest::new(m).output("out.png").output_path(),
            Some(Path::new("out.png"))
        );
    }

    #[test]
    fn test_render_without_output_returns_sized_surface() {
        let renderer = HeatmapRenderer::new(HeatmapConfig::default()).unwrap();
        let outcome = renderer
            .render(&RenderRequest::new(correlation_like()), &HeadlessViewer)
            .unwrap();
        assert_eq!(outcome.saved_to, None);
        assert_eq!(outcome.surface.dimensions(), (890, 690));
        assert_eq!(outcome.size.pixels(), (890, 690));
    }

    #[test]
    fn test_cells_use_diverging_colors() {
        let config = HeatmapConfig {
            annotate: false,
            colorbar: false,
            ..HeatmapConfig::default()
        };
        let renderer = HeatmapRenderer::new(config).unwrap();
        let matrix = correlation_like();
        let mut surface = DrawingSurface::new(600, 600);
        renderer.draw(&matrix, &mut surface).unwrap();

        // Diagonal cells are +1, so coolwarm's red end must appear; NaN cells stay white
        let mut saw_red = false;
        let mut saw_missing_background = false;
        for y in (0..600).step_by(3) {
            for x in (0..600).step_by(3) {
                match surface.pixel(x, y) {
                    Some([180, 4, 38]) => saw_red = true,
                    Some([255, 255, 255]) => saw_missing_background = true,
                    _ => {}
                }
            }
        }
        assert!(saw_red);
        assert!(saw_missing_background);
    }

    /// True when some pixel in `rect` is within a few levels of `rgb`
    fn rect_contains(surface: &DrawingSurface, rect: PixelRect, rgb: [u8; 3]) -> bool {
        (rect.y.max(0)..rect.bottom()).any(|y| {
            (rect.x.max(0)..rect.right()).any(|x| {
                surface.pixel(x as u32, y as u32).is_some_and(|px| {
                    px.iter().zip(rgb).all(|(a, b)| a.abs_diff(b) <= 12)
                })
            })
        })
    }

    #[test]
    fn test_text_and_colorbar_reach_pixels() {
        let config = HeatmapConfig {
            title: Some("Correlation".to_string()),
            ..HeatmapConfig::default()
        };
        let renderer = HeatmapRenderer::new(config).unwrap();
        let labels = vec!["alpha".to_string(), "beta".to_string()];
        let matrix =
            Matrix::with_labels(2, 2, vec![1.0, 0.1, 0.1, 1.0], labels.clone(), labels).unwrap();

        let outcome = renderer
            .render(&RenderRequest::new(matrix), &HeadlessViewer)
            .unwrap();
        let surface = &outcome.surface;
        let layout = &outcome.layout;

        // High end at the top of the bar, low end at the bottom
        let bar = layout.colorbar.unwrap();
        let x = (bar.x + bar.width / 2) as u32;
        let [r, _, b] = surface.pixel(x, (bar.y + 2) as u32).unwrap();
        assert!(r > b);
        let [r, _, b] = surface.pixel(x, (bar.bottom() - 3) as u32).unwrap();
        assert!(b > r);

        if !fonts::ensure_font(None) {
            return; // no font on this host, text is omitted
        }

        // "1.00" on dark red is white, "0.10" on a near-neutral cell is dark
        assert!(rect_contains(surface, layout.cell(0, 0), LIGHT_TEXT));
        assert!(rect_contains(surface, layout.cell(1, 1), LIGHT_TEXT));
        assert!(rect_contains(surface, layout.cell(0, 1), DARK_TEXT));
        assert!(rect_contains(surface, layout.cell(1, 0), DARK_TEXT));

        let row_labels = PixelRect {
            x: 0,
            y: layout.grid.y,
            width: layout.grid.x,
            height: layout.grid.height,
        };
        assert!(rect_contains(surface, row_labels, DARK_TEXT));

        let col_labels = PixelRect {
            x: layout.grid.x,
            y: layout.grid.bottom(),
            width: layout.grid.width,
            height: surface.dimensions().1 as i32 - layout.grid.bottom(),
        };
        assert!(rect_contains(surface, col_labels, DARK_TEXT));

        let title = PixelRect {
            x: layout.grid.x,
            y: 0,
            width: layout.grid.width,
            height: layout.grid.y,
        };
        assert!(rect_contains(surface, title, DARK_TEXT));

        let ticks = PixelRect {
            x: bar.right(),
            y: bar.y - LABEL_PAD,
            width: surface.dimensions().0 as i32 - bar.right(),
            height: bar.height + 2 * LABEL_PAD,
        };
        assert!(rect_contains(surface, ticks, DARK_TEXT));
    }

    #[test]
    fn test_draw_returns_layout_of_surface() {
        let renderer = HeatmapRenderer::new(HeatmapConfig::default()).unwrap();
        let mut surface = DrawingSurface::new(400, 300);
        let layout = renderer.draw(&correlation_like(), &mut surface).unwrap();
        assert!(layout.grid.right() <= 400 && layout.grid.bottom() <= 300);
        assert!(layout.colorbar.is_some());
    }

    #[test]
    fn test_infinite_cell_is_an_error() {
        let renderer = HeatmapRenderer::new(HeatmapConfig::default()).unwrap();
        let matrix = Matrix::from_rows(vec![vec![f64::INFINITY]]).unwrap();
        let err = renderer
            .render(&RenderRequest::new(matrix), &HeadlessViewer)
            .unwrap_err();
        assert!(matches!(err, HeatmapError::NonFiniteCell { .. }));
        assert!(failure_message(&err).starts_with("Failed to render heatmap: "));
    }

    #[test]
    fn test_empty_matrix_is_an_error() {
        let renderer = HeatmapRenderer::new(HeatmapConfig::default()).unwrap();
        let matrix = Matrix::new(0, 0, vec![]).unwrap();
        assert!(matches!(
            renderer.render(&RenderRequest::new(matrix), &HeadlessViewer),
            Err(HeatmapError::EmptyMatrix)
        ));
    }

    #[test]
    fn test_unknown_palette_falls_back() {
        let config = HeatmapConfig {
            palette: "no-such-palette".to_string(),
            ..HeatmapConfig::default()
        };
        assert!(HeatmapRenderer::new(config).is_ok());
    }

    #[test]
    fn test_format_value_uses_configured_decimals() {
        let renderer = HeatmapRenderer::new(HeatmapConfig::default()).unwrap();
        assert_eq!(renderer.format_value(0.8), "0.80");
        assert_eq!(renderer.format_value(-0.126), "-0.13");

        let config = HeatmapConfig {
            annotation_decimals: 0,
            ..HeatmapConfig::default()
        };
        let renderer = HeatmapRenderer::new(config).unwrap();
        assert_eq!(renderer.format_value(0.8), "1");
    }
}
