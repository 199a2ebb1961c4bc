//! Caller-owned drawing surface
//!
//! Each render draws into its own RGB buffer; there is no process-wide
//! "current figure". The buffer can be saved to any format the `image`
//! crate infers from the file extension.

use super::sizing::FigureSize;
use crate::error::{HeatmapError, Result};
use image::RgbImage;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

/// Drawing area type used by the heatmap painters
pub type SurfaceArea<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// RGB pixel buffer, row-major, 3 bytes per pixel
#[derive(Debug, Clone)]
pub struct DrawingSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl DrawingSurface {
    /// White surface of `width × height` pixels
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            pixels: vec![255; width as usize * height as usize * 3],
        }
    }

    /// Surface matching a figure size
    pub fn for_figure(size: &FigureSize) -> Self {
        let (width, height) = size.pixels();
        Self::new(width, height)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Pixel at `(x, y)`, or None outside the surface
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]])
    }

    /// Reset every pixel to `rgb`
    pub fn clear(&mut self, rgb: [u8; 3]) {
        for px in self.pixels.chunks_exact_mut(3) {
            px.copy_from_slice(&rgb);
        }
    }

    /// Run `paint` on a plotters drawing area backed by this surface
    pub fn paint<F>(&mut self, paint: F) -> Result<()>
    where
        F: FnOnce(&SurfaceArea<'_>) -> Result<()>,
    {
        let size = (self.width, self.height);
        let root = BitMapBackend::with_buffer(&mut self.pixels, size).into_drawing_area();
        paint(&root)?;
        root.present().map_err(drawing_error)?;
        Ok(())
    }

    /// Copy into an `image` buffer
    pub fn to_image(&self) -> Result<RgbImage> {
        RgbImage::from_raw(self.width, self.height, self.pixels.clone()).ok_or_else(|| {
            HeatmapError::Drawing(format!(
                "buffer of {} bytes does not fit {}×{}",
                self.pixels.len(),
                self.width,
                self.height
            ))
        })
    }

    /// Write to `path`; the format comes from the extension, existing files are overwritten
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(HeatmapError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("directory '{}' does not exist", parent.display()),
                )));
            }
        }
        self.to_image()?.save(path)?;
        Ok(())
    }
}

/// Convert a plotters error into a HeatmapError
pub fn drawing_error<E: std::fmt::Display>(e: E) -> HeatmapError {
    HeatmapError::Drawing(e.to_string())
}
