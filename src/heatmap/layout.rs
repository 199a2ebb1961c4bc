//! Pixel layout of the heatmap: grid, label margins, colorbar

/// Axis-aligned pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

/// Space reserved around the grid, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Margins {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

/// Resolved positions for one render
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub grid: PixelRect,
    pub colorbar: Option<PixelRect>,
    cell_width: f64,
    cell_height: f64,
}

impl Layout {
    /// Colorbar width as a share of the surface width
    const COLORBAR_WIDTH_RATIO: f64 = 0.025;
    /// Gap between grid and colorbar as a share of the surface width
    const COLORBAR_GAP_RATIO: f64 = 0.02;

    /// Lay out a `n_rows × n_cols` grid on a `surface` sized image
    ///
    /// `colorbar_labels` is the width reserved for colorbar tick labels;
    /// `None` means no colorbar.
    pub fn compute(
        surface: (u32, u32),
        n_rows: usize,
        n_cols: usize,
        margins: Margins,
        colorbar_labels: Option<u32>,
    ) -> Self {
        let (width, height) = (surface.0 as i32, surface.1 as i32);

        let (bar_width, bar_gap, bar_labels) = match colorbar_labels {
            Some(labels) => (
                ((width as f64 * Self::COLORBAR_WIDTH_RATIO).round() as i32).max(8),
                ((width as f64 * Self::COLORBAR_GAP_RATIO).round() as i32).max(6),
                labels as i32,
            ),
            None => (0, 0, 0),
        };

        let right_reserved = margins.right as i32 + bar_width + bar_gap + bar_labels;
        let grid_width = (width - margins.left as i32 - right_reserved).max(1);
        let grid_height = (height - margins.top as i32 - margins.bottom as i32).max(1);

        let grid = PixelRect {
            x: margins.left as i32,
            y: margins.top as i32,
            width: grid_width,
            height: grid_height,
        };

        let colorbar = colorbar_labels.map(|_| PixelRect {
            x: grid.right() + bar_gap,
            y: grid.y,
            width: bar_width,
            height: grid.height,
        });

        Self {
            grid,
            colorbar,
            cell_width: grid_width as f64 / n_cols.max(1) as f64,
            cell_height: grid_height as f64 / n_rows.max(1) as f64,
        }
    }

    pub fn cell_size(&self) -> (f64, f64) {
        (self.cell_width, self.cell_height)
    }

    /// Cell rectangle; neighbouring cells tile the grid without gaps
    pub fn cell(&self, row: usize, col: usize) -> PixelRect {
        let x0 = self.grid.x + (col as f64 * self.cell_width).round() as i32;
        let x1 = self.grid.x + ((col + 1) as f64 * self.cell_width).round() as i32;
        let y0 = self.grid.y + (row as f64 * self.cell_height).round() as i32;
        let y1 = self.grid.y + ((row + 1) as f64 * self.cell_height).round() as i32;
        PixelRect {
            x: x0,
            y: y0,
            width: (x1 - x0).max(1),
            height: (y1 - y0).max(1),
        }
    }

    /// Vertical pixel center of a row
    pub fn row_center(&self, row: usize) -> i32 {
        self.grid.y + ((row as f64 + 0.5) * self.cell_height).round() as i32
    }

    /// Horizontal pixel center of a column
    pub fn col_center(&self, col: usize) -> i32 {
        self.grid.x + ((col as f64 + 0.5) * self.cell_width).round() as i32
    }
}
