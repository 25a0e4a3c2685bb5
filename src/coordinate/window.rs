//! Pixel window structure for addressing a block of cells
//!
//! Offsets and sizes are signed: a window computed from a bounding box
//! that misses the raster keeps its raw, possibly negative, values.

/// A rectangle in pixel coordinates, (0, 0) being the top-left cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    /// Column of the top-left cell
    pub x: i64,
    /// Row of the top-left cell
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl PixelWindow {
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        PixelWindow { x, y, width, height }
    }

    /// Column just right of the window
    pub fn end_x(&self) -> i64 {
        self.x.saturating_add(self.width)
    }

    /// Row just below the window
    pub fn end_y(&self) -> i64 {
        self.y.saturating_add(self.height)
    }

    /// The part of the window inside a `width` x `height` raster, if any
    pub fn clip(&self, width: usize, height: usize) -> Option<PixelWindow> {
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = self.end_x().min(width as i64);
        let y1 = self.end_y().min(height as i64);

        if x0 >= x1 || y0 >= y1 {
            return None;
        }

        Some(PixelWindow::new(x0, y0, x1 - x0, y1 - y0))
    }
}
