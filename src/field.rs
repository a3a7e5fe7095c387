use crate::noise::Noise3;

/// Dense row-major grid of fbm samples with one cell of padding on every side,
/// so contours crossing the surface edge are never cut off.
#[derive(Clone, Debug, Default)]
pub struct ScalarField {
    pub cols: usize,
    pub rows: usize,
    pub cell_size: f32,
    pub values: Vec<f32>,
}

/// Four corner samples of one grid cell plus its pixel-space origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridCell {
    pub x: f32,
    pub y: f32,
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_right: f32,
    pub bottom_left: f32,
}

impl ScalarField {
    /// Grid dimensions for a `width x height` surface: `ceil(w/cell)+2` by
    /// `ceil(h/cell)+2`. An empty surface (or a non-positive cell size) has no
    /// grid at all.
    pub fn dims(width: f32, height: f32, cell_size: f32) -> (usize, usize) {
        if !(width > 0.0 && height > 0.0 && cell_size > 0.0) {
            return (0, 0);
        }
        if !width.is_finite() || !height.is_finite() {
            return (0, 0);
        }
        let cols = (width / cell_size).ceil() as usize + 2;
        let rows = (height / cell_size).ceil() as usize + 2;
        (cols, rows)
    }

    pub fn sample(
        noise: &Noise3,
        width: f32,
        height: f32,
        cell_size: f32,
        scale: f32,
        time: f32,
    ) -> Self {
        let mut field = Self::default();
        field.sample_into(noise, width, height, cell_size, scale, time);
        field
    }

    /// Refill this field in place, reusing its buffer when the size allows.
    pub fn sample_into(
        &mut self,
        noise: &Noise3,
        width: f32,
        height: f32,
        cell_size: f32,
        scale: f32,
        time: f32,
    ) {
        let (cols, rows) = Self::dims(width, height, cell_size);
        self.cols = cols;
        self.rows = rows;
        self.cell_size = cell_size;
        self.values.clear();
        self.values.reserve(cols * rows);

        for row in 0..rows {
            let y = row as f32 * cell_size * scale;
            for col in 0..cols {
                let x = col as f32 * cell_size * scale;
                self.values.push(noise.fbm(x, y, time));
            }
        }
    }

    #[inline]
    pub fn get(&self, col: usize, row: usize) -> f32 {
        self.values[row * self.cols + col]
    }

    pub fn is_empty(&self) -> bool {
        self.cols < 2 || self.rows < 2
    }

    /// Pixel position of grid node `(col, row)`.
    #[inline]
    pub fn node_position(&self, col: usize, row: usize) -> (f32, f32) {
        (
            (col as f32 - 1.0) * self.cell_size,
            (row as f32 - 1.0) * self.cell_size,
        )
    }

    /// Cell whose top-left node is `(col, row)`. Requires
    /// `col + 1 < cols && row + 1 < rows`.
    pub fn cell(&self, col: usize, row: usize) -> GridCell {
        let (x, y) = self.node_position(col, row);
        GridCell {
            x,
            y,
            top_left: self.get(col, row),
            top_right: self.get(col + 1, row),
            bottom_right: self.get(col + 1, row + 1),
            bottom_left: self.get(col, row + 1),
        }
    }

    /// Smallest and largest sample, or `None` for an empty field.
    pub fn range(&self) -> Option<(f32, f32)> {
        let mut it = self.values.iter().copied().filter(|v| v.is_finite());
        let first = it.next()?;
        Some(it.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}
