use log::debug;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TraceError};

/// One contiguous slice of a raw array shown as a `rows x cols` grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub index: usize,
    pub rows: usize,
    pub cols: usize,
    pub start_index: usize,
    pub end_index: usize,
}

impl Page {
    pub fn bin_size(&self) -> usize {
        self.rows * self.cols
    }

    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of trailing cells with no sample behind them
    pub fn padding(&self) -> usize {
        self.bin_size() - self.len()
    }

    /// Data index of the leftmost cell of each row
    pub fn row_labels(&self) -> Vec<usize> {
        (0..self.rows)
            .map(|r| self.start_index + r * self.cols)
            .collect()
    }

    /// Lay the page's samples out row by row, filling the tail with `Cell::Missing`
    pub fn cells(&self, values: &[f64]) -> Result<Array2<Cell>> {
        let end = self.end_index.min(values.len());
        let start = self.start_index.min(end);
        let cells: Vec<Cell> = values[start..end]
            .iter()
            .map(|&v| Cell::Value(v))
            .chain(std::iter::repeat(Cell::Missing))
            .take(self.bin_size())
            .collect();
        Ok(Array2::from_shape_vec((self.rows, self.cols), cells)?)
    }
}

/// Table cell content. `Missing` only pads the grid and is never a data point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    Value(f64),
    Missing,
}

impl Cell {
    pub fn value(&self) -> Option<f64> {
        match self {
            Cell::Value(v) => Some(*v),
            Cell::Missing => None,
        }
    }

    pub fn format(&self, decimals: usize) -> String {
        match self {
            Cell::Value(v) => format!("{v:.decimals$}"),
            Cell::Missing => String::new(),
        }
    }
}

/// Row and column capacity of a table viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableGeometry {
    pub rows: usize,
    pub cols: usize,
}

impl TableGeometry {
    /// Cells that fit into a viewport of `width x height` pixels.
    ///
    /// A quarter of the height is reserved for headers. Both counts have a
    /// floor of 1.
    pub fn from_pixels(width: u32, height: u32, cell_width: u32, cell_height: u32) -> Self {
        let usable_height = height - height / 4;
        Self {
            rows: (usable_height / cell_height.max(1)).max(1) as usize,
            cols: (width / cell_width.max(1)).max(1) as usize,
        }
    }
}

/// Samples per page for a `rows x cols` viewport.
///
/// Zero rows or columns, or a product that does not fit in `usize`, is an
/// `InvalidViewport`.
pub fn page_capacity(rows: usize, cols: usize) -> Result<usize> {
    match rows.checked_mul(cols) {
        Some(capacity) if capacity > 0 => Ok(capacity),
        _ => Err(TraceError::InvalidViewport { rows, cols }),
    }
}

/// Splits one array into fixed-size pages sized to the viewport
#[derive(Debug, Clone)]
pub struct Paginator {
    len: usize,
    rows: usize,
    cols: usize,
    bin_size: usize,
    page_count: usize,
    current: usize,
}

impl Paginator {
    pub fn new(len: usize, rows: usize, cols: usize) -> Result<Self> {
        if len == 0 {
            return Err(TraceError::EmptyInput(
                "cannot paginate an empty array".to_string(),
            ));
        }
        let mut paginator = Self {
            len,
            rows: 1,
            cols: 1,
            bin_size: 1,
            page_count: len,
            current: 0,
        };
        paginator.configure(rows, cols)?;
        Ok(paginator)
    }

    /// Recompute page geometry for a new viewport capacity.
    ///
    /// The current page index is kept, clamped to the new last page.
    pub fn configure(&mut self, rows: usize, cols: usize) -> Result<()> {
        let bin_size = page_capacity(rows, cols)?;
        let page_count = self.len.div_ceil(bin_size);

        self.rows = rows;
        self.cols = cols;
        self.bin_size = bin_size;
        self.page_count = page_count;
        self.current = self.current.min(page_count - 1);

        debug!(
            "Table geometry {}x{}: {} samples per page, {} pages",
            rows, cols, bin_size, page_count
        );
        Ok(())
    }

    pub fn get_page(&self, index: usize) -> Result<Page> {
        if index >= self.page_count {
            return Err(TraceError::IndexOutOfRange {
                index,
                count: self.page_count,
            });
        }
        Ok(self.page_at(index))
    }

    /// Jump to a page, clamped into range
    pub fn seek(&mut self, index: usize) -> Page {
        self.current = index.min(self.page_count - 1);
        self.page_at(self.current)
    }

    /// Move by `delta` pages, clamped into range
    pub fn step(&mut self, delta: isize) -> Page {
        let target = self.current.saturating_add_signed(delta);
        self.seek(target)
    }

    pub fn current_page(&self) -> Page {
        self.page_at(self.current)
    }

    fn page_at(&self, index: usize) -> Page {
        let start_index = index * self.bin_size;
        Page {
            index,
            rows: self.rows,
            cols: self.cols,
            start_index,
            end_index: (index + 1).saturating_mul(self.bin_size).min(self.len),
        }
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn bin_size(&self) -> usize {
        self.bin_size
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
