//! Population grids in ESRI ASCII format.
//!
//! # File format
//!
//! ```text
//! ncols        4
//! nrows        2
//! xllcorner    0.0
//! yllcorner    0.0
//! cellsize     100.0
//! NODATA_value -9999
//! 0 12.5 3 -9999
//! 7 0 0 1
//! ```
//!
//! Header keys are case-insensitive.  `xllcenter`/`yllcenter` may replace
//! the corner keys.  `NODATA_value` is optional.  The first data row is the
//! northernmost.

use std::io::Read;
use std::path::Path;

use acc_core::XY;
use acc_engine::PopulationPoint;

use crate::{IoError, IoResult};

/// Summary statistics over populated cells (value > 0, nodata excluded).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridStats {
    pub total:      f64,
    pub mean:       f64,
    /// Population standard deviation.
    pub std_dev:    f64,
    pub min:        f64,
    pub max:        f64,
    pub cell_count: usize,
}

/// A north-up raster of population counts.
#[derive(Clone, Debug, PartialEq)]
pub struct PopulationGrid {
    ncols:    usize,
    nrows:    usize,
    /// Lower-left corner of the lower-left cell.
    origin:   XY,
    cellsize: f64,
    nodata:   Option<f64>,
    /// Row-major, first row northernmost.
    values:   Vec<f64>,
}

impl PopulationGrid {
    /// # Errors
    ///
    /// [`IoError::Parse`] when `values.len() != ncols * nrows`, a dimension
    /// is zero, or `cellsize` is not a positive finite number.
    pub fn new(
        ncols:    usize,
        nrows:    usize,
        origin:   XY,
        cellsize: f64,
        nodata:   Option<f64>,
        values:   Vec<f64>,
    ) -> IoResult<Self> {
        if ncols == 0 || nrows == 0 {
            return Err(IoError::Parse(format!("grid dimensions must be non-zero, got {ncols}x{nrows}")));
        }
        if !(cellsize.is_finite() && cellsize > 0.0) {
            return Err(IoError::Parse(format!("cellsize must be finite and > 0, got {cellsize}")));
        }
        let cells = ncols
            .checked_mul(nrows)
            .ok_or_else(|| IoError::Parse(format!("grid dimensions {ncols}x{nrows} overflow")))?;
        if values.len() != cells {
            return Err(IoError::Parse(format!(
                "grid declares {ncols}x{nrows} = {cells} cells but has {} values",
                values.len()
            )));
        }
        Ok(Self { ncols, nrows, origin, cellsize, nodata, values })
    }

    pub fn from_path(path: &Path) -> IoResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Parse an ESRI ASCII grid from any `Read` source.
    pub fn from_reader<R: Read>(mut reader: R) -> IoResult<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;

        let mut ncols = None;
        let mut nrows = None;
        let mut xll = None;
        let mut yll = None;
        let mut centred = false;
        let mut cellsize = None;
        let mut nodata = None;

        let mut tokens = text.split_whitespace().peekable();
        while let Some(&key) = tokens.peek() {
            if key.parse::<f64>().is_ok() {
                break;
            }
            tokens.next();
            let value = tokens
                .next()
                .ok_or_else(|| IoError::Parse(format!("grid header key {key:?} has no value")))?;
            let num = value
                .parse::<f64>()
                .map_err(|_| IoError::Parse(format!("grid header {key}: {value:?} is not a number")))?;

            match key.to_ascii_lowercase().as_str() {
                "ncols" => ncols = Some(dimension(key, value)?),
                "nrows" => nrows = Some(dimension(key, value)?),
                "xllcorner" => xll = Some(num),
                "yllcorner" => yll = Some(num),
                "xllcenter" => { xll = Some(num); centred = true; }
                "yllcenter" => { yll = Some(num); centred = true; }
                "cellsize" => cellsize = Some(num),
                "nodata_value" => nodata = Some(num),
                _ => return Err(IoError::Parse(format!("unknown grid header key {key:?}"))),
            }
        }

        let missing = |name: &str| IoError::Parse(format!("grid header lacks {name}"));
        let ncols = ncols.ok_or_else(|| missing("ncols"))?;
        let nrows = nrows.ok_or_else(|| missing("nrows"))?;
        let cellsize = cellsize.ok_or_else(|| missing("cellsize"))?;
        let mut origin = XY::new(xll.ok_or_else(|| missing("xllcorner"))?, yll.ok_or_else(|| missing("yllcorner"))?);
        if centred {
            origin = XY::new(origin.x - cellsize / 2.0, origin.y - cellsize / 2.0);
        }

        let values = tokens
            .map(|t| t.parse::<f64>().map_err(|_| IoError::Parse(format!("grid value {t:?} is not a number"))))
            .collect::<IoResult<Vec<f64>>>()?;

        let grid = Self::new(ncols, nrows, origin, cellsize, nodata, values)?;
        log::info!("population grid loaded: {ncols}x{nrows} cells of {cellsize}");
        Ok(grid)
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn cellsize(&self) -> f64 {
        self.cellsize
    }

    /// Cell value, or `None` for nodata and NaN.
    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        let v = self.values[row * self.ncols + col];
        if v.is_nan() || self.nodata == Some(v) { None } else { Some(v) }
    }

    /// Centre of cell `(row, col)`; row 0 is the top row.
    pub fn cell_centre(&self, row: usize, col: usize) -> XY {
        XY::new(
            self.origin.x + (col as f64 + 0.5) * self.cellsize,
            self.origin.y + ((self.nrows - row) as f64 - 0.5) * self.cellsize,
        )
    }

    /// Valid cells in row-major order, negative values clamped to 0.
    fn cells(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.nrows).flat_map(move |row| {
            (0..self.ncols).filter_map(move |col| self.value(row, col).map(|v| (row, col, v.max(0.0))))
        })
    }

    /// One weighted point per cell whose value exceeds `threshold`, placed
    /// at the cell centre.
    ///
    /// When more than `max_points` cells qualify, every `ceil(n / max_points)`-th
    /// qualifying cell (row-major order, starting with the first) is kept.
    pub fn to_points(&self, threshold: f64, max_points: usize) -> Vec<PopulationPoint> {
        let selected: Vec<(usize, usize, f64)> = self.cells().filter(|&(_, _, v)| v > threshold).collect();
        log::info!("{} cells above {threshold}", selected.len());

        let max_points = max_points.max(1);
        let step = if selected.len() > max_points { selected.len().div_ceil(max_points) } else { 1 };

        let points: Vec<PopulationPoint> = selected
            .into_iter()
            .step_by(step)
            .map(|(row, col, v)| PopulationPoint::new(self.cell_centre(row, col), Some(v)))
            .collect();
        if step > 1 {
            log::info!("downsampled by step {step} to {} population points", points.len());
        }
        points
    }

    /// Statistics over cells with a positive value; `None` when there are
    /// none.
    pub fn stats(&self) -> Option<GridStats> {
        let values: Vec<f64> = self.cells().map(|(_, _, v)| v).filter(|&v| v > 0.0).collect();
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let total: f64 = values.iter().sum();
        let mean = total / n;
        let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
        Some(GridStats {
            total,
            mean,
            std_dev: variance.sqrt(),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            cell_count: values.len(),
        })
    }
}

/// Grid dimensions must be written as non-negative integers.
fn dimension(key: &str, value: &str) -> IoResult<usize> {
    value
        .parse::<usize>()
        .map_err(|_| IoError::Parse(format!("grid header {key}: {value:?} is not a whole cell count")))
}
