//! Per-cell flow records

use super::Direction;
use crate::error::{Error, Result};
use crate::raster::Raster;
use ndarray::{s, Array2, Array3, ArrayView1};

/// Flag value: the cell does not drain anywhere
pub const NO_FLOW: f32 = -1.0;
/// Flag value: the cell drains into the neighbors with non-zero weight
pub const HAS_FLOW: f32 = 0.0;
/// Flag value: the cell's own elevation is no-data
pub const NO_DATA: f32 = -2.0;

/// Slot holding the per-cell flag
pub const FLAG_SLOT: usize = 0;
/// One flag slot plus eight direction weights
pub const SLOTS: usize = 9;

/// Decoded view of a single cell's record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellFlow {
    /// The cell itself has no valid elevation
    NoData,
    /// Pit, flat or edge cell: no downslope neighbor chosen
    NoFlow,
    /// All flow goes to this neighbor
    Flow(Direction),
}

/// Flow-direction grid: `rows x cols x 9` values.
///
/// Slot 0 is a flag ([`NO_FLOW`], [`HAS_FLOW`] or [`NO_DATA`]); slots
/// 1..=8 hold the fraction of flow sent towards [`Direction`] `n`.
/// Single-flow-direction algorithms set exactly one weight to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowProps {
    data: Array3<f32>,
}

impl FlowProps {
    /// Create a grid where every cell is `NO_FLOW` with zero weights
    pub fn new(rows: usize, cols: usize) -> Self {
        let mut props = Self {
            data: Array3::zeros((rows, cols, SLOTS)),
        };
        props.reset();
        props
    }

    /// Create a grid sized to match `raster`
    pub fn like<T: crate::RasterElement>(raster: &Raster<T>) -> Self {
        let (rows, cols) = raster.shape();
        Self::new(rows, cols)
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        let (rows, cols, _) = self.data.dim();
        (rows, cols)
    }

    /// Put every cell back to `NO_FLOW` with all weights zero
    pub fn reset(&mut self) {
        self.data.fill(0.0);
        self.data.slice_mut(s![.., .., FLAG_SLOT]).fill(NO_FLOW);
    }

    /// Get a single slot of a cell
    pub fn get(&self, row: usize, col: usize, slot: usize) -> Result<f32> {
        self.check(row, col, slot)?;
        Ok(self.data[(row, col, slot)])
    }

    /// Set a single slot of a cell
    pub fn set(&mut self, row: usize, col: usize, slot: usize, value: f32) -> Result<()> {
        self.check(row, col, slot)?;
        self.data[(row, col, slot)] = value;
        Ok(())
    }

    /// Flag of a cell
    pub fn flag(&self, row: usize, col: usize) -> Result<f32> {
        self.get(row, col, FLAG_SLOT)
    }

    /// Weights of a cell, indexed 0..8 for directions 1..=8
    pub fn weights(&self, row: usize, col: usize) -> Result<ArrayView1<'_, f32>> {
        self.check(row, col, FLAG_SLOT)?;
        Ok(self.data.slice(s![row, col, 1..]))
    }

    /// Overwrite a cell's whole record
    pub fn put(&mut self, row: usize, col: usize, cell: CellFlow) -> Result<()> {
        self.check(row, col, FLAG_SLOT)?;
        let mut record = self.data.slice_mut(s![row, col, ..]);
        record.fill(0.0);
        match cell {
            CellFlow::NoData => record[FLAG_SLOT] = NO_DATA,
            CellFlow::NoFlow => record[FLAG_SLOT] = NO_FLOW,
            CellFlow::Flow(dir) => {
                record[FLAG_SLOT] = HAS_FLOW;
                record[dir.index()] = 1.0;
            }
        }
        Ok(())
    }

    /// Decode a cell's record.
    ///
    /// A `HAS_FLOW` cell is reported as flowing towards its heaviest
    /// weight (the first one on a tie).
    pub fn cell(&self, row: usize, col: usize) -> Result<CellFlow> {
        let flag = self.flag(row, col)?;
        if flag == NO_DATA {
            return Ok(CellFlow::NoData);
        }
        if flag != HAS_FLOW {
            return Ok(CellFlow::NoFlow);
        }

        let mut best: Option<(Direction, f32)> = None;
        for dir in Direction::ALL {
            let w = self.data[(row, col, dir.index())];
            if w > 0.0 && best.map_or(true, |(_, bw)| w > bw) {
                best = Some((dir, w));
            }
        }
        Ok(best.map_or(CellFlow::NoFlow, |(dir, _)| CellFlow::Flow(dir)))
    }

    /// Collapse into a direction code raster.
    ///
    /// 0 = no flow, 1..=8 = [`Direction`] code, 255 = no-data
    /// (also set as the raster's no-data value).
    pub fn to_direction_raster(&self) -> Raster<u8> {
        let codes = Array2::from_shape_fn(self.shape(), |(row, col)| {
            match self.cell(row, col) {
                Ok(CellFlow::Flow(dir)) => dir.code(),
                Ok(CellFlow::NoData) => u8::MAX,
                _ => 0,
            }
        });
        let mut raster = Raster::from_array(codes);
        raster.set_nodata(Some(u8::MAX));
        raster
    }

    fn check(&self, row: usize, col: usize, slot: usize) -> Result<()> {
        let (rows, cols) = self.shape();
        if row >= rows || col >= cols {
            return Err(Error::IndexOutOfBounds { row, col, rows, cols });
        }
        if slot >= SLOTS {
            return Err(Error::InvalidSlot { slot });
        }
        Ok(())
    }
}
