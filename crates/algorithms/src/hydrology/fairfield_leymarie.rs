//! Stochastic Rho4 / Rho8 flow directions
//!
//! Single flow direction routing where the steepest downslope neighbor
//! wins, after a random correction of part of the slopes. The correction
//! breaks the parallel, grid-aligned drainage lines that plain D4/D8
//! routing produces on planar or symmetric terrain.
//!
//! - **Rho4** looks at the 4 orthogonal neighbors and multiplies north and
//!   south slopes by `1 / (1/U - 1)`.
//! - **Rho8** looks at all 8 neighbors and multiplies diagonal slopes by
//!   `1 / (2 - U)`.
//!
//! `U` is a fresh uniform (0, 1) sample for each corrected slope.
//!
//! The outer ring of the grid is never routed. Neighbors that are no-data
//! are skipped rather than treated as outlets.
//!
//! Reference:
//! Fairfield, J., Leymarie, P. (1991). Drainage networks from grid digital
//! elevation models. *Water Resources Research*, 27(5), 709–717.

use rhoflow_core::flow::{CellFlow, Direction, FlowProps};
use rhoflow_core::progress::{NoProgress, Progress};
use rhoflow_core::raster::{Raster, RasterElement};
use rhoflow_core::{Algorithm, Error, Result};
use rhoflow_parallel::{ParallelStrategy, ProcessingMode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::uniform::{SeededSource, Uniform01, UniformSource};

const CITATION: &str = "Fairfield, J., Leymarie, P., 1991. Drainage networks from grid digital \
                        elevation models. Water resources research 27, 709–717.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variant {
    D4,
    D8,
}

impl Variant {
    fn banner(self) -> &'static str {
        match self {
            Variant::D4 => "Fairfield (1991) \"Rho4\" Flow Directions",
            Variant::D8 => "Fairfield (1991) \"Rho8\" Flow Directions",
        }
    }

    fn candidates(self) -> &'static [Direction] {
        match self {
            Variant::D4 => &Direction::ORTHOGONAL,
            Variant::D8 => &Direction::ALL,
        }
    }

    /// Apply the stochastic correction; draws only when `dir` needs one
    #[inline]
    fn correct<U: Uniform01>(self, dir: Direction, slope: f64, rng: &mut U) -> f64 {
        match self {
            Variant::D4 if dir == Direction::NORTH || dir == Direction::SOUTH => {
                slope * (1.0 / (1.0 / rng.next_open01() - 1.0))
            }
            Variant::D8 if dir.is_diagonal() => slope * (1.0 / (2.0 - rng.next_open01())),
            _ => slope,
        }
    }
}

/// Parameters for the Rho4 / Rho8 algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RhoParams {
    /// Root seed for the per-row random streams.
    /// `None` draws a fresh seed, see [`RhoParams::resolved`].
    pub seed: Option<u64>,
    /// Where the row scan runs
    pub mode: ProcessingMode,
}

impl RhoParams {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Copy of these parameters with the seed fixed.
    ///
    /// A missing seed is drawn at random and logged at info level, so any
    /// run can be repeated with `RhoParams::seeded`.
    pub fn resolved(&self) -> Self {
        Self {
            seed: Some(self.seed_or_draw()),
            ..*self
        }
    }

    fn seed_or_draw(&self) -> u64 {
        match self.seed {
            Some(seed) => seed,
            None => {
                let seed = rand::random();
                info!(seed, "no seed given, drew a fresh one");
                seed
            }
        }
    }

    fn source(&self) -> SeededSource {
        let seed = self.seed_or_draw();
        debug!(seed, "random streams seeded");
        SeededSource::new(seed)
    }
}

/// Rho4 flow direction algorithm
#[derive(Debug, Clone, Default)]
pub struct Rho4;

impl Algorithm for Rho4 {
    type Input = Raster<f64>;
    type Output = FlowProps;
    type Params = RhoParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Rho4"
    }

    fn description(&self) -> &'static str {
        "Stochastic 4-neighbor single flow direction (Fairfield & Leymarie 1991)"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        compute_rho4(&input, &params)
    }
}

/// Rho8 flow direction algorithm
#[derive(Debug, Clone, Default)]
pub struct Rho8;

impl Algorithm for Rho8 {
    type Input = Raster<f64>;
    type Output = FlowProps;
    type Params = RhoParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Rho8"
    }

    fn description(&self) -> &'static str {
        "Stochastic 8-neighbor single flow direction (Fairfield & Leymarie 1991)"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        compute_rho8(&input, &params)
    }
}

/// Rho4 flow directions into a freshly allocated grid
pub fn compute_rho4<T: RasterElement>(dem: &Raster<T>, params: &RhoParams) -> Result<FlowProps> {
    let mut props = FlowProps::like(dem);
    fairfield_leymarie_d4(dem, &mut props, &params.source(), &NoProgress, params.mode)?;
    Ok(props)
}

/// Rho8 flow directions into a freshly allocated grid
pub fn compute_rho8<T: RasterElement>(dem: &Raster<T>, params: &RhoParams) -> Result<FlowProps> {
    let mut props = FlowProps::like(dem);
    fairfield_leymarie_d8(dem, &mut props, &params.source(), &NoProgress, params.mode)?;
    Ok(props)
}

/// Rho4 flow directions: 4 orthogonal neighbors, stochastic north/south slopes.
///
/// `props` must have the same shape as `dem`. It is reset to `NO_FLOW`
/// first; every interior cell with a strictly lower, valid neighbor is
/// then marked `HAS_FLOW` with a weight of 1 towards the neighbor with
/// the greatest corrected slope. Interior cells that are themselves
/// no-data are flagged `NO_DATA`.
///
/// # Errors
/// [`Error::SizeMismatch`] if the shapes differ,
/// [`Error::Algorithm`] if a dedicated thread pool cannot be built.
pub fn fairfield_leymarie_d4<T, S, P>(
    dem: &Raster<T>,
    props: &mut FlowProps,
    source: &S,
    progress: &P,
    mode: ProcessingMode,
) -> Result<()>
where
    T: RasterElement,
    S: UniformSource,
    P: Progress + ?Sized,
{
    route(Variant::D4, dem, props, source, progress, mode)
}

/// Rho8 flow directions: all 8 neighbors, stochastic diagonal slopes.
///
/// Same contract as [`fairfield_leymarie_d4`].
pub fn fairfield_leymarie_d8<T, S, P>(
    dem: &Raster<T>,
    props: &mut FlowProps,
    source: &S,
    progress: &P,
    mode: ProcessingMode,
) -> Result<()>
where
    T: RasterElement,
    S: UniformSource,
    P: Progress + ?Sized,
{
    route(Variant::D8, dem, props, source, progress, mode)
}

/// Alias of [`fairfield_leymarie_d4`]
pub fn rho4<T, S, P>(
    dem: &Raster<T>,
    props: &mut FlowProps,
    source: &S,
    progress: &P,
    mode: ProcessingMode,
) -> Result<()>
where
    T: RasterElement,
    S: UniformSource,
    P: Progress + ?Sized,
{
    fairfield_leymarie_d4(dem, props, source, progress, mode)
}

/// Alias of [`fairfield_leymarie_d8`]
pub fn rho8<T, S, P>(
    dem: &Raster<T>,
    props: &mut FlowProps,
    source: &S,
    progress: &P,
    mode: ProcessingMode,
) -> Result<()>
where
    T: RasterElement,
    S: UniformSource,
    P: Progress + ?Sized,
{
    fairfield_leymarie_d8(dem, props, source, progress, mode)
}

fn route<T, S, P>(
    variant: Variant,
    dem: &Raster<T>,
    props: &mut FlowProps,
    source: &S,
    progress: &P,
    mode: ProcessingMode,
) -> Result<()>
where
    T: RasterElement,
    S: UniformSource,
    P: Progress + ?Sized,
{
    let (rows, cols) = dem.shape();
    let (prows, pcols) = props.shape();
    if (rows, cols) != (prows, pcols) {
        return Err(Error::SizeMismatch {
            er: rows,
            ec: cols,
            ar: prows,
            ac: pcols,
        });
    }

    info!("{}", variant.banner());
    info!("Citation: {}", CITATION);
    debug!(rows, cols, ?mode, "routing interior cells");

    props.reset();

    let interior = dem.interior_len();
    progress.start(interior as u64);
    if interior == 0 {
        progress.stop();
        return Ok(());
    }

    let inner_cols = (cols - 2) as u64;
    let routed = mode.par_map(1..rows - 1, |row| {
        let cells = route_row(variant, dem, row, source);
        progress.inc(inner_cols);
        cells
    });
    progress.stop();

    for (row, cells) in (1..).zip(routed?) {
        for (col, cell) in (1..).zip(cells) {
            if cell != CellFlow::NoFlow {
                props.put(row, col, cell)?;
            }
        }
    }

    Ok(())
}

/// Route the interior cells of one row, in column order, from the row's own stream
fn route_row<T, S>(variant: Variant, dem: &Raster<T>, row: usize, source: &S) -> Vec<CellFlow>
where
    T: RasterElement,
    S: UniformSource,
{
    let mut rng = source.stream(row as u64);
    (1..dem.cols() - 1)
        .map(|col| route_cell(variant, dem, row, col, &mut rng))
        .collect()
}

fn route_cell<T, U>(variant: Variant, dem: &Raster<T>, row: usize, col: usize, rng: &mut U) -> CellFlow
where
    T: RasterElement,
    U: Uniform01,
{
    let center = unsafe { dem.get_unchecked(row, col) };
    if dem.is_nodata(center) {
        return CellFlow::NoData;
    }

    let mut greatest: Option<Direction> = None;
    let mut greatest_slope = 0.0_f64;

    for &dir in variant.candidates() {
        let (dr, dc) = dir.offset();
        let nr = row as isize + dr;
        let nc = col as isize + dc;

        if !dem.in_grid(nr, nc) {
            continue;
        }

        let neighbor = unsafe { dem.get_unchecked(nr as usize, nc as usize) };

        // No-data never receives flow, even where it borders the dataset
        if dem.is_nodata(neighbor) {
            continue;
        }
        if neighbor >= center {
            continue;
        }

        // Widen first: the difference of two valid integers may not fit in `T`
        let (Some(from), Some(to)) =
            (RasterElement::to_f64(center), RasterElement::to_f64(neighbor))
        else {
            continue;
        };
        let slope = variant.correct(dir, from - to, rng);

        if slope > greatest_slope {
            greatest = Some(dir);
            greatest_slope = slope;
        }
    }

    match greatest {
        Some(dir) => {
            let (dr, dc) = dir.offset();
            let target_row = (row as isize + dr) as usize;
            let target_col = (col as isize + dc) as usize;
            debug_assert!(
                unsafe { dem.get_unchecked(target_row, target_col) } <= center,
                "flow goes uphill: ({}, {}) = {:?} -> {} ({}, {}) = {:?}",
                row,
                col,
                center,
                dir,
                target_row,
                target_col,
                unsafe { dem.get_unchecked(target_row, target_col) },
            );
            CellFlow::Flow(dir)
        }
        None => CellFlow::NoFlow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydrology::uniform::ConstantSource;
    use approx::assert_relative_eq;
    use rhoflow_core::flow::{HAS_FLOW, NO_DATA, NO_FLOW};
    use rhoflow_core::progress::ProgressCounter;

    fn grid(rows: &[[f64; 3]]) -> Raster<f64> {
        Raster::from_rows(rows).unwrap()
    }

    fn run_d4<S: UniformSource>(dem: &Raster<f64>, source: &S) -> FlowProps {
        let mut props = FlowProps::like(dem);
        fairfield_leymarie_d4(dem, &mut props, source, &NoProgress, ProcessingMode::Sequential).unwrap();
        props
    }

    fn run_d8<S: UniformSource>(dem: &Raster<f64>, source: &S) -> FlowProps {
        let mut props = FlowProps::like(dem);
        fairfield_leymarie_d8(dem, &mut props, source, &NoProgress, ProcessingMode::Sequential).unwrap();
        props
    }

    #[test]
    fn test_d8_correction_factor() {
        let mut u = ConstantSource::new(0.5).unwrap().stream(0);
        assert_relative_eq!(Variant::D8.correct(Direction::NORTHEAST, 3.0, &mut u), 2.0);
        assert_relative_eq!(Variant::D8.correct(Direction::EAST, 3.0, &mut u), 3.0);
    }

    #[test]
    fn test_d4_correction_factor() {
        let mut half = ConstantSource::new(0.5).unwrap().stream(0);
        assert_relative_eq!(Variant::D4.correct(Direction::NORTH, 3.0, &mut half), 3.0);

        let mut quarter = ConstantSource::new(0.25).unwrap().stream(0);
        assert_relative_eq!(Variant::D4.correct(Direction::SOUTH, 3.0, &mut quarter), 1.0);
        assert_relative_eq!(Variant::D4.correct(Direction::WEST, 3.0, &mut quarter), 3.0);
    }

    #[test]
    fn test_d8_steep_orthogonal_beats_corrected_diagonal() {
        // Diagonal drop 10 * 1/(2 - 0.5) = 6.67 still beats the orthogonal 6
        let dem = grid(&[[0.0, 5.0, 5.0], [5.0, 10.0, 4.0], [5.0, 5.0, 5.0]]);
        let half = ConstantSource::new(0.5).unwrap();
        assert_eq!(run_d8(&dem, &half).cell(1, 1).unwrap(), CellFlow::Flow(Direction::NORTHWEST));

        // Diagonal drop 8 * 2/3 = 5.33 loses to 6
        let dem = grid(&[[2.0, 5.0, 5.0], [5.0, 10.0, 4.0], [5.0, 5.0, 5.0]]);
        assert_eq!(run_d8(&dem, &half).cell(1, 1).unwrap(), CellFlow::Flow(Direction::EAST));
    }

    #[test]
    fn test_d4_ignores_diagonals() {
        let dem = grid(&[[0.0, 9.0, 9.0], [9.0, 9.0, 8.0], [9.0, 9.0, 9.0]]);
        let props = run_d4(&dem, &ConstantSource::new(0.5).unwrap());
        assert_eq!(props.cell(1, 1).unwrap(), CellFlow::Flow(Direction::EAST));
    }

    #[test]
    fn test_ties_go_to_first_direction_in_scan_order() {
        // W, N, E and S all drop by 2 and factor 1 leaves them equal
        let dem = grid(&[[9.0, 3.0, 9.0], [3.0, 5.0, 3.0], [9.0, 3.0, 9.0]]);
        let props = run_d4(&dem, &ConstantSource::new(0.5).unwrap());
        assert_eq!(props.cell(1, 1).unwrap(), CellFlow::Flow(Direction::WEST));

        // Under D8 the orthogonals are uncorrected, W still comes first
        let props = run_d8(&dem, &ConstantSource::new(0.5).unwrap());
        assert_eq!(props.cell(1, 1).unwrap(), CellFlow::Flow(Direction::WEST));

        let dem = grid(&[[9.0, 9.0, 9.0], [9.0, 5.0, 3.0], [9.0, 3.0, 9.0]]);
        let props = run_d4(&dem, &ConstantSource::new(0.5).unwrap());
        assert_eq!(props.cell(1, 1).unwrap(), CellFlow::Flow(Direction::EAST));
    }

    #[test]
    fn test_nodata_center_is_flagged() {
        let mut dem = grid(&[[5.0, 5.0, 5.0], [5.0, -9999.0, 5.0], [5.0, 5.0, 5.0]]);
        dem.set_nodata(Some(-9999.0));
        let props = run_d8(&dem, &SeededSource::new(1));
        assert_eq!(props.flag(1, 1).unwrap(), NO_DATA);
        assert_eq!(props.flag(0, 0).unwrap(), NO_FLOW);
    }

    #[test]
    fn test_nan_neighbor_is_skipped() {
        let dem = grid(&[[5.0, 5.0, 5.0], [5.0, 6.0, f64::NAN], [5.0, 5.0, 5.0]]);
        let props = run_d4(&dem, &ConstantSource::new(0.5).unwrap());
        assert_eq!(props.cell(1, 1).unwrap(), CellFlow::Flow(Direction::WEST));
    }

    #[test]
    fn test_integer_elevations() {
        let dem = Raster::from_rows(&[[5u16, 5, 5], [5, 9, 1], [5, 5, 5]]).unwrap();
        let props = compute_rho8(&dem, &RhoParams::seeded(3)).unwrap();
        assert_eq!(props.flag(1, 1).unwrap(), HAS_FLOW);
        assert_eq!(props.cell(1, 1).unwrap(), CellFlow::Flow(Direction::EAST));
    }

    #[test]
    fn test_wide_signed_drops_do_not_overflow() {
        // 100 - (-100) does not fit in an i8
        let dem = Raster::from_rows(&[[120i8, 120, 120], [120, 100, -100], [120, 120, 120]]).unwrap();
        for seed in 0..10 {
            let d4 = compute_rho4(&dem, &RhoParams::seeded(seed)).unwrap();
            let d8 = compute_rho8(&dem, &RhoParams::seeded(seed)).unwrap();
            assert_eq!(d4.cell(1, 1).unwrap(), CellFlow::Flow(Direction::EAST));
            assert_eq!(d8.cell(1, 1).unwrap(), CellFlow::Flow(Direction::EAST));
        }

        let dem = Raster::from_rows(&[
            [i32::MAX, i32::MAX, i32::MAX],
            [i32::MAX, 1, i32::MAX],
            [i32::MAX, i32::MIN, i32::MAX],
        ])
        .unwrap();
        let d4 = compute_rho4(&dem, &RhoParams::seeded(1)).unwrap();
        let d8 = compute_rho8(&dem, &RhoParams::seeded(1)).unwrap();
        assert_eq!(d4.cell(1, 1).unwrap(), CellFlow::Flow(Direction::SOUTH));
        assert_eq!(d8.cell(1, 1).unwrap(), CellFlow::Flow(Direction::SOUTH));
    }

    #[test]
    fn test_size_mismatch_is_rejected_before_writing() {
        let dem = grid(&[[5.0, 5.0, 5.0], [5.0, 9.0, 1.0], [5.0, 5.0, 5.0]]);
        let mut props = FlowProps::new(3, 4);
        props.put(0, 0, CellFlow::NoData).unwrap();

        let err = fairfield_leymarie_d8(
            &dem,
            &mut props,
            &SeededSource::new(0),
            &NoProgress,
            ProcessingMode::Sequential,
        )
        .unwrap_err();
        assert!(matches!(err, Error::SizeMismatch { er: 3, ec: 3, ar: 3, ac: 4 }));
        assert_eq!(props.flag(0, 0).unwrap(), NO_DATA);
    }

    #[test]
    fn test_output_is_fully_overwritten() {
        let dem = grid(&[[5.0, 5.0, 5.0], [5.0, 5.0, 5.0], [5.0, 5.0, 5.0]]);
        let mut props = FlowProps::like(&dem);
        props.put(1, 1, CellFlow::Flow(Direction::NORTH)).unwrap();
        props.put(0, 1, CellFlow::Flow(Direction::SOUTH)).unwrap();

        rho4(&dem, &mut props, &SeededSource::new(0), &NoProgress, ProcessingMode::Sequential).unwrap();
        assert_eq!(props, FlowProps::new(3, 3));
    }

    #[test]
    fn test_progress_counts_interior_cells() {
        let dem: Raster<f64> = Raster::new(6, 5);
        let mut props = FlowProps::like(&dem);
        let counter = ProgressCounter::new();

        rho8(&dem, &mut props, &SeededSource::new(0), &counter, ProcessingMode::Parallel).unwrap();
        assert_eq!(counter.total(), 12);
        assert_eq!(counter.done(), 12);
        assert!(counter.is_finished());
    }

    #[test]
    fn test_degenerate_shapes() {
        for (rows, cols) in [(0, 0), (1, 1), (2, 7), (7, 2)] {
            let dem: Raster<f64> = Raster::new(rows, cols);
            let props = compute_rho4(&dem, &RhoParams::seeded(0)).unwrap();
            assert_eq!(props, FlowProps::new(rows, cols));
        }
    }

    #[test]
    fn test_algorithm_trait() {
        let dem = grid(&[[5.0, 5.0, 5.0], [5.0, 9.0, 1.0], [5.0, 5.0, 5.0]]);
        assert_eq!(Rho8.name(), "Rho8");
        assert_eq!(Rho4.name(), "Rho4");

        let props = Rho8.execute(dem.clone(), RhoParams::seeded(11)).unwrap();
        assert_eq!(props.cell(1, 1).unwrap(), CellFlow::Flow(Direction::EAST));

        let props = Rho4.execute_default(dem).unwrap();
        assert_eq!(props.flag(1, 1).unwrap(), HAS_FLOW);
    }

    #[test]
    fn test_resolved_params_repeat_a_run() {
        assert_eq!(RhoParams::seeded(5).resolved(), RhoParams::seeded(5));

        let params = RhoParams {
            seed: None,
            mode: ProcessingMode::Sequential,
        }
        .resolved();
        assert!(params.seed.is_some());
        assert_eq!(params.mode, ProcessingMode::Sequential);

        let dem = Raster::from_rows(&[
            [9.0, 9.0, 9.0, 9.0, 9.0],
            [9.0, 5.0, 4.0, 3.0, 9.0],
            [9.0, 4.0, 4.0, 2.0, 9.0],
            [9.0, 3.0, 2.0, 1.0, 9.0],
            [9.0, 9.0, 9.0, 9.0, 9.0],
        ])
        .unwrap();
        assert_eq!(compute_rho8(&dem, &params).unwrap(), compute_rho8(&dem, &params).unwrap());
    }

    #[test]
    fn test_params_serde() {
        let params = RhoParams {
            seed: Some(7),
            mode: ProcessingMode::ParallelWith(2),
        };
        let json = serde_json::to_string(&params).unwrap();
        let back: RhoParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }
}
