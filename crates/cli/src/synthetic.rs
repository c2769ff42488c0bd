//! Synthetic test terrain for the CLI

use clap::ValueEnum;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rhoflow_core::Raster;

/// Value written into no-data holes
pub const NODATA: f64 = -9999.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Surface {
    /// Bowl draining towards the grid center
    #[value(alias = "bowl")]
    Basin,
    /// Plane tilted east and south
    #[value(alias = "tilted")]
    Plane,
    /// Uniform white noise
    #[value(alias = "random")]
    Noise,
    /// Constant elevation
    Flat,
}

impl Surface {
    pub fn name(self) -> &'static str {
        match self {
            Surface::Basin => "basin",
            Surface::Plane => "plane",
            Surface::Noise => "noise",
            Surface::Flat => "flat",
        }
    }
}

/// Build a `rows x cols` DEM, punching no-data holes into `nodata_fraction` of the cells
pub fn synthetic_dem(
    surface: Surface,
    rows: usize,
    cols: usize,
    nodata_fraction: f64,
    seed: u64,
) -> Raster<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut dem = Raster::new(rows, cols);
    let center_row = rows as f64 / 2.0;
    let center_col = cols as f64 / 2.0;

    for row in 0..rows {
        for col in 0..cols {
            let z = match surface {
                Surface::Basin => {
                    let dx = col as f64 - center_col;
                    let dy = row as f64 - center_row;
                    // Small deterministic ripple keeps the bowl free of flats
                    (dx * dx + dy * dy).sqrt() + ((row * 7 + col * 13) % 17) as f64 * 0.01
                }
                Surface::Plane => 10.0 * (rows + cols) as f64 - 2.0 * col as f64 - row as f64,
                Surface::Noise => rng.gen_range(0.0..100.0),
                Surface::Flat => 100.0,
            };
            let z = if nodata_fraction > 0.0 && rng.gen_bool(nodata_fraction) {
                NODATA
            } else {
                z
            };
            dem.data_mut()[(row, col)] = z;
        }
    }

    if nodata_fraction > 0.0 {
        dem.set_nodata(Some(NODATA));
    }
    dem
}
