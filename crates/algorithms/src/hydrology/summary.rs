//! Direction histograms for routed grids

use rhoflow_core::flow::{CellFlow, Direction, FlowProps};
use serde::{Deserialize, Serialize};

/// Cell counts of a flow-direction grid
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlowSummary {
    pub rows: usize,
    pub cols: usize,
    /// Cells draining into a neighbor
    pub has_flow: usize,
    /// Edge, pit and flat cells
    pub no_flow: usize,
    /// Cells whose own elevation is no-data
    pub nodata: usize,
    /// Flowing cells per direction, index 0 = direction 1 (W) ... 7 = direction 8 (SW)
    pub directions: [usize; 8],
}

impl FlowSummary {
    /// Number of cells flowing towards `dir`
    pub fn count(&self, dir: Direction) -> usize {
        self.directions[dir.index() - 1]
    }

    /// Share of flowing cells that drain diagonally
    pub fn diagonal_fraction(&self) -> f64 {
        if self.has_flow == 0 {
            return 0.0;
        }
        let diagonal: usize = Direction::ALL
            .iter()
            .filter(|d| d.is_diagonal())
            .map(|&d| self.count(d))
            .sum();
        diagonal as f64 / self.has_flow as f64
    }
}

/// Count flag values and winning directions over the whole grid
pub fn flow_summary(props: &FlowProps) -> FlowSummary {
    let (rows, cols) = props.shape();
    let mut summary = FlowSummary {
        rows,
        cols,
        ..FlowSummary::default()
    };

    for row in 0..rows {
        for col in 0..cols {
            match props.cell(row, col) {
                Ok(CellFlow::Flow(dir)) => {
                    summary.has_flow += 1;
                    summary.directions[dir.index() - 1] += 1;
                }
                Ok(CellFlow::NoData) => summary.nodata += 1,
                _ => summary.no_flow += 1,
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let mut props = FlowProps::new(4, 4);
        props.put(1, 1, CellFlow::Flow(Direction::EAST)).unwrap();
        props.put(1, 2, CellFlow::Flow(Direction::SOUTHEAST)).unwrap();
        props.put(2, 2, CellFlow::Flow(Direction::EAST)).unwrap();
        props.put(2, 1, CellFlow::NoData).unwrap();

        let summary = flow_summary(&props);
        assert_eq!(summary.has_flow, 3);
        assert_eq!(summary.nodata, 1);
        assert_eq!(summary.no_flow, 12);
        assert_eq!(summary.count(Direction::EAST), 2);
        assert_eq!(summary.count(Direction::SOUTHEAST), 1);
        assert!((summary.diagonal_fraction() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_grid() {
        let summary = flow_summary(&FlowProps::new(0, 0));
        assert_eq!(summary, FlowSummary::default());
        assert_eq!(summary.diagonal_fraction(), 0.0);
    }
}
