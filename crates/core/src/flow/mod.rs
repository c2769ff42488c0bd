//! Flow-direction encoding shared by every routing algorithm
//!
//! - [`direction`]: the fixed 1..8 neighbor table and its scan order
//! - [`FlowProps`]: per-cell flag plus eight direction weights

pub mod direction;
mod props;

pub use direction::Direction;
pub use props::{CellFlow, FlowProps, FLAG_SLOT, HAS_FLOW, NO_DATA, NO_FLOW, SLOTS};
