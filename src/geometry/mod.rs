pub mod coord;

pub use coord::{dist_squared, Coord};
