//! Places the `2^B` colors of the 24-bit RGB cube onto a `W x H` pixel
//! grid so that spatially adjacent pixels hold perceptually similar
//! colors, using a dynamic k-d forest to track which already-placed
//! pixels are nearest, in color space, to whichever color comes next.

pub mod color;
pub mod config;
pub mod error;
pub mod forest;
pub mod frontier;
pub mod geometry;
pub mod grid;
pub mod pass;
pub mod png_writer;
pub mod rng;
pub mod run;

pub use config::{ColorSpace, Config, OrderMode, OutputMode, Selection};
pub use error::{Error, ErrorKind, Result};
pub use run::generate;
