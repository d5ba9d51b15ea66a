//! Color enumeration and color-space conversion (§4.A, §4.B).

pub mod source;
pub mod space;

pub use source::enumerate;
pub use space::{pack, to_coord, unpack, Color};
