//! Validated, library-facing configuration. The CLI crate is responsible
//! for turning `structopt` arguments into one of these; nothing in here
//! knows about argv or exit codes.

use crate::error::Result;

/// How the color source enumerates and orders the target color set (§4.A).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderMode {
    Sequential,
    Morton,
    Hilbert,
    HueSort,
    Random,
}

/// Which pixels count as part of the open frontier, and what coordinate
/// they carry in the k-d forest (§4.D).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Min,
    Mean,
}

/// The 3-D space a 24-bit color is projected into before nearest-neighbor
/// comparisons (§4.B).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Rgb,
    Lab,
    Luv,
}

/// What to do with intermediate frames when `animate` is set.
#[derive(Debug, Clone)]
pub enum OutputMode {
    /// Encode a single PNG at this path.
    Single(std::path::PathBuf),
    /// Encode one frame every `W` placements into this directory, plus 120
    /// trailing copies of the final frame.
    Animate(std::path::PathBuf),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bit_depth: u32,
    pub order: OrderMode,
    pub selection: Selection,
    pub color_space: ColorSpace,
    pub output: OutputMode,
    pub seed: u32,
}

impl Config {
    /// Validates `bit_depth` against §4.A's range and returns a `Config`
    /// ready for `crate::run::generate`. Everything else is a plain enum
    /// the CLI has already mapped from a `possible_values` set, so there is
    /// nothing left to validate there.
    pub fn new(
        bit_depth: u32,
        order: OrderMode,
        selection: Selection,
        color_space: ColorSpace,
        output: OutputMode,
        seed: u32,
    ) -> Result<Config> {
        if bit_depth < 2 || bit_depth > 24 {
            return Err(crate::error::ErrorKind::InvalidBitDepth(bit_depth).into());
        }
        Ok(Config {
            bit_depth,
            order,
            selection,
            color_space,
            output,
            seed,
        })
    }

    /// `W = 2^⌈B/2⌉`, computed as the integer division `(B+1)/2` so the
    /// product `W·H` always comes out to exactly `2^B`.
    pub fn width(&self) -> u32 {
        1 << ((self.bit_depth + 1) / 2)
    }

    /// `H = 2^floor(B/2)`.
    pub fn height(&self) -> u32 {
        1 << (self.bit_depth / 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_bit_depth() {
        assert!(Config::new(
            1,
            OrderMode::Sequential,
            Selection::Min,
            ColorSpace::Rgb,
            OutputMode::Single("x.png".into()),
            0
        )
        .is_err());
        assert!(Config::new(
            25,
            OrderMode::Sequential,
            Selection::Min,
            ColorSpace::Rgb,
            OutputMode::Single("x.png".into()),
            0
        )
        .is_err());
    }

    #[test]
    fn dims_match_spec_examples() {
        let c = Config::new(
            2,
            OrderMode::Sequential,
            Selection::Min,
            ColorSpace::Rgb,
            OutputMode::Single("x.png".into()),
            0,
        )
        .unwrap();
        assert_eq!((c.width(), c.height()), (2, 2));

        let c = Config::new(
            8,
            OrderMode::HueSort,
            Selection::Min,
            ColorSpace::Lab,
            OutputMode::Single("x.png".into()),
            0,
        )
        .unwrap();
        assert_eq!((c.width(), c.height()), (16, 16));

        let c = Config::new(
            24,
            OrderMode::HueSort,
            Selection::Min,
            ColorSpace::Lab,
            OutputMode::Single("x.png".into()),
            0,
        )
        .unwrap();
        assert_eq!((c.width(), c.height()), (4096, 4096));
    }
}
