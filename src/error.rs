//! Crate-wide error type.
//!
//! Built with `error_chain!`, the same crate the teacher workspace already
//! depended on. One `ErrorKind` variant per error kind in the design doc;
//! `OUT_OF_MEMORY` has no variant here since it is an allocator abort, not a
//! `Result`, and `INVALID_COLOR` is handled inline by the color space
//! module rather than surfaced as an error.

error_chain::error_chain! {
    foreign_links {
        Io(std::io::Error);
        Png(png::EncodingError);
    }

    errors {
        /// A command-line option failed validation (INVALID_OPTION).
        InvalidOption(msg: String) {
            description("invalid option")
            display("invalid option: {}", msg)
        }
        /// The color source was asked for a bit depth outside [2, 24].
        InvalidBitDepth(bits: u32) {
            description("invalid bit depth")
            display("bit depth must be between 2 and 24, got {}", bits)
        }
        /// `nearest` was called on a forest with no live points
        /// (EMPTY_FOREST). Always indicates a driver bug.
        EmptyForest {
            description("nearest-neighbor query against an empty k-d forest")
            display("nearest-neighbor query against an empty k-d forest")
        }
    }
}
