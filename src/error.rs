use image::ColorType;

use crate::raster::{ChannelMode, SampleType};

/// Errors raised by the contour, stacking and inspection helpers.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A boolean mask whose rows do not all have the same length.
    #[error("Mask row {row} has {found} samples, expected {expected}")]
    RaggedMask {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Contour extraction was given a raster with more than one channel.
    #[error("Expected a single-channel raster, got {0} channels")]
    NotSingleChannel(usize),

    /// The stacking grid has no rows.
    #[error("Stack input must be a non-empty sequence of images or of rows of images")]
    EmptyGrid,

    /// A row of the stacking grid has no images.
    #[error("Row {0} of the stack input contains no images")]
    EmptyRow(usize),

    /// A `DynamicImage` layout that has no `Raster` counterpart (e.g. with alpha).
    #[error("Unsupported image layout {0:?}")]
    UnsupportedLayout(ColorType),

    /// A typed buffer was requested from a raster holding another layout.
    #[error("Raster holds {found:?}, expected {expected:?}")]
    LayoutMismatch {
        expected: (SampleType, ChannelMode),
        found: (SampleType, ChannelMode),
    },

    /// The number of color components does not match the raster.
    #[error("Color has {found} components but the raster has {expected} channels")]
    ChannelMismatch { expected: usize, found: usize },

    /// A color component that the target sample type cannot hold.
    #[error("Color component {0} is not representable in the target sample type")]
    InvalidColor(f64),

    /// No colormap with this name exists.
    #[error("Unknown colormap '{0}'")]
    UnknownColormap(String),

    /// A lookup table that does not have exactly 256 entries.
    #[error("A colormap needs exactly 256 entries, got {0}")]
    InvalidColormap(usize),

    /// Non-positive scale factor or zero target size.
    #[error("Invalid resize target")]
    InvalidSize,

    /// A histogram was requested with zero bins.
    #[error("A histogram needs at least one bin")]
    ZeroBins,
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
