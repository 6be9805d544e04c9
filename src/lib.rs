//! Inspection and visualization utilities for [image] and [imageproc] pipelines.
//!
//! The crate extracts and measures contours from binary masks, stacks grids of
//! differently typed images into one preview, and renders quick summaries such as
//! colormaps, histograms and intensity statistics.
//!
//! ```
//! use image::{GrayImage, Luma};
//! use image_inspect_utils::{Raster, StackOptions, contours::ContourList, stack};
//!
//! let mut mask = GrayImage::new(20, 20);
//! for y in 5..15 {
//!     for x in 5..15 {
//!         mask.put_pixel(x, y, Luma([255]));
//!     }
//! }
//! let contours = ContourList::extract(&mask).unwrap();
//! assert_eq!(contours.len(), 1);
//!
//! let row = [Raster::from(mask.clone()), Raster::from(mask)];
//! let preview = stack(&row, &StackOptions::default()).unwrap();
//! assert_eq!(preview.dimensions(), (40, 20));
//! ```

pub mod canvas;
pub mod colors;
pub mod contours;
pub mod error;
pub mod moments;
pub mod raster;
pub mod stack;
pub mod stats;
pub mod transforms;

pub use contours::{Contour, ContourList, DrawStyle, Measure, extract};
pub use error::{Error, Result};
pub use raster::{ChannelMode, Raster, SampleType};
pub use stack::{Grid, StackOptions, stack};
