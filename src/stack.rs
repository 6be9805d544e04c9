//! Composes a grid of rasters into one canvas.

use log::{debug, trace};

use crate::{
    canvas::{Padding, concat_horizontal, concat_vertical, pad},
    error::{Error, Result},
    raster::{ChannelMode, Raster, RasterPixel, SampleType, pixel_from_components},
};
use image::{Luma, Rgb};
use imageproc::definitions::Image;

/// The input of [`stack`]: a single row of rasters, or explicit rows.
///
/// Rows may contain different numbers of rasters of different sizes.
#[derive(Debug, Clone, Copy)]
pub enum Grid<'a> {
    Row(&'a [Raster]),
    Rows(&'a [Vec<Raster>]),
}

impl<'a> Grid<'a> {
    /// The rows of the grid, rejecting an empty grid or an empty row.
    pub fn rows(&self) -> Result<Vec<&'a [Raster]>> {
        let rows: Vec<&'a [Raster]> = match *self {
            Grid::Row(row) => vec![row],
            Grid::Rows(rows) => rows.iter().map(Vec::as_slice).collect(),
        };
        if rows.is_empty() {
            return Err(Error::EmptyGrid);
        }
        if let Some(index) = rows.iter().position(|row| row.is_empty()) {
            return Err(match *self {
                Grid::Row(_) => Error::EmptyGrid,
                Grid::Rows(_) => Error::EmptyRow(index),
            });
        }
        Ok(rows)
    }
}

impl<'a> From<&'a [Raster]> for Grid<'a> {
    fn from(row: &'a [Raster]) -> Self {
        Grid::Row(row)
    }
}

impl<'a> From<&'a Vec<Raster>> for Grid<'a> {
    fn from(row: &'a Vec<Raster>) -> Self {
        Grid::Row(row)
    }
}

impl<'a, const N: usize> From<&'a [Raster; N]> for Grid<'a> {
    fn from(row: &'a [Raster; N]) -> Self {
        Grid::Row(row)
    }
}

impl<'a> From<&'a [Vec<Raster>]> for Grid<'a> {
    fn from(rows: &'a [Vec<Raster>]) -> Self {
        Grid::Rows(rows)
    }
}

impl<'a> From<&'a Vec<Vec<Raster>>> for Grid<'a> {
    fn from(rows: &'a Vec<Vec<Raster>>) -> Self {
        Grid::Rows(rows)
    }
}

impl<'a, const N: usize> From<&'a [Vec<Raster>; N]> for Grid<'a> {
    fn from(rows: &'a [Vec<Raster>; N]) -> Self {
        Grid::Rows(rows)
    }
}

/// Options for [`stack`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackOptions {
    /// Margin around every cell, so neighbouring cells are `2 * padding` apart.
    pub padding: u32,
    /// Fill value for margins and gaps, in the output sample type's own units
    /// (e.g. white is `255.0` for `u8` and `1.0` for `f32`).
    pub background: f64,
    /// Output sample type; the common type of all inputs when `None`.
    pub sample_type: Option<SampleType>,
    /// Single-channel output; only if every input is gray when `None`.
    pub gray: Option<bool>,
}

impl Default for StackOptions {
    fn default() -> Self {
        Self {
            padding: 0,
            background: 0.0,
            sample_type: None,
            gray: None,
        }
    }
}

/// Stacks the rasters of `grid` into a single raster.
///
/// # Arguments
///
/// * `grid` - A single row of rasters or a list of rows. Rows may differ in length,
///   and cells may differ in size, sample type and channel mode.
/// * `options` - Padding, background and the output layout.
///
/// # Returns
///
/// A raster in the common sample type and channel mode. Every cell is padded by
/// `options.padding` on all sides and aligned to the top-left of its slot. Rows
/// are as tall as their tallest cell; the canvas is as wide as the widest row.
///
/// # Errors
///
/// * [`Error::EmptyGrid`] / [`Error::EmptyRow`] if there is nothing to stack.
/// * [`Error::InvalidColor`] if `options.background` is not representable in the
///   output sample type.
pub fn stack<'a, G: Into<Grid<'a>>>(grid: G, options: &StackOptions) -> Result<Raster> {
    let rows = grid.into().rows()?;
    let cells = || rows.iter().flat_map(|row| row.iter());

    let sample_type = options
        .sample_type
        .or_else(|| SampleType::common(cells().map(Raster::sample_type)))
        .unwrap_or(SampleType::U8);
    let gray = options
        .gray
        .unwrap_or_else(|| cells().all(Raster::is_gray));
    let mode = if gray {
        ChannelMode::Gray
    } else {
        ChannelMode::Color
    };
    debug!(
        "stacking {} rows, {} images as {sample_type:?}/{mode:?}",
        rows.len(),
        cells().count()
    );

    match (sample_type, mode) {
        (SampleType::U8, ChannelMode::Gray) => stack_as::<Luma<u8>>(&rows, options),
        (SampleType::U16, ChannelMode::Gray) => stack_as::<Luma<u16>>(&rows, options),
        (SampleType::F32, ChannelMode::Gray) => stack_as::<Luma<f32>>(&rows, options),
        (SampleType::U8, ChannelMode::Color) => stack_as::<Rgb<u8>>(&rows, options),
        (SampleType::U16, ChannelMode::Color) => stack_as::<Rgb<u16>>(&rows, options),
        (SampleType::F32, ChannelMode::Color) => stack_as::<Rgb<f32>>(&rows, options),
    }
}

fn stack_as<P: RasterPixel>(rows: &[&[Raster]], options: &StackOptions) -> Result<Raster> {
    let components = vec![options.background; P::CHANNEL_COUNT as usize];
    let fill: P = pixel_from_components(&components)?;

    let mut row_images = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let cells = row
            .iter()
            .map(|raster| {
                raster
                    .convert(P::SAMPLE_TYPE, P::CHANNEL_MODE)
                    .into_buffer::<P>()
            })
            .collect::<Result<Vec<Image<P>>>>()?;

        let row_height = cells.iter().map(|cell| cell.height()).max().unwrap_or(0);
        let padded: Vec<Image<P>> = cells
            .iter()
            .map(|cell| {
                let padding = Padding {
                    bottom: options.padding + (row_height - cell.height()),
                    ..Padding::uniform(options.padding)
                };
                pad(cell, padding, fill)
            })
            .collect();

        let row_image = concat_horizontal(&padded, fill);
        trace!("row {index}: {}x{}", row_image.width(), row_image.height());
        row_images.push(row_image);
    }

    Ok(P::wrap(concat_vertical(&row_images, fill)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Gray16Image;
    use image::{GrayImage, RgbImage};

    fn gray(width: u32, height: u32, value: u8) -> Raster {
        Raster::Gray8(GrayImage::from_pixel(width, height, Luma([value])))
    }

    #[test]
    fn test_stack_rows_dimensions() {
        // Literal heights 2 and 4, widths 3 and 5.
        let rows = vec![vec![gray(3, 2, 1)], vec![gray(5, 4, 2)]];
        let options = StackOptions {
            padding: 1,
            ..StackOptions::default()
        };
        let stacked = stack(&rows, &options).unwrap();
        assert_eq!(stacked.height(), (2 + 1 + 1) + (4 + 1 + 1));
        assert_eq!(stacked.width(), 5 + 1 + 1);
        assert_eq!(stacked.sample_type(), SampleType::U8);
        assert!(stacked.is_gray());
    }

    #[test]
    fn test_stack_flat_row_layout() {
        let row = [gray(2, 1, 10), gray(1, 2, 20)];
        let options = StackOptions {
            background: 99.0,
            ..StackOptions::default()
        };
        let stacked = stack(&row, &options)
            .unwrap()
            .into_buffer::<Luma<u8>>()
            .unwrap();
        assert_eq!(stacked.dimensions(), (3, 2));
        assert_eq!(
            stacked.into_raw(),
            vec![
                10, 10, 20, //
                99, 99, 20,
            ]
        );
    }

    #[test]
    fn test_stack_padding_layout() {
        let row = vec![gray(1, 1, 5), gray(1, 1, 6)];
        let options = StackOptions {
            padding: 1,
            ..StackOptions::default()
        };
        let stacked = stack(&row, &options)
            .unwrap()
            .into_buffer::<Luma<u8>>()
            .unwrap();
        assert_eq!(stacked.dimensions(), (6, 3));
        assert_eq!(
            stacked.into_raw(),
            vec![
                0, 0, 0, 0, 0, 0, //
                0, 5, 0, 0, 6, 0, //
                0, 0, 0, 0, 0, 0,
            ]
        );
    }

    #[test]
    fn test_stack_ragged_rows() {
        let rows = vec![
            vec![gray(2, 2, 1), gray(2, 2, 1), gray(2, 2, 1)],
            vec![gray(1, 3, 2)],
        ];
        let stacked = stack(&rows, &StackOptions::default()).unwrap();
        assert_eq!(stacked.dimensions(), (6, 5));

        let image = stacked.into_buffer::<Luma<u8>>().unwrap();
        assert_eq!(image.get_pixel(0, 2)[0], 2);
        assert_eq!(image.get_pixel(1, 2)[0], 0);
        assert_eq!(image.get_pixel(5, 4)[0], 0);
    }

    #[test]
    fn test_common_sample_type_widens() {
        let narrow = GrayImage::from_raw(2, 1, vec![1, 255]).unwrap();
        let wide = Gray16Image::from_pixel(1, 1, Luma([1000]));
        let row = vec![Raster::Gray8(narrow.clone()), Raster::Gray16(wide)];

        let stacked = stack(&row, &StackOptions::default()).unwrap();
        assert_eq!(stacked.sample_type(), SampleType::U16);
        let widened = stacked.into_buffer::<Luma<u16>>().unwrap();
        assert_eq!(widened.get_pixel(0, 0)[0], 257);
        assert_eq!(widened.get_pixel(1, 0)[0], 65535);
        assert_eq!(widened.get_pixel(2, 0)[0], 1000);

        // Narrowing the widened cell back reproduces the input exactly.
        let cell = Raster::Gray16(image::imageops::crop_imm(&widened, 0, 0, 2, 1).to_image());
        assert_eq!(cell.convert(SampleType::U8, ChannelMode::Gray), Raster::Gray8(narrow));
    }

    #[test]
    fn test_stack_with_itself_is_lossless() {
        let original = GrayImage::from_raw(2, 2, vec![0, 64, 128, 255]).unwrap();
        let row = vec![Raster::Gray8(original.clone()), Raster::Gray8(original.clone())];
        let stacked = stack(&row, &StackOptions::default())
            .unwrap()
            .into_buffer::<Luma<u8>>()
            .unwrap();
        let left = image::imageops::crop_imm(&stacked, 0, 0, 2, 2).to_image();
        let right = image::imageops::crop_imm(&stacked, 2, 0, 2, 2).to_image();
        assert_eq!(left, original);
        assert_eq!(right, original);
    }

    #[test]
    fn test_color_mode_resolution() {
        let color = Raster::Rgb8(RgbImage::from_pixel(1, 1, Rgb([10, 20, 30])));
        let row = vec![gray(1, 1, 7), color];

        let stacked = stack(&row, &StackOptions::default()).unwrap();
        assert_eq!(stacked.channel_mode(), ChannelMode::Color);
        assert_eq!(stacked.samples(), vec![7.0, 7.0, 7.0, 10.0, 20.0, 30.0]);

        let forced = StackOptions {
            gray: Some(true),
            sample_type: Some(SampleType::F32),
            ..StackOptions::default()
        };
        let stacked = stack(&row, &forced).unwrap();
        assert_eq!(stacked.channel_mode(), ChannelMode::Gray);
        assert_eq!(stacked.sample_type(), SampleType::F32);
    }

    #[test]
    fn test_malformed_grids() {
        let no_rows: Vec<Vec<Raster>> = vec![];
        assert_eq!(
            stack(&no_rows, &StackOptions::default()).unwrap_err(),
            Error::EmptyGrid
        );

        let no_images: Vec<Raster> = vec![];
        assert_eq!(
            stack(&no_images, &StackOptions::default()).unwrap_err(),
            Error::EmptyGrid
        );

        let empty_row = vec![vec![gray(1, 1, 0)], vec![]];
        assert_eq!(
            stack(&empty_row, &StackOptions::default()).unwrap_err(),
            Error::EmptyRow(1)
        );
    }

    #[test]
    fn test_unrepresentable_background() {
        let options = StackOptions {
            background: 300.0,
            ..StackOptions::default()
        };
        assert_eq!(
            stack(&[gray(1, 1, 0)], &options).unwrap_err(),
            Error::InvalidColor(300.0)
        );
    }
}
