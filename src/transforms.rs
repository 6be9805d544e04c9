use image::{GrayImage, Luma, Pixel, Primitive, Rgb, imageops, imageops::FilterType};
use imageproc::{
    contrast::{ThresholdType, otsu_level, threshold},
    definitions::Image,
};

use crate::{
    error::{Error, Result},
    raster::{Raster, map_buffer},
};

/// Target of [`resize`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resize {
    /// Scales both axes by the same factor; each side is at least one pixel.
    Scale(f64),
    Size { width: u32, height: u32 },
}

/// Resamples `raster` to a new size with `filter`.
///
/// # Errors
///
/// Returns [`Error::InvalidSize`] for a non-positive or non-finite scale factor
/// and for a zero target width or height.
pub fn resize(raster: &Raster, target: Resize, filter: FilterType) -> Result<Raster> {
    let (width, height) = match target {
        Resize::Scale(scale) => {
            if !(scale.is_finite() && scale > 0.0) {
                return Err(Error::InvalidSize);
            }
            let scaled = |side: u32| ((side as f64 * scale).round() as u32).max(1);
            (scaled(raster.width()), scaled(raster.height()))
        }
        Resize::Size { width, height } => (width, height),
    };
    if width == 0 || height == 0 {
        return Err(Error::InvalidSize);
    }

    Ok(map_buffer!(raster, image => imageops::resize(image, width, height, filter)))
}

/// Swaps the first and third channel (RGB <-> BGR). Gray rasters are returned unchanged.
pub fn flip_channels(raster: &Raster) -> Raster {
    match raster {
        Raster::Rgb8(image) => Raster::Rgb8(swap_red_blue(image)),
        Raster::Rgb16(image) => Raster::Rgb16(swap_red_blue(image)),
        Raster::Rgb32F(image) => Raster::Rgb32F(swap_red_blue(image)),
        gray => gray.clone(),
    }
}

fn swap_red_blue<S: Primitive>(image: &Image<Rgb<S>>) -> Image<Rgb<S>>
where
    Rgb<S>: Pixel<Subpixel = S>,
{
    let mut flipped = image.clone();
    for pixel in flipped.pixels_mut() {
        pixel.0.swap(0, 2);
    }
    flipped
}

/// Binarizes `image` at Otsu's level.
///
/// # Arguments
///
/// * `image` - The 8-bit gray image to binarize. It is not modified.
///
/// # Returns
///
/// The level found by [`otsu_level`] and the binary image, in which pixels brighter
/// than the level are 255 and all others 0.
pub fn otsu(image: &GrayImage) -> (u8, GrayImage) {
    let level = otsu_level(image);
    (level, threshold(image, level, ThresholdType::Binary))
}

/// Quarter turns for [`rotate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Clockwise90,
    CounterClockwise90,
    Half,
}

/// Rotates `raster` by a multiple of 90 degrees, keeping its layout.
///
/// Quarter turns swap width and height.
pub fn rotate(raster: &Raster, rotation: Rotation) -> Raster {
    match rotation {
        Rotation::Clockwise90 => map_buffer!(raster, image => imageops::rotate90(image)),
        Rotation::CounterClockwise90 => map_buffer!(raster, image => imageops::rotate270(image)),
        Rotation::Half => map_buffer!(raster, image => imageops::rotate180(image)),
    }
}

/// An image whose values rise from 0 to 255 along the x axis.
pub fn xslope(height: u32, width: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, _| Luma([ramp(x, width)]))
}

/// An image whose values rise from 0 to 255 along the y axis.
pub fn yslope(width: u32, height: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |_, y| Luma([ramp(y, height)]))
}

fn ramp(position: u32, length: u32) -> u8 {
    if length <= 1 {
        return 0;
    }
    (position as f64 * 255.0 / (length - 1) as f64) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    use crate::raster::{Gray32FImage, SampleType};

    #[test]
    fn test_resize_scale_and_size() {
        let raster = Raster::Gray8(GrayImage::from_pixel(10, 4, Luma([7])));

        let half = resize(&raster, Resize::Scale(0.5), FilterType::CatmullRom).unwrap();
        assert_eq!(half.dimensions(), (5, 2));
        assert!(half.samples().iter().all(|&s| s == 7.0));

        let tiny = resize(&raster, Resize::Scale(0.01), FilterType::Nearest).unwrap();
        assert_eq!(tiny.dimensions(), (1, 1));

        let float = Raster::Gray32F(Gray32FImage::from_pixel(3, 3, Luma([0.25])));
        let sized = resize(
            &float,
            Resize::Size {
                width: 6,
                height: 2,
            },
            FilterType::Triangle,
        )
        .unwrap();
        assert_eq!(sized.dimensions(), (6, 2));
        assert_eq!(sized.sample_type(), SampleType::F32);
    }

    #[test]
    fn test_resize_rejects_invalid_targets() {
        let raster = Raster::Gray8(GrayImage::new(4, 4));
        for target in [
            Resize::Scale(0.0),
            Resize::Scale(-1.0),
            Resize::Scale(f64::NAN),
            Resize::Size {
                width: 0,
                height: 3,
            },
        ] {
            assert_eq!(
                resize(&raster, target, FilterType::Nearest).unwrap_err(),
                Error::InvalidSize
            );
        }
    }

    #[test]
    fn test_flip_channels() {
        let raster = Raster::Rgb8(RgbImage::from_pixel(1, 1, Rgb([1, 2, 3])));
        let flipped = flip_channels(&raster);
        assert_eq!(flipped.samples(), vec![3.0, 2.0, 1.0]);
        assert_ne!(flipped, raster);
        assert_eq!(flip_channels(&flipped), raster);

        let gray = Raster::Gray8(GrayImage::new(2, 2));
        assert_eq!(flip_channels(&gray), gray);
    }

    #[test]
    fn test_otsu() {
        let image = GrayImage::from_fn(10, 2, |x, _| Luma([if x < 5 { 50 } else { 200 }]));
        let (level, binary) = otsu(&image);
        assert!((50..200).contains(&level), "level {level}");
        assert_eq!(binary.get_pixel(0, 0)[0], 0);
        assert_eq!(binary.get_pixel(9, 1)[0], 255);
    }

    #[test]
    fn test_otsu_uniform_image() {
        let image = GrayImage::from_pixel(4, 4, Luma([90]));
        let (level, binary) = otsu(&image);
        assert!(binary.pixels().all(|p| p[0] == if 90 > level { 255 } else { 0 }));
    }

    #[test]
    fn test_rotate() {
        // 1 2 3
        // 4 5 6
        let image = GrayImage::from_raw(3, 2, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let raster = Raster::Gray8(image);

        let clockwise = rotate(&raster, Rotation::Clockwise90);
        assert_eq!(clockwise.dimensions(), (2, 3));
        assert_eq!(clockwise.samples(), vec![4.0, 1.0, 5.0, 2.0, 6.0, 3.0]);

        let counter = rotate(&raster, Rotation::CounterClockwise90);
        assert_eq!(counter.samples(), vec![3.0, 6.0, 2.0, 5.0, 1.0, 4.0]);

        let half = rotate(&raster, Rotation::Half);
        assert_eq!(half.dimensions(), (3, 2));
        assert_eq!(half.samples(), vec![6.0, 5.0, 4.0, 3.0, 2.0, 1.0]);

        assert_eq!(rotate(&counter, Rotation::Clockwise90), raster);
        assert_eq!(rotate(&half, Rotation::Half), raster);

        let color = Raster::Rgb16(crate::raster::Rgb16Image::new(5, 1));
        let turned = rotate(&color, Rotation::Clockwise90);
        assert_eq!(turned.dimensions(), (1, 5));
        assert_eq!(turned.sample_type(), SampleType::U16);
    }

    #[test]
    fn test_slopes() {
        let x = xslope(32, 256);
        assert_eq!(x.dimensions(), (256, 32));
        assert!(x.enumerate_pixels().all(|(px, _, p)| p[0] as u32 == px));

        let y = yslope(1, 256);
        assert_eq!(y.dimensions(), (1, 256));
        assert_eq!(y.get_pixel(0, 0)[0], 0);
        assert_eq!(y.get_pixel(0, 255)[0], 255);

        let short = xslope(1, 10);
        assert_eq!(short.get_pixel(0, 0)[0], 0);
        assert_eq!(short.get_pixel(9, 0)[0], 255);
        assert_eq!(xslope(1, 1).get_pixel(0, 0)[0], 0);
    }
}
