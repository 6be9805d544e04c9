//! Padding and concatenation of image buffers.
//!
//! Every function allocates a new canvas filled with a background pixel and copies
//! its inputs onto it with [`image::imageops::replace`].

use image::{ImageBuffer, Pixel, imageops};
use imageproc::definitions::Image;

/// Margins, in pixels, added around an image by [`pad`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Padding {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl Padding {
    pub fn uniform(width: u32) -> Self {
        Self {
            top: width,
            bottom: width,
            left: width,
            right: width,
        }
    }
}

/// Returns a copy of `image` surrounded by `padding`, filled with `fill`.
pub fn pad<P: Pixel>(image: &Image<P>, padding: Padding, fill: P) -> Image<P> {
    let width = image.width() + padding.left + padding.right;
    let height = image.height() + padding.top + padding.bottom;
    let mut canvas = ImageBuffer::from_pixel(width, height, fill);
    imageops::replace(&mut canvas, image, padding.left.into(), padding.top.into());
    canvas
}

/// Places `images` side by side, top-aligned.
///
/// # Arguments
///
/// * `images` - The images in left-to-right order.
/// * `fill` - The pixel below images shorter than the tallest one.
///
/// # Returns
///
/// An image as wide as all inputs together and as tall as the tallest one. An
/// empty input yields an empty image.
pub fn concat_horizontal<P: Pixel>(images: &[Image<P>], fill: P) -> Image<P> {
    let width = images.iter().map(|image| image.width()).sum();
    let height = images.iter().map(|image| image.height()).max().unwrap_or(0);
    let mut canvas = ImageBuffer::from_pixel(width, height, fill);

    let mut x = 0i64;
    for image in images {
        imageops::replace(&mut canvas, image, x, 0);
        x += i64::from(image.width());
    }
    canvas
}

/// Places `images` on top of each other, left-aligned.
///
/// Images narrower than the widest one are filled with `fill` on the right. An
/// empty input yields an empty image.
pub fn concat_vertical<P: Pixel>(images: &[Image<P>], fill: P) -> Image<P> {
    let width = images.iter().map(|image| image.width()).max().unwrap_or(0);
    let height = images.iter().map(|image| image.height()).sum();
    let mut canvas = ImageBuffer::from_pixel(width, height, fill);

    let mut y = 0i64;
    for image in images {
        imageops::replace(&mut canvas, image, 0, y);
        y += i64::from(image.height());
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    fn filled(width: u32, height: u32, value: u8) -> GrayImage {
        GrayImage::from_pixel(width, height, Luma([value]))
    }

    #[test]
    fn test_pad() {
        let image = filled(2, 3, 9);
        let padded = pad(
            &image,
            Padding {
                top: 1,
                bottom: 0,
                left: 2,
                right: 3,
            },
            Luma([1]),
        );
        assert_eq!(padded.dimensions(), (7, 4));
        assert_eq!(padded.get_pixel(0, 0)[0], 1);
        assert_eq!(padded.get_pixel(2, 1)[0], 9);
        assert_eq!(padded.get_pixel(3, 3)[0], 9);
        assert_eq!(padded.get_pixel(4, 3)[0], 1);

        let unchanged = pad(&image, Padding::default(), Luma([0]));
        assert_eq!(unchanged, image);
    }

    #[test]
    fn test_concat_horizontal() {
        let joined = concat_horizontal(&[filled(2, 1, 5), filled(1, 3, 7)], Luma([0]));
        assert_eq!(joined.dimensions(), (3, 3));
        assert_eq!(
            joined.into_raw(),
            vec![
                5, 5, 7, //
                0, 0, 7, //
                0, 0, 7,
            ]
        );
    }

    #[test]
    fn test_concat_vertical() {
        let top = RgbImage::from_pixel(1, 1, Rgb([1, 2, 3]));
        let bottom = RgbImage::from_pixel(3, 1, Rgb([4, 5, 6]));
        let joined = concat_vertical(&[top, bottom], Rgb([0, 0, 0]));
        assert_eq!(joined.dimensions(), (3, 2));
        assert_eq!(joined.get_pixel(0, 0), &Rgb([1, 2, 3]));
        assert_eq!(joined.get_pixel(2, 0), &Rgb([0, 0, 0]));
        assert_eq!(joined.get_pixel(2, 1), &Rgb([4, 5, 6]));
    }

    #[test]
    fn test_concat_empty() {
        let joined = concat_vertical::<Luma<u8>>(&[], Luma([0]));
        assert_eq!(joined.dimensions(), (0, 0));
    }
}
