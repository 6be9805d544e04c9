use image::{GrayImage, Luma, Rgb, RgbImage};
use palette::{FromColor, Hsl, Hsv, Srgb};

use crate::{
    error::{Error, Result},
    raster::Raster,
};

/// Generates `n` visually distinct, contrasting RGB colors.
pub(crate) fn generate_contrasting_colors(n: usize) -> Vec<Rgb<u8>> {
    let mut colors = Vec::with_capacity(n);

    for i in 0..n {
        let hue = (i as f32 * 360.0) / n as f32;

        let saturation = 0.9;
        let lightness = 0.5;

        let hsl_color = Hsl::new(hue, saturation, lightness);
        let srgb_linear = Srgb::from_color(hsl_color);
        let srgb_u8: Srgb<u8> = srgb_linear.into_format();

        colors.push(Rgb([srgb_u8.red, srgb_u8.green, srgb_u8.blue]));
    }

    colors
}

/// A 256-entry lookup table from 8-bit intensities to RGB colors.
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    lut: Vec<Rgb<u8>>,
}

impl Colormap {
    /// Names accepted by [`Colormap::named`].
    pub const NAMES: [&'static str; 5] = ["gray", "jet", "hot", "cool", "hsv"];

    /// Looks up a built-in colormap by its case-insensitive name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownColormap`] if no colormap has this name.
    pub fn named(name: &str) -> Result<Self> {
        let ramp: fn(f32) -> [f32; 3] = match name.to_ascii_lowercase().as_str() {
            "gray" => |t| [t, t, t],
            "jet" => |t| {
                let ramp = |center: f32| (1.5 - (4.0 * t - center).abs()).clamp(0.0, 1.0);
                [ramp(3.0), ramp(2.0), ramp(1.0)]
            },
            "hot" => |t| {
                [
                    (3.0 * t).clamp(0.0, 1.0),
                    (3.0 * t - 1.0).clamp(0.0, 1.0),
                    (3.0 * t - 2.0).clamp(0.0, 1.0),
                ]
            },
            "cool" => |t| [t, 1.0 - t, 1.0],
            "hsv" => |t| {
                let rgb: Srgb = Srgb::from_color(Hsv::new(t * 360.0, 1.0, 1.0));
                [rgb.red, rgb.green, rgb.blue]
            },
            _ => return Err(Error::UnknownColormap(name.to_string())),
        };

        let lut = (0..=255u8)
            .map(|i| {
                let [r, g, b] = ramp(f32::from(i) / 255.0);
                Rgb([to_u8(r), to_u8(g), to_u8(b)])
            })
            .collect();
        Ok(Self { lut })
    }

    /// Wraps a user-supplied table, which must have exactly 256 entries.
    pub fn from_lut(lut: Vec<Rgb<u8>>) -> Result<Self> {
        if lut.len() != 256 {
            return Err(Error::InvalidColormap(lut.len()));
        }
        Ok(Self { lut })
    }

    pub fn lut(&self) -> &[Rgb<u8>] {
        &self.lut
    }

    pub fn map(&self, value: u8) -> Rgb<u8> {
        self.lut[value as usize]
    }

    /// Renders the colormap as a `1x256` image, from the first entry at the top.
    pub fn to_image(&self) -> RgbImage {
        RgbImage::from_fn(1, 256, |_, y| self.lut[y as usize])
    }
}

fn to_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Maps the 8-bit gray version of `raster` through `colormap`.
pub fn colorize(raster: &Raster, colormap: &Colormap) -> RgbImage {
    colorize_gray(&raster.to_gray8(), colormap)
}

pub fn colorize_gray(image: &GrayImage, colormap: &Colormap) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let Luma([value]) = *image.get_pixel(x, y);
        colormap.map(value)
    })
}
