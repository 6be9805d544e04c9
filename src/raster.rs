//! A dynamically typed raster over the sample types and channel modes the
//! stacking and inspection helpers understand.
//!
//! [`Raster`] is deliberately narrower than [`image::DynamicImage`]: it has no
//! alpha layouts, but it does carry single-channel `f32` images, which are common
//! intermediate results in [imageproc] pipelines.

use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Pixel, Rgb, RgbImage};
use imageproc::definitions::Image;
use num::NumCast;

use crate::error::{Error, Result};

pub type Gray16Image = ImageBuffer<Luma<u16>, Vec<u16>>;
pub type Gray32FImage = ImageBuffer<Luma<f32>, Vec<f32>>;
pub type Rgb16Image = ImageBuffer<Rgb<u16>, Vec<u16>>;
pub type Rgb32FImage = ImageBuffer<Rgb<f32>, Vec<f32>>;

/// Sample types, ordered by the range of values they can represent.
///
/// The floating type supersedes every integer type, so the maximum over a set of
/// sample types is the smallest type that holds all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SampleType {
    U8,
    U16,
    F32,
}

impl SampleType {
    /// The value that represents full intensity: 255, 65535 or 1.0.
    pub fn nominal_max(self) -> f64 {
        match self {
            SampleType::U8 => u8::MAX as f64,
            SampleType::U16 => u16::MAX as f64,
            SampleType::F32 => 1.0,
        }
    }

    /// Returns the smallest sample type able to represent every given one,
    /// or `None` for an empty input.
    pub fn common<I: IntoIterator<Item = SampleType>>(types: I) -> Option<SampleType> {
        types.into_iter().max()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelMode {
    Gray,
    Color,
}

impl ChannelMode {
    pub fn channel_count(self) -> usize {
        match self {
            ChannelMode::Gray => 1,
            ChannelMode::Color => 3,
        }
    }
}

/// An in-memory image with one of six layouts.
#[derive(Debug, Clone, PartialEq)]
pub enum Raster {
    Gray8(GrayImage),
    Gray16(Gray16Image),
    Gray32F(Gray32FImage),
    Rgb8(RgbImage),
    Rgb16(Rgb16Image),
    Rgb32F(Rgb32FImage),
}

/// Evaluates `$body` with `$image` bound to the buffer inside any variant.
macro_rules! with_buffer {
    ($raster:expr, $image:ident => $body:expr) => {
        match $raster {
            $crate::raster::Raster::Gray8($image) => $body,
            $crate::raster::Raster::Gray16($image) => $body,
            $crate::raster::Raster::Gray32F($image) => $body,
            $crate::raster::Raster::Rgb8($image) => $body,
            $crate::raster::Raster::Rgb16($image) => $body,
            $crate::raster::Raster::Rgb32F($image) => $body,
        }
    };
}

/// Like [`with_buffer`], but wraps the resulting buffer back into the same variant.
macro_rules! map_buffer {
    ($raster:expr, $image:ident => $body:expr) => {
        match $raster {
            $crate::raster::Raster::Gray8($image) => $crate::raster::Raster::Gray8($body),
            $crate::raster::Raster::Gray16($image) => $crate::raster::Raster::Gray16($body),
            $crate::raster::Raster::Gray32F($image) => $crate::raster::Raster::Gray32F($body),
            $crate::raster::Raster::Rgb8($image) => $crate::raster::Raster::Rgb8($body),
            $crate::raster::Raster::Rgb16($image) => $crate::raster::Raster::Rgb16($body),
            $crate::raster::Raster::Rgb32F($image) => $crate::raster::Raster::Rgb32F($body),
        }
    };
}

pub(crate) use map_buffer;
pub(crate) use with_buffer;

impl Raster {
    pub fn width(&self) -> u32 {
        with_buffer!(self, image => image.width())
    }

    pub fn height(&self) -> u32 {
        with_buffer!(self, image => image.height())
    }

    /// `(width, height)`, matching [`image::GenericImageView::dimensions`].
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn sample_type(&self) -> SampleType {
        match self {
            Raster::Gray8(_) | Raster::Rgb8(_) => SampleType::U8,
            Raster::Gray16(_) | Raster::Rgb16(_) => SampleType::U16,
            Raster::Gray32F(_) | Raster::Rgb32F(_) => SampleType::F32,
        }
    }

    pub fn channel_mode(&self) -> ChannelMode {
        match self {
            Raster::Gray8(_) | Raster::Gray16(_) | Raster::Gray32F(_) => ChannelMode::Gray,
            Raster::Rgb8(_) | Raster::Rgb16(_) | Raster::Rgb32F(_) => ChannelMode::Color,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channel_mode().channel_count()
    }

    pub fn is_gray(&self) -> bool {
        self.channel_mode() == ChannelMode::Gray
    }

    /// All samples in row-major, channel-interleaved order, widened to `f64`.
    pub fn samples(&self) -> Vec<f64> {
        with_buffer!(self, image => {
            image.as_raw().iter().map(|&s| <f64 as From<_>>::from(s)).collect()
        })
    }

    /// Converts to another sample type and channel mode.
    ///
    /// Sample values are rescaled between nominal ranges (u8 -> u16 multiplies by
    /// 257, integer -> f32 divides by the type maximum), and color is reduced to
    /// gray by luminance, exactly as [`DynamicImage`] conversions do. Converting to
    /// the current layout returns an identical copy.
    pub fn convert(&self, sample_type: SampleType, mode: ChannelMode) -> Raster {
        if self.sample_type() == sample_type && self.channel_mode() == mode {
            return self.clone();
        }

        let dynamic = self.clone().into_dynamic();
        match (sample_type, mode) {
            (SampleType::U8, ChannelMode::Gray) => Raster::Gray8(dynamic.to_luma8()),
            (SampleType::U16, ChannelMode::Gray) => Raster::Gray16(dynamic.to_luma16()),
            (SampleType::F32, ChannelMode::Gray) => Raster::Gray32F(dynamic.to_luma32f()),
            (SampleType::U8, ChannelMode::Color) => Raster::Rgb8(dynamic.to_rgb8()),
            (SampleType::U16, ChannelMode::Color) => Raster::Rgb16(dynamic.to_rgb16()),
            (SampleType::F32, ChannelMode::Color) => Raster::Rgb32F(dynamic.to_rgb32f()),
        }
    }

    /// Converts to a single channel, keeping the sample type.
    pub fn as_gray(&self) -> Raster {
        self.convert(self.sample_type(), ChannelMode::Gray)
    }

    /// The 8-bit gray version of this raster.
    pub fn to_gray8(&self) -> GrayImage {
        match self {
            Raster::Gray8(image) => image.clone(),
            other => other.clone().into_dynamic().to_luma8(),
        }
    }

    /// Converts to three channels, keeping the sample type.
    pub fn as_color(&self) -> Raster {
        self.convert(self.sample_type(), ChannelMode::Color)
    }

    /// Converts into a [`DynamicImage`].
    ///
    /// `DynamicImage` has no single-channel `f32` layout, so `Gray32F` is
    /// replicated into `Rgb32F`.
    pub fn into_dynamic(self) -> DynamicImage {
        match self {
            Raster::Gray8(image) => DynamicImage::ImageLuma8(image),
            Raster::Gray16(image) => DynamicImage::ImageLuma16(image),
            Raster::Gray32F(image) => {
                DynamicImage::ImageRgb32F(ImageBuffer::from_fn(image.width(), image.height(), |x, y| {
                    let value = image.get_pixel(x, y)[0];
                    Rgb([value, value, value])
                }))
            }
            Raster::Rgb8(image) => DynamicImage::ImageRgb8(image),
            Raster::Rgb16(image) => DynamicImage::ImageRgb16(image),
            Raster::Rgb32F(image) => DynamicImage::ImageRgb32F(image),
        }
    }

    /// Returns the typed buffer, or a layout error if the raster holds another pixel type.
    pub fn into_buffer<P: RasterPixel>(self) -> Result<Image<P>> {
        let found = (self.sample_type(), self.channel_mode());
        P::unwrap(self).map_err(|_| Error::LayoutMismatch {
            expected: (P::SAMPLE_TYPE, P::CHANNEL_MODE),
            found,
        })
    }
}

/// Pixel types that have a [`Raster`] variant.
pub trait RasterPixel: Pixel + 'static {
    const SAMPLE_TYPE: SampleType;
    const CHANNEL_MODE: ChannelMode;

    fn wrap(image: Image<Self>) -> Raster;

    /// Moves the buffer out of `raster`, handing the raster back on a layout mismatch.
    fn unwrap(raster: Raster) -> std::result::Result<Image<Self>, Raster>;
}

macro_rules! impl_raster_pixel {
    ($pixel:ty, $variant:ident, $sample:ident, $mode:ident) => {
        impl RasterPixel for $pixel {
            const SAMPLE_TYPE: SampleType = SampleType::$sample;
            const CHANNEL_MODE: ChannelMode = ChannelMode::$mode;

            fn wrap(image: Image<Self>) -> Raster {
                Raster::$variant(image)
            }

            fn unwrap(raster: Raster) -> std::result::Result<Image<Self>, Raster> {
                match raster {
                    Raster::$variant(image) => Ok(image),
                    other => Err(other),
                }
            }
        }
    };
}

impl_raster_pixel!(Luma<u8>, Gray8, U8, Gray);
impl_raster_pixel!(Luma<u16>, Gray16, U16, Gray);
impl_raster_pixel!(Luma<f32>, Gray32F, F32, Gray);
impl_raster_pixel!(Rgb<u8>, Rgb8, U8, Color);
impl_raster_pixel!(Rgb<u16>, Rgb16, U16, Color);
impl_raster_pixel!(Rgb<f32>, Rgb32F, F32, Color);

impl<P: RasterPixel> From<Image<P>> for Raster {
    fn from(image: Image<P>) -> Self {
        P::wrap(image)
    }
}

impl TryFrom<DynamicImage> for Raster {
    type Error = Error;

    fn try_from(image: DynamicImage) -> Result<Self> {
        match image {
            DynamicImage::ImageLuma8(image) => Ok(Raster::Gray8(image)),
            DynamicImage::ImageLuma16(image) => Ok(Raster::Gray16(image)),
            DynamicImage::ImageRgb8(image) => Ok(Raster::Rgb8(image)),
            DynamicImage::ImageRgb16(image) => Ok(Raster::Rgb16(image)),
            DynamicImage::ImageRgb32F(image) => Ok(Raster::Rgb32F(image)),
            other => Err(Error::UnsupportedLayout(other.color())),
        }
    }
}

/// Builds a pixel from one `f64` component per channel.
///
/// Fails if the number of components differs from the channel count or if a
/// component is not representable in the pixel's sample type.
pub(crate) fn pixel_from_components<P: Pixel>(components: &[f64]) -> Result<P> {
    let expected = P::CHANNEL_COUNT as usize;
    if components.len() != expected {
        return Err(Error::ChannelMismatch {
            expected,
            found: components.len(),
        });
    }

    let channels = components
        .iter()
        .map(|&c| <P::Subpixel as NumCast>::from(c).ok_or(Error::InvalidColor(c)))
        .collect::<Result<Vec<_>>>()?;

    Ok(*P::from_slice(&channels))
}
