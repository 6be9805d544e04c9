use std::f64::consts::PI;
use std::ops::Index;

use image::{GenericImage, GrayImage, Luma, Pixel, RgbImage};
use imageproc::{
    contours::find_contours,
    contrast::{ThresholdType, threshold},
    definitions::Clamp,
    drawing::{
        draw_antialiased_line_segment_mut, draw_filled_circle_mut, draw_line_segment_mut,
        draw_polygon_mut,
    },
    geometry::{contour_area, oriented_contour_area},
    pixelops::interpolate,
    point::Point,
};
use log::debug;
use num::{Num, NumCast};
use num_traits::AsPrimitive;

use crate::{
    colors::generate_contrasting_colors,
    error::{Error, Result},
    moments::{Moments, log_scale},
    raster::{Gray16Image, Gray32FImage, Raster, pixel_from_components, with_buffer},
};

/// A closed polygon boundary, stored as its ordered vertex sequence.
///
/// The polygon is always treated as closed: there is an implicit edge from the
/// last point back to the first one, whether or not they coincide. Every measure
/// is derived from the points on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour<T = i32> {
    points: Vec<Point<T>>,
}

impl<T> Contour<T> {
    pub fn new(points: Vec<Point<T>>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point<T>] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Point<T>> {
        self.points
    }

    /// Returns the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl<T> From<imageproc::contours::Contour<T>> for Contour<T> {
    fn from(contour: imageproc::contours::Contour<T>) -> Self {
        Self::new(contour.points)
    }
}

impl<T> Contour<T>
where
    T: Num + NumCast + Copy + AsPrimitive<f64>,
{
    fn vertices(&self) -> impl Iterator<Item = (f64, f64)> + Clone + '_ {
        self.points.iter().map(|p| (p.x.as_(), p.y.as_()))
    }

    /// Polygon area by the shoelace formula.
    ///
    /// Positive for counter-clockwise vertex order in a y-up frame, which is
    /// clockwise on screen where y grows downwards.
    pub fn signed_area(&self) -> f64 {
        oriented_contour_area(&self.points)
    }

    pub fn area(&self) -> f64 {
        contour_area(&self.points)
    }

    /// Length of the closed path through all points.
    ///
    /// Contours with 0 or 1 point have a perimeter of `0.0`; a two-point contour
    /// counts its single segment twice.
    pub fn perimeter(&self) -> f64 {
        self.points
            .iter()
            .zip(self.points.iter().cycle().skip(1))
            .map(|(p1, p2)| {
                let dx: f64 = p2.x.as_() - p1.x.as_();
                let dy: f64 = p2.y.as_() - p1.y.as_();
                dx.hypot(dy)
            })
            .sum()
    }

    /// Mean of the points, `None` for an empty contour.
    pub fn centroid(&self) -> Option<Point<f64>> {
        if self.points.is_empty() {
            return None;
        }
        let n = self.points.len() as f64;
        let (sx, sy) = self
            .vertices()
            .fold((0.0, 0.0), |(sx, sy), (x, y)| (sx + x, sy + y));
        Some(Point::new(sx / n, sy / n))
    }

    /// Ratio of the area-equivalent radius to the perimeter-equivalent radius.
    ///
    /// Exactly `1.0` for a circle and smaller for every other shape. Contours with
    /// zero perimeter yield NaN.
    pub fn circularity(&self) -> f64 {
        (self.area() / PI).sqrt() / (self.perimeter() / (2.0 * PI))
    }

    pub fn moments(&self) -> Moments {
        Moments::of_polygon(self.vertices())
    }

    /// The seven Hu moment invariants, optionally as `sign(v) * log10(|v|)`.
    pub fn hu_moments(&self, log_scaled: bool) -> [f64; 7] {
        let hu = self.moments().hu();
        if log_scaled { log_scale(hu) } else { hu }
    }

    pub fn measure(&self, measure: Measure) -> f64 {
        measure.evaluate(self)
    }

    /// Rasterizes the contour onto `image` in place.
    ///
    /// # Arguments
    ///
    /// * `image` - The image to draw on. Parts of the contour outside of it are clipped.
    /// * `color` - The pixel written for the outline or the interior.
    /// * `style` - Fill, thickness, antialiasing and offset. Every point is shifted by
    ///   `style.offset` first, saturating at the `i32` range.
    ///
    /// Filled polygons need at least three distinct vertices; smaller contours are
    /// drawn as outlines instead, so degenerate contours never panic.
    pub fn draw<I>(&self, image: &mut I, color: I::Pixel, style: &DrawStyle)
    where
        I: GenericImage,
        I::Pixel: 'static,
        <I::Pixel as Pixel>::Subpixel: Into<f32> + Clamp<f32>,
    {
        let (dx, dy) = style.offset;
        let mut points: Vec<Point<i32>> = self
            .vertices()
            .map(|(x, y)| {
                Point::new(
                    (x.round() as i32).saturating_add(dx),
                    (y.round() as i32).saturating_add(dy),
                )
            })
            .collect();
        if points.is_empty() {
            return;
        }

        if style.filled {
            // A repeated closing vertex does not count towards the three a fill needs.
            if points.len() > 1 && points.first() == points.last() {
                points.pop();
            }
            if points.len() >= 3 {
                draw_polygon_mut(image, &points, color);
                if style.antialiased {
                    draw_outline(image, &points, color, 1, true);
                }
                return;
            }
        }

        draw_outline(image, &points, color, style.thickness, style.antialiased);
    }

    /// Draws onto a dynamically typed raster, with one color component per channel.
    ///
    /// # Arguments
    ///
    /// * `raster` - The raster to draw on, in any layout.
    /// * `color` - One component per channel, in the raster's native sample units.
    /// * `style` - See [`Contour::draw`].
    ///
    /// # Errors
    ///
    /// [`Error::ChannelMismatch`] if `color` has the wrong number of components and
    /// [`Error::InvalidColor`] if a component does not fit the sample type. The
    /// raster is left untouched in both cases.
    pub fn draw_raster(
        &self,
        raster: &mut Raster,
        color: &[f64],
        style: &DrawStyle,
    ) -> Result<()> {
        let expected = raster.channel_count();
        if color.len() != expected {
            return Err(Error::ChannelMismatch {
                expected,
                found: color.len(),
            });
        }
        with_buffer!(raster, image => {
            let pixel = pixel_from_components(color)?;
            self.draw(image, pixel, style);
        });
        Ok(())
    }
}

fn draw_outline<I>(
    image: &mut I,
    points: &[Point<i32>],
    color: I::Pixel,
    thickness: u32,
    antialiased: bool,
) where
    I: GenericImage,
    I::Pixel: 'static,
    <I::Pixel as Pixel>::Subpixel: Into<f32> + Clamp<f32>,
{
    for (p1, p2) in points.iter().zip(points.iter().cycle().skip(1)) {
        if thickness > 1 {
            stamp_segment(image, *p1, *p2, color, (thickness / 2) as i32);
        } else if p1 == p2 {
            let (x, y) = (p1.x as u32, p1.y as u32);
            if p1.x >= 0 && p1.y >= 0 && x < image.width() && y < image.height() {
                image.put_pixel(x, y, color);
            }
        } else if antialiased {
            draw_antialiased_line_segment_mut(
                image,
                (p1.x, p1.y),
                (p2.x, p2.y),
                color,
                interpolate,
            );
        } else {
            draw_line_segment_mut(
                image,
                (p1.x as f32, p1.y as f32),
                (p2.x as f32, p2.y as f32),
                color,
            );
        }
    }
}

/// Draws a thick segment as a row of discs along it.
fn stamp_segment<I>(
    image: &mut I,
    p1: Point<i32>,
    p2: Point<i32>,
    color: I::Pixel,
    radius: i32,
) where
    I: GenericImage,
    I::Pixel: 'static,
{
    let (dx, dy) = (p2.x - p1.x, p2.y - p1.y);
    let steps = dx.abs().max(dy.abs()).max(1);
    for step in 0..=steps {
        let t = step as f32 / steps as f32;
        let x = p1.x as f32 + t * dx as f32;
        let y = p1.y as f32 + t * dy as f32;
        draw_filled_circle_mut(image, (x.round() as i32, y.round() as i32), radius, color);
    }
}

/// How [`Contour::draw`] rasterizes a contour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawStyle {
    /// Outline width in pixels, ignored when `filled` is set.
    pub thickness: u32,
    pub filled: bool,
    pub antialiased: bool,
    /// Added to every point before drawing.
    pub offset: (i32, i32),
}

impl Default for DrawStyle {
    fn default() -> Self {
        Self {
            thickness: 1,
            filled: true,
            antialiased: false,
            offset: (0, 0),
        }
    }
}

impl DrawStyle {
    pub fn outline(thickness: u32) -> Self {
        Self {
            thickness,
            filled: false,
            ..Self::default()
        }
    }
}

/// Scalar shape measures that contours can be filtered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Measure {
    CenterX,
    CenterY,
    Area,
    Perimeter,
    Circularity,
}

impl Measure {
    /// Evaluates the measure; the center of an empty contour is NaN.
    pub fn evaluate<T>(self, contour: &Contour<T>) -> f64
    where
        T: Num + NumCast + Copy + AsPrimitive<f64>,
    {
        match self {
            Measure::CenterX => contour.centroid().map_or(f64::NAN, |c| c.x),
            Measure::CenterY => contour.centroid().map_or(f64::NAN, |c| c.y),
            Measure::Area => contour.area(),
            Measure::Perimeter => contour.perimeter(),
            Measure::Circularity => contour.circularity(),
        }
    }
}

/// Rasters contours can be extracted from.
///
/// Non-zero samples (or `true` for boolean masks) are foreground.
pub trait Foreground {
    /// Copies the raster into an 8-bit mask with foreground as 255.
    fn to_mask(&self) -> Result<GrayImage>;
}

impl Foreground for GrayImage {
    fn to_mask(&self) -> Result<GrayImage> {
        Ok(threshold(self, 0, ThresholdType::Binary))
    }
}

impl Foreground for Gray16Image {
    fn to_mask(&self) -> Result<GrayImage> {
        Ok(GrayImage::from_fn(self.width(), self.height(), |x, y| {
            Luma([if self.get_pixel(x, y)[0] != 0 { 255 } else { 0 }])
        }))
    }
}

impl Foreground for Gray32FImage {
    fn to_mask(&self) -> Result<GrayImage> {
        Ok(GrayImage::from_fn(self.width(), self.height(), |x, y| {
            Luma([if self.get_pixel(x, y)[0] != 0.0 { 255 } else { 0 }])
        }))
    }
}

impl Foreground for Raster {
    fn to_mask(&self) -> Result<GrayImage> {
        match self {
            Raster::Gray8(image) => image.to_mask(),
            Raster::Gray16(image) => image.to_mask(),
            Raster::Gray32F(image) => image.to_mask(),
            other => Err(Error::NotSingleChannel(other.channel_count())),
        }
    }
}

/// A boolean mask given as rows of samples.
impl<R: AsRef<[bool]>> Foreground for [R] {
    fn to_mask(&self) -> Result<GrayImage> {
        let width = self.first().map_or(0, |row| row.as_ref().len());
        let mut mask = GrayImage::new(width as u32, self.len() as u32);
        for (y, row) in self.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width {
                return Err(Error::RaggedMask {
                    row: y,
                    expected: width,
                    found: row.len(),
                });
            }
            for (x, &value) in row.iter().enumerate() {
                if value {
                    mask.put_pixel(x as u32, y as u32, Luma([255]));
                }
            }
        }
        Ok(mask)
    }
}

impl<R: AsRef<[bool]>> Foreground for Vec<R> {
    fn to_mask(&self) -> Result<GrayImage> {
        self.as_slice().to_mask()
    }
}

/// Finds every contour of the foreground in `raster`.
///
/// # Arguments
///
/// * `raster` - A single-channel image or a boolean mask given as rows. Non-zero
///   samples are foreground. The input is copied and never modified.
///
/// # Returns
///
/// A [`ContourList`] holding all borders, outer boundaries and hole boundaries
/// alike, without their nesting and with every boundary pixel kept. The list order
/// is the order [`imageproc::contours::find_contours`] reports them in.
///
/// # Errors
///
/// [`Error::RaggedMask`] for boolean rows of different lengths and
/// [`Error::NotSingleChannel`] for color rasters.
pub fn extract<F: Foreground + ?Sized>(raster: &F) -> Result<ContourList> {
    let mask = raster.to_mask()?;
    let contours: Vec<Contour> = find_contours::<i32>(&mask)
        .into_iter()
        .map(Contour::from)
        .collect();
    debug!(
        "extracted {} contours from a {}x{} raster",
        contours.len(),
        mask.width(),
        mask.height()
    );
    Ok(ContourList { contours, mask })
}

/// An ordered, filterable collection of contours from one extraction pass.
///
/// The list keeps its own 8-bit copy of the raster it was extracted from, so later
/// changes to the source raster are not visible here.
#[derive(Debug, Clone)]
pub struct ContourList {
    contours: Vec<Contour>,
    mask: GrayImage,
}

impl ContourList {
    /// See [`extract`].
    pub fn extract<F: Foreground + ?Sized>(raster: &F) -> Result<Self> {
        extract(raster)
    }

    /// The mask the contours were extracted from.
    pub fn mask(&self) -> &GrayImage {
        &self.mask
    }

    pub fn len(&self) -> usize {
        self.contours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Contour> {
        self.contours.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Contour> {
        self.contours.iter()
    }

    pub fn as_slice(&self) -> &[Contour] {
        &self.contours
    }

    pub fn into_contours(self) -> Vec<Contour> {
        self.contours
    }

    /// Keeps only contours whose `measure` lies in the inclusive range `[min, max]`.
    ///
    /// # Arguments
    ///
    /// * `measure` - The shape measure each contour is evaluated by.
    /// * `min` - Contours below this value are removed. `None` leaves the range open.
    /// * `max` - Contours above this value are removed. `None` leaves the range open.
    ///
    /// The relative order of the surviving contours is preserved, and contours whose
    /// measure is NaN are kept.
    pub fn filter(&mut self, measure: Measure, min: Option<f64>, max: Option<f64>) {
        let total = self.len();
        self.filter_by(|contour| measure.evaluate(contour), min, max);
        debug!("{measure:?} filter [{min:?}, {max:?}] kept {}/{total} contours", self.len());
    }

    /// Like [`ContourList::filter`], with an arbitrary measure function.
    ///
    /// NaN measures never fall outside the range and are always kept.
    pub fn filter_by<F>(&mut self, measure: F, min: Option<f64>, max: Option<f64>)
    where
        F: Fn(&Contour) -> f64,
    {
        if min.is_none() && max.is_none() {
            return;
        }
        self.contours.retain(|contour| {
            let value = measure(contour);
            !(min.is_some_and(|min| value < min) || max.is_some_and(|max| value > max))
        });
    }

    /// Finds the contour with the largest area.
    ///
    /// # Returns
    ///
    /// The index of that contour, or `None` for an empty list. When several contours
    /// share the largest area, the first one wins.
    pub fn find_largest(&self) -> Option<usize> {
        let mut largest: Option<(usize, f64)> = None;
        for (index, contour) in self.contours.iter().enumerate() {
            let area = contour.area();
            if largest.is_none_or(|(_, max_area)| area > max_area) {
                largest = Some((index, area));
            }
        }
        largest.map(|(index, _)| index)
    }

    pub fn largest(&self) -> Option<&Contour> {
        self.find_largest().map(|index| &self.contours[index])
    }

    /// Draws every contour onto `canvas`, each in its own contrasting color.
    pub fn draw_all(&self, canvas: &mut RgbImage, style: &DrawStyle) {
        let colors = generate_contrasting_colors(self.contours.len());
        for (contour, color) in self.contours.iter().zip(colors) {
            contour.draw(canvas, color, style);
        }
    }
}

impl From<Vec<Contour>> for ContourList {
    /// Wraps contours that were not extracted from a raster; the mask is empty.
    fn from(contours: Vec<Contour>) -> Self {
        Self {
            contours,
            mask: GrayImage::new(0, 0),
        }
    }
}

impl Index<usize> for ContourList {
    type Output = Contour;

    fn index(&self, index: usize) -> &Contour {
        &self.contours[index]
    }
}

impl<'a> IntoIterator for &'a ContourList {
    type Item = &'a Contour;
    type IntoIter = std::slice::Iter<'a, Contour>;

    fn into_iter(self) -> Self::IntoIter {
        self.contours.iter()
    }
}
