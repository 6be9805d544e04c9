//! Intensity statistics for quick inspection of a raster.

use std::fmt;

use crate::{
    error::{Error, Result},
    raster::{Raster, SampleType},
};

/// Counts the samples of `raster` in `bin_count` equal-width bins.
///
/// The bins span the nominal range of the sample type, with the upper end exclusive
/// for integers (`[0, 256)` for `u8`) and inclusive for floats (`[0, 1]`, values
/// outside are clamped). Counts of all channels are summed.
pub fn histogram(raster: &Raster, bin_count: usize) -> Result<Vec<u64>> {
    if bin_count == 0 {
        return Err(Error::ZeroBins);
    }

    let span = match raster.sample_type() {
        SampleType::U8 | SampleType::U16 => raster.sample_type().nominal_max() + 1.0,
        SampleType::F32 => 1.0,
    };

    let mut bins = vec![0u64; bin_count];
    for sample in raster.samples() {
        let position = (sample.clamp(0.0, span) / span * bin_count as f64) as usize;
        bins[position.min(bin_count - 1)] += 1;
    }
    Ok(bins)
}

/// Appearance of [`render_histogram`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistogramStyle {
    /// Number of text rows used for the bars.
    pub height: usize,
    pub bar: char,
    pub background: char,
    pub column_separator: String,
}

impl Default for HistogramStyle {
    fn default() -> Self {
        Self {
            height: 8,
            bar: '#',
            background: ' ',
            column_separator: ".".to_string(),
        }
    }
}

/// Renders a histogram as a text chart with the largest bin at full height.
pub fn render_histogram(bins: &[u64], style: &HistogramStyle) -> String {
    let max = bins.iter().copied().max().unwrap_or(0).max(1) as f64;
    let mut lines = vec!["^".to_string()];

    for row in 0..style.height {
        let threshold = 1.0 - (row + 1) as f64 / style.height as f64;
        let columns: Vec<String> = bins
            .iter()
            .map(|&count| {
                let symbol = if count as f64 / max > threshold {
                    style.bar
                } else {
                    style.background
                };
                symbol.to_string()
            })
            .collect();
        lines.push(format!("|{}", columns.join(&style.column_separator)));
    }

    let axis_width = bins.len().saturating_sub(1) * (1 + style.column_separator.chars().count()) + 1;
    lines.push(format!("+{}>", "-".repeat(axis_width)));
    lines.join("\n")
}

/// Summary statistics of all samples of a raster.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    pub size_kib: f64,
    pub width: u32,
    pub height: u32,
    pub channels: usize,
    pub sample_type: SampleType,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub first_quartile: f64,
    pub median: f64,
    pub third_quartile: f64,
    pub max: f64,
}

impl ImageInfo {
    /// Collects the statistics; they are all NaN for an empty raster.
    pub fn of(raster: &Raster) -> Self {
        let mut samples = raster.samples();
        samples.sort_unstable_by(f64::total_cmp);

        let bytes_per_sample = match raster.sample_type() {
            SampleType::U8 => 1,
            SampleType::U16 => 2,
            SampleType::F32 => 4,
        };

        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;

        Self {
            size_kib: (samples.len() * bytes_per_sample) as f64 / 1024.0,
            width: raster.width(),
            height: raster.height(),
            channels: raster.channel_count(),
            sample_type: raster.sample_type(),
            mean,
            std: variance.sqrt(),
            min: percentile(&samples, 0.0),
            first_quartile: percentile(&samples, 25.0),
            median: percentile(&samples, 50.0),
            third_quartile: percentile(&samples, 75.0),
            max: percentile(&samples, 100.0),
        }
    }

    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("size (KiB)", format!("{:.2}", self.size_kib)),
            ("shape", format!("{}x{}x{}", self.height, self.width, self.channels)),
            ("sample type", format!("{:?}", self.sample_type)),
            ("mean", format!("{:.4}", self.mean)),
            ("std", format!("{:.4}", self.std)),
            ("min", self.min.to_string()),
            ("1st quartile", self.first_quartile.to_string()),
            ("median", self.median.to_string()),
            ("3rd quartile", self.third_quartile.to_string()),
            ("max", self.max.to_string()),
        ]
    }
}

/// Renders the statistics as a two-column table framed by separator lines.
impl fmt::Display for ImageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self.rows();
        let key_width = rows.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
        let value_width = rows.iter().map(|(_, value)| value.len()).max().unwrap_or(0);
        let separator = format!("{}  {}", "-".repeat(key_width), "-".repeat(value_width));

        writeln!(f, "{separator}")?;
        for (key, value) in &rows {
            writeln!(f, "{key:<key_width$}  {value:<value_width$}")?;
        }
        write!(f, "{separator}")
    }
}

/// Percentile of sorted values with linear interpolation between neighbours.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (rank - lower as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::{GrayImage, Rgb, RgbImage};

    use crate::raster::Gray32FImage;

    #[test]
    fn test_histogram_gray() {
        let raster = Raster::Gray8(GrayImage::from_raw(2, 2, vec![0, 0, 128, 255]).unwrap());
        let bins = histogram(&raster, 256).unwrap();
        assert_eq!(bins.len(), 256);
        assert_eq!(bins[0], 2);
        assert_eq!(bins[128], 1);
        assert_eq!(bins[255], 1);
        assert_eq!(bins.iter().sum::<u64>(), 4);

        assert_eq!(histogram(&raster, 2).unwrap(), vec![2, 2]);
        assert_eq!(histogram(&raster, 0).unwrap_err(), Error::ZeroBins);
    }

    #[test]
    fn test_histogram_sums_channels() {
        let raster = Raster::Rgb8(RgbImage::from_pixel(1, 1, Rgb([0, 100, 255])));
        assert_eq!(histogram(&raster, 4).unwrap(), vec![1, 1, 0, 1]);

        // A gray image counts once per pixel, its color version three times.
        let gray = Raster::Gray8(GrayImage::from_raw(2, 1, vec![10, 200]).unwrap());
        let as_color = histogram(&gray.as_color(), 8).unwrap();
        let as_gray = histogram(&gray, 8).unwrap();
        assert!(as_color.iter().zip(&as_gray).all(|(c, g)| *c == 3 * g));
    }

    #[test]
    fn test_histogram_float() {
        let raster = Raster::Gray32F(Gray32FImage::from_raw(3, 1, vec![0.0, 0.5, 1.0]).unwrap());
        assert_eq!(histogram(&raster, 2).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_render_histogram() {
        let chart = render_histogram(
            &[4, 2, 0],
            &HistogramStyle {
                height: 2,
                ..HistogramStyle::default()
            },
        );
        assert_eq!(chart, "^\n|#. . \n|#.#. \n+----->");
    }

    #[test]
    fn test_image_info() {
        let raster = Raster::Gray8(GrayImage::from_raw(2, 2, vec![1, 2, 3, 4]).unwrap());
        let info = ImageInfo::of(&raster);
        assert_eq!((info.width, info.height, info.channels), (2, 2, 1));
        assert_eq!(info.sample_type, SampleType::U8);
        assert_relative_eq!(info.size_kib, 4.0 / 1024.0);
        assert_relative_eq!(info.mean, 2.5);
        assert_relative_eq!(info.std, 1.25f64.sqrt());
        assert_relative_eq!(info.min, 1.0);
        assert_relative_eq!(info.first_quartile, 1.75);
        assert_relative_eq!(info.median, 2.5);
        assert_relative_eq!(info.third_quartile, 3.25);
        assert_relative_eq!(info.max, 4.0);

        let table = info.to_string();
        assert!(table.starts_with("------------"));
        assert!(table.contains("median        2.5"));
        assert_eq!(table.lines().count(), 12);
    }
}
