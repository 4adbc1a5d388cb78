use std::ops::Range;

use anyhow::{Context, Result};
use image::RgbImage;
use plotters::prelude::*;

use crate::color::generate_palette;
use crate::data::model::{Hour, SampleRecord};

// ---------------------------------------------------------------------------
// Axis ranges
// ---------------------------------------------------------------------------

/// Axis ranges of one line-stack chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartBounds {
    pub wavelength: Range<f64>,
    pub magnitude: Range<f64>,
    pub hour: Range<f64>,
}

impl ChartBounds {
    /// Ranges covering `record`. The magnitude axis always includes zero and
    /// tops out at `z_max` when a shared scale is given.
    pub fn of(record: &SampleRecord, z_max: Option<i64>) -> Self {
        let wavelength = span(record.wavelengths.iter().copied());
        let hour = span(record.hours.keys().map(|h| i64::from(h.value())));

        let low = record.min_magnitude().unwrap_or(0).min(0) as f64;
        let high = z_max.or(record.max_magnitude()).unwrap_or(0) as f64;
        let magnitude = if high > low { low..high } else { low..low + 1.0 };

        Self {
            wavelength,
            magnitude,
            hour,
        }
    }
}

/// `min..max` of the values, widened to a unit range when degenerate or empty.
fn span(values: impl Iterator<Item = i64>) -> Range<f64> {
    let (low, high) = values.fold((i64::MAX, i64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if low > high {
        0.0..1.0
    } else if low == high {
        low as f64..low as f64 + 1.0
    } else {
        low as f64..high as f64
    }
}

/// Hour series in drawing order: the farthest (largest) hour first, so nearer
/// lines are painted over it.
pub fn lines_back_to_front(record: &SampleRecord) -> Vec<(Hour, &[i64])> {
    record
        .hours
        .iter()
        .rev()
        .map(|(h, m)| (*h, m.as_slice()))
        .collect()
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

/// Draw the 3D line stack of one sample into an RGB image.
///
/// Wavelength runs along x, magnitude is vertical and every hour is one line
/// at its own depth.
pub fn draw_line_stack(
    title: &str,
    record: &SampleRecord,
    z_max: Option<i64>,
    size: (u32, u32),
) -> Result<RgbImage> {
    let (width, height) = size;
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    let bounds = ChartBounds::of(record, z_max);

    {
        let root = BitMapBackend::with_buffer(&mut buffer, size).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 28))
            .margin(20)
            .build_cartesian_3d(bounds.wavelength, bounds.magnitude, bounds.hour)?;

        chart.with_projection(|mut pb| {
            pb.yaw = 0.6;
            pb.pitch = 0.25;
            pb.scale = 0.85;
            pb.into_matrix()
        });

        chart
            .configure_axes()
            .light_grid_style(BLACK.mix(0.1))
            .max_light_lines(3)
            .draw()?;

        let lines = lines_back_to_front(record);
        let palette = generate_palette(lines.len());
        for ((hour, magnitudes), colour) in lines.into_iter().zip(palette) {
            let depth = f64::from(hour.value());
            chart
                .draw_series(LineSeries::new(
                    record
                        .wavelengths
                        .iter()
                        .zip(magnitudes)
                        .map(|(w, m)| (*w as f64, *m as f64, depth)),
                    colour.stroke_width(2),
                ))?
                .label(format!("{hour} h"))
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], colour));
        }

        chart
            .configure_series_labels()
            .border_style(BLACK)
            .background_style(WHITE.mix(0.8))
            .draw()?;

        root.present()?;
    }

    RgbImage::from_raw(width, height, buffer).context("chart buffer does not match the figure size")
}
