//! Writes a synthetic plate-reader run in the multi-file layout:
//! `generate_sample [DIR]` → `DIR/run_<h>h.csv` for a handful of hours.

use std::path::PathBuf;

use anyhow::{Context, Result};
use csv::WriterBuilder;

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

fn generate_spectrum(
    wavelengths: &[i64],
    baseline: f64,
    peaks: &[(f64, f64, f64)],
    noise_level: f64,
    rng: &mut SimpleRng,
) -> Vec<i64> {
    wavelengths
        .iter()
        .map(|&wl| {
            let signal: f64 = peaks
                .iter()
                .map(|&(mu, sigma, amp)| gaussian(wl as f64, mu, sigma, amp))
                .sum();
            (baseline + signal + rng.gauss(0.0, noise_level)).round() as i64
        })
        .collect()
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Instrument preamble; `Config::header_rows` skips exactly these lines.
const PREAMBLE: [&str; 7] = [
    "User: USER",
    "Path: C:\\Program Files\\Reader\\Data",
    "Test ID: 1042",
    "Test Name: Growth curve",
    "Date: 18/10/2026",
    "Time: 09:00:00",
    "Absorbance spectrum",
];

fn main() -> Result<()> {
    let out_dir = PathBuf::from(std::env::args().nth(1).unwrap_or_else(|| "sample_data".into()));
    std::fs::create_dir_all(&out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);

    // Wavelengths: 300 → 700 nm, step 5
    let wavelengths: Vec<i64> = (0..=80).map(|i| 300 + i * 5).collect();
    let hours = [0u32, 2, 4, 8, 24];
    let samples = 10;

    for &hour in &hours {
        let path = out_dir.join(format!("run_{hour}h.csv"));
        let mut writer = WriterBuilder::new()
            .flexible(true)
            .from_path(&path)
            .with_context(|| format!("creating {}", path.display()))?;

        for line in PREAMBLE {
            writer.write_record([line])?;
        }

        let mut header = vec![String::new(), "Wavelength [nm]".to_string()];
        header.extend(wavelengths.iter().map(i64::to_string));
        writer.write_record(&header)?;

        let growth = 1.0 + f64::from(hour) / 6.0;
        let blank = generate_spectrum(&wavelengths, 120.0, &[], 2.0, &mut rng);
        write_row(&mut writer, "A1", "Blank", &blank)?;

        for n in 1..=samples {
            let centre = 380.0 + 25.0 * f64::from(n);
            let peaks = [(centre, 30.0, 40.0 * growth * f64::from(n) / 4.0)];
            let values = generate_spectrum(&wavelengths, 120.0, &peaks, 2.0, &mut rng);
            write_row(&mut writer, &format!("B{n}"), &format!("Sample X{n}"), &values)?;
        }

        writer.flush()?;
    }

    println!(
        "Wrote {} hour files ({} samples + Blank, {} wavelengths each) to {}",
        hours.len(),
        samples,
        wavelengths.len(),
        out_dir.display()
    );
    Ok(())
}

fn write_row<W: std::io::Write>(
    writer: &mut csv::Writer<W>,
    well: &str,
    content: &str,
    values: &[i64],
) -> Result<()> {
    let mut row = vec![well.to_string(), content.to_string()];
    row.extend(values.iter().map(i64::to_string));
    writer.write_record(&row)?;
    Ok(())
}
