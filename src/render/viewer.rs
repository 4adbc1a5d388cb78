use anyhow::{anyhow, Result};
use eframe::egui;
use image::RgbImage;

use super::chart::draw_line_stack;
use super::{ChartRenderer, RenderFlow};
use crate::data::model::SampleRecord;

// ---------------------------------------------------------------------------
// eframe App showing one rendered chart
// ---------------------------------------------------------------------------

pub struct ChartViewerApp {
    title: String,
    texture: egui::TextureHandle,
}

impl eframe::App for ChartViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.heading(&self.title);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.centered_and_justified(|ui| {
                let source = (self.texture.id(), self.texture.size_vec2());
                ui.add(egui::Image::new(source).shrink_to_fit());
            });
        });
    }
}

/// Open a native window with `chart` and block until it is closed.
pub fn show_chart(title: &str, chart: RgbImage) -> Result<()> {
    let (width, height) = chart.dimensions();
    let pixels = egui::ColorImage::from_rgb([width as usize, height as usize], chart.as_raw());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([width as f32, height as f32 + 40.0])
            .with_min_inner_size([400.0, 300.0]),
        ..Default::default()
    };

    let heading = title.to_string();
    eframe::run_native(
        &format!("{title} – Spectral Stack"),
        options,
        Box::new(move |cc| {
            let texture = cc
                .egui_ctx
                .load_texture("chart", pixels, egui::TextureOptions::LINEAR);
            Ok(Box::new(ChartViewerApp {
                title: heading,
                texture,
            }))
        }),
    )
    .map_err(|e| anyhow!("could not open chart window: {e}"))
}

// ---------------------------------------------------------------------------
// Interactive renderer (--graph-test)
// ---------------------------------------------------------------------------

/// Shows the first chart on screen and then asks the caller to stop.
pub struct InteractiveRenderer {
    size: (u32, u32),
}

impl InteractiveRenderer {
    pub fn new(size: (u32, u32)) -> Self {
        Self { size }
    }
}

impl ChartRenderer for InteractiveRenderer {
    fn render(&mut self, name: &str, record: &SampleRecord, z_max: Option<i64>) -> Result<RenderFlow> {
        let chart = draw_line_stack(name, record, z_max, self.size)?;
        log::info!("Showing example graph for '{name}'");
        show_chart(name, chart)?;
        Ok(RenderFlow::Stop)
    }
}
