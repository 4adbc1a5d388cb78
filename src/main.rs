use std::process::ExitCode;

use clap::Parser;

use spectral_stack::cli::Args;
use spectral_stack::pipeline::{self, RunSummary};
use spectral_stack::render::{ImageRenderer, InteractiveRenderer};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(&args) {
        Ok(summary) => {
            log::info!(
                "Done: {} hour(s), {} sample(s), {} chart(s)",
                summary.hours,
                summary.samples,
                summary.charts
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<RunSummary> {
    let config = args.load_config()?;
    let options = args.run_options();

    if args.graph_test {
        let mut renderer = InteractiveRenderer::new(config.figure_size);
        pipeline::run(&options, &config, &mut renderer)
    } else {
        let mut renderer = ImageRenderer::new(
            args.data_dir.join(&config.graphs_dir),
            &config.image_extension,
            config.figure_size,
        );
        pipeline::run(&options, &config, &mut renderer)
    }
}
