use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::config::{Config, Layout};
use crate::pipeline::RunOptions;

/// Normalise hourly spectral measurements against a control sample and plot
/// one 3D line stack per sample.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory containing the raw results files
    pub data_dir: PathBuf,

    /// Name of the control sample (row that will be subtracted from the others)
    pub control: String,

    /// Number of consecutively numbered samples sharing one chart scale
    pub group_size: Option<u32>,

    /// Don't save results or graphs, instead show an example graph
    #[arg(long, visible_alias = "test")]
    pub graph_test: bool,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Input layout, overriding the configuration
    #[arg(long, value_enum)]
    pub layout: Option<Layout>,
}

impl Args {
    /// Defaults, then the config file, then command line overrides.
    pub fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => {
                log::info!("Loading config from {}", path.display());
                Config::read_config_file(path)?
            }
            None => Config::default(),
        };
        if let Some(layout) = self.layout {
            config.layout = layout;
        }
        Ok(config)
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            data_dir: self.data_dir.clone(),
            control: self.control.clone(),
            group_size: self.group_size,
            graph_test: self.graph_test,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_arguments() {
        let args = Args::try_parse_from(["spectral-stack", "data", "Blank", "5"]).unwrap();
        assert_eq!(args.data_dir, PathBuf::from("data"));
        assert_eq!(args.control, "Blank");
        assert_eq!(args.group_size, Some(5));
        assert!(!args.graph_test);

        let options = args.run_options();
        assert_eq!(options.group_size, Some(5));
    }

    #[test]
    fn test_flag_and_layout_override() {
        let args =
            Args::try_parse_from(["spectral-stack", "--test", "--layout", "wide", "data", "Blank"])
                .unwrap();
        assert!(args.graph_test);
        assert_eq!(args.group_size, None);
        assert_eq!(args.load_config().unwrap().layout, Layout::Wide);
    }

    #[test]
    fn group_size_must_be_a_number() {
        assert!(Args::try_parse_from(["spectral-stack", "data", "Blank", "five"]).is_err());
    }
}
