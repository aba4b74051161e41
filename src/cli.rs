//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::params::{AnalysisConfig, RenderConfig};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "Wavescroll")]
#[command(about = "Scrolling bar-graph audio visualizer", long_about = None)]
pub struct Args {
    /// WAV file to play and visualize
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Number of envelope bars computed across the track
    #[arg(long, value_name = "COUNT", default_value_t = 1024)]
    pub bars: usize,

    /// Horizontal pitch between bars (pixels)
    #[arg(long, value_name = "PIXELS", default_value_t = 5)]
    pub bar_pitch: u32,
}

impl Args {
    /// Analysis parameters from command-line arguments
    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig { bars: self.bars }
    }

    /// Rendering parameters from command-line arguments
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            bar_pitch_px: self.bar_pitch,
            ..RenderConfig::default()
        }
    }
}
