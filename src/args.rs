use crate::config::PrepConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Slices paired clean/noisy speech corpora into fixed-size training windows.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// KDL config file; defaults to the user config directory when present
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub data_folder: Option<PathBuf>,
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
    #[arg(long)]
    pub window_size: Option<usize>,
    #[arg(long)]
    pub stride: Option<f64>,
    #[arg(long)]
    pub minlength: Option<usize>,
    #[arg(long)]
    pub tag: Option<String>,
    /// Scale integer PCM to [-1, 1] instead of keeping raw sample values
    #[arg(long)]
    pub normalize: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the shape and file index of a written dataset
    Inspect { path: PathBuf },
}

impl Cli {
    /// Applies command-line values on top of `config`.
    pub fn apply_overrides(&self, config: &mut PrepConfig) {
        if let Some(dir) = &self.data_folder {
            config.data_folder = dir.clone();
        }
        if let Some(dir) = &self.out_dir {
            config.out_dir = dir.clone();
        }
        if let Some(window_size) = self.window_size {
            config.window_size = window_size;
        }
        if let Some(stride) = self.stride {
            config.stride = stride;
        }
        if let Some(minlength) = self.minlength {
            config.minlength = Some(minlength);
        }
        if let Some(tag) = &self.tag {
            config.tag = tag.clone();
        }
        if self.normalize {
            config.normalize = true;
        }
    }
}
