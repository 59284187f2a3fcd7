use anyhow::{Context, Result};
use clap::Parser;
use directories::ProjectDirs;
use std::path::Path;
use std::process;
use wavslice::args::{Cli, Commands};
use wavslice::config::{ConfigFile, PrepConfig};
use wavslice::{driver, storage};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = run() {
        log::error!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(command) = &cli.command {
        match command {
            Commands::Inspect { path } => return inspect(path),
        }
    }

    let mut config = match &cli.config {
        Some(path) => {
            let file = ConfigFile::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            PrepConfig::from_file(file)
        }
        None => load_user_config()?,
    };
    cli.apply_overrides(&mut config);
    log::debug!("Resolved config: {:?}", config);

    let summaries = driver::run_all(&config).context("Failed to prepare sliced data")?;
    for summary in summaries {
        println!(
            "{}: {} windows from {} files -> {}, {}",
            summary.split,
            summary.windows,
            summary.files,
            summary.clean_out.display(),
            summary.noisy_out.display()
        );
    }
    Ok(())
}

fn load_user_config() -> Result<PrepConfig> {
    let Some(proj_dirs) = ProjectDirs::from("org", "wavslice", "wavslice") else {
        return Ok(PrepConfig::default());
    };
    let path = proj_dirs.config_dir().join("config.kdl");
    if !path.exists() {
        return Ok(PrepConfig::default());
    }
    log::info!("Using config {}", path.display());
    let file = ConfigFile::load(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    Ok(PrepConfig::from_file(file))
}

fn inspect(path: &Path) -> Result<()> {
    let dataset = storage::load_dataset(path)
        .with_context(|| format!("Failed to read dataset {}", path.display()))?;
    println!("{} / {}", dataset.channel, dataset.split);
    println!(
        "feat_data: {} x {} (stride {}, minlength {}, {} Hz)",
        dataset.rows, dataset.window_size, dataset.stride, dataset.minlength, dataset.sample_rate
    );
    println!("dfi: {} files", dataset.dfi.len());
    for (i, [begin, end]) in dataset.dfi.iter().take(10).enumerate() {
        println!("  {:>4}: [{}, {})", i, begin, end);
    }
    if dataset.dfi.len() > 10 {
        println!("  ...");
    }
    Ok(())
}
