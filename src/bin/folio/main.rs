use std::env;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use spdlog::{info, warn};

use folio::config::Config;
use folio::logger::configure_logger;
use folio::site_builder::build_site;
use folio::watch::rebuild::BuildCommand;
use folio::watch::snapshot::GlobScanner;
use folio::watch::{watch_targets, Watcher};

use crate::config::open_config;

mod config;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
enum Args {
    /// Builds the site once
    Build(CommonArgs),
    /// Rebuilds the site whenever a watched file changes
    Watch(CommonArgs),
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct CommonArgs {
    /// Path of folio.toml. If empty, it is searched next to the executable,
    /// in the current directory and in the user config directory
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn setup(args: CommonArgs) -> Result<(Config, PathBuf)> {
    let (config, config_path) = open_config(args.config)?;
    if let Err(err) = configure_logger(&config) {
        warn!("Error creating logger sinks. Using console instead. Desc={}", err);
    }
    Ok((config, config_path))
}

fn build_cmd(config: &Config) -> Result<()> {
    info!("Building {} into {}", config.site.title, config.paths.output_dir.display());
    let report = build_site(config)?;
    info!("Done: {} pages, feed {}, {} assets copied",
          report.pages.len(), report.feed.display(), report.assets_copied);
    Ok(())
}

/// Re-runs this executable so every rebuild starts from a fresh configuration.
fn default_build_command(config_path: &Path) -> Result<BuildCommand> {
    let exe = env::current_exe().context("Could not locate the folio executable")?;
    Ok(BuildCommand {
        program: exe.to_string_lossy().into_owned(),
        args: vec!["build".to_string(), "--config".to_string(), config_path.to_string_lossy().into_owned()],
    })
}

fn watch_cmd(config: &Config, config_path: &Path) -> Result<()> {
    let rebuilder = match config.watch.build_command {
        Some(ref argv) => BuildCommand::from_argv(argv)
            .ok_or_else(|| anyhow!("watch.build_command must not be empty"))?,
        None => default_build_command(config_path)?,
    };
    let scanner = GlobScanner::new(&watch_targets(config)).context("Invalid watch pattern")?;

    let stop = Arc::new(AtomicBool::new(false));
    let handler_stop = stop.clone();
    ctrlc::set_handler(move || {
        handler_stop.store(true, Ordering::SeqCst);
    }).context("Could not install the Ctrl+C handler")?;

    let mut watcher = Watcher::new(scanner, rebuilder, Duration::from_secs(config.watch.interval_secs));
    watcher.run(&stop);
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    match args {
        Args::Build(args) => {
            let (config, _) = setup(args)?;
            info!("Starting folio build =-=-=-=-=-=-=-=-=-=-=-=-=-=-=-");
            build_cmd(&config)
        }
        Args::Watch(args) => {
            let (config, config_path) = setup(args)?;
            info!("Starting folio watch =-=-=-=-=-=-=-=-=-=-=-=-=-=-=-");
            watch_cmd(&config, &config_path)
        }
    }
}
