use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use folio::config::{find_config_path, read_config, Config};

/// Reads the configuration and returns it with the absolute path it came from.
pub(crate) fn open_config(cfg_path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let config_path = match cfg_path.or_else(find_config_path) {
        Some(path) => path,
        None => return Err(anyhow!("Could not find folio.toml in the executable directory, \
                                    the current directory or the user config directory")),
    };
    let config_path = if config_path.is_absolute() {
        config_path
    } else {
        env::current_dir()?.join(config_path)
    };

    println!("Reading config from {}", config_path.display());
    let config = read_config(&config_path)
        .with_context(|| format!("Could not load {}", config_path.display()))?;

    match config.log {
        Some(ref log) => match log.location {
            Some(ref location) => println!("Log enabled. Files will be written in {}", location.display()),
            None => println!("Log enabled. Files will be written in the user cache directory"),
        },
        None => println!("Log file disabled. Using stdout"),
    }

    Ok((config, config_path))
}
