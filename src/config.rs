use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;

pub const CFG_FILE_NAME: &str = "folio.toml";

#[derive(Deserialize, Debug, Clone)]
pub struct Site {
    pub title: String,
    pub url: String,
    pub author: String,
    pub author_link: Option<String>,
    #[serde(default)]
    pub debug: bool,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Paths {
    pub posts_file: PathBuf,
    pub content_dir: PathBuf,
    pub template_dir: PathBuf,
    pub output_dir: PathBuf,
    pub static_dir: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Templates {
    #[serde(default = "default_page_template")]
    pub page: String,
}

impl Default for Templates {
    fn default() -> Self {
        Templates { page: default_page_template() }
    }
}

fn default_page_template() -> String {
    "blog.html".to_string()
}

#[derive(Deserialize, Debug, Copy, Clone, PartialEq, Default)]
pub enum ConverterKind {
    #[default]
    Pandoc,
    Markdown,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Converter {
    #[serde(default)]
    pub kind: ConverterKind,
    #[serde(default = "default_converter_program")]
    pub program: String,
}

impl Default for Converter {
    fn default() -> Self {
        Converter {
            kind: ConverterKind::default(),
            program: default_converter_program(),
        }
    }
}

fn default_converter_program() -> String {
    "pandoc".to_string()
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct WatchTarget {
    pub root: PathBuf,
    pub pattern: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Watch {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    pub build_command: Option<Vec<String>>,
    #[serde(default)]
    pub targets: Vec<WatchTarget>,
}

impl Default for Watch {
    fn default() -> Self {
        Watch {
            interval_secs: default_interval_secs(),
            build_command: None,
            targets: vec![],
        }
    }
}

fn default_interval_secs() -> u64 {
    2
}

#[derive(Deserialize, Debug, Clone)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Copy, Clone, PartialEq)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub site: Site,
    pub paths: Paths,
    #[serde(default)]
    pub templates: Templates,
    #[serde(default)]
    pub converter: Converter,
    #[serde(default)]
    pub watch: Watch,
    pub log: Option<Log>,

    /// Directory holding the configuration file. Relative paths are resolved against it.
    #[serde(skip)]
    pub project_dir: PathBuf,
}

/// Process-wide settings every output stage needs. Built once from [`Config`]
/// and handed to the renderers and the site builder.
#[derive(Debug, Clone)]
pub struct SiteContext {
    pub title: String,
    pub url: String,
    pub author: String,
    pub author_link: Option<String>,
    pub output_dir: PathBuf,
    pub debug: bool,
}

impl SiteContext {
    pub fn from_config(config: &Config) -> SiteContext {
        SiteContext {
            title: config.site.title.clone(),
            url: config.site.url.clone(),
            author: config.site.author.clone(),
            author_link: config.site.author_link.clone(),
            output_dir: config.paths.output_dir.clone(),
            debug: config.site.debug,
        }
    }

    pub fn feed_url(&self) -> String {
        format!("{}/feed.xml", self.url)
    }
}

fn resolve_path(project_dir: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        project_dir.join(path)
    }
}

/// Applies `FOLIO_SITE_URL`, `FOLIO_OUTPUT_DIR` and `FOLIO_DEBUG` on top of the file values.
pub fn apply_env_overrides<F>(cfg: &mut Config, lookup: F)
    where F: Fn(&str) -> Option<String>
{
    if let Some(url) = lookup("FOLIO_SITE_URL") {
        cfg.site.url = url;
    }
    if let Some(dir) = lookup("FOLIO_OUTPUT_DIR") {
        cfg.paths.output_dir = PathBuf::from(dir);
    }
    if let Some(debug) = lookup("FOLIO_DEBUG") {
        cfg.site.debug = matches!(debug.trim(), "1" | "true" | "TRUE" | "yes");
    }
}

pub fn parse_config(cfg_content: &str, project_dir: &Path) -> io::Result<Config> {
    let mut cfg: Config = match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    apply_env_overrides(&mut cfg, |key| env::var(key).ok());

    cfg.site.url = cfg.site.url.trim_end_matches('/').to_string();
    cfg.project_dir = project_dir.to_path_buf();
    cfg.paths = Paths {
        posts_file: resolve_path(project_dir, cfg.paths.posts_file),
        content_dir: resolve_path(project_dir, cfg.paths.content_dir),
        template_dir: resolve_path(project_dir, cfg.paths.template_dir),
        output_dir: resolve_path(project_dir, cfg.paths.output_dir),
        static_dir: cfg.paths.static_dir.map(|p| resolve_path(project_dir, p)),
    };
    if let Some(ref mut log) = cfg.log {
        log.location = log.location.take().map(|p| resolve_path(project_dir, p));
    }
    cfg.watch.targets = cfg.watch.targets.into_iter()
        .map(|t| WatchTarget { root: resolve_path(project_dir, t.root), pattern: t.pattern })
        .collect();

    if cfg.watch.interval_secs == 0 {
        return Err(io::Error::new(ErrorKind::InvalidData, "watch.interval_secs must be greater than zero"));
    }

    Ok(cfg)
}

pub fn read_config(cfg_path: &Path) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    let project_dir = match cfg_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => env::current_dir()?,
    };

    parse_config(&cfg_content, &project_dir)
}

/// Looks for `folio.toml` next to the executable, in the current directory, then in the user config directory.
pub fn find_config_path() -> Option<PathBuf> {
    let mut candidates = vec![];
    if let Ok(exe_path) = env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.push(exe_dir.join(CFG_FILE_NAME));
        }
    }
    if let Ok(cur_dir) = env::current_dir() {
        candidates.push(cur_dir.join(CFG_FILE_NAME));
    }
    if let Some(cfg_dir) = dirs::config_dir() {
        candidates.push(cfg_dir.join("folio").join(CFG_FILE_NAME));
    }

    candidates.into_iter().find(|p| p.exists())
}
