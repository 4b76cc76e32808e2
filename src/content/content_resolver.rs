use std::fmt;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

use spdlog::{debug, warn};

use crate::content::content_file::ContentFile;
use crate::content::converter::{ConversionError, MarkupConverter};
use crate::content::ContentFormat;
use crate::post::ContentRef;
use crate::text_utils::escape_html;

/// Why a post's content could not be turned into HTML. Never leaves the
/// resolver: each variant becomes an inline notice in place of the summary.
#[derive(Debug)]
pub enum ResolveError {
    NotFound { identifier: String, err: io::Error },
    Conversion { identifier: String, err: ConversionError },
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::NotFound { identifier, err } => {
                write!(f, "Content file not found: {} - {}", identifier, err)
            }
            ResolveError::Conversion { identifier, err } => {
                write!(f, "Error converting {}: {}", identifier, err)
            }
        }
    }
}

impl ResolveError {
    pub fn fallback_fragment(&self) -> String {
        match self {
            ResolveError::NotFound { identifier, err } => format!(
                "<p class=\"content-error\">Content file not found: {} - {}</p>",
                escape_html(identifier), escape_html(&err.to_string())),
            ResolveError::Conversion { err, .. } => format!(
                "<p class=\"content-error\">Error converting markdown: {}</p>",
                escape_html(&err.0)),
        }
    }
}

pub struct ContentResolver {
    content_dir: PathBuf,
    converter: Box<dyn MarkupConverter>,
}

impl ContentResolver {
    pub fn new(content_dir: &Path, converter: Box<dyn MarkupConverter>) -> Self {
        ContentResolver {
            content_dir: content_dir.to_path_buf(),
            converter,
        }
    }

    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    /// Always yields HTML; failures are logged and replaced by a notice.
    pub fn resolve(&self, content: &ContentRef) -> String {
        match self.try_resolve(content) {
            Ok(html) => html,
            Err(e) => {
                warn!("{}", e);
                e.fallback_fragment()
            }
        }
    }

    pub fn try_resolve(&self, content: &ContentRef) -> Result<String, ResolveError> {
        let identifier = content.to_string();
        let file = ContentFile::load(&self.content_dir, content).map_err(|err| ResolveError::NotFound {
            identifier: identifier.clone(),
            err,
        })?;

        match file.format {
            ContentFormat::Html => {
                debug!("Using {} as HTML", identifier);
                Ok(file.raw_content)
            }
            ContentFormat::Markup => {
                debug!("Converting {} from {}", identifier, file.base_dir.display());
                self.converter.convert(&file.raw_content, &file.base_dir)
                    .map_err(|err| ResolveError::Conversion { identifier, err })
            }
        }
    }
}
