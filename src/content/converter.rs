use std::fmt;
use std::fmt::{Display, Formatter};
use std::path::Path;

use crate::config::{Converter, ConverterKind};
use crate::content::command_converter::CommandConverter;
use crate::content::markdown_converter::MarkdownConverter;

/// Diagnostic output of a failed conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionError(pub String);

impl Display for ConversionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ConversionError {}

/// Turns markup text into HTML. `base_dir` is where relative references in
/// the markup (images, includes) are looked up.
pub trait MarkupConverter {
    fn convert(&self, markup: &str, base_dir: &Path) -> Result<String, ConversionError>;
}

pub fn converter_from_config(cfg: &Converter) -> Box<dyn MarkupConverter> {
    match cfg.kind {
        ConverterKind::Pandoc => Box::new(CommandConverter::pandoc(&cfg.program)),
        ConverterKind::Markdown => Box::new(MarkdownConverter::new()),
    }
}
