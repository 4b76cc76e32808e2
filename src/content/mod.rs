pub mod content_file;
pub mod content_resolver;
pub mod converter;
pub mod command_converter;
pub mod markdown_converter;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ContentFormat {
    /// Needs a pass through the markup converter.
    Markup,
    /// Already HTML, used verbatim.
    Html,
}
