pub mod feed_renderer;
pub mod page_renderer;
