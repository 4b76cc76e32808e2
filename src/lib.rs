pub mod config;
pub mod content;
pub mod logger;
pub mod post;
pub mod post_repository;
pub mod post_source;
pub mod site_builder;
pub mod text_utils;
pub mod util;
pub mod view;
pub mod watch;
mod test_data;
