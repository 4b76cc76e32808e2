use std::io;
use std::time::Instant;

use spdlog::{debug, info};

use crate::content::content_resolver::ContentResolver;
use crate::post::Post;
use crate::post_source::PostSource;

/// Loads every post record and attaches its resolved HTML summary.
///
/// Posts are resolved one after the other; the resolver may run external
/// converters and must not be driven from several threads.
pub struct PostRepository<'a> {
    source: &'a dyn PostSource,
    resolver: &'a ContentResolver,
}

impl<'a> PostRepository<'a> {
    pub fn new(source: &'a dyn PostSource, resolver: &'a ContentResolver) -> Self {
        PostRepository { source, resolver }
    }

    /// All posts, newest first. Posts sharing a timestamp keep their source order.
    pub fn get_posts(&self) -> io::Result<Vec<Post>> {
        let headers = self.source.load()?;
        let start = Instant::now();

        let mut posts = Vec::with_capacity(headers.len());
        for header in headers {
            let summary = self.resolver.resolve(&header.content);
            debug!("Resolved '{}' ({} bytes)", header.title, summary.len());
            posts.push(Post { header, summary });
        }

        sort_by_recency(&mut posts);
        info!("Loaded {} posts, cost(ms): {:.2}", posts.len(), start.elapsed().as_secs_f64() * 1000.0);
        Ok(posts)
    }
}

pub fn sort_by_recency(posts: &mut [Post]) {
    // sort_by is stable
    posts.sort_by(|a, b| b.header.date.cmp(&a.header.date));
}
