//! Drives one complete build: load and resolve posts, render the index and one
//! page per post, write the Atom feed, then copy post assets and static files.

use std::path::{Path, PathBuf};
use std::time::Instant;
use std::{fs, io};

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use spdlog::{debug, info, warn};

use crate::config::{Config, SiteContext};
use crate::content::content_resolver::ContentResolver;
use crate::content::converter::converter_from_config;
use crate::post::{ContentRef, Post};
use crate::post_repository::PostRepository;
use crate::post_source::{PostSource, TomlPostSource};
use crate::view::feed_renderer::AtomFeed;
use crate::view::page_renderer::{PageContext, PageRenderer};

pub const INDEX_PAGE: &str = "index.html";
pub const FEED_FILE: &str = "feed.xml";
pub const POSTS_DIR: &str = "posts";
pub const STATIC_DIR: &str = "static";

#[derive(Debug)]
pub struct BuildReport {
    pub pages: Vec<PathBuf>,
    pub feed: PathBuf,
    pub assets_copied: usize,
}

pub struct SiteBuilder<'a> {
    pub site: &'a SiteContext,
    pub source: &'a dyn PostSource,
    pub resolver: &'a ContentResolver,
    pub template_path: PathBuf,
    pub static_dir: Option<PathBuf>,
}

/// Wires the configured data source, converter and template into a [`SiteBuilder`] and runs it.
pub fn build_site(config: &Config) -> Result<BuildReport> {
    let site = SiteContext::from_config(config);
    let source = TomlPostSource::new(&config.paths.posts_file);
    let resolver = ContentResolver::new(&config.paths.content_dir, converter_from_config(&config.converter));

    let builder = SiteBuilder {
        site: &site,
        source: &source,
        resolver: &resolver,
        template_path: config.paths.template_dir.join(&config.templates.page),
        static_dir: config.paths.static_dir.clone(),
    };
    builder.build()
}

impl SiteBuilder<'_> {
    pub fn build(&self) -> Result<BuildReport> {
        let start = Instant::now();
        let output_dir = &self.site.output_dir;

        let posts = PostRepository::new(self.source, self.resolver).get_posts()
            .context("Loading posts")?;

        let pages = if posts.is_empty() {
            // pages are skipped, the feed is still written
            warn!("No posts to generate");
            vec![]
        } else {
            self.write_pages(&posts)?
        };

        let feed = self.write_feed(&posts)?;

        let dst_dir = output_dir.join(POSTS_DIR);
        let mut assets_copied = copy_post_assets(self.resolver.content_dir(), &posts, &dst_dir)
            .with_context(|| format!("Copying post assets to {}", dst_dir.display()))?;

        if let Some(ref static_dir) = self.static_dir {
            if static_dir.is_dir() {
                let dst = output_dir.join(STATIC_DIR);
                assets_copied += copy_dir(static_dir, &dst)
                    .with_context(|| format!("Copying {} to {}", static_dir.display(), dst.display()))?;
            } else {
                warn!("Static directory {} does not exist, skipping", static_dir.display());
            }
        }

        info!("Site built in {}: {} pages, {} assets, cost(ms): {:.2}",
              output_dir.display(), pages.len(), assets_copied, start.elapsed().as_secs_f64() * 1000.0);

        Ok(BuildReport { pages, feed, assets_copied })
    }

    fn write_pages(&self, posts: &[Post]) -> Result<Vec<PathBuf>> {
        let template_src = fs::read_to_string(&self.template_path)
            .with_context(|| format!("Error loading page template {}", self.template_path.display()))?;
        let renderer = PageRenderer::new(&template_src)?;
        let last_updated = Utc::now();
        let output_dir = &self.site.output_dir;

        let mut pages = Vec::with_capacity(posts.len() + 1);
        let ctx = PageContext {
            site_title: &self.site.title,
            site_url: &self.site.url,
            last_updated,
            page_path: INDEX_PAGE,
        };
        pages.push(renderer.write_page(output_dir, posts, &ctx)?);

        for post in posts.iter() {
            let page_path = post.header.page_path();
            let ctx = PageContext { page_path: &page_path, ..ctx };
            let single = std::slice::from_ref(post);
            pages.push(renderer.write_page(output_dir, single, &ctx)?);
        }

        Ok(pages)
    }

    fn write_feed(&self, posts: &[Post]) -> Result<PathBuf> {
        let start = Instant::now();
        let rendered = AtomFeed::new(self.site).render(posts, Utc::now())
            .map_err(|e| anyhow!("Error rendering feed: {}", e))?;

        fs::create_dir_all(&self.site.output_dir)?;
        let output_path = self.site.output_dir.join(FEED_FILE);
        fs::write(&output_path, &rendered)
            .with_context(|| format!("Writing {}", output_path.display()))?;

        info!("Written {} bytes to {}, cost(ms): {:.2}",
              rendered.len(), output_path.display(), start.elapsed().as_secs_f64() * 1000.0);
        Ok(output_path)
    }
}

/// Copies everything in each folder post's source directory, except the post
/// markup itself, into `dst_dir`. Existing files are overwritten.
pub fn copy_post_assets(content_dir: &Path, posts: &[Post], dst_dir: &Path) -> io::Result<usize> {
    fs::create_dir_all(dst_dir)?;
    let mut copied = 0;

    for post in posts {
        let ContentRef::Folder(ref folder) = post.header.content else {
            continue;
        };
        let src_dir = content_dir.join(folder);
        if !src_dir.is_dir() {
            continue;
        }

        let primary = format!("{}.md", folder);
        for entry in fs::read_dir(&src_dir)? {
            let entry = entry?;
            if entry.file_name().to_str() == Some(primary.as_str()) {
                continue;
            }
            let dst = dst_dir.join(entry.file_name());
            if entry.file_type()?.is_dir() {
                copied += copy_dir(&entry.path(), &dst)?;
            } else {
                fs::copy(entry.path(), &dst)?;
                copied += 1;
            }
            debug!("Copied {} to {}", entry.path().display(), dst.display());
        }
    }

    Ok(copied)
}

/// Recursive copy that merges into an existing destination. Returns the number of files copied.
pub fn copy_dir(src: &Path, dst: &Path) -> io::Result<usize> {
    fs::create_dir_all(dst)?;
    let mut copied = 0;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            copied += copy_dir(&entry.path(), &dst.join(entry.file_name()))?;
        } else {
            fs::copy(entry.path(), dst.join(entry.file_name()))?;
            copied += 1;
        }
    }

    Ok(copied)
}
