use std::fs;
use std::io;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use ramhorns::Template;
use spdlog::info;

use crate::post::Post;
use crate::site_builder::INDEX_PAGE;
use crate::text_utils::{canonical_url, format_date_time, format_display_date};

#[derive(ramhorns::Content)]
struct Page<'a> {
    site_title: &'a str,
    site_url: &'a str,
    last_updated: String,
    path: String,
    is_index: bool,
    post_list: Vec<PostItem<'a>>,
}

#[derive(ramhorns::Content)]
struct PostItem<'a> {
    title: &'a str,
    slug: String,
    link: String,
    post_path: String,
    /// Repeated per item so the template can branch on it inside `post_list`.
    is_index: bool,
    author: &'a str,
    has_author_link: bool,
    author_link: &'a str,
    date: String,
    time: String,
    display_date: String,
    has_tags: bool,
    tags: Vec<ViewTag<'a>>,
    has_image: bool,
    image_url: &'a str,
    has_comments: bool,
    comment_url: &'a str,
    comment_count: u32,
    points: u32,
    summary: &'a str,
}

#[derive(ramhorns::Content)]
struct ViewTag<'a> {
    tag: &'a str,
}

/// Site-wide values every page sees.
pub struct PageContext<'a> {
    pub site_title: &'a str,
    pub site_url: &'a str,
    pub last_updated: DateTime<Utc>,
    /// Output-relative path of the page being generated, e.g. `posts/foo.html`.
    pub page_path: &'a str,
}

pub struct PageRenderer<'a> {
    pub template: Template<'a>,
}

impl PageRenderer<'_> {
    pub fn new(page_tpl_src: &str) -> io::Result<PageRenderer> {
        let template = match Template::new(page_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing page template: {}", e)));
            }
        };

        Ok(PageRenderer { template })
    }

    /// Titles, authors, tags and links are escaped by the template; summaries are inserted as-is
    /// when the template uses `{{{summary}}}`.
    pub fn render(&self, posts: &[Post], ctx: &PageContext) -> String {
        let is_index = ctx.page_path == INDEX_PAGE;
        let post_list = posts.iter().map(|post| {
            let header = &post.header;
            let (date, time) = format_date_time(&header.date);
            let slug = header.slug();
            PostItem {
                title: header.title.as_str(),
                link: header.link(ctx.site_url),
                post_path: canonical_url(ctx.site_url, &header.page_path()),
                slug,
                is_index,
                author: header.author.as_str(),
                has_author_link: header.author_link.is_some(),
                author_link: header.author_link.as_deref().unwrap_or(""),
                date,
                time,
                display_date: format_display_date(&header.date),
                has_tags: !header.tags.is_empty(),
                tags: header.tags.iter().map(|t| ViewTag { tag: t.as_str() }).collect(),
                has_image: header.image_url.is_some(),
                image_url: header.image_url.as_deref().unwrap_or(""),
                has_comments: header.comment_url.is_some(),
                comment_url: header.comment_url.as_deref().unwrap_or(""),
                comment_count: header.comment_count,
                points: header.points,
                summary: post.summary.as_str(),
            }
        }).collect();

        self.template.render(&Page {
            site_title: ctx.site_title,
            site_url: ctx.site_url,
            last_updated: ctx.last_updated.format("%Y-%m-%d %H:%M UTC").to_string(),
            path: canonical_url(ctx.site_url, ctx.page_path),
            is_index,
            post_list,
        })
    }

    /// Renders and writes `<output_dir>/<page_path>`, creating parent directories.
    pub fn write_page(&self, output_dir: &Path, posts: &[Post], ctx: &PageContext) -> io::Result<PathBuf> {
        let start = Instant::now();
        let rendered = self.render(posts, ctx);

        let static_page = output_dir.join(ctx.page_path);
        if let Some(directory) = static_page.parent() {
            fs::create_dir_all(directory)?;
        }
        fs::write(&static_page, rendered.as_bytes())?;

        info!("Written {} bytes to {}, cost(ms): {:.2}",
              rendered.len(), static_page.display(), start.elapsed().as_secs_f64() * 1000.0);
        Ok(static_page)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use crate::post::sample_header;
    use crate::test_data::PAGE_TEMPLATE;

    use super::*;

    fn ctx(page_path: &str) -> PageContext {
        PageContext {
            site_title: "Example portfolio",
            site_url: "https://example.org",
            last_updated: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
            page_path,
        }
    }

    fn post(title: &str, date: &str) -> Post {
        Post {
            header: sample_header(title, date),
            summary: format!("<p>{} summary</p>", title),
        }
    }

    #[test]
    fn render_view() {
        let template_src = r##"
TITLE=[{{title}}]
AUTHOR=[{{#has_author_link}}<a href="{{author_link}}">{{/has_author_link}}{{author}}]
DATE=[{{date}} {{time}} {{display_date}}]
TAGS=[{{#tags}}({{tag}}){{/tags}}]
IMAGE=[{{#has_image}}{{image_url}}{{/has_image}}]
COMMENTS=[{{#has_comments}}{{comment_count}}@{{comment_url}}{{/has_comments}}]
LINK=[{{link}} {{post_path}}]
SUMMARY=[{{{summary}}}]"##;
        let template_src = format!("{{{{#post_list}}}}{}{{{{/post_list}}}}", template_src);
        let renderer = PageRenderer::new(&template_src).unwrap();

        let mut header = sample_header("<Tobii> & USB", "2025-11-27 16:45:00");
        header.author = "<Jane>".to_string();
        header.author_link = Some("https://github.com/jane".to_string());
        header.tags = vec!["<rust>".to_string(), "usb".to_string()];
        header.comment_url = Some("https://news.example.com/1".to_string());
        header.comment_count = 4;
        let posts = [Post { header, summary: "<p>trusted</p>".to_string() }];

        let res = renderer.render(&posts, &ctx("posts/tobii-usb.html"));
        assert_eq!(res, r##"
TITLE=[&lt;Tobii&gt; &amp; USB]
AUTHOR=[<a href="https://github.com/jane">&lt;Jane&gt;]
DATE=[2025-11-27 16:45:00 November 27, 2025]
TAGS=[(&lt;rust&gt;)(usb)]
IMAGE=[]
COMMENTS=[4@https://news.example.com/1]
LINK=[https://example.org/#tobii-usb https://example.org/posts/tobii-usb.html]
SUMMARY=[<p>trusted</p>]"##);
    }

    #[test]
    fn test_index_keeps_order() {
        let renderer = PageRenderer::new(PAGE_TEMPLATE).unwrap();
        let posts = [post("B", "2024-06-01 10:00:00"), post("A", "2024-01-01 10:00:00")];
        let res = renderer.render(&posts, &ctx("index.html"));

        let pos_b = res.find("<h2>B</h2>").unwrap();
        let pos_a = res.find("<h2>A</h2>").unwrap();
        assert!(pos_b < pos_a);
        assert!(res.contains(r#"<link rel="canonical" href="https://example.org/">"#));
        assert!(res.contains("<div><p>B summary</p></div>"));
        assert!(res.contains("Last updated 2025-01-02 03:04 UTC"));
    }

    #[test]
    fn test_default_template() {
        let renderer = PageRenderer::new(include_str!("../../res/templates/blog.html")).unwrap();
        let posts = [post("Hello World", "2024-06-01 10:00:00"), post("Older Post", "2024-01-01 10:00:00")];

        let index = renderer.render(&posts, &ctx("index.html"));
        assert!(index.contains(r#"<a href="https://example.org/posts/hello-world.html">Hello World</a>"#));
        assert!(index.contains(r#"<a href="https://example.org/posts/older-post.html">Older Post</a>"#));
        assert!(index.find("Hello World").unwrap() < index.find("Older Post").unwrap());

        let single = renderer.render(&posts[..1], &ctx("posts/hello-world.html"));
        assert!(single.contains("<h2>Hello World</h2>"));
        assert!(!single.contains("Older Post"));
    }

    #[test]
    fn test_write_page_creates_directories() -> io::Result<()> {
        let tmp = tempfile::TempDir::new()?;
        let renderer = PageRenderer::new(PAGE_TEMPLATE)?;
        let posts = [post("Only", "2024-01-01 10:00:00")];

        let written = renderer.write_page(tmp.path(), &posts, &ctx("posts/only.html"))?;
        assert_eq!(written, tmp.path().join("posts").join("only.html"));
        let html = fs::read_to_string(written)?;
        assert!(html.contains(r#"href="https://example.org/posts/only.html""#));
        assert!(html.contains("<h2>Only</h2>"));
        Ok(())
    }

    #[test]
    fn test_invalid_template() {
        assert!(PageRenderer::new("{{#post_list}}unclosed").is_err());
    }
}
