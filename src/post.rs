use std::fmt;
use std::fmt::{Display, Formatter};
use std::io;
use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::text_utils::slugify;
use crate::util::toml_date::TomlDateTime;

/// Link value meaning "this post has no page of its own elsewhere".
pub const PLACEHOLDER_URL: &str = "#";

/// Where the raw content of a post lives.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentRef {
    /// `<content_dir>/<name>/<name>.md`, plus auxiliary assets in the same folder.
    Folder(String),
    /// A single file relative to the content directory.
    File(PathBuf),
    /// Markup given directly in the data source.
    Inline(String),
}

impl Display for ContentRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ContentRef::Folder(name) => write!(f, "{}", name),
            ContentRef::File(path) => write!(f, "{}", path.display()),
            ContentRef::Inline(_) => write!(f, "inline content"),
        }
    }
}

/// One `[[posts]]` table as found in the data file.
#[derive(Deserialize, Debug, Clone)]
pub struct PostEntry {
    pub title: String,
    pub url: Option<String>,
    pub folder: Option<String>,
    pub file: Option<PathBuf>,
    pub inline: Option<String>,
    pub author: String,
    pub author_link: Option<String>,
    pub date: TomlDateTime,
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub comment_url: Option<String>,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub comment_count: u32,
}

/// Validated post metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct PostHeader {
    pub title: String,
    pub url: String,
    pub content: ContentRef,
    pub author: String,
    pub author_link: Option<String>,
    pub date: NaiveDateTime,
    pub image_url: Option<String>,
    pub tags: Vec<String>,
    pub comment_url: Option<String>,
    pub points: u32,
    pub comment_count: u32,
}

pub struct Post {
    pub header: PostHeader,
    /// HTML produced by the content resolver. Trusted, never escaped.
    pub summary: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl TryFrom<PostEntry> for PostHeader {
    type Error = io::Error;

    fn try_from(entry: PostEntry) -> Result<Self, Self::Error> {
        if entry.title.trim().is_empty() {
            return Err(io::Error::new(ErrorKind::InvalidData, "Post without title"));
        }

        let content = match (entry.folder, entry.file, entry.inline) {
            (Some(folder), None, None) => ContentRef::Folder(folder),
            (None, Some(file), None) => ContentRef::File(file),
            (None, None, Some(inline)) => ContentRef::Inline(inline),
            _ => return Err(io::Error::new(
                ErrorKind::InvalidData,
                format!("Post '{}' must have exactly one of folder, file or inline", entry.title))),
        };

        Ok(PostHeader {
            title: entry.title,
            url: non_empty(entry.url).unwrap_or_else(|| PLACEHOLDER_URL.to_string()),
            content,
            author: entry.author,
            author_link: non_empty(entry.author_link),
            date: entry.date.0,
            image_url: non_empty(entry.image_url),
            tags: entry.tags,
            comment_url: non_empty(entry.comment_url),
            points: entry.points,
            comment_count: entry.comment_count,
        })
    }
}

impl PostHeader {
    pub fn slug(&self) -> String {
        slugify(&self.title)
    }

    /// Output-relative path of the post's own page.
    pub fn page_path(&self) -> String {
        format!("posts/{}.html", self.slug())
    }

    /// Explicit URL when one was given, otherwise an anchor on the site's index page.
    pub fn link(&self, site_url: &str) -> String {
        if self.url != PLACEHOLDER_URL {
            self.url.clone()
        } else {
            format!("{}/#{}", site_url.trim_end_matches('/'), self.slug())
        }
    }
}

impl Display for Post {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "title={}, date={}, author={}, content={}, tags={:?}",
               self.header.title,
               self.header.date,
               self.header.author,
               self.header.content,
               self.header.tags,
        )
    }
}

#[cfg(test)]
pub(crate) fn sample_header(title: &str, date: &str) -> PostHeader {
    PostHeader {
        title: title.to_string(),
        url: PLACEHOLDER_URL.to_string(),
        content: ContentRef::Inline(format!("{} body", title)),
        author: "Jane Doe".to_string(),
        author_link: None,
        date: crate::text_utils::parse_date_time(date).unwrap(),
        image_url: None,
        tags: vec![],
        comment_url: None,
        points: 0,
        comment_count: 0,
    }
}
