use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{fs, io};

use serde::Deserialize;

use crate::post::{PostEntry, PostHeader};

/// Anything able to hand over the full, ordered list of post records.
pub trait PostSource {
    fn load(&self) -> io::Result<Vec<PostHeader>>;
}

#[derive(Deserialize)]
struct PostsFile {
    #[serde(default)]
    posts: Vec<PostEntry>,
}

/// Reads `[[posts]]` tables from a TOML data file. The file is re-read on every call.
pub struct TomlPostSource {
    pub path: PathBuf,
}

impl TomlPostSource {
    pub fn new(path: &Path) -> Self {
        TomlPostSource { path: path.to_path_buf() }
    }

    pub fn parse(content: &str) -> io::Result<Vec<PostHeader>> {
        let posts_file: PostsFile = match toml::from_str(content) {
            Ok(x) => x,
            Err(e) => return Err(io::Error::new(ErrorKind::InvalidData, format!("Error parsing post data: {}", e))),
        };

        let mut headers = Vec::with_capacity(posts_file.posts.len());
        for (i, entry) in posts_file.posts.into_iter().enumerate() {
            let header = PostHeader::try_from(entry).map_err(|e| {
                io::Error::new(e.kind(), format!("Post #{}: {}", i + 1, e))
            })?;
            headers.push(header);
        }
        Ok(headers)
    }
}

impl PostSource for TomlPostSource {
    fn load(&self) -> io::Result<Vec<PostHeader>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening post data {}: {}", self.path.display(), e))),
        };
        Self::parse(&content)
    }
}

/// A fixed list of records, for embedding and tests.
pub struct StaticPostSource {
    pub posts: Vec<PostHeader>,
}

impl PostSource for StaticPostSource {
    fn load(&self) -> io::Result<Vec<PostHeader>> {
        Ok(self.posts.clone())
    }
}
