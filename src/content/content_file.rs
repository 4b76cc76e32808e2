use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{fs, io};

use crate::content::ContentFormat;
use crate::post::ContentRef;

/// Raw post content together with the directory its relative references point into.
pub struct ContentFile {
    pub file_path: Option<PathBuf>,
    pub base_dir: PathBuf,
    pub format: ContentFormat,
    pub raw_content: String,
}

impl ContentFile {
    /// Path of the primary content file, `None` for inline content.
    pub fn locate(content_dir: &Path, content: &ContentRef) -> Option<PathBuf> {
        match content {
            ContentRef::Folder(name) => Some(content_dir.join(name).join(format!("{}.md", name))),
            ContentRef::File(path) => Some(content_dir.join(path)),
            ContentRef::Inline(_) => None,
        }
    }

    pub fn load(content_dir: &Path, content: &ContentRef) -> io::Result<ContentFile> {
        if let ContentRef::Inline(text) = content {
            return Ok(ContentFile {
                file_path: None,
                base_dir: content_dir.to_path_buf(),
                format: ContentFormat::Markup,
                raw_content: text.clone(),
            });
        }

        let Some(file_path) = Self::locate(content_dir, content) else {
            return Err(io::Error::new(ErrorKind::InvalidInput, format!("No content file for {}", content)));
        };

        let raw_content = fs::read_to_string(&file_path)?;
        let base_dir = file_path.parent().unwrap_or(content_dir).to_path_buf();
        let format = Self::guess_type(&file_path);

        Ok(ContentFile {
            file_path: Some(file_path),
            base_dir,
            format,
            raw_content,
        })
    }

    fn guess_type(file_name: &Path) -> ContentFormat {
        match file_name.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm") => ContentFormat::Html,
            _ => ContentFormat::Markup,
        }
    }
}
