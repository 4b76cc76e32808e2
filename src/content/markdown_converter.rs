use std::path::Path;

use markdown::{CompileOptions, Constructs, Options, ParseOptions};

use crate::content::converter::{ConversionError, MarkupConverter};

/// In-process converter: GitHub flavored markdown plus `$`/`$$` math.
pub struct MarkdownConverter {
    options: Options,
}

impl MarkdownConverter {
    pub fn new() -> Self {
        let options = Options {
            parse: ParseOptions {
                constructs: Constructs {
                    math_flow: true,
                    math_text: true,
                    ..Constructs::gfm()
                },
                ..ParseOptions::gfm()
            },
            compile: CompileOptions {
                allow_dangerous_html: true,
                ..CompileOptions::gfm()
            },
        };
        MarkdownConverter { options }
    }
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupConverter for MarkdownConverter {
    fn convert(&self, markup: &str, _base_dir: &Path) -> Result<String, ConversionError> {
        match markdown::to_html_with_options(markup, &self.options) {
            Ok(x) => Ok(x),
            Err(e) => Err(ConversionError(e.reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_data::POST_DATA_MD;

    use super::*;

    #[test]
    fn test_convert() {
        let html = MarkdownConverter::new().convert(POST_DATA_MD, Path::new(".")).unwrap();
        assert_eq!(html, r##"<h1>Reverse Engineering an Eye Tracker</h1>
<p>The device talks over <strong>USB</strong>.</p>
<p><img src="capture.png" alt="capture" /></p>
"##);
    }

    #[test]
    fn test_raw_html_kept() {
        let html = MarkdownConverter::new().convert("<div class=\"note\">kept</div>\n", Path::new(".")).unwrap();
        assert_eq!(html, "<div class=\"note\">kept</div>\n");
    }

    #[test]
    fn test_math() {
        let html = MarkdownConverter::new().convert("Energy $E = mc^2$", Path::new(".")).unwrap();
        assert!(html.contains("E = mc^2"));
        assert!(html.contains("math-inline"));
    }
}
