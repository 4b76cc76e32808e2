#[cfg(test)]
pub const CONFIG_DATA: &str = r#"[site]
title = "Example portfolio"
url = "https://example.org"
author = "Jane Doe"
author_link = "https://example.org/about"

[paths]
posts_file = "posts.toml"
content_dir = "posts/markdown"
template_dir = "templates"
output_dir = "output"
static_dir = "static"
"#;

#[cfg(test)]
pub const POSTS_DATA: &str = r#"[[posts]]
title = "Reverse Engineering an Eye Tracker"
folder = "eye-tracker"
author = "Jane Doe"
author_link = "https://github.com/jane"
date = 2025-11-27T16:45:00
tags = ["Reverse Engineering", "USB"]

[[posts]]
title = "Helium Ground-State Energy with DFT"
url = "https://example.org/dft"
file = "dft.md"
author = "Jane Doe"
date = "2024-05-18 10:30:00"
image_url = "https://example.org/img/helium.png"
comment_url = "https://news.example.com/item?id=1"
points = 12
comment_count = 3

[[posts]]
title = "Notes"
inline = "Short *inline* note."
author = "Jane Doe"
date = 2024-01-02
"#;

#[cfg(test)]
pub const POST_DATA_MD: &str = r#"# Reverse Engineering an Eye Tracker

The device talks over **USB**.

![capture](capture.png)
"#;

#[cfg(test)]
pub const PAGE_TEMPLATE: &str = r#"<html><head><title>{{site_title}}</title><link rel="canonical" href="{{path}}"></head><body>
{{#post_list}}<article id="{{slug}}"><h2>{{title}}</h2>
<p class="meta">{{#has_author_link}}<a href="{{author_link}}">{{author}}</a>{{/has_author_link}}{{^has_author_link}}{{author}}{{/has_author_link}} {{date}}</p>
<ul>{{#tags}}<li>{{tag}}</li>{{/tags}}</ul>
{{#has_image}}<img src="{{image_url}}">{{/has_image}}
{{#has_comments}}<a href="{{comment_url}}">{{comment_count}} comments</a>{{/has_comments}}
<div>{{{summary}}}</div></article>
{{/post_list}}<footer>Last updated {{last_updated}}</footer></body></html>
"#;
