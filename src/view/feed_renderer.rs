use std::io::Cursor;

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::config::SiteContext;
use crate::post::Post;
use crate::text_utils::{escape_html, rfc3339_utc, to_rfc3339};

/* Example
<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Example portfolio</title>
  <id>https://example.org</id>
  <updated>2025-12-10T08:00:00Z</updated>
  <link href="https://example.org/feed.xml" rel="self"/>
  <link href="https://example.org"/>
  <author><name>Jane Doe</name><uri>https://example.org</uri></author>
  <generator>folio</generator>
  <entry>
    <title type="text">Helium Ground-State Energy with DFT</title>
    <id>https://example.org/#helium-ground-state-energy-with-dft</id>
    <link href="https://example.org/#helium-ground-state-energy-with-dft"/>
    <updated>2024-05-18T10:30:00Z</updated>
    <author><name>Jane Doe</name><uri>https://github.com/jane</uri></author>
    <category term="Physics"/>
    <content type="html">&lt;p&gt;...&lt;/p&gt;</content>
  </entry>
</feed>
*/

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

pub struct AtomFeed<'a> {
    pub site: &'a SiteContext,
}

impl<'a> AtomFeed<'a> {
    pub fn new(site: &'a SiteContext) -> Self {
        AtomFeed { site }
    }

    pub fn render(&self, posts: &[Post], updated: DateTime<Utc>) -> quick_xml::Result<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

        let mut feed = BytesStart::new("feed");
        feed.push_attribute(("xmlns", ATOM_NS));
        writer.write_event(Event::Start(feed))?;

        push_text(&mut writer, "title", self.site.title.as_str())?;
        push_text(&mut writer, "id", self.site.url.as_str())?;
        push_text(&mut writer, "updated", &rfc3339_utc(&updated))?;

        let feed_url = self.site.feed_url();
        push_link(&mut writer, &feed_url, Some("self"))?;
        push_link(&mut writer, &self.site.url, None)?;

        let site_author_uri = self.site.author_link.as_deref().unwrap_or(self.site.url.as_str());
        push_author(&mut writer, &self.site.author, site_author_uri)?;
        push_text(&mut writer, "generator", "folio")?;

        for post in posts {
            let header = &post.header;
            writer.write_event(Event::Start(BytesStart::new("entry")))?;

            let mut title = BytesStart::new("title");
            title.push_attribute(("type", "text"));
            writer.write_event(Event::Start(title))?;
            writer.write_event(Event::Text(BytesText::new(header.title.as_str())))?;
            writer.write_event(Event::End(BytesEnd::new("title")))?;

            let link = header.link(&self.site.url);
            push_text(&mut writer, "id", &link)?;
            push_link(&mut writer, &link, None)?;
            push_text(&mut writer, "updated", &to_rfc3339(&header.date))?;

            if let Some(ref author_link) = header.author_link {
                push_author(&mut writer, &header.author, author_link)?;
            }

            for tag in header.tags.iter() {
                let mut category = BytesStart::new("category");
                category.push_attribute(("term", tag.as_str()));
                writer.write_event(Event::Empty(category))?;
            }

            let mut content = BytesStart::new("content");
            content.push_attribute(("type", "html"));
            writer.write_event(Event::Start(content))?;
            writer.write_event(Event::Text(BytesText::new(&entry_content(post))))?;
            writer.write_event(Event::End(BytesEnd::new("content")))?;

            writer.write_event(Event::End(BytesEnd::new("entry")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("feed")))?;

        Ok(writer.into_inner().into_inner())
    }
}

/// Optional lead image followed by the resolved summary.
fn entry_content(post: &Post) -> String {
    match post.header.image_url {
        Some(ref image_url) => format!(
            "<img src=\"{}\" style=\"max-width: 100%; height: auto;\" /><br />{}",
            escape_html(image_url), post.summary),
        None => post.summary.clone(),
    }
}

fn push_text(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str, text: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn push_link(writer: &mut Writer<Cursor<Vec<u8>>>, href: &str, rel: Option<&str>) -> quick_xml::Result<()> {
    let mut link = BytesStart::new("link");
    link.push_attribute(("href", href));
    if let Some(rel) = rel {
        link.push_attribute(("rel", rel));
    }
    writer.write_event(Event::Empty(link))?;
    Ok(())
}

fn push_author(writer: &mut Writer<Cursor<Vec<u8>>>, name: &str, uri: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new("author")))?;
    push_text(writer, "name", name)?;
    push_text(writer, "uri", uri)?;
    writer.write_event(Event::End(BytesEnd::new("author")))?;
    Ok(())
}
