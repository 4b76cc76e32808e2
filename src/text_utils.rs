use std::ops::Index;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DATE_TIME_REGEX: Regex = Regex::new(
        r#"^(\d{4})-(\d{1,2})-(\d{1,2})[ T](\d{1,2}):(\d{1,2}):(\d{1,2})(?:\.(\d{1,9}))?$"#
    ).unwrap();
    static ref SLUG_SEPARATOR_REGEX: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
}

fn to_int<T: std::str::FromStr>(num_str: &str, date_str: &str) -> Result<T, String> {
    match num_str.parse::<T>() {
        Ok(x) => Ok(x),
        Err(_) => Err(format!("Error parsing {} from the date {}", num_str, date_str)),
    }
}

pub fn parse_date_time(buf: &str) -> Result<NaiveDateTime, String> {
    let buf = buf.trim();
    let Some(caps) = DATE_TIME_REGEX.captures(buf) else {
        return match buf.parse::<NaiveDate>() {
            Ok(date) => Ok(NaiveDateTime::new(date, NaiveTime::default())),
            Err(_) => Err(format!("Unable to parse date time {}", buf)),
        };
    };

    let to_i32 = |num_str: &str| to_int::<i32>(num_str, buf);
    let to_u32 = |num_str: &str| to_int::<u32>(num_str, buf);

    let y: i32 = to_i32(caps.index(1))?;
    let m: u32 = to_u32(caps.index(2))?;
    let d: u32 = to_u32(caps.index(3))?;
    let h: u32 = to_u32(caps.index(4))?;
    let mn: u32 = to_u32(caps.index(5))?;
    let s: u32 = to_u32(caps.index(6))?;

    let date = NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| format!("Invalid date in {}", buf))?;
    // pad to nanoseconds: ".123" is 123_000_000
    let nano: u32 = match caps.get(7) {
        Some(frac) => to_u32(&format!("{:0<9}", frac.as_str()))?,
        None => 0,
    };
    let time = NaiveTime::from_hms_nano_opt(h, mn, s, nano)
        .ok_or_else(|| format!("Invalid time in {}", buf))?;

    Ok(NaiveDateTime::new(date, time))
}

pub fn format_date_time(date_time: &NaiveDateTime) -> (String, String) {
    let date = date_time.format("%Y-%m-%d").to_string();
    let time = date_time.format("%H:%M:%S").to_string();
    (date, time)
}

/// `October 6, 2025`
pub fn format_display_date(date_time: &NaiveDateTime) -> String {
    date_time.format("%B %-d, %Y").to_string()
}

/// Post dates carry no offset and are taken as UTC.
pub fn to_rfc3339(date_time: &NaiveDateTime) -> String {
    rfc3339_utc(&Utc.from_utc_datetime(date_time))
}

pub fn rfc3339_utc(date_time: &DateTime<Utc>) -> String {
    date_time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// URL-safe identifier: transliterated to ASCII, lowercased, every run of
/// non-alphanumerics collapsed into one `-`, no leading or trailing `-`.
pub fn slugify(title: &str) -> String {
    let ascii = unidecode::unidecode(title).to_ascii_lowercase();
    let slug = SLUG_SEPARATOR_REGEX.replace_all(&ascii, "-");
    slug.trim_matches('-').to_string()
}

/// Joins an output-relative page path onto the site base URL. `index.html`
/// maps to the directory URL.
pub fn canonical_url(site_url: &str, page_path: &str) -> String {
    let base = site_url.trim_end_matches('/');
    let page_path = page_path.trim_start_matches('/');
    let page_path = page_path.strip_suffix("index.html").unwrap_or(page_path);
    format!("{}/{}", base, page_path)
}

pub fn escape_html(text: &str) -> String {
    quick_xml::escape::escape(text).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_time() {
        let date_time = parse_date_time("2017-09-10 10:42:32.123").unwrap();
        let (date, time) = format_date_time(&date_time);
        assert_eq!(date, "2017-09-10");
        assert_eq!(time, "10:42:32");

        let date_time = parse_date_time("2017-09-10T10:42:32").unwrap();
        let (date, time) = format_date_time(&date_time);
        assert_eq!(date, "2017-09-10");
        assert_eq!(time, "10:42:32");

        let date_time = parse_date_time("2017-09-10").unwrap();
        let (date, time) = format_date_time(&date_time);
        assert_eq!(date, "2017-09-10");
        assert_eq!(time, "00:00:00");
    }

    #[test]
    fn test_parse_fractional_seconds() {
        let date_time = parse_date_time("2025-10-06T12:19:00.123456").unwrap();
        assert_eq!(date_time.and_utc().timestamp_subsec_micros(), 123456);
        assert_eq!(format_date_time(&date_time).1, "12:19:00");

        let date_time = parse_date_time("2025-10-06 12:19:00.5").unwrap();
        assert_eq!(date_time.and_utc().timestamp_subsec_millis(), 500);
        assert!(parse_date_time("2025-10-06 12:19:00.1234567890").is_err());
    }

    #[test]
    fn test_parse_date_time_invalid() {
        assert!(parse_date_time("yesterday").is_err());
        assert!(parse_date_time("2017-13-10 10:42:32").is_err());
        assert!(parse_date_time("2017-09-10 25:42:32").is_err());
    }

    #[test]
    fn test_display_date_and_rfc3339() {
        let date_time = parse_date_time("2025-10-06 12:19:00").unwrap();
        assert_eq!(format_display_date(&date_time), "October 6, 2025");
        assert_eq!(to_rfc3339(&date_time), "2025-10-06T12:19:00Z");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Helium Ground-State Energy with DFT"), "helium-ground-state-energy-with-dft");
        assert_eq!(slugify("  Arduino-CNN: Hand-Drawn Digit Classifier!! "), "arduino-cnn-hand-drawn-digit-classifier");
        assert_eq!(slugify("Post title of mine ábaco - dir2"), "post-title-of-mine-abaco-dir2");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn test_slugify_idempotent() {
        for title in ["Document Editor with GTK4 and Skia From Scratch", "C++ & Rust -- notes", "ÉTÉ"] {
            let once = slugify(title);
            assert_eq!(slugify(&once), once);
            assert_eq!(slugify(title), once);
        }
    }

    #[test]
    fn test_canonical_url() {
        assert_eq!(canonical_url("https://example.org", "index.html"), "https://example.org/");
        assert_eq!(canonical_url("https://example.org/", "posts/a-post.html"), "https://example.org/posts/a-post.html");
        assert_eq!(canonical_url("https://example.org", "/posts/index.html"), "https://example.org/posts/");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a & b>"), "&lt;a &amp; b&gt;");
    }
}
