// News article file parser.
//
// Each article file starts with a loose header block (SOURCE:, TITLE:,
// PUBLISHED:, ...) followed by free-text body. Headers are inconsistent
// across outlets: dates show up in PUBLISHED, on a line of their own, or not
// at all, and some outlets put the byline in PUBLISHED. The parser is
// forgiving: a malformed header never fails the article, it
// just leaves the field empty.

use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use regex_lite::Regex;
use tracing::warn;

use super::article::{Article, ArticleId};

/// Non-header lines shorter than this are tried as standalone dates. The
/// count is of the raw line: surrounding whitespace and the line break
/// included.
const SHORT_LINE_CHARS: usize = 30;

static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(SOURCE|TITLE|PUBLISHED|AUTHOR|LOCATION|CONTENT)\s*:\s*(.+)")
        .expect("header pattern is valid")
});

static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})\b").expect("iso date pattern is valid")
});

static US_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").expect("us date pattern is valid")
});

static DAY_MONTH_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?\s+([a-z]{3,9})\.?,?\s+(\d{4})\b")
        .expect("day-month date pattern is valid")
});

static MONTH_DAY_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([a-z]{3,9})\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b")
        .expect("month-day date pattern is valid")
});

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// How a single header-block line should be handled.
enum HeaderLine<'a> {
    Field(&'a str, &'a str),
    BodyStart(&'a str),
    Date(NaiveDate),
    Skip,
}

fn classify_line(line: &str) -> HeaderLine<'_> {
    if let Some(caps) = HEADER.captures(line) {
        let (Some(label), Some(value)) = (caps.get(1), caps.get(2)) else {
            return HeaderLine::Skip;
        };
        return HeaderLine::Field(label.as_str(), value.as_str().trim());
    }

    let trimmed = line.trim();
    if trimmed.is_empty() {
        return HeaderLine::Skip;
    }

    if raw_len(line) < SHORT_LINE_CHARS {
        return match parse_publish_date(trimmed) {
            Some(date) => HeaderLine::Date(date),
            None => HeaderLine::Skip,
        };
    }

    HeaderLine::BodyStart(trimmed)
}

/// Character length of a line as read from the file, a `\r\n` break
/// counting as one character.
fn raw_len(line: &str) -> usize {
    let content = line.trim_end_matches(['\r', '\n']);
    content.chars().count() + usize::from(content.len() < line.len())
}

/// Parse an article from its raw text.
///
/// `fallback_source` is used when the header has no SOURCE line, normally
/// the name of the outlet directory the file came from.
pub fn parse_article(id: ArticleId, fallback_source: &str, text: &str) -> Article {
    let mut article = Article {
        id,
        source: String::new(),
        title: String::new(),
        author: String::new(),
        publish_date: None,
        location: String::new(),
        content: String::new(),
    };

    let mut lines = text.split_inclusive('\n');
    let mut body: Vec<&str> = Vec::new();

    for line in lines.by_ref() {
        match classify_line(line) {
            HeaderLine::Field(label, value) => {
                if label.eq_ignore_ascii_case("CONTENT") {
                    if !value.is_empty() {
                        body.push(value);
                    }
                    break;
                }
                apply_field(&mut article, label, value);
            }
            HeaderLine::Date(date) => article.publish_date = Some(date),
            HeaderLine::BodyStart(first) => {
                body.push(first);
                break;
            }
            HeaderLine::Skip => {}
        }
    }

    body.extend(lines.map(str::trim).filter(|l| !l.is_empty()));
    article.content = body.join(" ");

    if article.source.is_empty() {
        article.source = fallback_source.to_string();
    }

    article
}

fn apply_field(article: &mut Article, label: &str, value: &str) {
    match label.to_ascii_uppercase().as_str() {
        "SOURCE" => article.source = value.to_string(),
        "TITLE" => article.title = value.to_string(),
        "LOCATION" => article.location = value.to_string(),
        "AUTHOR" => article.author = value.to_string(),
        "PUBLISHED" => match parse_publish_date(value) {
            Some(date) => article.publish_date = Some(date),
            // Some outlets put the byline in PUBLISHED
            None if article.author.is_empty() => article.author = value.to_string(),
            None => {}
        },
        _ => {}
    }
}

/// Read one article file. Returns `Ok(None)` when the file stem isn't an
/// integer id (README files, editor backups and the like).
pub fn read_article(path: &Path, fallback_source: &str) -> Result<Option<Article>> {
    let Some(id) = path
        .file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.parse::<ArticleId>().ok())
    else {
        warn!(path = %path.display(), "Skipping file without a numeric article id");
        return Ok(None);
    };

    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read article file {}", path.display()))?;
    let text = String::from_utf8_lossy(&bytes);

    Ok(Some(parse_article(id, fallback_source, &text)))
}

/// Find a calendar date somewhere in free text.
///
/// Accepts ISO (`2014/03/25`), day-month-name (`25 March 2014`),
/// month-name-day (`March 25th, 2014`) and US numeric (`3/25/2014`) forms.
/// Surrounding text such as weekdays and times is ignored.
pub fn parse_publish_date(text: &str) -> Option<NaiveDate> {
    if let Some(caps) = ISO_DATE.captures(text) {
        if let Some(date) = ymd(&caps[1], &caps[2], &caps[3]) {
            return Some(date);
        }
    }

    for caps in DAY_MONTH_DATE.captures_iter(text) {
        if let Some(month) = month_number(&caps[2]) {
            if let Some(date) = ymd_with_month(&caps[3], month, &caps[1]) {
                return Some(date);
            }
        }
    }

    for caps in MONTH_DAY_DATE.captures_iter(text) {
        if let Some(month) = month_number(&caps[1]) {
            if let Some(date) = ymd_with_month(&caps[3], month, &caps[2]) {
                return Some(date);
            }
        }
    }

    if let Some(caps) = US_DATE.captures(text) {
        return ymd(&caps[3], &caps[1], &caps[2]);
    }

    None
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    let month: u32 = month.parse().ok()?;
    ymd_with_month(year, month, day)
}

fn ymd_with_month(year: &str, month: u32, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month, day.parse().ok()?)
}

fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    if lower == "sept" {
        return Some(9);
    }
    MONTHS
        .iter()
        .position(|m| lower.len() >= 3 && m.starts_with(&lower))
        .map(|i| i as u32 + 1)
}
