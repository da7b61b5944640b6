//! Download filenames for typeset documents.

use chrono::{Local, NaiveDateTime};

use crate::layout::PageSize;
use crate::templates::TemplateKey;

pub const DEFAULT_SLUG: &str = "manuscript";
pub const MAX_SLUG_CHARS: usize = 60;

/// Slugify a title: lowercase ASCII alphanumerics separated by single hyphens.
pub fn slugify(title: &str, fallback: &str) -> String {
    let mut result = String::new();
    let mut pending_dash = false;

    for ch in title.chars() {
        if ch == '\'' || ch == '\u{2019}' {
            continue;
        }
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !result.is_empty() {
                result.push('-');
            }
            result.push(ch.to_ascii_lowercase());
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }

    let truncated: String = result.chars().take(MAX_SLUG_CHARS).collect();
    let slug = truncated.trim_matches('-');
    if slug.is_empty() {
        fallback.to_string()
    } else {
        slug.to_string()
    }
}

/// `<slug>_<template>_<size>_<YYYY-MM-DD-HHMM>.pdf`, stamped with the local time.
pub fn build_filename(title: &str, template: TemplateKey, page_size: PageSize) -> String {
    build_filename_at(title, template, page_size, Local::now().naive_local())
}

pub fn build_filename_at(
    title: &str,
    template: TemplateKey,
    page_size: PageSize,
    at: NaiveDateTime,
) -> String {
    format!(
        "{}_{}_{}_{}.pdf",
        slugify(title, DEFAULT_SLUG),
        template.code(),
        page_size.code(),
        at.format("%Y-%m-%d-%H%M")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("My Book!", DEFAULT_SLUG), "my-book");
        assert_eq!(slugify("  The Sailor's   Log -- Vol. 2 ", DEFAULT_SLUG), "the-sailors-log-vol-2");
        assert_eq!(slugify("Ship\u{2019}s", DEFAULT_SLUG), "ships");
        assert_eq!(slugify("!!!", DEFAULT_SLUG), "manuscript");
        assert_eq!(slugify("日本語", DEFAULT_SLUG), "manuscript");
    }

    #[test]
    fn test_slug_truncation_trims_trailing_hyphen() {
        let title = format!("{} {}", "a".repeat(59), "bcd");
        let slug = slugify(&title, DEFAULT_SLUG);
        assert_eq!(slug, "a".repeat(59));
    }

    #[test]
    fn test_build_filename_at() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap();
        let name = build_filename_at("My Book!", TemplateKey::AvantGarde, PageSize::AmazonSixByNine, at);
        assert_eq!(name, "my-book_avant-garde_amazon-6x9_2024-03-07-0905.pdf");
    }
}
