use crate::models::pages::SitemapRecord;
use chrono::NaiveDateTime;
use html_escape::encode_text;
use serde::Serialize;
use tracing::info;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const LASTMOD_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    Daily,
    Weekly,
    Monthly,
}

impl ChangeFrequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapEntry {
    pub url: String,
    pub last_modified: NaiveDateTime,
    pub change_frequency: ChangeFrequency,
    pub priority: f32,
}

/// Inputs for [`build_sitemap`], as returned by the gateway's sitemap queries.
#[derive(Debug, Default)]
pub struct SitemapSources {
    pub posts: Vec<SitemapRecord>,
    pub pages: Vec<SitemapRecord>,
    pub categories: Vec<SitemapRecord>,
}

fn is_excluded_page(slug: &str, excluded: &[String]) -> bool {
    excluded
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(slug))
}

/// Home page first, then posts, pages and categories in source order.
///
/// Pages whose slug is in `excluded_pages` (case-insensitive) are skipped.
/// Records without any date fall back to `now`.
pub fn build_sitemap(
    base_url: &str,
    sources: &SitemapSources,
    excluded_pages: &[String],
    now: NaiveDateTime,
) -> Vec<SitemapEntry> {
    let base_url = base_url.trim_end_matches('/');

    let mut entries = vec![SitemapEntry {
        url: base_url.to_string(),
        last_modified: now,
        change_frequency: ChangeFrequency::Daily,
        priority: 1.0,
    }];

    entries.extend(sources.posts.iter().map(|post| SitemapEntry {
        url: format!("{base_url}/posts/{}", post.slug),
        last_modified: post.last_modified().unwrap_or(now),
        change_frequency: ChangeFrequency::Weekly,
        priority: 0.8,
    }));

    entries.extend(
        sources
            .pages
            .iter()
            .filter(|page| !is_excluded_page(&page.slug, excluded_pages))
            .map(|page| SitemapEntry {
                url: format!("{base_url}/{}", page.slug),
                last_modified: page.last_modified().unwrap_or(now),
                change_frequency: ChangeFrequency::Monthly,
                priority: 0.6,
            }),
    );

    entries.extend(sources.categories.iter().map(|category| SitemapEntry {
        url: format!("{base_url}/categories/{}", category.slug),
        last_modified: now,
        change_frequency: ChangeFrequency::Weekly,
        priority: 0.7,
    }));

    info!(urls = entries.len(), "Sitemap generated");
    entries
}

pub fn render_sitemap_xml(entries: &[SitemapEntry]) -> String {
    let mut xml = String::with_capacity(128 + entries.len() * 192);
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"");
    xml.push_str(SITEMAP_NS);
    xml.push_str("\">\n");

    for entry in entries {
        xml.push_str("  <url>\n    <loc>");
        xml.push_str(&encode_text(&entry.url));
        xml.push_str("</loc>\n    <lastmod>");
        xml.push_str(&entry.last_modified.and_utc().format(LASTMOD_FORMAT).to_string());
        xml.push_str("</lastmod>\n    <changefreq>");
        xml.push_str(entry.change_frequency.as_str());
        xml.push_str("</changefreq>\n    <priority>");
        xml.push_str(&format!("{:.1}", entry.priority));
        xml.push_str("</priority>\n  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}
