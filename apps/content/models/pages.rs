use super::date_format;
use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::warn;

/// `slug/date/modified` node returned by the sitemap queries.
#[derive(Debug, Deserialize, Clone)]
pub struct WireSitemapRecord {
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "date_format::deserialize_option")]
    pub date: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "date_format::deserialize_option")]
    pub modified: Option<NaiveDateTime>,
}

impl WireSitemapRecord {
    pub fn into_record(self) -> Option<SitemapRecord> {
        let Some(slug) = self.slug.filter(|slug| !slug.is_empty()) else {
            warn!("Sitemap record without slug, skipping");
            return None;
        };
        Some(SitemapRecord {
            slug,
            date: self.date,
            modified: self.modified,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapRecord {
    pub slug: String,
    pub date: Option<NaiveDateTime>,
    pub modified: Option<NaiveDateTime>,
}

impl SitemapRecord {
    pub fn last_modified(&self) -> Option<NaiveDateTime> {
        self.modified.or(self.date)
    }
}

#[derive(Debug, Deserialize)]
pub struct PagesData {
    pub pages: Option<super::Connection<WireSitemapRecord>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsData {
    pub general_settings: Option<GeneralSettings>,
}

#[derive(Debug, Deserialize)]
pub struct GeneralSettings {
    pub title: Option<String>,
    pub description: Option<String>,
}
