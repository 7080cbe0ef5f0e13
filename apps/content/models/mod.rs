//! Typed records exchanged with the content backend.
//!
//! `Wire*` types mirror the GraphQL payload (relay-style `nodes` / `node`
//! wrappers, camelCase fields). Every field that the backend may null out is
//! an `Option`; records missing an identifying field are dropped one by one
//! during normalization. The plain types (`Post`, `Category`, ...) are what
//! the rest of the crate works with.

pub mod categories;
pub mod pages;
pub mod posts;

use serde::Deserialize;

/// A relay-style list wrapper: `{ "nodes": [...] }`. Null entries are skipped.
#[derive(Debug, Deserialize, Clone)]
pub struct Connection<T> {
    pub nodes: Option<Vec<Option<T>>>,
}

impl<T> Connection<T> {
    /// `None` when the backend sent no `nodes` list at all.
    pub fn nodes(self) -> Option<Vec<T>> {
        self.nodes.map(|nodes| nodes.into_iter().flatten().collect())
    }

    pub fn into_nodes(self) -> Vec<T> {
        self.nodes().unwrap_or_default()
    }
}

/// A relay-style single wrapper: `{ "node": {...} }`.
#[derive(Debug, Deserialize, Clone)]
pub struct Edge<T> {
    pub node: Option<T>,
}

pub(crate) mod date_format {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{Deserialize, Deserializer};

    const LOCAL_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

    /// WordPress emits site-local timestamps without an offset; GMT fields and
    /// other backends use RFC 3339. Offsets are normalized to UTC.
    pub fn parse(value: &str) -> Option<NaiveDateTime> {
        let value = value.trim();
        LOCAL_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
            .or_else(|| {
                DateTime::parse_from_rfc3339(value)
                    .ok()
                    .map(|dt| dt.naive_utc())
            })
    }

    /// Lenient: absent, null and unparseable values all become `None`.
    pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse))
    }

}
