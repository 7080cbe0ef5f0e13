//! Category selection and the derived post listing.
//!
//! [`filter_posts`] and [`retain_posts`] are the filter engine used by the
//! gateway and the HTTP handlers. [`ListingView`] is the state object a
//! consumer holds for one listing between loads.

use crate::models::{categories::CategoryNode, posts::Post};
use std::{convert::Infallible, fmt, str::FromStr};
use tracing::debug;

/// Sentinel accepted from query strings for "no category filter".
pub const ALL_CATEGORIES: &str = "all";

/// Category selection of a listing view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategorySelection {
    #[default]
    All,
    Category(String),
}

impl CategorySelection {
    pub fn select(&mut self, slug: impl Into<String>) {
        *self = Self::Category(slug.into());
    }

    pub fn select_all(&mut self) {
        *self = Self::All;
    }

    pub fn slug(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Category(slug) => Some(slug.as_str()),
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        match self {
            Self::All => true,
            Self::Category(slug) => post.in_category(slug),
        }
    }
}

impl FromStr for CategorySelection {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case(ALL_CATEGORIES) {
            Ok(Self::All)
        } else {
            Ok(Self::Category(s.to_string()))
        }
    }
}

impl From<Option<&str>> for CategorySelection {
    fn from(value: Option<&str>) -> Self {
        value.map_or(Self::All, |s| s.parse().unwrap_or_default())
    }
}

impl fmt::Display for CategorySelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug().unwrap_or(ALL_CATEGORIES))
    }
}

/// Stable subsequence of `posts` matching `selection`, minus `exclude_slug`.
///
/// Posts with no category data never match a specific category but always
/// pass under [`CategorySelection::All`].
pub fn filter_posts<'a, I>(
    posts: I,
    selection: &CategorySelection,
    exclude_slug: Option<&str>,
) -> Vec<&'a Post>
where
    I: IntoIterator<Item = &'a Post>,
{
    posts
        .into_iter()
        .filter(|post| is_visible(post, selection, exclude_slug))
        .collect()
}

/// Owned form of [`filter_posts`]: keeps the matching posts in place.
pub fn retain_posts(
    posts: &mut Vec<Post>,
    selection: &CategorySelection,
    exclude_slug: Option<&str>,
) {
    posts.retain(|post| is_visible(post, selection, exclude_slug));
}

fn is_visible(post: &Post, selection: &CategorySelection, exclude_slug: Option<&str>) -> bool {
    selection.matches(post) && exclude_slug != Some(post.slug.as_str())
}

/// Handed out by [`ListingView::begin_load`]; only the latest one may apply data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

/// State owned by one listing view: resident data plus selection.
///
/// The visible list is always derived from the current state and never
/// stored, so changing posts, selection or exclusion is immediately reflected.
#[derive(Debug, Default)]
pub struct ListingView {
    posts: Vec<Post>,
    categories: Vec<CategoryNode>,
    selection: CategorySelection,
    exclude_slug: Option<String>,
    latest_ticket: u64,
    loaded: bool,
}

impl ListingView {
    pub fn new(exclude_slug: Option<String>) -> Self {
        Self {
            exclude_slug,
            ..Self::default()
        }
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest_ticket += 1;
        LoadTicket(self.latest_ticket)
    }

    /// Applies fetched data if `ticket` is the most recently issued one.
    /// Responses to superseded requests are dropped and `false` is returned.
    pub fn apply_load(
        &mut self,
        ticket: LoadTicket,
        posts: Vec<Post>,
        categories: Vec<CategoryNode>,
    ) -> bool {
        if ticket.0 != self.latest_ticket {
            debug!(
                ticket = ticket.0,
                latest = self.latest_ticket,
                "Dropping stale listing response"
            );
            return false;
        }
        self.posts = posts;
        self.categories = categories;
        self.loaded = true;
        true
    }

    pub fn is_loading(&self) -> bool {
        !self.loaded
    }

    pub fn select(&mut self, slug: impl Into<String>) {
        self.selection.select(slug);
    }

    pub fn select_all(&mut self) {
        self.selection.select_all();
    }

    pub fn set_exclude_slug(&mut self, exclude_slug: Option<String>) {
        self.exclude_slug = exclude_slug;
    }

    /// Back to the initial state of a freshly mounted view.
    pub fn reset(&mut self) {
        self.selection = CategorySelection::All;
    }

    pub fn selection(&self) -> &CategorySelection {
        &self.selection
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn categories(&self) -> &[CategoryNode] {
        &self.categories
    }

    pub fn visible_posts(&self) -> Vec<&Post> {
        filter_posts(&self.posts, &self.selection, self.exclude_slug.as_deref())
    }
}
