pub mod config;
pub mod filter;
pub mod gateway;
pub mod hierarchy;
pub mod models;
pub mod robots;
pub mod server;
pub mod sitemap;

pub use filter::{CategorySelection, ListingView, filter_posts, retain_posts};
pub use gateway::{ContentApi, Fetched, GatewayError};
pub use hierarchy::build_category_hierarchy;
