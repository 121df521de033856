//! Blogicum - a small blogging platform
//!
//! Users publish posts (optionally scheduled, grouped into categories and
//! tagged with a location) and comment on each other's posts. The crate holds
//! the visibility and ownership rules, the paginated listings, the JSON API
//! and the server-rendered pages.

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod policy;
pub mod services;
pub mod theme;
