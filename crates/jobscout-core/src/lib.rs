pub mod config;
pub mod logging;

pub mod aggregate;
pub mod browser;
pub mod collector;
pub mod fetcher;
pub mod model;
pub mod pipeline;
pub mod rate_limit;
pub mod report;
pub mod resume;
pub mod retry;
pub mod scoring;
pub mod search_url;
pub mod skills;
pub mod source;
pub mod text;
