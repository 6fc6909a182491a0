pub mod client;
pub mod http;

pub use client::{LeaderboardSource, UpstreamConfig};
pub use http::HttpUpstream;
