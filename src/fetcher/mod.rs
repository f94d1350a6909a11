pub mod alternates;
pub mod client;
pub mod pipeline;
pub mod types;

pub use alternates::generate_alternates;
pub use client::HttpFetcher;
pub use types::FetchedPage;
