mod fetcher;
mod registry;

pub use fetcher::FeedFetcher;
pub use registry::{default_sources, Source, SourceConfig, SourceRegistry};
