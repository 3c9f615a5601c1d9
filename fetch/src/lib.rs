//! Asset fetching for the splash screen.
//!
//! The splash session consumes a single primitive, [`AssetFetcher::fetch`]:
//! an async download of one URL that either yields a [`FetchedAsset`] or a
//! [`FetchError`]. Cancellation is the caller's business: dropping or aborting
//! the returned future stops the work.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`types`] | Configuration and structured errors |
//! | [`http`] | reqwest-backed fetcher with timeout, size cap and image sniffing |
//!
//! # Error Handling
//!
//! All errors are [`FetchError`] with stable [`ErrorCode`] variants, human-readable
//! messages, and `retryable` hints.

mod http;
mod types;

use std::future::Future;
use std::pin::Pin;

pub use http::{HttpFetcher, validate_url};
pub use splash_types::{AssetFormat, FetchedAsset};
pub use types::{ErrorCode, ErrorDetails, FetchError, HttpFetcherConfig};

/// Fetch future type alias.
pub type FetchFut<'a> = Pin<Box<dyn Future<Output = Result<FetchedAsset, FetchError>> + Send + 'a>>;

/// Source of remote assets.
pub trait AssetFetcher: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFut<'a>;
}
