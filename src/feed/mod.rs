//! Collection feed access: fetching archive search pages and parsing them.
//!
//! - [`parser`] turns RSS/MRSS text into [`VideoRecord`]s, degrading instead of failing
//! - [`fetcher`] builds the search URL and performs the single GET per page
//!
//! # Example
//!
//! ```ignore
//! use reel::feed::{build_http_client, ArchiveClient, DEFAULT_COLLECTION};
//!
//! let endpoint = url::Url::parse(reel::feed::DEFAULT_ENDPOINT)?;
//! let client = ArchiveClient::new(build_http_client()?, endpoint, DEFAULT_COLLECTION);
//! let records = client.fetch_page(1).await?;
//! ```

mod fetcher;
mod parser;

pub use fetcher::{
    build_http_client, ArchiveClient, FetchError, DEFAULT_COLLECTION, DEFAULT_ENDPOINT, PAGE_SIZE,
};
pub use parser::{parse_feed, VideoRecord, MRSS_NAMESPACE};
