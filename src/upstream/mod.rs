//! Upstream Module
//!
//! Client side of the third-party news API: transport, payload validation
//! and the fetcher that ties them together.

mod article;
mod fetcher;
mod transport;

pub use article::{
    ArticleRecord, ArticleSource, ArticlesPayload, RawArticle, RawArticlesPayload, RawSource,
    RawSourcesPayload, SourceRecord, SourcesPayload, REMOVED_SENTINEL,
};
pub use fetcher::{
    Endpoint, FetchError, NewsFetcher, PageLimits, Pagination, Payload, DEFAULT_PAGE_SIZE,
};
pub use transport::{HttpTransport, TransportError, UpstreamReply, UpstreamTransport};
