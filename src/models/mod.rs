//! Request and Response models for the BFF API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{
    HeadlinesQuery, ListBookingsQuery, SearchQuery, SourcesQuery, StatusUpdateRequest, CATEGORIES,
    SORT_OPTIONS,
};
pub use responses::{
    ApiResponse, ClearCacheResponse, HealthResponse, NewsHealthResponse, UpstreamSettings,
};
