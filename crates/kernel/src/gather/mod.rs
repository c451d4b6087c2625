//! Gather query engine module.
//!
//! This module provides:
//! - engine::query: pure filter/sort/paginate over an in-memory record set
//! - DescriptorBuilder: query-string and builder construction of descriptors
//! - fields: per-resource field accessor maps
//! - GatherService: runs queries against the record store
//! - Types: QueryDescriptor, FilterPredicate, SortKey, ResultPage, etc.

pub mod descriptor;
mod engine;
mod error;
pub mod fields;
mod gather_service;
pub mod types;

pub use descriptor::{
    DescriptorBuilder, ListingQueryParams, RawFilterValue, descriptor_from_query,
    parse_query_string,
};
pub use engine::query;
pub use error::GatherError;
pub use fields::{FieldKind, FieldMap, FieldSpec};
pub use gather_service::GatherService;
pub use types::{
    DEFAULT_LIMIT, FilterPredicate, FilterValue, Paginate, Pagination, QueryDescriptor,
    ResourceKind, ResultPage, SortKey,
};
