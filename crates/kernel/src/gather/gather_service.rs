//! Gather service for executing queries.
//!
//! Provides high-level query execution with:
//! - Descriptor construction with configured page-size limits
//! - Record loading from the record store
//! - Slug lookup scoped by category

use std::sync::Arc;

use tracing::debug;

use super::descriptor::{DescriptorBuilder, parse_query_string};
use super::engine;
use super::error::GatherError;
use super::types::{QueryDescriptor, ResourceKind, ResultPage};
use crate::catalog::category;
use crate::error::{AppError, AppResult};
use crate::models::ListingRecord;
use crate::store::{RecordStore, Records};

/// Service for executing listing queries against the record store.
pub struct GatherService {
    store: Arc<dyn RecordStore>,
    default_limit: i64,
    max_limit: i64,
}

impl GatherService {
    /// Create a new GatherService.
    pub fn new(store: Arc<dyn RecordStore>, default_limit: i64, max_limit: i64) -> Arc<Self> {
        Arc::new(Self {
            store,
            default_limit,
            max_limit,
        })
    }

    /// Descriptor builder preloaded with the configured limits.
    pub fn builder(&self, kind: ResourceKind) -> DescriptorBuilder {
        DescriptorBuilder::new(kind)
            .default_limit(self.default_limit)
            .max_limit(self.max_limit)
    }

    /// Build a descriptor from URL query-string state.
    pub fn descriptor_from_query(
        &self,
        kind: ResourceKind,
        query: &str,
    ) -> Result<QueryDescriptor, GatherError> {
        let params = parse_query_string(query)?;
        Ok(self.builder(kind).params(params)?.build())
    }

    /// Apply the configured page-size cap to a descriptor built elsewhere.
    pub fn clamp(&self, mut descriptor: QueryDescriptor) -> QueryDescriptor {
        if descriptor.pagination.limit > self.max_limit {
            descriptor.pagination.limit = self.max_limit;
        }
        descriptor
    }

    /// Every record of a kind, unfiltered.
    pub async fn fetch_all(&self, kind: ResourceKind) -> AppResult<Records> {
        Ok(self.store.fetch_all(kind).await?)
    }

    /// Load the collection and run the query over it.
    pub async fn execute(&self, descriptor: &QueryDescriptor) -> AppResult<ResultPage> {
        // Reject bad descriptors before touching the store.
        descriptor.pagination.validate()?;

        let records = self.fetch_all(descriptor.kind).await?;
        let page = engine::query(&records, descriptor)?;

        debug!(
            kind = %descriptor.kind,
            filters = descriptor.filters.len(),
            total = page.total_count(),
            returned = page.records.len(),
            "gather query executed"
        );
        Ok(page)
    }

    /// Find an asset by slug.
    ///
    /// Slugs can repeat across categories; pass the category slug from the
    /// URL to pick the right one. Without it, the first match wins.
    pub async fn find_asset(
        &self,
        slug: &str,
        category_slug: Option<&str>,
    ) -> AppResult<ListingRecord> {
        let wanted_category = match category_slug {
            Some(raw) => Some(category::by_slug(raw).ok_or(AppError::NotFound)?.slug),
            None => None,
        };

        let records = self.fetch_all(ResourceKind::Assets).await?;
        records
            .iter()
            .filter(|r| r.slug() == slug)
            .find(|r| {
                wanted_category.is_none_or(|wanted| category::slug_for(r.category()) == wanted)
            })
            .cloned()
            .ok_or(AppError::NotFound)
    }
}
