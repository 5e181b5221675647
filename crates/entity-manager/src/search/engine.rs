//! The search pipeline.

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::config::ManagerOptions;
use crate::core::{Capability, CapabilityRegistry, LookupNormalizer};
use crate::error::{ManagerError, ManagerResult};
use crate::types::{Entity, EntityQuery, EntityQueryResult, SearchDescriptor};

use super::plan::{PageWindow, resolve_sort};

/// Turns a [`SearchDescriptor`] into a bounded, ordered page.
///
/// Stages, in order:
///
/// 1. `total_count` over the base query
/// 2. backend filter with the normalized search text, when non-blank
/// 3. `filtered_count`
/// 4. backend pre-sort (deterministic tiebreaker)
/// 5. default sort, or the resolved sort expression
/// 6. page window
/// 7. sequential eager loading, when supported
#[derive(Debug, Clone, Default)]
pub struct SearchEngine {
    default_page_size: Option<u32>,
    max_page_size: Option<u32>,
}

impl SearchEngine {
    /// Creates an engine with unbounded default paging.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine using the paging limits in `options`.
    pub fn from_options(options: &ManagerOptions) -> Self {
        Self {
            default_page_size: options.default_page_size,
            max_page_size: options.max_page_size,
        }
    }

    /// Runs the pipeline over `base`.
    #[instrument(skip_all, fields(entity = E::entity_type(), partition = ?base.partition))]
    pub async fn search<E: Entity>(
        &self,
        registry: &CapabilityRegistry<E>,
        normalizer: &dyn LookupNormalizer,
        base: EntityQuery,
        request: &SearchDescriptor,
        cancel: &CancellationToken,
    ) -> ManagerResult<EntityQueryResult<E>> {
        let store = registry.queryable()?;
        // Resolve before touching the store so a bad expression fails fast.
        let sort = resolve_sort::<E>(request)?;

        check_cancelled(cancel)?;
        let total_count = store.count(&base).await?;

        let mut query = base;
        if let Some(text) = request
            .search_text
            .as_deref()
            .filter(|t| !t.trim().is_empty())
        {
            query = store.filter(query, &normalizer.normalize_name(text));
        }

        check_cancelled(cancel)?;
        let filtered_count = store.count(&query).await?;

        query = store.pre_sort(query);
        query = match sort {
            Some(directive) => EntityQuery {
                sort: vec![directive],
                ..query
            },
            None => store.default_sort(query),
        };

        let window = PageWindow::resolve(
            request.page_number,
            request.page_size,
            self.default_page_size,
            self.max_page_size,
        );
        query = query.with_window(window.offset, window.limit);

        check_cancelled(cancel)?;
        let mut results = store.fetch(&query).await?;

        if registry.supports(Capability::EagerLoading) {
            let loader = registry.eager_loading()?;
            // One at a time: the store's unit of work is not safe for concurrent use.
            for entity in results.iter_mut() {
                check_cancelled(cancel)?;
                loader.eager_load(entity).await?;
            }
        }

        debug!(
            total_count,
            filtered_count,
            returned = results.len(),
            offset = window.offset,
            "Search completed"
        );

        Ok(EntityQueryResult {
            total_count,
            filtered_count,
            results,
        })
    }
}

fn check_cancelled(cancel: &CancellationToken) -> ManagerResult<()> {
    if cancel.is_cancelled() {
        return Err(ManagerError::Cancelled { operation: "search" });
    }
    Ok(())
}
