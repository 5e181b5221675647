//! Search request, backend query and search result types.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A comparable property value used for ordering.
///
/// Values of different variants order by variant; this only matters for
/// entities that expose a property with mixed types, which is unusual.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SortValue {
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Integer(i64),
    /// Timestamp value.
    Timestamp(DateTime<Utc>),
    /// Text value.
    Text(String),
}

impl From<&str> for SortValue {
    fn from(s: &str) -> Self {
        SortValue::Text(s.to_string())
    }
}

impl From<String> for SortValue {
    fn from(s: String) -> Self {
        SortValue::Text(s)
    }
}

impl From<i64> for SortValue {
    fn from(n: i64) -> Self {
        SortValue::Integer(n)
    }
}

impl From<bool> for SortValue {
    fn from(b: bool) -> Self {
        SortValue::Bool(b)
    }
}

impl From<DateTime<Utc>> for SortValue {
    fn from(at: DateTime<Utc>) -> Self {
        SortValue::Timestamp(at)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Ascending,
    /// Descending order.
    Descending,
}

impl SortDirection {
    /// The opposite direction.
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// Applies this direction to an ascending comparison.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// A single ordering on a named property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortDirective {
    /// The property to sort by.
    pub property: String,
    /// The sort direction.
    pub direction: SortDirection,
}

impl SortDirective {
    /// Ascending order on `property`.
    pub fn ascending(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: SortDirection::Ascending,
        }
    }

    /// Descending order on `property`.
    pub fn descending(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: SortDirection::Descending,
        }
    }

    /// Parses a sort expression; a leading `-` selects descending order.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if let Some(stripped) = s.strip_prefix('-') {
            Self::descending(stripped.trim())
        } else {
            Self::ascending(s)
        }
    }
}

impl fmt::Display for SortDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            SortDirection::Ascending => write!(f, "{}", self.property),
            SortDirection::Descending => write!(f, "-{}", self.property),
        }
    }
}

/// Restricts a query to part of the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Partition {
    /// Every entity.
    #[default]
    All,
    /// Entities belonging to one group.
    Group(String),
    /// Entities named within one scope.
    Scope(String),
}

/// Backend-neutral description of a query, refined step by step by the
/// search pipeline and executed by a [`QueryableStore`](crate::core::QueryableStore).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityQuery {
    /// Part of the store to consider.
    pub partition: Partition,
    /// Normalized search text, if any.
    pub filter: Option<String>,
    /// User or default ordering.
    pub sort: Vec<SortDirective>,
    /// Deterministic tiebreaker property, applied after `sort`.
    pub tiebreaker: Option<String>,
    /// Number of entities to skip.
    pub offset: usize,
    /// Maximum number of entities to return.
    pub limit: Option<usize>,
}

impl EntityQuery {
    /// A query over every entity.
    pub fn all() -> Self {
        Self::default()
    }

    /// A query over one partition.
    pub fn in_partition(partition: Partition) -> Self {
        Self {
            partition,
            ..Default::default()
        }
    }

    /// Sets the normalized search text.
    pub fn with_filter(mut self, text: impl Into<String>) -> Self {
        self.filter = Some(text.into());
        self
    }

    /// Replaces the ordering.
    pub fn with_sort(mut self, sort: Vec<SortDirective>) -> Self {
        self.sort = sort;
        self
    }

    /// Sets the tiebreaker property.
    pub fn with_tiebreaker(mut self, property: impl Into<String>) -> Self {
        self.tiebreaker = Some(property.into());
        self
    }

    /// Sets the page window.
    pub fn with_window(mut self, offset: usize, limit: Option<usize>) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    /// Full ordering to apply: `sort` followed by the tiebreaker.
    ///
    /// The tiebreaker runs in the direction of the first sort directive, so
    /// that reversing the sort reverses the whole result, ties included.
    pub fn ordering(&self) -> Vec<SortDirective> {
        let mut ordering = self.sort.clone();
        if let Some(tiebreaker) = &self.tiebreaker
            && !ordering.iter().any(|d| &d.property == tiebreaker)
        {
            let direction = ordering
                .first()
                .map(|d| d.direction)
                .unwrap_or_default();
            ordering.push(SortDirective {
                property: tiebreaker.clone(),
                direction,
            });
        }
        ordering
    }
}

/// A caller's search request.
///
/// Page number and page size are 1-based and optional; absent means
/// unbounded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchDescriptor {
    /// Free text to filter by.
    pub search_text: Option<String>,
    /// 1-based page number.
    pub page_number: Option<u32>,
    /// Page size.
    pub page_size: Option<u32>,
    /// Property name to sort by; a leading `-` flips the direction.
    pub sort_expression: Option<String>,
    /// Sort descending.
    pub sort_reverse: bool,
}

impl SearchDescriptor {
    /// An empty request: everything, default order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the search text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(text.into());
        self
    }

    /// Sets page number and size.
    pub fn with_page(mut self, page_number: u32, page_size: u32) -> Self {
        self.page_number = Some(page_number);
        self.page_size = Some(page_size);
        self
    }

    /// Sets the sort expression.
    pub fn with_sort(mut self, expression: impl Into<String>) -> Self {
        self.sort_expression = Some(expression.into());
        self
    }

    /// Requests descending order.
    pub fn reversed(mut self) -> Self {
        self.sort_reverse = true;
        self
    }
}

/// Result of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityQueryResult<E> {
    /// Entities in the partition before filtering.
    pub total_count: u64,
    /// Entities after filtering, before paging.
    pub filtered_count: u64,
    /// The requested page, in order.
    pub results: Vec<E>,
}

impl<E> EntityQueryResult<E> {
    /// An empty result.
    pub fn empty() -> Self {
        Self {
            total_count: 0,
            filtered_count: 0,
            results: Vec::new(),
        }
    }

    /// Number of entities on this page.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns `true` if this page is empty.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Iterates over the page.
    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.results.iter()
    }
}

impl<E> IntoIterator for EntityQueryResult<E> {
    type Item = E;
    type IntoIter = std::vec::IntoIter<E>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}
