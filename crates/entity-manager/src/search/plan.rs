//! Pure request planning: sort resolution and page windows.

use crate::error::{ManagerError, ManagerResult};
use crate::types::{Entity, SearchDescriptor, SortDirective};

/// Offset and limit derived from a page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// Entities to skip.
    pub offset: usize,
    /// Maximum entities to return; `None` is unbounded.
    pub limit: Option<usize>,
}

impl PageWindow {
    /// Computes the window for `page_number` / `page_size`.
    ///
    /// `default_size` applies when the request has no size and `max_size`
    /// caps whatever size results. Page numbers are 1-based; 0 is read as 1.
    pub fn resolve(
        page_number: Option<u32>,
        page_size: Option<u32>,
        default_size: Option<u32>,
        max_size: Option<u32>,
    ) -> Self {
        let size = match (page_size.or(default_size), max_size) {
            (Some(size), Some(max)) => Some(size.min(max)),
            (None, Some(max)) => Some(max),
            (size, None) => size,
        };

        let Some(size) = size else {
            return Self {
                offset: 0,
                limit: None,
            };
        };

        let page = page_number.unwrap_or(1).max(1);
        let offset = (u64::from(page) - 1).saturating_mul(u64::from(size));
        Self {
            offset: usize::try_from(offset).unwrap_or(usize::MAX),
            limit: Some(size as usize),
        }
    }
}

/// Resolves a request's sort expression against `E`'s sortable properties.
///
/// Returns `None` when the request has no (or a blank) sort expression. A
/// leading `-` flips the request's `sort_reverse` flag. Property names match
/// case-insensitively and resolve to their declared spelling; an unknown name
/// is a configuration error.
pub fn resolve_sort<E: Entity>(request: &SearchDescriptor) -> ManagerResult<Option<SortDirective>> {
    let Some(expression) = request
        .sort_expression
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
    else {
        return Ok(None);
    };

    let parsed = SortDirective::parse(expression);
    let property = E::sort_properties()
        .iter()
        .find(|p| p.eq_ignore_ascii_case(&parsed.property))
        .ok_or_else(|| ManagerError::UnknownSortProperty {
            entity_type: E::entity_type(),
            property: parsed.property.clone(),
        })?;

    let direction = if request.sort_reverse {
        parsed.direction.reversed()
    } else {
        parsed.direction
    };

    Ok(Some(SortDirective {
        property: (*property).to_string(),
        direction,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Probe {
        id: String,
    }

    impl Entity for Probe {
        type Id = String;
        type Detail = ();

        fn id(&self) -> &String {
            &self.id
        }

        fn sort_properties() -> &'static [&'static str] {
            &["name", "createdAt"]
        }
    }

    #[test]
    fn test_window_unbounded() {
        let window = PageWindow::resolve(Some(3), None, None, None);
        assert_eq!(window, PageWindow { offset: 0, limit: None });
    }

    #[test]
    fn test_window_pages() {
        assert_eq!(
            PageWindow::resolve(None, Some(10), None, None),
            PageWindow { offset: 0, limit: Some(10) }
        );
        assert_eq!(
            PageWindow::resolve(Some(3), Some(10), None, None),
            PageWindow { offset: 20, limit: Some(10) }
        );
        assert_eq!(
            PageWindow::resolve(Some(0), Some(10), None, None),
            PageWindow { offset: 0, limit: Some(10) }
        );
    }

    #[test]
    fn test_window_defaults_and_caps() {
        assert_eq!(
            PageWindow::resolve(Some(2), None, Some(25), None),
            PageWindow { offset: 25, limit: Some(25) }
        );
        assert_eq!(
            PageWindow::resolve(Some(2), Some(500), None, Some(100)),
            PageWindow { offset: 100, limit: Some(100) }
        );
        assert_eq!(
            PageWindow::resolve(None, None, None, Some(50)),
            PageWindow { offset: 0, limit: Some(50) }
        );
    }

    #[test]
    fn test_resolve_sort_absent() {
        assert_eq!(resolve_sort::<Probe>(&SearchDescriptor::new()).unwrap(), None);
        let blank = SearchDescriptor::new().with_sort("  ");
        assert_eq!(resolve_sort::<Probe>(&blank).unwrap(), None);
    }

    #[test]
    fn test_resolve_sort_case_insensitive() {
        let request = SearchDescriptor::new().with_sort("CREATEDAT");
        assert_eq!(
            resolve_sort::<Probe>(&request).unwrap(),
            Some(SortDirective::ascending("createdAt"))
        );
    }

    #[test]
    fn test_resolve_sort_dash_flips_reverse() {
        let dash = SearchDescriptor::new().with_sort("-name");
        assert_eq!(
            resolve_sort::<Probe>(&dash).unwrap(),
            Some(SortDirective::descending("name"))
        );

        let dash_reversed = SearchDescriptor::new().with_sort("-name").reversed();
        assert_eq!(
            resolve_sort::<Probe>(&dash_reversed).unwrap(),
            Some(SortDirective::ascending("name"))
        );

        let reversed = SearchDescriptor::new().with_sort("name").reversed();
        assert_eq!(
            resolve_sort::<Probe>(&reversed).unwrap(),
            Some(SortDirective::descending("name"))
        );
    }

    #[test]
    fn test_resolve_sort_unknown_property() {
        let request = SearchDescriptor::new().with_sort("price");
        let err = resolve_sort::<Probe>(&request).unwrap_err();
        assert!(matches!(
            err,
            ManagerError::UnknownSortProperty { ref property, .. } if property == "price"
        ));
    }
}
