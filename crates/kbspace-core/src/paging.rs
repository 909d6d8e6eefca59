//! Filtered, paginated listing.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: u32 = 500;

/// A page request: optional substring filter, 1-based page index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub filter: Option<String>,
    pub page_index: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page_index: u32, page_size: u32) -> Self {
        Self {
            filter: None,
            page_index,
            page_size,
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.page_index == 0 {
            return Err(ValidationError::PageIndex(self.page_index));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ValidationError::PageSize {
                got: self.page_size,
                max: MAX_PAGE_SIZE,
            });
        }
        Ok(())
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page_index.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// The filter, if it is non-empty.
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref().filter(|f| !f.is_empty())
    }

    /// Apply this request to an already-filtered, ordered list.
    pub fn paginate<T>(&self, rows: Vec<T>) -> Page<T> {
        let total_records = rows.len() as u64;
        let items = rows
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.page_size as usize)
            .collect();
        Page {
            items,
            total_records,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, 20)
    }
}

/// One page of results plus the total number of matching rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_records: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_is_one_based() {
        assert_eq!(PageRequest::new(1, 10).offset(), 0);
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
    }

    #[test]
    fn test_paginate_keeps_total() {
        let page = PageRequest::new(2, 2).paginate(vec![1, 2, 3, 4, 5]);
        assert_eq!(page.items, vec![3, 4]);
        assert_eq!(page.total_records, 5);
    }

    #[test]
    fn test_validate_bounds() {
        assert!(PageRequest::new(0, 10).validate().is_err());
        assert!(PageRequest::new(1, 0).validate().is_err());
        assert!(PageRequest::new(1, MAX_PAGE_SIZE + 1).validate().is_err());
        assert!(PageRequest::default().validate().is_ok());
    }

    #[test]
    fn test_empty_filter_is_none() {
        assert_eq!(PageRequest::default().with_filter("").filter(), None);
        assert_eq!(PageRequest::default().with_filter("kb").filter(), Some("kb"));
    }
}
