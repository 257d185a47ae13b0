//! # Pagination
//!
//! Zero-based page requests and the page envelope returned by list endpoints.
//!
//! ```text
//! GET /products?page=1&size=2      (7 products stored)
//!
//! offset = page × size = 2, limit = 2
//!
//! {
//!   "content": [ p3, p4 ],
//!   "page": { "size": 2, "number": 1, "totalElements": 7, "totalPages": 4 }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::validation::ValidationResult;
use crate::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Which slice of a collection to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl PageRequest {
    /// Builds a request, rejecting a zero or oversized page size.
    pub fn new(page: u32, size: u32) -> ValidationResult<Self> {
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(ValidationError::OutOfRange {
                field: "size".to_string(),
                min: 1,
                max: i64::from(MAX_PAGE_SIZE),
            });
        }
        Ok(PageRequest { page, size })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    /// Number of rows to fetch.
    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Page position and totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub size: u32,
    pub number: u32,
    pub total_elements: u64,
    pub total_pages: u64,
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: PageMetadata,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        let size = u64::from(request.size());
        Page {
            content,
            page: PageMetadata {
                size: request.size(),
                number: request.page(),
                total_elements,
                total_pages: total_elements.div_ceil(size),
            },
        }
    }

    /// An empty page means 204 No Content at the HTTP layer.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Converts the content while keeping the metadata.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_request() {
        let request = PageRequest::default();
        assert_eq!(request.page(), 0);
        assert_eq!(request.size(), 20);
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn test_offset_and_limit() {
        let request = PageRequest::new(3, 25).unwrap();
        assert_eq!(request.offset(), 75);
        assert_eq!(request.limit(), 25);
    }

    #[test]
    fn test_invalid_size() {
        assert!(PageRequest::new(0, 0).is_err());
        assert!(PageRequest::new(0, MAX_PAGE_SIZE + 1).is_err());
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let page = Page::new(vec![1, 2], PageRequest::new(1, 2).unwrap(), 7);
        assert_eq!(page.page.total_pages, 4);
        assert_eq!(page.page.number, 1);

        let empty: Page<i32> = Page::new(vec![], PageRequest::default(), 0);
        assert_eq!(empty.page.total_pages, 0);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_map_and_serialization() {
        let page = Page::new(vec![1, 2], PageRequest::new(0, 2).unwrap(), 2).map(|n| n * 10);
        let json = serde_json::to_value(&page).unwrap();

        assert_eq!(json["content"], serde_json::json!([10, 20]));
        assert_eq!(json["page"]["totalElements"], 2);
        assert_eq!(json["page"]["totalPages"], 1);
    }
}
