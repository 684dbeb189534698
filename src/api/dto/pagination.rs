//! Pagination query parameters.

use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};
use validator::Validate;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// `?page=&page_size=`, both optional.
#[serde_as]
#[derive(Debug, Default, Deserialize, Validate)]
pub struct PaginationParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<u32>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    #[validate(range(min = 1, max = 100, message = "page_size must be between 1 and 100"))]
    pub page_size: Option<u32>,
}

impl PaginationParams {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<u32>, page_size: Option<u32>) -> PaginationParams {
        PaginationParams { page, page_size }
    }

    #[test]
    fn test_defaults() {
        let p = params(None, None);
        assert!(p.validate().is_ok());
        assert_eq!(p.page(), 1);
        assert_eq!(p.page_size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_page_zero_is_error() {
        assert!(params(Some(0), None).validate().is_err());
    }

    #[test]
    fn test_page_size_bounds() {
        assert!(params(None, Some(0)).validate().is_err());
        assert!(params(None, Some(1)).validate().is_ok());
        assert!(params(None, Some(MAX_PAGE_SIZE)).validate().is_ok());
        assert!(params(None, Some(MAX_PAGE_SIZE + 1)).validate().is_err());
    }

    #[test]
    fn test_parses_from_strings() {
        let p: PaginationParams =
            serde_json::from_str(r#"{"page": "3", "page_size": "50"}"#).unwrap();
        assert_eq!(p.page(), 3);
        assert_eq!(p.page_size(), 50);
    }
}
