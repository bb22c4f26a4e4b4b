//! Paging request/response shapes

use serde::{Deserialize, Serialize};

use crate::{Result, StoreWeatherError};

const MAX_PAGE_SIZE: u32 = 100;

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    10
}

/// Query parameters for paged listings
#[derive(Debug, Clone, Deserialize)]
pub struct PagingRequest {
    pub keyword: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for PagingRequest {
    fn default() -> Self {
        Self {
            keyword: None,
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl PagingRequest {
    pub fn validate(&self) -> Result<()> {
        if self.page == 0 {
            return Err(StoreWeatherError::validation("page must be at least 1"));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(StoreWeatherError::validation(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        Ok(())
    }

    /// Number of filtered documents to skip
    #[must_use]
    pub fn skip(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.page_size as usize
    }

    /// Keyword with surrounding whitespace removed, `None` when blank
    #[must_use]
    pub fn keyword(&self) -> Option<&str> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub is_full: bool,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(items: Vec<T>, request: &PagingRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page,
            page_size: request.page_size,
            total,
            is_full: u64::from(request.page) * u64::from(request.page_size) >= total,
        }
    }

    #[must_use]
    pub fn empty(request: &PagingRequest) -> Self {
        Self::new(Vec::new(), request, 0)
    }
}
