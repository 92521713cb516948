use serde::{Deserialize, Serialize};

/// Zero-based page selector sent as `page`/`size` query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub const fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    pub const fn first(size: u32) -> Self {
        Self { page: 0, size }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(10)
    }
}

/// Page content plus the paging metadata returned by list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub size: u32,
}

impl<T> Page<T> {
    pub fn is_last(&self) -> bool {
        self.total_pages == 0 || self.number + 1 >= self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerates_missing_metadata() {
        let page: Page<u32> = serde_json::from_str(r#"{"content":[1,2,3]}"#).expect("decodes");
        assert_eq!(page.content, vec![1, 2, 3]);
        assert_eq!(page.total_pages, 0);
        assert!(page.is_last());
    }

    #[test]
    fn knows_when_more_pages_follow() {
        let page: Page<u32> =
            serde_json::from_str(r#"{"content":[],"totalPages":3,"totalElements":25,"number":1,"size":10}"#)
                .expect("decodes");
        assert!(!page.is_last());
    }
}
