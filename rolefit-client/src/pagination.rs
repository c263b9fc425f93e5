use serde::{Deserialize, Serialize};

/// Paginated listing as returned by every `list` endpoint that accepts
/// `page` / `page_size`. The echoed values are kept exactly as sent back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// Number of pages needed for `total` items at the echoed page size.
    pub fn page_count(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.page_size))
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.page_count()
    }
}

/// Unpaged listing: `{total, items}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing<T> {
    pub total: u64,
    pub items: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_echo_preserved() {
        let page: Page<u32> = serde_json::from_str(
            r#"{"total":35,"page":2,"page_size":10,"items":[11,12,13]}"#,
        )
        .unwrap();
        assert_eq!(page.page, 2);
        assert_eq!(page.page_size, 10);
        assert_eq!(page.total, 35);
        assert_eq!(page.page_count(), 4);
        assert!(page.has_next());
    }

    #[test]
    fn test_last_page() {
        let page = Page::<u8> { total: 35, page: 4, page_size: 10, items: vec![] };
        assert!(!page.has_next());
        let empty = Page::<u8> { total: 0, page: 1, page_size: 0, items: vec![] };
        assert_eq!(empty.page_count(), 0);
    }
}
