//! Common request query types

/// Pagination query parameters
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct PaginationQuery {
    /// Page number (1-based, default: 1)
    #[serde(default = "default_page")]
    pub page: u32,

    /// Items per page (default: 20, max: 100)
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl PaginationQuery {
    /// Get the offset for database queries
    pub fn offset(&self) -> u64 {
        (self.page.saturating_sub(1)) as u64 * self.limit() as u64
    }

    /// Get the limit (clamped to 1..=100)
    pub fn limit(&self) -> u32 {
        self.per_page.clamp(1, 100)
    }
}

/// Paginated list response
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let q: PaginationQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.page, 1);
        assert_eq!(q.limit(), 20);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn test_pagination_clamps() {
        let q = PaginationQuery {
            page: 3,
            per_page: 500,
        };
        assert_eq!(q.limit(), 100);
        assert_eq!(q.offset(), 200);

        let q = PaginationQuery {
            page: 0,
            per_page: 0,
        };
        assert_eq!(q.limit(), 1);
        assert_eq!(q.offset(), 0);
    }
}
