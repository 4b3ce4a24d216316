use serde::{Deserialize, Serialize};

pub const MAX_PER_PAGE: i64 = 100;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    /// Pages start at 1; a page size outside 1..=100 falls back to `default_per_page`.
    pub fn from_query(query: &PaginationQuery, default_per_page: i64) -> Self {
        let page = query.page.filter(|page| *page >= 1).unwrap_or(1);
        let per_page = query
            .per_page
            .filter(|per_page| (1..=MAX_PER_PAGE).contains(per_page))
            .unwrap_or(default_per_page);

        Self { page, per_page }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    pub fn meta(&self, total: i64) -> PaginationMeta {
        let total_pages = if total == 0 {
            0
        } else {
            (total + self.per_page - 1) / self.per_page
        };

        PaginationMeta {
            page: self.page,
            per_page: self.per_page,
            total,
            total_pages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let pagination = Pagination::from_query(
            &PaginationQuery {
                page: Some(0),
                per_page: Some(500),
            },
            10,
        );
        assert_eq!(pagination, Pagination { page: 1, per_page: 10 });
    }

    #[test]
    fn meta_rounds_total_pages_up() {
        let pagination = Pagination::from_query(
            &PaginationQuery {
                page: Some(3),
                per_page: Some(20),
            },
            10,
        );
        assert_eq!(pagination.offset(), 40);
        assert_eq!(pagination.meta(41).total_pages, 3);
        assert_eq!(pagination.meta(0).total_pages, 0);
    }
}
