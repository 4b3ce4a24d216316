use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    entities::visas::{VisaEntity, VisaOptionEntity},
    value_objects::pagination::PaginationQuery,
};

/// Query string of the public catalog listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VisaListQuery {
    pub country: Option<String>,
    #[serde(rename = "type")]
    pub visa_type: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl VisaListQuery {
    pub fn filter(&self) -> VisaFilter {
        VisaFilter {
            country: non_blank(self.country.as_deref()),
            visa_type: non_blank(self.visa_type.as_deref()),
        }
    }

    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// Case-insensitive substring filters; `None` matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisaFilter {
    pub country: Option<String>,
    pub visa_type: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisaDto {
    pub id: i64,
    pub country: String,
    #[serde(rename = "type")]
    pub visa_type: String,
    pub price: i64,
    pub duration_days: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<VisaEntity> for VisaDto {
    fn from(value: VisaEntity) -> Self {
        Self {
            id: value.id,
            country: value.country,
            visa_type: value.visa_type,
            price: value.price,
            duration_days: value.duration_days,
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisaOptionDto {
    pub id: i64,
    pub visa_id: i64,
    pub name: String,
    pub price: i64,
    pub is_active: bool,
}

impl From<VisaOptionEntity> for VisaOptionDto {
    fn from(value: VisaOptionEntity) -> Self {
        Self {
            id: value.id,
            visa_id: value.visa_id,
            name: value.name,
            price: value.price,
            is_active: value.is_active,
        }
    }
}

/// A visa together with the options a purchase may add to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisaDetailDto {
    pub visa: VisaDto,
    pub options: Vec<VisaOptionDto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_filters_match_everything() {
        let query = VisaListQuery {
            country: Some("  ".to_string()),
            visa_type: Some(" Tourist ".to_string()),
            page: Some(2),
            per_page: None,
        };

        assert_eq!(
            query.filter(),
            VisaFilter {
                country: None,
                visa_type: Some("Tourist".to_string()),
            }
        );
        assert_eq!(query.pagination().page, Some(2));
    }
}
