use crate::db::Pagination;
use crate::errors::ServiceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use validator::Validate;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ServiceError> {
    input
        .validate()
        .map_err(|e| ServiceError::ValidationError(format!("Validation failed: {}", e)))
}

/// Page settings applied when a request does not name them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDefaults {
    pub per_page: u64,
    pub max_per_page: u64,
}

impl PageDefaults {
    pub fn resolve(&self, page: Option<u64>, per_page: Option<u64>) -> Pagination {
        Pagination::new(
            page.unwrap_or(1),
            per_page.unwrap_or(self.per_page),
            self.max_per_page,
        )
    }

    /// Read `page` and `per_page` out of raw query pairs; the last occurrence wins
    pub fn from_pairs(&self, pairs: &[(String, String)]) -> Result<Pagination, ServiceError> {
        let mut page = None;
        let mut per_page = None;
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "page" => &mut page,
                "per_page" => &mut per_page,
                _ => continue,
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            *slot = Some(value.parse::<u64>().map_err(|_| {
                ServiceError::ValidationError(format!(
                    "invalid value '{}' for '{}': expected a non-negative integer",
                    value, key
                ))
            })?);
        }
        Ok(self.resolve(page, per_page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_absent() {
        let defaults = PageDefaults {
            per_page: 50,
            max_per_page: 500,
        };
        let pagination = defaults.from_pairs(&pairs(&[("flavor", "Mint")])).unwrap();
        assert_eq!(pagination, Pagination::new(1, 50, 500));
    }

    #[test]
    fn explicit_values_are_clamped() {
        let defaults = PageDefaults {
            per_page: 50,
            max_per_page: 500,
        };
        let pagination = defaults
            .from_pairs(&pairs(&[("page", "0"), ("per_page", "9000")]))
            .unwrap();
        assert_eq!(pagination.page(), 1);
        assert_eq!(pagination.per_page(), 500);
    }

    #[test]
    fn non_numeric_page_is_rejected() {
        let defaults = PageDefaults {
            per_page: 3,
            max_per_page: 500,
        };
        assert!(matches!(
            defaults.from_pairs(&pairs(&[("page", "two")])),
            Err(ServiceError::ValidationError(_))
        ));
    }
}
