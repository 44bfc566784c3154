//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Upper bound accepted for any `limit` query parameter.
pub const MAX_LIMIT: usize = 1000;

/// `?limit=` query parameter for list endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LimitParams {
    /// Maximum number of items to return. Omit for the endpoint default.
    #[serde(default)]
    pub limit: Option<usize>,
}

impl LimitParams {
    /// Clamps `limit` to the allowed maximum of [`MAX_LIMIT`].
    #[must_use]
    pub fn clamped(&self) -> Option<usize> {
        self.limit.map(|limit| limit.min(MAX_LIMIT))
    }
}

/// List response with an item count.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListResponse<T> {
    /// Items, newest first.
    pub data: Vec<T>,
    /// Number of items in `data`.
    pub count: usize,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(data: Vec<T>) -> Self {
        let count = data.len();
        Self { data, count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_clamped() {
        let params = LimitParams { limit: Some(50_000) };
        assert_eq!(params.clamped(), Some(MAX_LIMIT));
        assert_eq!(LimitParams::default().clamped(), None);
    }

    #[test]
    fn list_response_counts_items() {
        let list = ListResponse::from(vec![1, 2, 3]);
        assert_eq!(list.count, 3);
    }
}
