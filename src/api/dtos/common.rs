use serde::Serialize;
use utoipa::ToSchema;

/// Standard success envelope used by every module except the AI model
/// configuration endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }
}

/// Envelope used by the AI model configuration endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct AiResponse<T: Serialize> {
    pub code: u16,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> AiResponse<T> {
    pub fn new(code: u16, message: impl Into<String>, data: T) -> Self {
        Self {
            code,
            message: message.into(),
            data,
        }
    }
}

#[derive(Debug, serde::Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl PaginationParams {
    /// Clamps to sane bounds so a hostile query cannot ask for page 0 or a
    /// million rows.
    pub fn limit_offset(&self) -> (i64, i64) {
        let page = self.page.max(1);
        let limit = self.page_size.clamp(1, 100);
        (limit, (page - 1) * limit)
    }

    pub fn page(&self) -> i64 {
        self.page.max(1)
    }

    pub fn page_size(&self) -> i64 {
        self.page_size.clamp(1, 100)
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Paged<T: Serialize> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T: Serialize> Paged<T> {
    pub fn new(items: Vec<T>, total: i64, params: &PaginationParams) -> Self {
        let page_size = params.page_size();
        Self {
            items,
            total,
            page: params.page(),
            page_size,
            total_pages: (total + page_size - 1) / page_size,
        }
    }
}

/// Wire form of a unit enum (its serde string), for response DTOs that
/// expose enums as plain strings.
pub fn enum_str<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

pub const fn default_page() -> i64 {
    1
}

pub const fn default_page_size() -> i64 {
    20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_clamps_page_and_size() {
        let params = PaginationParams {
            page: 0,
            page_size: 1000,
        };
        assert_eq!(params.limit_offset(), (100, 0));

        let params = PaginationParams {
            page: 3,
            page_size: 10,
        };
        assert_eq!(params.limit_offset(), (10, 20));
    }

    #[test]
    fn paged_computes_total_pages() {
        let params = PaginationParams {
            page: 1,
            page_size: 10,
        };
        let paged = Paged::new(vec![1, 2, 3], 25, &params);
        assert_eq!(paged.total_pages, 3);
        assert_eq!(paged.total, 25);

        let paged = Paged::new(Vec::<i32>::new(), 0, &params);
        assert_eq!(paged.total_pages, 0);
    }
}
