use serde::{Deserialize, Serialize};

/// Standard envelope around every API payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
    pub message: String,
    pub code: u16,
    pub success: bool,
}

impl<T> ApiResponse<T> {
    /// Successful envelope with code 200
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            code: 200,
            success: true,
        }
    }

    pub fn with_code(mut self, code: u16) -> Self {
        self.code = code;
        self
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            data: f(self.data),
            message: self.message,
            code: self.code,
            success: self.success,
        }
    }
}

impl ApiResponse<Option<()>> {
    /// Failure envelope without payload
    pub fn error(code: u16, message: impl Into<String>) -> Self {
        Self {
            data: None,
            message: message.into(),
            code,
            success: false,
        }
    }
}

/// One page of a list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedData<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

impl<T> PaginatedData<T> {
    pub fn new(items: Vec<T>, total: usize, page: usize, page_size: usize) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            total.div_ceil(page_size)
        };

        Self {
            items,
            total,
            page,
            page_size,
            total_pages,
        }
    }
}
