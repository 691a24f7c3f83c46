use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Envelope every HTTP handler responds with.
#[derive(Debug, Serialize, Deserialize, TS)]
pub struct ApiResponse<T, E = T> {
    success: bool,
    data: Option<T>,
    error_data: Option<E>,
    message: Option<String>,
}

impl<T, E> ApiResponse<T, E> {
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error_data: None,
            message: None,
        }
    }

    pub fn error(message: &str) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error_data: None,
            message: Some(message.to_string()),
        }
    }

    /// Error response that also carries structured details, e.g. a partial sync report.
    pub fn error_with_data(message: &str, data: E) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error_data: Some(data),
            message: Some(message.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    pub fn error_data(&self) -> Option<&E> {
        self.error_data.as_ref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_serializes_envelope() {
        let response: ApiResponse<u32> = ApiResponse::success(7);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": true,
                "data": 7,
                "error_data": null,
                "message": null
            })
        );
    }

    #[test]
    fn test_error_with_data_keeps_details() {
        let response: ApiResponse<(), Vec<&str>> =
            ApiResponse::error_with_data("partially applied", vec!["a"]);
        assert!(!response.is_success());
        assert_eq!(response.message(), Some("partially applied"));
        assert_eq!(response.error_data(), Some(&vec!["a"]));
        assert!(response.data().is_none());
    }
}
