use serde::{Deserialize, Serialize};

/// JSON envelope for successful API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Submission;

    #[test]
    fn decodes_envelopes_with_and_without_data() {
        let body = r#"{"success":true,"message":"RSVP submitted successfully!","data":{"invitationCode":"AB12","submissionDate":"2026-06-01T12:00:00.000Z","isUpdate":false}}"#;
        let resp: ApiResponse<Submission> = serde_json::from_str(body).unwrap();
        assert_eq!(resp.data.unwrap().invitation_code, "AB12");

        let resp: ApiResponse<Submission> = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(resp.data.is_none());
        assert!(resp.message.is_none());
    }
}
