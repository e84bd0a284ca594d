use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestResponse {
    pub name: String,
    pub attending: bool,
    #[serde(default)]
    pub dietary_restrictions: String,
}

/// A submitted RSVP form. Validated and normalized before it touches the sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpFormData {
    pub invitation_code: String,
    pub guests: Vec<GuestResponse>,
    #[serde(default)]
    pub personal_message: String,
    #[serde(default)]
    pub contact_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub invitation_code: String,
    pub submission_date: String,
    pub is_update: bool,
}
