use std::sync::LazyLock;

use chrono::DateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::{GuestEntry, GuestResponse, RsvpFormData};

pub const MIN_CODE_LEN: usize = 4;
pub const MAX_CODE_LEN: usize = 8;
pub const MAX_GUESTS: usize = 10;
pub const MAX_NAME_LEN: usize = 100;
pub const MAX_DIETARY_LEN: usize = 500;
pub const MAX_MESSAGE_LEN: usize = 1000;

static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{4,8}$").expect("valid code regex"));
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// A single violated rule. `field` is a dot-qualified path such as `guests.1.name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Join field errors into one human-readable line.
pub fn format_errors(errors: &[FieldError]) -> String {
    match errors {
        [] => String::new(),
        [only] => only.message.clone(),
        many => many
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Validate an invitation code and return it uppercased.
pub fn normalize_code(raw: &str) -> Result<String, String> {
    if raw.is_empty() {
        return Err("Invitation code is required".to_string());
    }
    if CODE_RE.is_match(raw) {
        return Ok(raw.to_ascii_uppercase());
    }

    let len = raw.chars().count();
    if len < MIN_CODE_LEN {
        Err(format!("Invitation code must be at least {MIN_CODE_LEN} characters"))
    } else if len > MAX_CODE_LEN {
        Err(format!("Invitation code must be at most {MAX_CODE_LEN} characters"))
    } else {
        Err("Invitation code may only contain letters and numbers".to_string())
    }
}

/// Empty or whitespace-only emails count as absent.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    email.is_empty() || EMAIL_RE.is_match(email)
}

/// Case- and whitespace-insensitive key used to compare guest names.
pub fn name_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn sanitize(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Validate a submitted form and return a normalized copy.
///
/// Every violated rule produces its own `FieldError`; the input is never modified.
pub fn validate_rsvp(form: &RsvpFormData) -> Result<RsvpFormData, Vec<FieldError>> {
    let mut errors = Vec::new();

    let code = match normalize_code(&form.invitation_code) {
        Ok(code) => code,
        Err(message) => {
            errors.push(FieldError::new("invitationCode", message));
            String::new()
        }
    };

    if form.guests.is_empty() {
        errors.push(FieldError::new("guests", "At least one guest is required"));
    } else if form.guests.len() > MAX_GUESTS {
        errors.push(FieldError::new(
            "guests",
            format!("A party may include at most {MAX_GUESTS} guests"),
        ));
    }

    let mut guests = Vec::with_capacity(form.guests.len());
    for (i, guest) in form.guests.iter().enumerate() {
        let name = sanitize(&guest.name);
        let name_len = name.chars().count();
        if name_len == 0 {
            errors.push(FieldError::new(
                format!("guests.{i}.name"),
                "Guest name is required",
            ));
        } else if name_len > MAX_NAME_LEN {
            errors.push(FieldError::new(
                format!("guests.{i}.name"),
                format!("Guest name must be at most {MAX_NAME_LEN} characters"),
            ));
        }

        let dietary = guest.dietary_restrictions.trim().to_string();
        if dietary.chars().count() > MAX_DIETARY_LEN {
            errors.push(FieldError::new(
                format!("guests.{i}.dietaryRestrictions"),
                format!("Dietary restrictions must be at most {MAX_DIETARY_LEN} characters"),
            ));
        }

        guests.push(GuestResponse {
            name,
            attending: guest.attending,
            dietary_restrictions: dietary,
        });
    }

    let personal_message = form.personal_message.trim().to_string();
    if personal_message.chars().count() > MAX_MESSAGE_LEN {
        errors.push(FieldError::new(
            "personalMessage",
            format!("Personal message must be at most {MAX_MESSAGE_LEN} characters"),
        ));
    }

    let contact_email = form
        .contact_email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());
    if let Some(email) = contact_email {
        if !is_valid_email(email) {
            errors.push(FieldError::new(
                "contactEmail",
                "Please enter a valid email address",
            ));
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(RsvpFormData {
        invitation_code: code,
        guests,
        personal_message,
        contact_email: contact_email.map(str::to_string),
    })
}

/// Check a decoded spreadsheet row for structural consistency.
pub fn validate_guest_entry(entry: &GuestEntry) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    if let Err(message) = normalize_code(&entry.invitation_code) {
        errors.push(FieldError::new("invitationCode", message));
    }

    if entry.guest_names.is_empty() {
        errors.push(FieldError::new("guestNames", "At least one guest name is required"));
    }
    for (i, name) in entry.guest_names.iter().enumerate() {
        let len = name.trim().chars().count();
        if len == 0 || len > MAX_NAME_LEN {
            errors.push(FieldError::new(
                format!("guestNames.{i}"),
                format!("Guest name must be 1-{MAX_NAME_LEN} characters"),
            ));
        }
    }

    if entry.per_guest_statuses.len() != entry.guest_names.len() {
        errors.push(FieldError::new(
            "perGuestStatuses",
            format!(
                "Expected {} statuses, found {}",
                entry.guest_names.len(),
                entry.per_guest_statuses.len()
            ),
        ));
    }

    if entry.personal_message.chars().count() > MAX_MESSAGE_LEN {
        errors.push(FieldError::new(
            "personalMessage",
            format!("Personal message must be at most {MAX_MESSAGE_LEN} characters"),
        ));
    }

    if let Some(email) = &entry.contact_email {
        if !is_valid_email(email) {
            errors.push(FieldError::new("contactEmail", "Invalid email address"));
        }
    }

    if !entry.submission_date.is_empty()
        && DateTime::parse_from_rfc3339(&entry.submission_date).is_err()
    {
        errors.push(FieldError::new(
            "submissionDate",
            "Submission date must be an ISO-8601 timestamp",
        ));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
