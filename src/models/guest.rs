use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RsvpStatus {
    #[default]
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "attending")]
    Attending,
    #[serde(rename = "not_attending")]
    NotAttending,
}

impl RsvpStatus {
    /// Parse a single status token as stored in the spreadsheet.
    ///
    /// Unrecognized tokens are treated as `Pending`.
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "attending" => RsvpStatus::Attending,
            "not_attending" => RsvpStatus::NotAttending,
            _ => RsvpStatus::Pending,
        }
    }

    pub fn as_token(&self) -> &'static str {
        match self {
            RsvpStatus::Pending => "pending",
            RsvpStatus::Attending => "attending",
            RsvpStatus::NotAttending => "not_attending",
        }
    }

    /// Overall party status: attending if anyone attends, otherwise
    /// not attending if anyone declined, otherwise pending.
    pub fn overall<'a, I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = &'a RsvpStatus>,
    {
        let mut overall = RsvpStatus::Pending;
        for status in statuses {
            match status {
                RsvpStatus::Attending => return RsvpStatus::Attending,
                RsvpStatus::NotAttending => overall = RsvpStatus::NotAttending,
                RsvpStatus::Pending => {}
            }
        }
        overall
    }
}

impl std::fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_token())
    }
}

/// One party's invitation and RSVP state, as stored in a spreadsheet row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestEntry {
    pub invitation_code: String,
    pub guest_names: Vec<String>,
    pub rsvp_status: RsvpStatus,
    /// Aligned by index with `guest_names`.
    pub per_guest_statuses: Vec<RsvpStatus>,
    /// `"name: restriction"` entries.
    pub dietary_restrictions: Vec<String>,
    pub personal_message: String,
    pub contact_email: Option<String>,
    pub submission_date: String,
}

impl GuestEntry {
    pub fn attending_count(&self) -> usize {
        self.per_guest_statuses
            .iter()
            .filter(|s| **s == RsvpStatus::Attending)
            .count()
    }

    pub fn is_submitted(&self) -> bool {
        self.rsvp_status != RsvpStatus::Pending
    }
}
