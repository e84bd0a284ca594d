//! Mapping between spreadsheet rows and guest records.
//!
//! Column layout (A-G): invitation code, comma-joined guest names, status
//! (one global token or a comma-joined per-guest list), semicolon-joined
//! `name: restriction` notes, personal message, ISO submission date, email.

use crate::models::{GuestEntry, RsvpFormData, RsvpStatus};
use crate::validation::{format_errors, name_key, validate_guest_entry};

pub const COLUMN_COUNT: usize = 7;

const CODE: usize = 0;
const NAMES: usize = 1;
const STATUS: usize = 2;
const DIETARY: usize = 3;
const MESSAGE: usize = 4;
const SUBMITTED: usize = 5;
const EMAIL: usize = 6;

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(|s| s.trim()).unwrap_or("")
}

fn split_list(cell: &str, delimiter: char) -> Vec<String> {
    cell.split(delimiter)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Decode a status cell for a party of `guest_count`.
///
/// A comma-separated cell is a per-guest list; anything else is one global
/// token replicated across the party.
pub fn decode_status(cell: &str, guest_count: usize) -> (RsvpStatus, Vec<RsvpStatus>) {
    if cell.contains(',') {
        let statuses: Vec<RsvpStatus> = cell.split(',').map(RsvpStatus::from_token).collect();
        (RsvpStatus::overall(&statuses), statuses)
    } else {
        let status = RsvpStatus::from_token(cell);
        (status, vec![status; guest_count])
    }
}

pub fn encode_status(entry: &GuestEntry) -> String {
    if entry.per_guest_statuses.is_empty() {
        return entry.rsvp_status.as_token().to_string();
    }
    entry
        .per_guest_statuses
        .iter()
        .map(RsvpStatus::as_token)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Decode a row into a `GuestEntry`.
///
/// Missing or empty cells become empty values. A row that decodes but fails
/// validation is logged and returned as-is rather than rejected.
pub fn decode_row(row: &[String]) -> GuestEntry {
    let guest_names = split_list(cell(row, NAMES), ',');
    let (rsvp_status, per_guest_statuses) = decode_status(cell(row, STATUS), guest_names.len());
    let email = cell(row, EMAIL);

    let entry = GuestEntry {
        invitation_code: cell(row, CODE).to_ascii_uppercase(),
        guest_names,
        rsvp_status,
        per_guest_statuses,
        dietary_restrictions: split_list(cell(row, DIETARY), ';'),
        personal_message: cell(row, MESSAGE).to_string(),
        contact_email: (!email.is_empty()).then(|| email.to_string()),
        submission_date: cell(row, SUBMITTED).to_string(),
    };

    if let Err(errors) = validate_guest_entry(&entry) {
        tracing::warn!(
            errors = %format_errors(&errors),
            "guest row failed validation, returning unvalidated entry"
        );
    }
    entry
}

pub fn encode_row(entry: &GuestEntry) -> Vec<String> {
    vec![
        entry.invitation_code.clone(),
        entry.guest_names.join(", "),
        encode_status(entry),
        entry.dietary_restrictions.join("; "),
        entry.personal_message.clone(),
        entry.submission_date.clone(),
        entry.contact_email.clone().unwrap_or_default(),
    ]
}

/// Whether the submitted guests are exactly the invited party, ignoring
/// order, case and whitespace.
pub fn guests_match(stored: &GuestEntry, form: &RsvpFormData) -> bool {
    let mut expected: Vec<String> = stored.guest_names.iter().map(|n| name_key(n)).collect();
    let mut provided: Vec<String> = form.guests.iter().map(|g| name_key(&g.name)).collect();
    expected.sort();
    provided.sort();
    expected == provided
}

/// Build the entry written back for a validated submission.
///
/// Guest names keep the stored spelling and order; each stored guest takes
/// the answer of the submitted guest with the same name. Callers must check
/// [`guests_match`] first.
pub fn apply_submission(stored: &GuestEntry, form: &RsvpFormData, submitted_at: &str) -> GuestEntry {
    let mut used = vec![false; form.guests.len()];
    let mut per_guest_statuses = Vec::with_capacity(stored.guest_names.len());
    let mut dietary_restrictions = Vec::new();

    for name in &stored.guest_names {
        let key = name_key(name);
        let answer = form
            .guests
            .iter()
            .enumerate()
            .find(|(i, g)| !used[*i] && name_key(&g.name) == key);

        let status = match answer {
            Some((i, guest)) => {
                used[i] = true;
                if guest.attending && !guest.dietary_restrictions.is_empty() {
                    dietary_restrictions.push(format!("{name}: {}", guest.dietary_restrictions));
                }
                if guest.attending {
                    RsvpStatus::Attending
                } else {
                    RsvpStatus::NotAttending
                }
            }
            None => RsvpStatus::Pending,
        };
        per_guest_statuses.push(status);
    }

    let rsvp_status = if per_guest_statuses.contains(&RsvpStatus::Attending) {
        RsvpStatus::Attending
    } else {
        RsvpStatus::NotAttending
    };

    GuestEntry {
        invitation_code: stored.invitation_code.clone(),
        guest_names: stored.guest_names.clone(),
        rsvp_status,
        per_guest_statuses,
        dietary_restrictions,
        personal_message: form.personal_message.clone(),
        contact_email: form.contact_email.clone(),
        submission_date: submitted_at.to_string(),
    }
}
