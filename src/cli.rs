use crate::client::RsvpClient;
use crate::models::RsvpStatus;
use crate::store::GuestStore;

/// Print every party in the guest list with its answer, then totals.
pub async fn list_rsvps(store: &GuestStore) -> Result<(), Box<dyn std::error::Error>> {
    let entries = store.all_entries().await?;

    let mut parties = [0usize; 3];
    let mut attending = 0;
    let mut invited = 0;

    for entry in &entries {
        let slot = match entry.rsvp_status {
            RsvpStatus::Attending => 0,
            RsvpStatus::NotAttending => 1,
            RsvpStatus::Pending => 2,
        };
        parties[slot] += 1;
        attending += entry.attending_count();
        invited += entry.guest_names.len();

        println!(
            "{:<8} {:<13} {}/{}  {}",
            entry.invitation_code,
            entry.rsvp_status.as_token(),
            entry.attending_count(),
            entry.guest_names.len(),
            entry.guest_names.join(", ")
        );
    }

    println!();
    println!("Parties: {}", entries.len());
    println!("  attending:     {}", parties[0]);
    println!("  not attending: {}", parties[1]);
    println!("  pending:       {}", parties[2]);
    println!("Guests attending: {attending} of {invited}");

    Ok(())
}

/// Look a code up against a running server.
pub async fn lookup_remote(base_url: &str, code: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = RsvpClient::new(base_url)?;

    match client.lookup(code).await? {
        Some(entry) => {
            println!("Invitation {}", entry.invitation_code);
            println!("  Status: {}", entry.rsvp_status);
            for (name, status) in entry.guest_names.iter().zip(&entry.per_guest_statuses) {
                println!("  {name}: {status}");
            }
            if !entry.dietary_restrictions.is_empty() {
                println!("  Dietary: {}", entry.dietary_restrictions.join("; "));
            }
            if !entry.submission_date.is_empty() {
                println!("  Submitted: {}", entry.submission_date);
            }
        }
        None => println!("Invitation code {code} not found"),
    }

    Ok(())
}
