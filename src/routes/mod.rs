pub mod event;
pub mod guests;
pub mod health;
pub mod logs;
pub mod rsvp;
