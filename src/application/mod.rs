//! Application layer orchestrating the donation rules over the domain ports.
//!
//! `DonationIntake` is the entry point: it interprets mobile payloads, reconciles
//! sponsorship payments against open invoices, confirms payments and runs the
//! deferred rollback jobs.

pub mod intake;
pub mod interpreter;
pub mod notifier;
