use crate::domain::InvoiceId;
use crate::domain::payload::DonationPayload;
use crate::error::{IntakeError, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::io::{BufRead, BufReader, Read};

/// One instruction of a command stream, tagged by `action`.
#[derive(Debug, Deserialize, PartialEq, Clone)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Command {
    /// A donation posted by the mobile app.
    Donate { payload: DonationPayload },
    /// The payment of an invoice was confirmed.
    Pay { invoice_id: InvoiceId },
    /// Explicitly (re)send the donation notification of an invoice.
    Notify { invoice_id: InvoiceId },
    /// Run the deferred jobs due at `at`, or now.
    RunJobs {
        #[serde(default)]
        at: Option<DateTime<Utc>>,
    },
}

/// Reads commands from a JSON Lines source.
///
/// Blank lines are skipped; each other line yields either a command or the
/// error that prevented reading it, so one bad line does not stop the stream.
pub struct CommandReader<R: Read> {
    reader: BufReader<R>,
}

impl<R: Read> CommandReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            reader: BufReader::new(source),
        }
    }

    pub fn commands(self) -> impl Iterator<Item = Result<Command>> {
        self.reader.lines().filter_map(|line| match line {
            Ok(line) if line.trim().is_empty() => None,
            Ok(line) => Some(serde_json::from_str(&line).map_err(IntakeError::from)),
            Err(e) => Some(Err(IntakeError::from(e))),
        })
    }
}
