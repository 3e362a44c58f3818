use crate::domain::{ChildId, InvoiceId, PartnerId, ProductTemplateId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IntakeError>;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("The product {0} was not found")]
    ProductNotFound(ProductTemplateId),
    #[error("No active sponsorship found for child {child} and partner {partner}")]
    ContractNotFound { child: ChildId, partner: PartnerId },
    #[error("Expected one sponsorship for child {child} and partner {partner}, found {count}")]
    AmbiguousContract {
        child: ChildId,
        partner: PartnerId,
        count: usize,
    },
    #[error("Invoice {0} not found")]
    InvoiceNotFound(InvoiceId),
    #[error("Malformed donation payload: {0}")]
    MalformedPayload(String),
    #[error("The donation does not contain any line")]
    EmptyDonation,
    #[error(
        "Your sponsorship payment doesn't match any expected payment. \
         Please reach to our team to check what is due."
    )]
    SponsorshipMismatch,
    #[error(
        "You cannot pay your sponsorship with gifts at the same time. \
         Please make two separate donations."
    )]
    MixedGiftAndSponsorship,
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl IntakeError {
    /// Rejections whose message is meant to be shown to the donor as is.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            IntakeError::SponsorshipMismatch | IntakeError::MixedGiftAndSponsorship
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_errors() {
        assert!(IntakeError::SponsorshipMismatch.is_user_facing());
        assert!(IntakeError::MixedGiftAndSponsorship.is_user_facing());
        assert!(!IntakeError::ProductNotFound(3).is_user_facing());
        assert!(!IntakeError::EmptyDonation.is_user_facing());
    }

    #[test]
    fn test_mismatch_message_asks_to_contact_team() {
        let message = IntakeError::SponsorshipMismatch.to_string();
        assert!(message.contains("doesn't match any expected payment"));
        assert!(message.contains("reach to our team"));
    }
}
