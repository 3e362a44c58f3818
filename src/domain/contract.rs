use super::money::Amount;
use super::{ChildId, ContractId, PartnerId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContractState {
    Draft,
    Waiting,
    #[default]
    Active,
    Terminated,
    Cancelled,
}

/// A recurring sponsorship linking a payer (and possibly a distinct
/// correspondent) to a child.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct RecurringContract {
    pub id: ContractId,
    pub child_id: ChildId,
    /// The partner paying the sponsorship.
    pub partner_id: PartnerId,
    /// The partner writing to the child, when different from the payer.
    #[serde(default)]
    pub correspondent_id: Option<PartnerId>,
    #[serde(default)]
    pub monthly_amount: Amount,
    #[serde(default)]
    pub state: ContractState,
}

impl RecurringContract {
    /// Terminated and cancelled contracts no longer accept payments.
    pub fn is_open(&self) -> bool {
        !matches!(
            self.state,
            ContractState::Terminated | ContractState::Cancelled
        )
    }

    /// Whether the partner pays for or corresponds with the child.
    pub fn involves(&self, partner: PartnerId) -> bool {
        self.partner_id == partner || self.correspondent_id == Some(partner)
    }
}
