use super::catalog::{Product, ProductCategory};
use super::money::Amount;
use super::{ContractId, InvoiceId, NotificationId, PartnerId, ProductId, ProductTemplateId};
use crate::error::IntakeError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostingState {
    Draft,
    #[default]
    Posted,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    #[default]
    NotPaid,
    Paid,
}

/// Category of an invoice, derived from the categories of its lines.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceCategory {
    Sponsorship,
    Gift,
    Fund,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct InvoiceLine {
    pub product_id: ProductId,
    pub product_template_id: ProductTemplateId,
    pub category: ProductCategory,
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub price_unit: Amount,
    #[serde(default)]
    pub contract_id: Option<ContractId>,
}

fn default_quantity() -> u32 {
    1
}

impl InvoiceLine {
    /// A single unit of `product` at `price`, optionally tied to a contract.
    pub fn for_product(product: &Product, price: Amount, contract_id: Option<ContractId>) -> Self {
        Self {
            product_id: product.id,
            product_template_id: product.template_id,
            category: product.category,
            name: product.name.clone(),
            quantity: 1,
            price_unit: price,
            contract_id,
        }
    }

    pub fn subtotal(&self) -> Amount {
        self.price_unit.times(self.quantity)
    }

    pub fn is_sponsorship(&self) -> bool {
        self.category == ProductCategory::Sponsorship
    }
}

/// A customer invoice owned by the host accounting module.
///
/// Lines can only be changed while the invoice is in draft; reconciliation
/// therefore resets a posted invoice to draft, edits it and posts it again.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Invoice {
    pub id: InvoiceId,
    pub partner_id: PartnerId,
    pub date: NaiveDate,
    #[serde(default)]
    pub state: PostingState,
    #[serde(default)]
    pub payment_state: PaymentState,
    #[serde(default)]
    pub lines: Vec<InvoiceLine>,
    #[serde(default)]
    pub payment_reference: Option<String>,
    /// Credit note reversing this invoice, if any.
    #[serde(default)]
    pub reversal_id: Option<InvoiceId>,
    /// Mobile notification already sent for this donation.
    #[serde(default)]
    pub notification_id: Option<NotificationId>,
    #[serde(default)]
    pub avoid_thankyou_letter: bool,
    /// Chatter log.
    #[serde(default)]
    pub messages: Vec<String>,
}

impl Invoice {
    pub fn new(id: InvoiceId, partner_id: PartnerId, date: NaiveDate) -> Self {
        Self {
            id,
            partner_id,
            date,
            state: PostingState::Draft,
            payment_state: PaymentState::NotPaid,
            lines: Vec::new(),
            payment_reference: None,
            reversal_id: None,
            notification_id: None,
            avoid_thankyou_letter: false,
            messages: Vec::new(),
        }
    }

    pub fn amount_total(&self) -> Amount {
        self.lines.iter().map(InvoiceLine::subtotal).sum()
    }

    pub fn category(&self) -> InvoiceCategory {
        let has = |category: ProductCategory| self.lines.iter().any(|l| l.category == category);
        if has(ProductCategory::Sponsorship) {
            InvoiceCategory::Sponsorship
        } else if has(ProductCategory::Gift) {
            InvoiceCategory::Gift
        } else {
            InvoiceCategory::Fund
        }
    }

    /// Distinct contracts referenced by the lines.
    pub fn contract_ids(&self) -> BTreeSet<ContractId> {
        self.lines.iter().filter_map(|l| l.contract_id).collect()
    }

    /// Posted and still waiting for a payment.
    pub fn is_open(&self) -> bool {
        self.state == PostingState::Posted && self.payment_state == PaymentState::NotPaid
    }

    pub fn is_paid(&self) -> bool {
        self.payment_state == PaymentState::Paid
    }

    /// Resets the invoice to draft so that its lines can be edited.
    pub fn button_draft(&mut self) -> Result<(), IntakeError> {
        if self.is_paid() {
            return Err(IntakeError::ValidationError(format!(
                "Invoice {} is paid and cannot be reset to draft",
                self.id
            )));
        }
        self.state = PostingState::Draft;
        Ok(())
    }

    pub fn post(&mut self) {
        self.state = PostingState::Posted;
    }

    pub fn add_lines(
        &mut self,
        lines: impl IntoIterator<Item = InvoiceLine>,
    ) -> Result<(), IntakeError> {
        self.ensure_draft()?;
        self.lines.extend(lines);
        Ok(())
    }

    /// Drops every line that is not a sponsorship, returning how many were removed.
    pub fn remove_non_sponsorship_lines(&mut self) -> Result<usize, IntakeError> {
        self.ensure_draft()?;
        let before = self.lines.len();
        self.lines.retain(InvoiceLine::is_sponsorship);
        Ok(before - self.lines.len())
    }

    /// Registers the full payment of a posted invoice.
    pub fn mark_paid(&mut self) -> Result<(), IntakeError> {
        if self.state != PostingState::Posted {
            return Err(IntakeError::ValidationError(format!(
                "Invoice {} must be posted before being paid",
                self.id
            )));
        }
        self.payment_state = PaymentState::Paid;
        Ok(())
    }

    pub fn message_post(&mut self, body: impl Into<String>) {
        self.messages.push(body.into());
    }

    fn ensure_draft(&self) -> Result<(), IntakeError> {
        if self.state == PostingState::Draft {
            Ok(())
        } else {
            Err(IntakeError::ValidationError(format!(
                "Invoice {} must be in draft to change its lines",
                self.id
            )))
        }
    }
}
