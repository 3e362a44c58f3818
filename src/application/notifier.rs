use super::intake::IntakePorts;
use crate::config::IntakeConfig;
use crate::domain::catalog::ProductCategory;
use crate::domain::invoice::{Invoice, InvoiceCategory};
use crate::domain::money::Amount;
use crate::domain::notification::NotificationDraft;
use crate::domain::{ChildId, InvoiceId, NotificationId};
use crate::error::{IntakeError, Result};
use std::collections::BTreeSet;
use tracing::{debug, info};

const TOPIC: &str = "spam";
const DESTINATION: &str = "Donation";
const BODY: &str = "Thank you for your generosity!";
const DEFAULT_BENEFICIARY: &str = "one of our fund";

/// Thanks donors on their phone once a donation is paid.
pub struct DonationNotifier<'a> {
    ports: &'a IntakePorts,
    config: &'a IntakeConfig,
}

impl<'a> DonationNotifier<'a> {
    pub fn new(ports: &'a IntakePorts, config: &'a IntakeConfig) -> Self {
        Self { ports, config }
    }

    /// Marks the invoice paid, then notifies gift and fund donors who have the
    /// app and did not opt out of thank-you letters.
    pub async fn invoice_paid(&self, invoice_id: InvoiceId) -> Result<Option<NotificationId>> {
        let mut invoice = self.invoice(invoice_id).await?;
        invoice.mark_paid()?;
        self.ports.invoices.store(invoice.clone()).await?;

        let eligible = matches!(
            invoice.category(),
            InvoiceCategory::Gift | InvoiceCategory::Fund
        ) && !invoice.avoid_thankyou_letter
            && self.ports.apps.has_app(invoice.partner_id).await?;
        if !eligible {
            debug!(
                invoice = invoice_id,
                category = ?invoice.category(),
                "No mobile notification for paid invoice"
            );
            return Ok(None);
        }
        self.send_mobile_notification(invoice_id).await
    }

    /// Sends the donation notification unless the invoice or its reversal
    /// already carries one.
    pub async fn send_mobile_notification(
        &self,
        invoice_id: InvoiceId,
    ) -> Result<Option<NotificationId>> {
        let mut invoice = self.invoice(invoice_id).await?;
        let mut reversal = match invoice.reversal_id {
            Some(id) => self.ports.invoices.get(id).await?,
            None => None,
        };
        let already_sent = invoice.notification_id.is_some()
            || reversal.as_ref().is_some_and(|r| r.notification_id.is_some());
        if already_sent {
            return Ok(None);
        }

        let draft = self.compose(&invoice).await?;
        let title = draft.title.clone();
        let notification_id = self.ports.notifications.send(draft).await?;

        invoice.notification_id = Some(notification_id);
        self.ports.invoices.store(invoice).await?;
        if let Some(mut reversal) = reversal.take() {
            reversal.notification_id = Some(notification_id);
            self.ports.invoices.store(reversal).await?;
        }
        info!(
            invoice = invoice_id,
            notification = notification_id,
            %title,
            "Sent donation notification"
        );
        Ok(Some(notification_id))
    }

    async fn compose(&self, invoice: &Invoice) -> Result<NotificationDraft> {
        let donation_lines = invoice
            .lines
            .iter()
            .filter(|l| l.category != ProductCategory::Sponsorship);
        let amount: Amount = donation_lines.clone().map(|l| l.subtotal()).sum();

        let mut fund_names: Vec<&str> = Vec::new();
        for line in donation_lines.filter(|l| l.category == ProductCategory::Fund) {
            if !fund_names.contains(&line.name.as_str()) {
                fund_names.push(&line.name);
            }
        }

        let mut children: BTreeSet<ChildId> = BTreeSet::new();
        for contract_id in invoice.lines.iter().filter_map(|l| l.contract_id) {
            if let Some(contract) = self.ports.contracts.get(contract_id).await? {
                children.insert(contract.child_id);
            }
        }

        let beneficiary = match children.len() {
            0 if fund_names.is_empty() => DEFAULT_BENEFICIARY.to_string(),
            0 => fund_names.join(", "),
            1 => {
                let child_id = children.first().copied().unwrap_or_default();
                match self.ports.contracts.child(child_id).await? {
                    Some(child) => child.preferred_name,
                    None => DEFAULT_BENEFICIARY.to_string(),
                }
            }
            count => format!("{count} children"),
        };

        Ok(NotificationDraft {
            topic: TOPIC.to_string(),
            destination: DESTINATION.to_string(),
            product_template_id: invoice.lines.first().map(|l| l.product_template_id),
            partner_ids: vec![invoice.partner_id],
            title: format!(
                "You gave {} {}.- for {}",
                self.config.currency, amount, beneficiary
            ),
            body: BODY.to_string(),
            invoice_id: invoice.id,
        })
    }

    async fn invoice(&self, invoice_id: InvoiceId) -> Result<Invoice> {
        self.ports
            .invoices
            .get(invoice_id)
            .await?
            .ok_or(IntakeError::InvoiceNotFound(invoice_id))
    }
}
