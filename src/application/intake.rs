use super::interpreter::PayloadInterpreter;
use super::notifier::DonationNotifier;
use crate::config::IntakeConfig;
use crate::domain::donation::DonationRequest;
use crate::domain::invoice::{Invoice, InvoiceCategory, InvoiceLine};
use crate::domain::job::{Job, ScheduledJob};
use crate::domain::payload::DonationPayload;
use crate::domain::ports::{
    AppRegistryBox, ContractStoreBox, InvoiceStoreBox, JobQueueBox, NotificationGatewayBox,
    ProductCatalogBox,
};
use crate::domain::{InvoiceId, NotificationId};
use crate::error::{IntakeError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

/// Status returned when the app resends a donation it already recorded.
pub const STATUS_TREATED: &str = "Donation data Recieved.";
/// Status returned for every other donation.
pub const STATUS_UNTREATED: &str = "Cannot send the appeals/gifts";

/// Response shape expected by the mobile app.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Acknowledgment {
    #[serde(rename = "Gift")]
    pub gifts: Vec<InvoiceId>,
    #[serde(rename = "Donation")]
    pub donations: Vec<InvoiceId>,
    #[serde(rename = "SendAGiftPublishResult")]
    pub publish_result: String,
}

impl Acknowledgment {
    fn new(already_treated: bool) -> Self {
        let status = if already_treated {
            STATUS_TREATED
        } else {
            STATUS_UNTREATED
        };
        Self {
            gifts: Vec::new(),
            donations: Vec::new(),
            publish_result: status.to_string(),
        }
    }
}

/// The host services the intake rules run against.
pub struct IntakePorts {
    pub products: ProductCatalogBox,
    pub contracts: ContractStoreBox,
    pub invoices: InvoiceStoreBox,
    pub apps: AppRegistryBox,
    pub notifications: NotificationGatewayBox,
    pub jobs: JobQueueBox,
}

/// Entry point for donations posted by the mobile app.
///
/// Each operation awaits its port calls in order, so a request observes the
/// effects of the previous one.
pub struct DonationIntake {
    ports: IntakePorts,
    config: IntakeConfig,
}

impl DonationIntake {
    pub fn new(ports: IntakePorts, config: IntakeConfig) -> Self {
        Self { ports, config }
    }

    /// Records a mobile donation and returns the acknowledgment for the app.
    pub async fn post_invoice(&self, payload: DonationPayload) -> Result<Acknowledgment> {
        self.post_invoice_at(payload, Utc::now()).await
    }

    /// Same as [`post_invoice`](Self::post_invoice) with an explicit clock.
    ///
    /// Sponsorship payments are only accepted when they settle an open
    /// sponsorship invoice of the donor exactly: same total and same set of
    /// contracts. Other donations are merged into that invoice, or billed on a
    /// fresh invoice when nothing is paid for sponsorships.
    pub async fn post_invoice_at(
        &self,
        payload: DonationPayload,
        now: DateTime<Utc>,
    ) -> Result<Acknowledgment> {
        let interpreter = PayloadInterpreter::new(
            self.ports.products.as_ref(),
            self.ports.contracts.as_ref(),
            &self.config.default_source,
        );
        let request = interpreter.interpret(&payload).await?;

        let mut ack = Acknowledgment::new(request.already_treated);
        if request.already_treated || request.partner_id == 0 {
            debug!(
                partner = request.partner_id,
                already_treated = request.already_treated,
                "Skipping mobile donation"
            );
            return Ok(ack);
        }
        if request.is_empty() {
            return Err(IntakeError::EmptyDonation);
        }

        let lines = request.donation_lines();
        let invoice = if request.sponsorship_payments.is_empty() {
            self.create_donation_invoice(&request, lines, now).await?
        } else {
            self.reconcile_sponsorships(&request, lines, now).await?
        };

        ack.donations.push(invoice.id);
        Ok(ack)
    }

    async fn reconcile_sponsorships(
        &self,
        request: &DonationRequest,
        lines: Vec<InvoiceLine>,
        now: DateTime<Utc>,
    ) -> Result<Invoice> {
        debug!(
            partner = request.partner_id,
            total = %request.sponsorship_total(),
            multiple_months = request.is_multiple_months_payment(),
            "Reconciling sponsorship payment"
        );

        // Bill what is due so that a payment made ahead of the monthly run can match.
        let contract_ids: Vec<_> = request.sponsorship_contracts().into_iter().collect();
        let generated = self.ports.contracts.generate_invoices(&contract_ids).await?;

        match self.settle_sponsorships(request, lines, now).await {
            Ok(invoice) => Ok(invoice),
            Err(e) => {
                for invoice_id in generated {
                    self.ports.invoices.remove(invoice_id).await?;
                }
                Err(e)
            }
        }
    }

    /// Reuses the oldest open sponsorship invoice paid exactly by the request
    /// and merges the other donations into it.
    async fn settle_sponsorships(
        &self,
        request: &DonationRequest,
        lines: Vec<InvoiceLine>,
        now: DateTime<Utc>,
    ) -> Result<Invoice> {
        let total = request.sponsorship_total();
        let contracts = request.sponsorship_contracts();
        let mut candidates: Vec<Invoice> = self
            .ports
            .invoices
            .open_invoices(request.partner_id)
            .await?
            .into_iter()
            .filter(|i| i.category() == InvoiceCategory::Sponsorship && i.amount_total() == total)
            .collect();
        candidates.sort_by_key(|i| (i.date, i.id));

        let Some(mut invoice) = candidates.into_iter().next() else {
            warn!(
                partner = request.partner_id,
                %total,
                "No open sponsorship invoice matches payment"
            );
            return Err(IntakeError::SponsorshipMismatch);
        };
        if invoice.contract_ids() != contracts {
            warn!(
                partner = request.partner_id,
                invoice = invoice.id,
                expected = ?invoice.contract_ids(),
                paid = ?contracts,
                "Sponsorship payment covers other contracts than the open invoice"
            );
            return Err(IntakeError::SponsorshipMismatch);
        }

        if lines.is_empty() {
            info!(
                partner = request.partner_id,
                invoice = invoice.id,
                "Reusing sponsorship invoice"
            );
            return Ok(invoice);
        }
        if !request.child_gifts.is_empty() {
            return Err(IntakeError::MixedGiftAndSponsorship);
        }

        invoice.button_draft()?;
        invoice.add_lines(lines)?;
        invoice.post();
        invoice.message_post("Sponsorship invoice used for mobile app donation.");
        let invoice_id = invoice.id;
        self.ports.invoices.store(invoice.clone()).await?;

        let eta = now + self.config.rollback_delay;
        self.ports
            .jobs
            .enqueue(ScheduledJob {
                eta,
                job: Job::RemoveMobileDonationIfNotPaid { invoice_id },
            })
            .await?;
        info!(
            partner = request.partner_id,
            invoice = invoice_id,
            %eta,
            "Merged mobile donation into sponsorship invoice"
        );
        Ok(invoice)
    }

    async fn create_donation_invoice(
        &self,
        request: &DonationRequest,
        lines: Vec<InvoiceLine>,
        now: DateTime<Utc>,
    ) -> Result<Invoice> {
        let id = self.ports.invoices.next_id().await?;
        let mut invoice = Invoice::new(id, request.partner_id, now.date_naive());
        invoice.add_lines(lines)?;
        invoice.payment_reference = Some(format!("Mobile APP donation-{}", request.source));
        invoice.post();
        self.ports.invoices.store(invoice.clone()).await?;
        info!(
            partner = request.partner_id,
            invoice = id,
            total = %invoice.amount_total(),
            "Created mobile donation invoice"
        );
        Ok(invoice)
    }

    /// Strips the donation lines merged into a sponsorship invoice when it is
    /// still unpaid. Returns whether the invoice was rolled back.
    pub async fn remove_mobile_donation_if_not_paid(&self, invoice_id: InvoiceId) -> Result<bool> {
        let mut invoice = self
            .ports
            .invoices
            .get(invoice_id)
            .await?
            .ok_or(IntakeError::InvoiceNotFound(invoice_id))?;
        if invoice.is_paid() {
            return Ok(false);
        }

        invoice.button_draft()?;
        let removed = invoice.remove_non_sponsorship_lines()?;
        invoice.post();
        invoice.message_post("Removed mobile donation as no payment was received");
        self.ports.invoices.store(invoice).await?;
        info!(invoice = invoice_id, removed, "Rolled back unpaid mobile donation");
        Ok(true)
    }

    /// Executes every job whose ETA is reached. Returns how many ran.
    ///
    /// A failing job is logged and dropped; the remaining due jobs still run.
    pub async fn run_due_jobs(&self, now: DateTime<Utc>) -> Result<usize> {
        let due = self.ports.jobs.take_due(now).await?;
        for scheduled in &due {
            let outcome = match scheduled.job {
                Job::RemoveMobileDonationIfNotPaid { invoice_id } => self
                    .remove_mobile_donation_if_not_paid(invoice_id)
                    .await
                    .map(|_| ()),
            };
            if let Err(e) = outcome {
                error!(job = ?scheduled.job, eta = %scheduled.eta, "Error running job: {}", e);
            }
        }
        Ok(due.len())
    }

    /// Registers the payment of an invoice and thanks the donor.
    pub async fn confirm_payment(&self, invoice_id: InvoiceId) -> Result<Option<NotificationId>> {
        self.notifier().invoice_paid(invoice_id).await
    }

    /// Sends the donation notification of an invoice unless it or its
    /// reversal already has one.
    pub async fn send_mobile_notification(
        &self,
        invoice_id: InvoiceId,
    ) -> Result<Option<NotificationId>> {
        self.notifier().send_mobile_notification(invoice_id).await
    }

    fn notifier(&self) -> DonationNotifier<'_> {
        DonationNotifier::new(&self.ports, &self.config)
    }
}
