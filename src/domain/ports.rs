use super::catalog::{Child, Product};
use super::contract::RecurringContract;
use super::invoice::Invoice;
use super::job::ScheduledJob;
use super::notification::NotificationDraft;
use super::{ChildId, ContractId, InvoiceId, NotificationId, PartnerId, ProductTemplateId};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// First product variant of the given template.
    async fn find_by_template(&self, template_id: ProductTemplateId) -> Result<Option<Product>>;
}

#[async_trait]
pub trait ContractStore: Send + Sync {
    /// Open contracts of `child` where `partner` is payer or correspondent.
    async fn find_open_for_child(
        &self,
        child_id: ChildId,
        partner_id: PartnerId,
    ) -> Result<Vec<RecurringContract>>;
    async fn child(&self, child_id: ChildId) -> Result<Option<Child>>;
    async fn get(&self, contract_id: ContractId) -> Result<Option<RecurringContract>>;
    /// Generates the invoices due for the given contracts, returning the ids
    /// of the invoices created.
    async fn generate_invoices(&self, contract_ids: &[ContractId]) -> Result<Vec<InvoiceId>>;
}

#[async_trait]
pub trait InvoiceStore: Send + Sync {
    async fn next_id(&self) -> Result<InvoiceId>;
    async fn store(&self, invoice: Invoice) -> Result<()>;
    async fn get(&self, invoice_id: InvoiceId) -> Result<Option<Invoice>>;
    /// Deletes an invoice; unknown ids are ignored.
    async fn remove(&self, invoice_id: InvoiceId) -> Result<()>;
    /// Posted, unpaid invoices of the partner.
    async fn open_invoices(&self, partner_id: PartnerId) -> Result<Vec<Invoice>>;
    async fn all_invoices(&self) -> Result<Vec<Invoice>>;
}

#[async_trait]
pub trait AppRegistry: Send + Sync {
    /// Whether the partner has the mobile app registered for push messages.
    async fn has_app(&self, partner_id: PartnerId) -> Result<bool>;
}

#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Creates and sends a notification.
    async fn send(&self, draft: NotificationDraft) -> Result<NotificationId>;
}

#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn enqueue(&self, job: ScheduledJob) -> Result<()>;
    /// Removes and returns the jobs whose ETA is reached, in ETA order.
    async fn take_due(&self, now: DateTime<Utc>) -> Result<Vec<ScheduledJob>>;
}

pub type ProductCatalogBox = Box<dyn ProductCatalog>;
pub type ContractStoreBox = Box<dyn ContractStore>;
pub type InvoiceStoreBox = Box<dyn InvoiceStore>;
pub type AppRegistryBox = Box<dyn AppRegistry>;
pub type NotificationGatewayBox = Box<dyn NotificationGateway>;
pub type JobQueueBox = Box<dyn JobQueue>;
