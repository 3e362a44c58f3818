use super::seed::LedgerSeed;
use crate::application::intake::IntakePorts;
use crate::domain::catalog::{Child, Product, ProductCategory};
use crate::domain::contract::{ContractState, RecurringContract};
use crate::domain::invoice::{Invoice, InvoiceLine};
use crate::domain::job::ScheduledJob;
use crate::domain::notification::{Notification, NotificationDraft};
use crate::domain::ports::{
    AppRegistry, ContractStore, InvoiceStore, JobQueue, NotificationGateway, ProductCatalog,
};
use crate::domain::{ChildId, ContractId, InvoiceId, NotificationId, PartnerId, ProductTemplateId};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct LedgerState {
    products: Vec<Product>,
    children: HashMap<ChildId, Child>,
    contracts: BTreeMap<ContractId, RecurringContract>,
    invoices: BTreeMap<InvoiceId, Invoice>,
    app_partners: HashSet<PartnerId>,
}

impl LedgerState {
    fn next_invoice_id(&self) -> InvoiceId {
        self.invoices.keys().next_back().map_or(1, |id| id + 1)
    }

    fn has_open_invoice_for(&self, contract: &RecurringContract) -> bool {
        self.invoices.values().any(|invoice| {
            invoice.partner_id == contract.partner_id
                && invoice.is_open()
                && invoice.lines.iter().any(|l| l.contract_id == Some(contract.id))
        })
    }
}

/// A thread-safe in-memory stand-in for the host's product, contract and
/// invoice tables.
///
/// Cloning shares the underlying state, so a single ledger can back every port.
#[derive(Default, Clone)]
pub struct InMemoryLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl InMemoryLedger {
    pub fn from_seed(seed: LedgerSeed) -> Self {
        let state = LedgerState {
            products: seed.products,
            children: seed.children.into_iter().map(|c| (c.id, c)).collect(),
            contracts: seed.contracts.into_iter().map(|c| (c.id, c)).collect(),
            invoices: seed.invoices.into_iter().map(|i| (i.id, i)).collect(),
            app_partners: seed.app_partners.into_iter().collect(),
        };
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Generates monthly invoices as of `date`.
    ///
    /// Only active contracts with a monthly amount and no open invoice yet are
    /// billed; contracts sharing a payer are grouped on one invoice.
    pub async fn generate_invoices_on(
        &self,
        contract_ids: &[ContractId],
        date: NaiveDate,
    ) -> Result<Vec<InvoiceId>> {
        let mut state = self.state.write().await;
        let Some(product) = state
            .products
            .iter()
            .find(|p| p.category == ProductCategory::Sponsorship)
            .cloned()
        else {
            return Ok(Vec::new());
        };

        let mut per_payer: BTreeMap<PartnerId, Vec<InvoiceLine>> = BTreeMap::new();
        for contract_id in contract_ids {
            let Some(contract) = state.contracts.get(contract_id) else {
                continue;
            };
            if contract.state != ContractState::Active
                || contract.monthly_amount.is_zero()
                || state.has_open_invoice_for(contract)
            {
                continue;
            }
            per_payer.entry(contract.partner_id).or_default().push(InvoiceLine::for_product(
                &product,
                contract.monthly_amount,
                Some(contract.id),
            ));
        }

        let mut created = Vec::with_capacity(per_payer.len());
        for (partner_id, lines) in per_payer {
            let mut invoice = Invoice::new(state.next_invoice_id(), partner_id, date);
            invoice.add_lines(lines)?;
            invoice.post();
            created.push(invoice.id);
            state.invoices.insert(invoice.id, invoice);
        }
        Ok(created)
    }
}

#[async_trait]
impl ProductCatalog for InMemoryLedger {
    async fn find_by_template(&self, template_id: ProductTemplateId) -> Result<Option<Product>> {
        let state = self.state.read().await;
        Ok(state
            .products
            .iter()
            .find(|p| p.template_id == template_id)
            .cloned())
    }
}

#[async_trait]
impl ContractStore for InMemoryLedger {
    async fn find_open_for_child(
        &self,
        child_id: ChildId,
        partner_id: PartnerId,
    ) -> Result<Vec<RecurringContract>> {
        let state = self.state.read().await;
        Ok(state
            .contracts
            .values()
            .filter(|c| c.child_id == child_id && c.involves(partner_id) && c.is_open())
            .cloned()
            .collect())
    }

    async fn child(&self, child_id: ChildId) -> Result<Option<Child>> {
        let state = self.state.read().await;
        Ok(state.children.get(&child_id).cloned())
    }

    async fn get(&self, contract_id: ContractId) -> Result<Option<RecurringContract>> {
        let state = self.state.read().await;
        Ok(state.contracts.get(&contract_id).cloned())
    }

    async fn generate_invoices(&self, contract_ids: &[ContractId]) -> Result<Vec<InvoiceId>> {
        self.generate_invoices_on(contract_ids, Utc::now().date_naive())
            .await
    }
}

#[async_trait]
impl InvoiceStore for InMemoryLedger {
    async fn next_id(&self) -> Result<InvoiceId> {
        let state = self.state.read().await;
        Ok(state.next_invoice_id())
    }

    async fn store(&self, invoice: Invoice) -> Result<()> {
        let mut state = self.state.write().await;
        state.invoices.insert(invoice.id, invoice);
        Ok(())
    }

    async fn get(&self, invoice_id: InvoiceId) -> Result<Option<Invoice>> {
        let state = self.state.read().await;
        Ok(state.invoices.get(&invoice_id).cloned())
    }

    async fn remove(&self, invoice_id: InvoiceId) -> Result<()> {
        let mut state = self.state.write().await;
        state.invoices.remove(&invoice_id);
        Ok(())
    }

    async fn open_invoices(&self, partner_id: PartnerId) -> Result<Vec<Invoice>> {
        let state = self.state.read().await;
        Ok(state
            .invoices
            .values()
            .filter(|i| i.partner_id == partner_id && i.is_open())
            .cloned()
            .collect())
    }

    async fn all_invoices(&self) -> Result<Vec<Invoice>> {
        let state = self.state.read().await;
        Ok(state.invoices.values().cloned().collect())
    }
}

#[async_trait]
impl AppRegistry for InMemoryLedger {
    async fn has_app(&self, partner_id: PartnerId) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state.app_partners.contains(&partner_id))
    }
}

/// Records notifications instead of pushing them to devices.
#[derive(Default, Clone)]
pub struct InMemoryNotifier {
    sent: Arc<RwLock<Vec<Notification>>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<Notification> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl NotificationGateway for InMemoryNotifier {
    async fn send(&self, draft: NotificationDraft) -> Result<NotificationId> {
        let mut sent = self.sent.write().await;
        let id = sent.len() as NotificationId + 1;
        sent.push(Notification { id, draft });
        Ok(id)
    }
}

/// Holds scheduled jobs until the caller asks for the due ones.
#[derive(Default, Clone)]
pub struct InMemoryJobQueue {
    jobs: Arc<RwLock<Vec<ScheduledJob>>>,
}

impl InMemoryJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn pending(&self) -> Vec<ScheduledJob> {
        self.jobs.read().await.clone()
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn enqueue(&self, job: ScheduledJob) -> Result<()> {
        let mut jobs = self.jobs.write().await;
        jobs.push(job);
        Ok(())
    }

    async fn take_due(&self, now: DateTime<Utc>) -> Result<Vec<ScheduledJob>> {
        let mut jobs = self.jobs.write().await;
        let (mut due, pending): (Vec<_>, Vec<_>) = jobs.drain(..).partition(|j| j.is_due(now));
        *jobs = pending;
        due.sort_by_key(|j| j.eta);
        Ok(due)
    }
}

/// The in-memory adapters wired together.
#[derive(Default, Clone)]
pub struct InMemoryBackend {
    pub ledger: InMemoryLedger,
    pub notifier: InMemoryNotifier,
    pub jobs: InMemoryJobQueue,
}

impl InMemoryBackend {
    pub fn from_seed(seed: LedgerSeed) -> Self {
        Self {
            ledger: InMemoryLedger::from_seed(seed),
            notifier: InMemoryNotifier::new(),
            jobs: InMemoryJobQueue::new(),
        }
    }

    pub fn ports(&self) -> IntakePorts {
        IntakePorts {
            products: Box::new(self.ledger.clone()),
            contracts: Box::new(self.ledger.clone()),
            invoices: Box::new(self.ledger.clone()),
            apps: Box::new(self.ledger.clone()),
            notifications: Box::new(self.notifier.clone()),
            jobs: Box::new(self.jobs.clone()),
        }
    }
}
