//! Domain layer: donation payloads, catalog records, contracts, invoices and
//! the ports through which the host framework supplies them.

pub mod catalog;
pub mod contract;
pub mod donation;
pub mod invoice;
pub mod job;
pub mod money;
pub mod notification;
pub mod payload;
pub mod ports;

pub type PartnerId = u64;
pub type ChildId = u64;
pub type ProductId = u64;
pub type ProductTemplateId = u64;
pub type ContractId = u64;
pub type InvoiceId = u64;
pub type NotificationId = u64;
