use super::{InvoiceId, NotificationId, PartnerId, ProductTemplateId};
use serde::{Deserialize, Serialize};

/// Push notification content handed over to the messaging module.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct NotificationDraft {
    pub topic: String,
    /// Screen of the app the notification opens.
    pub destination: String,
    pub product_template_id: Option<ProductTemplateId>,
    pub partner_ids: Vec<PartnerId>,
    pub title: String,
    pub body: String,
    pub invoice_id: InvoiceId,
}

/// A notification once created and sent.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Notification {
    pub id: NotificationId,
    #[serde(flatten)]
    pub draft: NotificationDraft,
}
