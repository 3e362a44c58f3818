use super::{ChildId, ProductId, ProductTemplateId};
use serde::{Deserialize, Serialize};

/// Accounting category of a product, which decides how a donation line is
/// treated during reconciliation.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Sponsorship,
    Gift,
    Fund,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Product {
    pub id: ProductId,
    /// The mobile app references products by template.
    pub template_id: ProductTemplateId,
    pub name: String,
    pub category: ProductCategory,
}

impl Product {
    pub fn is_sponsorship(&self) -> bool {
        self.category == ProductCategory::Sponsorship
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Child {
    pub id: ChildId,
    pub preferred_name: String,
}
