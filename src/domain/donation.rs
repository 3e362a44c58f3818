use super::catalog::Product;
use super::contract::RecurringContract;
use super::invoice::InvoiceLine;
use super::money::Amount;
use super::{ContractId, PartnerId};
use std::collections::{BTreeSet, HashMap};

/// One-time donation to a fund.
#[derive(Debug, PartialEq, Clone)]
pub struct FundDonation {
    pub product: Product,
    pub amount: Amount,
}

/// A payment tied to a child, either a sponsorship payment or a gift.
#[derive(Debug, PartialEq, Clone)]
pub struct ChildPayment {
    pub product: Product,
    pub amount: Amount,
    pub contract: RecurringContract,
}

/// A mobile donation once products and contracts are resolved.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct DonationRequest {
    pub partner_id: PartnerId,
    pub source: String,
    pub already_treated: bool,
    pub fund_donations: Vec<FundDonation>,
    pub sponsorship_payments: Vec<ChildPayment>,
    pub child_gifts: Vec<ChildPayment>,
}

impl DonationRequest {
    pub fn sponsorship_total(&self) -> Amount {
        self.sponsorship_payments.iter().map(|p| p.amount).sum()
    }

    pub fn sponsorship_contracts(&self) -> BTreeSet<ContractId> {
        self.sponsorship_payments
            .iter()
            .map(|p| p.contract.id)
            .collect()
    }

    /// Whether the donor pays the same sponsorship more than once, e.g. to
    /// cover several months at a time.
    pub fn is_multiple_months_payment(&self) -> bool {
        let mut per_contract: HashMap<ContractId, usize> = HashMap::new();
        for payment in &self.sponsorship_payments {
            *per_contract.entry(payment.contract.id).or_default() += 1;
        }
        per_contract.values().any(|&count| count > 1)
    }

    /// Invoice lines for everything but the sponsorship payments: child gifts
    /// first, then fund donations.
    pub fn donation_lines(&self) -> Vec<InvoiceLine> {
        let gifts = self
            .child_gifts
            .iter()
            .map(|g| InvoiceLine::for_product(&g.product, g.amount, Some(g.contract.id)));
        let funds = self
            .fund_donations
            .iter()
            .map(|f| InvoiceLine::for_product(&f.product, f.amount, None));
        gifts.chain(funds).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fund_donations.is_empty()
            && self.sponsorship_payments.is_empty()
            && self.child_gifts.is_empty()
    }
}
