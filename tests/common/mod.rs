#![allow(dead_code)]

use chrono::NaiveDate;
use donation_intake::application::intake::DonationIntake;
use donation_intake::config::IntakeConfig;
use donation_intake::domain::catalog::{Child, Product, ProductCategory};
use donation_intake::domain::contract::{ContractState, RecurringContract};
use donation_intake::domain::invoice::{Invoice, InvoiceLine};
use donation_intake::domain::money::Amount;
use donation_intake::domain::payload::DonationPayload;
use donation_intake::infrastructure::in_memory::InMemoryBackend;
use donation_intake::infrastructure::seed::LedgerSeed;
use rust_decimal::Decimal;

pub const DONOR: u64 = 100;
pub const SPONSORSHIP_TEMPLATE: u64 = 10;
pub const GIFT_TEMPLATE: u64 = 20;
pub const FUND_TEMPLATE: u64 = 30;

/// Child of the contract with the same index; contract ids start at 1.
pub fn child_of(contract_id: u64) -> u64 {
    69 + contract_id
}

/// A ledger with the three product kinds and `contracts` active sponsorships
/// of `DONOR`. Monthly amounts are zero so no invoice gets generated.
pub fn seed(contracts: u64, invoices: Vec<Invoice>) -> LedgerSeed {
    let product = |id, template_id, name: &str, category| Product {
        id,
        template_id,
        name: name.to_string(),
        category,
    };
    LedgerSeed {
        products: vec![
            product(1, SPONSORSHIP_TEMPLATE, "Sponsorship", ProductCategory::Sponsorship),
            product(2, GIFT_TEMPLATE, "Birthday gift", ProductCategory::Gift),
            product(3, FUND_TEMPLATE, "Water fund", ProductCategory::Fund),
        ],
        children: (1..=contracts)
            .map(|id| Child {
                id: child_of(id),
                preferred_name: format!("Child {id}"),
            })
            .collect(),
        contracts: (1..=contracts)
            .map(|id| RecurringContract {
                id,
                child_id: child_of(id),
                partner_id: DONOR,
                correspondent_id: None,
                monthly_amount: Amount::ZERO,
                state: ContractState::Active,
            })
            .collect(),
        invoices,
        app_partners: vec![DONOR],
    }
}

pub fn amount(value: Decimal) -> Amount {
    Amount::new(value).unwrap()
}

pub fn sponsorship_line(contract_id: u64, price: Decimal) -> InvoiceLine {
    InvoiceLine {
        product_id: 1,
        product_template_id: SPONSORSHIP_TEMPLATE,
        category: ProductCategory::Sponsorship,
        name: "Sponsorship".to_string(),
        quantity: 1,
        price_unit: amount(price),
        contract_id: Some(contract_id),
    }
}

/// A posted, unpaid sponsorship invoice of `DONOR`.
pub fn sponsorship_invoice(id: u64, lines: Vec<InvoiceLine>) -> Invoice {
    let mut invoice = Invoice::new(id, DONOR, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    invoice.add_lines(lines).unwrap();
    invoice.post();
    invoice
}

/// Sponsorship payments of `DONOR` for each `(contract, amount)` pair.
pub fn sponsorship_payload(payments: &[(u64, Decimal)]) -> DonationPayload {
    DonationPayload {
        supporter: DONOR,
        gift_products: payments.iter().map(|_| SPONSORSHIP_TEMPLATE).collect(),
        gift_amounts: payments.iter().map(|&(_, a)| amount(a)).collect(),
        children: payments.iter().map(|&(c, _)| child_of(c)).collect(),
        ..Default::default()
    }
}

pub fn intake(backend: &InMemoryBackend) -> DonationIntake {
    DonationIntake::new(backend.ports(), IntakeConfig::default())
}
