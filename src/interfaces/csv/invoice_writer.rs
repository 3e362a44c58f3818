use crate::domain::catalog::ProductCategory;
use crate::domain::invoice::{Invoice, InvoiceCategory, PaymentState, PostingState};
use crate::domain::money::Amount;
use crate::domain::{ContractId, InvoiceId, PartnerId, ProductId};
use crate::error::Result;
use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct InvoiceLineRecord<'a> {
    invoice: InvoiceId,
    partner: PartnerId,
    date: NaiveDate,
    state: PostingState,
    payment_state: PaymentState,
    invoice_category: InvoiceCategory,
    product: ProductId,
    name: &'a str,
    category: ProductCategory,
    contract: Option<ContractId>,
    quantity: u32,
    price_unit: Amount,
}

/// Writes invoices as CSV, one record per invoice line.
pub struct InvoiceWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> InvoiceWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_invoices(&mut self, invoices: &[Invoice]) -> Result<()> {
        for invoice in invoices {
            let invoice_category = invoice.category();
            for line in &invoice.lines {
                self.writer.serialize(InvoiceLineRecord {
                    invoice: invoice.id,
                    partner: invoice.partner_id,
                    date: invoice.date,
                    state: invoice.state,
                    payment_state: invoice.payment_state,
                    invoice_category,
                    product: line.product_id,
                    name: &line.name,
                    category: line.category,
                    contract: line.contract_id,
                    quantity: line.quantity,
                    price_unit: line.price_unit,
                })?;
            }
        }
        self.writer.flush()?;
        Ok(())
    }
}
