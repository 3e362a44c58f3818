use crate::domain::catalog::Product;
use crate::domain::contract::RecurringContract;
use crate::domain::donation::{ChildPayment, DonationRequest, FundDonation};
use crate::domain::payload::DonationPayload;
use crate::domain::ports::{ContractStore, ProductCatalog};
use crate::domain::{ChildId, PartnerId, ProductTemplateId};
use crate::error::{IntakeError, Result};

/// Resolves the product and contract references of a mobile payload.
pub struct PayloadInterpreter<'a> {
    products: &'a dyn ProductCatalog,
    contracts: &'a dyn ContractStore,
    default_source: &'a str,
}

impl<'a> PayloadInterpreter<'a> {
    pub fn new(
        products: &'a dyn ProductCatalog,
        contracts: &'a dyn ContractStore,
        default_source: &'a str,
    ) -> Self {
        Self {
            products,
            contracts,
            default_source,
        }
    }

    /// Splits the payload into fund donations, sponsorship payments and child
    /// gifts.
    ///
    /// Fails on the first product or contract that cannot be resolved; a child
    /// entry needs exactly one open contract involving the donor.
    pub async fn interpret(&self, payload: &DonationPayload) -> Result<DonationRequest> {
        let fund_products = payload.fund_products.len();
        let gift_products = payload.gift_products.len();
        ensure_same_len("appealtype", fund_products, "appealamount", payload.fund_amounts.len())?;
        ensure_same_len("gifttype", gift_products, "giftamount", payload.gift_amounts.len())?;
        ensure_same_len("gifttype", gift_products, "need", payload.children.len())?;

        let partner_id = payload.supporter;
        let mut request = DonationRequest {
            partner_id,
            source: payload
                .source
                .clone()
                .unwrap_or_else(|| self.default_source.to_string()),
            already_treated: payload.is_already_treated(),
            ..Default::default()
        };

        for (&template_id, &amount) in payload.fund_products.iter().zip(&payload.fund_amounts) {
            let product = self.product(template_id).await?;
            request.fund_donations.push(FundDonation { product, amount });
        }

        let gifts = payload
            .gift_products
            .iter()
            .zip(&payload.gift_amounts)
            .zip(&payload.children);
        for ((&template_id, &amount), &child_id) in gifts {
            let product = self.product(template_id).await?;
            let contract = self.contract(child_id, partner_id).await?;
            let payment = ChildPayment {
                product,
                amount,
                contract,
            };
            if payment.product.is_sponsorship() {
                request.sponsorship_payments.push(payment);
            } else {
                request.child_gifts.push(payment);
            }
        }

        Ok(request)
    }

    async fn product(&self, template_id: ProductTemplateId) -> Result<Product> {
        self.products
            .find_by_template(template_id)
            .await?
            .ok_or(IntakeError::ProductNotFound(template_id))
    }

    async fn contract(&self, child: ChildId, partner: PartnerId) -> Result<RecurringContract> {
        let mut found = self.contracts.find_open_for_child(child, partner).await?;
        match found.len() {
            0 => Err(IntakeError::ContractNotFound { child, partner }),
            1 => Ok(found.remove(0)),
            count => Err(IntakeError::AmbiguousContract {
                child,
                partner,
                count,
            }),
        }
    }
}

fn ensure_same_len(left: &str, left_len: usize, right: &str, right_len: usize) -> Result<()> {
    if left_len == right_len {
        Ok(())
    } else {
        Err(IntakeError::MalformedPayload(format!(
            "'{left}' has {left_len} entries but '{right}' has {right_len}"
        )))
    }
}
