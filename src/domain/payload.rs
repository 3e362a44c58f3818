use super::money::Amount;
use super::{ChildId, PartnerId, ProductTemplateId};
use serde::{Deserialize, Deserializer, Serialize};

/// Donation request as posted by the mobile app.
///
/// Field names follow the app's wire format. Fund donations come as the
/// parallel `appealtype`/`appealamount` arrays; child gifts and sponsorship
/// payments as the parallel `gifttype`/`giftamount`/`need` arrays.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
pub struct DonationPayload {
    #[serde(default, deserialize_with = "lenient_id")]
    pub supporter: PartnerId,
    #[serde(rename = "LastInsertedDonationId", default)]
    pub last_inserted_donation_id: Option<serde_json::Value>,
    #[serde(rename = "LastInsertedGiftId", default)]
    pub last_inserted_gift_id: Option<serde_json::Value>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(rename = "appealtype", default)]
    pub fund_products: Vec<ProductTemplateId>,
    #[serde(rename = "appealamount", default)]
    pub fund_amounts: Vec<Amount>,
    #[serde(rename = "gifttype", default)]
    pub gift_products: Vec<ProductTemplateId>,
    #[serde(rename = "giftamount", default)]
    pub gift_amounts: Vec<Amount>,
    #[serde(rename = "need", default)]
    pub children: Vec<ChildId>,
}

impl DonationPayload {
    /// The app resends payloads it already recorded, flagged by one of the
    /// `LastInserted*` markers.
    pub fn is_already_treated(&self) -> bool {
        is_truthy(&self.last_inserted_donation_id) || is_truthy(&self.last_inserted_gift_id)
    }
}

fn is_truthy(value: &Option<serde_json::Value>) -> bool {
    use serde_json::Value;
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

/// Accepts an id as a number, a numeric string, an empty string or null.
fn lenient_id<'de, D>(deserializer: D) -> Result<PartnerId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    match Option::<RawId>::deserialize(deserializer)? {
        None => Ok(0),
        Some(RawId::Number(id)) => Ok(id),
        Some(RawId::Text(text)) if text.trim().is_empty() => Ok(0),
        Some(RawId::Text(text)) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid supporter id '{text}'"))),
    }
}
