use crate::domain::PartnerId;
use crate::domain::catalog::{Child, Product};
use crate::domain::contract::RecurringContract;
use crate::domain::invoice::Invoice;
use crate::error::Result;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Initial content of an in-memory ledger, usually loaded from a JSON file.
#[derive(Debug, Deserialize, PartialEq, Clone, Default)]
pub struct LedgerSeed {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub children: Vec<Child>,
    #[serde(default)]
    pub contracts: Vec<RecurringContract>,
    #[serde(default)]
    pub invoices: Vec<Invoice>,
    /// Partners with the mobile app installed.
    #[serde(default)]
    pub app_partners: Vec<PartnerId>,
}

impl LedgerSeed {
    pub fn from_reader<R: Read>(source: R) -> Result<Self> {
        Ok(serde_json::from_reader(source)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}
