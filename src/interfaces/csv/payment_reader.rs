use crate::domain::payment::{FormId, PaymentId, PaymentStatus};
use crate::error::{BeaconError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// One exported payment: identifiers, form title, current status and total.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct PaymentRow {
    pub payment: PaymentId,
    pub form: FormId,
    pub form_title: String,
    pub status: PaymentStatus,
    pub amount: Decimal,
}

/// Reads payment snapshots from a CSV source.
pub struct PaymentReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> PaymentReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn payments(self) -> impl Iterator<Item = Result<PaymentRow>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(BeaconError::from))
    }
}
