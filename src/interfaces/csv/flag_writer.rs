use crate::domain::payment::PaymentId;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

/// Flag state of one payment after a replay.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct FlagRow {
    pub payment: PaymentId,
    pub completion_beacon_sent: bool,
    pub refund_beacon_sent: bool,
}

pub struct FlagWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> FlagWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_flags<I>(&mut self, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = FlagRow>,
    {
        for row in rows {
            self.writer.serialize(row)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
