use std::fmt;

/// Per-payment idempotency markers.
///
/// Each flag goes from absent to set at most once and is never cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BeaconFlag {
    /// A completion beacon was accepted by the collection endpoint.
    CompletionBeaconSent,
    /// The payment was seen in `refunded` status after an operator update.
    RefundBeaconSent,
}

impl BeaconFlag {
    /// Metadata key used by the donation platform for this flag.
    pub fn meta_key(&self) -> &'static str {
        match self {
            BeaconFlag::CompletionBeaconSent => "_give_ga_beacon_sent",
            BeaconFlag::RefundBeaconSent => "_give_ga_refund_beacon_sent",
        }
    }
}

impl fmt::Display for BeaconFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.meta_key())
    }
}
