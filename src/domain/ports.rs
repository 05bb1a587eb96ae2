use super::flag::BeaconFlag;
use super::payment::{FormId, PaymentId, PaymentStatus};
use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Read-only view of the donation platform's payment records.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn payment_status(&self, payment_id: &PaymentId) -> Result<PaymentStatus>;
    async fn payment_form_id(&self, payment_id: &PaymentId) -> Result<FormId>;
    async fn payment_amount(&self, payment_id: &PaymentId) -> Result<Decimal>;
    async fn form_title(&self, form_id: &FormId) -> Result<String>;
}

/// Per-payment metadata store holding the idempotency flags.
#[async_trait]
pub trait FlagStore: Send + Sync {
    async fn get_flag(&self, payment_id: &PaymentId, flag: BeaconFlag) -> Result<bool>;
    async fn set_flag(&self, payment_id: &PaymentId, flag: BeaconFlag, value: bool) -> Result<()>;
    /// Sets the flag only if it is not already set. Returns `true` when this
    /// call performed the transition.
    async fn set_flag_if_absent(&self, payment_id: &PaymentId, flag: BeaconFlag) -> Result<bool>;
}

/// Payment notes shown to operators on the payment details screen.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn write_note(&self, payment_id: &PaymentId, message: &str) -> Result<()>;
    async fn notes(&self, payment_id: &PaymentId) -> Result<Vec<String>>;
}

/// Result of one beacon request as reported by the transport.
///
/// Both fields are independent: a transport may report an error and still
/// carry a status code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeaconResponse {
    pub error: Option<String>,
    pub status: Option<u16>,
}

impl BeaconResponse {
    pub fn ok(status: u16) -> Self {
        Self {
            error: None,
            status: Some(status),
        }
    }

    pub fn failed(error: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            error: Some(error.into()),
            status,
        }
    }

    /// Whether the beacon counts as delivered.
    ///
    /// This is "no transport error OR status 200", not AND: any response that
    /// reached the transport without an error is accepted whatever its status.
    pub fn is_accepted(&self) -> bool {
        self.error.is_none() || self.status == Some(200)
    }
}

/// Sends a single GET to the analytics collection endpoint.
#[async_trait]
pub trait BeaconTransport: Send + Sync {
    async fn send(&self, url: &str) -> BeaconResponse;
}

pub type PaymentRepositoryBox = Box<dyn PaymentRepository>;
pub type FlagStoreBox = Box<dyn FlagStore>;
pub type AuditLogBox = Box<dyn AuditLog>;
pub type BeaconTransportBox = Box<dyn BeaconTransport>;
