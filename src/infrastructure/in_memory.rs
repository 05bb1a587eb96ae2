use crate::domain::flag::BeaconFlag;
use crate::domain::payment::{FormId, PaymentId, PaymentStatus};
use crate::domain::ports::{AuditLog, BeaconResponse, BeaconTransport, FlagStore, PaymentRepository};
use crate::error::{BeaconError, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq)]
struct PaymentRecord {
    form_id: FormId,
    status: PaymentStatus,
    amount: Decimal,
}

/// In-memory stand-in for the platform's payment and form records.
///
/// Clones share the same underlying maps.
#[derive(Default, Clone)]
pub struct InMemoryPaymentRepository {
    payments: Arc<RwLock<HashMap<PaymentId, PaymentRecord>>>,
    forms: Arc<RwLock<HashMap<FormId, String>>>,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_payment(
        &self,
        payment_id: PaymentId,
        form_id: FormId,
        status: PaymentStatus,
        amount: Decimal,
    ) {
        let mut payments = self.payments.write().await;
        payments.insert(
            payment_id,
            PaymentRecord {
                form_id,
                status,
                amount,
            },
        );
    }

    pub async fn insert_form(&self, form_id: FormId, title: impl Into<String>) {
        let mut forms = self.forms.write().await;
        forms.insert(form_id, title.into());
    }

    /// Updates the stored status. Returns `false` for unknown payments.
    pub async fn set_status(&self, payment_id: &PaymentId, status: PaymentStatus) -> bool {
        let mut payments = self.payments.write().await;
        match payments.get_mut(payment_id) {
            Some(record) => {
                record.status = status;
                true
            }
            None => false,
        }
    }

    /// All known payment IDs in ascending order.
    pub async fn payment_ids(&self) -> Vec<PaymentId> {
        let payments = self.payments.read().await;
        let mut ids: Vec<PaymentId> = payments.keys().cloned().collect();
        ids.sort();
        ids
    }

    async fn record(&self, payment_id: &PaymentId) -> Result<PaymentRecord> {
        let payments = self.payments.read().await;
        payments
            .get(payment_id)
            .cloned()
            .ok_or_else(|| BeaconError::PaymentNotFound(payment_id.clone()))
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn payment_status(&self, payment_id: &PaymentId) -> Result<PaymentStatus> {
        Ok(self.record(payment_id).await?.status)
    }

    async fn payment_form_id(&self, payment_id: &PaymentId) -> Result<FormId> {
        Ok(self.record(payment_id).await?.form_id)
    }

    async fn payment_amount(&self, payment_id: &PaymentId) -> Result<Decimal> {
        Ok(self.record(payment_id).await?.amount)
    }

    async fn form_title(&self, form_id: &FormId) -> Result<String> {
        let forms = self.forms.read().await;
        forms
            .get(form_id)
            .cloned()
            .ok_or_else(|| BeaconError::FormNotFound(form_id.clone()))
    }
}

/// A thread-safe in-memory flag store.
///
/// Check-and-set happens under a single write lock, so concurrent callers
/// cannot both observe the flag as absent.
#[derive(Default, Clone)]
pub struct InMemoryFlagStore {
    flags: Arc<RwLock<HashSet<(PaymentId, BeaconFlag)>>>,
}

impl InMemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FlagStore for InMemoryFlagStore {
    async fn get_flag(&self, payment_id: &PaymentId, flag: BeaconFlag) -> Result<bool> {
        let flags = self.flags.read().await;
        Ok(flags.contains(&(payment_id.clone(), flag)))
    }

    async fn set_flag(&self, payment_id: &PaymentId, flag: BeaconFlag, value: bool) -> Result<()> {
        let mut flags = self.flags.write().await;
        if value {
            flags.insert((payment_id.clone(), flag));
        } else {
            flags.remove(&(payment_id.clone(), flag));
        }
        Ok(())
    }

    async fn set_flag_if_absent(&self, payment_id: &PaymentId, flag: BeaconFlag) -> Result<bool> {
        let mut flags = self.flags.write().await;
        Ok(flags.insert((payment_id.clone(), flag)))
    }
}

/// Payment notes kept in memory, in insertion order per payment.
#[derive(Default, Clone)]
pub struct InMemoryAuditLog {
    notes: Arc<RwLock<HashMap<PaymentId, Vec<String>>>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditLog for InMemoryAuditLog {
    async fn write_note(&self, payment_id: &PaymentId, message: &str) -> Result<()> {
        let mut notes = self.notes.write().await;
        notes
            .entry(payment_id.clone())
            .or_default()
            .push(message.to_string());
        Ok(())
    }

    async fn notes(&self, payment_id: &PaymentId) -> Result<Vec<String>> {
        let notes = self.notes.read().await;
        Ok(notes.get(payment_id).cloned().unwrap_or_default())
    }
}

/// Transport that records every beacon URL instead of sending it.
///
/// Answers with a configurable response; used for dry runs and tests.
#[derive(Clone)]
pub struct RecordingTransport {
    urls: Arc<Mutex<Vec<String>>>,
    response: Arc<Mutex<BeaconResponse>>,
}

impl RecordingTransport {
    pub fn new(response: BeaconResponse) -> Self {
        Self {
            urls: Arc::new(Mutex::new(Vec::new())),
            response: Arc::new(Mutex::new(response)),
        }
    }

    pub fn respond_with(&self, response: BeaconResponse) {
        *self.response.lock().unwrap_or_else(|e| e.into_inner()) = response;
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Default for RecordingTransport {
    fn default() -> Self {
        Self::new(BeaconResponse::ok(200))
    }
}

#[async_trait]
impl BeaconTransport for RecordingTransport {
    async fn send(&self, url: &str) -> BeaconResponse {
        tracing::debug!(url, "beacon recorded");
        self.urls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(url.to_string());
        self.response
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
