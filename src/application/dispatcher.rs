use super::events::{AdminQuery, EventBus, EventHandler, EventKind, HostEvent};
use super::hooks::Hooks;
use crate::config::TrackingConfig;
use crate::domain::flag::BeaconFlag;
use crate::domain::hit::{DonationDetails, HitParameters};
use crate::domain::payment::{PaymentId, PaymentStatus};
use crate::domain::ports::{AuditLogBox, BeaconTransportBox, FlagStoreBox, PaymentRepositoryBox};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

pub const MISSING_TRACKING_ID_NOTE: &str =
    "Google Analytics donation tracking beacon could not send due to missing GA Tracking ID.";
pub const BEACON_SENT_NOTE: &str = "Google Analytics ecommerce tracking beacon sent.";

/// Runs after the platform's own status-change listeners.
pub const COMPLETION_PRIORITY: i32 = 110;
pub const REFUND_PRIORITY: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The completion flag was already set for this payment.
    AlreadySent,
    /// The transition was not `pending -> publish`.
    NotCompletion,
    /// No tracking ID configured; an audit note was written.
    MissingTrackingId,
    /// Another dispatch for the same payment is running.
    InFlight,
    Sent,
    /// The transport rejected the beacon. Nothing was recorded.
    Dropped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefundOutcome {
    NotPaymentUpdate,
    MissingPaymentId,
    NotRefunded,
    AlreadyFlagged,
    Flagged,
}

/// Forwards donation completions to the analytics collection endpoint.
///
/// Every collaborator is injected, so the dispatcher holds no global state
/// apart from the in-flight set that keeps concurrent notifications for the
/// same payment from sending twice.
pub struct BeaconDispatcher {
    config: TrackingConfig,
    hooks: Hooks,
    payments: PaymentRepositoryBox,
    flags: FlagStoreBox,
    audit: AuditLogBox,
    transport: BeaconTransportBox,
    in_flight: Mutex<HashSet<PaymentId>>,
}

struct InFlightClaim<'a> {
    set: &'a Mutex<HashSet<PaymentId>>,
    payment_id: PaymentId,
}

impl Drop for InFlightClaim<'_> {
    fn drop(&mut self) {
        let mut set = self.set.lock().unwrap_or_else(|e| e.into_inner());
        set.remove(&self.payment_id);
    }
}

impl BeaconDispatcher {
    /// Creates a dispatcher without extensions.
    ///
    /// # Arguments
    ///
    /// * `config` - Analytics settings.
    /// * `payments` - Read access to payment records.
    /// * `flags` - Store for the per-payment idempotency flags.
    /// * `audit` - Payment notes.
    /// * `transport` - HTTP client used for beacons.
    pub fn new(
        config: TrackingConfig,
        payments: PaymentRepositoryBox,
        flags: FlagStoreBox,
        audit: AuditLogBox,
        transport: BeaconTransportBox,
    ) -> Self {
        Self {
            config,
            hooks: Hooks::default(),
            payments,
            flags,
            audit,
            transport,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    /// Subscribes both triggers on the given bus.
    pub fn register(self: &Arc<Self>, bus: &mut EventBus) {
        bus.subscribe(
            EventKind::PaymentStatusChanged,
            COMPLETION_PRIORITY,
            Arc::new(CompletionHandler(Arc::clone(self))),
        );
        bus.subscribe(
            EventKind::AdminPageRendered,
            REFUND_PRIORITY,
            Arc::new(RefundHandler(Arc::clone(self))),
        );
    }

    /// Handles a payment status change.
    ///
    /// Offsite gateways often never send the donor back, so a completion is
    /// detected from the asynchronous `pending -> publish` flip alone.
    pub async fn check_completed_donation(
        &self,
        payment_id: &PaymentId,
        old_status: &PaymentStatus,
        new_status: &PaymentStatus,
    ) -> Result<CompletionOutcome> {
        if self
            .flags
            .get_flag(payment_id, BeaconFlag::CompletionBeaconSent)
            .await?
        {
            tracing::debug!(%payment_id, "completion beacon already sent");
            return Ok(CompletionOutcome::AlreadySent);
        }

        if *old_status != PaymentStatus::Pending || *new_status != PaymentStatus::Publish {
            tracing::debug!(%payment_id, %old_status, %new_status, "not a completion transition");
            return Ok(CompletionOutcome::NotCompletion);
        }

        let Some(_claim) = self.claim(payment_id) else {
            return Ok(CompletionOutcome::InFlight);
        };

        // A concurrent dispatch may have finished between the first check and the claim.
        if self
            .flags
            .get_flag(payment_id, BeaconFlag::CompletionBeaconSent)
            .await?
        {
            return Ok(CompletionOutcome::AlreadySent);
        }

        self.dispatch(payment_id).await
    }

    /// Builds and sends the completion beacon without looking at the flag.
    pub async fn send_completed_beacon(&self, payment_id: &PaymentId) -> Result<CompletionOutcome> {
        let Some(_claim) = self.claim(payment_id) else {
            return Ok(CompletionOutcome::InFlight);
        };
        self.dispatch(payment_id).await
    }

    async fn dispatch(&self, payment_id: &PaymentId) -> Result<CompletionOutcome> {
        if self.config.tracking_id().is_none() {
            tracing::warn!(%payment_id, "no tracking ID configured, beacon not sent");
            self.audit
                .write_note(payment_id, MISSING_TRACKING_ID_NOTE)
                .await?;
            return Ok(CompletionOutcome::MissingTrackingId);
        }

        let form_id = self.payments.payment_form_id(payment_id).await?;
        let donation = DonationDetails {
            payment_id: payment_id.clone(),
            form_title: self.payments.form_title(&form_id).await?,
            total: self.payments.payment_amount(payment_id).await?,
            form_id,
        };

        let hit = HitParameters::completed_donation(&self.config, &donation);
        let hit = self.hooks.extend_hit_parameters(hit, payment_id);
        let url = hit.collect_url(&self.config.endpoint);

        let response = self.transport.send(&url).await;

        if response.is_accepted() {
            self.flags
                .set_flag(payment_id, BeaconFlag::CompletionBeaconSent, true)
                .await?;
            self.audit.write_note(payment_id, BEACON_SENT_NOTE).await?;
            tracing::info!(%payment_id, status = ?response.status, "completion beacon sent");
            Ok(CompletionOutcome::Sent)
        } else {
            tracing::warn!(
                %payment_id,
                status = ?response.status,
                error = response.error.as_deref().unwrap_or_default(),
                "completion beacon dropped"
            );
            Ok(CompletionOutcome::Dropped)
        }
    }

    /// Records the refund flag once an operator has moved a payment to `refunded`.
    ///
    /// Only the flag is written; no request goes to the endpoint.
    pub async fn flag_refund_beacon(&self, query: &AdminQuery) -> Result<RefundOutcome> {
        if !query.is_payment_update() {
            return Ok(RefundOutcome::NotPaymentUpdate);
        }

        let Some(payment_id) = query.payment_id() else {
            return Ok(RefundOutcome::MissingPaymentId);
        };

        if self.payments.payment_status(&payment_id).await? != PaymentStatus::Refunded {
            tracing::debug!(%payment_id, "updated payment is not refunded");
            return Ok(RefundOutcome::NotRefunded);
        }

        if self
            .flags
            .get_flag(&payment_id, BeaconFlag::RefundBeaconSent)
            .await?
        {
            return Ok(RefundOutcome::AlreadyFlagged);
        }

        if self
            .flags
            .set_flag_if_absent(&payment_id, BeaconFlag::RefundBeaconSent)
            .await?
        {
            tracing::info!(%payment_id, "refund flagged");
            Ok(RefundOutcome::Flagged)
        } else {
            Ok(RefundOutcome::AlreadyFlagged)
        }
    }

    /// Whether a front-end completion beacon may still be emitted for this payment.
    pub async fn should_send_beacon(&self, payment_id: &PaymentId) -> Result<bool> {
        if self
            .flags
            .get_flag(payment_id, BeaconFlag::CompletionBeaconSent)
            .await?
        {
            return Ok(false);
        }

        if self.payments.payment_status(payment_id).await? != PaymentStatus::Publish {
            return Ok(false);
        }

        if !self.config.tracks_current_mode() {
            return Ok(false);
        }

        Ok(self.hooks.filter_should_send(true, payment_id))
    }

    fn claim(&self, payment_id: &PaymentId) -> Option<InFlightClaim<'_>> {
        let mut set = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if !set.insert(payment_id.clone()) {
            tracing::debug!(%payment_id, "completion dispatch already in flight");
            return None;
        }
        Some(InFlightClaim {
            set: &self.in_flight,
            payment_id: payment_id.clone(),
        })
    }
}

struct CompletionHandler(Arc<BeaconDispatcher>);

#[async_trait]
impl EventHandler for CompletionHandler {
    async fn handle(&self, event: &HostEvent) -> Result<()> {
        if let HostEvent::PaymentStatusChanged {
            payment_id,
            old_status,
            new_status,
        } = event
        {
            let outcome = self
                .0
                .check_completed_donation(payment_id, old_status, new_status)
                .await?;
            tracing::debug!(%payment_id, ?outcome, "completion check done");
        }
        Ok(())
    }
}

struct RefundHandler(Arc<BeaconDispatcher>);

#[async_trait]
impl EventHandler for RefundHandler {
    async fn handle(&self, event: &HostEvent) -> Result<()> {
        if let HostEvent::AdminPageRendered(query) = event {
            let outcome = self.0.flag_refund_beacon(query).await?;
            tracing::debug!(?outcome, "refund check done");
        }
        Ok(())
    }
}
