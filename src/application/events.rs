use crate::domain::payment::{PaymentId, PaymentStatus};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Admin screen the operator lands on after saving a payment.
pub const PAYMENT_HISTORY_PAGE: &str = "give-payment-history";
/// Message shown on that screen once the update went through.
pub const PAYMENT_UPDATED_MESSAGE: &str = "payment-updated";

/// Query parameters of an operator page render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminQuery {
    pub page: Option<String>,
    pub message: Option<String>,
    pub id: Option<String>,
}

impl AdminQuery {
    /// Builds the query from raw `key=value` pairs as found in the request URL.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut query = AdminQuery::default();
        for (key, value) in pairs {
            match key {
                "page" => query.page = Some(value.to_string()),
                "give-message" | "message" => query.message = Some(value.to_string()),
                "id" => query.id = Some(value.to_string()),
                _ => {}
            }
        }
        query
    }

    /// The operator just saved a payment on the payment history screen.
    pub fn is_payment_update(&self) -> bool {
        self.page.as_deref() == Some(PAYMENT_HISTORY_PAGE)
            && self.message.as_deref() == Some(PAYMENT_UPDATED_MESSAGE)
    }

    pub fn payment_id(&self) -> Option<PaymentId> {
        self.id.as_deref().map(PaymentId::new)
    }
}

/// Signals emitted by the donation platform.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    PaymentStatusChanged {
        payment_id: PaymentId,
        old_status: PaymentStatus,
        new_status: PaymentStatus,
    },
    AdminPageRendered(AdminQuery),
}

impl HostEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            HostEvent::PaymentStatusChanged { .. } => EventKind::PaymentStatusChanged,
            HostEvent::AdminPageRendered(_) => EventKind::AdminPageRendered,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PaymentStatusChanged,
    AdminPageRendered,
}

#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &HostEvent) -> Result<()>;
}

struct Registration {
    kind: EventKind,
    priority: i32,
    handler: Arc<dyn EventHandler>,
}

/// Registration table routing host signals to handlers.
///
/// Handlers for the same signal run by ascending priority, ties in
/// registration order. A failing handler is logged and never stops the
/// platform workflow that emitted the signal.
#[derive(Default)]
pub struct EventBus {
    registrations: Vec<Registration>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, kind: EventKind, priority: i32, handler: Arc<dyn EventHandler>) {
        let index = self
            .registrations
            .iter()
            .position(|r| r.priority > priority)
            .unwrap_or(self.registrations.len());
        self.registrations.insert(
            index,
            Registration {
                kind,
                priority,
                handler,
            },
        );
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.registrations.iter().filter(|r| r.kind == kind).count()
    }

    /// Runs every handler subscribed to this event. Returns how many ran.
    pub async fn publish(&self, event: &HostEvent) -> usize {
        let kind = event.kind();
        let mut ran = 0;
        for registration in self.registrations.iter().filter(|r| r.kind == kind) {
            if let Err(e) = registration.handler.handle(event).await {
                tracing::warn!(?kind, error = %e, "event handler failed");
            }
            ran += 1;
        }
        ran
    }
}
