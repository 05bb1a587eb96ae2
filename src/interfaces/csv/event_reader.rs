use crate::application::events::{AdminQuery, HostEvent, PAYMENT_HISTORY_PAGE, PAYMENT_UPDATED_MESSAGE};
use crate::domain::payment::{PaymentId, PaymentStatus};
use crate::error::{BeaconError, Result};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    StatusChanged,
    AdminPage,
}

/// Raw event log row.
///
/// `status_changed` rows need `payment`, `old_status` and `new_status`.
/// `admin_page` rows use `payment` as the page's `id` parameter; `page` and
/// `message` default to the payment-updated screen when left blank.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct EventRow {
    pub r#type: EventType,
    pub payment: Option<PaymentId>,
    pub old_status: Option<PaymentStatus>,
    pub new_status: Option<PaymentStatus>,
    pub page: Option<String>,
    pub message: Option<String>,
}

impl TryFrom<EventRow> for HostEvent {
    type Error = BeaconError;

    fn try_from(row: EventRow) -> Result<Self> {
        match row.r#type {
            EventType::StatusChanged => {
                let (Some(payment_id), Some(old_status), Some(new_status)) =
                    (row.payment, row.old_status, row.new_status)
                else {
                    return Err(BeaconError::InvalidEvent(
                        "status_changed needs payment, old_status and new_status".to_string(),
                    ));
                };
                Ok(HostEvent::PaymentStatusChanged {
                    payment_id,
                    old_status,
                    new_status,
                })
            }
            EventType::AdminPage => Ok(HostEvent::AdminPageRendered(AdminQuery {
                page: Some(row.page.unwrap_or_else(|| PAYMENT_HISTORY_PAGE.to_string())),
                message: Some(row.message.unwrap_or_else(|| PAYMENT_UPDATED_MESSAGE.to_string())),
                id: row.payment.map(|id| id.to_string()),
            })),
        }
    }
}

/// Reads host events from a CSV event log, in file order.
pub struct EventReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> EventReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily yields events; a bad row only fails that item.
    pub fn events(self) -> impl Iterator<Item = Result<HostEvent>> {
        self.reader.into_deserialize::<EventRow>().map(|result| {
            result
                .map_err(BeaconError::from)
                .and_then(HostEvent::try_from)
        })
    }
}
