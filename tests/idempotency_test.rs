use donation_beacon::application::dispatcher::{BEACON_SENT_NOTE, BeaconDispatcher};
use donation_beacon::application::events::{AdminQuery, EventBus, HostEvent};
use donation_beacon::config::TrackingConfig;
use donation_beacon::domain::flag::BeaconFlag;
use donation_beacon::domain::payment::{FormId, PaymentId, PaymentStatus};
use donation_beacon::domain::ports::{AuditLog, FlagStore};
use donation_beacon::infrastructure::in_memory::{
    InMemoryAuditLog, InMemoryFlagStore, InMemoryPaymentRepository, RecordingTransport,
};
use rand::Rng;
use rand::seq::SliceRandom;
use rust_decimal_macros::dec;
use std::sync::Arc;

const STATUSES: [PaymentStatus; 5] = [
    PaymentStatus::Pending,
    PaymentStatus::Publish,
    PaymentStatus::Refunded,
    PaymentStatus::Failed,
    PaymentStatus::Processing,
];

fn config() -> TrackingConfig {
    TrackingConfig {
        tracking_id: Some("UA-123".to_string()),
        ..TrackingConfig::default()
    }
}

#[tokio::test]
async fn test_random_event_streams_send_at_most_once_per_payment() {
    let payments = InMemoryPaymentRepository::new();
    payments.insert_form(FormId::new("1"), "General Fund").await;
    let ids: Vec<PaymentId> = (1..=25).map(|i| PaymentId::new(format!("P{i}"))).collect();
    for id in &ids {
        payments
            .insert_payment(id.clone(), FormId::new("1"), PaymentStatus::Pending, dec!(5))
            .await;
    }

    let flags = InMemoryFlagStore::new();
    let audit = InMemoryAuditLog::new();
    let transport = RecordingTransport::default();
    let dispatcher = Arc::new(BeaconDispatcher::new(
        config(),
        Box::new(payments.clone()),
        Box::new(flags.clone()),
        Box::new(audit.clone()),
        Box::new(transport.clone()),
    ));
    let mut bus = EventBus::new();
    dispatcher.register(&mut bus);

    let mut rng = rand::thread_rng();
    let mut events = Vec::new();
    for _ in 0..500 {
        let id = ids.choose(&mut rng).unwrap().clone();
        if rng.gen_bool(0.2) {
            events.push(HostEvent::AdminPageRendered(AdminQuery {
                page: Some("give-payment-history".to_string()),
                message: Some("payment-updated".to_string()),
                id: Some(id.to_string()),
            }));
        } else {
            events.push(HostEvent::PaymentStatusChanged {
                payment_id: id,
                old_status: STATUSES.choose(&mut rng).unwrap().clone(),
                new_status: STATUSES.choose(&mut rng).unwrap().clone(),
            });
        }
    }

    for event in &events {
        if let HostEvent::PaymentStatusChanged {
            payment_id,
            new_status,
            ..
        } = event
        {
            payments.set_status(payment_id, new_status.clone()).await;
        }
        bus.publish(event).await;
    }

    let urls = transport.urls();
    for id in &ids {
        let marker = format!("&ti={id}&");
        let sent = urls.iter().filter(|url| url.contains(&marker)).count();
        let had_completion = events.iter().any(|event| {
            matches!(
                event,
                HostEvent::PaymentStatusChanged { payment_id, old_status: PaymentStatus::Pending, new_status: PaymentStatus::Publish }
                    if payment_id == id
            )
        });

        assert_eq!(sent, usize::from(had_completion), "payment {id}");
        assert_eq!(
            flags.get_flag(id, BeaconFlag::CompletionBeaconSent).await.unwrap(),
            had_completion
        );
        let notes = audit.notes(id).await.unwrap();
        assert_eq!(notes.iter().filter(|n| *n == BEACON_SENT_NOTE).count(), sent);
    }
}

#[tokio::test]
async fn test_refund_flag_never_sends() {
    let payments = InMemoryPaymentRepository::new();
    payments.insert_form(FormId::new("1"), "General Fund").await;
    payments
        .insert_payment(PaymentId::new("P2"), FormId::new("1"), PaymentStatus::Refunded, dec!(5))
        .await;

    let flags = InMemoryFlagStore::new();
    let transport = RecordingTransport::default();
    let dispatcher = Arc::new(BeaconDispatcher::new(
        config(),
        Box::new(payments),
        Box::new(flags.clone()),
        Box::new(InMemoryAuditLog::new()),
        Box::new(transport.clone()),
    ));
    let mut bus = EventBus::new();
    dispatcher.register(&mut bus);

    let event = HostEvent::AdminPageRendered(AdminQuery::from_pairs([
        ("page", "give-payment-history"),
        ("give-message", "payment-updated"),
        ("id", "P2"),
    ]));
    bus.publish(&event).await;
    bus.publish(&event).await;

    assert!(flags
        .get_flag(&PaymentId::new("P2"), BeaconFlag::RefundBeaconSent)
        .await
        .unwrap());
    assert!(transport.urls().is_empty());
}
