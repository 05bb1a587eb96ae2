use donation_beacon::domain::flag::BeaconFlag;
use donation_beacon::domain::payment::PaymentId;
use donation_beacon::domain::ports::{
    AuditLog, AuditLogBox, BeaconResponse, BeaconTransport, BeaconTransportBox, FlagStore,
    FlagStoreBox,
};
use donation_beacon::infrastructure::in_memory::{InMemoryAuditLog, InMemoryFlagStore, RecordingTransport};

#[tokio::test]
async fn test_ports_as_trait_objects() {
    let flags: FlagStoreBox = Box::new(InMemoryFlagStore::new());
    let audit: AuditLogBox = Box::new(InMemoryAuditLog::new());
    let transport: BeaconTransportBox = Box::new(RecordingTransport::default());

    // Verify Send + Sync by spawning tasks
    let flag_handle = tokio::spawn(async move {
        let id = PaymentId::new("P1");
        flags.set_flag_if_absent(&id, BeaconFlag::RefundBeaconSent).await.unwrap();
        flags.get_flag(&id, BeaconFlag::RefundBeaconSent).await.unwrap()
    });

    let audit_handle = tokio::spawn(async move {
        let id = PaymentId::new("P1");
        audit.write_note(&id, "hello").await.unwrap();
        audit.notes(&id).await.unwrap()
    });

    let transport_handle =
        tokio::spawn(async move { transport.send("https://example.test/collect?v=1").await });

    assert!(flag_handle.await.unwrap());
    assert_eq!(audit_handle.await.unwrap(), vec!["hello"]);
    assert_eq!(transport_handle.await.unwrap(), BeaconResponse::ok(200));
}
