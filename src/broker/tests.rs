use super::Broker;
use crate::client::{ClientConnection, ConnectionEvent};
use crate::config::{BrokerSettings, VirtualHostRecord};
use crate::destination::DestinationKind;
use crate::ledger::{Connection, ConnectionId};
use crate::utils::{BrokerError, CloseError};
use crate::vhost::{HostNameKey, LifecycleState};
use futures::future::{self, BoxFuture};
use std::sync::Arc;

fn records() -> Vec<VirtualHostRecord> {
    vec![
        VirtualHostRecord::new("vh1", ["a.test", "b.test"]),
        VirtualHostRecord::new("vh2", ["c.test"]),
    ]
}

#[test]
fn test_broker_new() {
    let broker = Broker::new();
    assert!(broker.registry().is_empty());
    assert!(broker.ledger().is_empty().unwrap());
}

#[test]
fn test_register_all_in_order() {
    let broker = Broker::new();
    let registered = broker.register_all(&records()).unwrap();
    let ids: Vec<&str> = registered.iter().map(|vh| vh.id()).collect();
    assert_eq!(ids, vec!["vh1", "vh2"]);
    assert_eq!(broker.on_connection_attempt("b.test").unwrap().id(), "vh1");
    assert_eq!(broker.on_connection_attempt("c.test").unwrap().id(), "vh2");
}

#[test]
fn test_register_all_aborts_on_first_duplicate() {
    let broker = Broker::new();
    let records = vec![
        VirtualHostRecord::new("vh1", ["a.test"]),
        VirtualHostRecord::new("vh2", ["A.test"]),
        VirtualHostRecord::new("vh3", ["z.test"]),
    ];
    let err = broker.register_all(&records).unwrap_err();
    assert_eq!(
        err,
        BrokerError::DuplicateHostName {
            key: HostNameKey::parse("a.test").unwrap(),
            existing: "vh1".to_string(),
        }
    );
    // vh1 stays, nothing after the failing record is registered
    assert_eq!(broker.registry().len(), 1);
    assert!(broker.on_connection_attempt("z.test").is_err());
}

#[test]
fn test_register_all_rejects_invalid_record() {
    let broker = Broker::new();
    let records = vec![VirtualHostRecord::new("vh1", Vec::<String>::new())];
    assert!(matches!(
        broker.register_all(&records),
        Err(BrokerError::InvalidConfig(_))
    ));
    assert!(broker.registry().is_empty());
}

#[test]
fn test_default_virtual_host_from_settings() {
    let broker = Broker::from_settings(&BrokerSettings {
        close_timeout_ms: 100,
        default_virtual_host: Some("vh2".to_string()),
    });
    broker.register_all(&records()).unwrap();
    assert_eq!(broker.on_connection_attempt("").unwrap().id(), "vh2");
}

#[test]
fn test_unknown_host_is_refused() {
    let broker = Broker::new();
    broker.register_all(&records()).unwrap();
    let err = broker.on_connection_attempt("nowhere.test").unwrap_err();
    assert!(err.is_connection_refused());
    assert!(!BrokerError::LedgerClosed.is_connection_refused());
}

#[test]
fn test_accept_tracks_and_notifies() {
    let broker = Broker::new();
    broker.register_all(&records()).unwrap();

    let (conn, mut rx) = ClientConnection::pair();
    let conn = Arc::new(conn);
    let vh = broker.accept("A.TEST:61613", conn.clone()).unwrap();

    assert_eq!(vh.id(), "vh1");
    assert!(broker.ledger().contains(conn.id).unwrap());
    assert_eq!(
        rx.try_recv().unwrap(),
        ConnectionEvent::Bound {
            virtual_host: "vh1".to_string()
        }
    );
}

struct SilentConnection {
    id: ConnectionId,
}

impl Connection for SilentConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn close(&self) -> BoxFuture<'_, Result<(), CloseError>> {
        Box::pin(future::ready(Ok(())))
    }
}

#[tokio::test]
async fn test_accept_any_connection_type() {
    let broker = Broker::new();
    broker.register_all(&records()).unwrap();

    let id = ConnectionId::new();
    let vh = broker
        .accept("c.test", Arc::new(SilentConnection { id }))
        .unwrap();
    assert_eq!(vh.id(), "vh2");
    assert!(broker.ledger().contains(id).unwrap());

    let report = broker.shutdown().await.unwrap();
    assert_eq!(report.closed, 1);
}

#[test]
fn test_refused_connection_is_not_tracked() {
    let broker = Broker::new();
    broker.register_all(&records()).unwrap();

    let (conn, mut rx) = ClientConnection::pair();
    let conn = Arc::new(conn);
    assert!(broker.accept("nowhere.test", conn.clone()).is_err());
    assert!(!broker.ledger().contains(conn.id).unwrap());
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_create_destination_in_resolved_host() {
    let broker = Broker::new();
    broker.register_all(&records()).unwrap();
    let vh = broker.on_connection_attempt("c.test").unwrap();

    let queue = broker
        .create_destination(&vh, DestinationKind::Queue, Some("orders"))
        .unwrap();
    assert_eq!(queue.virtual_host, "vh2");
    let generated = broker
        .create_destination(&vh, DestinationKind::Topic, None)
        .unwrap();
    assert!(generated.name.starts_with("TEST.vhost.vh2."));
    assert!(matches!(
        broker.create_destination(&vh, DestinationKind::Queue, Some("orders")),
        Err(BrokerError::NameConflict { .. })
    ));
}

#[test]
fn test_start_stop_all_and_summary() {
    let broker = Broker::new();
    broker.register_all(&records()).unwrap();
    broker.start_all().unwrap();
    // already running hosts are skipped
    broker.start_all().unwrap();
    assert!(
        broker
            .summary()
            .iter()
            .all(|s| s.state == LifecycleState::Started)
    );

    broker.stop_all();
    assert!(
        broker
            .summary()
            .iter()
            .all(|s| s.state == LifecycleState::Stopped)
    );
}

#[test]
fn test_remove_virtual_host_stops_first() {
    let broker = Broker::new();
    broker.register_all(&records()).unwrap();
    broker.start_all().unwrap();

    let removed = broker.remove_virtual_host("vh1").unwrap();
    assert_eq!(removed.state(), LifecycleState::Unregistered);
    assert_eq!(
        removed.start(),
        Err(BrokerError::Unregistered("vh1".to_string()))
    );
    assert!(broker.on_connection_attempt("a.test").is_err());
    assert!(broker.remove_virtual_host("vh1").is_err());
}

#[tokio::test]
async fn test_shutdown_closes_connections_then_stops_hosts() {
    let broker = Broker::new();
    broker.register_all(&records()).unwrap();
    broker.start_all().unwrap();

    let (a, mut a_rx) = ClientConnection::pair();
    let (b, b_rx) = ClientConnection::pair();
    broker.accept("a.test", Arc::new(a)).unwrap();
    broker.accept("c.test", Arc::new(b)).unwrap();
    drop(b_rx);

    let report = broker.shutdown().await.unwrap();
    assert_eq!(report.attempted(), 2);
    assert_eq!(report.closed, 1);
    assert_eq!(report.failures.len(), 1);

    assert!(matches!(
        a_rx.recv().await,
        Some(ConnectionEvent::Bound { .. })
    ));
    assert_eq!(a_rx.recv().await, Some(ConnectionEvent::Closed));
    assert!(broker.ledger().is_empty().unwrap());
    assert!(
        broker
            .summary()
            .iter()
            .all(|s| s.state == LifecycleState::Stopped)
    );

    let (late, _late_rx) = ClientConnection::pair();
    assert_eq!(
        broker.accept("a.test", Arc::new(late)).unwrap_err(),
        BrokerError::LedgerClosed
    );
}

#[test]
fn test_independent_brokers_do_not_share_state() {
    let first = Broker::new();
    let second = Broker::new();
    first.register_all(&records()).unwrap();
    second.register_all(&records()).unwrap();
    assert!(first.remove_virtual_host("vh1").is_ok());
    assert_eq!(second.on_connection_attempt("a.test").unwrap().id(), "vh1");
}
