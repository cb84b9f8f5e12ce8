use super::client_connection::{ClientConnection, ConnectionEvent};
use crate::ledger::Connection;
use crate::utils::CloseError;

#[test]
fn test_client_new() {
    let (client, _rx) = ClientConnection::pair();
    let (other, _other_rx) = ClientConnection::pair();
    assert_ne!(client.id, other.id);
    assert_eq!(client.id(), client.id);
}

#[test]
fn test_notify_bound_reaches_peer() {
    let (client, mut rx) = ClientConnection::pair();
    client.notify_bound("vh1").unwrap();
    assert_eq!(
        rx.try_recv().unwrap(),
        ConnectionEvent::Bound {
            virtual_host: "vh1".to_string()
        }
    );
}

#[tokio::test]
async fn test_close_notifies_peer() {
    let (client, mut rx) = ClientConnection::pair();
    client.close().await.unwrap();
    assert_eq!(rx.recv().await, Some(ConnectionEvent::Closed));
}

#[tokio::test]
async fn test_close_with_dropped_peer_fails() {
    let (client, rx) = ClientConnection::pair();
    drop(rx);
    let err = client.close().await.unwrap_err();
    assert!(matches!(err, CloseError::Failed(_)));
}
