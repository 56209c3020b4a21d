use falcon_output::transport::{bind_address, PublishEndpoint};
use falcon_output::ErrorKind;

#[test]
fn test_bind_address_listens_on_all_interfaces() {
    assert_eq!(bind_address(5555), "tcp://0.0.0.0:5555");
}

#[tokio::test]
async fn test_starts_unbound() {
    let endpoint = PublishEndpoint::new();
    assert!(!endpoint.is_bound());
    assert_eq!(endpoint.port(), None);
    assert_eq!(endpoint.bind_count(), 0);
}

#[tokio::test]
async fn test_ensure_bound_is_idempotent() {
    let mut endpoint = PublishEndpoint::new();

    let first = endpoint.ensure_bound(0).await.unwrap().local_port();
    let second = endpoint.ensure_bound(0).await.unwrap().local_port();

    assert_ne!(first, 0);
    assert_eq!(first, second);
    assert_eq!(endpoint.bind_count(), 1);
    assert_eq!(endpoint.port(), Some(0));

    endpoint.close().await;
}

#[tokio::test]
async fn test_rebind_to_new_port_replaces_socket() {
    let mut endpoint = PublishEndpoint::new();
    let first = endpoint.ensure_bound(0).await.unwrap().local_port();

    // Free a concrete port by binding and releasing a scratch endpoint
    let mut scratch = PublishEndpoint::new();
    let target = scratch.ensure_bound(0).await.unwrap().local_port();
    scratch.close().await;

    let bound = endpoint.ensure_bound(target).await.unwrap();
    assert_eq!(bound.port(), target);
    assert_eq!(bound.local_port(), target);
    assert_eq!(endpoint.bind_count(), 2);

    // The first port is released and can be bound again
    let mut other = PublishEndpoint::new();
    assert!(other.ensure_bound(first).await.is_ok());

    other.close().await;
    endpoint.close().await;
}

#[tokio::test]
async fn test_bind_conflict_leaves_endpoint_unbound() {
    let mut owner = PublishEndpoint::new();
    let taken = owner.ensure_bound(0).await.unwrap().local_port();

    let mut endpoint = PublishEndpoint::new();
    let err = match endpoint.ensure_bound(taken).await {
        Ok(_) => panic!("bound a port that is already in use"),
        Err(err) => err,
    };
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(!endpoint.is_bound());
    assert_eq!(endpoint.bind_count(), 0);

    // A later retry on a free port works
    assert!(endpoint.ensure_bound(0).await.is_ok());

    endpoint.close().await;
    owner.close().await;
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let mut endpoint = PublishEndpoint::new();
    endpoint.close().await;

    endpoint.ensure_bound(0).await.unwrap();
    endpoint.close().await;
    endpoint.close().await;

    assert!(!endpoint.is_bound());
    assert_eq!(endpoint.local_port(), None);
}

#[tokio::test]
async fn test_publish_without_subscribers_succeeds() {
    let mut endpoint = PublishEndpoint::new();
    let socket = endpoint.ensure_bound(0).await.unwrap();

    socket.publish(&[1, 2, 3], 1).await.unwrap();
    socket.publish(&[], 2).await.unwrap();

    endpoint.close().await;
}
