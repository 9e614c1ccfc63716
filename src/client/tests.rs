use std::collections::BTreeMap;

use axum::http::{Method, StatusCode};
use serde_json::json;

use super::payload::{Payload, decode_data};
use super::{BrokerClient, DEFAULT_ACK_DEADLINE_SECONDS, DEFAULT_MAX_MESSAGES};
use crate::broker::ResourceName;
use crate::tests::mock_broker::MockBroker;
use crate::utils::{ConsoleError, ErrorKind};

fn topic(project: &str, id: &str) -> ResourceName {
    ResourceName::topic(project, id).unwrap()
}

fn subscription(project: &str, id: &str) -> ResourceName {
    ResourceName::subscription(project, id).unwrap()
}

async fn setup() -> (MockBroker, BrokerClient) {
    let broker = MockBroker::start().await;
    let client = BrokerClient::new(broker.base_url.clone()).unwrap();
    (broker, client)
}

#[test]
fn test_payload_encoding() {
    assert_eq!(Payload::from("hello").encode(), "aGVsbG8=");
    assert_eq!(Payload::from(vec![0xffu8, 0x00]).encode(), "/wA=");
    assert_eq!(
        Payload::from(json!({"id": 1})).to_bytes(),
        b"{\"id\":1}".to_vec()
    );
    assert!(Payload::from("").is_empty());
    assert!(!Payload::from(json!(null)).is_empty());
}

#[test]
fn test_decode_data_valid_and_invalid() {
    assert_eq!(decode_data("eyJpZCI6MX0="), "{\"id\":1}");
    assert_eq!(decode_data("not base64!"), "not base64!");
    assert_eq!(decode_data(""), "");
}

#[tokio::test]
async fn test_list_topics_empty_project() {
    let (_broker, client) = setup().await;
    let topics = client.list_topics("empty").await.unwrap();
    assert!(topics.is_empty());
}

#[tokio::test]
async fn test_create_topic_uses_final_segment() {
    let (broker, client) = setup().await;

    let created = client
        .create_topic("demo", "projects/other/topics/orders")
        .await
        .unwrap();
    assert_eq!(created.name, topic("demo", "orders"));

    let request = broker.requests().pop().unwrap();
    assert_eq!(request.method, Method::PUT);
    assert_eq!(request.path, "projects/demo/topics/orders");
}

#[tokio::test]
async fn test_create_topic_rejects_empty_ids_locally() {
    let (broker, client) = setup().await;

    let err = client.create_topic("demo", "orders/").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    let err = client.create_topic("  ", "orders").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    assert_eq!(broker.request_count(), 0);
}

#[tokio::test]
async fn test_project_id_is_trimmed_before_building_paths() {
    let (broker, client) = setup().await;

    let created = client.create_topic(" demo ", "orders").await.unwrap();
    assert_eq!(created.name, topic("demo", "orders"));
    assert_eq!(broker.requests().pop().unwrap().path, "projects/demo/topics/orders");

    let topics = client.list_topics(" demo").await.unwrap();
    assert_eq!(topics.len(), 1);
}

#[tokio::test]
async fn test_create_existing_topic_carries_broker_message() {
    let (_broker, client) = setup().await;
    client.create_topic("demo", "orders").await.unwrap();

    match client.create_topic("demo", "orders").await {
        Err(ConsoleError::Broker { status, message }) => {
            assert_eq!(status, 409);
            assert_eq!(message, "Topic already exists");
        }
        other => panic!("expected broker error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_delete_topic_twice_is_broker_error() {
    let (_broker, client) = setup().await;
    let created = client.create_topic("demo", "orders").await.unwrap();

    client.delete_topic(&created.name).await.unwrap();
    let err = client.delete_topic(&created.name).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Broker);
}

#[tokio::test]
async fn test_publish_sends_single_base64_message() {
    let (broker, client) = setup().await;
    let orders = client.create_topic("demo", "orders").await.unwrap().name;

    let mut attributes = BTreeMap::new();
    attributes.insert("source".to_string(), "test".to_string());
    let id = client
        .publish_message(&orders, json!({"id": 1}), attributes)
        .await
        .unwrap();
    assert!(!id.is_empty());

    let request = broker.requests().pop().unwrap();
    assert_eq!(request.path, "projects/demo/topics/orders:publish");
    assert_eq!(
        request.body.unwrap(),
        json!({"messages": [{"data": "eyJpZCI6MX0=", "attributes": {"source": "test"}}]})
    );
}

#[tokio::test]
async fn test_publish_to_subscription_name_is_rejected() {
    let (broker, client) = setup().await;
    let err = client
        .publish_message(&subscription("demo", "s"), "x", BTreeMap::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(broker.request_count(), 0);
}

#[tokio::test]
async fn test_create_subscription_requires_full_topic_path() {
    let (broker, client) = setup().await;
    client.create_topic("demo", "orders").await.unwrap();

    let err = client
        .create_subscription("demo", "orders-sub", "orders", DEFAULT_ACK_DEADLINE_SECONDS)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(broker.request_count(), 1);

    let sub = client
        .create_subscription(
            "demo",
            "orders-sub",
            "projects/demo/topics/orders",
            DEFAULT_ACK_DEADLINE_SECONDS,
        )
        .await
        .unwrap();
    assert_eq!(sub.name, subscription("demo", "orders-sub"));
    assert_eq!(sub.topic, "projects/demo/topics/orders");
    assert_eq!(sub.ack_deadline_seconds, Some(10));

    let request = broker.requests().pop().unwrap();
    assert_eq!(
        request.body.unwrap(),
        json!({"topic": "projects/demo/topics/orders", "ackDeadlineSeconds": 10})
    );
}

#[tokio::test]
async fn test_list_topic_subscriptions() {
    let (_broker, client) = setup().await;
    let orders = client.create_topic("demo", "orders").await.unwrap().name;
    client
        .create_subscription("demo", "a", "projects/demo/topics/orders", 10)
        .await
        .unwrap();
    client
        .create_subscription("demo", "b", "projects/demo/topics/orders", 10)
        .await
        .unwrap();

    let names = client.list_topic_subscriptions(&orders).await.unwrap();
    assert_eq!(
        names,
        vec![subscription("demo", "a"), subscription("demo", "b")]
    );
}

#[tokio::test]
async fn test_pull_is_non_blocking_and_ack_consumes() {
    let (broker, client) = setup().await;
    let orders = client.create_topic("demo", "orders").await.unwrap().name;
    let sub = client
        .create_subscription("demo", "orders-sub", &orders.path(), 10)
        .await
        .unwrap()
        .name;

    let nothing = client.pull_messages(&sub, DEFAULT_MAX_MESSAGES).await.unwrap();
    assert!(nothing.is_empty());
    let request = broker.requests().pop().unwrap();
    assert_eq!(
        request.body.unwrap(),
        json!({"returnImmediately": true, "maxMessages": 10})
    );

    client
        .publish_message(&orders, "hello", BTreeMap::new())
        .await
        .unwrap();
    let pulled = client.pull_messages(&sub, DEFAULT_MAX_MESSAGES).await.unwrap();
    assert_eq!(pulled.len(), 1);
    assert_eq!(pulled[0].message.decoded_data(), "hello");
    assert_eq!(broker.outstanding(&sub.path()), 1);

    client
        .acknowledge(&sub, &[pulled[0].ack_id.clone()])
        .await
        .unwrap();
    assert_eq!(broker.outstanding(&sub.path()), 0);
}

#[tokio::test]
async fn test_acknowledge_without_ids_is_validation_error() {
    let (broker, client) = setup().await;
    let err = client
        .acknowledge(&subscription("demo", "s"), &[])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(broker.request_count(), 0);
}

#[tokio::test]
async fn test_broker_failure_message_is_surfaced() {
    let (broker, client) = setup().await;
    broker.fail_next(StatusCode::SERVICE_UNAVAILABLE, "emulator is warming up");

    let err = client.list_topics("demo").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Broker);
    assert_eq!(err.operator_message(), "emulator is warming up");
}

#[tokio::test]
async fn test_unreachable_broker_is_transport_error() {
    // Bind then drop a listener so the port is very likely closed.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = BrokerClient::new(format!("http://127.0.0.1:{}/v1", port)).unwrap();

    let err = client.list_topics("demo").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}
