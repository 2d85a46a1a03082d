mod common;

use common::FakeConsul;
use consul_sidecar::core::{CheckPolicy, Registration, ServiceRegistry};
use consul_sidecar::ConsulClient;
use httpmock::prelude::*;
use serde_json::json;

fn registration(id: &str, check: CheckPolicy) -> Registration {
    Registration {
        id: id.to_string(),
        name: "billing".to_string(),
        address: "node1".to_string(),
        port: 5002,
        tags: vec!["foo".to_string(), "job_42".to_string()],
        check,
    }
}

#[tokio::test]
async fn test_register_then_is_registered() -> anyhow::Result<()> {
    let (fake, address) = FakeConsul::start().await;
    let client = ConsulClient::new(address)?;
    let registration = registration("svc-1", CheckPolicy::default());

    assert!(!client.is_registered("svc-1").await);
    assert!(client.register(&registration).await);
    assert!(client.is_registered("svc-1").await);
    assert_eq!(fake.service_ids(), vec!["svc-1"]);

    Ok(())
}

#[tokio::test]
async fn test_deregister_then_not_registered() -> anyhow::Result<()> {
    let (fake, address) = FakeConsul::start().await;
    let client = ConsulClient::new(address)?;

    assert!(client.register(&registration("svc-2", CheckPolicy::default())).await);
    assert!(client.deregister("svc-2").await);
    assert!(!client.is_registered("svc-2").await);
    assert!(fake.service("svc-2").is_none());

    Ok(())
}

#[tokio::test]
async fn test_register_sends_consul_service_document() -> anyhow::Result<()> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(PUT)
            .path("/v1/agent/service/register")
            .json_body(json!({
                "ID": "svc-3",
                "Name": "billing",
                "Tags": ["foo", "job_42"],
                "Address": "node1",
                "Port": 5002,
                "Check": {
                    "DeregisterCriticalServiceAfter": "1m",
                    "HTTP": "http://node1:5002/svc-3",
                    "Interval": "10s"
                }
            }));
        then.status(200);
    });

    let client = ConsulClient::new(server.base_url())?;
    let check = CheckPolicy {
        enabled: true,
        interval_spec: Some("10s".to_string()),
        deregister_after_spec: Some("1m".to_string()),
    };
    assert!(client.register(&registration("svc-3", check)).await);
    mock.assert();

    Ok(())
}

#[tokio::test]
async fn test_deregister_uses_id_path() -> anyhow::Result<()> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(PUT).path("/v1/agent/service/deregister/svc-4");
        then.status(200);
    });

    let client = ConsulClient::new(server.base_url())?;
    assert!(client.deregister("svc-4").await);
    mock.assert();

    Ok(())
}

#[tokio::test]
async fn test_non_200_responses_are_failures() -> anyhow::Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(PUT).path("/v1/agent/service/deregister/svc-5");
        then.status(404);
    });
    server.mock(|when, then| {
        when.method(GET).path("/v1/agent/services");
        then.status(503).json_body(json!({ "svc-5": {} }));
    });

    let client = ConsulClient::new(server.base_url())?;
    assert!(!client.deregister("svc-5").await);
    assert!(!client.is_registered("svc-5").await);

    Ok(())
}

#[tokio::test]
async fn test_unreachable_or_malformed_registry_never_errors() -> anyhow::Result<()> {
    let registration = registration("svc-6", CheckPolicy::default());

    // 1 號 port 通常沒有服務在聽
    let unreachable = ConsulClient::new("http://127.0.0.1:1")?;
    assert!(!unreachable.register(&registration).await);
    assert!(!unreachable.deregister("svc-6").await);
    assert!(!unreachable.is_registered("svc-6").await);

    let malformed = ConsulClient::new("not a url")?;
    assert!(!malformed.register(&registration).await);
    assert!(!malformed.deregister("svc-6").await);
    assert!(!malformed.is_registered("svc-6").await);

    Ok(())
}
