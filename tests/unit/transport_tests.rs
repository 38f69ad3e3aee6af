/*!
 * Tests for the remote tier's transport ordering and response handling
 */

use std::sync::{Arc, Mutex};
use subass::app_config::VariantConfig;
use subass::errors::VariantError;
use subass::variant::{RemoteConverter, TransportConfig, VariantConverter};

use crate::common::mock_converters::{MockTransport, TransportReply};

const ENDPOINT: &str = "https://api.zhconvert.org/convert";

fn attempt_log() -> Arc<Mutex<Vec<String>>> {
    Arc::new(Mutex::new(Vec::new()))
}

/// Two failing transports are each tried once before the third succeeds
#[tokio::test]
async fn test_remote_convert_withFirstTwoFailing_shouldSucceedOnThirdAttempt() {
    let attempts = attempt_log();
    let transports = vec![
        MockTransport::new("direct", TransportReply::ConnectionError, attempts.clone()),
        MockTransport::new("proxy1", TransportReply::Respond(502, String::new()), attempts.clone()),
        MockTransport::new("proxy2", TransportReply::converted("简体"), attempts.clone()),
    ];
    let remote = RemoteConverter::new(ENDPOINT, transports);

    let result = remote.convert("簡體").await;

    assert_eq!(result.unwrap(), "简体");
    assert_eq!(*attempts.lock().unwrap(), vec!["direct", "proxy1", "proxy2"]);
}

#[tokio::test]
async fn test_remote_convert_withFirstSuccess_shouldNotTryOthers() {
    let attempts = attempt_log();
    let transports = vec![
        MockTransport::new("direct", TransportReply::converted("ok"), attempts.clone()),
        MockTransport::new("proxy1", TransportReply::converted("unused"), attempts.clone()),
    ];

    let result = RemoteConverter::new(ENDPOINT, transports).convert("x").await;

    assert_eq!(result.unwrap(), "ok");
    assert_eq!(*attempts.lock().unwrap(), vec!["direct"]);
}

/// Non-zero code, bad JSON and an empty text all move on to the next transport
#[tokio::test]
async fn test_remote_convert_withBadResponses_shouldExhaustTransports() {
    let attempts = attempt_log();
    let transports = vec![
        MockTransport::new(
            "direct",
            TransportReply::Respond(200, r#"{"code":-1,"msg":"busy"}"#.to_string()),
            attempts.clone(),
        ),
        MockTransport::new("proxy1", TransportReply::Respond(200, "<html>".to_string()), attempts.clone()),
        MockTransport::new("proxy2", TransportReply::converted("  "), attempts.clone()),
    ];

    let result = RemoteConverter::new(ENDPOINT, transports).convert("x").await;

    match result {
        Err(VariantError::AllTransportsFailed { attempts: count, last_error }) => {
            assert_eq!(count, 3);
            assert!(last_error.contains("proxy2"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(attempts.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_remote_convert_shouldSendSimplifiedChineseRequest() {
    let attempts = attempt_log();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let transports = vec![MockTransport::with_request_log(
        "direct",
        TransportReply::converted("汉字"),
        attempts,
        requests.clone(),
    )];

    RemoteConverter::new(ENDPOINT, transports).convert("漢字").await.unwrap();

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].text, "漢字");
    assert_eq!(requests[0].converter, "China");
    assert!(!requests[0].diff_enable);
}

#[tokio::test]
async fn test_remote_convert_withoutTransports_shouldBeUnavailable() {
    let result = RemoteConverter::new(ENDPOINT, Vec::new()).convert("x").await;
    assert!(matches!(result, Err(VariantError::Unavailable(_))));
}

#[test]
fn test_variant_config_transport_configs_shouldStartWithDirect() {
    let config = VariantConfig {
        proxies: vec!["http://127.0.0.1:7890".to_string(), "socks5://127.0.0.1:1080".to_string()],
        ..VariantConfig::default()
    };

    assert_eq!(
        config.transport_configs(),
        vec![
            TransportConfig::Direct,
            TransportConfig::Proxy("http://127.0.0.1:7890".to_string()),
            TransportConfig::Proxy("socks5://127.0.0.1:1080".to_string()),
        ]
    );
}

#[test]
fn test_remote_from_config_shouldLabelTransportsInOrder() {
    let remote = RemoteConverter::from_config(&VariantConfig::default());

    assert_eq!(
        remote.transport_labels(),
        vec!["direct", "proxy http://127.0.0.1:7890", "proxy http://127.0.0.1:1080"]
    );
}
