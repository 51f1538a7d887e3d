use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use secrecy::SecretString;
use tower::ServiceExt;

use commhub::config::AppConfig;
use commhub::errors::AdapterError;
use commhub::handlers;
use commhub::models::{CommResponse, EmailProviderId, EmailRequest, SmsProviderId, SmsRequest};
use commhub::services::email::sendgrid::parse_event_webhook;
use commhub::services::email::{EmailAdapter, EmailDelivery};
use commhub::services::messaging::twilio::{compute_signature, parse_status_callback};
use commhub::services::messaging::{SmsAdapter, SmsAdapterRegistry};
use commhub::services::CommunicationService;
use commhub::state::AppState;

// ── Mock Providers ──

struct EchoTwilio;

#[async_trait]
impl SmsAdapter for EchoTwilio {
    fn provider(&self) -> SmsProviderId {
        SmsProviderId::Twilio
    }

    async fn send(&self, request: &SmsRequest) -> CommResponse {
        if let Err(e) = request.validate() {
            return CommResponse::from_adapter_error("TWILIO", &e);
        }
        CommResponse::success("TWILIO", 201)
            .with_message_id(Some("MID-1".into()))
            .with_correlation_id(request.correlation_id.clone())
    }

    fn parse(&self, raw: &str) -> CommResponse {
        parse_status_callback(raw)
    }
}

struct AcceptingEmail;

#[async_trait]
impl EmailAdapter for AcceptingEmail {
    fn provider(&self) -> EmailProviderId {
        EmailProviderId::SendGrid
    }

    async fn send(&self, request: &EmailRequest) -> Result<EmailDelivery, AdapterError> {
        request.validate()?;
        Ok(EmailDelivery {
            status_code: 202,
            message_id: Some("sg-1".into()),
            body: String::new(),
        })
    }

    fn normalize(&self, delivery: EmailDelivery, request: &EmailRequest) -> CommResponse {
        CommResponse::success("SENDGRID", delivery.status_code)
            .with_message_id(delivery.message_id)
            .with_correlation_id(request.correlation_id.clone())
    }

    fn parse(&self, raw: &str) -> CommResponse {
        parse_event_webhook(raw)
    }
}

// ── Helpers ──

const AUTH_TOKEN: &str = "twilio-secret";

fn test_config(auth_token: &str) -> AppConfig {
    AppConfig {
        port: 3000,
        default_sms_provider: "TWILIO".to_string(),
        http_timeout_secs: 5,
        public_base_url: Some("https://hooks.example.com".to_string()),
        twilio_account_sid: "AC123".to_string(),
        twilio_auth_token: SecretString::from(auth_token),
        twilio_phone_number: "+15550000000".to_string(),
        twilio_base_url: "http://127.0.0.1:1".to_string(),
        infobip_api_key: SecretString::from(""),
        infobip_sender: "InfoSMS".to_string(),
        infobip_base_url: "http://127.0.0.1:1".to_string(),
        sendgrid_api_key: SecretString::from("SG.test"),
        sendgrid_base_url: "http://127.0.0.1:1".to_string(),
    }
}

fn test_app(auth_token: &str) -> Router {
    let registry = SmsAdapterRegistry::new().register(Arc::new(EchoTwilio));
    let comms = CommunicationService::new(registry, Arc::new(AcceptingEmail), SmsProviderId::Twilio);
    handlers::router(Arc::new(AppState {
        config: test_config(auth_token),
        comms,
    }))
}

fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn form_post(uri: &str, body: &str, signature: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/x-www-form-urlencoded");
    if let Some(signature) = signature {
        builder = builder.header("X-Twilio-Signature", signature);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(res: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ── Health Check ──

#[tokio::test]
async fn test_health() {
    let res = test_app("")
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
}

// ── Send API Tests ──

#[tokio::test]
async fn test_send_sms_uses_default_provider() {
    let res = test_app("")
        .oneshot(json_post(
            "/api/sms",
            serde_json::json!({"to": "+15551234567", "body": "hi"}),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["ok"], true);
    assert_eq!(json["provider"], "TWILIO");
    assert_eq!(json["status_code"], 201);
    assert_eq!(json["provider_message_id"], "MID-1");
    // generated when the caller sends none
    assert!(json["correlation_id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn test_send_sms_keeps_caller_correlation_id() {
    let res = test_app("")
        .oneshot(json_post(
            "/api/sms",
            serde_json::json!({"to": "+15551234567", "body": "hi", "correlation_id": "abc"}),
        ))
        .await
        .unwrap();

    assert_eq!(body_json(res).await["correlation_id"], "abc");
}

#[tokio::test]
async fn test_send_sms_unknown_provider() {
    let res = test_app("")
        .oneshot(json_post(
            "/api/sms",
            serde_json::json!({"to": "+15551234567", "body": "hi", "provider": "UNKNOWN"}),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let json = body_json(res).await;
    assert_eq!(json["ok"], false);
    assert_eq!(json["error_kind"], "UNKNOWN_PROVIDER");
}

#[tokio::test]
async fn test_send_sms_malformed_request() {
    let res = test_app("")
        .oneshot(json_post(
            "/api/sms",
            serde_json::json!({"to": "+15551234567", "body": ""}),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await["error_kind"], "MALFORMED_REQUEST");
}

#[tokio::test]
async fn test_send_sms_missing_field_is_bad_request() {
    let res = test_app("")
        .oneshot(json_post("/api/sms", serde_json::json!({"to": "+15551234567"})))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let json = body_json(res).await;
    assert_eq!(json["ok"], false);
    assert_eq!(json["provider"], "TWILIO");
    assert_eq!(json["error_kind"], "MALFORMED_REQUEST");
    assert_eq!(json["status_code"], 0);
}

#[tokio::test]
async fn test_send_email_unparseable_body_is_bad_request() {
    let req = Request::builder()
        .method("POST")
        .uri("/api/email")
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let res = test_app("").oneshot(req).await.unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let json = body_json(res).await;
    assert_eq!(json["provider"], "SENDGRID");
    assert_eq!(json["error_kind"], "MALFORMED_REQUEST");
}

#[tokio::test]
async fn test_send_email() {
    let res = test_app("")
        .oneshot(json_post(
            "/api/email",
            serde_json::json!({"to": "a@b", "from": "c@d", "subject": "s", "body": "x"}),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["ok"], true);
    assert_eq!(json["provider"], "SENDGRID");
    assert_eq!(json["status_code"], 202);
}

// ── Webhook Tests ──

#[tokio::test]
async fn test_twilio_callback_without_token_skips_signature() {
    let res = test_app("")
        .oneshot(form_post(
            "/webhook/sms/TWILIO",
            "MessageSid=SM1&MessageStatus=delivered",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["provider_message_id"], "SM1");
}

#[tokio::test]
async fn test_twilio_callback_missing_signature() {
    let res = test_app(AUTH_TOKEN)
        .oneshot(form_post(
            "/webhook/sms/TWILIO",
            "MessageSid=SM1&MessageStatus=delivered",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_twilio_callback_invalid_signature() {
    let res = test_app(AUTH_TOKEN)
        .oneshot(form_post(
            "/webhook/sms/TWILIO",
            "MessageSid=SM1&MessageStatus=delivered",
            Some("bm90LXRoZS1zaWduYXR1cmU="),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_twilio_callback_valid_signature() {
    let params = vec![
        ("MessageSid".to_string(), "SM77".to_string()),
        ("MessageStatus".to_string(), "sent".to_string()),
    ];
    let signature = compute_signature(
        AUTH_TOKEN,
        "https://hooks.example.com/webhook/sms/TWILIO",
        &params,
    )
    .unwrap();

    let res = test_app(AUTH_TOKEN)
        .oneshot(form_post(
            "/webhook/sms/TWILIO",
            "MessageSid=SM77&MessageStatus=sent",
            Some(&signature),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["provider_message_id"], "SM77");
    assert_eq!(json["delivery_status"], "sent");
}

#[tokio::test]
async fn test_sms_callback_garbage_is_bad_request() {
    let res = test_app("")
        .oneshot(form_post("/webhook/sms/TWILIO", "garbage", None))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await["error_kind"], "MALFORMED_CALLBACK");
}

#[tokio::test]
async fn test_email_callback() {
    let res = test_app("")
        .oneshot(json_post(
            "/webhook/email/sendgrid",
            serde_json::json!([{"email": "a@b", "event": "delivered", "sg_message_id": "abc.filter0"}]),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["provider"], "SENDGRID");
    assert_eq!(json["provider_message_id"], "abc");
}

#[tokio::test]
async fn test_email_callback_unknown_provider() {
    let res = test_app("")
        .oneshot(json_post("/webhook/email/mailgun", serde_json::json!([])))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(body_json(res).await["error"]
        .as_str()
        .unwrap()
        .contains("mailgun"));
}

// ── Wiring ──

#[tokio::test]
async fn test_from_config_registers_configured_providers() {
    let comms = CommunicationService::from_config(&test_config("")).unwrap();
    assert_eq!(comms.sms_providers(), vec![SmsProviderId::Twilio]);
    assert_eq!(comms.default_sms_provider(), SmsProviderId::Twilio);
}

#[tokio::test]
async fn test_from_config_rejects_unconfigured_default() {
    let mut config = test_config("");
    config.default_sms_provider = "INFOBIP_SMS".to_string();
    assert!(CommunicationService::from_config(&config).is_err());

    config.infobip_api_key = SecretString::from("ib-key");
    let comms = CommunicationService::from_config(&config).unwrap();
    assert_eq!(comms.default_sms_provider(), SmsProviderId::Infobip);
}
