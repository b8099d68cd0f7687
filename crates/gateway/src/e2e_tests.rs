//! End-to-end dispatch tests over signed requests.
//!
//! Builds a real registry, signs real request bodies with an ed25519 key,
//! and drives the dispatcher exactly the way an embedding HTTP server would.

use std::sync::Arc;

use ed25519_dalek::{Signer, SigningKey};
use serde_json::json;

use parley_codec::{Field, FieldKind, Schema, Value};

use crate::api::{MessagingError, MessagingPort, MockMessagingPort};
use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::envelope::{InteractionResponse, ResponseKind};
use crate::handler::{Handler, Reply};
use crate::registry::Registry;
use crate::route::ViewSignature;
use crate::verify::RequestVerifier;

const TIMESTAMP: &str = "1700000000";

struct TestRig {
    dispatcher: Dispatcher,
    signing: SigningKey,
}

impl TestRig {
    fn new(handlers: Vec<Handler>, api: Arc<dyn MessagingPort>) -> Self {
        let signing = SigningKey::from_bytes(&[42u8; 32]);
        let public_hex = hex::encode(signing.verifying_key().to_bytes());
        let verifier = RequestVerifier::from_hex(&public_hex).unwrap();
        let registry = Arc::new(Registry::new(handlers).unwrap());
        Self {
            dispatcher: Dispatcher::new(registry, verifier, api),
            signing,
        }
    }

    async fn post(&self, body: serde_json::Value) -> DispatchOutcome {
        let raw = serde_json::to_string(&body).unwrap();
        let message = format!("{TIMESTAMP}{raw}");
        let signature = hex::encode(self.signing.sign(message.as_bytes()).to_bytes());
        self.dispatcher.handle(&signature, TIMESTAMP, &raw).await
    }
}

fn page_schema() -> Arc<Schema> {
    Arc::new(
        Schema::new(vec![
            Field::new("page", FieldKind::Int),
            Field::new("confirm", FieldKind::Bool),
        ])
        .unwrap(),
    )
}

fn expect_response(outcome: DispatchOutcome) -> InteractionResponse {
    match outcome {
        DispatchOutcome::Response(response) => response,
        DispatchOutcome::Unauthorized => panic!("expected a response, got 401"),
    }
}

#[tokio::test]
async fn test_heartbeat_bypasses_registry() {
    let rig = TestRig::new(vec![], Arc::new(MockMessagingPort::new()));
    let response = expect_response(rig.post(json!({
        "id": "1", "type": 1, "token": "t", "application_id": "a"
    })).await);
    assert_eq!(response.kind, ResponseKind::Pong);
}

#[tokio::test]
async fn test_unsigned_request_is_unauthorized() {
    let rig = TestRig::new(vec![], Arc::new(MockMessagingPort::new()));
    let outcome = rig
        .dispatcher
        .handle("00", TIMESTAMP, r#"{"type":1}"#)
        .await;
    assert!(matches!(outcome, DispatchOutcome::Unauthorized));
}

#[tokio::test]
async fn test_command_routes_to_its_handler_only() {
    let ranked = Handler::new(ViewSignature::command("rank", page_schema()), |_ctx| async {
        Ok(Reply::immediate(InteractionResponse::ephemeral_text("rank")))
    });
    let queue = Handler::new(ViewSignature::command("queue", page_schema()), |_ctx| async {
        Ok(Reply::immediate(InteractionResponse::ephemeral_text("queue")))
    });
    let rig = TestRig::new(vec![ranked, queue], Arc::new(MockMessagingPort::new()));

    let response = expect_response(rig.post(json!({
        "id": "1", "type": 2, "token": "t", "application_id": "a",
        "data": {"name": "queue", "type": 1}
    })).await);
    let body = response.data.unwrap();
    assert_eq!(body["content"], "queue");
}

#[tokio::test]
async fn test_component_state_round_trip_through_dispatch() {
    let signature = ViewSignature::component("pager", page_schema()).unwrap();

    // The command handler mints a component id carrying state.
    let mut minted = signature.state().unwrap();
    minted.record.save("page", Some(Value::Int(4))).unwrap();
    minted.record.save("confirm", Some(Value::Bool(false))).unwrap();
    let custom_id = minted.to_wire_id().unwrap();

    let pager = Handler::new(signature, |ctx| async move {
        let state = ctx.state()?;
        let page = state.record.int("page")?;
        let confirm = state.record.bool("confirm")?;
        Ok(Reply::immediate(InteractionResponse::update(
            json!({ "content": format!("page {page}, confirm {confirm}") }),
        )))
    });
    let rig = TestRig::new(vec![pager], Arc::new(MockMessagingPort::new()));

    let response = expect_response(rig.post(json!({
        "id": "1", "type": 3, "token": "t", "application_id": "a",
        "data": {"custom_id": custom_id}
    })).await);
    assert_eq!(response.kind, ResponseKind::UpdateMessage);
    assert_eq!(response.data.unwrap()["content"], "page 4, confirm false");
}

#[tokio::test]
async fn test_foreign_custom_id_renders_outdated_component() {
    let signature = ViewSignature::component("pager", page_schema()).unwrap();
    let pager = Handler::new(signature, |_ctx| async {
        Ok(Reply::immediate(InteractionResponse::pong()))
    });
    let rig = TestRig::new(vec![pager], Arc::new(MockMessagingPort::new()));

    let response = expect_response(rig.post(json!({
        "id": "1", "type": 3, "token": "t", "application_id": "a",
        "data": {"custom_id": "legacy-id-from-another-bot"}
    })).await);
    // Never a 500: the error boundary renders an ephemeral notice.
    assert_eq!(response.kind, ResponseKind::ChannelMessage);
    let body = response.data.unwrap();
    assert!(body["content"].as_str().unwrap().contains("outdated"));
    assert_eq!(body["flags"], 64);
}

#[tokio::test]
async fn test_unknown_prefix_renders_outdated_component() {
    let signature = ViewSignature::component("pager", page_schema()).unwrap();
    let mut minted = signature.state().unwrap();
    minted.record.save("page", Some(Value::Int(1))).unwrap();
    let custom_id = minted.to_wire_id().unwrap();

    // Registry knows a different prefix.
    let other = Handler::new(
        ViewSignature::component("roster", page_schema()).unwrap(),
        |_ctx| async { Ok(Reply::immediate(InteractionResponse::pong())) },
    );
    let rig = TestRig::new(vec![other], Arc::new(MockMessagingPort::new()));

    let response = expect_response(rig.post(json!({
        "id": "1", "type": 3, "token": "t", "application_id": "a",
        "data": {"custom_id": custom_id}
    })).await);
    assert!(response.data.unwrap()["content"]
        .as_str()
        .unwrap()
        .contains("outdated"));
}

#[tokio::test]
async fn test_guild_only_command_outside_guild() {
    let handler = Handler::new(
        ViewSignature::command("admin", page_schema()).guild_only(),
        |_ctx| async { Ok(Reply::immediate(InteractionResponse::pong())) },
    );
    let rig = TestRig::new(vec![handler], Arc::new(MockMessagingPort::new()));

    let response = expect_response(rig.post(json!({
        "id": "1", "type": 2, "token": "t", "application_id": "a",
        "data": {"name": "admin", "type": 1}
    })).await);
    assert!(response.data.unwrap()["content"]
        .as_str()
        .unwrap()
        .contains("server"));
}

#[tokio::test]
async fn test_autocomplete_path() {
    let handler = Handler::new(ViewSignature::command("rank", page_schema()), |_ctx| async {
        Ok(Reply::immediate(InteractionResponse::pong()))
    })
    .with_autocomplete(|_ctx| async {
        Ok(InteractionResponse::autocomplete(
            json!([{ "name": "gold", "value": "gold" }]),
        ))
    });
    let rig = TestRig::new(vec![handler], Arc::new(MockMessagingPort::new()));

    let response = expect_response(rig.post(json!({
        "id": "1", "type": 4, "token": "t", "application_id": "a",
        "data": {"name": "rank", "type": 1}
    })).await);
    assert_eq!(response.kind, ResponseKind::AutocompleteResult);
}

#[tokio::test]
async fn test_deferred_continuation_runs_off_response_path() {
    let (done_tx, done_rx) = tokio::sync::oneshot::channel::<String>();
    let done_tx = std::sync::Mutex::new(Some(done_tx));

    let handler = Handler::new(ViewSignature::command("slow", page_schema()), move |ctx| {
        let follow_up = ctx.follow_up();
        let done_tx = done_tx.lock().unwrap().take();
        async move {
            Ok(Reply::deferred(
                true,
                Box::pin(async move {
                    follow_up.send(json!({"content": "finished"})).await?;
                    if let Some(tx) = done_tx {
                        let _ = tx.send(follow_up.token().to_string());
                    }
                    Ok(())
                }),
            ))
        }
    });

    let mut mock = MockMessagingPort::new();
    mock.expect_create_followup()
        .withf(|token, body| token == "defer-token" && body["content"] == "finished")
        .times(1)
        .returning(|_, _| Ok(()));
    let rig = TestRig::new(vec![handler], Arc::new(mock));

    let response = expect_response(rig.post(json!({
        "id": "1", "type": 2, "token": "defer-token", "application_id": "a",
        "data": {"name": "slow", "type": 1}
    })).await);
    assert_eq!(response.kind, ResponseKind::DeferredChannelMessage);

    // The continuation completes after the immediate response was produced.
    let token = done_rx.await.unwrap();
    assert_eq!(token, "defer-token");
}

#[tokio::test]
async fn test_failing_continuation_surfaces_as_followup() {
    let handler = Handler::new(ViewSignature::command("boom", page_schema()), |_ctx| async {
        Ok(Reply::deferred(
            false,
            Box::pin(async { Err(anyhow::anyhow!("background exploded")) }),
        ))
    });

    let (seen_tx, seen_rx) = tokio::sync::oneshot::channel::<serde_json::Value>();
    let seen_tx = std::sync::Mutex::new(Some(seen_tx));
    let mut mock = MockMessagingPort::new();
    mock.expect_create_followup()
        .withf(|token, _| token == "boom-token")
        .times(1)
        .returning(move |_, body| {
            if let Some(tx) = seen_tx.lock().unwrap().take() {
                let _ = tx.send(body);
            }
            Ok(())
        });
    let rig = TestRig::new(vec![handler], Arc::new(mock));

    let response = expect_response(rig.post(json!({
        "id": "1", "type": 2, "token": "boom-token", "application_id": "a",
        "data": {"name": "boom", "type": 1}
    })).await);
    assert_eq!(response.kind, ResponseKind::DeferredChannelMessage);

    let body = seen_rx.await.unwrap();
    assert!(body["content"].as_str().unwrap().contains("went wrong"));
}

#[tokio::test]
async fn test_timeout_notice() {
    let (seen_tx, seen_rx) = tokio::sync::oneshot::channel::<()>();
    let seen_tx = std::sync::Mutex::new(Some(seen_tx));
    let mut mock = MockMessagingPort::new();
    mock.expect_create_followup()
        .withf(|token, body| token == "stale" && body["content"] == "Took too long.")
        .times(1)
        .returning(move |_, _| {
            if let Some(tx) = seen_tx.lock().unwrap().take() {
                let _ = tx.send(());
            }
            Ok(())
        });

    let signing = SigningKey::from_bytes(&[42u8; 32]);
    let verifier =
        RequestVerifier::from_hex(&hex::encode(signing.verifying_key().to_bytes())).unwrap();
    let dispatcher = Dispatcher::new(
        Arc::new(Registry::new(vec![]).unwrap()),
        verifier,
        Arc::new(mock),
    )
    .with_timeout_notice(json!({"content": "Took too long."}));

    dispatcher.notify_timeout("stale").await;
    seen_rx.await.unwrap();
}

#[tokio::test]
async fn test_callback_failure_uses_custom_renderer() {
    let handler = Handler::new(ViewSignature::command("fail", page_schema()), |_ctx| async {
        Err(anyhow::anyhow!("validation: pick a team first"))
    });
    let signing = SigningKey::from_bytes(&[42u8; 32]);
    let verifier =
        RequestVerifier::from_hex(&hex::encode(signing.verifying_key().to_bytes())).unwrap();
    let dispatcher = Dispatcher::new(
        Arc::new(Registry::new(vec![handler]).unwrap()),
        verifier,
        Arc::new(MockMessagingPort::new()),
    )
    .with_error_renderer(Arc::new(|error| {
        InteractionResponse::ephemeral_text(format!("custom: {error}"))
    }));

    let raw = serde_json::to_string(&json!({
        "id": "1", "type": 2, "token": "t", "application_id": "a",
        "data": {"name": "fail", "type": 1}
    }))
    .unwrap();
    let signature = hex::encode(
        signing
            .sign(format!("{TIMESTAMP}{raw}").as_bytes())
            .to_bytes(),
    );
    let outcome = dispatcher.handle(&signature, TIMESTAMP, &raw).await;
    let response = expect_response(outcome);
    assert!(response.data.unwrap()["content"]
        .as_str()
        .unwrap()
        .starts_with("custom: validation"));
}

// MessagingError is part of the public surface an adapter implements.
#[test]
fn test_messaging_error_display() {
    let error = MessagingError::RequestFailed("503".to_string());
    assert!(error.to_string().contains("503"));
}
