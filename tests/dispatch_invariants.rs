//! Dispatch Invariant Tests
//!
//! Invariants under test:
//! - Outcomes are complete and index-aligned with the input requests
//! - A failing pipeline never contaminates its siblings or the batch
//! - Re-registration replaces the previous definition
//! - Wire shapes match the outcome contract
//!
//! Dispatch order is never assumed; alignment must hold regardless of
//! completion order.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use callgate::dispatch::{
    ActionRegistry, Dispatcher, HandlerError, Outcome, RequestEnvelope, Signature,
};
use callgate::schema::{CheckedValue, TypeDesc, TypeRegistry, Verdict};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn greeter_dispatcher() -> Dispatcher<()> {
    let mut actions: ActionRegistry<()> = ActionRegistry::new();
    actions.register(
        "greeter",
        "hello",
        Signature::args([("name", TypeDesc::string())]),
        |_, args| {
            Box::pin(async move {
                let name = args["name"].as_str().unwrap_or("world").to_string();
                Ok(json!(format!("hello {}", name)))
            })
        },
    );
    Dispatcher::new(TypeRegistry::new(), actions)
}

// =============================================================================
// Isolation and Alignment Tests
// =============================================================================

/// One valid and one unknown action: a length-2, index-aligned outcome
/// sequence with the failure confined to its own slot.
#[test]
fn test_dispatch_isolation() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let dispatcher = greeter_dispatcher();

    let outcomes = runtime.block_on(dispatcher.dispatch(
        None,
        vec![
            RequestEnvelope::new("greeter", "hello", json!({"name": "ada"})),
            RequestEnvelope::new("greeter", "unknown", json!({})),
        ],
    ));

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].data(), Some(&json!("hello ada")));
    assert_eq!(outcomes[1].error_code(), Some("ACTION_NOT_FOUND"));
}

/// A batch where every request fails still yields one outcome per
/// request.
#[tokio::test]
async fn test_all_failing_batch_is_complete() {
    let dispatcher = greeter_dispatcher();

    let outcomes = dispatcher
        .dispatch(
            None,
            vec![
                RequestEnvelope::default(),
                RequestEnvelope::new("nope", "hello", json!({})),
                RequestEnvelope::new("greeter", "hello", json!({"name": 5})),
            ],
        )
        .await;

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].error_code(), Some("SERVICE_FIELD_MISSING"));
    assert_eq!(outcomes[1].error_code(), Some("SERVICE_NOT_FOUND"));
    assert_eq!(outcomes[2].error_code(), Some("PARAMETER_VALIDATION_ERROR"));
}

/// Handlers finishing out of order still land in their input slots.
#[tokio::test]
async fn test_alignment_is_independent_of_completion_order() {
    let mut actions: ActionRegistry<()> = ActionRegistry::new();
    actions.register("echo", "tagged", Signature::untyped(), |_, args| {
        Box::pin(async move {
            let delay = args["delay_ms"].as_u64().unwrap_or(0);
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
            Ok(args["tag"].clone())
        })
    });
    let dispatcher = Dispatcher::new(TypeRegistry::new(), actions);

    let requests: Vec<RequestEnvelope> = (0..8)
        .map(|i| {
            RequestEnvelope::new(
                "echo",
                "tagged",
                json!({"delay_ms": (8 - i) * 5, "tag": i}),
            )
        })
        .collect();

    let outcomes = dispatcher.dispatch(None, requests).await;
    for (i, outcome) in outcomes.iter().enumerate() {
        assert_eq!(outcome.data(), Some(&json!(i)));
    }
}

// =============================================================================
// Registration Semantics Tests
// =============================================================================

/// Re-registering the same (service, action) pair replaces the old
/// definition; subsequent dispatch uses only the latest.
#[tokio::test]
async fn test_reregistration_uses_latest_definition() {
    let mut actions: ActionRegistry<()> = ActionRegistry::new();
    actions.register("v", "get", Signature::untyped(), |_, _| {
        Box::pin(async { Ok(json!("old")) })
    });
    actions.register("v", "get", Signature::untyped(), |_, _| {
        Box::pin(async { Ok(json!("new")) })
    });
    let dispatcher = Dispatcher::new(TypeRegistry::new(), actions);

    let outcomes = dispatcher
        .dispatch(None, vec![RequestEnvelope::new("v", "get", json!({}))])
        .await;
    assert_eq!(outcomes[0].data(), Some(&json!("new")));
}

/// An action registered without an argument schema accepts anything,
/// including absent arguments.
#[tokio::test]
async fn test_untyped_signature_accepts_any_arguments() {
    let mut actions: ActionRegistry<()> = ActionRegistry::new();
    actions.register("free", "form", Signature::untyped(), |_, args| {
        Box::pin(async move { Ok(args) })
    });
    let dispatcher = Dispatcher::new(TypeRegistry::new(), actions);

    let outcomes = dispatcher
        .dispatch(
            None,
            vec![
                RequestEnvelope::new("free", "form", json!([1, "mixed", null])),
                RequestEnvelope {
                    service: Some("free".into()),
                    action: Some("form".into()),
                    args: None,
                },
            ],
        )
        .await;

    assert!(outcomes[0].is_success());
    assert!(outcomes[1].is_success());
}

/// With a declared argument schema, absent arguments check as null and
/// fail as mandatory input.
#[tokio::test]
async fn test_typed_signature_rejects_absent_arguments() {
    let dispatcher = greeter_dispatcher();

    let outcomes = dispatcher
        .dispatch(
            None,
            vec![RequestEnvelope {
                service: Some("greeter".into()),
                action: Some("hello".into()),
                args: None,
            }],
        )
        .await;

    let value = outcomes[0].to_value();
    assert_eq!(value["error"]["code"], "PARAMETER_VALIDATION_ERROR");
    assert_eq!(value["error"]["error"]["code"], "MANDATORY_INPUT_IS_NULL");
}

/// A whole-arguments validator from the signature runs after the field
/// checks and surfaces as a nested validator error.
#[tokio::test]
async fn test_signature_validator_runs_after_field_checks() {
    let mut actions: ActionRegistry<()> = ActionRegistry::new();
    actions.register(
        "range",
        "set",
        Signature::args([("min", TypeDesc::number()), ("max", TypeDesc::number())])
            .with_validator(|value| match value {
                CheckedValue::Composite(v) => {
                    let min = v["min"].as_f64().unwrap_or(0.0);
                    let max = v["max"].as_f64().unwrap_or(0.0);
                    Verdict::guard(min <= max, "min must not exceed max")
                }
                _ => Verdict::fail("expected the whole arguments object"),
            }),
        |_, args| Box::pin(async move { Ok(args) }),
    );
    let dispatcher = Dispatcher::new(TypeRegistry::new(), actions);

    let ok = dispatcher
        .dispatch(
            None,
            vec![RequestEnvelope::new("range", "set", json!({"min": 1, "max": 2}))],
        )
        .await;
    assert!(ok[0].is_success());

    let bad = dispatcher
        .dispatch(
            None,
            vec![RequestEnvelope::new("range", "set", json!({"min": 3, "max": 2}))],
        )
        .await;
    let value = bad[0].to_value();
    assert_eq!(value["error"]["code"], "PARAMETER_VALIDATION_ERROR");
    assert_eq!(value["error"]["error"]["code"], "VALIDATOR_ERROR");
    assert_eq!(value["error"]["error"]["validator"], "min must not exceed max");
}

// =============================================================================
// Handler Contract Tests
// =============================================================================

/// Handler failure payloads travel unwrapped under SERVICE_CALL_ERROR;
/// message-only failures travel as a message object.
#[tokio::test]
async fn test_service_call_error_payloads() {
    let mut actions: ActionRegistry<()> = ActionRegistry::new();
    actions.register("f", "structured", Signature::untyped(), |_, _| {
        Box::pin(async {
            Err(HandlerError::with_payload(
                "refused",
                json!({"code": "QUOTA_EXCEEDED", "limit": 10}),
            ))
        })
    });
    actions.register("f", "plain", Signature::untyped(), |_, _| {
        Box::pin(async { Err(HandlerError::new("something broke")) })
    });
    let dispatcher = Dispatcher::new(TypeRegistry::new(), actions);

    let outcomes = dispatcher
        .dispatch(
            None,
            vec![
                RequestEnvelope::new("f", "structured", json!({})),
                RequestEnvelope::new("f", "plain", json!({})),
            ],
        )
        .await;

    let structured = outcomes[0].to_value();
    assert_eq!(structured["error"]["code"], "SERVICE_CALL_ERROR");
    assert_eq!(structured["error"]["error"]["code"], "QUOTA_EXCEEDED");
    assert_eq!(structured["error"]["error"]["limit"], 10);

    let plain = outcomes[1].to_value();
    assert_eq!(plain["error"]["error"]["message"], "something broke");
}

/// A panicking handler is converted at its own pipeline boundary; every
/// sibling pipeline still runs to completion.
#[tokio::test]
async fn test_panic_containment_across_a_batch() {
    let invoked = Arc::new(AtomicUsize::new(0));

    let mut actions: ActionRegistry<()> = ActionRegistry::new();
    actions.register("p", "explode", Signature::untyped(), |_, _| {
        Box::pin(async { panic!("deliberate test panic") })
    });
    let counter = Arc::clone(&invoked);
    actions.register("p", "count", Signature::untyped(), move |_, _| {
        let counter = Arc::clone(&counter);
        Box::pin(async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(json!(null))
        })
    });
    let dispatcher = Dispatcher::new(TypeRegistry::new(), actions);

    let outcomes = dispatcher
        .dispatch(
            None,
            vec![
                RequestEnvelope::new("p", "count", json!({})),
                RequestEnvelope::new("p", "explode", json!({})),
                RequestEnvelope::new("p", "count", json!({})),
            ],
        )
        .await;

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].is_success());
    assert_eq!(outcomes[1].error_code(), Some("SERVICE_CALL_ERROR"));
    assert!(outcomes[2].is_success());
    assert_eq!(invoked.load(Ordering::SeqCst), 2);
}

// =============================================================================
// Wire Shape Tests
// =============================================================================

/// The serialized outcome sequence matches the transport contract.
#[tokio::test]
async fn test_outcome_wire_contract() {
    let dispatcher = greeter_dispatcher();
    let outcomes = dispatcher
        .dispatch(
            None,
            vec![
                RequestEnvelope::new("greeter", "hello", json!({"name": "bob"})),
                RequestEnvelope::new("greeter", "gone", json!({})),
            ],
        )
        .await;

    let rendered: Vec<serde_json::Value> = outcomes.iter().map(Outcome::to_value).collect();
    assert_eq!(
        rendered[0],
        json!({"status": "ok", "data": "hello bob"})
    );
    assert_eq!(
        rendered[1],
        json!({"status": "error", "error": {"code": "ACTION_NOT_FOUND"}})
    );

    // The string form carries the same shape.
    for (outcome, value) in outcomes.iter().zip(&rendered) {
        let reparsed: serde_json::Value = serde_json::from_str(&outcome.to_json()).unwrap();
        assert_eq!(&reparsed, value);
    }
}
