//! Request dispatcher.
//!
//! One pipeline instance per request:
//! 1. Require service and action fields
//! 2. Resolve the action definition
//! 3. Check arguments against the action's argument type
//! 4. Invoke the handler and await it
//! 5. Wrap handler failure as SERVICE_CALL_ERROR
//!
//! Every pipeline runs in its own spawned task; a failure (or panic) in
//! one request is converted at that pipeline's boundary and never aborts
//! the gather. Outcomes are index-aligned with the input requests
//! regardless of completion order.

use std::sync::Arc;

use futures_util::future::join_all;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::observability::{Logger, Severity};
use crate::schema::{TypeChecker, TypeRegistry};

use super::errors::{DispatchError, DispatchResult};
use super::registry::ActionRegistry;
use super::request::RequestEnvelope;
use super::response::Outcome;

/// Concurrent, failure-isolating request dispatcher.
///
/// Owns the frozen type and action registries; `dispatch` may be called
/// concurrently from multiple tasks.
pub struct Dispatcher<C> {
    types: Arc<TypeRegistry>,
    actions: Arc<ActionRegistry<C>>,
}

impl<C> Dispatcher<C>
where
    C: Clone + Send + Sync + 'static,
{
    /// Create a dispatcher over frozen registries
    pub fn new(types: TypeRegistry, actions: ActionRegistry<C>) -> Self {
        Self {
            types: Arc::new(types),
            actions: Arc::new(actions),
        }
    }

    /// Dispatch a batch of requests and gather their outcomes.
    ///
    /// Outcome `i` corresponds to request `i`. The returned sequence is
    /// always complete: a failed pipeline contributes an error outcome,
    /// never a gap or an aborted batch.
    pub async fn dispatch(
        &self,
        context: Option<C>,
        requests: Vec<RequestEnvelope>,
    ) -> Vec<Outcome> {
        let count = requests.len().to_string();
        Logger::log(Severity::Info, "dispatch.batch", &[("count", &count)]);

        let mut handles = Vec::with_capacity(requests.len());
        for request in requests {
            let types = Arc::clone(&self.types);
            let actions = Arc::clone(&self.actions);
            let context = context.clone();
            handles.push(tokio::spawn(async move {
                run_pipeline(&types, &actions, context, request).await
            }));
        }

        join_all(handles)
            .await
            .into_iter()
            .map(|joined| match joined {
                Ok(outcome) => outcome,
                // A panicking handler is caught at the task boundary and
                // becomes that request's outcome.
                Err(join_err) => {
                    let detail = join_err.to_string();
                    Logger::error("dispatch.pipeline_panic", &[("detail", &detail)]);
                    Outcome::error(&DispatchError::service_call(json!({
                        "message": "handler panicked",
                    })))
                }
            })
            .collect()
    }
}

async fn run_pipeline<C>(
    types: &TypeRegistry,
    actions: &ActionRegistry<C>,
    context: Option<C>,
    request: RequestEnvelope,
) -> Outcome {
    let request_id = Uuid::new_v4().to_string();
    match handle_request(types, actions, context, request).await {
        Ok(data) => Outcome::success(data),
        Err(err) => {
            Logger::error(
                "dispatch.request_failed",
                &[
                    ("code", err.code().code()),
                    ("message", err.message()),
                    ("request_id", &request_id),
                ],
            );
            Outcome::error(&err)
        }
    }
}

async fn handle_request<C>(
    types: &TypeRegistry,
    actions: &ActionRegistry<C>,
    context: Option<C>,
    request: RequestEnvelope,
) -> DispatchResult<Value> {
    // 1. Field presence (empty strings count as missing)
    let service = request
        .service_name()
        .ok_or_else(DispatchError::service_field_missing)?;
    let action = request
        .action_name()
        .ok_or_else(DispatchError::action_field_missing)?;

    // 2. Resolution
    let def = actions.resolve(service, action)?;

    // 3. Argument validation; actions without a declared argument type
    // accept anything. Absent arguments check as null.
    let args = request.args.clone().unwrap_or(Value::Null);
    TypeChecker::new(types)
        .check_optional(&args, def.arg_type.as_ref())
        .map_err(DispatchError::parameter_validation)?;

    // 4/5. Invocation; the handler sees the raw (uncoerced) arguments
    (def.handler)(context, args)
        .await
        .map_err(|err| DispatchError::service_call(err.into_error_payload()))
}
