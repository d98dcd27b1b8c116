//! Action registry: service -> action -> definition.
//!
//! Registration overwrites: replacing a definition is logged, never an
//! error. Resolution distinguishes a missing service from a missing
//! action. Register everything before the first dispatch; the registry
//! is shared read-only after that.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::observability::{Logger, Severity};
use crate::schema::types::{CheckedValue, TypeDesc, ValidatorFn, Verdict};

use super::errors::{DispatchError, DispatchResult, HandlerError};

/// Future returned by a handler
pub type HandlerFuture = BoxFuture<'static, Result<Value, HandlerError>>;

/// Async request handler, invoked with (context, args)
pub type Handler<C> = Arc<dyn Fn(Option<C>, Value) -> HandlerFuture + Send + Sync>;

/// Registration-time action signature: argument fields plus an optional
/// whole-arguments validator.
///
/// No argument fields means no constraint: any arguments are accepted.
pub struct Signature {
    args: Option<Vec<(String, TypeDesc)>>,
    validator: Option<Arc<ValidatorFn>>,
}

impl Signature {
    /// Signature that accepts any arguments
    pub fn untyped() -> Self {
        Self {
            args: None,
            validator: None,
        }
    }

    /// Signature with declared argument fields
    pub fn args<I, N>(fields: I) -> Self
    where
        I: IntoIterator<Item = (N, TypeDesc)>,
        N: Into<String>,
    {
        Self {
            args: Some(fields.into_iter().map(|(n, t)| (n.into(), t)).collect()),
            validator: None,
        }
    }

    /// Attaches a whole-arguments validator
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(CheckedValue<'_>) -> Verdict + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    // Synthesizes the argument object type. Done once at registration;
    // equivalent to per-request synthesis because definitions are
    // replaced whole and the registry is frozen during dispatch.
    fn into_arg_type(self) -> Option<TypeDesc> {
        let fields = self.args?;
        let mut desc = TypeDesc::object(fields);
        desc.validator = self.validator;
        Some(desc)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Option<Vec<&str>> = self
            .args
            .as_ref()
            .map(|fields| fields.iter().map(|(n, _)| n.as_str()).collect());
        f.debug_struct("Signature")
            .field("args", &names)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

/// A registered action: the synthesized argument type plus the handler.
pub struct ActionDef<C> {
    pub(crate) arg_type: Option<TypeDesc>,
    pub(crate) handler: Handler<C>,
}

impl<C> fmt::Debug for ActionDef<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDef")
            .field("arg_type", &self.arg_type)
            .finish()
    }
}

/// Two-level name table of registered actions.
pub struct ActionRegistry<C> {
    services: HashMap<String, HashMap<String, ActionDef<C>>>,
}

impl<C> Default for ActionRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> ActionRegistry<C> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            services: HashMap::new(),
        }
    }

    /// Register an action, replacing any previous definition under the
    /// same (service, action) key; a replacement is logged at warn
    /// severity
    pub fn register<F>(
        &mut self,
        service: impl Into<String>,
        action: impl Into<String>,
        signature: Signature,
        handler: F,
    ) where
        F: Fn(Option<C>, Value) -> HandlerFuture + Send + Sync + 'static,
    {
        let service = service.into();
        let action = action.into();
        let def = ActionDef {
            arg_type: signature.into_arg_type(),
            handler: Arc::new(handler),
        };
        let replaced = self
            .services
            .entry(service.clone())
            .or_default()
            .insert(action.clone(), def)
            .is_some();
        if replaced {
            Logger::log(
                Severity::Warn,
                "dispatch.action_replaced",
                &[("service", service.as_str()), ("action", action.as_str())],
            );
        }
    }

    /// Resolve an action definition.
    ///
    /// # Errors
    ///
    /// `SERVICE_NOT_FOUND` if the service key is absent,
    /// `ACTION_NOT_FOUND` if the action key is absent under it.
    pub fn resolve(&self, service: &str, action: &str) -> DispatchResult<&ActionDef<C>> {
        let actions = self
            .services
            .get(service)
            .ok_or_else(|| DispatchError::service_not_found(service))?;
        actions
            .get(action)
            .ok_or_else(|| DispatchError::action_not_found(service, action))
    }

    /// Number of registered actions across all services
    pub fn len(&self) -> usize {
        self.services.values().map(HashMap::len).sum()
    }

    /// Check if no actions are registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
