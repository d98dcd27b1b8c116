//! Request dispatch: registry, envelope, outcomes, and the dispatcher.
//!
//! Callers register async handlers under (service, action) keys with an
//! argument schema; the dispatcher validates each request's arguments
//! through the schema checker, invokes the handler, and converts any
//! failure into that request's outcome without touching its siblings.

pub mod dispatcher;
pub mod errors;
pub mod registry;
pub mod request;
pub mod response;

pub use dispatcher::Dispatcher;
pub use errors::{DispatchCode, DispatchError, HandlerError};
pub use registry::{ActionRegistry, Handler, HandlerFuture, Signature};
pub use request::RequestEnvelope;
pub use response::Outcome;
