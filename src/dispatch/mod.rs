//! Operation dispatch for the management interface.
//!
//! Operations and composites are encoded as JSON, sent through a
//! [`ManagementTransport`], and every completed exchange is routed to exactly
//! one of three outcomes: a result, an application failure, or a
//! transport/exceptional failure. The [`TimeoutPoller`] layers a
//! retry-until-condition policy on top.

pub mod codec;
pub mod dispatcher;
pub mod error;
pub mod operation;
pub mod poller;
pub mod result;
pub mod transport;

pub use dispatcher::{
    DispatchTask, Dispatcher, OnFailure, ProcessStateObserver, SessionCallback,
};
pub use error::{DispatchError, TransportError};
pub use operation::{Address, Composite, Operation, OperationBuilder};
pub use poller::{PollOutcome, TimeoutPoller, POLL_PERIOD};
pub use result::{CompositeResult, ProcessState, StepResult};
pub use transport::{HttpTransport, ManagementTransport, Session, WireResponse};
