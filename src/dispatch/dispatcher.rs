use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use super::codec;
use super::error::{DispatchError, TransportError};
use super::operation::{Composite, Operation};
use super::result::{CompositeResult, ProcessState};
use super::transport::ManagementTransport;
use crate::flow::{Abort, FlowTask, TaskResult};

/// Re-authentication hook, notified when the management interface answers
/// with a 401. The dispatcher reports [`DispatchError::Unauthorized`] after
/// the callback returns; it does not replay the request.
#[async_trait]
pub trait SessionCallback: Send + Sync {
    async fn reauthenticate(&self);
}

/// Receives server process-state changes (reload/restart required) carried in
/// response headers of otherwise ordinary exchanges.
pub trait ProcessStateObserver: Send + Sync {
    fn on_process_state(&self, state: ProcessState);
}

/// Turns operations into management exchanges and routes every completed
/// exchange to exactly one of: success, application failure, or
/// transport/exceptional failure.
pub struct Dispatcher {
    transport: Arc<dyn ManagementTransport>,
    session_callback: Option<Arc<dyn SessionCallback>>,
    process_state_observer: Option<Arc<dyn ProcessStateObserver>>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn ManagementTransport>) -> Self {
        Self {
            transport,
            session_callback: None,
            process_state_observer: None,
        }
    }

    pub fn with_session_callback(mut self, callback: Arc<dyn SessionCallback>) -> Self {
        self.session_callback = Some(callback);
        self
    }

    pub fn with_process_state_observer(mut self, observer: Arc<dyn ProcessStateObserver>) -> Self {
        self.process_state_observer = Some(observer);
        self
    }

    /// Executes a single operation and returns its result payload.
    pub async fn execute(&self, operation: &Operation) -> Result<Value, DispatchError> {
        let payload = codec::encode_operation(operation)?;
        let response = self.exchange(payload, &operation.as_cli()).await?;
        codec::decode_single(operation, &response)
    }

    /// Executes a composite as one exchange and demultiplexes the step
    /// results in input order. A transport failure fails the whole batch;
    /// individual step failures come back inside the parsed result.
    pub async fn execute_composite(
        &self,
        composite: &Composite,
    ) -> Result<CompositeResult, DispatchError> {
        let payload = codec::encode_composite(composite)?;
        let response = self.exchange(payload, &composite.as_cli()).await?;
        codec::decode_composite(composite, &response)
    }

    async fn exchange(&self, payload: Vec<u8>, cli: &str) -> Result<Value, DispatchError> {
        let correlation_id = Uuid::new_v4();
        debug!(%correlation_id, operation = cli, "dispatching management operation");

        let wire = self.transport.send(payload).await.map_err(|err| {
            warn!(%correlation_id, operation = cli, error = %err, "transport failure");
            DispatchError::Transport(err)
        })?;

        if wire.status == 401 {
            warn!(%correlation_id, operation = cli, "management interface rejected the session");
            if let Some(callback) = &self.session_callback {
                callback.reauthenticate().await;
            }
            return Err(DispatchError::Unauthorized);
        }

        let response = match codec::parse_body(&wire.body) {
            Ok(response) => response,
            Err(_) if wire.status >= 400 => {
                // No management payload to classify, just an HTTP error.
                return Err(DispatchError::Transport(TransportError::Http {
                    status: wire.status,
                }));
            }
            Err(parse_error) => return Err(parse_error),
        };

        if let (Some(observer), Some(state)) = (
            &self.process_state_observer,
            codec::process_state(&response),
        ) {
            debug!(%correlation_id, ?state, "server process state reported");
            observer.on_process_state(state);
        }
        Ok(response)
    }
}

/// What a [`DispatchTask`] does with a dispatch failure: abort its pipeline,
/// or proceed and let the apply hook decide (for expected/optional failures).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnFailure {
    Abort,
    Proceed,
}

/// Flow-friendly composite dispatch: runs the composite as a pipeline task
/// and hands the outcome to an apply hook that updates the pipeline context.
///
/// With [`OnFailure::Proceed`] the pipeline continues past failures and the
/// hook receives the error; with [`OnFailure::Abort`] a failure aborts the
/// pipeline with the dispatch error recorded as the cause.
pub struct DispatchTask<'hook, C> {
    dispatcher: Arc<Dispatcher>,
    composite: Composite,
    on_failure: OnFailure,
    apply: Box<dyn FnMut(&mut C, Result<CompositeResult, DispatchError>) + 'hook>,
}

impl<'hook, C> DispatchTask<'hook, C> {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        composite: Composite,
        on_failure: OnFailure,
        apply: impl FnMut(&mut C, Result<CompositeResult, DispatchError>) + 'hook,
    ) -> Self {
        Self {
            dispatcher,
            composite,
            on_failure,
            apply: Box::new(apply),
        }
    }
}

#[async_trait(?Send)]
impl<'hook, C> FlowTask<C> for DispatchTask<'hook, C> {
    async fn run(&mut self, ctx: &mut C) -> TaskResult {
        match self.dispatcher.execute_composite(&self.composite).await {
            Ok(result) => {
                (self.apply)(ctx, Ok(result));
                Ok(())
            }
            Err(err) => match self.on_failure {
                OnFailure::Proceed => {
                    (self.apply)(ctx, Err(err));
                    Ok(())
                }
                OnFailure::Abort => Err(Abort::caused_by(
                    format!("{} failed", self.composite.as_cli()),
                    err,
                )),
            },
        }
    }
}
