//! Timeout poller timing tests on a paused clock.
//!
//! An in-process transport keeps the tests deterministic: the only time that
//! passes is the virtual time of the poll periods themselves.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::time::Instant;

use switchboard::dispatch::{
    Address, Composite, Dispatcher, ManagementTransport, Operation, PollOutcome, TimeoutPoller,
    TransportError, WireResponse,
};

/// Answers `starting` until the configured attempt, then `running`.
/// Attempts at or below `fail_until` get an HTTP 500 instead.
struct ScriptedTransport {
    calls: AtomicU32,
    running_from: u32,
    fail_until: u32,
}

impl ScriptedTransport {
    fn new(running_from: u32, fail_until: u32) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU32::new(0),
            running_from,
            fail_until,
        })
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ManagementTransport for ScriptedTransport {
    async fn send(&self, _payload: Vec<u8>) -> Result<WireResponse, TransportError> {
        let attempt = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.fail_until {
            return Ok(WireResponse {
                status: 500,
                body: b"<html>gateway error</html>".to_vec(),
            });
        }
        let state = if attempt >= self.running_from {
            "running"
        } else {
            "starting"
        };
        let body = serde_json::to_vec(&json!({"outcome": "success", "result": state})).unwrap();
        Ok(WireResponse { status: 200, body })
    }
}

fn server_state() -> Operation {
    Operation::builder("read-attribute", Address::root().and("server", "backend-1"))
        .param("name", "server-state")
        .build()
}

#[tokio::test(start_paused = true)]
async fn success_fires_after_the_third_dispatch_not_earlier_or_later() {
    let transport = ScriptedTransport::new(3, 0);
    let dispatcher = Arc::new(Dispatcher::new(transport.clone()));
    let poller = TimeoutPoller::new(dispatcher, Duration::from_secs(60));

    let started = Instant::now();
    let outcome = poller
        .execute_until(&server_state(), |result| result == "running")
        .await;

    assert!(outcome.is_satisfied());
    assert_eq!(transport.calls(), 3);
    // One poll period before each of the three dispatches.
    assert_eq!(started.elapsed(), Duration::from_millis(1500));
}

#[tokio::test(start_paused = true)]
async fn timeout_fires_at_the_first_boundary_past_the_deadline() {
    let transport = ScriptedTransport::new(u32::MAX, 0);
    let dispatcher = Arc::new(Dispatcher::new(transport.clone()));
    let poller = TimeoutPoller::new(dispatcher, Duration::from_secs(2));

    let started = Instant::now();
    let outcome = poller
        .execute_until(&server_state(), |result| result == "running")
        .await;

    match outcome {
        PollOutcome::TimedOut { last_error } => assert!(last_error.is_none()),
        other => panic!("expected a timeout, got {other:?}"),
    }
    // The boundary at exactly 2s still runs one more iteration; the poller
    // gives up on the first boundary past the deadline.
    assert_eq!(transport.calls(), 5);
    assert_eq!(started.elapsed(), Duration::from_millis(2500));
}

#[tokio::test(start_paused = true)]
async fn dispatch_failures_do_not_end_the_poll_before_the_deadline() {
    let transport = ScriptedTransport::new(3, 2);
    let dispatcher = Arc::new(Dispatcher::new(transport.clone()));
    let poller = TimeoutPoller::new(dispatcher, Duration::from_secs(60));

    let outcome = poller
        .execute_until(&server_state(), |result| result == "running")
        .await;

    // Two failed dispatches, then the condition is satisfied.
    assert!(outcome.is_satisfied());
    assert_eq!(transport.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn persistent_failures_surface_as_a_timeout_with_diagnostics() {
    let transport = ScriptedTransport::new(u32::MAX, u32::MAX);
    let dispatcher = Arc::new(Dispatcher::new(transport.clone()));
    let poller = TimeoutPoller::new(dispatcher, Duration::from_secs(1));

    let outcome = poller.execute(&server_state()).await;

    match outcome {
        PollOutcome::TimedOut { last_error } => {
            let err = last_error.expect("last dispatch error should be kept");
            assert!(err.is_transport());
        }
        other => panic!("expected a timeout, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn composite_poll_defaults_to_every_step_succeeded() {
    struct CompositeTransport {
        calls: AtomicU32,
    }

    #[async_trait]
    impl ManagementTransport for CompositeTransport {
        async fn send(&self, _payload: Vec<u8>) -> Result<WireResponse, TransportError> {
            let attempt = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            let second_step = if attempt >= 2 {
                json!({"outcome": "success", "result": "running"})
            } else {
                json!({"outcome": "failed", "failure-description": "still starting"})
            };
            let body = serde_json::to_vec(&json!({
                "outcome": "success",
                "result": {
                    "step-1": {"outcome": "success", "result": "running"},
                    "step-2": second_step,
                }
            }))
            .unwrap();
            Ok(WireResponse { status: 200, body })
        }
    }

    let transport = Arc::new(CompositeTransport {
        calls: AtomicU32::new(0),
    });
    let dispatcher = Arc::new(Dispatcher::new(transport.clone()));
    let poller = TimeoutPoller::new(dispatcher, Duration::from_secs(60));

    let composite = Composite::new(vec![server_state(), server_state()]);
    let outcome = poller.execute_composite(&composite).await;

    assert!(outcome.is_satisfied());
    assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
}
