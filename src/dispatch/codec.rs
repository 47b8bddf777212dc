//! JSON codec for the management protocol.
//!
//! Requests are the JSON rendering of an [`Operation`] or [`Composite`].
//! Responses carry an `outcome` field (`success` or `failed`), a `result`
//! payload, an optional `failure-description`, and optional
//! `response-headers` with the server process state. Composite results are
//! demultiplexed from `step-1` … `step-N` keys into input order.

use serde_json::Value;

use super::error::DispatchError;
use super::operation::{Composite, Operation};
use super::result::{CompositeResult, ProcessState, StepResult};

const OUTCOME: &str = "outcome";
const SUCCESS: &str = "success";
const RESULT: &str = "result";
const FAILURE_DESCRIPTION: &str = "failure-description";
const RESPONSE_HEADERS: &str = "response-headers";
const PROCESS_STATE: &str = "process-state";

pub(crate) fn encode_operation(operation: &Operation) -> Result<Vec<u8>, DispatchError> {
    serde_json::to_vec(&operation.as_json())
        .map_err(|err| DispatchError::Malformed(format!("failed to encode request: {err}")))
}

pub(crate) fn encode_composite(composite: &Composite) -> Result<Vec<u8>, DispatchError> {
    serde_json::to_vec(&composite.as_json())
        .map_err(|err| DispatchError::Malformed(format!("failed to encode request: {err}")))
}

pub(crate) fn parse_body(body: &[u8]) -> Result<Value, DispatchError> {
    serde_json::from_slice(body)
        .map_err(|err| DispatchError::Malformed(format!("response is not valid JSON: {err}")))
}

pub(crate) fn process_state(response: &Value) -> Option<ProcessState> {
    response
        .get(RESPONSE_HEADERS)
        .and_then(|headers| headers.get(PROCESS_STATE))
        .and_then(Value::as_str)
        .map(ProcessState::from_wire)
}

fn is_success(response: &Value) -> bool {
    response.get(OUTCOME).and_then(Value::as_str) == Some(SUCCESS)
}

fn failure_description(response: &Value) -> String {
    response
        .get(FAILURE_DESCRIPTION)
        .map(|description| match description.as_str() {
            Some(text) => text.to_string(),
            None => description.to_string(),
        })
        .unwrap_or_else(|| "no failure description".to_string())
}

/// Classifies a parsed single-operation response into the success payload or
/// an application failure.
pub(crate) fn decode_single(
    operation: &Operation,
    response: &Value,
) -> Result<Value, DispatchError> {
    if is_success(response) {
        Ok(response.get(RESULT).cloned().unwrap_or(Value::Null))
    } else {
        Err(DispatchError::Application {
            operation: operation.as_cli(),
            failure: failure_description(response),
        })
    }
}

/// Demultiplexes a parsed composite response into one [`StepResult`] per
/// operation, preserving input order.
///
/// A failed outcome that still carries per-step results decodes as a
/// successful parse with failing steps; a failed outcome without step results
/// is an application failure for the whole batch. A missing step key is a
/// malformed response, never a silent truncation.
pub(crate) fn decode_composite(
    composite: &Composite,
    response: &Value,
) -> Result<CompositeResult, DispatchError> {
    let result = response.get(RESULT);
    let step_results = result.and_then(Value::as_object);

    if !is_success(response) && step_results.map_or(true, |steps| steps.is_empty()) {
        return Err(DispatchError::Application {
            operation: composite.as_cli(),
            failure: failure_description(response),
        });
    }

    let step_results = step_results.ok_or_else(|| {
        DispatchError::Malformed("composite response carries no step results".to_string())
    })?;

    let mut steps = Vec::with_capacity(composite.len());
    for index in 1..=composite.len() {
        let key = format!("step-{index}");
        let step = step_results.get(&key).ok_or_else(|| {
            DispatchError::Malformed(format!("composite response is missing '{key}'"))
        })?;
        if is_success(step) {
            steps.push(StepResult::success(step.get(RESULT).cloned()));
        } else {
            steps.push(StepResult::failure(failure_description(step)));
        }
    }
    Ok(CompositeResult::new(steps))
}
