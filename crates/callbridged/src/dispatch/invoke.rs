//! Panic-safe invocation of registered targets, with an optional deadline.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use serde_json::Value;
use tracing::warn;

use super::DISPATCH_TARGET;
use super::errors::DispatchError;
use crate::registry::{CallArgs, FunctionDescriptor, TargetError};

type CallOutcome = thread::Result<Result<Value, TargetError>>;

/// Runs a target, converting returned errors and panics into
/// [`DispatchError`]s.
///
/// With a timeout the target runs on its own thread. A call that outlives the
/// budget is reported as timed out and its thread is left to finish
/// detached.
pub(crate) fn invoke(
    descriptor: &FunctionDescriptor,
    args: CallArgs,
    timeout: Option<Duration>,
) -> Result<Value, DispatchError> {
    let outcome = match timeout {
        None => panic::catch_unwind(AssertUnwindSafe(|| descriptor.invoke(&args))),
        Some(budget) => invoke_with_deadline(descriptor, args, budget)?,
    };
    settle(descriptor.name(), outcome)
}

fn invoke_with_deadline(
    descriptor: &FunctionDescriptor,
    args: CallArgs,
    budget: Duration,
) -> Result<CallOutcome, DispatchError> {
    let function = descriptor.name().to_owned();
    let target = descriptor.target();
    let (sender, receiver) = mpsc::channel::<CallOutcome>();

    thread::Builder::new()
        .name(format!("call-{function}"))
        .spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| target.call(&args)));
            if sender.send(outcome).is_err() {
                warn!(
                    target: DISPATCH_TARGET,
                    "call finished after its caller stopped waiting"
                );
            }
        })
        .map_err(|error| DispatchError::Spawn {
            function: function.clone(),
            message: error.to_string(),
        })?;

    match receiver.recv_timeout(budget) {
        Ok(outcome) => Ok(outcome),
        Err(RecvTimeoutError::Timeout) => Err(DispatchError::TimedOut {
            function,
            timeout: budget,
        }),
        Err(RecvTimeoutError::Disconnected) => Err(DispatchError::Panicked {
            function,
            message: String::from("call thread exited without a result"),
        }),
    }
}

fn settle(function: &str, outcome: CallOutcome) -> Result<Value, DispatchError> {
    match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(DispatchError::Target {
            function: function.to_owned(),
            message: error.to_string(),
        }),
        Err(payload) => Err(DispatchError::Panicked {
            function: function.to_owned(),
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| String::from("non-textual panic payload"))
}
