//! Legacy file-exchange binding.
//!
//! The host publishes `request.json` (ideally by renaming a `.tmp` file into
//! place); the worker answers in `response.json`, written atomically, and
//! then deletes the request. Only the final artefact names are ever read.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{TRANSPORT_TARGET, Transport, TransportError, TransportExit};
use crate::codec::Params;
use crate::dispatch::Dispatcher;
use crate::files::atomic_write;
use crate::supervisor::ShutdownFlag;

/// Request artefact published by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeRequest {
    /// Function to call.
    pub function: String,
    /// Positional (array) or named (object) arguments.
    pub args: Value,
    /// Correlation id echoed in the response.
    pub request_id: Value,
}

/// A request artefact that parsed as JSON but has the wrong shape.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedRequest {
    /// Why the artefact was rejected.
    pub message: String,
    /// Correlation id, when one could be read.
    pub request_id: Value,
}

impl TryFrom<Value> for ExchangeRequest {
    type Error = MalformedRequest;

    fn try_from(document: Value) -> Result<Self, Self::Error> {
        let Value::Object(mut fields) = document else {
            return Err(MalformedRequest {
                message: String::from("request must be a JSON object"),
                request_id: Value::Null,
            });
        };
        let request_id = fields.remove("request_id").unwrap_or(Value::Null);
        let args = fields.remove("args").unwrap_or(Value::Null);
        let message = match fields.remove("function") {
            Some(Value::String(function)) => {
                return Ok(Self {
                    function,
                    args,
                    request_id,
                });
            }
            Some(other) => format!("function must be a string, got {other}"),
            None => String::from("request is missing 'function'"),
        };
        Err(MalformedRequest {
            message,
            request_id,
        })
    }
}

/// Response artefact written by the worker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExchangeResponse {
    /// Call result, or the error message when `success` is false.
    pub result: Value,
    /// Correlation id copied from the request.
    pub request_id: Value,
    /// Whether the call succeeded.
    pub success: bool,
}

/// What a single poll did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// No request artefact was ready.
    Idle,
    /// A request was answered.
    Answered,
    /// A request artefact that was not valid JSON was discarded.
    Discarded,
}

/// File-exchange binding polling a directory for request artefacts.
#[derive(Debug, Clone)]
pub struct FileExchangeTransport {
    request_path: PathBuf,
    response_path: PathBuf,
    poll_interval: Duration,
}

impl FileExchangeTransport {
    /// Creates a binding over explicit artefact paths.
    #[must_use]
    pub fn new(
        request_path: impl Into<PathBuf>,
        response_path: impl Into<PathBuf>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            request_path: request_path.into(),
            response_path: response_path.into(),
            poll_interval,
        }
    }

    /// Path of the request artefact.
    #[must_use]
    pub fn request_path(&self) -> &Path {
        &self.request_path
    }

    /// Path of the response artefact.
    #[must_use]
    pub fn response_path(&self) -> &Path {
        &self.response_path
    }

    /// Checks for a request once and answers it if present.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Artefact`] when the response cannot be
    /// written.
    pub fn poll_once(&self, dispatcher: &Dispatcher) -> Result<PollOutcome, TransportError> {
        let Some(raw) = self.read_request() else {
            return Ok(PollOutcome::Idle);
        };

        let document = match serde_json::from_slice::<Value>(&raw) {
            Ok(document) => document,
            Err(error) => {
                warn!(
                    target: TRANSPORT_TARGET,
                    path = %self.request_path.display(),
                    error = %error,
                    "discarding corrupt request artefact"
                );
                self.remove_request();
                return Ok(PollOutcome::Discarded);
            }
        };

        let response = match ExchangeRequest::try_from(document) {
            Ok(request) => answer(dispatcher, request),
            Err(malformed) => {
                warn!(
                    target: TRANSPORT_TARGET,
                    path = %self.request_path.display(),
                    reason = %malformed.message,
                    "rejecting malformed request artefact"
                );
                ExchangeResponse {
                    result: Value::String(malformed.message),
                    request_id: malformed.request_id,
                    success: false,
                }
            }
        };
        let bytes = serde_json::to_vec(&response).map_err(|error| {
            TransportError::artefact(&self.response_path, io::Error::other(error))
        })?;
        atomic_write(&self.response_path, &bytes)
            .map_err(|source| TransportError::artefact(&self.response_path, source))?;
        self.remove_request();
        Ok(PollOutcome::Answered)
    }

    fn read_request(&self) -> Option<Vec<u8>> {
        match fs::read(&self.request_path) {
            Ok(raw) if raw.trim_ascii().is_empty() => None,
            Ok(raw) => Some(raw),
            Err(error) if error.kind() == io::ErrorKind::NotFound => None,
            Err(error) => {
                warn!(
                    target: TRANSPORT_TARGET,
                    path = %self.request_path.display(),
                    error = %error,
                    "failed to read request artefact"
                );
                None
            }
        }
    }

    fn remove_request(&self) {
        match fs::remove_file(&self.request_path) {
            Ok(()) => {}
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(error) => warn!(
                target: TRANSPORT_TARGET,
                path = %self.request_path.display(),
                error = %error,
                "failed to remove request artefact"
            ),
        }
    }
}

impl Transport for FileExchangeTransport {
    fn name(&self) -> &'static str {
        "file"
    }

    fn serve(
        &mut self,
        dispatcher: &Dispatcher,
        shutdown: &ShutdownFlag,
    ) -> Result<TransportExit, TransportError> {
        info!(
            target: TRANSPORT_TARGET,
            request = %self.request_path.display(),
            poll_ms = self.poll_interval.as_millis(),
            "file exchange serving"
        );
        loop {
            if shutdown.is_raised() {
                return Ok(TransportExit::Shutdown);
            }
            let idle = self.poll_once(dispatcher)? == PollOutcome::Idle;
            if idle && !shutdown.sleep(self.poll_interval) {
                return Ok(TransportExit::Shutdown);
            }
        }
    }
}

fn answer(dispatcher: &Dispatcher, request: ExchangeRequest) -> ExchangeResponse {
    let ExchangeRequest {
        function,
        args,
        request_id,
    } = request;
    let params = match args {
        Value::Null => Ok(Params::Absent),
        Value::Array(values) => Ok(Params::Positional(values)),
        Value::Object(named) => Ok(Params::Named(named)),
        _ => Err(String::from("args must be an array or an object")),
    };
    let outcome = params.and_then(|bound| {
        dispatcher
            .call(&function, &bound)
            .map_err(|error| error.to_string())
    });
    debug!(
        target: TRANSPORT_TARGET,
        function = %function,
        success = outcome.is_ok(),
        "answered exchange request"
    );
    match outcome {
        Ok(result) => ExchangeResponse {
            result,
            request_id,
            success: true,
        },
        Err(message) => ExchangeResponse {
            result: Value::String(message),
            request_id,
            success: false,
        },
    }
}
