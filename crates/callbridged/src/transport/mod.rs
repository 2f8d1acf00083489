//! Transport bindings that carry frames between the host and the
//! dispatcher.
//!
//! Both bindings implement [`Transport`]. A serve call blocks until the
//! inbound channel closes, shutdown is requested, or an unrecoverable I/O
//! error occurs; the supervisor decides what happens next. Because a served
//! transport may have consumed its channel, the supervisor asks a
//! [`TransportFactory`] for a fresh instance on every start.

mod errors;
mod exchange;
mod frames;
mod stream;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use callbridge_config::{Config, ExchangePaths, TransportKind};
use once_cell::sync::OnceCell;

use crate::dispatch::Dispatcher;
use crate::supervisor::ShutdownFlag;

pub use self::errors::TransportError;
pub use self::exchange::{
    ExchangeRequest, ExchangeResponse, FileExchangeTransport, MalformedRequest, PollOutcome,
};
pub use self::stream::{FrameFeed, StreamTransport};

pub(crate) const TRANSPORT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");

/// Why a serve call returned normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportExit {
    /// The inbound channel reached end of stream.
    ChannelClosed,
    /// The shutdown flag was raised.
    Shutdown,
}

/// A binding that serves requests until told to stop.
pub trait Transport {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    /// Serves frames until the channel closes or shutdown is requested.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on unrecoverable I/O failure.
    fn serve(
        &mut self,
        dispatcher: &Dispatcher,
        shutdown: &ShutdownFlag,
    ) -> Result<TransportExit, TransportError>;
}

/// Builds a fresh transport for each supervisor start.
pub trait TransportFactory: Send + Sync {
    /// Creates a transport ready to serve.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the binding cannot be prepared.
    fn create(&self) -> Result<Box<dyn Transport>, TransportError>;
}

/// Factory selecting the binding named by the configuration.
///
/// Stream transports share one [`FrameFeed`] over stdin, started on first
/// use, so a restart never opens a second reader on the same channel.
#[derive(Debug)]
pub struct ConfiguredTransportFactory {
    kind: TransportKind,
    paths: ExchangePaths,
    max_frame_bytes: usize,
    poll_interval: Duration,
    stdin_feed: OnceCell<Arc<FrameFeed>>,
}

impl ConfiguredTransportFactory {
    /// Creates a factory for the configured binding.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            kind: config.transport(),
            paths: ExchangePaths::from_config(config),
            max_frame_bytes: config.max_frame_bytes(),
            poll_interval: config.poll_interval(),
            stdin_feed: OnceCell::new(),
        }
    }
}

impl TransportFactory for ConfiguredTransportFactory {
    fn create(&self) -> Result<Box<dyn Transport>, TransportError> {
        match self.kind {
            TransportKind::Stream => {
                let feed = self
                    .stdin_feed
                    .get_or_try_init(|| FrameFeed::spawn(io::stdin(), self.max_frame_bytes))?;
                Ok(Box::new(StreamTransport::new(Arc::clone(feed), io::stdout())))
            }
            TransportKind::File => {
                self.paths.prepare_exchange().map_err(|error| {
                    TransportError::artefact(self.paths.exchange_dir(), io::Error::other(error))
                })?;
                Ok(Box::new(FileExchangeTransport::new(
                    self.paths.request_path(),
                    self.paths.response_path(),
                    self.poll_interval,
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests;
