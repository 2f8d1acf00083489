//! Line-delimited JSON-RPC over a byte stream (stdin/stdout by default).

use std::io::{self, BufReader, Read, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::frames::{FrameRead, read_frame};
use super::{TRANSPORT_TARGET, Transport, TransportError, TransportExit};
use crate::codec::{CodecError, RequestId, RpcResponse};
use crate::dispatch::Dispatcher;
use crate::supervisor::ShutdownFlag;

/// How long the serve loop waits for a frame before re-checking the
/// shutdown flag.
const FRAME_WAIT: Duration = Duration::from_millis(50);

/// Frames buffered between the reader thread and the serve loop.
const FRAME_QUEUE_DEPTH: usize = 16;

#[derive(Debug)]
enum ReaderEvent {
    Frame(Vec<u8>),
    Oversized(usize),
    Failed(io::Error),
}

/// Frames read from the inbound channel by a single background thread.
///
/// One feed outlives every [`StreamTransport`] built on it, so frames the
/// reader has already buffered survive a transport restart.
#[derive(Debug)]
pub struct FrameFeed {
    events: Mutex<Receiver<ReaderEvent>>,
    max_frame_bytes: usize,
}

impl FrameFeed {
    /// Starts the reader thread over `reader`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ReaderThread`] if the thread cannot be
    /// spawned.
    pub fn spawn<R>(reader: R, max_frame_bytes: usize) -> Result<Arc<Self>, TransportError>
    where
        R: Read + Send + 'static,
    {
        let (sender, receiver) = mpsc::sync_channel(FRAME_QUEUE_DEPTH);
        thread::Builder::new()
            .name(String::from("frame-reader"))
            .spawn(move || pump_frames(BufReader::new(reader), max_frame_bytes, &sender))
            .map_err(|source| TransportError::ReaderThread {
                source: source.into(),
            })?;
        Ok(Arc::new(Self {
            events: Mutex::new(receiver),
            max_frame_bytes,
        }))
    }

    /// Largest frame the reader accepts, in bytes.
    #[must_use]
    pub const fn max_frame_bytes(&self) -> usize {
        self.max_frame_bytes
    }
}

/// Stream binding: one JSON object per line in, one per line out.
///
/// Frames arrive through a shared [`FrameFeed`] so that the serve loop can
/// observe the shutdown flag while the channel is idle.
pub struct StreamTransport<W> {
    feed: Arc<FrameFeed>,
    writer: W,
}

impl<W> StreamTransport<W>
where
    W: Write + Send,
{
    /// Creates a transport answering frames from `feed` on `writer`.
    #[must_use]
    pub const fn new(feed: Arc<FrameFeed>, writer: W) -> Self {
        Self { feed, writer }
    }

    /// Consumes the transport and returns the writer, for inspection.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn write_response(&mut self, response: &RpcResponse) -> Result<(), TransportError> {
        let mut frame = response.encode()?;
        frame.push(b'\n');
        self.writer
            .write_all(&frame)
            .map_err(TransportError::write)?;
        self.writer.flush().map_err(TransportError::write)
    }

    fn handle_event(
        &mut self,
        event: ReaderEvent,
        dispatcher: &Dispatcher,
    ) -> Result<(), TransportError> {
        match event {
            ReaderEvent::Frame(frame) => {
                if let Some(response) = dispatcher.handle_frame(&frame) {
                    self.write_response(&response)?;
                }
                Ok(())
            }
            ReaderEvent::Oversized(size) => {
                let limit = self.feed.max_frame_bytes();
                warn!(target: TRANSPORT_TARGET, size, limit, "dropped oversized frame");
                let error = CodecError::invalid_request(
                    format!("frame of {size} bytes exceeds the {limit} byte limit"),
                    Some(RequestId::null()),
                );
                self.write_response(&RpcResponse::from_codec_error(&error))
            }
            ReaderEvent::Failed(error) => Err(TransportError::read(error)),
        }
    }
}

impl<W> Transport for StreamTransport<W>
where
    W: Write + Send,
{
    fn name(&self) -> &'static str {
        "stream"
    }

    fn serve(
        &mut self,
        dispatcher: &Dispatcher,
        shutdown: &ShutdownFlag,
    ) -> Result<TransportExit, TransportError> {
        let feed = Arc::clone(&self.feed);
        let frames = feed.events.lock().unwrap_or_else(PoisonError::into_inner);
        info!(target: TRANSPORT_TARGET, "stream transport serving");
        loop {
            if shutdown.is_raised() {
                return Ok(TransportExit::Shutdown);
            }
            match frames.recv_timeout(FRAME_WAIT) {
                Ok(event) => self.handle_event(event, dispatcher)?,
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    info!(target: TRANSPORT_TARGET, "inbound channel closed");
                    return Ok(TransportExit::ChannelClosed);
                }
            }
        }
    }
}

fn pump_frames<R: Read>(
    mut reader: BufReader<R>,
    max_frame_bytes: usize,
    sender: &SyncSender<ReaderEvent>,
) {
    loop {
        let event = match read_frame(&mut reader, max_frame_bytes) {
            Ok(FrameRead::Frame(frame)) => ReaderEvent::Frame(frame),
            Ok(FrameRead::Oversized { size }) => ReaderEvent::Oversized(size),
            Ok(FrameRead::Eof) => return,
            Err(error) => {
                if sender.send(ReaderEvent::Failed(error)).is_err() {
                    debug!(target: TRANSPORT_TARGET, "serve loop gone before read error");
                }
                return;
            }
        };
        if sender.send(event).is_err() {
            debug!(target: TRANSPORT_TARGET, "serve loop gone; frame reader stopping");
            return;
        }
    }
}
