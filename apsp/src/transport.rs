//! Point-to-point links between the coordinator and one worker.
//!
//! Both ends are blocking from the caller's point of view: `send` returns once
//! the message is handed to the link, `recv` waits until the next message
//! arrives. A closed link surfaces as [`Error::ChannelClosed`] naming the peer.

use std::marker::PhantomData;

use async_trait::async_trait;
use prost::Message;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, DuplexStream};
use tokio::sync::mpsc;

use apsp_types::wire::Frame;

use crate::partition::WorkerId;
use crate::protocol::{CoordinatorMessage, WireMessage, WorkerMessage};
use crate::{Error, Result};

/// Messages buffered per direction on an in-process link.
const CHANNEL_CAPACITY: usize = 4;

/// Upper bound on a single encoded frame.
pub const MAX_FRAME_BYTES: usize = 1 << 30;

/// Capacity of the in-memory pipe behind [`stream_pair`].
const DUPLEX_BUFFER: usize = 64 * 1024;

#[async_trait]
pub trait Transport<Out, In>: Send
where
    Out: Send + 'static,
    In: Send + 'static,
{
    /// Participant at the other end of the link.
    fn peer(&self) -> WorkerId;

    async fn send(&mut self, message: Out) -> Result<()>;

    async fn recv(&mut self) -> Result<In>;
}

/// Coordinator's end of a link to one worker.
pub trait CoordinatorLink: Transport<CoordinatorMessage, WorkerMessage> {}

impl<T: Transport<CoordinatorMessage, WorkerMessage>> CoordinatorLink for T {}

/// Worker's end of its link to the coordinator.
pub trait WorkerLink: Transport<WorkerMessage, CoordinatorMessage> {}

impl<T: Transport<WorkerMessage, CoordinatorMessage>> WorkerLink for T {}

/// In-process link over a pair of tokio channels. Messages move by value.
pub struct ChannelTransport<Out, In> {
    peer: WorkerId,
    tx: mpsc::Sender<Out>,
    rx: mpsc::Receiver<In>,
}

/// Connects the coordinator to `worker` over in-process channels.
///
/// Returns `(coordinator end, worker end)`.
pub fn channel_pair(
    worker: WorkerId,
) -> (
    ChannelTransport<CoordinatorMessage, WorkerMessage>,
    ChannelTransport<WorkerMessage, CoordinatorMessage>,
) {
    let (to_worker, from_coordinator) = mpsc::channel(CHANNEL_CAPACITY);
    let (to_coordinator, from_worker) = mpsc::channel(CHANNEL_CAPACITY);
    (
        ChannelTransport {
            peer: worker,
            tx: to_worker,
            rx: from_worker,
        },
        ChannelTransport {
            peer: WorkerId::COORDINATOR,
            tx: to_coordinator,
            rx: from_coordinator,
        },
    )
}

#[async_trait]
impl<Out, In> Transport<Out, In> for ChannelTransport<Out, In>
where
    Out: Send + 'static,
    In: Send + 'static,
{
    fn peer(&self) -> WorkerId {
        self.peer
    }

    async fn send(&mut self, message: Out) -> Result<()> {
        self.tx
            .send(message)
            .await
            .map_err(|_| Error::ChannelClosed(self.peer))
    }

    async fn recv(&mut self) -> Result<In> {
        self.rx.recv().await.ok_or(Error::ChannelClosed(self.peer))
    }
}

/// Link over a byte stream.
///
/// Each message is a [`Frame`] encoded with prost and prefixed by its length as
/// a little-endian `u32`.
pub struct StreamTransport<S, Out, In> {
    peer: WorkerId,
    stream: S,
    max_frame: usize,
    _messages: PhantomData<fn(Out) -> In>,
}

impl<S, Out, In> StreamTransport<S, Out, In> {
    pub fn new(peer: WorkerId, stream: S) -> Self {
        Self {
            peer,
            stream,
            max_frame: MAX_FRAME_BYTES,
            _messages: PhantomData,
        }
    }

    pub fn with_max_frame(mut self, max_frame: usize) -> Self {
        self.max_frame = max_frame;
        self
    }
}

/// Connects the coordinator to `worker` through an in-memory byte pipe, so
/// every message goes through the wire encoding.
///
/// Returns `(coordinator end, worker end)`.
pub fn stream_pair(
    worker: WorkerId,
) -> (
    StreamTransport<DuplexStream, CoordinatorMessage, WorkerMessage>,
    StreamTransport<DuplexStream, WorkerMessage, CoordinatorMessage>,
) {
    let (coordinator_side, worker_side) = tokio::io::duplex(DUPLEX_BUFFER);
    (
        StreamTransport::new(worker, coordinator_side),
        StreamTransport::new(WorkerId::COORDINATOR, worker_side),
    )
}

#[async_trait]
impl<S, Out, In> Transport<Out, In> for StreamTransport<S, Out, In>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
    Out: WireMessage,
    In: WireMessage,
{
    fn peer(&self) -> WorkerId {
        self.peer
    }

    async fn send(&mut self, message: Out) -> Result<()> {
        let bytes = message.into_frame()?.encode_to_vec();
        if bytes.len() > self.max_frame {
            return Err(Error::FrameTooLarge(bytes.len()));
        }
        let len = u32::try_from(bytes.len()).map_err(|_| Error::FrameTooLarge(bytes.len()))?;

        self.stream
            .write_u32_le(len)
            .await
            .map_err(|e| closed_or_io(e, self.peer))?;
        self.stream
            .write_all(&bytes)
            .await
            .map_err(|e| closed_or_io(e, self.peer))?;
        self.stream
            .flush()
            .await
            .map_err(|e| closed_or_io(e, self.peer))?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<In> {
        let len = self
            .stream
            .read_u32_le()
            .await
            .map_err(|e| closed_or_io(e, self.peer))? as usize;
        if len > self.max_frame {
            return Err(Error::FrameTooLarge(len));
        }

        let mut buf = vec![0u8; len];
        self.stream
            .read_exact(&mut buf)
            .await
            .map_err(|e| closed_or_io(e, self.peer))?;

        let frame = Frame::decode(buf.as_slice())?;
        In::from_frame(frame, self.peer)
    }
}

fn closed_or_io(err: std::io::Error, peer: WorkerId) -> Error {
    match err.kind() {
        std::io::ErrorKind::UnexpectedEof | std::io::ErrorKind::BrokenPipe => {
            Error::ChannelClosed(peer)
        }
        _ => Error::Io(err),
    }
}
