//! Protocol session
//!
//! The orchestrating state machine. A session owns the transport for its
//! whole `Open` lifetime and runs one spawned task that multiplexes every
//! event source: received lines, the poll timer, the settle-delay timer and
//! public operations. All of them dispatch on that single task, so session
//! state, the pending command sequence and the device status need no locks,
//! and a line received between arming and firing of the settle timer is
//! fully processed before the timer fires.

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::io::{split, AsyncRead, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::codec::{FramedRead, LinesCodec};

use super::sentence::{self, DeviceStatus, SentenceType};
use super::{commands, CommandSequencer, ProtocolError, StatusPoller};
use crate::config::BridgeConfig;
use crate::delta::{self, StatusSink, StatusUpdate};

/// Longest line the framer will buffer before discarding
const MAX_LINE_LENGTH: usize = 1024;

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No transport attached
    Closed,
    /// Transport being opened
    Opening,
    /// Transport open; poller running, lines routed to the sink
    Open,
    /// Shutting down: timers cancelled, transport being released
    Closing,
}

enum SessionCommand {
    EnableSilentMode(oneshot::Sender<Result<(), ProtocolError>>),
    DisableSilentMode(oneshot::Sender<Result<(), ProtocolError>>),
    Close(oneshot::Sender<()>),
}

/// Handle to a running protocol session.
///
/// Constructed per open call; there is no shared global connection state, so
/// independent sessions (and tests) can coexist.
pub struct ProtocolSession {
    cmd_tx: mpsc::Sender<SessionCommand>,
    state_rx: watch::Receiver<SessionState>,
}

impl ProtocolSession {
    /// Validate the configuration, self-check the command constants, open
    /// the serial port and start the session task.
    ///
    /// Configuration problems fail synchronously with
    /// [`ProtocolError::Config`] and no session is created.
    pub fn open(config: &BridgeConfig, sink: StatusSink) -> Result<Self, ProtocolError> {
        config.validate()?;
        commands::self_check()?;
        let port = super::serial::open_port(&config.serial_port, config.baud_rate)?;
        Ok(Self::open_with_io(port, sink))
    }

    /// Start a session over an already-open byte-stream transport.
    ///
    /// Used directly by tests with an in-memory duplex pipe; [`Self::open`]
    /// funnels through here after opening the serial port.
    pub fn open_with_io<T>(io: T, sink: StatusSink) -> Self
    where
        T: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (state_tx, state_rx) = watch::channel(SessionState::Opening);

        let (reader, writer) = split(io);
        let task = SessionTask {
            lines: FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_LINE_LENGTH)),
            writer,
            sink,
            cmd_rx,
            state_tx,
            poller: StatusPoller::default(),
            sequencer: CommandSequencer::default(),
            close_ack: None,
        };
        tokio::spawn(task.run());

        Self { cmd_tx, state_rx }
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        *self.state_rx.borrow()
    }

    /// Send the authorization sentence and, after the settle delay, the
    /// silent-mode enable command
    pub async fn enable_silent_mode(&self) -> Result<(), ProtocolError> {
        self.request(SessionCommand::EnableSilentMode).await
    }

    /// Send the authorization sentence and, after the settle delay, the
    /// silent-mode disable command
    pub async fn disable_silent_mode(&self) -> Result<(), ProtocolError> {
        self.request(SessionCommand::DisableSilentMode).await
    }

    /// Close the session: stop the poller, cancel any pending settle timer
    /// and release the transport. Resolves once the state is `Closed`;
    /// idempotent.
    pub async fn close(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.cmd_tx.send(SessionCommand::Close(ack_tx)).await.is_ok() {
            let _ = ack_rx.await;
        }
    }

    /// Resolve once the session has reached `Closed`, whether through
    /// [`Self::close`] or because the transport went away
    pub async fn wait_closed(&mut self) {
        while *self.state_rx.borrow_and_update() != SessionState::Closed {
            if self.state_rx.changed().await.is_err() {
                break;
            }
        }
    }

    async fn request(
        &self,
        make: impl FnOnce(oneshot::Sender<Result<(), ProtocolError>>) -> SessionCommand,
    ) -> Result<(), ProtocolError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.cmd_tx
            .send(make(reply_tx))
            .await
            .map_err(|_| ProtocolError::SessionNotOpen)?;
        reply_rx.await.map_err(|_| ProtocolError::SessionNotOpen)?
    }
}

struct SessionTask<T> {
    lines: FramedRead<ReadHalf<T>, LinesCodec>,
    writer: WriteHalf<T>,
    sink: StatusSink,
    cmd_rx: mpsc::Receiver<SessionCommand>,
    state_tx: watch::Sender<SessionState>,
    poller: StatusPoller,
    sequencer: CommandSequencer,
    close_ack: Option<oneshot::Sender<()>>,
}

impl<T: AsyncRead + AsyncWrite + Send + 'static> SessionTask<T> {
    async fn run(mut self) {
        // The transport handed to us is already open; start routing.
        self.poller.start();
        self.state_tx.send_replace(SessionState::Open);
        tracing::debug!("session open");

        loop {
            tokio::select! {
                poll = self.poller.due() => {
                    let _ = self.write_line(poll).await;
                }
                _ = self.sequencer.settle_elapsed() => {
                    if let Some(privileged) = self.sequencer.take_pending() {
                        let _ = self.write_line(privileged).await;
                    }
                }
                line = self.lines.next() => match line {
                    Some(Ok(line)) => self.handle_line(&line).await,
                    Some(Err(e)) => {
                        // Read errors are surfaced but not fatal; only an
                        // explicit close or transport close ends the session.
                        tracing::error!("transport read error: {e}");
                    }
                    None => {
                        tracing::debug!("transport closed");
                        break;
                    }
                },
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(cmd) => {
                        if self.handle_command(cmd).await {
                            break;
                        }
                    }
                    None => break,
                },
            }
        }

        self.shutdown().await;
    }

    /// Returns true when the session should close
    async fn handle_command(&mut self, cmd: SessionCommand) -> bool {
        match cmd {
            SessionCommand::EnableSilentMode(reply) => {
                let _ = reply.send(self.send_authorized(commands::SILENT_MODE_ON).await);
                false
            }
            SessionCommand::DisableSilentMode(reply) => {
                let _ = reply.send(self.send_authorized(commands::SILENT_MODE_OFF).await);
                false
            }
            SessionCommand::Close(ack) => {
                self.close_ack = Some(ack);
                true
            }
        }
    }

    /// Send the authorization immediately and arm the settle timer for the
    /// privileged command. A write failure abandons the deferred send; the
    /// caller must re-invoke the operation.
    async fn send_authorized(&mut self, privileged: &'static str) -> Result<(), ProtocolError> {
        let auth = self.sequencer.begin(privileged);
        if let Err(e) = self.write_line(auth).await {
            self.sequencer.cancel();
            return Err(e);
        }
        Ok(())
    }

    async fn write_line(&mut self, line: &str) -> Result<(), ProtocolError> {
        tracing::debug!(%line, "sending sentence");
        let framed = format!("{line}\r\n");
        if let Err(e) = self.writer.write_all(framed.as_bytes()).await {
            tracing::error!("transport write error: {e}");
            let err = match e.kind() {
                std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::NotConnected => {
                    ProtocolError::TransportNotOpen
                }
                _ => ProtocolError::Transport(e.to_string()),
            };
            return Err(err);
        }
        Ok(())
    }

    async fn handle_line(&mut self, line: &str) {
        tracing::trace!(%line, "received line");
        let status_sentence = match sentence::decode(line) {
            Ok(s) => s,
            Err(e) => {
                // Arbitrary traffic on the line is expected; drop it.
                tracing::trace!("ignoring undecodable line: {e}");
                return;
            }
        };

        match status_sentence.sentence_type {
            SentenceType::LedStatus => {
                // A missing or malformed status byte degrades to all-false,
                // never to a session failure.
                let status = status_sentence
                    .status_byte
                    .map(DeviceStatus::from_byte)
                    .unwrap_or_default();
                tracing::debug!(?status, "device status");
                self.emit(delta::PATH_SILENT_MODE, status.silent_mode).await;
                self.emit(delta::PATH_ERROR, status.error).await;
            }
            SentenceType::Unrecognized => {}
        }
    }

    async fn emit(&mut self, path: &'static str, value: bool) {
        if self.sink.send(StatusUpdate::new(path, value)).await.is_err() {
            tracing::warn!("status sink dropped, discarding update");
        }
    }

    async fn shutdown(&mut self) {
        self.state_tx.send_replace(SessionState::Closing);

        // Cancel every outstanding timer before releasing the transport so a
        // late-firing timer cannot write to a closed transport.
        self.poller.stop();
        self.sequencer.cancel();

        if let Err(e) = self.writer.shutdown().await {
            tracing::debug!("transport shutdown: {e}");
        }

        self.state_tx.send_replace(SessionState::Closed);
        tracing::debug!("session closed");

        if let Some(ack) = self.close_ack.take() {
            let _ = ack.send(());
        }
    }
}
