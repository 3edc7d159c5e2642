//! UCI engine client over a line protocol.

use super::backend::{BackendError, EngineClient};
use std::process::Stdio;
use strictly_chess::Position;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, Command};
use tracing::{debug, info, instrument, trace, warn};

type EngineReader = Box<dyn AsyncRead + Send + Unpin>;
type EngineWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// A UCI engine reached through a pair of byte streams.
///
/// The handshake (`uci` / `uciok`) runs once, before the first query.
pub struct UciEngine {
    lines: Lines<BufReader<EngineReader>>,
    writer: EngineWriter,
    child: Option<Child>,
    ready: bool,
    searching: bool,
}

impl std::fmt::Debug for UciEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UciEngine")
            .field("pid", &self.child.as_ref().and_then(Child::id))
            .field("ready", &self.ready)
            .field("searching", &self.searching)
            .finish()
    }
}

impl UciEngine {
    /// Talks to an engine over existing streams.
    pub fn from_streams(
        reader: impl AsyncRead + Send + Unpin + 'static,
        writer: impl AsyncWrite + Send + Unpin + 'static,
    ) -> Self {
        let reader: EngineReader = Box::new(reader);
        Self {
            lines: BufReader::new(reader).lines(),
            writer: Box::new(writer),
            child: None,
            ready: false,
            searching: false,
        }
    }

    /// Starts an engine process. It is killed when the client drops.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the command is empty or fails to start.
    #[instrument]
    pub fn spawn(command: &[String]) -> Result<Self, BackendError> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| BackendError::new("Engine command is empty"))?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| BackendError::new(format!("Failed to start '{}': {}", program, e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| BackendError::new("Engine stdin unavailable"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| BackendError::new("Engine stdout unavailable"))?;

        info!(pid = ?child.id(), "Engine started");
        let mut engine = Self::from_streams(stdout, stdin);
        engine.child = Some(child);
        Ok(engine)
    }

    async fn send(&mut self, command: &str) -> Result<(), BackendError> {
        trace!(command, "-> engine");
        self.writer.write_all(command.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn read_line(&mut self) -> Result<String, BackendError> {
        let line = self
            .lines
            .next_line()
            .await?
            .ok_or_else(|| BackendError::new("Engine closed its output"))?;
        trace!(line = %line, "<- engine");
        Ok(line)
    }

    /// Reads until a line starting with `prefix`.
    async fn read_until(&mut self, prefix: &str) -> Result<String, BackendError> {
        loop {
            let line = self.read_line().await?;
            if line.trim_start().starts_with(prefix) {
                return Ok(line);
            }
        }
    }

    #[instrument(skip(self))]
    async fn handshake(&mut self) -> Result<(), BackendError> {
        self.send("uci").await?;
        self.read_until("uciok").await?;
        self.ready = true;
        debug!("UCI handshake complete");
        Ok(())
    }

    /// Drains the reply of a search whose caller went away.
    async fn finish_abandoned_search(&mut self) -> Result<(), BackendError> {
        warn!("Discarding result of abandoned search");
        self.send("stop").await?;
        self.read_until("bestmove").await?;
        self.searching = false;
        Ok(())
    }
}

#[async_trait::async_trait]
impl EngineClient for UciEngine {
    #[instrument(skip(self, position), fields(fen = %position))]
    async fn best_move(&mut self, position: &Position, depth: u32) -> Result<String, BackendError> {
        if !self.ready {
            self.handshake().await?;
        }
        if self.searching {
            self.finish_abandoned_search().await?;
        }

        self.send(&format!("position fen {}", position)).await?;
        // Marked before sending: a cancelled flush may still deliver `go`.
        self.searching = true;
        self.send(&format!("go depth {}", depth)).await?;

        let line = self.read_until("bestmove").await?;
        self.searching = false;

        let reply = line
            .split_whitespace()
            .nth(1)
            .ok_or_else(|| BackendError::new(format!("Malformed engine reply '{}'", line)))?;
        debug!(reply, "Engine replied");
        Ok(reply.to_string())
    }
}
