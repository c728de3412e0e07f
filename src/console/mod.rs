//! Line-oriented operator interface.
//!
//! Flows talk to a [`Console`]; [`Terminal`] is the real one over any
//! async reader/writer pair (stdin/stdout in the binary).

mod menu;
pub mod table;

pub use menu::{MenuChoice, run};

use std::io;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, Stdin, Stdout};
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};

use crate::engine::EngineError;
use crate::limits::MAX_INPUT_LINE_LEN;

#[async_trait]
pub trait Console: Send {
    /// Show `prompt` and read one line without its terminator.
    /// `Ok(None)` means the input is exhausted.
    async fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    async fn write_line(&mut self, text: &str) -> io::Result<()>;
}

pub struct Terminal<R, W> {
    lines: FramedRead<R, LinesCodec>,
    out: W,
}

impl<R: AsyncRead, W> Terminal<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            lines: FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_INPUT_LINE_LEN)),
            out: writer,
        }
    }

    pub fn into_writer(self) -> W {
        self.out
    }
}

impl Terminal<Stdin, Stdout> {
    pub fn stdio() -> Self {
        Self::new(tokio::io::stdin(), tokio::io::stdout())
    }
}

#[async_trait]
impl<R, W> Console for Terminal<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        loop {
            self.out.write_all(prompt.as_bytes()).await?;
            self.out.flush().await?;
            match self.lines.next().await {
                None => return Ok(None),
                Some(Ok(line)) => return Ok(Some(line)),
                Some(Err(LinesCodecError::Io(e))) => return Err(e),
                Some(Err(LinesCodecError::MaxLineLengthExceeded)) => {
                    self.write_line("Input line too long.").await?;
                }
            }
        }
    }

    async fn write_line(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.out.flush().await
    }
}

// ── Prompts ──────────────────────────────────────────────

/// Typed in place of a value to abandon a cancellable prompt.
pub const CANCEL: &str = "CANCEL";

/// Result of a prompt that the operator may abandon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T> {
    Selected(T),
    Cancelled,
}

pub fn is_cancel(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case(CANCEL)
}

/// Prompt until `parse` accepts the line, printing each rejection.
/// End of input yields `Cancelled`.
pub async fn prompt_until<T>(
    console: &mut dyn Console,
    prompt: &str,
    parse: impl FnMut(&str) -> Result<T, EngineError>,
) -> io::Result<Selection<T>> {
    prompt_loop(console, prompt, false, parse).await
}

/// Like [`prompt_until`], but typing [`CANCEL`] also yields `Cancelled`.
pub async fn prompt_cancellable<T>(
    console: &mut dyn Console,
    prompt: &str,
    parse: impl FnMut(&str) -> Result<T, EngineError>,
) -> io::Result<Selection<T>> {
    prompt_loop(console, prompt, true, parse).await
}

async fn prompt_loop<T>(
    console: &mut dyn Console,
    prompt: &str,
    cancellable: bool,
    mut parse: impl FnMut(&str) -> Result<T, EngineError>,
) -> io::Result<Selection<T>> {
    loop {
        let Some(line) = console.read_line(prompt).await? else {
            return Ok(Selection::Cancelled);
        };
        if cancellable && is_cancel(&line) {
            return Ok(Selection::Cancelled);
        }
        match parse(&line) {
            Ok(value) => return Ok(Selection::Selected(value)),
            Err(e) => console.write_line(&e.to_string()).await?,
        }
    }
}

/// Strict yes/no answer.
pub fn parse_yes_no(input: &str) -> Result<bool, EngineError> {
    match input.trim().to_ascii_uppercase().as_str() {
        "Y" | "YES" => Ok(true),
        "N" | "NO" => Ok(false),
        _ => Err(EngineError::ValidationFailed("enter Y or N".into())),
    }
}
