//! Line-oriented control surface on stdin.
//!
//! Stands in for the overlay's buttons and settings dialog: each line is one
//! command, for example `lock`, `resize 900 208` or `set fontSize 40`.

use crate::config::SettingsEdit;
use crate::event::Command;
use crate::window::WindowSize;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

#[derive(Error, Debug, PartialEq)]
pub enum ControlError {
    #[error("unknown command: {0:?}")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("unknown settings field: {0:?}")]
    UnknownField(String),
}

/// Parse one control line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, ControlError> {
    let mut words = line.split_whitespace();
    let Some(word) = words.next() else {
        return Ok(None);
    };

    let cmd = match word.to_ascii_lowercase().as_str() {
        "lock" => Command::Lock,
        "unlock" => Command::Unlock,
        "settings" | "open" => Command::OpenSettings,
        "close" => Command::CloseSettings,
        "quit" | "exit" => Command::Shutdown,
        "resize" => {
            let mut dim = || words.next().and_then(|w| w.parse::<u32>().ok());
            match (dim(), dim()) {
                (Some(width), Some(height)) => Command::HostResized(WindowSize::new(width, height)),
                _ => return Err(ControlError::Usage("resize <width> <height>")),
            }
        }
        "set" => {
            let (Some(field), Some(value)) = (words.next(), words.next()) else {
                return Err(ControlError::Usage("set <field> <value>"));
            };
            let edit = SettingsEdit::parse(field, value)
                .ok_or_else(|| ControlError::UnknownField(field.to_string()))?;
            Command::Edit(edit)
        }
        other => return Err(ControlError::Unknown(other.to_string())),
    };
    Ok(Some(cmd))
}

/// Forward commands read from `input` until it ends, a `quit` is read or the
/// overlay stops listening. End of input only stops reading; the overlay
/// keeps running.
pub async fn read_commands<R>(input: R, tx: mpsc::Sender<Command>)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read control input");
                break;
            }
        };
        match parse_command(&line) {
            Ok(Some(cmd)) => {
                let quit = cmd == Command::Shutdown;
                if tx.send(cmd).await.is_err() || quit {
                    return;
                }
            }
            Ok(None) => {}
            Err(e) => eprintln!("{e}"),
        }
    }
    tracing::debug!("Control input closed");
}

/// Shut the overlay down on Ctrl-C.
pub async fn shutdown_on_ctrl_c(tx: mpsc::Sender<Command>) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Interrupted, shutting down");
            let _ = tx.send(Command::Shutdown).await;
        }
        Err(e) => tracing::warn!(error = %e, "Failed to listen for Ctrl-C"),
    }
}
