pub mod control;
pub mod pipe;

use crate::event::Update;
use tokio::sync::mpsc;

/// Display lyrics as log events instead of plain stdout lines.
pub async fn display_lyrics_log(mut rx: mpsc::Receiver<Update>) {
    let mut printer = pipe::PipePrinter::default();
    while let Some(upd) = rx.recv().await {
        for line in printer.lines_for(&upd) {
            tracing::info!(locked = upd.locked, settings_open = upd.settings_open, "{line}");
        }
    }
}
