use crate::event::Update;
use crate::player::TrackIdentity;
use crate::state::{PLACEHOLDER_TEXT, READY_TEXT};
use tokio::sync::mpsc;

/// Decides which lines a stream of updates prints.
///
/// Only a change of the displayed text prints anything; the placeholder and
/// the ready text are never printed. A blank line separates tracks when the
/// previous track printed at least one lyric.
#[derive(Debug, Default)]
pub struct PipePrinter {
    last_track: Option<TrackIdentity>,
    last_text: Option<(String, String)>,
    track_had_lyric: bool,
}

impl PipePrinter {
    pub fn lines_for(&mut self, upd: &Update) -> Vec<String> {
        let mut out = Vec::new();

        if upd.track != self.last_track {
            if self.last_track.is_some() && self.track_had_lyric {
                out.push(String::new());
            }
            self.last_track = upd.track.clone();
            self.track_had_lyric = false;
            self.last_text = None;
        }

        let text = (upd.main_text.clone(), upd.sub_text.clone());
        if self.last_text.as_ref() == Some(&text) {
            return out;
        }
        self.last_text = Some(text);

        if upd.main_text == PLACEHOLDER_TEXT || upd.main_text == READY_TEXT {
            return out;
        }
        out.push(upd.main_text.clone());
        if !upd.sub_text.is_empty() {
            out.push(upd.sub_text.clone());
        }
        self.track_had_lyric = true;
        out
    }
}

/// Display lyrics in pipe mode (stdout only, for scripting)
pub async fn display_lyrics_pipe(mut rx: mpsc::Receiver<Update>) {
    let mut printer = PipePrinter::default();
    while let Some(upd) = rx.recv().await {
        for line in printer.lines_for(&upd) {
            println!("{line}");
        }
    }
}
