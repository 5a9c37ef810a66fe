//! Window host without a real window.
//!
//! Resize requests are logged and reported straight back as applied, which
//! keeps the sizing loop closed when the overlay runs in a terminal.

use crate::event::Command;
use crate::window::{WindowHost, WindowSize};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;

pub struct HeadlessHost {
    commands: mpsc::Sender<Command>,
    click_through: AtomicBool,
}

impl HeadlessHost {
    pub fn new(commands: mpsc::Sender<Command>) -> Self {
        Self {
            commands,
            click_through: AtomicBool::new(false),
        }
    }
}

impl WindowHost for HeadlessHost {
    fn request_resize(&self, size: WindowSize) {
        tracing::debug!(width = size.width, height = size.height, "Window resize requested");
        if self.commands.try_send(Command::HostResized(size)).is_err() {
            tracing::debug!("Command channel full or closed, resize not echoed");
        }
    }

    fn set_click_through(&self, enabled: bool) {
        if self.click_through.swap(enabled, Ordering::Relaxed) != enabled {
            tracing::info!(enabled, "Click-through changed");
        }
    }
}
