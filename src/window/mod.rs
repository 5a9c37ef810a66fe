//! Overlay window: sizing policy, content measurement and the host the
//! overlay runs in.

pub mod headless;
pub mod layout;
pub mod sizing;

pub use headless::HeadlessHost;
pub use sizing::WindowSizingController;

/// Window dimensions in logical pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl WindowSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Operations the overlay needs from whatever hosts its window.
///
/// Both calls are fire-and-forget: the host applies them when it can and
/// reports the resulting size back through a `HostResized` command.
pub trait WindowHost: Send + Sync + 'static {
    fn request_resize(&self, size: WindowSize);

    fn set_click_through(&self, enabled: bool);
}
