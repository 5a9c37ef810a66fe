//! Window sizing policy.
//!
//! Keeps the overlay just tall enough for the current lyric content and wide
//! enough for the configured width. All methods are synchronous and take the
//! current instant explicitly; the event loop performs the returned resize
//! requests and drives the width-persistence debounce via
//! [`WindowSizingController::debounce_deadline`].

use crate::window::WindowSize;
use std::time::Duration;
use tokio::time::Instant;

/// Height per point of font size reserved for a single lyric line.
const SAFE_MULTIPLIER: f64 = 3.5;
/// Padding added on top of the font-derived floor.
const BASE_PADDING: f64 = 40.0;
/// Padding added around measured content.
const CONTENT_PADDING: u32 = 20;
/// Size differences at or below this are layout jitter and ignored.
pub const TOLERANCE: u32 = 5;
/// How long a user width change must settle before it is persisted.
pub const WIDTH_DEBOUNCE: Duration = Duration::from_millis(200);
/// Fixed size while the settings surface is open.
pub const SETTINGS_SIZE: WindowSize = WindowSize::new(400, 520);

#[derive(Debug)]
pub struct WindowSizingController {
    /// Last known on-screen size: host-reported, or the last size we asked for.
    current: WindowSize,
    /// Persisted width; `None` until configuration has loaded.
    configured_width: Option<u32>,
    font_size: u32,
    content_height: Option<u32>,
    settings_open: bool,
    pending_width: Option<(u32, Instant)>,
}

impl WindowSizingController {
    pub fn new(current: WindowSize, font_size: u32) -> Self {
        Self {
            current,
            configured_width: None,
            font_size,
            content_height: None,
            settings_open: false,
            pending_width: None,
        }
    }

    pub fn settings_open(&self) -> bool {
        self.settings_open
    }

    /// Minimum height for the current font size: `ceil(font * 3.5 + 40)`.
    pub fn standard_height(&self) -> u32 {
        (self.font_size as f64 * SAFE_MULTIPLIER + BASE_PADDING).ceil() as u32
    }

    /// Height for measured content, never below [`Self::standard_height`].
    pub fn target_height(&self, content_height: u32) -> u32 {
        content_height
            .saturating_add(CONTENT_PADDING)
            .max(self.standard_height())
    }

    /// Size the window should have right now.
    pub fn target(&self) -> WindowSize {
        let width = self.configured_width.unwrap_or(self.current.width);
        let height = match self.content_height {
            Some(content) => self.target_height(content),
            None => self.standard_height(),
        };
        WindowSize::new(width, height)
    }

    /// Apply loaded or edited configuration values.
    pub fn configure(&mut self, width: u32, font_size: u32) -> Option<WindowSize> {
        self.configured_width = Some(width);
        self.font_size = font_size;
        self.reconcile()
    }

    /// Record the rendered height of new lyric content.
    pub fn content_changed(&mut self, content_height: u32) -> Option<WindowSize> {
        self.set_content_height(content_height);
        self.reconcile()
    }

    /// Record a content height without resizing yet.
    pub fn set_content_height(&mut self, content_height: u32) {
        self.content_height = Some(content_height);
    }

    /// Resize to the target if it differs from the current size by more than
    /// [`TOLERANCE`] in either dimension. The requested size is assumed
    /// applied, so asking again for the same target is a no-op.
    pub fn reconcile(&mut self) -> Option<WindowSize> {
        if self.settings_open {
            return None;
        }
        let target = self.target();
        if exceeds_tolerance(target, self.current) {
            self.current = target;
            Some(target)
        } else {
            None
        }
    }

    /// The host reports the window now has `size` (for example while the
    /// user drags an edge).
    ///
    /// A width that departs from the configured one starts (or restarts) the
    /// persistence debounce. A height that drifts from the target is
    /// corrected while keeping the user's width.
    pub fn host_resized(&mut self, size: WindowSize, now: Instant) -> Option<WindowSize> {
        self.current = size;
        if self.settings_open {
            return None;
        }

        if let Some(width) = self.configured_width {
            let pending = self.pending_width.map(|(w, _)| w);
            if width.abs_diff(size.width) <= TOLERANCE {
                // Dragged back to where it was.
                self.pending_width = None;
            } else if pending != Some(size.width) {
                self.pending_width = Some((size.width, now + WIDTH_DEBOUNCE));
            }
        }

        let target_height = self.target().height;
        if target_height.abs_diff(size.height) > TOLERANCE {
            let corrected = WindowSize::new(size.width, target_height);
            self.current = corrected;
            Some(corrected)
        } else {
            None
        }
    }

    pub fn debounce_deadline(&self) -> Option<Instant> {
        self.pending_width.map(|(_, deadline)| deadline)
    }

    /// Take the settled width once its debounce has elapsed. The returned
    /// width becomes the configured width and should be persisted.
    pub fn take_settled_width(&mut self, now: Instant) -> Option<u32> {
        match self.pending_width {
            Some((width, deadline)) if deadline <= now => {
                self.pending_width = None;
                self.configured_width = Some(width);
                Some(width)
            }
            _ => None,
        }
    }

    /// Pin the window to the settings size. Returns the on-screen width at
    /// the moment of opening (to be captured into configuration) and the
    /// resize to request.
    pub fn open_settings(&mut self) -> (u32, WindowSize) {
        let width = self.current.width;
        self.configured_width = Some(width);
        self.pending_width = None;
        self.settings_open = true;
        self.current = SETTINGS_SIZE;
        (width, SETTINGS_SIZE)
    }

    /// Leave the settings surface and resume content-driven sizing.
    pub fn close_settings(&mut self) -> Option<WindowSize> {
        self.settings_open = false;
        self.reconcile()
    }
}

fn exceeds_tolerance(a: WindowSize, b: WindowSize) -> bool {
    a.width.abs_diff(b.width) > TOLERANCE || a.height.abs_diff(b.height) > TOLERANCE
}
