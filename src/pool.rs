// pool.rs: Central event loop tying polling, estimation, lookup and sizing together

use crate::config::{AppConfig, ConfigStore};
use crate::event::{Command, Event, Update};
use crate::lyrics::{LyricIndex, LyricSource, Lookup};
use crate::player::{PlayerSource, TrackIdentity};
use crate::poller::{POLL_INTERVAL, PlaybackPoller, PollTransition};
use crate::state::{Display, OverlayState};
use crate::throttle::UpdateThrottler;
use crate::timer::{PositionEstimator, frame_ticker};
use crate::window::layout::measure_content_height;
use crate::window::{WindowHost, WindowSize, WindowSizingController};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

/// Size the window is assumed to have before the host reports anything.
pub const INITIAL_SIZE: WindowSize = WindowSize::new(800, 120);

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub poll_interval: Duration,
    pub initial_size: WindowSize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
            initial_size: INITIAL_SIZE,
        }
    }
}

/// Owns all overlay state and runs the control loop on a single task.
///
/// Collaborators are only ever called from spawned tasks that report back
/// through the internal event channel, so a slow player, lyric source or
/// config store never stalls frame ticks or host commands.
pub struct Overlay<P, L, W, C> {
    settings: EngineSettings,
    poller: PlaybackPoller<P>,
    lyrics: Arc<L>,
    host: Arc<W>,
    store: Arc<C>,
    updates: mpsc::Sender<Update>,
    events_tx: mpsc::Sender<Event>,
    events_rx: mpsc::Receiver<Event>,
    index: LyricIndex,
    /// Track the current index belongs to; `None` until a track is seen.
    index_track: Option<TrackIdentity>,
    estimator: PositionEstimator,
    throttler: UpdateThrottler,
    last_submitted: Option<i64>,
    sizing: WindowSizingController,
    config: AppConfig,
    state: OverlayState,
}

impl<P, L, W, C> Overlay<P, L, W, C>
where
    P: PlayerSource,
    L: LyricSource,
    W: WindowHost,
    C: ConfigStore,
{
    pub fn new(
        player: Arc<P>,
        lyrics: Arc<L>,
        host: Arc<W>,
        store: Arc<C>,
        updates: mpsc::Sender<Update>,
        settings: EngineSettings,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::channel(16);
        let config = AppConfig::default();
        let sizing = WindowSizingController::new(settings.initial_size, config.font_size);
        Self {
            settings,
            poller: PlaybackPoller::new(player),
            lyrics,
            host,
            store,
            updates,
            events_tx,
            events_rx,
            index: LyricIndex::empty(),
            index_track: None,
            estimator: PositionEstimator::new(),
            throttler: UpdateThrottler::default(),
            last_submitted: None,
            sizing,
            config,
            state: OverlayState::new(),
        }
    }

    /// Run until a `Shutdown` command arrives or the command channel closes.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        self.spawn_config_load();
        self.publish().await;

        let mut poll = tokio::time::interval(self.settings.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut frames = frame_ticker();

        loop {
            tokio::select! {
                biased;
                cmd = commands.recv() => match cmd {
                    Some(Command::Shutdown) | None => break,
                    Some(cmd) => self.handle_command(cmd).await,
                },
                Some(event) = self.events_rx.recv() => self.handle_event(event).await,
                _ = sleep_until_opt(self.throttler.deadline()) => self.on_throttle_expired().await,
                _ = sleep_until_opt(self.sizing.debounce_deadline()) => self.on_width_settled(),
                _ = poll.tick() => {
                    self.poller.start_poll(&self.events_tx);
                }
                _ = frames.tick() => self.on_frame().await,
            }
        }
        tracing::debug!("Overlay loop stopped");
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::HostResized(size) => {
                if !self.sizing.settings_open() {
                    // Content rewraps at the dragged width.
                    let height = self.measure(size.width);
                    self.sizing.set_content_height(height);
                }
                if let Some(corrected) = self.sizing.host_resized(size, Instant::now()) {
                    self.host.request_resize(corrected);
                }
            }
            Command::Lock => self.set_locked(true).await,
            Command::Unlock => self.set_locked(false).await,
            Command::OpenSettings => self.open_settings().await,
            Command::CloseSettings => self.close_settings().await,
            Command::Edit(edit) => match self.config.apply_edit(&edit) {
                Ok(()) => {
                    tracing::debug!(?edit, "Settings edit applied");
                    if !self.sizing.settings_open() {
                        self.apply_config_to_window();
                        self.spawn_config_save();
                    }
                }
                Err(e) => tracing::debug!(error = %e, "Settings edit rejected"),
            },
            Command::Shutdown => {}
        }
    }

    async fn handle_event(&mut self, event: Event) {
        match event {
            Event::Poll(result) => {
                if let Some(transition) = self.poller.observe(result, self.state.locked) {
                    self.apply_transition(transition).await;
                }
            }
            Event::Lyrics { track, result } => {
                if self.index_track.as_ref() != Some(&track) {
                    tracing::debug!(file = %track.file_name, "Discarding lyrics for a track no longer playing");
                    return;
                }
                let lines = result.unwrap_or_else(|e| {
                    tracing::warn!(file = %track.file_name, error = %e, "Failed to load lyrics");
                    Vec::new()
                });
                self.index = LyricIndex::new(lines);
                if self.index.is_empty() {
                    tracing::info!(file = %track.file_name, "No lyrics for track");
                } else {
                    tracing::info!(file = %track.file_name, lines = self.index.len(), "Lyrics loaded");
                }
                self.throttler.reset();
                self.last_submitted = None;
            }
            Event::ConfigLoaded(config) => {
                self.config = config.unwrap_or_default();
                tracing::debug!(config = ?self.config, "Configuration loaded");
                self.apply_config_to_window();
            }
        }
    }

    async fn apply_transition(&mut self, t: PollTransition) {
        if t.track_changed {
            tracing::info!(file = %t.track.file_name, track_number = t.track.track_number, "Track changed");
            self.index = LyricIndex::empty();
            self.index_track = Some(t.track.clone());
            self.estimator.reset(Instant::now());
            self.throttler.reset();
            self.last_submitted = None;
            self.state.set_track(t.track.clone());
            self.spawn_lyrics_load(t.track);
            if !self.show(Display::placeholder()).await {
                self.publish().await;
            }
        }
        self.estimator.apply(&t.sample);
        if t.unlock {
            tracing::info!("Playback left playing while locked, unlocking");
            self.set_locked(false).await;
        }
    }

    async fn on_frame(&mut self) {
        if self.index_track.is_none() {
            return;
        }
        let now = Instant::now();
        let position = self.estimator.estimate_at(now);
        if self.last_submitted == Some(position) {
            return;
        }
        self.last_submitted = Some(position);
        if let Some(position) = self.throttler.submit(position, now) {
            self.look_up(position).await;
        }
    }

    async fn on_throttle_expired(&mut self) {
        if let Some(position) = self.throttler.expire(Instant::now()) {
            self.look_up(position).await;
        }
    }

    fn on_width_settled(&mut self) {
        if let Some(width) = self.sizing.take_settled_width(Instant::now()) {
            tracing::info!(width, "Window width settled, saving");
            self.config.window_width = width;
            self.apply_config_to_window();
            self.spawn_config_save();
        }
    }

    async fn look_up(&mut self, position: i64) {
        let display = match self.index.lookup(position) {
            Lookup::Active { index, line } => {
                tracing::trace!(index, position, "Active line");
                Display::from_line(line)
            }
            Lookup::Unresolved => Display::placeholder(),
        };
        self.show(display).await;
    }

    /// Render `display`, resizing to fit. Returns false if it was already
    /// shown.
    async fn show(&mut self, display: Display) -> bool {
        if !self.state.set_display(display) {
            return false;
        }
        let height = self.measure(self.sizing.target().width);
        if let Some(size) = self.sizing.content_changed(height) {
            self.host.request_resize(size);
        }
        self.publish().await;
        true
    }

    fn measure(&self, width: u32) -> u32 {
        let display = &self.state.display;
        measure_content_height(&display.main_text, &display.sub_text, self.config.font_size, width)
    }

    /// Push width and font size from the configuration into the sizing
    /// policy, resizing if needed.
    fn apply_config_to_window(&mut self) {
        let height = self.measure(self.config.window_width);
        self.sizing.set_content_height(height);
        if let Some(size) = self.sizing.configure(self.config.window_width, self.config.font_size) {
            self.host.request_resize(size);
        }
    }

    async fn set_locked(&mut self, locked: bool) {
        if self.state.set_locked(locked) {
            tracing::info!(locked, "Lock state changed");
            self.host.set_click_through(locked);
            self.publish().await;
        }
    }

    async fn open_settings(&mut self) {
        if self.sizing.settings_open() {
            return;
        }
        let (width, size) = self.sizing.open_settings();
        self.config.window_width = width;
        self.host.request_resize(size);
        self.state.set_settings_open(true);
        self.publish().await;
    }

    async fn close_settings(&mut self) {
        if !self.sizing.settings_open() {
            return;
        }
        // Configure while still pinned so leaving settings resizes once.
        self.sizing.configure(self.config.window_width, self.config.font_size);
        let height = self.measure(self.config.window_width);
        self.sizing.set_content_height(height);
        if let Some(size) = self.sizing.close_settings() {
            self.host.request_resize(size);
        }
        self.spawn_config_save();
        self.state.set_settings_open(false);
        self.publish().await;
    }

    async fn publish(&self) {
        let _ = self.updates.send(self.state.snapshot()).await;
    }

    fn spawn_lyrics_load(&self, track: TrackIdentity) {
        let lyrics = Arc::clone(&self.lyrics);
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let result = lyrics.fetch_lyric_lines(&track.file_name).await;
            let _ = events.send(Event::Lyrics { track, result }).await;
        });
    }

    fn spawn_config_load(&self) {
        let store = Arc::clone(&self.store);
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let config = store.load().await;
            let _ = events.send(Event::ConfigLoaded(config)).await;
        });
    }

    fn spawn_config_save(&self) {
        let store = Arc::clone(&self.store);
        let config = self.config.clone();
        tokio::spawn(async move {
            if let Err(e) = store.save(&config).await {
                tracing::warn!(error = %e, "Failed to save config");
            }
        });
    }
}

/// Sleep until `deadline`, or forever when there is none.
async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
