//! MPRIS-backed player driver.
//!
//! Every call is a one-shot property read against the selected player. A poll
//! cycle selects the player once and reads metadata, status and position
//! through a single proxy. The proxy is built with property caching disabled
//! because `Position` is never announced through `PropertiesChanged` and a
//! cached value would go stale.

use crate::player::connection::{PlayerError, get_active_player_names, get_dbus_conn, is_blocked};
use crate::player::{PlaybackSample, PlaybackState, PlayerSource, PollResult, TrackIdentity};
use std::collections::HashMap;
use tokio::time::Instant;
use zbus::proxy;
use zbus::proxy::CacheProperties;
use zvariant::OwnedValue;

/// MPRIS MediaPlayer2.Player interface proxy
#[proxy(
    interface = "org.mpris.MediaPlayer2.Player",
    default_path = "/org/mpris/MediaPlayer2"
)]
trait MediaPlayer2Player {
    #[zbus(property)]
    fn metadata(&self) -> zbus::Result<HashMap<String, OwnedValue>>;

    #[zbus(property)]
    fn position(&self) -> zbus::Result<i64>;

    #[zbus(property)]
    fn playback_status(&self) -> zbus::Result<String>;
}

/// Polls a single MPRIS player, either pinned by service name or picked from
/// playerctld's list of active players.
#[derive(Debug, Clone, Default)]
pub struct MprisPlayer {
    service: Option<String>,
    block_list: Vec<String>,
}

impl MprisPlayer {
    pub fn new(service: Option<String>, block_list: Vec<String>) -> Self {
        Self {
            service: service.filter(|s| !s.is_empty()),
            block_list,
        }
    }

    async fn resolve_service(&self) -> Result<String, PlayerError> {
        if let Some(service) = &self.service {
            return Ok(service.clone());
        }
        get_active_player_names()
            .await?
            .into_iter()
            .find(|s| !is_blocked(s, &self.block_list))
            .ok_or(PlayerError::NoPlayer)
    }

    async fn proxy(&self) -> Result<MediaPlayer2PlayerProxy<'static>, PlayerError> {
        let service = self.resolve_service().await?;
        let conn = get_dbus_conn().await?;
        let proxy = MediaPlayer2PlayerProxy::builder(&conn)
            .destination(service)?
            .cache_properties(CacheProperties::No)
            .build()
            .await?;
        Ok(proxy)
    }
}

impl PlayerSource for MprisPlayer {
    async fn fetch_track_identity(&self) -> Result<TrackIdentity, PlayerError> {
        let proxy = self.proxy().await?;
        let metadata = proxy.metadata().await?;
        Ok(identity_from_metadata(&metadata))
    }

    async fn fetch_playback_sample(&self) -> Result<PlaybackSample, PlayerError> {
        let proxy = self.proxy().await?;
        read_sample(&proxy).await
    }

    async fn fetch_poll(&self) -> PollResult {
        let proxy = self.proxy().await?;
        let metadata = proxy.metadata().await?;
        let sample = read_sample(&proxy).await?;
        Ok((identity_from_metadata(&metadata), sample))
    }
}

async fn read_sample(proxy: &MediaPlayer2PlayerProxy<'_>) -> Result<PlaybackSample, PlayerError> {
    let status = proxy.playback_status().await?;
    let micros = proxy.position().await?;
    Ok(sample_from(&status, micros, Instant::now()))
}

/// Build a sample from MPRIS `PlaybackStatus` and `Position` (microseconds).
pub fn sample_from(status: &str, position_micros: i64, sampled_at: Instant) -> PlaybackSample {
    PlaybackSample {
        position: (position_micros / 1_000).max(0),
        state: PlaybackState::from_status(status),
        sampled_at,
    }
}

/// Build a track identity from an MPRIS metadata map.
///
/// The file name is taken from `xesam:url`; players that expose no URL fall
/// back to `xesam:title` so that track changes are still detected.
pub fn identity_from_metadata(map: &HashMap<String, OwnedValue>) -> TrackIdentity {
    let file_name = map
        .get("xesam:url")
        .and_then(|v| v.downcast_ref::<&str>().ok())
        .map(file_name_from_url)
        .filter(|name| !name.is_empty())
        .or_else(|| {
            map.get("xesam:title")
                .and_then(|v| v.downcast_ref::<&str>().ok())
                .map(str::to_string)
        })
        .unwrap_or_default();

    let track_number = map
        .get("xesam:trackNumber")
        .and_then(|v| {
            v.downcast_ref::<i32>()
                .ok()
                .or_else(|| v.downcast_ref::<i64>().ok().map(|n| n as i32))
                .or_else(|| v.downcast_ref::<u32>().ok().map(|n| n as i32))
        })
        .unwrap_or(0);

    TrackIdentity {
        file_name,
        track_number,
    }
}

/// Last path segment of a `file://` (or any) URL, percent-decoded.
pub fn file_name_from_url(url: &str) -> String {
    let path = url.strip_prefix("file://").unwrap_or(url);
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let last = path.rsplit('/').next().unwrap_or(path);
    urlencoding::decode(last)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| last.to_string())
}
