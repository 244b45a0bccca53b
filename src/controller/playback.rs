//! Player: one playback session plus the clock that drives it
//!
//! The clock is a tokio task started on entry to `Playing` and aborted on any
//! exit from it. Each clock carries an id; a tick from a clock that is no
//! longer the current one is dropped, so a late wakeup can never advance a
//! paused, replaced or closed session.

use std::sync::{Arc, Weak};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};

use crate::error::Result;
use crate::model::{PlaybackInfo, PlaybackSession, RepeatState, TickOutcome, Track};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

struct Clock {
    id: u64,
    handle: JoinHandle<()>,
}

struct PlayerInner {
    session: PlaybackSession,
    clock: Option<Clock>,
    next_clock_id: u64,
}

impl PlayerInner {
    fn stop_clock(&mut self) {
        if let Some(clock) = self.clock.take() {
            clock.handle.abort();
            tracing::trace!(clock_id = clock.id, "Clock stopped");
        }
    }
}

pub struct Player {
    inner: Arc<Mutex<PlayerInner>>,
    tick_interval: Duration,
}

impl Player {
    pub fn new(volume: u8, tick_interval: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(PlayerInner {
                session: PlaybackSession::with_volume(volume),
                clock: None,
                next_clock_id: 0,
            })),
            tick_interval,
        }
    }

    /// Replace whatever is loaded with `track`, paused at 0:00
    pub async fn select(&self, track: &Arc<Track>) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.stop_clock();
        inner.session.close();
        inner.session.open(track)?;
        tracing::info!(track_id = %track.id, title = %track.title, "Track selected");
        Ok(())
    }

    pub async fn play(&self) -> bool {
        let mut inner = self.inner.lock().await;
        if !inner.session.play() {
            return false;
        }
        self.start_clock(&mut inner);
        tracing::debug!(position = inner.session.position_seconds(), "Playback started");
        true
    }

    pub async fn pause(&self) -> bool {
        let mut inner = self.inner.lock().await;
        if !inner.session.pause() {
            return false;
        }
        inner.stop_clock();
        tracing::debug!(position = inner.session.position_seconds(), "Playback paused");
        true
    }

    /// Pause when playing, play otherwise. Returns whether the state changed.
    pub async fn toggle_playback(&self) -> bool {
        let mut inner = self.inner.lock().await;
        let was_playing = inner.session.is_playing();
        tracing::debug!(is_playing = was_playing, "Toggling playback");
        if was_playing {
            inner.session.pause();
            inner.stop_clock();
            true
        } else if inner.session.play() {
            self.start_clock(&mut inner);
            true
        } else {
            false
        }
    }

    pub async fn seek(&self, position_seconds: i64) {
        let mut inner = self.inner.lock().await;
        inner.session.seek(position_seconds);
        if !inner.session.is_playing() {
            inner.stop_clock();
        }
    }

    pub async fn set_volume(&self, volume: i32) {
        self.inner.lock().await.session.set_volume(volume);
    }

    pub async fn toggle_shuffle(&self) -> bool {
        self.inner.lock().await.session.toggle_shuffle()
    }

    pub async fn cycle_repeat(&self) -> RepeatState {
        self.inner.lock().await.session.cycle_repeat()
    }

    /// Dismiss the player
    pub async fn close(&self) {
        let mut inner = self.inner.lock().await;
        inner.stop_clock();
        inner.session.close();
        tracing::debug!("Player closed");
    }

    pub async fn info(&self) -> PlaybackInfo {
        self.inner.lock().await.session.info()
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub async fn has_clock(&self) -> bool {
        self.inner.lock().await.clock.is_some()
    }

    fn start_clock(&self, inner: &mut PlayerInner) {
        inner.stop_clock();

        let id = inner.next_clock_id;
        inner.next_clock_id += 1;

        let weak: Weak<Mutex<PlayerInner>> = Arc::downgrade(&self.inner);
        let period = self.tick_interval;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;

                let Some(shared) = weak.upgrade() else {
                    break;
                };
                let mut inner = shared.lock().await;
                if inner.clock.as_ref().map(|c| c.id) != Some(id) {
                    break;
                }

                match inner.session.tick() {
                    TickOutcome::Advanced => {
                        tracing::trace!(clock_id = id, position = inner.session.position_seconds(), "Tick");
                    }
                    TickOutcome::Finished => {
                        tracing::info!(position = inner.session.position_seconds(), "Track finished");
                        inner.clock = None;
                        break;
                    }
                    TickOutcome::Ignored => {
                        inner.clock = None;
                        break;
                    }
                }
            }
        });

        inner.clock = Some(Clock { id, handle });
        tracing::trace!(clock_id = id, "Clock started");
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        // The clock also exits on its own once the player is gone
        if let Ok(mut inner) = self.inner.try_lock() {
            inner.stop_clock();
        }
    }
}
