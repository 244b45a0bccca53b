//! Playback session state machine
//!
//! A session binds one track at a time and moves between three states:
//! `Closed`, `Loaded` (track bound, cursor still) and `Playing` (cursor
//! advanced by ticks). Transitions requested from the wrong state are no-ops.
//! The session itself is clock-agnostic: whoever drives `tick()` (see
//! `controller::playback::Player`) must start its clock when `play()` reports
//! entry into `Playing` and stop it whenever the session leaves that state.

use std::sync::{Arc, Weak};

use crate::error::Result;
use super::duration::format_time;
use super::types::{RepeatState, Track};

pub const DEFAULT_VOLUME_PERCENT: u8 = 70;
pub const MAX_VOLUME_PERCENT: u8 = 100;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Closed,
    Loaded,
    Playing,
}

/// Result of one clock tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Cursor moved forward, still playing
    Advanced,
    /// Cursor reached the end; session is back in `Loaded`
    Finished,
    /// Session was not playing
    Ignored,
}

/// Settings that survive track changes (shuffle, repeat, volume)
#[derive(Clone, Debug)]
pub struct PlaybackSettings {
    pub shuffle: bool,
    pub repeat: RepeatState,
    pub volume: u8,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            shuffle: false,
            repeat: RepeatState::Off,
            volume: DEFAULT_VOLUME_PERCENT,
        }
    }
}

/// Snapshot of a session for rendering
#[derive(Clone, Debug)]
pub struct PlaybackInfo {
    pub track: Option<Arc<Track>>,
    pub state: PlaybackState,
    pub position_seconds: u32,
    pub duration_seconds: u32,
    pub settings: PlaybackSettings,
}

impl PlaybackInfo {
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// "M:SS / M:SS" progress label
    pub fn progress_label(&self) -> String {
        format!(
            "{} / {}",
            format_time(self.position_seconds),
            format_time(self.duration_seconds)
        )
    }
}

#[derive(Debug, Default)]
pub struct PlaybackSession {
    state: PlaybackState,
    track: Option<Weak<Track>>,
    position_seconds: u32,
    duration_seconds: u32,
    settings: PlaybackSettings,
}

impl PlaybackSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_volume(volume: u8) -> Self {
        let mut session = Self::new();
        session.settings.volume = volume.min(MAX_VOLUME_PERCENT);
        session
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn position_seconds(&self) -> u32 {
        self.position_seconds
    }

    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    pub fn volume(&self) -> u8 {
        self.settings.volume
    }

    pub fn shuffle(&self) -> bool {
        self.settings.shuffle
    }

    pub fn repeat(&self) -> RepeatState {
        self.settings.repeat
    }

    /// The bound track, if it is still alive in the catalog
    pub fn current_track(&self) -> Option<Arc<Track>> {
        self.track.as_ref().and_then(Weak::upgrade)
    }

    /// Bind a track. Only legal from `Closed`; returns whether it happened.
    ///
    /// A malformed duration string is rejected and the session stays closed.
    pub fn open(&mut self, track: &Arc<Track>) -> Result<bool> {
        if self.state != PlaybackState::Closed {
            tracing::debug!(track_id = %track.id, state = ?self.state, "open ignored, session not closed");
            return Ok(false);
        }

        let duration_seconds = track.duration_seconds()?;
        self.track = Some(Arc::downgrade(track));
        self.position_seconds = 0;
        self.duration_seconds = duration_seconds;
        self.state = PlaybackState::Loaded;
        tracing::debug!(track_id = %track.id, duration_seconds, "Session opened");
        Ok(true)
    }

    /// Returns true when the session entered `Playing`
    pub fn play(&mut self) -> bool {
        if self.state == PlaybackState::Loaded && self.position_seconds < self.duration_seconds {
            self.state = PlaybackState::Playing;
            true
        } else {
            false
        }
    }

    /// Returns true when the session left `Playing`
    pub fn pause(&mut self) -> bool {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Loaded;
            true
        } else {
            false
        }
    }

    /// Clamp into [0, duration]. Reaching the end while playing stops playback.
    pub fn seek(&mut self, value: i64) {
        if self.state == PlaybackState::Closed {
            return;
        }
        self.position_seconds = value.clamp(0, i64::from(self.duration_seconds)) as u32;
        if self.state == PlaybackState::Playing && self.position_seconds >= self.duration_seconds {
            self.state = PlaybackState::Loaded;
        }
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.state != PlaybackState::Playing {
            return TickOutcome::Ignored;
        }

        self.position_seconds = (self.position_seconds + 1).min(self.duration_seconds);
        if self.position_seconds >= self.duration_seconds {
            // End of track: stop here, no auto-advance and no repeat
            self.state = PlaybackState::Loaded;
            TickOutcome::Finished
        } else {
            TickOutcome::Advanced
        }
    }

    pub fn set_volume(&mut self, volume: i32) {
        self.settings.volume = volume.clamp(0, i32::from(MAX_VOLUME_PERCENT)) as u8;
    }

    pub fn toggle_shuffle(&mut self) -> bool {
        self.settings.shuffle = !self.settings.shuffle;
        self.settings.shuffle
    }

    pub fn cycle_repeat(&mut self) -> RepeatState {
        self.settings.repeat = self.settings.repeat.next();
        self.settings.repeat
    }

    /// Unbind the track from any state. Returns true if the session was playing.
    pub fn close(&mut self) -> bool {
        let was_playing = self.is_playing();
        self.state = PlaybackState::Closed;
        self.track = None;
        self.position_seconds = 0;
        self.duration_seconds = 0;
        was_playing
    }

    pub fn info(&self) -> PlaybackInfo {
        PlaybackInfo {
            track: self.current_track(),
            state: self.state,
            position_seconds: self.position_seconds,
            duration_seconds: self.duration_seconds,
            settings: self.settings.clone(),
        }
    }
}
