//! Collaborators shared by every controller on the update thread.

use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::config::SyncSettings;
use crate::registry::PlaybackResourceRegistry;

/// Whether the host is really playing or only previewing (editor scrub).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    /// Authoritative playback: the timeline is live
    #[default]
    Playback,
    /// Editor preview: the cursor is being scrubbed by hand
    Preview,
}

/// Registry, clock, mode, and settings bundled for sharing via `Rc`.
pub struct SyncContext {
    registry: PlaybackResourceRegistry,
    clock: Rc<dyn Clock>,
    mode: Cell<PlaybackMode>,
    settings: SyncSettings,
}

impl SyncContext {
    pub fn new(clock: Rc<dyn Clock>, settings: SyncSettings) -> Self {
        Self {
            registry: PlaybackResourceRegistry::new(),
            clock,
            mode: Cell::new(PlaybackMode::Playback),
            settings,
        }
    }

    /// Context on the wall clock with default settings.
    pub fn with_system_clock() -> Self {
        Self::new(Rc::new(SystemClock::new()), SyncSettings::default())
    }

    pub fn shared(self) -> Rc<Self> {
        Rc::new(self)
    }

    pub fn registry(&self) -> &PlaybackResourceRegistry {
        &self.registry
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode.get()
    }

    pub fn set_mode(&self, mode: PlaybackMode) {
        self.mode.set(mode);
    }

    /// True during real playback, false during editor preview.
    pub fn is_authoritative_playback(&self) -> bool {
        self.mode.get() == PlaybackMode::Playback
    }
}

impl std::fmt::Debug for SyncContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncContext")
            .field("registry", &self.registry)
            .field("mode", &self.mode.get())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
