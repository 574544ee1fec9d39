//! Shared helpers for integration tests

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use tempfile::TempDir;

use clipsync::clock::{Clock, ManualClock};
use clipsync::resource::{SimulatedResource, TransportCommand};
use clipsync::timeline_file::LoadedTimeline;
use clipsync::{PlaybackMode, Sequencer, SyncContext, SyncSettings, TimelineFile};

/// Path to the fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Load a fixture file as a string
pub fn load_fixture(name: &str) -> String {
    fs::read_to_string(fixtures_dir().join(name))
        .unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Copy a fixture into a fresh temp dir and return both.
pub fn temp_fixture(name: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join(name);
    fs::write(&path, load_fixture(name)).expect("Failed to write fixture");
    (temp_dir, path)
}

/// Write `content` to `name` inside a fresh temp dir.
pub fn temp_file(name: &str, content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join(name);
    fs::write(&path, content).expect("Failed to write temp file");
    (temp_dir, path)
}

/// A fixture timeline wired to a manual clock.
pub struct Harness {
    pub clock: Rc<ManualClock>,
    pub context: Rc<SyncContext>,
    pub player: Rc<RefCell<SimulatedResource>>,
    pub sequencer: Sequencer,
}

impl Harness {
    pub fn from_fixture(name: &str, mode: PlaybackMode) -> Self {
        let timeline = TimelineFile::from_toml_str(&load_fixture(name)).expect("Invalid fixture");
        let clock = Rc::new(ManualClock::new());
        let shared_clock: Rc<dyn Clock> = clock.clone();
        let context = SyncContext::new(shared_clock, SyncSettings::default()).shared();
        context.set_mode(mode);
        let LoadedTimeline { player, sequencer } = timeline.instantiate(Rc::clone(&context));
        Self {
            clock,
            context,
            player,
            sequencer,
        }
    }

    /// Step the cursor from 0 to `until`, returning `(time, command)` pairs
    /// without update/render steps or volume changes.
    pub fn run(&mut self, until: f64, step: f64) -> Vec<(f64, TransportCommand)> {
        let mut log = Vec::new();
        let updates = (until / step).round() as u64;
        for index in 0..=updates {
            let time = index as f64 * step;
            if index > 0 {
                self.clock.advance_secs(step);
                self.player.borrow_mut().advance(step);
            }
            self.sequencer.advance(time);
            self.collect(time, &mut log);
        }
        log
    }

    pub fn finish(&mut self, time: f64) -> Vec<(f64, TransportCommand)> {
        let mut log = Vec::new();
        self.sequencer.finish();
        self.collect(time, &mut log);
        log
    }

    fn collect(&self, time: f64, log: &mut Vec<(f64, TransportCommand)>) {
        for command in self.player.borrow_mut().take_commands() {
            if command.is_step() || matches!(command, TransportCommand::SetAudioVolume { .. }) {
                continue;
            }
            log.push((time, command));
        }
    }
}
