//! End-to-end engine scenarios on a simulated player

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use clipsync::clip::SeekOutcome;
use clipsync::clock::{Clock, ManualClock};
use clipsync::resource::{SeekLatency, SimulatedResource, TransportCommand};
use clipsync::{
    ClipConfiguration, ClipController, ClipState, MediaReference, PlaybackMode, PlaybackResource,
    ResourceId, SharedResource, SyncContext, SyncError, SyncSettings, TimelineClip,
    TrackCoordinator, TrackLifecycle,
};

use super::helpers::Harness;

fn context() -> Rc<SyncContext> {
    SyncContext::new(Rc::new(ManualClock::new()), SyncSettings::default()).shared()
}

fn player(sim: SimulatedResource) -> (Rc<RefCell<SimulatedResource>>, SharedResource) {
    let sim = Rc::new(RefCell::new(sim));
    let shared: SharedResource = sim.clone();
    (sim, shared)
}

fn sim() -> SimulatedResource {
    SimulatedResource::new(ResourceId::new(7))
        .with_media_duration("a.mp4", 10.0)
        .with_media_duration("b.mp4", 10.0)
}

// ============================================================================
// Ownership
// ============================================================================

#[test]
fn first_activation_claims_and_plays() {
    let context = context();
    let (sim, shared) = player(sim());
    let mut clip = ClipController::new(
        "a",
        ClipConfiguration::with_source("a.mp4"),
        Some(shared),
        Rc::clone(&context),
    );

    clip.activate(0.0).expect("activation should succeed");

    assert_eq!(clip.state(), ClipState::Active);
    assert_eq!(context.registry().owner(ResourceId::new(7)), Some(clip.id()));
    let commands = sim.borrow().transport_commands();
    assert!(commands.contains(&TransportCommand::Play));
    assert!(commands.contains(&TransportCommand::SeekPrecise { time: 0.0 }));
    assert!(sim.borrow().is_playing());
}

#[test]
fn second_clip_cannot_take_a_playing_resource() {
    let context = context();
    let (sim, shared) = player(sim());
    let mut a = ClipController::new(
        "a",
        ClipConfiguration::with_source("a.mp4"),
        Some(shared.clone()),
        Rc::clone(&context),
    );
    let mut b = ClipController::new(
        "b",
        ClipConfiguration::with_source("b.mp4"),
        Some(shared),
        Rc::clone(&context),
    );

    a.activate(0.0).unwrap();
    sim.borrow_mut().clear_commands();
    let err = b.activate(0.0).unwrap_err();

    assert!(matches!(err, SyncError::OwnershipConflict { owner: Some(owner), .. } if owner == a.id()));
    assert_eq!(b.state(), ClipState::Idle);
    assert_eq!(a.state(), ClipState::Active);
    assert!(sim.borrow().commands().is_empty());
    assert_eq!(sim.borrow().media_reference(), Some(MediaReference::new("a.mp4")));
}

#[test]
fn at_most_one_owner_under_interleaved_calls() {
    let context = context();
    let (_sim, shared) = player(sim());
    let mut clips: Vec<ClipController> = ["a.mp4", "b.mp4", "a.mp4", "b.mp4"]
        .iter()
        .enumerate()
        .map(|(index, source)| {
            ClipController::new(
                format!("clip-{}", index),
                ClipConfiguration::with_source(*source),
                Some(shared.clone()),
                Rc::clone(&context),
            )
        })
        .collect();

    // Small LCG so the interleaving is deterministic
    let mut seed: u64 = 0x2545_f491;
    for _ in 0..400 {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let index = (seed >> 33) as usize % clips.len();
        let clip = &mut clips[index];
        let _ = match (seed >> 20) % 5 {
            0 => clip.prepare(),
            1 => clip.activate(0.5).map(|_| ()),
            2 => clip.pause(),
            3 => clip.tick(0.5).map(|_| ()),
            _ => clip.stop(),
        };

        let owners = clips.iter().filter(|clip| clip.is_owner()).count();
        assert!(owners <= 1, "{} owners at once", owners);
        for clip in &clips {
            if clip.state() == ClipState::Active {
                assert!(clip.is_owner(), "{} is active without owning", clip.name());
            }
        }
    }
}

#[test]
fn release_restores_loop_flag_and_media() {
    let context = context();
    let (sim, shared) = player(sim().with_assigned_media("idle.mp4").with_looping(true));
    let mut clip = ClipController::new(
        "a",
        ClipConfiguration::with_source("a.mp4"),
        Some(shared),
        Rc::clone(&context),
    );

    clip.activate(0.0).unwrap();
    assert!(!sim.borrow().is_looping());
    clip.destroy().unwrap();

    let sim = sim.borrow();
    assert!(sim.is_looping());
    assert_eq!(sim.media_reference(), Some(MediaReference::new("idle.mp4")));
    assert!(!sim.is_playing());
    assert_eq!(clip.state(), ClipState::Idle);
    assert_eq!(context.registry().owner(ResourceId::new(7)), None);
}

// ============================================================================
// Pre-roll and seeking
// ============================================================================

#[test]
fn preroll_window_opens_at_lead_time() {
    for (time, prepared) in [(9.6, false), (9.7, true), (9.85, true), (10.0, false)] {
        let (_sim, shared) = player(sim());
        let mut track = TrackCoordinator::new(Some(shared), context());
        let id = track.add_clip(
            "a",
            ClipConfiguration::with_source("a.mp4"),
            TimelineClip::new(10.0, 5.0),
        );

        track.on_track_tick(time, &[]);

        let state = track.clip(id).map(|clip| clip.state());
        assert_eq!(state == Some(ClipState::Preparing), prepared, "at {}", time);
    }
}

#[test]
fn watchdog_gives_up_after_five_seconds() {
    let clock = Rc::new(ManualClock::new());
    let shared_clock: Rc<dyn Clock> = clock.clone();
    let context = SyncContext::new(shared_clock, SyncSettings::default()).shared();
    let (sim, shared) = player(sim().with_seek_latency(SeekLatency::Never).with_render_loop());
    let mut clip = ClipController::new(
        "exact",
        ClipConfiguration {
            frame_accurate_seek: true,
            ..ClipConfiguration::with_source("a.mp4")
        },
        Some(shared),
        context,
    );

    let outcome = clip.activate(1.0).unwrap();

    assert_eq!(
        outcome,
        SeekOutcome::TimedOut {
            waited: Duration::from_millis(5000)
        }
    );
    assert_eq!(clock.now(), Duration::from_millis(5000));
    assert_eq!(clip.state(), ClipState::Active);
    let sim = sim.borrow();
    assert!(!sim.has_render_loop());
    assert!(!sim.is_playing(), "frame-accurate clips park paused");
    assert_eq!(sim.transport_commands().last(), Some(&TransportCommand::Pause));
}

#[test]
fn drift_is_corrected_once_per_interval() {
    let mut harness = Harness::from_fixture("drift.toml", PlaybackMode::Playback);
    let log = harness.run(5.0, 0.25);

    let seeks: Vec<(f64, f64)> = log
        .iter()
        .filter_map(|(at, command)| match command {
            TransportCommand::SeekPrecise { time } => Some((*at, *time)),
            _ => None,
        })
        .collect();
    // Pre-roll seek on activation, then a correction whenever the player
    // has run a full second ahead
    assert_eq!(seeks, vec![(0.0, 0.0), (2.0, 2.0), (4.0, 4.0)]);
}

// ============================================================================
// Editor preview
// ============================================================================

#[test]
fn scrubbing_hands_the_player_between_clips() {
    let mut harness = Harness::from_fixture("scrub.toml", PlaybackMode::Preview);
    let mut log = harness.run(5.0, 0.25);
    log.extend(harness.finish(5.0));

    let opens: Vec<(f64, String)> = log
        .iter()
        .filter_map(|(at, command)| match command {
            TransportCommand::OpenMedia { reference, .. } => Some((*at, reference.to_string())),
            _ => None,
        })
        .collect();
    assert_eq!(
        opens,
        vec![
            (0.0, "a.mp4".to_string()),
            (2.0, "idle.mp4".to_string()),
            (2.0, "b.mp4".to_string()),
            (4.0, "idle.mp4".to_string()),
        ]
    );
    assert!(!log
        .iter()
        .any(|(_, command)| *command == TransportCommand::Stop));

    let player = harness.player.borrow();
    assert!(player.is_looping());
    assert!(!player.is_playing());
    assert_eq!(harness.context.registry().owner(player.id()), None);
}

#[test]
fn preview_scrub_seeks_follow_the_cursor() {
    let mut harness = Harness::from_fixture("scrub.toml", PlaybackMode::Preview);
    let log = harness.run(1.0, 0.5);

    let fast: Vec<f64> = log
        .iter()
        .filter_map(|(_, command)| match command {
            TransportCommand::SeekFast { time } => Some(*time),
            _ => None,
        })
        .collect();
    // Activation seek, then one scrub seek per tick
    assert_eq!(fast, vec![0.0, 0.0, 0.5, 1.0]);
}
