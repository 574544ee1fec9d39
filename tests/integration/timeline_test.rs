//! Integration tests for timeline description files

use clipsync::clip::ActivationPolicy;
use clipsync::resource::SeekLatency;
use clipsync::{MediaReference, SyncSettings, TimelineFile};

use super::helpers::{fixtures_dir, temp_file, temp_fixture};

#[test]
fn loads_every_fixture() {
    for name in ["two_clips.toml", "drift.toml", "scrub.toml", "frame_accurate.toml"] {
        let timeline = TimelineFile::load(&fixtures_dir().join(name));
        assert!(timeline.is_ok(), "{} failed: {:?}", name, timeline.err());
    }
}

#[test]
fn fixture_fields_reach_the_clip_configuration() {
    let (temp_dir, path) = temp_fixture("frame_accurate.toml");
    let timeline = TimelineFile::load(&path).expect("Should load timeline");

    assert_eq!(timeline.player.seek_latency, SeekLatency::Never);
    assert!(timeline.player.render_loop);
    let clip = &timeline.clips[0];
    assert!(clip.config.frame_accurate_seek);
    assert_eq!(clip.config.source, Some(MediaReference::new("a.mp4")));
    assert_eq!(clip.config.activation_policy, ActivationPolicy::Permissive);

    drop(temp_dir);
}

#[test]
fn timeline_end_covers_last_clip() {
    let timeline = TimelineFile::load(&fixtures_dir().join("two_clips.toml")).unwrap();
    assert_eq!(timeline.end(&SyncSettings::default()), 5.0);
}

#[test]
fn missing_file_reports_path() {
    let err = TimelineFile::load(&fixtures_dir().join("nope.toml")).unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("Failed to read timeline file"), "{}", message);
    assert!(message.contains("nope.toml"), "{}", message);
}

#[test]
fn invalid_clip_values_are_rejected_with_context() {
    let err = TimelineFile::load(&fixtures_dir().join("invalid_volume.toml")).unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("invalid_volume.toml"), "{}", message);
    assert!(message.contains("loud"), "{}", message);
    assert!(message.contains("audio_volume"), "{}", message);
}

#[test]
fn malformed_toml_is_an_error() {
    let (temp_dir, path) = temp_file("broken.toml", "[[clips]\nstart = ");
    assert!(TimelineFile::load(&path).is_err());
    drop(temp_dir);
}

#[test]
fn clip_without_start_is_rejected() {
    let (temp_dir, path) = temp_file("nostart.toml", "[[clips]]\nsource = \"a.mp4\"\n");
    assert!(TimelineFile::load(&path).is_err());
    drop(temp_dir);
}
