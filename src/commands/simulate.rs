//! Simulate subcommand handler

use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{bail, Result};
use serde::Serialize;
use tracing::info;

use clipsync::clock::{Clock, ManualClock};
use clipsync::resource::{PlaybackResource, TransportCommand};
use clipsync::timeline_file::LoadedTimeline;
use clipsync::{Config, PlaybackMode, SyncContext, SyncSettings, TimelineFile};

/// Upper bound on sequencer updates in one run.
const MAX_UPDATES: u64 = 10_000_000;

pub struct SimulateOptions {
    pub file: PathBuf,
    pub until: Option<f64>,
    pub step: f64,
    pub preview: bool,
    pub json: bool,
}

/// A transport command and the timeline time it was issued at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub at: f64,
    #[serde(flatten)]
    pub command: TransportCommand,
}

#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub until: f64,
    pub step: f64,
    pub mode: PlaybackMode,
    pub commands: Vec<LogEntry>,
    /// Media the player holds once every clip has been torn down
    pub final_media: Option<String>,
    pub final_looping: bool,
}

#[cfg(not(tarpaulin_include))]
pub fn handle(options: &SimulateOptions) -> Result<()> {
    let config = Config::load()?;
    let timeline = TimelineFile::load(&options.file)?;
    info!(file = %options.file.display(), clips = timeline.clips.len(), "loaded timeline");

    let report = run(&timeline, &config.sync, options.until, options.step, options.preview)?;
    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text(&report);
    }
    Ok(())
}

/// Drive `timeline` from time zero to `until` in `step` increments.
pub fn run(
    timeline: &TimelineFile,
    settings: &SyncSettings,
    until: Option<f64>,
    step: f64,
    preview: bool,
) -> Result<SimulationReport> {
    if !(step > 0.0) || !step.is_finite() {
        bail!("--step must be a positive number of seconds");
    }
    let until = until.unwrap_or_else(|| timeline.end(settings) + 1.0);
    if !(until >= 0.0) || !until.is_finite() {
        bail!("--until must be a non-negative number of seconds");
    }
    let updates = (until / step).ceil();
    if updates > MAX_UPDATES as f64 {
        bail!(
            "--until {} with --step {} needs {} updates (limit {}); use a larger step",
            until,
            step,
            updates,
            MAX_UPDATES
        );
    }
    let updates = updates as u64;

    let clock = Rc::new(ManualClock::new());
    let shared_clock: Rc<dyn Clock> = clock.clone();
    let context = SyncContext::new(shared_clock, settings.clone()).shared();
    let mode = if preview {
        PlaybackMode::Preview
    } else {
        PlaybackMode::Playback
    };
    context.set_mode(mode);

    let LoadedTimeline {
        player,
        mut sequencer,
    } = timeline.instantiate(Rc::clone(&context));

    let mut log = CommandLog::default();
    for index in 0..=updates {
        let time = (index as f64 * step).min(until);
        if index > 0 {
            let elapsed = time - sequencer.cursor().unwrap_or(0.0);
            clock.advance_secs(elapsed);
            player.borrow_mut().advance(elapsed);
        }
        sequencer.advance(time);
        log.drain(time, player.borrow_mut().take_commands());
    }
    sequencer.finish();
    log.drain(until, player.borrow_mut().take_commands());

    let player = player.borrow();
    Ok(SimulationReport {
        until,
        step,
        mode,
        commands: log.entries,
        final_media: player.media_reference().map(|media| media.to_string()),
        final_looping: player.is_looping(),
    })
}

/// Collects commands, dropping update/render steps and repeated volumes.
#[derive(Default)]
struct CommandLog {
    entries: Vec<LogEntry>,
    volume: Option<f32>,
}

impl CommandLog {
    fn drain(&mut self, time: f64, commands: Vec<TransportCommand>) {
        for command in commands {
            if command.is_step() {
                continue;
            }
            if let TransportCommand::SetAudioVolume { volume } = command {
                if self.volume == Some(volume) {
                    continue;
                }
                self.volume = Some(volume);
            }
            self.entries.push(LogEntry { at: time, command });
        }
    }
}

fn describe(command: &TransportCommand) -> String {
    match command {
        TransportCommand::OpenMedia {
            reference,
            autoplay,
        } => {
            if *autoplay {
                format!("open {} (autoplay)", reference)
            } else {
                format!("open {}", reference)
            }
        }
        TransportCommand::Play => "play".to_string(),
        TransportCommand::Pause => "pause".to_string(),
        TransportCommand::Stop => "stop".to_string(),
        TransportCommand::SeekPrecise { time } => format!("seek precise {:.3}", time),
        TransportCommand::SeekFast { time } => format!("seek fast {:.3}", time),
        TransportCommand::SetLoop { looping } => {
            format!("loop {}", if *looping { "on" } else { "off" })
        }
        TransportCommand::SetAudioVolume { volume } => format!("volume {:.2}", volume),
        TransportCommand::CancelRenderLoop => "cancel render loop".to_string(),
        TransportCommand::UpdateStep => "update".to_string(),
        TransportCommand::EndUpdateStep => "end update".to_string(),
        TransportCommand::RenderStep => "render".to_string(),
    }
}

#[cfg(not(tarpaulin_include))]
fn print_text(report: &SimulationReport) {
    for entry in &report.commands {
        println!("{:>9.3}  {}", entry.at, describe(&entry.command));
    }
    println!();
    println!(
        "{} command(s) up to {:.3}s; player left on {} (loop {})",
        report.commands.len(),
        report.until,
        report.final_media.as_deref().unwrap_or("no media"),
        if report.final_looping { "on" } else { "off" }
    );
}
