// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::fs::File;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use crossterm::event::{Event, KeyEventKind};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use strumseq::arrangement::{MeasureUpdate, Rhythm};
use strumseq::audio::{default_device_name, list_devices, AudioEngine, TraceVoice, VoiceEngine};
use strumseq::config::SessionConfig;
use strumseq::music::{Note, ScaleMode};
use strumseq::sequencer::Sequencer;
use strumseq::timing::{AudioClock, SystemClock};
use strumseq::ui::{App, Editor, KeyAction, ViewState};

/// Upper bound on how long the headless loop sleeps between pumps
const PUMP_INTERVAL: Duration = Duration::from_millis(5);

fn print_usage() {
    println!("strumseq - Chord progression step sequencer");
    println!();
    println!("Usage: strumseq [OPTIONS]");
    println!();
    println!("Without --pattern or --preview, opens the terminal editor.");
    println!();
    println!("Options:");
    println!("  --config <FILE>     Load session settings from a YAML file");
    println!("  --root <NOTE>       Key root (C, F#, Bb, ...)");
    println!("  --scale <MODE>      major or minor");
    println!("  --bpm <N>           Tempo, 40-220");
    println!("  --once              Play the timeline once instead of looping");
    println!("  --pattern <LIST>    Play a progression headless, e.g. 1:4n,6:4n,4:2n,-:1n");
    println!("                      (1-based degree or - for a rest, then the rhythm)");
    println!("  --preview           Strum each chord of the key once");
    println!("  --silent            Log notes instead of playing them");
    println!("  --log <FILE>        Write logs to a file");
    println!("  --list-devices      List audio output devices");
    println!("  --help              Show this help message");
}

/// One `--pattern` entry
#[derive(Debug, Clone, Copy, PartialEq)]
struct PatternStep {
    chord: Option<usize>,
    rhythm: Rhythm,
}

fn parse_pattern(list: &str) -> Result<Vec<PatternStep>> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            let (degree, rhythm) = item.split_once(':').unwrap_or((item, "4n"));
            let chord = match degree.trim() {
                "-" | "0" => None,
                d => {
                    let degree: usize = d
                        .parse()
                        .map_err(|_| anyhow!("Invalid chord degree: {}", d))?;
                    if !(1..=7).contains(&degree) {
                        bail!("Chord degree out of range (1-7): {}", degree);
                    }
                    Some(degree - 1)
                }
            };
            Ok(PatternStep {
                chord,
                rhythm: rhythm.parse()?,
            })
        })
        .collect()
}

#[derive(Debug, Default)]
struct Options {
    config: Option<PathBuf>,
    root: Option<Note>,
    scale: Option<ScaleMode>,
    bpm: Option<u16>,
    once: bool,
    pattern: Option<Vec<PatternStep>>,
    preview: bool,
    silent: bool,
    log: Option<PathBuf>,
    list_devices: bool,
    help: bool,
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut options = Options::default();
    let mut args = args.iter();

    while let Some(arg) = args.next() {
        let mut value = |name: &str| {
            args.next()
                .cloned()
                .ok_or_else(|| anyhow!("{} requires a value", name))
        };
        match arg.as_str() {
            "--config" => options.config = Some(PathBuf::from(value("--config")?)),
            "--root" => options.root = Some(value("--root")?.parse()?),
            "--scale" => options.scale = Some(value("--scale")?.parse()?),
            "--bpm" => {
                let bpm = value("--bpm")?;
                options.bpm = Some(bpm.parse().map_err(|_| anyhow!("Invalid BPM: {}", bpm))?);
            }
            "--once" => options.once = true,
            "--pattern" => options.pattern = Some(parse_pattern(&value("--pattern")?)?),
            "--preview" => options.preview = true,
            "--silent" => options.silent = true,
            "--log" => options.log = Some(PathBuf::from(value("--log")?)),
            "--list-devices" => options.list_devices = true,
            "--help" | "-h" => options.help = true,
            other => bail!("Unknown option: {}", other),
        }
    }

    Ok(options)
}

impl Options {
    fn interactive(&self) -> bool {
        self.pattern.is_none() && !self.preview
    }

    fn session_config(&self) -> Result<SessionConfig> {
        let mut config = match &self.config {
            Some(path) => SessionConfig::load(path)?,
            None => SessionConfig::default(),
        };
        if let Some(root) = self.root {
            config.root = root;
        }
        if let Some(scale) = self.scale {
            config.scale = scale;
        }
        if let Some(bpm) = self.bpm {
            config.bpm = bpm;
        }
        if self.once {
            config.looping = false;
        }
        Ok(config.normalized())
    }
}

fn init_logging(options: &Options) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("strumseq=info"));
    let registry = tracing_subscriber::registry().with(filter);

    match &options.log {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file: {:?}", path))?;
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        // Nothing may write over the terminal editor
        None if options.interactive() => registry.init(),
        None => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
    Ok(())
}

fn load_pattern<V: VoiceEngine>(seq: &mut Sequencer<V>, pattern: &[PatternStep]) {
    for (i, step) in pattern.iter().enumerate() {
        let id = match seq.measures().first() {
            Some(first) if i == 0 => first.id,
            _ => seq.add_measure(),
        };
        seq.update_measure(id, MeasureUpdate::Chord(step.chord));
        seq.update_measure(id, MeasureUpdate::Rhythm(step.rhythm));
    }
}

fn describe_step<V: VoiceEngine>(seq: &Sequencer<V>, step: usize) -> String {
    let Some(measure) = seq.measures().get(step) else {
        return format!("{:>3}", step + 1);
    };
    let chord = measure
        .chord_index
        .and_then(|index| seq.chords().get(index))
        .map_or("-", |chord| chord.name.as_str());
    format!(
        "{:>3}/{:<3} {:<5} {}",
        step + 1,
        seq.measures().len(),
        chord,
        measure.rhythm
    )
}

async fn play_headless<V: VoiceEngine>(seq: &mut Sequencer<V>, tail: Duration) -> Result<()> {
    println!(
        "Playing {} measures in {} {} at {} BPM{}",
        seq.measures().len(),
        seq.chords().root(),
        seq.chords().mode(),
        seq.bpm(),
        if seq.is_looping() { " (Ctrl+C to stop)" } else { "" }
    );

    let mut steps = seq.subscribe_steps();
    seq.play().await.context("Failed to start playback")?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        seq.pump();

        if steps.has_changed()? {
            if let Some(step) = *steps.borrow_and_update() {
                println!("▶ {}", describe_step(seq, step));
            }
        }
        if !seq.is_playing() {
            break;
        }

        let wait = seq
            .time_until_next_event()
            .map_or(PUMP_INTERVAL, |wait| wait.min(PUMP_INTERVAL));
        tokio::select! {
            _ = &mut ctrl_c => {
                seq.stop();
                println!();
                break;
            }
            _ = tokio::time::sleep(wait) => {}
        }
    }

    tokio::time::sleep(tail).await;
    println!("■ Stopped");
    Ok(())
}

async fn preview_key<V: VoiceEngine>(seq: &mut Sequencer<V>, tail: Duration) -> Result<()> {
    seq.voice_mut()
        .ensure_ready()
        .await
        .context("Failed to start audio")?;

    let spacing = Duration::from_secs_f64(Rhythm::Half.duration(seq.bpm() as f64));
    let names: Vec<String> = seq.chords().chords().iter().map(|c| c.to_string()).collect();
    for (index, name) in names.iter().enumerate() {
        println!("{} {}", index + 1, name);
        seq.preview_degree(index);
        tokio::time::sleep(spacing).await;
    }
    tokio::time::sleep(tail).await;
    Ok(())
}

async fn run_editor<V: VoiceEngine>(seq: &mut Sequencer<V>) -> Result<()> {
    let mut app = App::new().context("Failed to initialize terminal")?;
    app.set_frame_rate(60);
    let mut editor = Editor::default();

    if let Err(e) = seq.voice_mut().ensure_ready().await {
        app.set_status(format!("Audio unavailable: {e}"));
    }

    while app.is_running() {
        seq.pump();
        app.draw(&ViewState::capture(seq, editor.selected()))?;

        let Some(Event::Key(key)) = app.poll_event()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let action = app.handle_key(key.code, key.modifiers);
        if matches!(action, KeyAction::Quit | KeyAction::ToggleHelp | KeyAction::None) {
            continue;
        }
        match editor.apply(seq, action).await {
            Ok(Some(message)) => app.set_status(message),
            Ok(None) => {}
            Err(e) => app.set_status(format!("Audio unavailable: {e}")),
        }
    }

    seq.stop();
    Ok(())
}

async fn run<V: VoiceEngine>(mut seq: Sequencer<V>, options: &Options, tail: Duration) -> Result<()> {
    let result = if options.preview {
        preview_key(&mut seq, tail).await
    } else if options.pattern.is_some() {
        play_headless(&mut seq, tail).await
    } else {
        run_editor(&mut seq).await
    };
    seq.voice_mut().shutdown();
    result
}

fn build<V: VoiceEngine>(
    voice: V,
    clock: Arc<dyn AudioClock>,
    config: &SessionConfig,
    options: &Options,
) -> Sequencer<V> {
    let mut seq = Sequencer::new(voice, clock, config);
    if let Some(pattern) = &options.pattern {
        load_pattern(&mut seq, pattern);
    }
    seq
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {e}");
            print_usage();
            std::process::exit(1);
        }
    };

    if options.help {
        print_usage();
        return Ok(());
    }
    if options.list_devices {
        let default = default_device_name();
        for name in list_devices() {
            let marker = if Some(&name) == default.as_ref() { "*" } else { " " };
            println!("{marker} {name}");
        }
        return Ok(());
    }

    init_logging(&options)?;
    let config = options.session_config()?;
    info!(
        key = %config.root,
        mode = %config.scale,
        bpm = config.bpm,
        looping = config.looping,
        "session configured"
    );

    if options.silent {
        let seq = build(TraceVoice::new(), Arc::new(SystemClock::new()), &config, &options);
        run(seq, &options, Duration::ZERO).await
    } else {
        let engine = AudioEngine::new(config.audio, config.synth);
        let clock = Arc::new(engine.clock());
        let tail = Duration::from_secs_f64(config.synth.release.max(0.0));
        let seq = build(engine, clock, &config, &options);
        run(seq, &options, tail).await
    }
}
