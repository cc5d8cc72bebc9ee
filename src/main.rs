//! Toneprobe - audio classification test bench
//!
//! Entry point: wires the configured signal producer, the classification
//! engine, and both report sinks into the cycle driver, then runs test
//! cycles until Ctrl+C.

use anyhow::Result;
use cpal::traits::{DeviceTrait, HostTrait};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use toneprobe::audio::source::{MicrophoneSource, SignalProducer, SyntheticSource};
use toneprobe::classify::heuristic::HeuristicClassifier;
use toneprobe::classify::Classifier;
use toneprobe::config::{AppConfig, SourceKind};
use toneprobe::report::display::DisplaySink;
use toneprobe::report::notify::{ConnectionWatch, NotifySink};
use toneprobe::report::{Reporter, Severity};
use toneprobe::{CycleDriver, SignalKind};
use tracing::{error, info};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("toneprobe=info".parse().unwrap()),
        )
        .init();

    println!("╔════════════════════════════════════════════════════════════╗");
    println!(
        "║            Toneprobe v{} - Audio Classifier Bench          ║",
        toneprobe::VERSION
    );
    println!("╚════════════════════════════════════════════════════════════╝");
    println!();

    let mut config = AppConfig::load();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--list" | "-l" => {
                list_devices()?;
                return Ok(());
            }
            "--version" | "-v" => {
                println!("toneprobe {}", toneprobe::VERSION);
                return Ok(());
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--synthetic" | "-s" => {
                config.source = SourceKind::Synthetic;
            }
            "--mic" | "-m" => {
                config.source = SourceKind::Microphone;
            }
            "--device" | "-d" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --device requires a device name");
                    return Ok(());
                }
                config.source = SourceKind::Microphone;
                config.device = Some(args[i + 1].clone());
                i += 2;
                continue;
            }
            "--sample-rate" | "-r" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --sample-rate requires a value");
                    return Ok(());
                }
                match args[i + 1].parse() {
                    Ok(rate) => config.sample_rate = rate,
                    Err(_) => {
                        eprintln!("Error: Invalid sample rate: {}", args[i + 1]);
                        return Ok(());
                    }
                }
                i += 2;
                continue;
            }
            arg => {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                return Ok(());
            }
        }
        i += 1;
    }

    run(config)
}

fn print_help() {
    println!("Usage: toneprobe [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -l, --list              List available input devices");
    println!("  -s, --synthetic         Cycle the synthetic test waveforms (default)");
    println!("  -m, --mic               Capture from the default microphone");
    println!("  -d, --device NAME       Capture from the named input device");
    println!("  -r, --sample-rate RATE  Set sample rate (default: 16000)");
    println!("  -v, --version           Show version");
    println!("  -h, --help              Show this help");
    println!();
    println!("Examples:");
    println!("  toneprobe --synthetic");
    println!("  toneprobe -d \"INMP441\" -r 16000");
    println!();
    println!("Runs classification test cycles until Ctrl+C.");
}

fn list_devices() -> Result<()> {
    println!("Scanning for input devices...");
    println!();

    let host = cpal::default_host();
    let default_name = host
        .default_input_device()
        .and_then(|d| d.name().ok());

    let mut count = 0;
    for device in host.input_devices()? {
        let name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        let default_marker = if Some(&name) == default_name.as_ref() {
            " [DEFAULT]"
        } else {
            ""
        };
        count += 1;
        println!("  {}. {}{}", count, name, default_marker);
        if let Ok(config) = device.default_input_config() {
            println!(
                "     {} ch @ {} Hz ({:?})",
                config.channels(),
                config.sample_rate().0,
                config.sample_format()
            );
        }
    }

    if count == 0 {
        println!("No input devices found.");
    }
    Ok(())
}

fn run(config: AppConfig) -> Result<()> {
    // Transport boundary: the notification channel is drained by a local
    // diagnostics peer (the wireless stack would own this in production)
    let connected = Arc::new(AtomicBool::new(false));
    let (notify, notify_rx) = NotifySink::channel(Arc::clone(&connected));
    let watch = ConnectionWatch::new(Arc::clone(&connected));

    std::thread::Builder::new()
        .name("notify-drain".into())
        .spawn(move || {
            for message in notify_rx.iter() {
                tracing::debug!(target: "toneprobe::notify", %message, "Notification");
            }
        })?;
    connected.store(true, Ordering::Relaxed);

    let mut reporter = Reporter::new(vec![Box::new(DisplaySink::new()), Box::new(notify)]);
    reporter.present("Audio Classifier", "Initializing...", Severity::Success);
    reporter.present("Notify Ready", "Advertising", Severity::Success);

    // Signal producer per configuration
    let producer: Box<dyn SignalProducer> = match config.source {
        SourceKind::Synthetic => {
            let source = SyntheticSource::new(config.sample_rate);
            reporter.present("Source Ready", &source.describe(), Severity::Success);
            Box::new(source)
        }
        SourceKind::Microphone => {
            let mut source = MicrophoneSource::new(config.device.clone(), config.sample_rate);
            if let Err(e) = source.open() {
                error!(error = %e, "Failed to open microphone");
                reporter.present("Mic Error!", &e.to_string(), Severity::Error);
                reporter.publish(&format!("ERROR: microphone unavailable ({})", e));
                println!();
                println!("Use --list to see available devices, or --synthetic to run without one.");
                return Ok(());
            }
            reporter.present("Mic Ready", &source.describe(), Severity::Success);
            Box::new(source)
        }
    };

    let classifier = HeuristicClassifier::new();
    reporter.present("Model Ready", classifier.name(), Severity::Info);
    reporter.present(
        "Window",
        &format!(
            "{} samples, {:.1}s",
            config.window_samples(),
            config.window_secs as f32
        ),
        Severity::Info,
    );
    reporter.present(
        "Starting Tests",
        &format!("{} signal types to test", SignalKind::SEQUENCE.len()),
        Severity::Info,
    );
    reporter.publish("System ready - starting classification tests");

    let mut driver = CycleDriver::new(
        config.window_samples(),
        producer,
        Box::new(classifier),
        reporter,
        Some(watch),
    );

    // Ctrl+C clears the running flag; the driver finishes its current step
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .ok();

    info!(
        source = ?config.source,
        sample_rate = config.sample_rate,
        window_samples = config.window_samples(),
        "Starting test cycles"
    );
    println!("Running test cycles. Press Ctrl+C to stop.");
    println!();

    driver.run(&running);

    println!();
    println!("Stopping...");
    if driver.is_halted() {
        error!("Driver halted on allocation failure");
    }
    println!("Done.");

    Ok(())
}
