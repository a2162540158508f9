use std::io::Write;
use std::time::Duration;

use clap::Args;
use mindfulness_core::breathing::format_mmss;
use mindfulness_core::{
    BreathingConfig, BreathingController, Config, Preset, SessionSnapshot, SimulatedClock,
    TickOrder, UiConfig,
};

use crate::render;

#[derive(Args)]
pub struct BreatheArgs {
    /// Session length in seconds
    #[arg(long, conflicts_with = "preset")]
    duration: Option<u64>,
    /// One of the configured preset lengths, in seconds (see --list-presets)
    #[arg(long)]
    preset: Option<u64>,
    /// List the configured presets and exit
    #[arg(long, conflicts_with_all = ["duration", "preset"])]
    list_presets: bool,
    /// Run on a virtual clock and print one frame per second
    #[arg(long)]
    simulate: bool,
    /// Print only the final session state as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: BreatheArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    if args.list_presets {
        list_presets(&config.breathing);
        return Ok(());
    }
    let duration = match (args.duration, args.preset) {
        (Some(secs), _) => secs,
        (None, Some(secs)) => config.breathing.preset(secs)?,
        (None, None) => config.breathing.default_duration_secs,
    };
    tracing::debug!(duration, simulate = args.simulate, "starting breathing session");

    let last = if args.simulate {
        run_simulated(duration, &config.ui, args.json)?
    } else {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;
        runtime.block_on(run_live(duration, args.preset.is_some(), &config, args.json))?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&last)?);
    } else {
        println!("{}", last.phase_label);
    }
    Ok(())
}

fn list_presets(config: &BreathingConfig) {
    for &secs in &config.presets {
        let label = Preset::from_secs(secs)
            .map_or_else(|| format_mmss(secs), |preset| preset.label().to_string());
        println!("{secs:>6}  {label}");
    }
}

fn run_simulated(
    duration: u64,
    ui: &UiConfig,
    quiet: bool,
) -> Result<SessionSnapshot, Box<dyn std::error::Error>> {
    let mut clock = SimulatedClock::start(duration, TickOrder::default())?;
    if !quiet {
        println!("{}", render::frame(&clock.session().snapshot(), ui));
    }
    while clock.is_running() {
        clock.advance(Duration::from_secs(1));
        if !quiet {
            println!("{}", render::frame(&clock.session().snapshot(), ui));
        }
    }
    Ok(clock.session().snapshot())
}

async fn run_live(
    duration: u64,
    from_preset: bool,
    config: &Config,
    quiet: bool,
) -> Result<SessionSnapshot, Box<dyn std::error::Error>> {
    let mut controller = BreathingController::new(config.breathing.clone())?;
    let mut frames = controller.subscribe();
    if from_preset {
        controller.start_preset(duration)?;
    } else {
        controller.start(duration)?;
    }

    let mut stdout = std::io::stdout();
    loop {
        let snap = frames.borrow_and_update().clone();
        if !quiet {
            write!(stdout, "\r{}\x1b[K", render::frame(&snap, &config.ui))?;
            stdout.flush()?;
        }
        if !snap.is_active {
            if !quiet {
                writeln!(stdout)?;
            }
            return Ok(snap);
        }
        if frames.changed().await.is_err() {
            return Ok(controller.snapshot());
        }
    }
}
