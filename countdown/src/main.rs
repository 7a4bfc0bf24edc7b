use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Local, TimeDelta};
use clap::Parser;
use countdown::app::CountdownApp;
use countdown::clock::{Clock, SystemClock};
use countdown::countdown::{TargetInstant, TickOutcome, evaluate};
use countdown::settings::{CountdownSettings, SettingsStore};
use countdown::sound::SoundBank;
use countdown::timezone::{detect_timezone_name, timezone_label};
use countdown::widget::{CountdownWidget, WidgetOptions};
use engine::app::{AppConfig, run_app};
use engine::surface::SurfaceSize;
use winit::dpi::PhysicalSize;

#[derive(Debug, Parser)]
#[command(name = "countdown")]
#[command(about = "Flip-clock countdown to the new year, with fireworks at midnight")]
struct Cli {
    /// Settings file (default: $COUNTDOWN_SETTINGS_PATH or the user config dir).
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Count down this many seconds from now instead of to January 1.
    #[arg(long = "in", value_name = "SECS")]
    in_secs: Option<u64>,
    #[arg(long, value_name = "SECS")]
    celebration_secs: Option<u64>,
    #[arg(long, default_value_t = false)]
    mute: bool,
    /// Print the remaining time once and exit.
    #[arg(long, default_value_t = false)]
    print: bool,
    /// Print the effective settings as JSON and exit.
    #[arg(long, default_value_t = false)]
    dump_settings: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let store = match &cli.settings {
        Some(path) => SettingsStore::new(path),
        None => SettingsStore::from_env(),
    };
    let mut settings = store.load();
    apply_overrides(&mut settings, &cli);

    if cli.dump_settings {
        let text = serde_json::to_string_pretty(&settings).context("serializing settings")?;
        println!("{text}");
        return Ok(());
    }

    let timezone = detect_timezone_name(settings.display.timezone_label.as_deref());
    let clock = SystemClock;
    let now = clock.wall();
    let target = cli
        .in_secs
        .map(|secs| demo_target(now, secs))
        .transpose()?;

    if cli.print {
        let report = match target {
            Some(at) => format_report(now, &TargetInstant::at(at), true, &timezone),
            None => format_report(now, &TargetInstant::new_year_after(now)?, false, &timezone),
        };
        println!("{report}");
        return Ok(());
    }

    let size = SurfaceSize::new(settings.display.window_width, settings.display.window_height);
    let options = WidgetOptions {
        target,
        seed: rand::random(),
        ..WidgetOptions::from_settings(&settings, timezone)
    };
    let widget = CountdownWidget::new(clock, options, size)?;
    let sounds = SoundBank::open(
        &settings.fireworks.sounds,
        settings.audio.effective_sfx_gain(),
        rand::random(),
    );

    let config = AppConfig {
        title: String::from("New Year Countdown"),
        desired_size: PhysicalSize::new(size.width, size.height),
        clamp_to_monitor: true,
        vsync: vsync_from_env(),
        target_fps: 60,
    };
    run_app(config, CountdownApp::new(widget, sounds)).map_err(|err| anyhow!("{err}"))
}

fn apply_overrides(settings: &mut CountdownSettings, cli: &Cli) {
    if let Some(secs) = cli.celebration_secs {
        settings.celebration.duration = Duration::from_secs(secs);
    }
    if cli.mute {
        settings.audio.mute = true;
    }
    *settings = settings.clone().sanitized();
}

fn vsync_from_env() -> Option<bool> {
    let value = std::env::var("COUNTDOWN_VSYNC").ok()?;
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" => Some(true),
        "0" | "false" | "off" => Some(false),
        other => {
            log::warn!("ignoring COUNTDOWN_VSYNC={other}");
            None
        }
    }
}

/// Target for `--in SECS`.
fn demo_target(now: DateTime<Local>, secs: u64) -> Result<DateTime<Local>> {
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|delta| now.checked_add_signed(delta))
        .ok_or_else(|| anyhow!("--in {secs} is out of range"))
}

/// One-shot text for `--print`. Demo targets name the exact instant instead of the year.
fn format_report(
    now: DateTime<Local>,
    target: &TargetInstant,
    demo: bool,
    timezone: &str,
) -> String {
    let until = if demo {
        target.instant().format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        target.year().to_string()
    };
    let status = match evaluate(now, target) {
        TickOutcome::Running(remaining) => {
            let fields = remaining.fields();
            let parts: Vec<String> = fields
                .iter()
                .map(|(field, value)| format!("{value} {}", field.caption()))
                .collect();
            format!("{} UNTIL {until}", parts.join(" "))
        }
        TickOutcome::Expired => format!("HAPPY NEW YEAR {}!", target.year()),
    };
    format!("{status}\n{}", timezone_label(timezone))
}
