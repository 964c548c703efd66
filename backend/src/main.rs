use anyhow::{Result, bail};
use bootline::chart::{self, ChartState};
use bootline::collect::{self, SnapshotSource, SystemctlSource, TimestampSource};
use bootline::config::load_config;
use bootline::render::Renderer;
use clap::{Parser, Subcommand};
use log::info;
use shared::{Actor, BootMilestones, BootlineConfig, DurationUs, Event, Rgb, TimeUs, Timeline, build_timeline};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bootline")]
#[command(about = "Boot-sequence timeline charts from systemd unit timestamps")]
struct Cli {
    /// Configuration file (default: <config dir>/bootline/bootline.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the current (or a recorded) boot as an SVG chart
    Plot {
        #[arg(long, short, default_value = "bootline.svg")]
        output: PathBuf,

        /// Read timestamps from a JSON snapshot instead of systemctl
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Heading text (default: the startup summary)
        #[arg(long)]
        heading: Option<String>,
    },
    /// Record the current boot's timestamps as JSON
    Snapshot {
        #[arg(long, short, default_value = "bootline.json")]
        output: PathBuf,
    },
    /// Edit a chart file in place
    Chart {
        path: PathBuf,

        #[command(subcommand)]
        action: ChartAction,
    },
}

#[derive(Subcommand)]
enum ChartAction {
    /// Write an empty chart
    Create {
        #[arg(long)]
        heading: Option<String>,
    },
    /// Append a lane
    AddActor {
        name: String,

        #[arg(long)]
        tooltip: Option<String>,
    },
    /// Append an event to an existing lane
    AddEvent {
        actor: String,

        /// Microseconds from kernel start
        #[arg(allow_negative_numbers = true)]
        start: i64,

        /// Length in microseconds
        duration: Option<u64>,

        /// Run to the right edge of the chart
        #[arg(long, conflicts_with = "duration")]
        endless: bool,

        /// `#rrggbb` or `r,g,b`
        #[arg(long)]
        color: Option<Rgb>,

        #[arg(long)]
        tooltip: Option<String>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Plot {
            output,
            snapshot,
            heading,
        } => plot(&config, output, snapshot, heading),
        Commands::Snapshot { output } => {
            let record = SystemctlSource::new(&config.collect).collect()?;
            collect::save_snapshot(&output, &record)?;
            info!("Wrote {} units to {}", record.units.len(), output.display());
            Ok(())
        }
        Commands::Chart { path, action } => edit_chart(&config, path, action),
    }
}

fn plot(config: &BootlineConfig, output: PathBuf, snapshot: Option<PathBuf>, heading: Option<String>) -> Result<()> {
    let record = match snapshot {
        Some(path) => SnapshotSource::new(path).collect()?,
        None => SystemctlSource::new(&config.collect).collect()?,
    };
    let timeline = build_timeline(&record, &config.colors)?;

    let mut render = config.render.clone();
    if let Some(heading) = heading {
        render.heading = heading;
    } else if render.heading.is_empty() {
        let milestones = BootMilestones::from_raw(&record)?;
        render.heading = milestones.summary(TimeUs(record.default_target_reached));
    }

    Renderer::new(render, config.overlay.clone()).save(&output, &timeline)?;
    info!("Wrote {} lanes to {}", timeline.len(), output.display());
    Ok(())
}

fn edit_chart(config: &BootlineConfig, path: PathBuf, action: ChartAction) -> Result<()> {
    let state = match action {
        ChartAction::Create { heading } => {
            let mut render = config.render.clone();
            if let Some(heading) = heading {
                render.heading = heading;
            }
            ChartState {
                render,
                overlay: config.overlay.clone(),
                timeline: Timeline::new(),
            }
        }
        ChartAction::AddActor { name, tooltip } => {
            let mut state = chart::open(&path)?;
            let mut actor = Actor::new(name);
            actor.tooltip = tooltip;
            state.timeline.register_actor(actor)?;
            state
        }
        ChartAction::AddEvent {
            actor,
            start,
            duration,
            endless,
            color,
            tooltip,
        } => {
            let color = color.unwrap_or(config.colors.active);
            let mut event = match (duration, endless) {
                (Some(duration), false) => Event::bounded(start, DurationUs(duration), color),
                (None, true) => Event::endless(start, color),
                _ => bail!("Give either a duration or --endless"),
            };
            event.tooltip = tooltip;

            let mut state = chart::open(&path)?;
            state.timeline.add_event(&actor, event)?;
            state
        }
    };

    chart::save(&path, &state)?;
    info!("Wrote {} ({} actors)", path.display(), state.timeline.len());
    Ok(())
}
