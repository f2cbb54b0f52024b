use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use roster_scheduler::config::EngineConfig;
use roster_scheduler::display::{print_schedule, write_schedule_to_file, write_status_to_file};
use roster_scheduler::export::{export_schedule_csv, export_schedule_json, load_seed_history};
use roster_scheduler::roster::{load_preachers, load_rotation, load_team, parse_date};
use roster_scheduler::schedule::{sundays_between, ScheduleBuilder, ScheduleInput, StatusBoard};
use roster_scheduler::web;

#[derive(Parser)]
#[command(author, version, about = "Sunday ministry roster scheduler")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a schedule from JSON inputs and write the reports
    Build {
        /// Team roster (JSON array of people)
        #[arg(long)]
        team: PathBuf,

        /// Preaching schedule (JSON array of preachers)
        #[arg(long)]
        preaching: Option<PathBuf>,

        /// Worship leader rotation (JSON array of names)
        #[arg(long)]
        rotation: Option<PathBuf>,

        /// First day of the run, YYYY-MM-DD
        #[arg(long)]
        start: String,

        /// Last day of the run, YYYY-MM-DD
        #[arg(long)]
        end: String,

        /// Engine configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Seed for a reproducible run; overrides the config file
        #[arg(long)]
        seed: Option<u64>,

        /// Earlier schedule grids (CSV) used as seed history
        #[arg(long)]
        history: Vec<PathBuf>,

        /// Directory for schedule.txt, schedule.csv and schedule.json
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Also write status.txt with every person's status on each Sunday
        #[arg(long)]
        status: bool,
    },
    /// Serve the schedule API
    Serve {
        #[arg(short, long, default_value_t = 8080)]
        port: u16,

        /// Defaults to the ADMIN_PASSWORD environment variable
        #[arg(long)]
        admin_password: Option<String>,

        /// Engine configuration used when a request carries none
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path).with_context(|| format!("failed to read config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Build {
            team,
            preaching,
            rotation,
            start,
            end,
            config,
            seed,
            history,
            out_dir,
            status,
        } => {
            let mut config = load_config(config.as_ref())?;
            if seed.is_some() {
                config.seed = seed;
            }

            let start = parse_date(&start).context("bad --start")?;
            let end = parse_date(&end).context("bad --end")?;
            let calendar = sundays_between(start, end);
            if calendar.is_empty() {
                bail!("no Sundays between {start} and {end}");
            }

            let mut seed_history = Vec::new();
            for path in &history {
                seed_history.extend(
                    load_seed_history(path).with_context(|| format!("failed to read history {}", path.display()))?,
                );
            }

            let input = ScheduleInput {
                roster: load_team(&team).with_context(|| format!("failed to read team {}", team.display()))?,
                calendar,
                preachers: match &preaching {
                    Some(path) => load_preachers(path).context("failed to read preaching schedule")?,
                    None => Vec::new(),
                },
                rotation: match &rotation {
                    Some(path) => load_rotation(path).context("failed to read rotation")?,
                    None => Vec::new(),
                },
                seed_history,
            };

            let outcome = ScheduleBuilder::new(config.clone()).build(&input)?;
            print_schedule(&outcome);

            fs::create_dir_all(&out_dir).with_context(|| format!("failed to create {}", out_dir.display()))?;
            write_schedule_to_file(&outcome, out_dir.join("schedule.txt"))?;
            export_schedule_csv(&outcome, out_dir.join("schedule.csv"))?;
            export_schedule_json(&outcome, out_dir.join("schedule.json"))?;
            if status {
                let board = StatusBoard::new(&input, &config, &outcome)?;
                write_status_to_file(&board, &input.calendar, out_dir.join("status.txt"))?;
            }
            info!(dir = %out_dir.display(), "schedule written");
        }
        Command::Serve { port, admin_password, config } => {
            let config = load_config(config.as_ref())?;
            let password = match admin_password.or_else(|| std::env::var("ADMIN_PASSWORD").ok()) {
                Some(password) if !password.is_empty() => password,
                _ => bail!("set --admin-password or ADMIN_PASSWORD"),
            };
            println!("Access the API at http://localhost:{port}/api/schedule");
            web::start_server(port, config, password).await?;
        }
    }

    Ok(())
}
