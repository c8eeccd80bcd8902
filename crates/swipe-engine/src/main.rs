use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use swipe_engine::config::EngineConfig;
use swipe_engine::gesture::{classify, MotionSample};
use swipe_engine::test_harness::{run_simulator, CatalogConfig, SimulatorConfig};
use swipe_engine::types::Vec2;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("swipe-sim")
        .version(swipe_engine::VERSION)
        .about("Swipe preference engine simulator and tooling")
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .global(true)
                .default_value("text")
                .value_parser(["text", "json"])
                .help("Log output format"),
        )
        .subcommand(
            Command::new("simulate")
                .about("Run seeded swipe sessions against an in-memory catalog")
                .arg(
                    Arg::new("sessions")
                        .long("sessions")
                        .default_value("20")
                        .value_parser(value_parser!(u64))
                        .help("Number of sessions to simulate"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .default_value("42")
                        .value_parser(value_parser!(u64))
                        .help("Random seed for reproducibility"),
                )
                .arg(
                    Arg::new("catalog-size")
                        .long("catalog-size")
                        .default_value("120")
                        .value_parser(value_parser!(usize))
                        .help("Products in the simulated catalog"),
                )
                .arg(
                    Arg::new("fetch-failure-rate")
                        .long("fetch-failure-rate")
                        .default_value("0.05")
                        .value_parser(value_parser!(f64))
                        .help("Probability that a candidate fetch fails"),
                )
                .arg(
                    Arg::new("record-failure-rate")
                        .long("record-failure-rate")
                        .default_value("0.02")
                        .value_parser(value_parser!(f64))
                        .help("Probability that recording a decision fails"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("Engine configuration (TOML)"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("classify")
                .about("Classify a single motion sample")
                .arg(coordinate("dx", "Horizontal offset (px)"))
                .arg(coordinate("dy", "Vertical offset (px), negative is up"))
                .arg(coordinate("vx", "Horizontal velocity (px/s)"))
                .arg(coordinate("vy", "Vertical velocity (px/s)"))
                .arg(
                    Arg::new("elapsed")
                        .long("elapsed")
                        .default_value("200")
                        .value_parser(value_parser!(u64))
                        .help("Gesture duration (ms)"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("Engine configuration (TOML)"),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Print the default configuration, or validate a file")
                .arg(
                    Arg::new("check")
                        .long("check")
                        .value_parser(value_parser!(PathBuf))
                        .help("Validate this configuration file"),
                ),
        )
}

fn coordinate(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .default_value("0")
        .allow_negative_numbers(true)
        .value_parser(value_parser!(f64))
        .help(help)
}

fn init_tracing(format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(args: &ArgMatches) -> Result<EngineConfig> {
    match args.get_one::<PathBuf>("config") {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn arg<T: Clone + Send + Sync + 'static>(args: &ArgMatches, name: &str) -> Result<T> {
    args.get_one::<T>(name)
        .cloned()
        .with_context(|| format!("missing argument --{name}"))
}

async fn simulate(args: &ArgMatches) -> Result<bool> {
    let config = SimulatorConfig {
        seed: arg(args, "seed")?,
        sessions: arg(args, "sessions")?,
        engine: load_config(args)?,
        catalog: CatalogConfig {
            size: arg(args, "catalog-size")?,
            fetch_failure_rate: arg(args, "fetch-failure-rate")?,
            record_failure_rate: arg(args, "record-failure-rate")?,
            ..CatalogConfig::default()
        },
        ..SimulatorConfig::default()
    };

    let report = run_simulator(config).await.context("simulation aborted")?;
    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.generate_text());
    }
    Ok(report.passed())
}

fn classify_sample(args: &ArgMatches) -> Result<()> {
    let config = load_config(args)?;
    let sample = MotionSample::new(
        Vec2::new(arg(args, "dx")?, arg(args, "dy")?),
        Vec2::new(arg(args, "vx")?, arg(args, "vy")?),
        arg(args, "elapsed")?,
    );
    let gesture = classify(&sample, &config.thresholds());
    println!("{}", serde_json::to_string_pretty(&gesture)?);
    Ok(())
}

fn config_command(args: &ArgMatches) -> Result<()> {
    match args.get_one::<PathBuf>("check") {
        Some(path) => {
            EngineConfig::load(path)
                .with_context(|| format!("invalid configuration {}", path.display()))?;
            println!("{}: ok", path.display());
        }
        None => print!("{}", EngineConfig::default().to_toml_string()?),
    }
    Ok(())
}

// Single-threaded: the catalog draws from one seeded rng in task order.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    let log_format = matches
        .get_one::<String>("log-format")
        .map_or("text", String::as_str);
    init_tracing(log_format);

    match matches.subcommand() {
        Some(("simulate", args)) => {
            let passed = simulate(args).await?;
            std::process::exit(if passed { 0 } else { 1 });
        }
        Some(("classify", args)) => classify_sample(args),
        Some(("config", args)) => config_command(args),
        _ => {
            cli().print_help()?;
            Ok(())
        }
    }
}
