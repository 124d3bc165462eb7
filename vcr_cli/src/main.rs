use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use vcr_core::catalog::{d_prime_presets, test_definition};
use vcr_core::curve::{DEFAULT_MAX_TIME, DEFAULT_MIN_TIME, DEFAULT_POINTS};
use vcr_core::format::*;
use vcr_core::validation::{self, check_realistic_pace, parse_field, PaceCheck};
use vcr_core::*;

#[derive(Parser)]
#[command(name = "vcr")]
#[command(about = "Critical velocity calculator for runners", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use a config file other than $XDG_CONFIG_HOME/vcr/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate CV from a test result, with zones and race predictions
    Cv(CvArgs),

    /// Training zones for a known CV
    Zones {
        /// Critical velocity in m/s
        #[arg(long)]
        cv: f64,

        /// D' in meters (required for race prediction-based zones)
        #[arg(long)]
        d_prime: Option<f64>,

        /// Zone system (offset-based, race-prediction-based)
        #[arg(long)]
        zones: Option<ZoneSystem>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Race time predictions for a known CV and D'
    Predict {
        /// Critical velocity in m/s
        #[arg(long)]
        cv: f64,

        /// D' in meters
        #[arg(long)]
        d_prime: f64,

        /// Treat D' as an estimate and show confidence ranges
        #[arg(long)]
        estimated: bool,

        /// Include every race distance, not just the common ones
        #[arg(long)]
        all_races: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Velocity/duration curve for a known CV and D'
    Curve {
        /// Critical velocity in m/s
        #[arg(long)]
        cv: f64,

        /// D' in meters
        #[arg(long)]
        d_prime: f64,

        /// Shortest duration (seconds, MM:SS or HH:MM:SS)
        #[arg(long, value_parser = parse_time_arg)]
        min_time: Option<f64>,

        /// Longest duration (seconds, MM:SS or HH:MM:SS)
        #[arg(long, value_parser = parse_time_arg)]
        max_time: Option<f64>,

        /// Number of samples
        #[arg(long, default_value_t = DEFAULT_POINTS)]
        points: usize,

        /// Write CSV to stdout
        #[arg(long)]
        csv: bool,
    },

    /// List test protocols and D' presets
    Tests,

    /// Show or create the configuration file
    Config {
        /// Write a default config file
        #[arg(long)]
        init: bool,

        /// Overwrite an existing file with --init
        #[arg(long, requires = "init")]
        force: bool,
    },
}

#[derive(Args)]
struct CvArgs {
    /// Test protocol (cooper, 30min, 45min, 60min, 2point)
    #[arg(long)]
    test: TestProtocol,

    /// Distance covered in meters (fixed-duration tests)
    #[arg(long)]
    distance: Option<String>,

    /// First effort distance in meters (2point)
    #[arg(long)]
    d1: Option<String>,

    /// First effort time (2point; seconds, MM:SS or HH:MM:SS)
    #[arg(long)]
    t1: Option<String>,

    /// Second effort distance in meters (2point)
    #[arg(long)]
    d2: Option<String>,

    /// Second effort time (2point; seconds, MM:SS or HH:MM:SS)
    #[arg(long)]
    t2: Option<String>,

    /// Custom D' in meters
    #[arg(long, conflicts_with = "preset")]
    d_prime: Option<f64>,

    /// D' preset (conservative, recreational, standard, trained, elite)
    #[arg(long)]
    preset: Option<DPrimePreset>,

    /// Skip the confirmation prompt for unusual paces
    #[arg(long, short = 'y')]
    yes: bool,

    /// Zone system (offset-based, race-prediction-based)
    #[arg(long)]
    zones: Option<ZoneSystem>,

    /// Base zones and predictions on raw or adjusted CV
    #[arg(long)]
    mode: Option<CvMode>,

    /// Include every race distance, not just the common ones
    #[arg(long)]
    all_races: bool,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct OutputArgs {
    /// Display units (metric, imperial)
    #[arg(long)]
    units: Option<UnitSystem>,

    /// Print JSON instead of tables
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct CvReport<'a> {
    result: &'a CvResult,
    cv_mode: CvMode,
    zone_system: ZoneSystem,
    zones: &'a [Zone],
    races: &'a [RaceResult],
}

fn main() {
    if let Err(error) = run() {
        match error {
            Error::Validation(report) => {
                eprintln!("Invalid input:");
                for field_error in report.errors.values() {
                    eprintln!("  {}", field_error);
                }
            }
            other => eprintln!("Error: {}", other),
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    vcr_core::logging::init_with_level(vcr_core::logging::level_for_verbosity(cli.verbose));

    if let Commands::Config { init, force } = cli.command {
        let path = cli.config.unwrap_or_else(Config::default_config_path);
        return cmd_config(&path, init, force);
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    tracing::debug!("Using {:?}", config);

    match cli.command {
        Commands::Cv(args) => cmd_cv(args, &config),
        Commands::Zones {
            cv,
            d_prime,
            zones,
            output,
        } => cmd_zones(cv, d_prime, zones, output, &config),
        Commands::Predict {
            cv,
            d_prime,
            estimated,
            all_races,
            output,
        } => cmd_predict(cv, d_prime, estimated, all_races, output, &config),
        Commands::Curve {
            cv,
            d_prime,
            min_time,
            max_time,
            points,
            csv: as_csv,
        } => cmd_curve(cv, d_prime, min_time, max_time, points, as_csv),
        Commands::Tests => {
            display_tests();
            Ok(())
        }
        Commands::Config { .. } => Ok(()),
    }
}

fn parse_time_arg(raw: &str) -> std::result::Result<f64, String> {
    if raw.contains(':') {
        parse_time_with_hours_to_seconds(raw).map_err(|e| e.to_string())
    } else {
        raw.trim()
            .parse::<f64>()
            .map_err(|_| format!("invalid time: {}", raw))
    }
}

fn read_test_input(args: &CvArgs) -> Result<TestInput> {
    let mut report = ValidationReport::default();
    let mut field = |name: &str, label: &str, raw: &Option<String>| {
        parse_field(name, label, raw.as_deref()).unwrap_or_else(|e| {
            report.push(e);
            f64::NAN
        })
    };

    let input = match args.test {
        TestProtocol::FixedDuration(test) => TestInput::FixedDuration {
            test,
            distance_m: field("distance", "Distance", &args.distance),
        },
        TestProtocol::TwoPoint => TestInput::TwoPoint {
            distance1: field("distance1", "Distance 1", &args.d1),
            time1: field("time1", "Time 1", &args.t1),
            distance2: field("distance2", "Distance 2", &args.d2),
            time2: field("time2", "Time 2", &args.t2),
        },
    };

    Ok(report.into_result(input)?)
}

fn cmd_cv(args: CvArgs, config: &Config) -> Result<()> {
    let params = config.model_params();

    let input = read_test_input(&args)?;
    validation::validate_test_input(&input).into_result(())?;

    for check in pace_checks(&input) {
        if let Some(ref warning) = check.warning {
            eprintln!("⚠ {}", warning);
            if !confirm(args.yes)? {
                return Err(Error::Other("Calculation cancelled".into()));
            }
        }
    }

    let choice = match (args.d_prime, args.preset) {
        (Some(meters), _) => DPrimeChoice::Custom(meters),
        (None, Some(preset)) => DPrimeChoice::Preset(preset),
        (None, None) => DPrimeChoice::Recommended,
    };

    let result = calculate_cv(&input, choice, &params)?;

    let mode = args.mode.unwrap_or(config.display.cv_mode);
    let system = args.zones.unwrap_or(config.display.zone_system);
    let units = args.output.units.unwrap_or(config.display.units);
    let typical_only = !args.all_races && config.display.typical_races_only;
    let critical_speed = result.velocity(mode);

    let zones = calculate_training_zones(critical_speed, system, Some(result.d_prime), &params)?;
    let races = predict_all_races(
        critical_speed,
        result.d_prime,
        result.d_prime_estimated,
        typical_only,
        params.d_prime_uncertainty,
    )?;

    if args.output.json {
        let report = CvReport {
            result: &result,
            cv_mode: mode,
            zone_system: system,
            zones: &zones,
            races: &races,
        };
        return print_json(&report);
    }

    display_cv_result(&result, mode, units);
    display_zones(&zones, system, units);
    display_predictions(&races, units, params.d_prime_uncertainty);
    Ok(())
}

fn cmd_zones(
    cv: f64,
    d_prime: Option<f64>,
    system: Option<ZoneSystem>,
    output: OutputArgs,
    config: &Config,
) -> Result<()> {
    let system = system.unwrap_or(config.display.zone_system);
    let units = output.units.unwrap_or(config.display.units);

    let zones = calculate_training_zones(cv, system, d_prime, &config.model_params())?;

    if output.json {
        return print_json(&zones);
    }
    display_zones(&zones, system, units);
    Ok(())
}

fn cmd_predict(
    cv: f64,
    d_prime: f64,
    estimated: bool,
    all_races: bool,
    output: OutputArgs,
    config: &Config,
) -> Result<()> {
    let units = output.units.unwrap_or(config.display.units);
    let typical_only = !all_races && config.display.typical_races_only;
    let uncertainty = config.model.d_prime_uncertainty;

    let races = predict_all_races(cv, d_prime, estimated, typical_only, uncertainty)?;

    if output.json {
        return print_json(&races);
    }
    display_predictions(&races, units, uncertainty);
    Ok(())
}

fn cmd_curve(
    cv: f64,
    d_prime: f64,
    min_time: Option<f64>,
    max_time: Option<f64>,
    points: usize,
    as_csv: bool,
) -> Result<()> {
    let curve = generate_hyperbolic_curve(
        cv,
        d_prime,
        min_time.unwrap_or(DEFAULT_MIN_TIME),
        max_time.unwrap_or(DEFAULT_MAX_TIME),
        points,
    )?;

    if as_csv {
        let mut writer = csv::Writer::from_writer(io::stdout());
        for point in curve {
            writer
                .serialize(point)
                .map_err(|e| Error::Other(format!("Failed to write CSV: {}", e)))?;
        }
        writer.flush()?;
        return Ok(());
    }

    let annotations = curve.annotations();
    println!(
        "  CV {}, D' {:.0} m",
        format_velocity(curve.critical_speed(), 2),
        curve.d_prime()
    );
    println!("  {:>8}  {:>10}  {:>9}", "Time", "Distance", "Velocity");
    for point in curve {
        println!(
            "  {:>8}  {:>8.0} m  {:>9}",
            format_time_with_hours(point.time_seconds),
            point.distance_m,
            format_velocity(point.velocity_ms, 3)
        );
    }

    if !annotations.is_empty() {
        println!();
        for point in annotations {
            println!(
                "  {} all-out: {:.0} m at {}",
                format_time_with_hours(point.time_seconds),
                point.distance_m,
                format_velocity(point.velocity_ms, 2)
            );
        }
    }
    Ok(())
}

fn cmd_config(path: &Path, init: bool, force: bool) -> Result<()> {
    if !init {
        println!("Config file: {}", path.display());
        let config = if path.exists() {
            Config::load_from(path)?
        } else {
            println!("  (not found, showing defaults)");
            Config::default()
        };
        let params = config.model_params();
        println!("  D' uncertainty:   ±{} m", params.d_prime_uncertainty);
        println!("  Riegel exponent:  {}", params.riegel_fatigue_factor);
        println!("  Riegel reference: {} s", params.riegel_reference_seconds);
        println!("  Custom D' range:  {}-{} m", params.d_prime_min, params.d_prime_max);
        println!("  Units:            {}", config.display.units);
        println!("  Zone system:      {}", config.display.zone_system);
        return Ok(());
    }

    if path.exists() && !force {
        return Err(Error::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    Config::default().save_to(path)?;
    println!("✓ Wrote default config to {}", path.display());
    Ok(())
}

fn pace_checks(input: &TestInput) -> Vec<PaceCheck> {
    match *input {
        TestInput::FixedDuration { test, distance_m } => {
            vec![check_realistic_pace(distance_m, test.duration_seconds())]
        }
        TestInput::TwoPoint {
            distance1,
            time1,
            distance2,
            time2,
        } => vec![
            check_realistic_pace(distance1, time1),
            check_realistic_pace(distance2, time2),
        ],
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| Error::Other(format!("Failed to serialize output: {}", e)))?;
    println!("{}", json);
    Ok(())
}

fn protocol_name(protocol: TestProtocol) -> &'static str {
    match protocol {
        TestProtocol::FixedDuration(test) => test_definition(test).name,
        TestProtocol::TwoPoint => "Two-Point Test",
    }
}

fn pace_for(units: UnitSystem, per_km: f64, per_mile: f64) -> f64 {
    match units {
        UnitSystem::Metric => per_km,
        UnitSystem::Imperial => per_mile,
    }
}

fn display_cv_result(result: &CvResult, mode: CvMode, units: UnitSystem) {
    let selected = result.velocity(mode);

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  CRITICAL VELOCITY");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  {}", protocol_name(result.protocol));
    println!(
        "  CV:        {}  ({})",
        format_velocity(selected, 2),
        format_pace(units.pace_from_velocity(selected), units)
    );
    println!(
        "  Raw:       {}  ({})",
        format_velocity(result.velocity_ms_raw, 2),
        format_pace(units.pace_from_velocity(result.velocity_ms_raw), units)
    );
    println!(
        "  Adjusted:  {}  ({})",
        format_velocity(result.velocity_ms, 2),
        format_pace(units.pace_from_velocity(result.velocity_ms), units)
    );
    println!(
        "  D':        {:.0} m ({})",
        result.d_prime,
        if result.d_prime_estimated { "estimated" } else { "measured" }
    );
    println!("  Adjusted distance: {:.0} m", result.adjusted_distance);
    println!();
}

fn display_zones(zones: &[Zone], system: ZoneSystem, units: UnitSystem) {
    println!("  Training Zones ({})", system.name());
    println!("  {}", system.description());
    println!("  ─────────────────────────────────────────");
    for zone in zones {
        let pace_min = pace_for(units, zone.pace_min_sec_per_km, zone.pace_min_sec_per_mile);
        let pace_max = pace_for(units, zone.pace_max_sec_per_km, zone.pace_max_sec_per_mile);
        let anchors = zone
            .race_anchors
            .map(|(slow, fast)| format!("  ({} → {})", slow, fast))
            .unwrap_or_default();
        println!(
            "  Z{}  {:<16} {:<22} {:.2}-{:.2} m/s{}",
            zone.number,
            zone.name,
            format_pace_range(pace_min, pace_max, units),
            zone.velocity_min,
            zone.velocity_max,
            anchors
        );
    }
    println!();
}

fn display_predictions(races: &[RaceResult], units: UnitSystem, uncertainty: f64) {
    println!("  Race Predictions");
    println!("  ─────────────────────────────────────────");
    if races.is_empty() {
        println!("  No race distance exceeds D'");
    }
    for result in races {
        let best = &result.prediction.best;
        let range = match (&result.prediction.min, &result.prediction.max) {
            (Some(min), Some(max)) => format!(
                "  [{} - {}]",
                format_time_with_hours(min.time_seconds),
                format_time_with_hours(max.time_seconds)
            ),
            (None, Some(max)) => format!("  [up to {}]", format_time_with_hours(max.time_seconds)),
            _ => String::new(),
        };
        println!(
            "  {:<14} {:>6.2} {}  {:>8}  {}{}",
            result.race.name,
            units.distance_from_meters(result.race.distance_m),
            units.distance_label(),
            format_time_with_hours(best.time_seconds),
            format_pace(pace_for(units, best.pace_sec_per_km, best.pace_sec_per_mile), units),
            range
        );
    }
    if races.iter().any(|r| r.prediction.is_d_prime_estimated) {
        println!();
        println!("  D' is estimated: ranges assume ±{:.0} m", uncertainty);
    }
    println!();
}

fn display_tests() {
    println!("Test protocols:");
    for test in FixedDurationTest::ALL {
        let def = test_definition(test);
        println!(
            "  {:<7} {} ({}-{} m, D' {:.0} m)",
            test.id(),
            def.name,
            def.distance_bounds.min,
            def.distance_bounds.max,
            def.recommended_preset.meters()
        );
        println!("          {}. Accuracy: {}", def.description, def.accuracy);
    }
    println!("  {:<7} Two-Point Test (two maximal efforts, D' measured)", "2point");
    println!();
    println!("D' presets:");
    for info in d_prime_presets() {
        println!("  {:<13} {:<20} {}", info.preset.id(), info.label, info.description);
    }
}

fn confirm(assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        eprintln!("Not an interactive terminal; re-run with --yes to continue.");
        return Ok(false);
    }

    print!("Continue anyway? [y/N] ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}
