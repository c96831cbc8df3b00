//! lapdelta CLI - Debug tool for lap comparison and pace analysis
//!
//! Usage:
//!   lapdelta-cli compare <first.json> <second.json> [--json]
//!   lapdelta-cli pace <laps.json> <driver> [--keep-outliers] [--json]
//!   lapdelta-cli zones <trace.json> [--json]
//!   lapdelta-cli stints <laps.json> [driver] [--json]
//!   lapdelta-cli generate <folder>
//!
//! Traces are JSON arrays of telemetry samples, lap files are JSON arrays of
//! lap records. Human-readable summaries go to stdout unless `--json` is set.

use clap::{Parser, Subcommand};
use lapdelta::synthetic::{SyntheticCircuit, SyntheticRace};
use lapdelta::{
    AnalysisConfig, LapComparison, LapRecord, Side, TelemetrySample, clean_pace, compare_laps,
    extract_corners, extract_stints, extract_straights, extract_zones, fit_clean_degradation,
    laps_for_driver, tyre_stints,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "lapdelta-cli")]
#[command(about = "Debug tool for lap comparison and pace analysis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print machine-readable JSON instead of a summary
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two lap traces and show who is faster where
    Compare {
        /// Telemetry of the first lap
        first: PathBuf,

        /// Telemetry of the second lap
        second: PathBuf,

        /// Number of points on the shared distance grid
        #[arg(long, default_value = "500")]
        grid_size: usize,

        /// Speed delta (km/h) below which a point is a tie
        #[arg(long, default_value = "0.5")]
        tie_threshold: f64,
    },

    /// Clean a driver's lap pace and fit the degradation trend
    Pace {
        /// Lap records of the session
        laps: PathBuf,

        /// Driver code (e.g., "VER")
        driver: String,

        /// Keep laps slower than 107% of the median
        #[arg(long)]
        keep_outliers: bool,
    },

    /// Extract corners, straights and DRS zones from a lap trace
    Zones {
        /// Telemetry of the lap
        trace: PathBuf,
    },

    /// Show tyre stints of one driver, or of the whole session
    Stints {
        /// Lap records of the session
        laps: PathBuf,

        /// Driver code (e.g., "VER"); all drivers when omitted
        driver: Option<String>,
    },

    /// Write a synthetic session (two traces and a lap file) to a folder
    Generate {
        /// Output folder
        folder: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let result = match cli.command {
        Commands::Compare {
            first,
            second,
            grid_size,
            tie_threshold,
        } => {
            let config = AnalysisConfig {
                grid_size,
                tie_threshold,
                ..AnalysisConfig::default()
            };
            run_compare(&first, &second, &config, cli.json, cli.verbose)
        }
        Commands::Pace {
            laps,
            driver,
            keep_outliers,
        } => run_pace(&laps, &driver, !keep_outliers, cli.json),
        Commands::Zones { trace } => run_zones(&trace, cli.json),
        Commands::Stints { laps, driver } => run_stints(&laps, driver.as_deref(), cli.json),
        Commands::Generate { folder } => run_generate(&folder),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

// ============================================================================
// File I/O
// ============================================================================

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let file = File::open(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| format!("{}: {}", path.display(), e))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), String> {
    let file = File::create(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| e.to_string())?;
    writer.flush().map_err(|e| e.to_string())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{}", text);
    Ok(())
}

fn banner(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{}", title);
    println!("{}", "=".repeat(60));
}

// ============================================================================
// Commands
// ============================================================================

fn run_compare(
    first: &Path,
    second: &Path,
    config: &AnalysisConfig,
    json: bool,
    verbose: bool,
) -> Result<(), String> {
    let lap1: Vec<TelemetrySample> = load_json(first)?;
    let lap2: Vec<TelemetrySample> = load_json(second)?;
    let comparison = compare_laps(&lap1, &lap2, config).map_err(|e| e.to_string())?;

    if json {
        return print_json(&comparison);
    }

    banner("LAP COMPARISON");
    println!("  First:  {} ({} samples)", first.display(), lap1.len());
    println!("  Second: {} ({} samples)", second.display(), lap2.len());
    println!(
        "  Shared range: {:.1}m - {:.1}m ({} grid points)",
        comparison.resampled.lo,
        comparison.resampled.hi,
        comparison.resampled.len()
    );

    print_shares(&comparison);

    println!("\n{}", "-".repeat(60));
    println!("SEGMENTS: {}", comparison.segments.len());
    println!("{}", "-".repeat(60));
    for (i, seg) in comparison.segments.iter().enumerate() {
        println!(
            "  {:3}. {:>6} {:7.1}m - {:7.1}m  ({:6.1}m)  mean delta {:+6.2} km/h",
            i + 1,
            seg.side,
            seg.start_position,
            seg.end_position,
            seg.length(),
            seg.mean_delta
        );
        if verbose {
            println!("       grid indices {}..{}", seg.start, seg.end);
        }
    }
    Ok(())
}

fn print_shares(comparison: &LapComparison) {
    println!("\n  Distance share:");
    for side in [Side::First, Side::Second, Side::Tie] {
        println!("    {:>6}: {:5.1}%", side, comparison.share(side) * 100.0);
    }
}

fn run_pace(path: &Path, driver: &str, remove_outliers: bool, json: bool) -> Result<(), String> {
    let laps: Vec<LapRecord> = load_json(path)?;
    let driver_laps = laps_for_driver(&laps, driver);
    if driver_laps.is_empty() {
        return Err(format!("driver '{}' not found", driver));
    }

    let config = AnalysisConfig::default();
    let pace = clean_pace(&driver_laps, remove_outliers, &config);
    let model = fit_clean_degradation(&pace);

    if json {
        #[derive(Serialize)]
        struct PaceReport<'a> {
            driver: &'a str,
            pace: &'a [lapdelta::PaceSample],
            degradation: lapdelta::DegradationModel,
        }
        return print_json(&PaceReport {
            driver,
            pace: &pace,
            degradation: model,
        });
    }

    banner(&format!("PACE: {}", driver));
    println!(
        "  {} recorded laps, {} representative",
        driver_laps.len(),
        pace.len()
    );
    for sample in &pace {
        println!(
            "    Lap {:3}  {:8.3}s  {:<12} {}",
            sample.lap_number,
            sample.lap_time,
            sample.compound.as_deref().unwrap_or("-"),
            if sample.is_outlier { "OUTLIER" } else { "" }
        );
    }
    println!(
        "\n  Degradation: {:+.4} s/lap (intercept {:.3}s, r² {:.3})",
        model.slope, model.intercept, model.r_squared
    );
    Ok(())
}

fn run_zones(path: &Path, json: bool) -> Result<(), String> {
    let trace: Vec<TelemetrySample> = load_json(path)?;
    let config = AnalysisConfig::default();

    let corners = extract_corners(&trace, config.corner_speed_threshold);
    let straights = extract_straights(&trace, config.straight_speed_threshold);
    let drs = extract_zones(&trace, config.min_zone_length);

    if json {
        return print_json(&serde_json::json!({
            "corners": corners,
            "straights": straights,
            "drs_zones": drs,
        }));
    }

    banner("TRACK ZONES");
    println!("\n  Corners ({}):", corners.len());
    for c in &corners {
        println!("    C{:<3} {:6.1} km/h at {:7.1}m", c.number, c.speed, c.position);
    }
    println!("\n  Straights ({}):", straights.len());
    for s in &straights {
        println!("    S{:<3} {:6.1} km/h at {:7.1}m", s.number, s.speed, s.position);
    }
    println!("\n  DRS zones ({}):", drs.len());
    for z in &drs {
        println!(
            "    {:7.1}m - {:7.1}m ({:.0}m)",
            z.start_position,
            z.end_position,
            z.length()
        );
    }
    Ok(())
}

fn run_stints(path: &Path, driver: Option<&str>, json: bool) -> Result<(), String> {
    let laps: Vec<LapRecord> = load_json(path)?;

    let Some(driver) = driver else {
        let table = tyre_stints(&laps);
        if json {
            return print_json(&table);
        }
        banner("STINTS: SESSION");
        for row in &table {
            println!(
                "  {:<4} stint {}: {:<12} laps {:3} - {:3} ({} laps)",
                row.driver,
                row.stint.stint_number,
                row.stint.compound.as_deref().unwrap_or("-"),
                row.stint.start_lap,
                row.stint.end_lap,
                row.stint.lap_count
            );
        }
        return Ok(());
    };

    let driver_laps = laps_for_driver(&laps, driver);
    if driver_laps.is_empty() {
        return Err(format!("driver '{}' not found", driver));
    }

    let stints = extract_stints(&driver_laps);

    if json {
        return print_json(&stints);
    }

    banner(&format!("STINTS: {}", driver));
    for stint in &stints {
        println!(
            "  Stint {}: {:<12} laps {:3} - {:3} ({} laps)",
            stint.stint_number,
            stint.compound.as_deref().unwrap_or("-"),
            stint.start_lap,
            stint.end_lap,
            stint.lap_count
        );
    }
    Ok(())
}

fn run_generate(folder: &Path) -> Result<(), String> {
    fs::create_dir_all(folder).map_err(|e| format!("{}: {}", folder.display(), e))?;

    let circuit = SyntheticCircuit::standard();
    let fast = circuit.generate_lap(1.0, 1);
    let slow = circuit.generate_lap(0.98, 2);
    let laps = SyntheticRace::standard().generate();

    write_json(&folder.join("lap_fast.json"), &fast)?;
    write_json(&folder.join("lap_slow.json"), &slow)?;
    write_json(&folder.join("laps.json"), &laps)?;

    println!(
        "Wrote {} + {} telemetry samples and {} lap records to {}",
        fast.len(),
        slow.len(),
        laps.len(),
        folder.display()
    );
    Ok(())
}
