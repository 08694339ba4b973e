//! Skipdrift CLI
//!
//! Commands:
//! - track: run the full drift-tracking pipeline over a period directory
//! - profiles: show one period's cluster profiles and shares
//! - schema: print the period record input format

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use skipdrift::{
    load_snapshot, track_drift, AnalysisConfig, AnalysisError, JsonDirectoryStore, PeriodId,
    VERSION,
};

/// Skipdrift - track archetype distributions across independently-clustered periods
#[derive(Parser)]
#[command(name = "skipdrift")]
#[command(version = VERSION)]
#[command(about = "Track cluster-distribution drift across periods", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the drift-tracking pipeline over a data directory
    Track {
        /// Directory of per-period record files (<period>.json)
        #[arg(short, long)]
        data_dir: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Number of clusters K (must match the stored labelings)
        #[arg(short = 'k', long)]
        clusters: usize,

        /// Session vector length L
        #[arg(short = 'l', long)]
        session_length: usize,

        /// Comma-separated period ids; defaults to every period in the
        /// directory, sorted lexicographically
        #[arg(long)]
        periods: Option<String>,

        /// Save the resolved run configuration to this path
        #[arg(long)]
        save_config: Option<PathBuf>,
    },

    /// Show one period's cluster profiles and shares
    Profiles {
        /// Directory of per-period record files
        #[arg(short, long)]
        data_dir: PathBuf,

        /// Period id to inspect
        #[arg(short, long)]
        period: String,

        /// Number of clusters K
        #[arg(short = 'k', long)]
        clusters: usize,
    },

    /// Print the period record input format
    Schema,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Track {
            data_dir,
            output,
            clusters,
            session_length,
            periods,
            save_config,
        } => cmd_track(
            data_dir,
            output,
            clusters,
            session_length,
            periods,
            save_config,
        ),
        Commands::Profiles {
            data_dir,
            period,
            clusters,
        } => cmd_profiles(data_dir, period, clusters),
        Commands::Schema => cmd_schema(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn cmd_track(
    data_dir: PathBuf,
    output: PathBuf,
    clusters: usize,
    session_length: usize,
    periods: Option<String>,
    save_config: Option<PathBuf>,
) -> Result<(), AnalysisError> {
    let store = JsonDirectoryStore::new(&data_dir);

    let periods: Vec<PeriodId> = match periods {
        Some(list) => list
            .split(',')
            .map(|p| PeriodId::from(p.trim()))
            .collect(),
        None => store.discover_periods()?,
    };

    let config = AnalysisConfig::new(periods, clusters, session_length);
    if let Some(path) = save_config {
        fs::write(&path, config.to_json()?)?;
    }

    let report = track_drift(&config, &store)?;
    let json = serde_json::to_string_pretty(&report)?;
    write_output(&output, &json)?;
    Ok(())
}

fn cmd_profiles(data_dir: PathBuf, period: String, clusters: usize) -> Result<(), AnalysisError> {
    let store = JsonDirectoryStore::new(&data_dir);
    let period = PeriodId::from(period);
    let snapshot = load_snapshot(&store, &period, clusters)?;

    println!("period: {period}");
    for (cluster, (profile, share)) in snapshot
        .profiles
        .iter()
        .zip(&snapshot.shares)
        .enumerate()
    {
        let values: Vec<String> = profile.iter().map(|v| format!("{v:.2}")).collect();
        println!(
            "cluster {cluster}: share {:>5.1}%  profile [{}]",
            share * 100.0,
            values.join(", ")
        );
    }
    Ok(())
}

fn cmd_schema() -> Result<(), AnalysisError> {
    println!(
        r#"Period record format (<period>.json, one file per period):

{{
  "cluster_count": 4,
  "sessions": [
    {{ "vector": [1.0, 2.0, 5.0, 5.0], "label": 0 }},
    {{ "vector": [5.0, 5.0, 4.0, 5.0], "label": 3 }}
  ]
}}

- cluster_count: K used by the external clustering step for this period
- vector: fixed-length per-position skip-intensity codes (same length L
  for every session in the run)
- label: local cluster id in [0, K); numbering is period-local"#
    );
    Ok(())
}

fn write_output(path: &Path, contents: &str) -> Result<(), AnalysisError> {
    if path.as_os_str() == "-" {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(contents.as_bytes())?;
        if atty::is(atty::Stream::Stdout) {
            handle.write_all(b"\n")?;
        }
    } else {
        fs::write(path, contents)?;
    }
    Ok(())
}
