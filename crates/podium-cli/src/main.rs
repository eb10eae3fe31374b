//! podium — administrative CLI for the standings store.
//!
//! Reads `podium.toml` (or the path given with `--config`), opens the
//! SQLite store, and runs recomputation and inspection commands against
//! it. Recomputation is the batch operation the rest of the system relies
//! on: read paths only ever serve the cached snapshots it writes.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use podium_core::{standing::StandingType, store::FactStore};
use podium_engine::{career, recalc, roster, standings, validate};
use podium_store_sqlite::SqliteStore;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Podium standings administration")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "podium.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Recompute every per-round and season-total standings snapshot.
  Recalculate {
    #[arg(long)]
    season: i32,
  },
  /// Rebuild the driver/team roster for a season from its results.
  Roster {
    #[arg(long)]
    season: i32,
  },
  /// Derive and print standings (does not touch the cache).
  Standings {
    #[arg(long)]
    season: i32,
    /// Only count rounds up to this one.
    #[arg(long)]
    round:  Option<u32>,
    #[arg(long, value_enum, default_value_t = SubjectKind::Driver)]
    kind:   SubjectKind,
    /// Print as JSON instead of a table.
    #[arg(long)]
    json:   bool,
  },
  /// Print a subject's round-by-round championship trajectory.
  History {
    /// Driver or constructor natural key, depending on --kind.
    #[arg(long)]
    subject: String,
    #[arg(long)]
    season:  i32,
    #[arg(long, value_enum, default_value_t = SubjectKind::Driver)]
    kind:    SubjectKind,
    #[arg(long)]
    json:    bool,
  },
  /// Print a driver's career statistics.
  Career {
    /// Driver natural key, e.g. `alonso`.
    #[arg(long)]
    driver: String,
    /// Season used for the best-season-finish figure.
    #[arg(long)]
    season: i32,
    #[arg(long)]
    json:   bool,
  },
  /// Compare cached season totals against a fresh derivation.
  Verify {
    #[arg(long)]
    season: i32,
    #[arg(long)]
    json:   bool,
  },
}

#[derive(Clone, Copy, ValueEnum)]
enum SubjectKind {
  Driver,
  Constructor,
}

impl From<SubjectKind> for StandingType {
  fn from(kind: SubjectKind) -> Self {
    match kind {
      SubjectKind::Driver => StandingType::Driver,
      SubjectKind::Constructor => StandingType::Constructor,
    }
  }
}

/// Runtime configuration, deserialised from `podium.toml` and `PODIUM_*`
/// environment variables.
#[derive(Deserialize, Clone)]
struct StoreConfig {
  store_path: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .set_default("store_path", "podium.db")
    .context("failed to set config defaults")?
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("PODIUM"))
    .build()
    .context("failed to read config")?;
  let store_cfg: StoreConfig = settings
    .try_deserialize()
    .context("failed to deserialise store config")?;

  let store = SqliteStore::open(&store_cfg.store_path)
    .await
    .with_context(|| {
      format!("failed to open store at {:?}", store_cfg.store_path)
    })?;

  match cli.command {
    Command::Recalculate { season } => {
      let stats = recalc::recalculate_season(&store, season).await?;
      println!(
        "driver standings:      {} created, {} updated",
        stats.driver_created, stats.driver_updated
      );
      println!(
        "constructor standings: {} created, {} updated",
        stats.constructor_created, stats.constructor_updated
      );
    }

    Command::Roster { season } => {
      let synced = roster::rebuild_season_roster(&store, season).await?;
      println!("roster rebuilt for {season}: {synced} drivers");
    }

    Command::Standings { season, round, kind, json } => {
      let ranked =
        standings::derive(&store, season, kind.into(), round).await?;
      if json {
        println!("{}", serde_json::to_string_pretty(&ranked)?);
      } else {
        for row in &ranked {
          println!(
            "P{:<3} {:24} {:>6.1} pts  {} wins",
            row.position, row.subject_ref, row.points, row.wins
          );
        }
      }
    }

    Command::History { subject, season, kind, json } => {
      let subject_id = resolve_subject(&store, &subject, kind).await?;
      let history =
        standings::position_history(&store, subject_id, season, kind.into())
          .await?;
      if json {
        println!("{}", serde_json::to_string_pretty(&history)?);
      } else if history.is_empty() {
        println!(
          "no cached snapshots for {subject} in {season}; run \
           `podium recalculate --season {season}` first"
        );
      } else {
        for point in &history {
          println!(
            "round {:<2} P{:<3} {:>6.1} pts  {} wins",
            point.round, point.position, point.points, point.wins
          );
        }
      }
    }

    Command::Career { driver, season, json } => {
      let found = store
        .get_driver_by_ref(&driver)
        .await?
        .with_context(|| format!("no driver with ref {driver:?}"))?;
      let stats = career::career_stats(&store, found.driver_id, season).await?;
      if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
      } else {
        println!("{}", found.full_name());
        println!("  wins:                {}", stats.total_wins);
        println!("  podiums:             {}", stats.total_podiums);
        println!("  world championships: {}", stats.world_championships);
        println!("  seasons:             {}", stats.total_seasons);
        println!(
          "  best title finish:   {}",
          fmt_position(stats.best_championship_finish)
        );
        println!(
          "  best finish in {season}: {}",
          fmt_position(stats.best_season_finish)
        );
        println!("  career points:       {:.1}", stats.career_points);
      }
    }

    Command::Verify { season, json } => {
      let findings = validate::verify_season(&store, season).await?;
      if json {
        println!("{}", serde_json::to_string_pretty(&findings)?);
      } else if findings.is_empty() {
        println!("season {season}: cache matches derivation");
      } else {
        for finding in &findings {
          println!("{finding}");
        }
        println!(
          "{} discrepancies; run `podium recalculate --season {season}` \
           to rebuild",
          findings.len()
        );
      }
    }
  }

  Ok(())
}

/// Resolve a natural key to a subject id, according to the standing kind.
async fn resolve_subject(
  store: &SqliteStore,
  subject: &str,
  kind: SubjectKind,
) -> anyhow::Result<uuid::Uuid> {
  match kind {
    SubjectKind::Driver => Ok(
      store
        .get_driver_by_ref(subject)
        .await?
        .with_context(|| format!("no driver with ref {subject:?}"))?
        .driver_id,
    ),
    SubjectKind::Constructor => Ok(
      store
        .get_constructor_by_ref(subject)
        .await?
        .with_context(|| format!("no constructor with ref {subject:?}"))?
        .constructor_id,
    ),
  }
}

fn fmt_position(position: Option<u32>) -> String {
  position.map_or_else(|| "n/a".to_string(), |p| format!("P{p}"))
}
