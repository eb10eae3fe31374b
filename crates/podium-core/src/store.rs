//! The `FactStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `podium-store-sqlite`). The derivation engine and any serving layer
//! depend on this abstraction, not on a concrete backend.

use std::future::Future;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::{
  race::{
    Lap, NewLap, NewQualifying, NewRace, NewRaceResult, NewSprint, Qualifying,
    Race, RaceResult, ResultStatus, Sprint,
  },
  registry::{Constructor, Driver, NewConstructor, NewDriver, Season},
  standing::{
    ChampionshipStanding, ConstructorSeason, DriverSeason,
    NewConstructorSeason, StandingRow, StandingType,
  },
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`FactStore::results`]. `None` fields do not constrain.
#[derive(Debug, Clone, Default)]
pub struct ResultFilter {
  pub season:      Option<i32>,
  /// Inclusive ceiling on the race round.
  pub up_to_round: Option<u32>,
  pub driver:      Option<Uuid>,
  pub constructor: Option<Uuid>,
}

/// A result row joined with its race slot and registry natural keys — the
/// unit of aggregation for standings and career statistics.
#[derive(Debug, Clone, Serialize)]
pub struct ResultFact {
  pub result_id:       Uuid,
  pub season:          i32,
  pub round:           u32,
  pub race_date:       NaiveDate,
  pub driver_id:       Uuid,
  pub driver_ref:      String,
  pub constructor_id:  Uuid,
  pub constructor_ref: String,
  pub grid_position:   u32,
  pub final_position:  Option<u32>,
  pub points:          f64,
  pub status:          ResultStatus,
}

/// Row counts reported by [`FactStore::replace_standings`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SaveOutcome {
  pub created: usize,
  pub updated: usize,
  /// Rows deleted because their subject fell out of the ranking.
  pub pruned:  usize,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Podium fact store backend.
///
/// Race facts (results, qualifying, sprints, laps) are recorded by the
/// ingestion side; recording the same natural key again replaces the row
/// (corrective updates). The derived tables (standings, rosters) are owned
/// by the engine and replaced atomically, so readers never observe a
/// partial snapshot.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait FactStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Registries ────────────────────────────────────────────────────────

  fn add_season(
    &self,
    year: i32,
  ) -> impl Future<Output = Result<Season, Self::Error>> + Send + '_;

  /// Retrieve a season by year. Returns `None` if not registered.
  fn get_season(
    &self,
    year: i32,
  ) -> impl Future<Output = Result<Option<Season>, Self::Error>> + Send + '_;

  /// List all seasons, newest first.
  fn list_seasons(
    &self,
  ) -> impl Future<Output = Result<Vec<Season>, Self::Error>> + Send + '_;

  fn add_driver(
    &self,
    input: NewDriver,
  ) -> impl Future<Output = Result<Driver, Self::Error>> + Send + '_;

  fn get_driver(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Driver>, Self::Error>> + Send + '_;

  /// Look up a driver by external natural key.
  fn get_driver_by_ref<'a>(
    &'a self,
    driver_ref: &'a str,
  ) -> impl Future<Output = Result<Option<Driver>, Self::Error>> + Send + 'a;

  /// List all drivers, ordered by last then first name.
  fn list_drivers(
    &self,
  ) -> impl Future<Output = Result<Vec<Driver>, Self::Error>> + Send + '_;

  fn add_constructor(
    &self,
    input: NewConstructor,
  ) -> impl Future<Output = Result<Constructor, Self::Error>> + Send + '_;

  fn get_constructor(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Constructor>, Self::Error>> + Send + '_;

  /// Look up a constructor by external natural key.
  fn get_constructor_by_ref<'a>(
    &'a self,
    constructor_ref: &'a str,
  ) -> impl Future<Output = Result<Option<Constructor>, Self::Error>> + Send + 'a;

  /// List all constructors, ordered by name.
  fn list_constructors(
    &self,
  ) -> impl Future<Output = Result<Vec<Constructor>, Self::Error>> + Send + '_;

  // ── Calendar ──────────────────────────────────────────────────────────

  fn add_race(
    &self,
    input: NewRace,
  ) -> impl Future<Output = Result<Race, Self::Error>> + Send + '_;

  /// All races of a season, in ascending round order.
  fn races(
    &self,
    season: i32,
  ) -> impl Future<Output = Result<Vec<Race>, Self::Error>> + Send + '_;

  // ── Race facts ────────────────────────────────────────────────────────

  /// Record (or correct) one driver's result. Upserts by (race, driver).
  fn record_result(
    &self,
    input: NewRaceResult,
  ) -> impl Future<Output = Result<RaceResult, Self::Error>> + Send + '_;

  /// The full result row for (race, driver), if recorded.
  fn get_result(
    &self,
    race_id: Uuid,
    driver_id: Uuid,
  ) -> impl Future<Output = Result<Option<RaceResult>, Self::Error>> + Send + '_;

  /// Joined result rows matching `filter`, in chronological order
  /// (race date, then round).
  fn results<'a>(
    &'a self,
    filter: &'a ResultFilter,
  ) -> impl Future<Output = Result<Vec<ResultFact>, Self::Error>> + Send + 'a;

  /// Record (or correct) a qualifying row. Upserts by (race, driver).
  fn record_qualifying(
    &self,
    input: NewQualifying,
  ) -> impl Future<Output = Result<Qualifying, Self::Error>> + Send + '_;

  /// Qualifying rows for a race, by position.
  fn qualifying(
    &self,
    race_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Qualifying>, Self::Error>> + Send + '_;

  /// Record (or correct) a sprint row. Upserts by (race, driver).
  fn record_sprint(
    &self,
    input: NewSprint,
  ) -> impl Future<Output = Result<Sprint, Self::Error>> + Send + '_;

  /// Sprint rows for a race, by final position.
  fn sprints(
    &self,
    race_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Sprint>, Self::Error>> + Send + '_;

  /// Record (or correct) a lap row. Upserts by (race, driver, lap number).
  fn record_lap(
    &self,
    input: NewLap,
  ) -> impl Future<Output = Result<Lap, Self::Error>> + Send + '_;

  /// Lap rows for a race, by lap number then position.
  fn laps(
    &self,
    race_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Lap>, Self::Error>> + Send + '_;

  // ── Derived rows — owned by the engine ────────────────────────────────

  /// Replace the standings snapshot for (season, type, round) with `rows`,
  /// in a single transaction: upsert by subject, delete departed subjects.
  fn replace_standings<'a>(
    &'a self,
    season: i32,
    standing_type: StandingType,
    round: u32,
    rows: &'a [StandingRow],
  ) -> impl Future<Output = Result<SaveOutcome, Self::Error>> + Send + 'a;

  /// The cached snapshot for (season, type, round), by position.
  fn standings(
    &self,
    season: i32,
    standing_type: StandingType,
    round: u32,
  ) -> impl Future<Output = Result<Vec<ChampionshipStanding>, Self::Error>> + Send + '_;

  /// A subject's per-round snapshots for a season (round 0 excluded),
  /// ascending by round.
  fn subject_standings(
    &self,
    subject_id: Uuid,
    season: i32,
    standing_type: StandingType,
  ) -> impl Future<Output = Result<Vec<ChampionshipStanding>, Self::Error>> + Send + '_;

  /// A subject's season-total (round 0) snapshots across all seasons,
  /// ascending by season.
  fn final_standings(
    &self,
    subject_id: Uuid,
    standing_type: StandingType,
  ) -> impl Future<Output = Result<Vec<ChampionshipStanding>, Self::Error>> + Send + '_;

  /// Upsert the single roster row for (driver, season).
  fn set_driver_season(
    &self,
    driver_id: Uuid,
    season: i32,
    constructor_id: Uuid,
  ) -> impl Future<Output = Result<DriverSeason, Self::Error>> + Send + '_;

  /// All roster rows for a driver, ascending by season.
  fn driver_seasons(
    &self,
    driver_id: Uuid,
  ) -> impl Future<Output = Result<Vec<DriverSeason>, Self::Error>> + Send + '_;

  /// The full roster of a season.
  fn season_roster(
    &self,
    season: i32,
  ) -> impl Future<Output = Result<Vec<DriverSeason>, Self::Error>> + Send + '_;

  /// Upsert season display overrides for a constructor.
  fn set_constructor_season(
    &self,
    input: NewConstructorSeason,
  ) -> impl Future<Output = Result<ConstructorSeason, Self::Error>> + Send + '_;

  /// Season display overrides for a constructor, if any.
  fn constructor_season(
    &self,
    constructor_id: Uuid,
    season: i32,
  ) -> impl Future<Output = Result<Option<ConstructorSeason>, Self::Error>> + Send + '_;
}
