//! Race calendar and per-race facts.
//!
//! A [`RaceResult`] is the fundamental fact standings are derived from: one
//! row per (race, driver), recorded by the external ingestion process.
//! Qualifying, sprint, and lap rows are stored alongside but never feed the
//! championship aggregation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Race ────────────────────────────────────────────────────────────────────

/// A race event: one calendar slot of a season, unique per (season, round).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Race {
  pub race_id:    Uuid,
  pub season:     i32,
  /// Sequence number within the season, starting at 1. Round 0 never
  /// appears here; it is the season-total sentinel in standings.
  pub round:      u32,
  pub name:       String,
  pub circuit:    String,
  pub locality:   String,
  pub country:    String,
  /// Race date; orders results chronologically within a season.
  pub date:       NaiveDate,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::FactStore::add_race`].
#[derive(Debug, Clone)]
pub struct NewRace {
  pub season:   i32,
  pub round:    u32,
  pub name:     String,
  pub circuit:  String,
  pub locality: String,
  pub country:  String,
  pub date:     NaiveDate,
}

impl NewRace {
  /// Convenience constructor with the venue fields left empty.
  pub fn new(
    season: i32,
    round: u32,
    name: impl Into<String>,
    date: NaiveDate,
  ) -> Self {
    Self {
      season,
      round,
      name: name.into(),
      circuit: String::new(),
      locality: String::new(),
      country: String::new(),
      date,
    }
  }
}

// ─── Result status ───────────────────────────────────────────────────────────

/// How a driver's race ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
  Finished,
  Dnf,
  Dsq,
  Dns,
  Retired,
}

// ─── RaceResult ──────────────────────────────────────────────────────────────

/// Fastest-lap data attached to a result, when recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FastestLap {
  pub lap:       u32,
  /// Lap time in `m:ss.SSS` form.
  pub time:      String,
  pub speed_kph: Option<f64>,
}

/// One driver's classification in one race. Unique per (race, driver);
/// recording the same key again replaces the non-key fields (corrective
/// updates from the data provider).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceResult {
  pub result_id:         Uuid,
  pub race_id:           Uuid,
  pub driver_id:         Uuid,
  pub constructor_id:    Uuid,
  pub grid_position:     u32,
  /// Absent when the driver did not classify.
  pub final_position:    Option<u32>,
  /// Free-form classification text; encodes DNF/DSQ/etc.
  pub position_text:     String,
  pub points:            f64,
  pub laps_completed:    u32,
  pub status:            ResultStatus,
  pub retirement_reason: Option<String>,
  pub fastest_lap:       Option<FastestLap>,
  pub created_at:        DateTime<Utc>,
}

/// Input to [`crate::store::FactStore::record_result`].
#[derive(Debug, Clone)]
pub struct NewRaceResult {
  pub race_id:           Uuid,
  pub driver_id:         Uuid,
  pub constructor_id:    Uuid,
  pub grid_position:     u32,
  pub final_position:    Option<u32>,
  pub position_text:     String,
  pub points:            f64,
  pub laps_completed:    u32,
  pub status:            ResultStatus,
  pub retirement_reason: Option<String>,
  pub fastest_lap:       Option<FastestLap>,
}

impl NewRaceResult {
  /// A classified finish at `position`, started from the same grid slot,
  /// scoring `points`.
  pub fn classified(
    race_id: Uuid,
    driver_id: Uuid,
    constructor_id: Uuid,
    position: u32,
    points: f64,
  ) -> Self {
    Self {
      race_id,
      driver_id,
      constructor_id,
      grid_position: position,
      final_position: Some(position),
      position_text: position.to_string(),
      points,
      laps_completed: 0,
      status: ResultStatus::Finished,
      retirement_reason: None,
      fastest_lap: None,
    }
  }

  /// A retirement: no classification, no points.
  pub fn retired(
    race_id: Uuid,
    driver_id: Uuid,
    constructor_id: Uuid,
    grid_position: u32,
    reason: impl Into<String>,
  ) -> Self {
    Self {
      race_id,
      driver_id,
      constructor_id,
      grid_position,
      final_position: None,
      position_text: "R".to_string(),
      points: 0.0,
      laps_completed: 0,
      status: ResultStatus::Retired,
      retirement_reason: Some(reason.into()),
      fastest_lap: None,
    }
  }
}

// ─── Qualifying ──────────────────────────────────────────────────────────────

/// One driver's qualifying classification for a race weekend. Unique per
/// (race, driver).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Qualifying {
  pub qualifying_id:  Uuid,
  pub race_id:        Uuid,
  pub driver_id:      Uuid,
  pub constructor_id: Uuid,
  pub position:       u32,
  pub q1_time:        Option<String>,
  pub q2_time:        Option<String>,
  pub q3_time:        Option<String>,
  pub created_at:     DateTime<Utc>,
}

/// Input to [`crate::store::FactStore::record_qualifying`].
#[derive(Debug, Clone)]
pub struct NewQualifying {
  pub race_id:        Uuid,
  pub driver_id:      Uuid,
  pub constructor_id: Uuid,
  pub position:       u32,
  pub q1_time:        Option<String>,
  pub q2_time:        Option<String>,
  pub q3_time:        Option<String>,
}

// ─── Sprint ──────────────────────────────────────────────────────────────────

/// One driver's sprint-race classification. Sprint points are stored but do
/// not feed the championship aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sprint {
  pub sprint_id:         Uuid,
  pub race_id:           Uuid,
  pub driver_id:         Uuid,
  pub constructor_id:    Uuid,
  pub grid_position:     u32,
  pub final_position:    Option<u32>,
  pub position_text:     String,
  pub points:            f64,
  pub laps_completed:    u32,
  pub status:            ResultStatus,
  pub retirement_reason: Option<String>,
  pub created_at:        DateTime<Utc>,
}

/// Input to [`crate::store::FactStore::record_sprint`].
#[derive(Debug, Clone)]
pub struct NewSprint {
  pub race_id:           Uuid,
  pub driver_id:         Uuid,
  pub constructor_id:    Uuid,
  pub grid_position:     u32,
  pub final_position:    Option<u32>,
  pub position_text:     String,
  pub points:            f64,
  pub laps_completed:    u32,
  pub status:            ResultStatus,
  pub retirement_reason: Option<String>,
}

// ─── Lap ─────────────────────────────────────────────────────────────────────

/// One timed lap for one driver, unique per (race, driver, lap number).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lap {
  pub lap_id:          Uuid,
  pub race_id:         Uuid,
  pub driver_id:       Uuid,
  pub lap_number:      u32,
  /// Position at the end of this lap.
  pub position:        u32,
  /// Lap time in `m:ss.SSS` form.
  pub lap_time:        String,
  /// Lap time in milliseconds, when parsed, for comparisons.
  pub lap_time_millis: Option<u32>,
  pub created_at:      DateTime<Utc>,
}

/// Input to [`crate::store::FactStore::record_lap`].
#[derive(Debug, Clone)]
pub struct NewLap {
  pub race_id:         Uuid,
  pub driver_id:       Uuid,
  pub lap_number:      u32,
  pub position:        u32,
  pub lap_time:        String,
  pub lap_time_millis: Option<u32>,
}
