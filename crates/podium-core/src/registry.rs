//! Registry entities — the stable identities race facts reference.
//!
//! Drivers and constructors carry a surrogate UUID plus the natural key used
//! by the external data provider (e.g. `"alonso"`, `"mclaren"`). Facts refer
//! to them by UUID; rankings fall back to the natural key for deterministic
//! ordering.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The first world-championship season; earlier years are rejected.
pub const FIRST_SEASON: i32 = 1950;

// ─── Season ──────────────────────────────────────────────────────────────────

/// A championship season, identified by its calendar year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Season {
  pub year:       i32,
  pub created_at: DateTime<Utc>,
}

// ─── Driver ──────────────────────────────────────────────────────────────────

/// A driver identity. Everything a driver *did* lives in result rows; this
/// is only the stable envelope they point at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
  pub driver_id:     Uuid,
  /// External natural key, e.g. `"max_verstappen"`.
  pub driver_ref:    String,
  /// Permanent racing number, if assigned.
  pub number:        Option<u32>,
  /// Three-letter timing-screen code, e.g. `"VER"`.
  pub code:          Option<String>,
  pub first_name:    String,
  pub last_name:     String,
  pub date_of_birth: Option<NaiveDate>,
  pub nationality:   String,
  pub created_at:    DateTime<Utc>,
}

impl Driver {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }
}

/// Input to [`crate::store::FactStore::add_driver`].
#[derive(Debug, Clone)]
pub struct NewDriver {
  pub driver_ref:    String,
  pub number:        Option<u32>,
  pub code:          Option<String>,
  pub first_name:    String,
  pub last_name:     String,
  pub date_of_birth: Option<NaiveDate>,
  pub nationality:   String,
}

impl NewDriver {
  /// Convenience constructor with the optional fields left empty.
  pub fn new(
    driver_ref: impl Into<String>,
    first_name: impl Into<String>,
    last_name: impl Into<String>,
  ) -> Self {
    Self {
      driver_ref: driver_ref.into(),
      number: None,
      code: None,
      first_name: first_name.into(),
      last_name: last_name.into(),
      date_of_birth: None,
      nationality: String::new(),
    }
  }
}

// ─── Constructor ─────────────────────────────────────────────────────────────

/// A constructor (team) identity, with base livery attributes.
/// Season-scoped overrides live in
/// [`ConstructorSeason`](crate::standing::ConstructorSeason).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constructor {
  pub constructor_id:       Uuid,
  /// External natural key, e.g. `"red_bull"`.
  pub constructor_ref:      String,
  pub name:                 String,
  pub nationality:          String,
  pub car_model:            Option<String>,
  pub car_image_url:        Option<String>,
  /// Primary team color as `#rrggbb`.
  pub team_color:           Option<String>,
  pub team_color_secondary: Option<String>,
  pub created_at:           DateTime<Utc>,
}

/// Input to [`crate::store::FactStore::add_constructor`].
#[derive(Debug, Clone)]
pub struct NewConstructor {
  pub constructor_ref:      String,
  pub name:                 String,
  pub nationality:          String,
  pub car_model:            Option<String>,
  pub car_image_url:        Option<String>,
  pub team_color:           Option<String>,
  pub team_color_secondary: Option<String>,
}

impl NewConstructor {
  /// Convenience constructor with the optional fields left empty.
  pub fn new(
    constructor_ref: impl Into<String>,
    name: impl Into<String>,
  ) -> Self {
    Self {
      constructor_ref: constructor_ref.into(),
      name: name.into(),
      nationality: String::new(),
      car_model: None,
      car_image_url: None,
      team_color: None,
      team_color_secondary: None,
    }
  }
}
