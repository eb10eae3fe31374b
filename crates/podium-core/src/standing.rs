//! Championship standings and the other derived read models.
//!
//! Standings snapshots are a materialised cache: regenerable from results
//! at any time, never hand-edited. Round 0 is the reserved sentinel for the
//! whole-season total.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::registry::Constructor;

/// Reserved round number meaning "season total across all rounds".
pub const SEASON_TOTAL_ROUND: u32 = 0;

// ─── Standing type ───────────────────────────────────────────────────────────

/// Which championship a standing belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StandingType {
  Driver,
  Constructor,
}

// ─── Derived ranking ─────────────────────────────────────────────────────────

/// One entry of a freshly derived ranking. Computed, not stored; the cached
/// form is [`ChampionshipStanding`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandingRow {
  /// 1-based rank.
  pub position:    u32,
  pub subject_id:  Uuid,
  /// The subject's external natural key; the deterministic tie-break.
  pub subject_ref: String,
  pub points:      f64,
  pub wins:        u32,
  /// Distinct races the subject appears in within the queried range.
  pub races_count: u32,
}

// ─── Cached snapshot ─────────────────────────────────────────────────────────

/// A cached standings row: the state of one subject in one championship
/// after `round` (0 = season total). Exactly one row exists per
/// (season, standing_type, round, subject).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChampionshipStanding {
  pub standing_id:   Uuid,
  pub season:        i32,
  pub standing_type: StandingType,
  pub round:         u32,
  pub subject_id:    Uuid,
  pub position:      u32,
  pub points:        f64,
  pub wins:          u32,
  pub updated_at:    DateTime<Utc>,
}

/// A single point of a subject's trajectory through a season, taken from
/// the per-round snapshots (round 0 excluded).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressPoint {
  pub round:    u32,
  pub position: u32,
  pub points:   f64,
  pub wins:     u32,
}

// ─── Season associations ─────────────────────────────────────────────────────

/// The single team a driver is associated with for a season — the team of
/// their chronologically latest result. At most one row exists per
/// (driver, season).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverSeason {
  pub driver_id:      Uuid,
  pub season:         i32,
  pub constructor_id: Uuid,
  pub updated_at:     DateTime<Utc>,
}

/// Season-scoped overrides of a constructor's display attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstructorSeason {
  pub constructor_id:       Uuid,
  pub season:               i32,
  pub car_model:            Option<String>,
  pub car_image_url:        Option<String>,
  pub team_color:           Option<String>,
  pub team_color_secondary: Option<String>,
  pub updated_at:           DateTime<Utc>,
}

/// Input to [`crate::store::FactStore::set_constructor_season`].
#[derive(Debug, Clone)]
pub struct NewConstructorSeason {
  pub constructor_id:       Uuid,
  pub season:               i32,
  pub car_model:            Option<String>,
  pub car_image_url:        Option<String>,
  pub team_color:           Option<String>,
  pub team_color_secondary: Option<String>,
}

/// A constructor's display attributes resolved for one season: per-field
/// season override with fallback to the constructor's base attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamAppearance {
  pub car_model:            Option<String>,
  pub car_image_url:        Option<String>,
  pub team_color:           Option<String>,
  pub team_color_secondary: Option<String>,
}

impl TeamAppearance {
  pub fn resolve(
    base: &Constructor,
    season: Option<&ConstructorSeason>,
  ) -> Self {
    let pick = |over: Option<&Option<String>>, fallback: &Option<String>| {
      over
        .and_then(|o| o.clone())
        .or_else(|| fallback.clone())
    };
    Self {
      car_model:            pick(
        season.map(|s| &s.car_model),
        &base.car_model,
      ),
      car_image_url:        pick(
        season.map(|s| &s.car_image_url),
        &base.car_image_url,
      ),
      team_color:           pick(
        season.map(|s| &s.team_color),
        &base.team_color,
      ),
      team_color_secondary: pick(
        season.map(|s| &s.team_color_secondary),
        &base.team_color_secondary,
      ),
    }
  }
}

// ─── Career statistics ───────────────────────────────────────────────────────

/// Cumulative all-time figures for a driver. All aggregates over an empty
/// history report zero or `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CareerStats {
  pub total_wins:               u32,
  pub total_podiums:            u32,
  pub world_championships:      u32,
  pub total_seasons:            u32,
  pub best_championship_finish: Option<u32>,
  /// Best final position within the season being viewed.
  pub best_season_finish:       Option<u32>,
  pub career_points:            f64,
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;

  use super::*;

  fn base() -> Constructor {
    Constructor {
      constructor_id:       Uuid::new_v4(),
      constructor_ref:      "mclaren".into(),
      name:                 "McLaren".into(),
      nationality:          "British".into(),
      car_model:            Some("MCL38".into()),
      car_image_url:        None,
      team_color:           Some("#ff8000".into()),
      team_color_secondary: None,
      created_at:           Utc::now(),
    }
  }

  #[test]
  fn appearance_falls_back_to_base_without_override() {
    let constructor = base();
    let appearance = TeamAppearance::resolve(&constructor, None);
    assert_eq!(appearance.car_model.as_deref(), Some("MCL38"));
    assert_eq!(appearance.team_color.as_deref(), Some("#ff8000"));
    assert_eq!(appearance.car_image_url, None);
  }

  #[test]
  fn appearance_prefers_override_per_field() {
    let constructor = base();
    let season = ConstructorSeason {
      constructor_id:       constructor.constructor_id,
      season:               2024,
      car_model:            Some("MCL38A".into()),
      car_image_url:        None,
      team_color:           None,
      team_color_secondary: Some("#000000".into()),
      updated_at:           Utc::now(),
    };
    let appearance = TeamAppearance::resolve(&constructor, Some(&season));
    // overridden field
    assert_eq!(appearance.car_model.as_deref(), Some("MCL38A"));
    // absent in the override, present in the base
    assert_eq!(appearance.team_color.as_deref(), Some("#ff8000"));
    // present only in the override
    assert_eq!(appearance.team_color_secondary.as_deref(), Some("#000000"));
    // absent in both
    assert_eq!(appearance.car_image_url, None);
  }
}
