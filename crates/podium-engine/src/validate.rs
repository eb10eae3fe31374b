//! Cache-consistency checks: recomputed sums versus cached snapshots.
//!
//! Findings are reported, never auto-corrected; the fix is an explicit
//! recompute.

use std::collections::HashMap;
use std::fmt;

use podium_core::{
  standing::{ChampionshipStanding, SEASON_TOTAL_ROUND, StandingType},
  store::FactStore,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{Error, Result, check_season, standings};

/// Cached points may drift from the recomputed sum by at most this much
/// before being reported.
pub const POINTS_EPSILON: f64 = 0.1;

/// One disagreement between the cached season totals and a fresh
/// derivation.
#[derive(Debug, Clone, Serialize)]
pub struct Discrepancy {
  pub standing_type: StandingType,
  pub subject_id:    Uuid,
  /// `None` when only the cache knows the subject.
  pub subject_ref:   Option<String>,
  pub kind:          DiscrepancyKind,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiscrepancyKind {
  /// Cached points differ from the recomputed sum beyond the epsilon.
  PointsDrift { cached: f64, derived: f64 },
  /// Cached position or win count differs from the derived ranking.
  RankDrift {
    cached_position:  u32,
    derived_position: u32,
    cached_wins:      u32,
    derived_wins:     u32,
  },
  /// The subject has results but no cached season-total row.
  MissingFromCache,
  /// The cache holds a subject with no supporting results.
  StaleInCache,
}

impl fmt::Display for Discrepancy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let kind = match self.standing_type {
      StandingType::Driver => "driver",
      StandingType::Constructor => "constructor",
    };
    let subject = self
      .subject_ref
      .clone()
      .unwrap_or_else(|| self.subject_id.to_string());
    match &self.kind {
      DiscrepancyKind::PointsDrift { cached, derived } => write!(
        f,
        "{kind} {subject}: cached {cached:.1} pts, derived {derived:.1} pts"
      ),
      DiscrepancyKind::RankDrift {
        cached_position,
        derived_position,
        cached_wins,
        derived_wins,
      } => write!(
        f,
        "{kind} {subject}: cached P{cached_position} ({cached_wins} wins), \
         derived P{derived_position} ({derived_wins} wins)"
      ),
      DiscrepancyKind::MissingFromCache => {
        write!(f, "{kind} {subject}: has results but no cached standing")
      }
      DiscrepancyKind::StaleInCache => {
        write!(f, "{kind} {subject}: cached standing with no results")
      }
    }
  }
}

/// Compare the cached round-0 snapshots for both championships against a
/// fresh derivation. Returns every disagreement found; an empty result
/// means the cache is consistent.
pub async fn verify_season<S: FactStore>(
  store: &S,
  season: i32,
) -> Result<Vec<Discrepancy>> {
  check_season(season)?;

  let mut findings = Vec::new();
  for standing_type in [StandingType::Driver, StandingType::Constructor] {
    verify_type(store, season, standing_type, &mut findings).await?;
  }

  for finding in &findings {
    tracing::warn!(season, %finding, "standings cache discrepancy");
  }
  Ok(findings)
}

async fn verify_type<S: FactStore>(
  store: &S,
  season: i32,
  standing_type: StandingType,
  findings: &mut Vec<Discrepancy>,
) -> Result<()> {
  let derived = standings::derive(store, season, standing_type, None).await?;
  let cached = store
    .standings(season, standing_type, SEASON_TOTAL_ROUND)
    .await
    .map_err(Error::store)?;

  let mut cached_by_subject: HashMap<Uuid, &ChampionshipStanding> =
    cached.iter().map(|row| (row.subject_id, row)).collect();

  for row in &derived {
    match cached_by_subject.remove(&row.subject_id) {
      None => findings.push(Discrepancy {
        standing_type,
        subject_id: row.subject_id,
        subject_ref: Some(row.subject_ref.clone()),
        kind: DiscrepancyKind::MissingFromCache,
      }),
      Some(cached_row) => {
        if (cached_row.points - row.points).abs() > POINTS_EPSILON {
          findings.push(Discrepancy {
            standing_type,
            subject_id: row.subject_id,
            subject_ref: Some(row.subject_ref.clone()),
            kind: DiscrepancyKind::PointsDrift {
              cached:  cached_row.points,
              derived: row.points,
            },
          });
        }
        if cached_row.position != row.position || cached_row.wins != row.wins {
          findings.push(Discrepancy {
            standing_type,
            subject_id: row.subject_id,
            subject_ref: Some(row.subject_ref.clone()),
            kind: DiscrepancyKind::RankDrift {
              cached_position:  cached_row.position,
              derived_position: row.position,
              cached_wins:      cached_row.wins,
              derived_wins:     row.wins,
            },
          });
        }
      }
    }
  }

  for (subject_id, _) in cached_by_subject {
    findings.push(Discrepancy {
      standing_type,
      subject_id,
      subject_ref: None,
      kind: DiscrepancyKind::StaleInCache,
    });
  }

  Ok(())
}
