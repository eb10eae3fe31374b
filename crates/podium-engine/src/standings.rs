//! Standing derivation: pure ranking over result rows, plus the
//! persistence wrapper and position-history reads.

use std::collections::{BTreeSet, HashMap};

use podium_core::{
  standing::{ProgressPoint, SEASON_TOTAL_ROUND, StandingRow, StandingType},
  store::{FactStore, ResultFact, ResultFilter, SaveOutcome},
};
use uuid::Uuid;

use crate::{Error, Result, check_round_ceiling, check_season};

// ─── Derivation ──────────────────────────────────────────────────────────────

/// Derive the championship ranking for a season, optionally counting only
/// rounds up to `up_to_round` (inclusive).
///
/// A season with no results yields an empty ranking.
pub async fn derive<S: FactStore>(
  store: &S,
  season: i32,
  standing_type: StandingType,
  up_to_round: Option<u32>,
) -> Result<Vec<StandingRow>> {
  check_season(season)?;
  if let Some(round) = up_to_round {
    check_round_ceiling(round)?;
  }

  let rows = store
    .results(&ResultFilter {
      season: Some(season),
      up_to_round,
      ..ResultFilter::default()
    })
    .await
    .map_err(Error::store)?;

  Ok(rank(standing_type, &rows))
}

/// Group result rows by subject and rank them.
///
/// Ordering is points descending, then wins descending; subjects still
/// tied fall back to their external natural key ascending, so repeated
/// runs over the same rows produce the same order.
pub fn rank(
  standing_type: StandingType,
  rows: &[ResultFact],
) -> Vec<StandingRow> {
  struct Tally {
    subject_ref: String,
    points:      f64,
    wins:        u32,
    rounds:      BTreeSet<u32>,
  }

  let mut tallies: HashMap<Uuid, Tally> = HashMap::new();
  for row in rows {
    let (subject_id, subject_ref) = match standing_type {
      StandingType::Driver => (row.driver_id, &row.driver_ref),
      StandingType::Constructor => (row.constructor_id, &row.constructor_ref),
    };
    let tally = tallies.entry(subject_id).or_insert_with(|| Tally {
      subject_ref: subject_ref.clone(),
      points:      0.0,
      wins:        0,
      rounds:      BTreeSet::new(),
    });
    tally.points += row.points;
    if row.final_position == Some(1) {
      tally.wins += 1;
    }
    tally.rounds.insert(row.round);
  }

  let mut ranked: Vec<StandingRow> = tallies
    .into_iter()
    .map(|(subject_id, tally)| StandingRow {
      position: 0,
      subject_id,
      subject_ref: tally.subject_ref,
      points: tally.points,
      wins: tally.wins,
      races_count: tally.rounds.len() as u32,
    })
    .collect();

  ranked.sort_by(|a, b| {
    b.points
      .total_cmp(&a.points)
      .then_with(|| b.wins.cmp(&a.wins))
      .then_with(|| a.subject_ref.cmp(&b.subject_ref))
  });
  for (index, row) in ranked.iter_mut().enumerate() {
    row.position = index as u32 + 1;
  }
  ranked
}

// ─── Persistence wrapper ─────────────────────────────────────────────────────

/// Derive and persist the snapshot for (season, type, round), where the
/// round is `up_to_round` or 0 for the season total. The store replaces
/// the snapshot in one transaction, so readers never see it half-written.
pub async fn save<S: FactStore>(
  store: &S,
  season: i32,
  standing_type: StandingType,
  up_to_round: Option<u32>,
) -> Result<SaveOutcome> {
  let ranked = derive(store, season, standing_type, up_to_round).await?;
  let round = up_to_round.unwrap_or(SEASON_TOTAL_ROUND);
  tracing::debug!(
    season,
    round,
    ?standing_type,
    entries = ranked.len(),
    "persisting standings snapshot"
  );
  store
    .replace_standings(season, standing_type, round, &ranked)
    .await
    .map_err(Error::store)
}

// ─── Position history ────────────────────────────────────────────────────────

/// A subject's championship trajectory through a season, one point per
/// cached per-round snapshot (the round-0 season total is excluded).
pub async fn position_history<S: FactStore>(
  store: &S,
  subject_id: Uuid,
  season: i32,
  standing_type: StandingType,
) -> Result<Vec<ProgressPoint>> {
  check_season(season)?;
  let snapshots = store
    .subject_standings(subject_id, season, standing_type)
    .await
    .map_err(Error::store)?;
  Ok(
    snapshots
      .into_iter()
      .map(|s| ProgressPoint {
        round:    s.round,
        position: s.position,
        points:   s.points,
        wins:     s.wins,
      })
      .collect(),
  )
}
