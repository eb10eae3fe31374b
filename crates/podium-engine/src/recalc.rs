//! Progressive recalculation: one snapshot per round, plus season totals.

use podium_core::{
  standing::StandingType,
  store::{FactStore, SaveOutcome},
};
use serde::Serialize;

use crate::{Error, Result, check_season, standings};

/// Accumulated row counts from a whole-season recomputation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecalculationStats {
  pub driver_created:      usize,
  pub driver_updated:      usize,
  pub constructor_created: usize,
  pub constructor_updated: usize,
}

impl RecalculationStats {
  fn absorb(&mut self, driver: SaveOutcome, constructor: SaveOutcome) {
    self.driver_created += driver.created;
    self.driver_updated += driver.updated;
    self.constructor_created += constructor.created;
    self.constructor_updated += constructor.updated;
  }
}

/// Recompute and persist one standings snapshot per round (driver and
/// constructor) plus the two round-0 season totals, in ascending round
/// order. This reproduces standings as they stood after each race, which
/// position-history views read back.
///
/// Each snapshot commits on its own. On failure the recomputation stops
/// and reports; snapshots already written stay in place. Each is
/// individually consistent, and a re-run converges on identical rows.
pub async fn recalculate_season<S: FactStore>(
  store: &S,
  season: i32,
) -> Result<RecalculationStats> {
  check_season(season)?;
  store
    .get_season(season)
    .await
    .map_err(Error::store)?
    .ok_or(podium_core::Error::SeasonNotFound(season))?;

  let races = store.races(season).await.map_err(Error::store)?;
  tracing::info!(season, rounds = races.len(), "recalculating standings");

  let mut stats = RecalculationStats::default();
  for race in &races {
    let driver =
      standings::save(store, season, StandingType::Driver, Some(race.round))
        .await?;
    let constructor = standings::save(
      store,
      season,
      StandingType::Constructor,
      Some(race.round),
    )
    .await?;
    stats.absorb(driver, constructor);
  }

  let driver =
    standings::save(store, season, StandingType::Driver, None).await?;
  let constructor =
    standings::save(store, season, StandingType::Constructor, None).await?;
  stats.absorb(driver, constructor);

  tracing::info!(
    season,
    driver_created = stats.driver_created,
    driver_updated = stats.driver_updated,
    constructor_created = stats.constructor_created,
    constructor_updated = stats.constructor_updated,
    "standings recalculation complete"
  );
  Ok(stats)
}
