//! Current-team resolution and season roster maintenance.
//!
//! A driver's team for a season is defined by their chronologically latest
//! result row: latest race date, tie-broken by highest round. The roster
//! table keeps exactly one row per (driver, season), so a mid-season team
//! swap collapses to the most recent team.

use std::collections::HashMap;

use chrono::NaiveDate;
use podium_core::{
  standing::{DriverSeason, TeamAppearance},
  store::{FactStore, ResultFilter},
};
use uuid::Uuid;

use crate::{Error, Result, check_season};

/// The constructor of the driver's latest result in `season`, or `None`
/// when the driver has no results that season.
pub async fn resolve_current_team<S: FactStore>(
  store: &S,
  driver_id: Uuid,
  season: i32,
) -> Result<Option<Uuid>> {
  check_season(season)?;
  store
    .get_driver(driver_id)
    .await
    .map_err(Error::store)?
    .ok_or(podium_core::Error::DriverNotFound(driver_id))?;

  let results = store
    .results(&ResultFilter {
      season: Some(season),
      driver: Some(driver_id),
      ..ResultFilter::default()
    })
    .await
    .map_err(Error::store)?;

  Ok(
    results
      .iter()
      .max_by_key(|row| (row.race_date, row.round))
      .map(|row| row.constructor_id),
  )
}

/// Resolve the driver's current team and upsert the single roster row.
/// Returns `None` (and writes nothing) when the driver has no results.
pub async fn sync_driver_season<S: FactStore>(
  store: &S,
  driver_id: Uuid,
  season: i32,
) -> Result<Option<DriverSeason>> {
  let Some(constructor_id) =
    resolve_current_team(store, driver_id, season).await?
  else {
    return Ok(None);
  };
  let row = store
    .set_driver_season(driver_id, season, constructor_id)
    .await
    .map_err(Error::store)?;
  Ok(Some(row))
}

/// Rebuild the whole roster for a season from its results. Returns the
/// number of drivers synced.
pub async fn rebuild_season_roster<S: FactStore>(
  store: &S,
  season: i32,
) -> Result<usize> {
  check_season(season)?;
  let results = store
    .results(&ResultFilter {
      season: Some(season),
      ..ResultFilter::default()
    })
    .await
    .map_err(Error::store)?;

  // Latest result per driver, in one pass over the season's rows.
  let mut latest: HashMap<Uuid, (NaiveDate, u32, Uuid)> = HashMap::new();
  for row in &results {
    let candidate = (row.race_date, row.round, row.constructor_id);
    latest
      .entry(row.driver_id)
      .and_modify(|current| {
        if (candidate.0, candidate.1) > (current.0, current.1) {
          *current = candidate;
        }
      })
      .or_insert(candidate);
  }

  tracing::info!(season, drivers = latest.len(), "rebuilding season roster");
  for (driver_id, (_, _, constructor_id)) in &latest {
    store
      .set_driver_season(*driver_id, season, *constructor_id)
      .await
      .map_err(Error::store)?;
  }
  Ok(latest.len())
}

/// A constructor's display attributes for a season: per-field override
/// from the season row, falling back to the constructor's base attributes.
pub async fn constructor_appearance<S: FactStore>(
  store: &S,
  constructor_id: Uuid,
  season: i32,
) -> Result<TeamAppearance> {
  check_season(season)?;
  let constructor = store
    .get_constructor(constructor_id)
    .await
    .map_err(Error::store)?
    .ok_or(podium_core::Error::ConstructorNotFound(constructor_id))?;
  let season_row = store
    .constructor_season(constructor_id, season)
    .await
    .map_err(Error::store)?;
  Ok(TeamAppearance::resolve(&constructor, season_row.as_ref()))
}
