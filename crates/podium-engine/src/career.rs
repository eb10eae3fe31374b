//! Career statistics aggregation.
//!
//! Scans a driver's entire result history plus the cached season-total
//! standings. The `season` argument only affects `best_season_finish`,
//! the best classified position within the season being viewed.

use podium_core::{
  standing::{CareerStats, StandingType},
  store::{FactStore, ResultFilter},
};
use uuid::Uuid;

use crate::{Error, Result, check_season};

pub async fn career_stats<S: FactStore>(
  store: &S,
  driver_id: Uuid,
  season: i32,
) -> Result<CareerStats> {
  check_season(season)?;
  store
    .get_driver(driver_id)
    .await
    .map_err(Error::store)?
    .ok_or(podium_core::Error::DriverNotFound(driver_id))?;

  let results = store
    .results(&ResultFilter {
      driver: Some(driver_id),
      ..ResultFilter::default()
    })
    .await
    .map_err(Error::store)?;
  let finals = store
    .final_standings(driver_id, StandingType::Driver)
    .await
    .map_err(Error::store)?;
  let seasons = store.driver_seasons(driver_id).await.map_err(Error::store)?;

  let mut stats = CareerStats {
    total_seasons: seasons.len() as u32,
    ..CareerStats::default()
  };

  for row in &results {
    stats.career_points += row.points;
    match row.final_position {
      Some(1) => {
        stats.total_wins += 1;
        stats.total_podiums += 1;
      }
      Some(2 | 3) => stats.total_podiums += 1,
      _ => {}
    }
    if row.season == season
      && let Some(position) = row.final_position
    {
      stats.best_season_finish =
        Some(stats.best_season_finish.map_or(position, |b| b.min(position)));
    }
  }

  for standing in &finals {
    if standing.position == 1 {
      stats.world_championships += 1;
    }
    stats.best_championship_finish = Some(
      stats
        .best_championship_finish
        .map_or(standing.position, |b| b.min(standing.position)),
    );
  }

  Ok(stats)
}
