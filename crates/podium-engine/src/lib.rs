//! Championship standings derivation for Podium.
//!
//! Every operation is generic over [`podium_core::store::FactStore`]: the
//! engine fetches plain result rows through the store and does all
//! grouping, summing, and ranking in memory, so it can be exercised against
//! the in-memory SQLite store without a live database.

pub mod career;
pub mod error;
pub mod recalc;
pub mod roster;
pub mod standings;
pub mod validate;

pub use error::{Error, Result};

/// Reject season years before the first championship.
pub(crate) fn check_season(year: i32) -> Result<()> {
  if year < podium_core::registry::FIRST_SEASON {
    return Err(podium_core::Error::InvalidSeason(year).into());
  }
  Ok(())
}

/// Round 0 is the season-total sentinel; it is not a valid ceiling.
pub(crate) fn check_round_ceiling(round: u32) -> Result<()> {
  if round == 0 {
    return Err(podium_core::Error::InvalidRound(round).into());
  }
  Ok(())
}
