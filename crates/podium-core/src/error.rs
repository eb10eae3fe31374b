//! Error types for `podium-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("driver not found: {0}")]
  DriverNotFound(Uuid),

  #[error("constructor not found: {0}")]
  ConstructorNotFound(Uuid),

  #[error("season not found: {0}")]
  SeasonNotFound(i32),

  #[error("invalid season year {0}: the championship began in 1950")]
  InvalidSeason(i32),

  #[error("invalid round {0}: round ceilings are numbered from 1")]
  InvalidRound(u32),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
