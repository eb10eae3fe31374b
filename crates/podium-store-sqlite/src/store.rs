//! [`SqliteStore`] — the SQLite implementation of [`FactStore`].

use std::collections::HashSet;
use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use podium_core::{
  race::{
    Lap, NewLap, NewQualifying, NewRace, NewRaceResult, NewSprint, Qualifying,
    Race, RaceResult, Sprint,
  },
  registry::{Constructor, Driver, NewConstructor, NewDriver, Season},
  standing::{
    ChampionshipStanding, ConstructorSeason, DriverSeason,
    NewConstructorSeason, StandingRow, StandingType,
  },
  store::{FactStore, ResultFact, ResultFilter, SaveOutcome},
};

use crate::{
  encode::{
    encode_date, encode_dt, encode_standing_type, encode_status, encode_uuid,
    RawConstructor, RawConstructorSeason, RawDriver, RawDriverSeason, RawLap,
    RawQualifying, RawRace, RawResult, RawResultFact, RawSeason, RawSprint,
    RawStanding,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Podium fact store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted, and all
/// statements run serially on its dedicated database thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Row-mapping helpers ─────────────────────────────────────────────────────

fn map_season(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawSeason> {
  Ok(RawSeason {
    year:       row.get(0)?,
    created_at: row.get(1)?,
  })
}

fn map_driver(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawDriver> {
  Ok(RawDriver {
    driver_id:     row.get(0)?,
    driver_ref:    row.get(1)?,
    number:        row.get(2)?,
    code:          row.get(3)?,
    first_name:    row.get(4)?,
    last_name:     row.get(5)?,
    date_of_birth: row.get(6)?,
    nationality:   row.get(7)?,
    created_at:    row.get(8)?,
  })
}

const DRIVER_COLUMNS: &str = "driver_id, driver_ref, number, code, \
   first_name, last_name, date_of_birth, nationality, created_at";

fn map_constructor(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawConstructor> {
  Ok(RawConstructor {
    constructor_id:       row.get(0)?,
    constructor_ref:      row.get(1)?,
    name:                 row.get(2)?,
    nationality:          row.get(3)?,
    car_model:            row.get(4)?,
    car_image_url:        row.get(5)?,
    team_color:           row.get(6)?,
    team_color_secondary: row.get(7)?,
    created_at:           row.get(8)?,
  })
}

const CONSTRUCTOR_COLUMNS: &str = "constructor_id, constructor_ref, name, \
   nationality, car_model, car_image_url, team_color, team_color_secondary, \
   created_at";

fn map_race(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRace> {
  Ok(RawRace {
    race_id:    row.get(0)?,
    season:     row.get(1)?,
    round:      row.get(2)?,
    name:       row.get(3)?,
    circuit:    row.get(4)?,
    locality:   row.get(5)?,
    country:    row.get(6)?,
    date:       row.get(7)?,
    created_at: row.get(8)?,
  })
}

fn map_standing(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawStanding> {
  Ok(RawStanding {
    standing_id:   row.get(0)?,
    season:        row.get(1)?,
    standing_type: row.get(2)?,
    round:         row.get(3)?,
    subject_id:    row.get(4)?,
    position:      row.get(5)?,
    points:        row.get(6)?,
    wins:          row.get(7)?,
    updated_at:    row.get(8)?,
  })
}

const STANDING_COLUMNS: &str = "standing_id, season, standing_type, round, \
   subject_id, position, points, wins, updated_at";

fn map_driver_season(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<RawDriverSeason> {
  Ok(RawDriverSeason {
    driver_id:      row.get(0)?,
    season:         row.get(1)?,
    constructor_id: row.get(2)?,
    updated_at:     row.get(3)?,
  })
}

// ─── FactStore impl ──────────────────────────────────────────────────────────

impl FactStore for SqliteStore {
  type Error = Error;

  // ── Registries ────────────────────────────────────────────────────────────

  async fn add_season(&self, year: i32) -> Result<Season> {
    let season = Season { year, created_at: Utc::now() };
    let at_str = encode_dt(season.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO seasons (year, created_at) VALUES (?1, ?2)",
          rusqlite::params![year, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(season)
  }

  async fn get_season(&self, year: i32) -> Result<Option<Season>> {
    let raw: Option<RawSeason> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT year, created_at FROM seasons WHERE year = ?1",
              rusqlite::params![year],
              map_season,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSeason::into_season).transpose()
  }

  async fn list_seasons(&self) -> Result<Vec<Season>> {
    let raws: Vec<RawSeason> = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare("SELECT year, created_at FROM seasons ORDER BY year DESC")?;
        let rows = stmt
          .query_map([], map_season)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSeason::into_season).collect()
  }

  async fn add_driver(&self, input: NewDriver) -> Result<Driver> {
    let driver = Driver {
      driver_id:     Uuid::new_v4(),
      driver_ref:    input.driver_ref,
      number:        input.number,
      code:          input.code,
      first_name:    input.first_name,
      last_name:     input.last_name,
      date_of_birth: input.date_of_birth,
      nationality:   input.nationality,
      created_at:    Utc::now(),
    };

    let id_str  = encode_uuid(driver.driver_id);
    let dob_str = driver.date_of_birth.map(encode_date);
    let at_str  = encode_dt(driver.created_at);
    let d       = driver.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO drivers (
             driver_id, driver_ref, number, code, first_name, last_name,
             date_of_birth, nationality, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            id_str,
            d.driver_ref,
            d.number,
            d.code,
            d.first_name,
            d.last_name,
            dob_str,
            d.nationality,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(driver)
  }

  async fn get_driver(&self, id: Uuid) -> Result<Option<Driver>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawDriver> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {DRIVER_COLUMNS} FROM drivers WHERE driver_id = ?1"),
              rusqlite::params![id_str],
              map_driver,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawDriver::into_driver).transpose()
  }

  async fn get_driver_by_ref(&self, driver_ref: &str) -> Result<Option<Driver>> {
    let ref_str = driver_ref.to_owned();

    let raw: Option<RawDriver> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {DRIVER_COLUMNS} FROM drivers WHERE driver_ref = ?1"),
              rusqlite::params![ref_str],
              map_driver,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawDriver::into_driver).transpose()
  }

  async fn list_drivers(&self) -> Result<Vec<Driver>> {
    let raws: Vec<RawDriver> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {DRIVER_COLUMNS} FROM drivers ORDER BY last_name, first_name"
        ))?;
        let rows = stmt
          .query_map([], map_driver)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDriver::into_driver).collect()
  }

  async fn add_constructor(&self, input: NewConstructor) -> Result<Constructor> {
    let constructor = Constructor {
      constructor_id:       Uuid::new_v4(),
      constructor_ref:      input.constructor_ref,
      name:                 input.name,
      nationality:          input.nationality,
      car_model:            input.car_model,
      car_image_url:        input.car_image_url,
      team_color:           input.team_color,
      team_color_secondary: input.team_color_secondary,
      created_at:           Utc::now(),
    };

    let id_str = encode_uuid(constructor.constructor_id);
    let at_str = encode_dt(constructor.created_at);
    let c      = constructor.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO constructors (
             constructor_id, constructor_ref, name, nationality, car_model,
             car_image_url, team_color, team_color_secondary, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            id_str,
            c.constructor_ref,
            c.name,
            c.nationality,
            c.car_model,
            c.car_image_url,
            c.team_color,
            c.team_color_secondary,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(constructor)
  }

  async fn get_constructor(&self, id: Uuid) -> Result<Option<Constructor>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawConstructor> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {CONSTRUCTOR_COLUMNS} FROM constructors
                 WHERE constructor_id = ?1"
              ),
              rusqlite::params![id_str],
              map_constructor,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawConstructor::into_constructor).transpose()
  }

  async fn get_constructor_by_ref(
    &self,
    constructor_ref: &str,
  ) -> Result<Option<Constructor>> {
    let ref_str = constructor_ref.to_owned();

    let raw: Option<RawConstructor> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {CONSTRUCTOR_COLUMNS} FROM constructors
                 WHERE constructor_ref = ?1"
              ),
              rusqlite::params![ref_str],
              map_constructor,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawConstructor::into_constructor).transpose()
  }

  async fn list_constructors(&self) -> Result<Vec<Constructor>> {
    let raws: Vec<RawConstructor> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CONSTRUCTOR_COLUMNS} FROM constructors ORDER BY name"
        ))?;
        let rows = stmt
          .query_map([], map_constructor)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawConstructor::into_constructor)
      .collect()
  }

  // ── Calendar ──────────────────────────────────────────────────────────────

  async fn add_race(&self, input: NewRace) -> Result<Race> {
    let race = Race {
      race_id:    Uuid::new_v4(),
      season:     input.season,
      round:      input.round,
      name:       input.name,
      circuit:    input.circuit,
      locality:   input.locality,
      country:    input.country,
      date:       input.date,
      created_at: Utc::now(),
    };

    let id_str   = encode_uuid(race.race_id);
    let date_str = encode_date(race.date);
    let at_str   = encode_dt(race.created_at);
    let r        = race.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO races (
             race_id, season, round, name, circuit, locality, country,
             date, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            id_str, r.season, r.round, r.name, r.circuit, r.locality,
            r.country, date_str, at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(race)
  }

  async fn races(&self, season: i32) -> Result<Vec<Race>> {
    let raws: Vec<RawRace> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT race_id, season, round, name, circuit, locality, country,
                  date, created_at
           FROM races WHERE season = ?1 ORDER BY round ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![season], map_race)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRace::into_race).collect()
  }

  // ── Race facts ────────────────────────────────────────────────────────────

  async fn record_result(&self, input: NewRaceResult) -> Result<RaceResult> {
    let now = Utc::now();

    let race_str   = encode_uuid(input.race_id);
    let driver_str = encode_uuid(input.driver_id);
    let ctor_str   = encode_uuid(input.constructor_id);
    let new_id_str = encode_uuid(Uuid::new_v4());
    let status_str = encode_status(input.status).to_owned();
    let at_str     = encode_dt(now);
    let fl         = input.fastest_lap.clone();
    let i          = input.clone();

    // RETURNING yields the stored identity: the fresh one on insert, the
    // original one when the row already existed and was corrected.
    let (id_str, created_str): (String, String) = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "INSERT INTO results (
             result_id, race_id, driver_id, constructor_id, grid_position,
             final_position, position_text, points, laps_completed, status,
             retirement_reason, fastest_lap, fastest_lap_time,
             fastest_lap_speed, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                     ?13, ?14, ?15)
           ON CONFLICT (race_id, driver_id) DO UPDATE SET
             constructor_id    = excluded.constructor_id,
             grid_position     = excluded.grid_position,
             final_position    = excluded.final_position,
             position_text     = excluded.position_text,
             points            = excluded.points,
             laps_completed    = excluded.laps_completed,
             status            = excluded.status,
             retirement_reason = excluded.retirement_reason,
             fastest_lap       = excluded.fastest_lap,
             fastest_lap_time  = excluded.fastest_lap_time,
             fastest_lap_speed = excluded.fastest_lap_speed
           RETURNING result_id, created_at",
          rusqlite::params![
            new_id_str,
            race_str,
            driver_str,
            ctor_str,
            i.grid_position,
            i.final_position,
            i.position_text,
            i.points,
            i.laps_completed,
            status_str,
            i.retirement_reason,
            fl.as_ref().map(|f| f.lap),
            fl.as_ref().map(|f| f.time.clone()),
            fl.as_ref().and_then(|f| f.speed_kph),
            at_str,
          ],
          |row| Ok((row.get(0)?, row.get(1)?)),
        )?)
      })
      .await?;

    Ok(RaceResult {
      result_id:         crate::encode::decode_uuid(&id_str)?,
      race_id:           input.race_id,
      driver_id:         input.driver_id,
      constructor_id:    input.constructor_id,
      grid_position:     input.grid_position,
      final_position:    input.final_position,
      position_text:     input.position_text,
      points:            input.points,
      laps_completed:    input.laps_completed,
      status:            input.status,
      retirement_reason: input.retirement_reason,
      fastest_lap:       input.fastest_lap,
      created_at:        crate::encode::decode_dt(&created_str)?,
    })
  }

  async fn get_result(
    &self,
    race_id: Uuid,
    driver_id: Uuid,
  ) -> Result<Option<RaceResult>> {
    let race_str   = encode_uuid(race_id);
    let driver_str = encode_uuid(driver_id);

    let raw: Option<RawResult> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT result_id, race_id, driver_id, constructor_id,
                      grid_position, final_position, position_text, points,
                      laps_completed, status, retirement_reason, fastest_lap,
                      fastest_lap_time, fastest_lap_speed, created_at
               FROM results WHERE race_id = ?1 AND driver_id = ?2",
              rusqlite::params![race_str, driver_str],
              |row| {
                Ok(RawResult {
                  result_id:         row.get(0)?,
                  race_id:           row.get(1)?,
                  driver_id:         row.get(2)?,
                  constructor_id:    row.get(3)?,
                  grid_position:     row.get(4)?,
                  final_position:    row.get(5)?,
                  position_text:     row.get(6)?,
                  points:            row.get(7)?,
                  laps_completed:    row.get(8)?,
                  status:            row.get(9)?,
                  retirement_reason: row.get(10)?,
                  fastest_lap:       row.get(11)?,
                  fastest_lap_time:  row.get(12)?,
                  fastest_lap_speed: row.get(13)?,
                  created_at:        row.get(14)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawResult::into_result).transpose()
  }

  async fn results(&self, filter: &ResultFilter) -> Result<Vec<ResultFact>> {
    let season      = filter.season;
    let up_to_round = filter.up_to_round;
    let driver      = filter.driver.map(encode_uuid);
    let constructor = filter.constructor.map(encode_uuid);

    let raws: Vec<RawResultFact> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT res.result_id, ra.season, ra.round, ra.date,
                  res.driver_id, d.driver_ref,
                  res.constructor_id, c.constructor_ref,
                  res.grid_position, res.final_position, res.points,
                  res.status
           FROM results res
           JOIN races ra        ON ra.race_id = res.race_id
           JOIN drivers d       ON d.driver_id = res.driver_id
           JOIN constructors c  ON c.constructor_id = res.constructor_id
           WHERE (?1 IS NULL OR ra.season = ?1)
             AND (?2 IS NULL OR ra.round <= ?2)
             AND (?3 IS NULL OR res.driver_id = ?3)
             AND (?4 IS NULL OR res.constructor_id = ?4)
           ORDER BY ra.date ASC, ra.round ASC",
        )?;
        let rows = stmt
          .query_map(
            rusqlite::params![season, up_to_round, driver, constructor],
            |row| {
              Ok(RawResultFact {
                result_id:       row.get(0)?,
                season:          row.get(1)?,
                round:           row.get(2)?,
                race_date:       row.get(3)?,
                driver_id:       row.get(4)?,
                driver_ref:      row.get(5)?,
                constructor_id:  row.get(6)?,
                constructor_ref: row.get(7)?,
                grid_position:   row.get(8)?,
                final_position:  row.get(9)?,
                points:          row.get(10)?,
                status:          row.get(11)?,
              })
            },
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawResultFact::into_fact).collect()
  }

  async fn record_qualifying(&self, input: NewQualifying) -> Result<Qualifying> {
    let now = Utc::now();

    let race_str   = encode_uuid(input.race_id);
    let driver_str = encode_uuid(input.driver_id);
    let ctor_str   = encode_uuid(input.constructor_id);
    let new_id_str = encode_uuid(Uuid::new_v4());
    let at_str     = encode_dt(now);
    let i          = input.clone();

    let (id_str, created_str): (String, String) = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "INSERT INTO qualifying (
             qualifying_id, race_id, driver_id, constructor_id, position,
             q1_time, q2_time, q3_time, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
           ON CONFLICT (race_id, driver_id) DO UPDATE SET
             constructor_id = excluded.constructor_id,
             position       = excluded.position,
             q1_time        = excluded.q1_time,
             q2_time        = excluded.q2_time,
             q3_time        = excluded.q3_time
           RETURNING qualifying_id, created_at",
          rusqlite::params![
            new_id_str, race_str, driver_str, ctor_str, i.position,
            i.q1_time, i.q2_time, i.q3_time, at_str,
          ],
          |row| Ok((row.get(0)?, row.get(1)?)),
        )?)
      })
      .await?;

    Ok(Qualifying {
      qualifying_id:  crate::encode::decode_uuid(&id_str)?,
      race_id:        input.race_id,
      driver_id:      input.driver_id,
      constructor_id: input.constructor_id,
      position:       input.position,
      q1_time:        input.q1_time,
      q2_time:        input.q2_time,
      q3_time:        input.q3_time,
      created_at:     crate::encode::decode_dt(&created_str)?,
    })
  }

  async fn qualifying(&self, race_id: Uuid) -> Result<Vec<Qualifying>> {
    let race_str = encode_uuid(race_id);

    let raws: Vec<RawQualifying> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT qualifying_id, race_id, driver_id, constructor_id,
                  position, q1_time, q2_time, q3_time, created_at
           FROM qualifying WHERE race_id = ?1 ORDER BY position ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![race_str], |row| {
            Ok(RawQualifying {
              qualifying_id:  row.get(0)?,
              race_id:        row.get(1)?,
              driver_id:      row.get(2)?,
              constructor_id: row.get(3)?,
              position:       row.get(4)?,
              q1_time:        row.get(5)?,
              q2_time:        row.get(6)?,
              q3_time:        row.get(7)?,
              created_at:     row.get(8)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawQualifying::into_qualifying).collect()
  }

  async fn record_sprint(&self, input: NewSprint) -> Result<Sprint> {
    let now = Utc::now();

    let race_str   = encode_uuid(input.race_id);
    let driver_str = encode_uuid(input.driver_id);
    let ctor_str   = encode_uuid(input.constructor_id);
    let new_id_str = encode_uuid(Uuid::new_v4());
    let status_str = encode_status(input.status).to_owned();
    let at_str     = encode_dt(now);
    let i          = input.clone();

    let (id_str, created_str): (String, String) = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "INSERT INTO sprints (
             sprint_id, race_id, driver_id, constructor_id, grid_position,
             final_position, position_text, points, laps_completed, status,
             retirement_reason, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
           ON CONFLICT (race_id, driver_id) DO UPDATE SET
             constructor_id    = excluded.constructor_id,
             grid_position     = excluded.grid_position,
             final_position    = excluded.final_position,
             position_text     = excluded.position_text,
             points            = excluded.points,
             laps_completed    = excluded.laps_completed,
             status            = excluded.status,
             retirement_reason = excluded.retirement_reason
           RETURNING sprint_id, created_at",
          rusqlite::params![
            new_id_str, race_str, driver_str, ctor_str, i.grid_position,
            i.final_position, i.position_text, i.points, i.laps_completed,
            status_str, i.retirement_reason, at_str,
          ],
          |row| Ok((row.get(0)?, row.get(1)?)),
        )?)
      })
      .await?;

    Ok(Sprint {
      sprint_id:         crate::encode::decode_uuid(&id_str)?,
      race_id:           input.race_id,
      driver_id:         input.driver_id,
      constructor_id:    input.constructor_id,
      grid_position:     input.grid_position,
      final_position:    input.final_position,
      position_text:     input.position_text,
      points:            input.points,
      laps_completed:    input.laps_completed,
      status:            input.status,
      retirement_reason: input.retirement_reason,
      created_at:        crate::encode::decode_dt(&created_str)?,
    })
  }

  async fn sprints(&self, race_id: Uuid) -> Result<Vec<Sprint>> {
    let race_str = encode_uuid(race_id);

    let raws: Vec<RawSprint> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT sprint_id, race_id, driver_id, constructor_id,
                  grid_position, final_position, position_text, points,
                  laps_completed, status, retirement_reason, created_at
           FROM sprints WHERE race_id = ?1
           ORDER BY final_position IS NULL, final_position ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![race_str], |row| {
            Ok(RawSprint {
              sprint_id:         row.get(0)?,
              race_id:           row.get(1)?,
              driver_id:         row.get(2)?,
              constructor_id:    row.get(3)?,
              grid_position:     row.get(4)?,
              final_position:    row.get(5)?,
              position_text:     row.get(6)?,
              points:            row.get(7)?,
              laps_completed:    row.get(8)?,
              status:            row.get(9)?,
              retirement_reason: row.get(10)?,
              created_at:        row.get(11)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSprint::into_sprint).collect()
  }

  async fn record_lap(&self, input: NewLap) -> Result<Lap> {
    let now = Utc::now();

    let race_str   = encode_uuid(input.race_id);
    let driver_str = encode_uuid(input.driver_id);
    let new_id_str = encode_uuid(Uuid::new_v4());
    let at_str     = encode_dt(now);
    let i          = input.clone();

    let (id_str, created_str): (String, String) = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "INSERT INTO laps (
             lap_id, race_id, driver_id, lap_number, position, lap_time,
             lap_time_millis, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
           ON CONFLICT (race_id, driver_id, lap_number) DO UPDATE SET
             position        = excluded.position,
             lap_time        = excluded.lap_time,
             lap_time_millis = excluded.lap_time_millis
           RETURNING lap_id, created_at",
          rusqlite::params![
            new_id_str, race_str, driver_str, i.lap_number, i.position,
            i.lap_time, i.lap_time_millis, at_str,
          ],
          |row| Ok((row.get(0)?, row.get(1)?)),
        )?)
      })
      .await?;

    Ok(Lap {
      lap_id:          crate::encode::decode_uuid(&id_str)?,
      race_id:         input.race_id,
      driver_id:       input.driver_id,
      lap_number:      input.lap_number,
      position:        input.position,
      lap_time:        input.lap_time,
      lap_time_millis: input.lap_time_millis,
      created_at:      crate::encode::decode_dt(&created_str)?,
    })
  }

  async fn laps(&self, race_id: Uuid) -> Result<Vec<Lap>> {
    let race_str = encode_uuid(race_id);

    let raws: Vec<RawLap> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT lap_id, race_id, driver_id, lap_number, position,
                  lap_time, lap_time_millis, created_at
           FROM laps WHERE race_id = ?1
           ORDER BY lap_number ASC, position ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![race_str], |row| {
            Ok(RawLap {
              lap_id:          row.get(0)?,
              race_id:         row.get(1)?,
              driver_id:       row.get(2)?,
              lap_number:      row.get(3)?,
              position:        row.get(4)?,
              lap_time:        row.get(5)?,
              lap_time_millis: row.get(6)?,
              created_at:      row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLap::into_lap).collect()
  }

  // ── Derived rows — owned by the engine ────────────────────────────────────

  async fn replace_standings(
    &self,
    season: i32,
    standing_type: StandingType,
    round: u32,
    rows: &[StandingRow],
  ) -> Result<SaveOutcome> {
    let ty_str  = encode_standing_type(standing_type).to_owned();
    let now_str = encode_dt(Utc::now());

    // (subject_id, position, points, wins, fresh standing_id)
    let entries: Vec<(String, u32, f64, u32, String)> = rows
      .iter()
      .map(|row| {
        (
          encode_uuid(row.subject_id),
          row.position,
          row.points,
          row.wins,
          encode_uuid(Uuid::new_v4()),
        )
      })
      .collect();

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut outcome = SaveOutcome::default();
        {
          let mut existing: HashSet<String> = {
            let mut stmt = tx.prepare(
              "SELECT subject_id FROM standings
               WHERE season = ?1 AND standing_type = ?2 AND round = ?3",
            )?;
            stmt
              .query_map(rusqlite::params![season, ty_str, round], |row| {
                row.get::<_, String>(0)
              })?
              .collect::<rusqlite::Result<HashSet<_>>>()?
          };

          for (subject_id, position, points, wins, standing_id) in &entries {
            if existing.remove(subject_id) {
              tx.execute(
                "UPDATE standings
                 SET position = ?5, points = ?6, wins = ?7, updated_at = ?8
                 WHERE season = ?1 AND standing_type = ?2 AND round = ?3
                   AND subject_id = ?4",
                rusqlite::params![
                  season, ty_str, round, subject_id, position, points, wins,
                  now_str,
                ],
              )?;
              outcome.updated += 1;
            } else {
              tx.execute(
                "INSERT INTO standings (
                   standing_id, season, standing_type, round, subject_id,
                   position, points, wins, updated_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                rusqlite::params![
                  standing_id, season, ty_str, round, subject_id, position,
                  points, wins, now_str,
                ],
              )?;
              outcome.created += 1;
            }
          }

          // Whatever is left fell out of the ranking.
          for subject_id in existing {
            tx.execute(
              "DELETE FROM standings
               WHERE season = ?1 AND standing_type = ?2 AND round = ?3
                 AND subject_id = ?4",
              rusqlite::params![season, ty_str, round, subject_id],
            )?;
            outcome.pruned += 1;
          }
        }
        tx.commit()?;
        Ok(outcome)
      })
      .await?;

    Ok(outcome)
  }

  async fn standings(
    &self,
    season: i32,
    standing_type: StandingType,
    round: u32,
  ) -> Result<Vec<ChampionshipStanding>> {
    let ty_str = encode_standing_type(standing_type).to_owned();

    let raws: Vec<RawStanding> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {STANDING_COLUMNS} FROM standings
           WHERE season = ?1 AND standing_type = ?2 AND round = ?3
           ORDER BY position ASC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![season, ty_str, round], map_standing)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawStanding::into_standing).collect()
  }

  async fn subject_standings(
    &self,
    subject_id: Uuid,
    season: i32,
    standing_type: StandingType,
  ) -> Result<Vec<ChampionshipStanding>> {
    let subject_str = encode_uuid(subject_id);
    let ty_str      = encode_standing_type(standing_type).to_owned();

    let raws: Vec<RawStanding> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {STANDING_COLUMNS} FROM standings
           WHERE subject_id = ?1 AND season = ?2 AND standing_type = ?3
             AND round > 0
           ORDER BY round ASC"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![subject_str, season, ty_str],
            map_standing,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawStanding::into_standing).collect()
  }

  async fn final_standings(
    &self,
    subject_id: Uuid,
    standing_type: StandingType,
  ) -> Result<Vec<ChampionshipStanding>> {
    let subject_str = encode_uuid(subject_id);
    let ty_str      = encode_standing_type(standing_type).to_owned();

    let raws: Vec<RawStanding> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {STANDING_COLUMNS} FROM standings
           WHERE subject_id = ?1 AND standing_type = ?2 AND round = 0
           ORDER BY season ASC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![subject_str, ty_str], map_standing)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawStanding::into_standing).collect()
  }

  async fn set_driver_season(
    &self,
    driver_id: Uuid,
    season: i32,
    constructor_id: Uuid,
  ) -> Result<DriverSeason> {
    let row = DriverSeason {
      driver_id,
      season,
      constructor_id,
      updated_at: Utc::now(),
    };

    let driver_str = encode_uuid(driver_id);
    let ctor_str   = encode_uuid(constructor_id);
    let at_str     = encode_dt(row.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO driver_seasons (
             driver_id, season, constructor_id, updated_at
           ) VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (driver_id, season) DO UPDATE SET
             constructor_id = excluded.constructor_id,
             updated_at     = excluded.updated_at",
          rusqlite::params![driver_str, season, ctor_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(row)
  }

  async fn driver_seasons(&self, driver_id: Uuid) -> Result<Vec<DriverSeason>> {
    let driver_str = encode_uuid(driver_id);

    let raws: Vec<RawDriverSeason> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT driver_id, season, constructor_id, updated_at
           FROM driver_seasons WHERE driver_id = ?1 ORDER BY season ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![driver_str], map_driver_season)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawDriverSeason::into_driver_season)
      .collect()
  }

  async fn season_roster(&self, season: i32) -> Result<Vec<DriverSeason>> {
    let raws: Vec<RawDriverSeason> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT driver_id, season, constructor_id, updated_at
           FROM driver_seasons WHERE season = ?1 ORDER BY driver_id ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![season], map_driver_season)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawDriverSeason::into_driver_season)
      .collect()
  }

  async fn set_constructor_season(
    &self,
    input: NewConstructorSeason,
  ) -> Result<ConstructorSeason> {
    let row = ConstructorSeason {
      constructor_id:       input.constructor_id,
      season:               input.season,
      car_model:            input.car_model,
      car_image_url:        input.car_image_url,
      team_color:           input.team_color,
      team_color_secondary: input.team_color_secondary,
      updated_at:           Utc::now(),
    };

    let ctor_str = encode_uuid(row.constructor_id);
    let at_str   = encode_dt(row.updated_at);
    let r        = row.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO constructor_seasons (
             constructor_id, season, car_model, car_image_url, team_color,
             team_color_secondary, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
           ON CONFLICT (constructor_id, season) DO UPDATE SET
             car_model            = excluded.car_model,
             car_image_url        = excluded.car_image_url,
             team_color           = excluded.team_color,
             team_color_secondary = excluded.team_color_secondary,
             updated_at           = excluded.updated_at",
          rusqlite::params![
            ctor_str, r.season, r.car_model, r.car_image_url, r.team_color,
            r.team_color_secondary, at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(row)
  }

  async fn constructor_season(
    &self,
    constructor_id: Uuid,
    season: i32,
  ) -> Result<Option<ConstructorSeason>> {
    let ctor_str = encode_uuid(constructor_id);

    let raw: Option<RawConstructorSeason> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT constructor_id, season, car_model, car_image_url,
                      team_color, team_color_secondary, updated_at
               FROM constructor_seasons
               WHERE constructor_id = ?1 AND season = ?2",
              rusqlite::params![ctor_str, season],
              |row| {
                Ok(RawConstructorSeason {
                  constructor_id:       row.get(0)?,
                  season:               row.get(1)?,
                  car_model:            row.get(2)?,
                  car_image_url:        row.get(3)?,
                  team_color:           row.get(4)?,
                  team_color_secondary: row.get(5)?,
                  updated_at:           row.get(6)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .map(RawConstructorSeason::into_constructor_season)
      .transpose()
  }
}
