//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and calendar dates as
//! `YYYY-MM-DD`. UUIDs are stored as hyphenated lowercase strings. Enums
//! are stored as their lowercase names.

use chrono::{DateTime, NaiveDate, Utc};
use podium_core::{
  race::{
    FastestLap, Lap, Qualifying, Race, RaceResult, ResultStatus, Sprint,
  },
  registry::{Constructor, Driver, Season},
  standing::{
    ChampionshipStanding, ConstructorSeason, DriverSeason, StandingType,
  },
  store::ResultFact,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── ResultStatus ────────────────────────────────────────────────────────────

pub fn encode_status(s: ResultStatus) -> &'static str {
  match s {
    ResultStatus::Finished => "finished",
    ResultStatus::Dnf => "dnf",
    ResultStatus::Dsq => "dsq",
    ResultStatus::Dns => "dns",
    ResultStatus::Retired => "retired",
  }
}

pub fn decode_status(s: &str) -> Result<ResultStatus> {
  match s {
    "finished" => Ok(ResultStatus::Finished),
    "dnf" => Ok(ResultStatus::Dnf),
    "dsq" => Ok(ResultStatus::Dsq),
    "dns" => Ok(ResultStatus::Dns),
    "retired" => Ok(ResultStatus::Retired),
    other => Err(Error::Decode(format!("unknown result status: {other:?}"))),
  }
}

// ─── StandingType ────────────────────────────────────────────────────────────

pub fn encode_standing_type(t: StandingType) -> &'static str {
  match t {
    StandingType::Driver => "driver",
    StandingType::Constructor => "constructor",
  }
}

pub fn decode_standing_type(s: &str) -> Result<StandingType> {
  match s {
    "driver" => Ok(StandingType::Driver),
    "constructor" => Ok(StandingType::Constructor),
    other => Err(Error::Decode(format!("unknown standing type: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `seasons` row.
pub struct RawSeason {
  pub year:       i32,
  pub created_at: String,
}

impl RawSeason {
  pub fn into_season(self) -> Result<Season> {
    Ok(Season {
      year:       self.year,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `drivers` row.
pub struct RawDriver {
  pub driver_id:     String,
  pub driver_ref:    String,
  pub number:        Option<u32>,
  pub code:          Option<String>,
  pub first_name:    String,
  pub last_name:     String,
  pub date_of_birth: Option<String>,
  pub nationality:   String,
  pub created_at:    String,
}

impl RawDriver {
  pub fn into_driver(self) -> Result<Driver> {
    Ok(Driver {
      driver_id:     decode_uuid(&self.driver_id)?,
      driver_ref:    self.driver_ref,
      number:        self.number,
      code:          self.code,
      date_of_birth: self
        .date_of_birth
        .as_deref()
        .map(decode_date)
        .transpose()?,
      first_name:    self.first_name,
      last_name:     self.last_name,
      nationality:   self.nationality,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `constructors` row.
pub struct RawConstructor {
  pub constructor_id:       String,
  pub constructor_ref:      String,
  pub name:                 String,
  pub nationality:          String,
  pub car_model:            Option<String>,
  pub car_image_url:        Option<String>,
  pub team_color:           Option<String>,
  pub team_color_secondary: Option<String>,
  pub created_at:           String,
}

impl RawConstructor {
  pub fn into_constructor(self) -> Result<Constructor> {
    Ok(Constructor {
      constructor_id:       decode_uuid(&self.constructor_id)?,
      constructor_ref:      self.constructor_ref,
      name:                 self.name,
      nationality:          self.nationality,
      car_model:            self.car_model,
      car_image_url:        self.car_image_url,
      team_color:           self.team_color,
      team_color_secondary: self.team_color_secondary,
      created_at:           decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `races` row.
pub struct RawRace {
  pub race_id:    String,
  pub season:     i32,
  pub round:      u32,
  pub name:       String,
  pub circuit:    String,
  pub locality:   String,
  pub country:    String,
  pub date:       String,
  pub created_at: String,
}

impl RawRace {
  pub fn into_race(self) -> Result<Race> {
    Ok(Race {
      race_id:    decode_uuid(&self.race_id)?,
      season:     self.season,
      round:      self.round,
      name:       self.name,
      circuit:    self.circuit,
      locality:   self.locality,
      country:    self.country,
      date:       decode_date(&self.date)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read from a `results` row joined with its race and the
/// driver/constructor registries.
pub struct RawResultFact {
  pub result_id:       String,
  pub season:          i32,
  pub round:           u32,
  pub race_date:       String,
  pub driver_id:       String,
  pub driver_ref:      String,
  pub constructor_id:  String,
  pub constructor_ref: String,
  pub grid_position:   u32,
  pub final_position:  Option<u32>,
  pub points:          f64,
  pub status:          String,
}

impl RawResultFact {
  pub fn into_fact(self) -> Result<ResultFact> {
    Ok(ResultFact {
      result_id:       decode_uuid(&self.result_id)?,
      season:          self.season,
      round:           self.round,
      race_date:       decode_date(&self.race_date)?,
      driver_id:       decode_uuid(&self.driver_id)?,
      driver_ref:      self.driver_ref,
      constructor_id:  decode_uuid(&self.constructor_id)?,
      constructor_ref: self.constructor_ref,
      grid_position:   self.grid_position,
      final_position:  self.final_position,
      points:          self.points,
      status:          decode_status(&self.status)?,
    })
  }
}

/// Raw strings read directly from a full `results` row.
pub struct RawResult {
  pub result_id:         String,
  pub race_id:           String,
  pub driver_id:         String,
  pub constructor_id:    String,
  pub grid_position:     u32,
  pub final_position:    Option<u32>,
  pub position_text:     String,
  pub points:            f64,
  pub laps_completed:    u32,
  pub status:            String,
  pub retirement_reason: Option<String>,
  pub fastest_lap:       Option<u32>,
  pub fastest_lap_time:  Option<String>,
  pub fastest_lap_speed: Option<f64>,
  pub created_at:        String,
}

impl RawResult {
  pub fn into_result(self) -> Result<RaceResult> {
    let fastest_lap = match (self.fastest_lap, self.fastest_lap_time) {
      (Some(lap), Some(time)) => Some(FastestLap {
        lap,
        time,
        speed_kph: self.fastest_lap_speed,
      }),
      _ => None,
    };
    Ok(RaceResult {
      result_id:         decode_uuid(&self.result_id)?,
      race_id:           decode_uuid(&self.race_id)?,
      driver_id:         decode_uuid(&self.driver_id)?,
      constructor_id:    decode_uuid(&self.constructor_id)?,
      grid_position:     self.grid_position,
      final_position:    self.final_position,
      position_text:     self.position_text,
      points:            self.points,
      laps_completed:    self.laps_completed,
      status:            decode_status(&self.status)?,
      retirement_reason: self.retirement_reason,
      fastest_lap,
      created_at:        decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `standings` row.
pub struct RawStanding {
  pub standing_id:   String,
  pub season:        i32,
  pub standing_type: String,
  pub round:         u32,
  pub subject_id:    String,
  pub position:      u32,
  pub points:        f64,
  pub wins:          u32,
  pub updated_at:    String,
}

impl RawStanding {
  pub fn into_standing(self) -> Result<ChampionshipStanding> {
    Ok(ChampionshipStanding {
      standing_id:   decode_uuid(&self.standing_id)?,
      season:        self.season,
      standing_type: decode_standing_type(&self.standing_type)?,
      round:         self.round,
      subject_id:    decode_uuid(&self.subject_id)?,
      position:      self.position,
      points:        self.points,
      wins:          self.wins,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `driver_seasons` row.
pub struct RawDriverSeason {
  pub driver_id:      String,
  pub season:         i32,
  pub constructor_id: String,
  pub updated_at:     String,
}

impl RawDriverSeason {
  pub fn into_driver_season(self) -> Result<DriverSeason> {
    Ok(DriverSeason {
      driver_id:      decode_uuid(&self.driver_id)?,
      season:         self.season,
      constructor_id: decode_uuid(&self.constructor_id)?,
      updated_at:     decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `constructor_seasons` row.
pub struct RawConstructorSeason {
  pub constructor_id:       String,
  pub season:               i32,
  pub car_model:            Option<String>,
  pub car_image_url:        Option<String>,
  pub team_color:           Option<String>,
  pub team_color_secondary: Option<String>,
  pub updated_at:           String,
}

impl RawConstructorSeason {
  pub fn into_constructor_season(self) -> Result<ConstructorSeason> {
    Ok(ConstructorSeason {
      constructor_id:       decode_uuid(&self.constructor_id)?,
      season:               self.season,
      car_model:            self.car_model,
      car_image_url:        self.car_image_url,
      team_color:           self.team_color,
      team_color_secondary: self.team_color_secondary,
      updated_at:           decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `qualifying` row.
pub struct RawQualifying {
  pub qualifying_id:  String,
  pub race_id:        String,
  pub driver_id:      String,
  pub constructor_id: String,
  pub position:       u32,
  pub q1_time:        Option<String>,
  pub q2_time:        Option<String>,
  pub q3_time:        Option<String>,
  pub created_at:     String,
}

impl RawQualifying {
  pub fn into_qualifying(self) -> Result<Qualifying> {
    Ok(Qualifying {
      qualifying_id:  decode_uuid(&self.qualifying_id)?,
      race_id:        decode_uuid(&self.race_id)?,
      driver_id:      decode_uuid(&self.driver_id)?,
      constructor_id: decode_uuid(&self.constructor_id)?,
      position:       self.position,
      q1_time:        self.q1_time,
      q2_time:        self.q2_time,
      q3_time:        self.q3_time,
      created_at:     decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `sprints` row.
pub struct RawSprint {
  pub sprint_id:         String,
  pub race_id:           String,
  pub driver_id:         String,
  pub constructor_id:    String,
  pub grid_position:     u32,
  pub final_position:    Option<u32>,
  pub position_text:     String,
  pub points:            f64,
  pub laps_completed:    u32,
  pub status:            String,
  pub retirement_reason: Option<String>,
  pub created_at:        String,
}

impl RawSprint {
  pub fn into_sprint(self) -> Result<Sprint> {
    Ok(Sprint {
      sprint_id:         decode_uuid(&self.sprint_id)?,
      race_id:           decode_uuid(&self.race_id)?,
      driver_id:         decode_uuid(&self.driver_id)?,
      constructor_id:    decode_uuid(&self.constructor_id)?,
      grid_position:     self.grid_position,
      final_position:    self.final_position,
      position_text:     self.position_text,
      points:            self.points,
      laps_completed:    self.laps_completed,
      status:            decode_status(&self.status)?,
      retirement_reason: self.retirement_reason,
      created_at:        decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `laps` row.
pub struct RawLap {
  pub lap_id:          String,
  pub race_id:         String,
  pub driver_id:       String,
  pub lap_number:      u32,
  pub position:        u32,
  pub lap_time:        String,
  pub lap_time_millis: Option<u32>,
  pub created_at:      String,
}

impl RawLap {
  pub fn into_lap(self) -> Result<Lap> {
    Ok(Lap {
      lap_id:          decode_uuid(&self.lap_id)?,
      race_id:         decode_uuid(&self.race_id)?,
      driver_id:       decode_uuid(&self.driver_id)?,
      lap_number:      self.lap_number,
      position:        self.position,
      lap_time:        self.lap_time,
      lap_time_millis: self.lap_time_millis,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}
