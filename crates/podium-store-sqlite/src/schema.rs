//! SQL schema for the Podium SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS seasons (
    year        INTEGER PRIMARY KEY,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS drivers (
    driver_id     TEXT PRIMARY KEY,
    driver_ref    TEXT NOT NULL UNIQUE,  -- external natural key
    number        INTEGER,
    code          TEXT,                  -- three-letter timing code
    first_name    TEXT NOT NULL,
    last_name     TEXT NOT NULL,
    date_of_birth TEXT,
    nationality   TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS constructors (
    constructor_id       TEXT PRIMARY KEY,
    constructor_ref      TEXT NOT NULL UNIQUE,
    name                 TEXT NOT NULL,
    nationality          TEXT NOT NULL,
    car_model            TEXT,
    car_image_url        TEXT,
    team_color           TEXT,            -- '#rrggbb'
    team_color_secondary TEXT,
    created_at           TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS races (
    race_id     TEXT PRIMARY KEY,
    season      INTEGER NOT NULL,
    round       INTEGER NOT NULL,         -- numbered from 1
    name        TEXT NOT NULL,
    circuit     TEXT NOT NULL,
    locality    TEXT NOT NULL,
    country     TEXT NOT NULL,
    date        TEXT NOT NULL,            -- ISO 8601 calendar date
    created_at  TEXT NOT NULL,
    UNIQUE (season, round)
);

-- One row per (race, driver). Recording the same key again replaces the
-- non-key fields: corrective updates from the data provider.
CREATE TABLE IF NOT EXISTS results (
    result_id         TEXT PRIMARY KEY,
    race_id           TEXT NOT NULL REFERENCES races(race_id),
    driver_id         TEXT NOT NULL REFERENCES drivers(driver_id),
    constructor_id    TEXT NOT NULL REFERENCES constructors(constructor_id),
    grid_position     INTEGER NOT NULL,
    final_position    INTEGER,            -- NULL = did not classify
    position_text     TEXT NOT NULL,
    points            REAL NOT NULL DEFAULT 0,
    laps_completed    INTEGER NOT NULL DEFAULT 0,
    status            TEXT NOT NULL DEFAULT 'finished',
    retirement_reason TEXT,
    fastest_lap       INTEGER,
    fastest_lap_time  TEXT,
    fastest_lap_speed REAL,
    created_at        TEXT NOT NULL,
    UNIQUE (race_id, driver_id)
);

CREATE TABLE IF NOT EXISTS qualifying (
    qualifying_id  TEXT PRIMARY KEY,
    race_id        TEXT NOT NULL REFERENCES races(race_id),
    driver_id      TEXT NOT NULL REFERENCES drivers(driver_id),
    constructor_id TEXT NOT NULL REFERENCES constructors(constructor_id),
    position       INTEGER NOT NULL,
    q1_time        TEXT,
    q2_time        TEXT,
    q3_time        TEXT,
    created_at     TEXT NOT NULL,
    UNIQUE (race_id, driver_id)
);

CREATE TABLE IF NOT EXISTS sprints (
    sprint_id         TEXT PRIMARY KEY,
    race_id           TEXT NOT NULL REFERENCES races(race_id),
    driver_id         TEXT NOT NULL REFERENCES drivers(driver_id),
    constructor_id    TEXT NOT NULL REFERENCES constructors(constructor_id),
    grid_position     INTEGER NOT NULL,
    final_position    INTEGER,
    position_text     TEXT NOT NULL,
    points            REAL NOT NULL DEFAULT 0,
    laps_completed    INTEGER NOT NULL DEFAULT 0,
    status            TEXT NOT NULL DEFAULT 'finished',
    retirement_reason TEXT,
    created_at        TEXT NOT NULL,
    UNIQUE (race_id, driver_id)
);

CREATE TABLE IF NOT EXISTS laps (
    lap_id          TEXT PRIMARY KEY,
    race_id         TEXT NOT NULL REFERENCES races(race_id),
    driver_id       TEXT NOT NULL REFERENCES drivers(driver_id),
    lap_number      INTEGER NOT NULL,
    position        INTEGER NOT NULL,     -- position at the end of this lap
    lap_time        TEXT NOT NULL,        -- m:ss.SSS
    lap_time_millis INTEGER,
    created_at      TEXT NOT NULL,
    UNIQUE (race_id, driver_id, lap_number)
);

-- Derived cache, owned by the engine. Round 0 is the season total.
-- Replaced atomically per (season, standing_type, round).
CREATE TABLE IF NOT EXISTS standings (
    standing_id   TEXT PRIMARY KEY,
    season        INTEGER NOT NULL,
    standing_type TEXT NOT NULL,          -- 'driver' | 'constructor'
    round         INTEGER NOT NULL,
    subject_id    TEXT NOT NULL,
    position      INTEGER NOT NULL,
    points        REAL NOT NULL,
    wins          INTEGER NOT NULL DEFAULT 0,
    updated_at    TEXT NOT NULL,
    UNIQUE (season, standing_type, round, subject_id)
);

-- Derived roster, owned by the engine. The primary key guarantees a driver
-- maps to at most one team per season.
CREATE TABLE IF NOT EXISTS driver_seasons (
    driver_id      TEXT NOT NULL REFERENCES drivers(driver_id),
    season         INTEGER NOT NULL,
    constructor_id TEXT NOT NULL REFERENCES constructors(constructor_id),
    updated_at     TEXT NOT NULL,
    PRIMARY KEY (driver_id, season)
);

CREATE TABLE IF NOT EXISTS constructor_seasons (
    constructor_id       TEXT NOT NULL REFERENCES constructors(constructor_id),
    season               INTEGER NOT NULL,
    car_model            TEXT,
    car_image_url        TEXT,
    team_color           TEXT,
    team_color_secondary TEXT,
    updated_at           TEXT NOT NULL,
    PRIMARY KEY (constructor_id, season)
);

CREATE INDEX IF NOT EXISTS results_race_idx      ON results(race_id);
CREATE INDEX IF NOT EXISTS results_driver_idx    ON results(driver_id);
CREATE INDEX IF NOT EXISTS races_season_idx      ON races(season, round);
CREATE INDEX IF NOT EXISTS standings_key_idx     ON standings(season, standing_type, round);
CREATE INDEX IF NOT EXISTS standings_subject_idx ON standings(subject_id, standing_type, round);

PRAGMA user_version = 1;
";
