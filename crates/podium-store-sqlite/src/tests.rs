//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use podium_core::{
  race::{
    FastestLap, NewLap, NewQualifying, NewRace, NewRaceResult, NewSprint,
    ResultStatus,
  },
  registry::{NewConstructor, NewDriver},
  standing::{NewConstructorSeason, StandingRow, StandingType},
  store::{FactStore, ResultFilter},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

// ─── Registries ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_season() {
  let s = store().await;
  s.add_season(2024).await.unwrap();

  let fetched = s.get_season(2024).await.unwrap();
  assert_eq!(fetched.unwrap().year, 2024);
  assert!(s.get_season(1998).await.unwrap().is_none());
}

#[tokio::test]
async fn list_seasons_newest_first() {
  let s = store().await;
  s.add_season(2022).await.unwrap();
  s.add_season(2024).await.unwrap();
  s.add_season(2023).await.unwrap();

  let years: Vec<i32> = s
    .list_seasons()
    .await
    .unwrap()
    .into_iter()
    .map(|season| season.year)
    .collect();
  assert_eq!(years, [2024, 2023, 2022]);
}

#[tokio::test]
async fn add_and_get_driver_roundtrip() {
  let s = store().await;
  let mut input = NewDriver::new("alonso", "Fernando", "Alonso");
  input.number = Some(14);
  input.code = Some("ALO".into());
  input.date_of_birth = date(1981, 7, 29).into();
  input.nationality = "Spanish".into();

  let driver = s.add_driver(input).await.unwrap();

  let fetched = s.get_driver(driver.driver_id).await.unwrap().unwrap();
  assert_eq!(fetched.driver_ref, "alonso");
  assert_eq!(fetched.number, Some(14));
  assert_eq!(fetched.code.as_deref(), Some("ALO"));
  assert_eq!(fetched.date_of_birth, Some(date(1981, 7, 29)));
  assert_eq!(fetched.full_name(), "Fernando Alonso");

  let by_ref = s.get_driver_by_ref("alonso").await.unwrap().unwrap();
  assert_eq!(by_ref.driver_id, driver.driver_id);
  assert!(s.get_driver_by_ref("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn list_drivers_orders_by_name() {
  let s = store().await;
  s.add_driver(NewDriver::new("sainz", "Carlos", "Sainz"))
    .await
    .unwrap();
  s.add_driver(NewDriver::new("alonso", "Fernando", "Alonso"))
    .await
    .unwrap();

  let names: Vec<String> = s
    .list_drivers()
    .await
    .unwrap()
    .into_iter()
    .map(|d| d.last_name)
    .collect();
  assert_eq!(names, ["Alonso", "Sainz"]);
}

#[tokio::test]
async fn add_and_get_constructor_roundtrip() {
  let s = store().await;
  let mut input = NewConstructor::new("ferrari", "Ferrari");
  input.nationality = "Italian".into();
  input.team_color = Some("#dc0000".into());

  let constructor = s.add_constructor(input).await.unwrap();

  let fetched = s
    .get_constructor(constructor.constructor_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(fetched.name, "Ferrari");
  assert_eq!(fetched.team_color.as_deref(), Some("#dc0000"));

  let by_ref = s.get_constructor_by_ref("ferrari").await.unwrap().unwrap();
  assert_eq!(by_ref.constructor_id, constructor.constructor_id);

  let all = s.list_constructors().await.unwrap();
  assert_eq!(all.len(), 1);
}

// ─── Calendar ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn races_are_listed_in_round_order() {
  let s = store().await;
  s.add_race(NewRace::new(2024, 2, "Jeddah", date(2024, 3, 9)))
    .await
    .unwrap();
  s.add_race(NewRace::new(2024, 1, "Bahrain", date(2024, 3, 2)))
    .await
    .unwrap();
  s.add_race(NewRace::new(2023, 1, "Bahrain", date(2023, 3, 5)))
    .await
    .unwrap();

  let rounds: Vec<u32> = s
    .races(2024)
    .await
    .unwrap()
    .into_iter()
    .map(|race| race.round)
    .collect();
  assert_eq!(rounds, [1, 2]);
}

// ─── Results ─────────────────────────────────────────────────────────────────

struct Seeded {
  driver:      Uuid,
  constructor: Uuid,
  race:        Uuid,
}

async fn seed_one_result(s: &SqliteStore) -> Seeded {
  let driver = s
    .add_driver(NewDriver::new("verstappen", "Max", "Verstappen"))
    .await
    .unwrap()
    .driver_id;
  let constructor = s
    .add_constructor(NewConstructor::new("red_bull", "Red Bull"))
    .await
    .unwrap()
    .constructor_id;
  let race = s
    .add_race(NewRace::new(2024, 1, "Bahrain", date(2024, 3, 2)))
    .await
    .unwrap()
    .race_id;
  s.record_result(NewRaceResult::classified(
    race,
    driver,
    constructor,
    1,
    25.0,
  ))
  .await
  .unwrap();
  Seeded { driver, constructor, race }
}

#[tokio::test]
async fn record_result_and_query_joined_rows() {
  let s = store().await;
  let seeded = seed_one_result(&s).await;

  let rows = s
    .results(&ResultFilter {
      season: Some(2024),
      ..ResultFilter::default()
    })
    .await
    .unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].driver_id, seeded.driver);
  assert_eq!(rows[0].driver_ref, "verstappen");
  assert_eq!(rows[0].constructor_ref, "red_bull");
  assert_eq!(rows[0].season, 2024);
  assert_eq!(rows[0].round, 1);
  assert_eq!(rows[0].race_date, date(2024, 3, 2));
  assert_eq!(rows[0].points, 25.0);
  assert_eq!(rows[0].final_position, Some(1));
  assert_eq!(rows[0].status, ResultStatus::Finished);
}

#[tokio::test]
async fn record_result_again_corrects_in_place() {
  let s = store().await;
  let seeded = seed_one_result(&s).await;

  let before = s
    .get_result(seeded.race, seeded.driver)
    .await
    .unwrap()
    .unwrap();

  // A stewards' decision: disqualified, points stripped, but the fastest
  // lap stands.
  let mut correction = NewRaceResult::classified(
    seeded.race,
    seeded.driver,
    seeded.constructor,
    1,
    0.0,
  );
  correction.final_position = None;
  correction.position_text = "DSQ".into();
  correction.status = ResultStatus::Dsq;
  correction.fastest_lap = Some(FastestLap {
    lap:       44,
    time:      "1:31.044".into(),
    speed_kph: Some(218.3),
  });
  s.record_result(correction).await.unwrap();

  let after = s
    .get_result(seeded.race, seeded.driver)
    .await
    .unwrap()
    .unwrap();
  // Same row identity, replaced facts.
  assert_eq!(after.result_id, before.result_id);
  assert_eq!(after.points, 0.0);
  assert_eq!(after.final_position, None);
  assert_eq!(after.status, ResultStatus::Dsq);
  let fastest = after.fastest_lap.unwrap();
  assert_eq!(fastest.lap, 44);
  assert_eq!(fastest.speed_kph, Some(218.3));

  let rows = s
    .results(&ResultFilter {
      season: Some(2024),
      ..ResultFilter::default()
    })
    .await
    .unwrap();
  assert_eq!(rows.len(), 1, "correction must not duplicate the row");
}

#[tokio::test]
async fn retirements_carry_no_classification() {
  let s = store().await;
  let seeded = seed_one_result(&s).await;
  let other = s
    .add_driver(NewDriver::new("stroll", "Lance", "Stroll"))
    .await
    .unwrap()
    .driver_id;

  s.record_result(NewRaceResult::retired(
    seeded.race,
    other,
    seeded.constructor,
    12,
    "gearbox",
  ))
  .await
  .unwrap();

  let rows = s
    .results(&ResultFilter {
      season: Some(2024),
      driver: Some(other),
      ..ResultFilter::default()
    })
    .await
    .unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].final_position, None);
  assert_eq!(rows[0].points, 0.0);
  assert_eq!(rows[0].status, ResultStatus::Retired);

  let stored = s.get_result(seeded.race, other).await.unwrap().unwrap();
  assert_eq!(stored.retirement_reason.as_deref(), Some("gearbox"));
  assert_eq!(stored.position_text, "R");
}

#[tokio::test]
async fn results_filter_combinations() {
  let s = store().await;
  let d1 = s
    .add_driver(NewDriver::new("d1", "D", "One"))
    .await
    .unwrap()
    .driver_id;
  let d2 = s
    .add_driver(NewDriver::new("d2", "D", "Two"))
    .await
    .unwrap()
    .driver_id;
  let t1 = s
    .add_constructor(NewConstructor::new("t1", "T1"))
    .await
    .unwrap()
    .constructor_id;
  let t2 = s
    .add_constructor(NewConstructor::new("t2", "T2"))
    .await
    .unwrap()
    .constructor_id;
  let r1 = s
    .add_race(NewRace::new(2024, 1, "R1", date(2024, 3, 2)))
    .await
    .unwrap()
    .race_id;
  let r2 = s
    .add_race(NewRace::new(2024, 2, "R2", date(2024, 3, 9)))
    .await
    .unwrap()
    .race_id;

  for (race, driver, constructor, pos) in
    [(r1, d1, t1, 1), (r1, d2, t2, 2), (r2, d1, t1, 1), (r2, d2, t2, 2)]
  {
    s.record_result(NewRaceResult::classified(
      race,
      driver,
      constructor,
      pos,
      10.0,
    ))
    .await
    .unwrap();
  }

  let by_round = s
    .results(&ResultFilter {
      season: Some(2024),
      up_to_round: Some(1),
      ..ResultFilter::default()
    })
    .await
    .unwrap();
  assert_eq!(by_round.len(), 2);
  assert!(by_round.iter().all(|row| row.round == 1));

  let by_driver = s
    .results(&ResultFilter {
      driver: Some(d2),
      ..ResultFilter::default()
    })
    .await
    .unwrap();
  assert_eq!(by_driver.len(), 2);
  assert!(by_driver.iter().all(|row| row.driver_id == d2));

  let by_constructor = s
    .results(&ResultFilter {
      season: Some(2024),
      constructor: Some(t1),
      ..ResultFilter::default()
    })
    .await
    .unwrap();
  assert_eq!(by_constructor.len(), 2);
  assert!(by_constructor.iter().all(|row| row.constructor_id == t1));

  let everything = s.results(&ResultFilter::default()).await.unwrap();
  assert_eq!(everything.len(), 4);
}

// ─── Standings cache ─────────────────────────────────────────────────────────

fn standing_row(subject_ref: &str, position: u32, points: f64) -> StandingRow {
  StandingRow {
    position,
    subject_id: Uuid::new_v4(),
    subject_ref: subject_ref.to_string(),
    points,
    wins: 0,
    races_count: 1,
  }
}

#[tokio::test]
async fn replace_standings_counts_created_then_updated() {
  let s = store().await;
  let rows =
    vec![standing_row("a", 1, 44.0), standing_row("b", 2, 30.0)];

  let first = s
    .replace_standings(2024, StandingType::Driver, 0, &rows)
    .await
    .unwrap();
  assert_eq!((first.created, first.updated, first.pruned), (2, 0, 0));

  let second = s
    .replace_standings(2024, StandingType::Driver, 0, &rows)
    .await
    .unwrap();
  assert_eq!((second.created, second.updated, second.pruned), (0, 2, 0));

  let cached = s.standings(2024, StandingType::Driver, 0).await.unwrap();
  assert_eq!(cached.len(), 2);
  assert_eq!(cached[0].position, 1);
  assert_eq!(cached[0].points, 44.0);
}

#[tokio::test]
async fn replace_standings_prunes_departed_subjects() {
  let s = store().await;
  let keep = standing_row("keep", 1, 44.0);
  let departing = standing_row("gone", 2, 30.0);

  s.replace_standings(
    2024,
    StandingType::Driver,
    0,
    &[keep.clone(), departing],
  )
  .await
  .unwrap();

  let outcome = s
    .replace_standings(2024, StandingType::Driver, 0, &[keep.clone()])
    .await
    .unwrap();
  assert_eq!((outcome.created, outcome.updated, outcome.pruned), (0, 1, 1));

  let cached = s.standings(2024, StandingType::Driver, 0).await.unwrap();
  assert_eq!(cached.len(), 1);
  assert_eq!(cached[0].subject_id, keep.subject_id);
}

#[tokio::test]
async fn snapshots_are_scoped_by_key() {
  let s = store().await;
  let rows = vec![standing_row("a", 1, 25.0)];

  s.replace_standings(2024, StandingType::Driver, 1, &rows)
    .await
    .unwrap();
  s.replace_standings(2024, StandingType::Constructor, 1, &rows)
    .await
    .unwrap();
  s.replace_standings(2023, StandingType::Driver, 1, &rows)
    .await
    .unwrap();

  assert_eq!(
    s.standings(2024, StandingType::Driver, 1).await.unwrap().len(),
    1
  );
  assert!(
    s.standings(2024, StandingType::Driver, 2)
      .await
      .unwrap()
      .is_empty()
  );
}

#[tokio::test]
async fn subject_standings_exclude_the_season_total() {
  let s = store().await;
  let subject = Uuid::new_v4();
  for round in [1u32, 2, 0] {
    let rows = vec![StandingRow {
      position: 1,
      subject_id: subject,
      subject_ref: "a".into(),
      points: f64::from(round) * 10.0,
      wins: 0,
      races_count: round.max(1),
    }];
    s.replace_standings(2024, StandingType::Driver, round, &rows)
      .await
      .unwrap();
  }

  let per_round = s
    .subject_standings(subject, 2024, StandingType::Driver)
    .await
    .unwrap();
  let rounds: Vec<u32> = per_round.iter().map(|row| row.round).collect();
  assert_eq!(rounds, [1, 2]);
}

#[tokio::test]
async fn final_standings_span_seasons_in_order() {
  let s = store().await;
  let subject = Uuid::new_v4();
  for (season, position) in [(2024, 1u32), (2022, 3), (2023, 2)] {
    let rows = vec![StandingRow {
      position,
      subject_id: subject,
      subject_ref: "a".into(),
      points: 100.0,
      wins: 0,
      races_count: 20,
    }];
    s.replace_standings(season, StandingType::Driver, 0, &rows)
      .await
      .unwrap();
  }

  let finals = s
    .final_standings(subject, StandingType::Driver)
    .await
    .unwrap();
  let seasons: Vec<i32> = finals.iter().map(|row| row.season).collect();
  assert_eq!(seasons, [2022, 2023, 2024]);
  let positions: Vec<u32> = finals.iter().map(|row| row.position).collect();
  assert_eq!(positions, [3, 2, 1]);
}

// ─── Roster & constructor seasons ────────────────────────────────────────────

#[tokio::test]
async fn set_driver_season_upserts_a_single_row() {
  let s = store().await;
  let driver = s
    .add_driver(NewDriver::new("d", "D", "D"))
    .await
    .unwrap()
    .driver_id;
  let team_a = s
    .add_constructor(NewConstructor::new("a", "A"))
    .await
    .unwrap()
    .constructor_id;
  let team_b = s
    .add_constructor(NewConstructor::new("b", "B"))
    .await
    .unwrap()
    .constructor_id;

  s.set_driver_season(driver, 2024, team_a).await.unwrap();
  s.set_driver_season(driver, 2024, team_b).await.unwrap();
  s.set_driver_season(driver, 2023, team_a).await.unwrap();

  let roster = s.season_roster(2024).await.unwrap();
  assert_eq!(roster.len(), 1);
  assert_eq!(roster[0].constructor_id, team_b);

  let seasons: Vec<i32> = s
    .driver_seasons(driver)
    .await
    .unwrap()
    .into_iter()
    .map(|row| row.season)
    .collect();
  assert_eq!(seasons, [2023, 2024]);
}

#[tokio::test]
async fn constructor_season_roundtrip_and_upsert() {
  let s = store().await;
  let constructor = s
    .add_constructor(NewConstructor::new("mclaren", "McLaren"))
    .await
    .unwrap()
    .constructor_id;

  assert!(s.constructor_season(constructor, 2024).await.unwrap().is_none());

  let mut input = NewConstructorSeason {
    constructor_id:       constructor,
    season:               2024,
    car_model:            Some("MCL38".into()),
    car_image_url:        None,
    team_color:           Some("#ff8000".into()),
    team_color_secondary: None,
  };
  s.set_constructor_season(input.clone()).await.unwrap();

  input.car_model = Some("MCL38A".into());
  s.set_constructor_season(input).await.unwrap();

  let row = s
    .constructor_season(constructor, 2024)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(row.car_model.as_deref(), Some("MCL38A"));
  assert_eq!(row.team_color.as_deref(), Some("#ff8000"));
}

// ─── Qualifying, sprints, laps ───────────────────────────────────────────────

#[tokio::test]
async fn qualifying_rows_upsert_and_order_by_position() {
  let s = store().await;
  let seeded = seed_one_result(&s).await;
  let other = s
    .add_driver(NewDriver::new("perez", "Sergio", "Perez"))
    .await
    .unwrap()
    .driver_id;

  s.record_qualifying(NewQualifying {
    race_id:        seeded.race,
    driver_id:      other,
    constructor_id: seeded.constructor,
    position:       2,
    q1_time:        Some("1:30.1".into()),
    q2_time:        Some("1:29.8".into()),
    q3_time:        None,
  })
  .await
  .unwrap();
  s.record_qualifying(NewQualifying {
    race_id:        seeded.race,
    driver_id:      seeded.driver,
    constructor_id: seeded.constructor,
    position:       3,
    q1_time:        Some("1:30.0".into()),
    q2_time:        Some("1:29.5".into()),
    q3_time:        Some("1:29.1".into()),
  })
  .await
  .unwrap();
  // Correction: pole after all.
  s.record_qualifying(NewQualifying {
    race_id:        seeded.race,
    driver_id:      seeded.driver,
    constructor_id: seeded.constructor,
    position:       1,
    q1_time:        Some("1:30.0".into()),
    q2_time:        Some("1:29.5".into()),
    q3_time:        Some("1:29.1".into()),
  })
  .await
  .unwrap();

  let rows = s.qualifying(seeded.race).await.unwrap();
  assert_eq!(rows.len(), 2);
  assert_eq!(rows[0].driver_id, seeded.driver);
  assert_eq!(rows[0].position, 1);
  assert_eq!(rows[0].q3_time.as_deref(), Some("1:29.1"));
}

#[tokio::test]
async fn sprint_rows_roundtrip() {
  let s = store().await;
  let seeded = seed_one_result(&s).await;

  s.record_sprint(NewSprint {
    race_id:           seeded.race,
    driver_id:         seeded.driver,
    constructor_id:    seeded.constructor,
    grid_position:     1,
    final_position:    Some(1),
    position_text:     "1".into(),
    points:            8.0,
    laps_completed:    24,
    status:            ResultStatus::Finished,
    retirement_reason: None,
  })
  .await
  .unwrap();

  let rows = s.sprints(seeded.race).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].points, 8.0);
  assert_eq!(rows[0].laps_completed, 24);

  // Sprint points never leak into the race-result aggregation feed.
  let results = s
    .results(&ResultFilter {
      season: Some(2024),
      ..ResultFilter::default()
    })
    .await
    .unwrap();
  let total: f64 = results.iter().map(|row| row.points).sum();
  assert_eq!(total, 25.0);
}

#[tokio::test]
async fn lap_rows_order_by_lap_then_position() {
  let s = store().await;
  let seeded = seed_one_result(&s).await;

  for (lap_number, millis) in [(2u32, 91_500u32), (1, 92_000)] {
    s.record_lap(NewLap {
      race_id:         seeded.race,
      driver_id:       seeded.driver,
      lap_number,
      position:        1,
      lap_time:        "1:31.5".into(),
      lap_time_millis: Some(millis),
    })
    .await
    .unwrap();
  }

  let laps = s.laps(seeded.race).await.unwrap();
  let numbers: Vec<u32> = laps.iter().map(|lap| lap.lap_number).collect();
  assert_eq!(numbers, [1, 2]);
}
