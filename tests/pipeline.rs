use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use firepower::{
    align, daily_data, join_pair, resolve_closure, total_fire_power_by_day,
    total_fire_power_time_series, BreakHour, FireArena, FirePowerError, FireRecord,
};

fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 8, day, hour, minute, 0).unwrap()
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 8, day).unwrap()
}

/// Two complexes. Fires 11 and 12 merged into 10 (12 by way of 11), fire 20 burned on its own
/// and was seen by the other satellite.
fn fire_complexes() -> FireArena {
    let mut arena = FireArena::new();

    arena.add_fire(FireRecord::new(10, "G17"));
    arena.add_fire(FireRecord::new(11, "G17").merged_into(10));
    arena.add_fire(FireRecord::new(12, "G17").merged_into(11));
    arena.add_fire(FireRecord::new(20, "G16"));

    // Burn day August 1st with a 12Z break.
    arena.add_observation(10, at(1, 20, 0), 300.0, 700.0);
    arena.add_observation(11, at(1, 20, 0), 200.0, 750.0);
    arena.add_observation(12, at(1, 20, 0), 100.0, 650.0);
    arena.add_observation(10, at(2, 3, 0), 50.0, 500.0);

    // Burn day August 2nd.
    arena.add_observation(12, at(2, 12, 0), 20.0, 450.0);
    arena.add_observation(10, at(2, 22, 30), 900.0, 1100.0);

    // Fire 20, burn days August 2nd and 3rd.
    arena.add_observation(20, at(2, 18, 0), 400.0, 800.0);
    arena.add_observation(20, at(3, 18, 0), 450.0, 820.0);

    arena
}

#[test]
fn test_merge_closure_through_public_api() {
    let arena = fire_complexes();

    assert_eq!(resolve_closure(&arena, 10).unwrap().members(), &[10, 11, 12]);
    assert_eq!(resolve_closure(&arena, 11).unwrap().members(), &[11, 12]);
    assert_eq!(resolve_closure(&arena, 20).unwrap().members(), &[20]);
}

#[test]
fn test_time_series_includes_merged_fires() {
    let arena = fire_complexes();

    let series = total_fire_power_time_series(&arena, 10).unwrap();
    assert_eq!(series.satellite, "G17");

    let times: Vec<_> = series.rows.iter().map(|r| r.scan_time).collect();
    assert_eq!(times, vec![at(1, 20, 0), at(2, 3, 0), at(2, 12, 0), at(2, 22, 30)]);

    assert_eq!(series.rows[0].total_power, 600.0);
    assert_eq!(series.rows[0].max_temperature, 750.0);
    assert_eq!(series.max_power(), Some(900.0));

    // Only the part of the complex downstream of 11.
    let partial = total_fire_power_time_series(&arena, 11).unwrap();
    assert_eq!(partial.rows[0].total_power, 300.0);
    assert_eq!(partial.len(), 2);
}

#[test]
fn test_by_day_with_break_hour() {
    let arena = fire_complexes();

    let daily = total_fire_power_by_day(&arena, 10, BreakHour::default()).unwrap();
    assert_eq!(daily.days().collect::<Vec<_>>(), vec![date(1), date(2)]);

    let aug1 = daily.get(date(1)).unwrap();
    let seconds: Vec<_> = aug1.rows.iter().map(|r| r.second_of_burn_day).collect();
    assert_eq!(seconds, vec![8 * 3600, 15 * 3600]);

    let aug2 = daily.get(date(2)).unwrap();
    assert_eq!(aug2.rows[0].second_of_burn_day, 0);

    // Midnight breaks put the 03Z scan on the 2nd.
    let midnight = total_fire_power_by_day(&arena, 10, BreakHour::new(0).unwrap()).unwrap();
    assert_eq!(midnight.get(date(1)).unwrap().rows.len(), 1);
    assert_eq!(midnight.get(date(2)).unwrap().rows.len(), 3);
}

#[test]
fn test_compare_fires() {
    let arena = fire_complexes();
    let bh = BreakHour::default();

    let fires = daily_data(&arena, &[10, 20], bh, None, None).unwrap();

    let aligned = align(&fires);
    assert_eq!(
        aligned.days().collect::<Vec<_>>(),
        vec![date(1), date(2), date(3)]
    );
    assert_eq!(aligned.max_power(), Some(900.0));
    assert_eq!(aligned.keys().len(), 2);

    let paired = join_pair(&fires[0], &fires[1]);
    let shared: Vec<_> = paired.days.iter().map(|(d, _, _)| *d).collect();
    assert_eq!(shared, vec![date(2)]);

    let limited = daily_data(&arena, &[10, 20], bh, Some(date(2)), Some(date(2))).unwrap();
    let aligned = align(&limited);
    assert_eq!(aligned.days().collect::<Vec<_>>(), vec![date(2)]);
    assert_eq!(aligned.panels()[0].entries.len(), 2);
}

#[test]
fn test_unknown_fire_fails_fast() {
    let arena = fire_complexes();

    match daily_data(&arena, &[10, 99], BreakHour::default(), None, None) {
        Err(FirePowerError::EmptyClosure(99)) => {}
        other => panic!("expected an empty closure for fire 99, got {:?}", other),
    }
}
