//! End-to-end conflict detection tests over the public API.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use deconflict_core::{
    position_at, sample, ConflictDetector, DetectionRules, DetectionStatus, Mission,
    MissionWaypoints, Position, SampleStep, Waypoint,
};

fn t(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_717_200_000 + secs, 0).unwrap()
}

fn line(id: &str, from: (f64, f64, f64, i64), to: (f64, f64, f64, i64)) -> Mission {
    Mission::from_timed(
        id,
        vec![
            Waypoint::new(from.0, from.1, from.2, t(from.3)),
            Waypoint::new(to.0, to.1, to.2, t(to.3)),
        ],
    )
    .unwrap()
}

fn detector(buffer: f64, threshold_secs: f64, missions: Vec<Mission>) -> ConflictDetector {
    let mut detector =
        ConflictDetector::new(DetectionRules::new(buffer, threshold_secs, 1.0)).unwrap();
    for mission in missions {
        detector.register(mission).unwrap();
    }
    detector
}

fn pair(a: &str, b: &str) -> (String, String) {
    (a.to_string(), b.to_string())
}

#[test]
fn sampled_trajectory_has_expected_length_and_endpoints() {
    let mission = Mission::new(
        "DRONE001",
        MissionWaypoints::Timed(vec![
            Waypoint::new(0.0, 0.0, 10.0, t(5)),
            Waypoint::new(40.0, 30.0, 10.0, t(60)),
            Waypoint::new(40.0, 90.0, 30.0, t(95)),
        ]),
        t(0),
        t(100),
    )
    .unwrap();
    let duration_us = mission.duration().num_microseconds().unwrap();

    for step_secs in [0.3, 0.7, 1.0, 2.5, 7.0, 100.0, 250.0] {
        let step = SampleStep::from_secs(step_secs).unwrap();
        let step_us = step.as_delta().num_microseconds().unwrap();
        let expected = (duration_us + step_us - 1) / step_us + 1;

        let samples = sample(&mission, step);
        assert_eq!(samples.len() as i64, expected, "step {step_secs}");
        assert_eq!(samples[0].position(), mission.first().position());
        assert_eq!(samples[samples.len() - 1].position(), mission.last().position());
        assert!(samples.windows(2).all(|w| w[0].time < w[1].time));
    }
}

#[test]
fn position_queries_clamp_outside_the_mission() {
    let mission = line("DRONE001", (0.0, 0.0, 0.0, 10), (100.0, 0.0, 0.0, 110));
    for secs in [-1_000, 0, 9, 10] {
        assert_eq!(position_at(&mission, t(secs)).position(), mission.first().position());
    }
    for secs in [110, 111, 100_000] {
        assert_eq!(position_at(&mission, t(secs)).position(), mission.last().position());
    }
}

#[test]
fn example_crossing_reports_conflict_near_crossing_point() {
    let a = line("A", (0.0, 0.0, 0.0, 0), (100.0, 0.0, 0.0, 100));
    let b = line("B", (50.0, -50.0, 0.0, 40), (50.0, 50.0, 0.0, 60));
    let detector = detector(5.0, 5.0, vec![a.clone(), b.clone()]);

    let report = detector.run();
    assert_eq!(report.status, DetectionStatus::Conflict);
    assert_eq!(report.conflicting_pairs(), vec![pair("A", "B")]);

    let crossing = Position::new(50.0, 0.0, 0.0);
    assert!(report
        .conflicts
        .iter()
        .any(|c| c.location().position().distance_to(&crossing) < 1e-9 && c.time() == t(50)));

    for conflict in &report.conflicts {
        assert!(conflict.location().position().distance_to(&crossing) <= 5.0);
        assert!(conflict.time() >= t(49) && conflict.time() <= t(51));
        assert!(conflict.separation() <= 5.0);

        // The location is the midpoint of two exact positions at most one
        // buffer apart, so it lies within the buffer of each of them.
        let earlier = conflict.time() - TimeDelta::seconds(conflict.time_gap_secs() as i64);
        for mission in [&a, &b] {
            let nearest = [conflict.time(), earlier]
                .iter()
                .map(|&time| position_at(mission, time).distance_to(conflict.location()))
                .fold(f64::INFINITY, f64::min);
            assert!(nearest <= 5.0, "{} too far from {}", mission.drone_id(), conflict);
        }
    }
}

#[test]
fn narrow_buffer_crossing_yields_single_conflict() {
    let a = line("A", (0.0, 0.0, 0.0, 0), (100.0, 0.0, 0.0, 100));
    let b = line("B", (50.0, -50.0, 0.0, 0), (50.0, 50.0, 0.0, 100));
    let report = detector(0.5, 5.0, vec![a, b]).run();

    assert_eq!(report.conflicts.len(), 1);
    let conflict = &report.conflicts[0];
    assert_eq!(conflict.location().position(), Position::new(50.0, 0.0, 0.0));
    assert_eq!(conflict.time(), t(50));
    assert!(conflict.involves("A") && conflict.involves("B"));
    assert_eq!(conflict.drone_ids().len(), 2);
}

#[test]
fn parallel_missions_are_clear() {
    let a = line("A", (0.0, 0.0, 50.0, 0), (100.0, 0.0, 50.0, 300));
    let b = line("B", (0.0, 50.0, 50.0, 0), (100.0, 50.0, 50.0, 300));
    let report = detector(10.0, 5.0, vec![a, b]).run();
    assert_eq!(report.status, DetectionStatus::Clear);
    assert!(report.conflicts.is_empty());
}

#[test]
fn spatial_crossing_at_different_times_is_clear() {
    let a = line("A", (0.0, 0.0, 0.0, 0), (100.0, 0.0, 0.0, 100));
    // Passes (50, 0) at t=150, long after A left.
    let c = line("C", (50.0, -50.0, 0.0, 100), (50.0, 50.0, 0.0, 200));
    assert!(detector(10.0, 5.0, vec![a, c]).run().is_clear());
}

#[test]
fn vertical_separation_is_respected() {
    let low = line("LOW", (0.0, 0.0, 20.0, 0), (100.0, 100.0, 20.0, 240));
    let high = line("HIGH", (100.0, 0.0, 200.0, 0), (0.0, 100.0, 200.0, 240));
    assert!(detector(10.0, 5.0, vec![low, high]).run().is_clear());
}

#[test]
fn zero_time_threshold_only_accepts_simultaneous_samples() {
    let a = line("A", (0.0, 0.0, 0.0, 0), (100.0, 0.0, 0.0, 100));
    let b = line("B", (100.0, 0.0, 0.0, 0), (0.0, 0.0, 0.0, 100));

    let loose = detector(10.0, 5.0, vec![a.clone(), b.clone()]).run();
    let strict = detector(10.0, 0.0, vec![a, b]).run();

    assert!(!strict.is_clear());
    assert!(strict.conflicts.len() < loose.conflicts.len());
    assert!(strict.conflicts.iter().all(|c| c.time_gap_secs() == 0.0));
    assert!(loose.conflicts.iter().any(|c| c.time_gap_secs() > 0.0));
}

#[test]
fn detection_is_symmetric_in_registration_order() {
    let a = line("A", (0.0, 0.0, 0.0, 0), (100.0, 0.0, 0.0, 100));
    let b = line("B", (50.0, -50.0, 0.0, 40), (50.0, 50.0, 0.0, 60));

    let key = |report: &deconflict_core::DetectionReport| {
        let mut rows: Vec<_> = report
            .conflicts
            .iter()
            .map(|c| {
                (
                    c.time(),
                    (c.location().x * 1e6).round() as i64,
                    (c.location().y * 1e6).round() as i64,
                    (c.location().z * 1e6).round() as i64,
                    c.drone_ids().clone(),
                )
            })
            .collect();
        rows.sort();
        rows
    };

    let forward = detector(5.0, 5.0, vec![a.clone(), b.clone()]).run();
    let backward = detector(5.0, 5.0, vec![b, a]).run();
    assert!(!forward.is_clear());
    assert_eq!(key(&forward), key(&backward));
}

#[test]
fn three_missions_with_two_conflicting_pairs() {
    let a = line("A", (0.0, 0.0, 0.0, 0), (100.0, 0.0, 0.0, 100));
    // Crosses A at (50, 0) at t=50
    let b = line("B", (50.0, -50.0, 0.0, 0), (50.0, 50.0, 0.0, 100));
    // Crosses A at (80, 0) at t=80, always 30 units from B
    let c = line("C", (80.0, -50.0, 0.0, 30), (80.0, 50.0, 0.0, 130));

    let report = detector(5.0, 5.0, vec![a, b, c]).run();
    assert_eq!(report.conflicting_pairs(), vec![pair("A", "B"), pair("A", "C")]);

    let ab: Vec<_> = report.conflicts.iter().filter(|c| c.involves("B")).collect();
    let ac: Vec<_> = report.conflicts.iter().filter(|c| c.involves("C")).collect();
    assert!(ab.iter().all(|c| (c.location().x - 50.0).abs() <= 5.0));
    assert!(ac.iter().all(|c| (c.location().x - 80.0).abs() <= 5.0));

    // Pair order follows registration: every A-B conflict precedes A-C ones.
    let last_ab = report.conflicts.iter().rposition(|c| c.involves("B")).unwrap();
    let first_ac = report.conflicts.iter().position(|c| c.involves("C")).unwrap();
    assert!(last_ab < first_ac);
}

#[test]
fn untimed_missions_are_checked_like_timed_ones() {
    let a = Mission::new(
        "A",
        MissionWaypoints::Untimed(vec![
            Position::new(0.0, 0.0, 0.0),
            Position::new(100.0, 100.0, 0.0),
        ]),
        t(0),
        t(300),
    )
    .unwrap();
    let b = Mission::new(
        "B",
        MissionWaypoints::Untimed(vec![
            Position::new(100.0, 0.0, 0.0),
            Position::new(0.0, 100.0, 0.0),
        ]),
        t(0),
        t(300),
    )
    .unwrap();

    let report = detector(10.0, 5.0, vec![a, b]).run();
    assert_eq!(report.status, DetectionStatus::Conflict);
    assert!(report
        .conflicts
        .iter()
        .all(|c| c.time() >= t(130) && c.time() <= t(170)));
}

#[test]
fn report_serializes_with_lowercase_status() {
    let a = line("A", (0.0, 0.0, 0.0, 0), (100.0, 0.0, 0.0, 100));
    let b = line("B", (50.0, -50.0, 0.0, 0), (50.0, 50.0, 0.0, 100));
    let report = detector(0.5, 5.0, vec![a, b]).run();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["status"], "conflict");
    assert_eq!(json["conflicts"][0]["drone_ids"], serde_json::json!(["A", "B"]));
    assert!(json["conflicts"][0]["description"]
        .as_str()
        .unwrap()
        .contains("between A and B"));

    let clear = detector(0.5, 5.0, Vec::new()).run();
    assert_eq!(serde_json::to_value(&clear).unwrap()["status"], "clear");
}

#[test]
fn missions_roundtrip_through_json_registry_input() {
    let a = line("A", (0.0, 0.0, 0.0, 0), (100.0, 0.0, 0.0, 100));
    let json = serde_json::to_string(&a).unwrap();
    let back: Mission = serde_json::from_str(&json).unwrap();
    assert_eq!(a, back);

    let bad = json.replace("\"drone_id\":\"A\"", "\"drone_id\":\"\"");
    assert!(serde_json::from_str::<Mission>(&bad).is_err());
}
