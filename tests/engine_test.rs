//! Integration tests driving the gesture engine end to end

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use synheart_gesture_engine::{
    core::templates, create_shared_engine, ComboStep, Config, GestureDefinition, GestureEngine,
    Key, KindTag, Point, RegistryError, Sample, ScriptedSource,
};

const CTRL: Key = Key::Code(17);
const S: Key = Key::Char('s');

fn at(start: DateTime<Utc>, ms: i64) -> DateTime<Utc> {
    start + ChronoDuration::milliseconds(ms)
}

/// Pointer stroke through `corners`, `steps` samples per segment, 10ms apart.
fn stroke(corners: &[Point], steps: usize, start: DateTime<Utc>) -> Vec<Sample> {
    let mut points = vec![corners[0]];
    for pair in corners.windows(2) {
        for i in 1..=steps {
            points.push(pair[0].lerp(&pair[1], i as f64 / steps as f64));
        }
    }

    let last = points.len() - 1;
    points
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            let t = at(start, 10 * i as i64);
            match i {
                0 => Sample::down(p, t),
                i if i == last => Sample::up(p, t),
                _ => Sample::moved(p, t),
            }
        })
        .collect()
}

/// `points` rotated by `degrees`, scaled and moved.
fn transform(points: &[Point], degrees: f64, scale: f64, offset: Point) -> Vec<Point> {
    let (sin, cos) = degrees.to_radians().sin_cos();
    points
        .iter()
        .map(|p| {
            Point::new(
                (p.x * cos - p.y * sin) * scale + offset.x,
                (p.x * sin + p.y * cos) * scale + offset.y,
            )
        })
        .collect()
}

fn feed(engine: &mut GestureEngine, samples: Vec<Sample>) -> DateTime<Utc> {
    let mut last = None;
    for sample in samples {
        last = Some(sample.timestamp);
        engine.ingest(sample).expect("samples are in order");
    }
    last.expect("non-empty input")
}

#[test]
fn test_rotated_scaled_square_matches_square_template() {
    let mut engine = GestureEngine::default();
    engine
        .register_gesture(GestureDefinition::shape("square", templates::square(), 0.1))
        .unwrap();

    let corners = transform(&templates::square(), 10.0, 150.0, Point::new(300.0, 200.0));
    let t = Utc::now();
    let end = feed(&mut engine, stroke(&corners, 10, t));

    let events = engine.tick(at(end, 10));
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].gesture_id, "square");
    assert_eq!(events[0].kind, KindTag::Shape);
    assert_eq!(events[0].span_start, t);
    assert_eq!(events[0].span_end, end);

    let score = events[0].score.expect("shape matches carry a score");
    assert!(score < 1e-6, "score was {score}");
}

#[test]
fn test_zigzag_does_not_match_square_template() {
    let mut engine = GestureEngine::default();
    engine
        .register_gesture(GestureDefinition::shape("square", templates::square(), 0.1))
        .unwrap();

    let corners = transform(&templates::zigzag(), 0.0, 50.0, Point::new(10.0, 10.0));
    let end = feed(&mut engine, stroke(&corners, 5, Utc::now()));

    assert!(engine.tick(at(end, 10)).is_empty());
    assert_eq!(engine.stats().snapshot().matches, 0);
}

#[test]
fn test_swipe_dead_zone_is_exclusive() {
    let mut engine = GestureEngine::default();
    engine
        .register_gesture(GestureDefinition::swipe(
            "right",
            Point::new(1.0, 0.0),
            100.0,
            30.0,
        ))
        .unwrap();

    let t = Utc::now();
    engine.ingest(Sample::down(Point::new(0.0, 0.0), t)).unwrap();
    engine
        .ingest(Sample::up(Point::new(100.0, 0.0), at(t, 100)))
        .unwrap();
    assert!(engine.tick(at(t, 110)).is_empty());

    // Second stroke arrives after the first has aged out
    engine
        .ingest(Sample::down(Point::new(0.0, 0.0), at(t, 1200)))
        .unwrap();
    engine
        .ingest(Sample::up(Point::new(100.5, 0.0), at(t, 1300)))
        .unwrap();
    let events = engine.tick(at(t, 1310));
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].span_start, at(t, 1200));
}

#[test]
fn test_swipe_outside_window_does_not_match() {
    let mut engine = GestureEngine::default();
    engine
        .register_gesture(
            GestureDefinition::swipe("right", Point::new(1.0, 0.0), 50.0, 30.0)
                .with_time_window(Duration::from_millis(200)),
        )
        .unwrap();

    let t = Utc::now();
    engine.ingest(Sample::down(Point::new(0.0, 0.0), t)).unwrap();
    engine
        .ingest(Sample::up(Point::new(300.0, 0.0), at(t, 250)))
        .unwrap();

    assert!(engine.tick(at(t, 260)).is_empty());
}

#[test]
fn test_chord_matches_while_keys_are_held() {
    let mut engine = GestureEngine::default();
    engine
        .register_gesture(GestureDefinition::combo(
            "save",
            vec![ComboStep::down(CTRL), ComboStep::down(S)],
        ))
        .unwrap();

    let t = Utc::now();
    engine.ingest(Sample::key_down(CTRL, t)).unwrap();
    engine.ingest(Sample::moved(Point::new(5.0, 5.0), at(t, 20))).unwrap();
    engine.ingest(Sample::key_down(S, at(t, 50))).unwrap();

    let events = engine.tick(at(t, 60));
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, KindTag::Combo);
    assert_eq!(events[0].span_start, t);
    assert_eq!(events[0].span_end, at(t, 50));
    assert_eq!(events[0].score, None);
}

#[test]
fn test_chord_needs_modifier_held_at_sweep() {
    let mut engine = GestureEngine::default();
    engine
        .register_gesture(GestureDefinition::combo(
            "save",
            vec![ComboStep::down(CTRL), ComboStep::down(S)],
        ))
        .unwrap();

    let t = Utc::now();
    engine.ingest(Sample::key_down(CTRL, t)).unwrap();
    engine.ingest(Sample::key_down(S, at(t, 50))).unwrap();
    engine.ingest(Sample::key_up(CTRL, at(t, 60))).unwrap();

    assert!(engine.tick(at(t, 70)).is_empty());
}

#[test]
fn test_combo_edges_only_when_hold_check_disabled() {
    let config = Config {
        combo_requires_held_key: false,
        ..Config::default()
    };
    let mut engine = GestureEngine::new(config);
    engine
        .register_gesture(GestureDefinition::combo(
            "save",
            vec![ComboStep::down(CTRL), ComboStep::down(S)],
        ))
        .unwrap();

    let t = Utc::now();
    engine.ingest(Sample::key_down(CTRL, t)).unwrap();
    engine.ingest(Sample::key_down(S, at(t, 50))).unwrap();
    engine.ingest(Sample::key_up(CTRL, at(t, 60))).unwrap();
    engine.ingest(Sample::key_up(S, at(t, 70))).unwrap();

    assert_eq!(engine.tick(at(t, 80)).len(), 1);
}

#[test]
fn test_subscribers_and_callbacks_receive_each_match() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let mut engine = GestureEngine::default();
    engine
        .register_gesture(
            GestureDefinition::swipe("down", Point::new(0.0, 1.0), 50.0, 30.0).on_match(
                move |event| {
                    assert_eq!(event.gesture_id, "down");
                    counter.fetch_add(1, Ordering::SeqCst);
                },
            ),
        )
        .unwrap();
    let receiver = engine.subscribe();

    let t = Utc::now();
    for offset in [0, 200] {
        engine
            .ingest(Sample::down(Point::new(0.0, 0.0), at(t, offset)))
            .unwrap();
        engine
            .ingest(Sample::up(Point::new(3.0, 120.0), at(t, offset + 80)))
            .unwrap();
        engine.tick(at(t, offset + 90));
    }
    // Nothing new: no third delivery
    engine.tick(at(t, 400));

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    let delivered: Vec<_> = receiver.try_iter().collect();
    assert_eq!(delivered.len(), 2);
    assert_ne!(delivered[0].event_id, delivered[1].event_id);
}

#[test]
fn test_dropped_subscriber_does_not_block_dispatch() {
    let mut engine = GestureEngine::default();
    engine
        .register_gesture(GestureDefinition::swipe("right", Point::new(1.0, 0.0), 50.0, 30.0))
        .unwrap();
    drop(engine.subscribe());
    let live = engine.subscribe();

    let t = Utc::now();
    engine.ingest(Sample::down(Point::new(0.0, 0.0), t)).unwrap();
    engine
        .ingest(Sample::up(Point::new(90.0, 0.0), at(t, 50)))
        .unwrap();
    engine.tick(at(t, 60));

    assert_eq!(live.try_iter().count(), 1);
}

#[test]
fn test_once_gesture_fires_a_single_time() {
    let mut engine = GestureEngine::default();
    engine
        .register_gesture(
            GestureDefinition::swipe("right", Point::new(1.0, 0.0), 50.0, 30.0).once(),
        )
        .unwrap();

    let t = Utc::now();
    let mut fired = 0;
    for offset in [0, 200, 400] {
        engine
            .ingest(Sample::down(Point::new(0.0, 0.0), at(t, offset)))
            .unwrap();
        engine
            .ingest(Sample::up(Point::new(200.0, 0.0), at(t, offset + 50)))
            .unwrap();
        fired += engine.tick(at(t, offset + 60)).len();
    }

    assert_eq!(fired, 1);
    assert!(engine.registry().is_empty());
}

#[test]
fn test_rearmed_once_gesture_waits_for_new_stroke() {
    let swipe = || {
        GestureDefinition::swipe("right", Point::new(1.0, 0.0), 50.0, 30.0).once()
    };
    let mut engine = GestureEngine::default();
    engine.register_gesture(swipe()).unwrap();

    let t = Utc::now();
    engine.ingest(Sample::down(Point::new(0.0, 0.0), t)).unwrap();
    engine
        .ingest(Sample::up(Point::new(200.0, 0.0), at(t, 50)))
        .unwrap();
    assert_eq!(engine.tick(at(t, 60)).len(), 1);

    // Re-arm while the matched stroke is still buffered
    engine.register_gesture(swipe()).unwrap();
    assert!(engine.tick(at(t, 70)).is_empty());
    assert_eq!(engine.buffer().len(), 2);

    engine
        .ingest(Sample::down(Point::new(0.0, 0.0), at(t, 200)))
        .unwrap();
    engine
        .ingest(Sample::up(Point::new(200.0, 0.0), at(t, 250)))
        .unwrap();
    let events = engine.tick(at(t, 260));
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].span_start, at(t, 200));
}

#[test]
fn test_duplicate_registration_keeps_original() {
    let mut engine = GestureEngine::default();
    engine
        .register_gesture(GestureDefinition::swipe("flick", Point::new(1.0, 0.0), 50.0, 30.0))
        .unwrap();

    let result =
        engine.register_gesture(GestureDefinition::swipe("flick", Point::new(-1.0, 0.0), 50.0, 30.0));
    assert!(matches!(result, Err(RegistryError::DuplicateId(ref id)) if id == "flick"));

    // The original rightward definition is still active
    let t = Utc::now();
    engine.ingest(Sample::down(Point::new(0.0, 0.0), t)).unwrap();
    engine
        .ingest(Sample::up(Point::new(200.0, 0.0), at(t, 50)))
        .unwrap();
    assert_eq!(engine.tick(at(t, 60)).len(), 1);
}

#[test]
fn test_malformed_definitions_are_rejected() {
    let mut engine = GestureEngine::default();

    let flat = vec![Point::new(1.0, 1.0); 4];
    assert!(matches!(
        engine.register_gesture(GestureDefinition::shape("dot", flat, 0.1)),
        Err(RegistryError::Malformed { .. })
    ));
    assert!(matches!(
        engine.register_gesture(GestureDefinition::combo("nothing", Vec::new())),
        Err(RegistryError::Malformed { .. })
    ));
    assert!(engine.registry().is_empty());
    assert_eq!(engine.stats().snapshot().registrations_rejected, 2);
}

#[test]
fn test_retention_prunes_and_capacity_evicts() {
    let config = Config {
        buffer_capacity: 8,
        ..Config::default()
    };
    let mut engine = GestureEngine::new(config);

    let t = Utc::now();
    for i in 0..10 {
        engine
            .ingest(Sample::moved(Point::new(i as f64, 0.0), at(t, i * 10)))
            .unwrap();
    }
    assert_eq!(engine.buffer().len(), 8);
    assert_eq!(engine.stats().snapshot().samples_evicted, 2);

    // Default retention is one second with nothing registered
    engine.tick(at(t, 1050));
    let remaining = engine.buffer().samples();
    assert!(remaining
        .iter()
        .all(|s| at(t, 1050) - s.timestamp <= ChronoDuration::milliseconds(1000)));
    assert_eq!(remaining.len(), 5);
}

#[test]
fn test_scripted_source_releases_samples_on_tick_clock() {
    let t = Utc::now();
    let source = ScriptedSource::new(vec![
        Sample::down(Point::new(0.0, 0.0), t),
        Sample::moved(Point::new(0.0, -80.0), at(t, 40)),
        Sample::up(Point::new(0.0, -160.0), at(t, 80)),
    ]);

    let mut engine = GestureEngine::default().with_source(source);
    engine
        .register_gesture(GestureDefinition::swipe("up", Point::new(0.0, -1.0), 100.0, 30.0))
        .unwrap();

    assert!(engine.tick(at(t, 50)).is_empty());
    assert_eq!(engine.buffer().len(), 2);

    let events = engine.tick(at(t, 100));
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].gesture_id, "up");
}

#[test]
fn test_shared_engine_across_threads() {
    let engine = create_shared_engine(GestureEngine::default());

    let registrar = {
        let engine = engine.clone();
        thread::spawn(move || {
            engine
                .lock()
                .unwrap()
                .register_gesture(GestureDefinition::swipe(
                    "right",
                    Point::new(1.0, 0.0),
                    50.0,
                    30.0,
                ))
                .unwrap();
        })
    };
    registrar.join().unwrap();

    let t = Utc::now();
    let mut engine = engine.lock().unwrap();
    engine.ingest(Sample::down(Point::new(0.0, 0.0), t)).unwrap();
    engine
        .ingest(Sample::up(Point::new(200.0, 0.0), at(t, 50)))
        .unwrap();
    assert_eq!(engine.tick(at(t, 60)).len(), 1);
}
