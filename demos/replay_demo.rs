//! Demonstration of the Synheart Gesture Engine.
//!
//! This example shows how to:
//! 1. Register swipe, shape and combo gestures with callbacks
//! 2. Feed the engine from a scripted sample source
//! 3. Drive it with simulated ticks
//! 4. Collect matches from a subscriber channel
//!
//! Run with: cargo run --example replay_demo

use chrono::{DateTime, Duration, Utc};
use synheart_gesture_engine::{
    core::templates, ComboStep, GestureDefinition, GestureEngine, Key, MatchEvent, Point, Sample,
    ScriptedSource,
};

const CTRL: Key = Key::Code(17);

fn main() {
    println!("Synheart Gesture Engine - Replay Demo");
    println!("=====================================");
    println!();

    let start = Utc::now();
    let source = ScriptedSource::new(script(start));
    let last = source.last_timestamp().unwrap_or(start);
    println!(
        "Scripted {} samples over {}ms",
        source.remaining(),
        (last - start).num_milliseconds()
    );

    let mut engine = GestureEngine::default().with_source(source);

    let gestures = vec![
        GestureDefinition::swipe("swipe-right", Point::new(1.0, 0.0), 100.0, 30.0)
            .with_time_window(std::time::Duration::from_millis(500)),
        GestureDefinition::shape("triangle", templates::triangle(), 0.05)
            .with_time_window(std::time::Duration::from_secs(3)),
        GestureDefinition::shape("square", templates::square(), 0.05)
            .with_time_window(std::time::Duration::from_secs(3)),
        GestureDefinition::combo("save", vec![ComboStep::down(CTRL), ComboStep::down(Key::Char('s'))])
            .with_time_window(std::time::Duration::from_millis(800)),
    ];
    for definition in gestures {
        let definition = definition.on_match(print_match);
        if let Err(e) = engine.register_gesture(definition) {
            eprintln!("Could not register gesture: {e}");
            return;
        }
    }
    let receiver = engine.subscribe();

    println!("Registered {} gestures", engine.registry().len());
    println!();

    // Simulated 60 Hz ticks until every sample has aged out
    let tick = Duration::milliseconds(16);
    let end = last + Duration::from_std(engine.retention()).unwrap_or(tick);
    let mut now = start;
    while now <= end {
        engine.tick(now);
        now += tick;
    }

    let matched: Vec<MatchEvent> = receiver.try_iter().collect();
    println!();
    println!("Subscriber received {} matches", matched.len());
    println!();
    println!("{}", engine.stats().summary());
}

fn print_match(event: &MatchEvent) {
    let score = event
        .score
        .map(|s| format!(" (score {s:.4})"))
        .unwrap_or_default();
    println!(
        "[{}] {} {}{}",
        event.detected_at.format("%H:%M:%S%.3f"),
        event.kind,
        event.gesture_id,
        score
    );
}

/// A right swipe, a hand-drawn triangle and a Ctrl+S chord.
fn script(start: DateTime<Utc>) -> Vec<Sample> {
    let at = |ms: i64| start + Duration::milliseconds(ms);
    let mut samples = Vec::new();

    // Swipe: 240 units right in 150ms
    samples.push(Sample::down(Point::new(100.0, 300.0), at(0)));
    for i in 1..5 {
        samples.push(Sample::moved(Point::new(100.0 + 50.0 * i as f64, 302.0), at(30 * i)));
    }
    samples.push(Sample::up(Point::new(340.0, 305.0), at(150)));

    // Triangle: apex, bottom-right, bottom-left, apex
    let corners = [
        Point::new(400.0, 100.0),
        Point::new(500.0, 300.0),
        Point::new(300.0, 300.0),
        Point::new(400.0, 100.0),
    ];
    let mut t = 1000;
    samples.push(Sample::down(corners[0], at(t)));
    for pair in corners.windows(2) {
        for i in 1..=12 {
            t += 15;
            samples.push(Sample::moved(pair[0].lerp(&pair[1], i as f64 / 12.0), at(t)));
        }
    }
    samples.push(Sample::up(corners[3], at(t + 15)));

    // Ctrl+S
    samples.push(Sample::key_down(CTRL, at(2500)));
    samples.push(Sample::key_down(Key::Char('s'), at(2600)));
    samples.push(Sample::key_up(Key::Char('s'), at(2700)));
    samples.push(Sample::key_up(CTRL, at(2750)));

    samples
}
