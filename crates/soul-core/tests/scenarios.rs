//! End-to-end tick scenarios for the world engine.
//!
//! Each test builds a small world, wires agents to a rule brain or a test
//! double, and drives the engine through whole ticks.

#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use soul_agents::{MemoryConfig, RingMemory};
use soul_core::{
    Brain, Capabilities, DecisionError, NarrativeFormatter, RuleBrain, SharedCapabilities,
    SimulationConfig, WorldEngine,
};
use soul_types::{ActionType, AgentStats, Decision, GameTime, Target};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn config_at(hour: u32, minute: u32) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.map.width = 12;
    config.map.height = 12;
    config.time.start = GameTime::new(2024, 1, 1, hour, minute);
    config.world.decision_timeout_ms = 200;
    config
}

fn rule_engine(config: &SimulationConfig) -> WorldEngine {
    let factory = SharedCapabilities::new(
        Arc::new(RuleBrain::default()),
        Arc::new(NarrativeFormatter::default()),
        config.memory.store_config(),
    );
    WorldEngine::new(config, Arc::new(factory)).unwrap()
}

fn capabilities(brain: Arc<dyn Brain>) -> Capabilities {
    Capabilities {
        memory: Box::new(RingMemory::new(MemoryConfig::default())),
        brain,
        perception: Arc::new(NarrativeFormatter::default()),
    }
}

/// Brain that records how often it was asked and answers from the stats.
#[derive(Default)]
struct CountingBrain {
    calls: AtomicUsize,
}

#[async_trait]
impl Brain for CountingBrain {
    async fn decide(
        &self,
        _perception: &str,
        _memory: &str,
        stats: &AgentStats,
    ) -> Result<Decision, DecisionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(RuleBrain::default().choose(stats))
    }

    async fn reflect(&self, _daily_log: &str) -> Result<String, DecisionError> {
        Ok("Balance work and rest.".to_owned())
    }
}

/// Brain whose every answer is unusable.
struct GarbageBrain;

#[async_trait]
impl Brain for GarbageBrain {
    async fn decide(&self, _: &str, _: &str, _: &AgentStats) -> Result<Decision, DecisionError> {
        Err(DecisionError::Malformed {
            reason: "action FLY is not recognised".to_owned(),
        })
    }

    async fn reflect(&self, _: &str) -> Result<String, DecisionError> {
        Err(DecisionError::Unavailable {
            reason: "connection refused".to_owned(),
        })
    }
}

/// Brain that never answers within the budget.
struct StalledBrain;

#[async_trait]
impl Brain for StalledBrain {
    async fn decide(&self, _: &str, _: &str, _: &AgentStats) -> Result<Decision, DecisionError> {
        tokio::time::sleep(Duration::from_secs(600)).await;
        Ok(Decision::new(ActionType::Work996, "too late"))
    }

    async fn reflect(&self, _: &str) -> Result<String, DecisionError> {
        tokio::time::sleep(Duration::from_secs(600)).await;
        Ok(String::new())
    }
}

/// Brain that always steps one cell east and keeps every perception it
/// was shown.
#[derive(Default)]
struct EastBrain {
    seen: Mutex<Vec<String>>,
}

#[async_trait]
impl Brain for EastBrain {
    async fn decide(
        &self,
        perception: &str,
        _memory: &str,
        _stats: &AgentStats,
    ) -> Result<Decision, DecisionError> {
        self.seen.lock().unwrap().push(perception.to_owned());
        // "You are standing at (x, y), ..." -> step to (x + 1, y).
        let (x, y) = perception
            .split_once("standing at (")
            .and_then(|(_, rest)| rest.split_once(')'))
            .and_then(|(coords, _)| coords.split_once(", "))
            .and_then(|(x, y)| Some((x.parse::<i32>().ok()?, y.parse::<i32>().ok()?)))
            .ok_or_else(|| DecisionError::Malformed {
                reason: "no position in perception".to_owned(),
            })?;
        let target = Target::Coordinate {
            x: x.saturating_add(1),
            y,
        };
        Ok(Decision::new(ActionType::Idle, "heading east").with_target(target))
    }

    async fn reflect(&self, _: &str) -> Result<String, DecisionError> {
        Ok("Keep moving.".to_owned())
    }
}

// ---------------------------------------------------------------------------
// Rule-brain decisions
// ---------------------------------------------------------------------------

fn seed_stats(engine: &mut WorldEngine, id: &str, energy: f64, wealth: f64) {
    let agent = engine.map_mut().active_agent_mut(id).unwrap();
    agent.stats.energy = energy;
    agent.stats.wealth = wealth;
}

#[tokio::test]
async fn scenario_tired_agent_sleeps() {
    let mut engine = rule_engine(&config_at(9, 0));
    engine.create_agent("a", 2, 2).unwrap();
    seed_stats(&mut engine, "a", 10.0, 100.0);

    let summary = engine.tick().await;
    assert_eq!(summary.decisions.get("a"), Some(&ActionType::Sleep));
    let agent = engine.map().agent("a").unwrap();
    assert_eq!(agent.current_action, ActionType::Sleep);
    assert!(agent.is_sleeping);
    assert_eq!(
        engine.latest_thought("a").unwrap().unwrap().text,
        "I am too tired. I need to sleep."
    );
}

#[tokio::test]
async fn scenario_broke_agent_works_overtime() {
    let mut engine = rule_engine(&config_at(9, 0));
    engine.create_agent("a", 2, 2).unwrap();
    // Fresh agents have energy 100 and wealth 0.
    let summary = engine.tick().await;
    assert_eq!(summary.decisions.get("a"), Some(&ActionType::Work996));
}

#[tokio::test]
async fn scenario_comfortable_agent_rests() {
    let mut engine = rule_engine(&config_at(9, 0));
    engine.create_agent("a", 2, 2).unwrap();
    seed_stats(&mut engine, "a", 100.0, 100.0);

    let summary = engine.tick().await;
    assert_eq!(summary.decisions.get("a"), Some(&ActionType::RestPark));
    let agent = engine.map().agent("a").unwrap();
    assert_eq!(agent.current_action, ActionType::RestPark);
    assert!(!agent.is_sleeping);
    // Settled as a park rest: no wage.
    assert!((agent.stats.wealth - 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn scenario_event_reaches_only_targets() {
    let mut engine = rule_engine(&config_at(9, 0));
    engine.create_agent("A", 1, 1).unwrap();
    engine.create_agent("B", 5, 5).unwrap();

    let delivery = engine.inject_event("Layoff", "The factory closed.", Some(&["A".to_owned()]));
    assert_eq!(delivery.delivered, vec!["A".to_owned()]);
    assert!(delivery.unknown.is_empty());

    assert_eq!(
        engine.recent_memory("A").unwrap(),
        vec!["[EVENT: Layoff] The factory closed.".to_owned()]
    );
    assert!(engine.recent_memory("B").unwrap().is_empty());
    assert_eq!(
        engine.map().agent("A").unwrap().stats,
        engine.map().agent("B").unwrap().stats
    );
}

// ---------------------------------------------------------------------------
// Life cycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn night_forces_sleep_exactly_once() {
    let mut engine = rule_engine(&config_at(21, 59));
    engine.create_agent("a", 2, 2).unwrap();

    let summary = engine.tick().await;
    assert!(summary.is_night);
    assert!(summary.decisions.is_empty());
    let agent = engine.map().agent("a").unwrap();
    assert!(agent.is_sleeping);
    assert_eq!(agent.current_action, ActionType::Sleep);

    engine.run_agent_loop(5).await;
    let forced = engine
        .recent_memory("a")
        .unwrap()
        .iter()
        .filter(|note| note.as_str() == "It is late at night. I went to sleep.")
        .count();
    assert_eq!(forced, 1);
}

#[tokio::test]
async fn agent_wakes_at_seven_and_decides() {
    let mut engine = rule_engine(&config_at(6, 59));
    engine.create_agent("a", 2, 2).unwrap();
    engine.set_action("a", ActionType::Sleep).unwrap();

    let summary = engine.tick().await;
    assert_eq!(summary.time.clock_label(), "07:00");
    assert!(!engine.map().agent("a").unwrap().is_sleeping);
    assert!(summary.decisions.contains_key("a"));
    assert!(
        engine
            .recent_memory("a")
            .unwrap()
            .contains(&"I woke up.".to_owned())
    );
}

#[tokio::test]
async fn midnight_reflection_archives_the_day() {
    let config = config_at(23, 0);
    let mut engine = WorldEngine::new(
        &config,
        Arc::new(SharedCapabilities::new(
            Arc::new(CountingBrain::default()),
            Arc::new(NarrativeFormatter::default()),
            config.memory.store_config(),
        )),
    )
    .unwrap();
    engine.create_agent("a", 2, 2).unwrap();

    let summary = engine.run_agent_loop(60).await.unwrap();
    assert_eq!(summary.time.clock_label(), "00:00");
    assert_eq!(summary.reflections, 1);

    let history = engine.history("a").unwrap();
    assert_eq!(history.values, "Balance work and rest.");
    assert!(history.current_log.is_empty());
    assert_eq!(history.summaries.len(), 1);
}

#[tokio::test]
async fn three_days_three_reflections_three_wakes() {
    let mut engine = rule_engine(&config_at(7, 0));
    engine.create_agent("a", 2, 2).unwrap();

    let mut reflections = 0;
    let mut wakes = 0;
    let mut was_sleeping = engine.map().agent("a").unwrap().is_sleeping;
    for _ in 0..(3 * 24 * 60) {
        let summary = engine.tick().await;
        let label = summary.time.clock_label();

        if label == "00:00" {
            assert_eq!(summary.reflections, 1, "{}", summary.time);
        } else {
            assert_eq!(summary.reflections, 0, "{}", summary.time);
        }
        if summary.reflections > 0 {
            reflections += summary.reflections;
            let history = engine.history("a").unwrap();
            assert!(history.current_log.is_empty(), "{}", summary.time);
            assert_eq!(history.summaries.len(), reflections);
        }

        let agent = engine.map().agent("a").unwrap();
        assert!(agent.is_active, "died at {}", summary.time);
        if was_sleeping && !agent.is_sleeping {
            assert_eq!(label, "07:00", "woke at {}", summary.time);
            wakes += 1;
        }
        was_sleeping = agent.is_sleeping;
    }

    assert_eq!(engine.clock().now(), GameTime::new(2024, 1, 4, 7, 0));
    assert_eq!(reflections, 3);
    assert_eq!(wakes, 3);
}

// ---------------------------------------------------------------------------
// Failure handling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn malformed_decision_falls_back_to_idle() {
    let mut engine = rule_engine(&config_at(9, 0));
    engine
        .create_agent_with("a", 2, 2, Some(capabilities(Arc::new(GarbageBrain))))
        .unwrap();
    engine.create_agent("b", 4, 4).unwrap();

    let summary = engine.tick().await;
    assert_eq!(summary.decisions.get("a"), Some(&ActionType::Idle));
    assert_eq!(summary.decisions.get("b"), Some(&ActionType::Work996));
    assert_eq!(summary.fallbacks, 1);

    let notes = engine.recent_memory("a").unwrap();
    assert!(notes.iter().any(|note| note.contains("FLY is not recognised")));
    assert!(notes.contains(&"Action: IDLE".to_owned()));
}

#[tokio::test(start_paused = true)]
async fn stalled_brain_does_not_stall_the_tick() {
    let mut engine = rule_engine(&config_at(9, 0));
    engine
        .create_agent_with("slow", 2, 2, Some(capabilities(Arc::new(StalledBrain))))
        .unwrap();
    engine.create_agent("quick", 6, 6).unwrap();

    let summary = engine.tick().await;
    assert_eq!(summary.decisions.get("slow"), Some(&ActionType::Idle));
    assert_eq!(summary.decisions.get("quick"), Some(&ActionType::Work996));
    assert!(
        engine
            .recent_memory("slow")
            .unwrap()
            .iter()
            .any(|note| note.contains("timed out after 200ms"))
    );
}

#[tokio::test]
async fn failed_reflection_keeps_values() {
    let mut engine = rule_engine(&config_at(23, 59));
    engine
        .create_agent_with("a", 2, 2, Some(capabilities(Arc::new(GarbageBrain))))
        .unwrap();
    let before = engine.map().agent("a").unwrap().values.clone();

    let summary = engine.tick().await;
    assert_eq!(summary.reflections, 1);
    let history = engine.history("a").unwrap();
    assert_eq!(history.values, before);
    assert!(history.current_log.is_empty());
}

// ---------------------------------------------------------------------------
// Ordering and terminal state
// ---------------------------------------------------------------------------

#[tokio::test]
async fn every_agent_decides_on_pre_settlement_state() {
    let mut engine = rule_engine(&config_at(9, 0));
    let brain = Arc::new(CountingBrain::default());
    for (id, x) in [("a", 1), ("b", 3), ("c", 5)] {
        engine
            .create_agent_with(id, x, 1, Some(capabilities(Arc::clone(&brain) as Arc<dyn Brain>)))
            .unwrap();
    }

    let summary = engine.tick().await;
    assert_eq!(brain.calls.load(Ordering::SeqCst), 3);
    // All three saw identical fresh stats and chose alike; settlement
    // afterwards treated them alike.
    assert!(summary.decisions.values().all(|a| *a == ActionType::Work996));
    let wealth: Vec<f64> = engine
        .agents()
        .filter_map(|entity| entity.as_agent())
        .map(|agent| agent.stats.wealth)
        .collect();
    assert_eq!(wealth.len(), 3);
    let first = wealth.first().copied().unwrap();
    assert!(wealth.iter().all(|w| (w - first).abs() < 1e-9));
}

#[tokio::test]
async fn perception_shows_positions_from_before_any_move() {
    let mut engine = rule_engine(&config_at(9, 0));
    let brain = Arc::new(EastBrain::default());
    engine
        .create_agent_with("a", 2, 2, Some(capabilities(Arc::clone(&brain) as Arc<dyn Brain>)))
        .unwrap();
    engine
        .create_agent_with("b", 4, 2, Some(capabilities(Arc::clone(&brain) as Arc<dyn Brain>)))
        .unwrap();

    engine.tick().await;

    // Both moved, "a" first in id order.
    let a = engine.agent("a").unwrap();
    let b = engine.agent("b").unwrap();
    assert_eq!((a.x, a.y), (3, 2));
    assert_eq!((b.x, b.y), (5, 2));

    let seen = brain.seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 2);
    let b_view = seen
        .iter()
        .find(|text| text.contains("standing at (4, 2)"))
        .unwrap();
    assert!(b_view.contains("(ID: a) at (2, 2)"), "{b_view}");
    assert!(!b_view.contains("(ID: a) at (3, 2)"), "{b_view}");
    let a_view = seen
        .iter()
        .find(|text| text.contains("standing at (2, 2)"))
        .unwrap();
    assert!(a_view.contains("(ID: b) at (4, 2)"), "{a_view}");
}

#[tokio::test]
async fn moves_are_single_steps() {
    let mut engine = rule_engine(&config_at(9, 0));
    engine
        .create_agent_with(
            "walker",
            2,
            2,
            Some(capabilities(Arc::new(EastBrain::default()))),
        )
        .unwrap();

    engine.run_agent_loop(3).await;
    let entity = engine.agent("walker").unwrap();
    assert_eq!((entity.x, entity.y), (5, 2));
}

#[tokio::test]
async fn dead_agents_stay_frozen() {
    let mut engine = rule_engine(&config_at(9, 0));
    // No brain: the action set here is the one that gets settled.
    engine.create_agent_with("a", 2, 2, None).unwrap();

    // WORK_996 costs 0.05 health per tick; night and exhaustion reset the
    // action to SLEEP, so force it every tick.
    let mut ticks = 0;
    while engine.map().agent("a").unwrap().is_active && ticks < 10_000 {
        engine.set_action("a", ActionType::Work996).unwrap();
        engine.tick().await;
        ticks += 1;
    }
    let agent = engine.map().agent("a").unwrap().clone();
    assert!(!agent.is_active);
    assert!(agent.stats.health <= 0.0);

    let summary = engine.run_agent_loop(100).await.unwrap();
    assert!(!summary.decisions.contains_key("a"));
    assert_eq!(engine.map().agent("a").unwrap(), &agent);
    assert!(engine.set_action("a", ActionType::Idle).is_err());
}
