//! Awake / asleep / dead state machine.
//!
//! Transitions are evaluated once per tick per agent, right after the clock
//! advances, in this priority order:
//!
//! 1. Dead agents never transition.
//! 2. At night an awake agent is forced to sleep. Already-asleep agents are
//!    left alone, so this fires once per onset of night.
//! 3. At exactly [`WAKE_HOUR`]:[`WAKE_MINUTE`] a sleeping agent wakes up.
//!
//! [`WAKE_HOUR`]: soul_types::WAKE_HOUR
//! [`WAKE_MINUTE`]: soul_types::WAKE_MINUTE
//!
//! The daily reflection trigger (midnight) belongs to the engine because it
//! needs the brain; [`Transition::ForcedSleep`] and the midnight check are
//! what it keys off.

use soul_types::{AgentData, GameTime};

/// What the state machine did to an agent this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// No change.
    Unchanged,
    /// Awake agent put to sleep because it is night.
    ForcedSleep,
    /// Sleeping agent woken at the wake-up time.
    WokeUp,
}

/// Evaluate the night and morning transitions for one agent.
pub const fn evaluate(agent: &mut AgentData, time: &GameTime) -> Transition {
    if !agent.is_active {
        return Transition::Unchanged;
    }
    if time.is_night() && agent.fall_asleep() {
        return Transition::ForcedSleep;
    }
    if time.is_wake_time() && agent.wake_up() {
        return Transition::WokeUp;
    }
    Transition::Unchanged
}

#[cfg(test)]
mod tests {
    use soul_types::ActionType;

    use super::*;

    fn at(hour: u32, minute: u32) -> GameTime {
        GameTime::new(2024, 1, 1, hour, minute)
    }

    #[test]
    fn night_forces_sleep_once() {
        let mut agent = AgentData::new("v");
        agent.current_action = ActionType::Work996;
        assert_eq!(evaluate(&mut agent, &at(22, 0)), Transition::ForcedSleep);
        assert_eq!(agent.current_action, ActionType::Sleep);
        assert_eq!(evaluate(&mut agent, &at(22, 1)), Transition::Unchanged);
        assert_eq!(evaluate(&mut agent, &at(3, 0)), Transition::Unchanged);
    }

    #[test]
    fn wakes_only_at_seven_sharp() {
        let mut agent = AgentData::new("v");
        agent.is_sleeping = true;
        for (hour, minute) in [(6, 0), (6, 59), (7, 1), (12, 0)] {
            assert_eq!(evaluate(&mut agent, &at(hour, minute)), Transition::Unchanged);
            assert!(agent.is_sleeping);
        }
        assert_eq!(evaluate(&mut agent, &at(7, 0)), Transition::WokeUp);
        assert!(!agent.is_sleeping);
    }

    #[test]
    fn daytime_nap_lasts_until_morning() {
        let mut agent = AgentData::new("v");
        agent.fall_asleep();
        assert_eq!(evaluate(&mut agent, &at(15, 0)), Transition::Unchanged);
        assert!(agent.is_sleeping);
    }

    #[test]
    fn dead_agents_never_transition() {
        let mut agent = AgentData::new("v");
        agent.is_active = false;
        assert_eq!(evaluate(&mut agent, &at(23, 0)), Transition::Unchanged);
        assert!(!agent.is_sleeping);
        agent.is_sleeping = true;
        assert_eq!(evaluate(&mut agent, &at(7, 0)), Transition::Unchanged);
        assert!(agent.is_sleeping);
    }
}
