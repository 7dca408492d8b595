/// Mission progression state machine.
///
/// Player-driven triggers (accepting the job, investigating) move the
/// machine through IDLE, ASSIGNED and INVESTIGATING. Investigating the
/// target arms the bust sequence: a chain of scheduled transitions on a
/// single timeline that runs EQUIPPED, BUSTED, JAILED and RELEASED before
/// closing the loop back to IDLE. Time only moves through `advance`.

use std::collections::VecDeque;
use std::time::Duration;
use tracing::{info, warn};

use crate::core::config::PhaseTimings;
use crate::schema::npc::NpcType;
use crate::schema::player::{GameState, Mission};

pub const MISSION_TITLE: &str = "Elimination Contract";
pub const MISSION_DESCRIPTION: &str = "Find and eliminate the target. Be discrete.";

/// A state change that has happened, stamped with timeline time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: GameState,
    pub to: GameState,
    pub at: Duration,
}

impl Transition {
    /// RELEASED -> IDLE, the only transition that starts a new loop.
    pub fn closes_loop(&self) -> bool {
        self.from == GameState::Released && self.to == GameState::Idle
    }
}

/// Result of feeding a trigger to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The trigger moved the machine immediately.
    Entered(Transition),
    /// The trigger was accepted without a state change.
    Stayed(GameState),
    /// The trigger armed the bust sequence; the first phase fires at `at`.
    Scheduled { to: GameState, at: Duration },
    /// The trigger is not valid here and was dropped.
    Ignored,
}

impl Step {
    pub fn accepted(&self) -> bool {
        !matches!(self, Step::Ignored)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Scheduled {
    at: Duration,
    to: GameState,
}

/// Ordered queue of future transitions against a manually advanced clock.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    now: Duration,
    pending: VecDeque<Scheduled>,
}

impl Timeline {
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// When the next scheduled transition fires, if any.
    pub fn next_due(&self) -> Option<Duration> {
        self.pending.front().map(|s| s.at)
    }

    /// Queue `to` one `delay` after the last pending entry, or after now.
    fn push_after(&mut self, delay: Duration, to: GameState) -> Duration {
        let base = self.pending.back().map_or(self.now, |s| s.at);
        let at = base + delay;
        self.pending.push_back(Scheduled { at, to });
        at
    }

    /// Drop everything pending. The clock keeps its value.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    fn tick(&mut self, dt: Duration) {
        self.now += dt;
    }

    fn pop_due(&mut self) -> Option<Scheduled> {
        match self.pending.front() {
            Some(next) if next.at <= self.now => self.pending.pop_front(),
            _ => None,
        }
    }
}

/// Who hands out the mission and who it is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionBrief {
    pub assigned_by: String,
    pub target_npc_id: String,
}

#[derive(Debug, Clone)]
pub struct ProgressionMachine {
    state: GameState,
    current_loop: u32,
    mission: Option<Mission>,
    missions_issued: u32,
    timings: PhaseTimings,
    timeline: Timeline,
}

impl ProgressionMachine {
    pub fn new(timings: PhaseTimings) -> Self {
        Self {
            state: GameState::Login,
            current_loop: 1,
            mission: None,
            missions_issued: 0,
            timings,
            timeline: Timeline::default(),
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn current_loop(&self) -> u32 {
        self.current_loop
    }

    pub fn mission(&self) -> Option<&Mission> {
        self.mission.as_ref()
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn timings(&self) -> &PhaseTimings {
        &self.timings
    }

    /// Whether a bust sequence is still queued.
    pub fn chain_pending(&self) -> bool {
        !self.timeline.is_idle()
    }

    /// Leave LOGIN for the gameplay loop. Happens once.
    pub fn login(&mut self) -> Step {
        if self.state != GameState::Login {
            warn!(state = %self.state, "login ignored, already past LOGIN");
            return Step::Ignored;
        }
        Step::Entered(self.enter(GameState::Idle))
    }

    /// IDLE -> ASSIGNED with a fresh mission for the current loop.
    pub fn accept_mission(&mut self, brief: MissionBrief) -> Step {
        if self.state != GameState::Idle {
            warn!(state = %self.state, "accept_mission ignored");
            return Step::Ignored;
        }

        self.missions_issued = self.missions_issued.saturating_add(1);
        let mission = Mission {
            id: format!("mission_{}", self.missions_issued),
            title: MISSION_TITLE.to_string(),
            description: MISSION_DESCRIPTION.to_string(),
            target_npc_id: brief.target_npc_id,
            assigned_by: brief.assigned_by,
            is_completed: false,
            loop_number: self.current_loop,
        };
        info!(mission = %mission.id, loop_number = mission.loop_number, "mission assigned");
        self.mission = Some(mission);

        Step::Entered(self.enter(GameState::Assigned))
    }

    /// `investigate` dispatched from a conversation with an NPC of `npc_type`.
    ///
    /// The informant moves ASSIGNED to INVESTIGATING and is accepted again
    /// while INVESTIGATING. The target arms the bust sequence once, from
    /// INVESTIGATING only. Anything else is ignored.
    pub fn investigate(&mut self, npc_type: NpcType) -> Step {
        match (npc_type, self.state) {
            (NpcType::Informant, GameState::Assigned) => {
                Step::Entered(self.enter(GameState::Investigating))
            }
            (NpcType::Informant, GameState::Investigating) => Step::Stayed(self.state),
            (NpcType::Target, GameState::Investigating) if self.timeline.is_idle() => {
                let at = self.schedule_from(GameState::Investigating);
                info!(at_ms = at.as_millis() as u64, "bust sequence armed");
                Step::Scheduled {
                    to: GameState::Equipped,
                    at,
                }
            }
            _ => {
                warn!(npc_type = ?npc_type, state = %self.state, "investigate ignored");
                Step::Ignored
            }
        }
    }

    /// Move the clock forward and fire every transition that came due, in
    /// order. A large `dt` may fire the whole chain at once.
    pub fn advance(&mut self, dt: Duration) -> Vec<Transition> {
        self.timeline.tick(dt);
        let mut fired = Vec::new();
        while let Some(next) = self.timeline.pop_due() {
            let transition = self.enter_at(next.to, next.at);
            if transition.closes_loop() {
                self.current_loop = self.current_loop.saturating_add(1);
                self.mission = None;
                info!(loop_number = self.current_loop, "loop closed");
            }
            fired.push(transition);
        }
        fired
    }

    /// Rebuild the machine from a saved state.
    ///
    /// ASSIGNED and INVESTIGATING need their mission to be resumable. A
    /// saved bust phase restarts the remainder of the chain from that
    /// phase. Anything else lands on IDLE without a mission.
    pub fn restore(&mut self, state: GameState, current_loop: u32, mission: Option<Mission>) -> GameState {
        self.timeline.clear();
        self.current_loop = current_loop.max(1);
        if let Some(mission) = &mission {
            if let Some(n) = mission
                .id
                .strip_prefix("mission_")
                .and_then(|n| n.parse::<u32>().ok())
            {
                self.missions_issued = self.missions_issued.max(n);
            }
        }

        let (state, mission) = match (state, mission) {
            (GameState::Assigned | GameState::Investigating, Some(mission)) => (state, Some(mission)),
            (state, mission) if state.is_bust_sequence() => (state, mission),
            _ => (GameState::Idle, None),
        };
        self.state = state;
        self.mission = mission;
        if state.is_bust_sequence() {
            self.schedule_from(state);
        }
        info!(state = %state, loop_number = self.current_loop, "progression restored");
        state
    }

    /// Queue the rest of the bust chain after `state`. Returns when the
    /// first queued transition fires.
    fn schedule_from(&mut self, state: GameState) -> Duration {
        let chain = [
            (GameState::Investigating, self.timings.arming_delay(), GameState::Equipped),
            (GameState::Equipped, self.timings.equipped(), GameState::Busted),
            (GameState::Busted, self.timings.busted(), GameState::Jailed),
            (GameState::Jailed, self.timings.jailed(), GameState::Released),
            (GameState::Released, self.timings.released(), GameState::Idle),
        ];
        let mut first = None;
        for (_, delay, to) in chain.into_iter().skip_while(|(from, _, _)| *from != state) {
            let at = self.timeline.push_after(delay, to);
            first.get_or_insert(at);
        }
        first.unwrap_or(self.timeline.now())
    }

    fn enter(&mut self, to: GameState) -> Transition {
        let at = self.timeline.now();
        self.enter_at(to, at)
    }

    fn enter_at(&mut self, to: GameState, at: Duration) -> Transition {
        let transition = Transition {
            from: self.state,
            to,
            at,
        };
        self.state = to;
        info!(from = %transition.from, to = %transition.to, at_ms = at.as_millis() as u64, "state transition");
        transition
    }
}
