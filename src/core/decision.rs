use crate::config::toml_config::{AgentSettings, TuningSettings};
use crate::core::route::plan_route;
use crate::domain::model::{ActionOutcome, ActionPlan, Observation, Position};
use std::collections::VecDeque;

/// Knobs the adaptive controller is allowed to move.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionParams {
    pub confidence_threshold: f32,
    pub rest_below: u32,
    pub resume_at: u32,
}

impl DecisionParams {
    pub fn from_settings(agent: &AgentSettings, tuning: &TuningSettings) -> Self {
        Self {
            confidence_threshold: tuning.initial_threshold,
            rest_below: agent.rest_below,
            resume_at: agent.resume_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AgentState {
    Scanning,
    Travelling {
        target: Position,
        route: VecDeque<Position>,
    },
    Mining {
        target: Position,
        route: VecDeque<Position>,
    },
    Resting,
}

impl AgentState {
    pub fn label(&self) -> &'static str {
        match self {
            AgentState::Scanning => "scanning",
            AgentState::Travelling { .. } => "travelling",
            AgentState::Mining { .. } => "mining",
            AgentState::Resting => "resting",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DecisionEngine {
    state: AgentState,
    params: DecisionParams,
}

impl DecisionEngine {
    pub fn new(params: DecisionParams) -> Self {
        Self {
            state: AgentState::Scanning,
            params,
        }
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn params(&self) -> &DecisionParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut DecisionParams {
        &mut self.params
    }

    /// Ore detections the current threshold accepts.
    pub fn candidates(&self, obs: &Observation) -> Vec<Position> {
        obs.detections
            .iter()
            .filter(|d| d.kind.is_ore() && d.confidence >= self.params.confidence_threshold)
            .map(|d| d.position)
            .collect()
    }

    fn transition(&mut self, next: AgentState) {
        if std::mem::discriminant(&self.state) != std::mem::discriminant(&next) {
            tracing::debug!("Agent state {} -> {}", self.state.label(), next.label());
        }
        self.state = next;
    }

    /// Next stop from `route` that is still visible, or back to scanning.
    fn advance(&mut self, mut route: VecDeque<Position>, obs: Option<&Observation>) {
        while let Some(target) = route.pop_front() {
            if obs.map_or(true, |o| o.sees(&target)) {
                self.transition(AgentState::Travelling { target, route });
                return;
            }
        }
        self.transition(AgentState::Scanning);
    }

    pub fn decide(&mut self, obs: &Observation) -> ActionPlan {
        if obs.stamina < self.params.rest_below && self.state != AgentState::Resting {
            self.transition(AgentState::Resting);
        }

        if self.state == AgentState::Resting {
            if obs.stamina < self.params.resume_at {
                return ActionPlan::Rest;
            }
            self.transition(AgentState::Scanning);
        }

        if self.state == AgentState::Scanning {
            let candidates = self.candidates(obs);
            if candidates.is_empty() {
                return ActionPlan::Scan;
            }
            let route: VecDeque<Position> = plan_route(obs.agent, &candidates).into();
            tracing::debug!("Planned route over {} nodes from {}", route.len(), obs.agent);
            self.advance(route, None);
        }

        if let AgentState::Travelling { target, route } = &self.state {
            let (target, route) = (*target, route.clone());
            if !obs.sees(&target) {
                self.advance(route, Some(obs));
                return self.decide_after_retarget(obs);
            }
            if obs.agent == target {
                self.transition(AgentState::Mining { target, route });
                return ActionPlan::Mine { at: target };
            }
            return ActionPlan::Move { to: target };
        }

        match &self.state {
            AgentState::Mining { target, .. } => ActionPlan::Mine { at: *target },
            _ => ActionPlan::Scan,
        }
    }

    fn decide_after_retarget(&mut self, obs: &Observation) -> ActionPlan {
        match &self.state {
            AgentState::Travelling { target, route } if obs.agent == *target => {
                let (target, route) = (*target, route.clone());
                self.transition(AgentState::Mining { target, route });
                ActionPlan::Mine { at: target }
            }
            AgentState::Travelling { target, .. } => ActionPlan::Move { to: *target },
            _ => ActionPlan::Scan,
        }
    }

    pub fn on_outcome(&mut self, outcome: &ActionOutcome) {
        if *outcome == ActionOutcome::Exhausted {
            self.transition(AgentState::Resting);
            return;
        }
        if outcome.concludes_attempt().is_none() {
            return;
        }
        if let AgentState::Mining { route, .. } = &self.state {
            let route = route.clone();
            self.advance(route, None);
        }
    }
}
