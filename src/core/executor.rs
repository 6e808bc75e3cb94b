use crate::config::toml_config::AgentSettings;
use crate::domain::model::{ActionOutcome, ActionPlan, Input, InputSequence, InputStep, Position};
use crate::domain::ports::Actuator;
use crate::utils::error::Result;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct InputTimings {
    pub step: Duration,
    pub swing: Duration,
    pub rest: Duration,
    pub idle: Duration,
}

impl InputTimings {
    pub fn from_settings(settings: &AgentSettings) -> Self {
        Self {
            step: Duration::from_millis(settings.step_ms),
            swing: Duration::from_millis(settings.swing_ms),
            rest: Duration::from_millis(settings.rest_ms),
            idle: Duration::from_millis(settings.idle_ms),
        }
    }

    fn base(&self, input: &Input) -> Duration {
        match input {
            Input::Step(_) => self.step,
            Input::Swing => self.swing,
            Input::Rest => self.rest,
            Input::Idle => self.idle,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReport {
    pub outcome: ActionOutcome,
    pub sequence: InputSequence,
}

/// Turns plans into jittered input sequences and plays them on an actuator.
/// Hold times are accounted for telemetry, never slept.
#[derive(Debug, Clone)]
pub struct ActionExecutor {
    timings: InputTimings,
    jitter_pct: f32,
    rng: ChaCha8Rng,
}

impl ActionExecutor {
    pub fn new(timings: InputTimings, jitter_pct: f32, seed: u64) -> Self {
        Self {
            timings,
            jitter_pct: if jitter_pct.is_finite() {
                jitter_pct.clamp(0.0, 0.9)
            } else {
                0.0
            },
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn from_settings(settings: &AgentSettings) -> Self {
        // 抖動的種子與場地錯開
        Self::new(
            InputTimings::from_settings(settings),
            settings.jitter_pct,
            settings.seed.wrapping_add(0x9E37_79B9),
        )
    }

    fn jittered(&mut self, base: Duration) -> Duration {
        if !(self.jitter_pct > 0.0) || base.is_zero() {
            return base;
        }
        let factor = 1.0 + self.rng.gen_range(-self.jitter_pct..=self.jitter_pct);
        base.mul_f32(factor)
    }

    pub fn compile(&mut self, plan: &ActionPlan, agent: Position) -> InputSequence {
        let inputs = match plan {
            ActionPlan::Move { to } => match agent.step_toward(to) {
                Some(direction) => vec![Input::Step(direction)],
                None => vec![Input::Idle],
            },
            ActionPlan::Mine { .. } => vec![Input::Swing],
            ActionPlan::Rest => vec![Input::Rest],
            ActionPlan::Scan => vec![Input::Idle],
        };

        let steps = inputs
            .into_iter()
            .map(|input| {
                let base = self.timings.base(&input);
                let hold = self.jittered(base);
                InputStep { input, hold }
            })
            .collect();
        InputSequence { steps }
    }

    pub fn execute<A: Actuator + ?Sized>(
        &mut self,
        plan: &ActionPlan,
        agent: Position,
        actuator: &mut A,
    ) -> Result<ExecutionReport> {
        let sequence = self.compile(plan, agent);
        let mut outcome = ActionOutcome::Idle;
        for step in &sequence.steps {
            outcome = actuator.apply(&step.input)?.into();
        }
        Ok(ExecutionReport { outcome, sequence })
    }
}
