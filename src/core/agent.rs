use crate::config::toml_config::{AgentSettings, TuningSettings};
use crate::core::decision::{DecisionEngine, DecisionParams};
use crate::core::executor::ActionExecutor;
use crate::core::field::SimulatedField;
use crate::core::perception::FramePerception;
use crate::core::telemetry::Telemetry;
use crate::domain::model::{ActionOutcome, OreLedger};
use crate::domain::ports::{Actuator, FrameSource, TickDriver};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Perception -> decision -> action over a world `W`, with telemetry feeding
/// the decision parameters back.
pub struct AgentDriver<W: FrameSource + Actuator> {
    world: W,
    perception: FramePerception,
    decision: DecisionEngine,
    executor: ActionExecutor,
    telemetry: Telemetry,
}

impl AgentDriver<SimulatedField> {
    pub fn simulated(agent: &AgentSettings, tuning: &TuningSettings) -> Result<Self> {
        let field = SimulatedField::generate(agent)?;
        Ok(Self::new(field, agent, tuning))
    }
}

impl<W: FrameSource + Actuator> AgentDriver<W> {
    pub fn new(world: W, agent: &AgentSettings, tuning: &TuningSettings) -> Self {
        Self {
            world,
            perception: FramePerception::default(),
            decision: DecisionEngine::new(DecisionParams::from_settings(agent, tuning)),
            executor: ActionExecutor::from_settings(agent),
            telemetry: Telemetry::new(tuning.clone()),
        }
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn telemetry_state(&self) -> &Telemetry {
        &self.telemetry
    }
}

#[async_trait]
impl<W: FrameSource + Actuator> TickDriver for AgentDriver<W> {
    fn name(&self) -> &'static str {
        "agent"
    }

    async fn tick(&mut self, iteration: u64, ledger: &mut OreLedger) -> Result<()> {
        let frame = self.world.capture(iteration)?;
        let obs = self.perception.observe(&frame);
        let candidates = self.decision.candidates(&obs).len();
        self.telemetry.record_observation(&obs, candidates);

        let plan = self.decision.decide(&obs);
        let report = self.executor.execute(&plan, obs.agent, &mut self.world)?;
        self.decision.on_outcome(&report.outcome);
        self.telemetry.record_execution(&plan, &report);

        match report.outcome {
            ActionOutcome::Extracted { kind } => {
                ledger.record_ore()?;
                tracing::info!(
                    "[TIER 6] 🎯 Classified {} ore! Mined: {} total | Luno: {}",
                    kind.label(),
                    ledger.ores_mined(),
                    ledger.luno_earned()
                );
            }
            ActionOutcome::NotOre => {
                tracing::debug!("Swing at {} hit rock, marking as misclassified", obs.agent);
            }
            _ => {}
        }

        self.telemetry.tune(self.decision.params_mut());
        Ok(())
    }

    fn telemetry(&self) -> Option<serde_json::Value> {
        serde_json::to_value(self.telemetry.snapshot()).ok()
    }
}
