use crate::config::toml_config::TuningSettings;
use crate::core::decision::DecisionParams;
use crate::core::executor::ExecutionReport;
use crate::domain::model::{ActionOutcome, ActionPlan, Observation};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize)]
pub struct TelemetrySnapshot {
    pub frames: u64,
    pub detections: u64,
    pub empty_scans: u64,
    pub plans: BTreeMap<&'static str, u64>,
    pub attempts: u64,
    pub extracted: u64,
    pub misclassified: u64,
    pub missed: u64,
    pub exhausted: u64,
    pub input_time_ms: u64,
    pub threshold: f32,
    pub adjustments: u32,
}

impl TelemetrySnapshot {
    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.extracted as f64 / self.attempts as f64
        }
    }
}

/// Watches every stage of the agent and moves the detection threshold.
#[derive(Debug, Clone)]
pub struct Telemetry {
    tuning: TuningSettings,
    snapshot: TelemetrySnapshot,
    input_time: Duration,
    window: VecDeque<bool>,
    empty_since_adjust: u64,
}

impl Telemetry {
    pub fn new(tuning: TuningSettings) -> Self {
        let snapshot = TelemetrySnapshot {
            threshold: tuning.initial_threshold,
            ..TelemetrySnapshot::default()
        };
        Self {
            window: VecDeque::with_capacity(tuning.window),
            tuning,
            snapshot,
            input_time: Duration::ZERO,
            empty_since_adjust: 0,
        }
    }

    pub fn record_observation(&mut self, obs: &Observation, candidates: usize) {
        self.snapshot.frames += 1;
        self.snapshot.detections += obs.detections.len() as u64;
        if candidates == 0 {
            self.snapshot.empty_scans += 1;
            self.empty_since_adjust += 1;
        }
    }

    pub fn record_execution(&mut self, plan: &ActionPlan, report: &ExecutionReport) {
        *self.snapshot.plans.entry(plan.kind()).or_default() += 1;
        self.input_time += report.sequence.total_hold();
        self.snapshot.input_time_ms = self.input_time.as_millis() as u64;

        match report.outcome {
            ActionOutcome::Extracted { .. } => self.snapshot.extracted += 1,
            ActionOutcome::NotOre => self.snapshot.misclassified += 1,
            ActionOutcome::NothingThere => self.snapshot.missed += 1,
            ActionOutcome::Exhausted => self.snapshot.exhausted += 1,
            _ => {}
        }
        if let Some(success) = report.outcome.concludes_attempt() {
            self.snapshot.attempts += 1;
            if self.window.len() == self.tuning.window {
                self.window.pop_front();
            }
            self.window.push_back(success);
        }
    }

    /// Windowed success rate, once the window is full.
    pub fn window_success_rate(&self) -> Option<f32> {
        if self.window.len() < self.tuning.window || self.window.is_empty() {
            return None;
        }
        let successes = self.window.iter().filter(|s| **s).count();
        Some(successes as f32 / self.window.len() as f32)
    }

    /// Raise the threshold when attempts keep failing, lower it when scans keep
    /// coming back empty. Returns the new threshold if it moved.
    pub fn tune(&mut self, params: &mut DecisionParams) -> Option<f32> {
        let current = params.confidence_threshold;
        let mut proposed = current;
        let mut reason = "";

        if let Some(rate) = self.window_success_rate() {
            if rate < self.tuning.target_success_rate {
                proposed = (current + self.tuning.step).min(self.tuning.max_threshold);
                reason = "success rate below target";
                self.window.clear();
            }
        }
        if proposed == current && self.empty_since_adjust > self.tuning.window as u64 {
            proposed = (current - self.tuning.step).max(self.tuning.min_threshold);
            reason = "too many empty scans";
            self.empty_since_adjust = 0;
        }

        if (proposed - current).abs() <= f32::EPSILON {
            return None;
        }

        params.confidence_threshold = proposed;
        self.snapshot.threshold = proposed;
        self.snapshot.adjustments += 1;
        self.empty_since_adjust = 0;
        tracing::info!(
            "[TIER 1] ⚙️  Auto-tuning: confidence threshold {:.2} -> {:.2} ({})",
            current,
            proposed,
            reason
        );
        Some(proposed)
    }

    pub fn snapshot(&self) -> &TelemetrySnapshot {
        &self.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{InputSequence, OreKind, Position};

    fn tuning() -> TuningSettings {
        TuningSettings {
            initial_threshold: 0.5,
            min_threshold: 0.3,
            max_threshold: 0.6,
            step: 0.05,
            window: 4,
            target_success_rate: 0.75,
        }
    }

    fn params() -> DecisionParams {
        DecisionParams {
            confidence_threshold: 0.5,
            rest_below: 10,
            resume_at: 50,
        }
    }

    fn report(outcome: ActionOutcome) -> ExecutionReport {
        ExecutionReport {
            outcome,
            sequence: InputSequence::default(),
        }
    }

    fn empty_obs() -> Observation {
        Observation {
            tick: 0,
            agent: Position::new(0, 0),
            stamina: 100,
            detections: vec![],
        }
    }

    #[test]
    fn test_failures_raise_threshold_up_to_max() {
        let mut telemetry = Telemetry::new(tuning());
        let mut params = params();
        let mine = ActionPlan::Mine { at: Position::new(0, 0) };

        for round in 0..5 {
            for _ in 0..4 {
                telemetry.record_execution(&mine, &report(ActionOutcome::NotOre));
            }
            let moved = telemetry.tune(&mut params);
            if round < 2 {
                assert!(moved.is_some());
            } else {
                assert!(moved.is_none());
            }
        }
        assert!((params.confidence_threshold - 0.6).abs() < 1e-6);
        assert_eq!(telemetry.snapshot().misclassified, 20);
        assert_eq!(telemetry.snapshot().adjustments, 2);
    }

    #[test]
    fn test_partial_window_does_not_tune() {
        let mut telemetry = Telemetry::new(tuning());
        let mut params = params();
        let mine = ActionPlan::Mine { at: Position::new(0, 0) };
        telemetry.record_execution(&mine, &report(ActionOutcome::NothingThere));
        assert_eq!(telemetry.window_success_rate(), None);
        assert_eq!(telemetry.tune(&mut params), None);
    }

    #[test]
    fn test_successes_keep_threshold() {
        let mut telemetry = Telemetry::new(tuning());
        let mut params = params();
        let mine = ActionPlan::Mine { at: Position::new(0, 0) };
        for _ in 0..4 {
            telemetry.record_execution(
                &mine,
                &report(ActionOutcome::Extracted { kind: OreKind::Copper }),
            );
        }
        assert_eq!(telemetry.window_success_rate(), Some(1.0));
        assert_eq!(telemetry.tune(&mut params), None);
        assert_eq!(telemetry.snapshot().success_rate(), 1.0);
    }

    #[test]
    fn test_empty_scans_lower_threshold_down_to_min() {
        let mut telemetry = Telemetry::new(tuning());
        let mut params = params();

        for _ in 0..20 {
            for _ in 0..5 {
                telemetry.record_observation(&empty_obs(), 0);
            }
            telemetry.tune(&mut params);
        }
        assert!((params.confidence_threshold - 0.3).abs() < 1e-6);
        assert_eq!(telemetry.snapshot().empty_scans, 100);
        assert_eq!(telemetry.snapshot().frames, 100);
    }

    #[test]
    fn test_plan_counts_and_input_time() {
        let mut telemetry = Telemetry::new(tuning());
        let sequence = InputSequence {
            steps: vec![crate::domain::model::InputStep {
                input: crate::domain::model::Input::Rest,
                hold: Duration::from_millis(750),
            }],
        };
        let rest = ExecutionReport {
            outcome: ActionOutcome::Rested { stamina: 20 },
            sequence,
        };
        telemetry.record_execution(&ActionPlan::Rest, &rest);
        telemetry.record_execution(&ActionPlan::Rest, &rest);
        assert_eq!(telemetry.snapshot().plans.get("rest"), Some(&2));
        assert_eq!(telemetry.snapshot().input_time_ms, 1500);
        assert_eq!(telemetry.snapshot().attempts, 0);
    }
}
