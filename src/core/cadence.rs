use crate::domain::model::OreLedger;
use crate::domain::ports::TickDriver;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Records one ore every `every` iterations, nothing else.
#[derive(Debug, Clone)]
pub struct CadenceDriver {
    every: u64,
}

impl CadenceDriver {
    pub fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
        }
    }
}

impl Default for CadenceDriver {
    fn default() -> Self {
        Self::new(10)
    }
}

#[async_trait]
impl TickDriver for CadenceDriver {
    fn name(&self) -> &'static str {
        "cadence"
    }

    async fn tick(&mut self, iteration: u64, ledger: &mut OreLedger) -> Result<()> {
        if iteration % self.every == 0 {
            ledger.record_ore()?;
            tracing::info!(
                "[TIER 6] 🎯 Ore recorded! Mined: {} total | Luno: {}",
                ledger.ores_mined(),
                ledger.luno_earned()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_on_cadence_only() {
        let mut driver = CadenceDriver::default();
        let mut ledger = OreLedger::default();

        for iteration in 1..=35 {
            driver.tick(iteration, &mut ledger).await.unwrap();
            assert_eq!(ledger.ores_mined(), iteration / 10);
            assert_eq!(ledger.luno_earned(), 500 * ledger.ores_mined());
        }
    }

    #[tokio::test]
    async fn test_zero_cadence_is_clamped() {
        let mut driver = CadenceDriver::new(0);
        let mut ledger = OreLedger::new(100);
        driver.tick(1, &mut ledger).await.unwrap();
        assert_eq!(ledger.ores_mined(), 1);
        assert_eq!(ledger.luno_earned(), 100);
    }
}
