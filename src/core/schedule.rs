use tracing::Level;

/// Tier reserved for the driver's own ore lines.
pub const DRIVER_TIER: u8 = 6;

/// A log line emitted every `every` iterations under a tier label.
#[derive(Debug, Clone, PartialEq)]
pub struct TierEvent {
    pub tier: u8,
    pub every: u64,
    pub level: Level,
    pub message: &'static str,
}

impl TierEvent {
    pub const fn new(tier: u8, every: u64, level: Level, message: &'static str) -> Self {
        Self {
            tier,
            every,
            level,
            message,
        }
    }

    pub fn is_due(&self, iteration: u64) -> bool {
        self.every > 0 && iteration > 0 && iteration % self.every == 0
    }
}

/// Tier 6 belongs to the driver (ore events), so it never appears here.
#[derive(Debug, Clone)]
pub struct TierSchedule {
    events: Vec<TierEvent>,
}

impl Default for TierSchedule {
    fn default() -> Self {
        Self::new(vec![
            TierEvent::new(1, 60, Level::INFO, "⚙️  Parameter tuning checkpoint"),
            TierEvent::new(2, 120, Level::INFO, "🧠 Outcome statistics checkpoint"),
            TierEvent::new(3, 90, Level::INFO, "🗺️  Zone occupancy checkpoint"),
            TierEvent::new(4, 30, Level::INFO, "🛤️  Route refresh checkpoint"),
            TierEvent::new(5, 1800, Level::INFO, "💹 Market snapshot checkpoint"),
            TierEvent::new(7, 5, Level::DEBUG, "👤 Input timing profile applied"),
            TierEvent::new(8, 30, Level::DEBUG, "⚡ Stamina forecast checkpoint"),
        ])
    }
}

impl TierSchedule {
    pub fn new(events: Vec<TierEvent>) -> Self {
        Self { events }
    }

    pub fn due(&self, iteration: u64) -> impl Iterator<Item = &TierEvent> + '_ {
        self.events.iter().filter(move |e| e.is_due(iteration))
    }

    /// Tiers that log ahead of the driver's tick (1 through 5).
    pub fn emit_before_driver(&self, iteration: u64) {
        self.emit_where(iteration, |tier| tier < DRIVER_TIER);
    }

    /// Tiers that log after the driver's tick (7 and up).
    pub fn emit_after_driver(&self, iteration: u64) {
        self.emit_where(iteration, |tier| tier > DRIVER_TIER);
    }

    fn emit_where(&self, iteration: u64, include: impl Fn(u8) -> bool) {
        for event in self.due(iteration).filter(|e| include(e.tier)) {
            // tracing 的 level 必須是常數，所以逐一展開
            if event.level > Level::INFO {
                tracing::debug!(iteration, "[TIER {}] {}", event.tier, event.message);
            } else if event.level < Level::INFO {
                tracing::warn!(iteration, "[TIER {}] {}", event.tier, event.message);
            } else {
                tracing::info!(iteration, "[TIER {}] {}", event.tier, event.message);
            }
        }
    }
}
