use crate::config::toml_config::AgentSettings;
use crate::domain::model::{Blob, Frame, Input, InputEffect, OreKind, Position};
use crate::domain::ports::{Actuator, FrameSource};
use crate::utils::error::{Result, SessionError};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone, PartialEq)]
pub struct OreNode {
    pub id: u32,
    pub position: Position,
    pub kind: OreKind,
    pub remaining: u32,
}

/// In-memory stand-in for the game world: a bounded grid of ore nodes plus
/// the agent's body. Acts as both the frame source and the actuator.
#[derive(Debug, Clone)]
pub struct SimulatedField {
    width: i32,
    height: i32,
    nodes: Vec<OreNode>,
    agent: Position,
    stamina: u32,
    stamina_max: u32,
    swing_cost: u32,
    rest_regen: u32,
    mining_ticks: u32,
    signal_noise: f32,
    progress: Option<(u32, u32)>,
    next_id: u32,
    rng: ChaCha8Rng,
}

impl SimulatedField {
    pub fn generate(settings: &AgentSettings) -> Result<Self> {
        let cells = (settings.field_width as usize) * (settings.field_height as usize);
        if settings.node_count >= cells {
            return Err(SessionError::simulation(format!(
                "{} nodes do not fit a {}x{} field",
                settings.node_count, settings.field_width, settings.field_height
            )));
        }

        let mut field = Self {
            width: settings.field_width,
            height: settings.field_height,
            nodes: Vec::with_capacity(settings.node_count),
            agent: Position::new(settings.field_width / 2, settings.field_height / 2),
            stamina: settings.stamina_max,
            stamina_max: settings.stamina_max,
            swing_cost: settings.swing_cost,
            rest_regen: settings.rest_regen,
            mining_ticks: settings.mining_ticks.max(1),
            signal_noise: settings.signal_noise,
            progress: None,
            next_id: 0,
            rng: ChaCha8Rng::seed_from_u64(settings.seed),
        };
        for _ in 0..settings.node_count {
            field.spawn_node()?;
        }
        Ok(field)
    }

    /// Field with hand-placed nodes; agent starts at `agent`.
    pub fn with_nodes(settings: &AgentSettings, agent: Position, nodes: Vec<(Position, OreKind, u32)>) -> Self {
        let nodes: Vec<OreNode> = nodes
            .into_iter()
            .enumerate()
            .map(|(id, (position, kind, remaining))| OreNode {
                id: id as u32,
                position,
                kind,
                remaining,
            })
            .collect();
        Self {
            width: settings.field_width,
            height: settings.field_height,
            next_id: nodes.len() as u32,
            nodes,
            agent,
            stamina: settings.stamina_max,
            stamina_max: settings.stamina_max,
            swing_cost: settings.swing_cost,
            rest_regen: settings.rest_regen,
            mining_ticks: settings.mining_ticks.max(1),
            signal_noise: settings.signal_noise,
            progress: None,
            rng: ChaCha8Rng::seed_from_u64(settings.seed),
        }
    }

    pub fn agent(&self) -> Position {
        self.agent
    }

    pub fn stamina(&self) -> u32 {
        self.stamina
    }

    pub fn nodes(&self) -> &[OreNode] {
        &self.nodes
    }

    pub fn in_bounds(&self, position: &Position) -> bool {
        (0..self.width).contains(&position.x) && (0..self.height).contains(&position.y)
    }

    fn random_kind(&mut self) -> OreKind {
        match self.rng.gen_range(0..100) {
            0..=39 => OreKind::Copper,
            40..=69 => OreKind::Iron,
            70..=79 => OreKind::Mithril,
            _ => OreKind::Rock,
        }
    }

    fn free_cell(&mut self) -> Result<Position> {
        // 隨機嘗試幾次後改為線性掃描，確保一定找得到空格
        for _ in 0..64 {
            let candidate = Position::new(self.rng.gen_range(0..self.width), self.rng.gen_range(0..self.height));
            if self.is_free(&candidate) {
                return Ok(candidate);
            }
        }
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| Position::new(x, y)))
            .find(|p| self.is_free(p))
            .ok_or_else(|| SessionError::simulation("no free cell left to spawn a node"))
    }

    fn is_free(&self, position: &Position) -> bool {
        *position != self.agent && self.nodes.iter().all(|n| n.position != *position)
    }

    fn spawn_node(&mut self) -> Result<()> {
        let position = self.free_cell()?;
        let kind = self.random_kind();
        let remaining = self.rng.gen_range(1..=3);
        self.nodes.push(OreNode {
            id: self.next_id,
            position,
            kind,
            remaining,
        });
        self.next_id += 1;
        Ok(())
    }

    fn noisy(&mut self, value: f32) -> f32 {
        if !(self.signal_noise > 0.0) {
            return value;
        }
        (value + self.rng.gen_range(-self.signal_noise..=self.signal_noise)).clamp(0.0, 1.0)
    }

    fn swing(&mut self) -> Result<InputEffect> {
        if self.stamina < self.swing_cost {
            return Ok(InputEffect::Exhausted);
        }
        self.stamina -= self.swing_cost;

        let agent = self.agent;
        let Some(index) = self
            .nodes
            .iter()
            .position(|n| n.position == agent && n.remaining > 0)
        else {
            self.progress = None;
            return Ok(InputEffect::NothingThere);
        };

        let node = &self.nodes[index];
        if !node.kind.is_ore() {
            self.progress = None;
            return Ok(InputEffect::NotOre);
        }

        let node_id = node.id;
        let progress = match self.progress {
            Some((id, swings)) if id == node_id => swings + 1,
            _ => 1,
        };
        if progress < self.mining_ticks {
            self.progress = Some((node_id, progress));
            return Ok(InputEffect::SwingLanded { progress });
        }

        self.progress = None;
        let node = &mut self.nodes[index];
        let kind = node.kind;
        node.remaining -= 1;
        if node.remaining == 0 {
            tracing::debug!("Node {} at {} depleted, respawning", node.id, node.position);
            self.nodes.remove(index);
            self.spawn_node()?;
        }
        Ok(InputEffect::Extracted(kind))
    }
}

impl FrameSource for SimulatedField {
    fn capture(&mut self, tick: u64) -> Result<Frame> {
        if !self.in_bounds(&self.agent) {
            return Err(SessionError::simulation(format!(
                "agent at {} is outside the {}x{} field",
                self.agent, self.width, self.height
            )));
        }

        let signatures: Vec<(Position, (f32, f32))> = self
            .nodes
            .iter()
            .filter(|n| n.remaining > 0)
            .map(|n| (n.position, n.kind.signature()))
            .collect();
        let blobs = signatures
            .into_iter()
            .map(|(position, (hue, brightness))| Blob {
                position,
                hue: self.noisy(hue),
                brightness: self.noisy(brightness),
            })
            .collect();

        Ok(Frame {
            tick,
            width: self.width,
            height: self.height,
            agent: self.agent,
            stamina: self.stamina,
            blobs,
        })
    }
}

impl Actuator for SimulatedField {
    fn apply(&mut self, input: &Input) -> Result<InputEffect> {
        match input {
            Input::Step(direction) => {
                let next = self.agent.offset(*direction);
                if !self.in_bounds(&next) {
                    return Ok(InputEffect::Blocked);
                }
                self.agent = next;
                self.progress = None;
                Ok(InputEffect::Moved(next))
            }
            Input::Swing => self.swing(),
            Input::Rest => {
                self.stamina = (self.stamina + self.rest_regen).min(self.stamina_max);
                Ok(InputEffect::Rested {
                    stamina: self.stamina,
                })
            }
            Input::Idle => Ok(InputEffect::Idle),
        }
    }
}
