// Slot template: the ordered lineup requirements of a league format.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::league::Position;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template has no slots")]
    Empty,

    #[error("slot `{slot}` has count 0")]
    ZeroCount { slot: String },

    #[error("slot `{slot}` lists no eligible positions")]
    NoPositions { slot: String },

    #[error("slot `{slot}` lists unknown position `{label}`")]
    UnknownPosition { slot: String, label: String },

    #[error("slot name `{slot}` is declared twice")]
    DuplicateName { slot: String },
}

/// Raw slot declaration as written in configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SlotSpec {
    pub name: String,
    pub positions: Vec<String>,
    pub count: usize,
}

/// One lineup requirement: `count` seats any `eligible` position can fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotDef {
    pub name: String,
    pub eligible: Vec<Position>,
    pub count: usize,
}

impl SlotDef {
    /// Flex-type slots accept more than one position and are filled after
    /// every dedicated slot.
    pub fn is_flex(&self) -> bool {
        self.eligible.len() > 1
    }

    pub fn accepts(&self, position: Position) -> bool {
        self.eligible.contains(&position)
    }
}

/// Ordered, validated sequence of slot definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotTemplate {
    slots: Vec<SlotDef>,
}

impl SlotTemplate {
    pub fn new(slots: Vec<SlotDef>) -> Result<Self, TemplateError> {
        if slots.is_empty() {
            return Err(TemplateError::Empty);
        }
        let mut names = HashSet::new();
        for slot in &slots {
            if slot.count == 0 {
                return Err(TemplateError::ZeroCount {
                    slot: slot.name.clone(),
                });
            }
            if slot.eligible.is_empty() {
                return Err(TemplateError::NoPositions {
                    slot: slot.name.clone(),
                });
            }
            if !names.insert(slot.name.as_str()) {
                return Err(TemplateError::DuplicateName {
                    slot: slot.name.clone(),
                });
            }
        }
        Ok(Self { slots })
    }

    /// Parse configuration declarations, keeping declaration order.
    /// Repeated position labels within one slot collapse to one.
    pub fn from_specs(specs: &[SlotSpec]) -> Result<Self, TemplateError> {
        let mut slots = Vec::with_capacity(specs.len());
        for spec in specs {
            let mut eligible = Vec::new();
            for label in &spec.positions {
                let pos = Position::from_str_pos(label).ok_or_else(|| {
                    TemplateError::UnknownPosition {
                        slot: spec.name.clone(),
                        label: label.clone(),
                    }
                })?;
                if !eligible.contains(&pos) {
                    eligible.push(pos);
                }
            }
            slots.push(SlotDef {
                name: spec.name.clone(),
                eligible,
                count: spec.count,
            });
        }
        Self::new(slots)
    }

    pub fn slots(&self) -> &[SlotDef] {
        &self.slots
    }

    /// Slots in processing order: dedicated slots in declaration order,
    /// then flex slots in declaration order.
    pub fn fill_order(&self) -> impl Iterator<Item = &SlotDef> {
        self.slots
            .iter()
            .filter(|s| !s.is_flex())
            .chain(self.slots.iter().filter(|s| s.is_flex()))
    }

    /// Number of starters in a fully filled lineup.
    pub fn lineup_size(&self) -> usize {
        self.slots.iter().map(|s| s.count).sum()
    }
}

fn slot(name: &str, eligible: &[Position], count: usize) -> SlotDef {
    SlotDef {
        name: name.to_string(),
        eligible: eligible.to_vec(),
        count,
    }
}

/// Superflex format: QB, 2 RB, 2 WR, TE, DEF, K, FLEX (RB/WR/TE) and
/// SUPERFLEX (QB/RB/WR/TE).
pub fn standard_template() -> SlotTemplate {
    use Position::*;
    SlotTemplate {
        slots: vec![
            slot("QB", &[Quarterback], 1),
            slot("RB", &[RunningBack], 2),
            slot("WR", &[WideReceiver], 2),
            slot("TE", &[TightEnd], 1),
            slot("DEF", &[Defense], 1),
            slot("K", &[Kicker], 1),
            slot("FLEX", &[RunningBack, WideReceiver, TightEnd], 1),
            slot(
                "SUPERFLEX",
                &[Quarterback, RunningBack, WideReceiver, TightEnd],
                1,
            ),
        ],
    }
}
