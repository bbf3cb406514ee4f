//! Serializable end-of-session summary.
use serde::Serialize;
use tactics_core::{CombatPhase, CombatResult, FactionId, VictoryCheck};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FactionSummary {
    pub faction_id: FactionId,
    pub name: String,
    pub is_player_controlled: bool,
    pub squads_remaining: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    pub seed: u64,
    pub phase: CombatPhase,
    pub round: u32,
    pub steps_executed: usize,
    pub factions: Vec<FactionSummary>,
    pub attacks: Vec<CombatResult>,
    pub victory: VictoryCheck,
}

impl SessionReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
