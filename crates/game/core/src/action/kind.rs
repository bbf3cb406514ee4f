//! Action kind enumeration - the dedup key for queued actions.

use strum::{EnumCount, EnumIter, IntoStaticStr};

/// Category tag of a queued action.
///
/// An [`super::ActionQueue`] holds at most one entry per kind, so the number
/// of variants is also the queue's capacity.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, EnumCount, EnumIter, IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ActionKind {
    /// Relocate on the grid.
    Movement,

    /// Generic attack with no range preference.
    Attack,

    /// Attack against an adjacent target.
    MeleeAttack,

    /// Attack from beyond adjacency, up to the squad's attack range.
    RangedAttack,

    /// Pick up an item lying on a tile.
    PickupItem,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Returns true for the attack family (consumes the squad's combat action).
    pub const fn is_attack(self) -> bool {
        matches!(self, Self::Attack | Self::MeleeAttack | Self::RangedAttack)
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
