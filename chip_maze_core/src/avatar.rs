use serde::{Deserialize, Serialize};

/// Cosmetic evolution stage of the player's avatar.
///
/// Derived from the session's lifetime collectible count only; gameplay never
/// reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AvatarStage {
    Basic,
    Energy,
    Rings,
    Geometric,
    Crystalline,
    Ultimate,
}

/// Lifetime counts at which the HUD announces the next evolution.
pub const EVOLUTION_MILESTONES: [u64; 5] = [3, 6, 9, 12, 15];

impl AvatarStage {
    pub fn from_lifetime(collected: u64) -> Self {
        match collected {
            0 => AvatarStage::Basic,
            1..=2 => AvatarStage::Energy,
            3..=5 => AvatarStage::Rings,
            6..=8 => AvatarStage::Geometric,
            9..=12 => AvatarStage::Crystalline,
            _ => AvatarStage::Ultimate,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AvatarStage::Basic => "basic",
            AvatarStage::Energy => "energy",
            AvatarStage::Rings => "rings",
            AvatarStage::Geometric => "geometric",
            AvatarStage::Crystalline => "crystalline",
            AvatarStage::Ultimate => "ultimate",
        }
    }
}

/// Collectibles still needed to reach the next milestone, or `None` at max level.
pub fn chips_to_next_evolution(collected: u64) -> Option<u64> {
    EVOLUTION_MILESTONES
        .iter()
        .find(|milestone| **milestone > collected)
        .map(|milestone| milestone - collected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_boundaries() {
        let stages: Vec<_> = [0, 1, 2, 3, 5, 6, 8, 9, 12, 13, 100]
            .into_iter()
            .map(AvatarStage::from_lifetime)
            .collect();
        assert_eq!(
            stages,
            vec![
                AvatarStage::Basic,
                AvatarStage::Energy,
                AvatarStage::Energy,
                AvatarStage::Rings,
                AvatarStage::Rings,
                AvatarStage::Geometric,
                AvatarStage::Geometric,
                AvatarStage::Crystalline,
                AvatarStage::Crystalline,
                AvatarStage::Ultimate,
                AvatarStage::Ultimate,
            ]
        );
    }

    #[test]
    fn next_evolution_distance() {
        assert_eq!(chips_to_next_evolution(0), Some(3));
        assert_eq!(chips_to_next_evolution(3), Some(3));
        assert_eq!(chips_to_next_evolution(14), Some(1));
        assert_eq!(chips_to_next_evolution(15), None);
        assert_eq!(chips_to_next_evolution(40), None);
    }
}
