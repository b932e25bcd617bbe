/// Battle configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleConfig {
    /// Battlefield size used when a battle is created without an explicit grid.
    pub default_cols: i32,
    pub default_rows: i32,

    /// Flat reduction applied to every point of armor when damage lands.
    pub armor_reduction: f64,
}

impl BattleConfig {
    // ===== compile-time constants used as type parameters =====
    pub const MAX_STAT_FILTERS: usize = 4;
    pub const MAX_GENERAL_FILTERS: usize = 4;
    pub const MAX_ELEMENT_FILTERS: usize = 4;

    // ===== damage formula =====
    pub const DMG_BASE: f64 = 20.0;
    pub const DMG_SCALING: f64 = 0.2;
    pub const POWER_SCALING: f64 = 0.05;
    pub const ATK_SCALING: f64 = 0.5;
    pub const DEF_SCALING: f64 = 0.5;
    pub const EXP_SCALING: f64 = 0.5;
    pub const GEN_SCALING: f64 = 0.5;

    // ===== basic actions =====
    pub const BASIC_ATTACK_POWER: f64 = 1.0;
    pub const BASIC_ATTACK_STAMINA_PCT: f64 = 10.0;
    pub const BASIC_HEAL_POWER: f64 = 5.0;
    pub const BASIC_HEAL_CHAKRA_PCT: f64 = 1.0;
    pub const BASIC_POWER_PER_LEVEL: f64 = 0.1;
    pub const FLEE_CHANCE: f64 = 20.0;
    pub const FLEE_HEALTH_PCT: f64 = 0.1;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_COLS: i32 = 13;
    pub const DEFAULT_ROWS: i32 = 5;
    pub const DEFAULT_ARMOR_REDUCTION: f64 = 1.0;

    pub fn new() -> Self {
        Self {
            default_cols: Self::DEFAULT_COLS,
            default_rows: Self::DEFAULT_ROWS,
            armor_reduction: Self::DEFAULT_ARMOR_REDUCTION,
        }
    }

    pub fn with_armor_reduction(armor_reduction: f64) -> Self {
        Self {
            armor_reduction,
            ..Self::new()
        }
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
