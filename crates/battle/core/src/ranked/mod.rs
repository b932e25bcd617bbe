//! Ranked ladder rating.
//!
//! Pure functions over [`RankedConfig`] and [`LadderEntry`] values: the Elo
//! style LP delta of a finished match, division placement, season close and
//! the daily decay. Hosts own persistence and scheduling.
mod season;

pub use season::{DivisionReward, RankedSeason, RewardClaim, close_season, daily_decay};

use crate::error::{BattleError, ErrorSeverity};
use crate::state::UserId;

/// LP bracket with its own K-factor.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Division {
    pub name: String,
    /// Lowest LP that places a player in this division.
    pub min_lp: i32,
    pub k_factor: f64,
}

impl Division {
    pub fn new(name: impl Into<String>, min_lp: i32, k_factor: f64) -> Self {
        Self {
            name: name.into(),
            min_lp,
            k_factor,
        }
    }
}

/// Ladder tunables. Divisions are ordered by ascending `min_lp`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RankedConfig {
    pub divisions: Vec<Division>,
    /// Special tier above every division, reserved for the top players.
    pub top_tier_name: String,
    pub top_tier_size: usize,
    /// Extra LP per division the beaten opponent stands above the winner.
    pub win_bonus_per_division: f64,
    pub win_bonus_cap: f64,
    /// Multiplier applied to losses against much lower ranked opponents.
    pub protection_factor: f64,
    /// Division gap from which loss protection applies.
    pub protection_gap: usize,
    pub streak_bonus: f64,
    /// Streak levels beyond this earn no further bonus.
    pub max_streak: u32,
    /// Factor applied to every positive LP by the daily tick.
    pub daily_decay: f64,
    pub min_lp: i32,
}

impl RankedConfig {
    pub const DEFAULT_TOP_TIER_SIZE: usize = 20;
    pub const DEFAULT_DAILY_DECAY: f64 = 0.95;

    /// K-factor of the highest division `lp` qualifies for.
    pub fn k_factor(&self, lp: i32) -> f64 {
        self.divisions
            .iter()
            .rev()
            .find(|division| lp >= division.min_lp)
            .or_else(|| self.divisions.first())
            .map_or(32.0, |division| division.k_factor)
    }

    /// Checks the invariants the rating functions rely on.
    pub fn validate(&self) -> Result<(), RankedConfigError> {
        if self.divisions.is_empty() {
            return Err(RankedConfigError::NoDivisions);
        }
        if let Some(pair) = self
            .divisions
            .windows(2)
            .find(|pair| pair[0].min_lp >= pair[1].min_lp)
        {
            return Err(RankedConfigError::UnorderedDivisions {
                lower: pair[0].name.clone(),
                upper: pair[1].name.clone(),
            });
        }
        if let Some(division) = self
            .divisions
            .iter()
            .find(|division| !(division.k_factor.is_finite() && division.k_factor > 0.0))
        {
            return Err(RankedConfigError::InvalidKFactor {
                division: division.name.clone(),
            });
        }
        if !(0.0..=1.0).contains(&self.protection_factor) {
            return Err(RankedConfigError::OutOfRange {
                field: "protection_factor",
            });
        }
        if !(0.0..=1.0).contains(&self.daily_decay) {
            return Err(RankedConfigError::OutOfRange {
                field: "daily_decay",
            });
        }
        Ok(())
    }
}

impl Default for RankedConfig {
    fn default() -> Self {
        Self {
            divisions: vec![
                Division::new("Wood", 0, 40.0),
                Division::new("Adept", 150, 32.0),
                Division::new("Master", 300, 24.0),
                Division::new("Legend", 600, 16.0),
            ],
            top_tier_name: "Sannin".to_owned(),
            top_tier_size: Self::DEFAULT_TOP_TIER_SIZE,
            win_bonus_per_division: 10.0,
            win_bonus_cap: 30.0,
            protection_factor: 0.5,
            protection_gap: 2,
            streak_bonus: 10.0,
            max_streak: 5,
            daily_decay: Self::DEFAULT_DAILY_DECAY,
            min_lp: 0,
        }
    }
}

/// Invalid ladder configuration.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RankedConfigError {
    #[error("ranked config defines no divisions")]
    NoDivisions,

    #[error("division {upper} must start above {lower}")]
    UnorderedDivisions { lower: String, upper: String },

    #[error("division {division} has a non-positive K-factor")]
    InvalidKFactor { division: String },

    #[error("{field} must lie in [0, 1]")]
    OutOfRange { field: &'static str },
}

impl BattleError for RankedConfigError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NoDivisions => "RANKED_NO_DIVISIONS",
            Self::UnorderedDivisions { .. } => "RANKED_UNORDERED_DIVISIONS",
            Self::InvalidKFactor { .. } => "RANKED_INVALID_K_FACTOR",
            Self::OutOfRange { .. } => "RANKED_OUT_OF_RANGE",
        }
    }
}

/// Where an LP value places a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Placement {
    /// Index into [`RankedConfig::divisions`].
    Division(usize),
    TopTier,
}

impl Placement {
    /// Position on the full ladder, top tier included.
    pub fn rank_index(self, config: &RankedConfig) -> usize {
        match self {
            Self::Division(index) => index,
            Self::TopTier => config.divisions.len(),
        }
    }

    pub fn name(self, config: &RankedConfig) -> &str {
        match self {
            Self::Division(index) => config
                .divisions
                .get(index)
                .map_or("", |division| division.name.as_str()),
            Self::TopTier => &config.top_tier_name,
        }
    }
}

/// Places `lp` on the ladder.
///
/// The top tier needs a full leaderboard: at least `top_tier_size` known top
/// LPs, and `lp` no lower than the smallest of them.
pub fn classify(config: &RankedConfig, lp: i32, top_players_lp: &[i32]) -> Placement {
    if top_players_lp.len() >= config.top_tier_size
        && top_players_lp.iter().min().is_some_and(|min| lp >= *min)
    {
        return Placement::TopTier;
    }
    let index = config
        .divisions
        .iter()
        .rposition(|division| lp >= division.min_lp)
        .unwrap_or(0);
    Placement::Division(index)
}

/// Ladder standing of one player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LadderEntry {
    pub user_id: UserId,
    pub lp: i32,
    /// Consecutive wins before the match being settled.
    pub streak: u32,
}

impl LadderEntry {
    pub const fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            lp: 0,
            streak: 0,
        }
    }

    pub const fn with_lp(mut self, lp: i32) -> Self {
        self.lp = lp;
        self
    }

    pub const fn with_streak(mut self, streak: u32) -> Self {
        self.streak = streak;
        self
    }
}

/// LP change for `player` after a match against `opponent`.
///
/// * K-factor from the player's current division
/// * expected score `1 / (1 + 10^((opp - me) / 400))`
/// * wins over higher ranked opponents earn a capped bonus per division gap
/// * losses to opponents `protection_gap` or more divisions below are scaled
///   by `protection_factor`
/// * wins add `min(streak, max_streak) * streak_bonus`
pub fn lp_delta(
    config: &RankedConfig,
    player: &LadderEntry,
    opponent: &LadderEntry,
    did_win: bool,
    top_players_lp: &[i32],
) -> i32 {
    let k = config.k_factor(player.lp);
    let expected = 1.0 / (1.0 + 10f64.powf(f64::from(opponent.lp - player.lp) / 400.0));
    let actual = if did_win { 1.0 } else { 0.0 };
    let mut delta = k * (actual - expected);

    let mine = classify(config, player.lp, top_players_lp).rank_index(config);
    let theirs = classify(config, opponent.lp, top_players_lp).rank_index(config);

    if did_win {
        if theirs > mine {
            let gap = (theirs - mine) as f64;
            delta += (gap * config.win_bonus_per_division).min(config.win_bonus_cap);
        }
        let streak = player.streak.min(config.max_streak);
        delta += f64::from(streak) * config.streak_bonus;
    } else if mine >= theirs + config.protection_gap {
        delta *= config.protection_factor;
    }

    delta.round() as i32
}

/// Applies a finished match to both ladder entries.
///
/// Both deltas are computed from the pre-match standings. LP never drops
/// below `min_lp`; the winner's streak grows and the loser's resets.
pub fn settle_match(
    config: &RankedConfig,
    winner: &LadderEntry,
    loser: &LadderEntry,
    top_players_lp: &[i32],
) -> (LadderEntry, LadderEntry) {
    let gain = lp_delta(config, winner, loser, true, top_players_lp);
    let loss = lp_delta(config, loser, winner, false, top_players_lp);

    let won = LadderEntry {
        lp: (winner.lp + gain).max(config.min_lp),
        streak: winner.streak.saturating_add(1),
        ..*winner
    };
    let lost = LadderEntry {
        lp: (loser.lp + loss).max(config.min_lp),
        streak: 0,
        ..*loser
    };
    (won, lost)
}

/// LPs of the best `n` entries, highest first.
pub fn top_players_lp(entries: &[LadderEntry], n: usize) -> Vec<i32> {
    let mut lps: Vec<i32> = entries.iter().map(|entry| entry.lp).collect();
    lps.sort_unstable_by(|a, b| b.cmp(a));
    lps.truncate(n);
    lps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u32, lp: i32) -> LadderEntry {
        LadderEntry::new(UserId(id)).with_lp(lp)
    }

    #[test]
    fn fresh_players_trade_symmetric_deltas() {
        let config = RankedConfig::default();
        let a = entry(1, 0);
        let b = entry(2, 0);
        let win = lp_delta(&config, &a, &b, true, &[]);
        let loss = lp_delta(&config, &b, &a, false, &[]);
        assert_eq!(win, 20);
        assert_eq!(loss, -20);
        assert_eq!(win, -loss);
    }

    #[test]
    fn low_tiers_swing_harder_than_high_tiers() {
        let config = RankedConfig::default();
        let low = lp_delta(&config, &entry(1, 0), &entry(2, 0), true, &[]);
        let high = lp_delta(&config, &entry(1, 700), &entry(2, 700), true, &[]);
        assert_eq!(low, 20);
        assert_eq!(high, 8);
        assert!(low.abs() > high.abs());
    }

    #[test]
    fn losses_to_much_lower_divisions_are_halved() {
        let config = RankedConfig::default();
        let unprotected = RankedConfig {
            protection_factor: 1.0,
            ..RankedConfig::default()
        };
        let legend = entry(1, 700);
        let wood = entry(2, 100);
        let protected = lp_delta(&config, &legend, &wood, false, &[]);
        let full = lp_delta(&unprotected, &legend, &wood, false, &[]);
        assert!(protected < 0);
        assert!(protected.abs() * 2 <= full.abs() + 1);

        // One division apart: no protection.
        let master = entry(3, 300);
        let adept = entry(4, 150);
        assert_eq!(
            lp_delta(&config, &master, &adept, false, &[]),
            lp_delta(&unprotected, &master, &adept, false, &[])
        );
    }

    #[test]
    fn beating_higher_divisions_earns_a_capped_bonus() {
        let config = RankedConfig::default();
        let wood = entry(1, 0);
        let adept = entry(2, 150);
        let legend = entry(3, 600);
        let plain = lp_delta(&config, &wood, &entry(4, 0), true, &[]);
        let one_up = lp_delta(&config, &wood, &adept, true, &[]);
        let three_up = lp_delta(&config, &wood, &legend, true, &[]);
        assert!(one_up >= plain + 10);
        // Bonus capped at 30 even though the gap is 3 divisions.
        let expected = 1.0 / (1.0 + 10f64.powf(600.0 / 400.0));
        assert_eq!(three_up, (40.0 * (1.0 - expected) + 30.0_f64).round() as i32);
    }

    #[test]
    fn streak_bonus_is_capped() {
        let config = RankedConfig::default();
        let opponent = entry(2, 0);
        let two = lp_delta(&config, &entry(1, 0).with_streak(2), &opponent, true, &[]);
        let nine = lp_delta(&config, &entry(1, 0).with_streak(9), &opponent, true, &[]);
        assert_eq!(two, 40);
        assert_eq!(nine, 70);
        let loss = lp_delta(&config, &entry(1, 0).with_streak(9), &opponent, false, &[]);
        assert_eq!(loss, -20);
    }

    #[test]
    fn classification_needs_a_full_leaderboard_for_the_top_tier() {
        let config = RankedConfig::default();
        assert_eq!(classify(&config, 0, &[]), Placement::Division(0));
        assert_eq!(classify(&config, 149, &[]), Placement::Division(0));
        assert_eq!(classify(&config, 150, &[]), Placement::Division(1));
        assert_eq!(classify(&config, 5000, &[]), Placement::Division(3));

        let board: Vec<i32> = (0..20).map(|i| 900 + i).collect();
        assert_eq!(classify(&config, 900, &board), Placement::TopTier);
        assert_eq!(classify(&config, 899, &board), Placement::Division(3));
        assert_eq!(classify(&config, 900, &board[..19]), Placement::Division(3));
        assert_eq!(Placement::TopTier.name(&config), "Sannin");
        assert_eq!(Placement::Division(2).name(&config), "Master");
    }

    #[test]
    fn settling_updates_lp_and_streaks() {
        let config = RankedConfig::default();
        let winner = entry(1, 10).with_streak(1);
        let loser = entry(2, 5).with_streak(4);
        let (won, lost) = settle_match(&config, &winner, &loser, &[]);
        assert!(won.lp > winner.lp);
        assert_eq!(won.streak, 2);
        assert_eq!(lost.lp, 0);
        assert_eq!(lost.streak, 0);
    }

    #[test]
    fn config_validation_catches_bad_tables() {
        assert_eq!(RankedConfig::default().validate(), Ok(()));
        let mut config = RankedConfig::default();
        config.divisions.swap(0, 1);
        assert!(matches!(
            config.validate(),
            Err(RankedConfigError::UnorderedDivisions { .. })
        ));
        config.divisions.clear();
        assert_eq!(config.validate(), Err(RankedConfigError::NoDivisions));
    }
}
