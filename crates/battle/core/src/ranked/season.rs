//! Season lifecycle: closing a season and the daily LP decay.

use tracing::info;

use super::{LadderEntry, RankedConfig, classify, top_players_lp};
use crate::state::{ItemId, UserId};

/// Reward granted for finishing a season in a division.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DivisionReward {
    pub division: String,
    pub ryo: u64,
    pub items: Vec<ItemId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankedSeason {
    pub id: u32,
    pub name: String,
    /// Unix timestamps, seconds.
    pub starts_at: i64,
    pub ends_at: i64,
    pub ended: bool,
    pub rewards: Vec<DivisionReward>,
}

impl RankedSeason {
    pub fn new(id: u32, name: impl Into<String>, starts_at: i64, ends_at: i64) -> Self {
        Self {
            id,
            name: name.into(),
            starts_at,
            ends_at,
            ended: false,
            rewards: Vec::new(),
        }
    }

    pub fn with_reward(mut self, reward: DivisionReward) -> Self {
        self.rewards.push(reward);
        self
    }

    /// Still open but past its end date.
    pub fn is_due(&self, now: i64) -> bool {
        !self.ended && self.ends_at < now
    }

    pub fn reward_for(&self, division: &str) -> Option<&DivisionReward> {
        self.rewards.iter().find(|reward| reward.division == division)
    }
}

/// Unclaimed reward created when a season closes.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RewardClaim {
    pub user_id: UserId,
    pub season_id: u32,
    /// Name of the final division, top tier included.
    pub division: String,
    pub claimed: bool,
}

/// Ends `season`: every player with LP is classified into a reward claim,
/// then all LP is reset to zero.
pub fn close_season(
    config: &RankedConfig,
    season: &mut RankedSeason,
    entries: &mut [LadderEntry],
) -> Vec<RewardClaim> {
    let top = top_players_lp(entries, config.top_tier_size);
    let claims: Vec<RewardClaim> = entries
        .iter()
        .filter(|entry| entry.lp > 0)
        .map(|entry| RewardClaim {
            user_id: entry.user_id,
            season_id: season.id,
            division: classify(config, entry.lp, &top).name(config).to_owned(),
            claimed: false,
        })
        .collect();

    for entry in entries.iter_mut() {
        entry.lp = 0;
    }
    season.ended = true;
    info!(
        season = season.id,
        claims = claims.len(),
        "ranked season closed"
    );
    claims
}

/// Scales every positive LP by the configured daily factor.
pub fn daily_decay(config: &RankedConfig, entries: &mut [LadderEntry]) {
    for entry in entries.iter_mut().filter(|entry| entry.lp > 0) {
        entry.lp = (f64::from(entry.lp) * config.daily_decay).round() as i32;
    }
}
