//! In-memory LadderRepository implementation.

use std::collections::BTreeMap;
use std::sync::RwLock;

use battle_core::{LadderEntry, RankedSeason, RewardClaim, UserId};

use crate::repository::{LadderRepository, RepositoryError, Result};

#[derive(Debug, Default)]
struct LadderData {
    entries: BTreeMap<UserId, LadderEntry>,
    seasons: BTreeMap<u32, RankedSeason>,
    claims: Vec<RewardClaim>,
}

impl LadderData {
    fn add_claims(&mut self, claims: &[RewardClaim]) {
        for claim in claims {
            let held = self
                .claims
                .iter()
                .any(|c| c.season_id == claim.season_id && c.user_id == claim.user_id);
            if !held {
                self.claims.push(claim.clone());
            }
        }
    }
}

/// Ladder standings, seasons and claims held in one lock.
#[derive(Debug, Default)]
pub struct InMemoryLadderRepo {
    data: RwLock<LadderData>,
}

impl InMemoryLadderRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LadderRepository for InMemoryLadderRepo {
    fn entry(&self, user: UserId) -> Result<LadderEntry> {
        let data = self.data.read().map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(data
            .entries
            .get(&user)
            .copied()
            .unwrap_or_else(|| LadderEntry::new(user)))
    }

    fn entries(&self) -> Result<Vec<LadderEntry>> {
        let data = self.data.read().map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(data.entries.values().copied().collect())
    }

    fn save_entries(&self, entries: &[LadderEntry]) -> Result<()> {
        let mut data = self
            .data
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        for entry in entries {
            data.entries.insert(entry.user_id, *entry);
        }
        Ok(())
    }

    fn active_season(&self) -> Result<Option<RankedSeason>> {
        let data = self.data.read().map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(data.seasons.values().find(|season| !season.ended).cloned())
    }

    fn save_season(&self, season: &RankedSeason) -> Result<()> {
        let mut data = self
            .data
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        data.seasons.insert(season.id, season.clone());
        Ok(())
    }

    fn insert_claims(&self, claims: &[RewardClaim]) -> Result<()> {
        let mut data = self
            .data
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        data.add_claims(claims);
        Ok(())
    }

    fn close_season(
        &self,
        season: &RankedSeason,
        entries: &[LadderEntry],
        claims: &[RewardClaim],
    ) -> Result<()> {
        let mut data = self
            .data
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        data.add_claims(claims);
        for entry in entries {
            data.entries.insert(entry.user_id, *entry);
        }
        data.seasons.insert(season.id, season.clone());
        Ok(())
    }

    fn claims_for(&self, user: UserId) -> Result<Vec<RewardClaim>> {
        let data = self.data.read().map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(data
            .claims
            .iter()
            .filter(|claim| claim.user_id == user)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim(user: u32, season: u32) -> RewardClaim {
        RewardClaim {
            user_id: UserId(user),
            season_id: season,
            division: "Adept".into(),
            claimed: false,
        }
    }

    #[test]
    fn claims_are_kept_once_per_season() {
        let repo = InMemoryLadderRepo::new();
        repo.insert_claims(&[claim(1, 3), claim(2, 3)]).unwrap();
        repo.insert_claims(&[claim(1, 3), claim(1, 4)]).unwrap();

        let seasons: Vec<u32> = repo
            .claims_for(UserId(1))
            .unwrap()
            .iter()
            .map(|c| c.season_id)
            .collect();
        assert_eq!(seasons, vec![3, 4]);
        assert_eq!(repo.claims_for(UserId(2)).unwrap().len(), 1);
    }

    #[test]
    fn closing_writes_season_entries_and_claims_together() {
        let repo = InMemoryLadderRepo::new();
        let mut season = RankedSeason::new(3, "Spring", 0, 100);
        repo.save_season(&season).unwrap();
        repo.save_entries(&[LadderEntry::new(UserId(1)).with_lp(200)])
            .unwrap();

        season.ended = true;
        repo.close_season(&season, &[LadderEntry::new(UserId(1))], &[claim(1, 3)])
            .unwrap();
        assert!(repo.active_season().unwrap().is_none());
        assert_eq!(repo.entry(UserId(1)).unwrap().lp, 0);
        assert_eq!(repo.claims_for(UserId(1)).unwrap().len(), 1);
    }
}
