use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use super::{Repository, StoreError, StoreResult};
use crate::models::{Account, EnrolledEntry, Poll, Progress, Roadmap, Section, Upcoming, VoteCount};

#[derive(Default)]
struct Tables {
    accounts: Vec<Account>,
    roadmaps: Vec<Roadmap>,
    sections: HashMap<Uuid, Section>,
    upcoming: Vec<Upcoming>,
    polls: Vec<Poll>,
    enrolled: Vec<EnrolledEntry>,
}

/// MemoryRepository
///
/// In-process `Repository` used by tests and local demos. Each method runs under a
/// single mutex, which gives every operation the same atomicity and uniqueness
/// guarantees the Postgres schema provides. The guard is never held across `.await`.
#[derive(Default)]
pub struct MemoryRepository {
    tables: Mutex<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn get_account(&self, id: Uuid) -> StoreResult<Option<Account>> {
        Ok(self.tables()?.accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn get_account_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        Ok(self
            .tables()?
            .accounts
            .iter()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn list_accounts(&self) -> StoreResult<Vec<Account>> {
        Ok(self.tables()?.accounts.clone())
    }

    async fn create_account(&self, account: Account) -> StoreResult<Account> {
        let mut tables = self.tables()?;
        if tables.accounts.iter().any(|a| a.username == account.username) {
            return Err(StoreError::Conflict("uq_accounts_username".to_string()));
        }
        tables.accounts.push(account.clone());
        Ok(account)
    }

    async fn add_progress(&self, account_id: Uuid, roadmap_id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables()?;
        let account = tables
            .accounts
            .iter_mut()
            .find(|a| a.id == account_id)
            .ok_or(StoreError::NotFound)?;
        if account.progress_for(roadmap_id).is_some() {
            return Err(StoreError::Conflict("uq_progress_account_roadmap".to_string()));
        }
        account.progress.push(Progress {
            roadmap_id,
            completed_sections: vec![],
        });
        Ok(())
    }

    async fn complete_section(
        &self,
        account_id: Uuid,
        roadmap_id: Uuid,
        section_id: Uuid,
        reward: i32,
    ) -> StoreResult<()> {
        let mut tables = self.tables()?;
        let account = tables
            .accounts
            .iter_mut()
            .find(|a| a.id == account_id)
            .ok_or(StoreError::NotFound)?;
        let progress = account
            .progress
            .iter_mut()
            .find(|p| p.roadmap_id == roadmap_id)
            .ok_or(StoreError::NotFound)?;
        if progress.completed_sections.contains(&section_id) {
            return Err(StoreError::Conflict("uq_completed_sections".to_string()));
        }
        // Same outcome as the integer overflow Postgres reports: nothing is written.
        let points = account
            .points
            .checked_add(reward)
            .ok_or_else(|| StoreError::Backend("points overflow".to_string()))?;
        progress.completed_sections.push(section_id);
        account.points = points;
        Ok(())
    }

    async fn create_roadmap(&self, roadmap: Roadmap, sections: Vec<Section>) -> StoreResult<Roadmap> {
        let mut tables = self.tables()?;
        if sections.iter().any(|s| tables.sections.contains_key(&s.id))
            || tables.roadmaps.iter().any(|r| r.id == roadmap.id)
        {
            return Err(StoreError::Conflict("primary key".to_string()));
        }
        for section in sections {
            tables.sections.insert(section.id, section);
        }
        tables.roadmaps.push(roadmap.clone());
        Ok(roadmap)
    }

    async fn get_roadmap(&self, id: Uuid) -> StoreResult<Option<Roadmap>> {
        Ok(self.tables()?.roadmaps.iter().find(|r| r.id == id).cloned())
    }

    async fn list_roadmaps(&self, include_drafts: bool) -> StoreResult<Vec<Roadmap>> {
        Ok(self
            .tables()?
            .roadmaps
            .iter()
            .filter(|r| include_drafts || !r.draft)
            .cloned()
            .collect())
    }

    async fn publish_roadmap(&self, id: Uuid) -> StoreResult<Option<Roadmap>> {
        let mut tables = self.tables()?;
        match tables.roadmaps.iter_mut().find(|r| r.id == id && r.draft) {
            Some(roadmap) => {
                roadmap.draft = false;
                Ok(Some(roadmap.clone()))
            }
            None => Ok(None),
        }
    }

    async fn get_sections(&self, ids: &[Uuid]) -> StoreResult<Vec<Section>> {
        let tables = self.tables()?;
        Ok(ids
            .iter()
            .filter_map(|id| tables.sections.get(id).cloned())
            .collect())
    }

    async fn create_upcoming(&self, upcoming: Upcoming) -> StoreResult<Upcoming> {
        self.tables()?.upcoming.push(upcoming.clone());
        Ok(upcoming)
    }

    async fn list_upcoming(&self) -> StoreResult<Vec<Upcoming>> {
        Ok(self.tables()?.upcoming.clone())
    }

    async fn get_upcoming_many(&self, ids: &[Uuid]) -> StoreResult<Vec<Upcoming>> {
        let tables = self.tables()?;
        Ok(ids
            .iter()
            .filter_map(|id| tables.upcoming.iter().find(|u| u.id == *id).cloned())
            .collect())
    }

    async fn create_poll(&self, poll: Poll) -> StoreResult<Poll> {
        self.tables()?.polls.push(poll.clone());
        Ok(poll)
    }

    async fn get_poll(&self, id: Uuid) -> StoreResult<Option<Poll>> {
        Ok(self.tables()?.polls.iter().find(|p| p.id == id).cloned())
    }

    async fn list_polls(&self) -> StoreResult<Vec<Poll>> {
        Ok(self.tables()?.polls.clone())
    }

    async fn increment_vote(&self, poll_id: Uuid, option_id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables()?;
        let Some(poll) = tables.polls.iter_mut().find(|p| p.id == poll_id) else {
            return Ok(false);
        };
        match poll.votes.iter_mut().find(|v| v.option_id == option_id) {
            Some(entry) => entry.count += 1,
            None => poll.votes.push(VoteCount {
                option_id,
                count: 1,
            }),
        }
        Ok(true)
    }

    async fn add_enrolled(&self, entry: EnrolledEntry) -> StoreResult<EnrolledEntry> {
        let mut tables = self.tables()?;
        if tables.enrolled.iter().any(|e| e.name == entry.name) {
            return Err(StoreError::Conflict("uq_enrolled_name".to_string()));
        }
        tables.enrolled.push(entry.clone());
        Ok(entry)
    }

    async fn get_enrolled(&self, name: &str) -> StoreResult<Option<EnrolledEntry>> {
        Ok(self
            .tables()?
            .enrolled
            .iter()
            .find(|e| e.name == name)
            .cloned())
    }

    async fn list_enrolled(&self) -> StoreResult<Vec<EnrolledEntry>> {
        Ok(self.tables()?.enrolled.clone())
    }
}
