use std::time::Duration;

use moka::future::Cache;
use moka::ops::compute::Op;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::model::session::Session;

/// In-memory sessions keyed by id; entries expire after a period of idleness.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Cache<Uuid, Session>,
}

impl SessionStore {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        let sessions = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_idle(ttl)
            .build();
        Self { sessions }
    }

    pub async fn insert(&self, session: Session) {
        self.sessions.insert(session.id, session).await;
    }

    pub async fn get(&self, id: &Uuid) -> AppResult<Session> {
        self.sessions
            .get(id)
            .await
            .ok_or_else(|| AppError::SessionNotFound(id.to_string()))
    }

    /// Runs `update` on the stored session and writes the result back.
    ///
    /// Updates of the same id are serialized, so a concurrent writer can never
    /// overwrite this one with a stale copy. When `update` fails nothing is
    /// written.
    pub async fn update<T>(
        &self,
        id: &Uuid,
        update: impl FnOnce(&mut Session) -> AppResult<T>,
    ) -> AppResult<T> {
        let mut outcome = None;
        self.sessions
            .entry(*id)
            .and_compute_with(|entry| {
                let op = match entry {
                    Some(entry) => {
                        let mut session = entry.into_value();
                        match update(&mut session) {
                            Ok(value) => {
                                outcome = Some(Ok(value));
                                Op::Put(session)
                            }
                            Err(e) => {
                                outcome = Some(Err(e));
                                Op::Nop
                            }
                        }
                    }
                    None => Op::Nop,
                };
                std::future::ready(op)
            })
            .await;
        outcome.unwrap_or_else(|| Err(AppError::SessionNotFound(id.to_string())))
    }

    pub async fn remove(&self, id: &Uuid) -> AppResult<()> {
        self.sessions
            .remove(id)
            .await
            .map(|_| ())
            .ok_or_else(|| AppError::SessionNotFound(id.to_string()))
    }
}
