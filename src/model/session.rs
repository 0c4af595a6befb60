use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::model::connection::{ConnectionSettings, QueryParams};
use crate::model::ledger::LedgerRecord;

/// Per-user application state threaded through every render pass.
///
/// Only two actions change it: saving the connection settings and running a
/// query. The dataset is an immutable snapshot that is swapped, never edited.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    /// Address and user prefilled in the connection form.
    pub server_hint: String,
    pub user_hint: String,
    pub connection: Option<ConnectionSettings>,
    /// Bumped by every save; a query started under an older revision is stale.
    pub connection_revision: u64,
    pub last_query: Option<QueryParams>,
    pub default_year: i32,
    pub dataset: Arc<[LedgerRecord]>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(server_hint: String, user_hint: String, default_year: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            server_hint,
            user_hint,
            connection: None,
            connection_revision: 0,
            last_query: None,
            default_year,
            dataset: Arc::from(Vec::new()),
            last_error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// "Save configuration": store validated settings and drop data fetched
    /// through the previous connection.
    pub fn save_connection(&mut self, settings: ConnectionSettings) {
        self.server_hint = settings.server_base().to_string();
        self.user_hint = settings.username().to_string();
        self.connection = Some(settings);
        self.connection_revision += 1;
        self.last_query = None;
        self.dataset = Arc::from(Vec::new());
        self.last_error = None;
        self.updated_at = Utc::now();
    }

    /// "Run query": replace the dataset wholesale with the outcome of one query.
    pub fn replace_dataset(
        &mut self,
        params: QueryParams,
        records: Vec<LedgerRecord>,
        error: Option<String>,
    ) {
        self.last_query = Some(params);
        self.dataset = Arc::from(records);
        self.last_error = error;
        self.updated_at = Utc::now();
    }
}
