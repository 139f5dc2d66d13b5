// engine/src/services/fraud_check/mod.rs
// FraudCheckService ties the reference table and the history store to the
// two external collaborators' payloads. Each operation lives in its own
// sibling module.

use crate::config::settings::EngineSettings;
use crate::data::{HistoryStore, ReferenceLookup};
use crate::error::{EngineResult, RequestError};
use chrono::{DateTime, Utc};
use shared::models::{FraudRequest, FraudResponse, HistoryItem, TransactionGuess};

pub mod build_request;
pub mod helpers;
pub mod record_result;

pub struct FraudCheckService {
    lookup: ReferenceLookup,
    store: HistoryStore,
    default_transaction_hour: u8,
}

impl FraudCheckService {
    pub fn new(lookup: ReferenceLookup, store: HistoryStore, settings: &EngineSettings) -> Self {
        FraudCheckService {
            lookup,
            store,
            default_transaction_hour: settings.default_transaction_hour,
        }
    }

    /// Opens the history database named by `settings` and loads the bundled
    /// province table.
    pub fn from_settings(settings: &EngineSettings) -> EngineResult<Self> {
        let lookup = ReferenceLookup::bundled()?;
        let store = HistoryStore::open(settings.history_db_path())?;
        Ok(Self::new(lookup, store, settings))
    }

    pub fn lookup(&self) -> &ReferenceLookup {
        &self.lookup
    }

    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    pub fn build_request(&self, guess: &TransactionGuess) -> Result<FraudRequest, RequestError> {
        tracing::info!(
            amount = ?guess.amount,
            city = ?guess.city,
            ocr_confidence = ?guess.ocr_confidence,
            "Building fraud check request from transaction guess"
        );
        build_request::handle_build_request(guess, &self.lookup, self.default_transaction_hour)
    }

    /// Stores the outcome of a successful check. `checked_at` is the moment the
    /// caller considers the check complete.
    pub fn record_result(
        &self,
        request: &FraudRequest,
        response: &FraudResponse,
        transaction_time: Option<String>,
        checked_at: DateTime<Utc>,
    ) -> EngineResult<HistoryItem> {
        record_result::handle_record_result(
            request,
            response,
            transaction_time,
            checked_at.timestamp_millis(),
            &self.store,
        )
    }

    pub fn history(&self) -> EngineResult<Vec<HistoryItem>> {
        self.store.list_descending()
    }
}
