// Local data: the province reference table and the fraud-check history.
pub mod history_store;
pub mod province_lookup;

pub use history_store::HistoryStore;
pub use province_lookup::ReferenceLookup;
