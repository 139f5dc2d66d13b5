// Converts a scoring response into a history record and stores it
use crate::data::history_store::HistoryStore;
use crate::error::{EngineResult, RequestError};
use shared::models::{FraudRequest, FraudResponse, HistoryItem, NewHistoryItem};

pub fn history_item_from_response(
    request: &FraudRequest,
    response: &FraudResponse,
    transaction_time: Option<String>,
    checked_at: i64,
) -> Result<NewHistoryItem, RequestError> {
    if !response.success {
        let reason = response
            .error
            .clone()
            .unwrap_or_else(|| "no reason given".to_string());
        return Err(RequestError::Rejected(reason));
    }
    let prediction = response
        .prediction
        .as_ref()
        .ok_or(RequestError::MissingPrediction)?;

    Ok(NewHistoryItem {
        checked_at,
        amount: request.amt,
        is_fraud: prediction.is_fraud,
        fraud_probability: prediction.fraud_probability,
        category: Some(request.category.clone()),
        gender: Some(request.gender.clone()),
        transaction_time,
        transaction_day: Some(request.transaction_day),
        city: Some(request.city.clone()),
        age: Some(request.age),
        risk_level: Some(prediction.risk_level.to_string()),
    })
}

pub fn handle_record_result(
    request: &FraudRequest,
    response: &FraudResponse,
    transaction_time: Option<String>,
    checked_at: i64,
    store: &HistoryStore,
) -> EngineResult<HistoryItem> {
    let item = history_item_from_response(request, response, transaction_time, checked_at)?;
    let id = store.insert(&item)?;
    Ok(item.with_id(id))
}
