// Turns an OCR transaction guess into a fraud-scoring request
use super::helpers::{non_empty, normalize_gender, transaction_hour_from_time};
use crate::data::province_lookup::{fold_diacritics, ReferenceLookup};
use crate::error::RequestError;
use shared::models::{FraudRequest, TransactionGuess};
use shared::utils::amount_format::parse_optional_amount;

const MIN_AGE: u32 = 18;
const MAX_AGE: u32 = 100;

pub fn handle_build_request(
    guess: &TransactionGuess,
    lookup: &ReferenceLookup,
    default_hour: u8,
) -> Result<FraudRequest, RequestError> {
    let amt = parse_optional_amount(guess.amount.as_deref())
        .filter(|a| *a > 0.0)
        .ok_or_else(|| RequestError::InvalidAmount(guess.amount.clone()))?;

    let (city, city_pop) = guess
        .city
        .as_deref()
        .map(|c| fold_diacritics(c).trim().to_lowercase())
        .and_then(|c| lookup.population_of(&c).map(|pop| (c, pop)))
        .ok_or_else(|| RequestError::InvalidCity(guess.city.clone()))?;

    let gender = guess
        .gender
        .as_deref()
        .and_then(normalize_gender)
        .ok_or_else(|| RequestError::InvalidGender(guess.gender.clone()))?;

    let category = non_empty(guess.category.as_deref()).ok_or(RequestError::MissingCategory)?;

    let transaction_hour = match guess.time.as_deref().and_then(transaction_hour_from_time) {
        Some(hour) => hour,
        None => {
            tracing::warn!(
                time = ?guess.time,
                default_hour,
                "Unreadable transaction time, using default hour"
            );
            default_hour
        }
    };

    let transaction_day = guess
        .day_of_week
        .filter(|d| *d <= 6)
        .ok_or(RequestError::InvalidDay(guess.day_of_week))?;

    let age = guess
        .age
        .filter(|a| (MIN_AGE..=MAX_AGE).contains(a))
        .ok_or(RequestError::InvalidAge(guess.age))?;

    Ok(FraudRequest {
        amt,
        gender: gender.to_string(),
        category,
        transaction_hour,
        transaction_day,
        age,
        city,
        city_pop,
    })
}
