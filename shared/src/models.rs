use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One completed fraud check, as stored in the local history table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: i64,
    /// Epoch milliseconds, supplied by the caller when the check was recorded.
    pub checked_at: i64,
    /// Amount in VND.
    pub amount: f64,
    pub is_fraud: bool,
    pub fraud_probability: f64,
    pub category: Option<String>,
    pub gender: Option<String>,
    pub transaction_time: Option<String>,
    pub transaction_day: Option<u8>,
    pub city: Option<String>,
    pub age: Option<u32>,
    pub risk_level: Option<String>,
}

impl HistoryItem {
    pub fn checked_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.checked_at)
    }
}

/// A history record before the store has assigned it an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHistoryItem {
    pub checked_at: i64,
    pub amount: f64,
    pub is_fraud: bool,
    pub fraud_probability: f64,
    pub category: Option<String>,
    pub gender: Option<String>,
    pub transaction_time: Option<String>,
    pub transaction_day: Option<u8>,
    pub city: Option<String>,
    pub age: Option<u32>,
    pub risk_level: Option<String>,
}

impl NewHistoryItem {
    pub fn with_id(self, id: i64) -> HistoryItem {
        HistoryItem {
            id,
            checked_at: self.checked_at,
            amount: self.amount,
            is_fraud: self.is_fraud,
            fraud_probability: self.fraud_probability,
            category: self.category,
            gender: self.gender,
            transaction_time: self.transaction_time,
            transaction_day: self.transaction_day,
            city: self.city,
            age: self.age,
            risk_level: self.risk_level,
        }
    }
}

// OCR/AI extraction result. Every field is a guess and may be missing; the
// amount and time come back as free text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionGuess {
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Time of day, "HH:MM:SS".
    #[serde(default)]
    pub time: Option<String>,
    /// Day of week, Monday = 0.
    #[serde(default)]
    pub day_of_week: Option<u8>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub ocr_confidence: Option<f64>,
}

/// Payload for the fraud-scoring service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudRequest {
    pub amt: f64,
    pub gender: String,
    pub category: String,
    pub transaction_hour: u8,
    pub transaction_day: u8,
    pub age: u32,
    pub city: String,
    pub city_pop: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub prediction: Option<FraudPrediction>,
    /// Fields echoed or derived by the service (converted amounts and so on).
    #[serde(default)]
    pub input: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudPrediction {
    pub is_fraud: bool,
    pub fraud_probability: f64,
    #[serde(default)]
    pub confidence: Option<String>,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl RiskLevel {
    /// Bucket a fraud probability the same way the scoring service does.
    pub fn from_probability(p: f64) -> Self {
        if p < 0.1 {
            RiskLevel::VeryLow
        } else if p < 0.3 {
            RiskLevel::Low
        } else if p < 0.5 {
            RiskLevel::Medium
        } else if p < 0.7 {
            RiskLevel::High
        } else {
            RiskLevel::VeryHigh
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::VeryLow => "very_low",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::VeryHigh => "very_high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_buckets() {
        assert_eq!(RiskLevel::from_probability(0.0), RiskLevel::VeryLow);
        assert_eq!(RiskLevel::from_probability(0.1), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(0.29), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(0.3), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_probability(0.5), RiskLevel::High);
        assert_eq!(RiskLevel::from_probability(0.7), RiskLevel::VeryHigh);
        assert_eq!(RiskLevel::from_probability(1.0), RiskLevel::VeryHigh);
    }

    #[test]
    fn test_fraud_response_from_service_json() {
        let json = r#"{
            "success": true,
            "prediction": {
                "is_fraud": false,
                "fraud_probability": 0.12,
                "confidence": "high",
                "risk_level": "low"
            },
            "input": {"amt_vnd": 500000, "amt_usd": 20.83}
        }"#;
        let response: FraudResponse = serde_json::from_str(json).unwrap();
        assert!(response.success);
        assert!(response.error.is_none());
        let prediction = response.prediction.unwrap();
        assert_eq!(prediction.risk_level, RiskLevel::Low);
        assert_eq!(prediction.confidence.as_deref(), Some("high"));
        assert_eq!(response.input.unwrap()["amt_vnd"], 500000);
    }

    #[test]
    fn test_failed_response_has_no_prediction() {
        let json = r#"{"success": false, "error": "Invalid age: 7. Must be 18-100"}"#;
        let response: FraudResponse = serde_json::from_str(json).unwrap();
        assert!(!response.success);
        assert!(response.prediction.is_none());
        assert_eq!(response.error.as_deref(), Some("Invalid age: 7. Must be 18-100"));
    }

    #[test]
    fn test_fraud_request_wire_names() {
        let request = FraudRequest {
            amt: 500000.0,
            gender: "Nam".to_string(),
            category: "shopping_net".to_string(),
            transaction_hour: 13,
            transaction_day: 5,
            age: 28,
            city: "ha noi".to_string(),
            city_pop: 8054000,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["amt"], 500000.0);
        assert_eq!(value["transaction_hour"], 13);
        assert_eq!(value["city_pop"], 8054000);
    }

    #[test]
    fn test_checked_at_utc() {
        let item = NewHistoryItem {
            checked_at: 1_700_000_000_000,
            amount: 1.0,
            is_fraud: false,
            fraud_probability: 0.0,
            category: None,
            gender: None,
            transaction_time: None,
            transaction_day: None,
            city: None,
            age: None,
            risk_level: None,
        }
        .with_id(7);
        assert_eq!(item.id, 7);
        assert_eq!(item.checked_at_utc().unwrap().timestamp(), 1_700_000_000);
    }
}
