pub mod fraud_check;

pub use fraud_check::FraudCheckService;
