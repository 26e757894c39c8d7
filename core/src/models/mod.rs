use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One timestamped price reading for a symbol.
///
/// Immutable once constructed; this is also the wire format carried by the
/// Kafka transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdate {
    pub symbol: String,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
}

impl PriceUpdate {
    pub fn new(symbol: impl Into<String>, price: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            timestamp,
        }
    }
}

/// Abnormal price movement: the percentage change between an update and a
/// reference observation roughly one second older exceeded the configured
/// threshold.
///
/// Alerts are transient; they are handed to the alert sink and dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct SpikeAlert {
    pub symbol: String,
    pub reference_price: f64,
    pub current_price: f64,
    /// Absolute percentage change against the reference price.
    pub percent_change: f64,
    /// Timestamp of the update that triggered the alert.
    pub timestamp: DateTime<Utc>,
}
