use serde::{Deserialize, Serialize};

/// Bucket key for records whose ward field is missing or null.
pub const UNKNOWN_WARD: &str = "Unknown";

/// One tax-bill payment event, deserialized verbatim from an element of the
/// upstream JSON array. Fields the portal may omit are optional; accessors
/// normalize them. Immutable once received.
///
/// Only `secretariatWard`, `totalAmount`, `consumerName` and `consumerCode`
/// take part in aggregation. The rest are carried for the Details export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollectionRecord {
    pub id: Option<i64>,
    pub receipt_number: Option<String>,
    pub receipt_date: Option<String>,
    pub city_name: Option<String>,
    pub consumer_name: Option<String>,
    pub consumer_code: Option<String>,
    pub secretariat_ward: Option<String>,
    pub total_amount: Option<f64>,
}

impl CollectionRecord {
    /// The grouping key: the ward identifier, or [`UNKNOWN_WARD`] when the
    /// field is missing or null.
    pub fn ward(&self) -> &str {
        self.secretariat_ward.as_deref().unwrap_or(UNKNOWN_WARD)
    }

    pub fn amount(&self) -> f64 {
        self.total_amount.unwrap_or(0.0)
    }

    pub fn consumer_name(&self) -> &str {
        self.consumer_name.as_deref().unwrap_or("Unknown")
    }

    pub fn consumer_code(&self) -> &str {
        self.consumer_code.as_deref().unwrap_or("Unknown")
    }

    /// The `"name (code)"` display string used in owner lists.
    pub fn owner(&self) -> String {
        format!("{} ({})", self.consumer_name().trim(), self.consumer_code())
    }
}
