//! Domain types for the Donate Bot API.
//!
//! # Design
//! Donation and subscription records are passed through untouched; the
//! client never interprets their fields. The request-side types
//! (`DonationFilter`, `MarkRequest`) can be built either as typed values or
//! from a dynamic `serde_json::Value`, in which case unrecognized or
//! mistyped entries are dropped or defaulted rather than rejected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, OPTIONS_REQUIRED, TXN_ID_REQUIRED};

/// Status a donation can be filtered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DonationStatus {
    Reversed,
    Refunded,
    Completed,
}

impl DonationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DonationStatus::Reversed => "Reversed",
            DonationStatus::Refunded => "Refunded",
            DonationStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DonationStatus {
    type Err = ();

    /// Exact, case-sensitive match on the status name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Reversed" => Ok(DonationStatus::Reversed),
            "Refunded" => Ok(DonationStatus::Refunded),
            "Completed" => Ok(DonationStatus::Completed),
            _ => Err(()),
        }
    }
}

/// Status filter for `list_new_donations`.
///
/// Order and duplicates are kept exactly as given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DonationFilter {
    pub find: Vec<DonationStatus>,
}

impl DonationFilter {
    pub fn new(find: impl IntoIterator<Item = DonationStatus>) -> Self {
        Self {
            find: find.into_iter().collect(),
        }
    }

    /// Keep only the recognized status names, silently dropping the rest.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            find: names
                .into_iter()
                .filter_map(|name| name.as_ref().parse().ok())
                .collect(),
        }
    }

    /// Build a filter from a dynamic `{"find": [...]}` value.
    ///
    /// A non-object value, or a `find` that is absent or not an array, gives
    /// an empty filter. Non-string array entries are dropped.
    pub fn from_value(value: &Value) -> Self {
        match value.get("find").and_then(Value::as_array) {
            Some(items) => Self::from_names(items.iter().filter_map(Value::as_str)),
            None => Self::default(),
        }
    }

    /// The comma-separated `find` query parameter.
    pub fn find_param(&self) -> String {
        self.find
            .iter()
            .map(|status| status.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Options for `mark_donation`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkRequest {
    #[serde(rename = "txnID")]
    pub txn_id: String,
    #[serde(rename = "isEndedSubscription", default, skip_serializing_if = "Option::is_none")]
    pub is_ended_subscription: Option<bool>,
    #[serde(rename = "markProcessed", default, skip_serializing_if = "Option::is_none")]
    pub mark_processed: Option<bool>,
}

impl MarkRequest {
    pub fn new(txn_id: impl Into<String>) -> Self {
        Self {
            txn_id: txn_id.into(),
            ..Self::default()
        }
    }

    pub fn ended_subscription(mut self, is_ended_subscription: bool) -> Self {
        self.is_ended_subscription = Some(is_ended_subscription);
        self
    }

    pub fn processed(mut self, mark_processed: bool) -> Self {
        self.mark_processed = Some(mark_processed);
        self
    }

    /// Read mark options from a dynamic value.
    ///
    /// The value must be an object with a non-empty string `txnID`. Boolean
    /// fields that are present but not booleans are treated as absent.
    pub fn from_value(value: &Value) -> Result<Self, ApiError> {
        let Some(options) = value.as_object() else {
            return Err(ApiError::Usage(OPTIONS_REQUIRED.to_string()));
        };
        let txn_id = match options.get("txnID").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => return Err(ApiError::Usage(TXN_ID_REQUIRED.to_string())),
        };
        Ok(Self {
            txn_id,
            is_ended_subscription: options.get("isEndedSubscription").and_then(Value::as_bool),
            mark_processed: options.get("markProcessed").and_then(Value::as_bool),
        })
    }

    /// Resolve defaults into the body sent to the service.
    pub fn body(&self) -> MarkBody {
        MarkBody {
            is_ended_subscription: self.is_ended_subscription.unwrap_or(false),
            mark_processed: self.mark_processed.unwrap_or(true),
        }
    }
}

/// JSON body of the mark endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkBody {
    pub is_ended_subscription: bool,
    pub mark_processed: bool,
}

/// A donation record as returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Donation(pub Value);

/// An ended subscription record as returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndedSubscription(pub Value);

impl Donation {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl EndedSubscription {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn into_inner(self) -> Value {
        self.0
    }
}
