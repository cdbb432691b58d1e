//! Wire-format types for bid records returned by the auction subgraph.
//!
//! The Graph serializes BigInt scalars as JSON strings, so the numeric
//! fields accept either a string or a number on the wire.

use serde::{Deserialize, Deserializer};

/// The bid statuses this exporter publishes. Anything else coming back
/// from the subgraph is logged and excluded from the aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BidStatus {
    Won,
    Active,
    Cancelled,
}

impl BidStatus {
    pub const ALL: [BidStatus; 3] = [BidStatus::Won, BidStatus::Active, BidStatus::Cancelled];

    pub fn as_str(&self) -> &'static str {
        match self {
            BidStatus::Won => "WON",
            BidStatus::Active => "ACTIVE",
            BidStatus::Cancelled => "CANCELLED",
        }
    }

    /// None for statuses outside the known set
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "WON" => Some(BidStatus::Won),
            "ACTIVE" => Some(BidStatus::Active),
            "CANCELLED" => Some(BidStatus::Cancelled),
            _ => None,
        }
    }
}

/// Validator lifecycle phases, the full ten-value set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidatorPhase {
    NotInitialized,
    StakeDeposited,
    WaitingForApproval,
    Live,
    BeingSlashed,
    Exited,
    FullyWithdrawn,
    Cancelled,
    Evicted,
    ReadyForDeposit,
}

impl ValidatorPhase {
    pub const ALL: [ValidatorPhase; 10] = [
        ValidatorPhase::NotInitialized,
        ValidatorPhase::StakeDeposited,
        ValidatorPhase::WaitingForApproval,
        ValidatorPhase::Live,
        ValidatorPhase::BeingSlashed,
        ValidatorPhase::Exited,
        ValidatorPhase::FullyWithdrawn,
        ValidatorPhase::Cancelled,
        ValidatorPhase::Evicted,
        ValidatorPhase::ReadyForDeposit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidatorPhase::NotInitialized => "NOT_INITIALIZED",
            ValidatorPhase::StakeDeposited => "STAKE_DEPOSITED",
            ValidatorPhase::WaitingForApproval => "WAITING_FOR_APPROVAL",
            ValidatorPhase::Live => "LIVE",
            ValidatorPhase::Exited => "EXITED",
            ValidatorPhase::BeingSlashed => "BEING_SLASHED",
            ValidatorPhase::FullyWithdrawn => "FULLY_WITHDRAWN",
            ValidatorPhase::Cancelled => "CANCELLED",
            ValidatorPhase::Evicted => "EVICTED",
            ValidatorPhase::ReadyForDeposit => "READY_FOR_DEPOSIT",
        }
    }

    /// Metric label value: the lowercase phase name
    pub fn label(&self) -> String {
        self.as_str().to_ascii_lowercase()
    }

    /// None for phases outside the known set
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.as_str() == s)
    }
}

/// One bid entity as returned by the subgraph, with its optional nested
/// validator payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidRecord {
    pub id: String,
    pub bidder_address: String,
    #[serde(deserialize_with = "bigint_as_i64")]
    pub pub_key_index: i64,
    pub status: String,
    pub amount: String,
    #[serde(deserialize_with = "bigint_as_i64")]
    pub block_number: i64,
    #[serde(deserialize_with = "bigint_as_i64")]
    pub block_timestamp: i64,
    pub transaction_hash: String,
    #[serde(default)]
    pub validator: Option<ValidatorRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorRecord {
    pub id: String,
    pub phase: String,
    pub validator_pub_key: String,
    #[serde(deserialize_with = "bigint_as_i64")]
    pub block_number: i64,
    #[serde(deserialize_with = "bigint_as_i64")]
    pub block_timestamp: i64,
    pub transaction_hash: String,
}

/// Single record of the aliased min/max extrema query
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtremumRecord {
    pub bidder_address: String,
    pub amount: String,
}

fn bigint_as_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrInt {
        String(String),
        Int(i64),
    }

    match StringOrInt::deserialize(deserializer)? {
        StringOrInt::String(s) => s.parse::<i64>().map_err(serde::de::Error::custom),
        StringOrInt::Int(n) => Ok(n),
    }
}
