//! Licensing domain models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Global revenue split, a versioned singleton
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeConfiguration {
    /// Athlete's share (repasse)
    pub repasse_atleta_fraction: Decimal,
    /// Platform's share (comissão)
    pub comissao_plataforma_fraction: Decimal,
    pub legal_note: String,
    pub version: i64,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

/// Per-athlete platform commission replacing the global comissão
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteFeeOverride {
    pub athlete_id: String,
    pub differentiated_commission_fraction: Decimal,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

/// Catalog view of an athlete (rights-holder)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Athlete {
    pub id: String,
    pub display_name: String,
    pub pix_key: String,
    /// Platform share for this athlete, if differentiated
    pub commission_override: Option<Decimal>,
}

/// Catalog view of a licensable media item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicensingItem {
    pub id: String,
    pub athlete_id: String,
    pub title: String,
    pub base_price: Decimal,
}

/// Where the applied split came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitSource {
    Global,
    AthleteOverride,
}

/// Arguments shared by simulate and commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicensingRequest {
    pub item_id: String,
    pub athlete_id: String,
    /// Opaque usage tag; recorded, never interpreted
    pub usage_type: String,
    pub term_months: u32,
}

/// Non-persisted preview of a licensing transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub item_title: String,
    pub total_value: Decimal,
    pub athlete_payout: Decimal,
    pub platform_commission: Decimal,
    pub athlete_pix_key: String,
    pub repasse_fraction: Decimal,
    pub comissao_fraction: Decimal,
    pub split_source: SplitSource,
}

/// Ledger entry status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerStatus {
    Pending,
    Approved,
    Cancelled,
}

impl LedgerStatus {
    pub const ALL: [LedgerStatus; 3] = [Self::Pending, Self::Approved, Self::Cancelled];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parse a status name, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "APPROVED" => Some(Self::Approved),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Cancelled)
    }

    /// Only PENDING -> APPROVED and PENDING -> CANCELLED are permitted
    pub fn can_transition_to(&self, next: LedgerStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved) | (Self::Pending, Self::Cancelled)
        )
    }
}

impl fmt::Display for LedgerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Committed licensing transaction; amounts never change after insert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub request_id: String,
    pub item_id: String,
    pub athlete_id: String,
    pub usage_type: String,
    pub term_months: u32,
    pub total_value: Decimal,
    pub athlete_payout: Decimal,
    pub platform_commission: Decimal,
    pub status: LedgerStatus,
    pub transaction_date: DateTime<Utc>,
    pub status_updated_at: Option<DateTime<Utc>>,
}

impl LedgerEntry {
    /// True when this entry was produced by the given arguments
    pub fn matches_request(&self, request: &LicensingRequest) -> bool {
        self.item_id == request.item_id
            && self.athlete_id == request.athlete_id
            && self.usage_type == request.usage_type
            && self.term_months == request.term_months
    }
}

/// Aggregated view over ledger entries (extrato)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// `None` for the global statement
    pub athlete_id: Option<String>,
    /// Statuses the aggregation covered
    pub statuses: Vec<LedgerStatus>,
    /// Sum of athlete payouts
    pub balance_total: Decimal,
    /// Sum of total values
    pub gross_volume: Decimal,
    /// Sum of platform commissions
    pub platform_commission_total: Decimal,
    pub transaction_count: u64,
}
