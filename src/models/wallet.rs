//! Wallet ledger model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use super::UnknownVariant;

/// Append-only ledger row; a user's balance is the sum of their rows
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WalletTransaction {
    pub id: i64,
    pub user_id: i64,
    /// Signed amount in minor units
    pub amount: i64,
    #[sqlx(try_from = "String")]
    pub kind: TransactionKind,
    pub description: String,
    pub payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

impl TransactionKind {
    pub fn for_delta(delta: i64) -> Self {
        if delta > 0 {
            TransactionKind::Deposit
        } else {
            TransactionKind::Withdrawal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
        }
    }
}

impl TryFrom<String> for TransactionKind {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "deposit" => Ok(TransactionKind::Deposit),
            "withdrawal" => Ok(TransactionKind::Withdrawal),
            _ => Err(UnknownVariant { kind: "transaction kind", value }),
        }
    }
}

/// Result of a balance adjustment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdjustOutcome {
    /// Applied; carries the new balance
    Applied { balance: i64 },
    /// The payment was already credited; carries the current balance
    Duplicate { balance: i64 },
}

impl AdjustOutcome {
    pub fn balance(&self) -> i64 {
        match self {
            AdjustOutcome::Applied { balance } | AdjustOutcome::Duplicate { balance } => *balance,
        }
    }
}
