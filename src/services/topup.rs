//! Wallet and Steam top-ups
//!
//! Both flows create a gateway payment and apply a side effect once the
//! gateway confirms it. Wallet top-ups credit the confirmed amount to the
//! ledger, deduplicated by payment id. Steam top-ups are recorded once per
//! payment and alert the operator, who fulfils them by hand.

use tracing::{info, warn};
use crate::config::TopUpConfig;
use crate::database::DatabaseService;
use crate::models::AdjustOutcome;
use crate::services::notification::AdminNotifier;
use crate::services::payment::{PaymentGateway, PaymentInfo, PaymentPurpose, PaymentStatus};
use crate::utils::errors::{GatewayError, Result, WayfisError};
use crate::utils::helpers::{format_rub, percent_of, rubles};
use crate::utils::logging::{log_payment_event, log_user_action};

/// Commission rules for top-ups.
///
/// Wallet top-ups are free. Steam top-ups charge the commission on top of
/// the requested credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeePolicy {
    pub steam_fee_percent: u32,
}

/// Price breakdown of a Steam top-up, in minor units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SteamQuote {
    /// Credited to the Steam wallet
    pub amount: i64,
    pub commission: i64,
    /// Charged through the gateway
    pub charge: i64,
}

impl FeePolicy {
    pub fn steam_quote(&self, amount: i64) -> Result<SteamQuote> {
        let too_large = || WayfisError::InvalidAmount("amount is too large".to_string());

        let commission = percent_of(amount, self.steam_fee_percent).ok_or_else(too_large)?;
        let charge = amount.checked_add(commission).ok_or_else(too_large)?;

        Ok(SteamQuote { amount, commission, charge })
    }
}

/// A created top-up payment awaiting confirmation
#[derive(Debug, Clone)]
pub struct TopUpCheckout {
    pub payment_id: String,
    pub confirmation_url: String,
    /// Amount charged, in minor units
    pub charge: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletTopUpOutcome {
    Credited { amount: i64, balance: i64 },
    AlreadyCredited { balance: i64 },
    NotSettled { status: PaymentStatus },
    Canceled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SteamTopUpOutcome {
    /// Recorded now; the operator was alerted by this call
    Settled { quote: SteamQuote },
    /// Recorded by an earlier check or webhook
    AlreadyProcessed { quote: SteamQuote },
    NotSettled { status: PaymentStatus },
    Canceled,
}

#[derive(Clone)]
#[derive(Debug)]
pub struct TopUpService {
    db: DatabaseService,
    gateway: PaymentGateway,
    notifier: AdminNotifier,
    fees: FeePolicy,
    min_amount: i64,
}

impl TopUpService {
    pub fn new(db: DatabaseService, gateway: PaymentGateway, notifier: AdminNotifier, config: &TopUpConfig) -> Self {
        Self {
            db,
            gateway,
            notifier,
            fees: FeePolicy { steam_fee_percent: config.steam_fee_percent },
            min_amount: rubles(config.min_amount),
        }
    }

    pub fn fees(&self) -> FeePolicy {
        self.fees
    }

    /// Minimum top-up in minor units
    pub fn min_amount(&self) -> i64 {
        self.min_amount
    }

    fn ensure_minimum(&self, amount: i64) -> Result<()> {
        if amount < self.min_amount {
            return Err(WayfisError::InvalidAmount(format!(
                "minimum amount is {}",
                format_rub(self.min_amount)
            )));
        }
        Ok(())
    }

    /// Create a payment that will credit `amount` minor units to the wallet
    pub async fn start_wallet_topup(&self, user_id: i64, amount: i64) -> Result<TopUpCheckout> {
        self.ensure_minimum(amount)?;

        let payment = self.gateway
            .create_payment(
                amount,
                &format!("Wallet top-up {}", format_rub(amount)),
                PaymentPurpose::WalletTopUp { user_id },
            )
            .await?;

        log_payment_event(&payment.id, "wallet_topup_created", None, Some(amount));

        Ok(TopUpCheckout {
            payment_id: payment.id,
            confirmation_url: payment.confirmation_url,
            charge: amount,
        })
    }

    /// Poll a wallet top-up payment and credit it once settled
    pub async fn check_wallet_topup(&self, user_id: i64, payment_id: &str) -> Result<WalletTopUpOutcome> {
        let payment = self.gateway.get_payment(payment_id).await?;

        match payment.purpose() {
            Some(PaymentPurpose::WalletTopUp { user_id: owner }) if owner == user_id => {}
            _ => return Err(WayfisError::not_found("Payment", payment_id)),
        }

        self.apply_wallet_payment(user_id, &payment).await
    }

    /// Credit the gateway-confirmed amount of a settled wallet payment
    pub async fn apply_wallet_payment(&self, user_id: i64, payment: &PaymentInfo) -> Result<WalletTopUpOutcome> {
        if payment.status == PaymentStatus::Canceled {
            return Ok(WalletTopUpOutcome::Canceled);
        }
        if !payment.status.is_settled() {
            return Ok(WalletTopUpOutcome::NotSettled { status: payment.status.clone() });
        }
        if payment.currency != self.gateway.currency() {
            warn!(payment_id = %payment.id, currency = %payment.currency, "Wallet payment in unexpected currency");
            return Err(GatewayError::InvalidResponse(format!(
                "payment {} is in {}, expected {}",
                payment.id,
                payment.currency,
                self.gateway.currency()
            ))
            .into());
        }

        let outcome = self.db.wallet
            .adjust_balance(
                user_id,
                payment.amount,
                &format!("Top-up via payment {}", payment.id),
                Some(&payment.id),
            )
            .await?;

        match outcome {
            AdjustOutcome::Applied { balance } => {
                log_payment_event(&payment.id, "wallet_credited", None, Some(payment.amount));
                info!(user_id = user_id, amount = payment.amount, balance = balance, "Wallet credited");
                Ok(WalletTopUpOutcome::Credited { amount: payment.amount, balance })
            }
            AdjustOutcome::Duplicate { balance } => Ok(WalletTopUpOutcome::AlreadyCredited { balance }),
        }
    }

    /// Debit the wallet; returns the new balance
    pub async fn withdraw(&self, user_id: i64, amount: i64) -> Result<i64> {
        if amount <= 0 {
            return Err(WayfisError::InvalidAmount("amount must be positive".to_string()));
        }

        let outcome = self.db.wallet
            .adjust_balance(user_id, -amount, "Withdrawal", None)
            .await?;

        log_user_action(user_id, "wallet_withdrawal", Some(&format_rub(amount)));
        Ok(outcome.balance())
    }

    /// Create a payment for a Steam credit of `amount` minor units plus commission
    pub async fn start_steam_topup(&self, user_id: i64, amount: i64) -> Result<(SteamQuote, TopUpCheckout)> {
        self.ensure_minimum(amount)?;
        let quote = self.fees.steam_quote(amount)?;

        let payment = self.gateway
            .create_payment(
                quote.charge,
                &format!("Steam Wallet top-up {}", format_rub(amount)),
                PaymentPurpose::SteamTopUp { user_id, amount },
            )
            .await?;

        log_payment_event(&payment.id, "steam_topup_created", None, Some(quote.charge));

        Ok((quote, TopUpCheckout {
            payment_id: payment.id,
            confirmation_url: payment.confirmation_url,
            charge: quote.charge,
        }))
    }

    /// Poll a Steam top-up payment; alerts the operator the first time it is settled
    pub async fn check_steam_topup(&self, user_id: i64, payment_id: &str) -> Result<SteamTopUpOutcome> {
        let payment = self.gateway.get_payment(payment_id).await?;

        match payment.purpose() {
            Some(PaymentPurpose::SteamTopUp { user_id: owner, .. }) if owner == user_id => {}
            _ => return Err(WayfisError::not_found("Payment", payment_id)),
        }

        self.apply_steam_payment(&payment).await
    }

    pub async fn apply_steam_payment(&self, payment: &PaymentInfo) -> Result<SteamTopUpOutcome> {
        let Some(PaymentPurpose::SteamTopUp { user_id, amount }) = payment.purpose() else {
            warn!(payment_id = %payment.id, "Payment is not a Steam top-up");
            return Err(WayfisError::not_found("Payment", &payment.id));
        };

        if payment.status == PaymentStatus::Canceled {
            return Ok(SteamTopUpOutcome::Canceled);
        }
        if !payment.status.is_settled() {
            return Ok(SteamTopUpOutcome::NotSettled { status: payment.status.clone() });
        }

        let quote = self.fees.steam_quote(amount)?;

        if !self.db.steam_topups.record(&payment.id, user_id, amount).await? {
            return Ok(SteamTopUpOutcome::AlreadyProcessed { quote });
        }

        log_payment_event(&payment.id, "steam_topup_settled", None, Some(payment.amount));
        self.notifier.steam_topup(user_id, amount, &payment.id).await;

        Ok(SteamTopUpOutcome::Settled { quote })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use crate::utils::helpers::parse_user_amount;
    use proptest::prelude::*;

    #[test]
    fn test_steam_quote_adds_commission_on_top() {
        let quote = FeePolicy { steam_fee_percent: 7 }.steam_quote(rubles(1000)).unwrap();
        assert_eq!(quote.amount, rubles(1000));
        assert_eq!(quote.commission, rubles(70));
        assert_eq!(quote.charge, rubles(1070));
    }

    #[test]
    fn test_zero_fee_charges_amount() {
        let quote = FeePolicy { steam_fee_percent: 0 }.steam_quote(rubles(250)).unwrap();
        assert_eq!(quote.charge, rubles(250));
    }

    #[test]
    fn test_huge_steam_amount_is_rejected() {
        let fees = FeePolicy { steam_fee_percent: 7 };

        assert_matches!(parse_user_amount("20000000000000000", 100), Err(WayfisError::InvalidAmount(_)));
        assert_matches!(fees.steam_quote(i64::MAX / 2), Err(WayfisError::InvalidAmount(_)));
        assert_matches!(fees.steam_quote(i64::MAX - 1), Err(WayfisError::InvalidAmount(_)));
    }

    proptest! {
        #[test]
        fn charge_is_amount_plus_commission(amount in 1i64..10_000_000_000, percent in 0u32..=100) {
            let quote = FeePolicy { steam_fee_percent: percent }.steam_quote(amount).unwrap();
            prop_assert_eq!(quote.charge, quote.amount + quote.commission);
            prop_assert!(quote.charge >= amount);
        }

        #[test]
        fn steam_quote_never_panics(amount in 1i64..=i64::MAX, percent in 0u32..=100) {
            match (FeePolicy { steam_fee_percent: percent }).steam_quote(amount) {
                Ok(quote) => prop_assert_eq!(quote.charge, quote.amount + quote.commission),
                Err(e) => prop_assert!(matches!(e, WayfisError::InvalidAmount(_))),
            }
        }
    }
}
