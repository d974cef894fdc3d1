//! Collaborators owned by the host ledger.
//!
//! The betting engine never owns balances or the event stream. It talks to
//! them through [`AccountService`] and [`EventSink`], so the host chain can
//! plug in its own account database. [`Accounts`] is the in-memory
//! implementation used by [`crate::chain::BettingChain`] and the tests.

use std::collections::BTreeMap;

use crate::error::{InvariantError, ValidationError};
use crate::types::{Asset, BettingEvent, NATIVE_SYMBOL};

/// Balance access for the native currency.
pub trait AccountService {
    /// Current balance of `account` (zero for unknown accounts).
    fn balance(&self, account: &str) -> Asset;

    /// Credit `amount`. Overflow is an invariant violation.
    fn increase_balance(&mut self, account: &str, amount: &Asset) -> Result<(), InvariantError>;

    /// Debit `amount`, rejecting the operation if the balance is too low.
    fn decrease_balance(&mut self, account: &str, amount: &Asset) -> Result<(), ValidationError>;
}

/// Receiver for engine notifications.
pub trait EventSink {
    fn push(&mut self, event: BettingEvent);
}

impl EventSink for Vec<BettingEvent> {
    fn push(&mut self, event: BettingEvent) {
        Vec::push(self, event);
    }
}

/// In-memory native balances, keyed by account name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accounts {
    balances: BTreeMap<String, u64>,
}

impl Accounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of every balance; used to check conservation.
    pub fn total(&self) -> Result<Asset, InvariantError> {
        self.balances.values().try_fold(Asset::zero(NATIVE_SYMBOL), |acc, amount| {
            acc.checked_add(&Asset::native(*amount))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Asset)> + '_ {
        self.balances
            .iter()
            .map(|(name, amount)| (name.as_str(), Asset::native(*amount)))
    }
}

impl AccountService for Accounts {
    fn balance(&self, account: &str) -> Asset {
        Asset::native(self.balances.get(account).copied().unwrap_or(0))
    }

    fn increase_balance(&mut self, account: &str, amount: &Asset) -> Result<(), InvariantError> {
        if !amount.is_native() {
            return Err(InvariantError::SymbolMismatch(NATIVE_SYMBOL, amount.symbol));
        }
        let balance = self.balances.entry(account.to_string()).or_insert(0);
        *balance = balance
            .checked_add(amount.amount)
            .ok_or(InvariantError::Overflow("account balance"))?;
        Ok(())
    }

    fn decrease_balance(&mut self, account: &str, amount: &Asset) -> Result<(), ValidationError> {
        if !amount.is_native() {
            return Err(ValidationError::SymbolMismatch {
                expected: NATIVE_SYMBOL,
                actual: amount.symbol,
            });
        }
        let balance = self.balance(account);
        let remaining = balance
            .amount
            .checked_sub(amount.amount)
            .ok_or_else(|| ValidationError::InsufficientFunds {
                account: account.to_string(),
                balance,
                required: *amount,
            })?;
        self.balances.insert(account.to_string(), remaining);
        Ok(())
    }
}
