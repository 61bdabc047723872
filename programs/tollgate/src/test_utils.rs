// In-process fakes for the tollgate's collaborators.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use anchor_lang::prelude::Pubkey;

use crate::error::{ExecutionError, LedgerError};
use crate::interfaces::{ActionExecutor, AuthorizationOracle, FeeLedger, TransferReceipt};
use crate::roles::Role;

/// Shared call log so tests can assert ordering across collaborators
pub type Journal = Rc<RefCell<Vec<String>>>;

#[derive(Default)]
pub struct StaticOracle {
    grants: HashSet<(Pubkey, Role)>,
}

impl StaticOracle {
    pub fn allow(mut self, principal: Pubkey, role: Role) -> Self {
        self.grants.insert((principal, role));
        self
    }
}

impl AuthorizationOracle for StaticOracle {
    fn may_perform(&self, principal: &Pubkey, _instance: &Pubkey, role: Role) -> bool {
        self.grants.contains(&(*principal, role))
    }
}

/// Single-token ledger that records every call it sees
#[derive(Default)]
pub struct RecordingLedger {
    pub balances: HashMap<Pubkey, u128>,
    pub allowances: HashMap<(Pubkey, Pubkey), u128>,
    pub transfer_calls: usize,
    pub reversals: usize,
    pub fail_reverse: Option<LedgerError>,
    pub journal: Journal,
}

impl RecordingLedger {
    pub fn with_journal(journal: Journal) -> Self {
        Self {
            journal,
            ..Self::default()
        }
    }

    pub fn fund(&mut self, owner: Pubkey, amount: u128) {
        *self.balances.entry(owner).or_default() += amount;
    }

    pub fn approve(&mut self, owner: Pubkey, spender: Pubkey, amount: u128) {
        self.allowances.insert((owner, spender), amount);
    }

    pub fn balance(&self, owner: &Pubkey) -> u128 {
        self.balances.get(owner).copied().unwrap_or_default()
    }
}

impl FeeLedger for RecordingLedger {
    fn transfer_from(
        &mut self,
        token: &Pubkey,
        spender: &Pubkey,
        owner: &Pubkey,
        recipient: &Pubkey,
        amount: u128,
    ) -> Result<TransferReceipt, LedgerError> {
        self.transfer_calls += 1;

        let allowance = self.allowances.get(&(*owner, *spender)).copied().unwrap_or_default();
        if allowance < amount {
            return Err(LedgerError::InsufficientAllowance {
                required: amount,
                available: allowance,
            });
        }
        let balance = self.balance(owner);
        if balance < amount {
            return Err(LedgerError::InsufficientBalance {
                required: amount,
                available: balance,
            });
        }

        self.allowances.insert((*owner, *spender), allowance - amount);
        self.balances.insert(*owner, balance - amount);
        *self.balances.entry(*recipient).or_default() += amount;
        self.journal.borrow_mut().push("transfer".to_string());

        Ok(TransferReceipt {
            token: *token,
            spender: *spender,
            owner: *owner,
            recipient: *recipient,
            amount,
        })
    }

    fn reverse(&mut self, receipt: &TransferReceipt) -> Result<(), LedgerError> {
        self.reversals += 1;
        if let Some(err) = &self.fail_reverse {
            return Err(err.clone());
        }
        *self.balances.entry(receipt.recipient).or_default() -= receipt.amount;
        *self.balances.entry(receipt.owner).or_default() += receipt.amount;
        *self
            .allowances
            .entry((receipt.owner, receipt.spender))
            .or_default() += receipt.amount;
        self.journal.borrow_mut().push("reverse".to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingExecutor {
    pub calls: Vec<(Pubkey, Vec<u8>)>,
    pub fail_with: Option<ExecutionError>,
    pub journal: Journal,
}

impl RecordingExecutor {
    pub fn with_journal(journal: Journal) -> Self {
        Self {
            journal,
            ..Self::default()
        }
    }

    pub fn failing(error: ExecutionError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::default()
        }
    }
}

impl ActionExecutor for RecordingExecutor {
    fn execute(&mut self, sender: &Pubkey, payload: &[u8]) -> Result<(), ExecutionError> {
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        self.calls.push((*sender, payload.to_vec()));
        self.journal.borrow_mut().push("execute".to_string());
        Ok(())
    }
}
