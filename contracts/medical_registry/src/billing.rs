//! Hospital stays, outstanding bills and bill settlement.
//!
//! ## Settlement
//! 1. The payment must cover the whole outstanding amount; there is no
//!    partial payment.
//! 2. The bill is zeroed and persisted.
//! 3. Only then is value moved through the [`ValueTransfer`] capability.
//!
//! Step 3 may hand control to foreign code (the token contract). Because the
//! bill is already zero at that point, a nested call can never observe a stale
//! balance.

use registry_common::ttl;
use soroban_sdk::{contracttype, symbol_short, token, Address, Env, String, Symbol};

const HOSPITAL: Symbol = symbol_short!("HOSP");
const BILL: Symbol = symbol_short!("BILL");

// ── Types ─────────────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HospitalStay {
    pub department: u32,
    pub room: u32,
    pub admitted_at: u64,
    pub recorded_by: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Bill {
    pub amount: i128,
    pub detail: String,
    pub updated_at: u64,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BillingError {
    InvalidAmount,
    InsufficientBalance,
}

/// Moves value from a payer to a payee.
pub trait ValueTransfer {
    fn transfer(&self, from: &Address, to: &Address, amount: i128);
}

/// [`ValueTransfer`] backed by a Soroban token contract.
pub struct TokenTransfer<'a> {
    client: token::Client<'a>,
}

impl<'a> TokenTransfer<'a> {
    pub fn new(env: &Env, token: &Address) -> Self {
        Self {
            client: token::Client::new(env, token),
        }
    }
}

impl ValueTransfer for TokenTransfer<'_> {
    fn transfer(&self, from: &Address, to: &Address, amount: i128) {
        self.client.transfer(from, to, &amount);
    }
}

// ── Storage helpers ───────────────────────────────────────────────────────────

fn hospital_key(patient: &Address) -> (Symbol, Address) {
    (HOSPITAL, patient.clone())
}

fn bill_key(patient: &Address) -> (Symbol, Address) {
    (BILL, patient.clone())
}

fn store_bill(env: &Env, patient: &Address, bill: &Bill) {
    let key = bill_key(patient);
    env.storage().persistent().set(&key, bill);
    ttl::extend_persistent(env, &key);
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Records the stay, replacing any previous one.
pub fn set_hospital_stay(env: &Env, patient: &Address, stay: &HospitalStay) {
    let key = hospital_key(patient);
    env.storage().persistent().set(&key, stay);
    ttl::extend_persistent(env, &key);
}

pub fn get_hospital_stay(env: &Env, patient: &Address) -> Option<HospitalStay> {
    env.storage().persistent().get(&hospital_key(patient))
}

/// Replaces the outstanding bill. Amounts are absolute, not added.
pub fn set_bill(
    env: &Env,
    patient: &Address,
    amount: i128,
    detail: String,
) -> Result<Bill, BillingError> {
    if amount < 0 {
        return Err(BillingError::InvalidAmount);
    }
    let bill = Bill {
        amount,
        detail,
        updated_at: env.ledger().timestamp(),
    };
    store_bill(env, patient, &bill);
    Ok(bill)
}

/// The patient's bill, or a zero bill with an empty detail if none was set.
pub fn get_bill(env: &Env, patient: &Address) -> Bill {
    env.storage()
        .persistent()
        .get(&bill_key(patient))
        .unwrap_or(Bill {
            amount: 0,
            detail: String::from_str(env, ""),
            updated_at: 0,
        })
}

/// Settles the outstanding bill with a payment of `amount`.
///
/// Returns the bill as it stood before settlement.
pub fn settle<T: ValueTransfer>(
    env: &Env,
    patient: &Address,
    payee: &Address,
    amount: i128,
    transfer: &T,
) -> Result<Bill, BillingError> {
    let outstanding = get_bill(env, patient);
    if amount < outstanding.amount {
        return Err(BillingError::InsufficientBalance);
    }

    let cleared = Bill {
        amount: 0,
        detail: outstanding.detail.clone(),
        updated_at: env.ledger().timestamp(),
    };
    store_bill(env, patient, &cleared);

    if amount > 0 {
        transfer.transfer(patient, payee, amount);
    }

    Ok(outstanding)
}
