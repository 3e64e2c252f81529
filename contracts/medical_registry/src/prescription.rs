//! Prescription ledger and its fulfilment state machine.
//!
//! ```text
//! Issued ──check_prescription──▶ Checked ──distribute_prescription──▶ Distributed
//!  (Doctor)      (Institution)                   (Pharmacy)
//! ```
//!
//! Transitions only move forward. Entries are appended per patient and never
//! removed; only `status` and `updated_at` change after issue.

use registry_common::ttl;
use soroban_sdk::{contracttype, symbol_short, Address, Env, String, Symbol};

const RX: Symbol = symbol_short!("RX");
const RX_COUNT: Symbol = symbol_short!("RX_CNT");

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq, Copy)]
pub enum PrescriptionStatus {
    Issued = 0,
    Checked = 1,
    Distributed = 2,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PrescriptionEntry {
    pub timestamp: u64,
    pub drug: String,
    pub quantity: u32,
    pub description: String,
    pub status: PrescriptionStatus,
    pub prescriber: Address,
    pub updated_at: u64,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PrescriptionError {
    NotFound,
    InvalidTransition,
    LedgerFull,
}

fn entry_key(patient: &Address, index: u32) -> (Symbol, Address, u32) {
    (RX, patient.clone(), index)
}

fn count_key(patient: &Address) -> (Symbol, Address) {
    (RX_COUNT, patient.clone())
}

/// Forward-only transition table.
pub fn can_transition(from: PrescriptionStatus, to: PrescriptionStatus) -> bool {
    matches!(
        (from, to),
        (PrescriptionStatus::Issued, PrescriptionStatus::Checked)
            | (PrescriptionStatus::Checked, PrescriptionStatus::Distributed)
    )
}

pub fn count(env: &Env, patient: &Address) -> u32 {
    env.storage()
        .persistent()
        .get(&count_key(patient))
        .unwrap_or(0)
}

pub fn get(env: &Env, patient: &Address, index: u32) -> Result<PrescriptionEntry, PrescriptionError> {
    if index >= count(env, patient) {
        return Err(PrescriptionError::NotFound);
    }
    env.storage()
        .persistent()
        .get(&entry_key(patient, index))
        .ok_or(PrescriptionError::NotFound)
}

/// Appends a new entry in `Issued` and returns its index.
pub fn issue(
    env: &Env,
    patient: &Address,
    prescriber: &Address,
    timestamp: u64,
    drug: String,
    quantity: u32,
    description: String,
) -> Result<u32, PrescriptionError> {
    let index = count(env, patient);
    let next = index.checked_add(1).ok_or(PrescriptionError::LedgerFull)?;

    let entry = PrescriptionEntry {
        timestamp,
        drug,
        quantity,
        description,
        status: PrescriptionStatus::Issued,
        prescriber: prescriber.clone(),
        updated_at: env.ledger().timestamp(),
    };

    let key = entry_key(patient, index);
    env.storage().persistent().set(&key, &entry);
    ttl::extend_persistent(env, &key);

    let cnt_key = count_key(patient);
    env.storage().persistent().set(&cnt_key, &next);
    ttl::extend_persistent(env, &cnt_key);

    Ok(index)
}

/// Moves the entry to `to`, validating the transition before writing.
pub fn advance(
    env: &Env,
    patient: &Address,
    index: u32,
    to: PrescriptionStatus,
) -> Result<PrescriptionEntry, PrescriptionError> {
    let mut entry = get(env, patient, index)?;
    if !can_transition(entry.status, to) {
        return Err(PrescriptionError::InvalidTransition);
    }

    entry.status = to;
    entry.updated_at = env.ledger().timestamp();

    let key = entry_key(patient, index);
    env.storage().persistent().set(&key, &entry);
    ttl::extend_persistent(env, &key);

    Ok(entry)
}
