//! Patient → doctor consent edges.
//!
//! An edge lets the doctor read the patient's medical ledger. Edges are only
//! ever added; there is no expiry and no revocation path.
//!
//! ## Storage Keys
//!
//! - `("CONSENT", patient, doctor)` → bool
//! - `("CONS_DOC", patient, index)` → Address, in approval order
//! - `("CONS_CNT", patient)` → u32

use registry_common::ttl;
use soroban_sdk::{symbol_short, Address, Env, Symbol, Vec};

use crate::ContractError;

const CONSENT: Symbol = symbol_short!("CONSENT");
const CONSENT_DOCTOR: Symbol = symbol_short!("CONS_DOC");
const CONSENT_COUNT: Symbol = symbol_short!("CONS_CNT");

/// Largest page returned by [`approved_doctors`].
pub const MAX_PAGE: u32 = 100;

fn edge_key(patient: &Address, doctor: &Address) -> (Symbol, Address, Address) {
    (CONSENT, patient.clone(), doctor.clone())
}

fn doctor_key(patient: &Address, index: u32) -> (Symbol, Address, u32) {
    (CONSENT_DOCTOR, patient.clone(), index)
}

fn count_key(patient: &Address) -> (Symbol, Address) {
    (CONSENT_COUNT, patient.clone())
}

pub fn is_approved(env: &Env, patient: &Address, doctor: &Address) -> bool {
    env.storage()
        .persistent()
        .get(&edge_key(patient, doctor))
        .unwrap_or(false)
}

pub fn approved_count(env: &Env, patient: &Address) -> u32 {
    env.storage()
        .persistent()
        .get(&count_key(patient))
        .unwrap_or(0)
}

/// Records the edge. Returns `false` when it already existed, in which case
/// nothing is written.
pub fn approve(env: &Env, patient: &Address, doctor: &Address) -> bool {
    if is_approved(env, patient, doctor) {
        return false;
    }

    let key = edge_key(patient, doctor);
    env.storage().persistent().set(&key, &true);
    ttl::extend_persistent(env, &key);

    let index = approved_count(env, patient);
    let doc_key = doctor_key(patient, index);
    env.storage().persistent().set(&doc_key, doctor);
    ttl::extend_persistent(env, &doc_key);

    let cnt_key = count_key(patient);
    env.storage()
        .persistent()
        .set(&cnt_key, &index.saturating_add(1));
    ttl::extend_persistent(env, &cnt_key);

    true
}

/// Up to `limit` (at most [`MAX_PAGE`]) approved doctors from `start`, in
/// approval order.
pub fn approved_doctors(
    env: &Env,
    patient: &Address,
    start: u32,
    limit: u32,
) -> Result<Vec<Address>, ContractError> {
    if limit == 0 {
        return Err(ContractError::InvalidInput);
    }
    let end = start
        .saturating_add(limit.min(MAX_PAGE))
        .min(approved_count(env, patient));

    let mut doctors = Vec::new(env);
    for index in start..end {
        if let Some(doctor) = env.storage().persistent().get(&doctor_key(patient, index)) {
            doctors.push_back(doctor);
        }
    }
    Ok(doctors)
}
