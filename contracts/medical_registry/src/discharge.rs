//! Discharge review.
//!
//! A patient can be discharged once a hospital stay is on record and the bill
//! is fully settled. The stay is checked strictly before the bill. A completed
//! review is terminal.

use registry_common::ttl;
use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

use crate::billing;
use crate::ContractError;

const DISCHARGE: Symbol = symbol_short!("DISCHRG");

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DischargeRecord {
    pub institution: Address,
    pub reviewed_at: u64,
}

fn discharge_key(patient: &Address) -> (Symbol, Address) {
    (DISCHARGE, patient.clone())
}

pub fn get_record(env: &Env, patient: &Address) -> Option<DischargeRecord> {
    env.storage().persistent().get(&discharge_key(patient))
}

pub fn is_discharged(env: &Env, patient: &Address) -> bool {
    env.storage().persistent().has(&discharge_key(patient))
}

/// Validates both preconditions, then records the review.
pub fn review(
    env: &Env,
    institution: &Address,
    patient: &Address,
) -> Result<DischargeRecord, ContractError> {
    if is_discharged(env, patient) {
        return Err(ContractError::AlreadyDischarged);
    }
    if billing::get_hospital_stay(env, patient).is_none() {
        return Err(ContractError::HospitalRecordMissing);
    }
    if billing::get_bill(env, patient).amount != 0 {
        return Err(ContractError::BillUnpaid);
    }

    let record = DischargeRecord {
        institution: institution.clone(),
        reviewed_at: env.ledger().timestamp(),
    };
    let key = discharge_key(patient);
    env.storage().persistent().set(&key, &record);
    ttl::extend_persistent(env, &key);

    Ok(record)
}
