//! Medical ledger: reservations, the vitals slot, and the append-only record
//! sequence of each patient.
//!
//! Writes only require the Doctor role. Reads of the record sequence also
//! require a consent edge from the patient; consent gates reads, not writes.
//!
//! ## Storage Keys
//!
//! - `("RESERVE", patient, index)` → Reservation
//! - `("RSV_CNT", patient)` → u32
//! - `("DOC_RSV", doctor, index)` → Reservation
//! - `("DRSV_CNT", doctor)` → u32
//! - `("VITALS", patient)` → BasicHealthInfo
//! - `("MED_REC", patient, index)` → MedicalRecordEntry
//! - `("MED_CNT", patient)` → u32

use registry_common::ttl;
use soroban_sdk::{contracttype, symbol_short, Address, Env, String, Symbol, Vec};

use crate::consent;
use crate::rbac::{self, Role};
use crate::ContractError;

const RESERVATION: Symbol = symbol_short!("RESERVE");
const RESERVATION_COUNT: Symbol = symbol_short!("RSV_CNT");
const DOCTOR_RESERVATION: Symbol = symbol_short!("DOC_RSV");
const DOCTOR_RESERVATION_COUNT: Symbol = symbol_short!("DRSV_CNT");
const VITALS: Symbol = symbol_short!("VITALS");
const MED_RECORD: Symbol = symbol_short!("MED_REC");
const MED_COUNT: Symbol = symbol_short!("MED_CNT");

/// A booking. No status and no conflict detection.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Reservation {
    pub patient: Address,
    pub doctor: Address,
    pub timestamp: u64,
}

/// Latest vitals of a patient. Overwritten in place, not a history.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BasicHealthInfo {
    pub height: u32,
    pub weight: u32,
    pub systolic: u32,
    pub diastolic: u32,
    pub updated_by: Address,
    pub updated_at: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MedicalRecordEntry {
    pub timestamp: u64,
    pub name: String,
    pub detail: String,
    pub advice: String,
}

fn vitals_key(patient: &Address) -> (Symbol, Address) {
    (VITALS, patient.clone())
}

fn record_key(patient: &Address, index: u32) -> (Symbol, Address, u32) {
    (MED_RECORD, patient.clone(), index)
}

fn count_key(patient: &Address) -> (Symbol, Address) {
    (MED_COUNT, patient.clone())
}

// ── Reservations ──────────────────────────────────────────────────────────────

/// Largest page returned by the reservation listings.
pub const MAX_PAGE: u32 = 100;

fn append_indexed(env: &Env, entry: Symbol, count: Symbol, owner: &Address, value: &Reservation) {
    let cnt_key = (count, owner.clone());
    let index: u32 = env.storage().persistent().get(&cnt_key).unwrap_or(0);

    let key = (entry, owner.clone(), index);
    env.storage().persistent().set(&key, value);
    ttl::extend_persistent(env, &key);

    env.storage().persistent().set(&cnt_key, &index.saturating_add(1));
    ttl::extend_persistent(env, &cnt_key);
}

fn indexed_count(env: &Env, count: Symbol, owner: &Address) -> u32 {
    env.storage()
        .persistent()
        .get(&(count, owner.clone()))
        .unwrap_or(0)
}

fn indexed_get(
    env: &Env,
    entry: Symbol,
    count: Symbol,
    owner: &Address,
    index: u32,
) -> Result<Reservation, ContractError> {
    if index >= indexed_count(env, count, owner) {
        return Err(ContractError::IndexOutOfRange);
    }
    env.storage()
        .persistent()
        .get(&(entry, owner.clone(), index))
        .ok_or(ContractError::IndexOutOfRange)
}

fn indexed_page(
    env: &Env,
    entry: Symbol,
    count: Symbol,
    owner: &Address,
    start: u32,
    limit: u32,
) -> Result<Vec<Reservation>, ContractError> {
    if limit == 0 {
        return Err(ContractError::InvalidInput);
    }
    let end = start
        .saturating_add(limit.min(MAX_PAGE))
        .min(indexed_count(env, count, owner));

    let mut page = Vec::new(env);
    for index in start..end {
        if let Some(r) = env.storage().persistent().get(&(entry.clone(), owner.clone(), index)) {
            page.push_back(r);
        }
    }
    Ok(page)
}

/// Books on both sides: the patient's list and the doctor's schedule.
/// One storage entry per booking on each side.
pub fn add_reservation(env: &Env, reservation: &Reservation) {
    append_indexed(
        env,
        RESERVATION,
        RESERVATION_COUNT,
        &reservation.patient,
        reservation,
    );
    append_indexed(
        env,
        DOCTOR_RESERVATION,
        DOCTOR_RESERVATION_COUNT,
        &reservation.doctor,
        reservation,
    );
}

pub fn reservation_count(env: &Env, patient: &Address) -> u32 {
    indexed_count(env, RESERVATION_COUNT, patient)
}

pub fn get_reservation(
    env: &Env,
    patient: &Address,
    index: u32,
) -> Result<Reservation, ContractError> {
    indexed_get(env, RESERVATION, RESERVATION_COUNT, patient, index)
}

/// Up to `limit` (at most [`MAX_PAGE`]) bookings of `patient` from `start`.
pub fn get_reservations(
    env: &Env,
    patient: &Address,
    start: u32,
    limit: u32,
) -> Result<Vec<Reservation>, ContractError> {
    indexed_page(env, RESERVATION, RESERVATION_COUNT, patient, start, limit)
}

pub fn doctor_reservation_count(env: &Env, doctor: &Address) -> u32 {
    indexed_count(env, DOCTOR_RESERVATION_COUNT, doctor)
}

pub fn get_doctor_reservation(
    env: &Env,
    doctor: &Address,
    index: u32,
) -> Result<Reservation, ContractError> {
    indexed_get(env, DOCTOR_RESERVATION, DOCTOR_RESERVATION_COUNT, doctor, index)
}

pub fn get_doctor_reservations(
    env: &Env,
    doctor: &Address,
    start: u32,
    limit: u32,
) -> Result<Vec<Reservation>, ContractError> {
    indexed_page(
        env,
        DOCTOR_RESERVATION,
        DOCTOR_RESERVATION_COUNT,
        doctor,
        start,
        limit,
    )
}

// ── Vitals ────────────────────────────────────────────────────────────────────

pub fn set_basic_health_info(env: &Env, patient: &Address, info: &BasicHealthInfo) {
    let key = vitals_key(patient);
    env.storage().persistent().set(&key, info);
    ttl::extend_persistent(env, &key);
}

pub fn get_basic_health_info(env: &Env, patient: &Address) -> Option<BasicHealthInfo> {
    env.storage().persistent().get(&vitals_key(patient))
}

// ── Record sequence ───────────────────────────────────────────────────────────

pub fn medical_record_count(env: &Env, patient: &Address) -> u32 {
    env.storage()
        .persistent()
        .get(&count_key(patient))
        .unwrap_or(0)
}

/// Appends an entry and returns its index.
pub fn append_medical_record(
    env: &Env,
    patient: &Address,
    entry: &MedicalRecordEntry,
) -> Result<u32, ContractError> {
    let index = medical_record_count(env, patient);
    let next = index.checked_add(1).ok_or(ContractError::InvalidInput)?;

    let key = record_key(patient, index);
    env.storage().persistent().set(&key, entry);
    ttl::extend_persistent(env, &key);

    let cnt_key = count_key(patient);
    env.storage().persistent().set(&cnt_key, &next);
    ttl::extend_persistent(env, &cnt_key);

    Ok(index)
}

pub fn get_medical_record(
    env: &Env,
    patient: &Address,
    index: u32,
) -> Result<MedicalRecordEntry, ContractError> {
    if index >= medical_record_count(env, patient) {
        return Err(ContractError::IndexOutOfRange);
    }
    env.storage()
        .persistent()
        .get(&record_key(patient, index))
        .ok_or(ContractError::IndexOutOfRange)
}

/// Reads an entry on behalf of `reader`.
///
/// Checked in order: reader is a doctor, reader holds the patient's consent,
/// index is within the stored sequence.
pub fn read_medical_record_as(
    env: &Env,
    reader: &Address,
    patient: &Address,
    index: u32,
) -> Result<MedicalRecordEntry, ContractError> {
    rbac::require_role(env, reader, Role::Doctor)?;
    if !consent::is_approved(env, patient, reader) {
        return Err(ContractError::ConsentRequired);
    }
    get_medical_record(env, patient, index)
}

/// The patient themself or any doctor they approved may read the vitals.
pub fn can_read_vitals(env: &Env, reader: &Address, patient: &Address) -> bool {
    if reader == patient {
        return rbac::has_role(env, reader, Role::Patient);
    }
    rbac::has_role(env, reader, Role::Doctor) && consent::is_approved(env, patient, reader)
}
