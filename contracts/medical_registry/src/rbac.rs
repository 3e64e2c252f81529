//! # Role Registry
//!
//! Every identity holds at most one [`Role`]. The role is assigned exactly once,
//! together with the matching profile, and is never reassigned or removed.
//!
//! ```text
//! Admin ──registers──┬── Institution  (hospital stay, bills, prescription check, discharge)
//!                    ├── Patient      (consent, reservations, bill payment)
//!                    ├── Doctor       (vitals, medical records, prescriptions)
//!                    └── Pharmacy     (prescription distribution)
//! ```
//!
//! The Admin is the identity passed to `initialize`; it is the only role that
//! can register others.
//!
//! ## Storage Keys
//!
//! - `("ROLE", user)` → Role
//! - `("PAT_PROF", user)` → PatientProfile
//! - `("DOC_PROF", user)` → DoctorProfile
//! - `("FAC_PROF", user)` → FacilityProfile (institutions and pharmacies)

use registry_common::ttl;
use soroban_sdk::{contracttype, symbol_short, Address, Env, String, Symbol};

use crate::ContractError;

const ROLE_KEY: Symbol = symbol_short!("ROLE");
const PATIENT_PROFILE: Symbol = symbol_short!("PAT_PROF");
const DOCTOR_PROFILE: Symbol = symbol_short!("DOC_PROF");
const FACILITY_PROFILE: Symbol = symbol_short!("FAC_PROF");

/// Roles in the registry. `None` is what unregistered identities report.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq, Copy)]
pub enum Role {
    None = 0,
    Admin = 1,
    Institution = 2,
    Patient = 3,
    Doctor = 4,
    Pharmacy = 5,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PatientProfile {
    pub address: Address,
    pub name: String,
    pub patient_id: String,
    pub contact: String,
    pub registered_at: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DoctorProfile {
    pub address: Address,
    pub name: String,
    /// Specialty code as assigned by the registry operator.
    pub specialty: u32,
    pub department: String,
    pub age: u32,
    pub registered_at: u64,
}

/// Profile shared by institutions and pharmacies; the role tells them apart.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FacilityProfile {
    pub address: Address,
    pub name: String,
    pub location: String,
    pub registration_id: String,
    pub registered_at: u64,
}

fn role_key(user: &Address) -> (Symbol, Address) {
    (ROLE_KEY, user.clone())
}

fn patient_key(user: &Address) -> (Symbol, Address) {
    (PATIENT_PROFILE, user.clone())
}

fn doctor_key(user: &Address) -> (Symbol, Address) {
    (DOCTOR_PROFILE, user.clone())
}

fn facility_key(user: &Address) -> (Symbol, Address) {
    (FACILITY_PROFILE, user.clone())
}

pub fn get_role(env: &Env, user: &Address) -> Role {
    env.storage()
        .persistent()
        .get(&role_key(user))
        .unwrap_or(Role::None)
}

/// `false` for `Role::None`: holding no role is not a role.
pub fn has_role(env: &Env, user: &Address, role: Role) -> bool {
    role != Role::None && get_role(env, user) == role
}

pub fn require_role(env: &Env, user: &Address, role: Role) -> Result<(), ContractError> {
    if !has_role(env, user, role) {
        return Err(ContractError::Unauthorized);
    }
    Ok(())
}

/// Guard for operations that name a patient as their subject.
pub fn require_patient(env: &Env, patient: &Address) -> Result<(), ContractError> {
    if !has_role(env, patient, Role::Patient) {
        return Err(ContractError::PatientNotFound);
    }
    Ok(())
}

pub fn require_unregistered(env: &Env, user: &Address) -> Result<(), ContractError> {
    if get_role(env, user) != Role::None {
        return Err(ContractError::AlreadyRegistered);
    }
    Ok(())
}

fn assign_role(env: &Env, user: &Address, role: Role) {
    let key = role_key(user);
    env.storage().persistent().set(&key, &role);
    ttl::extend_persistent(env, &key);
}

/// Bootstraps the admin at initialization.
pub fn assign_admin(env: &Env, admin: &Address) -> Result<(), ContractError> {
    require_unregistered(env, admin)?;
    assign_role(env, admin, Role::Admin);
    Ok(())
}

pub fn register_patient(env: &Env, profile: &PatientProfile) -> Result<(), ContractError> {
    require_unregistered(env, &profile.address)?;

    let key = patient_key(&profile.address);
    env.storage().persistent().set(&key, profile);
    ttl::extend_persistent(env, &key);
    assign_role(env, &profile.address, Role::Patient);
    Ok(())
}

pub fn register_doctor(env: &Env, profile: &DoctorProfile) -> Result<(), ContractError> {
    require_unregistered(env, &profile.address)?;

    let key = doctor_key(&profile.address);
    env.storage().persistent().set(&key, profile);
    ttl::extend_persistent(env, &key);
    assign_role(env, &profile.address, Role::Doctor);
    Ok(())
}

/// Registers an institution or a pharmacy.
pub fn register_facility(
    env: &Env,
    profile: &FacilityProfile,
    role: Role,
) -> Result<(), ContractError> {
    if role != Role::Institution && role != Role::Pharmacy {
        return Err(ContractError::InvalidInput);
    }
    require_unregistered(env, &profile.address)?;

    let key = facility_key(&profile.address);
    env.storage().persistent().set(&key, profile);
    ttl::extend_persistent(env, &key);
    assign_role(env, &profile.address, role);
    Ok(())
}

pub fn get_patient_profile(env: &Env, user: &Address) -> Option<PatientProfile> {
    env.storage().persistent().get(&patient_key(user))
}

pub fn get_doctor_profile(env: &Env, user: &Address) -> Option<DoctorProfile> {
    env.storage().persistent().get(&doctor_key(user))
}

/// Returns the facility profile only when `user` holds `role`.
pub fn get_facility_profile(env: &Env, user: &Address, role: Role) -> Option<FacilityProfile> {
    if !has_role(env, user, role) {
        return None;
    }
    env.storage().persistent().get(&facility_key(user))
}
