#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, Env, String};

use crate::prescription::PrescriptionStatus;
use crate::rbac::Role;

/// Event published when the contract is initialized.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub payment_token: Address,
    pub treasury: Address,
    pub timestamp: u64,
}

/// Event published when an identity is given a role.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoleRegisteredEvent {
    pub user: Address,
    pub role: Role,
    pub name: String,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConsentGrantedEvent {
    pub patient: Address,
    pub doctor: Address,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReservationMadeEvent {
    pub patient: Address,
    pub doctor: Address,
    pub reserved_for: u64,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VitalsUpdatedEvent {
    pub patient: Address,
    pub doctor: Address,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MedicalRecordAddedEvent {
    pub patient: Address,
    pub doctor: Address,
    pub index: u32,
    pub timestamp: u64,
}

/// Event published on every prescription state change, including issue.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PrescriptionEvent {
    pub patient: Address,
    pub actor: Address,
    pub index: u32,
    pub status: PrescriptionStatus,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HospitalAdmissionEvent {
    pub patient: Address,
    pub institution: Address,
    pub department: u32,
    pub room: u32,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BillUpdatedEvent {
    pub patient: Address,
    pub institution: Address,
    pub amount: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BillPaidEvent {
    pub patient: Address,
    pub method: String,
    pub paid: i128,
    pub settled: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DischargedEvent {
    pub patient: Address,
    pub institution: Address,
    pub timestamp: u64,
}

pub fn publish_initialized(env: &Env, admin: Address, payment_token: Address, treasury: Address) {
    let topics = (symbol_short!("INIT"),);
    let data = InitializedEvent {
        admin,
        payment_token,
        treasury,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_role_registered(env: &Env, user: Address, role: Role, name: String) {
    let topics = (symbol_short!("ROLE_REG"), user.clone());
    let data = RoleRegisteredEvent {
        user,
        role,
        name,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_consent_granted(env: &Env, patient: Address, doctor: Address) {
    let topics = (symbol_short!("CONSENT"), patient.clone(), doctor.clone());
    let data = ConsentGrantedEvent {
        patient,
        doctor,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_reservation_made(env: &Env, patient: Address, doctor: Address, reserved_for: u64) {
    let topics = (symbol_short!("RESERVE"), patient.clone(), doctor.clone());
    let data = ReservationMadeEvent {
        patient,
        doctor,
        reserved_for,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_vitals_updated(env: &Env, patient: Address, doctor: Address) {
    let topics = (symbol_short!("VITALS"), patient.clone());
    let data = VitalsUpdatedEvent {
        patient,
        doctor,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_medical_record_added(env: &Env, patient: Address, doctor: Address, index: u32) {
    let topics = (symbol_short!("MED_REC"), patient.clone(), doctor.clone());
    let data = MedicalRecordAddedEvent {
        patient,
        doctor,
        index,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

/// Topic follows the new status: `RX_ISSUE`, `RX_CHECK` or `RX_DIST`.
pub fn publish_prescription(
    env: &Env,
    patient: Address,
    actor: Address,
    index: u32,
    status: PrescriptionStatus,
) {
    let tag = match status {
        PrescriptionStatus::Issued => symbol_short!("RX_ISSUE"),
        PrescriptionStatus::Checked => symbol_short!("RX_CHECK"),
        PrescriptionStatus::Distributed => symbol_short!("RX_DIST"),
    };
    let topics = (tag, patient.clone());
    let data = PrescriptionEvent {
        patient,
        actor,
        index,
        status,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_hospital_admission(
    env: &Env,
    patient: Address,
    institution: Address,
    department: u32,
    room: u32,
) {
    let topics = (symbol_short!("HOSP_ADM"), patient.clone());
    let data = HospitalAdmissionEvent {
        patient,
        institution,
        department,
        room,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_bill_updated(env: &Env, patient: Address, institution: Address, amount: i128) {
    let topics = (symbol_short!("BILL_SET"), patient.clone());
    let data = BillUpdatedEvent {
        patient,
        institution,
        amount,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_bill_paid(env: &Env, patient: Address, method: String, paid: i128, settled: i128) {
    let topics = (symbol_short!("BILL_PAID"), patient.clone());
    let data = BillPaidEvent {
        patient,
        method,
        paid,
        settled,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_discharged(env: &Env, patient: Address, institution: Address) {
    let topics = (symbol_short!("DISCHRG"), patient.clone());
    let data = DischargedEvent {
        patient,
        institution,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}
