//! # Medical Registry Contract
//!
//! Permissioned registry for patients, doctors, institutions and pharmacies.
//! Medical data reads are gated on patient consent, and a multi-party workflow
//! runs on top of the registry:
//!
//! ```text
//! reservation ─▶ diagnosis (records, vitals) ─▶ prescription issue ─▶ check ─▶ distribute
//!                                     hospital stay ─▶ bill ─▶ payment ─▶ discharge review
//! ```
//!
//! Every entry point takes the acting identity as its first argument and
//! calls `require_auth` on it. All preconditions are validated before the
//! first storage write.
#![no_std]
#![allow(clippy::too_many_arguments)]

pub mod billing;
pub mod consent;
pub mod discharge;
pub mod events;
pub mod prescription;
pub mod rbac;
pub mod records;
pub mod validation;

use billing::{Bill, BillingError, HospitalStay, TokenTransfer};
use discharge::DischargeRecord;
use prescription::{PrescriptionEntry, PrescriptionError, PrescriptionStatus};
use records::{BasicHealthInfo, MedicalRecordEntry, Reservation};
use registry_common::{pausable, reentrancy, ttl, CommonError};

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, Address, Env, String,
    Symbol, Vec,
};

pub use rbac::{DoctorProfile, FacilityProfile, PatientProfile, Role};

// ── Storage keys ──────────────────────────────────────────────────────────────

const ADMIN: Symbol = symbol_short!("ADMIN");
const INITIALIZED: Symbol = symbol_short!("INIT");
const PAYMENT_CFG: Symbol = symbol_short!("PAY_CFG");

// ── Types ─────────────────────────────────────────────────────────────────────

/// Where bill payments are drawn from and sent to.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PaymentConfig {
    pub token: Address,
    pub treasury: Address,
}

// ── Contract errors ───────────────────────────────────────────────────────────

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    /// Caller lacks the role the operation requires.
    Unauthorized = 3,
    /// Target identity already holds a role.
    AlreadyRegistered = 4,
    /// Doctor has no consent edge from the patient.
    ConsentRequired = 5,
    IndexOutOfRange = 6,
    InvalidStateTransition = 7,
    /// Payment does not cover the outstanding bill.
    InsufficientBalance = 8,
    /// Hospital records haven't been uploaded.
    HospitalRecordMissing = 9,
    /// The bill hasn't been paid.
    BillUnpaid = 10,
    InvalidInput = 11,
    NotFound = 12,
    PatientNotFound = 13,
    AlreadyDischarged = 14,
    Paused = 15,
    ReentrantCall = 16,
}

impl From<CommonError> for ContractError {
    fn from(e: CommonError) -> Self {
        match e {
            CommonError::NotInitialized => ContractError::NotInitialized,
            CommonError::AlreadyInitialized => ContractError::AlreadyInitialized,
            CommonError::AccessDenied => ContractError::Unauthorized,
            CommonError::Paused => ContractError::Paused,
            CommonError::ReentrantCall => ContractError::ReentrantCall,
        }
    }
}

fn map_billing_error(e: BillingError) -> ContractError {
    match e {
        BillingError::InvalidAmount => ContractError::InvalidInput,
        BillingError::InsufficientBalance => ContractError::InsufficientBalance,
    }
}

fn map_prescription_error(e: PrescriptionError) -> ContractError {
    match e {
        PrescriptionError::NotFound => ContractError::IndexOutOfRange,
        PrescriptionError::InvalidTransition => ContractError::InvalidStateTransition,
        PrescriptionError::LedgerFull => ContractError::InvalidInput,
    }
}

// ── Contract ──────────────────────────────────────────────────────────────────

#[contract]
pub struct MedicalRegistryContract;

#[contractimpl]
impl MedicalRegistryContract {
    fn require_initialized(env: &Env) -> Result<(), ContractError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::NotInitialized);
        }
        Ok(())
    }

    /// Guard for every state-mutating entry point.
    fn require_writable(env: &Env) -> Result<(), ContractError> {
        Self::require_initialized(env)?;
        pausable::require_not_paused(env)?;
        ttl::extend_instance(env);
        Ok(())
    }

    fn require_admin(env: &Env, caller: &Address) -> Result<(), ContractError> {
        rbac::require_role(env, caller, Role::Admin)
    }

    // ── Initialisation ────────────────────────────────────────────────────────

    /// Initialize the registry. `admin` becomes the only identity able to
    /// register others; bill payments move `payment_token` to `treasury`.
    pub fn initialize(
        env: Env,
        admin: Address,
        payment_token: Address,
        treasury: Address,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::AlreadyInitialized);
        }

        admin.require_auth();

        rbac::assign_admin(&env, &admin)?;

        let config = PaymentConfig {
            token: payment_token.clone(),
            treasury: treasury.clone(),
        };
        env.storage().instance().set(&ADMIN, &admin);
        env.storage().instance().set(&PAYMENT_CFG, &config);
        env.storage().instance().set(&INITIALIZED, &true);
        ttl::extend_instance(&env);

        events::publish_initialized(&env, admin, payment_token, treasury);

        Ok(())
    }

    pub fn get_admin(env: Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&ADMIN)
            .ok_or(ContractError::NotInitialized)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    pub fn get_payment_config(env: Env) -> Result<PaymentConfig, ContractError> {
        env.storage()
            .instance()
            .get(&PAYMENT_CFG)
            .ok_or(ContractError::NotInitialized)
    }

    pub fn version() -> u32 {
        1
    }

    // ── Circuit breaker ───────────────────────────────────────────────────────

    pub fn pause(env: Env, caller: Address) -> Result<(), ContractError> {
        let admin = Self::get_admin(env.clone())?;
        pausable::pause(&env, &caller, &admin)?;
        Ok(())
    }

    pub fn unpause(env: Env, caller: Address) -> Result<(), ContractError> {
        let admin = Self::get_admin(env.clone())?;
        pausable::unpause(&env, &caller, &admin)?;
        Ok(())
    }

    pub fn is_paused(env: Env) -> bool {
        pausable::is_paused(&env)
    }

    // ======================== Role Registry ========================

    pub fn add_institution(
        env: Env,
        caller: Address,
        institution: Address,
        name: String,
        location: String,
        registration_id: String,
    ) -> Result<(), ContractError> {
        Self::add_facility(
            &env,
            caller,
            institution,
            name,
            location,
            registration_id,
            Role::Institution,
        )
    }

    pub fn add_pharmacy(
        env: Env,
        caller: Address,
        pharmacy: Address,
        name: String,
        location: String,
        registration_id: String,
    ) -> Result<(), ContractError> {
        Self::add_facility(
            &env,
            caller,
            pharmacy,
            name,
            location,
            registration_id,
            Role::Pharmacy,
        )
    }

    fn add_facility(
        env: &Env,
        caller: Address,
        facility: Address,
        name: String,
        location: String,
        registration_id: String,
        role: Role,
    ) -> Result<(), ContractError> {
        Self::require_writable(env)?;
        caller.require_auth();
        Self::require_admin(env, &caller)?;

        validation::validate_name(&name)?;
        validation::validate_text(&location)?;
        validation::validate_identifier(&registration_id)?;

        let profile = FacilityProfile {
            address: facility.clone(),
            name: name.clone(),
            location,
            registration_id,
            registered_at: env.ledger().timestamp(),
        };
        rbac::register_facility(env, &profile, role)?;

        events::publish_role_registered(env, facility, role, name);
        Ok(())
    }

    pub fn add_patient(
        env: Env,
        caller: Address,
        patient: Address,
        name: String,
        patient_id: String,
        contact: String,
    ) -> Result<(), ContractError> {
        Self::require_writable(&env)?;
        caller.require_auth();
        Self::require_admin(&env, &caller)?;

        validation::validate_name(&name)?;
        validation::validate_identifier(&patient_id)?;
        validation::validate_text(&contact)?;

        let profile = PatientProfile {
            address: patient.clone(),
            name: name.clone(),
            patient_id,
            contact,
            registered_at: env.ledger().timestamp(),
        };
        rbac::register_patient(&env, &profile)?;

        events::publish_role_registered(&env, patient, Role::Patient, name);
        Ok(())
    }

    pub fn add_doctor(
        env: Env,
        caller: Address,
        doctor: Address,
        name: String,
        specialty: u32,
        department: String,
        age: u32,
    ) -> Result<(), ContractError> {
        Self::require_writable(&env)?;
        caller.require_auth();
        Self::require_admin(&env, &caller)?;

        validation::validate_name(&name)?;
        validation::validate_text(&department)?;

        let profile = DoctorProfile {
            address: doctor.clone(),
            name: name.clone(),
            specialty,
            department,
            age,
            registered_at: env.ledger().timestamp(),
        };
        rbac::register_doctor(&env, &profile)?;

        events::publish_role_registered(&env, doctor, Role::Doctor, name);
        Ok(())
    }

    pub fn check_role(env: Env, user: Address, role: Role) -> bool {
        rbac::has_role(&env, &user, role)
    }

    pub fn get_role(env: Env, user: Address) -> Role {
        rbac::get_role(&env, &user)
    }

    pub fn get_patient(env: Env, patient: Address) -> Result<PatientProfile, ContractError> {
        rbac::get_patient_profile(&env, &patient).ok_or(ContractError::NotFound)
    }

    pub fn get_doctor(env: Env, doctor: Address) -> Result<DoctorProfile, ContractError> {
        rbac::get_doctor_profile(&env, &doctor).ok_or(ContractError::NotFound)
    }

    pub fn get_institution(
        env: Env,
        institution: Address,
    ) -> Result<FacilityProfile, ContractError> {
        rbac::get_facility_profile(&env, &institution, Role::Institution)
            .ok_or(ContractError::NotFound)
    }

    pub fn get_pharmacy(env: Env, pharmacy: Address) -> Result<FacilityProfile, ContractError> {
        rbac::get_facility_profile(&env, &pharmacy, Role::Pharmacy).ok_or(ContractError::NotFound)
    }

    // ======================== Consent ========================

    /// Let `doctor` read the caller's medical ledger. Approving twice is a no-op.
    pub fn approve_to_doctor(
        env: Env,
        patient: Address,
        doctor: Address,
    ) -> Result<(), ContractError> {
        Self::require_writable(&env)?;
        patient.require_auth();
        rbac::require_role(&env, &patient, Role::Patient)?;
        rbac::require_role(&env, &doctor, Role::Doctor)?;

        if consent::approve(&env, &patient, &doctor) {
            events::publish_consent_granted(&env, patient, doctor);
        }
        Ok(())
    }

    pub fn is_approved(env: Env, patient: Address, doctor: Address) -> bool {
        consent::is_approved(&env, &patient, &doctor)
    }

    /// Page through the doctors `patient` approved, in approval order.
    pub fn get_approved_doctors(
        env: Env,
        patient: Address,
        start: u32,
        limit: u32,
    ) -> Result<Vec<Address>, ContractError> {
        consent::approved_doctors(&env, &patient, start, limit)
    }

    pub fn get_approved_doctor_count(env: Env, patient: Address) -> u32 {
        consent::approved_count(&env, &patient)
    }

    // ======================== Medical Ledger ========================

    pub fn make_reservation(
        env: Env,
        patient: Address,
        doctor: Address,
        timestamp: u64,
    ) -> Result<(), ContractError> {
        Self::require_writable(&env)?;
        patient.require_auth();
        rbac::require_role(&env, &patient, Role::Patient)?;
        rbac::require_role(&env, &doctor, Role::Doctor)?;

        let reservation = Reservation {
            patient: patient.clone(),
            doctor: doctor.clone(),
            timestamp,
        };
        records::add_reservation(&env, &reservation);

        events::publish_reservation_made(&env, patient, doctor, timestamp);
        Ok(())
    }

    pub fn get_reservation_count(env: Env, patient: Address) -> u32 {
        records::reservation_count(&env, &patient)
    }

    pub fn get_reservation(
        env: Env,
        patient: Address,
        index: u32,
    ) -> Result<Reservation, ContractError> {
        records::get_reservation(&env, &patient, index)
    }

    /// Page through the patient's bookings. `limit` is capped at
    /// [`records::MAX_PAGE`].
    pub fn get_reservations(
        env: Env,
        patient: Address,
        start: u32,
        limit: u32,
    ) -> Result<Vec<Reservation>, ContractError> {
        records::get_reservations(&env, &patient, start, limit)
    }

    pub fn get_doctor_reservation_count(env: Env, doctor: Address) -> u32 {
        records::doctor_reservation_count(&env, &doctor)
    }

    pub fn get_doctor_reservation(
        env: Env,
        doctor: Address,
        index: u32,
    ) -> Result<Reservation, ContractError> {
        records::get_doctor_reservation(&env, &doctor, index)
    }

    pub fn get_doctor_reservations(
        env: Env,
        doctor: Address,
        start: u32,
        limit: u32,
    ) -> Result<Vec<Reservation>, ContractError> {
        records::get_doctor_reservations(&env, &doctor, start, limit)
    }

    /// Overwrite the patient's vitals. No consent is needed to write.
    pub fn update_patient_basic_health_info(
        env: Env,
        doctor: Address,
        patient: Address,
        height: u32,
        weight: u32,
        systolic: u32,
        diastolic: u32,
    ) -> Result<(), ContractError> {
        Self::require_writable(&env)?;
        doctor.require_auth();
        rbac::require_role(&env, &doctor, Role::Doctor)?;
        rbac::require_patient(&env, &patient)?;

        let info = BasicHealthInfo {
            height,
            weight,
            systolic,
            diastolic,
            updated_by: doctor.clone(),
            updated_at: env.ledger().timestamp(),
        };
        records::set_basic_health_info(&env, &patient, &info);

        events::publish_vitals_updated(&env, patient, doctor);
        Ok(())
    }

    pub fn get_basic_health_info(
        env: Env,
        caller: Address,
        patient: Address,
    ) -> Result<BasicHealthInfo, ContractError> {
        caller.require_auth();
        if !records::can_read_vitals(&env, &caller, &patient) {
            return Err(ContractError::ConsentRequired);
        }
        records::get_basic_health_info(&env, &patient).ok_or(ContractError::NotFound)
    }

    /// Append a record entry and return its index. No consent is needed to write.
    pub fn update_patient_medical_record(
        env: Env,
        doctor: Address,
        patient: Address,
        timestamp: u64,
        name: String,
        detail: String,
        advice: String,
    ) -> Result<u32, ContractError> {
        Self::require_writable(&env)?;
        doctor.require_auth();
        rbac::require_role(&env, &doctor, Role::Doctor)?;
        rbac::require_patient(&env, &patient)?;

        validation::validate_name(&name)?;
        validation::validate_text(&detail)?;
        validation::validate_text(&advice)?;

        let entry = MedicalRecordEntry {
            timestamp,
            name,
            detail,
            advice,
        };
        let index = records::append_medical_record(&env, &patient, &entry)?;

        events::publish_medical_record_added(&env, patient, doctor, index);
        Ok(index)
    }

    pub fn get_patient_medical_record(
        env: Env,
        doctor: Address,
        patient: Address,
        index: u32,
    ) -> Result<MedicalRecordEntry, ContractError> {
        doctor.require_auth();
        records::read_medical_record_as(&env, &doctor, &patient, index)
    }

    pub fn get_medical_record_count(env: Env, patient: Address) -> u32 {
        records::medical_record_count(&env, &patient)
    }

    // ======================== Prescriptions ========================

    /// Issue a prescription in `Issued` state and return its index.
    pub fn update_prescription_record(
        env: Env,
        doctor: Address,
        patient: Address,
        timestamp: u64,
        drug: String,
        quantity: u32,
        description: String,
    ) -> Result<u32, ContractError> {
        Self::require_writable(&env)?;
        doctor.require_auth();
        rbac::require_role(&env, &doctor, Role::Doctor)?;
        rbac::require_patient(&env, &patient)?;

        validation::validate_name(&drug)?;
        validation::validate_text(&description)?;

        let index = prescription::issue(
            &env,
            &patient,
            &doctor,
            timestamp,
            drug,
            quantity,
            description,
        )
        .map_err(map_prescription_error)?;

        events::publish_prescription(&env, patient, doctor, index, PrescriptionStatus::Issued);
        Ok(index)
    }

    pub fn check_prescription(
        env: Env,
        institution: Address,
        patient: Address,
        index: u32,
    ) -> Result<(), ContractError> {
        Self::require_writable(&env)?;
        institution.require_auth();
        rbac::require_role(&env, &institution, Role::Institution)?;

        prescription::advance(&env, &patient, index, PrescriptionStatus::Checked)
            .map_err(map_prescription_error)?;

        events::publish_prescription(&env, patient, institution, index, PrescriptionStatus::Checked);
        Ok(())
    }

    pub fn distribute_prescription(
        env: Env,
        pharmacy: Address,
        patient: Address,
        index: u32,
    ) -> Result<(), ContractError> {
        Self::require_writable(&env)?;
        pharmacy.require_auth();
        rbac::require_role(&env, &pharmacy, Role::Pharmacy)?;

        prescription::advance(&env, &patient, index, PrescriptionStatus::Distributed)
            .map_err(map_prescription_error)?;

        events::publish_prescription(
            &env,
            patient,
            pharmacy,
            index,
            PrescriptionStatus::Distributed,
        );
        Ok(())
    }

    /// Readable by the patient, a consented doctor, and any institution or pharmacy.
    pub fn get_prescription(
        env: Env,
        caller: Address,
        patient: Address,
        index: u32,
    ) -> Result<PrescriptionEntry, ContractError> {
        caller.require_auth();
        let allowed = match rbac::get_role(&env, &caller) {
            Role::Patient => caller == patient,
            Role::Doctor => consent::is_approved(&env, &patient, &caller),
            Role::Institution | Role::Pharmacy => true,
            Role::Admin | Role::None => false,
        };
        if !allowed {
            return Err(ContractError::Unauthorized);
        }
        prescription::get(&env, &patient, index).map_err(map_prescription_error)
    }

    pub fn get_prescription_count(env: Env, patient: Address) -> u32 {
        prescription::count(&env, &patient)
    }

    // ======================== Billing ========================

    pub fn add_hospital_info(
        env: Env,
        institution: Address,
        patient: Address,
        department: u32,
        room: u32,
        date: u64,
    ) -> Result<(), ContractError> {
        Self::require_writable(&env)?;
        institution.require_auth();
        rbac::require_role(&env, &institution, Role::Institution)?;
        rbac::require_patient(&env, &patient)?;

        let stay = HospitalStay {
            department,
            room,
            admitted_at: date,
            recorded_by: institution.clone(),
        };
        billing::set_hospital_stay(&env, &patient, &stay);

        events::publish_hospital_admission(&env, patient, institution, department, room);
        Ok(())
    }

    pub fn get_hospital_info(env: Env, patient: Address) -> Option<HospitalStay> {
        billing::get_hospital_stay(&env, &patient)
    }

    /// Replace the patient's outstanding bill.
    pub fn update_bill_info(
        env: Env,
        institution: Address,
        patient: Address,
        amount: i128,
        detail: String,
    ) -> Result<(), ContractError> {
        Self::require_writable(&env)?;
        institution.require_auth();
        rbac::require_role(&env, &institution, Role::Institution)?;
        rbac::require_patient(&env, &patient)?;

        validation::validate_text(&detail)?;

        billing::set_bill(&env, &patient, amount, detail).map_err(map_billing_error)?;

        events::publish_bill_updated(&env, patient, institution, amount);
        Ok(())
    }

    pub fn check_the_bill(env: Env, patient: Address) -> Result<Bill, ContractError> {
        patient.require_auth();
        rbac::require_role(&env, &patient, Role::Patient)?;
        Ok(billing::get_bill(&env, &patient))
    }

    /// Pay the whole outstanding bill. `amount` is moved from the patient to
    /// the treasury after the bill has been zeroed.
    pub fn pay_the_bill(
        env: Env,
        patient: Address,
        method: String,
        amount: i128,
    ) -> Result<bool, ContractError> {
        Self::require_writable(&env)?;
        patient.require_auth();
        rbac::require_role(&env, &patient, Role::Patient)?;
        validation::validate_name(&method)?;

        let config = Self::get_payment_config(env.clone())?;
        let transfer = TokenTransfer::new(&env, &config.token);

        let settled = reentrancy::guarded(&env, || {
            billing::settle(&env, &patient, &config.treasury, amount, &transfer)
                .map_err(map_billing_error)
        })?;

        events::publish_bill_paid(&env, patient, method, amount, settled.amount);
        Ok(true)
    }

    // ======================== Discharge ========================

    pub fn discharge_review(
        env: Env,
        institution: Address,
        patient: Address,
    ) -> Result<(), ContractError> {
        Self::require_writable(&env)?;
        institution.require_auth();
        rbac::require_role(&env, &institution, Role::Institution)?;

        discharge::review(&env, &institution, &patient)?;

        events::publish_discharged(&env, patient, institution);
        Ok(())
    }

    pub fn is_discharged(env: Env, patient: Address) -> bool {
        discharge::is_discharged(&env, &patient)
    }

    pub fn get_discharge_record(env: Env, patient: Address) -> Option<DischargeRecord> {
        discharge::get_record(&env, &patient)
    }
}
