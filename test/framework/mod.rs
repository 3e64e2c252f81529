//! # Registry Contract Testing Framework
//!
//! Reusable harness for driving the medical registry through whole clinical
//! workflows, with invariant checking and randomized action sequences.
//!
//! ## Architecture
//!
//! ```text
//! test/framework/
//! ├── mod.rs             — TestEnv, RegistryHarness, snapshots
//! ├── generators.rs      — proptest strategies for registry actions
//! ├── invariants.rs      — state and transition invariants
//! └── state_explorer.rs  — action-sequence execution with invariant checks
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use test_framework::{RegistryHarness, TestEnv};
//!
//! let mut env = TestEnv::new();
//! let harness = RegistryHarness::new(&mut env, 2, 2);
//! let patient = harness.patients[0].clone();
//! harness.bill(&patient, 100);
//! ```

extern crate std;

pub mod state_explorer;

use core::cell::Cell;

use medical_registry::{
    prescription::PrescriptionStatus, MedicalRegistryContract, MedicalRegistryContractClient,
};
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{Client as TokenClient, StellarAssetClient},
    Address, Env, String,
};

// ── Core Test Environment ────────────────────────────────────────────────────

/// Wraps the Soroban `Env` with address generation and ledger time control.
pub struct TestEnv {
    pub env: Env,
    generated_addresses: std::vec::Vec<Address>,
}

impl TestEnv {
    /// Create a new test environment with all auth mocked.
    pub fn new() -> Self {
        let env = Env::default();
        env.mock_all_auths();
        Self {
            env,
            generated_addresses: std::vec::Vec::new(),
        }
    }

    pub fn generate_address(&mut self) -> Address {
        let addr = Address::generate(&self.env);
        self.generated_addresses.push(addr.clone());
        addr
    }

    pub fn generate_addresses(&mut self, n: usize) -> std::vec::Vec<Address> {
        (0..n).map(|_| self.generate_address()).collect()
    }

    pub fn set_timestamp(&self, ts: u64) {
        self.env.ledger().set_timestamp(ts);
    }

    pub fn advance_time(&self, delta: u64) {
        let current = self.env.ledger().timestamp();
        self.env.ledger().set_timestamp(current.saturating_add(delta));
    }

    pub fn timestamp(&self) -> u64 {
        self.env.ledger().timestamp()
    }

    /// Deploy a SAC token contract and return its address.
    pub fn deploy_token(&self) -> Address {
        self.env
            .register_stellar_asset_contract_v2(Address::generate(&self.env))
            .address()
    }

    pub fn mint_tokens(&self, token: &Address, recipient: &Address, amount: i128) {
        StellarAssetClient::new(&self.env, token).mint(recipient, &amount);
    }

    pub fn text(&self, v: &str) -> String {
        String::from_str(&self.env, v)
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

// ── Registry Harness ─────────────────────────────────────────────────────────

/// Initialized registry with a fixed cast: one institution, one pharmacy,
/// and pools of doctors and patients.
pub struct RegistryHarness<'a> {
    pub env: &'a mut TestEnv,
    pub client: MedicalRegistryContractClient<'static>,
    pub contract_id: Address,
    pub admin: Address,
    pub token: Address,
    pub treasury: Address,
    pub institution: Address,
    pub pharmacy: Address,
    pub doctors: std::vec::Vec<Address>,
    pub patients: std::vec::Vec<Address>,
    minted: Cell<i128>,
}

impl<'a> RegistryHarness<'a> {
    /// Deploy, initialize and register `num_doctors` doctors and
    /// `num_patients` patients.
    pub fn new(env: &'a mut TestEnv, num_doctors: usize, num_patients: usize) -> Self {
        let token = env.deploy_token();
        let contract_id = env.env.register(MedicalRegistryContract, ());
        let client = MedicalRegistryContractClient::new(&env.env, &contract_id);

        let admin = env.generate_address();
        let treasury = env.generate_address();
        client.initialize(&admin, &token, &treasury);

        let institution = env.generate_address();
        client.add_institution(
            &admin,
            &institution,
            &env.text("General Hospital"),
            &env.text("1 Main St"),
            &env.text("INST-1"),
        );

        let pharmacy = env.generate_address();
        client.add_pharmacy(
            &admin,
            &pharmacy,
            &env.text("Corner Pharmacy"),
            &env.text("2 Main St"),
            &env.text("PH-1"),
        );

        let doctors = env.generate_addresses(num_doctors);
        for doctor in doctors.iter() {
            client.add_doctor(
                &admin,
                doctor,
                &env.text("Dr. Test"),
                &1,
                &env.text("General"),
                &40,
            );
        }

        let patients = env.generate_addresses(num_patients);
        for (i, patient) in patients.iter().enumerate() {
            let patient_id = std::format!("P-{}", i);
            client.add_patient(
                &admin,
                patient,
                &env.text("Test Patient"),
                &env.text(&patient_id),
                &env.text(""),
            );
        }

        Self {
            env,
            client,
            contract_id,
            admin,
            token,
            treasury,
            institution,
            pharmacy,
            doctors,
            patients,
            minted: Cell::new(0),
        }
    }

    /// Give `patient` tokens to pay with. Tracked for value conservation.
    pub fn fund(&self, patient: &Address, amount: i128) {
        if amount <= 0 {
            return;
        }
        self.env.mint_tokens(&self.token, patient, amount);
        self.minted.set(self.minted.get() + amount);
    }

    pub fn balance(&self, who: &Address) -> i128 {
        TokenClient::new(&self.env.env, &self.token).balance(who)
    }

    pub fn admit(&self, patient: &Address, department: u32, room: u32) {
        self.client.add_hospital_info(
            &self.institution,
            patient,
            &department,
            &room,
            &self.env.timestamp(),
        );
    }

    pub fn bill(&self, patient: &Address, amount: i128) {
        self.client
            .update_bill_info(&self.institution, patient, &amount, &self.env.text("stay"));
    }

    pub fn outstanding(&self, patient: &Address) -> i128 {
        self.client.check_the_bill(patient).amount
    }

    /// Issue a prescription from `doctor` and return its index.
    pub fn prescribe(&self, doctor: &Address, patient: &Address, quantity: u32) -> u32 {
        self.client.update_prescription_record(
            doctor,
            patient,
            &self.env.timestamp(),
            &self.env.text("paracetamol"),
            &quantity,
            &self.env.text(""),
        )
    }

    /// Snapshot of all observable state of the tracked patients.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let patients = self
            .patients
            .iter()
            .map(|p| {
                let prescriptions = (0..self.client.get_prescription_count(p))
                    .map(|i| self.client.get_prescription(p, p, &i).status)
                    .collect();
                let approvals = self
                    .doctors
                    .iter()
                    .map(|d| self.client.is_approved(p, d))
                    .collect();
                PatientState {
                    patient: p.clone(),
                    bill: self.outstanding(p),
                    balance: self.balance(p),
                    record_count: self.client.get_medical_record_count(p),
                    prescriptions,
                    approvals,
                    has_stay: self.client.get_hospital_info(p).is_some(),
                    discharged: self.client.is_discharged(p),
                }
            })
            .collect();

        RegistrySnapshot {
            timestamp: self.env.timestamp(),
            paused: self.client.is_paused(),
            treasury_balance: self.balance(&self.treasury),
            total_minted: self.minted.get(),
            patients,
        }
    }
}

/// Observable state of one patient.
#[derive(Debug, Clone)]
pub struct PatientState {
    pub patient: Address,
    pub bill: i128,
    pub balance: i128,
    pub record_count: u32,
    pub prescriptions: std::vec::Vec<PrescriptionStatus>,
    /// Consent edge to each harness doctor, in `RegistryHarness::doctors` order.
    pub approvals: std::vec::Vec<bool>,
    pub has_stay: bool,
    pub discharged: bool,
}

/// Immutable snapshot of registry state at a point in time.
#[derive(Debug, Clone)]
pub struct RegistrySnapshot {
    pub timestamp: u64,
    pub paused: bool,
    pub treasury_balance: i128,
    pub total_minted: i128,
    pub patients: std::vec::Vec<PatientState>,
}

impl RegistrySnapshot {
    pub fn sum_patient_balances(&self) -> i128 {
        self.patients.iter().map(|p| p.balance).sum()
    }
}

// ── Test Outcome Tracking ────────────────────────────────────────────────────

/// Result of a single action, as recorded by the state explorer.
#[derive(Debug, Clone)]
pub enum ActionOutcome {
    Ok,
    /// The contract rejected the action with this error code.
    ExpectedError(u32),
    /// The host failed the call without a contract error.
    UnexpectedError(std::string::String),
}

/// Summary of a test run with coverage metrics.
#[derive(Debug, Clone)]
pub struct TestRunSummary {
    pub actions_executed: usize,
    pub invariant_checks: usize,
    pub invariant_violations: std::vec::Vec<std::string::String>,
    pub entry_points_hit: std::collections::HashSet<std::string::String>,
    pub transitions_observed: usize,
}

impl TestRunSummary {
    pub fn new() -> Self {
        Self {
            actions_executed: 0,
            invariant_checks: 0,
            invariant_violations: std::vec::Vec::new(),
            entry_points_hit: std::collections::HashSet::new(),
            transitions_observed: 0,
        }
    }

    pub fn passed(&self) -> bool {
        self.invariant_violations.is_empty()
    }

    /// Entry points hit / total known entry points.
    pub fn entry_point_coverage(&self, total_entry_points: usize) -> f64 {
        if total_entry_points == 0 {
            return 0.0;
        }
        self.entry_points_hit.len() as f64 / total_entry_points as f64
    }
}

impl Default for TestRunSummary {
    fn default() -> Self {
        Self::new()
    }
}
