//! # State Space Explorer
//!
//! Executes registry action sequences and verifies state and transition
//! invariants after every step.
//!
//! Each explored state is a [`RegistrySnapshot`]; edges are
//! [`RegistryAction`]s. Runs are bounded by `max_steps`.

extern crate std;

use std::string::String;
use std::vec::Vec;

use medical_registry::ContractError;
use soroban_sdk::{Address, InvokeError};

use super::generators::RegistryAction;
use super::invariants::{InvariantSet, TransitionInvariantSet};
use super::{ActionOutcome, RegistryHarness, RegistrySnapshot, TestRunSummary};

#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    pub max_steps: usize,
    /// Halt on the first invariant violation.
    pub fail_fast: bool,
    pub record_snapshots: bool,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            max_steps: 100,
            fail_fast: true,
            record_snapshots: false,
        }
    }
}

#[derive(Debug)]
pub struct ExplorationResult {
    pub summary: TestRunSummary,
    pub snapshots: Vec<RegistrySnapshot>,
    pub action_log: Vec<(RegistryAction, ActionOutcome)>,
}

impl ExplorationResult {
    pub fn passed(&self) -> bool {
        self.summary.passed()
    }

    /// Number of actions the contract rejected with a contract error.
    pub fn rejected(&self) -> usize {
        self.action_log
            .iter()
            .filter(|(_, o)| matches!(o, ActionOutcome::ExpectedError(_)))
            .count()
    }

    pub fn unexpected_errors(&self) -> Vec<String> {
        self.action_log
            .iter()
            .filter_map(|(a, o)| match o {
                ActionOutcome::UnexpectedError(e) => Some(std::format!("{:?}: {}", a, e)),
                _ => None,
            })
            .collect()
    }
}

/// Drives a [`RegistryHarness`] through action sequences.
pub struct StateExplorer<'h, 'a> {
    harness: &'h RegistryHarness<'a>,
    invariants: InvariantSet,
    transitions: TransitionInvariantSet,
    config: ExplorerConfig,
}

impl<'h, 'a> StateExplorer<'h, 'a> {
    pub fn new(
        harness: &'h RegistryHarness<'a>,
        invariants: InvariantSet,
        transitions: TransitionInvariantSet,
        config: ExplorerConfig,
    ) -> Self {
        Self {
            harness,
            invariants,
            transitions,
            config,
        }
    }

    /// Default configuration with every built-in invariant.
    pub fn with_defaults(harness: &'h RegistryHarness<'a>) -> Self {
        Self::new(
            harness,
            InvariantSet::registry_defaults(),
            TransitionInvariantSet::registry_defaults(),
            ExplorerConfig::default(),
        )
    }

    pub fn explore(&mut self, actions: &[RegistryAction]) -> ExplorationResult {
        let mut summary = TestRunSummary::new();
        let mut snapshots = Vec::new();
        let mut action_log = Vec::new();

        let mut previous = self.harness.snapshot();
        if self.config.record_snapshots {
            snapshots.push(previous.clone());
        }

        for action in actions.iter().take(self.config.max_steps) {
            let outcome = self.execute_action(action);
            summary.entry_points_hit.insert(action_entry_point(action));
            summary.actions_executed += 1;
            summary.transitions_observed += 1;
            action_log.push((action.clone(), outcome));

            let snapshot = self.harness.snapshot();
            let mut violations = self.invariants.check_all(&snapshot);
            violations.extend(self.transitions.check_all(&previous, &snapshot));
            summary.invariant_checks += 1;

            let failed = !violations.is_empty();
            for (name, msg) in violations {
                summary.invariant_violations.push(std::format!(
                    "After action #{} ({:?}): [{}] {}",
                    summary.actions_executed,
                    action,
                    name,
                    msg
                ));
            }

            if self.config.record_snapshots {
                snapshots.push(snapshot.clone());
            }
            if failed && self.config.fail_fast {
                break;
            }
            previous = snapshot;
        }

        ExplorationResult {
            summary,
            snapshots,
            action_log,
        }
    }

    fn patient(&self, i: usize) -> &Address {
        &self.harness.patients[i % self.harness.patients.len()]
    }

    fn doctor(&self, i: usize) -> &Address {
        &self.harness.doctors[i % self.harness.doctors.len()]
    }

    fn execute_action(&self, action: &RegistryAction) -> ActionOutcome {
        let h = self.harness;
        let text = |v: &str| h.env.text(v);

        match action {
            RegistryAction::Reserve { patient, doctor, at } => outcome(h.client.try_make_reservation(
                self.patient(*patient),
                self.doctor(*doctor),
                at,
            )),
            RegistryAction::Approve { patient, doctor } => outcome(
                h.client
                    .try_approve_to_doctor(self.patient(*patient), self.doctor(*doctor)),
            ),
            RegistryAction::WriteRecord { doctor, patient } => {
                outcome(h.client.try_update_patient_medical_record(
                    self.doctor(*doctor),
                    self.patient(*patient),
                    &h.env.timestamp(),
                    &text("checkup"),
                    &text("routine"),
                    &text("rest"),
                ))
            }
            RegistryAction::UpdateVitals {
                doctor,
                patient,
                weight,
            } => outcome(h.client.try_update_patient_basic_health_info(
                self.doctor(*doctor),
                self.patient(*patient),
                &170,
                weight,
                &120,
                &80,
            )),
            RegistryAction::Prescribe {
                doctor,
                patient,
                quantity,
            } => outcome(h.client.try_update_prescription_record(
                self.doctor(*doctor),
                self.patient(*patient),
                &h.env.timestamp(),
                &text("paracetamol"),
                quantity,
                &text(""),
            )),
            RegistryAction::CheckPrescription { patient, index } => outcome(
                h.client
                    .try_check_prescription(&h.institution, self.patient(*patient), index),
            ),
            RegistryAction::DistributePrescription { patient, index } => outcome(
                h.client
                    .try_distribute_prescription(&h.pharmacy, self.patient(*patient), index),
            ),
            RegistryAction::Admit {
                patient,
                department,
                room,
            } => outcome(h.client.try_add_hospital_info(
                &h.institution,
                self.patient(*patient),
                department,
                room,
                &h.env.timestamp(),
            )),
            RegistryAction::SetBill { patient, amount } => outcome(h.client.try_update_bill_info(
                &h.institution,
                self.patient(*patient),
                amount,
                &text("stay"),
            )),
            RegistryAction::PayBill { patient, amount } => {
                let payer = self.patient(*patient);
                h.fund(payer, *amount);
                outcome(h.client.try_pay_the_bill(payer, &text("card"), amount))
            }
            RegistryAction::Discharge { patient } => outcome(
                h.client
                    .try_discharge_review(&h.institution, self.patient(*patient)),
            ),
            RegistryAction::AdvanceTime { delta } => {
                h.env.advance_time(*delta);
                ActionOutcome::Ok
            }
            RegistryAction::Pause => outcome(h.client.try_pause(&h.admin)),
            RegistryAction::Unpause => outcome(h.client.try_unpause(&h.admin)),
        }
    }
}

fn outcome<T, C: core::fmt::Debug>(
    result: Result<Result<T, C>, Result<ContractError, InvokeError>>,
) -> ActionOutcome {
    match result {
        Ok(Ok(_)) => ActionOutcome::Ok,
        Ok(Err(e)) => ActionOutcome::UnexpectedError(std::format!("{:?}", e)),
        Err(Ok(e)) => ActionOutcome::ExpectedError(e as u32),
        Err(Err(e)) => ActionOutcome::UnexpectedError(std::format!("{:?}", e)),
    }
}

fn action_entry_point(action: &RegistryAction) -> String {
    match action {
        RegistryAction::Reserve { .. } => "make_reservation".into(),
        RegistryAction::Approve { .. } => "approve_to_doctor".into(),
        RegistryAction::WriteRecord { .. } => "update_patient_medical_record".into(),
        RegistryAction::UpdateVitals { .. } => "update_patient_basic_health_info".into(),
        RegistryAction::Prescribe { .. } => "update_prescription_record".into(),
        RegistryAction::CheckPrescription { .. } => "check_prescription".into(),
        RegistryAction::DistributePrescription { .. } => "distribute_prescription".into(),
        RegistryAction::Admit { .. } => "add_hospital_info".into(),
        RegistryAction::SetBill { .. } => "update_bill_info".into(),
        RegistryAction::PayBill { .. } => "pay_the_bill".into(),
        RegistryAction::Discharge { .. } => "discharge_review".into(),
        RegistryAction::AdvanceTime { .. } => "advance_time".into(),
        RegistryAction::Pause => "pause".into(),
        RegistryAction::Unpause => "unpause".into(),
    }
}

/// Mutating entry points the explorer can reach, for coverage calculation.
pub const REGISTRY_ENTRY_POINTS: &[&str] = &[
    "make_reservation",
    "approve_to_doctor",
    "update_patient_medical_record",
    "update_patient_basic_health_info",
    "update_prescription_record",
    "check_prescription",
    "distribute_prescription",
    "add_hospital_info",
    "update_bill_info",
    "pay_the_bill",
    "discharge_review",
    "pause",
    "unpause",
];
