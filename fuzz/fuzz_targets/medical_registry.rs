#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use medical_registry::{MedicalRegistryContract, MedicalRegistryContractClient};
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{Client as TokenClient, StellarAssetClient},
    Address, Env, String,
};

/// Registry entry points. `actor` picks the caller from the whole cast, so
/// role checks are fuzzed along with the workflow.
#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Approve { actor: u8, doctor: u8 },
    Reserve { actor: u8, doctor: u8, at: u32 },
    WriteRecord { actor: u8, patient: u8 },
    ReadRecord { actor: u8, patient: u8, index: u8 },
    Prescribe { actor: u8, patient: u8, quantity: u16 },
    Check { actor: u8, patient: u8, index: u8 },
    Distribute { actor: u8, patient: u8, index: u8 },
    Admit { actor: u8, patient: u8 },
    SetBill { actor: u8, patient: u8, amount: u32 },
    Pay { actor: u8, amount: u32 },
    Discharge { actor: u8, patient: u8 },
    Pause,
    Unpause,
    AdvanceTime { delta: u16 },
}

fuzz_target!(|actions: Vec<FuzzAction>| {
    let env = Env::default();
    env.mock_all_auths();

    let token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let treasury = Address::generate(&env);
    let admin = Address::generate(&env);

    let contract_id = env.register(MedicalRegistryContract, ());
    let client = MedicalRegistryContractClient::new(&env, &contract_id);
    if client.try_initialize(&admin, &token, &treasury).is_err() {
        return;
    }

    let text = |v: &str| String::from_str(&env, v);

    let institution = Address::generate(&env);
    client.add_institution(&admin, &institution, &text("Hospital"), &text(""), &text("H-1"));
    let pharmacy = Address::generate(&env);
    client.add_pharmacy(&admin, &pharmacy, &text("Pharmacy"), &text(""), &text("PH-1"));

    let mut doctors = Vec::new();
    for _ in 0..2 {
        let d = Address::generate(&env);
        client.add_doctor(&admin, &d, &text("Doc"), &1, &text("GP"), &40);
        doctors.push(d);
    }

    const START_BALANCE: i128 = 10_000_000_000;
    let mut patients = Vec::new();
    for _ in 0..3 {
        let p = Address::generate(&env);
        client.add_patient(&admin, &p, &text("Pat"), &text("P-1"), &text(""));
        StellarAssetClient::new(&env, &token).mint(&p, &START_BALANCE);
        patients.push(p);
    }

    let mut cast = vec![admin.clone(), institution.clone(), pharmacy.clone()];
    cast.extend(doctors.iter().cloned());
    cast.extend(patients.iter().cloned());

    let pick = |pool: &[Address], i: u8| pool[i as usize % pool.len()].clone();
    let token_client = TokenClient::new(&env, &token);
    let minted = START_BALANCE * patients.len() as i128;

    let mut statuses: Vec<Vec<u32>> = vec![Vec::new(); patients.len()];

    for action in actions.into_iter().take(64) {
        match action {
            FuzzAction::Approve { actor, doctor } => {
                let _ = client.try_approve_to_doctor(&pick(&cast, actor), &pick(&doctors, doctor));
            }
            FuzzAction::Reserve { actor, doctor, at } => {
                let _ = client.try_make_reservation(
                    &pick(&cast, actor),
                    &pick(&doctors, doctor),
                    &(at as u64),
                );
            }
            FuzzAction::WriteRecord { actor, patient } => {
                let _ = client.try_update_patient_medical_record(
                    &pick(&cast, actor),
                    &pick(&patients, patient),
                    &env.ledger().timestamp(),
                    &text("visit"),
                    &text("detail"),
                    &text("advice"),
                );
            }
            FuzzAction::ReadRecord { actor, patient, index } => {
                let reader = pick(&cast, actor);
                let subject = pick(&patients, patient);
                if client
                    .try_get_patient_medical_record(&reader, &subject, &(index as u32))
                    .is_ok()
                {
                    assert!(
                        client.is_approved(&subject, &reader),
                        "INVARIANT VIOLATION: record read without consent"
                    );
                }
            }
            FuzzAction::Prescribe { actor, patient, quantity } => {
                let _ = client.try_update_prescription_record(
                    &pick(&cast, actor),
                    &pick(&patients, patient),
                    &env.ledger().timestamp(),
                    &text("drug"),
                    &(quantity as u32),
                    &text(""),
                );
            }
            FuzzAction::Check { actor, patient, index } => {
                let _ = client.try_check_prescription(
                    &pick(&cast, actor),
                    &pick(&patients, patient),
                    &(index as u32 % 4),
                );
            }
            FuzzAction::Distribute { actor, patient, index } => {
                let _ = client.try_distribute_prescription(
                    &pick(&cast, actor),
                    &pick(&patients, patient),
                    &(index as u32 % 4),
                );
            }
            FuzzAction::Admit { actor, patient } => {
                let _ = client.try_add_hospital_info(
                    &pick(&cast, actor),
                    &pick(&patients, patient),
                    &1,
                    &1,
                    &env.ledger().timestamp(),
                );
            }
            FuzzAction::SetBill { actor, patient, amount } => {
                let _ = client.try_update_bill_info(
                    &pick(&cast, actor),
                    &pick(&patients, patient),
                    &(amount as i128),
                    &text("stay"),
                );
            }
            FuzzAction::Pay { actor, amount } => {
                let payer = pick(&cast, actor);
                let before = client.try_check_the_bill(&payer);
                if client
                    .try_pay_the_bill(&payer, &text("card"), &(amount as i128))
                    .is_ok()
                {
                    if let Ok(Ok(bill)) = before {
                        assert!(
                            amount as i128 >= bill.amount,
                            "INVARIANT VIOLATION: partial payment accepted"
                        );
                    }
                    assert_eq!(client.check_the_bill(&payer).amount, 0);
                }
            }
            FuzzAction::Discharge { actor, patient } => {
                let subject = pick(&patients, patient);
                if client
                    .try_discharge_review(&pick(&cast, actor), &subject)
                    .is_ok()
                {
                    assert!(client.get_hospital_info(&subject).is_some());
                    assert_eq!(client.check_the_bill(&subject).amount, 0);
                }
            }
            FuzzAction::Pause => {
                let _ = client.try_pause(&admin);
            }
            FuzzAction::Unpause => {
                let _ = client.try_unpause(&admin);
            }
            FuzzAction::AdvanceTime { delta } => {
                let ts = env.ledger().timestamp().saturating_add(delta as u64);
                env.ledger().set_timestamp(ts);
            }
        }

        // ── Post-action invariant checks ──
        let mut held = token_client.balance(&treasury);
        for (i, p) in patients.iter().enumerate() {
            held += token_client.balance(p);

            assert!(
                client.check_the_bill(p).amount >= 0,
                "INVARIANT VIOLATION: negative bill"
            );

            let count = client.get_prescription_count(p);
            assert!(
                count as usize >= statuses[i].len(),
                "INVARIANT VIOLATION: prescription removed"
            );
            let mut now = Vec::new();
            for idx in 0..count {
                now.push(client.get_prescription(p, p, &idx).status as u32);
            }
            for (prev, cur) in statuses[i].iter().zip(now.iter()) {
                assert!(cur >= prev, "INVARIANT VIOLATION: prescription status rewound");
            }
            statuses[i] = now;
        }
        assert_eq!(held, minted, "INVARIANT VIOLATION: tokens created or destroyed");
    }
});
