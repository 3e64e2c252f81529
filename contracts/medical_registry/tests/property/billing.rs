use medical_registry::ContractError;
use proptest::prelude::*;
use soroban_sdk::token::{Client as TokenClient, StellarAssetClient};

use crate::{setup, text};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// A payment settles the bill if and only if it covers it in full, and the
    /// payment moves to the treasury only on success.
    #[test]
    fn prop_payment_settles_iff_it_covers_the_bill(
        bill in 0i128..=10_000,
        payment in 0i128..=20_000,
    ) {
        let f = setup();
        let patient = f.patient();
        let institution = f.institution();

        StellarAssetClient::new(&f.env, &f.token).mint(&patient, &20_000);
        let token = TokenClient::new(&f.env, &f.token);

        f.client.update_bill_info(&institution, &patient, &bill, &text(&f.env, "stay"));
        let result = f.client.try_pay_the_bill(&patient, &text(&f.env, "card"), &payment);

        if payment >= bill {
            prop_assert_eq!(result, Ok(Ok(true)));
            prop_assert_eq!(f.client.check_the_bill(&patient).amount, 0);
            prop_assert_eq!(token.balance(&f.treasury), payment);
            prop_assert_eq!(token.balance(&patient), 20_000 - payment);
        } else {
            prop_assert_eq!(result, Err(Ok(ContractError::InsufficientBalance)));
            prop_assert_eq!(f.client.check_the_bill(&patient).amount, bill);
            prop_assert_eq!(token.balance(&f.treasury), 0);
            prop_assert_eq!(token.balance(&patient), 20_000);
        }
    }

    /// The bill is always the last amount written, never a running total.
    #[test]
    fn prop_bill_is_last_written_amount(
        amounts in proptest::collection::vec(0i128..=1_000_000, 1..5),
    ) {
        let f = setup();
        let patient = f.patient();
        let institution = f.institution();

        for amount in amounts.iter() {
            f.client.update_bill_info(&institution, &patient, amount, &text(&f.env, "stay"));
        }
        prop_assert_eq!(f.client.check_the_bill(&patient).amount, *amounts.last().unwrap());
    }
}
