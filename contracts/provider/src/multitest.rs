mod suite;

use suite::SuiteBuilder;

mod instantiation {
    use super::*;

    #[test]
    fn instantiate_works() {
        let suite = SuiteBuilder::new()
            .with_validator(&"aa".repeat(20), 600, 600_000)
            .with_validator(&"bb".repeat(20), 400, 400_000)
            .build();

        let params = suite.get_params();
        assert_eq!(params.blocks_per_epoch, 1);

        // The slash meter starts full: 5% of the total bonded power
        let meter = suite.get_slash_meter();
        assert_eq!(meter.value, 50);
        assert_eq!(meter.allowance, 50);
        assert!(suite.list_consumers().consumers.is_empty());
    }
}

mod lifecycle {
    use super::*;
    use crate::state::consumers::ConsumerPhase;

    #[test]
    fn register_initialize_stop_delete() {
        let mut suite = SuiteBuilder::new().build();

        let consumer_id = suite.register_consumer("consumer-1").unwrap();
        assert_eq!(consumer_id, "0");
        let second = suite.register_consumer("consumer-2").unwrap();
        assert_eq!(second, "1");

        suite
            .initialize_consumer(&consumer_id, "07-tendermint-0", "connection-0")
            .unwrap();
        let consumer = suite.get_consumer(&consumer_id).consumer;
        assert_eq!(consumer.phase, ConsumerPhase::Initialized);
        assert_eq!(consumer.client_id.as_deref(), Some("07-tendermint-0"));

        // Deleting before stopping is refused
        suite.delete_consumer(&consumer_id).unwrap_err();

        suite.stop_consumer(&consumer_id).unwrap();
        suite.delete_consumer(&consumer_id).unwrap();
        assert_eq!(
            suite.get_consumer(&consumer_id).consumer.phase,
            ConsumerPhase::Deleted
        );

        // The chain id can be registered again after deletion
        let third = suite.register_consumer("consumer-1").unwrap();
        assert_eq!(third, "2");
        assert_eq!(suite.list_consumers().consumers.len(), 3);
    }
}

mod key_assignment {
    use super::*;
    use ccv_apis::provider_api::cons_addr_from_pubkey;

    #[test]
    fn assign_and_resolve_both_directions() {
        let provider_addr = "aa".repeat(20);
        let mut suite = SuiteBuilder::new()
            .with_validator(&provider_addr, 100, 100_000)
            .build();
        let consumer_id = suite.register_consumer("consumer-1").unwrap();

        let consumer_key = vec![42u8; 32];
        suite
            .assign_consumer_key(&consumer_id, &provider_addr, consumer_key.clone())
            .unwrap();

        let assignment = suite.get_key_assignment(&consumer_id, &provider_addr);
        assert_eq!(
            assignment.consumer_pub_key.map(|bz| bz.to_vec()),
            Some(consumer_key.clone())
        );
        let consumer_addr = hex::encode(cons_addr_from_pubkey(&consumer_key).unwrap());
        assert_eq!(assignment.consumer_cons_addr, Some(consumer_addr.clone()));

        let reverse = suite.get_provider_addr(&consumer_id, &consumer_addr);
        assert_eq!(reverse.provider_cons_addr, Some(provider_addr.clone()));

        // Another validator cannot take the same consumer key
        suite
            .assign_consumer_key(&consumer_id, &"bb".repeat(20), consumer_key)
            .unwrap_err();
    }
}

mod throttle {
    use super::*;

    #[test]
    fn meter_replenishes_on_schedule() {
        let mut suite = SuiteBuilder::new()
            .with_validator(&"aa".repeat(20), 1000, 1_000_000)
            .build();
        assert_eq!(suite.get_slash_meter().value, 50);

        // Mid-period begin-blockers leave the meter alone
        suite.advance_time(600);
        suite.call_begin_block(10).unwrap();
        let before = suite.get_slash_meter();
        assert_eq!(before.value, 50);

        // A full period later the meter is refilled (and stays capped at the
        // allowance)
        suite.advance_time(3600);
        suite.call_begin_block(11).unwrap();
        let after = suite.get_slash_meter();
        assert_eq!(after.value, 50);
        assert!(after.last_replenish > before.last_replenish);
        assert!(suite.get_throttle_queue().entries.is_empty());
    }
}

mod epochs {
    use super::*;
    use crate::state::config::Params;

    #[test]
    fn valset_update_id_advances_per_epoch() {
        let mut suite = SuiteBuilder::new()
            .with_params(Params {
                blocks_per_epoch: 2,
                ..Default::default()
            })
            .with_validator(&"aa".repeat(20), 1000, 1_000_000)
            .build();
        assert_eq!(suite.get_valset_update_id(), 0);

        suite.call_end_block(2, vec![]).unwrap();
        assert_eq!(suite.get_valset_update_id(), 1);

        // Mid-epoch block: accumulate only
        suite.call_end_block(3, vec![]).unwrap();
        assert_eq!(suite.get_valset_update_id(), 1);

        suite.call_end_block(4, vec![]).unwrap();
        assert_eq!(suite.get_valset_update_id(), 2);
    }

    #[test]
    fn updates_accumulate_between_epochs() {
        let mut suite = SuiteBuilder::new()
            .with_params(Params {
                blocks_per_epoch: 4,
                ..Default::default()
            })
            .with_validator(&"aa".repeat(20), 1000, 1_000_000)
            .build();

        suite.set_validator_power(&"aa".repeat(20), 900);
        let updates = suite.take_validator_updates();
        suite.call_end_block(5, updates).unwrap();
        // Not an epoch boundary: nothing was emitted yet
        assert_eq!(suite.get_valset_update_id(), 0);

        suite.call_end_block(8, vec![]).unwrap();
        assert_eq!(suite.get_valset_update_id(), 1);
    }
}

mod staking_module {
    use super::*;
    use ccv_bindings::ProviderMsg;
    use cosmwasm_std::{Decimal, Timestamp, Uint128};

    const VAL: &str = "cccccccccccccccccccccccccccccccccccccccc";

    #[test]
    fn slash_reduces_tokens_by_fraction() {
        let mut suite = SuiteBuilder::new().with_validator(VAL, 100, 1000).build();

        suite
            .execute_provider_msg(ProviderMsg::Slash {
                cons_addr: VAL.to_string(),
                infraction_height: 1,
                power: 100,
                slash_fraction: Decimal::percent(5),
            })
            .unwrap();

        let validator = suite.validator(VAL).unwrap();
        assert_eq!(validator.tokens, Uint128::new(950));
    }

    #[test]
    fn jail_produces_removal_update() {
        let mut suite = SuiteBuilder::new().with_validator(VAL, 100, 100_000).build();

        suite
            .execute_provider_msg(ProviderMsg::Jail {
                cons_addr: VAL.to_string(),
            })
            .unwrap();
        let until = suite.block_time().plus_seconds(600);
        suite
            .execute_provider_msg(ProviderMsg::JailUntil {
                cons_addr: VAL.to_string(),
                until,
            })
            .unwrap();

        let validator = suite.validator(VAL).unwrap();
        assert!(validator.jailed);
        // Tokens are untouched by jailing
        assert_eq!(validator.tokens, Uint128::new(100_000));
        assert_eq!(suite.signing_info(VAL).jailed_until, until);

        // The staking module produced a removal update for the next
        // end-blocker
        let updates = suite.take_validator_updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].power, 0);
    }

    #[test]
    fn tombstone_is_permanent_and_unique() {
        let mut suite = SuiteBuilder::new().with_validator(VAL, 100, 100_000).build();

        suite
            .execute_provider_msg(ProviderMsg::JailUntil {
                cons_addr: VAL.to_string(),
                until: Timestamp::from_nanos(u64::MAX),
            })
            .unwrap();
        suite
            .execute_provider_msg(ProviderMsg::Tombstone {
                cons_addr: VAL.to_string(),
            })
            .unwrap();
        assert!(suite.signing_info(VAL).tombstoned);

        // Double-tombstoning is a module-level error; the executor never
        // issues it
        suite
            .execute_provider_msg(ProviderMsg::Tombstone {
                cons_addr: VAL.to_string(),
            })
            .unwrap_err();
    }
}
