//! The VSC dispatcher: derives per-consumer validator-set-change packets from
//! staking updates at the end of every block.
//!
//! Validator updates accumulate between epoch boundaries; every boundary
//! allocates a fresh, strictly increasing valset update id, records the
//! provider height it was emitted at, and sends one VSC packet per launched
//! consumer over its ordered CCV channel.

use std::collections::BTreeMap;

use cosmwasm_std::{Binary, DepsMut, Env, Event, IbcMsg, IbcTimeout, Response, Storage};
use prost::Message;

use ccv_apis::provider_api::{ProviderConsAddr, ValidatorUpdate};
use ccv_apis::Validate;
use ccv_bindings::{query_bonded_validators, ProviderMsg, ProviderQuery};
use ccv_proto::interchain_security::ccv::v1::ValidatorSetChangePacketData;

use crate::error::ContractError;
use crate::state::config::{Params, PARAMS};
use crate::state::consumers::{launched_consumers, set_consumer_validator, Consumer};
use crate::state::{keymap, vsc};

/// `accumulate_changes` merges a block's validator updates into the pending
/// set. When multiple updates target the same public key, the later one wins.
/// The merged list is sorted by descending power, then descending public key
/// bytes, so every full node produces identical packet bytes
pub fn accumulate_changes(
    current: Vec<ValidatorUpdate>,
    new: Vec<ValidatorUpdate>,
) -> Vec<ValidatorUpdate> {
    let mut merged: BTreeMap<Vec<u8>, ValidatorUpdate> = BTreeMap::new();
    for update in current.into_iter().chain(new) {
        merged.insert(update.pub_key.to_vec(), update);
    }

    let mut out: Vec<ValidatorUpdate> = merged.into_values().collect();
    out.sort_by(|a, b| {
        b.power
            .cmp(&a.power)
            .then_with(|| b.pub_key.as_slice().cmp(a.pub_key.as_slice()))
    });
    out
}

/// The CCV end-blocker. Runs after the staking end-blocker, consuming the
/// validator power updates staking produced for this block
pub fn handle_end_block(
    mut deps: DepsMut<ProviderQuery>,
    env: Env,
    updates: Vec<ValidatorUpdate>,
) -> Result<Response<ProviderMsg>, ContractError> {
    for update in &updates {
        update.validate()?;
    }

    let pending = accumulate_changes(vsc::pending_updates(deps.storage)?, updates);
    vsc::save_pending_updates(deps.storage, &pending)?;

    let params = PARAMS.load(deps.storage)?;
    if env.block.height % params.blocks_per_epoch != 0 {
        return Ok(Response::new());
    }

    dispatch_vsc_packets(&mut deps, &env, &params)
}

/// Emits one VSC packet per launched consumer, carrying the accumulated
/// updates translated through the consumer's key assignments plus any pending
/// slash acknowledgements
fn dispatch_vsc_packets(
    deps: &mut DepsMut<ProviderQuery>,
    env: &Env,
    params: &Params,
) -> Result<Response<ProviderMsg>, ContractError> {
    let updates = vsc::take_pending_updates(deps.storage)?;
    let vsc_id = vsc::next_vsc_id(deps.storage, env.block.height)?;
    let timeout =
        IbcTimeout::with_timestamp(env.block.time.plus_seconds(params.ccv_timeout_seconds));

    let mut res = Response::new();
    for consumer in launched_consumers(deps.storage)? {
        let channel_id = consumer
            .channel_id
            .clone()
            .ok_or_else(|| ContractError::UnknownChannel(consumer.consumer_id.clone()))?;
        let slash_acks = vsc::take_slash_acks(deps.storage, &consumer.consumer_id)?;
        let packet = build_vsc_packet(deps.storage, &consumer, &updates, vsc_id, slash_acks)?;

        res = res
            .add_message(IbcMsg::SendPacket {
                channel_id,
                data: Binary::new(packet.encode_to_vec()),
                timeout: timeout.clone(),
            })
            .add_event(
                Event::new("send_vsc_packet")
                    .add_attribute("module", "provider")
                    .add_attribute("consumer_id", &consumer.consumer_id)
                    .add_attribute("vsc_id", vsc_id.to_string())
                    .add_attribute("updates", packet.validator_updates.len().to_string())
                    .add_attribute("slash_acks", packet.slash_acks.len().to_string()),
            );

        // Fold the emitted updates into the consumer's validator set
        for update in &updates {
            let provider_addr = ProviderConsAddr::from_pubkey(&update.pub_key)?;
            set_consumer_validator(
                deps.storage,
                &consumer.consumer_id,
                &provider_addr,
                update.power,
            )?;
        }
    }
    Ok(res)
}

fn build_vsc_packet(
    storage: &dyn Storage,
    consumer: &Consumer,
    updates: &[ValidatorUpdate],
    vsc_id: u64,
    slash_acks: Vec<String>,
) -> Result<ValidatorSetChangePacketData, ContractError> {
    let validator_updates = updates
        .iter()
        .map(|update| {
            // A validator with an assigned consumer key appears on the
            // consumer under that key
            let provider_addr = ProviderConsAddr::from_pubkey(&update.pub_key)?;
            let pub_key = keymap::consumer_key_for(storage, &consumer.consumer_id, &provider_addr)?
                .unwrap_or_else(|| update.pub_key.clone());
            Ok(tendermint_proto::abci::ValidatorUpdate {
                pub_key: Some(tendermint_proto::crypto::PublicKey {
                    sum: Some(tendermint_proto::crypto::public_key::Sum::Ed25519(
                        pub_key.to_vec(),
                    )),
                }),
                power: update.power,
            })
        })
        .collect::<Result<Vec<_>, ContractError>>()?;

    Ok(ValidatorSetChangePacketData {
        validator_updates,
        valset_update_id: vsc_id,
        slash_acks,
    })
}

/// Handles a VSCMatured packet: the consumer has matured the given valset
/// update. Height map entries that every launched consumer has matured past
/// are no longer needed for slash resolution and get pruned
pub fn handle_vsc_matured(
    storage: &mut dyn Storage,
    consumer_id: &str,
    vsc_id: u64,
) -> Result<Event, ContractError> {
    vsc::record_matured(storage, consumer_id, vsc_id)?;
    let launched_ids = launched_consumers(storage)?
        .into_iter()
        .map(|c| c.consumer_id)
        .collect::<Vec<_>>();
    vsc::prune_matured_heights(storage, &launched_ids)?;

    Ok(Event::new("vsc_matured")
        .add_attribute("module", "provider")
        .add_attribute("consumer_id", consumer_id)
        .add_attribute("vsc_id", vsc_id.to_string()))
}

/// Seeds a freshly launched consumer's validator set from the current bonded
/// set
pub fn seed_consumer_validators(
    deps: &mut DepsMut<ProviderQuery>,
    consumer_id: &str,
) -> Result<(), ContractError> {
    let params = PARAMS.load(deps.storage)?;
    let bonded = query_bonded_validators(&deps.querier, Some(params.max_validators))?;
    for validator in bonded {
        let provider_addr = ProviderConsAddr::from_hex(&validator.cons_addr)?;
        set_consumer_validator(deps.storage, consumer_id, &provider_addr, validator.power)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::testing::mock_env;
    use cosmwasm_std::{Binary, CosmosMsg};

    use crate::contract::tests::{setup_with_validators, OWNER};
    use crate::contract::{execute, sudo};
    use crate::msg::ExecuteMsg;
    use crate::state::consumers::consumer_validators;
    use crate::test_utils::{
        bonded_validator, setup_launched_consumer, test_validator, update_for,
    };
    use ccv_apis::provider_api::SudoMsg;
    use cosmwasm_std::testing::message_info;

    fn update(seed: u8, power: i64) -> ValidatorUpdate {
        ValidatorUpdate {
            pub_key: Binary::new(vec![seed; 32]),
            power,
        }
    }

    #[test]
    fn accumulate_later_update_wins() {
        let merged = accumulate_changes(
            vec![update(1, 100), update(2, 200)],
            vec![update(1, 0), update(3, 300)],
        );
        assert_eq!(merged.len(), 3);
        let one = merged.iter().find(|u| u.pub_key == update(1, 0).pub_key);
        assert_eq!(one.unwrap().power, 0);
    }

    #[test]
    fn accumulate_order_is_deterministic() {
        let merged = accumulate_changes(
            vec![update(1, 100), update(3, 300)],
            vec![update(2, 300), update(4, 50)],
        );
        // Descending power; ties broken by descending pubkey bytes
        let powers: Vec<i64> = merged.iter().map(|u| u.power).collect();
        assert_eq!(powers, vec![300, 300, 100, 50]);
        assert_eq!(merged[0].pub_key, update(3, 0).pub_key);
        assert_eq!(merged[1].pub_key, update(2, 0).pub_key);
    }

    #[test]
    fn vsc_ids_strictly_increase() {
        let val = test_validator(1);
        let (mut deps, env) = setup_with_validators(vec![bonded_validator(&val, 500)]);
        setup_launched_consumer(&mut deps, &env, "consumer-1", "channel-0", "2");

        let mut seen = vec![];
        for height in 10..15 {
            let mut env = mock_env();
            env.block.height = height;
            sudo(
                deps.as_mut(),
                env,
                SudoMsg::EndBlock {
                    validator_updates: vec![],
                },
            )
            .unwrap();
            let id = vsc::last_vsc_id(&deps.storage).unwrap();
            assert!(seen.last().map_or(true, |last| id > *last));
            assert!(vsc::get_vsc_height(&deps.storage, id).unwrap().is_some());
            seen.push(id);
        }
    }

    #[test]
    fn mid_epoch_blocks_accumulate_without_emitting() {
        let val = test_validator(1);
        let (mut deps, env) = setup_with_validators(vec![bonded_validator(&val, 500)]);
        setup_launched_consumer(&mut deps, &env, "consumer-1", "channel-0", "2");
        // Three-block epochs
        let mut params = PARAMS.load(&deps.storage).unwrap();
        params.blocks_per_epoch = 3;
        let admin = message_info(&deps.api.addr_make(OWNER), &[]);
        execute(
            deps.as_mut(),
            env.clone(),
            admin,
            ExecuteMsg::UpdateParams { params },
        )
        .unwrap();

        let mut mid = mock_env();
        mid.block.height = 7;
        let res = handle_end_block(deps.as_mut(), mid, vec![update_for(&val, 500)]).unwrap();
        assert!(res.messages.is_empty());
        assert_eq!(vsc::last_vsc_id(&deps.storage).unwrap(), 0);
        assert_eq!(vsc::pending_updates(&deps.storage).unwrap().len(), 1);

        // The boundary flushes the accumulated updates
        let mut boundary = mock_env();
        boundary.block.height = 9;
        let res = handle_end_block(deps.as_mut(), boundary, vec![]).unwrap();
        assert_eq!(res.messages.len(), 1);
        assert_eq!(vsc::last_vsc_id(&deps.storage).unwrap(), 1);
        assert!(vsc::pending_updates(&deps.storage).unwrap().is_empty());
    }

    #[test]
    fn vsc_packet_translates_assigned_keys() {
        let val = test_validator(1);
        let consumer_key = Binary::new(vec![42; 32]);
        let (mut deps, env) = setup_with_validators(vec![bonded_validator(&val, 500)]);
        let consumer_id = setup_launched_consumer(&mut deps, &env, "consumer-1", "channel-0", "2");

        let admin = message_info(&deps.api.addr_make(OWNER), &[]);
        execute(
            deps.as_mut(),
            env.clone(),
            admin,
            ExecuteMsg::AssignConsumerKey {
                consumer_id: consumer_id.clone(),
                provider_cons_addr: val.cons_addr_hex(),
                consumer_pub_key: consumer_key.clone(),
            },
        )
        .unwrap();

        let res = handle_end_block(deps.as_mut(), env, vec![update_for(&val, 500)]).unwrap();
        assert_eq!(res.messages.len(), 1);
        let packet = match &res.messages[0].msg {
            CosmosMsg::Ibc(IbcMsg::SendPacket { channel_id, data, .. }) => {
                assert_eq!(channel_id, "channel-0");
                ValidatorSetChangePacketData::decode(data.as_slice()).unwrap()
            }
            other => panic!("unexpected message: {other:?}"),
        };
        assert_eq!(packet.valset_update_id, 1);
        assert_eq!(packet.validator_updates.len(), 1);
        let pub_key = packet.validator_updates[0].pub_key.clone().unwrap();
        match pub_key.sum.unwrap() {
            tendermint_proto::crypto::public_key::Sum::Ed25519(bz) => {
                assert_eq!(bz, consumer_key.to_vec());
            }
            other => panic!("unexpected key type: {other:?}"),
        }

        // The consumer validator set is tracked by provider address regardless
        // of the assigned key
        let consumer_vals = consumer_validators(&deps.storage, &consumer_id).unwrap();
        assert_eq!(
            consumer_vals,
            vec![(val.cons_addr().as_slice().to_vec(), 500)]
        );
    }

    #[test]
    fn power_zero_update_removes_consumer_validator() {
        let val = test_validator(1);
        let (mut deps, env) = setup_with_validators(vec![bonded_validator(&val, 500)]);
        let consumer_id = setup_launched_consumer(&mut deps, &env, "consumer-1", "channel-0", "2");
        assert_eq!(consumer_validators(&deps.storage, &consumer_id).unwrap().len(), 1);

        handle_end_block(deps.as_mut(), env, vec![update_for(&val, 0)]).unwrap();
        assert!(consumer_validators(&deps.storage, &consumer_id).unwrap().is_empty());
    }

    #[test]
    fn vsc_matured_prunes_height_map() {
        let val = test_validator(1);
        let (mut deps, env) = setup_with_validators(vec![bonded_validator(&val, 500)]);
        let consumer_id = setup_launched_consumer(&mut deps, &env, "consumer-1", "channel-0", "2");

        for height in 1..=3u64 {
            let mut env = mock_env();
            env.block.height = height;
            handle_end_block(deps.as_mut(), env, vec![]).unwrap();
        }
        assert!(vsc::get_vsc_height(&deps.storage, 1).unwrap().is_some());

        handle_vsc_matured(&mut deps.storage, &consumer_id, 2).unwrap();
        assert!(vsc::get_vsc_height(&deps.storage, 1).unwrap().is_none());
        assert!(vsc::get_vsc_height(&deps.storage, 2).unwrap().is_none());
        assert!(vsc::get_vsc_height(&deps.storage, 3).unwrap().is_some());
    }
}
