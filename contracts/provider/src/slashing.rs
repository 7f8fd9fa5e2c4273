//! Slash ingress and the jail/slash executor.
//!
//! Slash packets received over established CCV channels are validated, the
//! reported validator is resolved through the consumer's key assignments, and
//! the packet is dispatched by infraction: downtime goes through the slash
//! throttler and jails without touching tokens; double-signing bypasses the
//! throttler (the evidence is cryptographically attributable and not
//! spammable), tombstones, and slashes bonded tokens.
//!
//! The executor is the sole writer of jail/slash state: it mutates the
//! staking and slashing modules exclusively through `ProviderMsg` bindings,
//! which execute within the same transaction, so each application succeeds in
//! full or leaves all state unchanged.

use cosmwasm_std::{CosmosMsg, DepsMut, Env, Event, IbcReceiveResponse, Timestamp, Uint128};

use ccv_apis::provider_api::{ConsumerConsAddr, Infraction, PacketAckResult, ProviderConsAddr};
use ccv_bindings::{query_signing_info, query_validator_by_cons_addr, ProviderMsg, ProviderQuery};
use ccv_proto::interchain_security::ccv::v1::{
    Infraction as WireInfraction, InfractionType as WireInfractionType, SlashPacketData,
};

use crate::error::ContractError;
use crate::state::config::{Params, PARAMS};
use crate::state::consumers::{
    is_consumer_validator, Consumer, ConsumerPhase, INIT_CHAIN_HEIGHT, LAST_MATURED_VSC,
};
use crate::state::throttle::ThrottleQueueEntry;
use crate::state::{keymap, throttle as throttle_state, vsc};
use crate::throttle;

/// Jailed-until sentinel for tombstoned validators; they never unjail
const DOUBLE_SIGN_JAIL_END_TIME: Timestamp = Timestamp::from_nanos(u64::MAX);

/// Handles a slash packet received on the CCV channel of `consumer`. `v1`
/// marks packets arriving on a legacy channel: they are decoded with the v1
/// schema and every successful outcome collapses to the legacy `V1Result`
/// acknowledgement
pub fn handle_slash_packet_recv(
    mut deps: DepsMut<ProviderQuery>,
    env: Env,
    consumer: &Consumer,
    data: &SlashPacketData,
    v1: bool,
) -> Result<IbcReceiveResponse<ProviderMsg>, ContractError> {
    let params = PARAMS.load(deps.storage)?;
    validate_slash_packet(deps.storage, &params, consumer, data, v1)?;

    let infraction = infraction_from_wire(data.infraction, v1)?;
    let validator = data
        .validator
        .as_ref()
        .ok_or(ContractError::MissingPacketValidator {})?;
    let consumer_addr = ConsumerConsAddr::new(validator.address.clone().to_vec());
    let consumer_id = consumer.consumer_id.as_str();

    // On v1 channels every successful outcome is acked with the legacy result
    let ack = |result: PacketAckResult| -> PacketAckResult {
        if v1 {
            PacketAckResult::V1
        } else {
            result
        }
    };

    // Packets of stopped (or otherwise not launched) consumers drain as no-ops
    if consumer.phase != ConsumerPhase::Launched {
        return Ok(noop_response(
            ack(PacketAckResult::SlashHandled),
            consumer_id,
            "consumer_not_launched",
        ));
    }

    // Resolve the consumer consensus address to a provider validator. An
    // unknown validator is a no-op, not an error
    let provider_addr = match keymap::provider_addr_for(deps.storage, consumer_id, &consumer_addr)?
    {
        Some(addr) => addr,
        None => {
            return Ok(noop_response(
                ack(PacketAckResult::SlashHandled),
                consumer_id,
                "unknown_validator",
            ))
        }
    };

    // Tombstoned validators cannot be further slashed or unjailed
    let signing_info = query_signing_info(&deps.querier, provider_addr.to_hex())?;
    if signing_info.tombstoned {
        return Ok(noop_response(
            ack(PacketAckResult::SlashHandled),
            consumer_id,
            "tombstoned",
        ));
    }

    match infraction {
        Infraction::DoubleSign => {
            let infraction_height =
                infraction_height(deps.storage, consumer_id, data.valset_update_id)?;
            let (msgs, events) = slash_for_double_sign(
                &mut deps,
                consumer_id,
                &provider_addr,
                &consumer_addr,
                data.valset_update_id,
                infraction_height,
            )?;
            Ok(
                IbcReceiveResponse::new(ack(PacketAckResult::SlashHandled).to_ack())
                    .add_messages(msgs)
                    .add_events(events),
            )
        }
        Infraction::Downtime => {
            // Downtime reports for validators outside the consumer's set are
            // no-ops; the validator was already removed
            if !is_consumer_validator(deps.storage, consumer_id, &provider_addr) {
                return Ok(noop_response(
                    ack(PacketAckResult::SlashHandled),
                    consumer_id,
                    "not_consumer_validator",
                ));
            }
            // Downtime reports are not attributable evidence, so they are
            // metered; an exhausted meter bounces the packet back for a
            // later retry instead of dropping it
            if throttle::is_exhausted(deps.storage)? {
                throttle_state::push_bounced(
                    deps.storage,
                    ThrottleQueueEntry {
                        consumer_id: consumer_id.to_string(),
                        consumer_cons_addr: consumer_addr.to_hex(),
                        vsc_id: data.valset_update_id,
                    },
                )?;
                return Ok(
                    IbcReceiveResponse::new(ack(PacketAckResult::SlashBounced).to_ack())
                        .add_event(
                            Event::new("slash_packet_bounced")
                                .add_attribute("module", "provider")
                                .add_attribute("consumer_id", consumer_id)
                                .add_attribute("consumer_cons_addr", consumer_addr.to_hex()),
                        ),
                );
            }
            let (msgs, events) = slash_for_downtime(
                &mut deps,
                &env,
                consumer_id,
                &provider_addr,
                &consumer_addr,
                data.valset_update_id,
            )?;
            throttle_state::remove_bounced(deps.storage, consumer_id, &consumer_addr.to_hex())?;
            Ok(
                IbcReceiveResponse::new(ack(PacketAckResult::SlashHandled).to_ack())
                    .add_messages(msgs)
                    .add_events(events),
            )
        }
        Infraction::Unspecified => Err(ContractError::UnspecifiedInfraction {}),
    }
}

/// Validates a slash packet. Fails with a typed error and no state mutation;
/// the IBC boundary converts the error into an error acknowledgement
pub fn validate_slash_packet(
    storage: &dyn cosmwasm_std::Storage,
    params: &Params,
    consumer: &Consumer,
    data: &SlashPacketData,
    v1: bool,
) -> Result<(), ContractError> {
    let validator = data
        .validator
        .as_ref()
        .ok_or(ContractError::MissingPacketValidator {})?;
    if validator.address.len() != params.cons_addr_length as usize {
        return Err(ContractError::InvalidPacketAddressLength(
            validator.address.len(),
            params.cons_addr_length as usize,
        ));
    }
    if validator.power <= 0 {
        return Err(ContractError::InvalidPacketPower(validator.power));
    }
    if infraction_from_wire(data.infraction, v1)? == Infraction::Unspecified {
        return Err(ContractError::UnspecifiedInfraction {});
    }

    if data.valset_update_id == 0 {
        // A zero id means "use the consumer's init chain height"; it is only
        // valid while the consumer has not matured any VSC yet
        if !INIT_CHAIN_HEIGHT.has(storage, &consumer.consumer_id) {
            return Err(ContractError::NoInitChainHeight(
                consumer.consumer_id.clone(),
            ));
        }
        if LAST_MATURED_VSC.has(storage, &consumer.consumer_id) {
            return Err(ContractError::InitialWindowClosed(
                consumer.consumer_id.clone(),
            ));
        }
    } else if vsc::get_vsc_height(storage, data.valset_update_id)?.is_none() {
        return Err(ContractError::UnknownVscId(data.valset_update_id));
    }
    Ok(())
}

/// Translates a wire-level infraction tag into the domain enum. Legacy ("v1")
/// packets carry the numerically identical but semantically separate
/// `InfractionType` tags
fn infraction_from_wire(raw: i32, v1: bool) -> Result<Infraction, ContractError> {
    if v1 {
        match WireInfractionType::try_from(raw) {
            Ok(WireInfractionType::Empty) => Ok(Infraction::Unspecified),
            Ok(WireInfractionType::DoubleSign) => Ok(Infraction::DoubleSign),
            Ok(WireInfractionType::Downtime) => Ok(Infraction::Downtime),
            Err(_) => Err(ContractError::UnspecifiedInfraction {}),
        }
    } else {
        match WireInfraction::try_from(raw) {
            Ok(WireInfraction::Unspecified) => Ok(Infraction::Unspecified),
            Ok(WireInfraction::DoubleSign) => Ok(Infraction::DoubleSign),
            Ok(WireInfraction::Downtime) => Ok(Infraction::Downtime),
            Err(_) => Err(ContractError::UnspecifiedInfraction {}),
        }
    }
}

/// Resolves the provider block height at which an infraction happened: the
/// emission height of the named VSC, or the consumer's init chain height for
/// the zero id
pub(crate) fn infraction_height(
    storage: &dyn cosmwasm_std::Storage,
    consumer_id: &str,
    vsc_id: u64,
) -> Result<u64, ContractError> {
    if vsc_id == 0 {
        INIT_CHAIN_HEIGHT
            .may_load(storage, consumer_id)?
            .ok_or_else(|| ContractError::NoInitChainHeight(consumer_id.to_string()))
    } else {
        vsc::get_vsc_height(storage, vsc_id)?.ok_or(ContractError::UnknownVscId(vsc_id))
    }
}

/// Applies a downtime infraction: jail and schedule unjail, subtract the
/// validator's pre-jail power from the slash meter, and queue a slash
/// acknowledgement for the originating consumer. Tokens are not touched
fn slash_for_downtime(
    deps: &mut DepsMut<ProviderQuery>,
    env: &Env,
    consumer_id: &str,
    provider_addr: &ProviderConsAddr,
    consumer_addr: &ConsumerConsAddr,
    vsc_id: u64,
) -> Result<(Vec<CosmosMsg<ProviderMsg>>, Vec<Event>), ContractError> {
    let mut msgs: Vec<CosmosMsg<ProviderMsg>> = vec![];
    let mut events = vec![];

    match query_validator_by_cons_addr(&deps.querier, provider_addr.to_hex())? {
        None => {
            events.push(noop_event(consumer_id, "validator_not_found"));
        }
        Some(validator) => {
            if validator.jailed {
                events.push(noop_event(consumer_id, "already_jailed"));
            } else {
                let params = PARAMS.load(deps.storage)?;
                msgs.push(
                    ProviderMsg::Jail {
                        cons_addr: provider_addr.to_hex(),
                    }
                    .into(),
                );
                msgs.push(
                    ProviderMsg::JailUntil {
                        cons_addr: provider_addr.to_hex(),
                        until: env
                            .block
                            .time
                            .plus_seconds(params.downtime_jail_duration_seconds),
                    }
                    .into(),
                );
                let meter = throttle::deduct(deps.storage, validator.power)?;
                events.push(
                    slash_event(
                        consumer_id,
                        provider_addr,
                        Infraction::Downtime,
                        vsc_id,
                        validator.power,
                        Uint128::zero(),
                    )
                    .add_attribute("slash_meter", meter.to_string()),
                );
            }
            // The ack rides along with the next VSC so the consumer clears
            // its outstanding-downtime flag
            vsc::append_slash_ack(deps.storage, consumer_id, consumer_addr.to_hex())?;
        }
    }
    Ok((msgs, events))
}

/// Applies a double-signing infraction: slash bonded tokens by the configured
/// fraction at the infraction height, jail forever and tombstone. Idempotent
/// with respect to tombstoning: a second application is a no-op, not an error
pub(crate) fn slash_for_double_sign(
    deps: &mut DepsMut<ProviderQuery>,
    consumer_id: &str,
    provider_addr: &ProviderConsAddr,
    consumer_addr: &ConsumerConsAddr,
    vsc_id: u64,
    infraction_height: u64,
) -> Result<(Vec<CosmosMsg<ProviderMsg>>, Vec<Event>), ContractError> {
    let signing_info = query_signing_info(&deps.querier, provider_addr.to_hex())?;
    if signing_info.tombstoned {
        return Ok((vec![], vec![noop_event(consumer_id, "tombstoned")]));
    }
    let validator = match query_validator_by_cons_addr(&deps.querier, provider_addr.to_hex())? {
        Some(validator) => validator,
        None => return Ok((vec![], vec![noop_event(consumer_id, "validator_not_found")])),
    };

    let params = PARAMS.load(deps.storage)?;
    let tokens_slashed = validator.tokens.mul_floor(params.double_sign_slash_fraction);

    let mut msgs: Vec<CosmosMsg<ProviderMsg>> = vec![ProviderMsg::Slash {
        cons_addr: provider_addr.to_hex(),
        infraction_height,
        power: validator.power,
        slash_fraction: params.double_sign_slash_fraction,
    }
    .into()];
    if !validator.jailed {
        msgs.push(
            ProviderMsg::Jail {
                cons_addr: provider_addr.to_hex(),
            }
            .into(),
        );
    }
    msgs.push(
        ProviderMsg::JailUntil {
            cons_addr: provider_addr.to_hex(),
            until: DOUBLE_SIGN_JAIL_END_TIME,
        }
        .into(),
    );
    msgs.push(
        ProviderMsg::Tombstone {
            cons_addr: provider_addr.to_hex(),
        }
        .into(),
    );

    vsc::append_slash_ack(deps.storage, consumer_id, consumer_addr.to_hex())?;

    let events = vec![slash_event(
        consumer_id,
        provider_addr,
        Infraction::DoubleSign,
        vsc_id,
        validator.power,
        tokens_slashed,
    )];
    Ok((msgs, events))
}

fn slash_event(
    consumer_id: &str,
    provider_addr: &ProviderConsAddr,
    infraction: Infraction,
    vsc_id: u64,
    power: i64,
    tokens_slashed: Uint128,
) -> Event {
    Event::new("slash")
        .add_attribute("module", "provider")
        .add_attribute("consumer_id", consumer_id)
        .add_attribute("provider_cons_addr", provider_addr.to_hex())
        .add_attribute("infraction", infraction.label())
        .add_attribute("vsc_id", vsc_id.to_string())
        .add_attribute("power", power.to_string())
        .add_attribute("tokens_slashed", tokens_slashed.to_string())
}

fn noop_event(consumer_id: &str, reason: &str) -> Event {
    Event::new("slash_packet_noop")
        .add_attribute("module", "provider")
        .add_attribute("consumer_id", consumer_id)
        .add_attribute("reason", reason.to_string())
}

fn noop_response(
    ack: PacketAckResult,
    consumer_id: &str,
    reason: &str,
) -> IbcReceiveResponse<ProviderMsg> {
    IbcReceiveResponse::new(ack.to_ack()).add_event(noop_event(consumer_id, reason))
}
