use cosmwasm_std::{
    to_json_binary, Binary, Deps, DepsMut, Env, Event, MessageInfo, QueryResponse, Response,
};
use cw2::set_contract_version;
use cw_utils::{maybe_addr, nonpayable};

use ccv_apis::provider_api::{ProviderConsAddr, SudoMsg};
use ccv_bindings::{ProviderMsg, ProviderQuery};

use crate::error::ContractError;
use crate::msg::{ExecuteMsg, InstantiateMsg, QueryMsg};
use crate::state::config::{Params, ADMIN, PARAMS};
use crate::state::consumers::{
    consumer_for_client, get_consumer, next_consumer_id, Consumer, ConsumerPhase,
    CHANNEL_TO_CONSUMER, CONSUMERS, EQUIVOCATION_MIN_HEIGHT, NEXT_CONSUMER_ID,
};
use crate::state::{consumers, keymap, vsc};
use crate::{misbehaviour, queries, throttle, valset};
use cosmwasm_std::Order;

pub const CONTRACT_NAME: &str = env!("CARGO_PKG_NAME");
pub const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn instantiate(
    mut deps: DepsMut<ProviderQuery>,
    env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response<ProviderMsg>, ContractError> {
    nonpayable(&info)?;
    let params = msg.params.unwrap_or_default();
    params.validate()?;
    PARAMS.save(deps.storage, &params)?;

    let api = deps.api;
    ADMIN.set(deps.branch(), maybe_addr(api, msg.admin)?)?;

    // initialize storage, so no issue when reading for the first time
    NEXT_CONSUMER_ID.save(deps.storage, &0)?;
    vsc::LAST_VSC_ID.save(deps.storage, &0)?;
    vsc::PENDING_UPDATES.save(deps.storage, &vec![])?;
    // The slash meter starts full
    throttle::initialize(deps.branch(), &env)?;

    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    Ok(Response::new().add_attribute("action", "instantiate"))
}

pub fn execute(
    deps: DepsMut<ProviderQuery>,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response<ProviderMsg>, ContractError> {
    let api = deps.api;
    match msg {
        ExecuteMsg::UpdateAdmin { admin } => ADMIN
            .execute_update_admin(deps, info, maybe_addr(api, admin)?)
            .map_err(Into::into),
        ExecuteMsg::UpdateParams { params } => handle_update_params(deps, info, params),
        ExecuteMsg::RegisterConsumer { chain_id } => handle_register_consumer(deps, info, chain_id),
        ExecuteMsg::InitializeConsumer {
            consumer_id,
            client_id,
            connection_id,
        } => handle_initialize_consumer(deps, info, consumer_id, client_id, connection_id),
        ExecuteMsg::StopConsumer { consumer_id } => handle_stop_consumer(deps, info, consumer_id),
        ExecuteMsg::DeleteConsumer { consumer_id } => {
            handle_delete_consumer(deps, info, consumer_id)
        }
        ExecuteMsg::AssignConsumerKey {
            consumer_id,
            provider_cons_addr,
            consumer_pub_key,
        } => handle_assign_consumer_key(deps, info, consumer_id, provider_cons_addr, consumer_pub_key),
        ExecuteMsg::SetEquivocationEvidenceMinHeight {
            consumer_id,
            min_height,
        } => handle_set_equivocation_min_height(deps, info, consumer_id, min_height),
        // Evidence submission is permissionless; invalid evidence is rejected
        // without state change
        ExecuteMsg::SubmitConsumerMisbehaviour { misbehaviour } => {
            misbehaviour::handle_consumer_misbehaviour(deps, env, &misbehaviour)
        }
    }
}

fn handle_update_params(
    deps: DepsMut<ProviderQuery>,
    info: MessageInfo,
    params: Params,
) -> Result<Response<ProviderMsg>, ContractError> {
    ADMIN.assert_admin(deps.as_ref(), &info.sender)?;
    params.validate()?;
    PARAMS.save(deps.storage, &params)?;
    Ok(Response::new()
        .add_attribute("action", "update_params")
        .add_attribute("sender", info.sender))
}

fn handle_register_consumer(
    deps: DepsMut<ProviderQuery>,
    info: MessageInfo,
    chain_id: String,
) -> Result<Response<ProviderMsg>, ContractError> {
    ADMIN.assert_admin(deps.as_ref(), &info.sender)?;
    if chain_id.trim().is_empty() {
        return Err(ContractError::InvalidConfig {
            msg: "chain_id cannot be empty".to_string(),
        });
    }
    // A chain id can only be re-registered once its previous registration is
    // deleted
    for item in CONSUMERS.range(deps.storage, None, None, Order::Ascending) {
        let (_, existing) = item?;
        if existing.chain_id == chain_id && existing.phase != ConsumerPhase::Deleted {
            return Err(ContractError::ConsumerAlreadyExists(chain_id));
        }
    }

    let consumer_id = next_consumer_id(deps.storage)?;
    let consumer = Consumer {
        consumer_id: consumer_id.clone(),
        chain_id: chain_id.clone(),
        phase: ConsumerPhase::Registered,
        client_id: None,
        connection_id: None,
        channel_id: None,
        channel_version: None,
    };
    CONSUMERS.save(deps.storage, &consumer_id, &consumer)?;

    Ok(Response::new()
        .add_attribute("action", "register_consumer")
        .add_event(
            Event::new("register_consumer")
                .add_attribute("module", "provider")
                .add_attribute("consumer_id", consumer_id)
                .add_attribute("chain_id", chain_id),
        ))
}

fn handle_initialize_consumer(
    deps: DepsMut<ProviderQuery>,
    info: MessageInfo,
    consumer_id: String,
    client_id: String,
    connection_id: String,
) -> Result<Response<ProviderMsg>, ContractError> {
    ADMIN.assert_admin(deps.as_ref(), &info.sender)?;
    let mut consumer = get_consumer(deps.storage, &consumer_id)?;
    if !matches!(
        consumer.phase,
        ConsumerPhase::Registered | ConsumerPhase::Initialized
    ) {
        return Err(ContractError::InvalidConsumerPhase {
            consumer_id,
            phase: consumer.phase.label().to_string(),
            expected: ConsumerPhase::Registered.label().to_string(),
        });
    }
    if let Some(existing) = consumer_for_client(deps.storage, &client_id)? {
        if existing.consumer_id != consumer_id {
            return Err(ContractError::InvalidConfig {
                msg: format!("client {client_id} already tracks consumer {}", existing.consumer_id),
            });
        }
    }

    consumer.client_id = Some(client_id.clone());
    consumer.connection_id = Some(connection_id.clone());
    consumer.phase = ConsumerPhase::Initialized;
    CONSUMERS.save(deps.storage, &consumer_id, &consumer)?;

    Ok(Response::new()
        .add_attribute("action", "initialize_consumer")
        .add_event(
            Event::new("initialize_consumer")
                .add_attribute("module", "provider")
                .add_attribute("consumer_id", consumer_id)
                .add_attribute("client_id", client_id)
                .add_attribute("connection_id", connection_id),
        ))
}

fn handle_stop_consumer(
    deps: DepsMut<ProviderQuery>,
    info: MessageInfo,
    consumer_id: String,
) -> Result<Response<ProviderMsg>, ContractError> {
    ADMIN.assert_admin(deps.as_ref(), &info.sender)?;
    let mut consumer = get_consumer(deps.storage, &consumer_id)?;
    if matches!(
        consumer.phase,
        ConsumerPhase::Stopped | ConsumerPhase::Deleted
    ) {
        return Err(ContractError::InvalidConsumerPhase {
            consumer_id,
            phase: consumer.phase.label().to_string(),
            expected: ConsumerPhase::Launched.label().to_string(),
        });
    }

    // The channel binding stays: packets still in flight drain as no-ops
    // until the channel itself goes away
    consumer.phase = ConsumerPhase::Stopped;
    CONSUMERS.save(deps.storage, &consumer_id, &consumer)?;

    Ok(Response::new()
        .add_attribute("action", "stop_consumer")
        .add_event(
            Event::new("consumer_stopped")
                .add_attribute("module", "provider")
                .add_attribute("consumer_id", consumer_id)
                .add_attribute("reason", "stopped_by_admin"),
        ))
}

fn handle_delete_consumer(
    deps: DepsMut<ProviderQuery>,
    info: MessageInfo,
    consumer_id: String,
) -> Result<Response<ProviderMsg>, ContractError> {
    ADMIN.assert_admin(deps.as_ref(), &info.sender)?;
    let mut consumer = get_consumer(deps.storage, &consumer_id)?;
    if consumer.phase != ConsumerPhase::Stopped {
        return Err(ContractError::InvalidConsumerPhase {
            consumer_id,
            phase: consumer.phase.label().to_string(),
            expected: ConsumerPhase::Stopped.label().to_string(),
        });
    }

    consumers::prune_consumer(deps.storage, &consumer_id)?;
    keymap::prune_consumer(deps.storage, &consumer_id)?;
    vsc::remove_slash_acks(deps.storage, &consumer_id);
    if let Some(channel_id) = consumer.channel_id.take() {
        CHANNEL_TO_CONSUMER.remove(deps.storage, &channel_id);
    }
    consumer.channel_version = None;
    consumer.phase = ConsumerPhase::Deleted;
    CONSUMERS.save(deps.storage, &consumer_id, &consumer)?;

    Ok(Response::new()
        .add_attribute("action", "delete_consumer")
        .add_event(
            Event::new("delete_consumer")
                .add_attribute("module", "provider")
                .add_attribute("consumer_id", consumer_id),
        ))
}

fn handle_assign_consumer_key(
    deps: DepsMut<ProviderQuery>,
    info: MessageInfo,
    consumer_id: String,
    provider_cons_addr: String,
    consumer_pub_key: Binary,
) -> Result<Response<ProviderMsg>, ContractError> {
    ADMIN.assert_admin(deps.as_ref(), &info.sender)?;
    let consumer = get_consumer(deps.storage, &consumer_id)?;
    if consumer.phase == ConsumerPhase::Deleted {
        return Err(ContractError::InvalidConsumerPhase {
            consumer_id,
            phase: consumer.phase.label().to_string(),
            expected: ConsumerPhase::Registered.label().to_string(),
        });
    }

    let provider_addr = ProviderConsAddr::from_hex(&provider_cons_addr)?;
    let consumer_addr =
        keymap::assign_consumer_key(deps.storage, &consumer_id, &provider_addr, &consumer_pub_key)?;

    Ok(Response::new()
        .add_attribute("action", "assign_consumer_key")
        .add_event(
            Event::new("assign_consumer_key")
                .add_attribute("module", "provider")
                .add_attribute("consumer_id", consumer_id)
                .add_attribute("provider_cons_addr", provider_addr.to_hex())
                .add_attribute("consumer_cons_addr", consumer_addr.to_hex()),
        ))
}

fn handle_set_equivocation_min_height(
    deps: DepsMut<ProviderQuery>,
    info: MessageInfo,
    consumer_id: String,
    min_height: u64,
) -> Result<Response<ProviderMsg>, ContractError> {
    ADMIN.assert_admin(deps.as_ref(), &info.sender)?;
    get_consumer(deps.storage, &consumer_id)?;
    EQUIVOCATION_MIN_HEIGHT.save(deps.storage, &consumer_id, &min_height)?;

    Ok(Response::new()
        .add_attribute("action", "set_equivocation_evidence_min_height")
        .add_attribute("consumer_id", consumer_id)
        .add_attribute("min_height", min_height.to_string()))
}

/// The chain calls SudoMsg::BeginBlock once per block (in BeginBlock), and
/// SudoMsg::EndBlock once per block (in EndBlock) after the staking module's
/// end-blocker, so dispatch always observes the block's finalized staking
/// updates
pub fn sudo(
    mut deps: DepsMut<ProviderQuery>,
    env: Env,
    msg: SudoMsg,
) -> Result<Response<ProviderMsg>, ContractError> {
    match msg {
        SudoMsg::BeginBlock {} => {
            let mut res = Response::new();
            if let Some(event) = throttle::replenish_if_due(&mut deps, &env)? {
                res = res.add_event(event);
            }
            Ok(res)
        }
        SudoMsg::EndBlock { validator_updates } => {
            valset::handle_end_block(deps, env, validator_updates)
        }
    }
}

pub fn query(
    deps: Deps<ProviderQuery>,
    _env: Env,
    msg: QueryMsg,
) -> Result<QueryResponse, ContractError> {
    match msg {
        QueryMsg::Params {} => Ok(to_json_binary(&queries::params(deps)?)?),
        QueryMsg::Admin {} => to_json_binary(&ADMIN.query_admin(deps)?).map_err(Into::into),
        QueryMsg::Consumer { consumer_id } => {
            Ok(to_json_binary(&queries::consumer(deps, &consumer_id)?)?)
        }
        QueryMsg::Consumers { start_after, limit } => Ok(to_json_binary(&queries::consumers(
            deps,
            start_after,
            limit,
        )?)?),
        QueryMsg::KeyAssignment {
            consumer_id,
            provider_cons_addr,
        } => Ok(to_json_binary(&queries::key_assignment(
            deps,
            &consumer_id,
            &provider_cons_addr,
        )?)?),
        QueryMsg::ProviderAddr {
            consumer_id,
            consumer_cons_addr,
        } => Ok(to_json_binary(&queries::provider_addr(
            deps,
            &consumer_id,
            &consumer_cons_addr,
        )?)?),
        QueryMsg::ConsumerValidators { consumer_id } => Ok(to_json_binary(
            &queries::consumer_validators(deps, &consumer_id)?,
        )?),
        QueryMsg::ValsetUpdateId {} => Ok(to_json_binary(&queries::valset_update_id(deps)?)?),
        QueryMsg::VscHeight { vsc_id } => Ok(to_json_binary(&queries::vsc_height(deps, vsc_id)?)?),
        QueryMsg::SlashMeter {} => Ok(to_json_binary(&queries::slash_meter(deps)?)?),
        QueryMsg::SlashAcks { consumer_id } => {
            Ok(to_json_binary(&queries::slash_acks(deps, &consumer_id)?)?)
        }
        QueryMsg::ThrottleQueue {} => Ok(to_json_binary(&queries::throttle_queue(deps)?)?),
        QueryMsg::PendingValidatorUpdates {} => {
            Ok(to_json_binary(&queries::pending_validator_updates(deps)?)?)
        }
    }
}
