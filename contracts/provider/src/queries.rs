use cosmwasm_std::{Deps, Order, StdResult};
use cw_storage_plus::Bound;

use ccv_apis::provider_api::{ConsumerConsAddr, ProviderConsAddr};
use ccv_bindings::ProviderQuery;

use crate::error::ContractError;
use crate::msg::{
    ConsumerResponse, ConsumerValidatorInfo, ConsumerValidatorsResponse, ConsumersResponse,
    KeyAssignmentResponse, PendingValidatorUpdatesResponse, ProviderAddrResponse,
    SlashAcksResponse, SlashMeterResponse, ThrottleQueueResponse, ValsetUpdateIdResponse,
    VscHeightResponse,
};
use crate::state::config::{Params, PARAMS};
use crate::state::consumers::{
    consumer_validators as stored_consumer_validators, get_consumer, CONSUMERS, EQUIVOCATION_MIN_HEIGHT,
    INIT_CHAIN_HEIGHT, LAST_MATURED_VSC,
};
use crate::state::throttle::{LAST_REPLENISH, SLASH_METER};
use crate::state::{keymap, throttle as throttle_state, vsc};
use crate::throttle;

// Settings for pagination
const MAX_LIMIT: u32 = 30;
const DEFAULT_LIMIT: u32 = 10;

pub fn params(deps: Deps<ProviderQuery>) -> StdResult<Params> {
    PARAMS.load(deps.storage)
}

pub fn consumer(
    deps: Deps<ProviderQuery>,
    consumer_id: &str,
) -> Result<ConsumerResponse, ContractError> {
    let consumer = get_consumer(deps.storage, consumer_id)?;
    Ok(ConsumerResponse {
        init_chain_height: INIT_CHAIN_HEIGHT.may_load(deps.storage, consumer_id)?,
        equivocation_evidence_min_height: EQUIVOCATION_MIN_HEIGHT
            .may_load(deps.storage, consumer_id)?,
        last_matured_vsc_id: LAST_MATURED_VSC.may_load(deps.storage, consumer_id)?,
        consumer,
    })
}

pub fn consumers(
    deps: Deps<ProviderQuery>,
    start_after: Option<String>,
    limit: Option<u32>,
) -> StdResult<ConsumersResponse> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.as_deref().map(Bound::exclusive);
    let consumers = CONSUMERS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| item.map(|(_, consumer)| consumer))
        .collect::<StdResult<Vec<_>>>()?;
    Ok(ConsumersResponse { consumers })
}

pub fn key_assignment(
    deps: Deps<ProviderQuery>,
    consumer_id: &str,
    provider_cons_addr: &str,
) -> Result<KeyAssignmentResponse, ContractError> {
    let provider_addr = ProviderConsAddr::from_hex(provider_cons_addr)?;
    let consumer_pub_key = keymap::consumer_key_for(deps.storage, consumer_id, &provider_addr)?;
    let consumer_cons_addr = keymap::consumer_addr_for(deps.storage, consumer_id, &provider_addr)?
        .map(|addr| addr.to_hex());
    Ok(KeyAssignmentResponse {
        consumer_pub_key,
        consumer_cons_addr,
    })
}

pub fn provider_addr(
    deps: Deps<ProviderQuery>,
    consumer_id: &str,
    consumer_cons_addr: &str,
) -> Result<ProviderAddrResponse, ContractError> {
    let consumer_addr = ConsumerConsAddr::from_hex(consumer_cons_addr)?;
    let provider_cons_addr = keymap::provider_addr_for(deps.storage, consumer_id, &consumer_addr)?
        .map(|addr| addr.to_hex());
    Ok(ProviderAddrResponse { provider_cons_addr })
}

pub fn consumer_validators(
    deps: Deps<ProviderQuery>,
    consumer_id: &str,
) -> StdResult<ConsumerValidatorsResponse> {
    let validators = stored_consumer_validators(deps.storage, consumer_id)?
        .into_iter()
        .map(|(addr, power)| ConsumerValidatorInfo {
            provider_cons_addr: hex::encode(addr),
            power,
        })
        .collect();
    Ok(ConsumerValidatorsResponse { validators })
}

pub fn valset_update_id(deps: Deps<ProviderQuery>) -> StdResult<ValsetUpdateIdResponse> {
    Ok(ValsetUpdateIdResponse {
        vsc_id: vsc::last_vsc_id(deps.storage)?,
    })
}

pub fn vsc_height(deps: Deps<ProviderQuery>, vsc_id: u64) -> StdResult<VscHeightResponse> {
    Ok(VscHeightResponse {
        height: vsc::get_vsc_height(deps.storage, vsc_id)?,
    })
}

pub fn slash_meter(deps: Deps<ProviderQuery>) -> Result<SlashMeterResponse, ContractError> {
    let params = PARAMS.load(deps.storage)?;
    Ok(SlashMeterResponse {
        value: SLASH_METER.load(deps.storage)?,
        allowance: throttle::slash_meter_allowance(&deps.querier, &params)?,
        last_replenish: LAST_REPLENISH.load(deps.storage)?,
    })
}

pub fn slash_acks(deps: Deps<ProviderQuery>, consumer_id: &str) -> StdResult<SlashAcksResponse> {
    Ok(SlashAcksResponse {
        acks: vsc::get_slash_acks(deps.storage, consumer_id)?,
    })
}

pub fn throttle_queue(deps: Deps<ProviderQuery>) -> StdResult<ThrottleQueueResponse> {
    Ok(ThrottleQueueResponse {
        entries: throttle_state::queue_entries(deps.storage)?,
    })
}

pub fn pending_validator_updates(
    deps: Deps<ProviderQuery>,
) -> StdResult<PendingValidatorUpdatesResponse> {
    Ok(PendingValidatorUpdatesResponse {
        updates: vsc::pending_updates(deps.storage)?,
    })
}
