use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Order, StdResult, Storage};
use cw_storage_plus::{Item, Map};

use ccv_apis::provider_api::ProviderConsAddr;

use crate::error::ContractError;

pub(crate) const NEXT_CONSUMER_ID: Item<u64> = Item::new("next_consumer_id");
/// Consumer chain registry, by consumer id
pub(crate) const CONSUMERS: Map<&str, Consumer> = Map::new("consumers");
/// Reverse lookup from an established CCV channel to its consumer id
pub(crate) const CHANNEL_TO_CONSUMER: Map<&str, String> = Map::new("channel_to_consumer");
/// Provider block height recorded when the consumer launched
pub(crate) const INIT_CHAIN_HEIGHT: Map<&str, u64> = Map::new("init_chain_height");
/// Minimum height of evidence accepted in misbehaviour submissions
pub(crate) const EQUIVOCATION_MIN_HEIGHT: Map<&str, u64> = Map::new("equivocation_min_height");
/// Highest valset update id each consumer has reported as matured
pub(crate) const LAST_MATURED_VSC: Map<&str, u64> = Map::new("last_matured_vsc");
/// Validators currently part of a consumer chain's validator set, by
/// (consumer id, provider consensus address), with the power last sent
pub(crate) const CONSUMER_VALIDATORS: Map<(&str, &[u8]), i64> = Map::new("consumer_validators");

/// `ConsumerPhase` is the lifecycle phase of a consumer chain. Only `Launched`
/// consumers receive validator set changes and may affect the validator set
/// through slash packets
#[cw_serde]
#[derive(Copy)]
pub enum ConsumerPhase {
    Registered,
    Initialized,
    Launched,
    Stopped,
    Deleted,
}

impl ConsumerPhase {
    pub fn label(&self) -> &'static str {
        match self {
            ConsumerPhase::Registered => "registered",
            ConsumerPhase::Initialized => "initialized",
            ConsumerPhase::Launched => "launched",
            ConsumerPhase::Stopped => "stopped",
            ConsumerPhase::Deleted => "deleted",
        }
    }
}

/// `Consumer` is the registry record of a consumer chain
#[cw_serde]
pub struct Consumer {
    pub consumer_id: String,
    /// `chain_id` is the chain id the consumer runs under; misbehaviour
    /// headers are checked against it
    pub chain_id: String,
    pub phase: ConsumerPhase,
    /// `client_id` is the IBC client tracking the consumer, set at
    /// initialization
    pub client_id: Option<String>,
    /// `connection_id` is the IBC connection the CCV channel is expected to be
    /// built on, set at initialization
    pub connection_id: Option<String>,
    /// `channel_id` is the established CCV channel, set at launch
    pub channel_id: Option<String>,
    /// `channel_version` is the CCV wire version negotiated on the channel
    /// ("1" legacy, "2" current), set at launch
    pub channel_version: Option<String>,
}

/// Allocates the next consumer id
pub fn next_consumer_id(storage: &mut dyn Storage) -> StdResult<String> {
    let next = NEXT_CONSUMER_ID.may_load(storage)?.unwrap_or_default();
    NEXT_CONSUMER_ID.save(storage, &(next + 1))?;
    Ok(next.to_string())
}

pub fn get_consumer(storage: &dyn Storage, consumer_id: &str) -> Result<Consumer, ContractError> {
    CONSUMERS
        .may_load(storage, consumer_id)?
        .ok_or_else(|| ContractError::UnknownConsumer(consumer_id.to_string()))
}

pub fn consumer_for_channel(
    storage: &dyn Storage,
    channel_id: &str,
) -> Result<Consumer, ContractError> {
    let consumer_id = CHANNEL_TO_CONSUMER
        .may_load(storage, channel_id)?
        .ok_or_else(|| ContractError::UnknownChannel(channel_id.to_string()))?;
    get_consumer(storage, &consumer_id)
}

/// Looks the registry up by IBC client id. The registry is small; a linear
/// scan is fine
pub fn consumer_for_client(storage: &dyn Storage, client_id: &str) -> StdResult<Option<Consumer>> {
    for item in CONSUMERS.range(storage, None, None, Order::Ascending) {
        let (_, consumer) = item?;
        if consumer.client_id.as_deref() == Some(client_id) {
            return Ok(Some(consumer));
        }
    }
    Ok(None)
}

/// Looks the registry up by IBC connection id, restricted to consumers
/// awaiting their channel
pub fn consumer_for_connection(
    storage: &dyn Storage,
    connection_id: &str,
) -> StdResult<Option<Consumer>> {
    for item in CONSUMERS.range(storage, None, None, Order::Ascending) {
        let (_, consumer) = item?;
        if consumer.phase == ConsumerPhase::Initialized
            && consumer.connection_id.as_deref() == Some(connection_id)
        {
            return Ok(Some(consumer));
        }
    }
    Ok(None)
}

pub fn launched_consumers(storage: &dyn Storage) -> StdResult<Vec<Consumer>> {
    CONSUMERS
        .range(storage, None, None, Order::Ascending)
        .filter_map(|item| match item {
            Ok((_, consumer)) if consumer.phase == ConsumerPhase::Launched => Some(Ok(consumer)),
            Ok(_) => None,
            Err(err) => Some(Err(err)),
        })
        .collect()
}

pub fn is_consumer_validator(
    storage: &dyn Storage,
    consumer_id: &str,
    provider_addr: &ProviderConsAddr,
) -> bool {
    CONSUMER_VALIDATORS.has(storage, (consumer_id, provider_addr.as_slice()))
}

pub fn set_consumer_validator(
    storage: &mut dyn Storage,
    consumer_id: &str,
    provider_addr: &ProviderConsAddr,
    power: i64,
) -> StdResult<()> {
    if power > 0 {
        CONSUMER_VALIDATORS.save(storage, (consumer_id, provider_addr.as_slice()), &power)
    } else {
        CONSUMER_VALIDATORS.remove(storage, (consumer_id, provider_addr.as_slice()));
        Ok(())
    }
}

pub fn consumer_validators(
    storage: &dyn Storage,
    consumer_id: &str,
) -> StdResult<Vec<(Vec<u8>, i64)>> {
    CONSUMER_VALIDATORS
        .prefix(consumer_id)
        .range(storage, None, None, Order::Ascending)
        .collect()
}

/// Removes all per-consumer state except the registry record itself
pub fn prune_consumer(storage: &mut dyn Storage, consumer_id: &str) -> StdResult<()> {
    let keys = CONSUMER_VALIDATORS
        .prefix(consumer_id)
        .keys(storage, None, None, Order::Ascending)
        .collect::<StdResult<Vec<_>>>()?;
    for key in keys {
        CONSUMER_VALIDATORS.remove(storage, (consumer_id, key.as_slice()));
    }
    INIT_CHAIN_HEIGHT.remove(storage, consumer_id);
    EQUIVOCATION_MIN_HEIGHT.remove(storage, consumer_id);
    LAST_MATURED_VSC.remove(storage, consumer_id);
    Ok(())
}
