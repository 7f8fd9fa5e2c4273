use cosmwasm_std::{Binary, Order, StdResult, Storage};
use cw_storage_plus::Map;

use ccv_apis::provider_api::{ConsumerConsAddr, ProviderConsAddr};

use crate::error::ContractError;

/// Authoritative key mapping: (consumer id, consumer consensus address) to the
/// provider consensus address behind it. At most one provider address per key
/// at any time
pub(crate) const CONSUMER_TO_PROVIDER: Map<(&str, &[u8]), Binary> = Map::new("ckey_to_provider");
/// Reverse direction: (consumer id, provider consensus address) to the raw
/// ed25519 consumer public key the validator assigned, used when translating
/// validator set changes
pub(crate) const PROVIDER_TO_CONSUMER_KEY: Map<(&str, &[u8]), Binary> =
    Map::new("provider_to_ckey");

/// Records a consumer key assignment for a provider validator. Re-assigning
/// replaces the validator's previous key; assigning a key whose consensus
/// address is already taken by another validator is an error
pub fn assign_consumer_key(
    storage: &mut dyn Storage,
    consumer_id: &str,
    provider_addr: &ProviderConsAddr,
    consumer_pub_key: &Binary,
) -> Result<ConsumerConsAddr, ContractError> {
    let consumer_addr = ConsumerConsAddr::from_pubkey(consumer_pub_key)?;

    if let Some(existing) =
        CONSUMER_TO_PROVIDER.may_load(storage, (consumer_id, consumer_addr.as_slice()))?
    {
        if existing.as_slice() != provider_addr.as_slice() {
            return Err(ContractError::ConsumerKeyInUse(consumer_addr.to_hex()));
        }
    }

    // Drop the reverse entry of a previously assigned key
    if let Some(old_key) =
        PROVIDER_TO_CONSUMER_KEY.may_load(storage, (consumer_id, provider_addr.as_slice()))?
    {
        let old_addr = ConsumerConsAddr::from_pubkey(&old_key)?;
        CONSUMER_TO_PROVIDER.remove(storage, (consumer_id, old_addr.as_slice()));
    }

    CONSUMER_TO_PROVIDER.save(
        storage,
        (consumer_id, consumer_addr.as_slice()),
        &Binary::new(provider_addr.as_slice().to_vec()),
    )?;
    PROVIDER_TO_CONSUMER_KEY.save(
        storage,
        (consumer_id, provider_addr.as_slice()),
        consumer_pub_key,
    )?;
    Ok(consumer_addr)
}

pub fn provider_addr_for(
    storage: &dyn Storage,
    consumer_id: &str,
    consumer_addr: &ConsumerConsAddr,
) -> StdResult<Option<ProviderConsAddr>> {
    Ok(CONSUMER_TO_PROVIDER
        .may_load(storage, (consumer_id, consumer_addr.as_slice()))?
        .map(ProviderConsAddr::new))
}

pub fn consumer_key_for(
    storage: &dyn Storage,
    consumer_id: &str,
    provider_addr: &ProviderConsAddr,
) -> StdResult<Option<Binary>> {
    PROVIDER_TO_CONSUMER_KEY.may_load(storage, (consumer_id, provider_addr.as_slice()))
}

/// Returns the consumer consensus address of a provider validator on the given
/// consumer chain, if it has assigned a key there
pub fn consumer_addr_for(
    storage: &dyn Storage,
    consumer_id: &str,
    provider_addr: &ProviderConsAddr,
) -> Result<Option<ConsumerConsAddr>, ContractError> {
    consumer_key_for(storage, consumer_id, provider_addr)?
        .map(|key| ConsumerConsAddr::from_pubkey(&key).map_err(Into::into))
        .transpose()
}

/// Removes all key assignments of a consumer chain
pub fn prune_consumer(storage: &mut dyn Storage, consumer_id: &str) -> StdResult<()> {
    let keys = CONSUMER_TO_PROVIDER
        .prefix(consumer_id)
        .keys(storage, None, None, Order::Ascending)
        .collect::<StdResult<Vec<_>>>()?;
    for key in keys {
        CONSUMER_TO_PROVIDER.remove(storage, (consumer_id, key.as_slice()));
    }
    let keys = PROVIDER_TO_CONSUMER_KEY
        .prefix(consumer_id)
        .keys(storage, None, None, Order::Ascending)
        .collect::<StdResult<Vec<_>>>()?;
    for key in keys {
        PROVIDER_TO_CONSUMER_KEY.remove(storage, (consumer_id, key.as_slice()));
    }
    Ok(())
}
