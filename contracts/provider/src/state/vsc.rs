use cosmwasm_std::{Order, StdResult, Storage};
use cw_storage_plus::{Item, Map};

use ccv_apis::provider_api::ValidatorUpdate;

/// Id of the last emitted validator set change. Strictly increasing,
/// process-wide
pub(crate) const LAST_VSC_ID: Item<u64> = Item::new("last_vsc_id");
/// Provider block height each valset update id was emitted at. Entries live
/// until every launched consumer has matured past them; slash packets are
/// resolved against this map
pub(crate) const VSC_HEIGHT: Map<u64, u64> = Map::new("vsc_height");
/// Validator power updates accumulated since the last epoch boundary
pub(crate) const PENDING_UPDATES: Item<Vec<ValidatorUpdate>> = Item::new("pending_updates");
/// Slash acknowledgements pending delivery to each consumer with its next
/// validator set change, as hex-encoded consumer consensus addresses
pub(crate) const SLASH_ACKS: Map<&str, Vec<String>> = Map::new("slash_acks");

/// Allocates the next valset update id and records the height mapping for it.
/// Every emitted VSC has its height entry written at emit time
pub fn next_vsc_id(storage: &mut dyn Storage, height: u64) -> StdResult<u64> {
    let vsc_id = LAST_VSC_ID.may_load(storage)?.unwrap_or_default() + 1;
    LAST_VSC_ID.save(storage, &vsc_id)?;
    VSC_HEIGHT.save(storage, vsc_id, &height)?;
    Ok(vsc_id)
}

pub fn last_vsc_id(storage: &dyn Storage) -> StdResult<u64> {
    Ok(LAST_VSC_ID.may_load(storage)?.unwrap_or_default())
}

pub fn get_vsc_height(storage: &dyn Storage, vsc_id: u64) -> StdResult<Option<u64>> {
    VSC_HEIGHT.may_load(storage, vsc_id)
}

pub fn pending_updates(storage: &dyn Storage) -> StdResult<Vec<ValidatorUpdate>> {
    Ok(PENDING_UPDATES.may_load(storage)?.unwrap_or_default())
}

pub fn save_pending_updates(
    storage: &mut dyn Storage,
    updates: &Vec<ValidatorUpdate>,
) -> StdResult<()> {
    PENDING_UPDATES.save(storage, updates)
}

pub fn take_pending_updates(storage: &mut dyn Storage) -> StdResult<Vec<ValidatorUpdate>> {
    let updates = pending_updates(storage)?;
    PENDING_UPDATES.save(storage, &vec![])?;
    Ok(updates)
}

pub fn append_slash_ack(
    storage: &mut dyn Storage,
    consumer_id: &str,
    consumer_addr_hex: String,
) -> StdResult<()> {
    let mut acks = SLASH_ACKS.may_load(storage, consumer_id)?.unwrap_or_default();
    acks.push(consumer_addr_hex);
    SLASH_ACKS.save(storage, consumer_id, &acks)
}

pub fn get_slash_acks(storage: &dyn Storage, consumer_id: &str) -> StdResult<Vec<String>> {
    Ok(SLASH_ACKS.may_load(storage, consumer_id)?.unwrap_or_default())
}

/// Consumes the pending slash acknowledgements of a consumer; they ride along
/// with the next validator set change
pub fn take_slash_acks(storage: &mut dyn Storage, consumer_id: &str) -> StdResult<Vec<String>> {
    let acks = get_slash_acks(storage, consumer_id)?;
    SLASH_ACKS.remove(storage, consumer_id);
    Ok(acks)
}

pub fn remove_slash_acks(storage: &mut dyn Storage, consumer_id: &str) {
    SLASH_ACKS.remove(storage, consumer_id);
}

/// Records a consumer's matured valset update id, keeping the highest seen
pub fn record_matured(storage: &mut dyn Storage, consumer_id: &str, vsc_id: u64) -> StdResult<()> {
    let prev = super::consumers::LAST_MATURED_VSC
        .may_load(storage, consumer_id)?
        .unwrap_or_default();
    if vsc_id > prev {
        super::consumers::LAST_MATURED_VSC.save(storage, consumer_id, &vsc_id)?;
    }
    Ok(())
}

/// Prunes height map entries every launched consumer has matured past. A
/// launched consumer that has not matured any VSC yet blocks pruning entirely
pub fn prune_matured_heights(
    storage: &mut dyn Storage,
    launched_consumer_ids: &[String],
) -> StdResult<()> {
    let mut min_matured = u64::MAX;
    for consumer_id in launched_consumer_ids {
        match super::consumers::LAST_MATURED_VSC.may_load(storage, consumer_id)? {
            Some(matured) => min_matured = min_matured.min(matured),
            None => return Ok(()),
        }
    }
    if launched_consumer_ids.is_empty() || min_matured == u64::MAX {
        return Ok(());
    }
    let stale = VSC_HEIGHT
        .keys(storage, None, None, Order::Ascending)
        .collect::<StdResult<Vec<_>>>()?
        .into_iter()
        .take_while(|id| *id <= min_matured)
        .collect::<Vec<_>>();
    for id in stale {
        VSC_HEIGHT.remove(storage, id);
    }
    Ok(())
}
