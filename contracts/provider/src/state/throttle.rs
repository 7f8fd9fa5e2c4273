use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Order, StdResult, Storage, Timestamp};
use cw_storage_plus::{Item, Map};

/// The slash meter, in power units. A single process-wide value; the
/// single-writer property is guaranteed by the per-block execution model, but
/// the value is persisted each block
pub(crate) const SLASH_METER: Item<i64> = Item::new("slash_meter");
pub(crate) const LAST_REPLENISH: Item<Timestamp> = Item::new("slash_meter_last_replenish");
/// Arrival-ordered queue of bounced slashes, so replay after a refill is
/// deterministic and observable
pub(crate) const THROTTLE_QUEUE: Map<u64, ThrottleQueueEntry> = Map::new("throttle_queue");
pub(crate) const THROTTLE_QUEUE_SEQ: Item<u64> = Item::new("throttle_queue_seq");

/// `ThrottleQueueEntry` records a downtime slash that was bounced by the
/// throttler and is expected to be resent by its consumer
#[cw_serde]
pub struct ThrottleQueueEntry {
    pub consumer_id: String,
    /// `consumer_cons_addr` is the hex-encoded consumer consensus address of
    /// the reported validator
    pub consumer_cons_addr: String,
    pub vsc_id: u64,
}

/// Appends a bounced slash to the queue, unless the identical entry is already
/// queued (the consumer may resend before the next refill)
pub fn push_bounced(storage: &mut dyn Storage, entry: ThrottleQueueEntry) -> StdResult<()> {
    for item in THROTTLE_QUEUE.range(storage, None, None, Order::Ascending) {
        let (_, existing) = item?;
        if existing == entry {
            return Ok(());
        }
    }
    let seq = THROTTLE_QUEUE_SEQ.may_load(storage)?.unwrap_or_default();
    THROTTLE_QUEUE_SEQ.save(storage, &(seq + 1))?;
    THROTTLE_QUEUE.save(storage, seq, &entry)
}

/// Drops queued entries for the given slash once it has been handled
pub fn remove_bounced(
    storage: &mut dyn Storage,
    consumer_id: &str,
    consumer_cons_addr: &str,
) -> StdResult<()> {
    let stale = THROTTLE_QUEUE
        .range(storage, None, None, Order::Ascending)
        .collect::<StdResult<Vec<_>>>()?
        .into_iter()
        .filter(|(_, entry)| {
            entry.consumer_id == consumer_id && entry.consumer_cons_addr == consumer_cons_addr
        })
        .map(|(seq, _)| seq)
        .collect::<Vec<_>>();
    for seq in stale {
        THROTTLE_QUEUE.remove(storage, seq);
    }
    Ok(())
}

pub fn queue_entries(storage: &dyn Storage) -> StdResult<Vec<ThrottleQueueEntry>> {
    THROTTLE_QUEUE
        .range(storage, None, None, Order::Ascending)
        .map(|item| item.map(|(_, entry)| entry))
        .collect()
}
