//! The slash throttler: a leaky-bucket meter gating downtime slashes.
//!
//! The meter holds an allowance in power units. Applying a downtime jail
//! subtracts the validator's pre-jail power, and the meter may go negative;
//! while it is negative, further downtime slash packets are bounced back to
//! their consumers. On a fixed schedule the meter is refilled in full, up to
//! a ceiling recomputed as a fraction of the total bonded power. The refill is
//! interval-based rather than a continuous drip, as slash actions are
//! themselves discrete.

use cosmwasm_std::{DepsMut, Env, Event, QuerierWrapper, StdResult, Storage, Uint128};

use ccv_bindings::{query_total_bonded_power, ProviderQuery};

use crate::error::ContractError;
use crate::state::config::{Params, PARAMS};
use crate::state::throttle::{LAST_REPLENISH, SLASH_METER};

/// Fills the meter and starts the replenishment schedule. Called once, at
/// instantiation
pub fn initialize(deps: DepsMut<ProviderQuery>, env: &Env) -> Result<(), ContractError> {
    let params = PARAMS.load(deps.storage)?;
    let allowance = slash_meter_allowance(&deps.querier, &params)?;
    SLASH_METER.save(deps.storage, &allowance)?;
    LAST_REPLENISH.save(deps.storage, &env.block.time)?;
    Ok(())
}

/// `slash_meter_allowance` is the full-meter value: the replenish fraction of
/// the total bonded power, recomputed at every replenishment
pub fn slash_meter_allowance(
    querier: &QuerierWrapper<ProviderQuery>,
    params: &Params,
) -> Result<i64, ContractError> {
    let total_power = query_total_bonded_power(querier)?.max(0);
    let allowance = Uint128::from(total_power as u128)
        .mul_floor(params.slash_meter_replenish_fraction)
        .u128();
    Ok(allowance.min(i64::MAX as u128) as i64)
}

/// Refills the meter if a replenish period has elapsed since the last refill.
/// One full refill per period, capped at the recomputed ceiling:
/// `meter := min(allowance, meter + allowance)`
pub fn replenish_if_due(
    deps: &mut DepsMut<ProviderQuery>,
    env: &Env,
) -> Result<Option<Event>, ContractError> {
    let params = PARAMS.load(deps.storage)?;
    let last = LAST_REPLENISH.load(deps.storage)?;
    let due = last.plus_seconds(params.slash_meter_replenish_period_seconds);
    if env.block.time < due {
        return Ok(None);
    }

    let allowance = slash_meter_allowance(&deps.querier, &params)?;
    let meter = SLASH_METER.load(deps.storage)?;
    let replenished = allowance.min(meter.saturating_add(allowance));
    SLASH_METER.save(deps.storage, &replenished)?;
    LAST_REPLENISH.save(deps.storage, &env.block.time)?;

    Ok(Some(
        Event::new("slash_meter_replenish")
            .add_attribute("module", "provider")
            .add_attribute("value", replenished.to_string())
            .add_attribute("allowance", allowance.to_string()),
    ))
}

/// Subtracts an admitted downtime slash from the meter. The meter may go
/// negative as a consequence of admission
pub fn deduct(storage: &mut dyn Storage, power: i64) -> StdResult<i64> {
    let meter = SLASH_METER.load(storage)?.saturating_sub(power);
    SLASH_METER.save(storage, &meter)?;
    Ok(meter)
}

/// The bounce predicate: downtime slashes are admitted only while the meter is
/// non-negative
pub fn is_exhausted(storage: &dyn Storage) -> StdResult<bool> {
    Ok(SLASH_METER.load(storage)? < 0)
}
