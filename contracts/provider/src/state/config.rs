use cosmwasm_schema::cw_serde;
use cosmwasm_std::Decimal;

use cw_controllers::Admin;
use cw_storage_plus::Item;
use derivative::Derivative;

use crate::error::ContractError;

pub(crate) const PARAMS: Item<Params> = Item::new("params");
/// Storage for admin
pub(crate) const ADMIN: Admin = Admin::new("admin");

/// Params define the admin-selectable CCV provider parameters
#[cw_serde]
#[derive(Derivative)]
#[derivative(Default)]
pub struct Params {
    /// `blocks_per_epoch` is the number of blocks between validator set change
    /// emissions. Between epoch boundaries validator updates accumulate but
    /// are not sent, bounding VSC traffic independent of churn rate
    #[derivative(Default(value = "1"))]
    pub blocks_per_epoch: u64,
    /// `ccv_timeout_seconds` is the IBC timeout period of packets sent over
    /// CCV channels. Four weeks by default
    #[derivative(Default(value = "2419200"))]
    pub ccv_timeout_seconds: u64,
    /// `slash_meter_replenish_period_seconds` is the interval between slash
    /// meter replenishments
    #[derivative(Default(value = "3600"))]
    pub slash_meter_replenish_period_seconds: u64,
    /// `slash_meter_replenish_fraction` is the full-meter value, expressed as
    /// a fraction of the total bonded power
    #[derivative(Default(value = "Decimal::percent(5)"))]
    pub slash_meter_replenish_fraction: Decimal,
    /// `downtime_jail_duration_seconds` is how long a validator jailed for
    /// downtime cannot unjail itself
    #[derivative(Default(value = "600"))]
    pub downtime_jail_duration_seconds: u64,
    /// `double_sign_slash_fraction` is the fraction of bonded tokens slashed
    /// for a double-signing infraction
    #[derivative(Default(value = "Decimal::percent(5)"))]
    pub double_sign_slash_fraction: Decimal,
    /// `cons_addr_length` is the expected length of consensus addresses
    /// carried in slash packets, in bytes
    #[derivative(Default(value = "20"))]
    pub cons_addr_length: u32,
    /// `max_validators` is the maximum number of bonded validators seeded into
    /// a consumer chain's validator set at launch
    #[derivative(Default(value = "180"))]
    pub max_validators: u32,
}

impl Params {
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.blocks_per_epoch == 0 {
            return Err(ContractError::InvalidConfig {
                msg: "blocks_per_epoch cannot be zero".to_string(),
            });
        }
        if self.slash_meter_replenish_fraction > Decimal::one()
            || self.slash_meter_replenish_fraction.is_zero()
        {
            return Err(ContractError::InvalidConfig {
                msg: "slash_meter_replenish_fraction must be in (0, 1]".to_string(),
            });
        }
        if self.double_sign_slash_fraction > Decimal::one() {
            return Err(ContractError::InvalidConfig {
                msg: "double_sign_slash_fraction cannot exceed 1".to_string(),
            });
        }
        if self.cons_addr_length == 0 {
            return Err(ContractError::InvalidConfig {
                msg: "cons_addr_length cannot be zero".to_string(),
            });
        }
        Ok(())
    }
}
