use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Binary, CustomQuery, QuerierWrapper, StdResult, Timestamp, Uint128};

/// ProviderQuery is the read surface the provider contract has into the
/// provider chain's staking and slashing modules
#[cw_serde]
#[derive(QueryResponses)]
pub enum ProviderQuery {
    /// BondedValidatorsByPower returns up to `limit` bonded validators,
    /// sorted by descending consensus power
    #[returns(BondedValidatorsResponse)]
    BondedValidatorsByPower { limit: Option<u32> },
    /// ValidatorByConsAddr looks a validator up by its hex-encoded provider
    /// consensus address
    #[returns(ValidatorResponse)]
    ValidatorByConsAddr { cons_addr: String },
    /// SigningInfo returns the slashing module's signing info for the
    /// validator with the given hex-encoded provider consensus address
    #[returns(SigningInfoResponse)]
    SigningInfo { cons_addr: String },
    /// TotalBondedPower returns the sum of the consensus power of all bonded
    /// validators
    #[returns(TotalBondedPowerResponse)]
    TotalBondedPower {},
}

impl CustomQuery for ProviderQuery {}

/// `BondedValidator` is the staking module's view of a bonded validator, as
/// far as the provider contract needs it
#[cw_serde]
pub struct BondedValidator {
    /// `cons_addr` is the hex-encoded provider consensus address
    pub cons_addr: String,
    /// `pub_key` is the raw ed25519 consensus public key
    pub pub_key: Binary,
    /// `power` is the consensus power (tokens divided by the chain's power
    /// reduction)
    pub power: i64,
    /// `tokens` is the amount of bonded tokens
    pub tokens: Uint128,
    /// `jailed` indicates whether the validator has been removed from the
    /// active set
    pub jailed: bool,
}

#[cw_serde]
pub struct BondedValidatorsResponse {
    pub validators: Vec<BondedValidator>,
}

#[cw_serde]
pub struct ValidatorResponse {
    /// `validator` is None if no validator with the given consensus address
    /// exists
    pub validator: Option<BondedValidator>,
}

#[cw_serde]
#[derive(Default)]
pub struct SigningInfoResponse {
    pub jailed_until: Timestamp,
    pub tombstoned: bool,
    pub missed_blocks_counter: u64,
}

#[cw_serde]
pub struct TotalBondedPowerResponse {
    pub power: i64,
}

pub fn query_validator_by_cons_addr(
    querier: &QuerierWrapper<ProviderQuery>,
    cons_addr: impl Into<String>,
) -> StdResult<Option<BondedValidator>> {
    let res: ValidatorResponse = querier.query(
        &ProviderQuery::ValidatorByConsAddr {
            cons_addr: cons_addr.into(),
        }
        .into(),
    )?;
    Ok(res.validator)
}

pub fn query_signing_info(
    querier: &QuerierWrapper<ProviderQuery>,
    cons_addr: impl Into<String>,
) -> StdResult<SigningInfoResponse> {
    querier.query(
        &ProviderQuery::SigningInfo {
            cons_addr: cons_addr.into(),
        }
        .into(),
    )
}

pub fn query_total_bonded_power(querier: &QuerierWrapper<ProviderQuery>) -> StdResult<i64> {
    let res: TotalBondedPowerResponse = querier.query(&ProviderQuery::TotalBondedPower {}.into())?;
    Ok(res.power)
}

pub fn query_bonded_validators(
    querier: &QuerierWrapper<ProviderQuery>,
    limit: Option<u32>,
) -> StdResult<Vec<BondedValidator>> {
    let res: BondedValidatorsResponse =
        querier.query(&ProviderQuery::BondedValidatorsByPower { limit }.into())?;
    Ok(res.validators)
}
