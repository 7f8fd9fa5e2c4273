mod msg;
mod query;

pub use msg::ProviderMsg;
pub use query::{
    query_bonded_validators, query_signing_info, query_total_bonded_power,
    query_validator_by_cons_addr, BondedValidator, BondedValidatorsResponse, ProviderQuery,
    SigningInfoResponse, TotalBondedPowerResponse, ValidatorResponse,
};
