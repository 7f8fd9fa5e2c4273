//! msg::bindings is the module that includes the custom messages the provider
//! contract sends to the provider chain's staking and slashing modules. The
//! chain has to integrate the corresponding message handlers. The messages are
//! the mutation surface of the jail/slash executor: jailing, jail-until,
//! tombstoning and token slashing.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{CosmosMsg, Decimal, Timestamp};

/// ProviderMsg is the message that the provider contract can send to the
/// provider chain's staking and slashing modules. Consensus addresses are
/// hex-encoded provider consensus addresses
#[cw_serde]
pub enum ProviderMsg {
    /// Jail marks the validator as jailed in the staking module: it
    /// transitions to Unbonding and is removed from the active set at the
    /// next end-of-block
    Jail { cons_addr: String },
    /// JailUntil sets the time before which the validator cannot unjail
    /// itself, in the slashing module's signing info
    JailUntil { cons_addr: String, until: Timestamp },
    /// Tombstone permanently forbids the validator from ever re-entering the
    /// active set. Tombstoning an already-tombstoned validator is an error;
    /// callers check the signing info first
    Tombstone { cons_addr: String },
    /// Slash burns `slash_fraction` of the tokens the validator had bonded at
    /// `infraction_height`, reaching back into unbonding delegations per
    /// staking semantics. `power` is the validator's consensus power at the
    /// infraction
    Slash {
        cons_addr: String,
        infraction_height: u64,
        power: i64,
        slash_fraction: Decimal,
    },
}

// make ProviderMsg to implement CosmosMsg::CustomMsg
impl cosmwasm_std::CustomMsg for ProviderMsg {}

impl From<ProviderMsg> for CosmosMsg<ProviderMsg> {
    fn from(original: ProviderMsg) -> Self {
        CosmosMsg::Custom(original)
    }
}
