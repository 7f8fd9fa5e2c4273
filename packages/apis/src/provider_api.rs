/// Provider messages / API.
/// The definitions here roughly follow the same structure as the equivalent CCV
/// wire protobuf types, defined in `packages/proto/src/gen/interchain_security.ccv.v1.rs`
use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Binary, StdAck};
use sha2::{Digest, Sha256};

use crate::error::ProviderApiError;

/// Length of a consensus address, in bytes
pub const CONS_ADDR_LEN: usize = 20;
/// Length of a raw ed25519 consensus public key, in bytes
pub const ED25519_PUBKEY_LEN: usize = 32;

/// `cons_addr_from_pubkey` derives the consensus address of a validator from
/// its raw ed25519 consensus public key: the first `CONS_ADDR_LEN` bytes of the
/// SHA-256 hash of the key
pub fn cons_addr_from_pubkey(pub_key: &[u8]) -> Result<Vec<u8>, ProviderApiError> {
    if pub_key.len() != ED25519_PUBKEY_LEN {
        return Err(ProviderApiError::InvalidPubKeyLength(
            pub_key.len(),
            ED25519_PUBKEY_LEN,
        ));
    }
    let digest = Sha256::digest(pub_key);
    Ok(digest[..CONS_ADDR_LEN].to_vec())
}

/// `ProviderConsAddr` is the consensus address of a validator on the provider
/// chain. It may differ from the validator's `ConsumerConsAddr` on a given
/// consumer chain, as validators can assign distinct consumer consensus keys
#[cw_serde]
pub struct ProviderConsAddr(Binary);

impl ProviderConsAddr {
    pub fn new(addr: impl Into<Binary>) -> Self {
        Self(addr.into())
    }

    pub fn from_pubkey(pub_key: &[u8]) -> Result<Self, ProviderApiError> {
        Ok(Self(cons_addr_from_pubkey(pub_key)?.into()))
    }

    pub fn from_hex(s: &str) -> Result<Self, ProviderApiError> {
        Ok(Self(hex::decode(s)?.into()))
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

/// `ConsumerConsAddr` is the consensus address of a validator on a consumer
/// chain. It is the authoritative external identifier in slash packets and
/// equivocation evidence; never assume it equals the provider-side address
#[cw_serde]
pub struct ConsumerConsAddr(Binary);

impl ConsumerConsAddr {
    pub fn new(addr: impl Into<Binary>) -> Self {
        Self(addr.into())
    }

    pub fn from_pubkey(pub_key: &[u8]) -> Result<Self, ProviderApiError> {
        Ok(Self(cons_addr_from_pubkey(pub_key)?.into()))
    }

    pub fn from_hex(s: &str) -> Result<Self, ProviderApiError> {
        Ok(Self(hex::decode(s)?.into()))
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

/// `ValidatorUpdate` is a single power change for a validator, identified by
/// its raw ed25519 consensus public key. Power zero means removal from the
/// active set
#[cw_serde]
pub struct ValidatorUpdate {
    /// `pub_key` is the raw ed25519 consensus public key of the validator
    pub pub_key: Binary,
    /// `power` is the new consensus power of the validator; zero removes it
    pub power: i64,
}

/// `Infraction` is the domain representation of a consumer-reported
/// infraction. Wire-level enums (current and legacy) are translated into this
/// type at the packet boundary
#[cw_serde]
#[derive(Copy)]
pub enum Infraction {
    Unspecified,
    DoubleSign,
    Downtime,
}

impl Infraction {
    pub fn label(&self) -> &'static str {
        match self {
            Infraction::Unspecified => "unspecified",
            Infraction::DoubleSign => "double_sign",
            Infraction::Downtime => "downtime",
        }
    }
}

/// `PacketAckResult` is the result carried in the acknowledgement of a
/// consumer packet. It is a tagged variant rather than a boolean: `Bounced`
/// instructs the consumer to resend the packet later, which is distinct from
/// both success and error
#[cw_serde]
#[derive(Copy)]
pub enum PacketAckResult {
    /// Legacy success acknowledgement, for consumers speaking the v1 wire
    /// format
    V1,
    /// The slash packet was handled (including handled as a no-op)
    SlashHandled,
    /// The slash packet was rejected by the throttler; the consumer should
    /// resend it after the next replenishment
    SlashBounced,
}

impl PacketAckResult {
    pub fn payload(&self) -> &'static [u8] {
        match self {
            PacketAckResult::V1 => &[1],
            PacketAckResult::SlashHandled => &[2],
            PacketAckResult::SlashBounced => &[3],
        }
    }

    pub fn to_ack(&self) -> StdAck {
        StdAck::success(self.payload().to_vec())
    }
}

#[cw_serde]
pub enum SudoMsg {
    /// The SDK should call SudoMsg::BeginBlock{} once per block (in BeginBlock).
    /// It allows the throttler to replenish the slash meter on schedule
    BeginBlock {},
    /// The SDK should call SudoMsg::EndBlock{} once per block (in EndBlock),
    /// after the staking module's end-blocker, carrying the validator power
    /// updates that staking produced for this block. It allows the dispatcher
    /// to accumulate updates and emit validator-set-change packets on epoch
    /// boundaries
    EndBlock {
        validator_updates: Vec<ValidatorUpdate>,
    },
}
