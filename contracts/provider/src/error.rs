use cosmwasm_std::StdError;
use cw_controllers::AdminError;
use cw_utils::PaymentError;

use thiserror::Error;

use ccv_apis::error::ProviderApiError;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),
    #[error("{0}")]
    Admin(#[from] AdminError),
    #[error("{0}")]
    Payment(#[from] PaymentError),
    #[error("API error: {0}")]
    ApiError(#[from] ProviderApiError),
    #[error("The bytes cannot be decoded")]
    DecodeError(#[from] prost::DecodeError),
    #[error("{0}")]
    EvidenceError(#[from] EvidenceError),
    #[error("Unauthorized")]
    Unauthorized {},
    #[error("Invalid configuration: {msg}")]
    InvalidConfig { msg: String },
    #[error("Consumer chain is not registered: {0}")]
    UnknownConsumer(String),
    #[error("No consumer chain registered for client {0}")]
    UnknownClient(String),
    #[error("No consumer chain bound to channel {0}")]
    UnknownChannel(String),
    #[error("A consumer chain with chain id {0} already exists")]
    ConsumerAlreadyExists(String),
    #[error("Consumer chain {consumer_id} is in phase {phase}, expected {expected}")]
    InvalidConsumerPhase {
        consumer_id: String,
        phase: String,
        expected: String,
    },
    #[error("Consumer chain {0} already has an open CCV channel")]
    ConsumerChannelAlreadyOpen(String),
    #[error("The contract only supports ordered channels")]
    IbcUnorderedChannel {},
    #[error("Unsupported CCV version: {version}")]
    IbcInvalidVersion { version: String },
    #[error("The consumer key {0} is already assigned to another validator")]
    ConsumerKeyInUse(String),
    #[error("The slash packet has no validator")]
    MissingPacketValidator {},
    #[error("Invalid validator address length in slash packet; got: {0}, expected: {1}")]
    InvalidPacketAddressLength(usize, usize),
    #[error("Invalid validator power in slash packet; got: {0}")]
    InvalidPacketPower(i64),
    #[error("Invalid infraction type in slash packet")]
    UnspecifiedInfraction {},
    #[error("No block height mapping for valset update id {0}")]
    UnknownVscId(u64),
    #[error("No init chain height recorded for consumer chain {0}")]
    NoInitChainHeight(String),
    #[error("Consumer chain {0} is past its initial valset update window")]
    InitialWindowClosed(String),
    #[error("Unsupported consumer packet type: {0}")]
    UnsupportedPacketType(i32),
}

/// Errors raised while verifying an IBC light-client misbehaviour submission.
/// None of them mutate state; the submission is rejected as a whole
#[derive(Error, Debug, PartialEq)]
pub enum EvidenceError {
    #[error("{0}")]
    Std(#[from] StdError),
    #[error("The bytes cannot be decoded")]
    DecodeError(#[from] prost::DecodeError),
    #[error("Misbehaviour header is empty")]
    EmptyHeader {},
    #[error("Misbehaviour headers are for different heights: {0} vs {1}")]
    HeaderHeightMismatch(u64, u64),
    #[error("Misbehaviour headers are identical")]
    IdenticalHeaders {},
    #[error("Misbehaviour header chain id {got} does not match consumer chain id {expected}")]
    ChainIdMismatch { expected: String, got: String },
    #[error(
        "Misbehaviour height {got} is below the minimum equivocation evidence height {min} for this consumer"
    )]
    BelowMinEvidenceHeight { min: u64, got: u64 },
    #[error("Malformed validator set in misbehaviour header")]
    MalformedValidatorSet {},
    #[error("Invalid commit signature in misbehaviour header")]
    InvalidSignature {},
    #[error("Insufficient voting power in misbehaviour header commit: {tallied} of {total}")]
    InsufficientVotingPower { tallied: i64, total: i64 },
}
