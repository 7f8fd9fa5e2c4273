use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Binary, Timestamp};

use ccv_apis::provider_api::ValidatorUpdate;

use crate::state::config::Params;
use crate::state::consumers::Consumer;
use crate::state::throttle::ThrottleQueueEntry;

#[cw_serde]
#[derive(Default)]
pub struct InstantiateMsg {
    /// Protocol parameters. Defaults are used if not set
    pub params: Option<Params>,
    /// If set, this address can update parameters and manage the consumer
    /// chain registry
    pub admin: Option<String>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Change the admin
    UpdateAdmin { admin: Option<String> },
    /// Update the protocol parameters.
    /// Only the admin can update them
    UpdateParams { params: Params },
    /// Register a new consumer chain. A fresh consumer id is assigned and
    /// returned in the `register_consumer` event.
    /// Only the admin can register consumer chains
    RegisterConsumer { chain_id: String },
    /// Bind a registered consumer chain to the IBC client and connection the
    /// CCV channel is expected to be built on. The consumer launches when the
    /// channel handshake completes.
    /// Only the admin can initialize consumer chains
    InitializeConsumer {
        consumer_id: String,
        client_id: String,
        connection_id: String,
    },
    /// Stop a consumer chain: it no longer receives validator set changes and
    /// its slash packets drain as no-ops.
    /// Only the admin can stop consumer chains
    StopConsumer { consumer_id: String },
    /// Delete a stopped consumer chain and prune its per-consumer state.
    /// Only the admin can delete consumer chains
    DeleteConsumer { consumer_id: String },
    /// Assign a consumer consensus key to a provider validator for the given
    /// consumer chain. Subsequent validator set changes for that consumer
    /// carry the assigned key, and slash packets are resolved through it.
    /// Only the admin can assign keys
    AssignConsumerKey {
        consumer_id: String,
        /// `provider_cons_addr` is the hex-encoded provider consensus address
        /// of the validator
        provider_cons_addr: String,
        /// `consumer_pub_key` is the raw ed25519 public key the validator uses
        /// on the consumer chain
        consumer_pub_key: Binary,
    },
    /// Set the minimum height of evidence accepted in misbehaviour
    /// submissions for the given consumer chain.
    /// Only the admin can set it
    SetEquivocationEvidenceMinHeight {
        consumer_id: String,
        min_height: u64,
    },
    /// Submit an IBC light-client misbehaviour (two conflicting consumer
    /// headers) as equivocation evidence. Byzantine validators identified in
    /// the evidence are tombstoned and slashed as double-signers.
    /// Permissionless; invalid evidence is rejected without state change
    SubmitConsumerMisbehaviour {
        /// `misbehaviour` is a protobuf-encoded
        /// `ibc.lightclients.tendermint.v1.Misbehaviour`
        misbehaviour: Binary,
    },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    /// Params returns the current protocol parameters
    #[returns(Params)]
    Params {},
    /// Admin returns the current admin, if any
    #[returns(cw_controllers::AdminResponse)]
    Admin {},
    /// Consumer returns the registry record of a consumer chain
    #[returns(ConsumerResponse)]
    Consumer { consumer_id: String },
    /// Consumers returns the registry records of all consumer chains
    #[returns(ConsumersResponse)]
    Consumers {
        start_after: Option<String>,
        limit: Option<u32>,
    },
    /// KeyAssignment returns the consumer key assigned by a provider validator
    /// for a consumer chain, if any
    #[returns(KeyAssignmentResponse)]
    KeyAssignment {
        consumer_id: String,
        provider_cons_addr: String,
    },
    /// ProviderAddr returns the provider consensus address behind a consumer
    /// consensus address, if a key mapping exists
    #[returns(ProviderAddrResponse)]
    ProviderAddr {
        consumer_id: String,
        consumer_cons_addr: String,
    },
    /// ConsumerValidators returns the validators currently part of the
    /// consumer chain's validator set, by provider consensus address
    #[returns(ConsumerValidatorsResponse)]
    ConsumerValidators { consumer_id: String },
    /// ValsetUpdateId returns the id of the last emitted validator set change
    #[returns(ValsetUpdateIdResponse)]
    ValsetUpdateId {},
    /// VscHeight returns the provider block height a valset update id was
    /// emitted at, if the mapping is still live
    #[returns(VscHeightResponse)]
    VscHeight { vsc_id: u64 },
    /// SlashMeter returns the state of the downtime slash throttle
    #[returns(SlashMeterResponse)]
    SlashMeter {},
    /// SlashAcks returns the slash acknowledgements pending delivery to a
    /// consumer chain with the next validator set change
    #[returns(SlashAcksResponse)]
    SlashAcks { consumer_id: String },
    /// ThrottleQueue returns the arrival-ordered queue of bounced slashes
    #[returns(ThrottleQueueResponse)]
    ThrottleQueue {},
    /// PendingValidatorUpdates returns the validator power updates accumulated
    /// since the last epoch boundary
    #[returns(PendingValidatorUpdatesResponse)]
    PendingValidatorUpdates {},
}

#[cw_serde]
pub struct ConsumerResponse {
    pub consumer: Consumer,
    /// `init_chain_height` is the provider height recorded when the consumer
    /// launched
    pub init_chain_height: Option<u64>,
    /// `equivocation_evidence_min_height` is the minimum height of evidence
    /// accepted in misbehaviour submissions for this consumer
    pub equivocation_evidence_min_height: Option<u64>,
    /// `last_matured_vsc_id` is the highest valset update id the consumer has
    /// reported as matured
    pub last_matured_vsc_id: Option<u64>,
}

#[cw_serde]
pub struct ConsumersResponse {
    pub consumers: Vec<Consumer>,
}

#[cw_serde]
pub struct KeyAssignmentResponse {
    pub consumer_pub_key: Option<Binary>,
    /// `consumer_cons_addr` is the hex-encoded consensus address derived from
    /// the assigned key
    pub consumer_cons_addr: Option<String>,
}

#[cw_serde]
pub struct ProviderAddrResponse {
    pub provider_cons_addr: Option<String>,
}

#[cw_serde]
pub struct ConsumerValidatorInfo {
    /// `provider_cons_addr` is the hex-encoded provider consensus address
    pub provider_cons_addr: String,
    /// `power` is the consensus power last sent to the consumer
    pub power: i64,
}

#[cw_serde]
pub struct ConsumerValidatorsResponse {
    pub validators: Vec<ConsumerValidatorInfo>,
}

#[cw_serde]
pub struct ValsetUpdateIdResponse {
    pub vsc_id: u64,
}

#[cw_serde]
pub struct VscHeightResponse {
    pub height: Option<u64>,
}

#[cw_serde]
pub struct SlashMeterResponse {
    /// `value` is the current meter value, in power units; negative while the
    /// meter is exhausted
    pub value: i64,
    /// `allowance` is the current full-meter value, a fraction of the total
    /// bonded power
    pub allowance: i64,
    pub last_replenish: Timestamp,
}

#[cw_serde]
pub struct SlashAcksResponse {
    /// `acks` are hex-encoded consumer consensus addresses
    pub acks: Vec<String>,
}

#[cw_serde]
pub struct ThrottleQueueResponse {
    pub entries: Vec<ThrottleQueueEntry>,
}

#[cw_serde]
pub struct PendingValidatorUpdatesResponse {
    pub updates: Vec<ValidatorUpdate>,
}
