// @generated
/// This packet is sent from provider chain to consumer chain if the validator
/// set for consumer chain changes (due to new bonding/unbonding messages or
/// slashing events). A VSCMaturedPacket is sent from consumer chain to provider
/// chain when the unbonding period for the given VSC has elapsed on the
/// consumer chain.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ValidatorSetChangePacketData {
    #[prost(message, repeated, tag="1")]
    pub validator_updates: ::prost::alloc::vec::Vec<::tendermint_proto::abci::ValidatorUpdate>,
    #[prost(uint64, tag="2")]
    pub valset_update_id: u64,
    /// consensus addresses (hex-encoded) of validators that were slashed on the
    /// provider chain, acknowledging slash packets received by the named
    /// consumer chain
    #[prost(string, repeated, tag="3")]
    pub slash_acks: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}
/// This packet is sent from the consumer chain to the provider chain
/// to notify that a VSC packet reached maturity on the consumer chain.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VscMaturedPacketData {
    /// the id of the VSC packet that reached maturity
    #[prost(uint64, tag="1")]
    pub valset_update_id: u64,
}
/// This packet is sent from the consumer chain to the provider chain
/// to request the slashing of a validator as a result of an infraction
/// committed on the consumer chain.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SlashPacketData {
    #[prost(message, optional, tag="1")]
    pub validator: ::core::option::Option<::tendermint_proto::abci::Validator>,
    /// map to the infraction block height on the provider
    #[prost(uint64, tag="2")]
    pub valset_update_id: u64,
    /// tell if the slashing is for a downtime or a double-signing infraction
    #[prost(enumeration="Infraction", tag="3")]
    pub infraction: i32,
}
/// \[DEPRECATED\] Used only for the deprecated v1 wire format; kept for
/// backwards compatibility with consumer chains that have not upgraded.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SlashPacketDataV1 {
    #[prost(message, optional, tag="1")]
    pub validator: ::core::option::Option<::tendermint_proto::abci::Validator>,
    /// map to the infraction block height on the provider
    #[prost(uint64, tag="2")]
    pub valset_update_id: u64,
    /// tell if the slashing is for a downtime or a double-signing infraction
    #[prost(enumeration="InfractionType", tag="3")]
    pub infraction: i32,
}
/// ConsumerPacketData contains a consumer packet data, sent from the consumer
/// chain to the provider chain
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConsumerPacketData {
    /// type of the packet data
    #[prost(enumeration="ConsumerPacketDataType", tag="1")]
    pub r#type: i32,
    #[prost(oneof="consumer_packet_data::Data", tags="2, 3")]
    pub data: ::core::option::Option<consumer_packet_data::Data>,
}
/// Nested message and enum types in `ConsumerPacketData`.
pub mod consumer_packet_data {
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Data {
        #[prost(message, tag="2")]
        SlashPacketData(super::SlashPacketData),
        #[prost(message, tag="3")]
        VscMaturedPacketData(super::VscMaturedPacketData),
    }
}
/// \[DEPRECATED\] ConsumerPacketDataV1 is the v1 wire format of
/// ConsumerPacketData; kept for backwards compatibility with consumer chains
/// that have not upgraded.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConsumerPacketDataV1 {
    /// type of the packet data
    #[prost(enumeration="ConsumerPacketDataType", tag="1")]
    pub r#type: i32,
    #[prost(oneof="consumer_packet_data_v1::Data", tags="2, 3")]
    pub data: ::core::option::Option<consumer_packet_data_v1::Data>,
}
/// Nested message and enum types in `ConsumerPacketDataV1`.
pub mod consumer_packet_data_v1 {
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Data {
        #[prost(message, tag="2")]
        SlashPacketData(super::SlashPacketDataV1),
        #[prost(message, tag="3")]
        VscMaturedPacketData(super::VscMaturedPacketData),
    }
}
/// Infraction indicates the infraction a validator committed on the consumer
/// chain. Mirrors the staking module infraction enum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Infraction {
    /// UNSPECIFIED defines an empty infraction
    Unspecified = 0,
    /// DOUBLE_SIGN defines a validator that double-signs a block
    DoubleSign = 1,
    /// DOWNTIME defines a validator that missed signing too many blocks
    Downtime = 2,
}
impl Infraction {
    /// String value of the enum field names used in the ProtoBuf definition.
    ///
    /// The values are not transformed in any way and thus are considered stable
    /// (if the ProtoBuf definition does not change) and safe for programmatic use.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Infraction::Unspecified => "INFRACTION_UNSPECIFIED",
            Infraction::DoubleSign => "INFRACTION_DOUBLE_SIGN",
            Infraction::Downtime => "INFRACTION_DOWNTIME",
        }
    }
    /// Creates an enum from field names used in the ProtoBuf definition.
    pub fn from_str_name(value: &str) -> ::core::option::Option<Self> {
        match value {
            "INFRACTION_UNSPECIFIED" => Some(Self::Unspecified),
            "INFRACTION_DOUBLE_SIGN" => Some(Self::DoubleSign),
            "INFRACTION_DOWNTIME" => Some(Self::Downtime),
            _ => None,
        }
    }
}
/// InfractionType indicates the infraction type a validator committed.
/// Note: this is the legacy enum used in the v1 wire format; it is numerically
/// identical to Infraction but semantically separate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum InfractionType {
    /// EMPTY defines an empty infraction type
    Empty = 0,
    /// DOUBLE_SIGN defines a validator that double-signs a block
    DoubleSign = 1,
    /// DOWNTIME defines a validator that missed signing too many blocks
    Downtime = 2,
}
impl InfractionType {
    /// String value of the enum field names used in the ProtoBuf definition.
    ///
    /// The values are not transformed in any way and thus are considered stable
    /// (if the ProtoBuf definition does not change) and safe for programmatic use.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            InfractionType::Empty => "INFRACTION_TYPE_EMPTY",
            InfractionType::DoubleSign => "INFRACTION_TYPE_DOUBLE_SIGN",
            InfractionType::Downtime => "INFRACTION_TYPE_DOWNTIME",
        }
    }
    /// Creates an enum from field names used in the ProtoBuf definition.
    pub fn from_str_name(value: &str) -> ::core::option::Option<Self> {
        match value {
            "INFRACTION_TYPE_EMPTY" => Some(Self::Empty),
            "INFRACTION_TYPE_DOUBLE_SIGN" => Some(Self::DoubleSign),
            "INFRACTION_TYPE_DOWNTIME" => Some(Self::Downtime),
            _ => None,
        }
    }
}
/// ConsumerPacketDataType indicates the type of the packet data sent from the
/// consumer chain to the provider chain
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ConsumerPacketDataType {
    /// UNSPECIFIED defines an unspecified packet type
    Unspecified = 0,
    /// SLASH defines a packet with slashing data
    Slash = 1,
    /// VSCM defines a packet acknowledging the maturity of a VSC packet
    Vscm = 2,
}
impl ConsumerPacketDataType {
    /// String value of the enum field names used in the ProtoBuf definition.
    ///
    /// The values are not transformed in any way and thus are considered stable
    /// (if the ProtoBuf definition does not change) and safe for programmatic use.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            ConsumerPacketDataType::Unspecified => "CONSUMER_PACKET_TYPE_UNSPECIFIED",
            ConsumerPacketDataType::Slash => "CONSUMER_PACKET_TYPE_SLASH",
            ConsumerPacketDataType::Vscm => "CONSUMER_PACKET_TYPE_VSCM",
        }
    }
    /// Creates an enum from field names used in the ProtoBuf definition.
    pub fn from_str_name(value: &str) -> ::core::option::Option<Self> {
        match value {
            "CONSUMER_PACKET_TYPE_UNSPECIFIED" => Some(Self::Unspecified),
            "CONSUMER_PACKET_TYPE_SLASH" => Some(Self::Slash),
            "CONSUMER_PACKET_TYPE_VSCM" => Some(Self::Vscm),
            _ => None,
        }
    }
}
// @@protoc_insertion_point(module)
