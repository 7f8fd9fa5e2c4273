//! IBC entry points of the provider contract.
//!
//! CCV channels are ordered. Two wire versions are spoken: "2" (current) and
//! "1" (legacy); the version negotiated during the handshake selects the
//! packet schema and the acknowledgement shape for the channel's lifetime.
//! A channel is bound to the consumer chain registered for its underlying
//! connection, and completing the handshake launches that consumer.

use cosmwasm_std::{
    from_json, DepsMut, Env, Event, Ibc3ChannelOpenResponse, IbcBasicResponse, IbcChannelCloseMsg,
    IbcChannelConnectMsg, IbcChannelOpenMsg, IbcChannelOpenResponse, IbcOrder, IbcPacketAckMsg,
    IbcPacketReceiveMsg, IbcPacketTimeoutMsg, IbcReceiveResponse, Never, StdAck, Storage,
};
use prost::Message;

use ccv_apis::provider_api::PacketAckResult;
use ccv_bindings::{ProviderMsg, ProviderQuery};
use ccv_proto::interchain_security::ccv::v1::{
    consumer_packet_data, consumer_packet_data_v1, ConsumerPacketData, ConsumerPacketDataV1,
    SlashPacketData,
};

use crate::error::ContractError;
use crate::state::consumers::{
    consumer_for_channel, consumer_for_connection, get_consumer, ConsumerPhase,
    CHANNEL_TO_CONSUMER, CONSUMERS, INIT_CHAIN_HEIGHT,
};
use crate::{slashing, valset};

pub const IBC_VERSION: &str = "2";
pub const IBC_VERSION_V1: &str = "1";
pub const IBC_ORDERING: IbcOrder = IbcOrder::Ordered;

fn is_supported_version(version: &str) -> bool {
    version == IBC_VERSION || version == IBC_VERSION_V1
}

/// This is executed during the ChannelOpenInit and ChannelOpenTry
/// of the IBC 4-step channel protocol.
/// Here we ensure the ordering and version constraints, and that the channel
/// is being built on a connection that belongs to an initialized consumer
pub fn ibc_channel_open(
    deps: DepsMut<ProviderQuery>,
    _env: Env,
    msg: IbcChannelOpenMsg,
) -> Result<IbcChannelOpenResponse, ContractError> {
    let channel = msg.channel();
    // CCV channels have to be ordered
    if channel.order != IBC_ORDERING {
        return Err(ContractError::IbcUnorderedChannel {});
    }

    // The consumer proposes the wire version; both the current and the legacy
    // one are spoken here, and the ack shape follows the negotiated version
    let version = msg.counterparty_version().unwrap_or(&channel.version);
    if !is_supported_version(version) {
        return Err(ContractError::IbcInvalidVersion {
            version: version.to_string(),
        });
    }

    if consumer_for_connection(deps.storage, &channel.connection_id)?.is_none() {
        return Err(ContractError::UnknownConsumer(
            channel.connection_id.clone(),
        ));
    }

    Ok(Some(Ibc3ChannelOpenResponse {
        version: version.to_string(),
    }))
}

/// Second part of the 4-step handshake, i.e. ChannelOpenAck and
/// ChannelOpenConfirm. Completing it launches the consumer: the channel is
/// bound, the init chain height recorded, and the consumer validator set
/// seeded from the current bonded set
pub fn ibc_channel_connect(
    mut deps: DepsMut<ProviderQuery>,
    env: Env,
    msg: IbcChannelConnectMsg,
) -> Result<IbcBasicResponse, ContractError> {
    let channel = msg.channel();
    let version = msg.counterparty_version().unwrap_or(&channel.version);
    if !is_supported_version(version) {
        return Err(ContractError::IbcInvalidVersion {
            version: version.to_string(),
        });
    }

    let mut consumer = consumer_for_connection(deps.storage, &channel.connection_id)?
        .ok_or_else(|| ContractError::UnknownConsumer(channel.connection_id.clone()))?;
    if consumer.channel_id.is_some() {
        return Err(ContractError::ConsumerChannelAlreadyOpen(
            consumer.consumer_id,
        ));
    }

    let channel_id = channel.endpoint.channel_id.clone();
    consumer.channel_id = Some(channel_id.clone());
    consumer.channel_version = Some(version.to_string());
    consumer.phase = ConsumerPhase::Launched;
    CONSUMERS.save(deps.storage, &consumer.consumer_id, &consumer)?;
    CHANNEL_TO_CONSUMER.save(deps.storage, &channel_id, &consumer.consumer_id)?;
    INIT_CHAIN_HEIGHT.save(deps.storage, &consumer.consumer_id, &env.block.height)?;
    valset::seed_consumer_validators(&mut deps, &consumer.consumer_id)?;

    Ok(IbcBasicResponse::new()
        .add_attribute("action", "ibc_connect")
        .add_attribute("channel_id", &channel_id)
        .add_event(
            Event::new("consumer_launched")
                .add_attribute("module", "provider")
                .add_attribute("consumer_id", &consumer.consumer_id)
                .add_attribute("chain_id", &consumer.chain_id)
                .add_attribute("channel_id", channel_id)
                .add_attribute("version", version),
        ))
}

/// This is invoked on the IBC Channel Close message.
/// Losing the CCV channel stops the consumer; its remaining slash packets, if
/// the channel reopens through a new registration, drain as no-ops
pub fn ibc_channel_close(
    deps: DepsMut<ProviderQuery>,
    _env: Env,
    msg: IbcChannelCloseMsg,
) -> Result<IbcBasicResponse, ContractError> {
    let channel_id = msg.channel().endpoint.channel_id.clone();
    let events = stop_consumer_for_channel(deps.storage, &channel_id, "channel_closed")?;

    Ok(IbcBasicResponse::new()
        .add_attribute("action", "ibc_close")
        .add_attribute("channel_id", channel_id)
        .add_events(events))
}

enum DecodedPacket {
    Slash(SlashPacketData),
    VscMatured(u64),
}

/// Decodes a consumer packet with the schema the channel's wire version
/// selects. The v1 slash schema is normalized into the current shape; its
/// infraction tag keeps the legacy semantics and is translated downstream
fn decode_consumer_packet(data: &[u8], v1: bool) -> Result<DecodedPacket, ContractError> {
    if v1 {
        let packet = ConsumerPacketDataV1::decode(data)?;
        match packet
            .data
            .ok_or(ContractError::UnsupportedPacketType(packet.r#type))?
        {
            consumer_packet_data_v1::Data::SlashPacketData(slash) => {
                Ok(DecodedPacket::Slash(SlashPacketData {
                    validator: slash.validator,
                    valset_update_id: slash.valset_update_id,
                    infraction: slash.infraction,
                }))
            }
            consumer_packet_data_v1::Data::VscMaturedPacketData(matured) => {
                Ok(DecodedPacket::VscMatured(matured.valset_update_id))
            }
        }
    } else {
        let packet = ConsumerPacketData::decode(data)?;
        match packet
            .data
            .ok_or(ContractError::UnsupportedPacketType(packet.r#type))?
        {
            consumer_packet_data::Data::SlashPacketData(slash) => Ok(DecodedPacket::Slash(slash)),
            consumer_packet_data::Data::VscMaturedPacketData(matured) => {
                Ok(DecodedPacket::VscMatured(matured.valset_update_id))
            }
        }
    }
}

/// Invoked when an IBC packet is received.
/// App-level failures are converted into error acknowledgements so the packet
/// is acked regardless; in the error case none of the state changes here are
/// committed
pub fn ibc_packet_receive(
    deps: DepsMut<ProviderQuery>,
    env: Env,
    msg: IbcPacketReceiveMsg,
) -> Result<IbcReceiveResponse<ProviderMsg>, Never> {
    // put this in a closure so we can convert all error responses into
    // acknowledgements
    (|| {
        let packet = msg.packet;
        // which local channel did this packet come on
        let channel_id = packet.dest.channel_id;
        let consumer = consumer_for_channel(deps.storage, &channel_id)?;
        let v1 = consumer.channel_version.as_deref() == Some(IBC_VERSION_V1);

        match decode_consumer_packet(packet.data.as_slice(), v1)? {
            DecodedPacket::Slash(data) => {
                slashing::handle_slash_packet_recv(deps, env, &consumer, &data, v1)
            }
            DecodedPacket::VscMatured(vsc_id) => {
                let event =
                    valset::handle_vsc_matured(deps.storage, &consumer.consumer_id, vsc_id)?;
                Ok(IbcReceiveResponse::new(PacketAckResult::V1.to_ack()).add_event(event))
            }
        }
    })()
    .or_else(|err: ContractError| {
        // we try to capture all app-level errors and convert them into
        // acknowledgement packets that contain a log string
        Ok(
            IbcReceiveResponse::new(StdAck::error(format!("invalid consumer packet: {err}")))
                .add_event(Event::new("ibc").add_attribute("packet", "receive")),
        )
    })
}

/// Invoked when the consumer acknowledges a packet we sent. A success ack is
/// the normal case; an error ack on a VSC is fatal for the consumer
pub fn ibc_packet_ack(
    deps: DepsMut<ProviderQuery>,
    _env: Env,
    msg: IbcPacketAckMsg,
) -> Result<IbcBasicResponse, ContractError> {
    let ack: StdAck = from_json(&msg.acknowledgement.data)?;
    match ack {
        StdAck::Success(_) => Ok(IbcBasicResponse::default()),
        StdAck::Error(error) => {
            let channel_id = msg.original_packet.src.channel_id.clone();
            let events = stop_consumer_for_channel(deps.storage, &channel_id, "vsc_error_ack")?;
            Ok(IbcBasicResponse::new()
                .add_attribute("action", "ibc_packet_ack")
                .add_attribute("error", error)
                .add_events(events))
        }
    }
}

/// Invoked when a packet we sent times out. A VSC timeout is a hard error for
/// the consumer: the ordered channel is closed by the IBC stack and the
/// consumer is stopped here
pub fn ibc_packet_timeout(
    deps: DepsMut<ProviderQuery>,
    _env: Env,
    msg: IbcPacketTimeoutMsg,
) -> Result<IbcBasicResponse, ContractError> {
    let channel_id = msg.packet.src.channel_id.clone();
    let events = stop_consumer_for_channel(deps.storage, &channel_id, "vsc_timeout")?;
    Ok(IbcBasicResponse::new()
        .add_attribute("action", "ibc_packet_timeout")
        .add_attribute("channel_id", channel_id)
        .add_events(events))
}

/// Stops the consumer bound to the given channel, if any, dropping the channel
/// binding. Pending slash acks are kept; they are discarded if the consumer is
/// eventually deleted
fn stop_consumer_for_channel(
    storage: &mut dyn Storage,
    channel_id: &str,
    reason: &str,
) -> Result<Vec<Event>, ContractError> {
    let Some(consumer_id) = CHANNEL_TO_CONSUMER.may_load(storage, channel_id)? else {
        return Ok(vec![]);
    };
    let mut consumer = get_consumer(storage, &consumer_id)?;
    CHANNEL_TO_CONSUMER.remove(storage, channel_id);
    consumer.channel_id = None;
    consumer.channel_version = None;
    consumer.phase = ConsumerPhase::Stopped;
    CONSUMERS.save(storage, &consumer_id, &consumer)?;

    Ok(vec![Event::new("consumer_stopped")
        .add_attribute("module", "provider")
        .add_attribute("consumer_id", consumer_id)
        .add_attribute("reason", reason.to_string())])
}
