//! Helpers shared by the contract tests: deterministic ed25519 validators,
//! signed consumer headers for misbehaviour evidence, wire packets, and
//! consumer launch plumbing.

use cosmwasm_std::testing::message_info;
use cosmwasm_std::{
    Addr, Binary, Env, IbcChannel, IbcChannelConnectMsg, IbcEndpoint, IbcOrder, IbcPacket,
    IbcPacketReceiveMsg, IbcTimeout, Timestamp, Uint128,
};
use ed25519_dalek::{Signer, SigningKey};
use prost::Message;

use ccv_apis::provider_api::{ConsumerConsAddr, ProviderConsAddr, ValidatorUpdate};
use ccv_bindings::BondedValidator;
use ccv_bindings_test::ProviderDeps;
use ccv_proto::ibc::lightclients::tendermint::v1::{Header as ClientHeader, Misbehaviour};
use ccv_proto::interchain_security::ccv::v1::{
    consumer_packet_data, consumer_packet_data_v1, ConsumerPacketData, ConsumerPacketDataType,
    ConsumerPacketDataV1, SlashPacketData, SlashPacketDataV1, VscMaturedPacketData,
};
use tendermint_proto::google::protobuf::Timestamp as ProtoTimestamp;
use tendermint_proto::types::{
    BlockId, BlockIdFlag, Commit, CommitSig, PartSetHeader, SignedHeader, Validator, ValidatorSet,
};

use crate::contract::tests::OWNER;
use crate::contract::execute;
use crate::ibc;
use crate::misbehaviour::canonical_sign_bytes;
use crate::msg::ExecuteMsg;
use crate::state::consumers::NEXT_CONSUMER_ID;

/// A validator with a deterministic ed25519 consensus key
pub struct TestValidator {
    signing_key: SigningKey,
}

impl TestValidator {
    pub fn pub_key(&self) -> Binary {
        Binary::new(self.signing_key.verifying_key().to_bytes().to_vec())
    }

    pub fn cons_addr(&self) -> ProviderConsAddr {
        ProviderConsAddr::from_pubkey(&self.pub_key()).unwrap()
    }

    pub fn cons_addr_hex(&self) -> String {
        self.cons_addr().to_hex()
    }

    /// The validator's consumer-side consensus address when it has not
    /// assigned a distinct consumer key
    pub fn consumer_cons_addr(&self) -> ConsumerConsAddr {
        ConsumerConsAddr::from_pubkey(&self.pub_key()).unwrap()
    }

    pub fn sign(&self, msg: &[u8]) -> Vec<u8> {
        self.signing_key.sign(msg).to_bytes().to_vec()
    }
}

pub fn test_validator(seed: u8) -> TestValidator {
    TestValidator {
        signing_key: SigningKey::from_bytes(&[seed; 32]),
    }
}

pub fn bonded_validator(validator: &TestValidator, power: i64) -> BondedValidator {
    BondedValidator {
        cons_addr: validator.cons_addr_hex(),
        pub_key: validator.pub_key(),
        power,
        tokens: Uint128::new(power as u128 * 1000),
        jailed: false,
    }
}

pub fn update_for(validator: &TestValidator, power: i64) -> ValidatorUpdate {
    ValidatorUpdate {
        pub_key: validator.pub_key(),
        power,
    }
}

pub fn test_channel(channel_id: &str, connection_id: &str, version: &str) -> IbcChannel {
    IbcChannel::new(
        IbcEndpoint {
            port_id: "wasm.provider".to_string(),
            channel_id: channel_id.to_string(),
        },
        IbcEndpoint {
            port_id: "consumer".to_string(),
            channel_id: "channel-1".to_string(),
        },
        IbcOrder::Ordered,
        version,
        connection_id,
    )
}

/// Registers, initializes and launches a consumer by completing the channel
/// handshake. Returns the assigned consumer id
pub fn setup_launched_consumer(
    deps: &mut ProviderDeps,
    env: &Env,
    chain_id: &str,
    channel_id: &str,
    version: &str,
) -> String {
    let consumer_id = NEXT_CONSUMER_ID
        .may_load(&deps.storage)
        .unwrap()
        .unwrap_or_default()
        .to_string();
    let connection_id = format!("connection-{consumer_id}");
    let admin = message_info(&deps.api.addr_make(OWNER), &[]);

    execute(
        deps.as_mut(),
        env.clone(),
        admin.clone(),
        ExecuteMsg::RegisterConsumer {
            chain_id: chain_id.to_string(),
        },
    )
    .unwrap();
    execute(
        deps.as_mut(),
        env.clone(),
        admin,
        ExecuteMsg::InitializeConsumer {
            consumer_id: consumer_id.clone(),
            client_id: format!("07-tendermint-{consumer_id}"),
            connection_id: connection_id.clone(),
        },
    )
    .unwrap();
    ibc::ibc_channel_connect(
        deps.as_mut(),
        env.clone(),
        IbcChannelConnectMsg::OpenAck {
            channel: test_channel(channel_id, &connection_id, version),
            counterparty_version: version.to_string(),
        },
    )
    .unwrap();
    consumer_id
}

/// Assigns the validator's own provider key as its consumer key (the identical
/// key configuration)
pub fn assign_identity_key(
    deps: &mut ProviderDeps,
    env: &Env,
    consumer_id: &str,
    validator: &TestValidator,
) {
    assign_consumer_key(deps, env, consumer_id, validator, &validator.pub_key());
}

pub fn assign_consumer_key(
    deps: &mut ProviderDeps,
    env: &Env,
    consumer_id: &str,
    validator: &TestValidator,
    consumer_pub_key: &Binary,
) {
    let admin = message_info(&deps.api.addr_make(OWNER), &[]);
    execute(
        deps.as_mut(),
        env.clone(),
        admin,
        ExecuteMsg::AssignConsumerKey {
            consumer_id: consumer_id.to_string(),
            provider_cons_addr: validator.cons_addr_hex(),
            consumer_pub_key: consumer_pub_key.clone(),
        },
    )
    .unwrap();
}

pub fn slash_packet_bytes(
    consumer_addr: &[u8],
    power: i64,
    vsc_id: u64,
    infraction: i32,
) -> Vec<u8> {
    ConsumerPacketData {
        r#type: ConsumerPacketDataType::Slash as i32,
        data: Some(consumer_packet_data::Data::SlashPacketData(
            SlashPacketData {
                validator: Some(tendermint_proto::abci::Validator {
                    address: consumer_addr.to_vec().into(),
                    power,
                }),
                valset_update_id: vsc_id,
                infraction,
            },
        )),
    }
    .encode_to_vec()
}

pub fn slash_packet_bytes_v1(
    consumer_addr: &[u8],
    power: i64,
    vsc_id: u64,
    infraction: i32,
) -> Vec<u8> {
    ConsumerPacketDataV1 {
        r#type: ConsumerPacketDataType::Slash as i32,
        data: Some(consumer_packet_data_v1::Data::SlashPacketData(
            SlashPacketDataV1 {
                validator: Some(tendermint_proto::abci::Validator {
                    address: consumer_addr.to_vec().into(),
                    power,
                }),
                valset_update_id: vsc_id,
                infraction,
            },
        )),
    }
    .encode_to_vec()
}

pub fn vsc_matured_bytes(vsc_id: u64) -> Vec<u8> {
    ConsumerPacketData {
        r#type: ConsumerPacketDataType::Vscm as i32,
        data: Some(consumer_packet_data::Data::VscMaturedPacketData(
            VscMaturedPacketData {
                valset_update_id: vsc_id,
            },
        )),
    }
    .encode_to_vec()
}

/// Wraps packet data in a receive message as the IBC stack would deliver it on
/// our `channel_id`
pub fn recv_packet_msg(channel_id: &str, data: Vec<u8>) -> IbcPacketReceiveMsg {
    let packet = IbcPacket::new(
        Binary::new(data),
        IbcEndpoint {
            port_id: "consumer".to_string(),
            channel_id: "channel-1".to_string(),
        },
        IbcEndpoint {
            port_id: "wasm.provider".to_string(),
            channel_id: channel_id.to_string(),
        },
        1,
        IbcTimeout::with_timestamp(Timestamp::from_seconds(1714999999)),
    );
    IbcPacketReceiveMsg::new(packet, Addr::unchecked("relayer"))
}

pub fn tm_validator_set(validators: &[(&TestValidator, i64)]) -> ValidatorSet {
    let vals: Vec<Validator> = validators
        .iter()
        .map(|(validator, power)| Validator {
            address: validator.cons_addr().as_slice().to_vec(),
            pub_key: Some(tendermint_proto::crypto::PublicKey {
                sum: Some(tendermint_proto::crypto::public_key::Sum::Ed25519(
                    validator.pub_key().to_vec(),
                )),
            }),
            voting_power: *power,
            proposer_priority: 0,
        })
        .collect();
    ValidatorSet {
        proposer: vals.first().cloned(),
        total_voting_power: validators.iter().map(|(_, power)| power).sum(),
        validators: vals,
    }
}

/// Builds a consumer light-client header at the given height and commit round,
/// with a commit signed by `signers` over a block id derived from `block_hash`
#[allow(clippy::too_many_arguments)]
pub fn client_header(
    chain_id: &str,
    height: u64,
    round: i32,
    block_hash: &[u8],
    time_offset: u64,
    valset: &[(&TestValidator, i64)],
    trusted: &[(&TestValidator, i64)],
    signers: &[&TestValidator],
) -> ClientHeader {
    let time = ProtoTimestamp {
        seconds: 1714119228 + time_offset as i64,
        nanos: 0,
    };
    let tm_header = tendermint_proto::types::Header {
        version: Some(tendermint_proto::version::Consensus { block: 11, app: 0 }),
        chain_id: chain_id.to_string(),
        height: height as i64,
        time: Some(time.clone()),
        last_block_id: None,
        last_commit_hash: vec![],
        data_hash: vec![],
        validators_hash: vec![2; 32],
        next_validators_hash: vec![2; 32],
        consensus_hash: vec![],
        app_hash: vec![3; 32],
        last_results_hash: vec![],
        evidence_hash: vec![],
        proposer_address: vec![],
    };

    let mut block_hash32 = block_hash.to_vec();
    block_hash32.resize(32, 0);
    let mut commit = Commit {
        height: height as i64,
        round,
        block_id: Some(BlockId {
            hash: block_hash32,
            part_set_header: Some(PartSetHeader {
                total: 1,
                hash: vec![1; 32],
            }),
        }),
        signatures: vec![],
    };

    for (validator, _) in valset {
        let is_signer = signers
            .iter()
            .any(|signer| signer.pub_key() == validator.pub_key());
        if is_signer {
            let mut sig = CommitSig {
                block_id_flag: BlockIdFlag::Commit as i32,
                validator_address: validator.cons_addr().as_slice().to_vec(),
                timestamp: Some(time.clone()),
                signature: vec![],
            };
            let sign_bytes = canonical_sign_bytes(chain_id, &commit, &sig);
            sig.signature = validator.sign(&sign_bytes);
            commit.signatures.push(sig);
        } else {
            commit.signatures.push(CommitSig {
                block_id_flag: BlockIdFlag::Absent as i32,
                validator_address: vec![],
                timestamp: None,
                signature: vec![],
            });
        }
    }

    ClientHeader {
        signed_header: Some(SignedHeader {
            header: Some(tm_header),
            commit: Some(commit),
        }),
        validator_set: Some(tm_validator_set(valset)),
        trusted_height: Some(ccv_proto::ibc::core::client::v1::Height {
            revision_number: 1,
            revision_height: height.saturating_sub(1),
        }),
        trusted_validators: Some(tm_validator_set(trusted)),
    }
}

pub fn misbehaviour_bytes(client_id: &str, header_1: ClientHeader, header_2: ClientHeader) -> Binary {
    Binary::new(
        Misbehaviour {
            client_id: client_id.to_string(),
            header_1: Some(header_1),
            header_2: Some(header_2),
        }
        .encode_to_vec(),
    )
}

/// Replaces a validator public key in the header's validator set, leaving the
/// signatures untouched
pub fn corrupt_valset_pubkey(header: &mut ClientHeader) {
    let valset = header.validator_set.as_mut().unwrap();
    valset.validators[0].pub_key = Some(tendermint_proto::crypto::PublicKey {
        sum: Some(tendermint_proto::crypto::public_key::Sum::Ed25519(
            vec![7; 32],
        )),
    });
}

/// Flips a byte in the first commit signature of the header
pub fn corrupt_first_signature(header: &mut ClientHeader) {
    let commit = header
        .signed_header
        .as_mut()
        .unwrap()
        .commit
        .as_mut()
        .unwrap();
    let sig = commit
        .signatures
        .iter_mut()
        .find(|sig| sig.block_id_flag == BlockIdFlag::Commit as i32)
        .unwrap();
    sig.signature[0] ^= 0xff;
}
