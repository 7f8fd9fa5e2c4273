//! The equivocation verifier: turns IBC light-client misbehaviour (two
//! conflicting consumer headers) into double-sign infractions.
//!
//! A submission is verified as a whole: both headers must carry commits in
//! which more than 2/3 of their validator set's power has valid ed25519
//! signatures over the canonical precommit sign bytes, and more than 1/3 of
//! the trusted validator set's power signed. Any tampered public key or
//! signature rejects the submission. Conflicting headers at the same commit
//! round incriminate exactly the validators that signed both; headers at
//! different rounds are an amnesia attack, which cannot be attributed without
//! additional evidence and yields an empty Byzantine set.
//!
//! Submitting misbehaviour does not freeze the IBC client; client lifecycle
//! stays with the IBC stack.

use cosmwasm_std::{Api, Binary, DepsMut, Env, Event, Response, Storage};
use prost::Message;

use ccv_apis::provider_api::ConsumerConsAddr;
use ccv_bindings::{ProviderMsg, ProviderQuery};
use ccv_proto::ibc::lightclients::tendermint::v1::{Header as ClientHeader, Misbehaviour};
use tendermint_proto::types::{
    BlockIdFlag, CanonicalBlockId, CanonicalPartSetHeader, CanonicalVote, Commit, CommitSig,
    SignedMsgType,
};

use crate::error::{ContractError, EvidenceError};
use crate::slashing;
use crate::state::consumers::{
    consumer_for_client, Consumer, ConsumerPhase, EQUIVOCATION_MIN_HEIGHT,
};
use crate::state::keymap;

/// Handles an equivocation evidence submission. Byzantine validators are fed
/// into the jail/slash executor as double-sign infractions, bypassing the
/// slash throttler. Verification failures are returned to the submitter; no
/// state mutates
pub fn handle_consumer_misbehaviour(
    mut deps: DepsMut<ProviderQuery>,
    env: Env,
    misbehaviour_bz: &Binary,
) -> Result<Response<ProviderMsg>, ContractError> {
    let misbehaviour = Misbehaviour::decode(misbehaviour_bz.as_slice())?;
    let consumer = consumer_for_client(deps.storage, &misbehaviour.client_id)?
        .ok_or_else(|| ContractError::UnknownClient(misbehaviour.client_id.clone()))?;
    if consumer.phase != ConsumerPhase::Launched {
        return Err(ContractError::InvalidConsumerPhase {
            consumer_id: consumer.consumer_id,
            phase: consumer.phase.label().to_string(),
            expected: ConsumerPhase::Launched.label().to_string(),
        });
    }

    let byzantine = check_misbehaviour(deps.api, deps.storage, &consumer, &misbehaviour)?;

    let mut res = Response::new().add_event(
        Event::new("consumer_misbehaviour")
            .add_attribute("module", "provider")
            .add_attribute("consumer_id", &consumer.consumer_id)
            .add_attribute("client_id", &misbehaviour.client_id)
            .add_attribute("byzantine_validators", byzantine.len().to_string()),
    );

    for consumer_addr in byzantine {
        // Byzantine validators without a key mapping are not provider
        // validators; nothing to do for them
        let provider_addr =
            match keymap::provider_addr_for(deps.storage, &consumer.consumer_id, &consumer_addr)? {
                Some(addr) => addr,
                None => continue,
            };
        let (msgs, events) = slashing::slash_for_double_sign(
            &mut deps,
            &consumer.consumer_id,
            &provider_addr,
            &consumer_addr,
            0,
            env.block.height,
        )?;
        res = res.add_messages(msgs).add_events(events);
    }
    Ok(res)
}

/// Verifies a misbehaviour and returns the consumer consensus addresses of
/// the Byzantine validators. An amnesia attack verifies but returns an empty
/// set
pub(crate) fn check_misbehaviour(
    api: &dyn Api,
    storage: &dyn Storage,
    consumer: &Consumer,
    misbehaviour: &Misbehaviour,
) -> Result<Vec<ConsumerConsAddr>, ContractError> {
    let header_1 = misbehaviour
        .header_1
        .as_ref()
        .ok_or(EvidenceError::EmptyHeader {})?;
    let header_2 = misbehaviour
        .header_2
        .as_ref()
        .ok_or(EvidenceError::EmptyHeader {})?;
    let (tm_header_1, commit_1) = unpack_header(header_1)?;
    let (tm_header_2, commit_2) = unpack_header(header_2)?;

    for tm_header in [tm_header_1, tm_header_2] {
        if tm_header.chain_id != consumer.chain_id {
            return Err(EvidenceError::ChainIdMismatch {
                expected: consumer.chain_id.clone(),
                got: tm_header.chain_id.clone(),
            }
            .into());
        }
    }

    let height_1 = header_height(tm_header_1)?;
    let height_2 = header_height(tm_header_2)?;
    if height_1 != height_2 {
        return Err(EvidenceError::HeaderHeightMismatch(height_1, height_2).into());
    }
    let min_height = EQUIVOCATION_MIN_HEIGHT
        .may_load(storage, &consumer.consumer_id)?
        .unwrap_or_default();
    if height_1 < min_height {
        return Err(EvidenceError::BelowMinEvidenceHeight {
            min: min_height,
            got: height_1,
        }
        .into());
    }
    if header_1.signed_header == header_2.signed_header {
        return Err(EvidenceError::IdenticalHeaders {}.into());
    }

    verify_header_commit(api, header_1)?;
    verify_header_commit(api, header_2)?;

    // Differing commit rounds are an amnesia attack: it cannot be attributed
    // without additional evidence, so no validator is incriminated
    if commit_1.round != commit_2.round {
        return Ok(vec![]);
    }
    if block_id_hash(commit_1) == block_id_hash(commit_2) {
        return Err(EvidenceError::IdenticalHeaders {}.into());
    }

    // Equivocation / lunatic attack: the Byzantine set is the validators that
    // signed both conflicting headers
    let valset_2 = header_2
        .validator_set
        .as_ref()
        .ok_or(EvidenceError::MalformedValidatorSet {})?;
    let mut byzantine = vec![];
    for sig in committed_signatures(commit_1) {
        let signed_both = committed_signatures(commit_2)
            .any(|other| other.validator_address == sig.validator_address);
        let in_valset = valset_2
            .validators
            .iter()
            .any(|v| v.address == sig.validator_address);
        if signed_both && in_valset {
            byzantine.push(ConsumerConsAddr::new(sig.validator_address.clone()));
        }
    }
    Ok(byzantine)
}

fn unpack_header(
    header: &ClientHeader,
) -> Result<(&tendermint_proto::types::Header, &Commit), EvidenceError> {
    let signed_header = header
        .signed_header
        .as_ref()
        .ok_or(EvidenceError::EmptyHeader {})?;
    let tm_header = signed_header
        .header
        .as_ref()
        .ok_or(EvidenceError::EmptyHeader {})?;
    let commit = signed_header
        .commit
        .as_ref()
        .ok_or(EvidenceError::EmptyHeader {})?;
    Ok((tm_header, commit))
}

fn header_height(header: &tendermint_proto::types::Header) -> Result<u64, EvidenceError> {
    u64::try_from(header.height).map_err(|_| EvidenceError::EmptyHeader {})
}

fn block_id_hash(commit: &Commit) -> &[u8] {
    commit
        .block_id
        .as_ref()
        .map(|id| id.hash.as_slice())
        .unwrap_or_default()
}

fn committed_signatures(commit: &Commit) -> impl Iterator<Item = &CommitSig> {
    commit
        .signatures
        .iter()
        .filter(|sig| sig.block_id_flag == BlockIdFlag::Commit as i32)
}

/// Verifies a header's commit against its own validator set: every
/// commit signature must be a valid ed25519 signature by the corresponding
/// validator over the canonical precommit sign bytes, more than 2/3 of the
/// set's power must have signed, and more than 1/3 of the trusted validator
/// set's power must have signed. A corrupted validator set or an altered
/// signature rejects the whole header
fn verify_header_commit(api: &dyn Api, header: &ClientHeader) -> Result<(), EvidenceError> {
    let (tm_header, commit) = unpack_header(header)?;
    let valset = header
        .validator_set
        .as_ref()
        .ok_or(EvidenceError::MalformedValidatorSet {})?;

    let total: i64 = valset.validators.iter().map(|v| v.voting_power).sum();
    let trusted = header.trusted_validators.as_ref();
    let trusted_total: i64 = trusted
        .map(|t| t.validators.iter().map(|v| v.voting_power).sum())
        .unwrap_or_default();

    let mut tallied = 0i64;
    let mut trusted_tallied = 0i64;
    for sig in committed_signatures(commit) {
        let validator = valset
            .validators
            .iter()
            .find(|v| v.address == sig.validator_address)
            .ok_or(EvidenceError::MalformedValidatorSet {})?;
        let pub_key = ed25519_key(validator)?;
        let sign_bytes = canonical_sign_bytes(&tm_header.chain_id, commit, sig);
        let valid = api
            .ed25519_verify(&sign_bytes, &sig.signature, pub_key)
            .map_err(|_| EvidenceError::InvalidSignature {})?;
        if !valid {
            return Err(EvidenceError::InvalidSignature {});
        }
        tallied += validator.voting_power;
        if let Some(trusted) = trusted {
            if let Some(trusted_val) = trusted
                .validators
                .iter()
                .find(|v| v.address == sig.validator_address)
            {
                trusted_tallied += trusted_val.voting_power;
            }
        }
    }

    if tallied * 3 <= total * 2 {
        return Err(EvidenceError::InsufficientVotingPower { tallied, total });
    }
    if trusted.is_some() && trusted_tallied * 3 <= trusted_total {
        return Err(EvidenceError::InsufficientVotingPower {
            tallied: trusted_tallied,
            total: trusted_total,
        });
    }
    Ok(())
}

fn ed25519_key(validator: &tendermint_proto::types::Validator) -> Result<&[u8], EvidenceError> {
    match validator.pub_key.as_ref().and_then(|pk| pk.sum.as_ref()) {
        Some(tendermint_proto::crypto::public_key::Sum::Ed25519(bz)) => Ok(bz.as_slice()),
        _ => Err(EvidenceError::MalformedValidatorSet {}),
    }
}

/// The canonical precommit sign bytes for a commit signature: the
/// length-delimited protobuf encoding of the canonical vote
pub(crate) fn canonical_sign_bytes(chain_id: &str, commit: &Commit, sig: &CommitSig) -> Vec<u8> {
    let canonical = CanonicalVote {
        r#type: SignedMsgType::Precommit as i32,
        height: commit.height,
        round: commit.round as i64,
        block_id: commit.block_id.as_ref().map(|block_id| CanonicalBlockId {
            hash: block_id.hash.clone(),
            part_set_header: block_id.part_set_header.as_ref().map(|psh| {
                CanonicalPartSetHeader {
                    total: psh.total,
                    hash: psh.hash.clone(),
                }
            }),
        }),
        timestamp: sig.timestamp.clone(),
        chain_id: chain_id.to_string(),
    };
    canonical.encode_length_delimited_to_vec()
}
