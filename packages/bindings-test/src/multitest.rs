use anyhow::{bail, Result as AnyResult};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use thiserror::Error;

use cosmwasm_std::testing::{MockApi, MockQuerier, MockStorage};
use cosmwasm_std::{
    to_json_binary, Addr, Api, Binary, BlockInfo, ContractResult, CustomQuery, OwnedDeps, Querier,
    QuerierResult, StdError, StdResult, Storage, SystemResult, Timestamp,
};
use cw_multi_test::{
    App, AppResponse, BankKeeper, BasicAppBuilder, CosmosRouter, IbcAcceptingModule, Module,
    WasmKeeper,
};
use cw_storage_plus::{Item, Map};

use ccv_apis::provider_api::ValidatorUpdate;
use ccv_bindings::{
    BondedValidator, BondedValidatorsResponse, ProviderMsg, ProviderQuery, SigningInfoResponse,
    TotalBondedPowerResponse, ValidatorResponse,
};

/// ProviderModule is a mock of the provider chain's staking and slashing
/// modules: it executes the contract's `ProviderMsg` bindings against its own
/// validator store and serves the `ProviderQuery` read surface from it
pub struct ProviderModule {}

/// How many seconds per block
/// (when we increment block.height, use this multiplier for block.time)
pub const BLOCK_TIME: u64 = 5;

/// Validators by hex-encoded provider consensus address
const VALIDATORS: Map<&str, BondedValidator> = Map::new("validators");
/// Signing infos by hex-encoded provider consensus address
const SIGNING_INFOS: Map<&str, SigningInfoResponse> = Map::new("signing_infos");
/// Pending validator power updates the staking module produced this block
const VALIDATOR_UPDATES: Item<Vec<ValidatorUpdate>> = Item::new("validator_updates");

pub type ProviderDeps = OwnedDeps<MockStorage, MockApi, MockQuerier<ProviderQuery>, ProviderQuery>;

/// `mock_deps_provider` returns mock dependencies whose custom querier serves
/// the `ProviderQuery` interface from the given validator and signing-info
/// sets. Intended for contract unit tests
pub fn mock_deps_provider(
    validators: Vec<BondedValidator>,
    signing_infos: Vec<(String, SigningInfoResponse)>,
) -> ProviderDeps {
    let querier = MockQuerier::<ProviderQuery>::new(&[]).with_custom_handler(move |query| {
        let res = handle_provider_query(&validators, &signing_infos, query);
        match res {
            Ok(bin) => SystemResult::Ok(ContractResult::Ok(bin)),
            Err(err) => SystemResult::Ok(ContractResult::Err(err.to_string())),
        }
    });
    OwnedDeps {
        storage: MockStorage::default(),
        api: MockApi::default(),
        querier,
        custom_query_type: PhantomData,
    }
}

fn handle_provider_query(
    validators: &[BondedValidator],
    signing_infos: &[(String, SigningInfoResponse)],
    query: &ProviderQuery,
) -> StdResult<Binary> {
    match query {
        ProviderQuery::BondedValidatorsByPower { limit } => {
            let mut bonded: Vec<_> = validators.iter().filter(|v| !v.jailed).cloned().collect();
            bonded.sort_by(|a, b| b.power.cmp(&a.power));
            if let Some(limit) = limit {
                bonded.truncate(*limit as usize);
            }
            to_json_binary(&BondedValidatorsResponse { validators: bonded })
        }
        ProviderQuery::ValidatorByConsAddr { cons_addr } => to_json_binary(&ValidatorResponse {
            validator: validators.iter().find(|v| &v.cons_addr == cons_addr).cloned(),
        }),
        ProviderQuery::SigningInfo { cons_addr } => {
            let info = signing_infos
                .iter()
                .find(|(addr, _)| addr == cons_addr)
                .map(|(_, info)| info.clone())
                .unwrap_or_default();
            to_json_binary(&info)
        }
        ProviderQuery::TotalBondedPower {} => {
            let power = validators.iter().filter(|v| !v.jailed).map(|v| v.power).sum();
            to_json_binary(&TotalBondedPowerResponse { power })
        }
    }
}

impl ProviderModule {
    /// Registers a bonded validator in the mock staking store
    pub fn add_validator(
        &self,
        storage: &mut dyn Storage,
        validator: &BondedValidator,
    ) -> StdResult<()> {
        VALIDATORS.save(storage, &validator.cons_addr, validator)
    }

    pub fn get_validator(
        &self,
        storage: &dyn Storage,
        cons_addr: &str,
    ) -> StdResult<Option<BondedValidator>> {
        VALIDATORS.may_load(storage, cons_addr)
    }

    pub fn get_signing_info(
        &self,
        storage: &dyn Storage,
        cons_addr: &str,
    ) -> StdResult<SigningInfoResponse> {
        Ok(SIGNING_INFOS
            .may_load(storage, cons_addr)?
            .unwrap_or_default())
    }

    /// Changes a validator's power and records the corresponding pending
    /// update, the way the staking end-blocker would
    pub fn set_validator_power(
        &self,
        storage: &mut dyn Storage,
        cons_addr: &str,
        power: i64,
    ) -> StdResult<()> {
        let mut validator = VALIDATORS
            .may_load(storage, cons_addr)?
            .ok_or_else(|| StdError::generic_err(format!("validator not found: {cons_addr}")))?;
        validator.power = power;
        VALIDATORS.save(storage, cons_addr, &validator)?;
        push_validator_update(
            storage,
            ValidatorUpdate {
                pub_key: validator.pub_key,
                power,
            },
        )
    }

    /// Drains the pending validator updates produced since the last call
    pub fn take_validator_updates(
        &self,
        storage: &mut dyn Storage,
    ) -> StdResult<Vec<ValidatorUpdate>> {
        let updates = VALIDATOR_UPDATES.may_load(storage)?.unwrap_or_default();
        VALIDATOR_UPDATES.save(storage, &vec![])?;
        Ok(updates)
    }
}

fn push_validator_update(storage: &mut dyn Storage, update: ValidatorUpdate) -> StdResult<()> {
    let mut updates = VALIDATOR_UPDATES.may_load(storage)?.unwrap_or_default();
    updates.retain(|u| u.pub_key != update.pub_key);
    updates.push(update);
    VALIDATOR_UPDATES.save(storage, &updates)
}

impl Module for ProviderModule {
    type ExecT = ProviderMsg;
    type QueryT = ProviderQuery;
    type SudoT = cosmwasm_std::Empty;

    fn execute<ExecC, QueryC>(
        &self,
        _api: &dyn Api,
        storage: &mut dyn Storage,
        _router: &dyn CosmosRouter<ExecC = ExecC, QueryC = QueryC>,
        block: &BlockInfo,
        _sender: Addr,
        msg: ProviderMsg,
    ) -> AnyResult<AppResponse>
    where
        ExecC: Debug + Clone + PartialEq + JsonSchema + DeserializeOwned + 'static,
        QueryC: CustomQuery + DeserializeOwned + 'static,
    {
        match msg {
            ProviderMsg::Jail { cons_addr } => {
                let mut validator = VALIDATORS
                    .may_load(storage, &cons_addr)?
                    .ok_or_else(|| StdError::generic_err("validator not found"))?;
                if !validator.jailed {
                    validator.jailed = true;
                    VALIDATORS.save(storage, &cons_addr, &validator)?;
                    // Jailing removes the validator from the active set at the
                    // next end-of-block
                    push_validator_update(
                        storage,
                        ValidatorUpdate {
                            pub_key: validator.pub_key,
                            power: 0,
                        },
                    )?;
                }
                Ok(AppResponse::default())
            }
            ProviderMsg::JailUntil { cons_addr, until } => {
                let mut info = SIGNING_INFOS
                    .may_load(storage, &cons_addr)?
                    .unwrap_or_default();
                info.jailed_until = until;
                SIGNING_INFOS.save(storage, &cons_addr, &info)?;
                Ok(AppResponse::default())
            }
            ProviderMsg::Tombstone { cons_addr } => {
                let mut info = SIGNING_INFOS
                    .may_load(storage, &cons_addr)?
                    .unwrap_or_default();
                if info.tombstoned {
                    bail!("validator already tombstoned: {cons_addr}");
                }
                info.tombstoned = true;
                SIGNING_INFOS.save(storage, &cons_addr, &info)?;
                Ok(AppResponse::default())
            }
            ProviderMsg::Slash {
                cons_addr,
                infraction_height,
                slash_fraction,
                ..
            } => {
                if infraction_height > block.height {
                    bail!("infraction height {infraction_height} is in the future");
                }
                let mut validator = VALIDATORS
                    .may_load(storage, &cons_addr)?
                    .ok_or_else(|| StdError::generic_err("validator not found"))?;
                let slashed = validator.tokens.mul_floor(slash_fraction);
                validator.tokens -= slashed;
                VALIDATORS.save(storage, &cons_addr, &validator)?;
                Ok(AppResponse::default())
            }
        }
    }

    fn query(
        &self,
        _api: &dyn Api,
        storage: &dyn Storage,
        _querier: &dyn Querier,
        _block: &BlockInfo,
        request: ProviderQuery,
    ) -> AnyResult<Binary> {
        let validators = VALIDATORS
            .range(storage, None, None, cosmwasm_std::Order::Ascending)
            .map(|item| item.map(|(_, v)| v))
            .collect::<StdResult<Vec<_>>>()?;
        let signing_infos = SIGNING_INFOS
            .range(storage, None, None, cosmwasm_std::Order::Ascending)
            .collect::<StdResult<Vec<_>>>()?;
        Ok(handle_provider_query(&validators, &signing_infos, &request)?)
    }

    fn sudo<ExecC, QueryC>(
        &self,
        _api: &dyn Api,
        _storage: &mut dyn Storage,
        _router: &dyn CosmosRouter<ExecC = ExecC, QueryC = QueryC>,
        _block: &BlockInfo,
        _msg: Self::SudoT,
    ) -> AnyResult<AppResponse>
    where
        ExecC: Debug + Clone + PartialEq + JsonSchema + DeserializeOwned + 'static,
        QueryC: CustomQuery + DeserializeOwned + 'static,
    {
        bail!("sudo not implemented for ProviderModule")
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum CcvError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

pub type CcvAppWrapped = App<
    BankKeeper,
    MockApi,
    MockStorage,
    ProviderModule,
    WasmKeeper<ProviderMsg, ProviderQuery>,
    cw_multi_test::StakeKeeper,
    cw_multi_test::DistributionKeeper,
    IbcAcceptingModule,
>;

pub struct CcvApp(CcvAppWrapped);

impl Deref for CcvApp {
    type Target = CcvAppWrapped;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for CcvApp {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Querier for CcvApp {
    fn raw_query(&self, bin_request: &[u8]) -> QuerierResult {
        self.0.raw_query(bin_request)
    }
}

impl CcvApp {
    pub fn new(owner: &str) -> Self {
        Self::new_at_height(owner, 1)
    }

    pub fn new_at_height(owner: &str, height: u64) -> Self {
        let _owner = Addr::unchecked(owner);
        let block_info = BlockInfo {
            height,
            time: Timestamp::from_seconds(1714119228),
            chain_id: "provider-testnet-1".to_owned(),
        };

        Self(
            BasicAppBuilder::<ProviderMsg, ProviderQuery>::new_custom()
                .with_custom(ProviderModule {})
                .with_ibc(IbcAcceptingModule::new())
                .with_block(block_info)
                .build(|_router, _, _storage| {}),
        )
    }

    pub fn block_info(&self) -> BlockInfo {
        self.0.block_info()
    }

    /// Registers a bonded validator in the mock staking module
    pub fn add_validator(&mut self, validator: &BondedValidator) {
        self.init_modules(|router, _api, storage| {
            router.custom.add_validator(storage, validator).unwrap();
        });
    }

    /// Returns the mock staking module's view of a validator
    pub fn validator(&self, cons_addr: &str) -> Option<BondedValidator> {
        ccv_bindings::query_validator_by_cons_addr(&self.wrap(), cons_addr).unwrap()
    }

    /// Returns the mock slashing module's signing info for a validator
    pub fn signing_info(&self, cons_addr: &str) -> SigningInfoResponse {
        ccv_bindings::query_signing_info(&self.wrap(), cons_addr).unwrap()
    }

    /// Changes a validator's power in the mock staking module, recording the
    /// corresponding pending update
    pub fn set_validator_power(&mut self, cons_addr: &str, power: i64) {
        self.init_modules(|router, _api, storage| {
            router
                .custom
                .set_validator_power(storage, cons_addr, power)
                .unwrap();
        });
    }

    /// Drains the validator updates the mock staking module produced since the
    /// last call; feed these into the contract's end-block callback
    pub fn take_validator_updates(&mut self) -> Vec<ValidatorUpdate> {
        self.init_modules(|router, _api, storage| {
            router.custom.take_validator_updates(storage).unwrap()
        })
    }

    /// This advances BlockInfo by given number of blocks.
    /// It does not do any callbacks, but keeps the ratio of seconds/block
    pub fn advance_blocks(&mut self, blocks: u64) {
        self.update_block(|block| {
            block.time = block.time.plus_seconds(BLOCK_TIME * blocks);
            block.height += blocks;
        });
    }

    /// This advances BlockInfo by given number of seconds.
    /// It does not do any callbacks, but keeps the ratio of seconds/block
    pub fn advance_seconds(&mut self, seconds: u64) {
        self.update_block(|block| {
            block.time = block.time.plus_seconds(seconds);
            block.height += std::cmp::max(1, seconds / BLOCK_TIME);
        });
    }
}
