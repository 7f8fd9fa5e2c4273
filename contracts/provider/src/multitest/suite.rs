use anyhow::Result as AnyResult;
use derivative::Derivative;

use cosmwasm_std::{Addr, Decimal, Timestamp, Uint128};

use cw_multi_test::{AppResponse, Contract, ContractWrapper, Executor};

use ccv_apis::provider_api::{SudoMsg, ValidatorUpdate};
use ccv_bindings::{BondedValidator, ProviderMsg, ProviderQuery, SigningInfoResponse};
use ccv_bindings_test::CcvApp;

use crate::msg::{
    ConsumerResponse, ConsumersResponse, InstantiateMsg, KeyAssignmentResponse,
    ProviderAddrResponse, QueryMsg, SlashMeterResponse, ThrottleQueueResponse,
    ValsetUpdateIdResponse,
};
use crate::msg::ExecuteMsg;
use crate::state::config::Params;

fn contract_provider() -> Box<dyn Contract<ProviderMsg, ProviderQuery>> {
    let contract = ContractWrapper::new(
        crate::contract::execute,
        crate::contract::instantiate,
        crate::contract::query,
    )
    .with_sudo(crate::contract::sudo);
    Box::new(contract)
}

#[derive(Derivative)]
#[derivative(Default = "new")]
pub struct SuiteBuilder {
    height: Option<u64>,
    params: Option<Params>,
    validators: Vec<BondedValidator>,
}

impl SuiteBuilder {
    #[allow(dead_code)]
    pub fn with_height(mut self, height: u64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_validator(mut self, cons_addr: &str, power: i64, tokens: u128) -> Self {
        self.validators.push(BondedValidator {
            cons_addr: cons_addr.to_string(),
            pub_key: cosmwasm_std::Binary::new(vec![self.validators.len() as u8 + 1; 32]),
            power,
            tokens: Uint128::new(tokens),
            jailed: false,
        });
        self
    }

    #[track_caller]
    pub fn build(self) -> Suite {
        let mut app = CcvApp::new_at_height("owner", self.height.unwrap_or(1));
        let owner = app.api().addr_make("owner");
        for validator in &self.validators {
            app.add_validator(validator);
        }

        let code_id = app.store_code_with_creator(owner.clone(), contract_provider());
        let provider = app
            .instantiate_contract(
                code_id,
                owner.clone(),
                &InstantiateMsg {
                    params: self.params,
                    admin: Some(owner.to_string()),
                },
                &[],
                "provider",
                Some(owner.to_string()),
            )
            .unwrap();

        Suite {
            app,
            code_id,
            provider,
            owner,
        }
    }
}

#[derive(Derivative)]
#[derivative(Debug)]
pub struct Suite {
    #[derivative(Debug = "ignore")]
    pub app: CcvApp,
    /// The code id of the provider contract
    #[allow(dead_code)]
    code_id: u64,
    /// Provider contract address
    pub provider: Addr,
    /// Admin of the provider contract
    pub owner: Addr,
}

impl Suite {
    #[track_caller]
    pub fn get_params(&self) -> Params {
        self.app
            .wrap()
            .query_wasm_smart(self.provider.clone(), &QueryMsg::Params {})
            .unwrap()
    }

    #[track_caller]
    pub fn get_consumer(&self, consumer_id: &str) -> ConsumerResponse {
        self.app
            .wrap()
            .query_wasm_smart(
                self.provider.clone(),
                &QueryMsg::Consumer {
                    consumer_id: consumer_id.to_string(),
                },
            )
            .unwrap()
    }

    #[track_caller]
    pub fn list_consumers(&self) -> ConsumersResponse {
        self.app
            .wrap()
            .query_wasm_smart(
                self.provider.clone(),
                &QueryMsg::Consumers {
                    start_after: None,
                    limit: None,
                },
            )
            .unwrap()
    }

    #[track_caller]
    pub fn get_slash_meter(&self) -> SlashMeterResponse {
        self.app
            .wrap()
            .query_wasm_smart(self.provider.clone(), &QueryMsg::SlashMeter {})
            .unwrap()
    }

    #[track_caller]
    pub fn get_valset_update_id(&self) -> u64 {
        let res: ValsetUpdateIdResponse = self
            .app
            .wrap()
            .query_wasm_smart(self.provider.clone(), &QueryMsg::ValsetUpdateId {})
            .unwrap();
        res.vsc_id
    }

    #[track_caller]
    pub fn get_key_assignment(
        &self,
        consumer_id: &str,
        provider_cons_addr: &str,
    ) -> KeyAssignmentResponse {
        self.app
            .wrap()
            .query_wasm_smart(
                self.provider.clone(),
                &QueryMsg::KeyAssignment {
                    consumer_id: consumer_id.to_string(),
                    provider_cons_addr: provider_cons_addr.to_string(),
                },
            )
            .unwrap()
    }

    #[track_caller]
    pub fn get_provider_addr(
        &self,
        consumer_id: &str,
        consumer_cons_addr: &str,
    ) -> ProviderAddrResponse {
        self.app
            .wrap()
            .query_wasm_smart(
                self.provider.clone(),
                &QueryMsg::ProviderAddr {
                    consumer_id: consumer_id.to_string(),
                    consumer_cons_addr: consumer_cons_addr.to_string(),
                },
            )
            .unwrap()
    }

    #[track_caller]
    pub fn get_throttle_queue(&self) -> ThrottleQueueResponse {
        self.app
            .wrap()
            .query_wasm_smart(self.provider.clone(), &QueryMsg::ThrottleQueue {})
            .unwrap()
    }

    #[track_caller]
    pub fn register_consumer(&mut self, chain_id: &str) -> AnyResult<String> {
        let res = self.app.execute_contract(
            self.owner.clone(),
            self.provider.clone(),
            &ExecuteMsg::RegisterConsumer {
                chain_id: chain_id.to_string(),
            },
            &[],
        )?;
        // The assigned id is reported in the register_consumer event
        let consumer_id = res
            .events
            .iter()
            .find(|ev| ev.ty == "wasm-register_consumer")
            .and_then(|ev| {
                ev.attributes
                    .iter()
                    .find(|attr| attr.key == "consumer_id")
                    .map(|attr| attr.value.clone())
            })
            .expect("register_consumer event with consumer_id");
        Ok(consumer_id)
    }

    #[track_caller]
    pub fn initialize_consumer(
        &mut self,
        consumer_id: &str,
        client_id: &str,
        connection_id: &str,
    ) -> AnyResult<AppResponse> {
        self.app.execute_contract(
            self.owner.clone(),
            self.provider.clone(),
            &ExecuteMsg::InitializeConsumer {
                consumer_id: consumer_id.to_string(),
                client_id: client_id.to_string(),
                connection_id: connection_id.to_string(),
            },
            &[],
        )
    }

    #[track_caller]
    pub fn stop_consumer(&mut self, consumer_id: &str) -> AnyResult<AppResponse> {
        self.app.execute_contract(
            self.owner.clone(),
            self.provider.clone(),
            &ExecuteMsg::StopConsumer {
                consumer_id: consumer_id.to_string(),
            },
            &[],
        )
    }

    #[track_caller]
    pub fn delete_consumer(&mut self, consumer_id: &str) -> AnyResult<AppResponse> {
        self.app.execute_contract(
            self.owner.clone(),
            self.provider.clone(),
            &ExecuteMsg::DeleteConsumer {
                consumer_id: consumer_id.to_string(),
            },
            &[],
        )
    }

    #[track_caller]
    pub fn assign_consumer_key(
        &mut self,
        consumer_id: &str,
        provider_cons_addr: &str,
        consumer_pub_key: Vec<u8>,
    ) -> AnyResult<AppResponse> {
        self.app.execute_contract(
            self.owner.clone(),
            self.provider.clone(),
            &ExecuteMsg::AssignConsumerKey {
                consumer_id: consumer_id.to_string(),
                provider_cons_addr: provider_cons_addr.to_string(),
                consumer_pub_key: consumer_pub_key.into(),
            },
            &[],
        )
    }

    #[track_caller]
    pub fn update_params(&mut self, params: Params) -> AnyResult<AppResponse> {
        self.app.execute_contract(
            self.owner.clone(),
            self.provider.clone(),
            &ExecuteMsg::UpdateParams { params },
            &[],
        )
    }

    #[track_caller]
    pub fn call_begin_block(&mut self, height: u64) -> AnyResult<AppResponse> {
        let mut block = self.app.block_info();
        block.height = height;
        self.app.set_block(block);

        self.app
            .wasm_sudo(self.provider.clone(), &SudoMsg::BeginBlock {})
    }

    #[track_caller]
    pub fn call_end_block(
        &mut self,
        height: u64,
        validator_updates: Vec<ValidatorUpdate>,
    ) -> AnyResult<AppResponse> {
        let mut block = self.app.block_info();
        block.height = height;
        self.app.set_block(block);

        self.app.wasm_sudo(
            self.provider.clone(),
            &SudoMsg::EndBlock { validator_updates },
        )
    }

    pub fn advance_time(&mut self, seconds: u64) {
        self.app.advance_seconds(seconds);
    }

    /// Executes a bindings message against the mock chain module, standing in
    /// for the contract-emitted executor messages
    #[track_caller]
    pub fn execute_provider_msg(&mut self, msg: ProviderMsg) -> AnyResult<AppResponse> {
        let provider = self.provider.clone();
        self.app.execute(provider, msg.into())
    }

    pub fn validator(&self, cons_addr: &str) -> Option<BondedValidator> {
        self.app.validator(cons_addr)
    }

    pub fn set_validator_power(&mut self, cons_addr: &str, power: i64) {
        self.app.set_validator_power(cons_addr, power);
    }

    pub fn take_validator_updates(&mut self) -> Vec<ValidatorUpdate> {
        self.app.take_validator_updates()
    }

    pub fn signing_info(&self, cons_addr: &str) -> SigningInfoResponse {
        self.app.signing_info(cons_addr)
    }

    pub fn slash_fraction(&self) -> Decimal {
        self.get_params().double_sign_slash_fraction
    }

    pub fn block_time(&self) -> Timestamp {
        self.app.block_info().time
    }
}
