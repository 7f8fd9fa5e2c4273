mod multitest;

pub use multitest::{
    mock_deps_provider, CcvApp, CcvAppWrapped, CcvError, ProviderDeps, ProviderModule, BLOCK_TIME,
};
