pub mod error;
pub mod provider_api;
mod validate;

pub type Bytes = Vec<u8>;

pub use validate::Validate;
