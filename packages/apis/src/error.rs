use hex::FromHexError;
use thiserror::Error;

use cosmwasm_std::StdError;

#[derive(Error, Debug, PartialEq)]
pub enum ProviderApiError {
    #[error("{0}")]
    Std(#[from] StdError),
    #[error("{0}")]
    HexError(#[from] FromHexError),
    #[error("Invalid consensus address length; got: {0}, expected: {1}")]
    InvalidConsAddressLength(usize, usize),
    #[error("Invalid ed25519 public key length; got: {0}, expected: {1}")]
    InvalidPubKeyLength(usize, usize),
    #[error("Validator power cannot be negative; got: {0}")]
    NegativePower(i64),
    #[error("Unspecified infraction")]
    UnspecifiedInfraction,
}
