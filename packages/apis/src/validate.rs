use crate::error::ProviderApiError;
use crate::provider_api::{ValidatorUpdate, ED25519_PUBKEY_LEN};

/// A trait for validating the API structs / input.
pub trait Validate {
    fn validate(&self) -> Result<(), ProviderApiError>;
}

impl Validate for ValidatorUpdate {
    fn validate(&self) -> Result<(), ProviderApiError> {
        if self.pub_key.len() != ED25519_PUBKEY_LEN {
            return Err(ProviderApiError::InvalidPubKeyLength(
                self.pub_key.len(),
                ED25519_PUBKEY_LEN,
            ));
        }
        // Power zero is a removal instruction; only negative powers are invalid
        if self.power < 0 {
            return Err(ProviderApiError::NegativePower(self.power));
        }
        Ok(())
    }
}
