use soroban_sdk::String;

use crate::ContractError;

const MAX_NAME_LEN: u32 = 256;

const MAX_IDENTIFIER_LEN: u32 = 64;
const MAX_TEXT_LEN: u32 = 1024;

/// Validate a display name (people, facilities, record titles, drugs,
/// payment methods). Any UTF-8 up to MAX_NAME_LEN bytes, empty included.
pub fn validate_name(name: &String) -> Result<(), ContractError> {
    if name.len() > MAX_NAME_LEN {
        return Err(ContractError::InvalidInput);
    }
    Ok(())
}

/// Validate an external identifier such as a patient id or a facility
/// registration number.
pub fn validate_identifier(id: &String) -> Result<(), ContractError> {
    let len = id.len();
    if len == 0 || len > MAX_IDENTIFIER_LEN {
        return Err(ContractError::InvalidInput);
    }

    let mut buf = [0u8; MAX_IDENTIFIER_LEN as usize];
    id.copy_into_slice(&mut buf[..len as usize]);

    let valid = buf[..len as usize]
        .iter()
        .all(|&b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if !valid {
        return Err(ContractError::InvalidInput);
    }

    Ok(())
}

/// Free text (contact details, record detail, advice). Only the length is
/// bounded; empty text is allowed.
pub fn validate_text(text: &String) -> Result<(), ContractError> {
    if text.len() > MAX_TEXT_LEN {
        return Err(ContractError::InvalidInput);
    }
    Ok(())
}
