use data_encoding::{BASE32, BASE32_NOPAD};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::OtpError;

// Generate a 20 byte random base32 secret
pub fn generate_secret() -> String {
    let mut dest = [0u8; 20];
    OsRng.fill_bytes(&mut dest);
    BASE32_NOPAD.encode(&dest)
}

/// Decode an RFC 4648 Base32 key, case-insensitive, accepting standard
/// `=` padding or none.
pub fn decode_base32_key(key: &str) -> Result<Vec<u8>, OtpError> {
    let normalized = key.to_uppercase();
    let decoded = if normalized.ends_with('=') {
        BASE32.decode(normalized.as_bytes())
    } else {
        BASE32_NOPAD.decode(normalized.as_bytes())
    };
    decoded.map_err(|err| OtpError::InvalidSecret(err.to_string()))
}

// Validate key provided in arguments is a valid base32 encoding
pub fn is_base32_key(value: &str) -> Result<(), String> {
    match decode_base32_key(value) {
        Ok(_) => Ok(()),
        Err(_) => Err(String::from("the key is not a valid base32 encoding")),
    }
}
