use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Sha256, Sha512};

use crate::error::OtpError;

// HOTP https://datatracker.ietf.org/doc/html/rfc4226

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;
type HmacSha512 = Hmac<Sha512>;

/// HMAC digest selection for the HOTP/TOTP transform.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Sha1,
    Sha256,
    Sha512,
}

impl Default for HashAlgorithm {
    fn default() -> Self {
        HashAlgorithm::Sha1
    }
}

impl HashAlgorithm {
    pub fn as_str(&self) -> &str {
        match self {
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha512 => "sha512",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = OtpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha1" => Ok(HashAlgorithm::Sha1),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha512" => Ok(HashAlgorithm::Sha512),
            other => Err(OtpError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// Compute an HOTP value: HMAC over the 8-byte big-endian counter,
/// dynamically truncated and reduced mod 10^digits.
pub fn get_hotp(secret: &[u8], counter: u64, algorithm: HashAlgorithm, digits: u32) -> u32 {
    let hmac = make_hmac(secret, counter, algorithm);
    truncate(&hmac, digits)
}

// 20/32/64 byte digest for sha1/sha256/sha512
fn make_hmac(secret: &[u8], counter: u64, algorithm: HashAlgorithm) -> Vec<u8> {
    let block = counter.to_be_bytes();
    match algorithm {
        HashAlgorithm::Sha1 => {
            let mut mac = HmacSha1::new_from_slice(secret).expect("HMAC accepts any key length");
            mac.update(&block);
            mac.finalize().into_bytes().to_vec()
        }
        HashAlgorithm::Sha256 => {
            let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
            mac.update(&block);
            mac.finalize().into_bytes().to_vec()
        }
        HashAlgorithm::Sha512 => {
            let mut mac = HmacSha512::new_from_slice(secret).expect("HMAC accepts any key length");
            mac.update(&block);
            mac.finalize().into_bytes().to_vec()
        }
    }
}

// reduce to 4 byte string
// then s to num mod 10^Digit
fn truncate(hmac: &[u8], digits: u32) -> u32 {
    let base_code = dynamic_truncation(hmac);

    // base_code is 31-bit; 10^10 needs u64 but the result still fits u32
    (base_code as u64 % 10u64.pow(digits)) as u32
}

// DT(String) // String = String[0]...String[last]
// Let OffsetBits be the low-order 4 bits of String[last]
// Offset = StToNum(OffsetBits) // 0 <= OffSet <= 15
// Let P = String[OffSet]...String[OffSet+3]
// Return the Last 31 bits of P
fn dynamic_truncation(hmac: &[u8]) -> u32 {
    let offset = (hmac[hmac.len() - 1] & 0xf) as usize;
    let code = (hmac[offset] as u32 & 0x7f) << 24
        | (hmac[offset + 1] as u32 & 0xff) << 16
        | (hmac[offset + 2] as u32 & 0xff) << 8
        | (hmac[offset + 3] as u32 & 0xff);
    code
}
