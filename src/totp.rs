use std::time::SystemTime;

use subtle::ConstantTimeEq;

use crate::error::OtpError;
use crate::hotp::{get_hotp, HashAlgorithm};
use crate::utils::decode_base32_key;

// TOTP https://datatracker.ietf.org/doc/html/rfc6238
//
// HOTP with a time-based moving factor: the counter is the number of
// whole time steps elapsed since the configured epoch.

/// Time source, injected so tests can pin the clock.
pub trait GetTime {
    fn get_now(&self) -> SystemTime;
}

pub struct Clock {}

impl Clock {
    pub fn new() -> Self {
        Clock {}
    }
}

impl GetTime for Clock {
    fn get_now(&self) -> SystemTime {
        SystemTime::now()
    }
}

const MAX_DIGITS: u32 = 10;
const MAX_SKEW_WINDOW: u64 = 10;

/// Per-service TOTP parameters. Validated when an engine is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TotpConfig {
    /// Reference time origin, seconds since the Unix epoch.
    pub epoch: u64,
    /// Time-step interval in seconds.
    pub step: u64,
    pub algorithm: HashAlgorithm,
    /// Output code length; the truncated value is reduced mod 10^digits.
    pub digits: u32,
}

impl Default for TotpConfig {
    fn default() -> Self {
        TotpConfig {
            epoch: 0,
            step: 30,
            algorithm: HashAlgorithm::Sha1,
            digits: 6,
        }
    }
}

impl TotpConfig {
    fn validate(&self) -> Result<(), OtpError> {
        if self.step == 0 {
            return Err(OtpError::InvalidConfig(String::from(
                "step must be positive",
            )));
        }
        if self.digits == 0 || self.digits > MAX_DIGITS {
            return Err(OtpError::InvalidConfig(format!(
                "digits must be between 1 and {}, got {}",
                MAX_DIGITS, self.digits
            )));
        }
        Ok(())
    }
}

/// A TOTP generator/verifier for one shared secret. Holds no mutable
/// state after construction, so shared references are safe across threads.
pub struct TotpEngine {
    secret: Vec<u8>,
    config: TotpConfig,
}

impl TotpEngine {
    /// Build an engine from raw key bytes.
    pub fn new(secret: Vec<u8>, config: TotpConfig) -> Result<Self, OtpError> {
        config.validate()?;
        Ok(TotpEngine { secret, config })
    }

    /// Build an engine from an RFC 4648 Base32 key, case-insensitive,
    /// with or without trailing `=` padding.
    pub fn from_base32(key: &str, config: TotpConfig) -> Result<Self, OtpError> {
        let secret = decode_base32_key(key)?;
        TotpEngine::new(secret, config)
    }

    /// The code for the time step containing `at` (seconds since the Unix
    /// epoch), as a zero-padded decimal string of exactly `digits` chars.
    pub fn generate(&self, at: u64) -> Result<String, OtpError> {
        let counter = self.counter_at(at)?;
        let code = get_hotp(
            &self.secret,
            counter,
            self.config.algorithm,
            self.config.digits,
        );
        Ok(format!(
            "{:0width$}",
            code,
            width = self.config.digits as usize
        ))
    }

    /// The code for the current wall-clock time step.
    pub fn now(&self, clock: &impl GetTime) -> Result<String, OtpError> {
        self.generate(unix_secs(clock))
    }

    /// Exact-step verification of a candidate code.
    pub fn verify(&self, candidate: &str, at: u64) -> Result<bool, OtpError> {
        let expected = self.generate(at)?;
        Ok(codes_match(candidate, &expected))
    }

    /// Verification tolerating clock skew: accepts the code for the step
    /// containing `at` or any step within +/- `window` steps, up to a
    /// window of 10. A window of zero is the exact check. Steps preceding
    /// the epoch or past the end of the counter range are skipped.
    pub fn verify_with_skew(
        &self,
        candidate: &str,
        at: u64,
        window: u64,
    ) -> Result<bool, OtpError> {
        if window > MAX_SKEW_WINDOW {
            return Err(OtpError::InvalidConfig(format!(
                "skew window must be at most {}, got {}",
                MAX_SKEW_WINDOW, window
            )));
        }

        // Always evaluate the current step so pre-epoch timestamps fail
        // loudly rather than being skipped.
        let mut matched = self.verify(candidate, at)?;
        for i in 1..=window {
            let drift = match i.checked_mul(self.config.step) {
                Some(drift) => drift,
                None => break,
            };
            if let Some(earlier) = at.checked_sub(drift) {
                if earlier >= self.config.epoch {
                    matched |= codes_match(candidate, &self.generate(earlier)?);
                }
            }
            if let Some(later) = at.checked_add(drift) {
                matched |= codes_match(candidate, &self.generate(later)?);
            }
        }
        Ok(matched)
    }

    // moving factor: whole steps elapsed since the epoch
    fn counter_at(&self, at: u64) -> Result<u64, OtpError> {
        if at < self.config.epoch {
            return Err(OtpError::InvalidConfig(format!(
                "timestamp {} precedes epoch {}",
                at, self.config.epoch
            )));
        }
        Ok((at - self.config.epoch) / self.config.step)
    }
}

// Constant-time over the code bytes; the candidate length is public.
fn codes_match(candidate: &str, expected: &str) -> bool {
    let candidate = candidate.as_bytes();
    let expected = expected.as_bytes();
    candidate.len() == expected.len() && bool::from(candidate.ct_eq(expected))
}

pub fn unix_secs(clock: &impl GetTime) -> u64 {
    clock
        .get_now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::constants::{
        RFC_SECRET_BASE32, RFC_SECRET_SHA1, RFC_SECRET_SHA256, RFC_SECRET_SHA512,
    };
    use crate::tests::mocks::MockClock;

    fn rfc_config(algorithm: HashAlgorithm) -> TotpConfig {
        TotpConfig {
            epoch: 0,
            step: 30,
            algorithm,
            digits: 8,
        }
    }

    fn rfc_engine(algorithm: HashAlgorithm) -> TotpEngine {
        let secret = match algorithm {
            HashAlgorithm::Sha1 => RFC_SECRET_SHA1,
            HashAlgorithm::Sha256 => RFC_SECRET_SHA256,
            HashAlgorithm::Sha512 => RFC_SECRET_SHA512,
        };
        TotpEngine::new(secret.to_vec(), rfc_config(algorithm)).unwrap()
    }

    // RFC 6238 appendix B: (time, sha1, sha256, sha512)
    const RFC6238_VECTORS: [(u64, &str, &str, &str); 6] = [
        (59, "94287082", "46119246", "90693936"),
        (1111111109, "07081804", "68084774", "25091201"),
        (1111111111, "14050471", "67062674", "99943326"),
        (1234567890, "89005924", "91819424", "93441116"),
        (2000000000, "69279037", "90698825", "38618901"),
        (20000000000, "65353130", "77737706", "47863826"),
    ];

    #[test]
    fn matches_rfc6238_appendix_b() {
        for (at, sha1, sha256, sha512) in RFC6238_VECTORS {
            assert_eq!(rfc_engine(HashAlgorithm::Sha1).generate(at).unwrap(), sha1);
            assert_eq!(
                rfc_engine(HashAlgorithm::Sha256).generate(at).unwrap(),
                sha256
            );
            assert_eq!(
                rfc_engine(HashAlgorithm::Sha512).generate(at).unwrap(),
                sha512
            );
        }
    }

    #[test]
    fn generation_is_deterministic() {
        let engine = rfc_engine(HashAlgorithm::Sha1);
        let first = engine.generate(1111111109).unwrap();
        for _ in 0..5 {
            assert_eq!(engine.generate(1111111109).unwrap(), first);
        }
    }

    #[test]
    fn codes_are_constant_within_a_step() {
        let engine = rfc_engine(HashAlgorithm::Sha1);
        // 30..=59 all live in step 1
        let expected = engine.generate(30).unwrap();
        for at in 31..60 {
            assert_eq!(engine.generate(at).unwrap(), expected);
        }
    }

    #[test]
    fn codes_change_across_a_step_boundary() {
        let engine = rfc_engine(HashAlgorithm::Sha1);
        // known vectors on each side of the t=60 boundary
        assert_eq!(engine.generate(59).unwrap(), "94287082");
        assert_ne!(engine.generate(60).unwrap(), "94287082");
    }

    #[test]
    fn codes_are_exactly_digits_long() {
        for digits in [6, 7, 8] {
            let config = TotpConfig {
                digits,
                ..TotpConfig::default()
            };
            let engine = TotpEngine::new(RFC_SECRET_SHA1.to_vec(), config).unwrap();
            for at in (0u64..3000).step_by(97) {
                let code = engine.generate(at).unwrap();
                assert_eq!(code.len(), digits as usize);
                assert!(code.bytes().all(|b| b.is_ascii_digit()));
            }
        }
    }

    #[test]
    fn zero_pads_short_codes() {
        // counter 37037036 truncates to 7081804, below 10^8
        let engine = rfc_engine(HashAlgorithm::Sha1);
        assert_eq!(engine.generate(1111111109).unwrap(), "07081804");
    }

    #[test]
    fn verify_accepts_the_generated_code() {
        let engine = rfc_engine(HashAlgorithm::Sha1);
        for at in [59, 1111111111, 2000000000] {
            let code = engine.generate(at).unwrap();
            assert!(engine.verify(&code, at).unwrap());
        }
    }

    #[test]
    fn verify_rejects_wrong_codes() {
        let engine = rfc_engine(HashAlgorithm::Sha1);
        assert!(!engine.verify("00000000", 59).unwrap());
        assert!(!engine.verify("9428708", 59).unwrap());
        assert!(!engine.verify("942870820", 59).unwrap());
        assert!(!engine.verify("", 59).unwrap());
    }

    #[test]
    fn skew_window_accepts_adjacent_steps() {
        let engine = rfc_engine(HashAlgorithm::Sha1);
        let code = engine.generate(59).unwrap();

        // one step late and one step early
        assert!(engine.verify_with_skew(&code, 75, 1).unwrap());
        assert!(engine.verify_with_skew(&code, 15, 1).unwrap());
        // exact window rejects both
        assert!(!engine.verify_with_skew(&code, 75, 0).unwrap());
        assert!(!engine.verify_with_skew(&code, 15, 0).unwrap());
        // two steps away needs a wider window
        assert!(!engine.verify_with_skew(&code, 105, 1).unwrap());
        assert!(engine.verify_with_skew(&code, 105, 2).unwrap());
    }

    #[test]
    fn skew_window_skips_steps_before_the_epoch() {
        let config = TotpConfig {
            epoch: 60,
            ..TotpConfig::default()
        };
        let engine = TotpEngine::new(RFC_SECRET_SHA1.to_vec(), config).unwrap();
        let code = engine.generate(65).unwrap();
        // at=65 with window 2 would reach t=5, below the epoch
        assert!(engine.verify_with_skew(&code, 65, 2).unwrap());
    }

    #[test]
    fn skew_window_handles_timestamps_near_the_counter_limit() {
        let engine = rfc_engine(HashAlgorithm::Sha1);
        let at = u64::MAX - 5;
        let code = engine.generate(at).unwrap();

        // the forward step would overflow the timestamp and is skipped
        assert!(engine.verify_with_skew(&code, at, 1).unwrap());
        assert!(!engine.verify_with_skew("00000000", at, 1).unwrap());
    }

    #[test]
    fn skew_window_tolerates_oversized_steps() {
        let config = TotpConfig {
            step: u64::MAX,
            ..TotpConfig::default()
        };
        let engine = TotpEngine::new(RFC_SECRET_SHA1.to_vec(), config).unwrap();
        let code = engine.generate(100).unwrap();

        // 2 * step overflows; only reachable steps are checked
        assert!(engine.verify_with_skew(&code, 100, 2).unwrap());
    }

    #[test]
    fn rejects_oversized_skew_windows() {
        let engine = rfc_engine(HashAlgorithm::Sha1);
        let code = engine.generate(59).unwrap();

        assert!(engine.verify_with_skew(&code, 59, 10).is_ok());
        assert!(matches!(
            engine.verify_with_skew(&code, 59, 11),
            Err(OtpError::InvalidConfig(_))
        ));
    }

    #[test]
    fn base32_secret_matches_raw_bytes() {
        let raw = rfc_engine(HashAlgorithm::Sha1);
        let decoded =
            TotpEngine::from_base32(RFC_SECRET_BASE32, rfc_config(HashAlgorithm::Sha1)).unwrap();
        for at in [59, 1111111109, 20000000000] {
            assert_eq!(decoded.generate(at).unwrap(), raw.generate(at).unwrap());
        }
    }

    #[test]
    fn rejects_invalid_config() {
        let zero_step = TotpConfig {
            step: 0,
            ..TotpConfig::default()
        };
        assert!(matches!(
            TotpEngine::new(RFC_SECRET_SHA1.to_vec(), zero_step),
            Err(OtpError::InvalidConfig(_))
        ));

        let zero_digits = TotpConfig {
            digits: 0,
            ..TotpConfig::default()
        };
        assert!(matches!(
            TotpEngine::new(RFC_SECRET_SHA1.to_vec(), zero_digits),
            Err(OtpError::InvalidConfig(_))
        ));

        let too_many_digits = TotpConfig {
            digits: 11,
            ..TotpConfig::default()
        };
        assert!(matches!(
            TotpEngine::new(RFC_SECRET_SHA1.to_vec(), too_many_digits),
            Err(OtpError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_timestamps_before_the_epoch() {
        let config = TotpConfig {
            epoch: 1000,
            ..TotpConfig::default()
        };
        let engine = TotpEngine::new(RFC_SECRET_SHA1.to_vec(), config).unwrap();
        assert!(matches!(
            engine.generate(999),
            Err(OtpError::InvalidConfig(_))
        ));
        assert!(engine.generate(1000).is_ok());
    }

    #[test]
    fn now_reads_the_injected_clock() {
        let engine = rfc_engine(HashAlgorithm::Sha1);
        let clock = MockClock::at(59);
        assert_eq!(engine.now(&clock).unwrap(), "94287082");
    }
}
