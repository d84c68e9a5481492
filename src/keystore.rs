use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::prelude::*;
use std::io::BufReader;
use std::path::PathBuf;

use crate::error::{OtpError, StoreError};
use crate::hotp::HashAlgorithm;
use crate::totp::{TotpConfig, TotpEngine};

const KEYS_FILE_NAME: &str = "keys.toml";

fn get_keys_path() -> Result<PathBuf, StoreError> {
    let home = dirs::home_dir().ok_or(StoreError::NoHomeDir)?;
    let directory = home.join(".totp");
    fs::create_dir_all(&directory)?;

    Ok(directory.join(KEYS_FILE_NAME))
}

fn load_file_to_string(path: &PathBuf) -> Result<String, StoreError> {
    if !path.exists() {
        File::create(path)?;
    }

    let file = File::open(path)?;
    let mut buf_reader = BufReader::new(file);
    let mut contents = String::new();
    buf_reader.read_to_string(&mut contents)?;

    Ok(contents)
}

fn default_step() -> u64 {
    30
}

fn default_digits() -> u32 {
    6
}

/// One service's secret and TOTP parameters as stored in the keys file.
/// Unknown fields are rejected rather than silently dropped.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServiceEntry {
    pub secret: String,
    #[serde(default)]
    pub epoch: u64,
    #[serde(default = "default_step")]
    pub step: u64,
    #[serde(default)]
    pub algorithm: HashAlgorithm,
    #[serde(default = "default_digits")]
    pub digits: u32,
}

impl ServiceEntry {
    pub fn new(secret: String, config: TotpConfig) -> Self {
        ServiceEntry {
            secret,
            epoch: config.epoch,
            step: config.step,
            algorithm: config.algorithm,
            digits: config.digits,
        }
    }

    pub fn config(&self) -> TotpConfig {
        TotpConfig {
            epoch: self.epoch,
            step: self.step,
            algorithm: self.algorithm,
            digits: self.digits,
        }
    }

    /// Build the engine for this entry, surfacing secret and config
    /// problems as their distinct error kinds.
    pub fn engine(&self) -> Result<TotpEngine, OtpError> {
        TotpEngine::from_base32(&self.secret, self.config())
    }
}

pub trait KeyStoreOperations {
    fn get(&self, service: &str) -> Option<&ServiceEntry>;
    fn list(&self) -> Vec<String>;
    fn add(&mut self, service: String, entry: ServiceEntry);
    fn delete(&mut self, service: &str) -> Option<ServiceEntry>;
    fn save(&self) -> Result<(), StoreError>;
}

/// Service name -> entry mapping backed by `~/.totp/keys.toml`.
pub struct KeyStore {
    services: BTreeMap<String, ServiceEntry>,
    path: PathBuf,
}

impl KeyStore {
    pub fn load() -> Result<KeyStore, StoreError> {
        let path = get_keys_path()?;
        let contents = load_file_to_string(&path)?;
        let services: BTreeMap<String, ServiceEntry> = toml::from_str(&contents)?;

        Ok(KeyStore { services, path })
    }
}

impl KeyStoreOperations for KeyStore {
    fn get(&self, service: &str) -> Option<&ServiceEntry> {
        self.services.get(service)
    }

    fn list(&self) -> Vec<String> {
        self.services.keys().cloned().collect()
    }

    fn add(&mut self, service: String, entry: ServiceEntry) {
        self.services.insert(service, entry);
    }

    fn delete(&mut self, service: &str) -> Option<ServiceEntry> {
        self.services.remove(service)
    }

    fn save(&self) -> Result<(), StoreError> {
        let contents = toml::to_string(&self.services)?;
        fs::write(&self.path, contents)?;

        Ok(())
    }
}
