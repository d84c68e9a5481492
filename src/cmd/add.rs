use std::str::FromStr;

use clap::{arg, command, ArgMatches, Command};

use super::CommandType;
use crate::hotp::HashAlgorithm;
use crate::keystore::{KeyStoreOperations, ServiceEntry};
use crate::totp::TotpConfig;
use crate::utils::is_base32_key;
use crate::writer::OutErr;

pub fn subcommand() -> Command<'static> {
    command!(CommandType::Add.as_str())
        .about("Add a service")
        .args(&[
            arg!(-s --service <NAME> "Service name to create").required(true),
            arg!(-k --key <KEY> "Base32 secret key")
                .required(true)
                .validator(is_base32_key),
            arg!(-d --digits <DIGITS> "Code length (default 6)").required(false),
            arg!(--step <SECONDS> "Time-step interval (default 30)").required(false),
            arg!(--epoch <SECONDS> "Counting origin (default 0)").required(false),
            arg!(-a --algorithm <ALGO> "sha1, sha256 or sha512 (default sha1)").required(false),
        ])
}

pub fn run_add<W>(add_args: &ArgMatches, mut key_store: impl KeyStoreOperations, writer: &mut W)
where
    W: OutErr,
{
    let (service, key) = match (add_args.value_of("service"), add_args.value_of("key")) {
        (Some(service), Some(key)) => (service, key),
        _ => {
            writer.write_err("Service name and key are required\n");
            return;
        }
    };

    if key_store.get(service).is_some() {
        writer.write_err("Service already exists\n");
        return;
    }

    let config = match parse_config(add_args) {
        Ok(config) => config,
        Err(message) => {
            writer.write_err(&format!("{}\n", message));
            return;
        }
    };

    let entry = ServiceEntry::new(String::from(key), config);

    // surfaces digit/step violations before anything is written
    if let Err(err) = entry.engine() {
        writer.write_err(&format!("{}\n", err));
        return;
    }

    key_store.add(service.to_string(), entry);
    match key_store.save() {
        Ok(_) => writer.write(&format!("Service \"{}\" successfully created", service)),
        Err(err) => writer.write_err(&format!("{}", err)),
    }
}

fn parse_config(add_args: &ArgMatches) -> Result<TotpConfig, String> {
    let mut config = TotpConfig::default();

    if let Some(digits) = add_args.value_of("digits") {
        config.digits = digits
            .parse()
            .map_err(|err| format!("Unable to parse digits: {}", err))?;
    }
    if let Some(step) = add_args.value_of("step") {
        config.step = step
            .parse()
            .map_err(|err| format!("Unable to parse step: {}", err))?;
    }
    if let Some(epoch) = add_args.value_of("epoch") {
        config.epoch = epoch
            .parse()
            .map_err(|err| format!("Unable to parse epoch: {}", err))?;
    }
    if let Some(algorithm) = add_args.value_of("algorithm") {
        config.algorithm =
            HashAlgorithm::from_str(algorithm).map_err(|err| format!("{}", err))?;
    }

    Ok(config)
}
