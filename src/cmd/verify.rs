use clap::{arg, command, ArgMatches, Command};

use super::CommandType;
use crate::keystore::KeyStoreOperations;
use crate::totp::{unix_secs, GetTime};
use crate::writer::OutErr;

pub fn subcommand() -> Command<'static> {
    command!(CommandType::Verify.as_str())
        .about("Verify a one-time password")
        .args(&[
            arg!(-s --service <NAME> "Service to verify a one-time password for").required(true),
            arg!(-t --token <TOKEN> "One-time password to verify").required(true),
            arg!(-w --window <STEPS> "Accept codes within this many adjacent time steps (max 10)")
                .required(false),
        ])
}

/// Returns true only when the token matched.
pub fn run_verify<W>(
    verify_args: &ArgMatches,
    key_store: &impl KeyStoreOperations,
    clock: &impl GetTime,
    writer: &mut W,
) -> bool
where
    W: OutErr,
{
    let (service, token) = match (
        verify_args.value_of("service"),
        verify_args.value_of("token"),
    ) {
        (Some(service), Some(token)) => (service, token),
        _ => {
            writer.write_err("Service name and token are required\n");
            return false;
        }
    };

    let window = match verify_args.value_of("window") {
        None => 0,
        Some(raw) => match raw.parse::<u64>() {
            Ok(window) => window,
            Err(err) => {
                writer.write_err(&format!("Unable to parse window: {}\n", err));
                return false;
            }
        },
    };

    let entry = match key_store.get(service) {
        Some(entry) => entry,
        None => {
            writer.write_err(&format!("Service not found: {}\n", service));
            return false;
        }
    };

    let result = entry
        .engine()
        .and_then(|engine| engine.verify_with_skew(token, unix_secs(clock), window));

    match result {
        Ok(true) => {
            writer.write("valid\n");
            true
        }
        Ok(false) => {
            writer.write("invalid\n");
            false
        }
        Err(err) => {
            writer.write_err(&format!("{}\n", err));
            false
        }
    }
}
