use clap::{arg, command, ArgMatches, Command};

use super::CommandType;
use crate::keystore::KeyStoreOperations;
use crate::totp::GetTime;
use crate::writer::OutErr;

pub fn subcommand() -> Command<'static> {
    command!(CommandType::Now.as_str())
        .about("Print the current code for one or more services")
        .args(&[arg!([SERVICE] ... "Services to print codes for (default: all)").required(false)])
}

/// Returns false if any requested service was missing or failed.
pub fn run_now<W>(
    now_args: &ArgMatches,
    key_store: &impl KeyStoreOperations,
    clock: &impl GetTime,
    writer: &mut W,
) -> bool
where
    W: OutErr,
{
    let services: Vec<String> = match now_args.values_of("SERVICE") {
        Some(values) => values.map(String::from).collect(),
        None => key_store.list(),
    };

    print_codes(&services, key_store, clock, writer)
}

pub fn print_codes<W>(
    services: &[String],
    key_store: &impl KeyStoreOperations,
    clock: &impl GetTime,
    writer: &mut W,
) -> bool
where
    W: OutErr,
{
    let mut all_ok = true;

    for service in services {
        match key_store.get(service) {
            None => {
                writer.write_err(&format!("Service not found: {}\n", service));
                all_ok = false;
            }
            Some(entry) => match entry.engine().and_then(|engine| engine.now(clock)) {
                Ok(code) => writer.write(&format!("{}\t{}\n", service, code)),
                Err(err) => {
                    writer.write_err(&format!("{}: {}\n", service, err));
                    all_ok = false;
                }
            },
        }
    }

    all_ok
}
