use clap::{arg, command, ArgMatches, Command};

use super::CommandType;
use crate::keystore::KeyStoreOperations;

pub fn subcommand() -> Command<'static> {
    command!(CommandType::Delete.as_str())
        .about("Delete a service")
        .args(&[arg!(-s --service <NAME> "Service name to delete").required(true)])
}

pub fn run_delete(delete_args: &ArgMatches, mut key_store: impl KeyStoreOperations) {
    let service = delete_args.value_of("service").unwrap();

    match key_store.delete(service) {
        Some(_) => match key_store.save() {
            Ok(_) => println!("Service successfully deleted"),
            Err(err) => eprintln!("{}", err),
        },
        None => eprintln!("Service not found: {}", service),
    }
}
