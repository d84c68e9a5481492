use clap::{command, Command};

use super::CommandType;
use crate::keystore::KeyStoreOperations;

pub fn subcommand() -> Command<'static> {
    command!(CommandType::List.as_str()).about("List all services")
}

pub fn run_list(key_store: &impl KeyStoreOperations) {
    println!("Services:");
    for name in key_store.list() {
        println!("{}", name);
    }
}
