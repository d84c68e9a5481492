use clap::Command;
use std::process;

mod cmd;
mod error;
mod hotp;
mod keystore;
#[cfg(test)]
mod tests;
mod totp;
mod utils;
mod writer;

use cmd::CommandType;
use keystore::{KeyStore, KeyStoreOperations};
use totp::Clock;
use writer::OtpWriter;

fn main() {
    let matches = Command::new("totp")
        .about("Time-based one-time password generator and verifier")
        .subcommands(vec![
            cmd::now::subcommand(),
            cmd::verify::subcommand(),
            cmd::add::subcommand(),
            cmd::delete::subcommand(),
            cmd::list::subcommand(),
            cmd::generate::subcommand(),
        ])
        .get_matches();

    let mut writer = OtpWriter::new();
    let clock = Clock::new();

    let key_store = match KeyStore::load() {
        Ok(store) => store,
        Err(err) => {
            eprintln!("Unable to load keys file: {}", err);
            process::exit(1);
        }
    };

    let ok = match matches.subcommand() {
        Some((cmd, now_args)) if cmd == CommandType::Now.as_str() => {
            cmd::now::run_now(now_args, &key_store, &clock, &mut writer)
        }
        Some((cmd, verify_args)) if cmd == CommandType::Verify.as_str() => {
            cmd::verify::run_verify(verify_args, &key_store, &clock, &mut writer)
        }
        Some((cmd, add_args)) if cmd == CommandType::Add.as_str() => {
            cmd::add::run_add(add_args, key_store, &mut writer);
            true
        }
        Some((cmd, delete_args)) if cmd == CommandType::Delete.as_str() => {
            cmd::delete::run_delete(delete_args, key_store);
            true
        }
        Some((cmd, _)) if cmd == CommandType::List.as_str() => {
            cmd::list::run_list(&key_store);
            true
        }
        Some((cmd, _)) if cmd == CommandType::Generate.as_str() => {
            cmd::generate::run_generate(&mut writer);
            true
        }
        // bare invocation: print codes for every configured service
        _ => cmd::now::print_codes(&key_store.list(), &key_store, &clock, &mut writer),
    };

    if !ok {
        process::exit(1);
    }
}
