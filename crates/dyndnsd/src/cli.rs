//! Command-line interface
//!
//! Without a subcommand the daemon serves the DynDNS protocol, so container
//! entrypoints need no arguments.

use clap::{Parser, Subcommand, ValueEnum};
use dyndns_core::RecordType;

#[derive(Debug, Parser)]
#[command(
    name = "dyndnsd",
    version,
    about = "DynDNS update bridge for netcup CCP and AWS Route53"
)]
pub struct Cli {
    /// List the compiled-in DNS providers and exit
    #[arg(long)]
    pub list_providers: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Serve the DynDNS protocol (default)
    Server {
        /// Listen port, overrides PORT
        #[arg(long)]
        port: Option<u16>,
    },
    /// Update one record with the current public IP and exit
    Update {
        /// Hostname to update (e.g. home.example.com)
        hostname: String,
        /// Record type
        #[arg(long = "type", value_enum, ignore_case = true, default_value = "A")]
        record_type: AddressType,
    },
    /// Print the version
    Version,
}

/// Record types the `update` command can write
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AddressType {
    #[value(name = "A")]
    A,
    #[value(name = "AAAA")]
    Aaaa,
}

impl From<AddressType> for RecordType {
    fn from(value: AddressType) -> Self {
        match value {
            AddressType::A => RecordType::A,
            AddressType::Aaaa => RecordType::Aaaa,
        }
    }
}
