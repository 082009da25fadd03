//! Arguments for the chaintool utility

use clap::{Parser, Subcommand};

/// Registers trusted certificate chains and verifies certificates against them
#[derive(Parser, Debug)]
#[command(arg_required_else_help(true))]
#[clap(author, version, about, long_about = None)]
pub struct ChainToolArgs {
    /// Full path and filename of the JSON file that persists the trust registry. When absent, the
    /// vsRegistryFile value from the settings file is used, failing that registry.json in the
    /// current directory.
    #[clap(short, long, global = true, help_heading = "COMMON OPTIONS")]
    pub registry_file: Option<String>,

    /// Full path and filename of JSON-formatted verifier settings file. Defaults are used for
    /// values that are absent.
    #[clap(short, long, global = true, help_heading = "COMMON OPTIONS")]
    pub settings: Option<String>,

    /// Full path and filename of YAML-formatted configuration file for log4rs logging mechanism.
    /// See <https://docs.rs/log4rs/latest/log4rs/> for details.
    #[clap(short, long, global = true, help_heading = "COMMON OPTIONS")]
    pub logging_config: Option<String>,

    /// Time to use when checking validity periods expressed as the number of seconds since Unix
    /// epoch (defaults to the settings value or to current system time). Zero disables the check.
    #[clap(short = 'i', long, global = true, help_heading = "COMMON OPTIONS")]
    pub time_of_interest: Option<u64>,

    /// Flag that indicates CRLs should not be consulted when verifying
    #[clap(long, global = true, help_heading = "COMMON OPTIONS")]
    pub skip_revocation: bool,

    /// Action to perform
    #[command(subcommand)]
    pub command: Option<ChainToolCommand>,
}

/// Actions supported by chaintool
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ChainToolCommand {
    /// Resolve the issuer chain of a DER or PEM encoded certificate and add its key identifiers to
    /// the registry
    Register {
        /// Full path and filename of the certificate
        file: String,
    },
    /// Verify a DER or PEM encoded certificate against the registry
    Verify {
        /// Full path and filename of the certificate
        file: String,
    },
    /// Remove every identifier from the registry
    Clear,
    /// List the identifiers in the registry
    List,
}
