//! Carries out the action selected on the command line.
//!
//! Each invocation restores the trust registry from a JSON file containing an array of hex
//! identifiers, performs one action and, for actions that change the registry, writes the
//! registry back to the same file.
//!
//! Exit codes: 0 on success or when a certificate is trusted, 1 when a certificate is not trusted
//! (not yet valid, expired, revoked or untrusted), 2 when an operation fails.

use std::path::Path;
use std::process::ExitCode;

use log::{debug, error, info};

use chainval::*;

use crate::args::{ChainToolArgs, ChainToolCommand};

/// Registry file used when neither the command line nor the settings name one
pub const DEFAULT_REGISTRY_FILE: &str = "registry.json";

const EXIT_NOT_TRUSTED: u8 = 1;
const EXIT_FAILURE: u8 = 2;

/// Chooses the registry file from the command line, then the settings, then the default
pub fn registry_file_name(args: &ChainToolArgs, settings: &VerifierSettings) -> String {
    if let Some(f) = &args.registry_file {
        f.clone()
    } else if let Some(f) = settings.get_registry_file() {
        f
    } else {
        DEFAULT_REGISTRY_FILE.to_string()
    }
}

/// Restores a registry saved by [`save_registry`]. A missing file yields an empty registry.
pub fn read_registry(fname: &str) -> Result<TrustRegistry> {
    let p = Path::new(fname);
    if !Path::exists(p) {
        debug!("Registry file {} not found, starting with an empty registry", fname);
        return Ok(TrustRegistry::new());
    }
    let json = get_file_as_byte_vec(p)?;
    match serde_json::from_slice::<Vec<String>>(&json) {
        Ok(ids) => Ok(TrustRegistry::from_identifiers(ids)),
        Err(e) => {
            error!("Failed to parse registry file {}: {}", fname, e);
            Err(Error::ParseError)
        }
    }
}

/// Writes the identifiers in `registry` to `fname` as a JSON array
pub async fn save_registry(fname: &str, registry: &TrustRegistry) -> Result<()> {
    let ids = registry.snapshot().await;
    let json = match serde_json::to_vec_pretty(&ids) {
        Ok(j) => j,
        Err(e) => return Err(Error::Misconfiguration(e.to_string())),
    };
    std::fs::write(fname, json)?;
    debug!("Saved {} identifiers to {}", ids.len(), fname);
    Ok(())
}

fn prepare_settings(args: &ChainToolArgs) -> Result<VerifierSettings> {
    let mut settings = read_settings(&args.settings)?;
    if let Some(toi) = args.time_of_interest {
        settings.set_time_of_interest(toi);
    }
    if args.skip_revocation {
        settings.set_check_revocation_status(false);
    }
    Ok(settings)
}

fn failure(msg: &str, e: &Error) -> ExitCode {
    error!("{}: {}", msg, e);
    println!("{}: {}", msg, e);
    ExitCode::from(EXIT_FAILURE)
}

/// The `options` function prepares a [`TrustEnvironment`] from the command line arguments and
/// performs the requested action.
pub async fn options(args: &ChainToolArgs) -> ExitCode {
    let command = match &args.command {
        Some(c) => c.clone(),
        None => {
            println!("No action specified. Try again with -h parameter.");
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    let settings = match prepare_settings(args) {
        Ok(s) => s,
        Err(e) => return failure("Failed to read settings", &e),
    };

    let registry_file = registry_file_name(args, &settings);
    let registry = match read_registry(&registry_file) {
        Ok(r) => r,
        Err(e) => return failure(&format!("Failed to read registry from {}", registry_file), &e),
    };

    let mut te = TrustEnvironment::with_registry(settings, registry);
    populate_trust_environment(&mut te);

    match command {
        ChainToolCommand::Register { file } => {
            let buffer = match get_file_as_byte_vec(Path::new(&file)) {
                Ok(b) => b,
                Err(e) => return failure(&format!("Failed to read {}", file), &e),
            };
            let chain = match te.register_buffer(&buffer).await {
                Ok(c) => c,
                Err(e) => return failure("Failed to register certificate chain", &e),
            };
            if let Err(e) = save_registry(&registry_file, te.registry()).await {
                return failure(&format!("Failed to save registry to {}", registry_file), &e);
            }
            info!(
                "Registered chain of {} certificates ending at {}",
                chain.len(),
                chain.root().subject
            );
            println!("Certificate chain registered");
            ExitCode::SUCCESS
        }
        ChainToolCommand::Verify { file } => {
            let buffer = match get_file_as_byte_vec(Path::new(&file)) {
                Ok(b) => b,
                Err(e) => return failure(&format!("Failed to read {}", file), &e),
            };
            let result = te.verify_buffer(&buffer).await;
            println!("{}", result);
            match result {
                VerificationResult::Trusted => ExitCode::SUCCESS,
                VerificationResult::Error(_) => ExitCode::from(EXIT_FAILURE),
                _ => ExitCode::from(EXIT_NOT_TRUSTED),
            }
        }
        ChainToolCommand::Clear => {
            te.clear().await;
            if let Err(e) = save_registry(&registry_file, te.registry()).await {
                return failure(&format!("Failed to save registry to {}", registry_file), &e);
            }
            println!("Trusted registry cleared");
            ExitCode::SUCCESS
        }
        ChainToolCommand::List => {
            let ids = te.registry().snapshot().await;
            if ids.is_empty() {
                println!("Trusted registry is empty");
            }
            for id in ids {
                println!("{}", id);
            }
            ExitCode::SUCCESS
        }
    }
}
