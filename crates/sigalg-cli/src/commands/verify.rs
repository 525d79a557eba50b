use std::path::PathBuf;

use colored::Colorize;
use sigalg_core::decode;

use crate::{
    context::{load_public_key, read_input, Context},
    envelope::SignatureEnvelope,
    error::{CliError, CliResult},
};

pub fn handle(ctx: &Context, file: PathBuf, key: PathBuf, signature: PathBuf) -> CliResult<()> {
    println!("{}", format!("Verifying file: {}", file.display()).cyan());

    let data = read_input(&file)?;
    println!("  File size: {} bytes", data.len());

    let envelope = SignatureEnvelope::load(&signature)?;
    let public_key = load_public_key(&key)?;

    let params = envelope.parameter_bytes()?;
    let explicit = decode(ctx.provider(), &envelope.algorithm, params.as_deref())?;

    println!("{}", "Checking signature...".cyan());
    let mut operation = ctx.binder().verify(&public_key, &envelope.algorithm, explicit.as_ref())?;
    let valid = operation.verify_message(&data, &envelope.signature_bytes()?)?;

    if !valid {
        println!("{} {}", "✗".red(), "Signature verification failed".red().bold());
        println!("{}", "Possible causes:".yellow());
        println!("  - the file was modified");
        println!("  - the signature file is damaged");
        println!("  - the wrong public key was used");
        return Err(CliError::SignatureMismatch);
    }

    println!("{} {}", "✓".green(), "Signature verified".green().bold());
    println!();
    println!("{}", "Signature details:".cyan());
    println!("  Algorithm: {}", operation.name());
    println!("  Identifier: {}", envelope.oid);
    if let Some(params) = &envelope.parameters {
        println!("  Parameters: {}", params);
    }

    Ok(())
}
