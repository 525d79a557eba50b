use std::path::PathBuf;

use colored::Colorize;
use sigalg_core::{decode, derive};
use sigalg_key::Key;

use crate::{
    context::{default_output, load_private_key, parse_hex_params, read_input, Context},
    envelope::SignatureEnvelope,
    error::CliResult,
};

pub fn handle(
    ctx: &Context,
    file: PathBuf,
    key: PathBuf,
    algorithm: String,
    params: Option<String>,
    output: Option<PathBuf>,
) -> CliResult<()> {
    println!("{}", format!("Signing file: {}", file.display()).cyan());

    let data = read_input(&file)?;
    println!("  File size: {} bytes", data.len());

    let private_key = load_private_key(&key)?;
    println!("  Key: {} ({})", key.display(), private_key.algorithm());

    let explicit = match parse_hex_params(params.as_deref())? {
        Some(bytes) => decode(ctx.provider(), &algorithm, Some(bytes.as_slice()))?,
        None => None,
    };

    let mut operation = ctx.binder().sign(&private_key, &algorithm, explicit.as_ref(), None)?;
    if operation.is_synthesized() {
        println!("  {}", "Using default parameters for this key".yellow());
    }
    let signature = operation.sign_message(&data)?;
    let identifier = derive(ctx.provider(), &operation, &private_key)?;

    let envelope = SignatureEnvelope::new(&identifier, &signature)?;
    let output = output.unwrap_or_else(|| default_output(&file, "sig.json"));
    envelope.save(&output)?;

    println!("{} Signature saved to: {}", "✓".green(), output.display());
    println!();
    println!("{}", "Signature info:".cyan());
    println!("  Algorithm: {}", identifier.name());
    println!("  Identifier: {}", identifier.oid());
    if let Some(params) = &envelope.parameters {
        println!("  Parameters: {}", params);
    }
    println!("  Signature length: {} bytes", signature.len());

    Ok(())
}
