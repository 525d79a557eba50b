use std::path::PathBuf;

use colored::Colorize;
use sigalg_core::{derive, BuiltinProvider};
use sigalg_key::{Key, PrivateKey, PublicKey};
use tracing::debug;

use crate::{
    context::{load_keys, Context},
    error::CliResult,
};

pub fn handle(ctx: &Context, key: PathBuf) -> CliResult<()> {
    println!("{}", format!("Key info: {}", key.display()).cyan().bold());
    println!();

    let (private_key, public_key) = load_keys(&key)?;
    match &private_key {
        Some(_) => println!("{}", "Key type: private".yellow()),
        None => println!("{}", "Key type: public".green()),
    }
    println!("Algorithm: {}", public_key.algorithm());
    println!("Public key (SPKI): {}", hex::encode(public_key.to_spki_der()?));

    println!();
    println!("{}", "Usable signature algorithms:".cyan());
    let mut usable = 0;
    for name in BuiltinProvider::new().algorithm_names() {
        let line = match &private_key {
            Some(private) => signing_line(ctx, private, name),
            None => verifying_line(ctx, &public_key, name),
        };
        if let Some(line) = line {
            println!("  {}", line);
            usable += 1;
        }
    }
    if usable == 0 {
        println!("  {}", "none".yellow());
    }

    if private_key.is_some() {
        println!();
        println!("{}", "⚠ Keep the private key file safe".yellow().bold());
    }

    Ok(())
}

fn signing_line(ctx: &Context, key: &PrivateKey, algorithm: &str) -> Option<String> {
    let operation = match ctx.binder().from_key(key, algorithm) {
        Ok(operation) => operation,
        Err(e) => {
            debug!(algorithm, error = %e, "not usable with key");
            return None;
        }
    };
    match derive(ctx.provider(), &operation, key) {
        Ok(identifier) => Some(identifier.to_string()),
        Err(e) => Some(format!("{} ({})", operation.name(), e.to_string().dimmed())),
    }
}

fn verifying_line(ctx: &Context, key: &PublicKey, algorithm: &str) -> Option<String> {
    match ctx.binder().verify(key, algorithm, None) {
        Ok(operation) => Some(operation.name().to_string()),
        Err(e) => {
            debug!(algorithm, error = %e, "not usable with key");
            None
        }
    }
}
