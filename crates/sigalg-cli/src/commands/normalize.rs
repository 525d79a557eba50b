use colored::Colorize;
use sigalg_core::normalize;

use crate::{context::Context, error::CliResult};

pub fn handle(ctx: &Context, designator: String) -> CliResult<()> {
    let provider = ctx.provider();
    let name = normalize(provider, &designator)?;

    println!("{}", format!("Algorithm: {}", designator).cyan());
    println!("  Canonical name: {}", name.as_str().green().bold());
    println!("  Family: {}", name.family());
    match provider.algorithm_oid(name.as_str()) {
        Some(oid) => println!("  Identifier: {}", oid),
        None => println!("  Identifier: {}", "none".yellow()),
    }

    Ok(())
}
