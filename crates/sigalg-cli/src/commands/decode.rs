use colored::Colorize;
use serde::Serialize;
use serde_json::{json, Value};
use sigalg_core::{decode, params::FieldType, BuiltinProvider, EcParams, ParameterSpec};

use crate::{
    context::{parse_hex_params, Context},
    error::CliResult,
};

#[derive(Debug, Serialize)]
struct DecodeReport {
    algorithm: String,
    family: String,
    parameters: Option<Value>,
}

fn describe(spec: &ParameterSpec) -> CliResult<Value> {
    let value = match spec {
        ParameterSpec::RsaPss(params) => serde_json::to_value(params)?,
        ParameterSpec::Ec(EcParams::NamedCurve(oid)) => json!({
            "named_curve": oid.to_string(),
            "name": BuiltinProvider::curve_name(oid),
        }),
        ParameterSpec::Ec(EcParams::Explicit(curve)) => {
            let field = match &curve.field {
                FieldType::Prime(p) => json!({ "prime": hex::encode(p) }),
                FieldType::CharacteristicTwo(der) => json!({ "characteristic_two": hex::encode(der) }),
            };
            json!({
                "explicit": {
                    "field": field,
                    "a": hex::encode(&curve.a),
                    "b": hex::encode(&curve.b),
                    "base": hex::encode(&curve.base),
                    "order": hex::encode(&curve.order),
                    "cofactor": curve.cofactor.as_ref().map(hex::encode),
                }
            })
        }
    };
    Ok(value)
}

pub fn handle(ctx: &Context, algorithm: String, params: Option<String>) -> CliResult<()> {
    let bytes = parse_hex_params(params.as_deref())?;
    let spec = decode(ctx.provider(), &algorithm, bytes.as_deref())?;

    let report = DecodeReport {
        family: spec
            .as_ref()
            .map(|s| s.family().to_string())
            .unwrap_or_else(|| "none".to_string()),
        parameters: spec.as_ref().map(describe).transpose()?,
        algorithm,
    };

    if report.parameters.is_none() {
        eprintln!("{}", "No parameters in effect".yellow());
    }
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
