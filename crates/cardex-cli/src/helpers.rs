use crate::{OutputMode, ParamArgs};
use cardex_model::Card;
use cardex_query::controls::Params;
use cardex_query::FilterState;
use serde_json::Value;
use std::fs;
use std::path::Path;

pub(crate) fn emit_ok(output_mode: OutputMode, payload: &Value) -> Result<(), String> {
    if output_mode.json {
        println!(
            "{}",
            serde_json::to_string(payload).map_err(|e| e.to_string())?
        );
    } else {
        println!(
            "{}",
            serde_json::to_string_pretty(payload).map_err(|e| e.to_string())?
        );
    }
    Ok(())
}

fn split_pair(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("parameter must be key=value: {raw}"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("parameter key must not be empty: {raw}"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

pub(crate) fn collect_params(args: &ParamArgs) -> Result<Params, String> {
    let mut out = Params::new();
    if let Some(query) = &args.query {
        // Same escaping as canonical keys, so a printed key can be fed back.
        out.extend(FilterState::parse_canonical(query).into_map());
    }
    for raw in &args.params {
        let (key, value) = split_pair(raw)?;
        out.insert(key, value);
    }
    Ok(out)
}

/// Reads cards from a JSON array or from one JSON object per line.
pub(crate) fn read_cards(path: &Path) -> Result<Vec<Card>, String> {
    let raw = fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let docs: Vec<Value> = if raw.trim_start().starts_with('[') {
        serde_json::from_str(&raw).map_err(|e| e.to_string())?
    } else {
        raw.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| {
                serde_json::from_str(line).map_err(|e| format!("line {}: {e}", n + 1))
            })
            .collect::<Result<_, _>>()?
    };
    docs.into_iter()
        .enumerate()
        .map(|(n, doc)| Card::from_json(doc).map_err(|e| format!("card {n}: {e}")))
        .collect()
}
