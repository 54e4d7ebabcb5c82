//! Purpose: Execute conformance manifests against the public API surface.
//! Exports: None (binary entry point).
//! Role: Reference runner for JSON step manifests over an in-memory engine.
//! Invariants: Manifests are JSON-only; steps execute in order; fail-fast on errors.
//! Invariants: Every run starts from a fresh session and pool.

use std::env;
use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use poolcast::api::{Error, Kind, License, MemoryEngine, Nested, Pool, Session};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let mut args = env::args();
    let _exe = args.next();
    let manifest_path = args
        .next()
        .ok_or_else(|| "usage: poolcast-conformance <path/to/manifest.json>".to_string())?;
    if args.next().is_some() {
        return Err("unexpected extra arguments".to_string());
    }

    let manifest_path = PathBuf::from(manifest_path);
    let content = fs::read_to_string(&manifest_path)
        .map_err(|err| format!("failed to read manifest: {err}"))?;
    let manifest: Value = serde_json::from_str(&content)
        .map_err(|err| format!("failed to parse manifest json: {err}"))?;

    let version = manifest
        .get("conformance_version")
        .and_then(Value::as_u64)
        .ok_or_else(|| "missing conformance_version".to_string())?;
    if version != 0 {
        return Err(format!("unsupported conformance_version: {version}"));
    }

    let steps = manifest
        .get("steps")
        .and_then(Value::as_array)
        .ok_or_else(|| "manifest steps must be an array".to_string())?;

    let session = Session::initialize(
        MemoryEngine::new(),
        &License::Local {
            file: "conformance".to_string(),
            env_var: "POOLCAST_LICENSE".to_string(),
            key: "conformance".to_string(),
        },
    )
    .map_err(|err| format!("session init failed: {err}"))?;
    let pool = session
        .create_pool()
        .map_err(|err| format!("pool create failed: {err}"))?;

    for (index, step) in steps.iter().enumerate() {
        apply_step(&pool, step).map_err(|err| format!("step {index} failed: {err}"))?;
    }

    println!("ok: {} steps", steps.len());
    Ok(())
}

fn apply_step(pool: &Pool, step: &Value) -> Result<(), String> {
    let op = step
        .get("op")
        .and_then(Value::as_str)
        .ok_or_else(|| "step has no op".to_string())?;

    if op == "expect-error" {
        let inner = step
            .get("step")
            .ok_or_else(|| "expect-error needs an inner step".to_string())?;
        let want = step
            .get("kind")
            .and_then(Value::as_str)
            .ok_or_else(|| "expect-error needs a kind".to_string())?;
        return match run_op(pool, inner) {
            Ok(()) => Err(format!("expected {want}, step succeeded")),
            Err(err) => {
                let got = format!("{:?}", err.kind());
                if got == want {
                    Ok(())
                } else {
                    Err(format!("expected {want}, got {got}: {err}"))
                }
            }
        };
    }

    run_op(pool, step).map_err(|err| err.to_string())
}

fn run_op(pool: &Pool, step: &Value) -> Result<(), Error> {
    let op = step.get("op").and_then(Value::as_str).unwrap_or_default();
    match op {
        "put" => {
            let value = data_field(step)?;
            match kind_field(step)? {
                Some(kind) => pool.put_variable_as(chain_field(step)?, &value, kind),
                None => pool.put_variable(chain_field(step)?, &value),
            }
        }
        "modify" => pool.modify_variable(chain_field(step)?, &data_field(step)?),
        "clear-variable" => pool.clear_variable(chain_field(step)?),
        "get" => {
            let got = pool.variable(chain_field(step)?)?.to_json();
            let want = step
                .get("expect")
                .ok_or_else(|| usage("get needs an expect value"))?;
            expect_eq("data", &got, want)
        }
        "expect-type" => {
            let got = pool.variable_type(chain_field(step)?)?;
            let want = step
                .get("type")
                .and_then(Value::as_str)
                .ok_or_else(|| usage("expect-type needs a type"))?;
            expect_eq("type", &Value::from(got), &Value::from(want))
        }
        "expect-rank" => {
            let got = pool.variable_rank(chain_field(step)?)?;
            let want = step
                .get("rank")
                .cloned()
                .ok_or_else(|| usage("expect-rank needs a rank"))?;
            expect_eq("rank", &Value::from(got), &want)
        }
        "expect-extents" => {
            let got = pool.variable_extents(chain_field(step)?)?;
            let want = step
                .get("extents")
                .cloned()
                .ok_or_else(|| usage("expect-extents needs extents"))?;
            expect_eq("extents", &Value::from(got), &want)
        }
        "get-function-samples" => {
            let got = pool.real_function_samples(chain_field(step)?)?.to_json();
            let want = step
                .get("expect")
                .ok_or_else(|| usage("get-function-samples needs an expect value"))?;
            expect_eq("samples", &got, want)
        }
        "init-mesh" => {
            let dimension = usize_field(step, "dimension")?;
            let sizes = usize_list_field(step, "sizes")?;
            pool.initialize_mesh(chain_field(step)?, dimension, &sizes)
        }
        "set-node" => {
            let node = usize_field(step, "node")?;
            let coords = f64_list_field(step, "coords")?;
            pool.set_node(chain_field(step)?, node, &coords)
        }
        "expect-node" => {
            let node = usize_field(step, "node")?;
            let got = pool.node(chain_field(step)?, node)?;
            let want = step
                .get("coords")
                .cloned()
                .ok_or_else(|| usage("expect-node needs coords"))?;
            expect_eq("coords", &Value::from(got), &want)
        }
        "expect-mesh-size" => {
            let got = pool.mesh_size(chain_field(step)?)?;
            let want = step
                .get("sizes")
                .cloned()
                .ok_or_else(|| usage("expect-mesh-size needs sizes"))?;
            expect_eq("sizes", &Value::from(got), &want)
        }
        other => Err(usage(format!("unknown op: {other}"))),
    }
}

fn usage(message: impl Into<String>) -> Error {
    Error::new(poolcast::api::ErrorKind::Usage).with_message(message)
}

fn chain_field(step: &Value) -> Result<&str, Error> {
    step.get("chain")
        .and_then(Value::as_str)
        .ok_or_else(|| usage("step needs a chain"))
}

fn data_field(step: &Value) -> Result<Nested, Error> {
    let data = step.get("data").ok_or_else(|| usage("step needs data"))?;
    Nested::from_json(data)
}

fn kind_field(step: &Value) -> Result<Option<Kind>, Error> {
    step.get("as")
        .and_then(Value::as_str)
        .map(str::parse)
        .transpose()
}

fn usize_field(step: &Value, name: &str) -> Result<usize, Error> {
    step.get(name)
        .and_then(Value::as_u64)
        .map(|value| value as usize)
        .ok_or_else(|| usage(format!("step needs {name}")))
}

fn usize_list_field(step: &Value, name: &str) -> Result<Vec<usize>, Error> {
    step.get(name)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| item.as_u64().map(|value| value as usize))
                .collect::<Option<Vec<_>>>()
        })
        .and_then(|items| items)
        .ok_or_else(|| usage(format!("{name} must be an unsigned integer array")))
}

fn f64_list_field(step: &Value, name: &str) -> Result<Vec<f64>, Error> {
    step.get(name)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(Value::as_f64)
                .collect::<Option<Vec<_>>>()
        })
        .and_then(|items| items)
        .ok_or_else(|| usage(format!("{name} must be a number array")))
}

fn expect_eq(what: &str, got: &Value, want: &Value) -> Result<(), Error> {
    if got == want {
        Ok(())
    } else {
        Err(usage(format!("{what} mismatch: got {got}, want {want}")))
    }
}
