//! Purpose: Hold top-level CLI command dispatch for `poolcast`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Command output envelopes and exit code semantics stay stable.
//! Invariants: Helpers in `main.rs` remain the source of shared CLI plumbing.

use super::*;

use poolcast::api::{infer_layout, to_nested, to_variant};

pub(super) fn dispatch_command(command: Command) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "poolcast", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_json(json!({
                "name": "poolcast",
                "version": env!("CARGO_PKG_VERSION"),
            }));
            Ok(RunOutcome::ok())
        }
        Command::Inspect { data, file } => {
            let value = read_data(data, file)?;
            let layout = infer_layout(&value)?;
            // `shape` reads like the nested value (outer-to-inner);
            // `extents` is the storage order (fastest-varying first).
            let shape: Vec<usize> = layout.extents.iter().rev().copied().collect();
            emit_json(json!({
                "kind": layout.kind.name(),
                "rank": layout.rank(),
                "shape": shape,
                "extents": layout.extents,
            }));
            Ok(RunOutcome::ok())
        }
        Command::Roundtrip { data, file, kind } => {
            let value = read_data(data, file)?;
            let variant = to_variant(&value, kind.map(Kind::from))?;
            emit_json(json!({
                "kind": variant.kind().name(),
                "extents": variant.extents(),
                "data": to_nested(&variant).to_json(),
            }));
            Ok(RunOutcome::ok())
        }
    }
}
