//! Purpose: Code facade: parse and execute program units against a pool.
//! Exports: `Code`.
//! Role: Pairs a code handle with the pool whose variables it resolves
//! against; deletes the handle on drop.

use std::fs;
use std::path::Path;

use crate::api::session::SharedEngine;
use crate::core::error::{Error, ErrorKind};
use crate::engine::{CodeHandle, PoolHandle};

pub struct Code {
    engine: SharedEngine,
    pool: PoolHandle,
    handle: CodeHandle,
}

impl Code {
    pub(crate) fn new(engine: SharedEngine, pool: PoolHandle, handle: CodeHandle) -> Self {
        Self {
            engine,
            pool,
            handle,
        }
    }

    pub fn handle(&self) -> CodeHandle {
        self.handle
    }

    pub fn parse_string(&self, source: &str) -> Result<(), Error> {
        self.engine
            .borrow_mut()
            .parse(self.pool, self.handle, source)
    }

    /// Read a source file and parse it. Read failures are `Io`; parse
    /// failures keep the engine's own kind.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message(format!("failed to read source file {}", path.display()))
                .with_source(err)
        })?;
        self.parse_string(&source)
    }

    /// Run the parsed code on `processes` cores.
    pub fn execute(&self, processes: usize) -> Result<(), Error> {
        self.engine
            .borrow_mut()
            .execute(self.pool, self.handle, processes)
    }

    pub fn clear(&self) -> Result<(), Error> {
        self.engine.borrow_mut().clear_code(self.handle)
    }
}

impl Drop for Code {
    fn drop(&mut self) {
        let _ = self.engine.borrow_mut().delete_code(self.handle);
    }
}
