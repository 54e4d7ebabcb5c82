//! Purpose: Explicit engine initialization context.
//! Exports: `Session`.
//! Role: Owns the shared engine, activates the license once at
//! construction, hands out pool and code facades, releases on drop.
//! Invariants: No ambient global state; everything engine-wide lives in
//! one `Session` value.
//! Invariants: Not `Send`/`Sync`; one engine is driven from one thread.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::api::code::Code;
use crate::api::pool::Pool;
use crate::core::error::Error;
use crate::engine::{Engine, License};

pub(crate) type SharedEngine = Rc<RefCell<dyn Engine>>;

pub struct Session {
    engine: SharedEngine,
    features: Vec<String>,
}

impl Session {
    /// Activate the engine with the given license. The returned session is
    /// the only handle to engine-wide state; dropping it releases the
    /// license.
    pub fn initialize(engine: impl Engine + 'static, license: &License) -> Result<Self, Error> {
        let engine: SharedEngine = Rc::new(RefCell::new(engine));
        let features = engine.borrow_mut().initialize(license)?;
        debug!(features = features.len(), "engine initialized");
        Ok(Self { engine, features })
    }

    /// Features unlocked by the license (possibly empty).
    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn version(&self) -> String {
        self.engine.borrow().version()
    }

    pub fn create_pool(&self) -> Result<Pool, Error> {
        let handle = self.engine.borrow_mut().create_pool()?;
        Ok(Pool::new(Rc::clone(&self.engine), handle))
    }

    /// Create a code slot parsed against the given pool's variables.
    pub fn create_code(&self, pool: &Pool) -> Result<Code, Error> {
        let handle = self.engine.borrow_mut().create_code()?;
        Ok(Code::new(Rc::clone(&self.engine), pool.handle(), handle))
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(err) = self.engine.borrow_mut().shutdown() {
            debug!(%err, "engine shutdown failed");
        }
    }
}
