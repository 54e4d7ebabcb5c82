//! Purpose: Pool facade: marshalling endpoints and mesh pass-throughs for
//! one engine-owned variable pool.
//! Exports: `Pool`.
//! Role: Thin dispatch from chain path + operation to the engine, with the
//! nested/variant conversion applied at the variable endpoints.
//! Invariants: Variable data crosses this boundary in nested form only;
//! mesh arguments stay flat and engine-native (no reversal rule).
//! Invariants: The pool handle is deleted when the facade drops.

use tracing::debug;

use crate::api::session::SharedEngine;
use crate::core::error::Error;
use crate::core::marshal::{to_nested, to_variant};
use crate::core::nested::Nested;
use crate::core::renode::face_renode;
use crate::core::value::Kind;
use crate::engine::PoolHandle;

pub struct Pool {
    engine: SharedEngine,
    handle: PoolHandle,
}

impl Pool {
    pub(crate) fn new(engine: SharedEngine, handle: PoolHandle) -> Self {
        Self { engine, handle }
    }

    pub fn handle(&self) -> PoolHandle {
        self.handle
    }

    /// Remove every variable and mesh in the pool.
    pub fn clear(&self) -> Result<(), Error> {
        self.engine.borrow_mut().clear_pool(self.handle)
    }

    pub fn clear_variable(&self, chain: &str) -> Result<(), Error> {
        self.engine.borrow_mut().clear_variable(self.handle, chain)
    }

    /// Engine-owned type name for a chain (opaque to this layer).
    pub fn variable_type(&self, chain: &str) -> Result<String, Error> {
        self.engine.borrow().variable_type(self.handle, chain)
    }

    pub fn variable_rank(&self, chain: &str) -> Result<usize, Error> {
        self.engine.borrow().variable_rank(self.handle, chain)
    }

    /// Storage-order extents (fastest-varying axis first).
    pub fn variable_extents(&self, chain: &str) -> Result<Vec<usize>, Error> {
        self.engine.borrow().variable_extents(self.handle, chain)
    }

    /// Fetch a variable as a nested value.
    pub fn variable(&self, chain: &str) -> Result<Nested, Error> {
        let variant = self.engine.borrow().variable(self.handle, chain)?;
        debug!(chain, rank = variant.rank(), "fetched variable");
        Ok(to_nested(&variant))
    }

    /// Store a nested value under a chain, inferring kind and shape.
    pub fn put_variable(&self, chain: &str, value: &Nested) -> Result<(), Error> {
        let variant = to_variant(value, None).map_err(|err| err.with_chain(chain))?;
        debug!(chain, rank = variant.rank(), kind = %variant.kind(), "put variable");
        self.engine
            .borrow_mut()
            .put_variable(self.handle, chain, variant)
    }

    /// Store with a forced element kind instead of leaf classification.
    pub fn put_variable_as(&self, chain: &str, value: &Nested, kind: Kind) -> Result<(), Error> {
        let variant = to_variant(value, Some(kind)).map_err(|err| err.with_chain(chain))?;
        self.engine
            .borrow_mut()
            .put_variable(self.handle, chain, variant)
    }

    /// Replace an existing variable's contents; the engine enforces that
    /// kind and extents stay fixed.
    pub fn modify_variable(&self, chain: &str, value: &Nested) -> Result<(), Error> {
        let variant = to_variant(value, None).map_err(|err| err.with_chain(chain))?;
        self.engine
            .borrow_mut()
            .modify_variable(self.handle, chain, variant)
    }

    /// Sample table of a real-valued function as a nested value. The
    /// engine returns native axis order with the sample axis first; it is
    /// rotated to the last storage position before reading, so the result
    /// is always indexed by sample at the outermost level.
    pub fn real_function_samples(&self, chain: &str) -> Result<Nested, Error> {
        let mut samples = self
            .engine
            .borrow()
            .real_function_samples(self.handle, chain)?;
        samples.rotate_first_axis_last();
        Ok(to_nested(&samples))
    }

    /// Create a mesh with `sizes[0]` nodes and one element count per
    /// further level.
    pub fn initialize_mesh(
        &self,
        chain: &str,
        dimension: usize,
        sizes: &[usize],
    ) -> Result<(), Error> {
        self.engine
            .borrow_mut()
            .initialize_mesh(self.handle, chain, dimension, sizes)
    }

    pub fn set_node(&self, chain: &str, node: usize, coords: &[f64]) -> Result<(), Error> {
        self.engine
            .borrow_mut()
            .set_node(self.handle, chain, node, coords)
    }

    pub fn set_element_type(
        &self,
        chain: &str,
        level: usize,
        element: usize,
        element_type: u32,
    ) -> Result<(), Error> {
        self.engine
            .borrow_mut()
            .set_element_type(self.handle, chain, level, element, element_type)
    }

    pub fn set_element(
        &self,
        chain: &str,
        level: usize,
        element: usize,
        ref_level: usize,
        refs: &[usize],
    ) -> Result<(), Error> {
        self.engine
            .borrow_mut()
            .set_element(self.handle, chain, level, element, ref_level, refs)
    }

    /// Node count followed by per-level element counts.
    pub fn mesh_size(&self, chain: &str) -> Result<Vec<usize>, Error> {
        self.engine.borrow().mesh_size(self.handle, chain)
    }

    pub fn node(&self, chain: &str, node: usize) -> Result<Vec<f64>, Error> {
        self.engine.borrow().node(self.handle, chain, node)
    }

    pub fn element(
        &self,
        chain: &str,
        level: usize,
        element: usize,
        ref_level: usize,
    ) -> Result<Vec<usize>, Error> {
        self.engine
            .borrow()
            .element(self.handle, chain, level, element, ref_level)
    }

    pub fn element_type(&self, chain: &str, level: usize, element: usize) -> Result<u32, Error> {
        self.engine
            .borrow()
            .element_type(self.handle, chain, level, element)
    }

    /// Node labels of a level-2 (face) element, reordered into perimeter
    /// convention for quads.
    pub fn face_points(&self, chain: &str, element: usize) -> Result<Vec<usize>, Error> {
        let mut points = self.element(chain, 2, element, 0)?;
        face_renode(&mut points);
        Ok(points)
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        if let Err(err) = self.engine.borrow_mut().delete_pool(self.handle) {
            debug!(%err, "pool delete on drop failed");
        }
    }
}
