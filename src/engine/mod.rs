//! Purpose: The consumed engine contract behind the facade.
//! Exports: `Engine` trait, `PoolHandle`/`CodeHandle`, `License`,
//! `memory::MemoryEngine`.
//! Role: Boundary to the external solver: pool and code lifecycle, source
//! parsing, execution, variable storage, and mesh tables, all addressed by
//! opaque handles and chain path strings.
//! Invariants: Handles and chain paths carry no structure this crate
//! inspects; engine failures pass through with their own kinds, never
//! reinterpreted as marshalling errors.

pub mod memory;

use crate::core::error::Error;
use crate::core::value::Variant;

/// Opaque pool identifier issued by an engine.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct PoolHandle(pub u32);

/// Opaque parsed-program identifier issued by an engine.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct CodeHandle(pub u32);

/// License material handed to the engine at initialization. Which variants
/// an engine accepts is its own business; the facade only transports them.
#[derive(Clone, Debug)]
pub enum License {
    /// Key file plus environment-variable override and unlock key.
    Local {
        file: String,
        env_var: String,
        key: String,
    },
    /// Floating license served over the network.
    Network { address: String, port: u16 },
}

/// Operations the facade dispatches to. One method per engine entry point;
/// every call is synchronous and addressed by handle (+ chain path where a
/// variable or mesh is involved).
///
/// Mesh arguments and results are flat arrays in engine-native order; the
/// storage-order reversal rule applies only to variant variables.
pub trait Engine {
    fn version(&self) -> String;

    /// Activate with the given license; returns the licensed feature list
    /// (possibly empty).
    fn initialize(&mut self, license: &License) -> Result<Vec<String>, Error>;

    /// Release licenses and engine-held resources.
    fn shutdown(&mut self) -> Result<(), Error>;

    fn create_pool(&mut self) -> Result<PoolHandle, Error>;
    fn delete_pool(&mut self, pool: PoolHandle) -> Result<(), Error>;
    fn clear_pool(&mut self, pool: PoolHandle) -> Result<(), Error>;

    fn create_code(&mut self) -> Result<CodeHandle, Error>;
    fn delete_code(&mut self, code: CodeHandle) -> Result<(), Error>;
    fn clear_code(&mut self, code: CodeHandle) -> Result<(), Error>;

    /// Parse source against a pool's variables into a code slot.
    fn parse(&mut self, pool: PoolHandle, code: CodeHandle, source: &str) -> Result<(), Error>;

    /// Execute a parsed code on `processes` cores.
    fn execute(&mut self, pool: PoolHandle, code: CodeHandle, processes: usize)
    -> Result<(), Error>;

    fn clear_variable(&mut self, pool: PoolHandle, chain: &str) -> Result<(), Error>;

    /// Engine-owned type name for a chain (e.g. `Real`, `Function`,
    /// `Mesh`); opaque to the facade.
    fn variable_type(&self, pool: PoolHandle, chain: &str) -> Result<String, Error>;
    fn variable_rank(&self, pool: PoolHandle, chain: &str) -> Result<usize, Error>;
    fn variable_extents(&self, pool: PoolHandle, chain: &str) -> Result<Vec<usize>, Error>;
    fn variable(&self, pool: PoolHandle, chain: &str) -> Result<Variant, Error>;
    fn put_variable(&mut self, pool: PoolHandle, chain: &str, value: Variant)
    -> Result<(), Error>;

    /// Replace the contents of an existing variable. The chain must exist
    /// with the same kind and extents.
    fn modify_variable(
        &mut self,
        pool: PoolHandle,
        chain: &str,
        value: Variant,
    ) -> Result<(), Error>;

    /// Sample table of a real-valued function, in engine-native axis
    /// order. The facade rotates the sample axis to the last position.
    fn real_function_samples(&self, pool: PoolHandle, chain: &str) -> Result<Variant, Error>;

    /// Create a mesh: `sizes[0]` nodes plus one element count per level.
    fn initialize_mesh(
        &mut self,
        pool: PoolHandle,
        chain: &str,
        dimension: usize,
        sizes: &[usize],
    ) -> Result<(), Error>;
    fn set_node(
        &mut self,
        pool: PoolHandle,
        chain: &str,
        node: usize,
        coords: &[f64],
    ) -> Result<(), Error>;
    fn set_element_type(
        &mut self,
        pool: PoolHandle,
        chain: &str,
        level: usize,
        element: usize,
        element_type: u32,
    ) -> Result<(), Error>;
    fn set_element(
        &mut self,
        pool: PoolHandle,
        chain: &str,
        level: usize,
        element: usize,
        ref_level: usize,
        refs: &[usize],
    ) -> Result<(), Error>;

    /// Node count followed by per-level element counts.
    fn mesh_size(&self, pool: PoolHandle, chain: &str) -> Result<Vec<usize>, Error>;
    fn node(&self, pool: PoolHandle, chain: &str, node: usize) -> Result<Vec<f64>, Error>;
    fn element_type(
        &self,
        pool: PoolHandle,
        chain: &str,
        level: usize,
        element: usize,
    ) -> Result<u32, Error>;
    fn element(
        &self,
        pool: PoolHandle,
        chain: &str,
        level: usize,
        element: usize,
        ref_level: usize,
    ) -> Result<Vec<usize>, Error>;
}
