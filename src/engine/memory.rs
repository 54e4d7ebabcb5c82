//! Purpose: First-party in-memory `Engine` for tests, conformance runs,
//! and embedders that need pool storage without a licensed solver.
//! Exports: `MemoryEngine`.
//! Role: Faithful variable and mesh-table storage; parsing stores source
//! verbatim; execution reports a typed engine error (solving needs a real
//! backend).
//! Invariants: Chain paths are plain map keys; no structure is inferred.

use std::collections::HashMap;

use tracing::debug;

use crate::core::error::{Error, ErrorKind};
use crate::core::value::{Kind, Variant};
use crate::engine::{CodeHandle, Engine, License, PoolHandle};

#[derive(Default)]
struct PoolState {
    variables: HashMap<String, Variant>,
    meshes: HashMap<String, MeshState>,
}

#[derive(Default)]
struct CodeState {
    source: String,
}

struct MeshState {
    dimension: usize,
    nodes: Vec<Option<Vec<f64>>>,
    element_levels: Vec<Vec<ElementSlot>>,
}

#[derive(Clone, Default)]
struct ElementSlot {
    element_type: Option<u32>,
    refs: HashMap<usize, Vec<usize>>,
}

/// An `Engine` that keeps everything in process memory.
#[derive(Default)]
pub struct MemoryEngine {
    initialized: bool,
    pools: HashMap<u32, PoolState>,
    codes: HashMap<u32, CodeState>,
    next_pool: u32,
    next_code: u32,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn pool(&self, handle: PoolHandle) -> Result<&PoolState, Error> {
        self.pools
            .get(&handle.0)
            .ok_or_else(|| unknown_pool(handle))
    }

    fn pool_mut(&mut self, handle: PoolHandle) -> Result<&mut PoolState, Error> {
        self.pools
            .get_mut(&handle.0)
            .ok_or_else(|| unknown_pool(handle))
    }

    fn code_mut(&mut self, handle: CodeHandle) -> Result<&mut CodeState, Error> {
        self.codes.get_mut(&handle.0).ok_or_else(|| {
            Error::new(ErrorKind::NotFound).with_message(format!("unknown code handle {}", handle.0))
        })
    }

    fn variable_ref(&self, pool: PoolHandle, chain: &str) -> Result<&Variant, Error> {
        self.pool(pool)?
            .variables
            .get(chain)
            .ok_or_else(|| unknown_chain(chain))
    }

    fn mesh(&self, pool: PoolHandle, chain: &str) -> Result<&MeshState, Error> {
        self.pool(pool)?
            .meshes
            .get(chain)
            .ok_or_else(|| unknown_chain(chain))
    }

    fn mesh_mut(&mut self, pool: PoolHandle, chain: &str) -> Result<&mut MeshState, Error> {
        self.pool_mut(pool)?
            .meshes
            .get_mut(chain)
            .ok_or_else(|| unknown_chain(chain))
    }
}

fn unknown_pool(handle: PoolHandle) -> Error {
    Error::new(ErrorKind::NotFound).with_message(format!("unknown pool handle {}", handle.0))
}

fn unknown_chain(chain: &str) -> Error {
    Error::new(ErrorKind::NotFound)
        .with_message("no variable under this chain")
        .with_chain(chain)
}

fn element_slot<'a>(
    mesh: &'a MeshState,
    chain: &str,
    level: usize,
    element: usize,
) -> Result<&'a ElementSlot, Error> {
    let slots = level
        .checked_sub(1)
        .and_then(|index| mesh.element_levels.get(index))
        .ok_or_else(|| {
            Error::new(ErrorKind::IndexOutOfRange)
                .with_message(format!("mesh has no element level {level}"))
                .with_chain(chain)
        })?;
    slots.get(element).ok_or_else(|| {
        Error::new(ErrorKind::IndexOutOfRange)
            .with_message(format!("element {element} exceeds level {level} size"))
            .with_chain(chain)
    })
}

fn element_slot_mut<'a>(
    mesh: &'a mut MeshState,
    chain: &str,
    level: usize,
    element: usize,
) -> Result<&'a mut ElementSlot, Error> {
    let slots = level
        .checked_sub(1)
        .and_then(|index| mesh.element_levels.get_mut(index))
        .ok_or_else(|| {
            Error::new(ErrorKind::IndexOutOfRange)
                .with_message(format!("mesh has no element level {level}"))
                .with_chain(chain)
        })?;
    slots.get_mut(element).ok_or_else(|| {
        Error::new(ErrorKind::IndexOutOfRange)
            .with_message(format!("element {element} exceeds level {level} size"))
            .with_chain(chain)
    })
}

impl Engine for MemoryEngine {
    fn version(&self) -> String {
        format!("poolcast memory engine {}", env!("CARGO_PKG_VERSION"))
    }

    fn initialize(&mut self, _license: &License) -> Result<Vec<String>, Error> {
        // Any license material activates the in-memory engine; nothing is
        // checked and no features are gated.
        self.initialized = true;
        Ok(Vec::new())
    }

    fn shutdown(&mut self) -> Result<(), Error> {
        self.initialized = false;
        Ok(())
    }

    fn create_pool(&mut self) -> Result<PoolHandle, Error> {
        if !self.initialized {
            return Err(Error::new(ErrorKind::Engine).with_message("engine is not initialized"));
        }
        self.next_pool += 1;
        self.pools.insert(self.next_pool, PoolState::default());
        debug!(pool = self.next_pool, "created pool");
        Ok(PoolHandle(self.next_pool))
    }

    fn delete_pool(&mut self, pool: PoolHandle) -> Result<(), Error> {
        self.pools
            .remove(&pool.0)
            .map(|_| ())
            .ok_or_else(|| unknown_pool(pool))
    }

    fn clear_pool(&mut self, pool: PoolHandle) -> Result<(), Error> {
        let state = self.pool_mut(pool)?;
        state.variables.clear();
        state.meshes.clear();
        Ok(())
    }

    fn create_code(&mut self) -> Result<CodeHandle, Error> {
        if !self.initialized {
            return Err(Error::new(ErrorKind::Engine).with_message("engine is not initialized"));
        }
        self.next_code += 1;
        self.codes.insert(self.next_code, CodeState::default());
        Ok(CodeHandle(self.next_code))
    }

    fn delete_code(&mut self, code: CodeHandle) -> Result<(), Error> {
        self.codes.remove(&code.0).map(|_| ()).ok_or_else(|| {
            Error::new(ErrorKind::NotFound).with_message(format!("unknown code handle {}", code.0))
        })
    }

    fn clear_code(&mut self, code: CodeHandle) -> Result<(), Error> {
        self.code_mut(code)?.source.clear();
        Ok(())
    }

    fn parse(&mut self, pool: PoolHandle, code: CodeHandle, source: &str) -> Result<(), Error> {
        self.pool(pool)?;
        let state = self.code_mut(code)?;
        state.source = source.to_string();
        debug!(code = code.0, bytes = source.len(), "parsed source");
        Ok(())
    }

    fn execute(
        &mut self,
        pool: PoolHandle,
        code: CodeHandle,
        _processes: usize,
    ) -> Result<(), Error> {
        self.pool(pool)?;
        self.codes.get(&code.0).ok_or_else(|| {
            Error::new(ErrorKind::NotFound).with_message(format!("unknown code handle {}", code.0))
        })?;
        Err(Error::new(ErrorKind::Engine)
            .with_message("execution requires a solver backend")
            .with_hint("The in-memory engine stores variables and meshes but cannot solve."))
    }

    fn clear_variable(&mut self, pool: PoolHandle, chain: &str) -> Result<(), Error> {
        self.pool_mut(pool)?
            .variables
            .remove(chain)
            .map(|_| ())
            .ok_or_else(|| unknown_chain(chain))
    }

    fn variable_type(&self, pool: PoolHandle, chain: &str) -> Result<String, Error> {
        let state = self.pool(pool)?;
        if let Some(variable) = state.variables.get(chain) {
            return Ok(variable.kind().name().to_string());
        }
        if state.meshes.contains_key(chain) {
            return Ok("Mesh".to_string());
        }
        Err(unknown_chain(chain))
    }

    fn variable_rank(&self, pool: PoolHandle, chain: &str) -> Result<usize, Error> {
        Ok(self.variable_ref(pool, chain)?.rank())
    }

    fn variable_extents(&self, pool: PoolHandle, chain: &str) -> Result<Vec<usize>, Error> {
        Ok(self.variable_ref(pool, chain)?.extents().to_vec())
    }

    fn variable(&self, pool: PoolHandle, chain: &str) -> Result<Variant, Error> {
        Ok(self.variable_ref(pool, chain)?.clone())
    }

    fn put_variable(
        &mut self,
        pool: PoolHandle,
        chain: &str,
        value: Variant,
    ) -> Result<(), Error> {
        debug!(chain, kind = %value.kind(), rank = value.rank(), "put variable");
        self.pool_mut(pool)?
            .variables
            .insert(chain.to_string(), value);
        Ok(())
    }

    fn modify_variable(
        &mut self,
        pool: PoolHandle,
        chain: &str,
        value: Variant,
    ) -> Result<(), Error> {
        let state = self.pool_mut(pool)?;
        let existing = state
            .variables
            .get_mut(chain)
            .ok_or_else(|| unknown_chain(chain))?;
        if existing.kind() != value.kind() {
            return Err(Error::new(ErrorKind::TypeConversion)
                .with_message(format!(
                    "modify cannot change kind {} to {}",
                    existing.kind(),
                    value.kind()
                ))
                .with_chain(chain));
        }
        if existing.extents() != value.extents() {
            return Err(Error::new(ErrorKind::InvalidShape)
                .with_message("modify cannot change extents")
                .with_chain(chain));
        }
        debug!(chain, "modified variable");
        *existing = value;
        Ok(())
    }

    fn real_function_samples(&self, pool: PoolHandle, chain: &str) -> Result<Variant, Error> {
        let variable = self.variable_ref(pool, chain)?;
        if variable.kind() != Kind::Real {
            return Err(Error::new(ErrorKind::Engine)
                .with_message(format!(
                    "function samples need a Real table, chain holds {}",
                    variable.kind()
                ))
                .with_chain(chain));
        }
        Ok(variable.clone())
    }

    fn initialize_mesh(
        &mut self,
        pool: PoolHandle,
        chain: &str,
        dimension: usize,
        sizes: &[usize],
    ) -> Result<(), Error> {
        let Some((&node_count, element_counts)) = sizes.split_first() else {
            return Err(Error::new(ErrorKind::InvalidShape)
                .with_message("mesh sizes need at least a node count")
                .with_chain(chain));
        };
        if dimension == 0 {
            return Err(Error::new(ErrorKind::InvalidShape)
                .with_message("mesh dimension must be positive")
                .with_chain(chain));
        }
        let mesh = MeshState {
            dimension,
            nodes: vec![None; node_count],
            element_levels: element_counts
                .iter()
                .map(|&count| vec![ElementSlot::default(); count])
                .collect(),
        };
        debug!(chain, dimension, nodes = node_count, "initialized mesh");
        self.pool_mut(pool)?.meshes.insert(chain.to_string(), mesh);
        Ok(())
    }

    fn set_node(
        &mut self,
        pool: PoolHandle,
        chain: &str,
        node: usize,
        coords: &[f64],
    ) -> Result<(), Error> {
        let mesh = self.mesh_mut(pool, chain)?;
        if coords.len() != mesh.dimension {
            return Err(Error::new(ErrorKind::InvalidShape)
                .with_message(format!(
                    "node has {} coordinates, mesh dimension is {}",
                    coords.len(),
                    mesh.dimension
                ))
                .with_chain(chain));
        }
        let slot = mesh.nodes.get_mut(node).ok_or_else(|| {
            Error::new(ErrorKind::IndexOutOfRange)
                .with_message(format!("node {node} exceeds mesh node count"))
                .with_chain(chain)
        })?;
        *slot = Some(coords.to_vec());
        Ok(())
    }

    fn set_element_type(
        &mut self,
        pool: PoolHandle,
        chain: &str,
        level: usize,
        element: usize,
        element_type: u32,
    ) -> Result<(), Error> {
        let mesh = self.mesh_mut(pool, chain)?;
        element_slot_mut(mesh, chain, level, element)?.element_type = Some(element_type);
        Ok(())
    }

    fn set_element(
        &mut self,
        pool: PoolHandle,
        chain: &str,
        level: usize,
        element: usize,
        ref_level: usize,
        refs: &[usize],
    ) -> Result<(), Error> {
        let mesh = self.mesh_mut(pool, chain)?;
        element_slot_mut(mesh, chain, level, element)?
            .refs
            .insert(ref_level, refs.to_vec());
        Ok(())
    }

    fn mesh_size(&self, pool: PoolHandle, chain: &str) -> Result<Vec<usize>, Error> {
        let mesh = self.mesh(pool, chain)?;
        let mut sizes = vec![mesh.nodes.len()];
        sizes.extend(mesh.element_levels.iter().map(Vec::len));
        Ok(sizes)
    }

    fn node(&self, pool: PoolHandle, chain: &str, node: usize) -> Result<Vec<f64>, Error> {
        let mesh = self.mesh(pool, chain)?;
        let slot = mesh.nodes.get(node).ok_or_else(|| {
            Error::new(ErrorKind::IndexOutOfRange)
                .with_message(format!("node {node} exceeds mesh node count"))
                .with_chain(chain)
        })?;
        slot.clone().ok_or_else(|| {
            Error::new(ErrorKind::NotFound)
                .with_message(format!("node {node} has no coordinates yet"))
                .with_chain(chain)
        })
    }

    fn element_type(
        &self,
        pool: PoolHandle,
        chain: &str,
        level: usize,
        element: usize,
    ) -> Result<u32, Error> {
        let mesh = self.mesh(pool, chain)?;
        element_slot(mesh, chain, level, element)?
            .element_type
            .ok_or_else(|| {
                Error::new(ErrorKind::NotFound)
                    .with_message(format!("element {element} has no type yet"))
                    .with_chain(chain)
            })
    }

    fn element(
        &self,
        pool: PoolHandle,
        chain: &str,
        level: usize,
        element: usize,
        ref_level: usize,
    ) -> Result<Vec<usize>, Error> {
        let mesh = self.mesh(pool, chain)?;
        let slot = element_slot(mesh, chain, level, element)?;
        slot.refs.get(&ref_level).cloned().ok_or_else(|| {
            Error::new(ErrorKind::NotFound)
                .with_message(format!(
                    "element {element} has no references at level {ref_level}"
                ))
                .with_chain(chain)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryEngine;
    use crate::core::error::ErrorKind;
    use crate::core::value::{Kind, Scalar, Variant};
    use crate::engine::{Engine, License};

    fn engine() -> MemoryEngine {
        let mut engine = MemoryEngine::new();
        engine
            .initialize(&License::Local {
                file: "license.dat".into(),
                env_var: "POOLCAST_LICENSE".into(),
                key: "test".into(),
            })
            .expect("initialize");
        engine
    }

    #[test]
    fn create_pool_requires_initialization() {
        let mut engine = MemoryEngine::new();
        let err = engine.create_pool().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Engine);
    }

    #[test]
    fn variable_lifecycle() {
        let mut engine = engine();
        let pool = engine.create_pool().expect("pool");
        let value = Variant::scalar(Scalar::Real(1.5));
        engine.put_variable(pool, "p", value.clone()).expect("put");

        assert_eq!(engine.variable_type(pool, "p").expect("type"), "Real");
        assert_eq!(engine.variable_rank(pool, "p").expect("rank"), 0);
        assert_eq!(engine.variable(pool, "p").expect("get"), value);

        engine.clear_variable(pool, "p").expect("clear");
        let err = engine.variable_rank(pool, "p").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn modify_keeps_kind_and_extents() {
        let mut engine = engine();
        let pool = engine.create_pool().expect("pool");
        let table = Variant::allocate(Kind::Real, &[2, 2]).expect("allocate");
        engine.put_variable(pool, "u", table.clone()).expect("put");

        let other_kind = Variant::allocate(Kind::Integer, &[2, 2]).expect("allocate");
        let err = engine.modify_variable(pool, "u", other_kind).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeConversion);

        let other_shape = Variant::allocate(Kind::Real, &[4]).expect("allocate");
        let err = engine.modify_variable(pool, "u", other_shape).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidShape);

        let mut replacement = table;
        replacement.set(&[0, 1], Scalar::Real(9.0)).expect("set");
        engine
            .modify_variable(pool, "u", replacement.clone())
            .expect("modify");
        assert_eq!(engine.variable(pool, "u").expect("get"), replacement);
    }

    #[test]
    fn execute_reports_a_typed_engine_error() {
        let mut engine = engine();
        let pool = engine.create_pool().expect("pool");
        let code = engine.create_code().expect("code");
        engine.parse(pool, code, "u = 1.0").expect("parse");
        let err = engine.execute(pool, code, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Engine);
    }

    #[test]
    fn mesh_tables_round_trip() {
        let mut engine = engine();
        let pool = engine.create_pool().expect("pool");
        engine
            .initialize_mesh(pool, "channel", 3, &[4, 1, 1, 0])
            .expect("init mesh");
        assert_eq!(
            engine.mesh_size(pool, "channel").expect("size"),
            vec![4, 1, 1, 0]
        );

        engine
            .set_node(pool, "channel", 2, &[0.5, 0.0, 1.0])
            .expect("set node");
        assert_eq!(
            engine.node(pool, "channel", 2).expect("node"),
            vec![0.5, 0.0, 1.0]
        );

        engine
            .set_element_type(pool, "channel", 2, 0, 2)
            .expect("set element type");
        assert_eq!(engine.element_type(pool, "channel", 2, 0).expect("type"), 2);
        let err = engine.element_type(pool, "channel", 1, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        engine
            .set_element(pool, "channel", 2, 0, 0, &[0, 1, 2])
            .expect("set element");
        assert_eq!(
            engine.element(pool, "channel", 2, 0, 0).expect("element"),
            vec![0, 1, 2]
        );
        assert_eq!(
            engine.variable_type(pool, "channel").expect("type"),
            "Mesh"
        );
    }

    #[test]
    fn mesh_bounds_are_enforced() {
        let mut engine = engine();
        let pool = engine.create_pool().expect("pool");
        engine
            .initialize_mesh(pool, "m", 2, &[2, 1])
            .expect("init mesh");

        let err = engine.set_node(pool, "m", 5, &[0.0, 0.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IndexOutOfRange);

        let err = engine.set_node(pool, "m", 0, &[0.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidShape);

        let err = engine.set_element(pool, "m", 0, 0, 0, &[0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IndexOutOfRange);

        let err = engine.node(pool, "m", 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn function_samples_require_a_real_table() {
        let mut engine = engine();
        let pool = engine.create_pool().expect("pool");
        engine
            .put_variable(pool, "labels", Variant::scalar(Scalar::Integer(1)))
            .expect("put");
        let err = engine.real_function_samples(pool, "labels").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Engine);
    }
}
