//! Purpose: Define the stable public Rust API boundary for poolcast.
//! Exports: Core value types, marshalling entry points, and the facade.
//! Role: Public, additive-only surface; hides internal module layout.
//! Invariants: This module is the only public path to the marshalling core
//! and the engine facade.

mod code;
mod pool;
mod session;

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::index::MultiIndex;
pub use crate::core::marshal::{to_nested, to_variant};
pub use crate::core::nested::Nested;
pub use crate::core::renode::{cell_renode, face_renode};
pub use crate::core::shape::{Layout, infer_layout};
pub use crate::core::value::{Complex, Kind, Scalar, Variant};
pub use crate::engine::memory::MemoryEngine;
pub use crate::engine::{CodeHandle, Engine, License, PoolHandle};
pub use code::Code;
pub use pool::Pool;
pub use session::Session;
