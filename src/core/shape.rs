// Shape and kind inference by first-element descent.

use crate::core::error::{Error, ErrorKind};
use crate::core::nested::Nested;
use crate::core::value::Kind;

/// Inferred storage layout for a nested value: leaf kind plus extents in
/// storage order (fastest-varying axis first).
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    pub kind: Kind,
    pub extents: Vec<usize>,
}

impl Layout {
    pub fn rank(&self) -> usize {
        self.extents.len()
    }
}

/// Walk a nested value, taking each collection's size and descending into
/// its first element until a leaf is reached, then classify the leaf.
///
/// The descent accumulates sizes outer-to-inner; storage wants the
/// fastest-varying (innermost) axis first, so the accumulator is reversed
/// here, and only here. Siblings are not checked for matching lengths;
/// mismatches surface in the writer as `RaggedInput`.
pub fn infer_layout(value: &Nested) -> Result<Layout, Error> {
    let mut extents = Vec::new();
    let mut current = value;
    loop {
        match current {
            Nested::Seq(items) => {
                let Some(first) = items.first() else {
                    return Err(Error::new(ErrorKind::InvalidShape)
                        .with_message("empty sequence has no extent")
                        .with_coords(path_to_here(&extents)));
                };
                extents.push(items.len());
                current = first;
            }
            Nested::Leaf(scalar) => {
                extents.reverse();
                return Ok(Layout {
                    kind: scalar.kind(),
                    extents,
                });
            }
        }
    }
}

fn path_to_here(extents: &[usize]) -> Vec<usize> {
    vec![0; extents.len()]
}
