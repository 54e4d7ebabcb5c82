//! Purpose: Bidirectional marshalling between nested values and variants.
//! Exports: `to_nested`, `to_variant`.
//! Role: The conversion core; everything else routes array data through
//! these two entry points.
//! Invariants: One recursive routine per direction, parameterized by the
//! axis level counting down from `rank - 1` to `-1`; per-kind branching
//! lives in `Scalar::coerce`, not here.
//! Invariants: The storage-order reversal happens in `shape::infer_layout`
//! on the way in and is undone by the level order of `read_level` on the
//! way out.

use crate::core::error::{Error, ErrorKind};
use crate::core::index::MultiIndex;
use crate::core::nested::Nested;
use crate::core::shape::infer_layout;
use crate::core::value::{Kind, Variant};

/// Convert a variant into the nested view. Total for any valid variant:
/// the result's outer-to-inner shape equals the extents reversed, which is
/// exactly the nesting shape `to_variant` inferred on the way in.
pub fn to_nested(value: &Variant) -> Nested {
    let mut index = MultiIndex::new(value.extents());
    read_level(value.rank() as isize - 1, &mut index, value)
}

/// Convert a nested value into a freshly allocated variant, inferring kind
/// and extents from the value itself unless a kind hint overrides the
/// classification.
///
/// Recursion depth equals the rank; ranks through 16 are supported (engine
/// limits keep real data far below that).
///
/// Ragged input is rejected: every sibling sequence must match the extent
/// inferred from the first-element descent, and the nesting depth must
/// match the inferred rank everywhere. Failures name the offending
/// position as an outer-to-inner index path.
pub fn to_variant(value: &Nested, kind_hint: Option<Kind>) -> Result<Variant, Error> {
    let layout = infer_layout(value)?;
    let kind = kind_hint.unwrap_or(layout.kind);
    let mut variant = Variant::allocate(kind, &layout.extents)?;
    let mut index = MultiIndex::new(&layout.extents);
    write_level(layout.rank() as isize - 1, &mut index, &mut variant, value)?;
    Ok(variant)
}

fn read_level(level: isize, index: &mut MultiIndex, value: &Variant) -> Nested {
    if level < 0 {
        return Nested::Leaf(value.cell(index.coords()));
    }
    let axis = level as usize;
    let mut items = Vec::with_capacity(index.axis_len(axis));
    for i in 0..index.axis_len(axis) {
        index.set(axis, i);
        items.push(read_level(level - 1, index, value));
    }
    Nested::Seq(items)
}

fn write_level(
    level: isize,
    index: &mut MultiIndex,
    variant: &mut Variant,
    value: &Nested,
) -> Result<(), Error> {
    if level < 0 {
        let Some(scalar) = value.as_scalar() else {
            return Err(Error::new(ErrorKind::RaggedInput)
                .with_message("sequence nested deeper than the inferred rank")
                .with_coords(outer_path(index, level)));
        };
        return variant
            .set(index.coords(), scalar.clone())
            .map_err(|err| err.with_coords(outer_path(index, level)));
    }
    let axis = level as usize;
    let Some(items) = value.as_seq() else {
        return Err(Error::new(ErrorKind::RaggedInput)
            .with_message("scalar leaf above the inferred innermost level")
            .with_coords(outer_path(index, level)));
    };
    if items.len() != index.axis_len(axis) {
        return Err(Error::new(ErrorKind::RaggedInput)
            .with_message(format!(
                "sequence of length {} where {} was inferred",
                items.len(),
                index.axis_len(axis)
            ))
            .with_coords(outer_path(index, level)));
    }
    for (i, item) in items.iter().enumerate() {
        index.set(axis, i);
        write_level(level - 1, index, variant, item)?;
    }
    Ok(())
}

/// Coordinates pinned so far, reported outermost-first so the path reads
/// like the nested value was indexed.
fn outer_path(index: &MultiIndex, level: isize) -> Vec<usize> {
    let filled_from = (level + 1).max(0) as usize;
    (filled_from..index.rank())
        .rev()
        .map(|axis| index.coords()[axis])
        .collect()
}
