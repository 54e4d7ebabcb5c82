//! Purpose: Variant-typed strided array storage for engine-side variables.
//! Exports: `Kind`, `Complex`, `Scalar`, `Variant`.
//! Role: Single storage representation shared by marshalling and engines.
//! Invariants: `extents.len() == strides.len() == rank`; cell buffer length
//! equals the extent product (1 for rank 0).
//! Invariants: Extent 0 of `extents` is the fastest-varying storage axis,
//! which is the innermost nesting level of the script-side view.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::{Error, ErrorKind};

/// The five primitive element kinds a pool variable can hold.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Kind {
    Boolean,
    Integer,
    Real,
    Complex,
    Text,
}

impl Kind {
    pub fn name(self) -> &'static str {
        match self {
            Kind::Boolean => "Boolean",
            Kind::Integer => "Integer",
            Kind::Real => "Real",
            Kind::Complex => "Complex",
            Kind::Text => "Text",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Kind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Boolean" => Ok(Kind::Boolean),
            "Integer" => Ok(Kind::Integer),
            "Real" => Ok(Kind::Real),
            "Complex" => Ok(Kind::Complex),
            "Text" => Ok(Kind::Text),
            other => Err(Error::new(ErrorKind::UnsupportedKind)
                .with_message(format!("unknown kind name: {other}"))),
        }
    }
}

/// Double-precision complex pair. Serialized as `{"re": .., "im": ..}` and
/// nothing else; extra keys fail the JSON boundary rather than being
/// mistaken for a complex leaf.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }
}

/// One leaf cell value.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Complex(Complex),
    Text(String),
}

impl Scalar {
    pub fn kind(&self) -> Kind {
        match self {
            Scalar::Boolean(_) => Kind::Boolean,
            Scalar::Integer(_) => Kind::Integer,
            Scalar::Real(_) => Kind::Real,
            Scalar::Complex(_) => Kind::Complex,
            Scalar::Text(_) => Kind::Text,
        }
    }

    /// Convert into the target kind, or fail with `TypeConversion`.
    ///
    /// The full coercion table:
    /// - `Boolean <- Boolean`
    /// - `Integer <- Integer`; `Integer <- Real` truncates toward zero
    ///   (the single narrowing rule; NaN and infinities are rejected)
    /// - `Real <- Real | Integer`
    /// - `Complex <- Complex | Real | Integer` (zero imaginary part)
    /// - `Text <- Text`
    pub fn coerce(self, target: Kind) -> Result<Scalar, Error> {
        match (target, self) {
            (Kind::Boolean, Scalar::Boolean(v)) => Ok(Scalar::Boolean(v)),
            (Kind::Integer, Scalar::Integer(v)) => Ok(Scalar::Integer(v)),
            (Kind::Integer, Scalar::Real(v)) => {
                if !v.is_finite() {
                    return Err(Error::new(ErrorKind::TypeConversion)
                        .with_message(format!("non-finite real {v} cannot narrow to an integer")));
                }
                Ok(Scalar::Integer(v.trunc() as i64))
            }
            (Kind::Real, Scalar::Real(v)) => Ok(Scalar::Real(v)),
            (Kind::Real, Scalar::Integer(v)) => Ok(Scalar::Real(v as f64)),
            (Kind::Complex, Scalar::Complex(v)) => Ok(Scalar::Complex(v)),
            (Kind::Complex, Scalar::Real(v)) => Ok(Scalar::Complex(Complex::new(v, 0.0))),
            (Kind::Complex, Scalar::Integer(v)) => Ok(Scalar::Complex(Complex::new(v as f64, 0.0))),
            (Kind::Text, Scalar::Text(v)) => Ok(Scalar::Text(v)),
            (target, value) => Err(Error::new(ErrorKind::TypeConversion).with_message(format!(
                "{} value cannot be stored in a {} cell",
                value.kind(),
                target
            ))),
        }
    }
}

/// Flat cell buffer, one variant per kind. Closed sum: every operation
/// matches exhaustively, so there is no unsupported-kind fallthrough.
#[derive(Clone, Debug, PartialEq)]
enum Cells {
    Boolean(Vec<bool>),
    Integer(Vec<i64>),
    Real(Vec<f64>),
    Complex(Vec<Complex>),
    Text(Vec<String>),
}

impl Cells {
    fn with_len(kind: Kind, len: usize) -> Self {
        match kind {
            Kind::Boolean => Cells::Boolean(vec![false; len]),
            Kind::Integer => Cells::Integer(vec![0; len]),
            Kind::Real => Cells::Real(vec![0.0; len]),
            Kind::Complex => Cells::Complex(vec![Complex::default(); len]),
            Kind::Text => Cells::Text(vec![String::new(); len]),
        }
    }

    fn kind(&self) -> Kind {
        match self {
            Cells::Boolean(_) => Kind::Boolean,
            Cells::Integer(_) => Kind::Integer,
            Cells::Real(_) => Kind::Real,
            Cells::Complex(_) => Kind::Complex,
            Cells::Text(_) => Kind::Text,
        }
    }

    fn len(&self) -> usize {
        match self {
            Cells::Boolean(cells) => cells.len(),
            Cells::Integer(cells) => cells.len(),
            Cells::Real(cells) => cells.len(),
            Cells::Complex(cells) => cells.len(),
            Cells::Text(cells) => cells.len(),
        }
    }

    fn read(&self, offset: usize) -> Scalar {
        match self {
            Cells::Boolean(cells) => Scalar::Boolean(cells[offset]),
            Cells::Integer(cells) => Scalar::Integer(cells[offset]),
            Cells::Real(cells) => Scalar::Real(cells[offset]),
            Cells::Complex(cells) => Scalar::Complex(cells[offset]),
            Cells::Text(cells) => Scalar::Text(cells[offset].clone()),
        }
    }

    fn write(&mut self, offset: usize, value: Scalar) -> Result<(), Error> {
        match (self, value) {
            (Cells::Boolean(cells), Scalar::Boolean(v)) => cells[offset] = v,
            (Cells::Integer(cells), Scalar::Integer(v)) => cells[offset] = v,
            (Cells::Real(cells), Scalar::Real(v)) => cells[offset] = v,
            (Cells::Complex(cells), Scalar::Complex(v)) => cells[offset] = v,
            (Cells::Text(cells), Scalar::Text(v)) => cells[offset] = v,
            _ => {
                return Err(Error::new(ErrorKind::Internal)
                    .with_message("cell buffer and scalar kind diverged after coercion"));
            }
        }
        Ok(())
    }
}

/// A variant-typed multi-dimensional array with strided storage.
///
/// Rank 0 is a scalar addressed by the empty coordinate slice. For rank
/// R >= 1, `extents[0]` is the fastest-varying axis and the flat offset of
/// coordinates `(i_0 .. i_{R-1})` is `sum(i_k * strides[k])`.
#[derive(Clone, Debug, PartialEq)]
pub struct Variant {
    cells: Cells,
    extents: Vec<usize>,
    strides: Vec<usize>,
}

impl Variant {
    /// Allocate a default-filled array. Fails with `InvalidShape` when any
    /// extent is zero or the extent product overflows.
    pub fn allocate(kind: Kind, extents: &[usize]) -> Result<Self, Error> {
        let mut strides = Vec::with_capacity(extents.len());
        let mut len = 1usize;
        for &extent in extents {
            if extent == 0 {
                return Err(Error::new(ErrorKind::InvalidShape)
                    .with_message("extents must be positive"));
            }
            strides.push(len);
            len = len.checked_mul(extent).ok_or_else(|| {
                Error::new(ErrorKind::InvalidShape).with_message("extent product overflows")
            })?;
        }
        Ok(Self {
            cells: Cells::with_len(kind, len),
            extents: extents.to_vec(),
            strides,
        })
    }

    /// Build the rank-0 case directly from a leaf value.
    pub fn scalar(value: Scalar) -> Self {
        let kind = value.kind();
        let mut cells = Cells::with_len(kind, 1);
        // write cannot fail: buffer and value kinds match by construction
        let _ = cells.write(0, value);
        Self {
            cells,
            extents: Vec::new(),
            strides: Vec::new(),
        }
    }

    pub fn kind(&self) -> Kind {
        self.cells.kind()
    }

    pub fn rank(&self) -> usize {
        self.extents.len()
    }

    pub fn is_scalar(&self) -> bool {
        self.extents.is_empty()
    }

    /// Per-axis extents, fastest-varying axis first.
    pub fn extents(&self) -> &[usize] {
        &self.extents
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Total number of cells (1 for rank 0).
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    fn offset(&self, coords: &[usize]) -> Result<usize, Error> {
        if coords.len() != self.rank() {
            return Err(Error::new(ErrorKind::IndexOutOfRange).with_message(format!(
                "index has {} coordinates, array has rank {}",
                coords.len(),
                self.rank()
            )));
        }
        let mut offset = 0;
        for (axis, (&coord, &extent)) in coords.iter().zip(&self.extents).enumerate() {
            if coord >= extent {
                return Err(Error::new(ErrorKind::IndexOutOfRange).with_message(format!(
                    "coordinate {coord} exceeds extent {extent} on axis {axis}"
                )));
            }
            offset += coord * self.strides[axis];
        }
        Ok(offset)
    }

    pub fn get(&self, coords: &[usize]) -> Result<Scalar, Error> {
        Ok(self.cells.read(self.offset(coords)?))
    }

    /// Read a cell whose coordinates are known in range (traversal built
    /// from this array's own extents). Panics on a violated invariant.
    pub(crate) fn cell(&self, coords: &[usize]) -> Scalar {
        let offset: usize = coords
            .iter()
            .zip(&self.strides)
            .map(|(coord, stride)| coord * stride)
            .sum();
        self.cells.read(offset)
    }

    /// Store a value at the given coordinates, coercing it to this array's
    /// kind per [`Scalar::coerce`].
    pub fn set(&mut self, coords: &[usize], value: Scalar) -> Result<(), Error> {
        let offset = self.offset(coords)?;
        let value = value.coerce(self.kind())?;
        self.cells.write(offset, value)
    }

    /// Move axis 0 (extent and stride) to the last position, shifting the
    /// remaining axes down one. Cell data does not move; only the
    /// addressing changes. Used for function-sample tables where the
    /// sample axis must come last regardless of native storage order.
    pub fn rotate_first_axis_last(&mut self) {
        if self.rank() >= 2 {
            self.extents.rotate_left(1);
            self.strides.rotate_left(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Complex, Kind, Scalar, Variant};
    use crate::core::error::ErrorKind;

    #[test]
    fn allocate_rejects_zero_extent() {
        let err = Variant::allocate(Kind::Real, &[3, 0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidShape);
    }

    #[test]
    fn strides_derive_from_extents() {
        let var = Variant::allocate(Kind::Integer, &[4, 3, 2]).expect("allocate");
        assert_eq!(var.strides(), &[1, 4, 12]);
        assert_eq!(var.cell_count(), 24);
    }

    #[test]
    fn scalar_bypasses_indexing() {
        let var = Variant::scalar(Scalar::Integer(7));
        assert_eq!(var.rank(), 0);
        assert_eq!(var.get(&[]).expect("get"), Scalar::Integer(7));
        let err = var.get(&[0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IndexOutOfRange);
    }

    #[test]
    fn get_set_round_trip_by_coordinates() {
        let mut var = Variant::allocate(Kind::Real, &[3, 2]).expect("allocate");
        var.set(&[2, 1], Scalar::Real(5.5)).expect("set");
        assert_eq!(var.get(&[2, 1]).expect("get"), Scalar::Real(5.5));
        assert_eq!(var.get(&[2, 0]).expect("get"), Scalar::Real(0.0));
    }

    #[test]
    fn out_of_range_coordinate_is_rejected() {
        let var = Variant::allocate(Kind::Boolean, &[2, 2]).expect("allocate");
        let err = var.get(&[0, 2]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IndexOutOfRange);
    }

    #[test]
    fn set_coerces_integer_into_real_cells() {
        let mut var = Variant::allocate(Kind::Real, &[2]).expect("allocate");
        var.set(&[0], Scalar::Integer(3)).expect("set");
        assert_eq!(var.get(&[0]).expect("get"), Scalar::Real(3.0));
    }

    #[test]
    fn real_truncates_toward_zero_into_integer_cells() {
        let mut var = Variant::allocate(Kind::Integer, &[2]).expect("allocate");
        var.set(&[0], Scalar::Real(2.9)).expect("set");
        var.set(&[1], Scalar::Real(-2.9)).expect("set");
        assert_eq!(var.get(&[0]).expect("get"), Scalar::Integer(2));
        assert_eq!(var.get(&[1]).expect("get"), Scalar::Integer(-2));
    }

    #[test]
    fn text_into_number_cell_is_a_type_conversion_error() {
        let mut var = Variant::allocate(Kind::Real, &[1]).expect("allocate");
        let err = var.set(&[0], Scalar::Text("fast".into())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeConversion);
    }

    #[test]
    fn nan_cannot_narrow_to_integer() {
        let err = Scalar::Real(f64::NAN).coerce(Kind::Integer).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeConversion);
    }

    #[test]
    fn rotate_moves_first_axis_last() {
        let mut var = Variant::allocate(Kind::Real, &[5, 3, 2]).expect("allocate");
        var.rotate_first_axis_last();
        assert_eq!(var.extents(), &[3, 2, 5]);
        assert_eq!(var.strides(), &[5, 15, 1]);
    }

    #[test]
    fn rotate_is_identity_below_rank_two() {
        let mut var = Variant::allocate(Kind::Real, &[4]).expect("allocate");
        var.rotate_first_axis_last();
        assert_eq!(var.extents(), &[4]);
        assert_eq!(var.strides(), &[1]);
    }

    #[test]
    fn complex_promotion_keeps_real_part() {
        let got = Scalar::Integer(4).coerce(Kind::Complex).expect("coerce");
        assert_eq!(got, Scalar::Complex(Complex::new(4.0, 0.0)));
    }
}
