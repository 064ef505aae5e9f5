use num_complex::Complex;
use num_traits::Num;
use std::fmt::Debug;

/// Prefix of routines which only touch indices and are the same for every element type
pub const INDEX_PREFIX: char = 'X';

/// The four element types a sparse routine comes in
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Precision {
    Single,
    Double,
    ComplexSingle,
    ComplexDouble,
}

impl Precision {
    /// Letter the native library puts in front of the routine name
    pub fn prefix(&self) -> char {
        match self {
            Precision::Single => 'S',
            Precision::Double => 'D',
            Precision::ComplexSingle => 'C',
            Precision::ComplexDouble => 'Z',
        }
    }

    /// Name of the native entry point of `method` for this precision, e.g. `Dcsrmv`
    pub fn entry_point(&self, method: &str) -> String {
        format!("{}{}", self.prefix(), method)
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, Precision::ComplexSingle | Precision::ComplexDouble)
    }
}

/// Name of the native entry point of an index only routine, e.g. `Xcoo2csr`
pub fn index_entry_point(method: &str) -> String {
    format!("{}{}", INDEX_PREFIX, method)
}

/// Element types sparse routines are provided for
pub trait SparseScalar: Num + Copy + Debug + Send + Sync + 'static {
    const PRECISION: Precision;

    /// Complex conjugate, identity for real types
    fn conj(self) -> Self;
}

impl SparseScalar for f32 {
    const PRECISION: Precision = Precision::Single;

    fn conj(self) -> Self {
        self
    }
}

impl SparseScalar for f64 {
    const PRECISION: Precision = Precision::Double;

    fn conj(self) -> Self {
        self
    }
}

impl SparseScalar for Complex<f32> {
    const PRECISION: Precision = Precision::ComplexSingle;

    fn conj(self) -> Self {
        Complex::conj(&self)
    }
}

impl SparseScalar for Complex<f64> {
    const PRECISION: Precision = Precision::ComplexDouble;

    fn conj(self) -> Self {
        Complex::conj(&self)
    }
}
