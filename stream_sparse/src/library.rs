use crate::matrix::{CsrMatrix, CsrMatrixMut, Operation};
use crate::scalar::SparseScalar;
use stream_handles::native::{NativeLibrary, NativeStatus};

/// Entry point used by [`SparseLibrary::csrmv`]
///
/// The non transposed product goes through the merge path kernel, everything else through the
/// plain one.
pub fn csrmv_entry_point<T: SparseScalar>(op: Operation) -> String {
    match op {
        Operation::NonTranspose => T::PRECISION.entry_point("csrmv_mp"),
        _ => T::PRECISION.entry_point("csrmv"),
    }
}

/// Sparse routines of a native library
///
/// Every routine runs on the stream `handle` was bound to. Routines are generic over the element
/// type; an implementation picks the native entry point from [`SparseScalar::PRECISION`].
///
/// Shapes have already been checked by the caller, see [`crate::context::SparseContext`].
/// Dense operands are column major.
pub trait SparseLibrary: NativeLibrary {
    /// Expand sorted COO row indices into CSR row offsets
    fn coo2csr(
        &self,
        handle: &Self::Handle,
        coo_row_ind: &[i32],
        m: usize,
        csr_row_ptr: &mut [i32],
    ) -> Result<(), NativeStatus>;

    /// Expand CSR row offsets into COO row indices
    fn csr2coo(
        &self,
        handle: &Self::Handle,
        csr_row_ptr: &[i32],
        m: usize,
        coo_row_ind: &mut [i32],
    ) -> Result<(), NativeStatus>;

    /// `y = alpha * op(A) * x + beta * y`
    #[allow(clippy::too_many_arguments)]
    fn csrmv<T: SparseScalar>(
        &self,
        handle: &Self::Handle,
        op: Operation,
        alpha: T,
        a: &CsrMatrix<'_, T>,
        x: &[T],
        beta: T,
        y: &mut [T],
    ) -> Result<(), NativeStatus>;

    /// `C = alpha * op(A) * B + beta * C` where `B` has `n` columns
    #[allow(clippy::too_many_arguments)]
    fn csrmm<T: SparseScalar>(
        &self,
        handle: &Self::Handle,
        op: Operation,
        alpha: T,
        a: &CsrMatrix<'_, T>,
        b: &[T],
        ldb: usize,
        n: usize,
        beta: T,
        c: &mut [T],
        ldc: usize,
    ) -> Result<(), NativeStatus>;

    /// Convert `A` to compressed sparse column form, which is also the CSR form of `A^T`
    fn csr2csc<T: SparseScalar>(
        &self,
        handle: &Self::Handle,
        a: &CsrMatrix<'_, T>,
        csc_values: &mut [T],
        csc_row_ind: &mut [i32],
        csc_col_ptr: &mut [i32],
    ) -> Result<(), NativeStatus>;

    /// Row offsets and number of non zeros of `A + B`, first half of [`SparseLibrary::csrgeam`]
    fn csrgeam_nnz<T: SparseScalar>(
        &self,
        handle: &Self::Handle,
        a: &CsrMatrix<'_, T>,
        b: &CsrMatrix<'_, T>,
        c_row_ptr: &mut [i32],
    ) -> Result<usize, NativeStatus>;

    /// `C = alpha * A + beta * B`. `c.row_ptr` must come from [`SparseLibrary::csrgeam_nnz`]
    fn csrgeam<T: SparseScalar>(
        &self,
        handle: &Self::Handle,
        alpha: T,
        a: &CsrMatrix<'_, T>,
        beta: T,
        b: &CsrMatrix<'_, T>,
        c: &mut CsrMatrixMut<'_, T>,
    ) -> Result<(), NativeStatus>;

    /// Solve the tridiagonal system with `n` right hand sides in `b`, without pivoting
    ///
    /// `dl[0]` and `du[m - 1]` are ignored. The solution overwrites `b`. On failure `b` is left
    /// as it was.
    #[allow(clippy::too_many_arguments)]
    fn gtsv_no_pivot<T: SparseScalar>(
        &self,
        handle: &Self::Handle,
        m: usize,
        n: usize,
        dl: &[T],
        d: &[T],
        du: &[T],
        b: &mut [T],
        ldb: usize,
    ) -> Result<(), NativeStatus>;

    /// Solve `batch_count` independent tridiagonal systems of size `m`, each with a single right
    /// hand side, laid out `batch_stride` apart
    ///
    /// If any system fails to solve, no batch of `x` is written.
    #[allow(clippy::too_many_arguments)]
    fn gtsv_strided_batch<T: SparseScalar>(
        &self,
        handle: &Self::Handle,
        m: usize,
        dl: &[T],
        d: &[T],
        du: &[T],
        x: &mut [T],
        batch_count: usize,
        batch_stride: usize,
    ) -> Result<(), NativeStatus>;
}
