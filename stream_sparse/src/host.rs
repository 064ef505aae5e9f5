//! In process implementation of the native sparse layer
//!
//! Handles are plain ids, streams are plain ids and every routine is computed on the calling
//! thread. Counts every native call and can be told to fail the next one, which makes it the
//! backend of choice for tests and for running without a device.

use crate::library::{csrmv_entry_point, SparseLibrary};
use crate::matrix::{CsrMatrix, CsrMatrixMut, Operation};
use crate::scalar::{index_entry_point, SparseScalar};
use derivative::Derivative;
use num_traits::Zero;
use std::sync::atomic::{AtomicI32, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use stream_handles::native::{NativeLibrary, NativeStatus};

/// Identifier of a host stream
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StreamId(pub u64);

#[derive(Debug, PartialEq, Eq, Hash)]
pub struct HostHandle {
    id: u64,
    stream: Option<StreamId>,
}

impl HostHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Stream the handle is bound to, if any
    pub fn stream(&self) -> Option<StreamId> {
        self.stream
    }
}

/// A routine call as seen by the host library
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostCall {
    pub entry_point: String,
    pub handle: u64,
    pub stream: StreamId,
}

#[derive(Derivative, Default)]
#[derivative(Debug)]
pub struct HostLibrary {
    next_id: AtomicU64,
    created: AtomicUsize,
    bound: AtomicUsize,
    destroyed: AtomicUsize,
    // 0 means "do not fail"
    fail_create: AtomicI32,
    fail_bind: AtomicI32,
    fail_destroy: AtomicI32,
    fail_routine: AtomicI32,
    #[derivative(Debug = "ignore")]
    calls: Mutex<Vec<HostCall>>,
}

impl HostLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handles created
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Number of handles bound to a stream
    pub fn bound(&self) -> usize {
        self.bound.load(Ordering::SeqCst)
    }

    /// Number of handles destroyed
    pub fn destroyed(&self) -> usize {
        self.destroyed.load(Ordering::SeqCst)
    }

    /// Number of handles created and not yet destroyed
    pub fn live(&self) -> usize {
        self.created().saturating_sub(self.destroyed())
    }

    pub fn fail_next_create(&self, status: NativeStatus) {
        self.fail_create.store(status.code(), Ordering::SeqCst);
    }

    pub fn fail_next_bind(&self, status: NativeStatus) {
        self.fail_bind.store(status.code(), Ordering::SeqCst);
    }

    pub fn fail_next_destroy(&self, status: NativeStatus) {
        self.fail_destroy.store(status.code(), Ordering::SeqCst);
    }

    /// Fail the next sparse routine, whichever it is
    pub fn fail_next_routine(&self, status: NativeStatus) {
        self.fail_routine.store(status.code(), Ordering::SeqCst);
    }

    /// Every routine call made so far, in order
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear_calls(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn injected(flag: &AtomicI32) -> Result<(), NativeStatus> {
        NativeStatus(flag.swap(0, Ordering::SeqCst)).into_result()
    }

    /// Common prologue of every routine
    fn begin(&self, handle: &HostHandle, entry_point: String) -> Result<(), NativeStatus> {
        let stream = handle.stream.ok_or(NativeStatus::NOT_INITIALIZED)?;
        Self::injected(&self.fail_routine)?;
        tracing::trace!("{} on {:?}", entry_point, stream);
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(HostCall {
                entry_point,
                handle: handle.id,
                stream,
            });
        Ok(())
    }
}

impl NativeLibrary for HostLibrary {
    type Stream = StreamId;
    type Handle = HostHandle;

    fn create(&self) -> Result<Self::Handle, NativeStatus> {
        Self::injected(&self.fail_create)?;
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(HostHandle {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            stream: None,
        })
    }

    fn set_stream(
        &self,
        handle: &mut Self::Handle,
        stream: Self::Stream,
    ) -> Result<(), NativeStatus> {
        Self::injected(&self.fail_bind)?;
        self.bound.fetch_add(1, Ordering::SeqCst);
        handle.stream = Some(stream);
        Ok(())
    }

    fn destroy(&self, _handle: Self::Handle) -> Result<(), NativeStatus> {
        self.destroyed.fetch_add(1, Ordering::SeqCst);
        Self::injected(&self.fail_destroy)
    }
}

/// `y = alpha * op(A) * x + beta * y`. A zero `beta` overwrites `y` instead of scaling it
fn spmv<T: SparseScalar>(
    op: Operation,
    alpha: T,
    a: &CsrMatrix<'_, T>,
    x: &[T],
    beta: T,
    y: &mut [T],
) {
    let (out_len, _) = a.shape(op);
    for v in y[..out_len].iter_mut() {
        *v = if beta.is_zero() { T::zero() } else { beta * *v };
    }
    match op {
        Operation::NonTranspose => {
            for row in 0..a.rows {
                let mut sum = T::zero();
                for k in a.row_range(row) {
                    sum = sum + a.values[k] * x[a.col_ind[k] as usize];
                }
                y[row] = y[row] + alpha * sum;
            }
        }
        Operation::Transpose | Operation::ConjugateTranspose => {
            for row in 0..a.rows {
                let scaled = alpha * x[row];
                for k in a.row_range(row) {
                    let value = if op == Operation::ConjugateTranspose {
                        a.values[k].conj()
                    } else {
                        a.values[k]
                    };
                    let col = a.col_ind[k] as usize;
                    y[col] = y[col] + value * scaled;
                }
            }
        }
    }
}

/// Row `row` of `alpha * A + beta * B`, sorted by column. Explicit zeros are kept
fn merged_row<T: SparseScalar>(
    alpha: T,
    a: &CsrMatrix<'_, T>,
    beta: T,
    b: &CsrMatrix<'_, T>,
    row: usize,
) -> Vec<(i32, T)> {
    let mut merged: Vec<(i32, T)> = a
        .row_range(row)
        .map(|k| (a.col_ind[k], alpha * a.values[k]))
        .chain(b.row_range(row).map(|k| (b.col_ind[k], beta * b.values[k])))
        .collect();
    merged.sort_by_key(|(col, _)| *col);
    merged.dedup_by(|current, previous| {
        if current.0 == previous.0 {
            previous.1 = previous.1 + current.1;
            true
        } else {
            false
        }
    });
    merged
}

/// Thomas algorithm, solution overwrites `x`
fn solve_tridiagonal<T: SparseScalar>(
    dl: &[T],
    d: &[T],
    du: &[T],
    x: &mut [T],
) -> Result<(), NativeStatus> {
    let m = d.len();
    if m == 0 {
        return Ok(());
    }
    let mut c_prime = vec![T::zero(); m];
    let mut pivot = d[0];
    if pivot.is_zero() {
        return Err(NativeStatus::EXECUTION_FAILED);
    }
    if m > 1 {
        c_prime[0] = du[0] / pivot;
    }
    x[0] = x[0] / pivot;
    for i in 1..m {
        pivot = d[i] - dl[i] * c_prime[i - 1];
        if pivot.is_zero() {
            return Err(NativeStatus::EXECUTION_FAILED);
        }
        if i + 1 < m {
            c_prime[i] = du[i] / pivot;
        }
        x[i] = (x[i] - dl[i] * x[i - 1]) / pivot;
    }
    for i in (0..m - 1).rev() {
        x[i] = x[i] - c_prime[i] * x[i + 1];
    }
    Ok(())
}

impl SparseLibrary for HostLibrary {
    fn coo2csr(
        &self,
        handle: &Self::Handle,
        coo_row_ind: &[i32],
        m: usize,
        csr_row_ptr: &mut [i32],
    ) -> Result<(), NativeStatus> {
        self.begin(handle, index_entry_point("coo2csr"))?;
        csr_row_ptr.fill(0);
        for &row in coo_row_ind {
            if row < 0 || row as usize >= m {
                return Err(NativeStatus::INVALID_VALUE);
            }
            csr_row_ptr[row as usize + 1] += 1;
        }
        for i in 0..m {
            csr_row_ptr[i + 1] += csr_row_ptr[i];
        }
        Ok(())
    }

    fn csr2coo(
        &self,
        handle: &Self::Handle,
        csr_row_ptr: &[i32],
        m: usize,
        coo_row_ind: &mut [i32],
    ) -> Result<(), NativeStatus> {
        self.begin(handle, index_entry_point("csr2coo"))?;
        for row in 0..m {
            for k in csr_row_ptr[row]..csr_row_ptr[row + 1] {
                coo_row_ind[k as usize] = row as i32;
            }
        }
        Ok(())
    }

    fn csrmv<T: SparseScalar>(
        &self,
        handle: &Self::Handle,
        op: Operation,
        alpha: T,
        a: &CsrMatrix<'_, T>,
        x: &[T],
        beta: T,
        y: &mut [T],
    ) -> Result<(), NativeStatus> {
        self.begin(handle, csrmv_entry_point::<T>(op))?;
        spmv(op, alpha, a, x, beta, y);
        Ok(())
    }

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
    ) -> Result<(), NativeStatus> {
        self.begin(handle, T::PRECISION.entry_point("csrmm2"))?;
        let (rows, inner) = a.shape(op);
        if rows == 0 {
            return Ok(());
        }
        for col in 0..n {
            // an empty B may be shorter than `col * ldb`
            let x = if inner == 0 {
                &b[..0]
            } else {
                &b[col * ldb..col * ldb + inner]
            };
            let y = &mut c[col * ldc..col * ldc + rows];
            spmv(op, alpha, a, x, beta, y);
        }
        Ok(())
    }

    fn csr2csc<T: SparseScalar>(
        &self,
        handle: &Self::Handle,
        a: &CsrMatrix<'_, T>,
        csc_values: &mut [T],
        csc_row_ind: &mut [i32],
        csc_col_ptr: &mut [i32],
    ) -> Result<(), NativeStatus> {
        self.begin(handle, T::PRECISION.entry_point("csr2csc"))?;
        csc_col_ptr.fill(0);
        for &col in a.col_ind {
            csc_col_ptr[col as usize + 1] += 1;
        }
        for col in 0..a.cols {
            csc_col_ptr[col + 1] += csc_col_ptr[col];
        }
        // next free slot of every column
        let mut next: Vec<i32> = csc_col_ptr[..a.cols].to_vec();
        for row in 0..a.rows {
            for k in a.row_range(row) {
                let col = a.col_ind[k] as usize;
                let dst = next[col] as usize;
                csc_row_ind[dst] = row as i32;
                csc_values[dst] = a.values[k];
                next[col] += 1;
            }
        }
        Ok(())
    }

    fn csrgeam_nnz<T: SparseScalar>(
        &self,
        handle: &Self::Handle,
        a: &CsrMatrix<'_, T>,
        b: &CsrMatrix<'_, T>,
        c_row_ptr: &mut [i32],
    ) -> Result<usize, NativeStatus> {
        self.begin(handle, index_entry_point("csrgeamNnz"))?;
        c_row_ptr[0] = 0;
        for row in 0..a.rows {
            let count = merged_row(T::one(), a, T::one(), b, row).len() as i32;
            c_row_ptr[row + 1] = c_row_ptr[row] + count;
        }
        Ok(c_row_ptr[a.rows] as usize)
    }

    fn csrgeam<T: SparseScalar>(
        &self,
        handle: &Self::Handle,
        alpha: T,
        a: &CsrMatrix<'_, T>,
        beta: T,
        b: &CsrMatrix<'_, T>,
        c: &mut CsrMatrixMut<'_, T>,
    ) -> Result<(), NativeStatus> {
        self.begin(handle, T::PRECISION.entry_point("csrgeam"))?;
        for row in 0..a.rows {
            let merged = merged_row(alpha, a, beta, b, row);
            let range = c.row_ptr[row] as usize..c.row_ptr[row + 1] as usize;
            if range.len() != merged.len() {
                return Err(NativeStatus::INVALID_VALUE);
            }
            for (dst, (col, value)) in range.zip(merged) {
                c.col_ind[dst] = col;
                c.values[dst] = value;
            }
        }
        Ok(())
    }

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
    ) -> Result<(), NativeStatus> {
        self.begin(handle, T::PRECISION.entry_point("gtsv_nopivot"))?;
        if m == 0 {
            return Ok(());
        }
        let mut solved = Vec::with_capacity(n);
        for col in 0..n {
            let mut x = b[col * ldb..col * ldb + m].to_vec();
            solve_tridiagonal(&dl[..m], &d[..m], &du[..m], &mut x)?;
            solved.push(x);
        }
        for (col, x) in solved.iter().enumerate() {
            b[col * ldb..col * ldb + m].copy_from_slice(x);
        }
        Ok(())
    }

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
    ) -> Result<(), NativeStatus> {
        self.begin(handle, T::PRECISION.entry_point("gtsvStridedBatch"))?;
        if m == 0 {
            return Ok(());
        }
        let mut solved = Vec::with_capacity(batch_count);
        for batch in 0..batch_count {
            let system = batch * batch_stride..batch * batch_stride + m;
            let mut rhs = x[system.clone()].to_vec();
            solve_tridiagonal(
                &dl[system.clone()],
                &d[system.clone()],
                &du[system],
                &mut rhs,
            )?;
            solved.push(rhs);
        }
        for (batch, rhs) in solved.iter().enumerate() {
            let start = batch * batch_stride;
            x[start..start + m].copy_from_slice(rhs);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    // [1 0 2]
    // [0 3 0]
    const A_ROW_PTR: [i32; 3] = [0, 2, 3];
    const A_COL_IND: [i32; 3] = [0, 2, 1];
    const A_VALUES: [f64; 3] = [1.0, 2.0, 3.0];

    fn a() -> CsrMatrix<'static, f64> {
        CsrMatrix::new(2, 3, &A_ROW_PTR, &A_COL_IND, &A_VALUES)
    }

    fn bound_handle(library: &HostLibrary) -> HostHandle {
        let mut handle = library.create().unwrap();
        library.set_stream(&mut handle, StreamId(0)).unwrap();
        handle
    }

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-12, "{:?} != {:?}", actual, expected);
        }
    }

    #[test]
    fn handle_lifecycle_counters() {
        let library = HostLibrary::new();
        let handle = bound_handle(&library);
        assert_eq!(handle.stream(), Some(StreamId(0)));
        assert_eq!(library.live(), 1);
        library.destroy(handle).unwrap();
        assert_eq!(library.live(), 0);
        assert_eq!(library.bound(), 1);
    }

    #[test]
    fn unbound_handle_is_rejected() {
        let library = HostLibrary::new();
        let handle = library.create().unwrap();
        let mut y = [0.0; 2];
        let result = library.csrmv(&handle, Operation::NonTranspose, 1.0, &a(), &[1.0; 3], 0.0, &mut y);
        assert_eq!(result, Err(NativeStatus::NOT_INITIALIZED));
        assert!(library.calls().is_empty());
    }

    #[test]
    fn coo_and_csr_rows() {
        let library = HostLibrary::new();
        let handle = bound_handle(&library);
        let coo_rows = [0, 0, 2, 2, 2];
        let mut row_ptr = [0; 4];
        library.coo2csr(&handle, &coo_rows, 3, &mut row_ptr).unwrap();
        assert_eq!(row_ptr, [0, 2, 2, 5]);

        let mut back = [0; 5];
        library.csr2coo(&handle, &row_ptr, 3, &mut back).unwrap();
        assert_eq!(back, coo_rows);
    }

    #[test]
    fn csrmv_plain() {
        let library = HostLibrary::new();
        let handle = bound_handle(&library);
        let mut y = [1.0, 1.0];
        library
            .csrmv(&handle, Operation::NonTranspose, 2.0, &a(), &[1.0, 2.0, 3.0], 1.0, &mut y)
            .unwrap();
        assert_close(&y, &[15.0, 13.0]);
        assert_eq!(library.calls()[0].entry_point, "Dcsrmv_mp");
    }

    #[test]
    fn csrmv_transposed_overwrites_with_zero_beta() {
        let library = HostLibrary::new();
        let handle = bound_handle(&library);
        let mut y = [f64::NAN; 3];
        library
            .csrmv(&handle, Operation::Transpose, 1.0, &a(), &[1.0, 2.0], 0.0, &mut y)
            .unwrap();
        assert_close(&y, &[1.0, 6.0, 2.0]);
        assert_eq!(library.calls()[0].entry_point, "Dcsrmv");
    }

    #[test]
    fn csrmv_conjugate_transpose() {
        let library = HostLibrary::new();
        let handle = bound_handle(&library);
        let values = [Complex64::new(0.0, 1.0)];
        let a = CsrMatrix::new(1, 1, &[0, 1], &[0], &values);
        let mut y = [Complex64::zero()];
        library
            .csrmv(
                &handle,
                Operation::ConjugateTranspose,
                Complex64::new(1.0, 0.0),
                &a,
                &[Complex64::new(1.0, 0.0)],
                Complex64::zero(),
                &mut y,
            )
            .unwrap();
        assert_eq!(y[0], Complex64::new(0.0, -1.0));
        assert_eq!(library.calls()[0].entry_point, "Zcsrmv");
    }

    #[test]
    fn csrmm_dense_columns() {
        let library = HostLibrary::new();
        let handle = bound_handle(&library);
        // B is 3x2 column major
        let b = [1.0, 2.0, 3.0, 0.0, 1.0, 0.0];
        let mut c = [0.0; 4];
        library
            .csrmm(&handle, Operation::NonTranspose, 1.0, &a(), &b, 3, 2, 0.0, &mut c, 2)
            .unwrap();
        assert_close(&c, &[7.0, 6.0, 0.0, 3.0]);
    }

    #[test]
    fn csr_to_csc() {
        let library = HostLibrary::new();
        let handle = bound_handle(&library);
        let mut values = [0.0; 3];
        let mut row_ind = [0; 3];
        let mut col_ptr = [0; 4];
        library
            .csr2csc(&handle, &a(), &mut values, &mut row_ind, &mut col_ptr)
            .unwrap();
        assert_eq!(col_ptr, [0, 1, 2, 3]);
        assert_eq!(row_ind, [0, 1, 0]);
        assert_close(&values, &[1.0, 3.0, 2.0]);
    }

    #[test]
    fn csrgeam_keeps_structural_zeros() {
        let library = HostLibrary::new();
        let handle = bound_handle(&library);
        // [0 1 -2]
        // [0 0  4]
        let b_values = [1.0, -2.0, 4.0];
        let b = CsrMatrix::new(2, 3, &[0, 2, 3], &[1, 2, 2], &b_values);

        let mut row_ptr = [0; 3];
        let nnz = library.csrgeam_nnz(&handle, &a(), &b, &mut row_ptr).unwrap();
        assert_eq!(nnz, 5);
        assert_eq!(row_ptr, [0, 3, 5]);

        let mut col_ind = [0; 5];
        let mut values = [0.0; 5];
        let mut c = CsrMatrixMut::new(2, 3, &mut row_ptr, &mut col_ind, &mut values);
        library.csrgeam(&handle, 1.0, &a(), 1.0, &b, &mut c).unwrap();
        assert_eq!(col_ind, [0, 1, 2, 1, 2]);
        assert_close(&values, &[1.0, 1.0, 0.0, 3.0, 4.0]);
    }

    #[test]
    fn gtsv_multiple_right_hand_sides() {
        let library = HostLibrary::new();
        let handle = bound_handle(&library);
        let dl = [0.0, 1.0, 1.0];
        let d = [2.0, 2.0, 2.0];
        let du = [1.0, 1.0, 0.0];
        // ldb = 4, last row of every column is padding
        let mut b = [4.0, 8.0, 8.0, -1.0, 2.0, 2.0, 2.0, -1.0];
        library
            .gtsv_no_pivot(&handle, 3, 2, &dl, &d, &du, &mut b, 4)
            .unwrap();
        assert_close(&b[0..3], &[1.0, 2.0, 3.0]);
        assert_close(&b[4..7], &[1.0, 0.0, 1.0]);
        assert_eq!(b[3], -1.0);
        assert_eq!(b[7], -1.0);
    }

    #[test]
    fn gtsv_strided_batches() {
        let library = HostLibrary::new();
        let handle = bound_handle(&library);
        let dl = [0.0, 1.0, 0.0, 0.0, 1.0];
        let d = [2.0, 2.0, 0.0, 2.0, 2.0];
        let du = [1.0, 0.0, 0.0, 1.0, 0.0];
        // [2 1] x = [3 3] and [2 1] x = [6 3]
        // [1 2]                [1 2]
        let mut x = [3.0, 3.0, 9.0, 6.0, 3.0];
        library
            .gtsv_strided_batch(&handle, 2, &dl, &d, &du, &mut x, 2, 3)
            .unwrap();
        assert_close(&x[0..2], &[1.0, 1.0]);
        assert_eq!(x[2], 9.0);
        assert_close(&x[3..5], &[3.0, 0.0]);
        assert_eq!(library.calls()[0].entry_point, "DgtsvStridedBatch");
    }

    #[test]
    fn gtsv_singular_batch_leaves_every_batch_untouched() {
        let library = HostLibrary::new();
        let handle = bound_handle(&library);
        let dl = [0.0, 1.0, 0.0, 0.0, 1.0];
        let d = [2.0, 2.0, 0.0, 1.0, 1.0];
        let du = [1.0, 0.0, 0.0, 1.0, 0.0];
        // the second system is [1 1; 1 1]
        let mut x = [3.0, 3.0, 9.0, 2.0, 2.0];
        let result = library.gtsv_strided_batch(&handle, 2, &dl, &d, &du, &mut x, 2, 3);
        assert_eq!(result, Err(NativeStatus::EXECUTION_FAILED));
        assert_eq!(x, [3.0, 3.0, 9.0, 2.0, 2.0]);
    }

    #[test]
    fn gtsv_failing_column_leaves_b_untouched() {
        let library = HostLibrary::new();
        let handle = bound_handle(&library);
        // [2 1  ]
        // [1 0.5]
        // the first row is eliminated before the second pivot comes out zero
        let mut b = [4.0, 1.0, 2.0, 2.0];
        let result =
            library.gtsv_no_pivot(&handle, 2, 2, &[0.0, 1.0], &[2.0, 0.5], &[1.0, 0.0], &mut b, 2);
        assert_eq!(result, Err(NativeStatus::EXECUTION_FAILED));
        assert_eq!(b, [4.0, 1.0, 2.0, 2.0]);
    }

    #[test]
    fn empty_systems_are_noops() {
        let library = HostLibrary::new();
        let handle = bound_handle(&library);
        let empty: [f64; 0] = [];
        let mut none: [f64; 0] = [];

        library
            .gtsv_no_pivot(&handle, 0, 2, &empty, &empty, &empty, &mut none, 1)
            .unwrap();
        library
            .gtsv_strided_batch(&handle, 0, &empty, &empty, &empty, &mut none, 2, 5)
            .unwrap();

        let no_rows = CsrMatrix::new(0, 3, &[0], &[], &empty);
        library
            .csrmm(&handle, Operation::NonTranspose, 1.0, &no_rows, &[0.0; 6], 3, 2, 0.0, &mut none, 1)
            .unwrap();

        // 2x0 times an empty B scales C by beta
        let no_cols = CsrMatrix::new(2, 0, &[0, 0, 0], &[], &empty);
        let mut c = [1.0, 2.0, 3.0, 4.0];
        library
            .csrmm(&handle, Operation::NonTranspose, 1.0, &no_cols, &empty, 1, 2, 2.0, &mut c, 2)
            .unwrap();
        assert_eq!(c, [2.0, 4.0, 6.0, 8.0]);
        assert_eq!(library.calls().len(), 4);
    }

    #[test]
    fn gtsv_zero_pivot_fails() {
        let library = HostLibrary::new();
        let handle = bound_handle(&library);
        let mut b = [1.0, 1.0];
        let result = library.gtsv_no_pivot(&handle, 2, 1, &[0.0, 1.0], &[0.0, 1.0], &[1.0, 0.0], &mut b, 2);
        assert_eq!(result, Err(NativeStatus::EXECUTION_FAILED));
    }

    #[test]
    fn injected_routine_failure() {
        let library = HostLibrary::new();
        let handle = bound_handle(&library);
        library.fail_next_routine(NativeStatus::ARCH_MISMATCH);
        let mut row_ptr = [0; 2];
        assert_eq!(
            library.coo2csr(&handle, &[0], 1, &mut row_ptr),
            Err(NativeStatus::ARCH_MISMATCH)
        );
        assert!(library.coo2csr(&handle, &[0], 1, &mut row_ptr).is_ok());
        assert_eq!(library.calls().len(), 1);
        library.clear_calls();
        assert!(library.calls().is_empty());
    }
}
