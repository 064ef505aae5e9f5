use crate::error::SparseError;
use crate::library::{csrmv_entry_point, SparseLibrary};
use crate::matrix::{dense_len, CsrMatrix, CsrMatrixMut, Operation};
use crate::scalar::{index_entry_point, SparseScalar};
use derivative::Derivative;
use stream_handles::cache::{HandleCache, HandleRef};
use stream_handles::error::HandleFault;
use stream_handles::native::NativeStatus;

fn native_error(entry_point: String, status: NativeStatus) -> SparseError {
    SparseError::Native {
        entry_point,
        status,
    }
}

/// Runs sparse routines on one stream
///
/// Built per operation from the shared [`HandleCache`] and the stream the operation runs on.
/// [`SparseContext::initialize`] must be called before any routine; it fetches (or lazily creates)
/// the stream's native handle.
///
/// # Example
/// ```
/// use stream_sparse::prelude::*;
///
/// let cache = HandleCache::new(HostLibrary::new());
/// let mut context = SparseContext::new(&cache, StreamId(0));
/// context.initialize().unwrap();
///
/// // [2 0]
/// // [1 3]
/// let a = CsrMatrix::new(2, 2, &[0, 1, 3], &[0, 0, 1], &[2.0f64, 1.0, 3.0]);
/// let mut y = [0.0; 2];
/// context.csrmv(Operation::NonTranspose, 1.0, &a, &[1.0, 1.0], 0.0, &mut y).unwrap();
/// assert_eq!(y, [2.0, 4.0]);
/// ```
#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub struct SparseContext<'c, L: SparseLibrary> {
    cache: &'c HandleCache<L>,
    stream: L::Stream,
    handle: Option<HandleRef<L>>,
}

impl<'c, L: SparseLibrary> SparseContext<'c, L> {
    pub fn new(cache: &'c HandleCache<L>, stream: L::Stream) -> Self {
        Self {
            cache,
            stream,
            handle: None,
        }
    }

    /// Acquire the native handle of the context's stream
    pub fn initialize(&mut self) -> Result<(), SparseError> {
        if self.handle.is_some() {
            return Ok(());
        }
        self.handle = Some(self.cache.acquire(self.stream)?);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.handle.is_some()
    }

    pub fn stream(&self) -> L::Stream {
        self.stream
    }

    /// # Panics
    /// Panics if [`SparseContext::initialize`] has not succeeded
    pub fn handle(&self) -> &HandleRef<L> {
        match &self.handle {
            Some(handle) => handle,
            None => {
                let fault = HandleFault::ContractViolation {
                    stream: format!("{:?}", self.stream),
                };
                tracing::error!("{fault}");
                panic!("{fault}");
            }
        }
    }

    fn library(&self) -> &L {
        self.cache.library()
    }

    pub fn coo2csr(
        &self,
        coo_row_ind: &[i32],
        m: usize,
        csr_row_ptr: &mut [i32],
    ) -> Result<(), SparseError> {
        let handle = self.handle().handle();
        if csr_row_ptr.len() != m + 1 {
            return Err(SparseError::invalid(format!(
                "csr_row_ptr has {} entries, expected {}",
                csr_row_ptr.len(),
                m + 1
            )));
        }
        if coo_row_ind.iter().any(|&row| row < 0 || row as usize >= m) {
            return Err(SparseError::invalid("COO row index out of bounds"));
        }
        if coo_row_ind.windows(2).any(|w| w[0] > w[1]) {
            return Err(SparseError::invalid("COO row indices must be sorted"));
        }
        self.library()
            .coo2csr(handle, coo_row_ind, m, csr_row_ptr)
            .map_err(|status| native_error(index_entry_point("coo2csr"), status))
    }

    pub fn csr2coo(
        &self,
        csr_row_ptr: &[i32],
        m: usize,
        coo_row_ind: &mut [i32],
    ) -> Result<(), SparseError> {
        let handle = self.handle().handle();
        if csr_row_ptr.len() != m + 1 {
            return Err(SparseError::invalid(format!(
                "csr_row_ptr has {} entries, expected {}",
                csr_row_ptr.len(),
                m + 1
            )));
        }
        if csr_row_ptr[0] != 0 || csr_row_ptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(SparseError::invalid("csr_row_ptr is not a valid offset array"));
        }
        if csr_row_ptr[m] as usize != coo_row_ind.len() {
            return Err(SparseError::invalid(format!(
                "coo_row_ind has {} entries, expected {}",
                coo_row_ind.len(),
                csr_row_ptr[m]
            )));
        }
        self.library()
            .csr2coo(handle, csr_row_ptr, m, coo_row_ind)
            .map_err(|status| native_error(index_entry_point("csr2coo"), status))
    }

    /// `y = alpha * op(A) * x + beta * y`
    pub fn csrmv<T: SparseScalar>(
        &self,
        op: Operation,
        alpha: T,
        a: &CsrMatrix<'_, T>,
        x: &[T],
        beta: T,
        y: &mut [T],
    ) -> Result<(), SparseError> {
        let handle = self.handle().handle();
        a.validate()?;
        let (rows, cols) = a.shape(op);
        if x.len() < cols || y.len() < rows {
            return Err(SparseError::invalid(format!(
                "op(A) is {}x{} but x has {} and y has {} entries",
                rows,
                cols,
                x.len(),
                y.len()
            )));
        }
        self.library()
            .csrmv(handle, op, alpha, a, x, beta, y)
            .map_err(|status| native_error(csrmv_entry_point::<T>(op), status))
    }

    /// `C = alpha * op(A) * B + beta * C`, dense operands column major
    #[allow(clippy::too_many_arguments)]
    pub fn csrmm<T: SparseScalar>(
        &self,
        op: Operation,
        alpha: T,
        a: &CsrMatrix<'_, T>,
        b: &[T],
        ldb: usize,
        n: usize,
        beta: T,
        c: &mut [T],
        ldc: usize,
    ) -> Result<(), SparseError> {
        let handle = self.handle().handle();
        a.validate()?;
        let (rows, inner) = a.shape(op);
        if ldb < inner || b.len() < dense_len(inner, n, ldb) {
            return Err(SparseError::invalid(format!(
                "B must be {}x{} with ldb >= {}",
                inner, n, inner
            )));
        }
        if ldc < rows || c.len() < dense_len(rows, n, ldc) {
            return Err(SparseError::invalid(format!(
                "C must be {}x{} with ldc >= {}",
                rows, n, rows
            )));
        }
        self.library()
            .csrmm(handle, op, alpha, a, b, ldb, n, beta, c, ldc)
            .map_err(|status| native_error(T::PRECISION.entry_point("csrmm2"), status))
    }

    /// Convert `A` to compressed sparse column form
    pub fn csr2csc<T: SparseScalar>(
        &self,
        a: &CsrMatrix<'_, T>,
        csc_values: &mut [T],
        csc_row_ind: &mut [i32],
        csc_col_ptr: &mut [i32],
    ) -> Result<(), SparseError> {
        let handle = self.handle().handle();
        a.validate()?;
        if csc_values.len() != a.nnz()
            || csc_row_ind.len() != a.nnz()
            || csc_col_ptr.len() != a.cols + 1
        {
            return Err(SparseError::invalid(format!(
                "CSC output needs {} values, {} row indices and {} column offsets",
                a.nnz(),
                a.nnz(),
                a.cols + 1
            )));
        }
        self.library()
            .csr2csc(handle, a, csc_values, csc_row_ind, csc_col_ptr)
            .map_err(|status| native_error(T::PRECISION.entry_point("csr2csc"), status))
    }

    /// Fill in the row offsets of `A + B` and return its number of non zeros
    pub fn csrgeam_nnz<T: SparseScalar>(
        &self,
        a: &CsrMatrix<'_, T>,
        b: &CsrMatrix<'_, T>,
        c_row_ptr: &mut [i32],
    ) -> Result<usize, SparseError> {
        let handle = self.handle().handle();
        Self::check_same_shape(a, b)?;
        if c_row_ptr.len() != a.rows + 1 {
            return Err(SparseError::invalid(format!(
                "c_row_ptr has {} entries, expected {}",
                c_row_ptr.len(),
                a.rows + 1
            )));
        }
        self.library()
            .csrgeam_nnz(handle, a, b, c_row_ptr)
            .map_err(|status| native_error(index_entry_point("csrgeamNnz"), status))
    }

    /// `C = alpha * A + beta * B`, where `c.row_ptr` was filled by [`SparseContext::csrgeam_nnz`]
    pub fn csrgeam<T: SparseScalar>(
        &self,
        alpha: T,
        a: &CsrMatrix<'_, T>,
        beta: T,
        b: &CsrMatrix<'_, T>,
        c: &mut CsrMatrixMut<'_, T>,
    ) -> Result<(), SparseError> {
        let handle = self.handle().handle();
        Self::check_same_shape(a, b)?;
        if c.rows != a.rows || c.cols != a.cols || c.row_ptr.len() != a.rows + 1 {
            return Err(SparseError::invalid(format!(
                "C must be {}x{} with {} row offsets",
                a.rows,
                a.cols,
                a.rows + 1
            )));
        }
        if c.row_ptr[0] != 0 || c.row_ptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(SparseError::invalid(
                "c.row_ptr is not a valid offset array, run csrgeam_nnz first",
            ));
        }
        let nnz = c.row_ptr[c.rows] as usize;
        if c.col_ind.len() < nnz || c.values.len() < nnz {
            return Err(SparseError::invalid(format!(
                "C needs room for {} non zeros",
                nnz
            )));
        }
        self.library()
            .csrgeam(handle, alpha, a, beta, b, c)
            .map_err(|status| native_error(T::PRECISION.entry_point("csrgeam"), status))
    }

    /// Solve a tridiagonal system with `n` right hand sides without pivoting
    #[allow(clippy::too_many_arguments)]
    pub fn gtsv_no_pivot<T: SparseScalar>(
        &self,
        m: usize,
        n: usize,
        dl: &[T],
        d: &[T],
        du: &[T],
        b: &mut [T],
        ldb: usize,
    ) -> Result<(), SparseError> {
        let handle = self.handle().handle();
        if dl.len() != m || d.len() != m || du.len() != m {
            return Err(SparseError::invalid(format!(
                "diagonals must have {} entries",
                m
            )));
        }
        if ldb < m || b.len() < dense_len(m, n, ldb) {
            return Err(SparseError::invalid(format!(
                "B must be {}x{} with ldb >= {}",
                m, n, m
            )));
        }
        self.library()
            .gtsv_no_pivot(handle, m, n, dl, d, du, b, ldb)
            .map_err(|status| native_error(T::PRECISION.entry_point("gtsv_nopivot"), status))
    }

    /// Solve `batch_count` tridiagonal systems of size `m` stored `batch_stride` apart
    #[allow(clippy::too_many_arguments)]
    pub fn gtsv_strided_batch<T: SparseScalar>(
        &self,
        m: usize,
        dl: &[T],
        d: &[T],
        du: &[T],
        x: &mut [T],
        batch_count: usize,
        batch_stride: usize,
    ) -> Result<(), SparseError> {
        let handle = self.handle().handle();
        if batch_stride < m {
            return Err(SparseError::invalid(format!(
                "batch_stride {} is smaller than the system size {}",
                batch_stride, m
            )));
        }
        let needed = dense_len(m, batch_count, batch_stride);
        if [dl.len(), d.len(), du.len(), x.len()]
            .iter()
            .any(|&len| len < needed)
        {
            return Err(SparseError::invalid(format!(
                "every operand needs at least {} entries",
                needed
            )));
        }
        self.library()
            .gtsv_strided_batch(handle, m, dl, d, du, x, batch_count, batch_stride)
            .map_err(|status| native_error(T::PRECISION.entry_point("gtsvStridedBatch"), status))
    }

    fn check_same_shape<T>(a: &CsrMatrix<'_, T>, b: &CsrMatrix<'_, T>) -> Result<(), SparseError> {
        a.validate()?;
        b.validate()?;
        if a.rows != b.rows || a.cols != b.cols {
            return Err(SparseError::invalid(format!(
                "A is {}x{} but B is {}x{}",
                a.rows, a.cols, b.rows, b.cols
            )));
        }
        Ok(())
    }
}
