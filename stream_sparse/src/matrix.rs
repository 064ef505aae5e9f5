use crate::error::SparseError;

/// How the sparse operand enters a routine
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Operation {
    #[default]
    NonTranspose,
    Transpose,
    ConjugateTranspose,
}

impl Operation {
    pub fn is_transposed(&self) -> bool {
        !matches!(self, Operation::NonTranspose)
    }
}

/// Borrowed compressed sparse row matrix with zero based indices
#[derive(Debug, Clone, Copy)]
pub struct CsrMatrix<'a, T> {
    pub rows: usize,
    pub cols: usize,
    /// `rows + 1` offsets into `col_ind` / `values`
    pub row_ptr: &'a [i32],
    pub col_ind: &'a [i32],
    pub values: &'a [T],
}

impl<'a, T> CsrMatrix<'a, T> {
    pub fn new(
        rows: usize,
        cols: usize,
        row_ptr: &'a [i32],
        col_ind: &'a [i32],
        values: &'a [T],
    ) -> Self {
        Self {
            rows,
            cols,
            row_ptr,
            col_ind,
            values,
        }
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Shape of `op(A)`
    pub fn shape(&self, op: Operation) -> (usize, usize) {
        if op.is_transposed() {
            (self.cols, self.rows)
        } else {
            (self.rows, self.cols)
        }
    }

    /// Range of `col_ind` / `values` belonging to `row`
    pub fn row_range(&self, row: usize) -> std::ops::Range<usize> {
        self.row_ptr[row] as usize..self.row_ptr[row + 1] as usize
    }

    /// Check the matrix is structurally sound
    pub fn validate(&self) -> Result<(), SparseError> {
        validate_csr(self.rows, self.cols, self.row_ptr, self.col_ind, self.values.len())
    }
}

/// Output compressed sparse row matrix, filled in by a routine
#[derive(Debug)]
pub struct CsrMatrixMut<'a, T> {
    pub rows: usize,
    pub cols: usize,
    pub row_ptr: &'a mut [i32],
    pub col_ind: &'a mut [i32],
    pub values: &'a mut [T],
}

impl<'a, T> CsrMatrixMut<'a, T> {
    pub fn new(
        rows: usize,
        cols: usize,
        row_ptr: &'a mut [i32],
        col_ind: &'a mut [i32],
        values: &'a mut [T],
    ) -> Self {
        Self {
            rows,
            cols,
            row_ptr,
            col_ind,
            values,
        }
    }

    pub fn as_view(&self) -> CsrMatrix<'_, T> {
        CsrMatrix {
            rows: self.rows,
            cols: self.cols,
            row_ptr: &*self.row_ptr,
            col_ind: &*self.col_ind,
            values: &*self.values,
        }
    }
}

pub(crate) fn validate_csr(
    rows: usize,
    cols: usize,
    row_ptr: &[i32],
    col_ind: &[i32],
    nnz: usize,
) -> Result<(), SparseError> {
    if row_ptr.len() != rows + 1 {
        return Err(SparseError::invalid(format!(
            "row_ptr has {} entries, expected {}",
            row_ptr.len(),
            rows + 1
        )));
    }
    if col_ind.len() != nnz {
        return Err(SparseError::invalid(format!(
            "col_ind has {} entries but there are {} values",
            col_ind.len(),
            nnz
        )));
    }
    if row_ptr[0] != 0 || row_ptr[rows] as usize != nnz {
        return Err(SparseError::invalid(format!(
            "row_ptr must run from 0 to {}, got {}..{}",
            nnz, row_ptr[0], row_ptr[rows]
        )));
    }
    if row_ptr.windows(2).any(|w| w[0] > w[1]) {
        return Err(SparseError::invalid("row_ptr is not monotonically increasing"));
    }
    if let Some(col) = col_ind.iter().find(|&&c| c < 0 || c as usize >= cols) {
        return Err(SparseError::invalid(format!(
            "column index {} out of bounds for {} columns",
            col, cols
        )));
    }
    Ok(())
}

/// Minimum length of a column major dense buffer holding `rows` x `cols` with leading dimension `ld`
pub(crate) fn dense_len(rows: usize, cols: usize, ld: usize) -> usize {
    if rows == 0 || cols == 0 {
        0
    } else {
        ld * (cols - 1) + rows
    }
}
