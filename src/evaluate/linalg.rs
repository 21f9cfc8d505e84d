// Small dense linear algebra for the metrics: singular values via the
// eigenvalues of the (smaller) Gram matrix, decomposed with nalgebra.

use nalgebra::{DMatrix, SymmetricEigen};

use crate::topics::model::DenseMatrix;

/// Singular values of `m`, largest first. There are min(rows, cols) of them.
pub fn singular_values(m: &DenseMatrix) -> Vec<f64> {
    let gram = gram_matrix(m);
    let mut sv: Vec<f64> = symmetric_eigenvalues(&gram)
        .into_iter()
        .map(|ev| ev.max(0.0).sqrt())
        .collect();
    sv.sort_by(|a, b| b.total_cmp(a));
    sv
}

/// M·Mᵀ when M is wide, Mᵀ·M when it is tall, whichever is smaller.
fn gram_matrix(m: &DenseMatrix) -> DenseMatrix {
    if m.n_rows <= m.n_cols {
        let n = m.n_rows;
        let mut g = DenseMatrix::zeros(n, n);
        for i in 0..n {
            for j in i..n {
                let dot: f64 = m.row(i).iter().zip(m.row(j)).map(|(a, b)| a * b).sum();
                g.row_mut(i)[j] = dot;
                g.row_mut(j)[i] = dot;
            }
        }
        g
    } else {
        let n = m.n_cols;
        let mut g = DenseMatrix::zeros(n, n);
        for row in m.rows() {
            for i in 0..n {
                if row[i] == 0.0 {
                    continue;
                }
                for j in i..n {
                    g.row_mut(i)[j] += row[i] * row[j];
                }
            }
        }
        for i in 0..n {
            for j in 0..i {
                let v = g.get(j, i);
                g.row_mut(i)[j] = v;
            }
        }
        g
    }
}

/// Eigenvalues of a symmetric matrix (unordered).
pub fn symmetric_eigenvalues(a: &DenseMatrix) -> Vec<f64> {
    let n = a.n_rows;
    let m = DMatrix::from_fn(n, n, |i, j| a.get(i, j));
    SymmetricEigen::new(m).eigenvalues.iter().copied().collect()
}
