// This file is part of ras, an assembler.
// Copyright (C) 2020 Jeffrey Sharp
//
// ras is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published
// by the Free Software Foundation, either version 3 of the License,
// or (at your option) any later version.
//
// ras is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See
// the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with ras.  If not, see <http://www.gnu.org/licenses/>.

//! Operator families, grouped by the value kinds they accept.
//!
//! Each family function covers the full cross product of operand kinds
//! for its group of operators, matching the dispatch table kept in the
//! language specification. Dense linear algebra here is hand-rolled
//! (no BLAS/LAPACK binding); shapes are small enough in practice that
//! straightforward loops are the right tool.

use super::Value;
use crate::lang::ast::BinOp;

fn mismatch(op: &str, a: &Value, b: &Value) -> String {
    format!("cannot apply `{}` to a {} and a {}", op, a.kind_name(), b.kind_name())
}

fn op_symbol(op: BinOp) -> &'static str {
    use BinOp::*;
    match op {
        Add => "+", Sub => "-", Mul => "*", Div => "/",
        Lt => "<", Le => "<=", Gt => ">", Ge => ">=", Eq => "==", Ne => "!=",
        And => "&&", Or => "||", Pow => "^",
    }
}

// ---------------------------------------------------------------------------
// + and -
// ---------------------------------------------------------------------------

pub fn add_family(op: BinOp, a: &Value, b: &Value) -> Result<Value, String> {
    use Value::*;

    match (a, b) {
        (Digit(x), Digit(y)) => Ok(Digit(digit_arith(op, *x, *y))),

        (Str(x), Str(y)) if op == BinOp::Add => Ok(Str(format!("{}{}", x, y))),

        // scalar +/- vector, elementwise; order matters for subtraction.
        (Digit(s), Vector(v)) => Ok(Vector(v.iter().map(|x| digit_arith(op, *s, *x)).collect())),
        (Vector(v), Digit(s)) => Ok(Vector(v.iter().map(|x| digit_arith(op, *x, *s)).collect())),

        (Digit(s), Matrix { rows, cols, data }) => Ok(Value::Matrix {
            rows: *rows, cols: *cols,
            data: data.iter().map(|x| digit_arith(op, *s, *x)).collect(),
        }),
        (Matrix { rows, cols, data }, Digit(s)) => Ok(Value::Matrix {
            rows: *rows, cols: *cols,
            data: data.iter().map(|x| digit_arith(op, *x, *s)).collect(),
        }),

        (Vector(x), Vector(y)) => {
            same_len(x.len(), y.len())?;
            Ok(Vector(elementwise(x, y, op)))
        }

        (Matrix { rows: ar, cols: ac, data: ax }, Matrix { rows: br, cols: bc, data: bx }) => {
            same_shape((*ar, *ac), (*br, *bc))?;
            Ok(Value::Matrix { rows: *ar, cols: *ac, data: elementwise(ax, bx, op) })
        }

        _ => Err(mismatch(op_symbol(op), a, b)),
    }
}

fn digit_arith(op: BinOp, x: f64, y: f64) -> f64 {
    match op {
        BinOp::Add => x + y,
        BinOp::Sub => x - y,
        _ => unreachable!(),
    }
}

fn elementwise(x: &[f64], y: &[f64], op: BinOp) -> Vec<f64> {
    x.iter().zip(y).map(|(a, b)| digit_arith(op, *a, *b)).collect()
}

fn same_len(a: usize, b: usize) -> Result<(), String> {
    if a == b {
        Ok(())
    } else {
        Err(format!("vectors of different lengths ({} and {})", a, b))
    }
}

fn same_shape(a: (usize, usize), b: (usize, usize)) -> Result<(), String> {
    if a == b {
        Ok(())
    } else {
        Err(format!("matrices of different shapes ({}x{} and {}x{})", a.0, a.1, b.0, b.1))
    }
}

// ---------------------------------------------------------------------------
// * and /
// ---------------------------------------------------------------------------

pub fn mult_family(op: BinOp, a: &Value, b: &Value) -> Result<Value, String> {
    use Value::*;

    match (a, b) {
        (Digit(x), Digit(y)) => digit_mult(op, *x, *y).map(Digit),

        (Vector(v), Digit(s)) | (Digit(s), Vector(v)) => {
            Ok(Vector(scale_vector(v, op, *s)?))
        }

        (Matrix { rows, cols, data }, Digit(s)) | (Digit(s), Matrix { rows, cols, data }) => {
            Ok(Value::Matrix { rows: *rows, cols: *cols, data: scale_vector(data, op, *s)? })
        }

        // vector * vector: dot product (division is undefined).
        (Vector(x), Vector(y)) if op == BinOp::Mul => {
            same_len(x.len(), y.len())?;
            Ok(Digit(dot(x, y)))
        }

        // vector * matrix: treat the vector as a 1xN row vector.
        (Vector(v), Matrix { rows, cols, data }) => vector_matrix(op, v, *rows, *cols, data),

        // matrix * vector: treat the vector as an Nx1 column vector.
        (Matrix { rows, cols, data }, Vector(v)) => matrix_vector(op, *rows, *cols, data, v),

        (Matrix { rows: ar, cols: ac, data: ax }, Matrix { rows: br, cols: bc, data: bx }) => {
            matrix_matrix(op, *ar, *ac, ax, *br, *bc, bx)
        }

        _ => Err(mismatch(op_symbol(op), a, b)),
    }
}

fn digit_mult(op: BinOp, x: f64, y: f64) -> Result<f64, String> {
    match op {
        BinOp::Mul => Ok(x * y),
        BinOp::Div => {
            if y == 0.0 {
                Err("division by zero".to_string())
            } else {
                Ok(x / y)
            }
        }
        _ => unreachable!(),
    }
}

fn scale_vector(v: &[f64], op: BinOp, s: f64) -> Result<Vec<f64>, String> {
    match op {
        BinOp::Mul => Ok(v.iter().map(|x| x * s).collect()),
        BinOp::Div => {
            if s == 0.0 {
                Err("division by zero".to_string())
            } else {
                Ok(v.iter().map(|x| x / s).collect())
            }
        }
        _ => unreachable!(),
    }
}

pub fn dot(x: &[f64], y: &[f64]) -> f64 {
    x.iter().zip(y).map(|(a, b)| a * b).sum()
}

/// `row_vector op matrix`. For `*`, `v` (length N) is multiplied against
/// an NxM matrix, producing a length-M row vector. For `/`, the system
/// `x * M = v` is solved for `x` (M must be square).
fn vector_matrix(op: BinOp, v: &[f64], rows: usize, cols: usize, data: &[f64]) -> Result<Value, String> {
    match op {
        BinOp::Mul => {
            if v.len() != rows {
                return Err(format!(
                    "cannot multiply a vector of length {} by a {}x{} matrix", v.len(), rows, cols
                ));
            }
            let mut out = vec![0.0; cols];
            for (c, slot) in out.iter_mut().enumerate() {
                let mut sum = 0.0;
                for r in 0..rows {
                    sum += v[r] * data[r * cols + c];
                }
                *slot = sum;
            }
            Ok(Value::Vector(out))
        }
        BinOp::Div => {
            if rows != cols {
                return Err("matrix must be square to divide a vector by it".to_string());
            }
            if v.len() != rows {
                return Err(format!(
                    "cannot divide a vector of length {} by a {}x{} matrix", v.len(), rows, cols
                ));
            }
            // x * M = v  <=>  M^T * x^T = v^T
            let transposed = transpose(rows, cols, data);
            let x = solve(cols, &transposed, v)?;
            Ok(Value::Vector(x))
        }
        _ => unreachable!(),
    }
}

/// `matrix op column_vector`. For `*`, an MxN matrix is multiplied by a
/// length-N vector, producing a length-M vector. For `/`, the system
/// `M * x = v` is solved for `x` (M must be square).
fn matrix_vector(op: BinOp, rows: usize, cols: usize, data: &[f64], v: &[f64]) -> Result<Value, String> {
    match op {
        BinOp::Mul => {
            if v.len() != cols {
                return Err(format!(
                    "cannot multiply a {}x{} matrix by a vector of length {}", rows, cols, v.len()
                ));
            }
            let mut out = vec![0.0; rows];
            for (r, slot) in out.iter_mut().enumerate() {
                let row = &data[r * cols..(r + 1) * cols];
                *slot = dot(row, v);
            }
            Ok(Value::Vector(out))
        }
        BinOp::Div => {
            if rows != cols {
                return Err("matrix must be square to divide a vector by it".to_string());
            }
            if v.len() != rows {
                return Err(format!(
                    "cannot divide a {}x{} matrix by a vector of length {}", rows, cols, v.len()
                ));
            }
            let x = solve(rows, data, v)?;
            Ok(Value::Vector(x))
        }
        _ => unreachable!(),
    }
}

fn matrix_matrix(
    op: BinOp,
    ar: usize, ac: usize, ax: &[f64],
    br: usize, bc: usize, bx: &[f64],
) -> Result<Value, String> {
    match op {
        BinOp::Mul => {
            if ac != br {
                return Err(format!(
                    "cannot multiply a {}x{} matrix by a {}x{} matrix", ar, ac, br, bc
                ));
            }
            let mut data = vec![0.0; ar * bc];
            for i in 0..ar {
                for k in 0..ac {
                    let aik = ax[i * ac + k];
                    if aik == 0.0 { continue; }
                    for j in 0..bc {
                        data[i * bc + j] += aik * bx[k * bc + j];
                    }
                }
            }
            Ok(Value::Matrix { rows: ar, cols: bc, data })
        }
        BinOp::Div => {
            // A / B == inverse(B) * A
            if br != bc {
                return Err("right-hand matrix must be square to divide by it".to_string());
            }
            if bc != ar {
                return Err(format!(
                    "cannot divide a {}x{} matrix by a {}x{} matrix", ar, ac, br, bc
                ));
            }
            let inv = invert(br, bx)?;
            matrix_matrix(BinOp::Mul, br, bc, &inv, ar, ac, ax)
        }
        _ => unreachable!(),
    }
}

fn transpose(rows: usize, cols: usize, data: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; rows * cols];
    for r in 0..rows {
        for c in 0..cols {
            out[c * rows + r] = data[r * cols + c];
        }
    }
    out
}

/// Solves `A x = b` for a square `n`x`n` matrix `A` via Gaussian
/// elimination with partial pivoting.
fn solve(n: usize, a: &[f64], b: &[f64]) -> Result<Vec<f64>, String> {
    let mut m: Vec<Vec<f64>> = (0..n).map(|r| a[r * n..(r + 1) * n].to_vec()).collect();
    let mut x = b.to_vec();

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| m[i][col].abs().partial_cmp(&m[j][col].abs()).unwrap())
            .unwrap();

        if m[pivot][col] == 0.0 {
            return Err("matrix is singular".to_string());
        }

        m.swap(col, pivot);
        x.swap(col, pivot);

        for row in (col + 1)..n {
            let factor = m[row][col] / m[col][col];
            if factor == 0.0 { continue; }
            for c in col..n {
                m[row][c] -= factor * m[col][c];
            }
            x[row] -= factor * x[col];
        }
    }

    for col in (0..n).rev() {
        for row in 0..col {
            let factor = m[row][col] / m[col][col];
            if factor == 0.0 { continue; }
            m[row][col] = 0.0;
            x[row] -= factor * x[col];
        }
        x[col] /= m[col][col];
    }

    Ok(x)
}

/// Inverts a square `n`x`n` matrix via Gauss-Jordan elimination on an
/// augmented `[A | I]` matrix.
fn invert(n: usize, a: &[f64]) -> Result<Vec<f64>, String> {
    let mut m: Vec<Vec<f64>> = (0..n)
        .map(|r| {
            let mut row = a[r * n..(r + 1) * n].to_vec();
            row.resize(2 * n, 0.0);
            row[n + r] = 1.0;
            row
        })
        .collect();

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| m[i][col].abs().partial_cmp(&m[j][col].abs()).unwrap())
            .unwrap();

        if m[pivot][col] == 0.0 {
            return Err("matrix is singular".to_string());
        }

        m.swap(col, pivot);

        let scale = m[col][col];
        for c in 0..2 * n {
            m[col][c] /= scale;
        }

        for row in 0..n {
            if row == col { continue; }
            let factor = m[row][col];
            if factor == 0.0 { continue; }
            for c in 0..2 * n {
                m[row][c] -= factor * m[col][c];
            }
        }
    }

    let mut out = vec![0.0; n * n];
    for r in 0..n {
        out[r * n..(r + 1) * n].copy_from_slice(&m[r][n..2 * n]);
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// relational operators
// ---------------------------------------------------------------------------

pub fn rel_family(op: BinOp, a: &Value, b: &Value) -> Result<Value, String> {
    use Value::*;

    match (a, b) {
        (Digit(x), Digit(y)) => Ok(Digit(as_digit(digit_rel(op, *x, *y)))),
        (Str(x), Str(y))     => Ok(Digit(as_digit(str_rel(op, x, y)))),

        (Digit(s), Vector(v)) => Ok(Vector(v.iter().map(|x| as_digit(digit_rel(op, *s, *x))).collect())),
        (Vector(v), Digit(s)) => Ok(Vector(v.iter().map(|x| as_digit(digit_rel(op, *x, *s))).collect())),

        (Digit(s), Matrix { rows, cols, data }) => Ok(Value::Matrix {
            rows: *rows, cols: *cols,
            data: data.iter().map(|x| as_digit(digit_rel(op, *s, *x))).collect(),
        }),
        (Matrix { rows, cols, data }, Digit(s)) => Ok(Value::Matrix {
            rows: *rows, cols: *cols,
            data: data.iter().map(|x| as_digit(digit_rel(op, *x, *s))).collect(),
        }),

        (Vector(x), Vector(y)) => {
            same_len(x.len(), y.len())?;
            Ok(Vector(x.iter().zip(y).map(|(p, q)| as_digit(digit_rel(op, *p, *q))).collect()))
        }

        (Matrix { rows: ar, cols: ac, data: ax }, Matrix { rows: br, cols: bc, data: bx }) => {
            same_shape((*ar, *ac), (*br, *bc))?;
            let data = ax.iter().zip(bx).map(|(p, q)| as_digit(digit_rel(op, *p, *q))).collect();
            Ok(Value::Matrix { rows: *ar, cols: *ac, data })
        }

        _ => Err(mismatch(op_symbol(op), a, b)),
    }
}

fn as_digit(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

fn digit_rel(op: BinOp, x: f64, y: f64) -> bool {
    match op {
        BinOp::Lt => x < y,
        BinOp::Le => x <= y,
        BinOp::Gt => x > y,
        BinOp::Ge => x >= y,
        BinOp::Eq => x == y,
        BinOp::Ne => x != y,
        _ => unreachable!(),
    }
}

fn str_rel(op: BinOp, x: &str, y: &str) -> bool {
    match op {
        BinOp::Lt => x < y,
        BinOp::Le => x <= y,
        BinOp::Gt => x > y,
        BinOp::Ge => x >= y,
        BinOp::Eq => x == y,
        BinOp::Ne => x != y,
        _ => unreachable!(),
    }
}

// ---------------------------------------------------------------------------
// && and ||
// ---------------------------------------------------------------------------

pub fn logic_family(op: BinOp, a: &Value, b: &Value) -> Result<Value, String> {
    use Value::*;

    let result = match (a, b) {
        (Digit(x), Digit(y)) => digit_logic(op, *x, *y),

        (Digit(s), Vector(v)) | (Vector(v), Digit(s)) => scan_logic(op, v.iter().map(|x| (*s, *x))),

        (Digit(s), Matrix { data, .. }) | (Matrix { data, .. }, Digit(s)) => {
            scan_logic(op, data.iter().map(|x| (*s, *x)))
        }

        (Vector(x), Vector(y)) => {
            same_len(x.len(), y.len())?;
            scan_logic(op, x.iter().zip(y).map(|(p, q)| (*p, *q)))
        }

        (Matrix { rows: ar, cols: ac, data: ax }, Matrix { rows: br, cols: bc, data: bx }) => {
            same_shape((*ar, *ac), (*br, *bc))?;
            scan_logic(op, ax.iter().zip(bx).map(|(p, q)| (*p, *q)))
        }

        _ => return Err(mismatch(op_symbol(op), a, b)),
    };

    Ok(Digit(as_digit(result)))
}

fn digit_logic(op: BinOp, x: f64, y: f64) -> bool {
    match op {
        BinOp::And => x != 0.0 && y != 0.0,
        BinOp::Or  => x != 0.0 || y != 0.0,
        _ => unreachable!(),
    }
}

/// Scans pairwise elements, stopping at the first pair that determines the
/// result (`false` for `&&`, `true` for `||`), matching the reference
/// aggregate-logic scan rather than a full elementwise reduction.
fn scan_logic(op: BinOp, mut pairs: impl Iterator<Item = (f64, f64)>) -> bool {
    match op {
        BinOp::And => pairs.all(|(x, y)| digit_logic(op, x, y)),
        BinOp::Or  => pairs.any(|(x, y)| digit_logic(op, x, y)),
        _ => unreachable!(),
    }
}

// ---------------------------------------------------------------------------
// ^
// ---------------------------------------------------------------------------

pub fn pow_family(a: &Value, b: &Value) -> Result<Value, String> {
    use Value::*;

    match (a, b) {
        (Digit(x), Digit(y)) => Ok(Digit(scalar_pow(*x, *y))),

        // matrix ^ nonnegative integer scalar: repeated squaring.
        (Matrix { rows, cols, data }, Digit(y)) => {
            if *rows != *cols {
                return Err("matrix must be square to raise it to a power".to_string());
            }
            if *y < 0.0 || y.fract() != 0.0 {
                return Err("matrix exponent must be a nonnegative integer".to_string());
            }
            let data = matrix_pow(*rows, data, *y as u64)?;
            Ok(Value::Matrix { rows: *rows, cols: *cols, data })
        }

        _ => Err(mismatch("^", a, b)),
    }
}

/// Non-negative integer exponents use binary exponentiation, matching the
/// matrix-power path below bit-for-bit; any other exponent falls back to
/// `f64::powf`.
fn scalar_pow(x: f64, y: f64) -> f64 {
    if y >= 0.0 && y.fract() == 0.0 && y <= u32::MAX as f64 {
        let mut exp = y as u64;
        let mut result = 1.0;
        let mut base = x;
        while exp > 0 {
            if exp & 1 != 0 {
                result *= base;
            }
            base *= base;
            exp >>= 1;
        }
        result
    } else {
        x.powf(y)
    }
}

fn identity(n: usize) -> Vec<f64> {
    let mut out = vec![0.0; n * n];
    for i in 0..n {
        out[i * n + i] = 1.0;
    }
    out
}

fn matrix_pow(n: usize, data: &[f64], mut exp: u64) -> Result<Vec<f64>, String> {
    let mut result = identity(n);
    let mut base = data.to_vec();

    while exp > 0 {
        if exp & 1 != 0 {
            result = mat_mul_square(n, &result, &base);
        }
        base = mat_mul_square(n, &base, &base);
        exp >>= 1;
    }

    Ok(result)
}

fn mat_mul_square(n: usize, a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; n * n];
    for i in 0..n {
        for k in 0..n {
            let aik = a[i * n + k];
            if aik == 0.0 { continue; }
            for j in 0..n {
                out[i * n + j] += aik * b[k * n + j];
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value::*;

    #[test]
    fn digit_add_sub() {
        assert_eq!(super::super::apply(BinOp::Add, &Digit(2.0), &Digit(3.0)).unwrap(), Digit(5.0));
        assert_eq!(super::super::apply(BinOp::Sub, &Digit(2.0), &Digit(3.0)).unwrap(), Digit(-1.0));
    }

    #[test]
    fn string_concat_only_on_add() {
        let r = super::super::apply(BinOp::Add, &Str("a".into()), &Str("b".into())).unwrap();
        assert_eq!(r, Str("ab".into()));
        assert!(super::super::apply(BinOp::Sub, &Str("a".into()), &Str("b".into())).is_err());
    }

    #[test]
    fn division_by_zero_is_an_error() {
        assert!(super::super::apply(BinOp::Div, &Digit(1.0), &Digit(0.0)).is_err());
    }

    #[test]
    fn vector_dot_product() {
        let r = super::super::apply(
            BinOp::Mul, &Vector(vec![1.0, 2.0, 3.0]), &Vector(vec![4.0, 5.0, 6.0]),
        ).unwrap();
        assert_eq!(r, Digit(32.0));
    }

    #[test]
    fn matrix_multiply() {
        let a = Matrix { rows: 2, cols: 2, data: vec![1.0, 2.0, 3.0, 4.0] };
        let b = Matrix { rows: 2, cols: 2, data: vec![5.0, 6.0, 7.0, 8.0] };
        let r = super::super::apply(BinOp::Mul, &a, &b).unwrap();
        assert_eq!(r, Matrix { rows: 2, cols: 2, data: vec![19.0, 22.0, 43.0, 50.0] });
    }

    #[test]
    fn matrix_vector_multiply() {
        let m = Matrix { rows: 2, cols: 3, data: vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0] };
        let v = Vector(vec![1.0, 1.0, 1.0]);
        let r = super::super::apply(BinOp::Mul, &m, &v).unwrap();
        assert_eq!(r, Vector(vec![6.0, 15.0]));
    }

    #[test]
    fn vector_matrix_multiply() {
        let v = Vector(vec![1.0, 1.0]);
        let m = Matrix { rows: 2, cols: 3, data: vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0] };
        let r = super::super::apply(BinOp::Mul, &v, &m).unwrap();
        assert_eq!(r, Vector(vec![5.0, 7.0, 9.0]));
    }

    #[test]
    fn matrix_inverse_via_division() {
        let id = Matrix { rows: 2, cols: 2, data: vec![1.0, 0.0, 0.0, 1.0] };
        let m = Matrix { rows: 2, cols: 2, data: vec![4.0, 7.0, 2.0, 6.0] };
        let r = super::super::apply(BinOp::Div, &id, &m).unwrap();
        if let Matrix { data, .. } = r {
            assert!((data[0] - 0.6).abs() < 1e-9);
            assert!((data[1] - -0.7).abs() < 1e-9);
            assert!((data[2] - -0.2).abs() < 1e-9);
            assert!((data[3] - 0.4).abs() < 1e-9);
        } else {
            panic!("expected a matrix");
        }
    }

    #[test]
    fn matrix_division_multiplies_inverse_on_the_left() {
        // A / B == inv(B) * A, not A * inv(B); use a non-identity A so the
        // two (non-commutative) orders give different results.
        let a = Matrix { rows: 2, cols: 2, data: vec![1.0, 2.0, 3.0, 4.0] };
        let b = Matrix { rows: 2, cols: 2, data: vec![4.0, 7.0, 2.0, 6.0] };
        let inv_b = vec![0.6, -0.7, -0.2, 0.4];

        let left = super::super::apply(BinOp::Mul,
            &Matrix { rows: 2, cols: 2, data: inv_b.clone() }, &a,
        ).unwrap();
        let r = super::super::apply(BinOp::Div, &a, &b).unwrap();

        assert_eq!(r, left);
    }

    #[test]
    fn singular_matrix_division_errs() {
        let a = Matrix { rows: 2, cols: 2, data: vec![1.0, 2.0, 2.0, 4.0] };
        let b = Matrix { rows: 2, cols: 2, data: vec![1.0, 2.0, 2.0, 4.0] };
        assert!(super::super::apply(BinOp::Div, &a, &b).is_err());
    }

    #[test]
    fn matrix_power_is_repeated_squaring() {
        let m = Matrix { rows: 2, cols: 2, data: vec![1.0, 1.0, 0.0, 1.0] };
        let r = super::super::apply(BinOp::Pow, &m, &Digit(3.0)).unwrap();
        assert_eq!(r, Matrix { rows: 2, cols: 2, data: vec![1.0, 3.0, 0.0, 1.0] });
    }

    #[test]
    fn matrix_power_zero_is_identity() {
        let m = Matrix { rows: 2, cols: 2, data: vec![5.0, 1.0, 2.0, 3.0] };
        let r = super::super::apply(BinOp::Pow, &m, &Digit(0.0)).unwrap();
        assert_eq!(r, Matrix { rows: 2, cols: 2, data: vec![1.0, 0.0, 0.0, 1.0] });
    }

    #[test]
    fn scalar_power_nonnegative_integer_exponent() {
        let r = super::super::apply(BinOp::Pow, &Digit(2.0), &Digit(10.0)).unwrap();
        assert_eq!(r, Digit(1024.0));
        let r = super::super::apply(BinOp::Pow, &Digit(5.0), &Digit(0.0)).unwrap();
        assert_eq!(r, Digit(1.0));
    }

    #[test]
    fn scalar_power_negative_or_fractional_exponent_uses_powf() {
        let r = super::super::apply(BinOp::Pow, &Digit(2.0), &Digit(-1.0)).unwrap();
        assert_eq!(r, Digit(0.5));
        let r = super::super::apply(BinOp::Pow, &Digit(4.0), &Digit(0.5)).unwrap();
        assert_eq!(r, Digit(2.0));
    }

    #[test]
    fn relational_on_strings() {
        let r = super::super::apply(BinOp::Lt, &Str("a".into()), &Str("b".into())).unwrap();
        assert_eq!(r, Digit(1.0));
    }

    #[test]
    fn logic_short_circuit_values() {
        let r = super::super::apply(BinOp::And, &Digit(1.0), &Digit(0.0)).unwrap();
        assert_eq!(r, Digit(0.0));
        let r = super::super::apply(BinOp::Or, &Digit(0.0), &Digit(2.0)).unwrap();
        assert_eq!(r, Digit(1.0));
    }

    #[test]
    fn kind_mismatch_is_an_error() {
        assert!(super::super::apply(BinOp::Add, &Digit(1.0), &Str("x".into())).is_err());
    }
}
