// Cosine similarity over document vectors.
//
//   sim(a, b) = (a · b) / (|a| |b|)
//
// with sim = 0 when either vector has zero norm (empty documents, or
// documents made only of terms whose IDF is exactly zero). The full matrix is
// O(n² · vocab), a batch step run on rebuild, never per query.

/// Symmetric pairwise similarity matrix, in the row order of the input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimilarityMatrix {
    values: Vec<Vec<f64>>,
}

impl SimilarityMatrix {
    /// Wrap precomputed similarities. Rows must form a square matrix.
    pub fn from_rows(values: Vec<Vec<f64>>) -> anyhow::Result<Self> {
        let n = values.len();
        if let Some(row) = values.iter().position(|r| r.len() != n) {
            anyhow::bail!(
                "similarity matrix must be square: row {row} has {} columns, expected {n}",
                values[row].len()
            );
        }
        Ok(Self { values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Similarity between rows `i` and `j`. Panics when out of range.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }
}

/// Cosine similarity of two equal-length vectors.
pub fn cosine(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "vectors must share a column space");

    let norm_a = norm(a);
    let norm_b = norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    dot / (norm_a * norm_b)
}

fn norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Compute every pairwise similarity between rows.
///
/// Only the upper triangle is computed; the lower one is mirrored so the
/// result is exactly symmetric. Norms are computed once per row.
pub fn cosine_similarity_matrix(rows: &[Vec<f64>]) -> SimilarityMatrix {
    let n = rows.len();
    let norms: Vec<f64> = rows.iter().map(|r| norm(r)).collect();
    let mut values = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in i..n {
            let sim = if norms[i] == 0.0 || norms[j] == 0.0 {
                0.0
            } else {
                let dot: f64 = rows[i].iter().zip(&rows[j]).map(|(x, y)| x * y).sum();
                dot / (norms[i] * norms[j])
            };
            values[i][j] = sim;
            values[j][i] = sim;
        }
    }

    SimilarityMatrix { values }
}
