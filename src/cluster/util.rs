#[inline]
pub(crate) fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Validate that every row of `data` has the same dimensionality as the first.
///
/// Returns the shared dimensionality on success.
pub(crate) fn check_dims(data: &[Vec<f32>]) -> crate::error::Result<usize> {
    let dim = data[0].len();
    for row in data {
        if row.len() != dim {
            return Err(crate::error::Error::DimensionMismatch {
                expected: dim,
                found: row.len(),
            });
        }
    }
    Ok(dim)
}
