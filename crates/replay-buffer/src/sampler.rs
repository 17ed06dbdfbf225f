//! Uniform, with-replacement sampling over `[0, stored_size)`.

use rand::Rng;

use crate::error::ReplayBufferError;

/// Draws `batch_size` physical indices uniformly at random, with
/// replacement, from `[0, stored_size)`.
pub(crate) fn sample_uniform(
    stored_size: usize,
    batch_size: usize,
    rng: &mut impl Rng,
) -> Result<Vec<usize>, ReplayBufferError> {
    if stored_size == 0 {
        return Err(ReplayBufferError::EmptyBuffer);
    }

    let indices = (0..batch_size).map(|_| rng.gen_range(0..stored_size)).collect();
    Ok(indices)
}
