//! Chunked lookups by id
//!
//! The backing store caps how many ids one `IN (...)` read may carry, so
//! larger id sets are split and the partial results concatenated.

use std::collections::HashSet;
use std::future::Future;

/// De-duplicate `ids` (first occurrence wins) and fetch them in chunks
///
/// Chunks are fetched sequentially; the first error aborts the lookup.
/// A `chunk_size` of 0 is treated as 1.
pub async fn fetch_by_ids<T, E, F, Fut>(ids: &[i64], chunk_size: usize, mut fetch: F) -> Result<Vec<T>, E>
where
    F: FnMut(Vec<i64>) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
{
    let mut seen = HashSet::with_capacity(ids.len());
    let unique: Vec<i64> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();

    let mut results = Vec::with_capacity(unique.len());
    for chunk in unique.chunks(chunk_size.max(1)) {
        results.extend(fetch(chunk.to_vec()).await?);
    }
    Ok(results)
}
