//! Chunked execution of bulk operations
//!
//! Bulk writes accept at most [`MAX_BATCH_SIZE`] records per request. Larger
//! inputs are split into contiguous chunks, sent one after another, and the
//! per-chunk results are concatenated in input order.
//!
//! Bulk operations are not atomic. If chunk *k* fails, chunks `0..k` have
//! already been committed on the server and are not rolled back; the caller
//! sees the first error and cannot tell from it which records persisted.

use std::future::Future;

use crate::error::Result;

/// Records accepted per create/update/upsert/delete request
pub const MAX_BATCH_SIZE: usize = 10;

/// Run `per_chunk` over `items` in chunks of at most `chunk_size`.
///
/// `chunk_size` is clamped to `1..=MAX_BATCH_SIZE`. Chunks run sequentially;
/// the first failure stops the run and is returned as-is.
pub async fn run_batched<T, R, F, Fut>(
    items: Vec<T>,
    chunk_size: usize,
    mut per_chunk: F,
) -> Result<Vec<R>>
where
    F: FnMut(Vec<T>) -> Fut,
    Fut: Future<Output = Result<Vec<R>>>,
{
    let chunk_size = chunk_size.clamp(1, MAX_BATCH_SIZE);
    let total = items.len();
    let chunks = total.div_ceil(chunk_size);
    let mut results = Vec::with_capacity(total);
    let mut items = items.into_iter();

    for index in 0..chunks {
        let chunk: Vec<T> = items.by_ref().take(chunk_size).collect();
        let size = chunk.len();
        tracing::debug!(chunk = index + 1, of = chunks, size, "Sending batch chunk");

        match per_chunk(chunk).await {
            Ok(chunk_results) => results.extend(chunk_results),
            Err(e) => {
                if index > 0 {
                    tracing::warn!(
                        failed_chunk = index + 1,
                        committed_chunks = index,
                        error = %e,
                        "Bulk operation failed part-way; earlier chunks remain committed"
                    );
                }
                return Err(e);
            }
        }
    }

    Ok(results)
}

/// Run with the API's batch ceiling
pub async fn run_batched_max<T, R, F, Fut>(items: Vec<T>, per_chunk: F) -> Result<Vec<R>>
where
    F: FnMut(Vec<T>) -> Fut,
    Fut: Future<Output = Result<Vec<R>>>,
{
    run_batched(items, MAX_BATCH_SIZE, per_chunk).await
}
