//! Chunk sizing for the day-chunk scheduler.

use std::time::Duration;

/// Pause between chunk gathers. Smooths the load spike when a whole
/// chunk's tasks queue on the pacer at once.
pub(crate) const INTER_CHUNK_PAUSE: Duration = Duration::from_millis(500);

/// Days dispatched per concurrent batch: twice the per-warehouse
/// concurrency, never fewer than 3. Caps the instantaneous burst of
/// queued tasks independently of the semaphore ceiling.
#[must_use]
pub fn chunk_size(concurrency: usize) -> usize {
    (concurrency * 2).max(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_size_is_twice_concurrency() {
        assert_eq!(chunk_size(2), 4);
        assert_eq!(chunk_size(5), 10);
    }

    #[test]
    fn chunk_size_never_drops_below_three() {
        assert_eq!(chunk_size(0), 3);
        assert_eq!(chunk_size(1), 3);
    }

    #[test]
    fn slice_chunking_covers_every_day_once() {
        let days: Vec<u32> = (0..10).collect();
        let chunks: Vec<&[u32]> = days.chunks(chunk_size(2)).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 4);
        assert_eq!(chunks[1].len(), 4);
        assert_eq!(chunks[2].len(), 2);
    }
}
