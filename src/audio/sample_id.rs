use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Handle for one registered sample buffer. Replacing the loaded sample mints
/// a fresh id, so voices armed against the old buffer are never retargeted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SampleId(pub u64);

pub fn next_sample_id() -> SampleId {
    SampleId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
}
