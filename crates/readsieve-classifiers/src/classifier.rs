//! Classifier capability trait and batch failure type

/// Outcome of one batch call at the capability boundary: one verdict code
/// per query (0 = reject, 1 = accept, 2 = chunked) or a failure for the
/// whole batch.
pub type BatchResponse = std::result::Result<Vec<i32>, BatchFailure>;

/// Opaque batch signal classifier.
///
/// Implementations may parallelise internally and are not required to be safe
/// for concurrent callers; `&mut self` makes every call exclusive.
pub trait SignalClassifier: Send {
    /// Classify every query in one call. Either every query gets a code or
    /// the whole call fails.
    fn batch_classify(&mut self, queries: &[&[i32]]) -> BatchResponse;

    /// Get the classifier name
    fn name(&self) -> &str;
}

/// Why a batch produced no verdicts. Always applies to the whole batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchFailure {
    /// The engine reported failure for the call
    #[error("classifier reported failure code {0}")]
    Capability(i32),

    /// Verdict count does not match query count
    #[error("classifier returned {returned} verdicts for {submitted} queries")]
    LengthMismatch { submitted: usize, returned: usize },

    /// A verdict code outside 0..=2
    #[error("classifier returned unknown verdict code {code} at position {position}")]
    UnknownCode { position: usize, code: i32 },
}
