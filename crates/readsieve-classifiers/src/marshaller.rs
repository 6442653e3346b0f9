//! Batch marshalling between the loop's queries and the gateway
//!
//! Queries go in as an ordered list; verdicts come back zipped onto the same
//! (id, channel, read number) at the same position. The sample slices handed
//! to the engine borrow from the queries for the length of one call and are
//! never retained past it.

use crate::classifier::BatchFailure;
use crate::gateway::{ClassifierCounters, ClassifierGateway};
use readsieve_core::{Channel, Query, ReadNumber, Verdict};
use std::time::Instant;
use tracing::debug;

/// A verdict re-associated with the read it was produced for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedRead {
    pub verdict: Verdict,
    pub channel: Channel,
    pub read_number: ReadNumber,
    pub id: String,
}

/// Result of marshalling one batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarshalOutcome {
    /// Every query got a verdict, in submission order. Empty when there was
    /// nothing to classify.
    Classified(Vec<ClassifiedRead>),

    /// Classification failed for the whole batch; no verdicts exist
    Unavailable(BatchFailure),
}

impl MarshalOutcome {
    /// Verdicts, if classification succeeded
    pub fn into_classified(self) -> Option<Vec<ClassifiedRead>> {
        match self {
            Self::Classified(reads) => Some(reads),
            Self::Unavailable(_) => None,
        }
    }

    /// Check if classification failed
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Owns the gateway and marshals batches through it.
///
/// An empty query list short-circuits to `Classified(vec![])` without calling
/// the gateway. This is the normal case at shutdown or when every channel in
/// the window is in the control group.
pub struct BatchMarshaller {
    gateway: ClassifierGateway,
}

impl BatchMarshaller {
    /// Create a marshaller around a gateway
    pub fn new(gateway: ClassifierGateway) -> Self {
        Self { gateway }
    }

    /// Classify `queries` and zip the verdicts back in order
    pub fn classify(&mut self, queries: &[Query]) -> MarshalOutcome {
        if queries.is_empty() {
            return MarshalOutcome::Classified(Vec::new());
        }

        let start = Instant::now();
        let batch: Vec<&[i32]> = queries.iter().map(|q| q.samples.as_slice()).collect();
        let verdicts = match self.gateway.batch_classify(&batch) {
            Ok(verdicts) => verdicts,
            Err(failure) => return MarshalOutcome::Unavailable(failure),
        };
        drop(batch);

        if verdicts.len() != queries.len() {
            return MarshalOutcome::Unavailable(BatchFailure::LengthMismatch {
                submitted: queries.len(),
                returned: verdicts.len(),
            });
        }

        debug!(
            queries = queries.len(),
            latency_us = start.elapsed().as_micros() as u64,
            "Batch classified"
        );

        let reads = verdicts
            .into_iter()
            .zip(queries)
            .map(|(verdict, query)| ClassifiedRead {
                verdict,
                channel: query.channel,
                read_number: query.read_number,
                id: query.id.clone(),
            })
            .collect();
        MarshalOutcome::Classified(reads)
    }

    /// Gateway counters so far
    pub fn counters(&self) -> ClassifierCounters {
        self.gateway.counters()
    }

    /// Give the gateway back, e.g. for teardown
    pub fn into_gateway(self) -> ClassifierGateway {
        self.gateway
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{BatchResponse, SignalClassifier};

    /// Returns `code_of(first sample)` for each query
    struct FirstSample;

    impl SignalClassifier for FirstSample {
        fn batch_classify(&mut self, queries: &[&[i32]]) -> BatchResponse {
            Ok(queries.iter().map(|q| q.first().copied().unwrap_or(2)).collect())
        }

        fn name(&self) -> &str {
            "first-sample"
        }
    }

    fn marshaller() -> BatchMarshaller {
        BatchMarshaller::new(ClassifierGateway::from_classifier(Box::new(FirstSample)))
    }

    #[test]
    fn test_zip_preserves_identity() {
        let queries = vec![
            Query::new("a", 3, 10, vec![1]),
            Query::new("b", 5, 11, vec![0]),
            Query::new("c", 9, 12, vec![2]),
        ];
        let before = queries.clone();

        let reads = marshaller().classify(&queries).into_classified().unwrap();
        assert_eq!(queries, before);
        assert_eq!(
            reads,
            vec![
                ClassifiedRead {
                    verdict: Verdict::Accept,
                    channel: 3,
                    read_number: 10,
                    id: "a".to_string()
                },
                ClassifiedRead {
                    verdict: Verdict::Reject,
                    channel: 5,
                    read_number: 11,
                    id: "b".to_string()
                },
                ClassifiedRead {
                    verdict: Verdict::NeedMoreSignal,
                    channel: 9,
                    read_number: 12,
                    id: "c".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_empty_is_classified_not_unavailable() {
        let mut marshaller = marshaller();
        let outcome = marshaller.classify(&[]);
        assert_eq!(outcome, MarshalOutcome::Classified(Vec::new()));
        assert!(!outcome.is_unavailable());
        assert_eq!(marshaller.counters().total, 0);
    }

    #[test]
    fn test_failure_is_unavailable() {
        let queries = vec![Query::new("a", 1, 1, vec![9])];
        let outcome = marshaller().classify(&queries);
        assert_eq!(
            outcome,
            MarshalOutcome::Unavailable(BatchFailure::UnknownCode {
                position: 0,
                code: 9
            })
        );
        assert!(outcome.into_classified().is_none());
    }
}
