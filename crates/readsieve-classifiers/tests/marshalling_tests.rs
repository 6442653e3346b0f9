//! Marshalling and classifier construction tests
//!
//! Uses scripted classifiers to check order preservation and all-or-nothing
//! failure, and the simulated loader to check construction failures.

use proptest::prelude::*;
use readsieve_classifiers::{
    BatchFailure, BatchMarshaller, BatchResponse, ClassifierGateway, ClassifierSettings,
    MarshalOutcome, SignalClassifier, SimulatedLoader,
};
use readsieve_core::{Error, Query, Verdict};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Verdict code derived from the sample count, so results are checkable
struct ByLength {
    calls: Arc<AtomicUsize>,
}

impl SignalClassifier for ByLength {
    fn batch_classify(&mut self, queries: &[&[i32]]) -> BatchResponse {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(queries.iter().map(|q| (q.len() % 3) as i32).collect())
    }

    fn name(&self) -> &str {
        "by-length"
    }
}

/// Always fails the whole batch
struct Broken;

impl SignalClassifier for Broken {
    fn batch_classify(&mut self, _queries: &[&[i32]]) -> BatchResponse {
        Err(BatchFailure::Capability(3))
    }

    fn name(&self) -> &str {
        "broken"
    }
}

fn by_length() -> (BatchMarshaller, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let gateway = ClassifierGateway::from_classifier(Box::new(ByLength {
        calls: calls.clone(),
    }));
    (BatchMarshaller::new(gateway), calls)
}

fn queries_from(lengths: &[usize]) -> Vec<Query> {
    lengths
        .iter()
        .enumerate()
        .map(|(i, &len)| {
            Query::new(
                format!("read-{}", i),
                (i * 7 + 1) as u32,
                i as u32,
                vec![1; len],
            )
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_verdicts_align_with_queries(lengths in prop::collection::vec(0usize..40, 1..64)) {
        let (mut marshaller, _) = by_length();
        let queries = queries_from(&lengths);

        let reads = marshaller.classify(&queries).into_classified().unwrap();
        prop_assert_eq!(reads.len(), queries.len());
        for (read, query) in reads.iter().zip(&queries) {
            prop_assert_eq!(read.channel, query.channel);
            prop_assert_eq!(read.read_number, query.read_number);
            prop_assert_eq!(&read.id, &query.id);
            prop_assert_eq!(Some(read.verdict), Verdict::from_code((query.samples.len() % 3) as i32));
        }
    }
}

#[test]
fn test_counters_follow_successful_batches() {
    let (mut marshaller, calls) = by_length();
    // lengths 1, 2, 3 -> accept, chunked, reject
    let queries = queries_from(&[1, 2, 3]);

    marshaller.classify(&queries);
    marshaller.classify(&queries);

    assert_eq!(calls.load(Ordering::Relaxed), 2);
    let counters = marshaller.into_gateway().destroy();
    assert_eq!(counters.total, 6);
    assert_eq!(counters.positive, 2);
    assert_eq!(counters.chunked, 2);
    assert_eq!(counters.negative(), 2);
}

#[test]
fn test_empty_batch_never_reaches_engine() {
    let (mut marshaller, calls) = by_length();
    assert_eq!(marshaller.classify(&[]), MarshalOutcome::Classified(vec![]));
    assert_eq!(calls.load(Ordering::Relaxed), 0);
}

#[test]
fn test_failed_batch_changes_nothing() {
    let mut marshaller = BatchMarshaller::new(ClassifierGateway::from_classifier(Box::new(Broken)));
    let queries = queries_from(&[5, 5, 5, 5, 5]);

    let outcome = marshaller.classify(&queries);
    assert_eq!(outcome, MarshalOutcome::Unavailable(BatchFailure::Capability(3)));

    let counters = marshaller.counters();
    assert_eq!(counters.total, 0);
    assert_eq!(counters.positive, 0);
    assert_eq!(counters.chunked, 0);
    assert_eq!(counters.negative(), 0);
}

fn write_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

fn settings_in(dir: &Path, params: &str) -> ClassifierSettings {
    ClassifierSettings {
        reference_path: write_file(dir, "reference.fa", ">target\nACGTACGT\n"),
        model_path: write_file(dir, "template.model", "kmer\tlevel_mean\nAAAAAA\t80.1\n"),
        param_path: write_file(dir, "parameters.csv", params),
        ..ClassifierSettings::default()
    }
}

#[test]
fn test_simulated_loader_builds_gateway() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(
        dir.path(),
        "refsize,power,packs,scouts,threshold,specificity\n400,9,3,14,100.0,0.9\n",
    );

    let mut gateway = ClassifierGateway::new(&settings, &SimulatedLoader).unwrap();
    assert_eq!(gateway.name(), "simulated");

    let on_target = vec![150; 250];
    let off_target = vec![50; 250];
    let short = vec![150; 10];
    let batch: [&[i32]; 3] = [&on_target, &off_target, &short];
    assert_eq!(
        gateway.batch_classify(&batch),
        Ok(vec![Verdict::Accept, Verdict::Reject, Verdict::NeedMoreSignal])
    );
}

#[test]
fn test_missing_threshold_is_construction_failure() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(
        dir.path(),
        "refsize,power,packs,scouts,threshold,specificity\n200,9,3,14,100.0,0.9\n",
    );

    let err = ClassifierGateway::new(&settings, &SimulatedLoader).err().unwrap();
    assert!(matches!(err, Error::Classifier(_)));
}

#[test]
fn test_missing_model_is_construction_failure() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = settings_in(dir.path(), "header\n");
    settings.model_path = dir.path().join("missing.model");

    let err = ClassifierGateway::new(&settings, &SimulatedLoader).err().unwrap();
    assert!(matches!(err, Error::Classifier(_)));
}

#[test]
fn test_invalid_settings_rejected_before_loading() {
    let settings = ClassifierSettings {
        num_scouts: 0,
        ..ClassifierSettings::default()
    };
    let err = ClassifierGateway::new(&settings, &SimulatedLoader).err().unwrap();
    assert!(matches!(err, Error::Config(_)));
}
