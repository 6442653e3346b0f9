//! Executor tests against a recording data source

use async_trait::async_trait;
use parking_lot::Mutex;
use readsieve_core::{Channel, DataSource, Error, ReadChunk, ReadNumber, Result, Verdict};
use readsieve_policy::{control_plan, Action, ActionExecutor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Unblock(Channel, ReadNumber),
    Stop(Channel, ReadNumber),
}

#[derive(Default)]
struct Recorder {
    commands: Mutex<Vec<Command>>,
    fail_unblock: bool,
}

#[async_trait]
impl DataSource for Recorder {
    fn is_running(&self) -> bool {
        true
    }

    fn queue_length(&self) -> usize {
        0
    }

    async fn get_read_chunks(&self, _batch_size: usize, _last: bool) -> Result<Vec<ReadChunk>> {
        Ok(Vec::new())
    }

    async fn unblock_read(&self, channel: Channel, read_number: ReadNumber) -> Result<()> {
        if self.fail_unblock {
            return Err(Error::data_source("instrument connection lost"));
        }
        self.commands.lock().push(Command::Unblock(channel, read_number));
        Ok(())
    }

    async fn stop_receiving_read(&self, channel: Channel, read_number: ReadNumber) -> Result<()> {
        self.commands.lock().push(Command::Stop(channel, read_number));
        Ok(())
    }
}

#[tokio::test]
async fn test_verdicts_map_to_commands_in_order() {
    let source = Recorder::default();
    let mut executor = ActionExecutor::new(&source);

    let verdicts = [
        Verdict::Accept,
        Verdict::Reject,
        Verdict::NeedMoreSignal,
        Verdict::Accept,
        Verdict::Reject,
    ];
    for (i, verdict) in verdicts.into_iter().enumerate() {
        let channel = i as Channel + 1;
        executor
            .apply_verdict(verdict, channel, 40 + channel, "read")
            .await
            .unwrap();
    }

    assert_eq!(
        *source.commands.lock(),
        vec![
            Command::Stop(1, 41),
            Command::Unblock(2, 42),
            Command::Stop(2, 42),
            Command::Stop(4, 44),
            Command::Unblock(5, 45),
            Command::Stop(5, 45),
        ]
    );

    let outcome = executor.finish();
    assert_eq!(outcome.unblocked, 2);
    assert_eq!(outcome.stopped, 4);
    assert_eq!(outcome.accepted, 2);
    assert_eq!(outcome.rejected, 2);
    assert_eq!(outcome.chunked, 1);
}

#[tokio::test]
async fn test_control_plan_only_stops() {
    let source = Recorder::default();
    let mut executor = ActionExecutor::new(&source);

    executor.execute(8, 3, control_plan()).await.unwrap();
    assert_eq!(*source.commands.lock(), vec![Command::Stop(8, 3)]);
    assert_eq!(executor.outcome().unblocked, 0);
}

#[tokio::test]
async fn test_source_errors_propagate() {
    let source = Recorder {
        fail_unblock: true,
        ..Default::default()
    };
    let mut executor = ActionExecutor::new(&source);

    let err = executor
        .execute(1, 1, &[Action::Unblock, Action::StopReceiving])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Source(_)));
    // nothing after the failed command is issued
    assert!(source.commands.lock().is_empty());
    assert!(!executor.outcome().has_commands());
}
