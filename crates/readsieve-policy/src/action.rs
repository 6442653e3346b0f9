//! Data-source action definitions

use readsieve_core::Verdict;
use serde::{Deserialize, Serialize};

/// Command issued to the data source for one (channel, read)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Abort the read
    Unblock,

    /// Stop delivering chunks for the read
    StopReceiving,
}

const REJECT: &[Action] = &[Action::Unblock, Action::StopReceiving];
const ACCEPT: &[Action] = &[Action::StopReceiving];
const NONE: &[Action] = &[];

/// Actions for an experimental read with this verdict, in issue order
pub fn verdict_plan(verdict: Verdict) -> &'static [Action] {
    match verdict {
        Verdict::Reject => REJECT,
        Verdict::Accept => ACCEPT,
        Verdict::NeedMoreSignal => NONE,
    }
}

/// Actions for a control-group read pulled in a normal cycle
pub fn control_plan() -> &'static [Action] {
    ACCEPT
}

/// Actions for a read drained by overload shedding
pub fn shed_plan(is_control: bool) -> &'static [Action] {
    if is_control {
        ACCEPT
    } else {
        REJECT
    }
}
