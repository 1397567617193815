use std::path::PathBuf;
use std::time::Duration;

use crate::agent::{CaptureHandle, LaunchRequest, RetryPolicy};
use crate::data::TicketFilter;

/// Background operations requested by the reducer.
///
/// Each effect carries an immutable snapshot of its inputs and completes with exactly
/// one [`AppEvent`](crate::ui::events::AppEvent). Polling effects wait `delay` first;
/// the reducer decides on completion whether to schedule the next one.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    LoadWorkItems {
        filter: TicketFilter,
    },
    LoadModels {
        retry: RetryPolicy,
    },
    DiscoverWorkspaces {
        repo_root: PathBuf,
    },
    Launch {
        request: LaunchRequest,
    },
    PollStatus {
        agent_id: String,
        window_id: String,
        delay: Duration,
    },
    StreamOutput {
        agent_id: String,
        handle: CaptureHandle,
        delay: Duration,
    },
    StopCapture {
        agent_id: String,
        handle: CaptureHandle,
    },
    CheckUpstream {
        delay: Duration,
    },
    ExpireRefreshFlag {
        generation: u64,
        delay: Duration,
    },
    AnimationTick {
        delay: Duration,
    },
}
