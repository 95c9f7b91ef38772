pub mod classify;
pub mod controller;
pub mod flow;

#[cfg(test)]
pub(crate) mod testing;

pub use classify::{classify, FailureKind};
pub use controller::{
    display_name, success_message, AwaitingScan, FlowId, FlowTicket, ScanPhase, Settled, UiState,
    VerificationController,
};
pub use flow::{run_flow, FlowEvent, POLL_INTERVAL, WAIT_TIMEOUT};
