//! Exit code logic for the cadmium process.
//!
//! Single responsibility: map the run tally to the process exit outcome.

use crate::ProcessExit;
use crate::app::output::RunTally;

/// Determines the process exit outcome from a run tally.
///
/// Items skipped because they already exist count as neither completed nor failed.
pub(crate) fn determine_exit_outcome(tally: &RunTally) -> ProcessExit {
    if tally.failed() == 0 {
        ProcessExit::Success
    } else if tally.completed > 0 {
        ProcessExit::Partial
    } else {
        ProcessExit::Failure
    }
}
