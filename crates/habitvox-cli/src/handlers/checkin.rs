//! Check-in command handler.

use habitvox_voice::{CheckInOutcome, CheckInSession};

use super::drive;
use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Run today's check-in.
///
/// Returns an error if the check-in could not be saved; the session has
/// already told the user why.
pub async fn execute(ctx: &CliContext) -> Result<(), CliError> {
    let (session, mut events) = CheckInSession::new(ctx.session_context(), ctx.checkin_config());

    let outcome = drive(session.start(), &mut events, || session.cancel()).await?;
    match outcome {
        CheckInOutcome::Submitted(log) => {
            tracing::info!(
                date = %log.date,
                answered = log.responses.len(),
                "Check-in saved"
            );
            Ok(())
        }
        CheckInOutcome::SubmitFailed { error, .. } => Err(CliError::Backend(error.technical)),
        CheckInOutcome::AlreadyRunning => Ok(()),
    }
}
