//! Goals command handler.

use habitvox_voice::{GoalsOutcome, GoalsSession};

use super::drive;
use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::format_stack;

/// Dictate, review and submit this week's goals, then print the generated
/// habit stack.
pub async fn execute(ctx: &CliContext) -> Result<(), CliError> {
    let (session, mut events) = GoalsSession::new(ctx.session_context(), ctx.confirmer.clone());

    let outcome = drive(session.start(), &mut events, || session.cancel()).await?;
    match outcome {
        GoalsOutcome::Submitted { goals, stack } => {
            println!();
            println!("Goals for this week:");
            for goal in goals.as_slice() {
                println!("  - {goal}");
            }
            println!();
            println!("Your new habit stack:");
            println!("{}", format_stack(&stack));
        }
        GoalsOutcome::NothingHeard => println!("No goals heard."),
        GoalsOutcome::Declined => println!("Goals not saved."),
        GoalsOutcome::AlreadyRunning => {}
    }
    Ok(())
}
