//! Goal review in the terminal.

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use habitvox_core::GoalSet;
use habitvox_voice::{GoalConfirmation, GoalConfirmer};

use super::{LineReader, RustylineReader};

/// Shows each extracted goal pre-filled for editing, then asks to save.
///
/// Clearing a line drops that goal. Ending input at any point cancels.
pub struct LineEditorConfirmer {
    reader: Arc<dyn LineReader>,
}

impl LineEditorConfirmer {
    pub fn new(reader: Arc<dyn LineReader>) -> Self {
        Self { reader }
    }
}

impl Default for LineEditorConfirmer {
    fn default() -> Self {
        Self::new(Arc::new(RustylineReader))
    }
}

#[async_trait]
impl GoalConfirmer for LineEditorConfirmer {
    async fn confirm(&self, goals: &GoalSet) -> GoalConfirmation {
        let reader = Arc::clone(&self.reader);
        let goals = goals.as_slice().to_vec();
        match tokio::task::spawn_blocking(move || review(reader.as_ref(), &goals)).await {
            Ok(Ok(confirmation)) => confirmation,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Goal review failed");
                GoalConfirmation::Cancelled
            }
            Err(e) => {
                tracing::warn!(error = %e, "Goal review task panicked");
                GoalConfirmation::Cancelled
            }
        }
    }
}

fn review(reader: &dyn LineReader, goals: &[String]) -> io::Result<GoalConfirmation> {
    println!();
    println!("Here is what I heard. Edit a goal in place, or clear it to drop it.");

    let mut edited = Vec::with_capacity(goals.len());
    for (i, goal) in goals.iter().enumerate() {
        match reader.read_line(&format!("  {}. ", i + 1), goal)? {
            Some(line) => edited.push(line),
            None => return Ok(GoalConfirmation::Cancelled),
        }
    }

    loop {
        let Some(answer) = reader.read_line("Save these goals? [Y/n] ", "")? else {
            return Ok(GoalConfirmation::Cancelled);
        };
        match answer.trim().to_lowercase().as_str() {
            "" | "y" | "yes" => return Ok(GoalConfirmation::Confirmed(edited)),
            "n" | "no" => return Ok(GoalConfirmation::Cancelled),
            _ => eprintln!("Please enter 'y' for yes or 'n' for no."),
        }
    }
}
