//! Command handlers.
//!
//! Handlers follow one pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<(), CliError>`
//! - Thin wrappers that start a session or call a provider, then format
//!   output for the terminal

pub mod checkin;
pub mod config;
pub mod goals;
pub mod say;
pub mod voices;

use std::future::Future;

use habitvox_voice::SessionEvent;
use tokio::sync::mpsc;

use crate::presentation::print_event;

/// Drive `run` to completion while printing session events. Ctrl-C calls
/// `cancel` once; the run then winds down on its own.
pub(crate) async fn drive<T>(
    run: impl Future<Output = T>,
    events: &mut mpsc::UnboundedReceiver<SessionEvent>,
    cancel: impl Fn(),
) -> T {
    tokio::pin!(run);
    let mut cancelled = false;
    let result = loop {
        tokio::select! {
            result = &mut run => break result,
            Some(event) = events.recv() => print_event(&event),
            signal = tokio::signal::ctrl_c(), if !cancelled => {
                if signal.is_ok() {
                    println!();
                    tracing::info!("Interrupted, stopping session");
                    cancelled = true;
                    cancel();
                }
            }
        }
    };
    while let Ok(event) = events.try_recv() {
        print_event(&event);
    }
    result
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[tokio::test]
    async fn drive_returns_the_run_result_and_drains_events() {
        let (tx, mut events) = mpsc::unbounded_channel();
        let run = async move {
            tx.send(SessionEvent::Prompt("Did you stretch?".into())).unwrap();
            tokio::task::yield_now().await;
            tx.send(SessionEvent::Completed {
                success: true,
                message: None,
            })
            .unwrap();
            7
        };

        let cancels = Cell::new(0);
        let result = drive(run, &mut events, || cancels.set(cancels.get() + 1)).await;

        assert_eq!(result, 7);
        assert!(events.try_recv().is_err());
        assert_eq!(cancels.get(), 0);
    }
}
