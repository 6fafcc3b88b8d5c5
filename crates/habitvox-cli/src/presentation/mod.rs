//! Terminal rendering of session events and habit stacks.
//!
//! Format-only: nothing here decides what happens next.

use habitvox_core::{HabitResponse, HabitStack};
use habitvox_voice::{CheckInPhase, GoalsPhase, SessionEvent, SessionPhase};

/// One line for a session event, or `None` if the event is not shown.
pub fn render_event(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::Prompt(text) => Some(format!("habitvox> {text}")),
        SessionEvent::Recorded { habit_key, response } => {
            Some(format!("  ✓ {habit_key}: {}", response_label(*response)))
        }
        SessionEvent::Error(report) => Some(format!("  ⚠ {}", report.user_message)),
        SessionEvent::PhaseChanged(phase) => phase_label(phase).map(|s| format!("[{s}]")),
        SessionEvent::Completed { success: true, .. } => Some("Done.".to_string()),
        SessionEvent::Completed {
            success: false,
            message,
        } => Some(message.as_ref().map_or_else(
            || "Nothing saved.".to_string(),
            |m| format!("Nothing saved ({m})."),
        )),
        SessionEvent::Transcript { .. } => None,
    }
}

pub fn print_event(event: &SessionEvent) {
    tracing::debug!(?event, "Session event");
    if let Some(line) = render_event(event) {
        println!("{line}");
    }
}

/// Numbered listing of a habit stack.
pub fn format_stack(stack: &HabitStack) -> String {
    if stack.is_empty() {
        return "(no habits)".to_string();
    }
    stack
        .slots()
        .iter()
        .enumerate()
        .map(|(i, slot)| format!("  {}. {}", i + 1, slot.text))
        .collect::<Vec<_>>()
        .join("\n")
}

const fn response_label(response: HabitResponse) -> &'static str {
    match response {
        HabitResponse::Completed => "done",
        HabitResponse::NotCompleted => "not done",
        HabitResponse::Skipped => "skipped",
    }
}

/// Only the phases the user would not otherwise notice get a status line.
const fn phase_label(phase: &SessionPhase) -> Option<&'static str> {
    match phase {
        SessionPhase::CheckIn(CheckInPhase::FetchingStack) => Some("fetching today's habits"),
        SessionPhase::CheckIn(CheckInPhase::Submitting)
        | SessionPhase::Goals(GoalsPhase::Submitting) => Some("saving"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use habitvox_core::{ErrorKind, ErrorReport, HabitSlot};

    use super::*;

    #[test]
    fn prompts_and_recordings_are_shown() {
        assert_eq!(
            render_event(&SessionEvent::Prompt("Did you stretch?".into())).as_deref(),
            Some("habitvox> Did you stretch?")
        );
        assert_eq!(
            render_event(&SessionEvent::Recorded {
                habit_key: "habit_2".into(),
                response: HabitResponse::Skipped,
            })
            .as_deref(),
            Some("  ✓ habit_2: skipped")
        );
    }

    #[test]
    fn errors_show_the_user_message_only() {
        let report = ErrorReport::new(ErrorKind::Unavailable, "connect ECONNREFUSED 10.0.0.3:443");
        let line = render_event(&SessionEvent::Error(report.clone())).unwrap();
        assert!(line.contains(&report.user_message));
        assert!(!line.contains("10.0.0.3"));
    }

    #[test]
    fn transcripts_and_most_phases_are_quiet() {
        assert!(
            render_event(&SessionEvent::Transcript {
                text: "yes".into(),
                is_final: true,
            })
            .is_none()
        );
        assert!(
            render_event(&SessionEvent::PhaseChanged(SessionPhase::Goals(
                GoalsPhase::Listening
            )))
            .is_none()
        );
        assert_eq!(
            render_event(&SessionEvent::PhaseChanged(CheckInPhase::Submitting.into())).as_deref(),
            Some("[saving]")
        );
    }

    #[test]
    fn stack_is_numbered() {
        let stack = HabitStack::new(vec![
            HabitSlot {
                key: "habit_1".into(),
                text: "Drink water".into(),
            },
            HabitSlot {
                key: "habit_2".into(),
                text: "Stretch".into(),
            },
        ]);
        assert_eq!(format_stack(&stack), "  1. Drink water\n  2. Stretch");
        assert_eq!(format_stack(&HabitStack::default()), "(no habits)");
    }
}
