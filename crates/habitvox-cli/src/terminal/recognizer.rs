//! Typed lines as recognition results.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use habitvox_voice::{RecognitionEngine, RecognitionEvent, RecognitionOptions, VoiceError};
use tokio::sync::mpsc;

use super::{LineReader, RustylineReader};

const ANSWER_PROMPT: &str = "you> ";
const DICTATION_PROMPT: &str = "  ... ";

/// Recognition engine that reads the user's answer from the terminal.
///
/// A single pass reads one line. A continuous pass reads lines until an
/// empty line or end of input. Every line is a final result.
pub struct ConsoleRecognizer {
    reader: Arc<dyn LineReader>,
    stopped: Arc<AtomicBool>,
}

impl ConsoleRecognizer {
    pub fn new(reader: Arc<dyn LineReader>) -> Self {
        Self {
            reader,
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Default for ConsoleRecognizer {
    fn default() -> Self {
        Self::new(Arc::new(RustylineReader))
    }
}

#[async_trait]
impl RecognitionEngine for ConsoleRecognizer {
    async fn start(
        &self,
        options: RecognitionOptions,
        events: mpsc::UnboundedSender<RecognitionEvent>,
    ) -> Result<(), VoiceError> {
        self.stopped.store(false, Ordering::SeqCst);
        let reader = Arc::clone(&self.reader);
        let stopped = Arc::clone(&self.stopped);

        if options.continuous {
            println!("(type each goal, empty line to finish)");
        }

        tokio::task::spawn_blocking(move || {
            let prompt = if options.continuous {
                DICTATION_PROMPT
            } else {
                ANSWER_PROMPT
            };
            loop {
                match reader.read_line(prompt, "") {
                    // Lines typed after stop() are dropped.
                    Ok(Some(_)) if stopped.load(Ordering::SeqCst) => break,
                    Ok(Some(line)) => {
                        let line = line.trim().to_string();
                        if options.continuous && line.is_empty() {
                            break;
                        }
                        let _ = events.send(RecognitionEvent::Final(line));
                        if !options.continuous {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        let _ = events.send(RecognitionEvent::Error(VoiceError::Recognition(
                            e.to_string(),
                        )));
                        break;
                    }
                }
            }
            let _ = events.send(RecognitionEvent::End);
        });
        Ok(())
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}
