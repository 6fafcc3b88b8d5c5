//! [`SynthesisEngine`] that shells out to a system speech binary.
//!
//! Looks for `espeak-ng`, then `espeak`, then macOS `say` on `PATH`.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::watch;

use super::on_device::{SynthesisEngine, Utterance, VoiceInfo};
use crate::error::VoiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    Espeak,
    Say,
}

pub struct CommandSynthesisEngine {
    program: PathBuf,
    flavor: Flavor,
    /// Bumped on every cancel; running utterances watch it.
    cancel_tx: watch::Sender<u64>,
}

impl CommandSynthesisEngine {
    /// Find a speech binary on `PATH`. `None` if there is none.
    pub fn detect() -> Option<Self> {
        let candidates = [
            ("espeak-ng", Flavor::Espeak),
            ("espeak", Flavor::Espeak),
            ("say", Flavor::Say),
        ];

        candidates.into_iter().find_map(|(binary, flavor)| {
            which::which(binary).ok().map(|program| {
                tracing::debug!(program = %program.display(), "Found speech synthesis binary");
                Self::with_program(program, flavor)
            })
        })
    }

    fn with_program(program: PathBuf, flavor: Flavor) -> Self {
        let (cancel_tx, _) = watch::channel(0);
        Self {
            program,
            flavor,
            cancel_tx,
        }
    }

    pub fn program(&self) -> &std::path::Path {
        &self.program
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .kill_on_drop(true)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null());
        command
    }
}

#[async_trait]
impl SynthesisEngine for CommandSynthesisEngine {
    async fn voices(&self) -> Result<Vec<VoiceInfo>, VoiceError> {
        let mut command = self.command();
        command
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped());
        match self.flavor {
            Flavor::Espeak => command.arg("--voices"),
            Flavor::Say => command.args(["-v", "?"]),
        };

        let output = command
            .output()
            .await
            .map_err(|e| VoiceError::Synthesis(format!("failed to list voices: {e}")))?;
        if !output.status.success() {
            return Err(VoiceError::Synthesis(format!(
                "{} exited with {}",
                self.program.display(),
                output.status
            )));
        }

        let listing = String::from_utf8_lossy(&output.stdout);
        Ok(match self.flavor {
            Flavor::Espeak => parse_espeak_voices(&listing),
            Flavor::Say => parse_say_voices(&listing),
        })
    }

    async fn speak(&self, utterance: Utterance) -> Result<(), VoiceError> {
        let mut cancelled = self.cancel_tx.subscribe();
        cancelled.borrow_and_update();

        let mut command = self.command();
        if let Some(ref voice) = utterance.voice {
            command.args(["-v", voice]);
        }
        command.arg("--").arg(&utterance.text);

        let mut child = command
            .spawn()
            .map_err(|e| VoiceError::Synthesis(format!("failed to start speech: {e}")))?;

        tokio::select! {
            status = child.wait() => {
                let status = status.map_err(|e| VoiceError::Synthesis(e.to_string()))?;
                if status.success() {
                    Ok(())
                } else {
                    Err(VoiceError::Synthesis(format!(
                        "{} exited with {status}",
                        self.program.display()
                    )))
                }
            }
            _ = cancelled.changed() => {
                let _ = child.kill().await;
                tracing::debug!("Utterance cancelled");
                Ok(())
            }
        }
    }

    fn cancel(&self) {
        self.cancel_tx.send_modify(|generation| *generation += 1);
    }
}

/// Parse `espeak --voices` output.
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  af              --/M      Afrikaans          gmw/af
///  2  en-us           --/M      English_(America)  gmw/en-US           (en 3)
/// ```
fn parse_espeak_voices(listing: &str) -> Vec<VoiceInfo> {
    listing
        .lines()
        .skip(1)
        .filter_map(|line| {
            let columns: Vec<&str> = line.split_whitespace().collect();
            match columns.as_slice() {
                [_, language, _, name, ..] => Some(VoiceInfo {
                    name: (*name).to_string(),
                    language: Some((*language).to_string()),
                }),
                _ => None,
            }
        })
        .collect()
}

/// Parse `say -v ?` output.
///
/// ```text
/// Alex                en_US    # Most people recognize me by my voice.
/// Bad News            en_US    # The light you see at the end of the tunnel...
/// ```
fn parse_say_voices(listing: &str) -> Vec<VoiceInfo> {
    listing
        .lines()
        .filter_map(|line| {
            let described = line.split('#').next()?.trim();
            let (name, language) = described.rsplit_once(char::is_whitespace)?;
            let name = name.trim();
            (!name.is_empty()).then(|| VoiceInfo {
                name: name.to_string(),
                language: Some(language.to_string()),
            })
        })
        .collect()
}
