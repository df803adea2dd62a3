//! Text-to-speech via the host's installed speech engine (`say` on macOS,
//! `espeak-ng`/`espeak` elsewhere). The engine is consumed as-is: voice
//! enumeration, utterance playback, and cancel. This is the one operation
//! with an explicit stop action.

use tokio::process::{Child, Command};

use crate::error::ToolError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    pub language: String,
}

impl Voice {
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.language)
    }
}

/// Owns at most one playback child process.
#[derive(Default)]
pub struct SpeechEngine {
    child: Option<Child>,
}

impl SpeechEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start speaking `text` with the selected voice, cancelling any
    /// playback already in progress.
    pub fn speak(&mut self, text: &str, voice: Option<&str>) -> Result<(), ToolError> {
        self.cancel();
        let child = spawn_speaker(text, voice)
            .map_err(|_| ToolError::speech("An error occurred during speech synthesis."))?;
        self.child = Some(child);
        Ok(())
    }

    /// The speech engine's cancel primitive.
    pub fn cancel(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.start_kill();
        }
    }

    pub fn is_speaking(&mut self) -> bool {
        match &mut self.child {
            Some(child) => match child.try_wait() {
                Ok(None) => true,
                Ok(Some(_)) | Err(_) => {
                    self.child = None;
                    false
                }
            },
            None => false,
        }
    }
}

fn spawn_speaker(text: &str, voice: Option<&str>) -> std::io::Result<Child> {
    if cfg!(target_os = "macos") {
        let mut command = Command::new("say");
        if let Some(voice) = voice {
            command.arg("-v").arg(voice);
        }
        command.arg(text).kill_on_drop(true).spawn()
    } else {
        let mut command = Command::new("espeak-ng");
        if let Some(voice) = voice {
            command.arg("-v").arg(voice);
        }
        match command.arg(text).kill_on_drop(true).spawn() {
            Ok(child) => Ok(child),
            Err(_) => {
                let mut fallback = Command::new("espeak");
                if let Some(voice) = voice {
                    fallback.arg("-v").arg(voice);
                }
                fallback.arg(text).kill_on_drop(true).spawn()
            }
        }
    }
}

/// Enumerate the host's installed voices.
pub async fn list_voices() -> Result<Vec<Voice>, ToolError> {
    if cfg!(target_os = "macos") {
        let output = voice_listing("say", &["-v", "?"]).await?;
        Ok(parse_say_voices(&output))
    } else {
        let output = match voice_listing("espeak-ng", &["--voices"]).await {
            Ok(output) => output,
            Err(_) => voice_listing("espeak", &["--voices"]).await?,
        };
        Ok(parse_espeak_voices(&output))
    }
}

async fn voice_listing(binary: &str, args: &[&str]) -> Result<String, ToolError> {
    let output = Command::new(binary)
        .args(args)
        .output()
        .await
        .map_err(|err| ToolError::speech(format!("speech engine unavailable: {err}")))?;
    if !output.status.success() {
        return Err(ToolError::speech("The speech engine could not list voices."));
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// `say -v ?` lines: a (possibly multi-word) name, a language code, then a
/// `#`-prefixed sample sentence.
fn parse_say_voices(output: &str) -> Vec<Voice> {
    output
        .lines()
        .filter_map(|line| {
            let spec = line.split('#').next()?.trim_end();
            let mut tokens: Vec<&str> = spec.split_whitespace().collect();
            let language = tokens.pop()?;
            if tokens.is_empty() {
                return None;
            }
            Some(Voice {
                name: tokens.join(" "),
                language: language.to_string(),
            })
        })
        .collect()
}

/// `espeak --voices` columns: Pty, Language, Age/Gender, VoiceName, File.
/// The first line is a header.
fn parse_espeak_voices(output: &str) -> Vec<Voice> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() < 4 {
                return None;
            }
            Some(Voice {
                name: tokens[3].to_string(),
                language: tokens[1].to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_say_voices() {
        let output = "\
Alex                en_US    # Most people recognize me by my voice.
Bad News            en_US    # The light you see at the end of the tunnel is the headlamp of a fast approaching train.
Amelie              fr_CA    # Bonjour, je m'appelle Amelie.
";
        let voices = parse_say_voices(output);
        assert_eq!(voices.len(), 3);
        assert_eq!(voices[0].name, "Alex");
        assert_eq!(voices[0].language, "en_US");
        assert_eq!(voices[1].name, "Bad News");
        assert_eq!(voices[2].label(), "Amelie (fr_CA)");
    }

    #[test]
    fn test_parse_espeak_voices_skips_header() {
        let output = "\
Pty Language Age/Gender VoiceName          File          Other Languages
 5  af             M  afrikaans            other/af
 5  en             M  default              default
 5  en-gb          M  english              en
";
        let voices = parse_espeak_voices(output);
        assert_eq!(voices.len(), 3);
        assert_eq!(voices[0].name, "afrikaans");
        assert_eq!(voices[0].language, "af");
        assert_eq!(voices[2].label(), "english (en-gb)");
    }

    #[test]
    fn test_parse_empty_listing() {
        assert!(parse_say_voices("").is_empty());
        assert!(parse_espeak_voices("Pty Language Age/Gender VoiceName File\n").is_empty());
    }
}
