//! Human-readable battle log produced by a pass.

use core::fmt;

/// How a log line is rendered by clients.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "lowercase")]
pub enum LogTone {
    Damage,
    Heal,
    #[default]
    Info,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogLine {
    pub text: String,
    pub tone: LogTone,
}

impl LogLine {
    pub fn new(tone: LogTone, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(LogTone::Info, text)
    }

    pub fn damage(text: impl Into<String>) -> Self {
        Self::new(LogTone::Damage, text)
    }

    pub fn heal(text: impl Into<String>) -> Self {
        Self::new(LogTone::Heal, text)
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
