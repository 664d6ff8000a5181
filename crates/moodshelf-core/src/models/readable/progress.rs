use serde::{Deserialize, Serialize};

/// Lifecycle of a readable in the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadableStatus {
    #[default]
    ToRead,
    InProgress,
    Finished,
    Dnf,
}

impl ReadableStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToRead => "to_read",
            Self::InProgress => "in_progress",
            Self::Finished => "finished",
            Self::Dnf => "dnf",
        }
    }

    /// Finished and abandoned items are closed; everything else is still in the queue.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::ToRead | Self::InProgress)
    }
}

impl std::fmt::Display for ReadableStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReadableStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "to_read" | "to-read" => Ok(Self::ToRead),
            "in_progress" | "in-progress" => Ok(Self::InProgress),
            "finished" => Ok(Self::Finished),
            "dnf" => Ok(Self::Dnf),
            _ => Err(format!("Invalid ReadableStatus: {s}")),
        }
    }
}

/// How progress through a readable is tracked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressMode {
    /// Pages for books, chapters for fan works.
    #[default]
    Units,
    Time,
    Percent,
}

impl ProgressMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Units => "units",
            Self::Time => "time",
            Self::Percent => "percent",
        }
    }
}

impl std::fmt::Display for ProgressMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProgressMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "units" => Ok(Self::Units),
            "time" => Ok(Self::Time),
            "percent" => Ok(Self::Percent),
            _ => Err(format!("Invalid ProgressMode: {s}")),
        }
    }
}

/// Percentage of `current` over `total`, clamped to 0..=100.
pub(crate) fn percent_of(current: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (f64::from(current) / f64::from(total) * 100.0).clamp(0.0, 100.0)
}
