use crate::error::ConfigError;

/// Number of tasks in one session
pub const TOTAL_TASKS: usize = 10;

/// Emotion labels in presentation order
pub const DEFAULT_LABELS: [&str; TOTAL_TASKS] = [
    "joy",
    "anger",
    "sadness",
    "fear",
    "surprise",
    "disgust",
    "calm",
    "excitement",
    "confusion",
    "boredom",
];

/// Ordered, immutable emotion labels; task `i` (1-based) shows `labels[i - 1]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCatalog {
    labels: Vec<String>,
}

impl Default for TaskCatalog {
    fn default() -> Self {
        Self {
            labels: DEFAULT_LABELS.iter().map(|l| l.to_string()).collect(),
        }
    }
}

impl TaskCatalog {
    pub fn new(labels: Vec<String>) -> Result<Self, ConfigError> {
        if labels.len() != TOTAL_TASKS {
            return Err(ConfigError::LabelCount {
                expected: TOTAL_TASKS,
                found: labels.len(),
            });
        }
        Ok(Self { labels })
    }

    pub fn total(&self) -> usize {
        self.labels.len()
    }

    pub fn label(&self, task: usize) -> Option<&str> {
        task.checked_sub(1)
            .and_then(|i| self.labels.get(i))
            .map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}
