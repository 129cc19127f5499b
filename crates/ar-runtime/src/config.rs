//! Configuration for command queues.

/// Configuration for a [`crate::CommandQueue`].
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Name attached to the queue's log records.
    pub label: String,
    /// Log failing commands when the application has not subscribed to the
    /// error event.
    pub log_errors: bool,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            label: "commands".to_string(),
            log_errors: true,
        }
    }
}

impl QueueConfig {
    /// Set the log label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Enable or disable the default error log listener.
    pub fn with_log_errors(mut self, enabled: bool) -> Self {
        self.log_errors = enabled;
        self
    }
}
