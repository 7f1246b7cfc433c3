use std::time::Duration;

/// Result of a shelled-out command, the shape every backend's
/// `run_command` returns.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub returncode: i32,
    pub stdout: String,
    pub stderr: String,
    pub command: Vec<String>,
    pub duration: Duration,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.returncode == 0
    }

    /// Synthesize the result of a command that exceeded its time budget:
    /// `returncode=-1` and a message naming the timeout.
    pub fn timed_out(command: Vec<String>, timeout: Duration) -> Self {
        let cmd_str = command.join(" ");
        Self {
            returncode: -1,
            stdout: String::new(),
            stderr: format!(
                "command timed out after {}s: {cmd_str}",
                timeout.as_secs()
            ),
            command,
            duration: timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_is_exact_zero_returncode() {
        let ok = CommandResult {
            returncode: 0,
            stdout: String::new(),
            stderr: String::new(),
            command: vec!["true".into()],
            duration: Duration::from_millis(1),
        };
        assert!(ok.success());

        let failed = CommandResult { returncode: 1, ..ok };
        assert!(!failed.success());
    }

    #[test]
    fn timed_out_reports_minus_one_and_names_timeout() {
        let result = CommandResult::timed_out(vec!["dd".into()], Duration::from_secs(30));
        assert_eq!(result.returncode, -1);
        assert!(result.stderr.contains("30"));
    }
}
