use std::process::Command;

/// Result of one rebuild attempt. A failure is reported, never retried.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildOutcome {
    Succeeded,
    Failed(String),
}

pub trait Rebuild {
    fn rebuild(&mut self) -> BuildOutcome;
}

/// Runs the site build as an external, synchronous process.
pub struct BuildCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl BuildCommand {
    /// First element is the program, the rest its arguments.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(BuildCommand {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl Rebuild for BuildCommand {
    fn rebuild(&mut self) -> BuildOutcome {
        match Command::new(&self.program).args(&self.args).status() {
            Ok(status) if status.success() => BuildOutcome::Succeeded,
            Ok(status) => BuildOutcome::Failed(format!("{} exited with {}", self.program, status)),
            Err(e) => BuildOutcome::Failed(format!("Could not run {}: {}", self.program, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_argv() {
        let cmd = BuildCommand::from_argv(&argv(&["make", "blog"])).unwrap();
        assert_eq!(cmd.program, "make");
        assert_eq!(cmd.args, ["blog"]);
        assert!(BuildCommand::from_argv(&[]).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_outcomes() {
        let mut ok = BuildCommand::from_argv(&argv(&["true"])).unwrap();
        assert_eq!(ok.rebuild(), BuildOutcome::Succeeded);

        let mut failing = BuildCommand::from_argv(&argv(&["sh", "-c", "exit 2"])).unwrap();
        assert!(matches!(failing.rebuild(), BuildOutcome::Failed(msg) if msg.starts_with("sh exited with")));

        let mut missing = BuildCommand::from_argv(&argv(&["no-such-build-tool"])).unwrap();
        assert!(matches!(missing.rebuild(), BuildOutcome::Failed(msg) if msg.starts_with("Could not run")));
    }
}
