use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::NaiveDate;

use crate::config::GitConfig;
use crate::errors::{DigestError, DigestResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    fn mentions(&self, needle: &str) -> bool {
        self.stdout.contains(needle) || self.stderr.contains(needle)
    }
}

pub trait GitRunner {
    fn run(&self, args: &[String]) -> DigestResult<GitOutput>;
}

/// Runs the `git` executable inside a working tree
pub struct CommandGitRunner {
    repo_dir: PathBuf,
}

impl CommandGitRunner {
    pub fn new<P: AsRef<Path>>(repo_dir: P) -> Self {
        Self {
            repo_dir: repo_dir.as_ref().to_path_buf(),
        }
    }
}

impl GitRunner for CommandGitRunner {
    fn run(&self, args: &[String]) -> DigestResult<GitOutput> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_dir)
            .output()?;

        Ok(GitOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The digest matched what was already committed
    NothingToCommit,
    Pushed { message: String, target: String },
}

pub struct PublishService<G: GitRunner> {
    runner: G,
    git: GitConfig,
}

impl<G: GitRunner> PublishService<G> {
    pub fn new(runner: G, git: GitConfig) -> Self {
        Self { runner, git }
    }

    pub fn commit_message(date: NaiveDate) -> String {
        format!("🔄 Daily update: {}", date.format("%Y-%m-%d"))
    }

    /// Refspec pushed regardless of the local branch name
    pub fn push_target(&self) -> String {
        format!("HEAD:{}", self.git.branch)
    }

    /// Stage `paths`, commit them with the daily message and push.
    ///
    /// An unchanged digest is not an error: nothing is committed or pushed.
    pub fn publish(&self, paths: &[PathBuf], date: NaiveDate) -> DigestResult<PublishOutcome> {
        let mut add = vec!["add".to_string(), "--".to_string()];
        add.extend(paths.iter().map(|p| p.to_string_lossy().into_owned()));
        self.run_checked(&add)?;

        let staged = self.run(&["diff", "--cached", "--quiet"])?;
        if staged.success {
            tracing::info!("No changes to commit");
            return Ok(PublishOutcome::NothingToCommit);
        }

        let message = Self::commit_message(date);
        let mut commit = self.identity_args();
        commit.extend(["commit".to_string(), "-m".to_string(), message.clone()]);
        let output = self.runner.run(&commit)?;
        if !output.success {
            if output.mentions("nothing to commit") || output.mentions("no changes added to commit") {
                tracing::info!("No changes to commit");
                return Ok(PublishOutcome::NothingToCommit);
            }
            return Err(git_error("commit", &output));
        }
        tracing::info!(%message, "Committed digest");

        let target = self.push_target();
        self.run_checked(&[
            "push".to_string(),
            self.git.remote.clone(),
            target.clone(),
        ])?;
        tracing::info!(remote = %self.git.remote, %target, "Pushed digest");

        Ok(PublishOutcome::Pushed { message, target })
    }

    fn identity_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(name) = &self.git.user_name {
            args.push("-c".to_string());
            args.push(format!("user.name={}", name));
        }
        if let Some(email) = &self.git.user_email {
            args.push("-c".to_string());
            args.push(format!("user.email={}", email));
        }
        args
    }

    fn run(&self, args: &[&str]) -> DigestResult<GitOutput> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        self.runner.run(&args)
    }

    fn run_checked(&self, args: &[String]) -> DigestResult<GitOutput> {
        let output = self.runner.run(args)?;
        if !output.success {
            let command = args.first().map(String::as_str).unwrap_or("");
            return Err(git_error(command, &output));
        }
        Ok(output)
    }
}

fn git_error(command: &str, output: &GitOutput) -> DigestError {
    let stderr = if output.stderr.trim().is_empty() {
        output.stdout.trim()
    } else {
        output.stderr.trim()
    };
    DigestError::Git {
        command: command.to_string(),
        stderr: stderr.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    /// Scripted runner: answers by subcommand and records every call
    struct FakeGit {
        calls: RefCell<Vec<Vec<String>>>,
        staged_changes: bool,
        commit_fails_with: Option<String>,
        push_fails: bool,
    }

    impl FakeGit {
        fn new(staged_changes: bool) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                staged_changes,
                commit_fails_with: None,
                push_fails: false,
            }
        }

        fn subcommands(&self) -> Vec<String> {
            self.calls
                .borrow()
                .iter()
                .map(|args| subcommand(args).to_string())
                .collect()
        }
    }

    fn subcommand(args: &[String]) -> &str {
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            if arg == "-c" {
                iter.next();
                continue;
            }
            return arg;
        }
        ""
    }

    fn ok() -> GitOutput {
        GitOutput {
            success: true,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    fn failed(stdout: &str, stderr: &str) -> GitOutput {
        GitOutput {
            success: false,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    impl GitRunner for &FakeGit {
        fn run(&self, args: &[String]) -> DigestResult<GitOutput> {
            self.calls.borrow_mut().push(args.to_vec());
            Ok(match subcommand(args) {
                // `diff --quiet` exits non-zero when something is staged
                "diff" if self.staged_changes => failed("", ""),
                "commit" => match &self.commit_fails_with {
                    Some(out) => failed(out, ""),
                    None => ok(),
                },
                "push" if self.push_fails => failed("", "rejected"),
                _ => ok(),
            })
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn test_commit_message_format() {
        assert_eq!(
            PublishService::<CommandGitRunner>::commit_message(date()),
            "🔄 Daily update: 2026-10-18"
        );
    }

    #[test]
    fn test_clean_tree_is_success_without_push() {
        let git = FakeGit::new(false);
        let service = PublishService::new(&git, GitConfig::default());

        let outcome = service.publish(&[PathBuf::from("index.html")], date()).unwrap();

        assert_eq!(outcome, PublishOutcome::NothingToCommit);
        assert_eq!(git.subcommands(), vec!["add", "diff"]);
    }

    #[test]
    fn test_commit_nothing_to_commit_is_swallowed() {
        let mut git = FakeGit::new(true);
        git.commit_fails_with = Some("nothing to commit, working tree clean".to_string());
        let service = PublishService::new(&git, GitConfig::default());

        let outcome = service.publish(&[PathBuf::from("index.html")], date()).unwrap();

        assert_eq!(outcome, PublishOutcome::NothingToCommit);
        assert!(!git.subcommands().contains(&"push".to_string()));
    }

    #[test]
    fn test_other_commit_failure_propagates() {
        let mut git = FakeGit::new(true);
        git.commit_fails_with = Some("fatal: unable to auto-detect email address".to_string());
        let service = PublishService::new(&git, GitConfig::default());

        let result = service.publish(&[PathBuf::from("index.html")], date());

        assert!(matches!(result, Err(DigestError::Git { ref command, .. }) if command == "commit"));
    }

    #[test]
    fn test_changes_are_committed_and_pushed_to_head_main() {
        let git = FakeGit::new(true);
        let config = GitConfig {
            user_name: Some("digest-bot".to_string()),
            user_email: Some("bot@example.com".to_string()),
            ..GitConfig::default()
        };
        let service = PublishService::new(&git, config);

        let outcome = service.publish(&[PathBuf::from("index.html")], date()).unwrap();

        assert_eq!(
            outcome,
            PublishOutcome::Pushed {
                message: "🔄 Daily update: 2026-10-18".to_string(),
                target: "HEAD:main".to_string(),
            }
        );

        let calls = git.calls.borrow();
        assert_eq!(calls[0], vec!["add", "--", "index.html"]);
        assert_eq!(
            calls[2],
            vec![
                "-c",
                "user.name=digest-bot",
                "-c",
                "user.email=bot@example.com",
                "commit",
                "-m",
                "🔄 Daily update: 2026-10-18"
            ]
        );
        assert_eq!(calls[3], vec!["push", "origin", "HEAD:main"]);
    }

    #[test]
    fn test_push_failure_propagates() {
        let mut git = FakeGit::new(true);
        git.push_fails = true;
        let service = PublishService::new(&git, GitConfig::default());

        let result = service.publish(&[PathBuf::from("index.html")], date());

        assert!(matches!(result, Err(DigestError::Git { ref command, .. }) if command == "push"));
    }

    fn git_available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn git(dir: &Path, args: &[&str]) -> GitOutput {
        let mut all = vec![
            "-c".to_string(),
            "user.name=Test".to_string(),
            "-c".to_string(),
            "user.email=test@example.com".to_string(),
        ];
        all.extend(args.iter().map(|s| s.to_string()));
        CommandGitRunner::new(dir).run(&all).unwrap()
    }

    #[test]
    fn test_real_repository_round() {
        if !git_available() {
            return;
        }

        let temp_dir = TempDir::new().unwrap();
        let remote = temp_dir.path().join("remote.git");
        let work = temp_dir.path().join("work");
        fs::create_dir_all(&work).unwrap();

        assert!(git(temp_dir.path(), &["init", "--bare", remote.to_str().unwrap()]).success);
        assert!(git(&work, &["init"]).success);
        fs::write(work.join("index.html"), "<html>old</html>").unwrap();
        assert!(git(&work, &["add", "index.html"]).success);
        assert!(git(&work, &["commit", "-m", "initial"]).success);
        assert!(git(&work, &["checkout", "-b", "some-local-branch"]).success);
        assert!(git(&work, &["remote", "add", "origin", remote.to_str().unwrap()]).success);

        let config = GitConfig {
            user_name: Some("Test".to_string()),
            user_email: Some("test@example.com".to_string()),
            ..GitConfig::default()
        };
        let service = PublishService::new(CommandGitRunner::new(&work), config);
        let paths = [PathBuf::from("index.html")];

        // Clean tree: nothing to do
        assert_eq!(
            service.publish(&paths, date()).unwrap(),
            PublishOutcome::NothingToCommit
        );

        // Modified digest: committed and pushed to main on the remote
        fs::write(work.join("index.html"), "<html>new</html>").unwrap();
        let outcome = service.publish(&paths, date()).unwrap();
        assert!(matches!(outcome, PublishOutcome::Pushed { .. }));

        let subject = git(&work, &["log", "-1", "--format=%s"]);
        assert_eq!(subject.stdout.trim(), "🔄 Daily update: 2026-10-18");

        let remote_main = git(&remote, &["log", "-1", "--format=%s", "main"]);
        assert!(remote_main.success);
        assert_eq!(remote_main.stdout.trim(), "🔄 Daily update: 2026-10-18");
    }
}
