//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// Create a kvrotate command running inside the test project.
    ///
    /// `KVROTATE_CONFIG` and `KVROTATE_LOG` are cleared so the caller's
    /// environment cannot leak in.
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("kvrotate").expect("failed to find kvrotate binary");
        cmd.env("HOME", self.home.path());
        cmd.env("USERPROFILE", self.home.path());
        cmd.env("XDG_CONFIG_HOME", self.home.path().join(".config"));
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("KVROTATE_CONFIG");
        cmd.env_remove("KVROTATE_LOG");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Run kvrotate with arguments.
    pub fn run(&self, args: &[&str]) -> Output {
        self.cmd()
            .args(args)
            .output()
            .expect("failed to run kvrotate")
    }

    /// Shortcut for `kvrotate rotate --env <env> --app <app> ...`.
    pub fn rotate(&self, env: &str, app: &str, extra: &[&str]) -> Output {
        let mut args = vec!["rotate", "--env", env, "--app", app];
        args.extend_from_slice(extra);
        self.run(&args)
    }

    /// Shortcut for `kvrotate plan --env <env> --app <app> ...`.
    pub fn plan(&self, env: &str, app: &str, extra: &[&str]) -> Output {
        let mut args = vec!["plan", "--env", env, "--app", app];
        args.extend_from_slice(extra);
        self.run(&args)
    }

    /// Shortcut for `kvrotate check --env <env> --app <app>`.
    pub fn check(&self, env: &str, app: &str) -> Output {
        self.run(&["check", "--env", env, "--app", app])
    }
}
