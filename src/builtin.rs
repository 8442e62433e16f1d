use crate::command::{CommandFactory, ExecutableCommand, Flow};
use crate::env::Environment;
use crate::interpreter::Factory;
use anyhow::{Result, anyhow};
use std::env;
use std::io::Write;
use tracing::debug;

/// Argument of `cd` that stands for the home directory.
const HOME_SHORTHAND: &str = "~";

/// Built-in commands known to the shell at compile time.
///
/// Builtins run inside the shell process. They see the raw words of the line:
/// `&`, `>` and `|` mean nothing to them.
pub(crate) trait BuiltinCommand: Sized {
    /// Canonical name of the command, e.g. "cd" or "exit".
    fn name() -> &'static str;

    /// Builds the command from the words following its name.
    fn from_args(args: &[&str]) -> Self;

    /// Executes the command.
    ///
    /// An `Err` is a recovered failure: its message is printed and the shell
    /// carries on.
    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<Flow>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(self: Box<Self>, stdout: &mut dyn Write, env: &mut Environment) -> Result<Flow> {
        match <T as BuiltinCommand>::execute(*self, stdout, env) {
            Ok(flow) => Ok(flow),
            Err(e) => {
                writeln!(stdout, "{e}")?;
                Ok(Flow::Continue)
            }
        }
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(&self, name: &str, args: &[&str]) -> Option<Box<dyn ExecutableCommand>> {
        if name == T::name() {
            Some(Box::new(T::from_args(args)))
        } else {
            None
        }
    }
}

/// Change the current working directory.
///
/// With no argument or `~` the target is `$HOME`. Only the first argument is
/// looked at.
#[derive(Debug)]
pub struct Cd {
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn from_args(args: &[&str]) -> Self {
        Self {
            target: args.first().map(|s| s.to_string()),
        }
    }

    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<Flow> {
        let target = match self.target {
            Some(t) if t != HOME_SHORTHAND => t,
            _ => env.home().ok_or_else(|| anyhow!("cd: HOME not set"))?,
        };

        env::set_current_dir(&target)
            .map_err(|_| anyhow!("cd: {target}: No such file or directory"))?;
        debug!(dir = %target, "changed working directory");
        Ok(Flow::Continue)
    }
}

/// Leave the shell. Arguments are ignored.
#[derive(Debug)]
pub struct Exit;

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn from_args(_args: &[&str]) -> Self {
        Self
    }

    fn execute(self, _stdout: &mut dyn Write, _env: &mut Environment) -> Result<Flow> {
        Ok(Flow::Exit)
    }
}

/// Factories for every builtin, in lookup order.
pub(crate) fn factories() -> Vec<Box<dyn CommandFactory>> {
    vec![
        Box::new(Factory::<Cd>::default()),
        Box::new(Factory::<Exit>::default()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lock_current_dir;
    use std::fs;

    fn env_with_home(home: &std::path::Path) -> Environment {
        let mut env = Environment::default();
        env.set_var("HOME", home.to_string_lossy());
        env
    }

    fn run(cmd: impl BuiltinCommand + 'static, env: &mut Environment) -> (Flow, String) {
        let mut out = Vec::new();
        let flow = ExecutableCommand::execute(Box::new(cmd), &mut out, env).unwrap();
        (flow, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_cd_to_absolute_path() {
        let _lock = lock_current_dir();
        let orig = env::current_dir().unwrap();
        let temp = tempfile::tempdir().unwrap();
        let canonical_temp = fs::canonicalize(temp.path()).unwrap();

        let mut env = Environment::default();
        let target = Some(canonical_temp.to_string_lossy().to_string());
        let (flow, out) = run(Cd { target }, &mut env);

        let new_cwd = fs::canonicalize(env::current_dir().unwrap()).unwrap();
        env::set_current_dir(orig).unwrap();

        assert_eq!(flow, Flow::Continue);
        assert!(out.is_empty());
        assert_eq!(new_cwd, canonical_temp);
    }

    #[test]
    fn test_cd_to_home_when_none() {
        let _lock = lock_current_dir();
        let orig = env::current_dir().unwrap();
        let temp = tempfile::tempdir().unwrap();
        let canonical_temp = fs::canonicalize(temp.path()).unwrap();

        let mut env = env_with_home(&canonical_temp);
        let (flow, _) = run(Cd { target: None }, &mut env);

        let new_cwd = fs::canonicalize(env::current_dir().unwrap()).unwrap();
        env::set_current_dir(orig).unwrap();

        assert_eq!(flow, Flow::Continue);
        assert_eq!(new_cwd, canonical_temp);
    }

    #[test]
    fn test_cd_tilde_is_idempotent() {
        let _lock = lock_current_dir();
        let orig = env::current_dir().unwrap();
        let temp = tempfile::tempdir().unwrap();
        let canonical_temp = fs::canonicalize(temp.path()).unwrap();
        let mut env = env_with_home(&canonical_temp);

        run(Cd::from_args(&["~"]), &mut env);
        let first = fs::canonicalize(env::current_dir().unwrap()).unwrap();
        run(Cd::from_args(&["~"]), &mut env);
        let second = fs::canonicalize(env::current_dir().unwrap()).unwrap();
        env::set_current_dir(orig).unwrap();

        assert_eq!(first, canonical_temp);
        assert_eq!(second, canonical_temp);
    }

    #[test]
    fn test_cd_to_missing_directory_keeps_cwd() {
        let _lock = lock_current_dir();
        let before = env::current_dir().unwrap();

        let mut env = Environment::default();
        let (flow, out) = run(Cd::from_args(&["/nonexistent/tinysh"]), &mut env);

        assert_eq!(flow, Flow::Continue);
        assert_eq!(out, "cd: /nonexistent/tinysh: No such file or directory\n");
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn test_cd_uses_only_first_argument() {
        let cd = Cd::from_args(&["a", "b"]);
        assert_eq!(cd.target.as_deref(), Some("a"));
    }

    #[test]
    fn test_exit_ignores_arguments() {
        let mut env = Environment::default();
        let (flow, out) = run(Exit::from_args(&["now", "please"]), &mut env);
        assert_eq!(flow, Flow::Exit);
        assert!(out.is_empty());
    }

    #[test]
    fn test_factories_recognize_only_their_names() {
        let factories = factories();
        let found = |name: &str| factories.iter().any(|f| f.try_create(name, &[]).is_some());
        assert!(found("cd"));
        assert!(found("exit"));
        assert!(!found("ls"));
        assert!(!found("CD"));
    }
}
