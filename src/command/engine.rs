use super::usage::{Usage, UsageError};
use super::Command;
use crate::env::{Environment, ExitCode};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

enum Failure {
    Definition(String),
    Usage(String),
    Command(anyhow::Error),
}

impl Failure {
    fn exit_code(&self) -> ExitCode {
        match self {
            Self::Usage(_) => ExitCode::USAGE,
            Self::Definition(_) | Self::Command(_) => ExitCode::FAILURE,
        }
    }

    fn message(&self) -> String {
        let message = match self {
            Self::Definition(message) | Self::Usage(message) => message.clone(),
            Self::Command(e) => format!("Error: {e:#}"),
        };

        if message.ends_with('\n') {
            message
        } else {
            format!("{message}\n")
        }
    }
}

impl From<UsageError> for Failure {
    fn from(error: UsageError) -> Self {
        Self::Definition(format!("Error: {error}"))
    }
}

/// Runs one command out of a list, selected by the program arguments
///
/// With a single command its name is optional on the command line; with several, the
/// first argument names the command to run.
pub struct Commands {
    commands: Vec<Box<dyn Command>>,
}

impl Commands {
    pub fn new(commands: Vec<Box<dyn Command>>) -> Self {
        Self { commands }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Run the selected command and record the outcome with [`Environment::exit`]
    ///
    /// A command that succeeded after recording a failure code itself keeps that code.
    pub fn run(&self, env: &dyn Environment) {
        let code = match self.dispatch(env) {
            Ok(()) if !env.exit_code().is_successful() => return,
            Ok(()) => ExitCode::SUCCESS,
            Err(failure) => {
                if let Err(e) = env.error().write(&failure.message()) {
                    warn!("Failed to report command failure: {e}");
                }
                failure.exit_code()
            }
        };

        env.exit(code.to_int());
    }

    fn dispatch(&self, env: &dyn Environment) -> Result<(), Failure> {
        let usages = self
            .commands
            .iter()
            .map(|command| Usage::parse(&command.identifier()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut names = HashSet::new();
        if let Some(duplicate) = usages.iter().find(|usage| !names.insert(usage.name())) {
            return Err(Failure::Definition(format!(
                "Error: command '{}' is defined more than once",
                duplicate.name()
            )));
        }

        let program = env.arguments();
        let mut arguments: Vec<String> = program.iter().skip(1).cloned().collect();

        let (index, matches) = match usages.as_slice() {
            [] => return Err(Failure::Definition("Error: no command to run".to_string())),
            [usage] => {
                if arguments.first().map(String::as_str) == Some(usage.name()) {
                    arguments.remove(0);
                }
                let matches = usage
                    .to_clap()
                    .no_binary_name(true)
                    .try_get_matches_from(arguments)
                    .map_err(|e| Failure::Usage(e.render().to_string()))?;
                (0, matches)
            }
            _ => {
                let matches = clap::Command::new(program_name(program.first()))
                    .no_binary_name(true)
                    .subcommand_required(true)
                    .disable_help_subcommand(true)
                    .disable_help_flag(true)
                    .disable_version_flag(true)
                    .subcommands(usages.iter().map(Usage::to_clap))
                    .try_get_matches_from(arguments)
                    .map_err(|e| Failure::Usage(e.render().to_string()))?;
                let (name, selected) = matches
                    .subcommand()
                    .ok_or_else(|| Failure::Usage("Error: no command given\n".to_string()))?;
                let index = usages
                    .iter()
                    .position(|usage| usage.name() == name)
                    .ok_or_else(|| Failure::Usage(format!("Error: unknown command '{name}'")))?;
                (index, selected.clone())
            }
        };

        let usage = &usages[index];
        let (arguments, options) = usage.extract(&matches);
        debug!("Running command '{}'", usage.name());

        self.commands[index]
            .invoke(env, &arguments, &options)
            .map_err(Failure::Command)
    }
}

impl std::fmt::Debug for Commands {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Commands")
            .field("count", &self.commands.len())
            .finish()
    }
}

fn program_name(argument: Option<&String>) -> String {
    argument
        .and_then(|path| Path::new(path).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "app".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Arguments, HelloWorld, Options};
    use crate::env::MockEnvironment;

    struct Echo;

    impl Command for Echo {
        fn invoke(
            &self,
            env: &dyn Environment,
            arguments: &Arguments,
            options: &Options,
        ) -> anyhow::Result<()> {
            let mut line = arguments.get("word").unwrap_or("nothing").to_string();
            if options.contains("loud") {
                line = line.to_uppercase();
            }
            env.output().write(&format!("{line}\n"))?;
            Ok(())
        }

        fn identifier(&self) -> String {
            "echo [word] --loud".to_string()
        }
    }

    struct Fail;

    impl Command for Fail {
        fn invoke(&self, _: &dyn Environment, _: &Arguments, _: &Options) -> anyhow::Result<()> {
            anyhow::bail!("boom")
        }

        fn identifier(&self) -> String {
            "fail".to_string()
        }
    }

    fn run(commands: Vec<Box<dyn Command>>, arguments: &[&str]) -> MockEnvironment {
        let env = MockEnvironment::new().with_arguments(arguments.iter().copied());
        Commands::new(commands).run(&env);
        env
    }

    #[test]
    fn test_single_command_runs_without_name() {
        let env = run(vec![Box::new(Echo)], &["bin", "hi", "--loud"]);

        assert_eq!(env.output_contents(), "HI\n");
        assert_eq!(env.exits(), vec![0]);
    }

    #[test]
    fn test_single_command_accepts_its_name() {
        let env = run(vec![Box::new(Echo)], &["bin", "echo", "hi"]);

        assert_eq!(env.output_contents(), "hi\n");
        assert_eq!(env.exits(), vec![0]);
    }

    #[test]
    fn test_several_commands_are_dispatched_by_name() {
        let env = run(
            vec![Box::new(HelloWorld), Box::new(Echo)],
            &["bin", "echo", "there"],
        );

        assert_eq!(env.output_contents(), "there\n");
        assert_eq!(env.exits(), vec![0]);
    }

    #[test]
    fn test_command_errors_exit_with_failure() {
        let env = run(vec![Box::new(Fail)], &["bin"]);

        assert_eq!(env.error_contents(), "Error: boom\n");
        assert_eq!(env.exits(), vec![1]);
    }

    #[test]
    fn test_usage_errors_exit_with_usage_code() {
        let env = run(vec![Box::new(Echo)], &["bin", "a", "b"]);

        assert_eq!(env.output_contents(), "");
        assert!(!env.error_contents().is_empty());
        assert_eq!(env.exits(), vec![64]);
    }

    #[test]
    fn test_missing_command_name_is_a_usage_error() {
        let env = run(vec![Box::new(HelloWorld), Box::new(Echo)], &["bin"]);

        assert_eq!(env.exits(), vec![64]);
    }

    #[test]
    fn test_duplicate_command_names_fail() {
        let env = run(vec![Box::new(Echo), Box::new(Echo)], &["bin", "echo"]);

        assert!(env.error_contents().contains("more than once"));
        assert_eq!(env.exits(), vec![1]);
    }

    #[test]
    fn test_failure_code_recorded_by_command_is_kept() {
        struct Partial;

        impl Command for Partial {
            fn invoke(&self, env: &dyn Environment, _: &Arguments, _: &Options) -> anyhow::Result<()> {
                env.exit(3);
                Ok(())
            }

            fn identifier(&self) -> String {
                "partial".to_string()
            }
        }

        let env = run(vec![Box::new(Partial)], &["bin"]);

        assert_eq!(env.exits(), vec![3]);
    }
}
