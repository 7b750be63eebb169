//! Usage patterns describing what a command accepts
//!
//! The first line of a command identifier is its usage pattern, any following lines
//! describe it:
//!
//! ```text
//! greet name [greeting] ...rest -s|--shout --times=
//!
//! Greet someone
//! ```
//!
//! - `name` is a required argument, `[name]` an optional one
//! - `...name` collects every remaining argument and must come last
//! - `--name` is a flag, `--name=` an option expecting a value
//! - `-s|--name` adds a short alias, options may be wrapped in brackets
//!
//! Patterns compile to a [`clap::Command`], which does the actual parsing.

use super::input::{Arguments, Options};
use clap::{Arg, ArgAction, ArgMatches};
use std::collections::HashSet;
use thiserror::Error;

/// Malformed usage patterns
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    #[error("empty command identifier")]
    Empty,

    #[error("invalid token '{token}' in usage '{usage}'")]
    InvalidToken { usage: String, token: String },

    #[error("argument '{name}' cannot follow optional or variadic arguments in usage '{usage}'")]
    Misplaced { usage: String, name: String },

    #[error("'{name}' is declared more than once in usage '{usage}'")]
    Duplicate { usage: String, name: String },
}

/// Positional argument declared by a usage pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentSpec {
    Required(String),
    Optional(String),
    Pack(String),
}

impl ArgumentSpec {
    pub fn name(&self) -> &str {
        match self {
            Self::Required(name) | Self::Optional(name) | Self::Pack(name) => name,
        }
    }
}

/// Option declared by a usage pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    pub name: String,
    pub short: Option<char>,
    pub takes_value: bool,
}

enum Token {
    Argument(ArgumentSpec),
    Option(OptionSpec),
}

/// Parsed usage pattern of a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Usage {
    name: String,
    description: Option<String>,
    arguments: Vec<ArgumentSpec>,
    options: Vec<OptionSpec>,
}

impl Usage {
    pub fn parse(identifier: &str) -> Result<Self, UsageError> {
        let mut lines = identifier.lines();
        let pattern = lines
            .next()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .ok_or(UsageError::Empty)?;
        let description = lines.collect::<Vec<_>>().join("\n").trim().to_string();

        let invalid = |token: &str| UsageError::InvalidToken {
            usage: pattern.to_string(),
            token: token.to_string(),
        };

        let mut tokens = pattern.split_whitespace();
        let name = tokens.next().ok_or(UsageError::Empty)?;
        if !is_valid_name(name) {
            return Err(invalid(name));
        }

        let mut usage = Self {
            name: name.to_string(),
            description: (!description.is_empty()).then_some(description),
            arguments: Vec::new(),
            options: Vec::new(),
        };
        let mut declared = HashSet::new();
        let mut shorts = HashSet::new();

        for raw in tokens {
            let token = parse_token(raw).ok_or_else(|| invalid(raw))?;
            let declared_name = match &token {
                Token::Argument(argument) => argument.name().to_string(),
                Token::Option(option) => option.name.clone(),
            };
            if !declared.insert(declared_name.clone()) {
                return Err(UsageError::Duplicate {
                    usage: pattern.to_string(),
                    name: declared_name,
                });
            }

            match token {
                Token::Argument(argument) => {
                    usage.check_position(&argument, pattern)?;
                    usage.arguments.push(argument);
                }
                Token::Option(option) => {
                    if let Some(short) = option.short.filter(|short| !shorts.insert(*short)) {
                        return Err(UsageError::Duplicate {
                            usage: pattern.to_string(),
                            name: format!("-{short}"),
                        });
                    }
                    usage.options.push(option);
                }
            }
        }

        Ok(usage)
    }

    fn check_position(&self, argument: &ArgumentSpec, pattern: &str) -> Result<(), UsageError> {
        let misplaced = match self.arguments.last() {
            Some(ArgumentSpec::Pack(_)) => true,
            Some(ArgumentSpec::Optional(_)) => matches!(argument, ArgumentSpec::Required(_)),
            _ => false,
        };

        if misplaced {
            return Err(UsageError::Misplaced {
                usage: pattern.to_string(),
                name: argument.name().to_string(),
            });
        }

        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn arguments(&self) -> &[ArgumentSpec] {
        &self.arguments
    }

    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    /// Parser definition of this usage
    pub fn to_clap(&self) -> clap::Command {
        let mut command = clap::Command::new(self.name.clone())
            .disable_help_flag(true)
            .disable_version_flag(true);
        if let Some(description) = &self.description {
            command = command.about(description.clone());
        }

        for (position, argument) in self.arguments.iter().enumerate() {
            let arg = match argument {
                ArgumentSpec::Required(name) => Arg::new(name.clone()).required(true),
                ArgumentSpec::Optional(name) => Arg::new(name.clone()).required(false),
                ArgumentSpec::Pack(name) => Arg::new(name.clone())
                    .required(false)
                    .num_args(1..)
                    .action(ArgAction::Append),
            };
            command = command.arg(arg.index(position + 1));
        }

        for option in &self.options {
            let mut arg = Arg::new(option.name.clone()).long(option.name.clone());
            if let Some(short) = option.short {
                arg = arg.short(short);
            }
            arg = if option.takes_value {
                arg.action(ArgAction::Set).num_args(1)
            } else {
                arg.action(ArgAction::SetTrue)
            };
            command = command.arg(arg);
        }

        command
    }

    /// Arguments and options matched by the parser built by [`Usage::to_clap`]
    pub fn extract(&self, matches: &ArgMatches) -> (Arguments, Options) {
        let mut arguments = Arguments::new();
        for argument in &self.arguments {
            match argument {
                ArgumentSpec::Required(name) | ArgumentSpec::Optional(name) => {
                    if let Some(value) = matches.get_one::<String>(name) {
                        arguments = arguments.with(name.clone(), value.clone());
                    }
                }
                ArgumentSpec::Pack(name) => {
                    arguments = arguments
                        .with_pack(matches.get_many::<String>(name).into_iter().flatten().cloned());
                }
            }
        }

        let mut options = Options::new();
        for option in &self.options {
            if option.takes_value {
                if let Some(value) = matches.get_one::<String>(&option.name) {
                    options = options.with_value(option.name.clone(), value.clone());
                }
            } else if matches.get_flag(&option.name) {
                options = options.with_flag(option.name.clone());
            }
        }

        (arguments, options)
    }
}

fn parse_token(token: &str) -> Option<Token> {
    if let Some(name) = token.strip_prefix("...") {
        return is_valid_name(name).then(|| Token::Argument(ArgumentSpec::Pack(name.to_string())));
    }

    if let Some(inner) = token.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
        if inner.starts_with('-') {
            return parse_option(inner).map(Token::Option);
        }

        return is_valid_name(inner)
            .then(|| Token::Argument(ArgumentSpec::Optional(inner.to_string())));
    }

    if token.starts_with('-') {
        return parse_option(token).map(Token::Option);
    }

    is_valid_name(token).then(|| Token::Argument(ArgumentSpec::Required(token.to_string())))
}

fn parse_option(token: &str) -> Option<OptionSpec> {
    let (short, long) = match token.split_once('|') {
        Some((short, long)) => (Some(short), long),
        None => (None, token),
    };

    let short = match short {
        Some(short) => {
            let mut chars = short.strip_prefix('-')?.chars();
            let short = chars.next().filter(char::is_ascii_alphanumeric)?;
            if chars.next().is_some() {
                return None;
            }
            Some(short)
        }
        None => None,
    };

    let long = long.strip_prefix("--")?;
    let (name, takes_value) = match long.strip_suffix('=') {
        Some(name) => (name, true),
        None => (long, false),
    };

    is_valid_name(name).then(|| OptionSpec {
        name: name.to_string(),
        short,
        takes_value,
    })
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|first| first.is_ascii_alphanumeric())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':')
}
