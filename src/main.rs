use launchpad::command::{Arguments, Command, Options};
use launchpad::env::Environment;
use std::sync::Arc;

/// Greets someone
struct Greet;

impl Command for Greet {
    fn invoke(
        &self,
        env: &dyn Environment,
        arguments: &Arguments,
        options: &Options,
    ) -> anyhow::Result<()> {
        let name = arguments.get("name").unwrap_or("world");
        let mut greeting = format!("Hello {name}");
        if options.contains("shout") {
            greeting = greeting.to_uppercase();
        }

        env.output().write(&format!("{greeting}\n"))?;
        Ok(())
    }

    fn identifier(&self) -> String {
        "greet [name] -s|--shout\n\nGreet someone".to_string()
    }
}

/// Prints the value of a variable, `.env` file included
struct Variable;

impl Command for Variable {
    fn invoke(&self, env: &dyn Environment, arguments: &Arguments, _: &Options) -> anyhow::Result<()> {
        let name = arguments
            .get("name")
            .ok_or_else(|| anyhow::anyhow!("missing variable name"))?;
        let variables = env.variables()?;
        let value = variables
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("variable '{name}' is not set"))?;

        env.output().write(&format!("{value}\n"))?;
        Ok(())
    }

    fn identifier(&self) -> String {
        "variable name\n\nPrint the value of a variable".to_string()
    }
}

/// Describes the running program
struct About;

impl Command for About {
    fn invoke(&self, env: &dyn Environment, _: &Arguments, _: &Options) -> anyhow::Result<()> {
        env.output().write(&format!(
            "{} {} running from {}\n",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            env.working_directory().display()
        ))?;
        Ok(())
    }

    fn identifier(&self) -> String {
        "about".to_string()
    }
}

fn main() {
    launchpad::main(|app| {
        app.with_config_at(".")
            .use_resilient_operating_system()
            .with_commands(|_, _, _| {
                Ok(vec![
                    Box::new(Greet) as Box<dyn Command>,
                    Box::new(Variable) as Box<dyn Command>,
                ])
            })
            .with_service("command.about", |_, _, _| {
                Ok(Arc::new(About) as Arc<dyn Command>)
            })
            .with_deferred_command("command.about")
    })
}
