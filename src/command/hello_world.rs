use super::{Arguments, Command, Options};
use crate::env::Environment;

/// Command run when an application registers no command at all
#[derive(Debug, Clone, Copy, Default)]
pub struct HelloWorld;

impl Command for HelloWorld {
    fn invoke(&self, env: &dyn Environment, _: &Arguments, _: &Options) -> anyhow::Result<()> {
        env.output().write("Hello world\n")?;
        Ok(())
    }

    fn identifier(&self) -> String {
        "hello-world".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MockEnvironment;

    #[test]
    fn test_greets_the_world() {
        let env = MockEnvironment::new();

        HelloWorld
            .invoke(&env, &Arguments::new(), &Options::new())
            .unwrap();

        assert_eq!(env.output_contents(), "Hello world\n");
        assert_eq!(env.error_contents(), "");
    }
}
