use super::Profiler;
use crate::command::{Arguments, Command, Options};
use crate::env::Environment;

/// Command recording a profile of every invocation of the command it wraps
pub struct ProfiledCommand {
    profiler: Profiler,
    inner: Box<dyn Command>,
}

impl ProfiledCommand {
    pub fn new(profiler: Profiler, inner: Box<dyn Command>) -> Self {
        Self { profiler, inner }
    }
}

impl std::fmt::Debug for ProfiledCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfiledCommand")
            .field("command", &self.inner.identifier())
            .finish()
    }
}

impl Command for ProfiledCommand {
    fn invoke(
        &self,
        env: &dyn Environment,
        arguments: &Arguments,
        options: &Options,
    ) -> anyhow::Result<()> {
        let id = self.profiler.start(self.inner.identifier());
        let outcome = self.inner.invoke(env, arguments, options);

        if let Some(profile) = self.profiler.finish(id, &outcome) {
            self.profiler.flush_best_effort(&profile);
        }

        outcome
    }

    fn identifier(&self) -> String {
        self.inner.identifier()
    }
}
