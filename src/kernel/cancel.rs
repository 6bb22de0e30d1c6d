/// Session generation captured by every asynchronous request.
///
/// A continuation whose generation differs from the engine's current one is a
/// no-op. This replaces true task cancellation: in-flight work is never aborted,
/// only ignored when it comes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(pub u64);

#[derive(Debug, Default)]
pub struct GenerationCounter {
    current: Generation,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Generation {
        self.current
    }

    /// Invalidates everything issued so far. Called on seek, pause, stop and teardown.
    pub fn bump(&mut self) -> Generation {
        self.current = Generation(self.current.0 + 1);
        self.current
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.current == generation
    }
}
