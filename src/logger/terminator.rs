/// What happens after a fatal record has been written.
///
/// Production code exits the process; tests install a terminator that
/// records the request instead.
pub trait Terminator: Send + Sync {
    fn terminate(&self, code: i32);
}

/// Exits the process with the given status
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExit;

impl Terminator for ProcessExit {
    fn terminate(&self, code: i32) {
        std::process::exit(code);
    }
}
