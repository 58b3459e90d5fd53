mod error;
pub use error::ExecError;

mod util;

mod shell;
pub use shell::ShellExecutor;

mod probe;
pub use probe::ShellProbe;
