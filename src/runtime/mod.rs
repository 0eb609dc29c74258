/// Interactive runtime - Gateway

mod shell;

pub use shell::run_shell;
