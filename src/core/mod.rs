pub mod commands;
pub mod config;
mod interpreter;
mod session;

pub use interpreter::Interpreter;
pub use session::Session;
