pub mod error;
pub mod flags;
pub mod shell;

pub mod core;
pub mod highlight;
pub mod history;
pub mod parser;
pub mod path;
pub mod process;
