mod expander;
mod workdir;

pub use expander::PathExpander;
pub use workdir::WorkingDirectory;
