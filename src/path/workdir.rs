use std::env;
use std::path::{Component, Path, PathBuf};

use super::PathExpander;

/// The shell's own notion of the current directory. The real process
/// directory is never changed; children are started in this one instead.
#[derive(Debug, Clone)]
pub struct WorkingDirectory {
    current: PathBuf,
    expander: PathExpander,
}

impl WorkingDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            current: path.into(),
            expander: PathExpander::new(),
        }
    }

    pub fn from_process() -> std::io::Result<Self> {
        Ok(Self::new(env::current_dir()?))
    }

    pub fn current(&self) -> &Path {
        &self.current
    }

    pub fn set(&mut self, path: PathBuf) {
        self.current = path;
    }

    /// Resolves `target` against the current directory lexically: `.` is
    /// dropped and `..` pops the last segment (never above `/`).
    pub fn resolve(&self, target: &str) -> PathBuf {
        let expanded = self.expander.expand(target);
        let mut resolved = if expanded.is_absolute() {
            PathBuf::from("/")
        } else {
            self.current.clone()
        };

        for component in expanded.components() {
            match component {
                Component::RootDir | Component::Prefix(_) | Component::CurDir => {}
                Component::ParentDir => {
                    resolved.pop();
                }
                Component::Normal(part) => resolved.push(part),
            }
        }

        resolved
    }

    /// Path handed to the OS for `name`. Paths with a separator and files
    /// present in the current directory resolve against it; other bare names
    /// are left for the `PATH` search.
    pub fn resolve_program(&self, name: &str) -> PathBuf {
        if name.contains('/') || self.expander.is_home_path(name) {
            return self.resolve(name);
        }

        let local = self.current.join(name);
        if local.is_file() {
            local
        } else {
            PathBuf::from(name)
        }
    }

    /// Like `resolve_program`, but only returns paths that exist, searching
    /// `PATH` for bare names.
    pub fn locate_program(&self, name: &str) -> Option<PathBuf> {
        let candidate = self.resolve_program(name);
        if candidate.components().count() > 1 {
            return candidate.is_file().then_some(candidate);
        }

        let path_var = env::var_os("PATH")?;
        env::split_paths(&path_var)
            .map(|dir| dir.join(name))
            .find(|path| path.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_resolve_relative_and_absolute() {
        let cwd = WorkingDirectory::new("/home/user");

        assert_eq!(cwd.resolve("/tmp"), PathBuf::from("/tmp"));
        assert_eq!(cwd.resolve("src"), PathBuf::from("/home/user/src"));
        assert_eq!(cwd.resolve("./src/../docs"), PathBuf::from("/home/user/docs"));
    }

    #[test]
    fn test_parent_pops_last_segment() {
        let cwd = WorkingDirectory::new("/home/user");

        assert_eq!(cwd.resolve(".."), PathBuf::from("/home"));
        assert_eq!(cwd.resolve("../../../.."), PathBuf::from("/"));
    }

    #[test]
    fn test_resolve_program() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("tool"), "#!/bin/sh\n").unwrap();
        let cwd = WorkingDirectory::new(dir.path());

        assert_eq!(cwd.resolve_program("tool"), dir.path().join("tool"));
        assert_eq!(cwd.resolve_program("bin/tool"), dir.path().join("bin/tool"));
        assert_eq!(cwd.resolve_program("/bin/sh"), PathBuf::from("/bin/sh"));
        assert_eq!(cwd.resolve_program("sleep"), PathBuf::from("sleep"));
    }

    #[test]
    fn test_locate_program() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = WorkingDirectory::new(dir.path());

        assert!(cwd.locate_program("sh").is_some());
        assert!(cwd.locate_program("./missing").is_none());
        assert!(cwd.locate_program("definitely-not-a-real-program").is_none());
    }
}
