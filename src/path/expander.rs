use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct PathExpander;

impl PathExpander {
    pub fn new() -> Self {
        Self
    }

    /// Expands a leading `~` or `~/` to the home directory. `~user` forms and
    /// paths without a tilde are returned unchanged, as is everything when no
    /// home directory is known.
    pub fn expand(&self, path: &str) -> PathBuf {
        if !self.is_home_path(path) {
            return Path::new(path).to_path_buf();
        }

        let rest = &path[1..];
        if !rest.is_empty() && !rest.starts_with('/') {
            return Path::new(path).to_path_buf();
        }

        match dirs::home_dir() {
            Some(mut home_path) => {
                for part in rest.split('/').filter(|part| !part.is_empty()) {
                    home_path.push(part);
                }
                home_path
            }
            None => Path::new(path).to_path_buf(),
        }
    }

    pub fn is_home_path(&self, path: &str) -> bool {
        path.starts_with('~')
    }
}
