use std::fs;
use std::path::Path;

use rvs_index::Index;

use crate::{RepoError, META_DIR};

const CONFIG_CONTENT: &str = "[core]\n\
\trepositoryformatversion = 0\n\
\tfilemode = true\n\
\tbare = false\n\
\tlogallrefupdates = true\n";

const DESCRIPTION_CONTENT: &str =
    "Unnamed repository; edit this file 'description' to name the repository.\n";

/// Initialize a new repository at `path`.
///
/// Creates the metadata directory layout, a symbolic HEAD pointing at `main`,
/// informational `config` and `description` files, and an empty index.
/// Returns `true` if a new repository was created, `false` if one already
/// existed (reinitialization is a no-op).
pub fn init_repository(path: &Path) -> Result<bool, RepoError> {
    let meta = path.join(META_DIR);
    if meta.exists() {
        return Ok(false);
    }

    fs::create_dir_all(&meta)?;
    fs::create_dir_all(meta.join("objects").join("info"))?;
    fs::create_dir_all(meta.join("objects").join("pack"))?;
    fs::create_dir_all(meta.join("refs").join("heads"))?;
    fs::create_dir_all(meta.join("refs").join("tags"))?;
    fs::create_dir_all(meta.join("branches"))?;
    fs::create_dir_all(meta.join("hooks"))?;
    fs::create_dir_all(meta.join("info"))?;

    fs::write(meta.join("HEAD"), "ref: refs/heads/main")?;
    fs::write(meta.join("config"), CONFIG_CONTENT)?;
    fs::write(meta.join("description"), DESCRIPTION_CONTENT)?;

    Index::new().save(&meta.join("index"))?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_expected_layout() {
        let dir = tempfile::tempdir().unwrap();
        assert!(init_repository(dir.path()).unwrap());

        let meta = dir.path().join(META_DIR);
        for sub in [
            "objects/info",
            "objects/pack",
            "refs/heads",
            "refs/tags",
            "branches",
            "hooks",
        ] {
            assert!(meta.join(sub).is_dir(), "missing {sub}");
        }
        assert_eq!(
            fs::read_to_string(meta.join("HEAD")).unwrap(),
            "ref: refs/heads/main"
        );
        assert!(meta.join("config").is_file());
        assert!(meta.join("description").is_file());
        assert!(meta.join("index").is_file());
    }

    #[test]
    fn reinit_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        assert!(init_repository(dir.path()).unwrap());
        fs::write(dir.path().join(META_DIR).join("HEAD"), "ref: refs/heads/other").unwrap();

        assert!(!init_repository(dir.path()).unwrap());
        // Existing state untouched.
        assert_eq!(
            fs::read_to_string(dir.path().join(META_DIR).join("HEAD")).unwrap(),
            "ref: refs/heads/other"
        );
    }
}
