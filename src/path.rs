use nix::unistd::{access, AccessFlags};
use std::env;
use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

/// Name of the search-path environment variable.
pub const PATH_VAR: &str = "PATH";

/// Resolves a program token against the current `PATH`.
pub fn resolve(program: &str) -> PathBuf {
    resolve_in(program, env::var_os(PATH_VAR).as_deref())
}

/// Resolves a program token against an explicit colon-separated search list.
///
/// A token holding a `/` is an explicit path and comes back untouched, as
/// does a bare name when `search_path` is `None` or no directory holds an
/// executable file of that name. Directories are tried in listed order;
/// empty entries are skipped.
pub fn resolve_in(program: &str, search_path: Option<&OsStr>) -> PathBuf {
    if program.contains('/') {
        return PathBuf::from(program);
    }
    let Some(search_path) = search_path else {
        return PathBuf::from(program);
    };

    search_path
        .as_bytes()
        .split(|&b| b == b':')
        .filter(|dir| !dir.is_empty())
        .map(|dir| Path::new(OsStr::from_bytes(dir)).join(program))
        .find(|candidate| is_executable_file(candidate))
        .unwrap_or_else(|| {
            log::debug!("{} not found on {}", program, PATH_VAR);
            PathBuf::from(program)
        })
}

/// Whether a [`resolve_in`] result is a bare name that no search-path
/// directory held. Such a name must not reach `execv`, which would look it up
/// relative to the working directory.
pub fn is_unresolved(resolved: &Path) -> bool {
    !resolved.as_os_str().as_bytes().contains(&b'/')
}

fn is_executable_file(path: &Path) -> bool {
    path.is_file() && access(path, AccessFlags::X_OK).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::fs::{self, File};
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, mode: u32) -> PathBuf {
        let path = dir.join(name);
        File::create(&path).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    fn join(dirs: &[&Path]) -> OsString {
        let mut search = OsString::new();
        for (i, dir) in dirs.iter().enumerate() {
            if i > 0 {
                search.push(":");
            }
            search.push(dir);
        }
        search
    }

    #[test]
    fn explicit_path_is_never_searched() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "tool", 0o755);
        let search = join(&[dir.path()]);

        assert_eq!(resolve_in("./tool", Some(&search)), PathBuf::from("./tool"));
        assert_eq!(resolve_in("sub/tool", Some(&search)), PathBuf::from("sub/tool"));
        assert_eq!(resolve_in("/bin/tool", Some(&search)), PathBuf::from("/bin/tool"));
    }

    #[test]
    fn first_directory_in_order_wins() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        touch(first.path(), "tool", 0o755);
        touch(second.path(), "tool", 0o755);
        let search = join(&[first.path(), second.path()]);

        assert_eq!(resolve_in("tool", Some(&search)), first.path().join("tool"));
    }

    #[test]
    fn non_executable_and_directories_are_skipped() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let third = TempDir::new().unwrap();
        touch(first.path(), "tool", 0o644);
        fs::create_dir(second.path().join("tool")).unwrap();
        touch(third.path(), "tool", 0o700);
        let search = join(&[first.path(), second.path(), third.path()]);

        assert_eq!(resolve_in("tool", Some(&search)), third.path().join("tool"));
    }

    #[test]
    fn empty_entries_are_ignored() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "tool", 0o755);
        let mut search = OsString::from("::");
        search.push(dir.path());
        search.push(":");

        assert_eq!(resolve_in("tool", Some(&search)), dir.path().join("tool"));
    }

    #[test]
    fn unresolved_name_comes_back_unchanged() {
        let dir = TempDir::new().unwrap();
        let search = join(&[dir.path()]);

        assert_eq!(resolve_in("tool", Some(&search)), PathBuf::from("tool"));
        assert_eq!(resolve_in("tool", None), PathBuf::from("tool"));
    }

    #[test]
    fn only_bare_results_count_as_unresolved() {
        let dir = TempDir::new().unwrap();
        let found = touch(dir.path(), "tool", 0o755);
        let search = join(&[dir.path()]);

        assert!(!is_unresolved(&resolve_in("tool", Some(&search))));
        assert!(!is_unresolved(&found));
        assert!(!is_unresolved(&resolve_in("./missing", Some(&search))));
        assert!(is_unresolved(&resolve_in("missing", Some(&search))));
        assert!(is_unresolved(&resolve_in("tool", None)));
    }
}
