//! Path utilities for rendering package locations.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

/// Normalize a path by resolving . and .. components lexically
pub fn normalize_path(path: &Utf8Path) -> Utf8PathBuf {
    let mut components: Vec<Utf8Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Utf8Component::CurDir => {
                // Skip current directory
            },
            Utf8Component::ParentDir => match components.last() {
                Some(Utf8Component::Normal(_)) => {
                    components.pop();
                },
                // `..` directly under the root stays at the root
                Some(Utf8Component::RootDir) | Some(Utf8Component::Prefix(_)) => {},
                _ => components.push(component),
            },
            other => components.push(other),
        }
    }

    components.iter().collect()
}

/// Render `dir` relative to `base` the way a user would type it:
/// `./pkg` inside `base`, `../pkg` outside it, `.` for `base` itself.
/// Falls back to the normalized absolute path when no relative form exists.
pub fn relative_location(dir: &Utf8Path, base: &Utf8Path) -> String {
    let dir = normalize_path(dir);
    let base = normalize_path(base);

    let Some(relative) = pathdiff::diff_paths(dir.as_std_path(), base.as_std_path()) else {
        return dir.to_string();
    };
    let Some(relative) = Utf8PathBuf::from_path_buf(relative).ok() else {
        return dir.to_string();
    };

    if relative.as_str().is_empty() {
        ".".to_string()
    } else if relative.starts_with("..") {
        relative.to_string()
    } else {
        format!("./{}", relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        let path = Utf8Path::new("./src/../lib/./file.rs");
        assert_eq!(normalize_path(path), Utf8Path::new("lib/file.rs"));

        let path = Utf8Path::new("/../app/./node_modules/../package.json");
        assert_eq!(normalize_path(path), Utf8Path::new("/app/package.json"));

        let path = Utf8Path::new("../outside");
        assert_eq!(normalize_path(path), Utf8Path::new("../outside"));
    }

    #[test]
    fn test_relative_location_inside_base() {
        let location = relative_location(Utf8Path::new("/work/test-app"), Utf8Path::new("/work"));
        assert_eq!(location, "./test-app");
    }

    #[test]
    fn test_relative_location_outside_base() {
        let location =
            relative_location(Utf8Path::new("/tmp/linked/foo"), Utf8Path::new("/work/app"));
        assert_eq!(location, "../../tmp/linked/foo");
    }

    #[test]
    fn test_relative_location_same_dir() {
        let location = relative_location(Utf8Path::new("/work/app/"), Utf8Path::new("/work/app"));
        assert_eq!(location, ".");
    }
}
