use std::path::{Component, Path, PathBuf};

/// Collapse `.` and `..` components without consulting the filesystem.
///
/// Symlinks are never followed. A `..` directly below the root is dropped, while leading
/// `..` components of a relative path are kept.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }

    normalized
}

/// Anchor `path` at `base` when it is relative, then normalise the result.
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_lexically(path)
    } else {
        normalize_lexically(&base.join(path))
    }
}

/// Returns `true` when a relative path climbs above its starting directory.
pub fn escapes_root(relative: &Path) -> bool {
    if relative.is_absolute() {
        return true;
    }

    let mut depth = 0usize;
    for component in relative.components() {
        match component {
            Component::ParentDir => {
                if depth == 0 {
                    return true;
                }
                depth -= 1;
            }
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => return true,
        }
    }

    false
}

/// Deepest directory containing every provided path.
///
/// Paths are expected to be normalised and absolute. Returns `None` for an empty input or
/// when the paths share no root (e.g. different drive prefixes).
pub fn common_ancestor<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Option<PathBuf> {
    let mut iter = paths.into_iter();
    let first = iter.next()?;
    let mut shared: Vec<Component<'a>> = first.components().collect();

    for path in iter {
        let matching = shared
            .iter()
            .zip(path.components())
            .take_while(|(left, right)| **left == *right)
            .count();
        shared.truncate(matching);
    }

    if shared.is_empty() {
        return None;
    }

    Some(shared.iter().map(|component| component.as_os_str()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_current_and_parent_components() {
        assert_eq!(
            normalize_lexically(Path::new("/site/./static/css/../img/logo.png")),
            PathBuf::from("/site/static/img/logo.png")
        );
    }

    #[test]
    fn keeps_leading_parent_components_of_relative_paths() {
        assert_eq!(
            normalize_lexically(Path::new("../../img/./logo.png")),
            PathBuf::from("../../img/logo.png")
        );
    }

    #[test]
    fn cannot_climb_above_the_filesystem_root() {
        assert_eq!(normalize_lexically(Path::new("/../etc")), PathBuf::from("/etc"));
    }

    #[test]
    fn absolutize_leaves_absolute_paths_alone() {
        assert_eq!(
            absolutize(Path::new("/srv/app/css"), Path::new("/home/me")),
            PathBuf::from("/srv/app/css")
        );
        assert_eq!(
            absolutize(Path::new("static/../css"), Path::new("/home/me")),
            PathBuf::from("/home/me/css")
        );
    }

    #[test]
    fn detects_traversal_outside_the_start() {
        assert!(!escapes_root(Path::new("icons/../logo.png")));
        assert!(escapes_root(Path::new("icons/../../secret.txt")));
        assert!(escapes_root(Path::new("../logo.png")));
    }

    #[test]
    fn finds_deepest_shared_directory() {
        let css = PathBuf::from("/p/kharcha/static/css");
        let img = PathBuf::from("/p/kharcha/static/img");
        let js = PathBuf::from("/p/kharcha/static/js");
        let ancestor = common_ancestor([css.as_path(), img.as_path(), js.as_path()]);
        assert_eq!(ancestor, Some(PathBuf::from("/p/kharcha/static")));
    }

    #[test]
    fn nested_directory_is_its_own_ancestor() {
        let css = PathBuf::from("/p/static");
        let fonts = PathBuf::from("/p/static/fonts");
        assert_eq!(
            common_ancestor([css.as_path(), fonts.as_path()]),
            Some(PathBuf::from("/p/static"))
        );
    }

    #[test]
    fn empty_input_has_no_ancestor() {
        assert_eq!(common_ancestor(std::iter::empty::<&Path>()), None);
    }
}
