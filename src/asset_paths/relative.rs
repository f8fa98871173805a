use std::path::{Component, Path, PathBuf};

/// Compute the path that leads from `from_dir` to `target`, climbing with `..` as needed.
///
/// Both inputs must be absolute and lexically normalised. Returns `None` when they do not
/// share a root, which only happens across Windows drive prefixes.
pub fn relative_path_from(from_dir: &Path, target: &Path) -> Option<PathBuf> {
    let from: Vec<Component> = from_dir.components().collect();
    let to: Vec<Component> = target.components().collect();

    if from.first() != to.first() {
        return None;
    }

    let shared = from
        .iter()
        .zip(to.iter())
        .take_while(|(left, right)| left == right)
        .count();

    let mut relative = PathBuf::new();
    for _ in shared..from.len() {
        relative.push("..");
    }
    for component in &to[shared..] {
        relative.push(component.as_os_str());
    }

    Some(relative)
}

/// Render a relative path with forward slashes, regardless of the host separator.
pub fn to_url_path(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
