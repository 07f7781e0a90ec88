//! パス操作の補助

use std::path::{Component, Path, PathBuf};

/// 可能な範囲でパスを正規化する
///
/// まず絶対化し、実体の解決を試みる。対象がまだ存在しないなどで
/// 解決できない場合は、字句的に `.` と `..` を畳み込んだ形に落とす。
pub(crate) fn canonicalize_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    match std::fs::canonicalize(&absolute) {
        Ok(canonical) => canonical,
        Err(_) => lexical_normalize(&absolute),
    }
}

/// 実体を参照せずに `.` と `..` を畳み込む
pub(crate) fn lexical_normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                result.pop();
            }
            other => result.push(other),
        }
    }

    result
}

/// `base` から `path` への相対パスを作る（`..` を許す）
///
/// ルートが異なるなどで相対化できない場合は None。
pub(crate) fn relative_from(path: &Path, base: &Path) -> Option<PathBuf> {
    let path_components: Vec<Component> = path.components().collect();
    let base_components: Vec<Component> = base.components().collect();

    if path_components.first() != base_components.first() {
        return None;
    }

    let mut shared = 0usize;

    while shared < path_components.len()
        && shared < base_components.len()
        && path_components[shared] == base_components[shared]
    {
        shared += 1;
    }

    let mut result = PathBuf::new();

    for _ in shared..base_components.len() {
        result.push("..");
    }

    for component in &path_components[shared..] {
        result.push(component);
    }

    if result.as_os_str().is_empty() {
        result.push(".");
    }

    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexical_normalize() {
        assert_eq!(
            lexical_normalize(Path::new("/a/b/../c/./d")),
            PathBuf::from("/a/c/d")
        );
        assert_eq!(lexical_normalize(Path::new("/a/../../b")), PathBuf::from("/b"));
    }

    #[test]
    fn test_relative_from() {
        assert_eq!(
            relative_from(Path::new("/a/b/c.lay"), Path::new("/a")),
            Some(PathBuf::from("b/c.lay"))
        );
        assert_eq!(
            relative_from(Path::new("/x/c.lay"), Path::new("/a/b")),
            Some(PathBuf::from("../../x/c.lay"))
        );
        assert_eq!(
            relative_from(Path::new("/a"), Path::new("/a")),
            Some(PathBuf::from("."))
        );
    }
}
