//! import ディレクティブの抽出
//!
//! 書き換え後の出力から `import "…"` を探す。文字列リテラルとコメントの
//! 中は対象にならないが、識別子 `import` 自体は文の位置に限らず
//! どこに現れても認識される。

use std::path::{Path, PathBuf};

use crate::lexer::{
    is_identifier_char, is_identifier_start, skip_opaque_span, skip_whitespace_and_comments,
};
use crate::preprocessor::paths::canonicalize_path;

/// テキストから import 先のパスを順に取り出す
///
/// パスリテラル内のエスケープは解釈せず、引用符の間の生のバイト列を
/// そのままパスとして `file_path` のディレクトリから解決する。
pub fn extract_imports(text: &str, file_path: &Path) -> Vec<PathBuf> {
    let bytes = text.as_bytes();
    let size = bytes.len();
    let mut imports = Vec::new();
    let mut pos = 0usize;

    while pos < size {
        if let Some(next) = skip_opaque_span(bytes, pos) {
            pos = next;
            continue;
        }

        if !is_identifier_start(bytes[pos]) {
            pos += 1;
            continue;
        }

        let id_start = pos;

        while pos < size && is_identifier_char(bytes[pos]) {
            pos += 1;
        }

        if &text[id_start..pos] != "import" {
            continue;
        }

        pos = skip_whitespace_and_comments(bytes, pos);

        if pos >= size || bytes[pos] != b'"' {
            continue;
        }

        pos += 1;
        let path_start = pos;

        while pos < size && bytes[pos] != b'"' {
            if bytes[pos] == b'\\' && pos + 1 < size {
                pos += 2;
            } else {
                pos += 1;
            }
        }

        if pos > path_start {
            let imported = &text[path_start..pos];
            let base = file_path.parent().unwrap_or_else(|| Path::new(""));
            imports.push(canonicalize_path(&base.join(imported)));
        }

        if pos < size && bytes[pos] == b'"' {
            pos += 1;
        }
    }

    imports
}
