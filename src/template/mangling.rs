//! 特殊化の名前マングリング
//!
//! 使用箇所の引数トークンを識別子として安全な断片へ写し、スコープの
//! トークンと合わせて特殊化のシグネチャ（重複排除キー）と名前を作る。

/// 区切りの `_` を重ねずに追加する
fn push_sep(result: &mut String) {
    if !result.is_empty() && !result.ends_with('_') {
        result.push('_');
    }
}

/// 引数トークンを識別子安全な断片へ変換する
///
/// `*` は `ptr`、`&` は `ref`、角括弧は `arr`、山括弧は `lt`/`gt` に写す。
/// `.` はいったん保持して最後にまとめて `_` へ置き換える。
/// 先頭の `_` は1つ剥がし、数字で始まる場合は `_` を前置する。
/// 空になったら `T`。
pub fn sanitize_token(token: &str) -> String {
    let mut result = String::with_capacity(token.len() + 8);

    for c in token.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            result.push(c);
        } else if c == '*' {
            push_sep(&mut result);
            result.push_str("ptr");
            push_sep(&mut result);
        } else if c == '&' {
            push_sep(&mut result);
            result.push_str("ref");
            push_sep(&mut result);
        } else if c == '[' || c == ']' {
            push_sep(&mut result);
            result.push_str("arr");
            push_sep(&mut result);
        } else if c == '<' {
            push_sep(&mut result);
            result.push_str("lt");
            push_sep(&mut result);
        } else if c == '>' {
            push_sep(&mut result);
            result.push_str("gt");
            push_sep(&mut result);
        } else if c == '.' {
            push_sep(&mut result);
            result.push('.');
            push_sep(&mut result);
        } else {
            // `:`、`,`、空白、その他の記号は区切りに潰す
            push_sep(&mut result);
        }
    }

    if result.starts_with('_') {
        result.remove(0);
    }

    if result.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        result.insert(0, '_');
    }

    if result.is_empty() {
        result.push('T');
    }

    result.replace('.', "_")
}

/// スコープパスを識別子安全な形へ変換する（`.` や記号を `_` に）
pub fn sanitize_scope_name(path: &str) -> String {
    path.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// 引数タプルからシグネチャ本体を作る
pub fn make_signature(args: &[String]) -> String {
    args.join("\u{1f}")
}
