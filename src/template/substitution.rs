//! パラメータ名の字句的な置換
//!
//! パラメータ名を識別子境界で検索してテキストのまま置き換える。
//! 宣言・式・さらに内側のテンプレートなど、どんな文脈の出現も対象になる。

use crate::lexer::{evaluate_bracket_expressions, find_identifier, is_identifier_char};

use super::types::{ParameterKind, TemplateDefinition, TemplateParameter};

/// 各パラメータ名の識別子境界での出現を対応する引数に置き換える
///
/// パラメータと引数の数が合わない場合はテキストを変えない。
pub fn replace_parameters(text: &str, params: &[TemplateParameter], args: &[String]) -> String {
    if params.len() != args.len() {
        return text.to_string();
    }

    let mut result = text.to_string();

    for (param, replacement) in params.iter().zip(args) {
        let mut pos = 0;

        while let Some(found) = find_identifier(&result, &param.name, pos) {
            result.replace_range(found..found + param.name.len(), replacement);
            pos = found + replacement.len();
        }
    }

    result
}

/// プレースホルダ用に本体からジェネリック性を消す
///
/// 型パラメータは `void*` に置き換える。ただし出現の直後（空白と
/// `const`/`volatile` 修飾子の並びを挟んで）に `*` が続く場合は `void` に
/// して、元の `*` と合わせて `void*` になるようにする。
/// 非型パラメータはリテラル `1` に置き換え、最後に角括弧を畳み込む。
pub fn convert_template_body_placeholder(def: &TemplateDefinition) -> String {
    let mut result = def.body.clone();

    for param in &def.parameters {
        let mut search_pos = 0;

        while search_pos < result.len() {
            let found = match find_identifier(&result, &param.name, search_pos) {
                Some(found) => found,
                None => break,
            };

            match param.kind {
                ParameterKind::Type => {
                    let bytes = result.as_bytes();
                    let mut lookahead = found + param.name.len();

                    lookahead = skip_spaces(bytes, lookahead);
                    lookahead = skip_qualifiers(bytes, lookahead);

                    let pointer_check = skip_spaces(bytes, lookahead);
                    let pointer_after =
                        pointer_check < bytes.len() && bytes[pointer_check] == b'*';

                    let replacement = if pointer_after { "void" } else { "void*" };
                    result.replace_range(found..found + param.name.len(), replacement);
                    search_pos = found + replacement.len();
                }
                ParameterKind::NonType => {
                    result.replace_range(found..found + param.name.len(), "1");
                    search_pos = found + 1;
                }
            }
        }
    }

    evaluate_bracket_expressions(&mut result);
    result
}

fn skip_spaces(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }

    pos
}

/// `const`/`volatile` 修飾子の並びを読み飛ばす
fn skip_qualifiers(bytes: &[u8], mut pos: usize) -> usize {
    loop {
        let mut advanced = false;

        if bytes[pos..].starts_with(b"const")
            && (pos + 5 >= bytes.len() || !is_identifier_char(bytes[pos + 5]))
        {
            pos = skip_spaces(bytes, pos + 5);
            advanced = true;
        }

        if bytes[pos..].starts_with(b"volatile")
            && (pos + 8 >= bytes.len() || !is_identifier_char(bytes[pos + 8]))
        {
            pos = skip_spaces(bytes, pos + 8);
            advanced = true;
        }

        if !advanced || pos >= bytes.len() {
            break;
        }
    }

    pos
}
