//! テンプレート宣言の構造的パーサ
//!
//! 認識するのは `struct`/`class` 名 `<パラメータ>` 基底部 `{本体}` `;?`
//! という形だけで、それ以外はすべて呼び出し側で素通しになる。
//! 山括弧と波括弧の深さは字句的に追跡し、文字列リテラルとコメントの
//! 中の括弧は深さに影響しない。

use crate::lexer::{
    is_identifier_char, is_identifier_start, match_keyword, skip_opaque_span,
    skip_whitespace_and_comments,
};

use super::types::{ParameterKind, TemplateDefinition, TemplateParameter};

/// テンプレート宣言を `pos` から解析する
///
/// 成功した場合、定義と閉じの直後（`;` と1つの改行を含む）の位置を返す。
/// 山括弧や波括弧が閉じないまま末尾に達した場合は失敗し、何も消費しない。
pub fn parse_template_definition(text: &str, pos: usize) -> Option<(TemplateDefinition, usize)> {
    let bytes = text.as_bytes();
    let size = bytes.len();

    let mut consumed = skip_whitespace_and_comments(bytes, pos);

    let keyword = if match_keyword(bytes, consumed, "struct") {
        "struct"
    } else if match_keyword(bytes, consumed, "class") {
        "class"
    } else {
        return None;
    };

    let mut def = TemplateDefinition {
        keyword: keyword.to_string(),
        ..Default::default()
    };
    consumed += keyword.len();

    consumed = skip_whitespace_and_comments(bytes, consumed);

    if consumed >= size || !is_identifier_start(bytes[consumed]) {
        return None;
    }

    let name_start = consumed;

    while consumed < size && is_identifier_char(bytes[consumed]) {
        consumed += 1;
    }

    def.name = text[name_start..consumed].to_string();

    consumed = skip_whitespace_and_comments(bytes, consumed);

    if consumed >= size || bytes[consumed] != b'<' {
        return None;
    }

    consumed += 1;
    let params_start = consumed;
    let mut angle_depth = 1i32;

    while consumed < size && angle_depth > 0 {
        if let Some(next) = skip_opaque_span(bytes, consumed) {
            consumed = next;
            continue;
        }

        match bytes[consumed] {
            b'<' => angle_depth += 1,
            b'>' => {
                angle_depth -= 1;

                if angle_depth == 0 {
                    break;
                }
            }
            _ => {}
        }

        consumed += 1;
    }

    if angle_depth != 0 || consumed >= size || bytes[consumed] != b'>' {
        return None;
    }

    def.parameters = split_template_parameters(&text[params_start..consumed]);

    if def.parameters.is_empty() {
        return None;
    }

    consumed += 1;
    let between_start = consumed;

    while consumed < size {
        if let Some(next) = skip_opaque_span(bytes, consumed) {
            consumed = next;
            continue;
        }

        if bytes[consumed] == b'{' {
            break;
        }

        consumed += 1;
    }

    if consumed >= size || bytes[consumed] != b'{' {
        return None;
    }

    def.between = text[between_start..consumed].to_string();

    let body_start = consumed + 1;
    let mut brace_depth = 1i32;
    consumed += 1;

    while consumed < size && brace_depth > 0 {
        if let Some(next) = skip_opaque_span(bytes, consumed) {
            consumed = next;
            continue;
        }

        match bytes[consumed] {
            b'{' => brace_depth += 1,
            b'}' => {
                brace_depth -= 1;

                if brace_depth == 0 {
                    break;
                }
            }
            _ => {}
        }

        consumed += 1;
    }

    if brace_depth != 0 || consumed >= size {
        return None;
    }

    let body_end = consumed;
    let mut closing_start = consumed;

    // 閉じ波括弧を含める
    if closing_start < size && bytes[closing_start] == b'}' {
        closing_start += 1;
    }

    while closing_start < size && bytes[closing_start].is_ascii_whitespace() {
        if bytes[closing_start] == b'\n' {
            closing_start += 1;
            break;
        }

        closing_start += 1;
    }

    if closing_start < size && bytes[closing_start] == b';' {
        closing_start += 1;

        while closing_start < size && bytes[closing_start].is_ascii_whitespace() {
            if bytes[closing_start] == b'\n' {
                closing_start += 1;
                break;
            }

            closing_start += 1;
        }
    }

    let indentation_start = match text[..pos].rfind('\n') {
        Some(newline) => newline + 1,
        None => 0,
    };

    def.indentation = text[indentation_start..pos].to_string();
    def.body = text[body_start..body_end].to_string();
    def.closing = text[body_end..closing_start].to_string();
    def.start = pos;
    def.end = closing_start;

    Some((def, closing_start))
}

/// パラメータリストをトップレベルのカンマで分割する
pub fn split_template_parameters(params: &str) -> Vec<TemplateParameter> {
    let bytes = params.as_bytes();
    let mut result = Vec::new();
    let mut depth = 0i32;
    let mut token_start = 0usize;

    for i in 0..bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            b'>' => {
                if depth > 0 {
                    depth -= 1;
                }
            }
            b',' if depth == 0 => {
                if let Some(param) = parse_parameter(&params[token_start..i]) {
                    result.push(param);
                }

                token_start = i + 1;
            }
            _ => {}
        }
    }

    if let Some(param) = parse_parameter(&params[token_start..]) {
        result.push(param);
    }

    result
}

/// 1つのパラメータ本文から名前と種別を取り出す
///
/// デフォルト値（トップレベルの `=` 以降）と末尾の `...` を落とし、
/// 末尾の識別子の連なりを名前とする。名前が取れないものは捨てる。
fn parse_parameter(token: &str) -> Option<TemplateParameter> {
    let token = token.trim();

    if token.is_empty() {
        return None;
    }

    let bytes = token.as_bytes();
    let mut depth = 0i32;
    let mut assign_pos = None;

    for (i, &c) in bytes.iter().enumerate() {
        match c {
            b'<' => depth += 1,
            b'>' => {
                if depth > 0 {
                    depth -= 1;
                }
            }
            b'=' if depth == 0 => {
                assign_pos = Some(i);
                break;
            }
            _ => {}
        }
    }

    let mut cleaned = match assign_pos {
        Some(i) => token[..i].trim(),
        None => token,
    };

    if cleaned.is_empty() {
        return None;
    }

    if let Some(stripped) = cleaned.strip_suffix("...") {
        cleaned = stripped.trim_end();
    }

    let cleaned_bytes = cleaned.as_bytes();
    let end = cleaned.len();
    let mut begin = end;

    while begin > 0 && is_identifier_char(cleaned_bytes[begin - 1]) {
        begin -= 1;
    }

    if begin >= end {
        return None;
    }

    let name = cleaned[begin..end].to_string();
    let prefix = cleaned[..begin].trim().to_lowercase();

    // 種別の判定はヒューリスティック（前置部の部分文字列検索）
    let kind = if prefix.contains("typename")
        || prefix.contains("class")
        || prefix.contains("struct")
        || prefix.contains("template")
    {
        ParameterKind::Type
    } else {
        ParameterKind::NonType
    };

    Some(TemplateParameter { name, kind })
}

/// 使用箇所の `<` から引数リストを読み取る
///
/// 戻り値は引数の並びと、リスト直後の位置。閉じ `>` が見つからないまま
/// 末尾に達した場合、それまでの引数と末尾位置を返す（呼び出し側が
/// そのまま素通しにする）。
pub fn parse_template_arguments(text: &str, lt_pos: usize) -> (Vec<String>, usize) {
    let bytes = text.as_bytes();
    let size = bytes.len();
    let mut result = Vec::new();

    if lt_pos >= size || bytes[lt_pos] != b'<' {
        return (result, lt_pos);
    }

    let mut pos = lt_pos + 1;
    let mut depth = 1i32;
    let mut token_start = pos;

    while pos < size && depth > 0 {
        if let Some(next) = skip_opaque_span(bytes, pos) {
            pos = next;
            continue;
        }

        match bytes[pos] {
            b'<' => depth += 1,
            b'>' => {
                depth -= 1;

                if depth == 0 {
                    let token = text[token_start..pos].trim();

                    if !token.is_empty() {
                        result.push(token.to_string());
                    }

                    pos += 1;
                    break;
                }
            }
            b',' if depth == 1 => {
                let token = text[token_start..pos].trim();

                if !token.is_empty() {
                    result.push(token.to_string());
                }

                token_start = pos + 1;
            }
            _ => {}
        }

        pos += 1;
    }

    (result, pos)
}
