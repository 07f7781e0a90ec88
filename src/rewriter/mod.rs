//! ファイル単位の書き換え
//!
//! 入力テキストを前から1回だけ走査し、ジェネリック宣言をプレースホルダに、
//! 使用箇所を単相化されたコピーへの参照に置き換えて出力バッファに書き出す。
//! 認識できない構文はそのまま素通しになり、このパスが失敗することはない。

mod imports;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::trace;

use crate::lexer::{
    current_indent, is_identifier_start, is_type_char, skip_opaque_span,
    skip_whitespace_and_comments,
};
use crate::template::{
    parse_template_arguments, parse_template_definition, DefinitionLookup, TemplateDefinition,
};

pub use imports::extract_imports;

/// 1ファイル分の書き換え結果
#[derive(Debug)]
pub struct RewrittenFile {
    /// 書き換え後のテキスト
    pub content: String,
    /// ジェネリック宣言または使用箇所が1つでもあったか
    pub had_templates: bool,
    /// 書き換え後のテキストから抽出した import 先
    pub imports: Vec<PathBuf>,
}

/// スコープ1段分の状態
struct ScopeFrame {
    name: String,
    /// ここまでのドット区切りパス
    path: String,
    /// このスコープに入った時点の波括弧の深さ
    depth: usize,
    /// このスコープに出力済みの特殊化名
    emitted_specializations: HashSet<String>,
}

/// `namespace`/`struct`/`class` の後に名前と `{` を待つラッチ
#[derive(Default)]
struct PendingScope {
    expect_name: bool,
    expect_brace: bool,
    keyword: String,
    name: String,
}

/// ファイル内容を書き換える
///
/// `file_path` は import 先の解決の基準にだけ使う。
pub fn rewrite_file(file_path: &Path, text: &str) -> RewrittenFile {
    let bytes = text.as_bytes();
    let size = bytes.len();

    let mut output = String::with_capacity(text.len() + 512);
    let mut definitions: Vec<TemplateDefinition> = Vec::with_capacity(16);
    let mut lookup = DefinitionLookup::default();
    let mut had_templates = false;

    let mut pos = 0usize;
    let mut brace_depth = 0usize;
    let mut scope_stack = vec![ScopeFrame {
        name: String::new(),
        path: String::new(),
        depth: 0,
        emitted_specializations: HashSet::new(),
    }];
    let mut pending = PendingScope::default();

    while pos < size {
        let c = bytes[pos];

        // 文字列リテラルとコメントはそのまま写す
        if let Some(next) = skip_opaque_span(bytes, pos) {
            output.push_str(&text[pos..next]);
            pos = next;
            continue;
        }

        if is_identifier_start(c) {
            if let Some((mut def, consumed)) = parse_template_definition(text, pos) {
                def.scope_path = scope_stack.last().unwrap().path.clone();

                let index = definitions.len();
                definitions.push(def);
                lookup.register(&definitions, index);
                had_templates = true;

                let def = &mut definitions[index];

                if !def.placeholder_generated {
                    let placeholder = def.generate_placeholder();
                    output.push_str(&placeholder);

                    if !placeholder.is_empty() && !output.ends_with('\n') {
                        output.push('\n');
                    }

                    def.placeholder_generated = true;
                }

                pos = consumed;
                pending = PendingScope::default();
                continue;
            }
        }

        if c == b'{' {
            output.push('{');
            pos += 1;
            brace_depth += 1;

            if pending.expect_brace {
                let mut new_path = scope_stack.last().unwrap().path.clone();

                if !pending.name.is_empty() {
                    if !new_path.is_empty() {
                        new_path.push('.');
                    }

                    new_path.push_str(&pending.name);
                }

                trace!("{} スコープ {} に入る", pending.keyword, new_path);
                scope_stack.push(ScopeFrame {
                    name: std::mem::take(&mut pending.name),
                    path: new_path,
                    depth: brace_depth,
                    emitted_specializations: HashSet::new(),
                });
                pending = PendingScope::default();
            }

            continue;
        }

        if c == b'}' {
            output.push('}');
            pos += 1;

            if brace_depth > 0 {
                brace_depth -= 1;
            }

            while scope_stack.len() > 1 && scope_stack.last().unwrap().depth > brace_depth {
                let frame = scope_stack.pop().unwrap();
                trace!("スコープ {} を抜ける", frame.name);
            }

            pending = PendingScope::default();
            continue;
        }

        if c == b';' {
            output.push(';');
            pos += 1;
            pending = PendingScope::default();
            continue;
        }

        if c.is_ascii_whitespace() {
            output.push(c as char);
            pos += 1;
            continue;
        }

        if is_type_char(c) {
            let token_start = pos;

            while pos < size && is_type_char(bytes[pos]) {
                pos += 1;
            }

            let token = &text[token_start..pos];

            if pending.expect_name {
                pending.name = token.to_string();
                pending.expect_name = false;
                pending.expect_brace = true;
            }

            if token == "namespace" || token == "struct" || token == "class" {
                pending = PendingScope {
                    keyword: token.to_string(),
                    expect_name: true,
                    ..Default::default()
                };
                output.push_str(token);
                continue;
            }

            let lookahead = skip_whitespace_and_comments(bytes, pos);

            if lookahead < size && bytes[lookahead] == b'<' {
                let (args, args_end) = parse_template_arguments(text, lookahead);

                if !args.is_empty() {
                    let current_path = scope_stack.last().unwrap().path.clone();

                    if let Some(index) = lookup.resolve(&definitions, token, &current_path) {
                        let token_prefix = match token.rfind('.') {
                            Some(dot) => &token[..dot],
                            None => "",
                        };

                        let spec_index = definitions[index].register_specialization(
                            &args,
                            token_prefix,
                            &current_path,
                        );

                        let def = &definitions[index];
                        let spec = &def.specializations[spec_index];
                        let scope = scope_stack.last_mut().unwrap();

                        if scope
                            .emitted_specializations
                            .insert(spec.sanitized_name.clone())
                        {
                            // 現在の出力末尾からインデントを引き継いで定義を差し込む
                            let indent = current_indent(&output);

                            if !output.is_empty() && !output.ends_with('\n') {
                                output.push('\n');
                            }

                            output.push_str(&indent);
                            output.push_str(&def.keyword);
                            output.push(' ');
                            output.push_str(&spec.sanitized_name);
                            output.push_str(&spec.between);
                            output.push('{');
                            output.push_str(&spec.body);

                            // 閉じが `}` で始まらない場合はここで補う
                            let first_non_space =
                                spec.closing.bytes().find(|b| !b.is_ascii_whitespace());

                            if first_non_space != Some(b'}') {
                                output.push('}');
                            }

                            output.push_str(&spec.closing);

                            if !output.ends_with('\n') {
                                output.push('\n');
                            }

                            output.push_str(&indent);
                        }

                        output.push_str(&spec.sanitized_name);
                        pos = args_end;
                        had_templates = true;
                        pending = PendingScope::default();
                        continue;
                    }
                }

                // 解決できない使用箇所は原文のまま通す
                output.push_str(&text[token_start..args_end]);
                pos = args_end;
                continue;
            }

            output.push_str(token);
            continue;
        }

        if let Some(ch) = text[pos..].chars().next() {
            output.push(ch);
            pos += ch.len_utf8();
        } else {
            pos += 1;
        }
    }

    let imports = extract_imports(&output, file_path);

    RewrittenFile {
        content: output,
        had_templates,
        imports,
    }
}
