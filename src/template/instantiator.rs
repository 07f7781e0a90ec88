//! 特殊化の生成と重複排除

use crate::lexer::evaluate_bracket_expressions;

use super::mangling::{make_signature, sanitize_scope_name, sanitize_token};
use super::substitution::{convert_template_body_placeholder, replace_parameters};
use super::types::{Specialization, TemplateDefinition};

impl TemplateDefinition {
    /// 使用箇所に対応する特殊化を登録し、その添字を返す
    ///
    /// 同じ（スコープ, 引数タプル）シグネチャの特殊化は一度しか作られず、
    /// 2回目以降は既存の添字が返る。スコープトークンは使用箇所の修飾
    /// プレフィックス、なければ定義のスコープ、それもなければ現在の
    /// スコープから取る。
    pub fn register_specialization(
        &mut self,
        args: &[String],
        prefix: &str,
        current_scope: &str,
    ) -> usize {
        let scope_token = if !prefix.is_empty() {
            sanitize_scope_name(prefix)
        } else if !self.scope_path.is_empty() {
            sanitize_scope_name(&self.scope_path)
        } else {
            sanitize_scope_name(current_scope)
        };

        let signature = format!("{}|{}", scope_token, make_signature(args));

        if let Some(&index) = self.specialization_index.get(&signature) {
            return index;
        }

        let mut sanitized_name = self.name.clone();

        if !scope_token.is_empty() {
            sanitized_name.push('_');
            sanitized_name.push_str(&scope_token);
        }

        for arg in args {
            sanitized_name.push('_');
            sanitized_name.push_str(&sanitize_token(arg));
        }

        let index = self.specializations.len();
        self.specialization_index.insert(signature, index);

        let mut body = replace_parameters(&self.body, &self.parameters, args);
        evaluate_bracket_expressions(&mut body);

        self.specializations.push(Specialization {
            arguments: args.to_vec(),
            sanitized_name,
            between: replace_parameters(&self.between, &self.parameters, args),
            body,
            closing: replace_parameters(&self.closing, &self.parameters, args),
        });

        index
    }

    /// ジェネリックを消去したプレースホルダ宣言のテキストを作る
    ///
    /// 下流は元の名前のまま、非ジェネリックな型として宣言を見ることになる。
    pub fn generate_placeholder(&self) -> String {
        let converted_body = convert_template_body_placeholder(self);

        let mut out = String::new();
        out.push_str(&self.indentation);
        out.push_str(&self.keyword);
        out.push(' ');
        out.push_str(&self.name);
        out.push_str(&self.between);
        out.push('{');
        out.push_str(&converted_body);
        out.push_str(&self.closing);

        if !converted_body.is_empty()
            && !converted_body.ends_with('\n')
            && !self.closing.starts_with('\n')
        {
            out.push('\n');
        }

        out
    }
}
