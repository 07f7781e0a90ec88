//! 字句解析モジュール
//!
//! このモジュールは書き換え器と各パーサが共有する低レベルの走査関数と、
//! 角括弧内に現れる整数定数式の評価を提供します。
//! 文字列リテラルとコメントを透過的に扱うため、すべてバイト位置で動作します。

mod const_expr;
mod scanner;

// 公開API
pub use const_expr::{evaluate_bracket_expressions, evaluate_constant_expression};
pub use scanner::{
    current_indent, find_identifier, is_identifier_char, is_identifier_start, is_type_char,
    match_keyword, skip_opaque_span, skip_string_literal, skip_whitespace_and_comments,
};
