//! テンプレートの発見と単相化
//!
//! ジェネリックな宣言を認識し、使用箇所ごとに具体的な型で特殊化する。
//! 置換はあくまで字句的で、置換後のテキストの意味的な妥当性は検査しない。

// サブモジュール
mod instantiator;
mod mangling;
mod parser;
mod resolver;
mod substitution;
mod types;

// 再エクスポート
pub use mangling::{make_signature, sanitize_scope_name, sanitize_token};
pub use parser::{parse_template_arguments, parse_template_definition, split_template_parameters};
pub use resolver::DefinitionLookup;
pub use substitution::{convert_template_body_placeholder, replace_parameters};
pub use types::{ParameterKind, Specialization, TemplateDefinition, TemplateParameter};
