//! 定義の索引と解決
//!
//! ファイル内で登録された定義を完全名と裸名の両方で索引し、使用箇所の
//! トークンと現在のスコープからスコアリングで最適な定義を選ぶ。
//! ベクタの再確保で参照が無効にならないよう、索引は定義ベクタへの
//! 添字を保持する。

use std::collections::HashMap;

use super::types::TemplateDefinition;

/// ファイル単位の定義索引
#[derive(Debug, Default)]
pub struct DefinitionLookup {
    by_full: HashMap<String, usize>,
    by_name: HashMap<String, Vec<usize>>,
}

impl DefinitionLookup {
    /// `definitions[index]` を索引に登録する
    pub fn register(&mut self, definitions: &[TemplateDefinition], index: usize) {
        let def = &definitions[index];
        self.by_full.insert(def.full_name(), index);
        self.by_name.entry(def.name.clone()).or_default().push(index);
    }

    /// 使用箇所のトークンを定義に解決する
    ///
    /// トークンは最後の `.` で修飾プレフィックスと裸名に分ける。
    /// 修飾付きなら完全名の一致を先に試し、それ以外は裸名の候補を
    /// スコアで比較する。候補が無ければ None。
    pub fn resolve(
        &self,
        definitions: &[TemplateDefinition],
        token: &str,
        current_scope: &str,
    ) -> Option<usize> {
        let dot = token.rfind('.');

        let (prefix, base) = match dot {
            Some(dot) => (&token[..dot], &token[dot + 1..]),
            None => ("", token),
        };

        if dot.is_some() {
            if let Some(&index) = self.by_full.get(token) {
                return Some(index);
            }
        }

        let candidates = self.by_name.get(base)?;

        let mut best = None;
        let mut best_score = 0usize;

        for &index in candidates {
            let score = score_candidate(&definitions[index], prefix, current_scope);

            if score > best_score {
                best_score = score;
                best = Some(index);
            }

            if score >= 1000 {
                break;
            }
        }

        best
    }
}

/// 候補のスコアを計算する。高いほど良く、0は不適合
fn score_candidate(def: &TemplateDefinition, prefix: &str, current_scope: &str) -> usize {
    if !prefix.is_empty() {
        // プレフィックスがスコープパスに完全一致
        if def.scope_path == prefix {
            return 1000 + def.scope_path.len();
        }

        // プレフィックスがスコープパスの区切り揃いの末尾
        if def.scope_path.len() >= prefix.len() && def.scope_path.ends_with(prefix) {
            let at = def.scope_path.len() - prefix.len();

            if at == 0 || def.scope_path.as_bytes()[at - 1] == b'.' {
                return 700 + prefix.len();
            }
        }
    }

    // 現在のスコープそのもの
    if def.scope_path == current_scope {
        return 800 + def.scope_path.len();
    }

    // 現在のスコープを囲む外側のスコープ
    if !def.scope_path.is_empty()
        && !current_scope.is_empty()
        && current_scope.starts_with(&def.scope_path)
        && (current_scope.len() == def.scope_path.len()
            || current_scope.as_bytes()[def.scope_path.len()] == b'.')
    {
        return 400 + def.scope_path.len();
    }

    // ファイルスコープの定義はどこからでも見える
    if def.scope_path.is_empty() {
        return 100;
    }

    0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(name: &str, scope_path: &str) -> TemplateDefinition {
        TemplateDefinition {
            keyword: "struct".to_string(),
            name: name.to_string(),
            scope_path: scope_path.to_string(),
            ..Default::default()
        }
    }

    fn lookup_for(definitions: &[TemplateDefinition]) -> DefinitionLookup {
        let mut lookup = DefinitionLookup::default();

        for index in 0..definitions.len() {
            lookup.register(definitions, index);
        }

        lookup
    }

    #[test]
    fn test_resolve_qualified_exact() {
        let defs = vec![definition("Box", "ns"), definition("Box", "")];
        let lookup = lookup_for(&defs);

        assert_eq!(lookup.resolve(&defs, "ns.Box", ""), Some(0));
    }

    #[test]
    fn test_resolve_prefix_suffix_of_scope() {
        let defs = vec![definition("Q", "outer.inner")];
        let lookup = lookup_for(&defs);

        // `inner.Q` は `outer.inner` の区切り揃いの末尾として一致する
        assert_eq!(lookup.resolve(&defs, "inner.Q", ""), Some(0));

        // 区切りを跨ぐ末尾は一致しない
        let defs = vec![definition("Q", "outer.xinner")];
        let lookup = lookup_for(&defs);
        assert_eq!(lookup.resolve(&defs, "inner.Q", ""), None);
    }

    #[test]
    fn test_resolve_prefers_current_scope() {
        let defs = vec![definition("Vec", ""), definition("Vec", "ns")];
        let lookup = lookup_for(&defs);

        assert_eq!(lookup.resolve(&defs, "Vec", "ns"), Some(1));
        assert_eq!(lookup.resolve(&defs, "Vec", ""), Some(0));
    }

    #[test]
    fn test_resolve_enclosing_scope() {
        let defs = vec![definition("Vec", "a"), definition("Vec", "b")];
        let lookup = lookup_for(&defs);

        // `a.b` の内側からは囲いの `a` が勝つ
        assert_eq!(lookup.resolve(&defs, "Vec", "a.b"), Some(0));
    }

    #[test]
    fn test_resolve_file_scope_fallback() {
        let defs = vec![definition("Vec", "other")];
        let lookup = lookup_for(&defs);

        // どのスコープにも合わない候補だけなら None
        assert_eq!(lookup.resolve(&defs, "Vec", "ns"), None);

        let defs = vec![definition("Vec", "")];
        let lookup = lookup_for(&defs);
        assert_eq!(lookup.resolve(&defs, "Vec", "ns"), Some(0));
    }

    #[test]
    fn test_resolve_unknown_name() {
        let defs = vec![definition("Vec", "")];
        let lookup = lookup_for(&defs);

        assert_eq!(lookup.resolve(&defs, "Map", ""), None);
    }
}
