//! 名前マングリングと特殊化の重複排除のテスト

use monolay::template::{
    sanitize_scope_name, sanitize_token, ParameterKind, TemplateDefinition, TemplateParameter,
};

fn definition(name: &str, params: &[(&str, ParameterKind)], body: &str) -> TemplateDefinition {
    TemplateDefinition {
        keyword: "struct".to_string(),
        name: name.to_string(),
        parameters: params
            .iter()
            .map(|(name, kind)| TemplateParameter {
                name: name.to_string(),
                kind: *kind,
            })
            .collect(),
        body: body.to_string(),
        closing: "};\n".to_string(),
        ..Default::default()
    }
}

#[test]
fn test_sanitize_token_table() {
    assert_eq!(sanitize_token("int"), "int");
    assert_eq!(sanitize_token("unsigned int"), "unsigned_int");
    assert_eq!(sanitize_token("int*"), "int_ptr_");
    assert_eq!(sanitize_token("int&"), "int_ref_");
    assert_eq!(sanitize_token("char[8]"), "char_arr_8_arr_");
    assert_eq!(sanitize_token("Pair<int, long>"), "Pair_lt_int_long_gt_");
    assert_eq!(sanitize_token("a::b::c"), "a_b_c");
    assert_eq!(sanitize_token("ns.Box"), "ns___Box");
    assert_eq!(sanitize_token("42"), "_42");
    assert_eq!(sanitize_token("_leading"), "leading");
    assert_eq!(sanitize_token(""), "T");
    assert_eq!(sanitize_token("!!"), "T");
}

#[test]
fn test_sanitize_scope_name_table() {
    assert_eq!(sanitize_scope_name(""), "");
    assert_eq!(sanitize_scope_name("app"), "app");
    assert_eq!(sanitize_scope_name("app.detail"), "app_detail");
}

#[test]
fn test_specialization_names_are_deterministic() {
    let mut def = definition("Vec", &[("T", ParameterKind::Type)], " T v; ");

    let a = def.register_specialization(&["int".to_string()], "", "");
    let b = def.register_specialization(&["int*".to_string()], "", "");

    assert_eq!(def.specializations[a].sanitized_name, "Vec_int");
    assert_eq!(def.specializations[b].sanitized_name, "Vec_int_ptr_");

    // 同じ入力からは同じ名前
    let mut def2 = definition("Vec", &[("T", ParameterKind::Type)], " T v; ");
    let a2 = def2.register_specialization(&["int".to_string()], "", "");
    assert_eq!(
        def.specializations[a].sanitized_name,
        def2.specializations[a2].sanitized_name
    );
}

#[test]
fn test_signature_deduplication() {
    let mut def = definition(
        "Arr",
        &[("T", ParameterKind::Type), ("N", ParameterKind::NonType)],
        " T data[N]; ",
    );

    let first = def.register_specialization(&["int".to_string(), "4".to_string()], "", "");
    let same = def.register_specialization(&["int".to_string(), "4".to_string()], "", "");
    let other = def.register_specialization(&["int".to_string(), "8".to_string()], "", "");

    assert_eq!(first, same);
    assert_ne!(first, other);
    assert_eq!(def.specializations.len(), 2);

    // 区切りが引数の中身と混ざらない: ["a,b"] と ["a","b"] は別シグネチャ
    let mut def = definition("Vec", &[("T", ParameterKind::Type)], " T v; ");
    let joined = def.register_specialization(&["a,b".to_string()], "", "");
    assert_eq!(def.specializations[joined].sanitized_name, "Vec_a_b");
    assert_eq!(def.specializations.len(), 1);
}

#[test]
fn test_scope_token_changes_signature() {
    let mut def = definition("Vec", &[("T", ParameterKind::Type)], " T v; ");

    let file_scope = def.register_specialization(&["int".to_string()], "", "");
    let qualified = def.register_specialization(&["int".to_string()], "ns", "");

    assert_ne!(file_scope, qualified);
    assert_eq!(def.specializations[file_scope].sanitized_name, "Vec_int");
    assert_eq!(def.specializations[qualified].sanitized_name, "Vec_ns_int");
}

#[test]
fn test_specialization_body_substitution() {
    let mut def = definition(
        "Arr",
        &[("T", ParameterKind::Type), ("N", ParameterKind::NonType)],
        " T data[N * 2]; ",
    );

    let index = def.register_specialization(&["short".to_string(), "8".to_string()], "", "");
    let spec = &def.specializations[index];

    assert_eq!(spec.sanitized_name, "Arr_short_8");
    // 置換後に角括弧が畳み込まれる
    assert_eq!(spec.body, " short data[16]; ");
}
