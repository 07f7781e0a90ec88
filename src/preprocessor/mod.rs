//! 前処理のエントリポイント
//!
//! ルートファイルから import グラフをたどり、到達した各ファイルを
//! 書き換えて一時ディレクトリ以下に元の相対パスを保って書き出す。
//! 読めないファイルや書けないファイルは飛ばすだけで、処理全体は
//! 止めない。

pub(crate) mod paths;

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Serialize;

use crate::error::{MonoError, MonoResult};
use crate::rewriter::rewrite_file;

use paths::{canonicalize_path, lexical_normalize, relative_from};

/// 前処理の結果
///
/// 原本と処理済みファイルのパスの対応を両方向に持ち、処理済みツリーを
/// 置いた一時ディレクトリの寿命を管理する。
#[derive(Debug, Clone, Default, Serialize)]
pub struct PreprocessResult {
    /// 正規化されたルートファイル
    pub original_root: PathBuf,
    /// ルートに対応する処理済みファイル
    pub processed_root: PathBuf,
    /// 処理済みツリーを置いた一時ディレクトリ
    pub temp_directory: PathBuf,
    pub original_to_processed: BTreeMap<PathBuf, PathBuf>,
    pub processed_to_original: BTreeMap<PathBuf, PathBuf>,
    /// どこかのファイルにジェネリックがあったか
    pub had_templates: bool,
}

/// ファイルツリーの前処理器
pub trait Preprocessor {
    /// ルートから到達可能なファイルを処理する
    ///
    /// ルートが空、一時ディレクトリが作れない、またはテンプレートを含む
    /// ファイルが1つも無かった場合は None を返す。None の場合、
    /// 一時ディレクトリは残らない。
    fn process_tree(&self, root_path: &Path) -> Option<PreprocessResult>;

    /// 結果に紐づく一時ディレクトリを破棄する。何度呼んでもよい
    fn cleanup(&self, result: &PreprocessResult);
}

/// テンプレート宣言を単相化する前処理器
#[derive(Debug, Default)]
pub struct TemplatePreprocessor;

impl TemplatePreprocessor {
    pub fn new() -> Self {
        Self
    }
}

impl Preprocessor for TemplatePreprocessor {
    fn process_tree(&self, root_path: &Path) -> Option<PreprocessResult> {
        if root_path.as_os_str().is_empty() {
            return None;
        }

        let mut result = PreprocessResult::default();
        let canonical_root = canonicalize_path(root_path);
        result.original_root = canonical_root.clone();

        let temp_dir = match create_temp_directory() {
            Ok(temp_dir) => temp_dir,
            Err(e) => {
                warn!("一時ディレクトリを作成できません: {}", e);
                return None;
            }
        };
        result.temp_directory = temp_dir.clone();

        let mut visited: HashSet<PathBuf> = HashSet::new();
        let mut queue = vec![canonical_root.clone()];
        let base_dir = canonical_root
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        while let Some(current) = queue.pop() {
            let canonical_current = canonicalize_path(&current);

            if !visited.insert(canonical_current.clone()) {
                continue;
            }

            let content = match read_source(&canonical_current) {
                Ok(content) => content,
                Err(e) => {
                    warn!(
                        "{} を読めないため飛ばします: {}",
                        canonical_current.display(),
                        e
                    );
                    continue;
                }
            };

            let rewritten = rewrite_file(&canonical_current, &content);

            if rewritten.had_templates {
                result.had_templates = true;
            }

            let relative = relative_from(&canonical_current, &base_dir).unwrap_or_else(|| {
                PathBuf::from(canonical_current.file_name().unwrap_or_default())
            });
            let processed_path = lexical_normalize(&temp_dir.join(&relative));

            if let Some(parent) = processed_path.parent() {
                if let Err(e) = fs::create_dir_all(parent) {
                    warn!("{} を作成できません: {}", parent.display(), e);
                    continue;
                }
            }

            if let Err(e) = fs::write(&processed_path, rewritten.content.as_bytes()) {
                warn!(
                    "{} に書き込めないため飛ばします: {}",
                    processed_path.display(),
                    e
                );
                continue;
            }

            debug!(
                "{} -> {}",
                canonical_current.display(),
                processed_path.display()
            );

            result
                .original_to_processed
                .insert(canonical_current.clone(), processed_path.clone());
            result
                .processed_to_original
                .insert(processed_path, canonical_current);

            for import in rewritten.imports {
                queue.push(canonicalize_path(&import));
            }
        }

        // 対象が1つも無ければ痕跡を残さない
        if !result.had_templates {
            remove_temp_directory(&temp_dir);
            return None;
        }

        result.processed_root = result
            .original_to_processed
            .get(&canonical_root)
            .cloned()
            .unwrap_or(canonical_root);

        Some(result)
    }

    fn cleanup(&self, result: &PreprocessResult) {
        remove_temp_directory(&result.temp_directory);
    }
}

/// システムの一時ディレクトリ以下に固有のディレクトリを作る
fn create_temp_directory() -> MonoResult<PathBuf> {
    let temp_dir = tempfile::Builder::new().prefix("monolay_").tempdir()?;
    Ok(temp_dir.into_path())
}

/// ファイルをバイナリとして読み、UTF-8として解釈する
fn read_source(path: &Path) -> MonoResult<String> {
    let bytes = fs::read(path)?;
    String::from_utf8(bytes).map_err(|e| MonoError::Encoding(e.to_string()))
}

/// 一時ディレクトリを再帰的に削除する。失敗は無視する
fn remove_temp_directory(temp_directory: &Path) {
    if temp_directory.as_os_str().is_empty() {
        return;
    }

    let _ = fs::remove_dir_all(temp_directory);
}
