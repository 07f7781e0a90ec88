//! 統一的なエラーハンドリングモジュール
//!
//! 前処理器の内部で使われるエラー型を提供します。
//! 内容に起因する失敗は書き換え側で素通しとして扱われるため、
//! ここに現れるのはファイル入出力まわりの失敗だけです。

use thiserror::Error;

/// 前処理器の統一エラー型
#[derive(Error, Debug)]
pub enum MonoError {
    /// ファイルI/Oエラー
    #[error("ファイル操作エラー: {0}")]
    Io(#[from] std::io::Error),

    /// 入力がUTF-8として解釈できない
    #[error("UTF-8として読めません: {0}")]
    Encoding(String),
}

/// Result型のエイリアス
pub type MonoResult<T> = Result<T, MonoError>;
