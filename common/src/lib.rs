//! Mokeke Tracker Common Library
//!
//! CLIとWeb(WASM)で共有されるコレクション管理のコア
//!
//! - [`encoding`]: 文字コード判定
//! - [`list`]: リスト解析（シンプル形式 / TSV形式）
//! - [`catalog`]: 画像カタログ
//! - [`matcher`]: 画像照合
//! - [`session`]: 入手状態の管理と永続化

pub mod catalog;
pub mod encoding;
pub mod error;
pub mod hash;
pub mod list;
pub mod matcher;
pub mod session;
pub mod types;

pub use catalog::{ImageCatalog, ImageRecord};
pub use encoding::{decode, decode_with, Decoded, ScoringWeights, TextEncoding};
pub use error::{Error, Result};
pub use hash::{djb2_base36, storage_key};
pub use list::{detect_format, parse_auto};
pub use matcher::{find_image, MatchQuery, MatchTier, UsedImages};
pub use session::{MemoryStore, ProgressMode, ProgressStore, ProgressSummary, Session};
pub use types::{Item, ListFormat, ParsedList};
