//! 文字コード判定モジュール
//!
//! 出所不明のリストファイルを複数の候補エンコーディングでデコードし、
//! スコアが最も高い結果を採用する。
//!
//! ## 判定フロー
//! 1. 先頭2バイトのBOMでUTF-16 LE/BEを候補の先頭に追加
//! 2. UTF-8 / Shift_JIS / EUC-JP / ISO-2022-JP を常に試行
//! 3. BOMが無い場合はゼロバイト比率でUTF-16らしさを推定
//! 4. 日本語・ASCII・置換文字・タブ数からスコアを計算し最大値を選択

use encoding_rs::{Encoding, EUC_JP, ISO_2022_JP, SHIFT_JIS, UTF_16BE, UTF_16LE, UTF_8};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 日本語文字1つあたりの加点
pub const WEIGHT_JAPANESE_CHAR: i64 = 3;
/// 印字可能ASCII文字1つあたりの加点
pub const WEIGHT_ASCII_CHAR: i64 = 1;
/// 置換文字（U+FFFD）1つあたりの減点
pub const WEIGHT_REPLACEMENT_CHAR: i64 = -10;
/// 短すぎる文字列への減点
pub const WEIGHT_SHORT_TEXT: i64 = -5;
/// この文字数未満を「短すぎる」とみなす
pub const SHORT_TEXT_LEN: usize = 5;
/// タブがこの数を超えるとTSVとみなす
pub const TAB_THRESHOLD: usize = 10;
/// TSVらしい文字列への加点
pub const WEIGHT_TAB_HEAVY: i64 = 1000;
/// UTF-8候補への固定加点
pub const WEIGHT_UTF8_PREFERENCE: i64 = 5000;
/// BOMで宣言され置換文字なしでデコードできた候補への加点
pub const WEIGHT_BOM_DECLARED: i64 = 10_000;
/// UTF-16推定に使うゼロバイト比率の閾値
pub const UTF16_ZERO_RATIO: f64 = 0.2;
/// 空文字列のスコア
const EMPTY_SCORE: i64 = -1_000_000_000;

/// 候補エンコーディング
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextEncoding {
    Utf8,
    ShiftJis,
    EucJp,
    Iso2022Jp,
    Utf16Le,
    Utf16Be,
}

impl TextEncoding {
    /// encoding_rs のエンコーディング
    pub fn codec(&self) -> &'static Encoding {
        match self {
            TextEncoding::Utf8 => UTF_8,
            TextEncoding::ShiftJis => SHIFT_JIS,
            TextEncoding::EucJp => EUC_JP,
            TextEncoding::Iso2022Jp => ISO_2022_JP,
            TextEncoding::Utf16Le => UTF_16LE,
            TextEncoding::Utf16Be => UTF_16BE,
        }
    }

    /// WHATWGラベル
    pub fn label(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::ShiftJis => "shift_jis",
            TextEncoding::EucJp => "euc-jp",
            TextEncoding::Iso2022Jp => "iso-2022-jp",
            TextEncoding::Utf16Le => "utf-16le",
            TextEncoding::Utf16Be => "utf-16be",
        }
    }
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// スコアリングの重み表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub japanese_char: i64,
    pub ascii_char: i64,
    pub replacement_char: i64,
    pub short_text: i64,
    pub short_text_len: usize,
    pub tab_threshold: usize,
    pub tab_heavy: i64,
    pub utf8_preference: i64,
    pub bom_declared: i64,
    pub utf16_zero_ratio: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            japanese_char: WEIGHT_JAPANESE_CHAR,
            ascii_char: WEIGHT_ASCII_CHAR,
            replacement_char: WEIGHT_REPLACEMENT_CHAR,
            short_text: WEIGHT_SHORT_TEXT,
            short_text_len: SHORT_TEXT_LEN,
            tab_threshold: TAB_THRESHOLD,
            tab_heavy: WEIGHT_TAB_HEAVY,
            utf8_preference: WEIGHT_UTF8_PREFERENCE,
            bom_declared: WEIGHT_BOM_DECLARED,
            utf16_zero_ratio: UTF16_ZERO_RATIO,
        }
    }
}

/// スコア付きのデコード候補
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub encoding: TextEncoding,
    pub text: String,
    pub score: i64,
    /// 不正なバイト列を置換文字に置き換えたか
    pub had_errors: bool,
    /// BOMで宣言されたエンコーディングか
    pub bom_declared: bool,
}

/// デコード結果
#[derive(Debug, Clone)]
pub struct Decoded {
    pub text: String,
    pub encoding: TextEncoding,
    pub score: i64,
}

/// バイト列を最も妥当なエンコーディングでデコード
///
/// # Examples
/// ```
/// use mokeke_common::encoding::decode;
///
/// assert_eq!(decode("[果物]\nりんご".as_bytes()), "[果物]\nりんご");
/// ```
pub fn decode(bytes: &[u8]) -> String {
    decode_with(bytes, &ScoringWeights::default()).text
}

/// 重み表を指定してデコード
pub fn decode_with(bytes: &[u8], weights: &ScoringWeights) -> Decoded {
    let candidates = rank_candidates(bytes, weights);
    match select_best(&candidates) {
        Some(best) => {
            debug!(encoding = %best.encoding, score = best.score, "エンコーディングを選択");
            Decoded {
                text: best.text.clone(),
                encoding: best.encoding,
                score: best.score,
            }
        }
        None => {
            let (text, _) = UTF_8.decode_with_bom_removal(bytes);
            Decoded {
                text: text.into_owned(),
                encoding: TextEncoding::Utf8,
                score: EMPTY_SCORE,
            }
        }
    }
}

/// 候補エンコーディングを試行順に並べる
pub fn candidate_encodings(bytes: &[u8], weights: &ScoringWeights) -> Vec<(TextEncoding, bool)> {
    let bom = detect_utf16_bom(bytes);
    let mut encodings = Vec::new();

    if let Some(enc) = bom {
        encodings.push((enc, true));
    }
    encodings.push((TextEncoding::Utf8, false));
    encodings.push((TextEncoding::ShiftJis, false));
    encodings.push((TextEncoding::EucJp, false));
    encodings.push((TextEncoding::Iso2022Jp, false));

    if bom.is_none() {
        let (even, odd) = zero_byte_ratios(bytes);
        if even > weights.utf16_zero_ratio || odd > weights.utf16_zero_ratio {
            encodings.push((TextEncoding::Utf16Le, false));
            encodings.push((TextEncoding::Utf16Be, false));
        }
    }

    encodings
}

/// 全候補をデコードしてスコアを付ける（試行順）
pub fn rank_candidates(bytes: &[u8], weights: &ScoringWeights) -> Vec<ScoredCandidate> {
    debug!(size = bytes.len(), "文字コード判定開始");

    candidate_encodings(bytes, weights)
        .into_iter()
        .map(|(encoding, bom_declared)| {
            let (text, had_errors) = encoding.codec().decode_with_bom_removal(bytes);
            let text = text.into_owned();
            let mut score = score_text(&text, weights);
            if encoding == TextEncoding::Utf8 {
                score += weights.utf8_preference;
            }
            if bom_declared && !had_errors && !text.contains('\u{FFFD}') {
                score += weights.bom_declared;
            }
            debug!(
                encoding = %encoding,
                score,
                had_errors,
                preview = %text.chars().take(50).collect::<String>(),
                "候補をデコード"
            );
            ScoredCandidate {
                encoding,
                text,
                score,
                had_errors,
                bom_declared,
            }
        })
        .collect()
}

/// 最高スコアの候補を選ぶ（同点は試行順で先の候補）
pub fn select_best(candidates: &[ScoredCandidate]) -> Option<&ScoredCandidate> {
    candidates
        .iter()
        .enumerate()
        .max_by(|(ia, a), (ib, b)| a.score.cmp(&b.score).then(ib.cmp(ia)))
        .map(|(_, c)| c)
}

/// 文字列のもっともらしさを採点する（エンコーディング固有の加点は含まない）
pub fn score_text(text: &str, weights: &ScoringWeights) -> i64 {
    if text.is_empty() {
        return EMPTY_SCORE;
    }

    let mut japanese = 0i64;
    let mut ascii = 0i64;
    let mut bad = 0i64;
    let mut tabs = 0usize;
    let mut len = 0usize;

    for ch in text.chars() {
        len += 1;
        if is_japanese(ch) {
            japanese += 1;
        }
        if (' '..='~').contains(&ch) {
            ascii += 1;
        }
        if ch == '\t' {
            tabs += 1;
        }
        if ch == '\u{FFFD}' {
            bad += 1;
        }
    }

    let mut score = japanese * weights.japanese_char
        + ascii * weights.ascii_char
        + bad * weights.replacement_char;
    if len < weights.short_text_len {
        score += weights.short_text;
    }
    if tabs > weights.tab_threshold {
        score += weights.tab_heavy;
    }
    score
}

/// ひらがな・カタカナ・CJK統合漢字・半角カタカナ
fn is_japanese(ch: char) -> bool {
    matches!(ch, '\u{3040}'..='\u{30FF}' | '\u{4E00}'..='\u{9FFF}' | '\u{FF66}'..='\u{FF9F}')
}

fn detect_utf16_bom(bytes: &[u8]) -> Option<TextEncoding> {
    match bytes {
        [0xFF, 0xFE, ..] => Some(TextEncoding::Utf16Le),
        [0xFE, 0xFF, ..] => Some(TextEncoding::Utf16Be),
        _ => None,
    }
}

/// 偶数位置・奇数位置それぞれのゼロバイト比率
fn zero_byte_ratios(bytes: &[u8]) -> (f64, f64) {
    let mut zeros_even = 0usize;
    let mut zeros_odd = 0usize;
    for (i, &b) in bytes.iter().enumerate() {
        if b == 0 {
            if i % 2 == 0 {
                zeros_even += 1;
            } else {
                zeros_odd += 1;
            }
        }
    }
    let even_len = bytes.len().div_ceil(2).max(1);
    let odd_len = (bytes.len() / 2).max(1);
    (
        zeros_even as f64 / even_len as f64,
        zeros_odd as f64 / odd_len as f64,
    )
}
