//! リストID・保存キー用の文字列ハッシュ
//!
//! ブラウザ版が localStorage に書き込んだキーとIDをそのまま読めるよう、
//! UTF-16コード単位に対する djb2（32bit折り返し）を36進数で表現する。
//! セキュリティ用途には使わないこと。

/// 進捗保存キーの名前空間
pub const STORAGE_NAMESPACE: &str = "mokeke:v1:";

/// 画像差し替え情報のキー接尾辞
const OVERRIDES_SUFFIX: &str = ":imgOverrides";

/// djb2ハッシュを36進数文字列で返す
///
/// # Examples
/// ```
/// use mokeke_common::hash::djb2_base36;
///
/// assert_eq!(djb2_base36(""), "45h");
/// assert_eq!(djb2_base36("a"), djb2_base36("a"));
/// ```
pub fn djb2_base36(s: &str) -> String {
    let mut h: u32 = 5381;
    for unit in s.encode_utf16() {
        h = (h << 5).wrapping_add(h).wrapping_add(unit as u32);
    }
    to_base36(h)
}

/// リスト本文から進捗保存キーを生成
pub fn storage_key(raw_text: &str) -> String {
    format!("{}{}", STORAGE_NAMESPACE, djb2_base36(raw_text))
}

/// 進捗保存キーから画像差し替え情報のキーを生成
pub fn overrides_key(storage_key: &str) -> String {
    format!("{}{}", storage_key, OVERRIDES_SUFFIX)
}

fn to_base36(mut n: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::new();
    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_string_is_seed() {
        // 5381 = 4*1296 + 5*36 + 17
        assert_eq!(djb2_base36(""), "45h");
    }

    #[test]
    fn test_single_char() {
        // 5381*33 + 97 = 177670
        assert_eq!(djb2_base36("a"), to_base36(177_670));
    }

    #[test]
    fn test_deterministic_and_distinct() {
        let a = djb2_base36("01::01::01_北海道::牛::1");
        let b = djb2_base36("01::01::01_北海道::牛::1");
        let c = djb2_base36("01::01::01_北海道::牛::2");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_wrapping_long_input() {
        let long = "モケケ".repeat(1000);
        let h = djb2_base36(&long);
        assert!(!h.is_empty());
        assert!(h.len() <= 7); // u32::MAX = "1z141z3"
    }

    #[test]
    fn test_to_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(u32::MAX), "1z141z3");
    }

    #[test]
    fn test_storage_key() {
        let key = storage_key("");
        assert_eq!(key, "mokeke:v1:45h");
        assert_eq!(overrides_key(&key), "mokeke:v1:45h:imgOverrides");
    }
}
