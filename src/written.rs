//! # 书面白话字（调符形式）
//!
//! `péh` ⇄ `Pronunciation { p, eh, 8 }`。
//! 解析时先做 NFD 分解，调符按"同形异码"表逐一识别；输出统一为 NFC。

use unicode_normalization::UnicodeNormalization;

use crate::pronunciation::{
    is_checked_final, parse_syllable, strip_nasal_mark, Pronunciation, OPTIONAL_NASAL_MARK,
};

// ============================================================
// 调符表
// ============================================================

/// 书写用调符，下标即调类
const TONE_MARKS: [&str; 9] = [
    "",         // 0
    "",         // 1
    "\u{301}",  // 2 锐音符
    "\u{300}",  // 3 抑音符
    "",         // 4
    "\u{302}",  // 5 扬抑符
    "\u{303}",  // 6 波浪符
    "\u{304}",  // 7 长音符
    "\u{301}",  // 8 锐音符（与 2 调同形）
];

/// 解析时认可的调符。渲染相同的不同码位都要列上；
/// 8 调的调符与 2、5 调重合，入声韵另行判定。
const POSSIBLE_TONE_MARKS: [&[char]; 9] = [
    &[],
    &[],
    &['\u{301}', '\u{341}'],
    &['\u{300}', '\u{340}'],
    &[],
    &['\u{302}'],
    &['\u{303}', '\u{342}', '\u{30C}', '\u{306}'],
    &['\u{304}'],
    &['\u{301}', '\u{341}', '\u{302}', '\u{30D}'],
];

/// 特殊元音：ASCII 内码 → NFD 书写形
const SPECIAL_VOWELS: [(char, &str); 4] = [
    ('v', "u\u{324}"),
    ('V', "U\u{324}"),
    ('r', "o\u{324}"),
    ('R', "O\u{324}"),
];

fn is_vowel(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'o' | 'i' | 'u' | 'v' | 'r')
}

/// 调符落在韵母的第几个字符上：i/u 介音后接元音则落在第二个，否则第一个
fn nucleus_index(final_: &str) -> usize {
    let mut chars = final_.chars();
    match (chars.next(), chars.next()) {
        (Some(first), Some(second)) if matches!(first, 'i' | 'u' | 'I' | 'U') && is_vowel(second) => 1,
        _ => 0,
    }
}

// ============================================================
// 书面形式 ⇄ Pronunciation
// ============================================================

impl Pronunciation {
    /// 书面白话字 → Pronunciation。认不出来返回 `None`。
    ///
    /// 调类来源二选一：调符，或末尾 1–8 的数字。两者同时出现视为非法。
    /// 入声韵带 2/5/8 调符记 8 调，不带调记 4 调；舒声韵不带调记 1 调。
    /// 韵母里的 `(nn)` 表示可鼻化。
    pub fn from_written(written: &str) -> Option<Self> {
        if written.is_empty() {
            return None;
        }
        let (written, optional) = strip_nasal_mark(written, OPTIONAL_NASAL_MARK);
        let mut text: String = written.nfd().collect();

        let mut marked_tone = None;
        'scan: for (tone, marks) in POSSIBLE_TONE_MARKS.iter().enumerate() {
            for &mark in marks.iter() {
                if text.contains(mark) {
                    text = text.replace(mark, "");
                    marked_tone = Some(tone as u8);
                    break 'scan;
                }
            }
        }

        let mut digit_tone = None;
        if let Some(digit) = text.chars().last().and_then(|c| c.to_digit(10)) {
            if marked_tone.is_some() || !(1..=8).contains(&digit) {
                return None;
            }
            text.pop();
            digit_tone = Some(digit as u8);
        }

        for (ascii, glyph) in SPECIAL_VOWELS {
            text = text.replace(glyph, &ascii.to_string());
        }

        let syllable = parse_syllable(&text)?;
        let checked = is_checked_final(syllable.final_);
        let tone = match (digit_tone, marked_tone) {
            (Some(digit), _) => digit,
            (None, Some(mark)) if checked => {
                if matches!(mark, 2 | 5 | 8) { 8 } else { return None; }
            }
            (None, Some(mark)) => mark,
            (None, None) => if checked { 4 } else { 1 },
        };
        Pronunciation::new(syllable.initial, syllable.canonical_final(), tone)
            .ok()
            .map(|p| p.with_marked(optional))
    }

    /// Pronunciation → 书面白话字（NFC）
    pub fn to_written(&self) -> String {
        let final_ = self.marked_final();
        let final_ = final_.as_ref();
        let tone = usize::from(self.tone());
        if final_.is_empty() || tone >= TONE_MARKS.len() {
            return String::new();
        }
        let at = nucleus_index(final_);
        let mut out = String::with_capacity(self.initial_or_empty().len() + final_.len() * 2);
        out.push_str(self.initial_or_empty());
        for (i, c) in final_.chars().enumerate() {
            match SPECIAL_VOWELS.iter().find(|(ascii, _)| *ascii == c) {
                Some((_, glyph)) => out.push_str(glyph),
                None => out.push(c),
            }
            if i == at {
                out.push_str(TONE_MARKS[tone]);
            }
        }
        out.nfc().collect()
    }
}

/// 数字调单词加调符："peh8" → "péh"。认不出来原样返回。
pub fn mark_numbered(word: &str) -> String {
    match Pronunciation::from_combination(word) {
        Some(p) => p.to_written(),
        None => word.to_string(),
    }
}

// ============================================================
// 句子切分
// ============================================================

/// 句子切分片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// 单词（NFD），以及紧跟其后的连字符个数（0–2）
    Word { text: String, hyphens: u8 },
    /// 标点、空白等
    Other(String),
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '\'' || ('\u{300}'..='\u{36f}').contains(&c)
}

/// 把一句白话字切成单词与非单词片段。连字符本身留在后面的 `Other` 片段里。
pub fn split_sentence(sentence: &str) -> Vec<Segment> {
    let chars: Vec<char> = sentence.nfd().collect();
    let mut result = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let start = i;
        let word = is_word_char(chars[i]);
        while i < chars.len() && is_word_char(chars[i]) == word {
            i += 1;
        }
        let text: String = chars[start..i].iter().collect();
        if word {
            let hyphens = chars[i..].iter().take(2).take_while(|&&c| c == '-').count() as u8;
            result.push(Segment::Word { text, hyphens });
        } else {
            result.push(Segment::Other(text));
        }
    }
    result
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn nfc(s: &str) -> String {
        s.nfc().collect()
    }

    fn written(initial: &str, final_: &str, tone: u8) -> String {
        Pronunciation::new(initial, final_, tone).unwrap().to_written()
    }

    #[test]
    fn test_to_written() {
        assert_eq!(written("p", "eh", 8), nfc("pe\u{301}h"));
        assert_eq!(written("", "ng", 5), nfc("n\u{302}g"));
        assert_eq!(written("h", "ng", 5), nfc("hn\u{302}g"));
        assert_eq!(written("0", "ngh", 8), nfc("n\u{301}gh"));
        assert_eq!(written("0", "innh", 8), nfc("i\u{301}nnh"));
        assert_eq!(written("0", "m", 2), nfc("m\u{301}"));
        assert_eq!(written("m", "ng", 2), nfc("mn\u{301}g"));
        assert_eq!(written("l", "v", 2), nfc("lu\u{324}\u{301}"));
        assert_eq!(written("l", "r", 5), nfc("lo\u{324}\u{302}"));

        assert_eq!(written("0", "ue", 7), nfc("ue\u{304}"));
        assert_eq!(written("j", "i", 7), nfc("ji\u{304}"));
        assert_eq!(written("p", "eng", 1), "peng");
        assert_eq!(written("h", "uang", 1), "huang");
        assert_eq!(written("0", "uann", 3), nfc("ua\u{300}nn"));
        assert_eq!(written("k", "ok", 4), "kok");
        assert_eq!(written("tsh", "ou", 3), nfc("tsho\u{300}u"));
        assert_eq!(written("0", "iam", 5), nfc("ia\u{302}m"));
        assert_eq!(written("s", "ui", 6), nfc("sui\u{303}"));
        assert_eq!(written("m", "in", 5), nfc("mi\u{302}n"));
    }

    #[test]
    fn test_from_written() {
        let p = Pronunciation::from_written("p\u{e9}h").unwrap();
        assert_eq!((p.initial(), p.final_(), p.tone()), ("p", "eh", 8));

        let p = Pronunciation::from_written("n\u{302}g").unwrap();
        assert_eq!((p.initial(), p.final_(), p.tone()), ("0", "ng", 5));

        let p = Pronunciation::from_written("l\u{1e73}\u{301}").unwrap();
        assert_eq!((p.initial(), p.final_(), p.tone()), ("l", "v", 2));

        let p = Pronunciation::from_written("Tsi\u{e1}h").unwrap();
        assert_eq!((p.initial(), p.final_(), p.tone()), ("Ts", "iah", 8));
    }

    #[test]
    fn test_from_written_tone_sources() {
        assert_eq!(Pronunciation::from_written("ti").unwrap().tone(), 1);
        assert_eq!(Pronunciation::from_written("ti7").unwrap().tone(), 7);
        assert_eq!(Pronunciation::from_written("pek").unwrap().tone(), 4);
        assert_eq!(Pronunciation::from_written("pek8").unwrap().tone(), 8);
        // 5 调调符落在入声韵上也是 8 调
        assert_eq!(Pronunciation::from_written("pe\u{302}k").unwrap().tone(), 8);
        assert_eq!(Pronunciation::from_written("pe\u{30d}k").unwrap().tone(), 8);
        // 同形异码
        assert_eq!(Pronunciation::from_written("ti\u{341}").unwrap().tone(), 2);
        assert_eq!(Pronunciation::from_written("ti\u{30c}").unwrap().tone(), 6);
        assert_eq!(Pronunciation::from_written("ti\u{306}").unwrap().tone(), 6);
    }

    #[test]
    fn test_from_written_rejects() {
        assert_eq!(Pronunciation::from_written(""), None);
        // 调符 + 数字
        assert_eq!(Pronunciation::from_written("t\u{ed}2"), None);
        assert_eq!(Pronunciation::from_written("ti9"), None);
        assert_eq!(Pronunciation::from_written("ti0"), None);
        // 入声韵配 3 调调符
        assert_eq!(Pronunciation::from_written("pe\u{300}k"), None);
        // 入声韵配舒声数字调
        assert_eq!(Pronunciation::from_written("pek3"), None);
        assert_eq!(Pronunciation::from_written("hello"), None);
        assert_eq!(Pronunciation::from_written("\u{4f60}"), None);
    }

    #[test]
    fn test_written_round_trip() {
        let combos = [
            "liah8", "ngiau2", "tshv2", "ua2", "si6", "tua7", "meng5", "tshenn1", "tsin6", "tiong1",
            "tseh4", "siu2", "jit8", "sua3", "menn5", "kann2", "lai5", "luan6", "tsiat4", "kio3",
            "ng5", "hng5", "ngh8", "m7", "innh8", "uainn1", "lr5", "kok4", "iau3", "ui6",
        ];
        for comb in combos {
            let p = Pronunciation::from_combination(comb).unwrap();
            assert_eq!(Pronunciation::from_written(&p.to_written()), Some(p), "{}", comb);
        }
    }

    #[test]
    fn test_written_optional_nasalization() {
        let p = Pronunciation::new("s", "uann", 3).unwrap().with_optional_nasalization();
        assert_eq!(p.to_written(), nfc("sua\u{300}(nn)"));
        assert_eq!(Pronunciation::from_written(&p.to_written()), Some(p));

        let p = Pronunciation::new("0", "innh", 8).unwrap().with_optional_nasalization();
        assert_eq!(p.to_written(), nfc("i\u{301}(nn)h"));
        assert_eq!(Pronunciation::from_written(&p.to_written()), Some(p));

        assert_eq!(
            Pronunciation::from_written("sua(nn)").unwrap().nasalization(),
            crate::pronunciation::Nasalization::Optional
        );
    }

    #[test]
    fn test_from_written_aliases_and_apostrophe() {
        let lr = Pronunciation::from_combination("lr5").unwrap();
        assert_eq!(Pronunciation::from_written("l\u{f4}r"), Some(lr));
        let p = Pronunciation::from_written("ho\u{302}'").unwrap();
        assert_eq!((p.final_(), p.tone()), ("o'", 5));
        assert_eq!(Pronunciation::from_written(&p.to_written()), Some(p));
    }

    #[test]
    fn test_mark_numbered() {
        assert_eq!(mark_numbered("peh8"), nfc("pe\u{301}h"));
        assert_eq!(mark_numbered("kok4"), "kok");
        assert_eq!(mark_numbered("ti"), "ti");
        assert_eq!(mark_numbered("abc9"), "abc9");
    }

    #[test]
    fn test_split_sentence() {
        let segments = split_sentence("Tsi\u{e1}h-pn\u{304}g b\u{f4}?");
        assert_eq!(
            segments,
            vec![
                Segment::Word { text: "Tsia\u{301}h".into(), hyphens: 1 },
                Segment::Other("-".into()),
                Segment::Word { text: "pn\u{304}g".into(), hyphens: 0 },
                Segment::Other(" ".into()),
                Segment::Word { text: "bo\u{302}".into(), hyphens: 0 },
                Segment::Other("?".into()),
            ]
        );
    }

    #[test]
    fn test_split_sentence_double_hyphen() {
        let segments = split_sentence("a--a");
        assert_eq!(segments[0], Segment::Word { text: "a".into(), hyphens: 2 });
        assert_eq!(segments[1], Segment::Other("--".into()));
        assert!(split_sentence("").is_empty());
    }
}
