//! # 国际音标
//!
//! 读音先转成 X-SAMPA 存储（纯 ASCII，便于比较），输出时再渲染成 IPA 字形。
//! 这里的声调只记调类，实际调值见 [`crate::accent`]。

use unicode_normalization::UnicodeNormalization;

use crate::pronunciation::{Nasalization, Pronunciation};

// ============================================================
// PUJ → X-SAMPA
// ============================================================

const PUJ_IPA_INITIALS: &[(&str, &str)] = &[
    ("", ""),
    ("0", ""),
    ("p", "p"),
    ("pf", "p_df"),
    ("ph", "p_h"),
    ("phf", "p_d_hf"),
    ("pfh", "p_d_hf"),
    ("m", "m"),
    ("mv", "F"),
    ("b", "b"),
    ("bv", "b_d"),
    ("t", "t"),
    ("th", "t_h"),
    ("n", "n"),
    ("l", "l"),
    ("k", "k"),
    ("kh", "k_h"),
    ("ng", "N"),
    ("g", "g"),
    ("h", "h"),
    ("ts", "ts"),
    ("ch", "tS"),
    ("tsh", "ts_h"),
    ("chh", "tS_h"),
    ("s", "s"),
    ("j", "dz"),
    ("z", "z"),
];

/// 声化韵
const PUJ_IPA_SYLLABIC: &[(&str, &str, &str)] = &[
    // (韵母, X-SAMPA, h 声母时的清化鼻音)
    ("m", "m=", "m_0"),
    ("ng", "N=", "N_0"),
    ("ngh", "N=_}", "N_0"),
];

/// 韵母音段，ng 要先于 n 匹配
const PUJ_IPA_FINAL_SEGMENTS: &[(&str, &str)] = &[
    ("ng", "N"),
    ("a", "a"),
    ("o", "o"),
    ("v", "M"),
    ("r", "@"),
    ("e", "e"),
    ("i", "i"),
    ("u", "u"),
    ("n", "n"),
    ("m", "m"),
    ("h", "?"),
    ("k", "k_}"),
    ("t", "t_}"),
    ("p", "p_}"),
];

const NASAL_MARK: &str = "nn";

fn is_vowel_segment(seg: &str) -> bool {
    matches!(seg, "a" | "o" | "v" | "r" | "e" | "i" | "u")
}

/// 国际音标读音（X-SAMPA）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IpaPronunciation {
    pub initial: String,
    pub final_: String,
    pub tone: u8,
}

impl IpaPronunciation {
    pub fn new(initial: impl Into<String>, final_: impl Into<String>, tone: u8) -> Self {
        Self { initial: initial.into(), final_: final_.into(), tone }
    }

    /// X-SAMPA → IPA 字形，调类写成上标数字
    pub fn to_written(&self) -> String {
        let mut out = x_sampa_to_ipa(&self.initial);
        out.push_str(&x_sampa_to_ipa(&self.final_));
        if let Some(sup) = SUPERSCRIPT_DIGITS.get(usize::from(self.tone)).filter(|_| self.tone > 0) {
            out.push(*sup);
        }
        out.nfc().collect()
    }
}

impl Pronunciation {
    pub fn to_ipa(&self) -> IpaPronunciation {
        let source_initial = self.initial().to_ascii_lowercase();
        let source_final = self.final_().to_ascii_lowercase();

        let mut initial = PUJ_IPA_INITIALS
            .iter()
            .find(|(puj, _)| *puj == source_initial)
            .map(|(_, ipa)| ipa.to_string())
            .unwrap_or_default();

        if let Some(&(_, syllabic, devoiced)) =
            PUJ_IPA_SYLLABIC.iter().find(|(f, _, _)| *f == source_final)
        {
            if source_initial == "h" {
                initial = devoiced.to_string();
            }
            return IpaPronunciation::new(initial, syllabic, self.tone());
        }

        // 鼻化：去掉 nn（可在喉塞尾 h 之前），每个元音后加 ~；可鼻化的同样处理
        let optional = self.nasalization() == Nasalization::Optional;
        let (body, nasalized) = match source_final.rfind(NASAL_MARK) {
            Some(pos) if matches!(&source_final[pos + NASAL_MARK.len()..], "" | "h") => {
                let mut body = source_final.clone();
                body.replace_range(pos..pos + NASAL_MARK.len(), "");
                (body, true)
            }
            _ => (source_final, optional),
        };

        let mut final_ = String::new();
        let mut rest = body.as_str();
        while let Some(c) = rest.chars().next() {
            match PUJ_IPA_FINAL_SEGMENTS.iter().find(|(seg, _)| rest.starts_with(seg)) {
                Some(&(seg, x_sampa)) => {
                    final_.push_str(x_sampa);
                    if nasalized && is_vowel_segment(seg) {
                        final_.push('~');
                    }
                    rest = &rest[seg.len()..];
                }
                // 撇号之类的无对应音段，跳过
                None => rest = &rest[c.len_utf8()..],
            }
        }
        IpaPronunciation::new(initial, final_, self.tone())
    }
}

// ============================================================
// X-SAMPA → IPA
// ============================================================

const SUPERSCRIPT_DIGITS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];

const MAX_TOKEN_CHARS: usize = 4;

const X_SAMPA_IPA: &[(&str, &str)] = &[
    ("t`_m", "ȶ"), ("d`_m", "ȡ"), ("n`_m", "ȵ"), ("l`_m", "ȴ"),
    ("ts", "ts"), ("dz", "dz"), ("tS", "tʃ"), ("dZ", "dʒ"), ("ts\\", "tɕ"), ("dz\\", "dʑ"),
    ("t`s`", "ʈʂ"), ("d`z`", "ɖʐ"),
    ("_h", "ʰ"), ("_j", "ʲ"), ("_P", "\u{32a}"), ("_0", "\u{30a}"),
    ("_=", "\u{329}"), ("=", "\u{30d}"), ("_}", "\u{31a}"), ("~", "\u{303}"), ("'", "ʲ"),
    ("_(", "₍"), ("_)", "₎"),
    ("+h\\", "ʱ"), ("+h", "ʰ"), ("+j", "ʲ"),
    ("a", "a"), ("a\\", "ä"), ("A\\", "ɐ̠"), ("A", "ɑ"),
    ("b\\", "ⱱ"), ("b", "b"), ("B\\", "ʙ"), ("B", "β"),
    ("c", "c"), ("C", "ç"),
    ("d", "d"), ("D`", "ɻ̝"), ("D\\", "ʓ"), ("D", "ð"),
    ("e", "e"), ("E\\", "e̽"), ("E", "ɛ"),
    ("f\\", "ʩ"), ("F\\", "Ɬ"), ("f", "f"), ("F", "ɱ"),
    ("g", "ɡ"), ("G\\", "ɢ"), ("G", "ɣ"),
    ("h\\", "ɦ"), ("h", "h"), ("H\\", "ʜ"), ("H", "ɥ"),
    ("i\\", "ɨ"), ("i", "i"), ("I\\", "ᵻ"), ("I", "ɪ"),
    ("j\\", "ʝ"), ("J\\", "ɟ"), ("j", "j"), ("J", "ɲ"),
    ("k", "k"),
    ("l", "l"),
    ("m\\", "ɯ̽"), ("M\\", "ɰ"), ("m", "m"), ("M", "ɯ"),
    ("n`", "ɳ"), ("n", "n"), ("N\\", "ɴ"), ("N", "ŋ"),
    ("o", "o"), ("O", "ɔ"),
    ("p\\", "ɸ"), ("p", "p"),
    ("q", "q"),
    ("r\\`", "ɻ"), ("r\\", "ɹ"), ("r`", "ɽ"), ("r", "r"), ("R\\", "ʀ"), ("R", "ʁ"),
    ("s`", "ʂ"), ("s\\", "ɕ"), ("s", "s"), ("S", "ʃ"),
    ("t`", "ʈ"), ("t", "t"), ("T", "θ"),
    ("u\\", "ʉ"), ("u", "u"), ("U\\", "ᵿ"), ("U", "ʊ"),
    ("v\\", "ʋ"), ("v", "v"), ("V", "ʌ"),
    ("w", "w"),
    ("x", "x"), ("X\\", "ħ"), ("X", "χ"),
    ("y", "y"), ("Y", "ʏ"),
    ("z`", "ʐ"), ("z\\", "ʑ"), ("z", "z"), ("Z", "ʒ"),
    (".", "."), ("\"", "ˈ"), (",", "ˌ"), ("%\\", "я"), ("%", "ˌ"),
    ("@`", "ɚ"), ("@\\", "ɘ"), ("@", "ə"),
    ("{", "æ"), ("}", "ʉ"), ("1", "ɨ"), ("2\\", "ø̽"), ("2", "ø"), ("3\\", "ɞ"), ("3`", "ɝ"), ("3", "ɜ"),
    ("4\\", "ɢ̆"), ("4", "ɾ"), ("5\\", "ꬸ"), ("5", "ɫ"), ("6\\", "ʎ̝"), ("6", "ɐ"), ("7\\", "ɤ̽"), ("7", "ɤ"),
    ("8\\", "ɥ̝̊"), ("8", "ɵ"), ("9\\", "ʡ̮"), ("9", "œ"), ("0", "Ø"), (":\\", "ˑ"), (":", "ː"), ("?\\", "ʕ"),
    ("?", "ʔ"), ("^\\", "ğ"), ("^", "ꜛ"), ("!", "ꜜ"), ("&\\", "ɶ̈"), ("&", "ɶ"),
    ("*\\", "\\*"), ("$\\", "ʀ̟"), ("$", "͢"), (")", "͡"), ("(", "͜"), ("-\\\\", "\\\\"), ("-\\", "‿"), ("-", ""),
    ("||", "‖"), ("|", "|"), ("+\\", "⦀"), (";", "¡"),
];

fn lookup_token(token: &str) -> Option<&'static str> {
    X_SAMPA_IPA.iter().find(|(x, _)| *x == token).map(|(_, ipa)| *ipa)
}

/// 贪心最长匹配：每个位置取能识别的最长 X-SAMPA 记号，认不出的字符原样保留
pub fn x_sampa_to_ipa(x_sampa: &str) -> String {
    let chars: Vec<char> = x_sampa.chars().collect();
    let mut out = String::with_capacity(x_sampa.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let max = MAX_TOKEN_CHARS.min(chars.len() - i);
        let hit = (1..=max).rev().find_map(|len| {
            let token: String = chars[i..i + len].iter().collect();
            lookup_token(&token).map(|ipa| (len, ipa))
        });
        match hit {
            Some((len, ipa)) => {
                out.push_str(ipa);
                i += len;
            }
            None => {
                out.push(chars[i]);
                i += 1;
            }
        }
    }
    out
}

// ============================================================
// 测试
// ============================================================
