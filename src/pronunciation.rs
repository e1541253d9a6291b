//! # 读音模型
//!
//! 一个读音 = 声母 + 韵母 + 调类（1–8）+ 鼻化标记。
//! 内部统一存 ASCII：特殊元音 ṳ、o̤ 记作 `v`、`r`，零声母记作 `"0"`。
//!
//! ## 音节结构
//! `声母? (介音)? 韵腹 (韵尾)* 调?`，按下表顺序逐项尝试，第一个能完整匹配的切分胜出。
//! 撇号不参与匹配，保留在韵母里。韵腹也认 `ur`/`ir`（ṳ）、`or`/`er`（o̤）这几种 ASCII 写法。
//!
//! ## 可鼻化
//! 可鼻化的读音在韵母里写 `(nn)` 标记：`sua(nn)1`、`i(nn)h4`。

use std::borrow::Cow;
use std::fmt;
use std::iter::once;

use crate::error::{PujError, Result};

/// 零声母的规范写法
pub const EMPTY_INITIAL: &str = "0";

/// 可鼻化标记
pub const OPTIONAL_NASAL_MARK: &str = "(nn)";

const APOSTROPHE: char = '\'';

// ============================================================
// 音节结构表
// ============================================================

/// 声母（顺序即尝试顺序）
const INITIALS: &[&str] = &[
    "p", "ph", "m", "b", "pf", "pfh", "mv", "bv", "f",
    "t", "th", "n", "l", "k", "kh", "ng", "g", "h",
    "ts", "c", "ch", "tsh", "chh", "s", "j", "z",
];

/// 介音，后面必须紧跟元音
const MEDIALS: &[&str] = &["y", "yi", "i", "u"];

/// 韵腹（调符落点所在）
const NUCLEI: &[&str] = &["a", "e", "o", "i", "u", "v", "r", "ur", "ir", "or", "er", "ng", "m"];

/// 韵腹的 ASCII 别写 → 内码
const NUCLEUS_ALIASES: &[(&str, &str)] = &[("ur", "v"), ("ir", "v"), ("or", "r"), ("er", "r")];

const CODA_GLIDES: &[&str] = &["y", "yi", "i", "u"];
const CODA_CONSONANTS: &[&str] = &["m", "n", "ng", "nn", "p", "t", "k", "h"];

/// 音节切分结果，各段都是原串的切片（保留大小写）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Syllable<'a> {
    pub initial: &'a str,
    pub medial: &'a str,
    pub nucleus: &'a str,
    pub coda: &'a str,
    /// initial 之后、调号之前的整段
    pub final_: &'a str,
    pub tone: Option<u8>,
}

impl<'a> Syllable<'a> {
    /// 韵腹写成别写时换回内码 v / r，其余原样
    pub fn canonical_final(&self) -> Cow<'a, str> {
        let nucleus = self.nucleus.replace(APOSTROPHE, "");
        match NUCLEUS_ALIASES.iter().find(|(alias, _)| nucleus.eq_ignore_ascii_case(alias)) {
            Some(&(_, canonical)) => {
                let canonical = if nucleus.starts_with(|c: char| c.is_ascii_uppercase()) {
                    canonical.to_ascii_uppercase()
                } else {
                    canonical.to_string()
                };
                Cow::Owned(format!("{}{}{}", self.medial, canonical, self.coda))
            }
            None => Cow::Borrowed(self.final_),
        }
    }
}

/// 去掉撇号后的前 n 个字符，在原串里结束于哪个字节
fn original_offset(text: &str, n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    text.bytes()
        .enumerate()
        .filter(|&(_, b)| b != APOSTROPHE as u8)
        .nth(n - 1)
        .map_or(text.len(), |(i, _)| i + 1)
}

/// 按音节结构切分 ASCII 串，末尾可带一位数字调号。不区分大小写。
pub(crate) fn parse_syllable(text: &str) -> Option<Syllable<'_>> {
    if text.is_empty() || !text.is_ascii() {
        return None;
    }
    let lower: String = text
        .chars()
        .filter(|&c| c != APOSTROPHE)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    let (body_len, tone) = match lower.as_bytes().last() {
        Some(&b) if b.is_ascii_digit() => (lower.len() - 1, Some(b - b'0')),
        _ => (lower.len(), None),
    };
    let body = &lower[..body_len];
    // 调号之前的撇号归韵母
    let body_end = match tone {
        Some(_) => original_offset(text, lower.len()) - 1,
        None => text.len(),
    };

    let initials = INITIALS
        .iter()
        .copied()
        .filter(|i| body.starts_with(i))
        .chain(once(""));

    for initial in initials {
        let rest = &body[initial.len()..];
        // mv / bv 只出现在 u 前
        if matches!(initial, "mv" | "bv") && !rest.starts_with('u') {
            continue;
        }
        if let Some((medial_len, nucleus_len)) = match_final(rest) {
            let i_end = original_offset(text, initial.len());
            // 撇号只能在韵母里
            if text[..i_end].contains(APOSTROPHE) {
                continue;
            }
            let m_end = original_offset(text, initial.len() + medial_len);
            let n_end = original_offset(text, initial.len() + medial_len + nucleus_len);
            return Some(Syllable {
                initial: &text[..i_end],
                medial: &text[i_end..m_end],
                nucleus: &text[m_end..n_end],
                coda: &text[n_end..body_end],
                final_: &text[i_end..body_end],
                tone,
            });
        }
    }
    None
}

/// 返回 (介音长度, 韵腹长度)
fn match_final(rest: &str) -> Option<(usize, usize)> {
    let medials = MEDIALS
        .iter()
        .copied()
        .filter(|m| {
            rest.starts_with(m) && rest[m.len()..].starts_with(|c: char| "aeoiu".contains(c))
        })
        .chain(once(""));

    for medial in medials {
        let after = &rest[medial.len()..];
        for nucleus in NUCLEI.iter().filter(|n| after.starts_with(*n)) {
            if is_coda(&after[nucleus.len()..]) {
                return Some((medial.len(), nucleus.len()));
            }
        }
    }
    None
}

fn is_coda(s: &str) -> bool {
    CODA_GLIDES
        .iter()
        .copied()
        .chain(once(""))
        .any(|g| s.starts_with(g) && is_consonant_run(&s[g.len()..]))
}

fn is_consonant_run(s: &str) -> bool {
    s.is_empty()
        || CODA_CONSONANTS
            .iter()
            .any(|c| s.starts_with(c) && is_consonant_run(&s[c.len()..]))
}

/// 入声韵：以 p/t/k/h 收尾（不计撇号）
pub fn is_checked_final(final_: &str) -> bool {
    final_
        .chars()
        .rev()
        .find(|&c| c != APOSTROPHE)
        .map_or(false, |c| matches!(c.to_ascii_lowercase(), 'p' | 't' | 'k' | 'h'))
}

/// 把鼻化标记插进韵母：有喉塞尾 h 时插在 h 前，否则接在末尾
pub(crate) fn insert_nasal_mark(final_: &str, mark: &str) -> String {
    let at = match final_.char_indices().last() {
        Some((i, c)) if c.eq_ignore_ascii_case(&'h') => i,
        _ => final_.len(),
    };
    let mut out = String::with_capacity(final_.len() + mark.len());
    out.push_str(&final_[..at]);
    out.push_str(mark);
    out.push_str(&final_[at..]);
    out
}

/// 去掉鼻化标记，并返回原先是否带标记
pub(crate) fn strip_nasal_mark<'a>(text: &'a str, mark: &str) -> (Cow<'a, str>, bool) {
    if text.contains(mark) {
        (Cow::Owned(text.replacen(mark, "", 1)), true)
    } else {
        (Cow::Borrowed(text), false)
    }
}

// ============================================================
// Pronunciation
// ============================================================

/// 鼻化
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Nasalization {
    #[default]
    None,
    /// 韵母带 nn
    Always,
    /// 可鼻化可不鼻化，韵母本身不带 nn
    Optional,
}

impl Nasalization {
    fn of_final(final_: &str) -> Self {
        if final_.to_ascii_lowercase().contains("nn") {
            Nasalization::Always
        } else {
            Nasalization::None
        }
    }
}

/// ASCII 白话字读音。构造时校验调类与韵母的搭配，之后不可变。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pronunciation {
    initial: String,
    final_: String,
    tone: u8,
    nasalization: Nasalization,
}

impl Pronunciation {
    /// 空声母会被规范成 `"0"`。入声韵只配 4/8 调，舒声韵只配 1/2/3/5/6/7 调。
    pub fn new(initial: impl Into<String>, final_: impl Into<String>, tone: u8) -> Result<Self> {
        let mut initial = initial.into();
        if initial.is_empty() {
            initial = EMPTY_INITIAL.to_string();
        }
        let final_ = final_.into();
        if final_.is_empty() {
            return Err(PujError::EmptyFinal);
        }
        if !(1..=8).contains(&tone) {
            return Err(PujError::ToneOutOfRange { initial, final_, tone });
        }
        if is_checked_final(&final_) != matches!(tone, 4 | 8) {
            return Err(PujError::ToneFinalMismatch { final_, tone });
        }
        let nasalization = Nasalization::of_final(&final_);
        Ok(Self { initial, final_, tone, nasalization })
    }

    /// 标为"可鼻化"，韵母里的 nn 去掉
    pub fn with_optional_nasalization(mut self) -> Self {
        if let Some(pos) = self.final_.to_ascii_lowercase().find("nn") {
            self.final_.replace_range(pos..pos + 2, "");
        }
        self.nasalization = Nasalization::Optional;
        self
    }

    /// 换掉声韵、保留调类，重新校验。规则改写用。
    pub(crate) fn with_parts(&self, initial: &str, final_: &str) -> Result<Self> {
        let mut result = Self::new(initial, final_, self.tone)?;
        if self.nasalization == Nasalization::Optional
            && result.nasalization == Nasalization::None
        {
            result.nasalization = Nasalization::Optional;
        }
        Ok(result)
    }

    pub fn initial(&self) -> &str { &self.initial }
    pub fn final_(&self) -> &str { &self.final_ }
    pub fn tone(&self) -> u8 { self.tone }
    pub fn nasalization(&self) -> Nasalization { self.nasalization }

    /// 零声母返回空串
    pub fn initial_or_empty(&self) -> &str {
        if self.initial == EMPTY_INITIAL { "" } else { &self.initial }
    }

    pub fn is_checked(&self) -> bool {
        is_checked_final(&self.final_)
    }

    /// 韵母；可鼻化时带上 `(nn)` 标记
    pub fn marked_final(&self) -> Cow<'_, str> {
        match self.nasalization {
            Nasalization::Optional => Cow::Owned(insert_nasal_mark(&self.final_, OPTIONAL_NASAL_MARK)),
            _ => Cow::Borrowed(&self.final_),
        }
    }

    /// 按是否带可鼻化标记收尾
    pub(crate) fn with_marked(self, optional: bool) -> Self {
        if optional { self.with_optional_nasalization() } else { self }
    }

    /// 数字调形式 "peh8" / "sua(nn)1" → Pronunciation
    pub fn from_combination(combination: &str) -> Option<Self> {
        let (text, optional) = strip_nasal_mark(combination, OPTIONAL_NASAL_MARK);
        let syllable = parse_syllable(&text)?;
        let tone = syllable.tone?;
        let p = Self::new(syllable.initial, syllable.canonical_final(), tone).ok()?;
        Some(p.with_marked(optional))
    }

    /// Pronunciation → "peh8"
    pub fn to_combination(&self) -> String {
        format!("{}{}{}", self.initial_or_empty(), self.marked_final(), self.tone)
    }
}

impl fmt::Display for Pronunciation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_combination())
    }
}

// ============================================================
// 测试
// ============================================================
