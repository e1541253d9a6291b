//! # 字表
//!
//! 字 → 读音条目。一个字可能有多个条目（文白异读、多音字），
//! 查表结果按常用度、类别排序，最常用的在前。
//!
//! 条目以 JSON 数组存放，读音字段用数字调写法（`"peh8"`）。

use std::collections::HashMap;

use log::info;
use serde::Deserialize;

use crate::error::{PujError, Result};
use crate::pronunciation::Pronunciation;

/// 字表条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub index: u32,
    /// 繁体
    pub han: String,
    /// 简体
    pub han_sim: String,
    pub pronunciation: Pronunciation,
    /// 越大越常用
    pub frequency_rank: u32,
    pub category_rank: u32,
    /// 本字、参见字
    pub reference_han: Option<String>,
    pub glosses: Vec<String>,
}

impl Entry {
    /// 只有读音的条目，变调计算、测试用
    pub fn from_pronunciation(pronunciation: Pronunciation) -> Self {
        Self {
            index: 0,
            han: String::new(),
            han_sim: String::new(),
            pronunciation,
            frequency_rank: 0,
            category_rank: 0,
            reference_han: None,
            glosses: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct EntryRecord {
    index: u32,
    #[serde(rename = "char")]
    han: String,
    #[serde(rename = "char_sim", default)]
    han_sim: String,
    pronunciation: String,
    #[serde(default)]
    frequency_rank: u32,
    #[serde(default)]
    category_rank: u32,
    #[serde(rename = "reference_char", default)]
    reference_han: Option<String>,
    #[serde(default)]
    glosses: Vec<String>,
}

impl EntryRecord {
    fn into_entry(self) -> Result<Entry> {
        let pronunciation = Pronunciation::from_combination(&self.pronunciation)
            .or_else(|| Pronunciation::from_written(&self.pronunciation))
            .ok_or_else(|| PujError::EntryPronunciation {
                index: self.index,
                han: self.han.clone(),
                text: self.pronunciation.clone(),
            })?;
        let han_sim = if self.han_sim.is_empty() { self.han.clone() } else { self.han_sim };
        Ok(Entry {
            index: self.index,
            han: self.han,
            han_sim,
            pronunciation,
            frequency_rank: self.frequency_rank,
            category_rank: self.category_rank,
            reference_han: self.reference_han.filter(|s| !s.is_empty()),
            glosses: self.glosses,
        })
    }
}

// ============================================================
// Lexicon
// ============================================================

pub struct Lexicon {
    entries: Vec<Entry>,
    /// 简体 → 条目下标（已排序）
    by_sim: HashMap<String, Vec<usize>>,
    /// 繁体 → 条目下标（已排序）
    by_trd: HashMap<String, Vec<usize>>,
}

impl Lexicon {
    pub fn from_entries(entries: Vec<Entry>) -> Self {
        let mut by_sim: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_trd: HashMap<String, Vec<usize>> = HashMap::new();

        for (i, e) in entries.iter().enumerate() {
            by_sim.entry(e.han_sim.clone()).or_default().push(i);
            by_trd.entry(e.han.clone()).or_default().push(i);
        }

        // 常用度降序，其次类别降序；相同的保持原顺序
        for indices in by_sim.values_mut().chain(by_trd.values_mut()) {
            indices.sort_by(|&a, &b| {
                let (a, b) = (&entries[a], &entries[b]);
                b.frequency_rank
                    .cmp(&a.frequency_rank)
                    .then(b.category_rank.cmp(&a.category_rank))
            });
        }

        info!("[Lexicon] {} 条, {} 个简体字, {} 个繁体字", entries.len(), by_sim.len(), by_trd.len());
        Lexicon { entries, by_sim, by_trd }
    }

    /// 读音写坏的条目会让整个加载失败
    pub fn from_json(text: &str) -> Result<Self> {
        let records: Vec<EntryRecord> = serde_json::from_str(text)?;
        let entries = records
            .into_iter()
            .map(EntryRecord::into_entry)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_entries(entries))
    }

    /// 先查简体，查不到再查繁体
    pub fn lookup(&self, han: &str) -> Vec<&Entry> {
        self.by_sim
            .get(han)
            .or_else(|| self.by_trd.get(han))
            .map(|indices| indices.iter().map(|&i| &self.entries[i]).collect())
            .unwrap_or_default()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 字表里出现过的全部读音，去重，按首次出现排列
    pub fn pronunciations(&self) -> Vec<Pronunciation> {
        let mut seen = std::collections::HashSet::new();
        self.entries
            .iter()
            .filter(|e| seen.insert(&e.pronunciation))
            .map(|e| e.pronunciation.clone())
            .collect()
    }
}

// ============================================================
// 汉字判断
// ============================================================

/// CJK 统一表意文字（基本区 + 扩展 A）
const CJK_BASIC: &[(u32, u32)] = &[(0x4E00, 0x9FFF), (0x3400, 0x4DBF)];

/// 其余扩展区、兼容区、部首、标点
const CJK_EXTENDED: &[(u32, u32)] = &[
    (0x20000, 0x2A6DF),
    (0x2A700, 0x2B73F),
    (0x2B740, 0x2B81F),
    (0x2B820, 0x2CEAF),
    (0x2CEB0, 0x2EBEF),
    (0x30000, 0x3134F),
    (0x31350, 0x323AF),
    (0xF900, 0xFAFF),
    (0x2F800, 0x2FA1F),
    (0x2F00, 0x2FDF),
    (0x2E80, 0x2EFF),
    (0x3000, 0x303F),
];

/// `basic_only` 时只认常用的基本区和扩展 A
pub fn is_cjk_character(ch: char, basic_only: bool) -> bool {
    let o = u32::from(ch);
    let within = |ranges: &[(u32, u32)]| ranges.iter().any(|&(lo, hi)| (lo..=hi).contains(&o));
    within(CJK_BASIC) || (!basic_only && within(CJK_EXTENDED))
}

// ============================================================
// 测试
// ============================================================
