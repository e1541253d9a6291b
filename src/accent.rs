//! # 口音与连读变调
//!
//! 口音 = 一串模糊音规则 + 三张调值表（本调、变调、轻声）+ 几个特殊开关。
//! 调值表按调类（1–8）取值，表里存的是调值（如 33、52、212），不是调类。
//!
//! ## 变调
//! 一个变调组里只有"本调位"读本调：它前面的字读变调，后面的字读轻声。
//! 从右往左逐字确定。
//!
//! ## 二三四声连读
//! 部分口音里，第 2/3/4 调的字在特定位置另有调值：
//! - 紧挨本调位的左字：3 调遇本调 2 调，读"可变三声"或 3 调的连读调；
//!   2/3/4 调遇本调不是 2/5/8 调，读该调的连读调
//! - 本调是 2 调、且左字是 2/3/4 调：本调读 21
//! - 更左边的字看 [`SmoothScope`]

use std::cmp::Ordering;

use serde::Deserialize;

use crate::error::{PujError, Result};
use crate::fuzzy::{apply_group, FuzzyCache, RuleRef};
use crate::lexicon::Entry;
use crate::pronunciation::Pronunciation;

// ============================================================
// 调值
// ============================================================

/// 2/3/4 调的连读调值
const SMOOTHING_CODES: [(u8, u16); 3] = [(2, 23), (3, 32), (4, 3)];
/// 本调 2 调被左字带低后的调值
const RIGHT_SMOOTH_2ND: u16 = 21;
/// 可变三声
const VARIABLE_3RD: u16 = 25;

/// 兜底口音的 id
pub const DUMMY_ID: &str = "Dummy";

fn smoothing_code(tone: u8) -> Option<u16> {
    SMOOTHING_CODES.iter().find(|(t, _)| *t == tone).map(|&(_, code)| code)
}

/// 一张调值表，按调类 1–8 取值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneTable([u16; 8]);

impl ToneTable {
    pub fn new(values: [u16; 8]) -> Self {
        ToneTable(values)
    }

    /// 从配置表读入，必须正好 8 项
    pub fn from_slice(accent: &str, table: &'static str, values: &[u16]) -> Result<Self> {
        let values: [u16; 8] = values.try_into().map_err(|_| PujError::ToneTableLength {
            accent: accent.to_string(),
            table,
            len: values.len(),
        })?;
        Ok(ToneTable(values))
    }

    /// 调值等于调类
    pub fn identity() -> Self {
        ToneTable([1, 2, 3, 4, 5, 6, 7, 8])
    }

    /// `tone` 由 [`Pronunciation`] 保证在 1..=8
    pub fn get(&self, tone: u8) -> u16 {
        self.0[usize::from(tone.clamp(1, 8)) - 1]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneTables {
    pub citation: ToneTable,
    pub sandhi: ToneTable,
    pub neutral: ToneTable,
}

impl ToneTables {
    pub fn identity() -> Self {
        Self {
            citation: ToneTable::identity(),
            sandhi: ToneTable::identity(),
            neutral: ToneTable::identity(),
        }
    }
}

/// 非紧邻本调位的前字是否也读连读调
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SmoothScope {
    /// 只有紧挨本调位的左字
    #[default]
    ImmediateLeft,
    /// 本调位之前的所有 2/3/4 调字
    AllPreceding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToneSpecials {
    pub smooth_2nd_3rd_4th: bool,
    /// 轻声位置的连读修正，目前只记录不生效
    pub smooth_neutral: bool,
    pub variable_3rd_2nd: bool,
    pub smoothing_scope: SmoothScope,
}

// ============================================================
// 变调组
// ============================================================

/// 一个变调组：若干连续条目 + 本调位下标
#[derive(Debug, Clone, Copy)]
pub struct SandhiGroup<'a> {
    entries: &'a [Entry],
    citation_index: usize,
}

impl<'a> SandhiGroup<'a> {
    pub fn new(entries: &'a [Entry], citation_index: usize) -> Result<Self> {
        if citation_index >= entries.len() {
            return Err(PujError::CitationOutOfRange { index: citation_index, len: entries.len() });
        }
        Ok(Self { entries, citation_index })
    }

    /// 本调在最后一个字
    pub fn ending_in_citation(entries: &'a [Entry]) -> Result<Self> {
        Self::new(entries, entries.len().saturating_sub(1))
    }

    pub fn entries(&self) -> &'a [Entry] {
        self.entries
    }

    pub fn citation_index(&self) -> usize {
        self.citation_index
    }
}

// ============================================================
// Accent
// ============================================================

#[derive(Debug, Clone)]
pub struct Accent {
    id: String,
    area: String,
    subarea: String,
    rules: Vec<RuleRef>,
    tones: ToneTables,
    specials: ToneSpecials,
    cache: FuzzyCache,
}

impl Accent {
    pub fn new(
        id: impl Into<String>,
        area: impl Into<String>,
        subarea: impl Into<String>,
        rules: Vec<RuleRef>,
        tones: ToneTables,
        specials: ToneSpecials,
    ) -> Self {
        Self {
            id: id.into(),
            area: area.into(),
            subarea: subarea.into(),
            rules,
            tones,
            specials,
            cache: FuzzyCache::default(),
        }
    }

    /// 没有规则、调值等于调类。查不到口音时用它兜底。
    pub fn dummy() -> Self {
        Self::new(DUMMY_ID, "", "", Vec::new(), ToneTables::identity(), ToneSpecials::default())
    }

    /// 对读音全集预先算好模糊音
    pub fn build_cache<'p>(&mut self, universe: impl IntoIterator<Item = &'p Pronunciation>) -> Result<()> {
        log::info!("[Fuzzy] {}: 构建缓存", self.id);
        self.cache = FuzzyCache::build(&self.rules, universe)?;
        Ok(())
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn area(&self) -> &str { &self.area }
    pub fn subarea(&self) -> &str { &self.subarea }
    pub fn rules(&self) -> &[RuleRef] { &self.rules }
    pub fn tones(&self) -> &ToneTables { &self.tones }
    pub fn specials(&self) -> &ToneSpecials { &self.specials }
    pub fn cache(&self) -> &FuzzyCache { &self.cache }

    /// 标准读音 → 本口音读音。在缓存里直接取，不在就现算。
    pub fn fuzzy(&self, p: &Pronunciation) -> Result<Pronunciation> {
        match self.cache.get(p) {
            Some(surface) => Ok(surface.clone()),
            None => apply_group(&self.rules, p),
        }
    }

    /// 每个字的实际调值，与变调组等长
    pub fn get_actual_tones(&self, group: &SandhiGroup<'_>) -> Vec<u16> {
        let tones: Vec<u8> = group.entries().iter().map(|e| e.pronunciation.tone()).collect();
        let citation = group.citation_index();
        let citation_tone = tones[citation];

        let mut actual = vec![0; tones.len()];
        for i in (0..tones.len()).rev() {
            actual[i] = match i.cmp(&citation) {
                Ordering::Greater => self.tones.neutral.get(tones[i]),
                Ordering::Equal => self.citation_code(&tones, citation),
                Ordering::Less => self.pre_citation_code(tones[i], citation_tone, i + 1 == citation),
            };
        }
        actual
    }

    fn citation_code(&self, tones: &[u8], citation: usize) -> u16 {
        let tone = tones[citation];
        if self.specials.smooth_2nd_3rd_4th
            && tone == 2
            && citation > 0
            && smoothing_code(tones[citation - 1]).is_some()
        {
            return RIGHT_SMOOTH_2ND;
        }
        self.tones.citation.get(tone)
    }

    fn pre_citation_code(&self, tone: u8, citation_tone: u8, adjacent: bool) -> u16 {
        let sandhi = self.tones.sandhi.get(tone);
        if !self.specials.smooth_2nd_3rd_4th {
            return sandhi;
        }

        if adjacent {
            if tone == 3 && citation_tone == 2 {
                return if self.specials.variable_3rd_2nd {
                    VARIABLE_3RD
                } else {
                    smoothing_code(3).unwrap_or(sandhi)
                };
            }
            if matches!(citation_tone, 2 | 5 | 8) {
                return sandhi;
            }
            return smoothing_code(tone).unwrap_or(sandhi);
        }

        match self.specials.smoothing_scope {
            SmoothScope::ImmediateLeft => sandhi,
            SmoothScope::AllPreceding => smoothing_code(tone).unwrap_or(sandhi),
        }
    }
}

// ============================================================
// 测试
// ============================================================
