//! # 模糊音规则
//!
//! 标准读音 → 某地口音读音的改写。原子规则是一条正则替换，作用在声母、韵母
//! 或声韵连写上；命名规则把若干原子规则按顺序串起来，口音再把命名规则按顺序串起来。
//! 顺序本身就是口音定义的一部分，后面的规则看到的是前面规则的输出。
//!
//! ## 缓存
//! 字表里的读音是封闭集合，每个口音建一次 [`FuzzyCache`]：
//! - 正向：标准读音 → 口音读音
//! - 反向：口音读音 → 所有归并到它的标准读音（同音字报告用）

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info};
use regex::Regex;
use serde::Deserialize;

use crate::error::{PujError, Result};
use crate::pronunciation::{parse_syllable, Pronunciation};

// ============================================================
// 规则
// ============================================================

/// 正则作用的范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum MatchScope {
    #[serde(rename = "initial")]
    Initial,
    #[serde(rename = "final")]
    Final,
    /// 声韵连写后整体替换，再按音节结构重新切分
    #[serde(rename = "initial+final")]
    InitialFinal,
}

/// 原子规则：一次正则替换（替换串用 `${1}` 引用分组）
#[derive(Debug, Clone)]
pub struct RuleAction {
    /// 所属命名规则，报错用
    rule: String,
    scope: MatchScope,
    pattern: Regex,
    replacement: String,
}

impl RuleAction {
    pub fn new(rule: &str, scope: MatchScope, pattern: &str, replacement: &str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|source| PujError::RulePattern {
            rule: rule.to_string(),
            source,
        })?;
        Ok(Self {
            rule: rule.to_string(),
            scope,
            pattern,
            replacement: replacement.to_string(),
        })
    }

    pub fn rule(&self) -> &str {
        &self.rule
    }

    pub fn scope(&self) -> MatchScope {
        self.scope
    }

    fn apply(&self, p: &Pronunciation) -> Result<Pronunciation> {
        match self.scope {
            MatchScope::Initial => {
                let initial = self.pattern.replace_all(p.initial_or_empty(), self.replacement.as_str());
                if initial == p.initial_or_empty() {
                    return Ok(p.clone());
                }
                p.with_parts(&initial, p.final_())
            }
            MatchScope::Final => {
                let final_ = self.pattern.replace_all(p.final_(), self.replacement.as_str());
                if final_ == p.final_() {
                    return Ok(p.clone());
                }
                p.with_parts(p.initial(), &final_)
            }
            MatchScope::InitialFinal => {
                let joined = format!("{}{}", p.initial_or_empty(), p.final_());
                let rewritten = self.pattern.replace_all(&joined, self.replacement.as_str());
                if rewritten == joined {
                    return Ok(p.clone());
                }
                let (initial, final_) =
                    split_initial_final(&rewritten).ok_or_else(|| PujError::RuleOutput {
                        rule: self.rule.clone(),
                        from: joined.clone(),
                        to: rewritten.to_string(),
                    })?;
                p.with_parts(initial, &final_)
            }
        }
    }
}

/// 无调号的声韵连写重新切分；撇号留在韵母里
fn split_initial_final(text: &str) -> Option<(&str, Cow<'_, str>)> {
    let syllable = parse_syllable(text)?;
    if syllable.tone.is_some() {
        return None;
    }
    Some((syllable.initial, syllable.canonical_final()))
}

/// 规则：原子替换，或按顺序组合的命名规则
#[derive(Debug, Clone)]
pub enum FuzzyRule {
    Action(RuleAction),
    Group { id: String, rules: Vec<FuzzyRule> },
}

impl FuzzyRule {
    pub fn group(id: impl Into<String>, rules: Vec<FuzzyRule>) -> Self {
        FuzzyRule::Group { id: id.into(), rules }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            FuzzyRule::Action(_) => None,
            FuzzyRule::Group { id, .. } => Some(id),
        }
    }

    /// 纯函数；不匹配时返回与输入相等的值
    pub fn apply(&self, p: &Pronunciation) -> Result<Pronunciation> {
        match self {
            FuzzyRule::Action(action) => action.apply(p),
            FuzzyRule::Group { rules, .. } => rules.iter().try_fold(p.clone(), |acc, rule| rule.apply(&acc)),
        }
    }
}

impl AsRef<FuzzyRule> for FuzzyRule {
    fn as_ref(&self) -> &FuzzyRule {
        self
    }
}

/// 依次应用一串规则
pub fn apply_group<R: AsRef<FuzzyRule>>(rules: &[R], p: &Pronunciation) -> Result<Pronunciation> {
    rules.iter().try_fold(p.clone(), |acc, rule| rule.as_ref().apply(&acc))
}

// ============================================================
// 缓存
// ============================================================

#[derive(Debug, Default, Clone)]
pub struct FuzzyCache {
    forward: HashMap<Pronunciation, Pronunciation>,
    reverse: HashMap<Pronunciation, Vec<Pronunciation>>,
    /// 口音读音按首次出现排列，保证报告顺序稳定
    surfaces: Vec<Pronunciation>,
}

impl FuzzyCache {
    /// 对全集里每个读音预先算好改写结果。任何一条规则出错都会让构建失败。
    pub fn build<'a, R: AsRef<FuzzyRule>>(
        rules: &[R],
        universe: impl IntoIterator<Item = &'a Pronunciation>,
    ) -> Result<Self> {
        let mut cache = FuzzyCache::default();

        for standard in universe {
            if cache.forward.contains_key(standard) {
                continue;
            }
            let surface = apply_group(rules, standard)?;
            let group = cache.reverse.entry(surface.clone()).or_insert_with(|| {
                cache.surfaces.push(surface.clone());
                Vec::new()
            });
            group.push(standard.clone());
            cache.forward.insert(standard.clone(), surface);
        }

        let collisions = cache.collisions().count();
        info!(
            "[Fuzzy] {} 个读音 → {} 个口音读音, {} 组同音归并",
            cache.forward.len(),
            cache.surfaces.len(),
            collisions
        );
        for (surface, standards) in cache.collisions() {
            debug!("[Fuzzy] {} ← {:?}", surface, standards.iter().map(|p| p.to_string()).collect::<Vec<_>>());
        }
        Ok(cache)
    }

    pub fn get(&self, standard: &Pronunciation) -> Option<&Pronunciation> {
        self.forward.get(standard)
    }

    /// 归并到同一口音读音的标准读音，按全集顺序
    pub fn homophones(&self, surface: &Pronunciation) -> &[Pronunciation] {
        self.reverse.get(surface).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// 两个及以上标准读音归并成同一读音的情况
    pub fn collisions(&self) -> impl Iterator<Item = (&Pronunciation, &[Pronunciation])> + '_ {
        self.surfaces.iter().filter_map(|surface| {
            let standards = self.reverse.get(surface)?;
            (standards.len() > 1).then(|| (surface, standards.as_slice()))
        })
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}

/// 共享的规则表
pub type RuleRef = Arc<FuzzyRule>;

// ============================================================
// 测试
// ============================================================
