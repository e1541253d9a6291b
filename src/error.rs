//! # 错误类型
//!
//! 引擎只有两类会"失败"的情况：数据完整性错误（字表、规则表写坏了）
//! 和调用方违反前置条件。拼写解析失败不是错误，返回 `None`。

use thiserror::Error;

pub type Result<T, E = PujError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum PujError {
    /// 声调不在 1..=8
    #[error("tone {tone} out of range 1..=8 ({initial}{final_})")]
    ToneOutOfRange { initial: String, final_: String, tone: u8 },

    /// 入声韵配了舒声调，或反之
    #[error("tone {tone} does not fit final '{final_}' (checked finals take 4/8, others 1/2/3/5/6/7)")]
    ToneFinalMismatch { final_: String, tone: u8 },

    /// 韵母为空
    #[error("empty final")]
    EmptyFinal,

    /// 声韵合并改写后的结果不符合音节结构
    #[error("rule '{rule}' rewrote '{from}' into '{to}', which is not a syllable")]
    RuleOutput { rule: String, from: String, to: String },

    /// 规则正则写错
    #[error("rule '{rule}': bad pattern: {source}")]
    RulePattern {
        rule: String,
        #[source]
        source: regex::Error,
    },

    /// 口音引用了不存在的规则
    #[error("accent '{accent}' references unknown rule '{rule}'")]
    UnknownRule { accent: String, rule: String },

    /// 规则 id 重复
    #[error("duplicate rule id '{0}'")]
    DuplicateRule(String),

    /// 口音 id 重复
    #[error("duplicate accent id '{0}'")]
    DuplicateAccent(String),

    /// 调值表不足 8 项
    #[error("accent '{accent}': {table} tone table has {len} entries, expected 8")]
    ToneTableLength { accent: String, table: &'static str, len: usize },

    /// 字表里的读音写不出来
    #[error("entry {index} ('{han}'): unreadable pronunciation '{text}'")]
    EntryPronunciation { index: u32, han: String, text: String },

    /// 本调位置越界
    #[error("citation index {index} outside sandhi group of length {len}")]
    CitationOutOfRange { index: usize, len: usize },

    /// 内置口音表无法加载
    #[error("built-in accent catalog is invalid: {0}")]
    BuiltinCatalog(String),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
