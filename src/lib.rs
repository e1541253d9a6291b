//! # pujphon — 潮汕白话字音系引擎
//!
//! - [`pronunciation`]：读音模型（声母 / 韵母 / 调类 / 鼻化）
//! - [`written`] / [`dp`] / [`ipa`]：白话字调符、潮州话拼音方案、国际音标互转
//! - [`fuzzy`]：口音模糊音规则与缓存
//! - [`accent`] / [`catalog`]：口音定义、连读变调、内置口音表
//! - [`lexicon`]：字表

pub mod accent;
pub mod catalog;
pub mod config;
pub mod dp;
pub mod error;
pub mod fuzzy;
pub mod ipa;
pub mod lexicon;
pub mod pronunciation;
pub mod written;

pub use accent::{Accent, SandhiGroup, SmoothScope, ToneSpecials, ToneTable, ToneTables};
pub use catalog::{global_registry, AccentRegistry};
pub use dp::DpPronunciation;
pub use error::{PujError, Result};
pub use fuzzy::{apply_group, FuzzyCache, FuzzyRule, MatchScope, RuleAction};
pub use ipa::IpaPronunciation;
pub use lexicon::{is_cjk_character, Entry, Lexicon};
pub use pronunciation::{Nasalization, Pronunciation, OPTIONAL_NASAL_MARK};
pub use written::{mark_numbered, split_sentence, Segment};
