//! # 口音表
//!
//! 从 TOML 读入原子规则和口音定义，按 id 连起来。
//! 内置一份（`data/accents.toml`），也可以从配置指定的文件加载。
//!
//! ## 加载流程
//! 1. 解析 `[[rules]]`，每条编译成 [`FuzzyRule::Group`]，id 不许重复
//! 2. 解析 `[[accents]]`，规则按 id 引用，调值表必须 8 项
//! 3. 可选：用字表的读音全集给每个口音建模糊音缓存

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use log::{error, info, warn};
use serde::Deserialize;

use crate::accent::{Accent, SmoothScope, ToneSpecials, ToneTable, ToneTables};
use crate::error::{PujError, Result};
use crate::fuzzy::{FuzzyRule, MatchScope, RuleAction, RuleRef};
use crate::pronunciation::Pronunciation;

const BUILTIN_ACCENTS: &str = include_str!("../data/accents.toml");

// ============================================================
// 表结构
// ============================================================

#[derive(Debug, Deserialize)]
struct AccentsTable {
    #[serde(default)]
    rules: Vec<RuleDef>,
    #[serde(default)]
    accents: Vec<AccentDef>,
}

#[derive(Debug, Deserialize)]
struct RuleDef {
    id: String,
    actions: Vec<ActionDef>,
}

#[derive(Debug, Deserialize)]
struct ActionDef {
    scope: MatchScope,
    pattern: String,
    #[serde(default)]
    replacement: String,
}

#[derive(Debug, Deserialize)]
struct AccentDef {
    id: String,
    #[serde(default)]
    area: String,
    #[serde(default)]
    subarea: String,
    #[serde(default)]
    rules: Vec<String>,
    citation: Vec<u16>,
    sandhi: Vec<u16>,
    neutral: Vec<u16>,
    #[serde(default)]
    smooth_2nd_3rd_4th: bool,
    #[serde(default)]
    smooth_neutral: bool,
    #[serde(default)]
    variable_3rd_2nd: bool,
    #[serde(default)]
    smoothing_scope: SmoothScope,
}

impl RuleDef {
    fn compile(self) -> Result<FuzzyRule> {
        let actions = self
            .actions
            .iter()
            .map(|a| RuleAction::new(&self.id, a.scope, &a.pattern, &a.replacement).map(FuzzyRule::Action))
            .collect::<Result<Vec<_>>>()?;
        Ok(FuzzyRule::group(self.id, actions))
    }
}

impl AccentDef {
    fn compile(self, catalog: &HashMap<String, RuleRef>) -> Result<Accent> {
        let rules = self
            .rules
            .iter()
            .map(|id| {
                catalog.get(id).cloned().ok_or_else(|| PujError::UnknownRule {
                    accent: self.id.clone(),
                    rule: id.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let tones = ToneTables {
            citation: ToneTable::from_slice(&self.id, "citation", &self.citation)?,
            sandhi: ToneTable::from_slice(&self.id, "sandhi", &self.sandhi)?,
            neutral: ToneTable::from_slice(&self.id, "neutral", &self.neutral)?,
        };
        let specials = ToneSpecials {
            smooth_2nd_3rd_4th: self.smooth_2nd_3rd_4th,
            smooth_neutral: self.smooth_neutral,
            variable_3rd_2nd: self.variable_3rd_2nd,
            smoothing_scope: self.smoothing_scope,
        };
        if specials.smooth_neutral {
            warn!("[Catalog] {}: smooth_neutral 暂不生效", self.id);
        }
        Ok(Accent::new(self.id, self.area, self.subarea, rules, tones, specials))
    }
}

// ============================================================
// AccentRegistry
// ============================================================

pub struct AccentRegistry {
    rules: HashMap<String, RuleRef>,
    /// 保持表里的顺序
    accents: Vec<Accent>,
    index: HashMap<String, usize>,
    dummy: Accent,
}

impl AccentRegistry {
    /// 内置口音表
    pub fn builtin() -> Result<Self> {
        Self::from_toml(BUILTIN_ACCENTS)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let table: AccentsTable = toml::from_str(text)?;

        let mut rules: HashMap<String, RuleRef> = HashMap::new();
        for def in table.rules {
            if rules.contains_key(&def.id) {
                return Err(PujError::DuplicateRule(def.id));
            }
            let id = def.id.clone();
            rules.insert(id, Arc::new(def.compile()?));
        }

        let mut accents = Vec::with_capacity(table.accents.len());
        let mut index = HashMap::new();
        for def in table.accents {
            if index.contains_key(&def.id) {
                return Err(PujError::DuplicateAccent(def.id));
            }
            index.insert(def.id.clone(), accents.len());
            accents.push(def.compile(&rules)?);
        }

        info!("[Catalog] {} 条规则, {} 个口音", rules.len(), accents.len());
        Ok(Self { rules, accents, index, dummy: Accent::dummy() })
    }

    /// 用读音全集给每个口音建缓存
    pub fn with_universe(mut self, universe: &[Pronunciation]) -> Result<Self> {
        for accent in &mut self.accents {
            accent.build_cache(universe)?;
        }
        info!("[Catalog] 缓存就绪: {} 个读音", universe.len());
        Ok(self)
    }

    /// 查不到的 id 返回兜底口音，不报错
    pub fn get_accent(&self, id: &str) -> &Accent {
        match self.index.get(id) {
            Some(&i) => &self.accents[i],
            None => &self.dummy,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn accents(&self) -> impl Iterator<Item = &Accent> + '_ {
        self.accents.iter()
    }

    pub fn rule(&self, id: &str) -> Option<&RuleRef> {
        self.rules.get(id)
    }
}

static REGISTRY: OnceLock<std::result::Result<AccentRegistry, String>> = OnceLock::new();

/// 进程内共享的内置口音表（不带缓存）。内置表写坏了每次调用都返回错误。
pub fn global_registry() -> Result<&'static AccentRegistry> {
    shared(&REGISTRY, AccentRegistry::builtin)
}

fn shared(
    cell: &'static OnceLock<std::result::Result<AccentRegistry, String>>,
    build: impl FnOnce() -> Result<AccentRegistry>,
) -> Result<&'static AccentRegistry> {
    cell.get_or_init(|| {
        build().map_err(|e| {
            error!("[Catalog] 内置口音表加载失败: {}", e);
            e.to_string()
        })
    })
    .as_ref()
    .map_err(|reason| PujError::BuiltinCatalog(reason.clone()))
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn p(comb: &str) -> Pronunciation {
        Pronunciation::from_combination(comb).unwrap()
    }

    const SMALL: &str = r#"
        [[rules]]
        id = "R_As_O"
        actions = [{ scope = "final", pattern = '^r$', replacement = 'o' }]

        [[accents]]
        id = "Test"
        area = "测试"
        rules = ["R_As_O"]
        citation = [1, 2, 3, 4, 5, 6, 7, 8]
        sandhi = [1, 2, 3, 4, 5, 6, 7, 8]
        neutral = [1, 2, 3, 4, 5, 6, 7, 8]
    "#;

    #[test]
    fn test_builtin() {
        let registry = AccentRegistry::builtin().unwrap();
        let ids: Vec<&str> = registry.accents().map(|a| a.id()).collect();
        assert_eq!(
            ids,
            vec![
                "ChaoZhou", "XiQiang", "ChaoAn", "FengShun", "RaoPing", "ChengHai_ChengCheng",
                "ShanTou_ShiQu", "JieYang", "ChaoYang", "PuNing", "HuiLai", "LuFeng",
            ]
        );

        let shantou = registry.get_accent("ShanTou_ShiQu");
        assert_eq!((shantou.area(), shantou.subarea()), ("汕头", "市区"));
        assert_eq!(shantou.rules().len(), 16);
        assert_eq!(shantou.rules()[0].id(), Some("R_As_O"));

        let chenghai = registry.get_accent("ChengHai_ChengCheng");
        assert!(chenghai.specials().smooth_2nd_3rd_4th);
        assert_eq!(chenghai.specials().smoothing_scope, SmoothScope::AllPreceding);
        assert!(!shantou.specials().smooth_2nd_3rd_4th);
    }

    #[test]
    fn test_builtin_fuzzy() {
        let registry = AccentRegistry::builtin().unwrap();
        let shantou = registry.get_accent("ShanTou_ShiQu");
        assert_eq!(shantou.fuzzy(&p("lr2")).unwrap(), p("lo2"));
        assert_eq!(shantou.fuzzy(&p("kio3")).unwrap(), p("kie3"));
        assert_eq!(shantou.fuzzy(&p("tiong5")).unwrap(), p("tong5"));
        assert_eq!(shantou.fuzzy(&p("sng1")).unwrap(), p("svng1"));

        let luifeng = registry.get_accent("LuFeng");
        assert_eq!(luifeng.fuzzy(&p("lr2")).unwrap(), p("le2"));
        assert_eq!(luifeng.fuzzy(&p("tshv2")).unwrap(), p("tshu2"));
    }

    #[test]
    fn test_unknown_accent_is_dummy() {
        let registry = AccentRegistry::builtin().unwrap();
        let dummy = registry.get_accent("NoSuchAccent");
        assert_eq!(dummy.id(), "Dummy");
        assert!(!registry.contains("NoSuchAccent"));
        assert_eq!(dummy.fuzzy(&p("lr2")).unwrap(), p("lr2"));
        for tone in 1..=8u8 {
            assert_eq!(dummy.tones().sandhi.get(tone), u16::from(tone));
        }
    }

    #[test]
    fn test_from_toml() {
        let registry = AccentRegistry::from_toml(SMALL).unwrap();
        assert!(registry.contains("Test"));
        assert!(registry.rule("R_As_O").is_some());
        assert_eq!(registry.get_accent("Test").fuzzy(&p("lr5")).unwrap(), p("lo5"));
    }

    #[test]
    fn test_unknown_rule() {
        let text = SMALL.replace(r#"rules = ["R_As_O"]"#, r#"rules = ["R_As_O", "Nope"]"#);
        assert!(matches!(
            AccentRegistry::from_toml(&text),
            Err(PujError::UnknownRule { ref rule, .. }) if rule == "Nope"
        ));
    }

    #[test]
    fn test_duplicates() {
        let rules_twice = format!("{}\n[[rules]]\nid = \"R_As_O\"\nactions = []\n", SMALL);
        assert!(matches!(AccentRegistry::from_toml(&rules_twice), Err(PujError::DuplicateRule(_))));

        let accent_twice = format!(
            "{}\n[[accents]]\nid = \"Test\"\ncitation = [1,2,3,4,5,6,7,8]\nsandhi = [1,2,3,4,5,6,7,8]\nneutral = [1,2,3,4,5,6,7,8]\n",
            SMALL
        );
        assert!(matches!(AccentRegistry::from_toml(&accent_twice), Err(PujError::DuplicateAccent(_))));
    }

    #[test]
    fn test_bad_tables() {
        let short = SMALL.replace("neutral = [1, 2, 3, 4, 5, 6, 7, 8]", "neutral = [1, 2]");
        assert!(matches!(
            AccentRegistry::from_toml(&short),
            Err(PujError::ToneTableLength { table: "neutral", len: 2, .. })
        ));
        let bad_regex = SMALL.replace("'^r$'", "'^(r$'");
        assert!(matches!(AccentRegistry::from_toml(&bad_regex), Err(PujError::RulePattern { .. })));
        assert!(matches!(AccentRegistry::from_toml("[[accents]"), Err(PujError::Toml(_))));
    }

    #[test]
    fn test_with_universe() {
        let universe = vec![p("lr2"), p("lo2"), p("ka1")];
        let registry = AccentRegistry::from_toml(SMALL).unwrap().with_universe(&universe).unwrap();
        let accent = registry.get_accent("Test");
        assert_eq!(accent.cache().len(), 3);
        assert_eq!(accent.cache().homophones(&p("lo2")), &[p("lr2"), p("lo2")]);
        assert_eq!(accent.fuzzy(&p("lr2")).unwrap(), p("lo2"));
    }

    #[test]
    fn test_global_registry() {
        let registry = global_registry().unwrap();
        assert!(registry.contains("ChengHai_ChengCheng"));
        assert!(std::ptr::eq(registry, global_registry().unwrap()));
    }

    #[test]
    fn test_shared_build_failure_is_reported() {
        static BROKEN: OnceLock<std::result::Result<AccentRegistry, String>> = OnceLock::new();
        let bad = SMALL.replace("'^r$'", "'^(r$'");

        let first = shared(&BROKEN, || AccentRegistry::from_toml(&bad));
        assert!(matches!(first, Err(PujError::BuiltinCatalog(ref reason)) if reason.contains("R_As_O")));
        // 之后的调用不会退化成空表
        let again = shared(&BROKEN, AccentRegistry::builtin);
        assert!(matches!(again, Err(PujError::BuiltinCatalog(_))));
    }
}
