//! # 配置管理
//!
//! 从 exe 同目录（其次是当前目录）的 `config.toml` 加载用户配置。
//! 文件不存在或解析失败时使用默认值。

use log::{info, warn};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 顶层配置
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub accent: AccentConfig,
    #[serde(default)]
    pub lexicon: LexiconConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// 口音配置
#[derive(Debug, Deserialize, Clone)]
pub struct AccentConfig {
    /// 命令行没指定时用的口音
    #[serde(default = "default_accent")]
    pub default: String,
    /// 自定义口音表，不填用内置的
    #[serde(default)]
    pub catalog: Option<PathBuf>,
}

fn default_accent() -> String { "ShanTou_ShiQu".to_string() }

impl Default for AccentConfig {
    fn default() -> Self {
        Self { default: default_accent(), catalog: None }
    }
}

/// 字表配置
#[derive(Debug, Deserialize, Clone, Default)]
pub struct LexiconConfig {
    /// 字表 JSON，给了就用它的读音全集建模糊音缓存
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// 输出配置
#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_true")]
    pub ipa: bool,
    #[serde(default = "default_true")]
    pub dp: bool,
}

fn default_true() -> bool { true }

impl Default for OutputConfig {
    fn default() -> Self {
        Self { ipa: true, dp: true }
    }
}

impl Config {
    /// 加载 config.toml，不存在则用默认值
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                info!("[Config] config.toml 不存在, 使用默认配置");
                Config::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => match Self::parse(&text) {
                Ok(cfg) => {
                    info!("[Config] 已加载 {:?}", path);
                    info!("[Config]   accent={}, ipa={}, dp={}",
                        cfg.accent.default, cfg.output.ipa, cfg.output.dp);
                    if let Some(catalog) = &cfg.accent.catalog {
                        info!("[Config]   catalog: {:?}", catalog);
                    }
                    if let Some(lexicon) = &cfg.lexicon.path {
                        info!("[Config]   lexicon: {:?}", lexicon);
                    }
                    cfg
                }
                Err(e) => {
                    warn!("[Config] 解析失败: {}, 使用默认配置", e);
                    Config::default()
                }
            },
            Err(e) => {
                warn!("[Config] 读取 {:?} 失败: {}, 使用默认配置", path, e);
                Config::default()
            }
        }
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// exe 同目录优先，其次当前目录
    fn config_path() -> Option<PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|d| d.join("config.toml")))
            .filter(|p| p.exists())
            .or_else(|| {
                let p = Path::new("config.toml");
                if p.exists() { Some(p.to_path_buf()) } else { None }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::parse("").unwrap();
        assert_eq!(cfg.accent.default, "ShanTou_ShiQu");
        assert!(cfg.accent.catalog.is_none());
        assert!(cfg.lexicon.path.is_none());
        assert!(cfg.output.ipa && cfg.output.dp);
    }

    #[test]
    fn test_partial() {
        let cfg = Config::parse(
            r#"
            [accent]
            default = "ChengHai_ChengCheng"

            [output]
            dp = false
            "#,
        )
        .unwrap();
        assert_eq!(cfg.accent.default, "ChengHai_ChengCheng");
        assert!(cfg.output.ipa);
        assert!(!cfg.output.dp);
    }

    #[test]
    fn test_paths() {
        let cfg = Config::parse(
            r#"
            [accent]
            catalog = "accents.toml"
            [lexicon]
            path = "entries.json"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.accent.catalog, Some(PathBuf::from("accents.toml")));
        assert_eq!(cfg.lexicon.path, Some(PathBuf::from("entries.json")));
    }

    #[test]
    fn test_load_missing_file() {
        let cfg = Config::load_from(Path::new("/nonexistent/pujphon/config.toml"));
        assert_eq!(cfg.accent.default, "ShanTou_ShiQu");
    }
}
