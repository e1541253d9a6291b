//! # pujphon — 潮汕白话字音系工具
//!
//! 输入一串音节（数字调 `liah8` 或调符 `liáh`，可用连字符连写），
//! 逐字打印各种写法、口音读音，以及末字为本调时的连读调值。

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;

use pujphon::config::Config;
use pujphon::{split_sentence, AccentRegistry, Entry, Lexicon, Pronunciation, SandhiGroup, Segment};

#[derive(Parser)]
#[command(name = "pujphon", version)]
#[command(about = "潮汕白话字：拼写转换、口音读音、连读变调")]
struct Cli {
    /// 口音 id，不填用 config.toml 里的 [accent] default
    #[arg(short, long)]
    accent: Option<String>,

    /// 列出所有口音
    #[arg(long)]
    list: bool,

    /// 音节，如 liah8 ngiau2 tshv2 或 "lia̍h-ngiáu"
    syllables: Vec<String>,
}

// ============================================================
// 主入口
// ============================================================

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn")
    ).init();

    let cli = Cli::parse();
    let config = Config::load();
    let registry = load_registry(&config)?;

    if cli.list {
        for accent in registry.accents() {
            println!("{:<22} {} {}", accent.id(), accent.area(), accent.subarea());
        }
        return Ok(());
    }

    let accent_id = cli.accent.unwrap_or_else(|| config.accent.default.clone());
    if !registry.contains(&accent_id) {
        warn!("[Config] 未知口音 {}, 按原读音输出", accent_id);
    }
    let accent = registry.get_accent(&accent_id);

    let entries = parse_syllables(&cli.syllables)?;
    if entries.is_empty() {
        return Ok(());
    }
    let group = SandhiGroup::ending_in_citation(&entries)?;
    let tones = accent.get_actual_tones(&group);

    for (entry, tone) in entries.iter().zip(&tones) {
        let p = &entry.pronunciation;
        let surface = accent
            .fuzzy(p)
            .with_context(|| format!("{} 口音规则出错: {}", accent.id(), p))?;

        let mut line = format!("{:<10} {:<10}", p.to_combination(), p.to_written());
        if config.output.dp {
            line.push_str(&format!(" {:<10}", p.to_dp().to_string()));
        }
        if config.output.ipa {
            line.push_str(&format!(" {:<12}", p.to_ipa().to_written()));
        }
        line.push_str(&format!(" {:<10} {}", surface.to_written(), tone));
        println!("{}", line);
    }
    Ok(())
}

/// 命令行参数 → 条目。每个参数可以是单个音节（可带 `(nn)`），也可以是连字符连写的多个音节。
fn parse_syllables(args: &[String]) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();
    for arg in args {
        if let Some(p) = parse_one(arg) {
            entries.push(Entry::from_pronunciation(p));
            continue;
        }
        for segment in split_sentence(arg) {
            if let Segment::Word { text, .. } = segment {
                let p = parse_one(&text).with_context(|| format!("无法识别的音节: {}", text))?;
                entries.push(Entry::from_pronunciation(p));
            }
        }
    }
    Ok(entries)
}

fn parse_one(text: &str) -> Option<Pronunciation> {
    Pronunciation::from_combination(text).or_else(|| Pronunciation::from_written(text))
}

/// 口音表：配置里指定了就读文件，否则用内置的；有字表时顺带建缓存
fn load_registry(config: &Config) -> Result<AccentRegistry> {
    let registry = match &config.accent.catalog {
        Some(path) => {
            let text = read(path)?;
            AccentRegistry::from_toml(&text)
                .with_context(|| format!("口音表 {:?} 无效", path))?
        }
        None => AccentRegistry::builtin().context("内置口音表无效")?,
    };

    match &config.lexicon.path {
        Some(path) => {
            let lexicon = Lexicon::from_json(&read(path)?)
                .with_context(|| format!("字表 {:?} 无效", path))?;
            registry
                .with_universe(&lexicon.pronunciations())
                .context("构建模糊音缓存失败")
        }
        None => Ok(registry),
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("读取 {:?} 失败", path))
}
