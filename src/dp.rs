//! # 潮州话拼音方案（DP）
//!
//! 声母查表直转；查不到的（包括所有韵母）走替换链：
//! 元音 e→ê、ṳ→e、o̤→er、au→ao，韵尾 -n→-nd、-nn→-n、-p/-t/-k→-b/-d/-g。

use std::fmt;

use unicode_normalization::UnicodeNormalization;

use crate::pronunciation::{insert_nasal_mark, strip_nasal_mark, Nasalization, Pronunciation};

/// 可鼻化标记（潮拼的鼻化韵尾写 n）
const DP_OPTIONAL_NASAL_MARK: &str = "(n)";

/// PUJ 声母 → DP 声母
const PUJ_DP_INITIALS: &[(&str, &str)] = &[
    ("", ""),
    ("0", ""),
    ("p", "b"),
    ("ph", "p"),
    ("m", "m"),
    ("b", "bh"),
    ("t", "d"),
    ("th", "t"),
    ("n", "n"),
    ("l", "l"),
    ("k", "g"),
    ("kh", "k"),
    ("ng", "ng"),
    ("g", "gh"),
    ("h", "h"),
    ("ts", "z"),
    ("tsh", "c"),
    ("s", "s"),
    ("j", "r"),
];

/// 潮拼读音
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DpPronunciation {
    pub initial: String,
    pub final_: String,
    pub tone: u8,
}

impl fmt::Display for DpPronunciation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.initial, self.final_, self.tone)
    }
}

fn to_dp_part(part: &str) -> String {
    if let Some((_, dp)) = PUJ_DP_INITIALS.iter().find(|(puj, _)| *puj == part) {
        return dp.to_string();
    }
    let mut s = part
        .replace('e', "\u{ea}")
        .replace('v', "e")
        .replace('r', "er")
        .replace("au", "ao");
    if s.ends_with("nn") {
        s.pop();
    } else if s.ends_with('n') {
        s.push('d');
    } else if let Some(last) = s.pop() {
        s.push(match last {
            'p' => 'b',
            't' => 'd',
            'k' => 'g',
            c => c,
        });
    }
    s
}

fn from_dp_part(part: &str) -> String {
    if let Some((puj, _)) = PUJ_DP_INITIALS.iter().find(|(_, dp)| *dp == part) {
        return puj.to_string();
    }
    let mut s: String = part.nfc().collect();
    if s.ends_with("nd") {
        s.pop();
    } else if s.ends_with('n') {
        s.push('n');
    } else if !s.ends_with("ng") {
        if let Some(last) = s.pop() {
            s.push(match last {
                'b' => 'p',
                'd' => 't',
                'g' => 'k',
                c => c,
            });
        }
    }
    // 先还原 er，再 e→ṳ，最后 ê→e
    s.replace("ao", "au")
        .replace("er", "r")
        .replace('e', "v")
        .replace('\u{ea}', "e")
}

impl Pronunciation {
    pub fn to_dp(&self) -> DpPronunciation {
        let mut final_ = to_dp_part(self.final_());
        if self.nasalization() == Nasalization::Optional {
            final_ = insert_nasal_mark(&final_, DP_OPTIONAL_NASAL_MARK);
        }
        DpPronunciation {
            initial: to_dp_part(self.initial()),
            final_,
            tone: self.tone(),
        }
    }

    /// 潮拼 → Pronunciation，还原后不合声调规则的返回 `None`
    pub fn from_dp(dp: &DpPronunciation) -> Option<Self> {
        let (final_, optional) = strip_nasal_mark(&dp.final_, DP_OPTIONAL_NASAL_MARK);
        Pronunciation::new(from_dp_part(&dp.initial), from_dp_part(&final_), dp.tone)
            .ok()
            .map(|p| p.with_marked(optional))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dp(comb: &str) -> String {
        Pronunciation::from_combination(comb).unwrap().to_dp().to_string()
    }

    #[test]
    fn test_to_dp() {
        assert_eq!(dp("peh8"), "b\u{ea}h8");
        assert_eq!(dp("tsiang1"), "ziang1");
        assert_eq!(dp("tshv2"), "ce2");
        assert_eq!(dp("lr5"), "ler5");
        assert_eq!(dp("kau3"), "gao3");
        assert_eq!(dp("suann1"), "suan1");
        assert_eq!(dp("uan5"), "uand5");
        assert_eq!(dp("tsap8"), "zab8");
        assert_eq!(dp("jit8"), "rid8");
        assert_eq!(dp("kok4"), "gog4");
        assert_eq!(dp("ng5"), "ng5");
        assert_eq!(dp("bue7"), "bhu\u{ea}7");
    }

    #[test]
    fn test_dp_round_trip() {
        let combos = [
            "peh8", "tsiang1", "tshv2", "lr5", "lrh8", "kau3", "suann1", "uan5", "tsap8", "jit8",
            "kok4", "ng5", "hng5", "m7", "bue7", "ueng5", "vn5", "vt4", "eng1", "ek4", "iau3",
            "sou1", "ainnh4", "khiam2", "gueh8", "ngia5", "thiann1",
        ];
        for comb in combos {
            let p = Pronunciation::from_combination(comb).unwrap();
            assert_eq!(Pronunciation::from_dp(&p.to_dp()), Some(p), "{}", comb);
        }
    }

    #[test]
    fn test_dp_optional_nasalization() {
        let p = Pronunciation::new("s", "uann", 1).unwrap().with_optional_nasalization();
        assert_eq!(p.to_dp().to_string(), "sua(n)1");
        assert_eq!(Pronunciation::from_dp(&p.to_dp()), Some(p));

        let p = Pronunciation::new("0", "innh", 4).unwrap().with_optional_nasalization();
        assert_eq!(p.to_dp().final_, "i(n)h");
        assert_eq!(Pronunciation::from_dp(&p.to_dp()), Some(p));
    }

    #[test]
    fn test_from_dp_decomposed_input() {
        let dp = DpPronunciation { initial: "b".into(), final_: "e\u{302}h".into(), tone: 8 };
        let p = Pronunciation::from_dp(&dp).unwrap();
        assert_eq!(p.to_combination(), "peh8");
    }
}
