use phf::phf_map;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// 作答风格
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum AnswerStyle {
    /// 简明
    #[default]
    Concise,
    /// 详细
    Detailed,
    /// 分步
    StepByStep,
}

/// 配置中允许的风格写法（小写）
static STYLE_ALIASES: phf::Map<&'static str, AnswerStyle> = phf_map! {
    "concise" => AnswerStyle::Concise,
    "brief" => AnswerStyle::Concise,
    "detailed" => AnswerStyle::Detailed,
    "detail" => AnswerStyle::Detailed,
    "step-by-step" => AnswerStyle::StepByStep,
    "step_by_step" => AnswerStyle::StepByStep,
    "stepbystep" => AnswerStyle::StepByStep,
    "steps" => AnswerStyle::StepByStep,
};

impl AnswerStyle {
    pub const ALL: [AnswerStyle; 3] = [
        AnswerStyle::Concise,
        AnswerStyle::Detailed,
        AnswerStyle::StepByStep,
    ];

    /// 拼接在题目前面的指令片段
    pub fn instruction(self) -> &'static str {
        match self {
            AnswerStyle::Concise => "Answer this question briefly:",
            AnswerStyle::Detailed => "Explain this in detail:",
            AnswerStyle::StepByStep => "Solve step-by-step:",
        }
    }

    /// 显示名称
    pub fn label(self) -> &'static str {
        match self {
            AnswerStyle::Concise => "Concise",
            AnswerStyle::Detailed => "Detailed",
            AnswerStyle::StepByStep => "Step-by-step",
        }
    }

    /// 宽松解析（忽略大小写与首尾空白）
    pub fn find(s: &str) -> Option<Self> {
        STYLE_ALIASES.get(s.trim().to_lowercase().as_str()).copied()
    }
}

impl FromStr for AnswerStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::find(s).ok_or_else(|| format!("未知的作答风格: {}", s))
    }
}

impl<'de> Deserialize<'de> for AnswerStyle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for AnswerStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
