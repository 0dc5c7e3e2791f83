use serde::{Deserialize, Serialize};

/// 从文档中提取出的一道题目
///
/// `index` 是题目在原始序列中的位置（从 0 开始），一经创建不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub index: usize,
    pub text: String,
}

impl Question {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// 按顺序为题目文本编号
    pub fn from_texts<I, S>(texts: I) -> Vec<Question>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| Question::new(index, text))
            .collect()
    }
}

/// 单道题目的作答记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub index: usize,
    pub question: String,
    /// 答案文本，或以 `[` 开头的占位符（跳过 / 错误）
    pub answer: String,
}

impl AnswerRecord {
    pub fn new(question: &Question, answer: impl Into<String>) -> Self {
        Self {
            index: question.index,
            question: question.text.clone(),
            answer: answer.into(),
        }
    }

    /// 答案是否为占位符而非真实回答
    pub fn is_sentinel(&self) -> bool {
        crate::models::sentinel::is_sentinel(&self.answer)
    }
}

/// 一次批量作答的结果，严格按题目原始顺序排列
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    records: Vec<AnswerRecord>,
}

impl BatchResult {
    /// 由已按输入顺序排好的记录构建
    pub(crate) fn from_ordered(records: Vec<AnswerRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[AnswerRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnswerRecord> {
        self.records.iter()
    }

    /// 成功作答（非占位符）的数量
    pub fn answered_count(&self) -> usize {
        self.records.iter().filter(|r| !r.is_sentinel()).count()
    }

    /// 交给 PDF 渲染的 (题目, 答案) 序列
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.records
            .iter()
            .map(|r| (r.question.clone(), r.answer.clone()))
            .collect()
    }
}

impl std::ops::Index<usize> for BatchResult {
    type Output = AnswerRecord;

    fn index(&self, index: usize) -> &Self::Output {
        &self.records[index]
    }
}

impl IntoIterator for BatchResult {
    type Item = AnswerRecord;
    type IntoIter = std::vec::IntoIter<AnswerRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
