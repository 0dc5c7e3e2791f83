//! Q&A 报告 PDF 生成 - 基础设施层
//!
//! 版式：Letter 纸、Helvetica 12pt、左边距 50，
//! 首行基线距顶部 50，行距 15，基线低于 100 时换页，每组问答之间额外空 20

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{AppError, AppResult, PdfError};

/// 排好位置的一行文本
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub y: f32,
    pub text: String,
}

/// 页面版式参数
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub width: f32,
    pub height: f32,
    pub margin_left: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub line_height: f32,
    pub pair_gap: f32,
    pub font_size: f32,
    /// 每行最多字符数，超出自动折行
    pub wrap_chars: usize,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            width: 612.0,
            height: 792.0,
            margin_left: 50.0,
            margin_top: 50.0,
            margin_bottom: 100.0,
            line_height: 15.0,
            pair_gap: 20.0,
            font_size: 12.0,
            wrap_chars: 90,
        }
    }
}

impl PageLayout {
    /// 把问答对排成若干页
    pub fn paginate(&self, title: Option<&str>, pairs: &[(String, String)]) -> Vec<Vec<PlacedLine>> {
        let top = self.height - self.margin_top;
        let mut pages: Vec<Vec<PlacedLine>> = vec![Vec::new()];
        let mut y = top;

        let mut place = |pages: &mut Vec<Vec<PlacedLine>>, y: &mut f32, text: String| {
            if *y < self.margin_bottom {
                pages.push(Vec::new());
                *y = top;
            }
            if let Some(page) = pages.last_mut() {
                page.push(PlacedLine { y: *y, text });
            }
            *y -= self.line_height;
        };

        if let Some(title) = title {
            place(&mut pages, &mut y, title.to_string());
            y -= self.pair_gap;
        }

        for (i, (question, answer)) in pairs.iter().enumerate() {
            let block = [format!("Q{}: {}", i + 1, question), format!("A: {}", answer)];
            for line in block.iter() {
                for subline in line.split('\n') {
                    for wrapped in wrap_line(subline, self.wrap_chars) {
                        place(&mut pages, &mut y, wrapped);
                    }
                }
            }
            y -= self.pair_gap;
        }

        pages
    }
}

/// 按单词折行，单个过长的词强制截断
pub fn wrap_line(line: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in line.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let word: String = word.into_iter().collect();
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// 编码为 WinAnsi 可显示的字节，超出 Latin-1 的字符替换为 `?`
fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

/// Q&A 报告生成器
#[derive(Debug, Clone, Default)]
pub struct PdfReportWriter {
    layout: PageLayout,
}

impl PdfReportWriter {
    pub fn new(layout: PageLayout) -> Self {
        Self { layout }
    }

    /// 生成 PDF 字节
    pub fn render(&self, pairs: &[(String, String)]) -> Result<Vec<u8>, PdfError> {
        let title = format!(
            "QnAfy Answers - generated {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        let pages = self.layout.paginate(Some(&title), pairs);
        debug!("Q&A 报告共 {} 页", pages.len());

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for lines in &pages {
            let page_id = self.add_page(&mut doc, pages_id, lines)?;
            kids.push(page_id.into());
        }

        let page_count = kids.len() as i64;
        let media_box: Vec<Object> = vec![
            0.into(),
            0.into(),
            self.layout.width.into(),
            self.layout.height.into(),
        ];
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => media_box,
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| PdfError::Render(e.to_string()))?;
        Ok(buffer)
    }

    fn add_page(
        &self,
        doc: &mut Document,
        pages_id: ObjectId,
        lines: &[PlacedLine],
    ) -> Result<ObjectId, PdfError> {
        let mut operations = Vec::with_capacity(lines.len() * 5);
        for line in lines {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new(
                "Tf",
                vec!["F1".into(), self.layout.font_size.into()],
            ));
            operations.push(Operation::new(
                "Td",
                vec![self.layout.margin_left.into(), line.y.into()],
            ));
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(encode_latin1(&line.text))],
            ));
            operations.push(Operation::new("ET", vec![]));
        }

        let content = Content { operations };
        let encoded = content
            .encode()
            .map_err(|e| PdfError::Render(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

        Ok(doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        }))
    }

    /// 生成并写入文件
    pub fn write_to(&self, pairs: &[(String, String)], path: impl AsRef<Path>) -> AppResult<()> {
        let path = path.as_ref();
        let bytes = self.render(pairs)?;
        std::fs::write(path, bytes).map_err(|e| AppError::file(path.display().to_string(), e))?;
        info!("📥 Q&A 报告已保存: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(n: usize) -> Vec<(String, String)> {
        (0..n)
            .map(|i| {
                (
                    format!("What is item {}?", i),
                    format!("Item {} is a thing.", i),
                )
            })
            .collect()
    }

    #[test]
    fn test_wrap_line() {
        assert_eq!(wrap_line("", 10), vec![String::new()]);
        assert_eq!(wrap_line("short line", 20), vec!["short line".to_string()]);
        assert_eq!(
            wrap_line("alpha beta gamma", 10),
            vec!["alpha beta".to_string(), "gamma".to_string()]
        );
        assert_eq!(
            wrap_line("abcdefghijkl", 5),
            vec!["abcde".to_string(), "fghij".to_string(), "kl".to_string()]
        );
    }

    #[test]
    fn test_first_page_layout() {
        let layout = PageLayout::default();
        let pages = layout.paginate(None, &pairs(1));
        assert_eq!(pages.len(), 1);
        assert_eq!(
            pages[0],
            vec![
                PlacedLine {
                    y: 742.0,
                    text: "Q1: What is item 0?".to_string()
                },
                PlacedLine {
                    y: 727.0,
                    text: "A: Item 0 is a thing.".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_multiline_answers_split() {
        let layout = PageLayout::default();
        let input = vec![("Q?".to_string(), "line one\nline two".to_string())];
        let pages = layout.paginate(None, &input);
        let texts: Vec<&str> = pages[0].iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["Q1: Q?", "A: line one", "line two"]);
    }

    #[test]
    fn test_pagination_respects_bottom_margin() {
        let layout = PageLayout::default();
        let pages = layout.paginate(Some("title"), &pairs(40));
        assert!(pages.len() > 1);
        for page in &pages {
            assert!(!page.is_empty());
            for line in page {
                assert!(line.y >= layout.margin_bottom);
                assert!(line.y <= layout.height - layout.margin_top);
            }
        }
        let total_lines: usize = pages.iter().map(|p| p.len()).sum();
        assert_eq!(total_lines, 1 + 40 * 2);
    }

    #[test]
    fn test_encode_latin1_replaces_unsupported() {
        assert_eq!(encode_latin1("abc"), b"abc".to_vec());
        assert_eq!(encode_latin1("café"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(encode_latin1("题"), b"?".to_vec());
    }

    #[test]
    fn test_render_produces_loadable_pdf() {
        let writer = PdfReportWriter::default();
        let input = pairs(40);
        let bytes = writer.render(&input).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        let expected = PageLayout::default().paginate(Some("t"), &input).len();
        assert_eq!(doc.get_pages().len(), expected);
    }

    #[test]
    fn test_render_empty_input() {
        let bytes = PdfReportWriter::default().render(&[]).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }
}
