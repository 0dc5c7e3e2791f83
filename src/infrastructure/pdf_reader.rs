//! PDF 文本读取 - 基础设施层
//!
//! 只负责把 PDF 字节变成逐页文本，不认识题目

use lopdf::Document;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::PdfError;

/// 逐页提取文本
///
/// 单页解码失败时该页记为空字符串，不影响其他页
pub fn extract_pages(bytes: &[u8]) -> Result<Vec<String>, PdfError> {
    let doc = Document::load_mem(bytes)?;

    if doc.is_encrypted() {
        return Err(PdfError::Encrypted);
    }

    let pages = doc.get_pages();
    debug!("PDF 共 {} 页", pages.len());

    let texts = pages
        .keys()
        .map(|&page_number| match doc.extract_text(&[page_number]) {
            Ok(text) => text,
            Err(e) => {
                warn!("第 {} 页文本提取失败: {}", page_number, e);
                String::new()
            }
        })
        .collect();

    Ok(texts)
}

/// 提取全文，页与页之间以换行分隔
pub fn extract_text(bytes: &[u8]) -> Result<String, PdfError> {
    Ok(extract_pages(bytes)?.join("\n"))
}

/// 文档标识：内容的 SHA-256 十六进制摘要
pub fn document_id(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_is_stable_and_content_based() {
        let a = document_id(b"%PDF-1.4 first");
        let b = document_id(b"%PDF-1.4 first");
        let c = document_id(b"%PDF-1.4 second");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_garbage_is_parse_error() {
        assert!(matches!(
            extract_pages(b"definitely not a pdf"),
            Err(PdfError::Parse(_))
        ));
    }
}
