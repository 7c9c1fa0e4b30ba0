//! PDF metin çıkarma modülü
//!
//! pdf-extract ile PDF'ten metin çıkarır ve form feed karakterinden
//! sayfalara ayırır.

use std::path::Path;

use anyhow::{Context, Result};

/// PDF'ten sayfa sayfa metin çıkar
///
/// (sayfa numarası, metin) çiftleri döner; sayfa numaraları 1'den
/// başlar. Sayfa ayrımı yapılamazsa tüm metin tek sayfa sayılır.
pub fn extract_text_from_pdf(path: &Path) -> Result<Vec<(usize, String)>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read PDF: {:?}", path))?;

    let text = pdf_extract::extract_text_from_mem(&bytes)
        .with_context(|| format!("Failed to extract text from PDF: {:?}", path))?;

    if text.trim().is_empty() {
        // Taranmış (görüntü) PDF olabilir
        tracing::warn!("No text extracted from PDF: {:?}", path);
        return Ok(vec![]);
    }

    Ok(split_pages(&text)
        .into_iter()
        .enumerate()
        .map(|(i, page_text)| (i + 1, page_text))
        .collect())
}

/// Metni form feed (\x0c) karakterinden sayfalara ayır
fn split_pages(text: &str) -> Vec<String> {
    let pages: Vec<String> = text
        .split('\x0c')
        .map(|page| page.trim().to_string())
        .filter(|page| !page.is_empty())
        .collect();

    if pages.is_empty() {
        vec![text.trim().to_string()]
    } else {
        pages
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_pages_with_formfeed() {
        let text = "Birinci sayfa\x0cİkinci sayfa\x0cÜçüncü sayfa";
        let pages = split_pages(text);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0], "Birinci sayfa");
        assert_eq!(pages[2], "Üçüncü sayfa");
    }

    #[test]
    fn test_split_pages_without_separator() {
        let text = "Sayfa ayracı olmayan metin";
        let pages = split_pages(text);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0], text);
    }

    #[test]
    fn test_extract_missing_file_errors() {
        let err = extract_text_from_pdf(Path::new("/yok/boyle/dosya.pdf"));
        assert!(err.is_err());
    }
}
