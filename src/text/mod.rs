//! Metin normalizasyon modülü
//!
//! PDF metin çıkarımının bozduğu satırları onarır:
//! in-\nsan -> insan, tanr ı -> tanrı gibi.
//!
//! `normalize` saf bir fonksiyondur (G/Ç yok, dış durum yok) ve
//! idempotenttir: temiz metne tekrar uygulamak sonucu değiştirmez.

use regex::Regex;

/// Ham metni temizler
///
/// Dönüşümler sırayla uygulanır:
/// 1. Tüm satır sonu biçimleri tek `\n` olur
/// 2. Satır sonunda tire ile bölünmüş kelimeler birleştirilir
/// 3. Ardışık satır sonları tek satır sonuna iner
/// 4. Ardışık boşluk/tab tek boşluğa iner
/// 5. Aksanlı harften önceki hatalı boşluk silinir (PDF artığı)
/// 6. Baş/son boşluklar kırpılır
pub fn normalize(text: &str) -> String {
    let hyphen_re = Regex::new(r"(\w)-\s*\n\s*(\w)").expect("Invalid regex");
    let newlines_re = Regex::new(r"\n+").expect("Invalid regex");
    let hspace_re = Regex::new(r"[ \t]+").expect("Invalid regex");
    // Türkçe aksanlı/noktalı harf kümesi; PDF çıkarımı bu harflerden
    // önce araya boşluk sokabiliyor
    let diacritic_re = Regex::new(r"(\w)\s+([ıİiIüÜöÖşŞğĞçÇ])").expect("Invalid regex");

    let mut t = text.replace('\r', "\n");

    // Birleştirme kuralları sabit noktaya kadar tekrarlanır; tek geçiş
    // "a-\nb-\nc" gibi zincirlerde idempotent değildir
    t = replace_until_stable(&hyphen_re, &t, "$1$2");
    t = newlines_re.replace_all(&t, "\n").into_owned();
    t = hspace_re.replace_all(&t, " ").into_owned();
    t = replace_until_stable(&diacritic_re, &t, "$1$2");

    t.trim().to_string()
}

/// Değişiklik kalmayana dek replace_all uygular
///
/// Her geçiş metni kısalttığı için döngü sonlanır.
fn replace_until_stable(re: &Regex, text: &str, rep: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = re.replace_all(&current, rep).into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(normalize("bir\r\niki"), "bir\niki");
        assert_eq!(normalize("bir\riki"), "bir\niki");
    }

    #[test]
    fn test_normalize_rejoins_hyphenated_word() {
        // Satır sonunda tire ile bölünmüş kelime birleşir
        assert_eq!(normalize("tanr-\nı"), "tanrı");
        assert_eq!(normalize("in-\nsan"), "insan");
        assert_eq!(normalize("in- \n  san"), "insan");
    }

    #[test]
    fn test_normalize_rejoins_hyphen_chain() {
        // Zincirleme bölünme tek çağrıda tamamen onarılır
        assert_eq!(normalize("ka-\nde-\nme"), "kademe");
    }

    #[test]
    fn test_normalize_collapses_newlines_and_spaces() {
        assert_eq!(normalize("bir\n\n\niki"), "bir\niki");
        assert_eq!(normalize("bir  \t  iki"), "bir iki");
    }

    #[test]
    fn test_normalize_repairs_diacritic_spacing() {
        assert_eq!(normalize("tanr ı"), "tanrı");
        // İkinci birleşme ancak ilkinden sonra görünür hale gelir
        assert_eq!(normalize("ça ğ ı"), "çağı");
    }

    #[test]
    fn test_normalize_trims() {
        assert_eq!(normalize("  Zeus  "), "Zeus");
        assert_eq!(normalize("\n\nZeus\n\n"), "Zeus");
    }

    #[test]
    fn test_normalize_clean_text_is_noop() {
        let clean = "Zeus, Olimpos tanrılarının kralıdır.";
        assert_eq!(normalize(clean), clean);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "tanr-\nı mitoloji",
            "in-\nsan  ve \r\n  do ğ a",
            "a-\nb-\nc",
            "bir\n\niki\t üç",
            "  Zeus ve Hera  ",
            "",
            "a ı ü",
        ];

        for sample in samples {
            let once = normalize(sample);
            let twice = normalize(&once);
            assert_eq!(once, twice, "idempotent değil: {:?}", sample);
        }
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n\t "), "");
    }
}
