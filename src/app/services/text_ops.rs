use std::path::Path;

/// Extract the extension-like suffix of a label name (`notes.md` -> `md`).
///
/// Returns None for names without a usable extension.
pub fn label_extension(name: &str) -> Option<&str> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
}

/// Case-insensitive substring match. An empty query matches everything.
pub fn matches_query(name: &str, query: &str) -> bool {
    query.is_empty() || name.to_lowercase().contains(&query.to_lowercase())
}

/// Decide whether raw stored bytes should be edited as text.
///
/// Text means valid UTF-8 where fewer than 10% of the characters are control
/// characters (newline, carriage return and tab don't count). Empty content is
/// text.
pub fn is_text_content(bytes: &[u8]) -> bool {
    if bytes.is_empty() {
        return true;
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => {
            let control_chars = s
                .chars()
                .filter(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
                .count();
            control_chars * 10 < s.len()
        }
        Err(_) => false,
    }
}

/// Format a byte count for display (e.g. "512 B", "1.5 KB", "2.0 MB").
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let b = bytes as f64;
    if b >= GB {
        format!("{:.1} GB", b / GB)
    } else if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_extension() {
        assert_eq!(label_extension("notes.md"), Some("md"));
        assert_eq!(label_extension("src/main.rs"), Some("rs"));
        assert_eq!(label_extension("archive.tar.gz"), Some("gz"));
        assert_eq!(label_extension("Makefile"), None);
        assert_eq!(label_extension(".bashrc"), None);
        assert_eq!(label_extension("trailing."), None);
    }

    #[test]
    fn test_matches_query_case_insensitive() {
        assert!(matches_query("B.md", "b"));
        assert!(matches_query("B.md", "B.M"));
        assert!(!matches_query("a.txt", "b"));
        assert!(matches_query("anything", ""));
    }

    #[test]
    fn test_is_text_content() {
        assert!(is_text_content(b""));
        assert!(is_text_content(b"x"));
        assert!(is_text_content(b"line one\nline two\r\n\tindented"));
        assert!(!is_text_content(&[0xff, 0xfe, 0x00]));
        assert!(!is_text_content(&[0x00, 0x01, 0x02, 0x03]));
    }

    #[test]
    fn test_is_text_content_control_threshold() {
        // 1 control char in 20 bytes is under 10%
        let mut mostly_text = vec![b'a'; 19];
        mostly_text.push(0x07);
        assert!(is_text_content(&mostly_text));

        // 2 in 20 is not
        let mut noisy = vec![b'a'; 18];
        noisy.extend_from_slice(&[0x07, 0x07]);
        assert!(!is_text_content(&noisy));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(2 * 1024 * 1024), "2.0 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }
}
