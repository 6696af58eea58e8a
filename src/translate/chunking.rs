

use tracing::{debug, warn};

use super::{TranslateError, Translator};
use crate::utils::char_len;

pub const MAX_TRANSLATION_CHARS: usize = 5000;
pub const CHUNK_TARGET_CHARS: usize = 3000;


/// Packs non-blank lines into chunks of at most `target` characters, counting
/// the joining newline. A single line longer than `target` becomes its own chunk.
pub fn split_for_translation(text: &str, target: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        let line_len = char_len(line);
        let joined_len = if current.is_empty() {
            line_len
        } else {
            current_len + 1 + line_len
        };

        if joined_len > target && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len > target {
            warn!("Line of {} characters exceeds the translation chunk size", line_len);
        }

        if !current.is_empty() {
            current.push('\n');
            current_len += 1;
        }
        current.push_str(line);
        current_len += line_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}


/// Translates text of any length. Short text goes out in one call; longer
/// text is split on line boundaries and the translated chunks are joined
/// with newlines.
pub async fn translate_long(
    translator: &dyn Translator,
    text: &str,
    target: &str,
) -> Result<String, TranslateError> {
    if text.trim().is_empty() {
        return Ok(String::new());
    }

    if char_len(text) <= MAX_TRANSLATION_CHARS {
        return translator.translate(text, target).await;
    }

    let chunks = split_for_translation(text, CHUNK_TARGET_CHARS);
    debug!("Translating {} chunk(s) into '{}'", chunks.len(), target);

    let mut translated = Vec::with_capacity(chunks.len());
    for chunk in &chunks {
        translated.push(translator.translate(chunk, target).await?);
    }
    Ok(translated.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailingTranslator, RecordingTranslator};
    use crate::translate::IdentityTranslator;

    fn line(c: char, n: usize) -> String {
        std::iter::repeat(c).take(n).collect()
    }

    #[test]
    fn test_chunks_respect_target() {
        let text = [line('a', 1000), line('b', 1000), line('c', 1000), line('d', 1000)].join("\n");
        let chunks = split_for_translation(&text, 3000);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], [line('a', 1000), line('b', 1000)].join("\n"));
        assert_eq!(chunks[1], [line('c', 1000), line('d', 1000)].join("\n"));
        assert!(chunks.iter().all(|c| c.chars().count() <= 3000));
    }

    #[test]
    fn test_no_line_is_lost() {
        let lines: Vec<String> = (0..40).map(|i| format!("{i:03} {}", line('x', 300))).collect();
        let text = lines.join("\n");
        let chunks = split_for_translation(&text, 3000);

        assert_eq!(chunks.join("\n"), text);
    }

    #[test]
    fn test_blank_lines_are_dropped() {
        let chunks = split_for_translation("first\n\n   \nsecond\n", 3000);
        assert_eq!(chunks, vec!["first\nsecond".to_string()]);
    }

    #[test]
    fn test_oversized_line_stands_alone() {
        let text = ["short".to_string(), line('z', 3500), "tail".to_string()].join("\n");
        let chunks = split_for_translation(&text, 3000);

        assert_eq!(chunks, vec!["short".to_string(), line('z', 3500), "tail".to_string()]);
    }

    #[tokio::test]
    async fn test_blank_text_skips_backend() {
        let translator = RecordingTranslator::default();
        assert_eq!(translate_long(&translator, "  \n", "en").await.unwrap(), "");
        assert!(translator.calls().is_empty());
    }

    #[tokio::test]
    async fn test_short_text_is_one_call() {
        let translator = RecordingTranslator::default();
        let out = translate_long(&translator, "bonjour\nle monde", "en").await.unwrap();

        assert_eq!(out, "[en] bonjour\nle monde");
        assert_eq!(translator.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_long_text_is_chunked_and_rejoined() {
        let lines: Vec<String> = (0..3).map(|_| line('m', 2000)).collect();
        let text = lines.join("\n");
        let translator = RecordingTranslator::default();

        let out = translate_long(&translator, &text, "fr").await.unwrap();

        assert_eq!(translator.calls().len(), 3);
        assert!(translator.calls().iter().all(|(t, _)| t.chars().count() <= CHUNK_TARGET_CHARS));
        assert_eq!(out, lines.iter().map(|l| format!("[fr] {l}")).collect::<Vec<_>>().join("\n"));

        let identity = translate_long(&IdentityTranslator, &text, "fr").await.unwrap();
        assert_eq!(identity, text);
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        assert!(translate_long(&FailingTranslator, "texte", "en").await.is_err());
    }
}
