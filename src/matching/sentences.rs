

use unicode_segmentation::UnicodeSegmentation;


/// Splits text on Unicode sentence boundaries. Sentences are trimmed and
/// fragments without any alphanumeric character are dropped.
pub fn segment_sentences(text: &str) -> Vec<String> {
    text.split_sentence_bounds()
        .map(str::trim)
        .filter(|s| s.chars().any(char::is_alphanumeric))
        .map(str::to_string)
        .collect()
}
