use std::collections::HashSet;

use lazy_static::lazy_static;

const FRENCH_STOP_WORDS: &[&str] = &[
    "a", "à", "afin", "ai", "ainsi", "alors", "au", "aucun", "aucune", "aupres", "auprès", "aussi",
    "autre", "autres", "aux", "avant", "avec", "avoir", "ayant", "bien", "c'", "ça", "car", "ce",
    "ceci", "cela", "celle", "celles", "celui", "ces", "cet", "cette", "ceux", "chaque", "chez",
    "comme", "comment", "d'", "dans", "de", "depuis", "des", "doit", "donc", "dont", "du", "elle",
    "elles", "en", "encore", "entre", "est", "et", "été", "être", "eu", "fait", "faire", "il",
    "ils", "j'", "je", "jusqu'", "l'", "la", "le", "les", "leur", "leurs", "lors", "lui", "m'",
    "ma", "mais", "me", "même", "mes", "moi", "mon", "n'", "ne", "ni", "nos", "notre", "nous",
    "on", "ont", "ou", "où", "par", "parmi", "pas", "peu", "peut", "plus", "pour", "pourquoi",
    "qu'", "quand", "que", "quel", "quelle", "quelles", "quels", "qui", "s'", "sa", "sans", "se",
    "selon", "ses", "si", "sien", "son", "sont", "sous", "sur", "t'", "ta", "te", "tes", "toi",
    "ton", "tous", "tout", "toute", "toutes", "très", "tu", "un", "une", "vers", "via", "vos",
    "votre", "vous", "y",
];

lazy_static! {
    static ref STOP_WORDS: HashSet<&'static str> = FRENCH_STOP_WORDS.iter().copied().collect();
}


fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(token.to_lowercase().as_str())
}

/// Drops French stop words and punctuation-only tokens. Elided articles
/// (`l'`, `d'`, ...) are split from the word they are attached to.
pub fn strip_stop_words(keyword: &str) -> String {
    let mut kept = Vec::new();

    for word in keyword.split_whitespace() {
        let word = word.replace('’', "'");
        let rest = match word.find('\'') {
            Some(i) if is_stop_word(&word[..=i]) => &word[i + 1..],
            _ => word.as_str(),
        };

        let token = rest.trim_matches(|c: char| !c.is_alphanumeric());
        if !token.is_empty() && !is_stop_word(token) {
            kept.push(token.to_string());
        }
    }

    kept.join(" ")
}
