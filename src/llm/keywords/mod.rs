

pub mod extractor;
pub mod prompt;
pub mod stopwords;

pub use extractor::{parse_keyword_list, KeywordExtractor, KEYWORDS_PER_PARAGRAPH, PARAGRAPH_SENTENCES};
pub use prompt::build_keywords_prompt;
pub use stopwords::strip_stop_words;
