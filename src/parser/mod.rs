pub mod keyword_extractor;

pub use keyword_extractor::{extract_keywords, KeywordExtractor, MAX_KEYWORDS, STOPWORDS};
