use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// 英文停用词
pub const STOPWORDS: [&str; 20] = [
    "the", "and", "is", "in", "at", "of", "a", "to", "on", "with", "for", "by", "from", "that",
    "this", "it", "are", "as", "was", "be",
];

/// 保留的关键词数量
pub const MAX_KEYWORDS: usize = 7;

static DEFAULT_EXTRACTOR: Lazy<KeywordExtractor> = Lazy::new(KeywordExtractor::new);

/// 使用默认设置提取关键词
pub fn extract_keywords(text: &str) -> String {
    DEFAULT_EXTRACTOR.extract(text)
}

#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    token: Regex,
    stopwords: HashSet<&'static str>,
    limit: usize,
}

impl KeywordExtractor {
    pub fn new() -> Self {
        Self {
            // 只匹配完整的、长度 >= 3 的 ASCII 小写单词；含数字或非 ASCII 字母的词整体丢弃
            token: Regex::new(r"\b[a-z]{3,}\b").unwrap(),
            stopwords: STOPWORDS.iter().copied().collect(),
            limit: MAX_KEYWORDS,
        }
    }

    /// 按出现次数降序返回前 7 个关键词，逗号连接；次数相同时保持首次出现的顺序
    pub fn extract(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }

        let lowered = text.to_lowercase();

        let mut counts: Vec<(&str, usize)> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();

        for token in self.token.find_iter(&lowered).map(|m| m.as_str()) {
            if self.stopwords.contains(token) {
                continue;
            }
            match positions.get(token) {
                Some(&idx) => counts[idx].1 += 1,
                None => {
                    positions.insert(token, counts.len());
                    counts.push((token, 1));
                }
            }
        }

        // sort_by 是稳定排序
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        let keywords = counts
            .iter()
            .take(self.limit)
            .map(|(word, _)| *word)
            .collect::<Vec<_>>()
            .join(",");

        debug!("关键词提取完成: {}", keywords);
        keywords
    }
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_by_count_then_first_occurrence() {
        let keywords = extract_keywords("The quick quick fox jumps over the lazy dog the fox");
        assert_eq!(keywords, "quick,fox,jumps,over,lazy,dog");
    }

    #[test]
    fn blank_input_yields_nothing() {
        assert_eq!(extract_keywords(""), "");
        assert_eq!(extract_keywords("   \n\t "), "");
    }

    #[test]
    fn stopwords_and_short_tokens_are_dropped() {
        assert_eq!(extract_keywords("the and is in at of a to on with"), "");
        assert_eq!(extract_keywords("an ox is by me, go up"), "");
        assert_eq!(extract_keywords("THIS That Was From"), "");
    }

    #[test]
    fn tokens_with_digits_or_accents_are_dropped_whole() {
        assert_eq!(extract_keywords("covid19 2024 abc123 news"), "news");
        assert_eq!(extract_keywords("café résumé naïve market"), "market");
        assert_eq!(extract_keywords("e-mail self_driving cars"), "mail,cars");
    }

    #[test]
    fn keeps_only_top_seven() {
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa alpha kappa";
        let keywords = extract_keywords(text);
        assert_eq!(keywords, "alpha,kappa,beta,gamma,delta,epsilon,zeta");
        assert_eq!(keywords.split(',').count(), MAX_KEYWORDS);
    }

    #[test]
    fn case_is_folded_before_counting() {
        assert_eq!(extract_keywords("Rust RUST rust Go golang"), "rust,golang");
    }
}
