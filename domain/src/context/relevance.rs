//! Keyword relevance ranking.

/// A scope file with the size needed for ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedFile {
    /// Path relative to the repository root, `/`-separated.
    pub path: String,
    pub size: u64,
}

impl ScopedFile {
    pub fn new(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }

    fn name_and_parent(&self) -> (String, String) {
        let mut parts = self.path.rsplit('/');
        let name = parts.next().unwrap_or_default().to_lowercase();
        let parent = parts.next().unwrap_or_default().to_lowercase();
        (name, parent)
    }

    /// Filename hits weigh double a parent-directory hit.
    fn keyword_score(&self, keywords: &[String]) -> usize {
        let (name, parent) = self.name_and_parent();
        keywords
            .iter()
            .map(|k| {
                let k = k.to_lowercase();
                let mut score = 0;
                if name.contains(&k) {
                    score += 2;
                }
                if parent.contains(&k) {
                    score += 1;
                }
                score
            })
            .sum()
    }
}

/// Order files by keyword score (descending), then size (ascending) so
/// more relevant files fit whole. Ties keep their original order.
///
/// Without keywords the input order is returned unchanged.
pub fn rank_by_relevance(files: &[ScopedFile], keywords: &[String]) -> Vec<ScopedFile> {
    let mut ranked = files.to_vec();
    if keywords.is_empty() {
        return ranked;
    }
    ranked.sort_by_cached_key(|f| (std::cmp::Reverse(f.keyword_score(keywords)), f.size));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_filename_match_ranks_first() {
        let files = vec![
            ScopedFile::new("src/world/terrain.cpp", 100),
            ScopedFile::new("src/render/pool.cpp", 5000),
        ];
        let ranked = rank_by_relevance(&files, &kw(&["pool"]));
        assert_eq!(ranked[0].path, "src/render/pool.cpp");
    }

    #[test]
    fn test_parent_directory_counts() {
        let files = vec![
            ScopedFile::new("src/world/a.cpp", 10),
            ScopedFile::new("src/render/b.cpp", 10),
        ];
        let ranked = rank_by_relevance(&files, &kw(&["render"]));
        assert_eq!(ranked[0].path, "src/render/b.cpp");
    }

    #[test]
    fn test_smaller_file_wins_tie() {
        let files = vec![
            ScopedFile::new("src/pool_big.cpp", 9000),
            ScopedFile::new("src/pool_small.cpp", 900),
        ];
        let ranked = rank_by_relevance(&files, &kw(&["pool"]));
        assert_eq!(ranked[0].path, "src/pool_small.cpp");
    }

    #[test]
    fn test_no_keywords_keeps_order() {
        let files = vec![ScopedFile::new("b.cpp", 1), ScopedFile::new("a.cpp", 999)];
        assert_eq!(rank_by_relevance(&files, &[]), files);
    }
}
