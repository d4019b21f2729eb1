//! Hidden reasoning blocks.
//!
//! Agents may think inside `<reasoning>…</reasoning>` or
//! `<thinking>…</thinking>`. That text is kept for the detailed log and
//! stripped from everything human-facing.

const TAGS: &[&str] = &["reasoning", "thinking"];

/// Public text and the reasoning removed from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReasoningSplit {
    pub public: String,
    pub reasoning: String,
}

impl ReasoningSplit {
    pub fn has_reasoning(&self) -> bool {
        !self.reasoning.is_empty()
    }
}

/// Find the earliest opening tag at or after `from`, case-insensitively.
fn next_open(lower: &str, from: usize) -> Option<(usize, &'static str)> {
    TAGS.iter()
        .filter_map(|tag| {
            lower[from..]
                .find(&format!("<{tag}>"))
                .map(|pos| (from + pos, *tag))
        })
        .min_by_key(|(pos, _)| *pos)
}

/// Split `raw` into public text and concatenated reasoning.
///
/// Blocks may repeat. An unterminated block hides the rest of the text.
pub fn split_reasoning(raw: &str) -> ReasoningSplit {
    // ASCII lowercasing keeps byte offsets aligned with `raw`
    let lower = raw.to_ascii_lowercase();
    let mut public = String::new();
    let mut reasoning: Vec<&str> = Vec::new();
    let mut cursor = 0;

    while let Some((start, tag)) = next_open(&lower, cursor) {
        public.push_str(&raw[cursor..start]);
        let open_len = tag.len() + 2;
        let close = format!("</{tag}>");
        let body_start = start + open_len;
        match lower[body_start..].find(&close) {
            Some(rel) => {
                reasoning.push(raw[body_start..body_start + rel].trim());
                cursor = body_start + rel + close.len();
            }
            None => {
                reasoning.push(raw[body_start..].trim());
                cursor = raw.len();
            }
        }
    }
    public.push_str(&raw[cursor..]);

    ReasoningSplit {
        public: public.trim().to_string(),
        reasoning: reasoning
            .into_iter()
            .filter(|r| !r.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}
