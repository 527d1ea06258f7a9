//! The curated term list that noisy query tokens are snapped to.

use ahash::AHashSet;

use crate::spelling::levenshtein::similarity;

/// Technology and AI vocabulary plus the organization names that show up in
/// tech news headlines.
///
/// Short, very common English look-alikes ("and", "data", "search", "web")
/// are left out on purpose: any entry within one or two edits of an everyday
/// word will rewrite that word in every query.
const BUILTIN_TERMS: &[&str] = &[
    // Organizations
    "OpenAI",
    "Anthropic",
    "DeepMind",
    "DeepSeek",
    "Mistral",
    "xAI",
    "Google",
    "Alphabet",
    "Microsoft",
    "Apple",
    "Amazon",
    "Meta",
    "Facebook",
    "Instagram",
    "WhatsApp",
    "Twitter",
    "YouTube",
    "Netflix",
    "Nvidia",
    "Intel",
    "Qualcomm",
    "TSMC",
    "Samsung",
    "Huawei",
    "Xiaomi",
    "Baidu",
    "Alibaba",
    "Tencent",
    "ByteDance",
    "TikTok",
    "Tesla",
    "SpaceX",
    "IBM",
    "Oracle",
    "Salesforce",
    "Adobe",
    "Cisco",
    "Dell",
    "Sony",
    "Uber",
    "Airbnb",
    "Spotify",
    "GitHub",
    "HuggingFace",
    "Midjourney",
    "Perplexity",
    "Cohere",
    // Products and platforms
    "ChatGPT",
    "GPT",
    "Claude",
    "Gemini",
    "Copilot",
    "Llama",
    "Bard",
    "Grok",
    "Sora",
    "Android",
    "iPhone",
    "iPad",
    "Windows",
    "Linux",
    "PyTorch",
    "TensorFlow",
    "Kubernetes",
    "Docker",
    "Python",
    "JavaScript",
    "TypeScript",
    "Bitcoin",
    "Ethereum",
    // Vocabulary
    "AI",
    "AGI",
    "ML",
    "LLM",
    "NLP",
    "GPU",
    "CPU",
    "API",
    "artificial",
    "intelligence",
    "machine",
    "learning",
    "neural",
    "network",
    "transformer",
    "model",
    "models",
    "dataset",
    "training",
    "inference",
    "generative",
    "multimodal",
    "chatbot",
    "algorithm",
    "robotics",
    "robot",
    "autonomous",
    "semiconductor",
    "processor",
    "quantum",
    "computing",
    "cloud",
    "cybersecurity",
    "security",
    "privacy",
    "encryption",
    "blockchain",
    "cryptocurrency",
    "crypto",
    "startup",
    "regulation",
    "antitrust",
    "smartphone",
    "metaverse",
    "virtual",
    "augmented",
    "wearable",
    "battery",
    "electric",
    "vehicle",
    "automation",
    "analytics",
    "database",
    "software",
    "hardware",
    "developer",
    "programming",
    "technology",
    "digital",
    "internet",
    "browser",
    "streaming",
    "gaming",
    "satellite",
    "broadband",
    "5G",
];

/// An immutable, case-insensitive set of known terms.
///
/// Built once and shared (behind an `Arc`) by every search that needs it;
/// nothing mutates a dictionary after construction.
#[derive(Debug, Clone, Default)]
pub struct TermDictionary {
    /// Terms in their canonical spelling, in insertion order.
    terms: Vec<String>,
    /// Lowercased form of each entry in `terms`, same index.
    lowered: Vec<String>,
    /// Lowercased terms for exact lookups.
    index: AHashSet<String>,
}

impl TermDictionary {
    /// Create a new empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in technology and organization vocabulary.
    pub fn builtin() -> Self {
        Self::from_terms(BUILTIN_TERMS.iter().copied())
    }

    /// Build a dictionary from arbitrary terms. Case-insensitive duplicates
    /// keep the first spelling seen; blank terms are skipped.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dictionary = Self::new();
        dictionary.extend(terms);
        dictionary
    }

    /// Add more terms. Only used while assembling a dictionary, before it is
    /// shared.
    pub fn extend<I, S>(&mut self, terms: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for term in terms {
            let term = term.as_ref().trim();
            if term.is_empty() {
                continue;
            }
            let lowered = term.to_lowercase();
            if self.index.insert(lowered.clone()) {
                self.terms.push(term.to_string());
                self.lowered.push(lowered);
            }
        }
    }

    /// Check if a word is a known term (case-insensitive).
    pub fn contains(&self, word: &str) -> bool {
        self.index.contains(&word.to_lowercase())
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the dictionary has no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Iterate the terms in canonical spelling.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }

    /// Find the entry most similar to `word`, with its similarity.
    ///
    /// Equal similarity scores resolve to the shorter entry, then to the
    /// alphabetically first lowercase form, so the answer never depends on
    /// the order terms were added in.
    pub fn closest(&self, word: &str) -> Option<(&str, f64)> {
        let mut best: Option<(usize, f64)> = None;

        for (i, lowered) in self.lowered.iter().enumerate() {
            let score = similarity(word, lowered);
            let better = match best {
                None => true,
                Some((best_i, best_score)) => {
                    if score != best_score {
                        score > best_score
                    } else {
                        let (len, best_len) = (
                            lowered.chars().count(),
                            self.lowered[best_i].chars().count(),
                        );
                        len < best_len
                            || (len == best_len && lowered < &self.lowered[best_i])
                    }
                }
            };
            if better {
                best = Some((i, score));
            }
        }

        best.map(|(i, score)| (self.terms[i].as_str(), score))
    }
}
