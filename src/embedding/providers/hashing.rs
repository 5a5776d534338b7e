//! Feature-hashing embedder for offline runs and tests.
//!
//! Only shared words score above zero; semantic retrieval uses
//! [`super::fast_embed`].
//!
//! Tokens are lower-cased alphanumeric runs, with camelCase predicates such
//! as `hasTheme` also split into their parts. Each token is hashed with
//! SHA-256 into a signed bucket and the result is L2-normalized. No model
//! download, no network, fully deterministic.

use sha2::{Digest, Sha256};

#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions: dimensions.max(1) }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in tokenize(text) {
            let digest = Sha256::digest(token.as_bytes());
            let mut bucket_bytes = [0u8; 8];
            bucket_bytes.copy_from_slice(&digest[..8]);
            let bucket = (u64::from_le_bytes(bucket_bytes) % self.dimensions as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

/// Split `text` into lower-cased tokens. A camelCase word yields the whole
/// word plus each of its parts (`hasTheme` → `hastheme`, `has`, `theme`).
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
        let parts = split_camel(word);
        if parts.len() > 1 {
            tokens.push(word.to_lowercase());
        }
        tokens.extend(parts.into_iter().map(|p| p.to_lowercase()));
    }
    tokens
}

fn split_camel(word: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut prev_lower = false;
    for (i, c) in word.char_indices() {
        if c.is_uppercase() && prev_lower {
            parts.push(&word[start..i]);
            start = i;
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
    }
    parts.push(&word[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn tokenize_splits_camel_case() {
        assert_eq!(tokenize("hasTheme"), vec!["hastheme", "has", "theme"]);
        assert_eq!(tokenize("Science Fiction!"), vec!["science", "fiction"]);
        assert_eq!(tokenize("Book1"), vec!["book1"]);
        assert!(tokenize("  ,; ").is_empty());
    }

    #[test]
    fn embedding_is_normalized_and_sized() {
        let e = HashingEmbedder::new(128);
        let v = e.embed("Dune hasAuthor Frank Herbert");
        assert_eq!(v.len(), 128);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn empty_text_is_zero_vector() {
        let v = HashingEmbedder::new(16).embed("");
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn deterministic() {
        let e = HashingEmbedder::new(256);
        assert_eq!(e.embed("Foundation"), e.embed("Foundation"));
    }

    #[test]
    fn shared_words_score_higher() {
        let e = HashingEmbedder::new(1024);
        let query = e.embed("science fiction books");
        let scifi = e.embed("B1 hasTheme Science Fiction");
        let fantasy = e.embed("B2 hasTheme Fantasy");
        assert!(cosine(&query, &scifi) > cosine(&query, &fantasy));
    }

    #[test]
    fn zero_dimensions_clamped() {
        assert_eq!(HashingEmbedder::new(0).dimensions(), 1);
    }
}
