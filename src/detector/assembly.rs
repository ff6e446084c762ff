//! FeatureBag + embedder + TLD encoder → fixed-order model row.

use crate::features::{EncodedFeatureVector, FeatureBag, ENCODED_PREFIX_WIDTH};
use crate::model::{CategoricalEncoder, Embedder};

/// Numeric columns, then the TLD index, then the embedding of the lower-cased domain label.
pub fn assemble<E, C>(bag: &FeatureBag, embedder: &E, tld_encoder: &C) -> EncodedFeatureVector
where
    E: Embedder + ?Sized,
    C: CategoricalEncoder + ?Sized,
{
    let mut values = Vec::with_capacity(ENCODED_PREFIX_WIDTH + embedder.vector_size());
    values.extend(bag.numeric_columns().iter().map(|v| *v as f32));
    values.push(tld_encoder.encode(&bag.tld) as f32);
    values.extend(embedder.embed(&bag.domain_name.to_lowercase()));
    EncodedFeatureVector { values }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::UrlFeatureExtractor;
    use crate::model::{CharEmbedding, TldEncoder};

    #[test]
    fn layout_and_lowercased_embedding() {
        let ex = UrlFeatureExtractor::with_defaults().unwrap();
        let bag = ex.extract_features("http://BIT.ly/x").unwrap();
        assert_eq!(bag.domain_name, "BIT");

        let emb = CharEmbedding::from_pairs(2, vec![('b', vec![1.0, 3.0]), ('t', vec![3.0, 1.0])]).unwrap();
        let tld = TldEncoder::fit(["com", "ly"]);
        let v = assemble(&bag, &emb, &tld);

        assert_eq!(v.width(), ENCODED_PREFIX_WIDTH + 2);
        assert_eq!(v.as_slice()[0], bag.url_length as f32);
        assert_eq!(v.as_slice()[14], bag.subdomain_count as f32);
        assert_eq!(v.tld_index(), Some(1.0));
        assert_eq!(v.embedding(), &[2.0, 2.0]);
    }

    #[test]
    fn unseen_tld_and_unknown_chars() {
        let ex = UrlFeatureExtractor::with_defaults().unwrap();
        let bag = ex.extract_features("http://qqq.zz").unwrap();
        let emb = CharEmbedding::from_pairs(3, vec![('a', vec![1.0, 1.0, 1.0])]).unwrap();
        let v = assemble(&bag, &emb, &TldEncoder::fit(["com"]));
        assert_eq!(v.tld_index(), Some(-1.0));
        assert_eq!(v.embedding(), &[0.0, 0.0, 0.0]);
    }
}
