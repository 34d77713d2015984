//! Row clustering by vertical proximity

use crate::extractor::Token;

/// Tokens sharing a vertical center
#[derive(Debug, Clone)]
pub struct LineCluster {
    /// Vertical center of the token that opened the cluster
    pub key: f32,
    /// Tokens sorted by `x0`
    pub tokens: Vec<Token>,
}

impl LineCluster {
    pub fn text(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Group tokens into visual rows.
///
/// Tokens are visited in `(top, x0)` order so the result does not depend on
/// the order they were extracted in. A token joins the first cluster whose key
/// lies within `tolerance` of its vertical center, otherwise it opens a new
/// cluster keyed by that center. Clusters come back sorted top to bottom.
pub fn cluster_rows(tokens: &[Token], tolerance: f32) -> Vec<LineCluster> {
    let mut ordered: Vec<&Token> = tokens.iter().collect();
    ordered.sort_by(|a, b| {
        a.top
            .total_cmp(&b.top)
            .then(a.x0.total_cmp(&b.x0))
            .then_with(|| a.text.cmp(&b.text))
    });

    let mut clusters: Vec<LineCluster> = Vec::new();
    for token in ordered {
        let v_center = token.v_center();
        match clusters
            .iter_mut()
            .find(|c| (v_center - c.key).abs() < tolerance)
        {
            Some(cluster) => cluster.tokens.push(token.clone()),
            None => clusters.push(LineCluster {
                key: v_center,
                tokens: vec![token.clone()],
            }),
        }
    }

    clusters.sort_by(|a, b| a.key.total_cmp(&b.key));
    for cluster in &mut clusters {
        cluster.tokens.sort_by(|a, b| a.x0.total_cmp(&b.x0));
    }
    clusters
}
