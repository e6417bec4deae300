//! Cosine ranking for the filtered candidate pool of a vector search.

use ambel_core::ProfessionalRecord;

/// `None` when the vectors differ in length, are empty, or either has zero norm.
pub fn cosine_similarity(left: &[f32], right: &[f32]) -> Option<f32> {
    if left.is_empty() || left.len() != right.len() {
        return None;
    }

    let (dot, left_norm, right_norm) =
        left.iter().zip(right).fold((0.0_f32, 0.0_f32, 0.0_f32), |(dot, l, r), (a, b)| {
            (dot + a * b, l + a * a, r + b * b)
        });
    if left_norm == 0.0 || right_norm == 0.0 {
        return None;
    }

    Some(dot / (left_norm.sqrt() * right_norm.sqrt()))
}

/// Orders candidates by descending similarity to `query` and keeps the first
/// `limit`. Unscorable candidates sink to the end; ties keep pool order.
pub fn rank_candidates(
    query: &[f32],
    candidates: Vec<ProfessionalRecord>,
    limit: usize,
) -> Vec<ProfessionalRecord> {
    let mut scored = candidates
        .into_iter()
        .map(|record| {
            let score = cosine_similarity(query, &record.embedding).unwrap_or(f32::NEG_INFINITY);
            (score, record)
        })
        .collect::<Vec<_>>();

    scored.sort_by(|(left, _), (right, _)| right.total_cmp(left));
    scored.into_iter().take(limit).map(|(_, record)| record).collect()
}

#[cfg(test)]
mod tests {
    use ambel_core::ProfessionalRecord;

    use super::{cosine_similarity, rank_candidates};

    fn record(name: &str, embedding: Vec<f32>) -> ProfessionalRecord {
        ProfessionalRecord {
            name: name.to_string(),
            professional_type: "doctor".to_string(),
            specialty: "cardiologist".to_string(),
            location: "chattogram".to_string(),
            description: String::new(),
            embedding,
            availability: Vec::new(),
        }
    }

    #[test]
    fn cosine_similarity_handles_degenerate_vectors() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]), Some(1.0));
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), Some(0.0));
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), None);
        assert_eq!(cosine_similarity(&[], &[]), None);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), None);
    }

    #[test]
    fn ranking_orders_by_similarity_and_truncates() {
        let ranked = rank_candidates(
            &[1.0, 0.0],
            vec![
                record("far", vec![0.0, 1.0]),
                record("near", vec![1.0, 0.1]),
                record("broken", vec![1.0]),
                record("mid", vec![1.0, 1.0]),
            ],
            3,
        );

        let names = ranked.iter().map(|record| record.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["near", "mid", "far"]);
    }

    #[test]
    fn ranking_keeps_pool_order_for_ties() {
        let ranked = rank_candidates(
            &[1.0, 0.0],
            vec![record("first", vec![2.0, 0.0]), record("second", vec![3.0, 0.0])],
            5,
        );

        let names = ranked.iter().map(|record| record.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["first", "second"]);
    }
}
