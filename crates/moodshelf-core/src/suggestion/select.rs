use super::ScoredCandidate;

/// Roulette-wheel selection: each candidate is picked with probability
/// proportional to its score.
///
/// `random` must yield values uniform on `[0, 1)`. When the total weight is
/// not positive the pick is uniform instead. Floating-point leftovers fall
/// through to the last candidate.
pub fn pick_weighted_random<'c, 'a, R>(
    candidates: &'c [ScoredCandidate<'a>],
    random: &mut R,
) -> Option<&'c ScoredCandidate<'a>>
where
    R: FnMut() -> f64,
{
    let last = candidates.last()?;
    let total_weight: f64 = candidates.iter().map(|c| f64::from(c.score)).sum();

    if total_weight <= 0.0 {
        let index = (random() * candidates.len() as f64) as usize;
        return candidates.get(index.min(candidates.len() - 1));
    }

    let mut threshold = random() * total_weight;
    for candidate in candidates {
        let weight = f64::from(candidate.score);
        if threshold < weight {
            return Some(candidate);
        }
        threshold -= weight;
    }
    Some(last)
}
