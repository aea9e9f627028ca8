use qgram::QGramSet;

/// Jaccard similarity `|a ∩ b| / |a ∪ b|`.
///
/// Two empty sets have similarity 0.
pub fn jaccard(a: &QGramSet, b: &QGramSet) -> f64 {
    let shared = a.intersection(b).count();
    let union = a.len() + b.len() - shared;
    if union == 0 {
        return 0.0;
    }
    shared as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> QGramSet {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn identical_sets_score_one() {
        let a = set(&["jo", "oh", "hn"]);
        assert_eq!(jaccard(&a, &a), 1.0);
    }

    #[test]
    fn disjoint_sets_score_zero() {
        assert_eq!(jaccard(&set(&["jo", "oh"]), &set(&["zz", "ww"])), 0.0);
    }

    #[test]
    fn partial_overlap() {
        let record = set(&["jo", "oh", "hn"]);
        assert_eq!(jaccard(&record, &set(&["jo", "xx"])), 0.25);
        assert_eq!(jaccard(&record, &set(&["jo", "oh"])), 2.0 / 3.0);
    }

    #[test]
    fn symmetric_and_bounded() {
        let sets = [
            set(&["ab"]),
            set(&["ab", "bc"]),
            set(&["bc", "cd", "de"]),
            set(&["xy", "ab", "cd"]),
        ];
        for a in &sets {
            for b in &sets {
                let s = jaccard(a, b);
                assert!((0.0..=1.0).contains(&s));
                assert_eq!(s, jaccard(b, a));
            }
        }
    }

    #[test]
    fn empty_sets_score_zero() {
        assert_eq!(jaccard(&QGramSet::new(), &QGramSet::new()), 0.0);
        assert_eq!(jaccard(&QGramSet::new(), &set(&["ab"])), 0.0);
    }
}
