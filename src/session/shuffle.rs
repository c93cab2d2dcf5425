//! Presentation-order shuffling of answer options.

use rand::Rng;

use crate::models::{Question, NUM_OPTIONS};

/// Uniform in-place permutation: for `i` from the last index down to 1, swap
/// `items[i]` with `items[j]` for a uniform `j` in `0..=i`.
pub fn fisher_yates<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// A question's options in display order. `order[display] == true index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShuffledOptions {
    position: usize,
    question_id: String,
    order: [usize; NUM_OPTIONS],
}

impl ShuffledOptions {
    pub fn new<R: Rng + ?Sized>(position: usize, question: &Question, rng: &mut R) -> Self {
        let mut order = [0, 1, 2, 3];
        fisher_yates(&mut order, rng);
        Self {
            position,
            question_id: question.id.clone(),
            order,
        }
    }

    pub fn order(&self) -> &[usize; NUM_OPTIONS] {
        &self.order
    }

    /// True option index behind a display slot.
    pub fn original_index(&self, display_index: usize) -> Option<usize> {
        self.order.get(display_index).copied()
    }

    /// `(display index, true index, text)` in display order.
    pub fn iter<'q>(
        &self,
        question: &'q Question,
    ) -> impl Iterator<Item = (usize, usize, &'q str)> {
        self.order
            .iter()
            .enumerate()
            .map(move |(display, original)| {
                (display, *original, question.options[*original].as_str())
            })
    }

    fn is_for(&self, position: usize, question: &Question) -> bool {
        self.position == position && self.question_id == question.id
    }
}

/// Keeps one permutation per displayed question: reshuffles when the
/// question changes, otherwise hands back the same order.
#[derive(Debug)]
pub struct OptionShuffler<R> {
    rng: R,
    current: Option<ShuffledOptions>,
}

impl<R: Rng> OptionShuffler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng, current: None }
    }

    pub fn options_for(&mut self, position: usize, question: &Question) -> &ShuffledOptions {
        let stale = self
            .current
            .as_ref()
            .is_none_or(|current| !current.is_for(position, question));
        if stale {
            self.current = Some(ShuffledOptions::new(position, question, &mut self.rng));
        }
        self.current
            .get_or_insert_with(|| ShuffledOptions::new(position, question, &mut self.rng))
    }

    /// The permutation last produced, if any.
    pub fn current(&self) -> Option<&ShuffledOptions> {
        self.current.as_ref()
    }

    /// Forgets the current permutation so the next call reshuffles.
    pub fn reset(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::fixtures;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_fisher_yates_is_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        for len in 0..12 {
            let mut items: Vec<usize> = (0..len).collect();
            fisher_yates(&mut items, &mut rng);
            let mut sorted = items.clone();
            sorted.sort();
            assert_eq!(sorted, (0..len).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_seeded_shuffle_is_deterministic() {
        let question = fixtures::question("q", "english", 0);
        let a = ShuffledOptions::new(0, &question, &mut StdRng::seed_from_u64(42));
        let b = ShuffledOptions::new(0, &question, &mut StdRng::seed_from_u64(42));
        assert_eq!(a.order(), b.order());
    }

    #[test]
    fn test_every_original_index_appears_once() {
        let question = fixtures::question("q", "english", 2);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let shuffled = ShuffledOptions::new(0, &question, &mut rng);
            let mut seen = [false; NUM_OPTIONS];
            for (display, original, text) in shuffled.iter(&question) {
                assert!(!seen[original]);
                seen[original] = true;
                assert_eq!(shuffled.original_index(display), Some(original));
                assert_eq!(text, question.options[original]);
            }
            assert!(seen.iter().all(|s| *s));
        }
    }

    #[test]
    fn test_correct_answer_maps_back() {
        let question = fixtures::question("q", "math", 1);
        let shuffled = ShuffledOptions::new(0, &question, &mut StdRng::seed_from_u64(11));
        let display = shuffled.order().iter().position(|i| *i == 1).unwrap();
        let chosen = shuffled.original_index(display).unwrap();
        assert!(question.is_correct(chosen));
    }

    #[test]
    fn test_stable_until_question_changes() {
        let first = fixtures::question("a", "english", 0);
        let second = fixtures::question("b", "english", 0);
        let mut shuffler = OptionShuffler::new(StdRng::seed_from_u64(5));

        let initial = shuffler.options_for(0, &first).clone();
        for _ in 0..10 {
            assert_eq!(shuffler.options_for(0, &first), &initial);
        }

        let next = shuffler.options_for(1, &second).clone();
        assert_eq!(next.position, 1);
        assert_eq!(next.question_id, "b");
    }

    #[test]
    fn test_reset_forces_new_permutation() {
        let question = fixtures::question("a", "english", 0);
        let mut shuffler = OptionShuffler::new(StdRng::seed_from_u64(9));
        shuffler.options_for(0, &question);
        shuffler.reset();
        assert!(shuffler.current().is_none());
        shuffler.options_for(0, &question);
        assert!(shuffler.current().is_some());
    }
}
