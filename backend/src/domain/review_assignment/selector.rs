//! Fair reviewer selection.
//!
//! Pure decision logic: candidates and their workload are fetched by the
//! caller inside its transaction and handed in. Candidates are ranked by
//! ascending open-review count; equally loaded candidates are ordered at
//! random, so tests may only assert that *one of* a tied set was picked.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::domain::{User, UserId};

use super::Workload;

/// Upper bound on reviewers picked when a pull request is created.
pub const MAX_REVIEWERS: usize = 2;

/// Chooses reviewers by workload.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReviewerSelector;

impl ReviewerSelector {
    /// Pick up to [`MAX_REVIEWERS`] least-loaded candidates, lowest load first.
    ///
    /// `author` and repeated ids are dropped even if the caller left them in.
    /// An empty candidate set yields an empty result.
    ///
    /// # Examples
    /// ```
    /// use rand::SeedableRng;
    /// use rand::rngs::SmallRng;
    /// use reviewer_service::domain::review_assignment::{ReviewerSelector, Workload};
    /// use reviewer_service::domain::{TeamName, User, UserId, Username};
    ///
    /// let user = |id: &str| User::new(
    ///     UserId::new(id).expect("id"),
    ///     Username::new(id).expect("username"),
    ///     TeamName::new("backend").expect("team"),
    ///     true,
    /// );
    /// let workload = Workload::from_counts([
    ///     (UserId::new("u1").expect("id"), 5),
    ///     (UserId::new("u2").expect("id"), 3),
    ///     (UserId::new("u3").expect("id"), 7),
    /// ]);
    /// let picked = ReviewerSelector.select(
    ///     vec![user("u1"), user("u2"), user("u3")],
    ///     &UserId::new("u5").expect("author"),
    ///     &workload,
    ///     &mut SmallRng::seed_from_u64(1),
    /// );
    /// let ids: Vec<&str> = picked.iter().map(|u| u.id().as_str()).collect();
    /// assert_eq!(ids, ["u2", "u1"]);
    /// ```
    pub fn select<R: Rng + ?Sized>(
        &self,
        candidates: Vec<User>,
        author: &UserId,
        workload: &Workload,
        rng: &mut R,
    ) -> Vec<User> {
        let mut seen = HashSet::new();
        let eligible: Vec<User> = candidates
            .into_iter()
            .filter(|candidate| candidate.id() != author)
            .filter(|candidate| seen.insert(candidate.id().clone()))
            .collect();

        rank(eligible, workload, rng)
            .into_iter()
            .take(MAX_REVIEWERS)
            .collect()
    }

    /// Narrow a team roster to members who may take over a review: active
    /// and not in `exclude`.
    pub fn eligible_replacements(&self, members: Vec<User>, exclude: &[UserId]) -> Vec<User> {
        members
            .into_iter()
            .filter(|member| member.is_active() && !exclude.contains(member.id()))
            .collect()
    }

    /// Pick the single least-loaded eligible member, or `None` when nobody
    /// is eligible.
    pub fn select_replacement<R: Rng + ?Sized>(
        &self,
        eligible: Vec<User>,
        workload: &Workload,
        rng: &mut R,
    ) -> Option<User> {
        rank(eligible, workload, rng).into_iter().next()
    }
}

fn rank<R: Rng + ?Sized>(mut candidates: Vec<User>, workload: &Workload, rng: &mut R) -> Vec<User> {
    // Shuffle first; the stable sort keeps the random order within a tie.
    candidates.shuffle(rng);
    candidates.sort_by_key(|candidate| workload.open_reviews(candidate.id()));
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TeamName, Username};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use rstest::{fixture, rstest};
    use std::collections::BTreeSet;

    fn id(raw: &str) -> UserId {
        UserId::new(raw).expect("user id")
    }

    fn user(raw: &str, is_active: bool) -> User {
        User::new(
            id(raw),
            Username::new(raw).expect("username"),
            TeamName::new("backend").expect("team"),
            is_active,
        )
    }

    fn ids(users: &[User]) -> Vec<&str> {
        users.iter().map(|user| user.id().as_str()).collect()
    }

    #[fixture]
    fn author() -> UserId {
        id("author")
    }

    #[rstest]
    fn picks_two_lowest_loads_in_ascending_order(author: UserId) {
        let workload = Workload::from_counts([(id("u1"), 5), (id("u2"), 3), (id("u3"), 7)]);
        let picked = ReviewerSelector.select(
            vec![user("u1", true), user("u2", true), user("u3", true)],
            &author,
            &workload,
            &mut SmallRng::seed_from_u64(11),
        );
        assert_eq!(ids(&picked), ["u2", "u1"]);
    }

    #[rstest]
    fn tie_at_the_bottom_always_yields_the_tied_pair(author: UserId) {
        let workload = Workload::from_counts([(id("a"), 2), (id("b"), 2), (id("c"), 5)]);
        let expected: BTreeSet<&str> = ["a", "b"].into_iter().collect();
        for seed in 0..64 {
            let picked = ReviewerSelector.select(
                vec![user("c", true), user("a", true), user("b", true)],
                &author,
                &workload,
                &mut SmallRng::seed_from_u64(seed),
            );
            let got: BTreeSet<&str> = ids(&picked).into_iter().collect();
            assert_eq!(got, expected, "seed {seed}");
        }
    }

    #[rstest]
    fn tie_break_varies_across_seeds(author: UserId) {
        let workload = Workload::from_counts([(id("a"), 1), (id("b"), 1), (id("c"), 1)]);
        let mut firsts = BTreeSet::new();
        for seed in 0..64 {
            let picked = ReviewerSelector.select(
                vec![user("a", true), user("b", true), user("c", true)],
                &author,
                &workload,
                &mut SmallRng::seed_from_u64(seed),
            );
            if let Some(first) = picked.first() {
                firsts.insert(first.id().as_str().to_owned());
            }
        }
        assert!(firsts.len() > 1, "tie-break never varied: {firsts:?}");
    }

    #[rstest]
    fn same_seed_gives_same_choice(author: UserId) {
        let workload = Workload::default();
        let pool = vec![user("a", true), user("b", true), user("c", true)];
        let first = ReviewerSelector.select(
            pool.clone(),
            &author,
            &workload,
            &mut SmallRng::seed_from_u64(99),
        );
        let second =
            ReviewerSelector.select(pool, &author, &workload, &mut SmallRng::seed_from_u64(99));
        assert_eq!(first, second);
    }

    #[rstest]
    fn never_selects_the_author_or_duplicates(author: UserId) {
        let picked = ReviewerSelector.select(
            vec![user("author", true), user("u1", true), user("u1", true)],
            &author,
            &Workload::default(),
            &mut SmallRng::seed_from_u64(3),
        );
        assert_eq!(ids(&picked), ["u1"]);
    }

    #[rstest]
    fn empty_pool_is_not_an_error(author: UserId) {
        let picked = ReviewerSelector.select(
            Vec::new(),
            &author,
            &Workload::default(),
            &mut SmallRng::seed_from_u64(0),
        );
        assert!(picked.is_empty());
    }

    #[rstest]
    fn replacement_excludes_departing_reviewer_author_and_inactive() {
        let members = vec![
            user("old", true),
            user("author", true),
            user("idle", false),
            user("fresh", true),
        ];
        let eligible =
            ReviewerSelector.eligible_replacements(members, &[id("old"), id("author")]);
        assert_eq!(ids(&eligible), ["fresh"]);

        let chosen = ReviewerSelector.select_replacement(
            eligible,
            &Workload::default(),
            &mut SmallRng::seed_from_u64(5),
        );
        assert_eq!(chosen.map(|user| user.id().clone()), Some(id("fresh")));
    }

    #[rstest]
    fn replacement_prefers_lowest_load() {
        let workload = Workload::from_counts([(id("u2"), 3), (id("u3"), 7)]);
        let chosen = ReviewerSelector.select_replacement(
            vec![user("u3", true), user("u2", true)],
            &workload,
            &mut SmallRng::seed_from_u64(8),
        );
        assert_eq!(chosen.map(|user| user.id().clone()), Some(id("u2")));
    }

    #[rstest]
    fn no_replacement_when_nobody_is_left() {
        let eligible = ReviewerSelector
            .eligible_replacements(vec![user("old", true), user("author", true)], &[
                id("old"),
                id("author"),
            ]);
        let chosen = ReviewerSelector.select_replacement(
            eligible,
            &Workload::default(),
            &mut SmallRng::seed_from_u64(1),
        );
        assert!(chosen.is_none());
    }
}
