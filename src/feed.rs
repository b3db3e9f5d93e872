use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::Topic;

/// How many regular topics are emitted before each demoted one.
pub const REGULAR_RUN_LENGTH: usize = 5;

/// Build the ordered feed for one session.
///
/// The topic set is uniformly shuffled with the caller's RNG, then split into
/// regular topics and topics whose category has been down-ranked, keeping each
/// side's shuffle order. Down-ranked topics still appear, just less often:
/// one after every run of up to five regular topics. Whichever side empties
/// first, the other is drained without gaps.
///
/// Every call re-shuffles; the output is a materialized snapshot, not a
/// restartable stream.
pub fn schedule<R>(topics: &[Topic], down_ranked: &BTreeSet<String>, rng: &mut R) -> Vec<Topic>
where
    R: Rng + ?Sized,
{
    let mut shuffled: Vec<Topic> = topics.to_vec();
    shuffled.shuffle(rng);

    let (regular, demoted): (Vec<Topic>, Vec<Topic>) = shuffled
        .into_iter()
        .partition(|topic| !down_ranked.contains(&topic.category));

    let mut feed = Vec::with_capacity(regular.len() + demoted.len());
    let mut regular = regular.into_iter();
    let mut demoted = demoted.into_iter();

    loop {
        let mut emitted_regular = 0;
        for topic in regular.by_ref() {
            feed.push(topic);
            emitted_regular += 1;
            if emitted_regular == REGULAR_RUN_LENGTH {
                break;
            }
        }
        match demoted.next() {
            Some(topic) => feed.push(topic),
            // Regulars also ran dry this round: both sides are exhausted.
            None if emitted_regular < REGULAR_RUN_LENGTH => break,
            None => {}
        }
    }

    feed
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn topic(id: &str, category: &str) -> Topic {
        let mut t = Topic::new(format!("topic {id}"), "x", category);
        t.id = id.to_string();
        t
    }

    fn ids(feed: &[Topic]) -> Vec<String> {
        feed.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn empty_input_gives_empty_feed() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(schedule(&[], &BTreeSet::new(), &mut rng).is_empty());
    }

    #[test]
    fn output_is_a_permutation_of_the_input() {
        let topics: Vec<Topic> = (0..12)
            .map(|i| topic(&format!("t{i}"), if i % 3 == 0 { "Food" } else { "Sports" }))
            .collect();
        let mut rng = StdRng::seed_from_u64(7);
        let feed = schedule(&topics, &BTreeSet::new(), &mut rng);
        assert_eq!(feed.len(), topics.len());
        let expected: HashSet<String> = topics.iter().map(|t| t.id.clone()).collect();
        let got: HashSet<String> = feed.iter().map(|t| t.id.clone()).collect();
        assert_eq!(expected, got);
    }

    #[test]
    fn consecutive_calls_reshuffle() {
        let topics: Vec<Topic> = (0..32).map(|i| topic(&format!("t{i}"), "Music")).collect();
        let mut rng = StdRng::seed_from_u64(42);
        let first = ids(&schedule(&topics, &BTreeSet::new(), &mut rng));
        let second = ids(&schedule(&topics, &BTreeSet::new(), &mut rng));
        // With 32! orderings, two identical draws would mean the shuffle is
        // replaying hidden state.
        assert_ne!(first, second);
    }

    #[test]
    fn interleave_holds_five_to_one() {
        let mut topics: Vec<Topic> = (0..20).map(|i| topic(&format!("r{i}"), "Sports")).collect();
        topics.extend((0..4).map(|i| topic(&format!("d{i}"), "Food")));
        let down_ranked: BTreeSet<String> = ["Food".to_string()].into();

        let mut rng = StdRng::seed_from_u64(3);
        let feed = schedule(&topics, &down_ranked, &mut rng);
        assert_eq!(feed.len(), 24);

        // 20 regulars and 4 demoted tile exactly: demoted topics land at
        // positions 5, 11, 17 and 23, whatever the shuffle did.
        for (i, t) in feed.iter().enumerate() {
            let demoted = down_ranked.contains(&t.category);
            assert_eq!(demoted, i % 6 == 5, "unexpected category at position {i}");
        }
    }

    #[test]
    fn demoted_topics_drain_after_regulars_are_exhausted() {
        let mut topics: Vec<Topic> = (0..3).map(|i| topic(&format!("r{i}"), "Sports")).collect();
        topics.extend((0..5).map(|i| topic(&format!("d{i}"), "Food")));
        let down_ranked: BTreeSet<String> = ["Food".to_string()].into();

        let mut rng = StdRng::seed_from_u64(11);
        let feed = schedule(&topics, &down_ranked, &mut rng);
        assert_eq!(feed.len(), 8);
        // Three regulars first, then the demoted tail.
        assert!(feed[..3].iter().all(|t| t.category == "Sports"));
        assert!(feed[3..].iter().all(|t| t.category == "Food"));
    }

    #[test]
    fn all_categories_down_ranked_falls_back_to_plain_shuffle_order() {
        let topics: Vec<Topic> = (0..6).map(|i| topic(&format!("d{i}"), "Food")).collect();
        let down_ranked: BTreeSet<String> = ["Food".to_string()].into();
        let mut rng = StdRng::seed_from_u64(5);
        let feed = schedule(&topics, &down_ranked, &mut rng);
        assert_eq!(feed.len(), 6);
    }

    #[test]
    fn regulars_only_come_out_complete() {
        let topics: Vec<Topic> = (0..7).map(|i| topic(&format!("r{i}"), "Sports")).collect();
        let mut rng = StdRng::seed_from_u64(9);
        let feed = schedule(&topics, &BTreeSet::new(), &mut rng);
        assert_eq!(feed.len(), 7);
    }
}
