pub mod vote;

use std::collections::BTreeSet;
use std::sync::Arc;

use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::audio::AudioService;
use crate::feed;
use crate::gesture;
use crate::models::{Comment, DragSample, Topic, VoteResult, VoteType};
use crate::prefs::PreferencesStore;
use crate::store::{Leaderboard, VoteStore};
use self::vote::VoteSession;

/// Where the feed stands, distinct states for "loading", "failed" and
/// "nothing left to swipe".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedPhase {
    Loading,
    Ready,
    Failed(String),
    Exhausted,
}

/// Outcome of handing a released gesture to the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SwipeOutcome {
    /// Inconclusive gesture; animate the card back to rest.
    SnapBack,
    /// Dropped by a guard (duplicate gesture, no active card).
    Dropped,
    /// The vote resolved, successfully or via the neutral fallback.
    Resolved(VoteResult),
}

/// Owns the ordered feed queue, the cursor, and the session's down-rank set,
/// and drives one [`VoteSession`] at a time over the injected collaborators.
pub struct SessionController {
    store: Arc<dyn VoteStore>,
    audio: Arc<dyn AudioService>,
    prefs: Arc<dyn PreferencesStore>,
    rng: Box<dyn RngCore + Send>,
    topics: Vec<Topic>,
    queue: Vec<Topic>,
    current_index: usize,
    down_ranked: BTreeSet<String>,
    active: Option<VoteSession>,
    last_result: Option<VoteResult>,
    phase: FeedPhase,
}

impl SessionController {
    pub fn new(
        store: Arc<dyn VoteStore>,
        audio: Arc<dyn AudioService>,
        prefs: Arc<dyn PreferencesStore>,
    ) -> Self {
        Self::with_rng(store, audio, prefs, Box::new(StdRng::from_entropy()))
    }

    /// Injectable RNG so feed ordering is deterministic under test.
    pub fn with_rng(
        store: Arc<dyn VoteStore>,
        audio: Arc<dyn AudioService>,
        prefs: Arc<dyn PreferencesStore>,
        rng: Box<dyn RngCore + Send>,
    ) -> Self {
        Self {
            store,
            audio,
            prefs,
            rng,
            topics: Vec::new(),
            queue: Vec::new(),
            current_index: 0,
            down_ranked: BTreeSet::new(),
            active: None,
            last_result: None,
            phase: FeedPhase::Loading,
        }
    }

    /// Initial load (and retry after a failed one): fetch the topic set, then
    /// build the queue. A fetch failure is the one error surfaced to the
    /// user; it leaves the controller in a recoverable `Failed` phase.
    pub async fn start(&mut self) {
        self.phase = FeedPhase::Loading;
        self.active = None;
        self.last_result = None;
        match self.store.fetch_topics().await {
            Ok(topics) => {
                info!("fetched {} topics", topics.len());
                self.topics = topics;
                self.rebuild();
            }
            Err(e) => {
                error!("topic fetch failed: {e}");
                self.phase = FeedPhase::Failed(e.to_string());
            }
        }
    }

    /// "Start Over": re-fetch and rebuild. The down-rank set survives, which
    /// is exactly when skipped categories start appearing less.
    pub async fn restart(&mut self) {
        self.start().await;
    }

    /// Fresh session: forget the down-rank set, then start over.
    pub async fn reset(&mut self) {
        self.down_ranked.clear();
        self.start().await;
    }

    /// Reconstruct the queue from the cached topic set and the current
    /// down-rank set, resetting the cursor. Never triggered automatically by
    /// a down-rank mid-session; the materialized queue stays as-is until the
    /// next explicit rebuild.
    pub fn rebuild(&mut self) {
        self.queue = feed::schedule(&self.topics, &self.down_ranked, self.rng.as_mut());
        self.current_index = 0;
        self.last_result = None;
        if self.queue.is_empty() {
            self.active = None;
            self.phase = FeedPhase::Exhausted;
        } else {
            self.phase = FeedPhase::Ready;
            self.activate_current();
        }
    }

    fn activate_current(&mut self) {
        let topic = self.queue[self.current_index].clone();
        let mut session = VoteSession::new(topic);
        session.present(self.audio.as_ref(), self.prefs.voice_enabled());
        self.active = Some(session);
    }

    /// Interpret a released gesture for the active card.
    pub async fn swipe(&mut self, sample: DragSample) -> SwipeOutcome {
        let Some(direction) = gesture::classify(sample) else {
            return SwipeOutcome::SnapBack;
        };
        let Some(session) = self.active.as_mut() else {
            return SwipeOutcome::Dropped;
        };
        let category = session.topic().category.clone();

        match session
            .swipe(direction, self.store.as_ref(), self.audio.as_ref())
            .await
        {
            Some(resolution) => {
                if resolution.recorded && resolution.vote_type == VoteType::Ignore {
                    self.on_ignore(&category);
                }
                self.last_result = Some(resolution.result);
                SwipeOutcome::Resolved(resolution.result)
            }
            None => SwipeOutcome::Dropped,
        }
    }

    /// Down-rank a category for future feed constructions. Idempotent; the
    /// set only grows within a session.
    pub fn on_ignore(&mut self, category: &str) {
        if self.down_ranked.insert(category.to_string()) {
            info!("down-ranked category {category}");
        }
    }

    /// Tap-to-continue from a resolved card. Moves the cursor forward by
    /// exactly one; unreachable until the active vote has resolved. Returns
    /// false when there was nothing to acknowledge.
    pub fn advance(&mut self) -> bool {
        let Some(session) = self.active.as_mut() else {
            return false;
        };
        if session.acknowledge().is_none() {
            return false;
        }
        self.active = None;
        self.last_result = None;
        self.current_index += 1;
        if self.current_index >= self.queue.len() {
            self.phase = FeedPhase::Exhausted;
        } else {
            self.activate_current();
        }
        true
    }

    pub fn current_topic(&self) -> Option<&Topic> {
        self.active.as_ref().map(|s| s.topic())
    }

    /// The next few topics after the current one, for the card-stack preview.
    pub fn upcoming(&self, n: usize) -> &[Topic] {
        let start = (self.current_index + 1).min(self.queue.len());
        let end = (start + n).min(self.queue.len());
        &self.queue[start..end]
    }

    pub fn phase(&self) -> &FeedPhase {
        &self.phase
    }

    pub fn feed_exhausted(&self) -> bool {
        self.phase == FeedPhase::Exhausted
    }

    /// True strictly while a vote round trip is in flight; the presentation
    /// layer uses this to guard duplicate gesture dispatch.
    pub fn is_processing(&self) -> bool {
        self.active.as_ref().is_some_and(|s| s.is_processing())
    }

    pub fn last_vote_result(&self) -> Option<&VoteResult> {
        self.last_result.as_ref()
    }

    pub fn down_ranked(&self) -> &BTreeSet<String> {
        &self.down_ranked
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Toggle the read-aloud preference, cancelling speech on the way off.
    pub fn set_voice(&mut self, enabled: bool) {
        self.prefs.set_voice_enabled(enabled);
        if !enabled {
            self.audio.stop_speaking();
        }
    }

    pub fn prefs(&self) -> &dyn PreferencesStore {
        self.prefs.as_ref()
    }

    // Comment operations are best-effort: failures are logged and absorbed,
    // never surfaced.

    pub async fn comments(&self, topic_id: &str) -> Vec<Comment> {
        match self.store.fetch_comments(topic_id).await {
            Ok(comments) => comments,
            Err(e) => {
                warn!("fetching comments for {topic_id} failed: {e}");
                Vec::new()
            }
        }
    }

    pub async fn post_comment(&self, topic_id: &str, text: &str) -> Option<Comment> {
        match self.store.post_comment(topic_id, text).await {
            Ok(comment) => Some(comment),
            Err(e) => {
                warn!("posting comment on {topic_id} failed: {e}");
                None
            }
        }
    }

    pub async fn upvote_comment(&self, comment_id: &str) -> Option<i64> {
        match self.store.upvote_comment(comment_id).await {
            Ok(count) => Some(count),
            Err(e) => {
                warn!("upvoting comment {comment_id} failed: {e}");
                None
            }
        }
    }

    pub async fn leaderboard(&self) -> Option<Leaderboard> {
        match self.store.leaderboard().await {
            Ok(board) => Some(board),
            Err(e) => {
                warn!("leaderboard fetch failed: {e}");
                None
            }
        }
    }
}
