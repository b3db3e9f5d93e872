use log::{debug, error};

use crate::audio::AudioService;
use crate::models::{SwipeDirection, Topic, VoteResult, VoteType};
use crate::store::VoteStore;

/// Lifecycle of a single card, from shown to resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteState {
    Idle,
    AwaitingGesture,
    Resolving,
    Resolved,
}

/// What a completed swipe produced. `recorded` is false when the store call
/// failed and the neutral fallback was substituted.
#[derive(Debug, Clone, Copy)]
pub struct SwipeResolution {
    pub vote_type: VoteType,
    pub result: VoteResult,
    pub recorded: bool,
}

/// Per-topic state machine driving one card's lifecycle.
///
/// At most one vote is ever counted per card: a gesture is accepted only in
/// `AwaitingGesture`, and the transition out happens before the store call
/// suspends, so a second gesture arriving mid-flight is dropped.
pub struct VoteSession {
    topic: Topic,
    state: VoteState,
    result: Option<VoteResult>,
}

impl VoteSession {
    pub fn new(topic: Topic) -> Self {
        Self {
            topic,
            state: VoteState::Idle,
            result: None,
        }
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn state(&self) -> VoteState {
        self.state
    }

    /// True strictly while the vote round trip is in flight.
    pub fn is_processing(&self) -> bool {
        self.state == VoteState::Resolving
    }

    pub fn result(&self) -> Option<&VoteResult> {
        self.result.as_ref()
    }

    /// The topic becomes the active card. Any speech left over from the
    /// previous card is cancelled; the new topic is read aloud when the voice
    /// preference is on.
    pub fn present(&mut self, audio: &dyn AudioService, voice_on: bool) {
        if self.state != VoteState::Idle {
            return;
        }
        audio.stop_speaking();
        if voice_on {
            audio.speak(&self.topic.text);
        }
        self.state = VoteState::AwaitingGesture;
    }

    /// Drive one classified gesture to resolution.
    ///
    /// Feedback audio plays synchronously before the store call; on store
    /// failure there is no retry, the neutral result stands in and the error
    /// is logged. Returns `None` when the gesture was dropped by the state
    /// guard.
    pub async fn swipe(
        &mut self,
        direction: SwipeDirection,
        store: &dyn VoteStore,
        audio: &dyn AudioService,
    ) -> Option<SwipeResolution> {
        if self.state != VoteState::AwaitingGesture {
            debug!(
                "dropping gesture {:?} for topic {} in state {:?}",
                direction, self.topic.id, self.state
            );
            return None;
        }
        self.state = VoteState::Resolving;

        audio.stop_speaking();
        match direction {
            SwipeDirection::Up => audio.play_ignore(),
            other => audio.play_swipe(other),
        }

        let vote_type = direction.vote_type();
        let resolution = match store.record_vote(&self.topic.id, vote_type).await {
            Ok(result) => {
                if vote_type != VoteType::Ignore {
                    let user_over = vote_type == VoteType::Over;
                    let majority_over = result.overrated_percent > 50;
                    audio.play_reaction(user_over == majority_over, user_over);
                }
                SwipeResolution {
                    vote_type,
                    result,
                    recorded: true,
                }
            }
            Err(e) => {
                error!(
                    "{} vote submission failed for topic {}: {e}",
                    vote_type.as_str(),
                    self.topic.id
                );
                SwipeResolution {
                    vote_type,
                    result: VoteResult::NEUTRAL,
                    recorded: false,
                }
            }
        };

        self.result = Some(resolution.result);
        self.state = VoteState::Resolved;
        Some(resolution)
    }

    /// Explicit tap-to-continue. Hands the result back exactly once so the
    /// caller can advance; the result is not cached beyond this.
    pub fn acknowledge(&mut self) -> Option<VoteResult> {
        if self.state != VoteState::Resolved {
            return None;
        }
        self.result.take()
    }
}
