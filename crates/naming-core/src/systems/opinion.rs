//! Opinion Alignment
//!
//! The advanced model's interaction: a speaker utters an opinion to its group.
//! Any disagreement pushes uncommitted listeners into the mixed state; a group
//! that already agrees adopts the word together with probability β.

use rand::Rng;

use crate::components::Opinion;

/// A listener's state going into an interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listener {
    pub opinion: Opinion,
    pub committed: bool,
}

impl Listener {
    pub fn new(opinion: Opinion, committed: bool) -> Self {
        Self { opinion, committed }
    }
}

/// How an interaction ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationOutcome {
    /// Someone did not hold the word; `converted` listeners became mixed
    Disagreement { converted: usize },
    /// Everyone agreed and adopted the word
    Adopted,
    /// Everyone agreed but the adoption trial failed
    Declined,
}

/// Result of one interaction: the spoken word and everyone's new opinion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Negotiation {
    pub word: Opinion,
    pub outcome: NegotiationOutcome,
    pub speaker: Opinion,
    /// New opinions, index-aligned with the input listeners
    pub listeners: Vec<Opinion>,
}

/// Run the group interaction rule.
///
/// Disagreement short-circuits the adoption trial. Committed agents keep their
/// opinion on every path; on the adoption path it already equals the word.
/// A mixed speaker is only resolved through adoption.
pub fn negotiate<R: Rng + ?Sized>(
    speaker: Opinion,
    speaker_committed: bool,
    listeners: &[Listener],
    propensity: f64,
    rng: &mut R,
) -> Negotiation {
    let word = speaker.spoken_word(rng);

    let mut converted = 0;
    let mut disagreement = false;
    let mut opinions: Vec<Opinion> = listeners.iter().map(|l| l.opinion).collect();
    for (listener, opinion) in listeners.iter().zip(opinions.iter_mut()) {
        if listener.opinion.holds(word) {
            continue;
        }
        disagreement = true;
        if !listener.committed {
            *opinion = Opinion::Mixed;
            converted += 1;
        }
    }

    if disagreement {
        return Negotiation {
            word,
            outcome: NegotiationOutcome::Disagreement { converted },
            speaker,
            listeners: opinions,
        };
    }

    if rng.gen::<f64>() < propensity {
        let adopt = |opinion: Opinion, committed: bool| if committed { opinion } else { word };
        let listeners = listeners
            .iter()
            .map(|l| adopt(l.opinion, l.committed))
            .collect();
        Negotiation {
            word,
            outcome: NegotiationOutcome::Adopted,
            speaker: adopt(speaker, speaker_committed),
            listeners,
        }
    } else {
        Negotiation {
            word,
            outcome: NegotiationOutcome::Declined,
            speaker,
            listeners: opinions,
        }
    }
}
