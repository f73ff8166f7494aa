use crate::card::TrainColor;
use crate::error::{Error, Result};
use crate::rules::{DeckKind, DeckRules};

use log::trace;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::iter::repeat;
use strum::{EnumCount, IntoEnumIterator};

/// Usual size of the face-up row.
pub const NUM_FACE_UP_CARDS: usize = 5;

/// The face-up row. Empty slots are `None`, which only happens once a finite deck runs out.
pub type FaceUpRow = SmallVec<[Option<TrainColor>; NUM_FACE_UP_CARDS]>;

/// Where train cards are drawn from.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Deck {
    /// Cards are drawn without replacement from `draw_pile`.
    /// Once it is empty, `discard_pile` becomes the new draw pile.
    Finite {
        draw_pile: Vec<TrainColor>,
        discard_pile: Vec<TrainColor>,
    },
    /// Every draw samples the same distribution, with one weight per color.
    Uniform { weights: [u32; TrainColor::COUNT] },
}

impl Deck {
    /// Creates a full deck out of its composition.
    pub fn new(rules: &DeckRules) -> Self {
        let count = |color: TrainColor| {
            if color.is_wild() {
                rules.wilds
            } else {
                rules.cards_per_color
            }
        };

        match rules.kind {
            DeckKind::Finite => {
                let mut draw_pile = Vec::new();
                for color in TrainColor::iter() {
                    draw_pile.extend(repeat(color).take(count(color) as usize));
                }
                Deck::Finite {
                    draw_pile,
                    discard_pile: Vec::new(),
                }
            }
            DeckKind::Uniform => {
                let mut weights = [0; TrainColor::COUNT];
                for color in TrainColor::iter() {
                    weights[color as usize] = count(color);
                }
                Deck::Uniform { weights }
            }
        }
    }

    /// Draws one card.
    ///
    /// A finite deck picks uniformly amongst the cards left, recycling the discard pile if needed.
    /// Returns [`Error::OutOfCards`] if there is nothing left to draw.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<TrainColor> {
        match self {
            Deck::Finite {
                draw_pile,
                discard_pile,
            } => {
                if draw_pile.is_empty() {
                    std::mem::swap(draw_pile, discard_pile);
                }
                if draw_pile.is_empty() {
                    return Err(Error::OutOfCards);
                }

                let index = rng.gen_range(0..draw_pile.len());
                Ok(draw_pile.swap_remove(index))
            }
            Deck::Uniform { weights } => {
                let distribution =
                    WeightedIndex::<u32>::new(weights.iter()).map_err(|_| Error::OutOfCards)?;
                let index = distribution.sample(rng);
                TrainColor::iter().nth(index).ok_or(Error::OutOfCards)
            }
        }
    }

    /// Gives cards back. A uniform deck simply forgets them.
    pub fn discard(&mut self, cards: impl IntoIterator<Item = TrainColor>) {
        if let Deck::Finite { discard_pile, .. } = self {
            discard_pile.extend(cards);
        }
    }

    /// Whether a draw can succeed.
    pub fn is_empty(&self) -> bool {
        match self {
            Deck::Finite {
                draw_pile,
                discard_pile,
            } => draw_pile.is_empty() && discard_pile.is_empty(),
            Deck::Uniform { weights } => weights.iter().all(|weight| *weight == 0),
        }
    }

    /// Number of cards left to draw, including the discard pile. `None` if the deck never runs out.
    pub fn remaining(&self) -> Option<usize> {
        match self {
            Deck::Finite {
                draw_pile,
                discard_pile,
            } => Some(draw_pile.len() + discard_pile.len()),
            Deck::Uniform { .. } => None,
        }
    }

    /// Number of non-wild and wild cards left in the deck. `None` if the deck never runs out.
    fn composition(&self) -> Option<(usize, usize)> {
        match self {
            Deck::Finite {
                draw_pile,
                discard_pile,
            } => {
                let wild = draw_pile
                    .iter()
                    .chain(discard_pile.iter())
                    .filter(|card| card.is_wild())
                    .count();
                Some((draw_pile.len() + discard_pile.len() - wild, wild))
            }
            Deck::Uniform { .. } => None,
        }
    }

    /// Whether a draw can yield a non-wild card.
    fn can_yield_non_wild(&self) -> bool {
        match self {
            Deck::Finite { .. } => self
                .composition()
                .map_or(false, |(non_wild, _)| non_wild > 0),
            Deck::Uniform { weights } => {
                TrainColor::non_wild().any(|color| weights[color as usize] > 0)
            }
        }
    }
}

/// Entity in charge of dealing train cards, and of maintaining the face-up row.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CardDealer {
    deck: Deck,
    face_up: FaceUpRow,
    max_wilds_face_up: usize,
}

impl CardDealer {
    /// Creates a new `CardDealer`, with a full deck and a valid face-up row.
    /// This means that the face-up row shows fewer than `max_wilds_face_up` wild cards, whenever possible.
    ///
    /// # Example
    /// ```
    /// use conductor::deck::CardDealer;
    /// use conductor::rules::DeckRules;
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    ///
    /// let mut rng = ChaCha8Rng::seed_from_u64(7);
    /// let card_dealer = CardDealer::new(&DeckRules::default(), 5, 3, &mut rng);
    ///
    /// assert_eq!(card_dealer.face_up().len(), 5);
    /// assert!(card_dealer.wilds_face_up() < 3);
    /// assert_eq!(card_dealer.deck().remaining(), Some(110 - 5));
    /// ```
    pub fn new<R: Rng + ?Sized>(
        rules: &DeckRules,
        face_up_cards: usize,
        max_wilds_face_up: usize,
        rng: &mut R,
    ) -> Self {
        let mut deck = Deck::new(rules);
        let face_up = (0..face_up_cards).map(|_| deck.draw(rng).ok()).collect();

        let mut card_dealer = Self {
            deck,
            face_up,
            max_wilds_face_up,
        };
        card_dealer.maybe_reshuffle_face_up(rng);

        card_dealer
    }

    #[inline]
    pub fn face_up(&self) -> &[Option<TrainColor>] {
        &self.face_up
    }

    #[inline]
    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    /// Number of wild cards showing in the face-up row.
    pub fn wilds_face_up(&self) -> usize {
        self.face_up
            .iter()
            .flatten()
            .filter(|card| card.is_wild())
            .count()
    }

    /// Whether the row would be redrawn right now.
    fn should_reshuffle_face_up(&self) -> bool {
        if self.wilds_face_up() < self.max_wilds_face_up {
            return false;
        }

        // Only reshuffle if some row could be dealt with fewer wild cards than the limit.
        // Otherwise, we would reshuffle ad infinitum.
        let (row_non_wild, row_wild) = self.face_up.iter().flatten().fold(
            (0, 0),
            |(non_wild, wild), card| {
                if card.is_wild() {
                    (non_wild, wild + 1)
                } else {
                    (non_wild + 1, wild)
                }
            },
        );

        match self.deck.composition() {
            Some((deck_non_wild, deck_wild)) => {
                let non_wild = row_non_wild + deck_non_wild;
                let total = non_wild + row_wild + deck_wild;
                let dealt = self.face_up.len().min(total);
                dealt - dealt.min(non_wild) < self.max_wilds_face_up
            }
            None => self.deck.can_yield_non_wild(),
        }
    }

    /// Applies the wild card limit: while the face-up row shows too many wild cards, it is
    /// discarded and dealt again.
    ///
    /// Returns whether the row was redrawn at all.
    fn maybe_reshuffle_face_up<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        let mut reshuffled = false;

        while self.should_reshuffle_face_up() {
            trace!("too many wild cards face up ({:?}), redrawing", self.face_up);

            let discarded: Vec<_> = self.face_up.iter().flatten().copied().collect();
            self.deck.discard(discarded);
            for slot in self.face_up.iter_mut() {
                *slot = self.deck.draw(rng).ok();
            }

            reshuffled = true;
        }

        reshuffled
    }

    /// Whether the face-up card at `index` may be taken.
    ///
    /// The slot must exist and hold a card, and a wild card cannot be taken on a second draw.
    pub fn can_take_face_up(&self, index: usize, is_second_draw: bool) -> bool {
        match self.face_up.get(index) {
            Some(Some(card)) => !(is_second_draw && card.is_wild()),
            _ => false,
        }
    }

    /// Takes a train card from the face-up row, based on the given `index`.
    ///
    /// The slot is refilled from the deck (or left empty if the deck ran out), after which the
    /// wild card limit is applied again.
    ///
    /// Returns the card taken, along with whether the row had to be redrawn. Returns `None`,
    /// without changing anything, if [`CardDealer::can_take_face_up`] does not allow it.
    pub fn draw_face_up<R: Rng + ?Sized>(
        &mut self,
        index: usize,
        is_second_draw: bool,
        rng: &mut R,
    ) -> Option<(TrainColor, bool)> {
        if !self.can_take_face_up(index, is_second_draw) {
            return None;
        }

        let card = self.face_up[index]?;
        self.face_up[index] = self.deck.draw(rng).ok();

        Some((card, self.maybe_reshuffle_face_up(rng)))
    }

    /// Draws the next card from the deck, without looking.
    ///
    /// Returns [`Error::OutOfCards`] if the deck is empty.
    #[inline]
    pub fn draw_blind<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<TrainColor> {
        self.deck.draw(rng)
    }

    /// Gives train cards back, e.g. after paying for a track.
    pub fn discard(&mut self, cards: impl IntoIterator<Item = TrainColor>) {
        self.deck.discard(cards);
    }

    /// Whether a player could draw anything at all.
    pub fn can_draw(&self) -> bool {
        !self.deck.is_empty() || self.face_up.iter().any(Option::is_some)
    }

    /// Predicate that determines whether a player should be allowed to draw a train card again this turn.
    ///
    /// If there are no cards left anywhere, or if the only cards left are wild cards in the
    /// face-up row, the player cannot draw again, and their turn ends early.
    pub fn can_draw_again(&self) -> bool {
        !self.deck.is_empty()
            || self
                .face_up
                .iter()
                .any(|card| matches!(card, Some(color) if color.is_not_wild()))
    }
}
