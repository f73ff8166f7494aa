use crate::error::{Error, Result};

use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount as EnumCountMacro, EnumIter};

/// Represents the different variants of train cards.
///
/// On a track, [`TrainColor::Wild`] has a different meaning: the track is gray, and accepts any color.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    EnumCountMacro,
    EnumIter,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TrainColor {
    Black,
    Blue,
    Green,
    Orange,
    Pink,
    Red,
    White,
    /// Also known as the *Locomotive*.
    /// This is a special train that matches with any color.
    Wild,
    Yellow,
}

impl TrainColor {
    /// Whether the current color is wild, i.e. matches with any color.
    ///
    /// # Examples:
    /// ```
    /// use conductor::card::TrainColor;
    ///
    /// assert!(!TrainColor::Black.is_wild());
    /// assert!(TrainColor::Wild.is_wild());
    /// ```
    #[inline]
    pub fn is_wild(&self) -> bool {
        *self == TrainColor::Wild
    }

    /// The opposite of `is_wild`.
    #[inline]
    pub fn is_not_wild(&self) -> bool {
        !self.is_wild()
    }

    /// All colors but the wild one, in declaration order.
    pub fn non_wild() -> impl Iterator<Item = TrainColor> {
        TrainColor::iter().filter(TrainColor::is_not_wild)
    }

    /// Parses a color as written in map and rules files.
    ///
    /// Besides the eight color names, the wild color can be spelled `wild` or `locomotive`,
    /// and the "any color" track marker `any`, `gray` or `unspecified`. Case is ignored.
    ///
    /// # Example
    /// ```
    /// use conductor::card::TrainColor;
    ///
    /// assert_eq!(TrainColor::from_name("Red").unwrap(), TrainColor::Red);
    /// assert_eq!(TrainColor::from_name("gray").unwrap(), TrainColor::Wild);
    /// assert!(TrainColor::from_name("turquoise").is_err());
    /// ```
    pub fn from_name(name: &str) -> Result<Self> {
        let lowercase = name.trim().to_lowercase();
        match lowercase.as_str() {
            "wild" | "locomotive" | "any" | "gray" | "grey" | "unspecified" => Ok(TrainColor::Wild),
            _ => TrainColor::non_wild()
                .find(|color| color.to_string() == lowercase)
                .ok_or_else(|| Error::UnknownColor(name.to_owned())),
        }
    }
}

/// How a player pays for a track: `colored` cards of `color`, plus `wild` wild cards.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Payment {
    /// The non-wild color used, if any card of that color is spent.
    pub color: Option<TrainColor>,
    pub colored: u32,
    pub wild: u32,
}

impl Payment {
    /// Total number of cards spent.
    #[inline]
    pub fn total(&self) -> u32 {
        self.colored + self.wild
    }

    /// Expands the payment into the individual cards, e.g. to hand them back to the dealer.
    pub fn cards(&self) -> Vec<TrainColor> {
        let mut cards = Vec::with_capacity(self.total() as usize);
        if let Some(color) = self.color {
            cards.extend(std::iter::repeat(color).take(self.colored as usize));
        }
        cards.extend(std::iter::repeat(TrainColor::Wild).take(self.wild as usize));
        cards
    }
}

impl fmt::Display for Payment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.color, self.wild) {
            (Some(color), 0) => write!(f, "{} {} cards", self.colored, color),
            (Some(color), wild) => {
                write!(f, "{} wild cards and {} {} cards", wild, self.colored, color)
            }
            (None, wild) => write!(f, "{} wild cards", wild),
        }
    }
}

/// Maps how many of each train color a player holds.
///
/// Every color, wild included, always has a count.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Hand {
    counts: [u32; TrainColor::COUNT],
}

impl Hand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a hand out of individual cards.
    pub fn from_cards(cards: impl IntoIterator<Item = TrainColor>) -> Self {
        let mut hand = Self::new();
        for card in cards {
            hand.add(card);
        }
        hand
    }

    #[inline]
    pub fn add(&mut self, color: TrainColor) {
        self.counts[color as usize] += 1;
    }

    #[inline]
    pub fn count(&self, color: TrainColor) -> u32 {
        self.counts[color as usize]
    }

    /// Total number of cards in the hand.
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Iterates over every color along with how many cards of it are held.
    pub fn iter(&self) -> impl Iterator<Item = (TrainColor, u32)> + '_ {
        TrainColor::iter().map(move |color| (color, self.count(color)))
    }

    /// The single non-wild color the player holds the most of.
    ///
    /// Ties are broken by declaration order. Returns `None` if the hand has no non-wild card.
    ///
    /// # Example
    /// ```
    /// use conductor::card::{Hand, TrainColor};
    ///
    /// let hand = Hand::from_cards([TrainColor::Red, TrainColor::Wild, TrainColor::Red, TrainColor::Blue]);
    /// assert_eq!(hand.most_held_color(), Some(TrainColor::Red));
    /// assert_eq!(Hand::new().most_held_color(), None);
    /// ```
    pub fn most_held_color(&self) -> Option<TrainColor> {
        let mut most_held = None;
        let mut most_held_count = 0;
        for color in TrainColor::non_wild() {
            let count = self.count(color);
            if count > most_held_count {
                most_held = Some(color);
                most_held_count = count;
            }
        }
        most_held
    }

    /// The cheapest way to pay for a track of the given `length`, `ferries` and color, using cards of `color`.
    ///
    /// The `ferries` wild cards are consumed first; they count towards the length. The rest of the
    /// length is covered with `color` cards, and wild cards only cover whatever is still missing.
    /// Paying with `color` set to [`TrainColor::Wild`] means paying with wild cards only.
    ///
    /// Returns `None` if the hand cannot afford it.
    ///
    /// # Example
    /// ```
    /// use conductor::card::{Hand, Payment, TrainColor};
    ///
    /// let hand = Hand::from_cards([TrainColor::Wild, TrainColor::Wild, TrainColor::Red]);
    /// assert_eq!(
    ///     hand.payment(3, 1, TrainColor::Red),
    ///     Some(Payment { color: Some(TrainColor::Red), colored: 1, wild: 2 })
    /// );
    /// assert_eq!(hand.payment(3, 3, TrainColor::Red), None);
    /// ```
    pub fn payment(&self, length: u32, ferries: u32, color: TrainColor) -> Option<Payment> {
        let wild = self.count(TrainColor::Wild);
        if wild < ferries || ferries > length {
            return None;
        }

        let rest = length - ferries;
        let colored = if color.is_wild() {
            0
        } else {
            self.count(color).min(rest)
        };

        let wild_needed = ferries + (rest - colored);
        if wild_needed > wild {
            return None;
        }

        Some(Payment {
            color: if colored > 0 { Some(color) } else { None },
            colored,
            wild: wild_needed,
        })
    }

    /// Like [`Hand::payment`], but with an explicit number of wild cards to spend.
    ///
    /// Fails if the wild cards do not cover the ferries, exceed the length or the hand,
    /// or if the remaining `color` cards are missing.
    pub fn payment_with_wilds(
        &self,
        length: u32,
        ferries: u32,
        color: TrainColor,
        wild: u32,
    ) -> Option<Payment> {
        if wild < ferries || wild > length || wild > self.count(TrainColor::Wild) {
            return None;
        }

        let colored = length - wild;
        if colored == 0 {
            return Some(Payment {
                color: None,
                colored: 0,
                wild,
            });
        }

        if color.is_wild() || self.count(color) < colored {
            return None;
        }

        Some(Payment {
            color: Some(color),
            colored,
            wild,
        })
    }

    /// The default payment for a track: its own color, or the most held color for a gray track.
    pub fn default_payment(
        &self,
        length: u32,
        ferries: u32,
        track_color: TrainColor,
    ) -> Option<Payment> {
        let color = if track_color.is_wild() {
            self.most_held_color().unwrap_or(TrainColor::Wild)
        } else {
            track_color
        };
        self.payment(length, ferries, color)
    }

    /// Whether a track of the given shape can be paid for at all.
    #[inline]
    pub fn can_afford(&self, length: u32, ferries: u32, track_color: TrainColor) -> bool {
        self.default_payment(length, ferries, track_color).is_some()
    }

    /// Removes the cards of the payment from the hand.
    ///
    /// Fails without mutating anything if the hand does not hold them.
    pub fn spend(&mut self, payment: &Payment) -> Result<()> {
        let wild = self.count(TrainColor::Wild);
        let colored = payment.color.map_or(0, |color| self.count(color));
        if wild < payment.wild || colored < payment.colored {
            return Err(Error::InsufficientCards(payment.to_string()));
        }

        self.counts[TrainColor::Wild as usize] -= payment.wild;
        if let Some(color) = payment.color {
            self.counts[color as usize] -= payment.colored;
        }
        Ok(())
    }
}
