//! Core domain types shared by every engine component.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Server-assigned session identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Locally minted card identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub Uuid);

impl CardId {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CardId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Catalog product identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

impl ProductId {
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Two-component vector, used both for points and for offsets/velocities.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    #[must_use]
    pub fn sub(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }

    #[inline]
    #[must_use]
    pub fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }

    #[inline]
    #[must_use]
    pub fn scale(self, factor: f64) -> Vec2 {
        Vec2::new(self.x * factor, self.y * factor)
    }

    #[inline]
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Physical swipe direction on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Left,
    Right,
    Up,
    /// Reserved; the default UI never binds it.
    Down,
}

impl SwipeDirection {
    /// Unit vector pointing along this direction in screen coordinates
    /// (y grows downward).
    #[inline]
    #[must_use]
    pub fn unit(self) -> Vec2 {
        match self {
            SwipeDirection::Left => Vec2::new(-1.0, 0.0),
            SwipeDirection::Right => Vec2::new(1.0, 0.0),
            SwipeDirection::Up => Vec2::new(0.0, -1.0),
            SwipeDirection::Down => Vec2::new(0.0, 1.0),
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SwipeDirection::Left => "left",
            SwipeDirection::Right => "right",
            SwipeDirection::Up => "up",
            SwipeDirection::Down => "down",
        }
    }
}

impl std::fmt::Display for SwipeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discrete preference outcome of a gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Like,
    Dislike,
    Superlike,
    None,
}

impl Decision {
    #[inline]
    #[must_use]
    pub fn from_direction(direction: SwipeDirection) -> Self {
        match direction {
            SwipeDirection::Right => Decision::Like,
            SwipeDirection::Left => Decision::Dislike,
            SwipeDirection::Up => Decision::Superlike,
            SwipeDirection::Down => Decision::None,
        }
    }

    /// Superlikes count toward the like bucket.
    #[inline]
    #[must_use]
    pub fn is_positive(self) -> bool {
        matches!(self, Decision::Like | Decision::Superlike)
    }

    #[inline]
    #[must_use]
    pub fn is_none(self) -> bool {
        matches!(self, Decision::None)
    }
}

/// Kind of session requested from the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Onboarding,
    Discovery,
    CategoryExploration,
    GiftSelection,
}

impl Default for SessionType {
    fn default() -> Self {
        SessionType::Discovery
    }
}

/// Product reference as returned by the candidate catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: ProductId,
    pub title: String,
    pub category: Option<String>,
    pub price_cents: Option<u64>,
    pub image_url: Option<String>,
}

impl ProductRef {
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: ProductId::new(id),
            title: title.into(),
            category: None,
            price_cents: None,
            image_url: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_price_cents(mut self, price_cents: u64) -> Self {
        self.price_cents = Some(price_cents);
        self
    }
}

/// A candidate card in the swipe queue. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub product: ProductRef,
    pub queue_position: usize,
    pub visible: bool,
}

impl Card {
    #[inline]
    #[must_use]
    pub fn new(product: ProductRef, queue_position: usize) -> Self {
        Self {
            id: CardId::new(),
            product,
            queue_position,
            visible: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_mapping() {
        assert_eq!(Decision::from_direction(SwipeDirection::Right), Decision::Like);
        assert_eq!(Decision::from_direction(SwipeDirection::Left), Decision::Dislike);
        assert_eq!(Decision::from_direction(SwipeDirection::Up), Decision::Superlike);
        assert_eq!(Decision::from_direction(SwipeDirection::Down), Decision::None);
    }

    #[test]
    fn superlike_is_positive() {
        assert!(Decision::Superlike.is_positive());
        assert!(Decision::Like.is_positive());
        assert!(!Decision::Dislike.is_positive());
    }

    #[test]
    fn direction_serializes_lowercase() {
        let json = serde_json::to_string(&SwipeDirection::Right).unwrap();
        assert_eq!(json, "\"right\"");
        let json = serde_json::to_string(&SessionType::GiftSelection).unwrap();
        assert_eq!(json, "\"gift_selection\"");
    }

    #[test]
    fn card_ids_are_unique() {
        let product = ProductRef::new("p1", "Mug");
        let a = Card::new(product.clone(), 0);
        let b = Card::new(product, 1);
        assert_ne!(a.id, b.id);
    }
}
