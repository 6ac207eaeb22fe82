//! Floating "+energy" notifications.
//!
//! Purely observational: they drift upward and fade, and nothing in the
//! simulation reads them back.

use crate::math::{Fixed, Vec2Fixed};

/// A reward popup at the position where an enemy was reclaimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    /// Current position; rises over time.
    pub position: Vec2Fixed,
    /// Energy amount shown.
    pub amount: u32,
    /// Seconds left before it disappears.
    pub life: Fixed,
    /// Seconds it lived in total.
    pub max_life: Fixed,
}

impl Notification {
    /// Remaining life as a fraction (1.0 when fresh, 0.0 when expired).
    #[must_use]
    pub fn remaining_fraction(&self) -> f64 {
        if self.max_life <= Fixed::ZERO {
            return 0.0;
        }
        (self.life / self.max_life).to_num::<f64>().clamp(0.0, 1.0)
    }
}

/// The list of live notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationFeed {
    items: Vec<Notification>,
    lifetime: Fixed,
    rise_speed: Fixed,
}

impl NotificationFeed {
    /// Create an empty feed.
    #[must_use]
    pub fn new(lifetime: Fixed, rise_speed: Fixed) -> Self {
        Self {
            items: Vec::new(),
            lifetime,
            rise_speed,
        }
    }

    /// Add a notification.
    pub fn push(&mut self, position: Vec2Fixed, amount: u32) {
        self.items.push(Notification {
            position,
            amount,
            life: self.lifetime,
            max_life: self.lifetime,
        });
    }

    /// Age every notification by `dt`, drifting it upward and dropping the
    /// expired ones.
    pub fn advance(&mut self, dt: Fixed) {
        let rise = self.rise_speed.saturating_mul(dt);
        for item in &mut self.items {
            item.life -= dt;
            item.position.y = item.position.y.saturating_sub(rise);
        }
        self.items.retain(|item| item.life > Fixed::ZERO);
    }

    /// Live notifications, oldest first.
    #[must_use]
    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    /// Number of live notifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no live notifications.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
