use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::route::{RouteId, UserId};

/// A user's upvote on a route; absence of a row means no vote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub user_id: UserId,
    pub route_id: RouteId,
    pub created_at: DateTime<Utc>,
}

/// Vote mutation requested by a user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteDirection {
    Up,
    Down,
}

impl From<bool> for VoteDirection {
    fn from(vote: bool) -> Self {
        if vote {
            VoteDirection::Up
        } else {
            VoteDirection::Down
        }
    }
}
