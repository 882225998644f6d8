//! Identifiers and roster records shared by every gavel component

use std::fmt;

use serde::{Deserialize, Serialize};

/// Bid and budget amounts (whole currency units)
pub type Amount = u64;

macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Raw numeric value
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

snowflake!(
    /// A chat member. Players and captains are both members.
    UserId
);
snowflake!(
    /// A text channel
    ChannelId
);
snowflake!(
    /// A role that can be granted to members
    RoleId
);
snowflake!(
    /// A single chat message
    MessageId
);

/// A team competing in the auction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub shorthandle: String,
    /// Remaining budget
    pub budget: Amount,
    /// Member who created the team
    pub captain: UserId,
    /// Role granted to every player bought by this team
    pub team_role: Option<RoleId>,
    /// Role that lets a member bid on behalf of this team
    pub captain_role: Option<RoleId>,
}

impl Team {
    /// Create a team with no budget and no roles yet
    pub fn new(name: impl Into<String>, shorthandle: impl Into<String>, captain: UserId) -> Self {
        Self {
            name: name.into(),
            shorthandle: shorthandle.into(),
            budget: 0,
            captain,
            team_role: None,
            captain_role: None,
        }
    }

    #[must_use]
    pub fn with_budget(mut self, budget: Amount) -> Self {
        self.budget = budget;
        self
    }

    #[must_use]
    pub fn with_roles(mut self, team_role: RoleId, captain_role: RoleId) -> Self {
        self.team_role = Some(team_role);
        self.captain_role = Some(captain_role);
        self
    }

    /// Whether `member` (holding `roles`) may bid for this team
    pub fn is_captained_by(&self, member: UserId, roles: &[RoleId]) -> bool {
        self.captain == member || self.captain_role.is_some_and(|role| roles.contains(&role))
    }
}

/// Where a player currently sits in the auction pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerStatus {
    /// In the pool, eligible for bidding
    Unsold,
    /// Bought by (or captaining) a team
    Assigned(String),
    /// Nobody bid; withdrawn from further bidding
    Skipped,
}

/// An enrolled player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: UserId,
    pub status: PlayerStatus,
}

/// Format an amount with thousands separators (`15000000` -> `15,000,000`)
pub fn format_amount(amount: Amount) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
