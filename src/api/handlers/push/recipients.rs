//! Who hears about a booking event, and in which voice.

use std::collections::HashSet;

/// Profile roles stored in `profiles.role`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Customer,
    Driver,
    Admin,
    Staff,
}

impl Role {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "customer" => Some(Self::Customer),
            "driver" => Some(Self::Driver),
            "admin" => Some(Self::Admin),
            "staff" => Some(Self::Staff),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Driver => "driver",
            Self::Admin => "admin",
            Self::Staff => "staff",
        }
    }

    /// Roles that follow every booking.
    #[must_use]
    pub fn is_administrative(self) -> bool {
        match self {
            Self::Admin | Self::Staff => true,
            Self::Customer | Self::Driver => false,
        }
    }
}

/// The relationship a recipient has to the booking; selects the message wording.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Audience {
    Customer,
    Admin,
    AssignedDriver,
    UnassignedDriver,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recipient {
    pub token: String,
    pub audience: Audience,
}

/// Recipients in resolution order, one entry per device token.
#[derive(Debug, Default)]
pub struct RecipientList {
    seen: HashSet<String>,
    recipients: Vec<Recipient>,
}

impl RecipientList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a token unless it is blank or already present; the first audience wins.
    pub fn add(&mut self, token: Option<&str>, audience: Audience) {
        let Some(token) = token.map(str::trim).filter(|token| !token.is_empty()) else {
            return;
        };
        if self.seen.insert(token.to_string()) {
            self.recipients.push(Recipient {
                token: token.to_string(),
                audience,
            });
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Recipient> {
        self.recipients
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_round_trip_and_reject_unknown() {
        for role in [Role::Customer, Role::Driver, Role::Admin, Role::Staff] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse(" Admin "), Some(Role::Admin));
        assert_eq!(Role::parse("superuser"), None);
    }

    #[test]
    fn only_admin_and_staff_are_administrative() {
        assert!(Role::Admin.is_administrative());
        assert!(Role::Staff.is_administrative());
        assert!(!Role::Customer.is_administrative());
        assert!(!Role::Driver.is_administrative());
    }

    #[test]
    fn duplicate_tokens_keep_first_audience() {
        let mut list = RecipientList::new();
        list.add(Some("ExponentPushToken[a]"), Audience::Customer);
        list.add(Some("ExponentPushToken[b]"), Audience::Admin);
        list.add(Some("ExponentPushToken[a]"), Audience::Admin);
        list.add(Some(" ExponentPushToken[b] "), Audience::AssignedDriver);

        assert_eq!(
            list.into_vec(),
            vec![
                Recipient {
                    token: "ExponentPushToken[a]".to_string(),
                    audience: Audience::Customer,
                },
                Recipient {
                    token: "ExponentPushToken[b]".to_string(),
                    audience: Audience::Admin,
                },
            ]
        );
    }

    #[test]
    fn blank_tokens_are_skipped() {
        let mut list = RecipientList::new();
        list.add(None, Audience::Customer);
        list.add(Some("  "), Audience::Admin);
        assert!(list.is_empty());
    }
}
