use std::collections::HashSet;

use crate::handlers::commands::CommandHandler;
use crate::messages::Message;

/// Who may issue balance commands. Injected at construction time; there is
/// no ambient admin list anywhere in the crate.
#[derive(Debug, Clone, Default)]
pub struct AdminPolicy {
    admin_ids: HashSet<i64>,
}

impl AdminPolicy {
    pub fn new(admin_ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            admin_ids: admin_ids.into_iter().collect(),
        }
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }
}

/// A parsed `/add` or `/set` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminCommand {
    pub target: i64,
    pub amount: i64,
    /// `/set` overwrites the balance; `/add` shifts it.
    pub absolute: bool,
}

pub fn parse_admin_command(text: &str) -> Option<AdminCommand> {
    let mut parts = text.split_whitespace();

    let absolute = match parts.next()? {
        "/set" => true,
        "/add" => false,
        _ => return None,
    };
    let target = parts.next()?.parse().ok()?;
    let amount = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    Some(AdminCommand {
        target,
        amount,
        absolute,
    })
}

impl CommandHandler {
    /// `/add <user_id> <amount>` and `/set <user_id> <amount>`. Touches only
    /// existing accounts; a typo'd user id must not mint a row.
    pub async fn handle_admin(&self, caller_id: i64, text: &str) -> Message {
        if !self.admins.is_admin(caller_id) {
            return Message::AdminUnauthorized;
        }

        let Some(command) = parse_admin_command(text) else {
            return Message::AdminInvalidCommand;
        };

        match self
            .ledger
            .adjust_balance(command.target, command.amount, command.absolute)
            .await
        {
            Ok(Some(new_balance)) => Message::AdminCreditsUpdated {
                user_id: command.target,
                new_balance,
            },
            Ok(None) => Message::AdminUserNotFound {
                user_id: command.target,
            },
            Err(e) => {
                tracing::error!("Admin balance update for {} failed: {}", command.target, e);
                Message::TryAgain
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_add_and_set() {
        assert_eq!(
            parse_admin_command("/add 17 5"),
            Some(AdminCommand {
                target: 17,
                amount: 5,
                absolute: false
            })
        );
        assert_eq!(
            parse_admin_command("/set 17 0"),
            Some(AdminCommand {
                target: 17,
                amount: 0,
                absolute: true
            })
        );
    }

    #[test]
    fn rejects_malformed_commands() {
        assert_eq!(parse_admin_command("/add"), None);
        assert_eq!(parse_admin_command("/add 17"), None);
        assert_eq!(parse_admin_command("/add seventeen 5"), None);
        assert_eq!(parse_admin_command("/add 17 5 extra"), None);
        assert_eq!(parse_admin_command("/grant 17 5"), None);
    }

    #[test]
    fn policy_only_admits_listed_ids() {
        let policy = AdminPolicy::new([1, 2]);
        assert!(policy.is_admin(1));
        assert!(!policy.is_admin(3));
        assert!(!AdminPolicy::default().is_admin(1));
    }
}
