use std::collections::HashMap;

use crate::domain::policy::RemotePolicy;
use crate::domain::user::User;

/// The effective policies, keyed by department. Construction keeps the last
/// policy seen for a department, preserving the zero-or-one invariant.
#[derive(Clone, Debug, Default)]
pub struct PolicySet {
    by_department: HashMap<String, RemotePolicy>,
}

impl PolicySet {
    pub fn new(policies: Vec<RemotePolicy>) -> Self {
        let by_department =
            policies.into_iter().map(|policy| (normalize_key(&policy.department), policy)).collect();
        Self { by_department }
    }

    /// The policy for the user's department, or the fixed fallback when the
    /// department has none. Pure, infallible.
    pub fn resolve(&self, user: &User) -> RemotePolicy {
        self.by_department
            .get(&normalize_key(&user.department))
            .cloned()
            .unwrap_or_else(|| RemotePolicy::fallback(user.department.clone()))
    }
}

fn normalize_key(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use crate::domain::policy::RemotePolicy;
    use crate::domain::user::{Role, User, UserId};

    use super::PolicySet;

    fn user(department: &str) -> User {
        User {
            id: UserId("u-1".to_string()),
            role: Role::Employee,
            department: department.to_string(),
            manager_id: None,
        }
    }

    #[test]
    fn resolves_the_department_policy_when_one_exists() {
        let policies = PolicySet::new(vec![RemotePolicy {
            department: "Engineering".to_string(),
            weekly_limit: 3,
            monthly_limit: 10,
            cutoff_hours_before: 24,
            required_office_days: Vec::new(),
        }]);

        let resolved = policies.resolve(&user("engineering"));
        assert_eq!(resolved.weekly_limit, 3);
        assert_eq!(resolved.cutoff_hours_before, 24);
    }

    #[test]
    fn unknown_department_falls_back_to_the_fixed_default() {
        let resolved = PolicySet::default().resolve(&user("finance"));

        assert_eq!(resolved.weekly_limit, RemotePolicy::FALLBACK_WEEKLY_LIMIT);
        assert_eq!(resolved.monthly_limit, RemotePolicy::FALLBACK_MONTHLY_LIMIT);
        assert_eq!(resolved.cutoff_hours_before, RemotePolicy::FALLBACK_CUTOFF_HOURS);
        assert!(resolved.required_office_days.is_empty());
    }
}
