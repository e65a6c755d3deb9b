//! Teacher/student role lookup.

use serde::{Deserialize, Serialize};

use crate::store::SelectQuery;
use crate::SessionContext;

/// Access role for the dashboard surfaces. Student is the default in every
/// doubtful case — an absent row, a failed lookup, nobody signed in —
/// because teacher access is the grant, never the fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Student,
}

#[derive(Debug, Deserialize)]
struct RoleRow {
    role: Role,
}

/// Look up the signed-in user's role in `user_roles`.
pub async fn fetch_role(ctx: &SessionContext) -> Role {
    let Some(user) = ctx.current_user() else {
        return Role::Student;
    };

    let query = SelectQuery::new().eq("user_id", user).limit(1);
    match ctx.remote.select("user_roles", query).await {
        Ok(rows) => rows
            .into_iter()
            .next()
            .and_then(|row| serde_json::from_value::<RoleRow>(row).ok())
            .map(|r| r.role)
            .unwrap_or(Role::Student),
        Err(e) => {
            tracing::warn!(error = %e, "Role lookup failed, defaulting to student");
            Role::Student
        }
    }
}
