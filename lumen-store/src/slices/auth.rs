//! Authenticated session

use crate::action::{Action, SliceKey};
use crate::models::Session;
use crate::resource::AsyncResource;
use crate::slice::{Slice, SliceActionOf};
use crate::store::RootState;
use std::sync::Arc;

pub struct AuthSlice;

#[derive(Debug, Clone, PartialEq)]
pub enum AuthLocal {
    /// Apply locally edited profile fields; `None` keeps the current value
    UpdateProfile {
        name: Option<String>,
        avatar_url: Option<String>,
        grade: Option<String>,
    },
}

impl Slice for AuthSlice {
    const KEY: SliceKey = SliceKey::Auth;
    type Data = Session;
    type Local = AuthLocal;

    fn reduce_local(data: &Session, action: &AuthLocal) -> Option<Session> {
        match action {
            AuthLocal::UpdateProfile {
                name,
                avatar_url,
                grade,
            } => {
                let mut next = data.clone();
                if let Some(name) = name {
                    next.user.name = name.clone();
                }
                if let Some(avatar_url) = avatar_url {
                    next.user.avatar_url = avatar_url.clone();
                }
                if let Some(grade) = grade {
                    next.user.grade = grade.clone();
                }
                Some(next)
            }
        }
    }

    fn wrap(action: SliceActionOf<Self>) -> Action {
        Action::Auth(action)
    }

    fn select(state: &RootState) -> &Arc<AsyncResource<Session>> {
        &state.auth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    #[test]
    fn test_update_profile_touches_only_given_fields() {
        let session = Session {
            user: User {
                id: "u1".into(),
                name: "Ada".into(),
                grade: "7".into(),
                ..Default::default()
            },
            token: "t".into(),
        };
        let next = AuthSlice::reduce_local(
            &session,
            &AuthLocal::UpdateProfile {
                name: Some("Ada L.".into()),
                avatar_url: None,
                grade: None,
            },
        )
        .unwrap();
        assert_eq!(next.user.name, "Ada L.");
        assert_eq!(next.user.grade, "7");
        assert_eq!(next.token, "t");
    }
}
