//! Authentication session state.

use crate::types::{AuthResponse, User};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.access_token.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthAction {
    /// A login or registration request went out.
    Start,
    Success(AuthResponse),
    Failure(String),
    Logout,
    ClearError,
    UserUpdated(User),
}

pub fn reduce(state: &AuthState, action: AuthAction) -> AuthState {
    match action {
        AuthAction::Start => AuthState {
            is_loading: true,
            error: None,
            ..state.clone()
        },
        AuthAction::Success(auth) => AuthState {
            user: Some(auth.user),
            access_token: Some(auth.tokens.access_token),
            refresh_token: Some(auth.tokens.refresh_token),
            is_loading: false,
            error: None,
        },
        AuthAction::Failure(error) => AuthState {
            user: None,
            access_token: None,
            refresh_token: None,
            is_loading: false,
            error: Some(error),
        },
        AuthAction::Logout => AuthState::default(),
        AuthAction::ClearError => AuthState {
            error: None,
            ..state.clone()
        },
        // Ignored while signed out; a stale profile fetch must not resurrect a session.
        AuthAction::UserUpdated(user) if state.access_token.is_some() => AuthState {
            user: Some(user),
            ..state.clone()
        },
        AuthAction::UserUpdated(_) => state.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Tokens;
    use uuid::Uuid;

    fn user(email: &str) -> User {
        serde_json::from_value(serde_json::json!({
            "id": Uuid::new_v4(),
            "email": email,
            "first_name": "Jane",
            "last_name": "Doe",
            "date_of_birth": null,
            "gender": null,
            "diabetes_type": null
        }))
        .unwrap()
    }

    fn signed_in() -> AuthState {
        reduce(
            &AuthState::default(),
            AuthAction::Success(AuthResponse {
                message: "Login successful".into(),
                user: user("jane@example.com"),
                tokens: Tokens {
                    access_token: "access".into(),
                    refresh_token: "refresh".into(),
                    token_type: "bearer".into(),
                    expires_in: 1800,
                },
            }),
        )
    }

    #[test]
    fn login_lifecycle() {
        let loading = reduce(&AuthState::default(), AuthAction::Start);
        assert!(loading.is_loading);
        assert!(!loading.is_authenticated());

        let state = signed_in();
        assert!(state.is_authenticated());
        assert_eq!(state.access_token.as_deref(), Some("access"));
        assert!(!state.is_loading);

        let state = reduce(&state, AuthAction::Logout);
        assert_eq!(state, AuthState::default());
    }

    #[test]
    fn failure_clears_session_and_keeps_message() {
        let state = reduce(&signed_in(), AuthAction::Failure("Invalid email or password".into()));
        assert!(!state.is_authenticated());
        assert_eq!(state.error.as_deref(), Some("Invalid email or password"));

        let state = reduce(&state, AuthAction::Start);
        assert_eq!(state.error, None);
        let state = reduce(&state, AuthAction::Failure("again".into()));
        assert_eq!(reduce(&state, AuthAction::ClearError).error, None);
    }

    #[test]
    fn user_update_requires_session() {
        let signed_out = reduce(&AuthState::default(), AuthAction::UserUpdated(user("x@example.com")));
        assert_eq!(signed_out, AuthState::default());

        let state = reduce(&signed_in(), AuthAction::UserUpdated(user("new@example.com")));
        assert_eq!(state.user.map(|u| u.email).as_deref(), Some("new@example.com"));
        assert!(state.access_token.is_some());
    }
}
