use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Student profile as returned by the login service.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub batch: u32,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub name: String,
    /// Quiz PIN; the quiz backend authenticates every call with it.
    #[serde(default)]
    pub pin: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub roll_number: String,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub semester: u32,
    pub username: String,
    #[serde(default)]
    pub year: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(flatten)]
    pub user: User,
}

/// Body of the ERP card `PATCH` used by the security settings.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action")]
pub enum CardAction<'a> {
    ChangePassword {
        card_unique_code: &'a str,
        current_password: &'a str,
        password: &'a str,
    },
    SetPin {
        card_unique_code: &'a str,
        pin: &'a str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_splits_token() {
        let json = r#"{"id": 9, "token": "t0k", "username": "2200320100001", "pin": "1234", "semester": 5}"#;
        let response: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.token, "t0k");
        assert_eq!(response.user.pin, "1234");
        assert_eq!(response.user.semester, 5);
    }

    #[test]
    fn test_card_action_is_tagged() {
        let body = serde_json::to_value(CardAction::SetPin {
            card_unique_code: "u1",
            pin: "4321",
        })
        .unwrap();
        assert_eq!(body["action"], "SetPin");
        assert_eq!(body["pin"], "4321");
    }
}
