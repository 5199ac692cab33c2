//! Authentication event detection inside syslog-style lines.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use super::first_ipv4;

static RE_FOR_USER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bfor\s+(?:invalid user\s+)?(\S+)").unwrap());

static RE_USER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\buser(?:\s+|=)(\S+)").unwrap());

static RE_SUDO_USER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"sudo:\s+(\S+)").unwrap());

static RE_FROM_IP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"from\s+(\d{1,3}(?:\.\d{1,3}){3})").unwrap());

/// Kind of authentication event, stored in `Record::action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthAction {
    LoginSuccess,
    LoginFailure,
    Sudo,
    AuthEvent,
}

impl AuthAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoginSuccess => "login_success",
            Self::LoginFailure => "login_failure",
            Self::Sudo => "sudo",
            Self::AuthEvent => "auth_event",
        }
    }
}

impl std::fmt::Display for AuthAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an auth line revealed beyond its syslog header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthInfo {
    pub action: AuthAction,
    pub user: Option<String>,
    pub ip: Option<String>,
}

/// Classify the text after a syslog timestamp as an authentication event.
///
/// Returns `None` for lines that are not auth-related; they stay plain syslog.
pub fn classify(text: &str) -> Option<AuthInfo> {
    let lower = text.to_lowercase();

    let (action, user) = if text.contains("Accepted password") || text.contains("Accepted publickey")
    {
        (AuthAction::LoginSuccess, capture(&RE_FOR_USER, text))
    } else if text.contains("Failed password") || lower.contains("authentication failure") {
        let user = capture(&RE_FOR_USER, text).or_else(|| capture(&RE_USER, text));
        (AuthAction::LoginFailure, user)
    } else if text.contains("sudo:") {
        let user = capture(&RE_SUDO_USER, text).or_else(|| capture(&RE_USER, text));
        (AuthAction::Sudo, user)
    } else if lower.contains("authentication") {
        (AuthAction::AuthEvent, capture(&RE_USER, text))
    } else {
        return None;
    };

    let ip = capture(&RE_FROM_IP, text).or_else(|| first_ipv4(text));
    Some(AuthInfo { action, user, ip })
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text).map(|c| c[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_login() {
        let info = classify("web01 sshd[812]: Accepted publickey for deploy from 10.1.1.4 port 51234 ssh2")
            .unwrap();
        assert_eq!(info.action, AuthAction::LoginSuccess);
        assert_eq!(info.user.as_deref(), Some("deploy"));
        assert_eq!(info.ip.as_deref(), Some("10.1.1.4"));
    }

    #[test]
    fn failed_login_for_invalid_user() {
        let info = classify("web01 sshd[812]: Failed password for invalid user admin from 203.0.113.9 port 22 ssh2")
            .unwrap();
        assert_eq!(info.action, AuthAction::LoginFailure);
        assert_eq!(info.user.as_deref(), Some("admin"));
        assert_eq!(info.ip.as_deref(), Some("203.0.113.9"));
    }

    #[test]
    fn pam_authentication_failure_uses_user_key() {
        let info = classify(
            "web01 sshd[9]: pam_unix(sshd:auth): authentication failure; logname= uid=0 ruser= rhost=10.0.0.5  user=bob",
        )
        .unwrap();
        assert_eq!(info.action, AuthAction::LoginFailure);
        assert_eq!(info.user.as_deref(), Some("bob"));
        assert_eq!(info.ip.as_deref(), Some("10.0.0.5"));
    }

    #[test]
    fn sudo_takes_user_after_tag() {
        let info = classify("web01 sudo: alice : TTY=pts/0 ; PWD=/home/alice ; USER=root ; COMMAND=/bin/ls")
            .unwrap();
        assert_eq!(info.action, AuthAction::Sudo);
        assert_eq!(info.user.as_deref(), Some("alice"));
        assert!(info.ip.is_none());
    }

    #[test]
    fn generic_authentication_text() {
        let info = classify("web01 login[3]: Authentication token refreshed for user carol").unwrap();
        assert_eq!(info.action, AuthAction::AuthEvent);
        assert_eq!(info.user.as_deref(), Some("carol"));
    }

    #[test]
    fn unrelated_text_is_not_auth() {
        assert!(classify("web01 cron[42]: (root) CMD (run-parts /etc/cron.hourly)").is_none());
    }
}
