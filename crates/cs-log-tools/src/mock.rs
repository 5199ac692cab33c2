//! Mock log source for testing: serves pre-loaded log content.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::{LogError, LogResult};
use crate::source::LogSource;

pub const SYSLOG_PATH: &str = "/var/log/syslog";
pub const AUTH_PATH: &str = "/var/log/auth.log";
pub const ACCESS_PATH: &str = "/var/log/nginx/access.log";
pub const JSON_PATH: &str = "/var/log/suricata/eve.json";
pub const WINDOWS_PATH: &str = "/var/log/security.xml";
pub const MIXED_PATH: &str = "/var/log/mixed.log";

const SYSLOG_LINES: &[&str] = &[
    "Jan 12 11:33:22 web01 systemd[1]: Started Daily apt upgrade and clean activities.",
    "Jan 12 11:34:01 web01 CRON[2211]: (root) CMD (run-parts /etc/cron.hourly)",
    "Jan 12 11:35:10 web01 kernel: [UFW BLOCK] IN=eth0 SRC=185.220.101.4 DST=10.0.0.2",
    "Jan 12 11:36:45 db01 postgres[731]: checkpoint complete",
];

const AUTH_LINES: &[&str] = &[
    "Jan 12 11:40:01 web01 sshd[1234]: Failed password for root from 192.168.1.50 port 22 ssh2",
    "Jan 12 11:40:05 web01 sshd[1234]: Failed password for invalid user admin from 192.168.1.50 port 22 ssh2",
    "Jan 12 11:40:09 web01 sshd[1234]: Failed password for root from 203.0.113.9 port 22 ssh2",
    "Jan 12 11:41:00 web01 sshd[1240]: Accepted publickey for deploy from 10.1.1.4 port 51234 ssh2",
    "Jan 12 11:42:13 web01 sudo: deploy : TTY=pts/0 ; PWD=/srv ; USER=root ; COMMAND=/usr/bin/systemctl restart nginx",
];

const ACCESS_LINES: &[&str] = &[
    r#"192.168.1.1 - - [13/Feb/2025:11:22:33 +0000] "GET /api/users HTTP/1.1" 200 1234"#,
    r#"192.168.1.1 - - [13/Feb/2025:11:22:40 +0000] "GET /admin HTTP/1.1" 403 87"#,
    r#"10.0.0.5 - alice [13/Feb/2025:11:23:02 +0000] "POST /login HTTP/1.1" 302 - "https://example.com/" "Mozilla/5.0""#,
    r#"203.0.113.9 - - [13/Feb/2025:11:24:10 +0000] "GET /wp-login.php HTTP/1.1" 404 162"#,
    r#"192.168.1.1 - - [13/Feb/2025:12:01:00 +0000] "GET /api/users/7 HTTP/1.1" 200 512"#,
];

const JSON_LINES: &[&str] = &[
    r#"{"timestamp":"2025-02-13T11:30:00Z","event":"port_scan","src_ip":"185.220.101.4","severity":"high"}"#,
    r#"{"@timestamp":"2025-02-13T11:31:00.000Z","alert":{"signature":"ET SCAN Nmap Scripting Engine"},"source_ip":"185.220.101.4"}"#,
    r#"{"time":1739446260,"msg":"heartbeat","host":"edge1"}"#,
];

const WINDOWS_LINES: &[&str] = &[
    concat!(
        r#"<Event xmlns="http://schemas.microsoft.com/win/2004/08/events/event"><System>"#,
        r#"<Provider Name="Microsoft-Windows-Security-Auditing"/><EventID>4625</EventID>"#,
        r#"<TimeCreated SystemTime="2025-02-13T11:35:00.000Z"/><Computer>DC01</Computer></System>"#,
        r#"<EventData><Data Name="TargetUserName">administrator</Data>"#,
        r#"<Data Name="IpAddress">203.0.113.9</Data></EventData></Event>"#,
    ),
    concat!(
        r#"<Event xmlns="http://schemas.microsoft.com/win/2004/08/events/event"><System>"#,
        r#"<Provider Name="Microsoft-Windows-Security-Auditing"/><EventID>4624</EventID>"#,
        r#"<TimeCreated SystemTime="2025-02-13T11:36:00.000Z"/><Computer>DC01</Computer></System>"#,
        r#"<EventData><Data Name="TargetUserName">svc_backup</Data>"#,
        r#"<Data Name="IpAddress">-</Data></EventData></Event>"#,
    ),
];

const MIXED_LINES: &[&str] = &[
    "Jan 12 11:33:22 web01 systemd[1]: Started Daily apt upgrade and clean activities.",
    "Jan 12 11:40:01 web01 sshd[1234]: Failed password for root from 192.168.1.50 port 22 ssh2",
    "",
    r#"192.168.1.1 - - [13/Feb/2025:11:22:33 +0000] "GET /api/users HTTP/1.1" 200 1234"#,
    r#"{"timestamp":"2025-02-13T11:30:00Z","event":"port_scan","src_ip":"185.220.101.4"}"#,
    r#"<Event><System><EventID>4625</EventID><TimeCreated SystemTime="2025-02-13T11:35:00Z"/></System></Event>"#,
    "2025-02-13T11:40:00Z fw01 filterlog[88]: block in on em0 from 198.51.100.23",
    "   ",
    "unstructured note mentioning 8.8.8.8",
];

fn owned(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|l| (*l).to_string()).collect()
}

/// A mock log source that serves pre-loaded content by path.
pub struct MockLogSource {
    files: HashMap<String, Vec<String>>,
}

impl MockLogSource {
    pub fn new() -> Self {
        Self {
            files: HashMap::new(),
        }
    }

    /// Add a file with the given lines.
    pub fn add_file(&mut self, path: impl Into<String>, lines: Vec<String>) {
        self.files.insert(path.into(), lines);
    }

    /// Classic syslog: 4 lines, no auth events.
    pub fn with_syslog_sample() -> Self {
        Self::single(SYSLOG_PATH, SYSLOG_LINES)
    }

    /// sshd and sudo lines: 3 failures, 1 success, 1 sudo.
    pub fn with_auth_sample() -> Self {
        Self::single(AUTH_PATH, AUTH_LINES)
    }

    /// nginx combined log: 5 requests.
    pub fn with_access_sample() -> Self {
        Self::single(ACCESS_PATH, ACCESS_LINES)
    }

    /// Suricata-style JSON events: 3 lines.
    pub fn with_json_sample() -> Self {
        Self::single(JSON_PATH, JSON_LINES)
    }

    /// Windows security events: one failed and one successful logon.
    pub fn with_windows_sample() -> Self {
        Self::single(WINDOWS_PATH, WINDOWS_LINES)
    }

    /// One file mixing every format, plus blank lines and one generic line.
    pub fn with_mixed_sample() -> Self {
        Self::single(MIXED_PATH, MIXED_LINES)
    }

    /// Every sample above in one source.
    pub fn with_all_samples() -> Self {
        let mut m = Self::new();
        for (path, lines) in [
            (SYSLOG_PATH, SYSLOG_LINES),
            (AUTH_PATH, AUTH_LINES),
            (ACCESS_PATH, ACCESS_LINES),
            (JSON_PATH, JSON_LINES),
            (WINDOWS_PATH, WINDOWS_LINES),
            (MIXED_PATH, MIXED_LINES),
        ] {
            m.add_file(path, owned(lines));
        }
        m
    }

    fn single(path: &str, lines: &[&str]) -> Self {
        let mut m = Self::new();
        m.add_file(path, owned(lines));
        m
    }
}

impl Default for MockLogSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LogSource for MockLogSource {
    async fn read_lines(&self, path: &str) -> LogResult<Vec<String>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| LogError::NotFound(path.to_string()))
    }

    async fn exists(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }
}
