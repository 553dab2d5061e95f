#[derive(Debug)]
pub enum TrackerError {
    TokenNotFound(String),
    ConfigNotFound(String),
    InvalidProject(String),
    Http(reqwest::Error),
    Api { status: u16, message: String },
    Parse(serde_json::Error),
    IoError(std::io::Error),
}

impl TrackerError {
    /// Network hiccups, throttling and server-side failures are worth another try
    pub fn is_retryable(&self) -> bool {
        match self {
            TrackerError::Http(err) => err.is_timeout() || err.is_connect() || err.is_request(),
            TrackerError::Api { status, .. } => *status == 429 || *status >= 500,
            TrackerError::IoError(_) => true,
            TrackerError::TokenNotFound(_)
            | TrackerError::ConfigNotFound(_)
            | TrackerError::InvalidProject(_)
            | TrackerError::Parse(_) => false,
        }
    }
}

impl From<reqwest::Error> for TrackerError {
    fn from(err: reqwest::Error) -> Self {
        TrackerError::Http(err)
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::Parse(err)
    }
}

impl From<std::io::Error> for TrackerError {
    fn from(err: std::io::Error) -> Self {
        TrackerError::IoError(err)
    }
}

impl std::fmt::Display for TrackerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackerError::TokenNotFound(msg) => {
                writeln!(f, "Tracker Authentication Error")?;
                writeln!(f, "───────────────────────────")?;
                write!(f, "🔑 {msg}\n\n")?;
                writeln!(f, "🔧 QUICK FIXES:")?;
                writeln!(f, "   → Set token directly: export JIRA_API_TOKEN=your_token")?;
                writeln!(f, "   → Set the account email: export JIRA_EMAIL=you@example.com")?;
                write!(f, "   → Or add [tracker] token = \"...\" to tracker-pulse.toml")
            }
            TrackerError::ConfigNotFound(msg) => {
                writeln!(f, "Tracker Configuration Error")?;
                writeln!(f, "──────────────────────────")?;
                write!(f, "📂 {msg}\n\n")?;
                writeln!(f, "🔧 QUICK FIXES:")?;
                writeln!(f, "   → Set the instance URL: export JIRA_BASE_URL=https://your-org.atlassian.net")?;
                write!(f, "   → Or add [tracker] base_url = \"...\" to tracker-pulse.toml")
            }
            TrackerError::InvalidProject(key) => {
                writeln!(f, "Invalid Project Key")?;
                writeln!(f, "───────────────────")?;
                write!(f, "📋 '{key}' is not a valid project key\n\n")?;
                write!(f, "🔧 Project keys are upper-case letters, digits and underscores, e.g. APP or WEB_2")
            }
            TrackerError::Http(err) => {
                writeln!(f, "Tracker Network Error")?;
                writeln!(f, "─────────────────────")?;
                write!(f, "🌐 {err}\n\n")?;
                writeln!(f, "🔧 TROUBLESHOOTING:")?;
                writeln!(f, "   → Check the base URL is reachable: curl -I $JIRA_BASE_URL")?;
                writeln!(f, "   → Check proxy settings (HTTPS_PROXY)")?;
                write!(f, "   → Retry the command; transient failures are retried 3 times")
            }
            TrackerError::Api { status, message } => {
                writeln!(f, "Tracker API Error")?;
                writeln!(f, "─────────────────")?;
                writeln!(f, "🌐 HTTP {status}: {message}")?;
                writeln!(f)?;
                match status {
                    401 => {
                        writeln!(f, "🔧 AUTHENTICATION FAILED:")?;
                        writeln!(f, "   → Token is invalid or expired")?;
                        write!(f, "   → Check JIRA_EMAIL matches the token's account")
                    }
                    403 => {
                        writeln!(f, "🔧 PERMISSION DENIED:")?;
                        write!(f, "   → The account cannot browse this project or board")
                    }
                    404 => {
                        writeln!(f, "🔧 RESOURCE NOT FOUND:")?;
                        write!(f, "   → Check the project key or board id")
                    }
                    429 => {
                        writeln!(f, "🔧 RATE LIMITED:")?;
                        write!(f, "   → Lower tracker.rate_limit.requests_per_second and retry later")
                    }
                    _ => {
                        writeln!(f, "🔧 TROUBLESHOOTING:")?;
                        write!(f, "   → Check the JQL query and the tracker's status page")
                    }
                }
            }
            TrackerError::Parse(err) => {
                writeln!(f, "Unexpected Tracker Response")?;
                writeln!(f, "───────────────────────────")?;
                write!(f, "🧩 {err}\n\n")?;
                write!(f, "🔧 The endpoint returned JSON in an unexpected shape; check the base URL points at the REST API host")
            }
            TrackerError::IoError(io_err) => {
                writeln!(f, "File System Error")?;
                writeln!(f, "─────────────────")?;
                write!(f, "📁 {io_err}\n\n")?;
                writeln!(f, "🔧 POSSIBLE CAUSES:")?;
                writeln!(f, "   → File permissions issue")?;
                write!(f, "   → Directory doesn't exist")
            }
        }
    }
}

impl std::error::Error for TrackerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrackerError::Http(err) => Some(err),
            TrackerError::Parse(err) => Some(err),
            TrackerError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        let throttled = TrackerError::Api {
            status: 429,
            message: "Too Many Requests".to_string(),
        };
        let server = TrackerError::Api {
            status: 503,
            message: "Unavailable".to_string(),
        };
        let missing = TrackerError::Api {
            status: 404,
            message: "Not Found".to_string(),
        };
        assert!(throttled.is_retryable());
        assert!(server.is_retryable());
        assert!(!missing.is_retryable());
        assert!(!TrackerError::TokenNotFound("missing".to_string()).is_retryable());
    }

    #[test]
    fn test_display_includes_fix_hints() {
        let err = TrackerError::Api {
            status: 401,
            message: "Unauthorized".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("HTTP 401: Unauthorized"));
        assert!(text.contains("AUTHENTICATION FAILED"));

        let text = TrackerError::InvalidProject("app".to_string()).to_string();
        assert!(text.contains("'app' is not a valid project key"));
    }
}
