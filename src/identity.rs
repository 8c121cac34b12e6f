//! Who is building, and where.
//!
//! The user name is looked up the way most Unix tools do it: the login
//! environment variables first, then the OS account of the current process.
//! The host name comes straight from the OS.

use std::path::Path;

use crate::error::StatusError;

/// Environment variables consulted for the user name, in priority order.
const USER_VARS: &[&str] = &["LOGNAME", "USER", "LNAME", "USERNAME"];

/// The `<user>@<host>` half of the builder stamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user: String,
    pub host: String,
}

impl Identity {
    /// Look up the current user and host. Either one missing is fatal.
    pub fn detect() -> Result<Self, StatusError> {
        Self::new(current_user()?, hostname()?)
    }

    /// Validate and wrap an explicit user/host pair.
    pub fn new(user: impl Into<String>, host: impl Into<String>) -> Result<Self, StatusError> {
        let user = user.into();
        let host = host.into();
        check_component("user name", &user, '@')?;
        check_component("hostname", &host, ':')?;
        Ok(Self { user, host })
    }

    /// `<user>@<host>:<root>`, the `STABLE_BUILDER` value.
    pub fn builder(&self, root: &Path) -> Result<String, StatusError> {
        let root = root.to_str().ok_or_else(|| StatusError::Environment {
            what: "workspace root",
            reason: format!("{} is not valid UTF-8", root.display()),
        })?;
        if root.contains(['\n', '\r']) {
            return Err(StatusError::Environment {
                what: "workspace root",
                reason: "path contains a line break".into(),
            });
        }
        Ok(format!("{}@{}:{root}", self.user, self.host))
    }
}

/// The stamp is parsed as `user@host:path`, so the separators and line
/// breaks can't appear in the parts before the path.
fn check_component(what: &'static str, value: &str, separator: char) -> Result<(), StatusError> {
    let reason = if value.is_empty() {
        "empty".to_string()
    } else if value.contains(['\n', '\r']) {
        "contains a line break".to_string()
    } else if value.contains(separator) {
        format!("contains '{separator}'")
    } else {
        return Ok(());
    };
    Err(StatusError::Environment { what, reason })
}

/// Name of the user running the build.
pub fn current_user() -> Result<String, StatusError> {
    user_from(|key| std::env::var(key).ok())
}

fn user_from(lookup: impl Fn(&str) -> Option<String>) -> Result<String, StatusError> {
    USER_VARS
        .iter()
        .find_map(|&key| lookup(key).filter(|v| !v.is_empty()))
        .map_or_else(account_user, Ok)
}

fn account_user() -> Result<String, StatusError> {
    whoami::fallible::username().map_err(|e| StatusError::Environment {
        what: "user name",
        reason: e.to_string(),
    })
}

/// Host name of this machine.
pub fn hostname() -> Result<String, StatusError> {
    whoami::fallible::hostname().map_err(|e| StatusError::Environment {
        what: "hostname",
        reason: e.to_string(),
    })
}
