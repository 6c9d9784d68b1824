use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Represents the backend deployments the dashboard can talk to.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Environment {
    /// Backend running on the developer's machine.
    #[default]
    Local,
    /// Any other deployment, identified by its base URL.
    Remote(String),
}

impl Environment {
    /// Returns the backend base URL associated with the environment.
    pub fn base_url(&self) -> String {
        match self {
            Environment::Local => "http://localhost:5000".to_string(),
            Environment::Remote(url) => url.trim_end_matches('/').to_string(),
        }
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            lower if lower.starts_with("http://") || lower.starts_with("https://") => {
                Ok(Environment::Remote(trimmed.trim_end_matches('/').to_string()))
            }
            _ => Err(()),
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Local => write!(f, "Local"),
            Environment::Remote(_) => write!(f, "Remote"),
        }
    }
}

impl Debug for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Environment::{}, URL: {}", self, self.base_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_local_and_urls() {
        assert_eq!("LOCAL".parse::<Environment>(), Ok(Environment::Local));
        assert_eq!(
            "https://tips.example.org/".parse::<Environment>(),
            Ok(Environment::Remote("https://tips.example.org".to_string()))
        );
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn base_url_has_no_trailing_slash() {
        let env = Environment::Remote("http://127.0.0.1:8080//".to_string());
        assert_eq!(env.base_url(), "http://127.0.0.1:8080");
        assert_eq!(Environment::default().base_url(), "http://localhost:5000");
    }
}
