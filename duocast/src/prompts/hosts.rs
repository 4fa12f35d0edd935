//! Host personas used by the script prompts.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ConfigError;
use crate::error::Result;

use super::builtin::DEFAULT_HOSTS;

/// Names and character profiles of the two hosts.
///
/// `speaker_a` and `speaker_b` are the names the model writes as speaker
/// labels in name-tagged scripts; they are also registered as parser aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostProfiles {
    /// Display name of speaker A.
    pub speaker_a: String,
    /// Display name of speaker B.
    pub speaker_b: String,
    /// Free-form character descriptions handed to the model.
    pub profile: String,
}

impl Default for HostProfiles {
    fn default() -> Self {
        Self {
            speaker_a: "Samuel".to_owned(),
            speaker_b: "Alex".to_owned(),
            profile: DEFAULT_HOSTS.to_owned(),
        }
    }
}

impl HostProfiles {
    /// Load profiles from a file.
    ///
    /// A `.toml` file must provide all three fields. Any other file is taken
    /// as the profile text, keeping the default speaker names.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is invalid.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        debug!(path = %path.display(), "loaded host profiles");

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            return toml::from_str(&content).map_err(|e| ConfigError::TomlParse(e).into());
        }

        Ok(Self {
            profile: content.trim().to_owned(),
            ..Self::default()
        })
    }

    /// Load from `path` when given, else the built-in pair.
    ///
    /// # Errors
    ///
    /// See [`HostProfiles::load`].
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path).await,
            None => Ok(Self::default()),
        }
    }

    /// Names recognised as speaker A and B in name-tagged transcripts.
    #[must_use]
    pub fn aliases(&self) -> (Vec<String>, Vec<String>) {
        (name_aliases(&self.speaker_a), name_aliases(&self.speaker_b))
    }
}

fn name_aliases(name: &str) -> Vec<String> {
    let name = name.trim();
    let mut aliases = vec![name.to_owned()];
    if let Some(first) = name.split_whitespace().next() {
        if first != name {
            aliases.push(first.to_owned());
        }
    }
    aliases.retain(|a| !a.is_empty());
    aliases
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn default_pair() {
        let hosts = HostProfiles::default();
        assert_eq!(hosts.speaker_a, "Samuel");
        assert!(hosts.profile.contains("Alex Morey"));
    }

    #[test]
    fn aliases_include_first_name() {
        let hosts = HostProfiles {
            speaker_a: "Samuel Eldredge".into(),
            speaker_b: "Alex".into(),
            profile: String::new(),
        };
        let (a, b) = hosts.aliases();
        assert_eq!(a, vec!["Samuel Eldredge".to_owned(), "Samuel".to_owned()]);
        assert_eq!(b, vec!["Alex".to_owned()]);
    }

    #[tokio::test]
    async fn plain_text_file_keeps_default_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts.txt");
        tokio::fs::write(&path, "  Two friendly librarians.\n").await.unwrap();

        let hosts = HostProfiles::load(&path).await.unwrap();
        assert_eq!(hosts.profile, "Two friendly librarians.");
        assert_eq!(hosts.speaker_b, "Alex");
    }

    #[tokio::test]
    async fn toml_file_sets_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts.toml");
        tokio::fs::write(
            &path,
            "speaker_a = \"Mia\"\nspeaker_b = \"Leo\"\nprofile = \"Mia is curious. Leo is skeptical.\"\n",
        )
        .await
        .unwrap();

        let hosts = HostProfiles::load(&path).await.unwrap();
        assert_eq!(hosts.speaker_a, "Mia");
        assert_eq!(hosts.speaker_b, "Leo");
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let err = HostProfiles::load(Path::new("/definitely/not/here.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }
}
