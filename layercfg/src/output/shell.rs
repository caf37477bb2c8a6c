//! Shell-specific environment assignments.

use std::env;
use std::str::FromStr;

use crate::Error;

/// Shells an export listing can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellType {
    /// Bourne Again Shell (bash) and plain `sh`.
    Bash,
    /// Z Shell (zsh).
    Zsh,
    /// Friendly Interactive Shell (fish).
    Fish,
    /// `PowerShell`.
    PowerShell,
}

impl ShellType {
    /// Guesses the current shell.
    ///
    /// `ZSH_VERSION`, `FISH_VERSION` and `PSModulePath` are checked first,
    /// then the `SHELL` path. Falls back to bash.
    #[must_use]
    pub fn detect() -> Self {
        if env::var_os("ZSH_VERSION").is_some() {
            return Self::Zsh;
        }
        if env::var_os("FISH_VERSION").is_some() {
            return Self::Fish;
        }
        if env::var_os("PSModulePath").is_some() {
            return Self::PowerShell;
        }
        match env::var("SHELL") {
            Ok(path) if path.contains("zsh") => Self::Zsh,
            Ok(path) if path.contains("fish") => Self::Fish,
            Ok(path) if path.contains("pwsh") || path.contains("powershell") => Self::PowerShell,
            _ => Self::Bash,
        }
    }

    /// Formats an assignment of `value` to the environment variable `var`.
    ///
    /// Values are single-quoted so commas, blanks and `$` survive.
    ///
    /// # Examples
    ///
    /// ```
    /// use layercfg::output::ShellType;
    ///
    /// assert_eq!(ShellType::Bash.format_export("SERVER_PORT", "7777"), "export SERVER_PORT='7777'");
    /// assert_eq!(ShellType::Fish.format_export("SERVER_PORT", "7777"), "set -gx SERVER_PORT '7777'");
    /// assert_eq!(ShellType::PowerShell.format_export("SERVER_PORT", "7777"), "$env:SERVER_PORT='7777'");
    /// ```
    #[must_use]
    pub fn format_export(self, var: &str, value: &str) -> String {
        match self {
            Self::Bash | Self::Zsh => {
                format!("export {var}='{}'", value.replace('\'', r"'\''"))
            }
            Self::Fish => format!(
                "set -gx {var} '{}'",
                value.replace('\\', r"\\").replace('\'', r"\'")
            ),
            Self::PowerShell => format!("$env:{var}='{}'", value.replace('\'', "''")),
        }
    }
}

impl FromStr for ShellType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bash" | "sh" => Ok(Self::Bash),
            "zsh" => Ok(Self::Zsh),
            "fish" => Ok(Self::Fish),
            "powershell" | "pwsh" | "ps" => Ok(Self::PowerShell),
            _ => Err(Error::Output {
                message: format!(
                    "unknown shell type '{s}': supported shells are bash, zsh, fish, powershell"
                ),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("bash".parse::<ShellType>().unwrap(), ShellType::Bash);
        assert_eq!("SH".parse::<ShellType>().unwrap(), ShellType::Bash);
        assert_eq!("Zsh".parse::<ShellType>().unwrap(), ShellType::Zsh);
        assert_eq!("fish".parse::<ShellType>().unwrap(), ShellType::Fish);
        assert_eq!("pwsh".parse::<ShellType>().unwrap(), ShellType::PowerShell);

        let err = "tcsh".parse::<ShellType>().unwrap_err();
        assert!(err.to_string().contains("unknown shell type 'tcsh'"));
    }

    #[test]
    fn test_quotes_are_escaped() {
        assert_eq!(
            ShellType::Bash.format_export("WORLD_MOTD", "it's on"),
            r"export WORLD_MOTD='it'\''s on'"
        );
        assert_eq!(
            ShellType::Fish.format_export("WORLD_MOTD", r"a\b'c"),
            r"set -gx WORLD_MOTD 'a\\b\'c'"
        );
        assert_eq!(
            ShellType::PowerShell.format_export("WORLD_MOTD", "it's"),
            "$env:WORLD_MOTD='it''s'"
        );
    }

    #[test]
    fn test_collection_literal_kept_whole() {
        assert_eq!(
            ShellType::Zsh.format_export("SERVER_MODES", "EASY,HARD"),
            "export SERVER_MODES='EASY,HARD'"
        );
    }
}
