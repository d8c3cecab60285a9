//! Shell command parsing

use app_core::{Intent, PARENT_NAME};

pub const HELP_TEXT: &str = r#"Commands:
  ls                  List the current directory again
  go <path>           Jump to a path, e.g. go mybucket/docs
  cd <name>           Enter a listed directory (cd .. goes up)
  up                  Go to the parent directory
  open <name>         Enter a directory or preview a file
  menu <name>         Show the actions available for an entry
  rename <name>       Rename an entry
  cp <name>           Copy an entry to another directory
  mv <name>           Move an entry to another directory
  rm <name>           Remove an entry
  upload              Upload a local directory here
  download <name>     Download an entry to a local directory
  pwd                 Print the current path
  help                Show this help
  quit                Exit

Append / to a name to pick the directory when a file shares it, e.g. rm docs/
"#;

/// One parsed line of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Dispatch `intent`, first selecting `target` when given
    Run {
        intent: Intent,
        target: Option<String>,
    },
    Menu(String),
    Pwd,
    Help,
    Quit,
    Empty,
}

impl ShellCommand {
    /// Parse a line. Everything after the command word is the argument, so
    /// names may contain spaces.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let arg = (!rest.is_empty()).then(|| rest.to_string());

        let on_entry = |intent: Intent| match &arg {
            Some(name) => Ok(ShellCommand::Run {
                intent,
                target: Some(name.clone()),
            }),
            None => Err(format!("Usage: {} <name>", word)),
        };
        let plain = |intent: Intent| ShellCommand::Run {
            intent,
            target: None,
        };

        match word {
            "" => Ok(ShellCommand::Empty),
            "ls" | "refresh" => Ok(plain(Intent::Refresh)),
            "go" => match &arg {
                Some(path) => Ok(plain(Intent::Go(path.clone()))),
                None => Err("Usage: go <path>".to_string()),
            },
            "up" => Ok(ShellCommand::Run {
                intent: Intent::Open,
                target: Some(PARENT_NAME.to_string()),
            }),
            "cd" | "open" => on_entry(Intent::Open),
            "rename" => on_entry(Intent::Rename),
            "cp" | "copy" => on_entry(Intent::Copy),
            "mv" | "move" => on_entry(Intent::Move),
            "rm" | "remove" => on_entry(Intent::Remove),
            "download" => on_entry(Intent::Download),
            "upload" => Ok(plain(Intent::Upload)),
            "menu" => match &arg {
                Some(name) => Ok(ShellCommand::Menu(name.clone())),
                None => Err("Usage: menu <name>".to_string()),
            },
            "pwd" => Ok(ShellCommand::Pwd),
            "help" | "?" => Ok(ShellCommand::Help),
            "quit" | "exit" | "q" => Ok(ShellCommand::Quit),
            other => Err(format!(
                "Unknown command: {}\nType help for available commands.",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(intent: Intent, target: Option<&str>) -> ShellCommand {
        ShellCommand::Run {
            intent,
            target: target.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_entry_commands() {
        assert_eq!(ShellCommand::parse("cp a.txt"), Ok(run(Intent::Copy, Some("a.txt"))));
        assert_eq!(ShellCommand::parse("  rm   old docs "), Ok(run(Intent::Remove, Some("old docs"))));
        assert_eq!(ShellCommand::parse("cd .."), Ok(run(Intent::Open, Some(".."))));
        assert_eq!(ShellCommand::parse("up"), Ok(run(Intent::Open, Some(".."))));
        assert_eq!(ShellCommand::parse("download img"), Ok(run(Intent::Download, Some("img"))));
    }

    #[test]
    fn test_parse_plain_commands() {
        assert_eq!(ShellCommand::parse(""), Ok(ShellCommand::Empty));
        assert_eq!(ShellCommand::parse("ls"), Ok(run(Intent::Refresh, None)));
        assert_eq!(ShellCommand::parse("upload"), Ok(run(Intent::Upload, None)));
        assert_eq!(
            ShellCommand::parse("go bucket/docs"),
            Ok(run(Intent::Go("bucket/docs".into()), None))
        );
        assert_eq!(ShellCommand::parse("menu a.txt"), Ok(ShellCommand::Menu("a.txt".into())));
        assert_eq!(ShellCommand::parse("exit"), Ok(ShellCommand::Quit));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(ShellCommand::parse("rename"), Err("Usage: rename <name>".to_string()));
        assert_eq!(ShellCommand::parse("go"), Err("Usage: go <path>".to_string()));
        assert!(ShellCommand::parse("frobnicate x").unwrap_err().starts_with("Unknown command"));
    }
}
