use std::borrow::Cow;

use log::debug;
use serde::Serialize;

use crate::error::{HoudiniError, Result};
use crate::mode::{Mode, transform};

pub const DEFAULT_NAMESPACE: &str = "Houdini";
pub const UNSECURE_FLAG: &str = "-unsecure";

#[derive(Debug, Clone, Serialize)]
pub struct Command {
    pub name: String,
    pub mode: Mode,
    pub options: &'static [&'static str],
}

impl Command {
    fn new(namespace: &str, mode: Mode) -> Self {
        let name = if namespace.is_empty() {
            mode.name().to_string()
        } else {
            format!("{namespace}::{}", mode.name())
        };
        let options: &'static [&'static str] = match mode {
            Mode::EscapeHtml { .. } => &[UNSECURE_FLAG],
            _ => &[],
        };
        Self {
            name,
            mode,
            options,
        }
    }

    pub fn usage(&self, invoked_as: &str) -> String {
        let options: String = self
            .options
            .iter()
            .map(|option| format!(" [{option}]"))
            .collect();
        format!("wrong # args: should be \"{invoked_as}{options} string\"")
    }

    fn parse_args<'a>(&self, argv: &[&'a [u8]]) -> Result<(Mode, &'a [u8])> {
        let invoked_as = String::from_utf8_lossy(argv.first().copied().unwrap_or_default());
        let usage_error = || HoudiniError::InvalidUsage {
            message: self.usage(&invoked_as),
        };

        match (self.mode, argv) {
            (Mode::EscapeHtml { .. }, [_, input]) => Ok((Mode::EscapeHtml { secure: true }, *input)),
            (Mode::EscapeHtml { .. }, [_, flag, input]) if *flag == UNSECURE_FLAG.as_bytes() => {
                Ok((Mode::EscapeHtml { secure: false }, *input))
            }
            (Mode::EscapeHtml { .. }, _) => Err(usage_error()),
            (mode, [_, input]) => Ok((mode, *input)),
            _ => Err(usage_error()),
        }
    }

    pub fn invoke<'a>(&self, argv: &[&'a [u8]]) -> Result<Cow<'a, [u8]>> {
        let (mode, input) = self.parse_args(argv)?;
        Ok(transform(mode, input)?.into_cow(input))
    }
}

#[derive(Debug, Clone)]
pub struct CommandTable {
    namespace: String,
    commands: Vec<Command>,
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl CommandTable {
    pub fn new(namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let commands: Vec<Command> = Mode::ALL
            .into_iter()
            .map(|mode| Command::new(&namespace, mode))
            .collect();

        debug!(
            "registered {} commands in namespace {:?}",
            commands.len(),
            namespace
        );

        Self {
            namespace,
            commands,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn resolve(&self, name: &str) -> Option<&Command> {
        let name = name.strip_prefix("::").unwrap_or(name);
        let bare = if self.namespace.is_empty() {
            name
        } else {
            name.strip_prefix(self.namespace.as_str())
                .and_then(|rest| rest.strip_prefix("::"))
                .unwrap_or(name)
        };

        self.commands
            .iter()
            .find(|command| command.mode.name() == bare)
    }

    pub fn invoke<'a>(&self, argv: &[&'a [u8]]) -> Result<Cow<'a, [u8]>> {
        let Some(first) = argv.first() else {
            return Err(HoudiniError::InvalidUsage {
                message: "wrong # args: should be \"command ?arg ...?\"".to_string(),
            });
        };

        let name = String::from_utf8_lossy(first);
        let command = self
            .resolve(&name)
            .ok_or_else(|| HoudiniError::UnknownCommand {
                name: name.to_string(),
            })?;

        debug!("invoking {} with {} args", command.name, argv.len() - 1);
        command.invoke(argv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoke(table: &CommandTable, argv: &[&str]) -> Result<String> {
        let argv: Vec<&[u8]> = argv.iter().map(|arg| arg.as_bytes()).collect();
        table
            .invoke(&argv)
            .map(|result| String::from_utf8(result.into_owned()).unwrap())
    }

    fn usage_message(result: Result<String>) -> String {
        match result {
            Err(HoudiniError::InvalidUsage { message }) => message,
            other => panic!("expected usage error, got {other:?}"),
        }
    }

    #[test]
    fn registers_every_operation_under_the_namespace() {
        let table = CommandTable::default();
        let names: Vec<&str> = table.commands().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Houdini::escape_html",
                "Houdini::unescape_html",
                "Houdini::escape_xml",
                "Houdini::escape_uri",
                "Houdini::escape_url",
                "Houdini::escape_href",
                "Houdini::unescape_uri",
                "Houdini::unescape_url",
                "Houdini::escape_js",
                "Houdini::unescape_js",
            ]
        );
    }

    #[test]
    fn resolves_qualified_bare_and_global_names() {
        let table = CommandTable::default();
        for name in ["Houdini::escape_js", "escape_js", "::Houdini::escape_js"] {
            assert_eq!(table.resolve(name).unwrap().mode, Mode::EscapeJs, "{name}");
        }
        assert!(table.resolve("Other::escape_js").is_none());
        assert!(table.resolve("escape_css").is_none());
    }

    #[test]
    fn empty_namespace_registers_bare_names() {
        let table = CommandTable::new("");
        assert_eq!(table.commands()[0].name, "escape_html");
        assert!(table.resolve("unescape_url").is_some());
    }

    #[test]
    fn escape_html_is_secure_by_default() {
        let table = CommandTable::default();
        assert_eq!(
            invoke(&table, &["Houdini::escape_html", "it's <b>"]).unwrap(),
            "it&#39;s &lt;b&gt;"
        );
    }

    #[test]
    fn escape_html_accepts_unsecure_flag() {
        let table = CommandTable::default();
        assert_eq!(
            invoke(&table, &["Houdini::escape_html", "-unsecure", "it's <b>"]).unwrap(),
            "it's &lt;b&gt;"
        );
    }

    #[test]
    fn escape_html_rejects_other_flags() {
        let table = CommandTable::default();
        let message = usage_message(invoke(&table, &["Houdini::escape_html", "-safe", "x"]));
        assert_eq!(
            message,
            "wrong # args: should be \"Houdini::escape_html [-unsecure] string\""
        );
    }

    #[test]
    fn escape_html_rejects_wrong_arg_counts() {
        let table = CommandTable::default();
        assert!(usage_message(invoke(&table, &["escape_html"])).contains("[-unsecure] string"));
        let message = usage_message(invoke(
            &table,
            &["escape_html", "-unsecure", "a", "b"],
        ));
        assert_eq!(
            message,
            "wrong # args: should be \"escape_html [-unsecure] string\""
        );
    }

    #[test]
    fn generic_commands_take_exactly_one_string() {
        let table = CommandTable::default();
        let message = usage_message(invoke(&table, &["Houdini::escape_uri"]));
        assert_eq!(
            message,
            "wrong # args: should be \"Houdini::escape_uri string\""
        );
        let message = usage_message(invoke(&table, &["Houdini::unescape_js", "a", "b"]));
        assert_eq!(
            message,
            "wrong # args: should be \"Houdini::unescape_js string\""
        );
    }

    #[test]
    fn unsecure_flag_is_not_accepted_elsewhere() {
        let table = CommandTable::default();
        assert!(invoke(&table, &["escape_xml", "-unsecure", "x"]).is_err());
    }

    #[test]
    fn unknown_command_is_reported() {
        let table = CommandTable::default();
        match invoke(&table, &["Houdini::escape_css", "x"]) {
            Err(HoudiniError::UnknownCommand { name }) => assert_eq!(name, "Houdini::escape_css"),
            other => panic!("expected unknown command, got {other:?}"),
        }
    }

    #[test]
    fn empty_argv_is_a_usage_error() {
        let table = CommandTable::default();
        assert!(matches!(
            table.invoke(&[] as &[&[u8]]),
            Err(HoudiniError::InvalidUsage { .. })
        ));
    }

    #[test]
    fn unchanged_result_borrows_the_input() {
        let table = CommandTable::default();
        let input = b"nothing_special".as_slice();
        let argv: [&[u8]; 2] = [b"Houdini::escape_uri", input];
        let result = table.invoke(&argv).unwrap();
        assert!(matches!(result, Cow::Borrowed(bytes) if bytes.as_ptr() == input.as_ptr()));
    }

    #[test]
    fn unsecure_html_without_changes_borrows_the_input() {
        let table = CommandTable::default();
        let input = b"it's".as_slice();
        let argv: [&[u8]; 3] = [b"Houdini::escape_html", b"-unsecure", input];
        let result = table.invoke(&argv).unwrap();
        assert!(matches!(result, Cow::Borrowed(bytes) if bytes.as_ptr() == input.as_ptr()));
    }

    #[test]
    fn changed_result_is_owned() {
        let table = CommandTable::default();
        let argv: [&[u8]; 2] = [b"escape_uri", b"nothing special"];
        let result = table.invoke(&argv).unwrap();
        assert!(matches!(result, Cow::Owned(_)));
        assert_eq!(&*result, b"nothing%20special");
    }

    #[test]
    fn invokes_every_command() {
        let table = CommandTable::default();
        let cases = [
            ("unescape_html", "&lt;p&gt;", "<p>"),
            ("escape_xml", "a<b", "a&lt;b"),
            ("escape_uri", "a b/c", "a%20b/c"),
            ("escape_url", "a b/c", "a%20b%2Fc"),
            ("escape_href", "/a?b=1&c='2'", "/a?b=1&amp;c=&#x27;2&#x27;"),
            ("unescape_uri", "a%20b", "a b"),
            ("unescape_url", "a%2Fb", "a/b"),
            ("escape_js", "say \"hi\"\n", "say \\\"hi\\\"\\n"),
            ("unescape_js", "\\u0041\\n", "A\n"),
        ];
        for (name, input, expected) in cases {
            assert_eq!(invoke(&table, &[name, input]).unwrap(), expected, "{name}");
        }
    }
}
