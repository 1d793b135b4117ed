use houdini_escape::{CommandTable, HoudiniConfig, HoudiniError, Mode, transform};
use log::info;
use std::io::{self, Read, Write};
use std::path::Path;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

pub fn load_config(path: Option<&Path>) -> CliResult<HoudiniConfig> {
    let config = match path {
        Some(path) => HoudiniConfig::load(path)?,
        None => HoudiniConfig::discover(&std::env::current_dir()?)?,
    };
    Ok(config)
}

fn write_call<W: Write>(
    table: &CommandTable,
    name: &str,
    args: &[String],
    newline: bool,
    output: &mut W,
) -> CliResult<()> {
    let argv: Vec<&[u8]> = std::iter::once(name.as_bytes())
        .chain(args.iter().map(|arg| arg.as_bytes()))
        .collect();

    let result = table.invoke(&argv)?;
    output.write_all(&result)?;
    if newline {
        output.write_all(b"\n")?;
    }
    Ok(())
}

fn pipe_mode(table: &CommandTable, name: &str, secure_html: bool, unsecure: bool) -> CliResult<Mode> {
    let command = table
        .resolve(name)
        .ok_or_else(|| HoudiniError::UnknownCommand {
            name: name.to_string(),
        })?;

    match command.mode {
        Mode::EscapeHtml { .. } => Ok(Mode::EscapeHtml {
            secure: secure_html && !unsecure,
        }),
        _ if unsecure => Err(HoudiniError::InvalidUsage {
            message: format!("{} does not accept --unsecure", command.name),
        }
        .into()),
        mode => Ok(mode),
    }
}

fn write_pipe<R: Read, W: Write>(mode: Mode, input: &mut R, output: &mut W) -> CliResult<()> {
    let mut bytes = Vec::new();
    input.read_to_end(&mut bytes)?;

    let result = transform(mode, &bytes)?;
    info!(
        "{mode}: {} bytes in, {}",
        bytes.len(),
        if result.is_changed() { "changed" } else { "unchanged" }
    );

    output.write_all(&result.into_cow(&bytes))?;
    Ok(())
}

pub fn call(config: &HoudiniConfig, name: &str, args: &[String]) -> CliResult<()> {
    let table = config.command_table();
    let stdout = io::stdout();
    let mut output = stdout.lock();
    write_call(&table, name, args, config.newline, &mut output)?;
    output.flush()?;
    Ok(())
}

pub fn pipe(config: &HoudiniConfig, name: &str, unsecure: bool) -> CliResult<()> {
    let table = config.command_table();
    let mode = pipe_mode(&table, name, config.secure_html, unsecure)?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut output = stdout.lock();
    write_pipe(mode, &mut stdin.lock(), &mut output)?;
    output.flush()?;
    Ok(())
}

fn write_list<W: Write>(table: &CommandTable, json: bool, output: &mut W) -> CliResult<()> {
    if json {
        serde_json::to_writer_pretty(&mut *output, table.commands())?;
        writeln!(output)?;
        return Ok(());
    }

    for command in table.commands() {
        let options: String = command
            .options
            .iter()
            .map(|option| format!(" [{option}]"))
            .collect();
        writeln!(output, "{}{} string", command.name, options)?;
    }

    Ok(())
}

pub fn list(config: &HoudiniConfig, json: bool) -> CliResult<()> {
    let table = config.command_table();
    let stdout = io::stdout();
    let mut output = stdout.lock();
    write_list(&table, json, &mut output)?;
    output.flush()?;
    Ok(())
}
