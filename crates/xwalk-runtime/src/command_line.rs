//! Command-line seeding from a packaged text file.
//!
//! Applications may ship a plain UTF-8 file with extra engine switches.
//! Reading it can fail for any number of packaging reasons; that is
//! never fatal. A missing or unreadable file simply means no extra
//! arguments.

use std::io::Read;

use tracing::debug;
use xwalk_host::HostContext;

/// Name of the packaged command-line file.
pub const COMMAND_LINE_FILE: &str = "xwalk-command-line";

/// Read and tokenize the packaged command-line file.
///
/// Any failure (missing asset, read error, invalid UTF-8) yields an
/// empty argument list.
pub fn read_command_line(host: &dyn HostContext) -> Vec<String> {
    let mut text = String::new();
    match host.assets().open(COMMAND_LINE_FILE) {
        Ok(mut reader) => {
            if let Err(err) = reader.read_to_string(&mut text) {
                debug!("cannot read {COMMAND_LINE_FILE}: {err}");
                return Vec::new();
            }
        }
        Err(err) => {
            debug!("no {COMMAND_LINE_FILE} asset: {err}");
            return Vec::new();
        }
    }
    tokenize(&text)
}

/// Split a command line into arguments with shell-style quoting.
///
/// Whitespace separates arguments. Single quotes preserve their
/// contents verbatim; double quotes allow backslash escapes; outside
/// quotes a backslash escapes the next character.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_token {
                    args.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            '\'' => {
                in_token = true;
                for q in chars.by_ref() {
                    if q == '\'' {
                        break;
                    }
                    current.push(q);
                }
            }
            '"' => {
                in_token = true;
                while let Some(q) = chars.next() {
                    match q {
                        '"' => break,
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                current.push(escaped);
                            }
                        }
                        _ => current.push(q),
                    }
                }
            }
            '\\' => {
                in_token = true;
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            _ => {
                in_token = true;
                current.push(c);
            }
        }
    }
    if in_token {
        args.push(current);
    }
    args
}
