use crate::error::Error;
use crate::odbc::options::OdbcConnectTarget;

pub(super) fn parse_target(s: &str) -> Result<OdbcConnectTarget, Error> {
    // Accept forms:
    // - "odbc:DSN=Name;..." -> strip scheme
    // - "odbc:Name" -> interpret as DSN
    // - "DSN=Name;..." or full ODBC connection string
    let mut t = s.trim();
    if let Some(rest) = t.strip_prefix("odbc:") {
        t = rest.trim();
    }

    if t.is_empty() {
        return Err(Error::Configuration(
            "empty ODBC connection string".into(),
        ));
    }

    if !t.contains('=') {
        return Ok(OdbcConnectTarget::DataSource {
            dsn: t.to_owned(),
            username: None,
            password: None,
        });
    }

    let mut dsn = None;
    let mut username = None;
    let mut password = None;

    for pair in split_attributes(t)? {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(Error::Configuration(
                format!("malformed ODBC connection string attribute: {pair:?}").into(),
            ));
        };
        let value = unquote(value.trim());
        match key.trim().to_ascii_uppercase().as_str() {
            "DSN" => dsn = Some(value),
            "UID" => username = Some(value),
            "PWD" => password = Some(value),
            // Drivers, servers and friends need SQLDriverConnect.
            _ => return Ok(OdbcConnectTarget::ConnectionString(t.to_owned())),
        }
    }

    match dsn {
        Some(dsn) if !dsn.is_empty() => Ok(OdbcConnectTarget::DataSource {
            dsn,
            username,
            password,
        }),
        _ => Ok(OdbcConnectTarget::ConnectionString(t.to_owned())),
    }
}

/// Splits a connection string into its `key=value` attributes. A `;` inside
/// a `{...}` value does not end the attribute; `}}` inside braces stands for
/// a literal `}`.
fn split_attributes(s: &str) -> Result<Vec<&str>, Error> {
    let mut attributes = Vec::new();
    let mut start = 0;
    let mut in_braces = false;
    let mut chars = s.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '{' if !in_braces => in_braces = true,
            '}' if in_braces => {
                if chars.next_if(|&(_, next)| next == '}').is_none() {
                    in_braces = false;
                }
            }
            ';' if !in_braces => {
                attributes.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    if in_braces {
        return Err(Error::Configuration(
            "unterminated '{' in ODBC connection string".into(),
        ));
    }
    attributes.push(&s[start..]);

    Ok(attributes
        .into_iter()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .collect())
}

fn unquote(value: &str) -> String {
    match value.strip_prefix('{').and_then(|v| v.strip_suffix('}')) {
        Some(inner) => inner.replace("}}", "}"),
        None => value.to_owned(),
    }
}
