use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::{env, fs};

const LOCALES_DIR: &str = "locales";
const DEFAULT_LOCALE: &str = "en-US";

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed={LOCALES_DIR}");

    let mut locales = BTreeMap::new();
    for entry in fs::read_dir(LOCALES_DIR)? {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
            continue;
        }
        println!("cargo:rerun-if-changed={}", path.display());
        let Some(locale) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        locales.insert(locale.to_string(), read_messages(&path)?);
    }

    if !locales.contains_key(DEFAULT_LOCALE) {
        return Err(format!("missing {LOCALES_DIR}/{DEFAULT_LOCALE}.toml").into());
    }

    let mut out = String::new();
    writeln!(out, "pub const DEFAULT_LOCALE: &str = {DEFAULT_LOCALE:?};")?;
    writeln!(out, "pub static LOCALES: &[(&str, &[(&str, &str)])] = &[")?;
    for (locale, messages) in &locales {
        writeln!(out, "    ({locale:?}, &[")?;
        for (key, value) in messages {
            writeln!(out, "        ({key:?}, {value:?}),")?;
        }
        writeln!(out, "    ]),")?;
    }
    writeln!(out, "];")?;

    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    fs::write(out_dir.join("signin_i18n_generated.rs"), out)?;
    Ok(())
}

fn read_messages(path: &Path) -> Result<BTreeMap<String, String>, Box<dyn Error>> {
    let raw = fs::read_to_string(path)?;
    let table: toml::Table = toml::from_str(&raw)?;
    let mut messages = BTreeMap::new();
    flatten("", &table, &mut messages, path)?;
    Ok(messages)
}

/// `[sign_in.email] invalid = ".."` becomes `sign_in.email.invalid`.
fn flatten(
    prefix: &str,
    table: &toml::Table,
    messages: &mut BTreeMap<String, String>,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    for (key, value) in table {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            toml::Value::String(text) => {
                messages.insert(full_key, text.clone());
            }
            toml::Value::Table(nested) => flatten(&full_key, nested, messages, path)?,
            _ => {
                return Err(format!(
                    "{}: `{full_key}` must be a string or a table",
                    path.display()
                )
                .into());
            }
        }
    }
    Ok(())
}
