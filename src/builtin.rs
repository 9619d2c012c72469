//! Stock operation libraries shipped with the console.

use crate::command::{Arguments, Operation, Parameter, Signature};
use crate::error::RegistrationError;
use crate::parser::DEFAULT_LIBRARY;
use crate::registry::Registry;
use crate::value::{Decimal, TypeTag};
use anyhow::{Context, Result, bail};
use chrono::NaiveDateTime;
use regex::RegexBuilder;
use std::env;
use std::fs;

/// Registry holding every stock library: the default commands plus `Math` and `Clock`.
pub fn default_registry() -> Result<Registry, RegistrationError> {
    let mut builder = Registry::builder();
    builder
        .register(DEFAULT_LIBRARY, Echo)?
        .register(DEFAULT_LIBRARY, Pwd)?
        .register(DEFAULT_LIBRARY, Cat)?
        .register(DEFAULT_LIBRARY, Grep)?
        .register("Math", Add)?
        .register("Math", Divide)?
        .register("Math", Round)?
        .register("Clock", Weekday)?
        .register("Clock", Days)?;
    Ok(builder.build())
}

/// Largest output `echo` will build, in bytes.
const ECHO_MAX_BYTES: usize = 1 << 20;

/// Repeat `text` `times` times, joined by `separator`.
pub struct Echo;

impl Operation for Echo {
    fn signature(&self) -> Signature {
        Signature::new("echo")
            .param(Parameter::required("text", TypeTag::String))
            .param(Parameter::with_default("times", 1i32))
            .param(Parameter::with_default("separator", " "))
    }

    fn invoke(&self, args: &Arguments) -> Result<String> {
        let text: String = args.get(0)?;
        let times: i32 = args.get(1)?;
        let separator: String = args.get(2)?;
        let times = usize::try_from(times).context("echo: times must not be negative")?;

        let size = text
            .len()
            .checked_mul(times)
            .and_then(|n| n.checked_add(separator.len().checked_mul(times.saturating_sub(1))?));
        match size {
            Some(n) if n <= ECHO_MAX_BYTES => Ok(vec![text; times].join(&separator)),
            _ => bail!("echo: output would exceed {} bytes", ECHO_MAX_BYTES),
        }
    }
}

/// Print the current working directory.
pub struct Pwd;

impl Operation for Pwd {
    fn signature(&self) -> Signature {
        Signature::new("pwd")
    }

    fn invoke(&self, _args: &Arguments) -> Result<String> {
        let dir = env::current_dir().context("pwd: can't read current directory")?;
        Ok(dir.to_string_lossy().into_owned())
    }
}

/// Print a file.
pub struct Cat;

impl Operation for Cat {
    fn signature(&self) -> Signature {
        Signature::new("cat").param(Parameter::required("path", TypeTag::String))
    }

    fn invoke(&self, args: &Arguments) -> Result<String> {
        let path: String = args.get(0)?;
        fs::read_to_string(&path).with_context(|| format!("cat: {}", path))
    }
}

/// Print the lines of a file matching a regular expression.
pub struct Grep;

impl Operation for Grep {
    fn signature(&self) -> Signature {
        Signature::new("grep")
            .param(Parameter::required("pattern", TypeTag::String))
            .param(Parameter::required("path", TypeTag::String))
            .param(Parameter::with_default("ignoreCase", false))
    }

    fn invoke(&self, args: &Arguments) -> Result<String> {
        let pattern: String = args.get(0)?;
        let path: String = args.get(1)?;
        let ignore_case: bool = args.get(2)?;

        let re = RegexBuilder::new(&pattern)
            .case_insensitive(ignore_case)
            .build()
            .with_context(|| format!("grep: invalid regex pattern: {}", pattern))?;
        let content = fs::read_to_string(&path).with_context(|| format!("grep: {}", path))?;

        let matched: Vec<&str> = content.lines().filter(|line| re.is_match(line)).collect();
        Ok(matched.join("\n"))
    }
}

pub struct Add;

impl Operation for Add {
    fn signature(&self) -> Signature {
        Signature::new("add")
            .param(Parameter::required("a", TypeTag::Int64))
            .param(Parameter::required("b", TypeTag::Int64))
    }

    fn invoke(&self, args: &Arguments) -> Result<String> {
        let a: i64 = args.get(0)?;
        let b: i64 = args.get(1)?;
        match a.checked_add(b) {
            Some(sum) => Ok(sum.to_string()),
            None => bail!("add: {} + {} overflows Int64", a, b),
        }
    }
}

pub struct Divide;

impl Operation for Divide {
    fn signature(&self) -> Signature {
        Signature::new("divide")
            .param(Parameter::required("a", TypeTag::Double))
            .param(Parameter::required("b", TypeTag::Double))
    }

    fn invoke(&self, args: &Arguments) -> Result<String> {
        let a: f64 = args.get(0)?;
        let b: f64 = args.get(1)?;
        if b == 0.0 {
            bail!("divide: division by zero");
        }
        Ok((a / b).to_string())
    }
}

/// Round a decimal to `digits` fractional digits, halves away from zero.
pub struct Round;

impl Operation for Round {
    fn signature(&self) -> Signature {
        Signature::new("round")
            .param(Parameter::required("value", TypeTag::Decimal))
            .param(Parameter::with_default("digits", 0u8))
    }

    fn invoke(&self, args: &Arguments) -> Result<String> {
        let value: Decimal = args.get(0)?;
        let digits: u8 = args.get(1)?;
        Ok(value.round(u32::from(digits)).to_string())
    }
}

pub struct Weekday;

impl Operation for Weekday {
    fn signature(&self) -> Signature {
        Signature::new("weekday").param(Parameter::required("date", TypeTag::DateTime))
    }

    fn invoke(&self, args: &Arguments) -> Result<String> {
        let date: NaiveDateTime = args.get(0)?;
        Ok(date.format("%A").to_string())
    }
}

/// Whole days from `from` to `to`; negative when `to` is earlier.
pub struct Days;

impl Operation for Days {
    fn signature(&self) -> Signature {
        Signature::new("days")
            .param(Parameter::required("from", TypeTag::DateTime))
            .param(Parameter::required("to", TypeTag::DateTime))
    }

    fn invoke(&self, args: &Arguments) -> Result<String> {
        let from: NaiveDateTime = args.get(0)?;
        let to: NaiveDateTime = args.get(1)?;
        Ok((to - from).num_days().to_string())
    }
}
