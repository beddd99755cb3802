//! Command-line surface: argv -> [`Config`], input reading, output rendering.

use crate::types::OperationDescriptor;
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_json::Value;
use std::ffi::OsString;
use std::io::{self, Read};
use std::path::PathBuf;

/// Where the JSON document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

/// Everything a run needs, parsed once from argv.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub input: Input,
    pub operations: Vec<OperationDescriptor>,
    pub debug: bool,
    pub compact: bool,
}

struct OperationFlag {
    name: &'static str,
    short: Option<char>,
    alias: Option<&'static str>,
    help: &'static str,
}

const OPERATION_FLAGS: &[OperationFlag] = &[
    OperationFlag { name: "count", short: None, alias: None, help: "Count elements, characters of a string" },
    OperationFlag { name: "countby", short: None, alias: None, help: "Count elements by expression result" },
    OperationFlag { name: "find", short: None, alias: None, help: "First element matching the expression" },
    OperationFlag { name: "findall", short: None, alias: None, help: "All elements matching the expression" },
    OperationFlag { name: "group", short: None, alias: Some("groupby"), help: "Group elements by expression result" },
    OperationFlag { name: "indexof", short: None, alias: None, help: "Index of the first matching element" },
    OperationFlag { name: "lastindexof", short: None, alias: None, help: "Index of the last matching element" },
    OperationFlag { name: "collect", short: None, alias: None, help: "Collect a property from every element" },
    OperationFlag { name: "min", short: None, alias: None, help: "Element with the smallest expression result" },
    OperationFlag { name: "max", short: None, alias: None, help: "Element with the largest expression result" },
    OperationFlag { name: "head", short: None, alias: None, help: "First N elements (default 5)" },
    OperationFlag { name: "tail", short: None, alias: None, help: "Last N elements (default 5)" },
    OperationFlag { name: "sortby", short: Some('s'), alias: None, help: "Sort by expression result" },
    OperationFlag { name: "sample", short: None, alias: None, help: "N random elements (default 2)" },
    OperationFlag { name: "transform", short: Some('t'), alias: None, help: "Rebuild every element, `out` accumulates" },
    OperationFlag { name: "prop", short: None, alias: None, help: "Value of a property" },
    OperationFlag { name: "keys", short: None, alias: None, help: "Keys of a mapping" },
    OperationFlag { name: "values", short: None, alias: None, help: "Values of a mapping" },
];

/// The clap command. Operation flags may repeat and are applied in the
/// order they appear.
pub fn command() -> Command {
    let mut cmd = Command::new("jsonop")
        .about("Apply a chain of operations to a JSON document")
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("PATH")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Read the document from PATH instead of stdin"),
        )
        .arg(
            Arg::new("compact")
                .short('c')
                .long("compact")
                .action(ArgAction::SetTrue)
                .help("Print the result on one line"),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .action(ArgAction::SetTrue)
                .help("Print the value after every step to stderr"),
        );
    for flag in OPERATION_FLAGS {
        let mut arg = Arg::new(flag.name)
            .long(flag.name)
            .value_name("EXPR")
            .num_args(0..=1)
            .default_missing_value("")
            .action(ArgAction::Append)
            .help(flag.help);
        if let Some(short) = flag.short {
            arg = arg.short(short);
        }
        if let Some(alias) = flag.alias {
            arg = arg.visible_alias(alias);
        }
        cmd = cmd.arg(arg);
    }
    cmd
}

impl Config {
    pub fn from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = command().try_get_matches_from(args)?;
        Ok(Self::from_matches(&matches))
    }

    pub fn from_matches(matches: &ArgMatches) -> Self {
        let mut occurrences: Vec<(usize, OperationDescriptor)> = Vec::new();
        for flag in OPERATION_FLAGS {
            let (Some(indices), Some(values)) = (
                matches.indices_of(flag.name),
                matches.get_many::<String>(flag.name),
            ) else {
                continue;
            };
            for (index, value) in indices.zip(values) {
                // A bare flag carries the empty default.
                let expression = (!value.is_empty()).then_some(value.as_str());
                occurrences.push((index, OperationDescriptor::new(flag.name, expression)));
            }
        }
        occurrences.sort_by_key(|(index, _)| *index);

        let input = match matches.get_one::<PathBuf>("file") {
            Some(path) => Input::File(path.clone()),
            None => Input::Stdin,
        };
        Config {
            input,
            operations: occurrences.into_iter().map(|(_, op)| op).collect(),
            debug: matches.get_flag("debug"),
            compact: matches.get_flag("compact"),
        }
    }

    /// Reads the whole document.
    pub fn read_input(&self) -> io::Result<String> {
        match &self.input {
            Input::Stdin => {
                let mut buf = String::new();
                io::stdin().read_to_string(&mut buf)?;
                Ok(buf)
            }
            Input::File(path) => std::fs::read_to_string(path),
        }
    }
}

/// Serializes the result, pretty-printed unless `compact`.
pub fn render(value: &Value, compact: bool) -> Result<String, serde_json::Error> {
    if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
}
