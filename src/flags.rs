use crate::error::ShellError;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct Flags {
    flags: BTreeMap<String, Flag>,
}

#[derive(Debug, Clone)]
pub struct Flag {
    pub short: String,
    pub long: String,
    pub description: String,
    pub takes_value: bool,
    pub value: Option<String>,
}

impl Default for Flags {
    fn default() -> Self {
        Self::new()
    }
}

impl Flags {
    pub fn new() -> Self {
        let mut flags = Flags {
            flags: BTreeMap::new(),
        };

        flags.add("help", "-h", "--help", "Print this help message", false);
        flags.add("version", "-v", "--version", "Show version information", false);
        flags.add("quiet", "-q", "--quiet", "Suppress job notices and warnings", false);
        flags.add("debug", "-d", "--debug", "Enable debug logging", false);
        flags.add("config", "-c", "--config", "Use this rc file instead of ~/.kestrelrc", true);
        flags.add("history", "-H", "--history", "Read and write history at this path", true);

        flags
    }

    fn add(&mut self, name: &str, short: &str, long: &str, description: &str, takes_value: bool) {
        self.flags.insert(
            name.to_string(),
            Flag {
                short: short.to_string(),
                long: long.to_string(),
                description: description.to_string(),
                takes_value,
                value: None,
            },
        );
    }

    pub fn parse(&mut self, args: &[String]) -> Result<(), ShellError> {
        let mut args = args.iter();

        while let Some(arg) = args.next() {
            let flag = self
                .flags
                .values_mut()
                .find(|flag| *arg == flag.short || *arg == flag.long)
                .ok_or_else(|| ShellError::FlagError(format!("unknown option {}", arg)))?;

            flag.value = if flag.takes_value {
                match args.next() {
                    Some(value) => Some(value.clone()),
                    None => {
                        return Err(ShellError::FlagError(format!(
                            "Flag {} requires a value",
                            arg
                        )))
                    }
                }
            } else {
                Some("true".to_string())
            };
        }
        Ok(())
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.flags
            .get(name)
            .and_then(|f| f.value.as_ref())
            .is_some()
    }

    pub fn get_value(&self, name: &str) -> Option<&String> {
        self.flags.get(name).and_then(|f| f.value.as_ref())
    }

    pub fn print_help(&self) {
        println!("Usage: kestrel [OPTIONS]");
        println!("\nOptions:");
        for flag in self.flags.values() {
            let long = if flag.takes_value {
                format!("{} <path>", flag.long)
            } else {
                flag.long.clone()
            };
            println!("  {}, {:<18} {}", flag.short, long, flag.description);
        }
    }
}
