//! Flag sets rendered as `--name=value` arguments.

/// CliOption is one named tool flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOption {
    pub name: String,
    pub value: Option<String>,
    /// Whether the flag is passed to the tool at all. Excluded options still
    /// carry values the caller reads back.
    pub include: bool,
}

/// OptionSet keeps flags in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSet {
    options: Vec<CliOption>,
}

impl OptionSet {
    pub fn new() -> Self {
        OptionSet::default()
    }

    /// Sets or replaces an option. Names use underscores, as in `stats_port`.
    pub fn set(&mut self, name: &str, value: Option<impl ToString>, include: bool) {
        let value = value.map(|v| v.to_string());
        match self.options.iter_mut().find(|o| o.name == name) {
            Some(existing) => {
                existing.value = value;
                existing.include = include;
            }
            None => self.options.push(CliOption {
                name: name.to_string(),
                value,
                include,
            }),
        }
    }

    /// Returns the value of an option when it has one.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.name == name)
            .and_then(|o| o.value.as_deref())
    }

    /// Renders included, non-empty options as `--name-with-dashes=value`.
    pub fn to_args(&self) -> Vec<String> {
        self.options
            .iter()
            .filter(|o| o.include)
            .filter_map(|o| {
                o.value
                    .as_deref()
                    .filter(|v| !v.is_empty())
                    .map(|v| format!("--{}={}", o.name.replace('_', "-"), v))
            })
            .collect()
    }
}
