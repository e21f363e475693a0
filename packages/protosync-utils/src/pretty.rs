#[cfg(test)]
#[path = "./pretty.test.rs"]
mod tests;

#[derive(Debug)]
pub struct UnitDefinition {
    initial: &'static str,
    units: &'static [(f64, &'static str)],
}

const BYTES: UnitDefinition = UnitDefinition {
    initial: " B",
    units: &[(1024.0, " KiB"), (1024.0, " MiB"), (1024.0, " GiB"), (1024.0, " TiB")],
};

#[derive(Debug)]
pub struct Unit {
    pub value: f64,
    pub unit_definition: &'static UnitDefinition,
}

impl Unit {
    pub fn bytes<T: Into<f64>>(value: T) -> Self {
        Self {value: value.into(), unit_definition: &BYTES}
    }

    /// Bytes when the size is known; unknown sizes (streamed bodies without
    /// a content length) print as a question mark.
    pub fn maybe_bytes(value: Option<u64>) -> String {
        match value {
            Some(value) => Unit::bytes(value as f64).to_string(),
            None => "? B".to_string(),
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut value
            = self.value;
        let mut suffix
            = self.unit_definition.initial;

        for (step, next_suffix) in self.unit_definition.units {
            if value < *step {
                break;
            }

            value /= step;
            suffix = next_suffix;
        }

        if suffix == self.unit_definition.initial {
            write!(f, "{}{}", value as u64, suffix)
        } else {
            write!(f, "{:.1}{}", value, suffix)
        }
    }
}
