use colored::{Color, Colorize};

const PATH_COLOR: Color
    = Color::TrueColor { r: 215, g: 95, b: 215 };

pub enum DataType {
    Path,

    Trace,
    Debug,
    Info,
    Warning,
    Error,
}

impl DataType {
    pub fn color(&self) -> Color {
        match self {
            DataType::Path => PATH_COLOR,

            DataType::Trace => Color::BrightBlack,
            DataType::Debug => Color::Cyan,
            DataType::Info => Color::Green,
            DataType::Warning => Color::Yellow,
            DataType::Error => Color::Red,
        }
    }

    pub fn colorize(&self, value: &str) -> String {
        value.color(self.color()).to_string()
    }
}
