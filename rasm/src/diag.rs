use asm_core::Error;
use color_print::cprintln;

/// An error tied to the source position that produced it.
#[derive(Debug)]
pub struct Diagnostic {
    pub error: Error,
    pub path: String,
    /// 1-based; 0 when the whole file is at fault.
    pub line_no: usize,
    pub line: String,
}

impl Diagnostic {
    pub fn file(path: &str, error: Error) -> Self {
        Self {
            error,
            path: path.to_string(),
            line_no: 0,
            line: String::new(),
        }
    }

    pub fn at(path: &str, line_no: usize, line: &str, error: Error) -> Self {
        Self {
            error,
            path: path.to_string(),
            line_no,
            line: line.to_string(),
        }
    }

    /// Render in the usual compiler shape: the message, then the location
    /// and the offending line.
    pub fn print(&self) {
        cprintln!("<red,bold>error</>: {}", self.error);
        if self.line_no == 0 {
            cprintln!("     <blue>--></> <underline>{}</>", self.path);
        } else {
            cprintln!("     <blue>--></> <underline>{}:{}</>", self.path, self.line_no);
            cprintln!("      <blue>|</>");
            cprintln!(" <blue>{:>4} |</> {}", self.line_no, self.line);
            cprintln!("      <blue>|</>");
        }
    }
}
