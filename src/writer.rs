use std::io::{self, Stderr, Stdout, Write};

/// Output sink for command results, mockable in tests.
pub trait OutErr {
    fn write_err(&mut self, s: &str);
    fn write(&mut self, s: &str);
}

pub struct OtpWriter {
    pub out: Stdout,
    pub err: Stderr,
}

impl OtpWriter {
    pub fn new() -> Self {
        OtpWriter {
            out: io::stdout(),
            err: io::stderr(),
        }
    }
}

impl OutErr for OtpWriter {
    fn write_err(&mut self, s: &str) {
        if let Err(e) = self.err.write_all(s.as_bytes()) {
            eprintln!("{}", e);
        }
    }

    fn write(&mut self, s: &str) {
        if let Err(e) = self.out.write_all(s.as_bytes()) {
            eprintln!("{}", e);
        }
    }
}
