use std::error::Error;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::iter;

pub mod error_code;

pub type CoreRsResult<T> = Result<T, Exception>;

pub struct Exception {
    pub severity: Severity,
    pub code: Option<String>,
    pub message: String,
    pub location: Option<String>,
    pub source: Option<Box<Exception>>,
}

impl Exception {
    pub fn has_code(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }

    /// This exception followed by its sources, outermost first.
    pub fn chain(&self) -> impl Iterator<Item = &Exception> {
        iter::successors(Some(self), |exception| exception.source.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Warn,
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        })
    }
}

impl Debug for Exception {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for Exception {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (depth, exception) in self.chain().enumerate() {
            if depth > 0 {
                writeln!(f)?;
            }
            write!(f, "{depth}: {} ", exception.severity)?;
            if let Some(code) = &exception.code {
                write!(f, "[{code}] ")?;
            }
            f.write_str(&exception.message)?;
            if let Some(location) = &exception.location {
                write!(f, " at {location}")?;
            }
        }
        Ok(())
    }
}

#[macro_export]
macro_rules! exception {
    ($(severity = $severity:expr,)? $(code = $code:expr,)? message = $message:expr $(,source = $source:expr)?) => {{
        #[allow(unused_mut)]
        let mut exception = $crate::exception::Exception {
            severity: $crate::exception::Severity::Error,
            code: None,
            message: $message.to_string(),
            location: Some(format!("{}:{}:{}", file!(), line!(), column!())),
            source: None,
        };
        $(exception.severity = $severity;)?
        $(exception.code = Some($code.to_string());)?
        $(exception.source = Some(Box::new($source.into()));)?
        exception
    }};
}

#[macro_export]
macro_rules! config_error {
    (message = $message:expr) => {
        $crate::exception!(code = $crate::exception::error_code::CONFIG_ERROR, message = $message)
    };
}

// innermost error becomes the tail of the chain
fn source(error: Option<&(dyn Error + 'static)>) -> Option<Box<Exception>> {
    let errors: Vec<_> = iter::successors(error, |&error| error.source()).collect();
    errors.into_iter().rev().fold(None, |source, error| {
        Some(Box::new(Exception {
            severity: Severity::Error,
            code: None,
            message: error.to_string(),
            location: None,
            source,
        }))
    })
}

impl<T> From<T> for Exception
where
    T: Error + 'static,
{
    fn from(error: T) -> Self {
        Exception {
            severity: Severity::Error,
            code: None,
            message: error.to_string(),
            location: None,
            source: source(error.source()),
        }
    }
}
