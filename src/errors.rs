error_chain! {
    foreign_links {
        Io(::std::io::Error);
        Png(::png::EncodingError);
    }

    errors {
        /// The buffer isn't a studio model we understand: bad magic or
        /// version, inconsistent lengths, malformed animation spans, etc.
        Format(msg: String) {
            description("malformed studio model")
            display("malformed studio model: {}", msg)
        }
        /// An offset or index points outside the buffer or outside the
        /// array it indexes into.
        OutOfRange(msg: String) {
            description("out of range")
            display("out of range: {}", msg)
        }
    }
}

macro_rules! check {
    ($b:expr) => {
        if !$b {
            use crate::errors::Error;
            use crate::errors::ErrorKind;
            Err(Error::from_kind(ErrorKind::Format(format!(
                "expected: {}",
                stringify!($b)
            ))))
        } else {
            Ok(())
        }
    };
}

/// Early-return an `OutOfRange` error.
macro_rules! out_of_range {
    ($($arg:tt)*) => {
        return Err(crate::errors::ErrorKind::OutOfRange(format!($($arg)*)).into())
    };
}

/// Early-return a `Format` error.
macro_rules! bad_format {
    ($($arg:tt)*) => {
        return Err(crate::errors::ErrorKind::Format(format!($($arg)*)).into())
    };
}
