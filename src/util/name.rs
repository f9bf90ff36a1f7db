use std::fmt::{self, Write};

/// NUL-padded ASCII(?) string, used as human-readable names in studio
/// models. Bone names are 32 bytes, most other names 64.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Name(pub Vec<u8>);

impl Name {
    /// Takes everything up to the first NUL. Whatever follows the NUL is
    /// garbage left over from the tool that wrote the file.
    pub fn from_bytes(buf: &[u8]) -> Name {
        let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
        Name(buf[..len].to_vec())
    }

    /// Returns an object that formats the name as a non-empty string
    /// of letters, digits, and underscores.
    pub fn print_safe(&self) -> NameSafePrinter {
        NameSafePrinter(self)
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Name {
        Name::from_bytes(s.as_bytes())
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for &b in &self.0 {
            // Convert non-printable characters to periods (which is what
            // hex editors usually do).
            f.write_char(if b < 0x20 || b >= 0x7f { '.' } else { b as char })?;
        }
        Ok(())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_char('"')?;
        for &b in &self.0 {
            for c in (b as char).escape_default() {
                f.write_char(c)?;
            }
        }
        f.write_char('"')
    }
}

/// Wrapper produced by `Name::print_safe`.
pub struct NameSafePrinter<'a>(pub &'a Name);

impl<'a> fmt::Display for NameSafePrinter<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let bytes = &(self.0).0;

        if bytes.is_empty() {
            return f.write_char('_');
        }

        for &b in bytes {
            // Keep dots so "head.bmp" stays recognizable.
            let c = if b.is_ascii_alphanumeric() || b == b'.' || b == b'-' {
                b as char
            } else {
                '_'
            };
            f.write_char(c)?;
        }
        Ok(())
    }
}

#[test]
fn test_nul_padding() {
    let name = Name::from_bytes(b"Bip01 Spine\0\xcd\xcd\0\0");
    assert_eq!(name.to_string(), "Bip01 Spine");
    assert_eq!(name.print_safe().to_string(), "Bip01_Spine");
    assert_eq!(Name::from_bytes(&[0; 8]).print_safe().to_string(), "_");
    assert_eq!(format!("{:?}", Name::from("a\"b")), "\"a\\\"b\"");
}
