//! Per-operation argument decoding.
//!
//! Only the leading fields of each argument are decoded: the registry key
//! and, for `bind`/`rebind`, enough of the bound object's descriptor to name
//! the interfaces it implements.

use std::fmt;
use std::io::Read;

use super::call::Operation;
use super::constants::{tc, REMOTE_INTERFACE};
use super::profile::ProtocolProfile;
use super::wire::{read_bytes, read_optional_u8, read_short_string, read_u16, read_u32, read_u8};
use crate::error::{JrmpError, Result};

/// Read a `TC_STRING` registry key.
pub fn read_key<R: Read>(reader: &mut R) -> Result<String> {
    let tag = read_u8(reader)?;
    if tag != tc::STRING {
        return Err(JrmpError::ArgumentDecode("corrupted message".to_string()));
    }
    read_short_string(reader)
}

/// Interfaces declared by the object passed to `bind`/`rebind`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectDescriptor {
    /// Interface count declared on the wire
    pub declared: u32,
    /// Names read before the scan finished or stopped
    pub interfaces: Vec<String>,
    /// Scan stopped at a name longer than the profile allows
    pub truncated: bool,
}

impl ObjectDescriptor {
    /// Read the descriptor that follows a `TC_OBJECT` tag.
    ///
    /// A declared name length above `max_name_len` ends the scan; the
    /// declared bytes are left unread.
    pub fn read_from<R: Read>(reader: &mut R, max_name_len: u16) -> Result<Self> {
        let class_tag = read_u8(reader)?;
        if class_tag != tc::PROXYCLASSDESC && class_tag != tc::CLASSDESC {
            return Err(JrmpError::ArgumentDecode(
                "corrupted message body".to_string(),
            ));
        }

        let declared = read_u32(reader)?;
        let mut interfaces = Vec::with_capacity(declared.min(16) as usize);
        let mut truncated = false;

        for _ in 0..declared {
            let len = read_u16(reader)?;
            if len > max_name_len {
                tracing::debug!(
                    len,
                    max = max_name_len,
                    "interface name exceeds max length, stopping interface scan"
                );
                truncated = true;
                break;
            }
            let name = read_bytes(reader, len as usize)?;
            interfaces.push(String::from_utf8_lossy(&name).into_owned());
        }

        Ok(Self {
            declared,
            interfaces,
            truncated,
        })
    }

    /// Interpret the interface list.
    pub fn bound_object(&self) -> BoundObject<'_> {
        match self.interfaces.split_first() {
            Some((first, rest)) if first == REMOTE_INTERFACE => BoundObject::RemoteClass {
                interface: rest.first().map(String::as_str),
            },
            _ => BoundObject::Proxy {
                interfaces: &self.interfaces,
            },
        }
    }
}

/// What the peer is trying to bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundObject<'a> {
    /// A class implementing `java.rmi.Remote` and the named interface
    RemoteClass {
        /// Interface following the remote marker, if any
        interface: Option<&'a str>,
    },
    /// A dynamic proxy over the listed interfaces
    Proxy {
        /// Proxied interfaces
        interfaces: &'a [String],
    },
}

impl fmt::Display for BoundObject<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RemoteClass { interface } => {
                write!(f, "new <class (?) implements {}>()", interface.unwrap_or("?"))
            },
            Self::Proxy { interfaces } => write!(
                f,
                "<java.lang.reflect.Proxy handling <{}> interfaces>",
                interfaces.join(", ")
            ),
        }
    }
}

/// Arguments of `bind`/`rebind`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindArguments {
    /// Registry key
    pub key: String,
    /// Descriptor of the bound object, if the call carried one
    pub object: Option<ObjectDescriptor>,
}

impl BindArguments {
    /// Read the key and the optional object descriptor.
    ///
    /// The byte after the key is consumed either way; a stream that ends
    /// there simply carries no descriptor.
    pub fn read_from<R: Read>(reader: &mut R, max_name_len: u16) -> Result<Self> {
        let key = read_key(reader)?;
        let object = match read_optional_u8(reader)? {
            Some(tc::OBJECT) => Some(ObjectDescriptor::read_from(reader, max_name_len)?),
            _ => None,
        };
        Ok(Self { key, object })
    }
}

/// Decoded arguments of one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arguments {
    /// `lookup(key)`
    Lookup {
        /// Registry key
        key: String,
    },
    /// `list()`
    List,
    /// `bind(key, obj)`
    Bind(BindArguments),
    /// `rebind(key, obj)`
    Rebind(BindArguments),
    /// `unbind(key)`
    Unbind {
        /// Registry key
        key: String,
    },
}

impl Arguments {
    /// Read the arguments of `operation`.
    pub fn read_for<R: Read>(
        operation: Operation,
        reader: &mut R,
        profile: &ProtocolProfile,
    ) -> Result<Self> {
        let max = profile.max_interface_name_len;
        match operation {
            Operation::Lookup => Ok(Self::Lookup {
                key: read_key(reader)?,
            }),
            Operation::List => Ok(Self::List),
            Operation::Bind => Ok(Self::Bind(BindArguments::read_from(reader, max)?)),
            Operation::Rebind => Ok(Self::Rebind(BindArguments::read_from(reader, max)?)),
            Operation::Unbind => Ok(Self::Unbind {
                key: read_key(reader)?,
            }),
        }
    }

    /// Operation these arguments belong to.
    pub fn operation(&self) -> Operation {
        match self {
            Self::Lookup { .. } => Operation::Lookup,
            Self::List => Operation::List,
            Self::Bind(_) => Operation::Bind,
            Self::Rebind(_) => Operation::Rebind,
            Self::Unbind { .. } => Operation::Unbind,
        }
    }

    /// Registry key, for the operations that take one.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Lookup { key } | Self::Unbind { key } => Some(key.as_str()),
            Self::Bind(args) | Self::Rebind(args) => Some(args.key.as_str()),
            Self::List => None,
        }
    }
}

impl fmt::Display for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "list()"),
            Self::Lookup { key } | Self::Unbind { key } => {
                write!(f, "{}({key:?})", self.operation())
            },
            Self::Bind(args) | Self::Rebind(args) => match &args.object {
                Some(object) => write!(
                    f,
                    "{}({:?}, {})",
                    self.operation(),
                    args.key,
                    object.bound_object()
                ),
                None => write!(f, "{}({:?})", self.operation(), args.key),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::wire::write_short_string;
    use std::io::Cursor;

    fn key_bytes(key: &str) -> Vec<u8> {
        let mut buf = vec![tc::STRING];
        write_short_string(&mut buf, key).unwrap();
        buf
    }

    fn descriptor_bytes(class_tag: u8, names: &[&str]) -> Vec<u8> {
        let mut buf = vec![tc::OBJECT, class_tag];
        buf.extend_from_slice(&(names.len() as u32).to_be_bytes());
        for name in names {
            write_short_string(&mut buf, name).unwrap();
        }
        buf
    }

    #[test]
    fn test_read_key() {
        let mut cursor = Cursor::new(key_bytes("MyService"));
        assert_eq!(read_key(&mut cursor).unwrap(), "MyService");
    }

    #[test]
    fn test_read_key_wrong_tag() {
        let mut bytes = key_bytes("MyService");
        bytes[0] = tc::OBJECT;
        let err = read_key(&mut Cursor::new(bytes)).unwrap_err();
        assert_eq!(err.to_string(), "Argument decode error: corrupted message");
    }

    #[test]
    fn test_lookup_and_unbind_arguments() {
        let profile = ProtocolProfile::default();
        let args =
            Arguments::read_for(Operation::Lookup, &mut Cursor::new(key_bytes("foo")), &profile)
                .unwrap();
        assert_eq!(args.key(), Some("foo"));
        assert_eq!(args.to_string(), "lookup(\"foo\")");

        let args =
            Arguments::read_for(Operation::Unbind, &mut Cursor::new(key_bytes("foo")), &profile)
                .unwrap();
        assert_eq!(args.operation(), Operation::Unbind);
    }

    #[test]
    fn test_list_reads_nothing() {
        let mut cursor = Cursor::new(vec![0xAA]);
        let args =
            Arguments::read_for(Operation::List, &mut cursor, &ProtocolProfile::default()).unwrap();
        assert_eq!(args, Arguments::List);
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_bind_remote_class() {
        let mut bytes = key_bytes("calc");
        bytes.extend(descriptor_bytes(
            tc::PROXYCLASSDESC,
            &["java.rmi.Remote", "com.example.Calculator"],
        ));
        let args = BindArguments::read_from(&mut Cursor::new(bytes), 100).unwrap();
        let object = args.object.as_ref().unwrap();
        assert_eq!(object.declared, 2);
        assert!(!object.truncated);
        assert_eq!(
            object.bound_object(),
            BoundObject::RemoteClass {
                interface: Some("com.example.Calculator")
            }
        );

        let rendered = Arguments::Rebind(args).to_string();
        assert_eq!(
            rendered,
            "rebind(\"calc\", new <class (?) implements com.example.Calculator>())"
        );
    }

    #[test]
    fn test_bind_proxy() {
        let mut bytes = key_bytes("svc");
        bytes.extend(descriptor_bytes(tc::CLASSDESC, &["a.A", "b.B"]));
        let args = BindArguments::read_from(&mut Cursor::new(bytes), 100).unwrap();
        assert_eq!(
            Arguments::Bind(args).to_string(),
            "bind(\"svc\", <java.lang.reflect.Proxy handling <a.A, b.B> interfaces>)"
        );
    }

    #[test]
    fn test_bind_bad_class_descriptor() {
        let mut bytes = key_bytes("svc");
        bytes.extend_from_slice(&[tc::OBJECT, tc::STRING]);
        let err = BindArguments::read_from(&mut Cursor::new(bytes), 100).unwrap_err();
        assert_eq!(err.to_string(), "Argument decode error: corrupted message body");
    }

    #[test]
    fn test_bind_without_object() {
        let bytes = key_bytes("svc");
        let args = BindArguments::read_from(&mut Cursor::new(bytes), 100).unwrap();
        assert!(args.object.is_none());

        // Non-object tag after the key: consumed, no descriptor
        let mut bytes = key_bytes("svc");
        bytes.push(0x70);
        let args = BindArguments::read_from(&mut Cursor::new(bytes), 100).unwrap();
        assert!(args.object.is_none());
    }

    #[test]
    fn test_oversized_interface_name_stops_scan() {
        let mut bytes = key_bytes("svc");
        bytes.extend_from_slice(&[tc::OBJECT, tc::PROXYCLASSDESC]);
        bytes.extend_from_slice(&2u32.to_be_bytes());
        bytes.extend_from_slice(&150u16.to_be_bytes());
        bytes.extend(std::iter::repeat(b'x').take(150));
        let total = bytes.len() as u64;

        let mut cursor = Cursor::new(bytes);
        let args = BindArguments::read_from(&mut cursor, 100).unwrap();
        let object = args.object.unwrap();
        assert!(object.truncated);
        assert!(object.interfaces.is_empty());
        assert_eq!(object.declared, 2);
        // 150 declared bytes left unread
        assert_eq!(cursor.position(), total - 150);
    }

    #[test]
    fn test_remote_marker_without_second_interface() {
        let descriptor = ObjectDescriptor {
            declared: 1,
            interfaces: vec![REMOTE_INTERFACE.to_string()],
            truncated: false,
        };
        assert_eq!(
            descriptor.bound_object().to_string(),
            "new <class (?) implements ?>()"
        );
    }
}
