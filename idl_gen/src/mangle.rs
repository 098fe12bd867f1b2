/* Constant identifier mangling
 *
 * (enum name, value) -> C identifier, e.g.
 *   ("GPUTextureFormat", "rgba8unorm-srgb") -> WGPU_TEXTURE_FORMAT_RGBA8UNORM_SRGB
 *   ("GPUTextureFormat", "")                -> WGPU_TEXTURE_FORMAT
 */

use crate::error::{GenerateError, GenerateResult};
use std::collections::HashMap;
use std::fmt;

/* Stripped from the front of every enum name */
pub const DOMAIN_PREFIX: &str = "GPU";

/* Prepended to every identifier */
pub const NAMESPACE_PREFIX: &str = "WGPU";

/* Value marker that yields an enum's invalid constant */
pub const INVALID_VALUE: &str = "INVALID";

pub fn mangle(enum_name: &str, value: &str) -> String {
    let stem = enum_name.strip_prefix(DOMAIN_PREFIX).unwrap_or(enum_name);

    let mut ident = String::with_capacity(NAMESPACE_PREFIX.len() + stem.len() * 2 + value.len() + 1);
    ident.push_str(NAMESPACE_PREFIX);
    for c in stem.chars() {
        if c.is_ascii_uppercase() {
            ident.push('_');
        }
        ident.extend(c.to_uppercase());
    }

    if !value.is_empty() {
        ident.push('_');
        ident.push_str(&value.to_uppercase().replace('-', "_"));
    }
    ident
}

/* Identifier of the enum's type declaration */
pub fn type_identifier(enum_name: &str) -> String {
    mangle(enum_name, "")
}

/* Identifier of the enum's invalid constant, always bound to 0 */
pub fn invalid_identifier(enum_name: &str) -> String {
    mangle(enum_name, INVALID_VALUE)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Type,
    Invalid,
    Value(String),
}

/* Where an identifier came from */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub enum_name: String,
    pub role: Role,
}

impl Origin {
    pub fn new(enum_name: &str, role: Role) -> Self {
        Self {
            enum_name: enum_name.to_string(),
            role,
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.role {
            Role::Type => write!(f, "enum {}", self.enum_name),
            Role::Invalid => write!(f, "the invalid constant of {}", self.enum_name),
            Role::Value(value) => write!(f, "{} \"{}\"", self.enum_name, value),
        }
    }
}

/* Tracks every emitted identifier so that two different sources can never share one */
#[derive(Debug, Default)]
pub struct IdentifierRegistry {
    seen: HashMap<String, Origin>,
}

impl IdentifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /* Register `identifier`. Re-registering the identical origin is allowed. */
    pub fn register(&mut self, identifier: &str, origin: Origin) -> GenerateResult<()> {
        match self.seen.get(identifier) {
            Some(existing) if *existing == origin => Ok(()),
            Some(existing) => Err(GenerateError::IdentifierCollision {
                identifier: identifier.to_string(),
                first: existing.to_string(),
                second: origin.to_string(),
            }),
            None => {
                self.seen.insert(identifier.to_string(), origin);
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
