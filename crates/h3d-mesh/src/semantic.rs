use std::fmt;
use std::str::FromStr;

use h3d_core::H3dError;
use serde::{Deserialize, Serialize};

/// Meaning of a vertex attribute. Declaration order is the interleaving
/// order inside a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Semantic {
    Position,
    Normal,
    TexCoord,
    Color,
    Tangent,
    Bitangent,
    Joints,
    Weights,
}

impl Semantic {
    pub const ALL: [Semantic; 8] = [
        Semantic::Position,
        Semantic::Normal,
        Semantic::TexCoord,
        Semantic::Color,
        Semantic::Tangent,
        Semantic::Bitangent,
        Semantic::Joints,
        Semantic::Weights,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Semantic::Position => "POSITION",
            Semantic::Normal => "NORMAL",
            Semantic::TexCoord => "TEXCOORD",
            Semantic::Color => "COLOR",
            Semantic::Tangent => "TANGENT",
            Semantic::Bitangent => "BITANGENT",
            Semantic::Joints => "JOINTS",
            Semantic::Weights => "WEIGHTS",
        }
    }

    /// Floats per value in the builder's vertex layout.
    pub fn components(self) -> usize {
        match self {
            Semantic::TexCoord => 2,
            Semantic::Joints | Semantic::Weights => 4,
            _ => 3,
        }
    }
}

/// A semantic plus a set index. `TEXCOORD_0` and `TEXCOORD_1` are distinct
/// attributes of the same semantic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Attribute {
    pub semantic: Semantic,
    pub set: u32,
}

impl Attribute {
    pub const POSITION: Attribute = Attribute::new(Semantic::Position, 0);
    pub const NORMAL: Attribute = Attribute::new(Semantic::Normal, 0);
    pub const TEXCOORD: Attribute = Attribute::new(Semantic::TexCoord, 0);
    pub const COLOR: Attribute = Attribute::new(Semantic::Color, 0);
    pub const TANGENT: Attribute = Attribute::new(Semantic::Tangent, 0);
    pub const BITANGENT: Attribute = Attribute::new(Semantic::Bitangent, 0);

    pub const fn new(semantic: Semantic, set: u32) -> Self {
        Self { semantic, set }
    }

    pub fn components(self) -> usize {
        self.semantic.components()
    }
}

impl From<Semantic> for Attribute {
    fn from(semantic: Semantic) -> Self {
        Self::new(semantic, 0)
    }
}

/// `NAME` for set 0, `NAME_<set>` otherwise.
impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.set == 0 {
            f.write_str(self.semantic.name())
        } else {
            write!(f, "{}_{}", self.semantic.name(), self.set)
        }
    }
}

impl FromStr for Attribute {
    type Err = H3dError;

    /// Accepts `NAME` or `NAME_<set>`, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let (name, set) = match upper.rsplit_once('_') {
            Some((name, digits)) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
                let set = digits
                    .parse()
                    .map_err(|_| H3dError::Parse(format!("attribute set index out of range: {s}")))?;
                (name, set)
            }
            _ => (upper.as_str(), 0),
        };
        Semantic::ALL
            .into_iter()
            .find(|sem| sem.name() == name)
            .map(|sem| Attribute::new(sem, set))
            .ok_or_else(|| H3dError::Parse(format!("unknown attribute semantic: {s}")))
    }
}

/// Primitive kind of an indexed draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveType {
    Triangles,
    Lines,
    Points,
}

impl PrimitiveType {
    /// Indices consumed per primitive.
    pub fn index_arity(self) -> usize {
        match self {
            PrimitiveType::Triangles => 3,
            PrimitiveType::Lines => 2,
            PrimitiveType::Points => 1,
        }
    }
}
