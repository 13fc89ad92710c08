// crates/plk-supervisor/src/types.rs
use core::convert::TryFrom;
use core::fmt;
use core::str::FromStr;

// --- Primitive Types (Based on DS 301 Section 6.1.4) ---
// These aliases keep object dictionary coordinates readable (UNSIGNEDn).

/// Alias for UNSIGNED8 (8-bit unsigned integer)
pub type UNSIGNED8 = u8;
/// Alias for UNSIGNED16 (16-bit unsigned integer)
pub type UNSIGNED16 = u16;
/// Alias for UNSIGNED32 (32-bit unsigned integer)
pub type UNSIGNED32 = u32;

// --- Protocol Constants (Appendix 3) ---

/// POWERLINK default Node ID of the Managing Node (240 or F0h).
/// The supervisor always runs as MN, so this is also the local node.
pub const C_ADR_MN_DEF_NODE_ID: u8 = 240;

/// Maximum Node ID available for regular Controlled Nodes (239)
pub const C_ADR_MAX_CN_NODE_ID: u8 = 239;

/// Represents the target of an SDO transfer, wrapping a `u8` to ensure type safety.
///
/// Remote targets are Controlled Nodes in the range 1-239. The Managing Node
/// id (240) designates the local node, i.e. the supervisor's own object
/// dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u8);

impl NodeId {
    /// The local node (this Managing Node).
    pub const LOCAL: NodeId = NodeId(C_ADR_MN_DEF_NODE_ID);

    /// Returns `true` if this id addresses the local object dictionary.
    pub fn is_local(&self) -> bool {
        self.0 == C_ADR_MN_DEF_NODE_ID
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for invalid Node ID creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeIdError {
    /// Node ID is outside the valid SDO target range (1-239, 240).
    InvalidRange(u8),
}

impl fmt::Display for NodeIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeIdError::InvalidRange(value) => write!(
                f,
                "Invalid NodeId value: {}. Valid range is 1-239, or 240 for the local node.",
                value
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for NodeIdError {}

impl TryFrom<u8> for NodeId {
    type Error = NodeIdError;

    /// Creates a `NodeId` from a `u8`, returning an error if the value cannot
    /// be the target of an SDO transfer.
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1..=C_ADR_MN_DEF_NODE_ID => Ok(NodeId(value)),
            _ => Err(NodeIdError::InvalidRange(value)),
        }
    }
}

impl From<NodeId> for u8 {
    fn from(node_id: NodeId) -> Self {
        node_id.0
    }
}

/// Direction of a process image, seen from the Managing Node application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    /// Data received from the network (PI_IN).
    Input,
    /// Data sent to the network (PI_OUT).
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => write!(f, "Input"),
            Direction::Output => write!(f, "Output"),
        }
    }
}

/// The closed set of IEC 61131-3 elementary types a channel or an SDO
/// transfer can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IecDataType {
    Bool,
    Sint,
    Int,
    Dint,
    Lint,
    Usint,
    Uint,
    Udint,
    Ulint,
    // Bit strings, unsigned semantics.
    Byte,
    Word,
    Dword,
    Lword,
    Real,
    Lreal,
}

/// Compile-time key table. Both the IEC 61131 names used in process image
/// descriptions and the object dictionary names used by the SDO dialog map
/// onto the same variants.
const DATA_TYPE_KEYS: &[(&str, IecDataType)] = &[
    ("BOOL", IecDataType::Bool),
    ("SINT", IecDataType::Sint),
    ("INT", IecDataType::Int),
    ("DINT", IecDataType::Dint),
    ("LINT", IecDataType::Lint),
    ("USINT", IecDataType::Usint),
    ("UINT", IecDataType::Uint),
    ("UDINT", IecDataType::Udint),
    ("ULINT", IecDataType::Ulint),
    ("BYTE", IecDataType::Byte),
    ("WORD", IecDataType::Word),
    ("DWORD", IecDataType::Dword),
    ("LWORD", IecDataType::Lword),
    ("REAL", IecDataType::Real),
    ("LREAL", IecDataType::Lreal),
    ("BOOLEAN", IecDataType::Bool),
    ("INTEGER8", IecDataType::Sint),
    ("INTEGER16", IecDataType::Int),
    ("INTEGER32", IecDataType::Dint),
    ("INTEGER64", IecDataType::Lint),
    ("UNSIGNED8", IecDataType::Usint),
    ("UNSIGNED16", IecDataType::Uint),
    ("UNSIGNED32", IecDataType::Udint),
    ("UNSIGNED64", IecDataType::Ulint),
    ("REAL32", IecDataType::Real),
    ("REAL64", IecDataType::Lreal),
];

impl IecDataType {
    /// All variants, in table order.
    pub const ALL: [IecDataType; 15] = [
        IecDataType::Bool,
        IecDataType::Sint,
        IecDataType::Int,
        IecDataType::Dint,
        IecDataType::Lint,
        IecDataType::Usint,
        IecDataType::Uint,
        IecDataType::Udint,
        IecDataType::Ulint,
        IecDataType::Byte,
        IecDataType::Word,
        IecDataType::Dword,
        IecDataType::Lword,
        IecDataType::Real,
        IecDataType::Lreal,
    ];

    /// Natural width of the type in bits. BOOL occupies a single bit.
    pub fn bit_size(&self) -> u8 {
        match self {
            IecDataType::Bool => 1,
            IecDataType::Sint | IecDataType::Usint | IecDataType::Byte => 8,
            IecDataType::Int | IecDataType::Uint | IecDataType::Word => 16,
            IecDataType::Dint | IecDataType::Udint | IecDataType::Dword | IecDataType::Real => 32,
            IecDataType::Lint | IecDataType::Ulint | IecDataType::Lword | IecDataType::Lreal => 64,
        }
    }

    /// Size of the type inside an SDO payload. BOOL travels as one byte.
    pub fn byte_size(&self) -> usize {
        (self.bit_size() as usize).div_ceil(8)
    }

    /// Largest bit size a channel of this type may declare.
    /// Process images sometimes reserve a full byte for a BOOL.
    pub fn max_channel_bits(&self) -> u8 {
        match self {
            IecDataType::Bool => 8,
            other => other.bit_size(),
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            IecDataType::Sint | IecDataType::Int | IecDataType::Dint | IecDataType::Lint
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, IecDataType::Real | IecDataType::Lreal)
    }

    /// Canonical IEC key of this type.
    pub fn key(&self) -> &'static str {
        DATA_TYPE_KEYS
            .iter()
            .find(|(_, dt)| dt == self)
            .map(|(key, _)| *key)
            .unwrap_or("UNDEFINED")
    }
}

impl fmt::Display for IecDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Error returned when a string key is not part of the data type table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataTypeKeyError(pub alloc::string::String);

impl fmt::Display for DataTypeKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown data type key: '{}'", self.0)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DataTypeKeyError {}

impl FromStr for IecDataType {
    type Err = DataTypeKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        DATA_TYPE_KEYS
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, dt)| *dt)
            .ok_or_else(|| DataTypeKeyError(key.into()))
    }
}
