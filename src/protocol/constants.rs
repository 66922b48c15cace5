//! Wire constants for the JRMP transport and the Java serialization stream
//! tags the registry calls carry.

/// Transport header magic (`"JRMI"`).
pub const MAGIC: u32 = 0x4A52_4D49;

/// Supported transport version.
pub const VERSION: u16 = 2;

/// `StreamProtocol` style byte.
pub const STREAM_PROTOCOL: u8 = 0x4B;

/// Handshake acknowledgement tag.
pub const PROTOCOL_ACK: u8 = 0x4E;

/// Call message tag.
pub const CALL: u8 = 0x50;

/// Return message tag.
pub const RETURN: u8 = 0x51;

/// Object serialization stream header (`STREAM_MAGIC` + `STREAM_VERSION`).
pub const OBJECT_STREAM_MAGIC: u32 = 0xACED_0005;

/// Serialization stream tags.
pub mod tc {
    /// Block data follows, one length byte.
    pub const BLOCKDATA: u8 = 0x77;
    /// New object.
    pub const OBJECT: u8 = 0x73;
    /// New string, u16 length.
    pub const STRING: u8 = 0x74;
    /// Class descriptor.
    pub const CLASSDESC: u8 = 0x72;
    /// Dynamic proxy class descriptor.
    pub const PROXYCLASSDESC: u8 = 0x7D;
}

/// Length byte of the block that opens every call (object id, op, hash).
pub const CALL_BLOCK_LEN: u8 = 0x22;

/// Object id bytes skipped in the call block (objNum + UID).
pub const OBJ_ID_LEN: usize = 22;

/// Length byte of the block that opens every return (outcome + UID).
pub const RETURN_BLOCK_LEN: u8 = 0x0F;

/// Return outcome: value follows.
pub const NORMAL_RETURN: u8 = 0x01;

/// Return outcome: exception follows.
pub const EXCEPTIONAL_RETURN: u8 = 0x02;

/// Interface hash sent by `RegistryImpl_Stub` from a pure client.
pub const REGISTRY_CLIENT_HASH: i64 = 4_905_912_898_345_647_071;

/// Interface hash expected when the peer announced itself as a listening server.
///
/// `RegistryImpl_Skel` declares the same hash as the stub.
pub const REGISTRY_SERVER_HASH: i64 = 4_905_912_898_345_647_071;

/// Interface names longer than this stop the interface scan of a bind call.
pub const MAX_INTERFACE_NAME_LEN: u16 = 100;

/// Marker interface of every remote object.
pub const REMOTE_INTERFACE: &str = "java.rmi.Remote";
