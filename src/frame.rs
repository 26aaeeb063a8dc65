//! Query and reply frames exchanged with the neck.
//!
//! Every exchange is a fixed 4-byte query followed by a 4-byte reply. The
//! first byte of a reply is a tag identifying its meaning.
//!
//! # Encoding
//!
//! | Frame    | Bytes                 | Description |
//! |----------|-----------------------|-------------|
//! | Query    | `53 10 00 01`         | Write packet #3, read button status register. |
//! | Hello    | `55 55 55 55`         | Handshake acknowledgment. |
//! | Status   | `52 xx yy zz`         | Button status, `xx yy zz` decoded by [`ButtonState`]. |

use core::fmt;

use crate::{
    buttons::ButtonState,
    decode::{Decode, DecodeError},
    encode::Encode,
};

/// Length of both query and reply frames.
pub const FRAME_LEN: usize = 4;

/// Tag of a handshake acknowledgment.
pub const HELLO_TAG: u8 = 0x55;

/// Tag of a button status packet.
pub const STATUS_TAG: u8 = 0x52;

/// The only accepted handshake reply.
pub const HELLO_FRAME: [u8; FRAME_LEN] = [HELLO_TAG; FRAME_LEN];

/// Query bytes: write packet #3, ask for register #1 (button status), reserved, padding.
pub const QUERY_FRAME: [u8; FRAME_LEN] = [0x53, 0x10, 0x00, 0x01];

/// The outbound "read button status" query.
///
/// The same query is sent during the handshake and while polling; the reply
/// tag is what tells the two phases apart.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QueryFrame;

impl QueryFrame {
    pub const BYTES: [u8; FRAME_LEN] = QUERY_FRAME;
}

impl Encode for QueryFrame {
    fn size(&self) -> usize {
        FRAME_LEN
    }

    fn encode(&self, data: &mut [u8]) {
        Self::BYTES.encode(data);
    }
}

/// A decoded reply frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// The neck acknowledged the handshake with [`HELLO_FRAME`].
    Hello,
    /// A button status packet.
    Status(ButtonState),
}

impl Decode for Reply {
    fn decode(data: &mut &[u8]) -> Result<Self, DecodeError> {
        let frame = <[u8; FRAME_LEN]>::decode(data)?;

        match frame[0] {
            STATUS_TAG => Ok(Self::Status(ButtonState::decode(&mut &frame[1..])?)),
            // A hello must match byte for byte; only checking the tag is not enough.
            HELLO_TAG if frame == HELLO_FRAME => Ok(Self::Hello),
            HELLO_TAG => Err(DecodeError::InvalidHandshake {
                found: frame,
                expected: HELLO_FRAME,
            }),
            value => Err(DecodeError::UnexpectedByte {
                name: "tag",
                value,
                expected: &[HELLO_TAG, STATUS_TAG],
            }),
        }
    }
}

/// Formats raw bytes as `Read N bytes: 0xAA 0xBB ...` for diagnostics.
pub struct FrameDump<'a>(pub &'a [u8]);

impl fmt::Display for FrameDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Read {} bytes:", self.0.len())?;
        for byte in self.0 {
            write!(f, " 0x{byte:02X}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{FrameDump, QueryFrame, Reply, HELLO_FRAME, QUERY_FRAME};
    use crate::{
        buttons::ButtonState,
        decode::{Decode, DecodeError},
        encode::Encode,
    };

    #[test]
    fn query_encoding() {
        let mut buf = [0; 4];
        QueryFrame.encode(&mut buf);
        assert_eq!(buf, [0x53, 0x10, 0x00, 0x01]);
        assert_eq!(buf, QUERY_FRAME);
    }

    #[test]
    fn hello() {
        assert_eq!(Reply::decode(&mut HELLO_FRAME.as_slice()), Ok(Reply::Hello));
    }

    #[test]
    fn hello_with_bad_payload() {
        let err = Reply::decode(&mut [0x55, 0x55, 0x54, 0x55].as_slice()).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidHandshake { .. }));
    }

    #[test]
    fn status() {
        let reply = Reply::decode(&mut [0x52, 0x00, 0x08, 0x41].as_slice()).unwrap();
        assert_eq!(
            reply,
            Reply::Status(ButtonState {
                touch_green: true,
                fret_green: true,
                fret_red: true,
                ..Default::default()
            })
        );
    }

    #[test]
    fn unknown_tags() {
        for tag in [0x00, 0x51, 0x53, 0xFF] {
            let err = Reply::decode(&mut [tag, 0xFF, 0xFF, 0xFF].as_slice()).unwrap_err();
            assert!(matches!(
                err,
                DecodeError::UnexpectedByte { value, .. } if value == tag
            ));
        }
    }

    #[test]
    fn short_frame() {
        let err = Reply::decode(&mut [0x52, 0x00, 0x08].as_slice()).unwrap_err();
        assert_eq!(err, DecodeError::UnexpectedEnd);
    }

    #[test]
    fn dump() {
        assert_eq!(
            FrameDump(&[0x52, 0x0a, 0xff]).to_string(),
            "Read 3 bytes: 0x52 0x0A 0xFF"
        );
        assert_eq!(FrameDump(&[]).to_string(), "Read 0 bytes:");
    }
}
