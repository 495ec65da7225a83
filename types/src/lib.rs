//! Wire frames for the coordinator/worker protocol, generated from
//! `proto/apsp.proto`.
//!
//! Each message crossing a byte-oriented transport is one [`wire::Frame`],
//! carrying exactly one of the three protocol bodies.

pub mod wire {
    include!(concat!(env!("OUT_DIR"), "/apsp.wire.rs"));

    /// Distance value used on the wire for "no path".
    pub const UNREACHABLE: i64 = -1;

    impl Frame {
        pub fn new(body: frame::Body) -> Self {
            Self { body: Some(body) }
        }
    }
}

#[cfg(test)]
mod tests {
    use prost::Message;

    use super::wire::{frame::Body, AssignmentFrame, Frame, RowsFrame};

    #[test]
    fn test_body_tags_follow_schema() {
        let assignment = Frame::new(Body::Assignment(AssignmentFrame {
            vertex_count: 4,
            start_row: 1,
            row_count: 2,
        }));
        // Field 1, length-delimited.
        assert_eq!(assignment.encode_to_vec()[0], 0x0a);

        let rows = Frame::new(Body::Rows(RowsFrame {
            start_row: 0,
            row_count: 1,
            vertex_count: 2,
            distances: vec![0, -1],
        }));
        let bytes = rows.encode_to_vec();
        assert_eq!(bytes[0], 0x1a);
        assert_eq!(Frame::decode(bytes.as_slice()).unwrap(), rows);
    }
}
